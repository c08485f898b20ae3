//! The turn-resolution engine
//!
//! Deterministic pipeline from (state, orders, dice) to (new state,
//! event log). Modules are layered leaf-first: geometry and terrain at
//! the bottom, the orchestrator on top.

pub mod attack;
pub mod catalog;
pub mod constants;
pub mod dice;
pub mod events;
pub mod facing;
pub mod grid;
pub mod knight;
pub mod movement;
pub mod pathfinding;
pub mod plan;
pub mod scatter;
pub mod state;
pub mod terrain;
pub mod turn;
pub mod weapons;

pub use attack::{SaveKind, ShotOutcome, ShotReport};
pub use catalog::{ChassisCatalog, ChassisProfile, ContentLibrary, LoadoutOption, MapPreset, RangeBand, WeaponCatalog};
pub use dice::{DiceRoller, DiceScript, DieKind};
pub use events::{render_log, TurnEvent};
pub use facing::{bearing, can_engage, incoming_arc, Arc};
pub use grid::{cell_id, Cell, CellTemplate, ComponentGroup, GridTemplate, LocationGrid};
pub use knight::{Knight, MountedWeapon};
pub use plan::{validate_plan, ActionType, PlanContext, PlanIssue, Severity, TurnOrders, TurnPlan, INITIATIVE_ORDER};
pub use state::SkirmishState;
pub use terrain::{line_of_sight, LosResult, Rect, TerrainKind, TerrainPiece};
pub use turn::resolve_turn;
pub use weapons::{AttackKind, DamageSpec, MountLocation, WeaponAbility, WeaponProfile};
