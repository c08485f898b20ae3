//! Turn event log
//!
//! Every observable outcome of a turn is one tagged event carrying
//! enough structure to render a combat log without recomputing anything.

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, Vec2};
use crate::skirmish::attack::{SaveKind, ShotOutcome, ShotReport};
use crate::skirmish::facing::Arc;
use crate::skirmish::plan::ActionType;

/// One entry in the turn log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TurnEvent {
    /// An initiative step began (emitted even with no participants)
    Step { action: ActionType, range: f32 },
    /// A movement step resolved
    Move {
        player: PlayerId,
        action: ActionType,
        from: Vec2,
        to: Vec2,
        facing: f32,
        allowance: f32,
        /// Dice behind a run allowance
        run_dice: Option<Vec<u8>>,
    },
    /// The shield rotated and a defensive bonus was granted
    ShieldShift { player: PlayerId, arc: Arc, save_bonus: i32 },
    /// One weapon resolved an attack
    Attack { player: PlayerId, report: ShotReport },
    /// A planned sub-action could not happen
    Skip { player: PlayerId, weapon: Option<String>, reason: String },
    /// A Knight crossed the destruction threshold
    Destroyed { player: PlayerId },
}

impl TurnEvent {
    /// Human-readable line for the combat log
    pub fn describe(&self) -> String {
        match self {
            TurnEvent::Step { action, range } => {
                format!("-- {} step (range {:.1})", action.label(), range)
            }
            TurnEvent::Move { player, action, from, to, facing, allowance, run_dice } => {
                let dice = match run_dice {
                    Some(values) => format!(
                        " [run dice {}]",
                        values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("+")
                    ),
                    None => String::new(),
                };
                format!(
                    "{} {}s ({:.0},{:.0}) -> ({:.0},{:.0}), facing {:.0}, allowance {:.1}{}",
                    player.label(),
                    action.label(),
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    facing,
                    allowance,
                    dice
                )
            }
            TurnEvent::ShieldShift { player, arc, save_bonus } => {
                format!(
                    "{} rotates shield to {} (+{} armor save this turn)",
                    player.label(),
                    arc.label(),
                    save_bonus
                )
            }
            TurnEvent::Attack { player, report } => {
                let scatter = report
                    .scatter
                    .map(|s| format!(" scatter {}", s.symbol()))
                    .unwrap_or_default();
                let landing = report
                    .final_cell
                    .as_deref()
                    .map(|c| format!(" -> {c}"))
                    .unwrap_or_default();
                let result = match &report.outcome {
                    ShotOutcome::Miss { reason } => format!("misses ({reason})"),
                    ShotOutcome::Saved { by: SaveKind::Shield } => "stopped by shield".to_string(),
                    ShotOutcome::Saved { by: SaveKind::Armor } => "saved by armor".to_string(),
                    ShotOutcome::Hit { damage, destroyed: false } => {
                        format!("hits for {damage}")
                    }
                    ShotOutcome::Hit { damage, destroyed: true } => {
                        format!("hits for {damage} - KNIGHT DESTROYED")
                    }
                };
                format!(
                    "{} fires {} ({}, {} arc) at {}{}{}: {}",
                    player.label(),
                    report.weapon,
                    report.attack.label(),
                    report.arc.label(),
                    report.target_cell,
                    scatter,
                    landing,
                    result
                )
            }
            TurnEvent::Skip { player, weapon, reason } => match weapon {
                Some(w) => format!("{} skips {}: {}", player.label(), w, reason),
                None => format!("{} skips: {}", player.label(), reason),
            },
            TurnEvent::Destroyed { player } => {
                format!("{} is destroyed", player.label())
            }
        }
    }
}

/// Render a full event list as combat-log lines
pub fn render_log(events: &[TurnEvent]) -> Vec<String> {
    events.iter().map(TurnEvent::describe).collect()
}
