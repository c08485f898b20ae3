//! Authoritative skirmish state
//!
//! Plain data: everything a collaborator needs to persist or render a
//! match lives here and round-trips through serde.

use serde::{Deserialize, Serialize};

use crate::core::types::{PerPlayer, PlayerId, TurnNumber, Vec2};
use crate::skirmish::knight::Knight;
use crate::skirmish::terrain::{Rect, TerrainPiece};

/// Complete battlefield state between turns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkirmishState {
    pub knights: PerPlayer<Knight>,
    pub positions: PerPlayer<Vec2>,
    /// Degrees, 0 = +X, clockwise
    pub facings: PerPlayer<f32>,
    pub turn: TurnNumber,
    /// Fixed for the match
    pub terrain: Vec<TerrainPiece>,
    /// Board rectangle; lattice cells outside it are impassable
    pub bounds: Rect,
    pub chassis_ids: PerPlayer<String>,
    /// Turn-scoped armor-save bonus (shield-shift); reset every turn
    pub save_bonus: PerPlayer<i32>,
}

impl SkirmishState {
    pub fn new(
        knights: PerPlayer<Knight>,
        positions: PerPlayer<Vec2>,
        facings: PerPlayer<f32>,
        terrain: Vec<TerrainPiece>,
        bounds: Rect,
        chassis_ids: PerPlayer<String>,
    ) -> Self {
        Self {
            knights,
            positions,
            facings,
            turn: 0,
            terrain,
            bounds,
            chassis_ids,
            save_bonus: PerPlayer::new(0, 0),
        }
    }

    pub fn knight(&self, player: PlayerId) -> &Knight {
        &self.knights[player]
    }

    pub fn knight_mut(&mut self, player: PlayerId) -> &mut Knight {
        &mut self.knights[player]
    }

    /// Center-to-center distance between the Knights
    pub fn measured_range(&self) -> f32 {
        self.positions[PlayerId::P1].distance(&self.positions[PlayerId::P2])
    }

    /// The match is over once either Knight is destroyed
    pub fn is_over(&self) -> bool {
        PlayerId::all().iter().any(|p| self.knights[*p].is_destroyed())
    }
}
