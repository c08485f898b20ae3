//! Waypoint movement resolution
//!
//! Movement consumes a distance allowance along grid paths toward an
//! ordered waypoint queue. Waypoints left unreached in one step stay
//! queued, so later movement steps in the same turn finish them first.

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;
use crate::skirmish::constants::MOVE_CLAMP_EPSILON;
use crate::skirmish::facing::bearing;
use crate::skirmish::pathfinding::{find_path, GridCoord};
use crate::skirmish::terrain::{earliest_obstacle_enter, Rect, TerrainPiece};

/// Unfinished waypoints carried between movement steps within a turn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaypointQueue {
    pub waypoints: Vec<Vec2>,
}

impl WaypointQueue {
    pub fn push(&mut self, destination: Vec2) {
        self.waypoints.push(destination);
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

/// Where a movement step ended up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub from: Vec2,
    pub to: Vec2,
    pub facing: f32,
    /// Allowance after the movement penalty, before consumption
    pub allowance: f32,
    /// Straight-line fallback was clamped by terrain
    pub clamped: bool,
}

/// Consume an allowance along the waypoint queue.
///
/// Waypoints are pursued in order along grid paths; a waypoint the
/// allowance cannot finish stays at the head of the queue for the next
/// movement step. A disconnected waypoint degrades to straight-line
/// movement clamped just short of the first obstacle, and ends the step.
pub fn route_movement(
    start: Vec2,
    start_facing: f32,
    allowance: f32,
    queue: &mut WaypointQueue,
    bounds: &Rect,
    pieces: &[TerrainPiece],
    end_facing: Option<f32>,
) -> MoveOutcome {
    let mut position = start;
    let mut remaining = allowance.max(0.0);
    let mut clamped = false;

    while remaining >= 1.0 && !queue.is_empty() {
        let target = queue.waypoints[0];
        let from_cell = GridCoord::from_vec2(position);
        let goal_cell = GridCoord::from_vec2(target);

        match find_path(from_cell, goal_cell, bounds, pieces) {
            Some(path) => {
                let steps = path.len().saturating_sub(1);
                if (steps as f32) <= remaining {
                    // Waypoint reached; move on to the next one
                    position = path[steps].to_vec2();
                    remaining -= steps as f32;
                    queue.waypoints.remove(0);
                } else {
                    // Stop at the farthest reachable node on this path
                    let reach = remaining.floor() as usize;
                    position = path[reach].to_vec2();
                    remaining = 0.0;
                }
            }
            None => {
                // Disconnected: straight line, clamped at the first
                // obstacle entry, then stop pursuing waypoints
                let toward = target - position;
                let full = toward.length().min(remaining);
                if full > 0.0 {
                    let dir = toward.normalize();
                    let end = position + dir * full;
                    // Floored so the lattice snap cannot round into the obstacle
                    let travel = match earliest_obstacle_enter(position, end, pieces) {
                        Some(t) => {
                            clamped = true;
                            (t * full - MOVE_CLAMP_EPSILON).floor().max(0.0)
                        }
                        None => full,
                    };
                    position = GridCoord::from_vec2(position + dir * travel).to_vec2();
                }
                queue.waypoints.clear();
                remaining = 0.0;
            }
        }
    }

    // Face along net movement unless the player pinned a facing
    let facing = match end_facing {
        Some(f) => f.rem_euclid(360.0),
        None if position != start => bearing(start, position),
        None => start_facing,
    };

    MoveOutcome { from: start, to: position, facing, allowance, clamped }
}
