//! Arc and bearing math
//!
//! Facings are degrees, 0 = +X, increasing clockwise (toward +Y).

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;
use crate::skirmish::constants::{ARC_EPSILON_DEG, FRONT_ARC_HALF_ANGLE, REAR_ARC_THRESHOLD};
use crate::skirmish::weapons::MountLocation;

/// Quadrant of a direction relative to a facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arc {
    Front,
    Right,
    Rear,
    Left,
}

impl Arc {
    pub fn all() -> [Arc; 4] {
        [Arc::Front, Arc::Right, Arc::Rear, Arc::Left]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Arc::Front => "front",
            Arc::Right => "right",
            Arc::Rear => "rear",
            Arc::Left => "left",
        }
    }
}

/// Bearing from one point to another, degrees in [0, 360)
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let raw = (to.y - from.y).atan2(to.x - from.x).to_degrees();
    raw.rem_euclid(360.0)
}

/// Signed angular delta between a bearing and a facing, normalized to (-180, 180]
pub fn angle_delta(bearing_deg: f32, facing_deg: f32) -> f32 {
    let mut delta = (bearing_deg - facing_deg).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

/// Classify `other` into an arc relative to a position and facing.
///
/// Front and rear include their 45/135 degree boundaries; left and right
/// hold the exclusive remainder.
pub fn incoming_arc(origin: Vec2, facing_deg: f32, other: Vec2) -> Arc {
    let delta = angle_delta(bearing(origin, other), facing_deg);
    if delta.abs() <= FRONT_ARC_HALF_ANGLE + ARC_EPSILON_DEG {
        Arc::Front
    } else if delta.abs() >= REAR_ARC_THRESHOLD - ARC_EPSILON_DEG {
        Arc::Rear
    } else if delta > 0.0 {
        Arc::Right
    } else {
        Arc::Left
    }
}

/// Can a weapon on this mount engage the target from here?
pub fn can_engage(
    attacker_pos: Vec2,
    attacker_facing: f32,
    target_pos: Vec2,
    mount: MountLocation,
) -> bool {
    mount.covers(incoming_arc(attacker_pos, attacker_facing, target_pos))
}
