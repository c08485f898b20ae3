//! Scatter shift tables
//!
//! Two dice drive scatter: red shifts the column, blue shifts the row.
//! Each attack kind has its own precision table; snap shots stray the
//! widest, aimed shots barely drift. Negative shifts run left/up.

use serde::{Deserialize, Serialize};

use crate::skirmish::facing::Arc;
use crate::skirmish::weapons::AttackKind;

/// Horizontal bias added to the red die before the table lookup
pub fn arc_bias(arc: Arc) -> i32 {
    match arc {
        Arc::Left => -1,
        Arc::Right => 1,
        Arc::Front | Arc::Rear => 0,
    }
}

/// Clamp a biased die value back onto the die faces
pub fn clamp_die(value: i32) -> u8 {
    value.clamp(1, 6) as u8
}

/// Column shift for a red die value
pub fn horizontal_shift(kind: AttackKind, die: u8) -> i32 {
    match kind {
        AttackKind::Snap => match die {
            1 => -2,
            2 => -1,
            3 | 4 => 0,
            5 => 1,
            _ => 2,
        },
        AttackKind::Standard => match die {
            1 | 2 => -1,
            3 | 4 => 0,
            _ => 1,
        },
        AttackKind::Aimed => match die {
            1 => -1,
            6 => 1,
            _ => 0,
        },
    }
}

/// Row shift for a blue die value
pub fn vertical_shift(kind: AttackKind, die: u8) -> i32 {
    match kind {
        AttackKind::Snap => match die {
            1 => -3,
            2 => -1,
            3 | 4 => 0,
            5 => 1,
            _ => 3,
        },
        AttackKind::Standard => match die {
            1 => -2,
            2 => -1,
            3 | 4 => 0,
            5 => 1,
            _ => 2,
        },
        AttackKind::Aimed => match die {
            1 => -1,
            6 => 1,
            _ => 0,
        },
    }
}

/// Record of one scatter resolution, kept for the event log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScatterRoll {
    pub red: u8,
    /// Red die after the incoming-arc bias, clamped to the faces
    pub red_biased: u8,
    pub blue: u8,
    pub dx: i32,
    pub dy: i32,
}

impl ScatterRoll {
    /// Compact arrow notation for the combat log, e.g. "<2 ^3"
    pub fn symbol(&self) -> String {
        let mut parts = Vec::new();
        if self.dx < 0 {
            parts.push(format!("<{}", -self.dx));
        } else if self.dx > 0 {
            parts.push(format!(">{}", self.dx));
        }
        if self.dy < 0 {
            parts.push(format!("^{}", -self.dy));
        } else if self.dy > 0 {
            parts.push(format!("v{}", self.dy));
        }
        if parts.is_empty() {
            "on target".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Resolve both shift axes from raw dice and the incoming arc
pub fn resolve_scatter(kind: AttackKind, red: u8, blue: u8, arc: Arc) -> ScatterRoll {
    let red_biased = clamp_die(red as i32 + arc_bias(arc));
    ScatterRoll {
        red,
        red_biased,
        blue,
        dx: horizontal_shift(kind, red_biased),
        dy: vertical_shift(kind, blue),
    }
}
