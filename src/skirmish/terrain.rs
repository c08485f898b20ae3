//! Terrain pieces and line of sight
//!
//! Obstacles are unions of axis-aligned rectangles. LOS is a parametric
//! segment clip against every rectangle of every piece.

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;

/// Axis-aligned rectangle, origin at the min corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Half-open containment test: [x, x+w) on both axes
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }
}

/// How a piece interacts with fire lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Hard cover: fully blocks line of sight
    Blocking,
    /// Soft cover: shots pass but the target gains a save bonus
    Obscuring,
}

/// One obstacle on the battlefield, possibly L-shaped (multiple rects)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainPiece {
    pub id: String,
    pub kind: TerrainKind,
    pub rects: Vec<Rect>,
}

impl TerrainPiece {
    pub fn new(id: impl Into<String>, kind: TerrainKind, rects: Vec<Rect>) -> Self {
        Self { id: id.into(), kind, rects }
    }

    /// Does the given lattice point fall inside this piece?
    pub fn covers_point(&self, px: f32, py: f32) -> bool {
        self.rects.iter().any(|r| r.contains(px, py))
    }
}

/// Line-of-sight classification between two points
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LosResult {
    /// A blocking piece sits on the segment
    pub blocked: bool,
    /// An obscuring piece sits on the segment (and nothing blocks)
    pub obscured: bool,
    /// Any piece of either kind is crossed (melee cannot reach across this)
    pub crosses_cover: bool,
}

/// Liang-Barsky entry parameter of a segment against a rectangle.
///
/// Returns t in [0, 1] where the segment first enters the rect, or None
/// if the segment misses it entirely. A segment starting inside yields 0.
pub fn segment_entry(a: Vec2, b: Vec2, rect: &Rect) -> Option<f32> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;

    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    let clips = [
        (-dx, a.x - rect.x),
        (dx, rect.x + rect.w - a.x),
        (-dy, a.y - rect.y),
        (dy, rect.y + rect.h - a.y),
    ];

    for (p, q) in clips {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let t = q / p;
            if p < 0.0 {
                if t > t1 {
                    return None;
                }
                if t > t0 {
                    t0 = t;
                }
            } else {
                if t < t0 {
                    return None;
                }
                if t < t1 {
                    t1 = t;
                }
            }
        }
    }

    Some(t0)
}

/// Classify line of sight from `a` to `b` across all terrain.
///
/// Hard cover wins outright: once any blocking piece intersects the
/// segment, the result is blocked and never obscured, regardless of
/// crossing order.
pub fn line_of_sight(a: Vec2, b: Vec2, pieces: &[TerrainPiece]) -> LosResult {
    let mut result = LosResult::default();

    for piece in pieces {
        let crossed = piece.rects.iter().any(|r| segment_entry(a, b, r).is_some());
        if !crossed {
            continue;
        }
        result.crosses_cover = true;
        match piece.kind {
            TerrainKind::Blocking => {
                result.blocked = true;
                result.obscured = false;
                return result;
            }
            TerrainKind::Obscuring => {
                result.obscured = true;
            }
        }
    }

    result
}

/// Earliest obstacle-entry parameter along a -> b across all rectangles.
///
/// None when the segment crosses no terrain at all.
pub fn earliest_obstacle_enter(a: Vec2, b: Vec2, pieces: &[TerrainPiece]) -> Option<f32> {
    pieces
        .iter()
        .flat_map(|p| p.rects.iter())
        .filter_map(|r| segment_entry(a, b, r))
        .min_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal))
}
