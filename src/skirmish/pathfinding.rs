//! Breadth-first pathfinding on the battlefield lattice
//!
//! The lattice is the integer sublattice of the continuous battlefield,
//! 4-connected with uniform step cost.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;
use crate::skirmish::terrain::{Rect, TerrainPiece};

/// Integer lattice cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Nearest lattice cell to a continuous position
    pub fn from_vec2(v: Vec2) -> Self {
        Self { x: v.x.round() as i32, y: v.y.round() as i32 }
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    fn neighbors(self) -> [GridCoord; 4] {
        [
            GridCoord::new(self.x, self.y - 1),
            GridCoord::new(self.x + 1, self.y),
            GridCoord::new(self.x, self.y + 1),
            GridCoord::new(self.x - 1, self.y),
        ]
    }
}

/// Is this lattice cell impassable?
///
/// Blocked outside the board bounds or inside any terrain rectangle
/// (half-open interval test on both axes).
pub fn is_blocked(coord: GridCoord, bounds: &Rect, pieces: &[TerrainPiece]) -> bool {
    let px = coord.x as f32;
    let py = coord.y as f32;

    if !bounds.contains(px, py) {
        return true;
    }

    pieces.iter().any(|p| p.covers_point(px, py))
}

/// Breadth-first search from start to goal, inclusive of both endpoints.
///
/// Returns None when either endpoint is blocked or no route exists.
pub fn find_path(
    start: GridCoord,
    goal: GridCoord,
    bounds: &Rect,
    pieces: &[TerrainPiece],
) -> Option<Vec<GridCoord>> {
    if is_blocked(start, bounds, pieces) || is_blocked(goal, bounds, pieces) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let mut frontier = VecDeque::new();
    let mut came_from: HashMap<GridCoord, GridCoord> = HashMap::new();
    let mut seen: HashSet<GridCoord> = HashSet::new();

    frontier.push_back(start);
    seen.insert(start);

    while let Some(current) = frontier.pop_front() {
        for neighbor in current.neighbors() {
            if seen.contains(&neighbor) || is_blocked(neighbor, bounds, pieces) {
                continue;
            }
            came_from.insert(neighbor, current);
            if neighbor == goal {
                return Some(reconstruct_path(&came_from, neighbor));
            }
            seen.insert(neighbor);
            frontier.push_back(neighbor);
        }
    }

    None
}

fn reconstruct_path(came_from: &HashMap<GridCoord, GridCoord>, mut current: GridCoord) -> Vec<GridCoord> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
