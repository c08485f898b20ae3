//! Per-Knight hit-location grid
//!
//! A sparse lattice of armored cells grouped into 8 component groups.
//! Cell ids read like map references: row letter (top to bottom) plus
//! 1-based column.

use serde::{Deserialize, Serialize};

/// The eight component groups a cell can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentGroup {
    /// Carapace weapon mounting; critical disables carapace weapons
    CarapaceMount,
    /// Structural carapace, no mechanical effect
    Carapace,
    /// Arm structure; both cells of one side critical disables that arm's weapons
    Arm,
    /// Shield projector; critical revokes the shield permanently
    ShieldGenerator,
    /// Command head; critical caps action points
    Head,
    /// Torso weapon mounting; critical disables torso weapons
    TorsoMount,
    /// Structural torso, no mechanical effect
    Torso,
    /// Locomotion; each critical adds a cumulative movement penalty
    Legs,
}

impl ComponentGroup {
    pub fn all() -> [ComponentGroup; 8] {
        [
            ComponentGroup::CarapaceMount,
            ComponentGroup::Carapace,
            ComponentGroup::Arm,
            ComponentGroup::ShieldGenerator,
            ComponentGroup::Head,
            ComponentGroup::TorsoMount,
            ComponentGroup::Torso,
            ComponentGroup::Legs,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComponentGroup::CarapaceMount => "carapace mount",
            ComponentGroup::Carapace => "carapace",
            ComponentGroup::Arm => "arm",
            ComponentGroup::ShieldGenerator => "shield generator",
            ComponentGroup::Head => "head",
            ComponentGroup::TorsoMount => "torso mount",
            ComponentGroup::Torso => "torso",
            ComponentGroup::Legs => "legs",
        }
    }
}

/// Static description of one cell, part of a chassis grid template
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellTemplate {
    pub x: i32,
    pub y: i32,
    pub group: ComponentGroup,
    pub max_armor: i32,
}

/// Chassis-level grid template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridTemplate {
    pub cells: Vec<CellTemplate>,
}

/// One live hit location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub group: ComponentGroup,
    pub armor: i32,
    pub max_armor: i32,
    /// Sticky: set exactly once when armor reaches zero
    pub critical: bool,
}

/// Cell id from lattice coordinates: row letter + 1-based column
pub fn cell_id(x: i32, y: i32) -> String {
    let letter = (b'A' + (y as u8)) as char;
    format!("{}{}", letter, x + 1)
}

/// A Knight's instantiated location grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationGrid {
    pub cells: Vec<Cell>,
    /// Lattice bounding box, inclusive
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
    /// Vertical midline separating left-side from right-side arm cells
    pub midline_x: f32,
}

impl LocationGrid {
    /// Materialize cells from a template
    pub fn instantiate(template: &GridTemplate) -> Self {
        let cells: Vec<Cell> = template
            .cells
            .iter()
            .map(|t| Cell {
                id: cell_id(t.x, t.y),
                x: t.x,
                y: t.y,
                group: t.group,
                armor: t.max_armor,
                max_armor: t.max_armor,
                critical: false,
            })
            .collect();

        let min_x = cells.iter().map(|c| c.x).min().unwrap_or(0);
        let min_y = cells.iter().map(|c| c.y).min().unwrap_or(0);
        let max_x = cells.iter().map(|c| c.x).max().unwrap_or(0);
        let max_y = cells.iter().map(|c| c.y).max().unwrap_or(0);

        Self {
            cells,
            min_x,
            min_y,
            max_x,
            max_y,
            midline_x: (min_x + max_x) as f32 / 2.0,
        }
    }

    pub fn cell(&self, id: &str) -> Option<&Cell> {
        self.cells.iter().find(|c| c.id == id)
    }

    pub fn cell_mut(&mut self, id: &str) -> Option<&mut Cell> {
        self.cells.iter_mut().find(|c| c.id == id)
    }

    pub fn cell_at(&self, x: i32, y: i32) -> Option<&Cell> {
        self.cells.iter().find(|c| c.x == x && c.y == y)
    }

    /// Is a lattice coordinate inside the grid's bounding box?
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn critical_count(&self) -> usize {
        self.cells.iter().filter(|c| c.critical).count()
    }

    /// Arm-group cells on the left side of the midline
    pub fn left_arm_cells(&self) -> Vec<&Cell> {
        self.cells
            .iter()
            .filter(|c| c.group == ComponentGroup::Arm && (c.x as f32) < self.midline_x)
            .collect()
    }

    /// Arm-group cells on the right side of the midline
    pub fn right_arm_cells(&self) -> Vec<&Cell> {
        self.cells
            .iter()
            .filter(|c| c.group == ComponentGroup::Arm && (c.x as f32) > self.midline_x)
            .collect()
    }
}
