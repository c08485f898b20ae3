//! Knight state and the critical-damage model
//!
//! Damage lands on grid cells; a cell reaching zero armor goes critical
//! exactly once and fires a group-specific effect on the owning Knight.

use serde::{Deserialize, Serialize};

use crate::skirmish::constants::{
    ARM_GROUP_MIN_CELLS, DESTROYED_CRITICAL_THRESHOLD, HEAD_CRITICAL_AP_CAP,
    LEG_CRITICAL_MOVE_PENALTY,
};
use crate::skirmish::facing::Arc;
use crate::skirmish::grid::{ComponentGroup, GridTemplate, LocationGrid};
use crate::skirmish::weapons::MountLocation;

/// A weapon bolted onto a Knight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountedWeapon {
    /// Catalog key, possibly range-banded
    pub name: String,
    pub mount: MountLocation,
    /// Sticky: set by critical-damage cascades
    pub disabled: bool,
}

impl MountedWeapon {
    pub fn new(name: impl Into<String>, mount: MountLocation) -> Self {
        Self { name: name.into(), mount, disabled: false }
    }
}

/// What applying damage to a cell actually did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageOutcome {
    pub cell_id: String,
    pub remaining_armor: i32,
    /// The cell crossed into critical on this application
    pub went_critical: bool,
    pub group: ComponentGroup,
}

/// One player-controlled combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Knight {
    pub name: String,
    pub grid: LocationGrid,
    /// Can be permanently lowered by a head critical
    pub max_action_points: u8,
    /// Cumulative distance-unit penalty on all movement
    pub movement_penalty: f32,
    /// Capability flag for the shield save; revoked by a generator critical
    pub shield_intact: bool,
    /// Arc the shield currently protects
    pub shield_arc: Arc,
    pub weapons: Vec<MountedWeapon>,
}

impl Knight {
    pub fn new(name: impl Into<String>, template: &GridTemplate, action_points: u8) -> Self {
        Self {
            name: name.into(),
            grid: LocationGrid::instantiate(template),
            max_action_points: action_points,
            movement_penalty: 0.0,
            shield_intact: true,
            shield_arc: Arc::Front,
            weapons: Vec::new(),
        }
    }

    pub fn with_weapons(mut self, weapons: Vec<MountedWeapon>) -> Self {
        self.weapons = weapons;
        self
    }

    /// Destroyed once enough cells have gone critical, whatever their groups
    pub fn is_destroyed(&self) -> bool {
        self.grid.critical_count() >= DESTROYED_CRITICAL_THRESHOLD
    }

    /// Non-disabled weapons, in mount order
    pub fn active_weapons(&self) -> impl Iterator<Item = &MountedWeapon> {
        self.weapons.iter().filter(|w| !w.disabled)
    }

    /// Apply damage to a cell by id.
    ///
    /// A cell that is already critical absorbs nothing and triggers
    /// nothing; the first transition to zero armor marks it critical and
    /// fires the group effect exactly once.
    pub fn apply_damage(&mut self, cell_id: &str, amount: i32) -> Option<DamageOutcome> {
        let cell = self.grid.cell_mut(cell_id)?;
        if cell.critical {
            return Some(DamageOutcome {
                cell_id: cell.id.clone(),
                remaining_armor: cell.armor,
                went_critical: false,
                group: cell.group,
            });
        }

        cell.armor = (cell.armor - amount.max(0)).max(0);
        let went_critical = cell.armor == 0;
        if went_critical {
            cell.critical = true;
        }

        let outcome = DamageOutcome {
            cell_id: cell.id.clone(),
            remaining_armor: cell.armor,
            went_critical,
            group: cell.group,
        };

        if went_critical {
            tracing::debug!(
                knight = %self.name,
                cell = %outcome.cell_id,
                group = outcome.group.label(),
                "critical damage"
            );
            self.trigger_critical_effect(outcome.group);
        }

        Some(outcome)
    }

    /// Group-specific side effect fired once per critical cell
    fn trigger_critical_effect(&mut self, group: ComponentGroup) {
        match group {
            ComponentGroup::CarapaceMount => self.disable_mount(MountLocation::Carapace),
            ComponentGroup::TorsoMount => self.disable_mount(MountLocation::Torso),
            ComponentGroup::ShieldGenerator => self.shield_intact = false,
            ComponentGroup::Head => {
                self.max_action_points = self.max_action_points.min(HEAD_CRITICAL_AP_CAP);
            }
            ComponentGroup::Legs => self.movement_penalty += LEG_CRITICAL_MOVE_PENALTY,
            ComponentGroup::Arm => self.recompute_arm_disables(),
            // Structural groups carry no mechanical effect
            ComponentGroup::Carapace | ComponentGroup::Torso => {}
        }
    }

    /// Re-evaluated after every arm-group critical: only once every arm
    /// cell on one side is critical do that side's weapons go dead.
    fn recompute_arm_disables(&mut self) {
        let left = self.grid.left_arm_cells();
        let left_dead = left.len() >= ARM_GROUP_MIN_CELLS && left.iter().all(|c| c.critical);
        let right = self.grid.right_arm_cells();
        let right_dead = right.len() >= ARM_GROUP_MIN_CELLS && right.iter().all(|c| c.critical);

        if left_dead {
            self.disable_mount(MountLocation::LeftArm);
        }
        if right_dead {
            self.disable_mount(MountLocation::RightArm);
        }
    }

    fn disable_mount(&mut self, mount: MountLocation) {
        for weapon in self.weapons.iter_mut().filter(|w| w.mount == mount) {
            weapon.disabled = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skirmish::grid::CellTemplate;

    fn template() -> GridTemplate {
        GridTemplate {
            cells: vec![
                CellTemplate { x: 1, y: 0, group: ComponentGroup::Head, max_armor: 1 },
                CellTemplate { x: 2, y: 0, group: ComponentGroup::CarapaceMount, max_armor: 2 },
                CellTemplate { x: 0, y: 1, group: ComponentGroup::Arm, max_armor: 2 },
                CellTemplate { x: 0, y: 2, group: ComponentGroup::Arm, max_armor: 2 },
                CellTemplate { x: 4, y: 1, group: ComponentGroup::Arm, max_armor: 2 },
                CellTemplate { x: 4, y: 2, group: ComponentGroup::Arm, max_armor: 2 },
                CellTemplate { x: 2, y: 1, group: ComponentGroup::ShieldGenerator, max_armor: 2 },
                CellTemplate { x: 2, y: 2, group: ComponentGroup::TorsoMount, max_armor: 2 },
                CellTemplate { x: 1, y: 3, group: ComponentGroup::Torso, max_armor: 3 },
                CellTemplate { x: 2, y: 3, group: ComponentGroup::Torso, max_armor: 3 },
                CellTemplate { x: 2, y: 4, group: ComponentGroup::Legs, max_armor: 3 },
                CellTemplate { x: 1, y: 4, group: ComponentGroup::Legs, max_armor: 3 },
            ],
        }
    }

    fn knight() -> Knight {
        Knight::new("Test Knight", &template(), 6).with_weapons(vec![
            MountedWeapon::new("cannon", MountLocation::Carapace),
            MountedWeapon::new("blade", MountLocation::LeftArm),
            MountedWeapon::new("fist", MountLocation::LeftArm),
            MountedWeapon::new("gun", MountLocation::RightArm),
            MountedWeapon::new("bolt", MountLocation::Torso),
        ])
    }

    #[test]
    fn test_damage_floors_at_zero() {
        let mut k = knight();
        let outcome = k.apply_damage("D2", 99).unwrap();
        assert_eq!(outcome.remaining_armor, 0);
        assert!(outcome.went_critical);
    }

    #[test]
    fn test_partial_damage_not_critical() {
        let mut k = knight();
        let outcome = k.apply_damage("D2", 1).unwrap();
        assert_eq!(outcome.remaining_armor, 2);
        assert!(!outcome.went_critical);
    }

    #[test]
    fn test_critical_is_idempotent() {
        let mut k = knight();
        k.apply_damage("E3", 3);
        assert_eq!(k.movement_penalty, 1.0);

        // Further damage to the dead cell changes nothing
        let outcome = k.apply_damage("E3", 5).unwrap();
        assert!(!outcome.went_critical);
        assert_eq!(outcome.remaining_armor, 0);
        assert_eq!(k.movement_penalty, 1.0);
    }

    #[test]
    fn test_unknown_cell_is_none() {
        let mut k = knight();
        assert!(k.apply_damage("Z9", 3).is_none());
    }

    #[test]
    fn test_carapace_critical_disables_carapace_weapons() {
        let mut k = knight();
        k.apply_damage("A3", 2);
        assert!(k.weapons.iter().find(|w| w.name == "cannon").unwrap().disabled);
        assert!(!k.weapons.iter().find(|w| w.name == "bolt").unwrap().disabled);
    }

    #[test]
    fn test_torso_mount_critical_disables_torso_weapons() {
        let mut k = knight();
        k.apply_damage("C3", 2);
        assert!(k.weapons.iter().find(|w| w.name == "bolt").unwrap().disabled);
    }

    #[test]
    fn test_shield_generator_critical_revokes_shield() {
        let mut k = knight();
        assert!(k.shield_intact);
        k.apply_damage("B3", 2);
        assert!(!k.shield_intact);
    }

    #[test]
    fn test_head_critical_caps_action_points() {
        let mut k = knight();
        k.apply_damage("A2", 1);
        assert_eq!(k.max_action_points, 2);

        // Cap never raises a lower value
        let mut low = knight();
        low.max_action_points = 1;
        low.apply_damage("A2", 1);
        assert_eq!(low.max_action_points, 1);
    }

    #[test]
    fn test_leg_criticals_stack_without_cap() {
        let mut k = knight();
        k.apply_damage("E3", 3);
        k.apply_damage("E2", 3);
        assert_eq!(k.movement_penalty, 2.0);
    }

    #[test]
    fn test_one_arm_cell_keeps_weapons_alive() {
        let mut k = knight();
        k.apply_damage("B1", 2);
        assert!(!k.weapons.iter().find(|w| w.name == "blade").unwrap().disabled);
    }

    #[test]
    fn test_both_left_arm_cells_disable_left_weapons() {
        let mut k = knight();
        k.apply_damage("B1", 2);
        k.apply_damage("C1", 2);
        assert!(k.weapons.iter().find(|w| w.name == "blade").unwrap().disabled);
        assert!(k.weapons.iter().find(|w| w.name == "fist").unwrap().disabled);
        // Right arm untouched
        assert!(!k.weapons.iter().find(|w| w.name == "gun").unwrap().disabled);
    }

    #[test]
    fn test_destroyed_at_six_criticals() {
        let mut k = knight();
        for id in ["A2", "A3", "B1", "C1", "B5", "C5"] {
            k.apply_damage(id, 99);
        }
        assert_eq!(k.grid.critical_count(), 6);
        assert!(k.is_destroyed());
    }

    #[test]
    fn test_not_destroyed_at_five_criticals() {
        let mut k = knight();
        for id in ["A2", "A3", "B1", "C1", "B5"] {
            k.apply_damage(id, 99);
        }
        assert_eq!(k.grid.critical_count(), 5);
        assert!(!k.is_destroyed());
    }
}
