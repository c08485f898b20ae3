//! Weapon profiles and mounts
//!
//! Profiles are immutable catalog entries; mounts carry the firing-arc
//! capability table.

use serde::{Deserialize, Serialize};

use crate::skirmish::facing::Arc;

/// Where a weapon is bolted onto the chassis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MountLocation {
    /// Top mount, full rotation
    Carapace,
    Torso,
    LeftArm,
    RightArm,
    Other,
}

impl MountLocation {
    /// Firing-arc capability table (fixed)
    pub fn covers(&self, arc: Arc) -> bool {
        match self {
            MountLocation::Carapace | MountLocation::Other => true,
            MountLocation::Torso => arc == Arc::Front,
            MountLocation::LeftArm => matches!(arc, Arc::Front | Arc::Left),
            MountLocation::RightArm => matches!(arc, Arc::Front | Arc::Right),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MountLocation::Carapace => "carapace",
            MountLocation::Torso => "torso",
            MountLocation::LeftArm => "left arm",
            MountLocation::RightArm => "right arm",
            MountLocation::Other => "auxiliary",
        }
    }
}

/// Damage dealt by a single hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSpec {
    Flat(i32),
    D6,
    /// Derived from a halved d6 roll (rounded up), not an independent die
    D3,
}

/// Optional weapon capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponAbility {
    /// May fire through hard cover at snap-shot precision
    IndirectFire,
}

/// Shot precision; drives scatter-table selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    /// Cheapest and loosest
    Snap,
    Standard,
    /// Most expensive and tightest
    Aimed,
}

impl AttackKind {
    pub fn label(&self) -> &'static str {
        match self {
            AttackKind::Snap => "snap",
            AttackKind::Standard => "standard",
            AttackKind::Aimed => "aimed",
        }
    }
}

/// Immutable weapon catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub name: String,
    /// Maximum range in distance units
    pub range: f32,
    /// Signed armor-save modifier; negative makes the save harder
    pub armor_pen: i32,
    pub damage: DamageSpec,
    /// True for ranged weapons subject to scatter; false for melee
    pub scatter: bool,
    pub abilities: Vec<WeaponAbility>,
}

impl WeaponProfile {
    pub fn has_ability(&self, ability: WeaponAbility) -> bool {
        self.abilities.contains(&ability)
    }

    pub fn is_melee(&self) -> bool {
        !self.scatter
    }
}
