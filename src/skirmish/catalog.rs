//! Static content registries
//!
//! Catalogs are explicitly constructed and passed into the resolver;
//! nothing here is a global. Construction validates everything up front
//! and rejects the whole catalog on the first malformed entry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::error::{KnightfallError, Result};
use crate::skirmish::grid::GridTemplate;
use crate::skirmish::terrain::TerrainPiece;
use crate::skirmish::weapons::{MountLocation, WeaponProfile};

/// One rung of a range-banded weapon: use `profile` out to `max_range`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeBand {
    pub profile: String,
    pub max_range: f32,
}

/// Validated weapon registry plus range-band indirection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponCatalog {
    profiles: HashMap<String, WeaponProfile>,
    /// Equipped name -> ascending bands
    bands: HashMap<String, Vec<RangeBand>>,
}

impl WeaponCatalog {
    pub fn new(
        profiles: Vec<WeaponProfile>,
        bands: HashMap<String, Vec<RangeBand>>,
    ) -> Result<Self> {
        let mut by_name = HashMap::new();
        for profile in profiles {
            if profile.name.is_empty() {
                return Err(content_err("weapons", "profile with empty name"));
            }
            if !profile.range.is_finite() || profile.range < 0.0 {
                return Err(content_err(
                    "weapons",
                    format!("'{}': range must be a non-negative number", profile.name),
                ));
            }
            if by_name.insert(profile.name.clone(), profile.clone()).is_some() {
                return Err(content_err(
                    "weapons",
                    format!("duplicate profile '{}'", profile.name),
                ));
            }
        }

        for (equipped, rungs) in &bands {
            if rungs.is_empty() {
                return Err(content_err(
                    "weapons",
                    format!("range bands for '{equipped}' are empty"),
                ));
            }
            let mut last = f32::NEG_INFINITY;
            for rung in rungs {
                if !by_name.contains_key(&rung.profile) {
                    return Err(content_err(
                        "weapons",
                        format!("band for '{}' names unknown profile '{}'", equipped, rung.profile),
                    ));
                }
                if rung.max_range <= last {
                    return Err(content_err(
                        "weapons",
                        format!("bands for '{equipped}' must ascend by max_range"),
                    ));
                }
                last = rung.max_range;
            }
        }

        Ok(Self { profiles: by_name, bands })
    }

    /// Is this key usable as an equipped weapon name?
    pub fn knows(&self, equipped: &str) -> bool {
        self.bands.contains_key(equipped) || self.profiles.contains_key(equipped)
    }

    /// Resolve an equipped name at a measured range.
    ///
    /// Banded names pick the first rung whose max_range covers the
    /// measurement; beyond the last rung the weapon has no profile.
    /// Unbanded names fall back to a direct catalog lookup.
    pub fn resolve(&self, equipped: &str, measured_range: f32) -> Option<&WeaponProfile> {
        if let Some(rungs) = self.bands.get(equipped) {
            return rungs
                .iter()
                .find(|r| r.max_range >= measured_range)
                .and_then(|r| self.profiles.get(&r.profile));
        }
        self.profiles.get(equipped)
    }

    pub fn profile(&self, name: &str) -> Option<&WeaponProfile> {
        self.profiles.get(name)
    }
}

/// Movement profile and grid template for one chassis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChassisProfile {
    pub id: String,
    pub name: String,
    /// Advance-move allowance in distance units
    pub advance: f32,
    /// Charge-move allowance in distance units
    pub charge: f32,
    /// Number of d6 rolled for a run move
    pub run_dice: u8,
    pub action_points: u8,
    pub grid: GridTemplate,
}

/// Validated chassis registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChassisCatalog {
    chassis: HashMap<String, ChassisProfile>,
}

impl ChassisCatalog {
    pub fn new(profiles: Vec<ChassisProfile>) -> Result<Self> {
        let mut chassis = HashMap::new();
        for profile in profiles {
            if profile.id.is_empty() {
                return Err(content_err("chassis", "chassis with empty id"));
            }
            if profile.grid.cells.is_empty() {
                return Err(content_err(
                    "chassis",
                    format!("'{}': grid template has no cells", profile.id),
                ));
            }
            if profile.advance <= 0.0 || profile.charge <= 0.0 {
                return Err(content_err(
                    "chassis",
                    format!("'{}': movement allowances must be positive", profile.id),
                ));
            }
            if profile.run_dice == 0 {
                return Err(content_err(
                    "chassis",
                    format!("'{}': run_dice must be at least 1", profile.id),
                ));
            }
            if chassis.insert(profile.id.clone(), profile).is_some() {
                return Err(content_err("chassis", "duplicate chassis id"));
            }
        }
        Ok(Self { chassis })
    }

    pub fn get(&self, id: &str) -> Result<&ChassisProfile> {
        self.chassis
            .get(id)
            .ok_or_else(|| KnightfallError::UnknownChassis(id.to_string()))
    }
}

/// Named battlefield layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPreset {
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub pieces: Vec<TerrainPiece>,
}

/// Named weapon bundle: mount slot -> equipped catalog key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadoutOption {
    pub name: String,
    pub mounts: Vec<(MountLocation, String)>,
}

/// Everything the resolver consumes read-only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentLibrary {
    pub weapons: WeaponCatalog,
    pub chassis: ChassisCatalog,
    pub maps: HashMap<String, MapPreset>,
    pub loadouts: HashMap<String, LoadoutOption>,
}

impl ContentLibrary {
    pub fn map(&self, name: &str) -> Result<&MapPreset> {
        self.maps
            .get(name)
            .ok_or_else(|| KnightfallError::UnknownMap(name.to_string()))
    }

    pub fn loadout(&self, name: &str) -> Result<&LoadoutOption> {
        self.loadouts
            .get(name)
            .ok_or_else(|| KnightfallError::UnknownLoadout(name.to_string()))
    }

    /// Assemble a Knight from a chassis and a named loadout.
    ///
    /// Every loadout key must be resolvable by the weapon catalog,
    /// either directly or through a range band.
    pub fn build_knight(
        &self,
        name: impl Into<String>,
        chassis_id: &str,
        loadout_name: &str,
    ) -> Result<crate::skirmish::knight::Knight> {
        use crate::skirmish::knight::{Knight, MountedWeapon};

        let chassis = self.chassis.get(chassis_id)?;
        let loadout = self.loadout(loadout_name)?;

        let mut weapons = Vec::new();
        for (mount, key) in &loadout.mounts {
            if !self.weapons.knows(key) {
                return Err(KnightfallError::UnknownWeapon(key.clone()));
            }
            weapons.push(MountedWeapon::new(key.clone(), *mount));
        }

        Ok(Knight::new(name, &chassis.grid, chassis.action_points).with_weapons(weapons))
    }
}

fn content_err(file: &str, message: impl Into<String>) -> KnightfallError {
    KnightfallError::Content { file: file.to_string(), message: message.into() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skirmish::weapons::DamageSpec;

    fn profile(name: &str, range: f32) -> WeaponProfile {
        WeaponProfile {
            name: name.into(),
            range,
            armor_pen: 0,
            damage: DamageSpec::Flat(1),
            scatter: true,
            abilities: vec![],
        }
    }

    #[test]
    fn test_direct_lookup_ignores_range() {
        let catalog = WeaponCatalog::new(vec![profile("gun", 20.0)], HashMap::new()).unwrap();
        assert_eq!(catalog.resolve("gun", 5.0).unwrap().name, "gun");
        // Range gating happens at the firing gate, not in the lookup
        assert_eq!(catalog.resolve("gun", 50.0).unwrap().name, "gun");
    }

    #[test]
    fn test_banded_lookup_picks_first_covering_rung() {
        let mut bands = HashMap::new();
        bands.insert(
            "combi".to_string(),
            vec![
                RangeBand { profile: "combi-short".into(), max_range: 12.0 },
                RangeBand { profile: "combi-long".into(), max_range: 30.0 },
            ],
        );
        let catalog = WeaponCatalog::new(
            vec![profile("combi-short", 12.0), profile("combi-long", 30.0)],
            bands,
        )
        .unwrap();

        assert_eq!(catalog.resolve("combi", 8.0).unwrap().name, "combi-short");
        assert_eq!(catalog.resolve("combi", 12.0).unwrap().name, "combi-short");
        assert_eq!(catalog.resolve("combi", 20.0).unwrap().name, "combi-long");
        assert!(catalog.resolve("combi", 31.0).is_none());
    }

    #[test]
    fn test_unknown_name_resolves_to_none() {
        let catalog = WeaponCatalog::new(vec![profile("gun", 20.0)], HashMap::new()).unwrap();
        assert!(catalog.resolve("ghost", 5.0).is_none());
        assert!(!catalog.knows("ghost"));
    }

    #[test]
    fn test_duplicate_profile_rejected() {
        let result = WeaponCatalog::new(
            vec![profile("gun", 20.0), profile("gun", 10.0)],
            HashMap::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_band_to_unknown_profile_rejected() {
        let mut bands = HashMap::new();
        bands.insert(
            "combi".to_string(),
            vec![RangeBand { profile: "missing".into(), max_range: 10.0 }],
        );
        assert!(WeaponCatalog::new(vec![profile("gun", 20.0)], bands).is_err());
    }

    #[test]
    fn test_unordered_bands_rejected() {
        let mut bands = HashMap::new();
        bands.insert(
            "combi".to_string(),
            vec![
                RangeBand { profile: "a".into(), max_range: 30.0 },
                RangeBand { profile: "b".into(), max_range: 12.0 },
            ],
        );
        assert!(WeaponCatalog::new(vec![profile("a", 30.0), profile("b", 12.0)], bands).is_err());
    }

    #[test]
    fn test_negative_range_rejected() {
        assert!(WeaponCatalog::new(vec![profile("gun", -1.0)], HashMap::new()).is_err());
    }

    #[test]
    fn test_chassis_validation() {
        use crate::skirmish::grid::{CellTemplate, ComponentGroup};

        let good = ChassisProfile {
            id: "paladin".into(),
            name: "Paladin".into(),
            advance: 8.0,
            charge: 12.0,
            run_dice: 2,
            action_points: 6,
            grid: GridTemplate {
                cells: vec![CellTemplate {
                    x: 0,
                    y: 0,
                    group: ComponentGroup::Torso,
                    max_armor: 3,
                }],
            },
        };
        assert!(ChassisCatalog::new(vec![good.clone()]).is_ok());

        let mut empty_grid = good.clone();
        empty_grid.id = "broken".into();
        empty_grid.grid = GridTemplate::default();
        assert!(ChassisCatalog::new(vec![empty_grid]).is_err());

        let mut no_move = good;
        no_move.id = "stuck".into();
        no_move.advance = 0.0;
        assert!(ChassisCatalog::new(vec![no_move]).is_err());
    }
}
