//! Load game content from TOML files
//!
//! Content is fatal-on-error: a single malformed entry rejects the
//! whole library at startup. Parse functions take raw strings so tests
//! can feed them inline documents.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::core::error::{KnightfallError, Result};
use crate::skirmish::catalog::{
    ChassisCatalog, ChassisProfile, ContentLibrary, LoadoutOption, MapPreset, RangeBand,
    WeaponCatalog,
};
use crate::skirmish::grid::{CellTemplate, ComponentGroup, GridTemplate};
use crate::skirmish::terrain::{Rect, TerrainKind, TerrainPiece};
use crate::skirmish::weapons::{DamageSpec, MountLocation, WeaponAbility, WeaponProfile};

/// Load the complete content library from a data directory
pub fn load_content(dir: &Path) -> Result<ContentLibrary> {
    let weapons = parse_weapons(&read(dir, "weapons.toml")?)?;
    let chassis = parse_chassis(&read(dir, "chassis.toml")?)?;
    let maps = parse_maps(&read(dir, "maps.toml")?)?;
    let loadouts = parse_loadouts(&read(dir, "loadouts.toml")?)?;

    Ok(ContentLibrary { weapons, chassis, maps, loadouts })
}

fn read(dir: &Path, file: &str) -> Result<String> {
    fs::read_to_string(dir.join(file))
        .map_err(|e| content_err(file, format!("failed to read: {e}")))
}

fn content_err(file: &str, message: impl Into<String>) -> KnightfallError {
    KnightfallError::Content { file: file.to_string(), message: message.into() }
}

/// Parse weapons.toml: `[[weapon]]` profiles and `[[band]]` rules
pub fn parse_weapons(content: &str) -> Result<WeaponCatalog> {
    let toml: toml::Value = content
        .parse()
        .map_err(|e| content_err("weapons.toml", format!("invalid TOML: {e}")))?;

    let mut profiles = Vec::new();
    if let Some(entries) = toml.get("weapon").and_then(|v| v.as_array()) {
        for entry in entries {
            profiles.push(parse_weapon_profile(entry)?);
        }
    }

    let mut bands: HashMap<String, Vec<RangeBand>> = HashMap::new();
    if let Some(entries) = toml.get("band").and_then(|v| v.as_array()) {
        for entry in entries {
            let equipped = require_str(entry, "equipped", "weapons.toml")?;
            let rungs = entry
                .get("profiles")
                .and_then(|v| v.as_array())
                .ok_or_else(|| {
                    content_err("weapons.toml", format!("band '{equipped}' missing profiles"))
                })?;
            let mut parsed = Vec::new();
            for rung in rungs {
                parsed.push(RangeBand {
                    profile: require_str(rung, "profile", "weapons.toml")?,
                    max_range: require_f32(rung, "max_range", "weapons.toml")?,
                });
            }
            bands.insert(equipped, parsed);
        }
    }

    WeaponCatalog::new(profiles, bands)
}

fn parse_weapon_profile(value: &toml::Value) -> Result<WeaponProfile> {
    let name = require_str(value, "name", "weapons.toml")?;
    let range = require_f32(value, "range", "weapons.toml")?;
    let armor_pen = value
        .get("armor_pen")
        .and_then(|v| v.as_integer())
        .ok_or_else(|| content_err("weapons.toml", format!("'{name}': missing armor_pen")))?
        as i32;

    let damage = match value.get("damage") {
        Some(toml::Value::Integer(n)) => DamageSpec::Flat(*n as i32),
        Some(toml::Value::String(s)) => match s.as_str() {
            "d6" => DamageSpec::D6,
            "d3" => DamageSpec::D3,
            other => {
                return Err(content_err(
                    "weapons.toml",
                    format!("'{name}': unknown damage formula '{other}'"),
                ))
            }
        },
        _ => {
            return Err(content_err(
                "weapons.toml",
                format!("'{name}': damage must be an integer or a dice formula"),
            ))
        }
    };

    let scatter = value
        .get("scatter")
        .and_then(|v| v.as_bool())
        .ok_or_else(|| content_err("weapons.toml", format!("'{name}': missing scatter flag")))?;

    let mut abilities = Vec::new();
    if let Some(list) = value.get("abilities").and_then(|v| v.as_array()) {
        for ability in list {
            match ability.as_str() {
                Some("indirect") => abilities.push(WeaponAbility::IndirectFire),
                other => {
                    return Err(content_err(
                        "weapons.toml",
                        format!("'{}': unknown ability '{:?}'", name, other),
                    ))
                }
            }
        }
    }

    Ok(WeaponProfile { name, range, armor_pen, damage, scatter, abilities })
}

/// Parse chassis.toml: `[[chassis]]` with nested `[[chassis.cell]]` grids
pub fn parse_chassis(content: &str) -> Result<ChassisCatalog> {
    let toml: toml::Value = content
        .parse()
        .map_err(|e| content_err("chassis.toml", format!("invalid TOML: {e}")))?;

    let mut profiles = Vec::new();
    if let Some(entries) = toml.get("chassis").and_then(|v| v.as_array()) {
        for entry in entries {
            let id = require_str(entry, "id", "chassis.toml")?;
            let name = require_str(entry, "name", "chassis.toml")?;
            let advance = require_f32(entry, "advance", "chassis.toml")?;
            let charge = require_f32(entry, "charge", "chassis.toml")?;
            let run_dice = entry
                .get("run_dice")
                .and_then(|v| v.as_integer())
                .ok_or_else(|| content_err("chassis.toml", format!("'{id}': missing run_dice")))?
                as u8;
            let action_points = entry
                .get("action_points")
                .and_then(|v| v.as_integer())
                .ok_or_else(|| {
                    content_err("chassis.toml", format!("'{id}': missing action_points"))
                })? as u8;

            let cells = entry
                .get("cell")
                .and_then(|v| v.as_array())
                .ok_or_else(|| content_err("chassis.toml", format!("'{id}': missing cells")))?;
            let mut templates = Vec::new();
            for cell in cells {
                templates.push(parse_cell(cell, &id)?);
            }

            profiles.push(ChassisProfile {
                id,
                name,
                advance,
                charge,
                run_dice,
                action_points,
                grid: GridTemplate { cells: templates },
            });
        }
    }

    ChassisCatalog::new(profiles)
}

fn parse_cell(value: &toml::Value, chassis_id: &str) -> Result<CellTemplate> {
    let x = value
        .get("x")
        .and_then(|v| v.as_integer())
        .ok_or_else(|| content_err("chassis.toml", format!("'{chassis_id}': cell missing x")))?
        as i32;
    let y = value
        .get("y")
        .and_then(|v| v.as_integer())
        .ok_or_else(|| content_err("chassis.toml", format!("'{chassis_id}': cell missing y")))?
        as i32;
    let group_str = value
        .get("group")
        .and_then(|v| v.as_str())
        .ok_or_else(|| content_err("chassis.toml", format!("'{chassis_id}': cell missing group")))?;
    let group = parse_group(group_str).ok_or_else(|| {
        content_err("chassis.toml", format!("'{chassis_id}': unknown group '{group_str}'"))
    })?;
    let max_armor = value
        .get("armor")
        .and_then(|v| v.as_integer())
        .ok_or_else(|| content_err("chassis.toml", format!("'{chassis_id}': cell missing armor")))?
        as i32;

    Ok(CellTemplate { x, y, group, max_armor })
}

fn parse_group(s: &str) -> Option<ComponentGroup> {
    match s {
        "carapace_mount" => Some(ComponentGroup::CarapaceMount),
        "carapace" => Some(ComponentGroup::Carapace),
        "arm" => Some(ComponentGroup::Arm),
        "shield_generator" => Some(ComponentGroup::ShieldGenerator),
        "head" => Some(ComponentGroup::Head),
        "torso_mount" => Some(ComponentGroup::TorsoMount),
        "torso" => Some(ComponentGroup::Torso),
        "legs" => Some(ComponentGroup::Legs),
        _ => None,
    }
}

/// Parse maps.toml: `[[map]]` presets with nested `[[map.piece]]` obstacles
pub fn parse_maps(content: &str) -> Result<HashMap<String, MapPreset>> {
    let toml: toml::Value = content
        .parse()
        .map_err(|e| content_err("maps.toml", format!("invalid TOML: {e}")))?;

    let mut maps = HashMap::new();
    if let Some(entries) = toml.get("map").and_then(|v| v.as_array()) {
        for entry in entries {
            let name = require_str(entry, "name", "maps.toml")?;
            let width = require_f32(entry, "width", "maps.toml")?;
            let height = require_f32(entry, "height", "maps.toml")?;

            let mut pieces = Vec::new();
            if let Some(list) = entry.get("piece").and_then(|v| v.as_array()) {
                for piece in list {
                    pieces.push(parse_piece(piece, &name)?);
                }
            }

            maps.insert(name.clone(), MapPreset { name, width, height, pieces });
        }
    }
    Ok(maps)
}

fn parse_piece(value: &toml::Value, map_name: &str) -> Result<TerrainPiece> {
    let id = require_str(value, "id", "maps.toml")?;
    let kind = match value.get("kind").and_then(|v| v.as_str()) {
        Some("blocking") => TerrainKind::Blocking,
        Some("obscuring") => TerrainKind::Obscuring,
        other => {
            return Err(content_err(
                "maps.toml",
                format!("'{}': piece '{}' has bad kind {:?}", map_name, id, other),
            ))
        }
    };

    let rect_values = value
        .get("rects")
        .and_then(|v| v.as_array())
        .ok_or_else(|| content_err("maps.toml", format!("piece '{id}' missing rects")))?;
    if rect_values.is_empty() {
        return Err(content_err("maps.toml", format!("piece '{id}' has no rects")));
    }

    let mut rects = Vec::new();
    for rect in rect_values {
        rects.push(Rect::new(
            require_f32(rect, "x", "maps.toml")?,
            require_f32(rect, "y", "maps.toml")?,
            require_f32(rect, "w", "maps.toml")?,
            require_f32(rect, "h", "maps.toml")?,
        ));
    }

    Ok(TerrainPiece { id, kind, rects })
}

/// Parse loadouts.toml: `[[loadout]]` with nested `[[loadout.mount]]`
pub fn parse_loadouts(content: &str) -> Result<HashMap<String, LoadoutOption>> {
    let toml: toml::Value = content
        .parse()
        .map_err(|e| content_err("loadouts.toml", format!("invalid TOML: {e}")))?;

    let mut loadouts = HashMap::new();
    if let Some(entries) = toml.get("loadout").and_then(|v| v.as_array()) {
        for entry in entries {
            let name = require_str(entry, "name", "loadouts.toml")?;
            let mounts_value = entry
                .get("mount")
                .and_then(|v| v.as_array())
                .ok_or_else(|| {
                    content_err("loadouts.toml", format!("'{name}': missing mounts"))
                })?;

            let mut mounts = Vec::new();
            for mount in mounts_value {
                let location_str = mount
                    .get("location")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| {
                        content_err("loadouts.toml", format!("'{name}': mount missing location"))
                    })?;
                let location = parse_mount(location_str).ok_or_else(|| {
                    content_err(
                        "loadouts.toml",
                        format!("'{name}': unknown mount '{location_str}'"),
                    )
                })?;
                let weapon = require_str(mount, "weapon", "loadouts.toml")?;
                mounts.push((location, weapon));
            }

            loadouts.insert(name.clone(), LoadoutOption { name, mounts });
        }
    }
    Ok(loadouts)
}

fn parse_mount(s: &str) -> Option<MountLocation> {
    match s {
        "carapace" => Some(MountLocation::Carapace),
        "torso" => Some(MountLocation::Torso),
        "left_arm" => Some(MountLocation::LeftArm),
        "right_arm" => Some(MountLocation::RightArm),
        "other" => Some(MountLocation::Other),
        _ => None,
    }
}

fn require_str(value: &toml::Value, key: &str, file: &str) -> Result<String> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| content_err(file, format!("missing string field '{key}'")))
}

fn require_f32(value: &toml::Value, key: &str, file: &str) -> Result<f32> {
    match value.get(key) {
        Some(toml::Value::Float(f)) => Ok(*f as f32),
        Some(toml::Value::Integer(n)) => Ok(*n as f32),
        _ => Err(content_err(file, format!("missing numeric field '{key}'"))),
    }
}
