//! Single-shot attack resolution
//!
//! A fixed pipeline with three terminal outcomes: the shot misses, a
//! save stops it, or it hits and damage cascades through the grid.

use serde::{Deserialize, Serialize};

use crate::skirmish::constants::{
    ARMOR_SAVE_TARGET, FLANK_DAMAGE_BONUS, REAR_ARMOR_PEN, SHIELD_SAVE_TARGET,
    SOFT_COVER_SAVE_BONUS,
};
use crate::skirmish::dice::{DiceRoller, DiceScript, DieKind};
use crate::skirmish::facing::Arc;
use crate::skirmish::knight::Knight;
use crate::skirmish::scatter::{resolve_scatter, ScatterRoll};
use crate::skirmish::weapons::{AttackKind, DamageSpec, WeaponProfile};

/// Which save stopped a shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveKind {
    Shield,
    Armor,
}

/// Terminal outcome of one shot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShotOutcome {
    Miss { reason: String },
    Saved { by: SaveKind },
    Hit { damage: i32, destroyed: bool },
}

/// Armor-save detail for the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorSaveRoll {
    pub die: u8,
    /// Die plus every modifier; saves on reaching the target
    pub total: i32,
}

/// Damage detail for the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRoll {
    /// Raw d6, when the damage spec rolls one
    pub die: Option<u8>,
    pub amount: i32,
}

/// Full record of one resolved shot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotReport {
    pub weapon: String,
    pub attack: AttackKind,
    pub arc: Arc,
    pub target_cell: String,
    pub scatter: Option<ScatterRoll>,
    /// Cell the shot actually landed on, if any
    pub final_cell: Option<String>,
    pub shield_roll: Option<u8>,
    pub armor_roll: Option<ArmorSaveRoll>,
    pub damage_roll: Option<DamageRoll>,
    pub outcome: ShotOutcome,
}

/// Everything the pipeline needs besides the defender
#[derive(Debug, Clone)]
pub struct ShotSpec<'a> {
    pub profile: &'a WeaponProfile,
    /// Effective precision (indirect fire may have downgraded it)
    pub attack: AttackKind,
    /// Incoming arc on the defender
    pub arc: Arc,
    /// Chosen target cell id
    pub target_cell: String,
    /// Target sits in soft cover
    pub obscured: bool,
    /// Temporary armor-save bonus active on the defender
    pub save_bonus: i32,
}

/// Flat damage bonus for non-frontal hits
fn arc_damage_bonus(arc: Arc) -> i32 {
    match arc {
        Arc::Front => 0,
        Arc::Left | Arc::Right | Arc::Rear => FLANK_DAMAGE_BONUS,
    }
}

/// Rear shots degrade the save by one step
fn arc_armor_pen(arc: Arc) -> i32 {
    match arc {
        Arc::Rear => REAR_ARMOR_PEN,
        _ => 0,
    }
}

/// Resolve one shot against the defender, mutating its grid on a hit.
pub fn resolve_shot(
    spec: &ShotSpec,
    defender: &mut Knight,
    dice: &mut DiceRoller,
    script: &mut DiceScript,
) -> ShotReport {
    let mut report = ShotReport {
        weapon: spec.profile.name.clone(),
        attack: spec.attack,
        arc: spec.arc,
        target_cell: spec.target_cell.clone(),
        scatter: None,
        final_cell: None,
        shield_roll: None,
        armor_roll: None,
        damage_roll: None,
        outcome: ShotOutcome::Miss { reason: String::new() },
    };

    // Chosen cell must exist on the defender's grid
    let Some(aim_cell) = defender.grid.cell(&spec.target_cell) else {
        report.outcome = ShotOutcome::Miss { reason: "target cell not found".into() };
        return report;
    };
    let (aim_x, aim_y) = (aim_cell.x, aim_cell.y);

    // Scatter: ranged weapons drift; melee strikes the chosen cell
    let (final_id, final_armor) = if spec.profile.scatter {
        let red = dice.d6(script, DieKind::ScatterRed);
        let blue = dice.d6(script, DieKind::ScatterBlue);
        let roll = resolve_scatter(spec.attack, red, blue, spec.arc);
        report.scatter = Some(roll);

        let (fx, fy) = (aim_x + roll.dx, aim_y + roll.dy);
        if !defender.grid.in_bounds(fx, fy) {
            report.outcome = ShotOutcome::Miss { reason: "scattered off-grid".into() };
            return report;
        }
        match defender.grid.cell_at(fx, fy) {
            Some(cell) => (cell.id.clone(), cell.armor),
            None => {
                report.outcome = ShotOutcome::Miss { reason: "scattered to missing cell".into() };
                return report;
            }
        }
    } else {
        (aim_cell.id.clone(), aim_cell.armor)
    };
    report.final_cell = Some(final_id.clone());

    // Stripped locations soak nothing further
    if final_armor == 0 {
        report.outcome = ShotOutcome::Miss { reason: "no armor remaining at location".into() };
        return report;
    }

    // Shield save: ranged only, protected arc only, unmodifiable,
    // resolved before the armor save
    if spec.profile.scatter && defender.shield_intact && spec.arc == defender.shield_arc {
        let roll = dice.d6(script, DieKind::ShieldSave);
        report.shield_roll = Some(roll);
        if roll >= SHIELD_SAVE_TARGET {
            report.outcome = ShotOutcome::Saved { by: SaveKind::Shield };
            return report;
        }
    }

    // Armor save
    let die = dice.d6(script, DieKind::ArmorSave);
    let mut total = die as i32 + spec.profile.armor_pen + arc_armor_pen(spec.arc);
    if spec.obscured {
        total += SOFT_COVER_SAVE_BONUS;
    }
    total += spec.save_bonus;
    report.armor_roll = Some(ArmorSaveRoll { die, total });
    if total >= ARMOR_SAVE_TARGET {
        report.outcome = ShotOutcome::Saved { by: SaveKind::Armor };
        return report;
    }

    // Damage
    let damage_roll = roll_damage(spec.profile.damage, dice, script);
    let amount = (damage_roll.amount + arc_damage_bonus(spec.arc)).max(0);
    report.damage_roll = Some(DamageRoll { die: damage_roll.die, amount });

    defender.apply_damage(&final_id, amount);
    report.outcome = ShotOutcome::Hit { damage: amount, destroyed: defender.is_destroyed() };
    report
}

/// Roll the damage spec. A d3 halves a d6 roll (rounding up) rather
/// than rolling its own die; the shared-roll behavior is load-bearing
/// for replay fidelity.
fn roll_damage(spec: DamageSpec, dice: &mut DiceRoller, script: &mut DiceScript) -> DamageRoll {
    match spec {
        DamageSpec::Flat(n) => DamageRoll { die: None, amount: n },
        DamageSpec::D6 => {
            let die = dice.d6(script, DieKind::Damage);
            DamageRoll { die: Some(die), amount: die as i32 }
        }
        DamageSpec::D3 => {
            let die = dice.d6(script, DieKind::Damage);
            DamageRoll { die: Some(die), amount: ((die + 1) / 2) as i32 }
        }
    }
}
