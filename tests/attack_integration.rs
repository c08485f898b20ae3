//! Attack pipeline integration tests
//!
//! Drives full turns through the orchestrator with scripted dice and
//! checks the per-shot pipeline end to end.

use std::collections::HashMap;

use knightfall::core::types::{PerPlayer, PlayerId, Vec2};
use knightfall::skirmish::attack::{SaveKind, ShotOutcome};
use knightfall::skirmish::catalog::{ChassisCatalog, ChassisProfile, ContentLibrary, WeaponCatalog};
use knightfall::skirmish::dice::{DiceRoller, DiceScript, DieKind};
use knightfall::skirmish::grid::{CellTemplate, ComponentGroup, GridTemplate};
use knightfall::skirmish::plan::{ActionType, TurnOrders, TurnPlan};
use knightfall::skirmish::state::SkirmishState;
use knightfall::skirmish::terrain::{Rect, TerrainKind, TerrainPiece};
use knightfall::skirmish::turn::resolve_turn;
use knightfall::skirmish::weapons::{
    AttackKind, DamageSpec, MountLocation, WeaponAbility, WeaponProfile,
};
use knightfall::skirmish::events::TurnEvent;
use knightfall::skirmish::knight::MountedWeapon;

fn test_grid() -> GridTemplate {
    let mut cells = vec![
        CellTemplate { x: 0, y: 0, group: ComponentGroup::CarapaceMount, max_armor: 1 },
        CellTemplate { x: 1, y: 0, group: ComponentGroup::Head, max_armor: 1 },
        CellTemplate { x: 2, y: 0, group: ComponentGroup::ShieldGenerator, max_armor: 2 },
    ];
    for y in 1..3 {
        for x in 0..3 {
            cells.push(CellTemplate { x, y, group: ComponentGroup::Torso, max_armor: 3 });
        }
    }
    GridTemplate { cells }
}

fn test_content() -> ContentLibrary {
    let weapons = WeaponCatalog::new(
        vec![
            WeaponProfile {
                name: "cannon".into(),
                range: 24.0,
                armor_pen: 0,
                damage: DamageSpec::Flat(2),
                scatter: true,
                abilities: vec![],
            },
            WeaponProfile {
                name: "mortar".into(),
                range: 36.0,
                armor_pen: 0,
                damage: DamageSpec::D3,
                scatter: true,
                abilities: vec![WeaponAbility::IndirectFire],
            },
            WeaponProfile {
                name: "blade".into(),
                range: 2.0,
                armor_pen: -1,
                damage: DamageSpec::Flat(3),
                scatter: false,
                abilities: vec![],
            },
        ],
        HashMap::new(),
    )
    .unwrap();

    let chassis = ChassisCatalog::new(vec![ChassisProfile {
        id: "test".into(),
        name: "Test".into(),
        advance: 6.0,
        charge: 12.0,
        run_dice: 2,
        action_points: 6,
        grid: test_grid(),
    }])
    .unwrap();

    ContentLibrary { weapons, chassis, maps: HashMap::new(), loadouts: HashMap::new() }
}

fn duel_state(content: &ContentLibrary, terrain: Vec<TerrainPiece>) -> SkirmishState {
    let chassis = content.chassis.get("test").unwrap();
    let mut k1 = knightfall::skirmish::knight::Knight::new("Alpha", &chassis.grid, 6)
        .with_weapons(vec![
            MountedWeapon::new("cannon", MountLocation::RightArm),
            MountedWeapon::new("mortar", MountLocation::Carapace),
        ]);
    let mut k2 = knightfall::skirmish::knight::Knight::new("Beta", &chassis.grid, 6)
        .with_weapons(vec![MountedWeapon::new("cannon", MountLocation::RightArm)]);
    // Keep shields out of the way unless a test turns them back on
    k1.shield_intact = false;
    k2.shield_intact = false;

    SkirmishState::new(
        PerPlayer::new(k1, k2),
        PerPlayer::new(Vec2::new(2.0, 5.0), Vec2::new(14.0, 5.0)),
        PerPlayer::new(0.0, 180.0),
        terrain,
        Rect::new(0.0, 0.0, 30.0, 20.0),
        PerPlayer::new("test".into(), "test".into()),
    )
}

fn orders_with(plan: Vec<ActionType>, targets: &[(&str, &str)], dice: DiceScript) -> TurnOrders {
    TurnOrders {
        plan: TurnPlan::new(plan),
        targets: targets
            .iter()
            .map(|(w, c)| (w.to_string(), c.to_string()))
            .collect(),
        dice,
        ..Default::default()
    }
}

fn attack_reports(events: &[TurnEvent]) -> Vec<&knightfall::skirmish::attack::ShotReport> {
    events
        .iter()
        .filter_map(|e| match e {
            TurnEvent::Attack { report, .. } => Some(report),
            _ => None,
        })
        .collect()
}

#[test]
fn test_forced_save_then_forced_hit() {
    let content = test_content();

    // Die forced to 6: saved by armor (second script entry covers the mortar)
    let mut state = duel_state(&content, Vec::new());
    let script = DiceScript::new()
        .with(DieKind::ScatterRed, 3)
        .with(DieKind::ScatterBlue, 3)
        .with(DieKind::ArmorSave, 6)
        .with(DieKind::ScatterRed, 3)
        .with(DieKind::ScatterBlue, 3)
        .with(DieKind::ArmorSave, 6);
    let orders = PerPlayer::new(
        orders_with(vec![ActionType::StandardAttack], &[("cannon", "B2"), ("mortar", "B2")], script),
        TurnOrders::default(),
    );
    let mut dice = DiceRoller::seeded(7);
    let events = resolve_turn(&mut state, &content, &orders, &mut dice).unwrap();
    let reports = attack_reports(&events);
    assert_eq!(reports[0].outcome, ShotOutcome::Saved { by: SaveKind::Armor });

    // Same shot with the die forced to 2: hits for the flat value.
    // The mortar behind it is scripted to save so the board state stays pinned.
    let mut state = duel_state(&content, Vec::new());
    let script = DiceScript::new()
        .with(DieKind::ScatterRed, 3)
        .with(DieKind::ScatterBlue, 3)
        .with(DieKind::ArmorSave, 2)
        .with(DieKind::ScatterRed, 3)
        .with(DieKind::ScatterBlue, 3)
        .with(DieKind::ArmorSave, 6);
    let orders = PerPlayer::new(
        orders_with(vec![ActionType::StandardAttack], &[("cannon", "B2"), ("mortar", "B2")], script),
        TurnOrders::default(),
    );
    let mut dice = DiceRoller::seeded(7);
    let events = resolve_turn(&mut state, &content, &orders, &mut dice).unwrap();
    let reports = attack_reports(&events);
    assert_eq!(reports[0].arc, knightfall::skirmish::facing::Arc::Front);
    assert_eq!(reports[0].outcome, ShotOutcome::Hit { damage: 2, destroyed: false });
    assert_eq!(state.knight(PlayerId::P2).grid.cell("B2").unwrap().armor, 1);
}

#[test]
fn test_scatter_off_grid_at_corner() {
    let content = test_content();
    let mut state = duel_state(&content, Vec::new());

    // A1 sits at (0, 0); snap red 1 shifts left 2, blue 1 shifts up 3
    let script = DiceScript::new()
        .with(DieKind::ScatterRed, 1)
        .with(DieKind::ScatterBlue, 1);
    let orders = PerPlayer::new(
        orders_with(vec![ActionType::SnapAttack], &[("cannon", "A1"), ("mortar", "A1")], script),
        TurnOrders::default(),
    );
    let mut dice = DiceRoller::seeded(7);
    let events = resolve_turn(&mut state, &content, &orders, &mut dice).unwrap();

    let reports = attack_reports(&events);
    let report = reports[0];
    assert_eq!(report.outcome, ShotOutcome::Miss { reason: "scattered off-grid".into() });
    assert!(report.final_cell.is_none());
    let scatter = report.scatter.unwrap();
    assert_eq!((scatter.dx, scatter.dy), (-2, -3));
}

#[test]
fn test_indirect_fire_downgrades_instead_of_skipping() {
    let content = test_content();
    // Hard wall fully between the two Knights
    let wall = TerrainPiece::new(
        "wall",
        TerrainKind::Blocking,
        vec![Rect::new(7.0, 0.0, 1.0, 20.0)],
    );
    let mut state = duel_state(&content, vec![wall]);

    let script = DiceScript::new()
        .with(DieKind::ScatterRed, 3)
        .with(DieKind::ScatterBlue, 3)
        .with(DieKind::ArmorSave, 6);
    let orders = PerPlayer::new(
        orders_with(vec![ActionType::AimedAttack], &[("cannon", "B2"), ("mortar", "B2")], script),
        TurnOrders::default(),
    );
    let mut dice = DiceRoller::seeded(7);
    let events = resolve_turn(&mut state, &content, &orders, &mut dice).unwrap();

    // The cannon cannot see through the wall
    assert!(events.iter().any(|e| matches!(
        e,
        TurnEvent::Skip { weapon: Some(w), reason, .. }
            if w == "cannon" && reason == "line of sight blocked"
    )));

    // The mortar arcs over it, but at snap precision despite the aimed order
    let reports = attack_reports(&events);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].weapon, "mortar");
    assert_eq!(reports[0].attack, AttackKind::Snap);
}

#[test]
fn test_shield_shift_bonus_turns_a_hit_into_a_save() {
    let content = test_content();

    // Without the shield bonus a save die of 4 fails (needs 5)
    let mut state = duel_state(&content, Vec::new());
    let script = DiceScript::new()
        .with(DieKind::ScatterRed, 3)
        .with(DieKind::ScatterBlue, 3)
        .with(DieKind::ArmorSave, 4);
    let orders = PerPlayer::new(
        orders_with(vec![ActionType::StandardAttack], &[("cannon", "B2"), ("mortar", "B2")], script),
        TurnOrders::default(),
    );
    let mut dice = DiceRoller::seeded(7);
    let events = resolve_turn(&mut state, &content, &orders, &mut dice).unwrap();
    assert!(matches!(
        attack_reports(&events)[0].outcome,
        ShotOutcome::Hit { .. }
    ));

    // With a shield shift in the same turn the bonus makes it 5: saved.
    // The defender keeps an intact shield but angles it away from the
    // attacker so only the armor-save bonus is in play.
    let mut state = duel_state(&content, Vec::new());
    state.knight_mut(PlayerId::P2).shield_intact = true;
    let script = DiceScript::new()
        .with(DieKind::ScatterRed, 3)
        .with(DieKind::ScatterBlue, 3)
        .with(DieKind::ArmorSave, 4);
    let orders = PerPlayer::new(
        orders_with(vec![ActionType::StandardAttack], &[("cannon", "B2"), ("mortar", "B2")], script),
        TurnOrders {
            plan: TurnPlan::new(vec![ActionType::ShieldShift]),
            shield_arc: Some(knightfall::skirmish::facing::Arc::Rear),
            ..Default::default()
        },
    );
    let mut dice = DiceRoller::seeded(7);
    let events = resolve_turn(&mut state, &content, &orders, &mut dice).unwrap();

    assert!(events.iter().any(|e| matches!(e, TurnEvent::ShieldShift { player: PlayerId::P2, .. })));
    assert_eq!(
        attack_reports(&events)[0].outcome,
        ShotOutcome::Saved { by: SaveKind::Armor }
    );
}

#[test]
fn test_shield_save_stops_frontal_shot() {
    let content = test_content();
    let mut state = duel_state(&content, Vec::new());
    state.knight_mut(PlayerId::P2).shield_intact = true;
    // Shield already faces front by default

    let script = DiceScript::new()
        .with(DieKind::ScatterRed, 3)
        .with(DieKind::ScatterBlue, 3)
        .with(DieKind::ShieldSave, 5);
    let orders = PerPlayer::new(
        orders_with(vec![ActionType::StandardAttack], &[("cannon", "B2"), ("mortar", "B2")], script),
        TurnOrders::default(),
    );
    let mut dice = DiceRoller::seeded(7);
    let events = resolve_turn(&mut state, &content, &orders, &mut dice).unwrap();

    let report = attack_reports(&events)[0];
    assert_eq!(report.outcome, ShotOutcome::Saved { by: SaveKind::Shield });
    assert_eq!(report.shield_roll, Some(5));
    assert!(report.armor_roll.is_none());
}

#[test]
fn test_out_of_range_weapon_skips() {
    let content = test_content();
    let mut state = duel_state(&content, Vec::new());
    // Pull the Knights far apart: beyond the cannon's 24 but inside the
    // mortar's 36
    state.positions[PlayerId::P2] = Vec2::new(29.0, 5.0);

    let script = DiceScript::new()
        .with(DieKind::ScatterRed, 3)
        .with(DieKind::ScatterBlue, 3)
        .with(DieKind::ArmorSave, 6);
    let orders = PerPlayer::new(
        orders_with(vec![ActionType::StandardAttack], &[("cannon", "B2"), ("mortar", "B2")], script),
        TurnOrders::default(),
    );
    let mut dice = DiceRoller::seeded(7);
    let events = resolve_turn(&mut state, &content, &orders, &mut dice).unwrap();

    assert!(events.iter().any(|e| matches!(
        e,
        TurnEvent::Skip { weapon: Some(w), reason, .. } if w == "cannon" && reason == "out of range"
    )));
    assert_eq!(attack_reports(&events).len(), 1);
}

#[test]
fn test_unassigned_weapon_skips() {
    let content = test_content();
    let mut state = duel_state(&content, Vec::new());

    let script = DiceScript::new()
        .with(DieKind::ScatterRed, 3)
        .with(DieKind::ScatterBlue, 3)
        .with(DieKind::ArmorSave, 6);
    // Only the cannon gets a target
    let orders = PerPlayer::new(
        orders_with(vec![ActionType::StandardAttack], &[("cannon", "B2")], script),
        TurnOrders::default(),
    );
    let mut dice = DiceRoller::seeded(7);
    let events = resolve_turn(&mut state, &content, &orders, &mut dice).unwrap();

    assert!(events.iter().any(|e| matches!(
        e,
        TurnEvent::Skip { weapon: Some(w), reason, .. }
            if w == "mortar" && reason == "no target cell assigned"
    )));
    assert_eq!(attack_reports(&events).len(), 1);
}
