//! Turn orchestration
//!
//! One call resolves a whole turn: a fixed initiative order of action
//! steps, each gated against step-start state and committed against
//! live state. Soft failures degrade to SKIP events; only an invalid
//! plan refuses the turn, and it does so before any mutation.

use serde::{Deserialize, Serialize};

use crate::core::error::{KnightfallError, Result};
use crate::core::types::{PerPlayer, PlayerId};
use crate::skirmish::attack::{resolve_shot, ShotSpec};
use crate::skirmish::catalog::ContentLibrary;
use crate::skirmish::constants::SHIELD_SHIFT_SAVE_BONUS;
use crate::skirmish::dice::{DiceRoller, DiceScript, DieKind};
use crate::skirmish::events::TurnEvent;
use crate::skirmish::facing::{can_engage, incoming_arc, Arc};
use crate::skirmish::movement::{route_movement, WaypointQueue};
use crate::skirmish::plan::{validate_plan, ActionType, PlanContext, Severity, TurnOrders, INITIATIVE_ORDER};
use crate::skirmish::state::SkirmishState;
use crate::skirmish::terrain::line_of_sight;
use crate::skirmish::weapons::AttackKind;

/// A gated shot, ready to commit against live state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PlannedShot {
    /// Resolved catalog profile name
    profile: String,
    attack: AttackKind,
    arc: Arc,
    target_cell: String,
    obscured: bool,
}

/// A gated skip, emitted verbatim during the apply pass
#[derive(Debug, Clone, PartialEq)]
struct PlannedSkip {
    weapon: Option<String>,
    reason: String,
}

/// Resolve one full turn, mutating `state` in place.
///
/// Both plans are validated first; any error-severity issue rejects the
/// turn with state untouched. The returned events are the complete,
/// ordered log of everything that happened.
pub fn resolve_turn(
    state: &mut SkirmishState,
    content: &ContentLibrary,
    orders: &PerPlayer<TurnOrders>,
    dice: &mut DiceRoller,
) -> Result<Vec<TurnEvent>> {
    // Validation strictly precedes mutation
    for player in PlayerId::all() {
        let knight = state.knight(player);
        let ctx = PlanContext {
            max_action_points: knight.max_action_points,
            shield_intact: knight.shield_intact,
        };
        let issues = validate_plan(&orders[player].plan, &ctx);
        if issues.iter().any(|i| i.severity == Severity::Error) {
            return Err(KnightfallError::InvalidPlan {
                player: player.label().to_string(),
                issues,
            });
        }
    }

    state.turn += 1;
    state.save_bonus = PerPlayer::new(0, 0);
    tracing::info!(turn = state.turn, "resolving turn");

    let mut events = Vec::new();
    let mut scripts = PerPlayer::new(orders.p1.dice.clone(), orders.p2.dice.clone());
    let mut queues: PerPlayer<WaypointQueue> = PerPlayer::default();
    let mut destroyed_logged = PerPlayer::new(
        state.knight(PlayerId::P1).is_destroyed(),
        state.knight(PlayerId::P2).is_destroyed(),
    );

    for action in INITIATIVE_ORDER {
        events.push(TurnEvent::Step { action, range: state.measured_range() });

        let ordered = ordered_participants(state, orders, action, dice);
        tracing::debug!(step = action.label(), participants = ordered.len(), "initiative step");

        match action {
            ActionType::Advance | ActionType::Run => {
                movement_step(state, content, orders, &mut scripts, &mut queues, action, &ordered, dice, &mut events);
            }
            ActionType::ShieldShift => {
                shield_step(state, orders, &ordered, &mut events);
            }
            ActionType::SnapAttack | ActionType::StandardAttack | ActionType::AimedAttack => {
                let kind = action.attack_kind().expect("attack steps map to a kind");
                ranged_step(state, content, orders, &mut scripts, kind, &ordered, dice, &mut events);
                log_destruction(state, &mut destroyed_logged, &mut events);
            }
            ActionType::Charge => {
                charge_step(state, content, orders, &mut scripts, &mut queues, &ordered, dice, &mut events);
                log_destruction(state, &mut destroyed_logged, &mut events);
            }
        }
    }

    Ok(events)
}

/// Players acting this step, in execution order.
///
/// Participation needs the action planned and the Knight alive at step
/// start; when both act, a coin flip settles who goes first.
fn ordered_participants(
    state: &SkirmishState,
    orders: &PerPlayer<TurnOrders>,
    action: ActionType,
    dice: &mut DiceRoller,
) -> Vec<PlayerId> {
    let mut participants: Vec<PlayerId> = PlayerId::all()
        .into_iter()
        .filter(|p| orders[*p].plan.includes(action) && !state.knight(*p).is_destroyed())
        .collect();

    if participants.len() == 2 {
        let first = dice.first_mover();
        participants = vec![first, first.opponent()];
    }
    participants
}

#[allow(clippy::too_many_arguments)]
fn movement_step(
    state: &mut SkirmishState,
    content: &ContentLibrary,
    orders: &PerPlayer<TurnOrders>,
    scripts: &mut PerPlayer<DiceScript>,
    queues: &mut PerPlayer<WaypointQueue>,
    action: ActionType,
    ordered: &[PlayerId],
    dice: &mut DiceRoller,
    events: &mut Vec<TurnEvent>,
) {
    for &player in ordered {
        let chassis = match content.chassis.get(&state.chassis_ids[player]) {
            Ok(c) => c,
            Err(_) => {
                events.push(TurnEvent::Skip {
                    player,
                    weapon: None,
                    reason: "unknown chassis".into(),
                });
                continue;
            }
        };

        let (base_allowance, run_dice) = match action {
            ActionType::Run => {
                let rolls: Vec<u8> = (0..chassis.run_dice)
                    .map(|_| dice.d6(&mut scripts[player], DieKind::Run))
                    .collect();
                let total: u8 = rolls.iter().sum();
                (total as f32, Some(rolls))
            }
            _ => (chassis.advance, None),
        };

        let destination = match action {
            ActionType::Run => orders[player].run_to,
            _ => orders[player].advance_to,
        };
        if let Some(dest) = destination {
            queues[player].push(dest);
        }
        if queues[player].is_empty() {
            events.push(TurnEvent::Skip {
                player,
                weapon: None,
                reason: "no destination plotted".into(),
            });
            continue;
        }

        let allowance =
            (base_allowance - state.knight(player).movement_penalty).max(0.0);
        let outcome = route_movement(
            state.positions[player],
            state.facings[player],
            allowance,
            &mut queues[player],
            &state.bounds,
            &state.terrain,
            orders[player].end_facing,
        );

        state.positions[player] = outcome.to;
        state.facings[player] = outcome.facing;
        events.push(TurnEvent::Move {
            player,
            action,
            from: outcome.from,
            to: outcome.to,
            facing: outcome.facing,
            allowance,
            run_dice,
        });
    }
}

fn shield_step(
    state: &mut SkirmishState,
    orders: &PerPlayer<TurnOrders>,
    ordered: &[PlayerId],
    events: &mut Vec<TurnEvent>,
) {
    for &player in ordered {
        if !state.knight(player).shield_intact {
            events.push(TurnEvent::Skip {
                player,
                weapon: None,
                reason: "shield generator destroyed".into(),
            });
            continue;
        }
        let arc = orders[player].shield_arc.unwrap_or(Arc::Front);
        state.knights[player].shield_arc = arc;
        state.save_bonus[player] = SHIELD_SHIFT_SAVE_BONUS;
        events.push(TurnEvent::ShieldShift {
            player,
            arc,
            save_bonus: SHIELD_SHIFT_SAVE_BONUS,
        });
    }
}

/// Ranged attack step, in two phases.
///
/// The compute pass gates every weapon against a step-start snapshot and
/// yields a pure shot list; the apply pass commits exactly that list
/// against live state. The split keeps step-start truths (who was
/// alive, which weapons were enabled) intact even though the apply pass
/// runs sequentially.
#[allow(clippy::too_many_arguments)]
fn ranged_step(
    state: &mut SkirmishState,
    content: &ContentLibrary,
    orders: &PerPlayer<TurnOrders>,
    scripts: &mut PerPlayer<DiceScript>,
    kind: AttackKind,
    ordered: &[PlayerId],
    dice: &mut DiceRoller,
    events: &mut Vec<TurnEvent>,
) {
    let snapshot = state.clone();

    let mut planned: Vec<(PlayerId, Vec<PlannedSkip>, Vec<PlannedShot>)> = Vec::new();
    for &player in ordered {
        let (skips, shots) = plan_ranged_attacks(&snapshot, content, orders, player, kind);
        planned.push((player, skips, shots));
    }

    for (player, skips, shots) in planned {
        for skip in skips {
            events.push(TurnEvent::Skip { player, weapon: skip.weapon, reason: skip.reason });
        }
        commit_shots(state, content, scripts, dice, player, &shots, events);
    }
}

/// Gate one player's ranged weapons against the snapshot
fn plan_ranged_attacks(
    snapshot: &SkirmishState,
    content: &ContentLibrary,
    orders: &PerPlayer<TurnOrders>,
    player: PlayerId,
    kind: AttackKind,
) -> (Vec<PlannedSkip>, Vec<PlannedShot>) {
    let mut skips = Vec::new();
    let mut shots = Vec::new();

    let opponent = player.opponent();
    if snapshot.knight(opponent).is_destroyed() {
        skips.push(PlannedSkip { weapon: None, reason: "target already destroyed".into() });
        return (skips, shots);
    }

    let range = snapshot.measured_range();
    let attacker_pos = snapshot.positions[player];
    let attacker_facing = snapshot.facings[player];
    let defender_pos = snapshot.positions[opponent];
    let defender_facing = snapshot.facings[opponent];
    let los = line_of_sight(attacker_pos, defender_pos, &snapshot.terrain);

    for weapon in snapshot.knight(player).active_weapons() {
        let Some(profile) = content.weapons.resolve(&weapon.name, range) else {
            skips.push(PlannedSkip {
                weapon: Some(weapon.name.clone()),
                reason: "out of range".into(),
            });
            continue;
        };
        if profile.is_melee() {
            skips.push(PlannedSkip {
                weapon: Some(weapon.name.clone()),
                reason: "melee weapon".into(),
            });
            continue;
        }
        if range > profile.range {
            skips.push(PlannedSkip {
                weapon: Some(weapon.name.clone()),
                reason: "out of range".into(),
            });
            continue;
        }

        // Hard cover stops the shot unless it can arc over, at the cost
        // of snap-shot precision
        let mut effective_kind = kind;
        if los.blocked {
            if profile.has_ability(crate::skirmish::weapons::WeaponAbility::IndirectFire) {
                effective_kind = AttackKind::Snap;
            } else {
                skips.push(PlannedSkip {
                    weapon: Some(weapon.name.clone()),
                    reason: "line of sight blocked".into(),
                });
                continue;
            }
        }

        if !can_engage(attacker_pos, attacker_facing, defender_pos, weapon.mount) {
            skips.push(PlannedSkip {
                weapon: Some(weapon.name.clone()),
                reason: "target outside firing arc".into(),
            });
            continue;
        }

        let Some(target_cell) = orders[player].targets.get(&weapon.name) else {
            skips.push(PlannedSkip {
                weapon: Some(weapon.name.clone()),
                reason: "no target cell assigned".into(),
            });
            continue;
        };

        shots.push(PlannedShot {
            profile: profile.name.clone(),
            attack: effective_kind,
            arc: incoming_arc(defender_pos, defender_facing, attacker_pos),
            target_cell: target_cell.clone(),
            obscured: los.obscured,
        });
    }

    (skips, shots)
}

/// Commit planned shots against live state, consuming dice
fn commit_shots(
    state: &mut SkirmishState,
    content: &ContentLibrary,
    scripts: &mut PerPlayer<DiceScript>,
    dice: &mut DiceRoller,
    player: PlayerId,
    shots: &[PlannedShot],
    events: &mut Vec<TurnEvent>,
) {
    let opponent = player.opponent();
    for shot in shots {
        let Some(profile) = content.weapons.profile(&shot.profile) else {
            continue;
        };
        let spec = ShotSpec {
            profile,
            attack: shot.attack,
            arc: shot.arc,
            target_cell: shot.target_cell.clone(),
            obscured: shot.obscured,
            save_bonus: state.save_bonus[opponent],
        };
        let report = resolve_shot(
            &spec,
            &mut state.knights[opponent],
            dice,
            &mut scripts[player],
        );
        events.push(TurnEvent::Attack { player, report });
    }
}

/// Charge step: forced movement, then melee at post-charge range.
///
/// The compute pass simulates both charges in execution order on a
/// snapshot so the second charger gates its melee against where the
/// first actually ended up; the apply pass commits the recorded moves
/// and shots.
#[allow(clippy::too_many_arguments)]
fn charge_step(
    state: &mut SkirmishState,
    content: &ContentLibrary,
    orders: &PerPlayer<TurnOrders>,
    scripts: &mut PerPlayer<DiceScript>,
    queues: &mut PerPlayer<WaypointQueue>,
    ordered: &[PlayerId],
    dice: &mut DiceRoller,
    events: &mut Vec<TurnEvent>,
) {
    struct ChargePlan {
        player: PlayerId,
        movement: Option<crate::skirmish::movement::MoveOutcome>,
        allowance: f32,
        skips: Vec<PlannedSkip>,
        shots: Vec<PlannedShot>,
    }

    let step_start = state.clone();
    let mut sim = state.clone();
    let mut plans: Vec<ChargePlan> = Vec::new();

    for &player in ordered {
        let opponent = player.opponent();
        let mut plan = ChargePlan {
            player,
            movement: None,
            allowance: 0.0,
            skips: Vec::new(),
            shots: Vec::new(),
        };

        let chassis = match content.chassis.get(&sim.chassis_ids[player]) {
            Ok(c) => c,
            Err(_) => {
                plan.skips.push(PlannedSkip { weapon: None, reason: "unknown chassis".into() });
                plans.push(plan);
                continue;
            }
        };

        // Forced movement toward the opponent unless a destination was plotted
        let destination = orders[player]
            .charge_to
            .unwrap_or(sim.positions[opponent]);
        queues[player].push(destination);

        let allowance = (chassis.charge - sim.knight(player).movement_penalty).max(0.0);
        let outcome = route_movement(
            sim.positions[player],
            sim.facings[player],
            allowance,
            &mut queues[player],
            &sim.bounds,
            &sim.terrain,
            orders[player].end_facing,
        );
        sim.positions[player] = outcome.to;
        sim.facings[player] = outcome.facing;
        plan.allowance = allowance;
        plan.movement = Some(outcome);

        // Melee gating at post-charge range, step-start destruction truth
        if step_start.knight(opponent).is_destroyed() {
            plan.skips.push(PlannedSkip { weapon: None, reason: "target already destroyed".into() });
            plans.push(plan);
            continue;
        }

        let range = sim.measured_range();
        let attacker_pos = sim.positions[player];
        let attacker_facing = sim.facings[player];
        let defender_pos = sim.positions[opponent];
        let defender_facing = sim.facings[opponent];
        let los = line_of_sight(attacker_pos, defender_pos, &sim.terrain);

        for weapon in step_start.knight(player).active_weapons() {
            let Some(profile) = content.weapons.resolve(&weapon.name, range) else {
                plan.skips.push(PlannedSkip {
                    weapon: Some(weapon.name.clone()),
                    reason: "out of range".into(),
                });
                continue;
            };
            if !profile.is_melee() {
                plan.skips.push(PlannedSkip {
                    weapon: Some(weapon.name.clone()),
                    reason: "not a melee weapon".into(),
                });
                continue;
            }
            if range > profile.range {
                plan.skips.push(PlannedSkip {
                    weapon: Some(weapon.name.clone()),
                    reason: "out of range".into(),
                });
                continue;
            }
            // Melee cannot reach across any cover, hard or soft
            if los.crosses_cover {
                plan.skips.push(PlannedSkip {
                    weapon: Some(weapon.name.clone()),
                    reason: "cover blocks melee".into(),
                });
                continue;
            }
            if !can_engage(attacker_pos, attacker_facing, defender_pos, weapon.mount) {
                plan.skips.push(PlannedSkip {
                    weapon: Some(weapon.name.clone()),
                    reason: "target outside firing arc".into(),
                });
                continue;
            }
            let Some(target_cell) = orders[player].targets.get(&weapon.name) else {
                plan.skips.push(PlannedSkip {
                    weapon: Some(weapon.name.clone()),
                    reason: "no target cell assigned".into(),
                });
                continue;
            };

            plan.shots.push(PlannedShot {
                profile: profile.name.clone(),
                attack: AttackKind::Standard,
                arc: incoming_arc(defender_pos, defender_facing, attacker_pos),
                target_cell: target_cell.clone(),
                obscured: los.obscured,
            });
        }

        plans.push(plan);
    }

    // Apply pass: commit recorded moves and resolve melee live
    for plan in plans {
        let player = plan.player;
        if let Some(movement) = plan.movement {
            state.positions[player] = movement.to;
            state.facings[player] = movement.facing;
            events.push(TurnEvent::Move {
                player,
                action: ActionType::Charge,
                from: movement.from,
                to: movement.to,
                facing: movement.facing,
                allowance: plan.allowance,
                run_dice: None,
            });
        }
        for skip in plan.skips {
            events.push(TurnEvent::Skip { player, weapon: skip.weapon, reason: skip.reason });
        }
        commit_shots(state, content, scripts, dice, player, &plan.shots, events);
    }
}

/// Emit DESTROYED once per Knight per match; checking again is harmless
fn log_destruction(
    state: &SkirmishState,
    destroyed_logged: &mut PerPlayer<bool>,
    events: &mut Vec<TurnEvent>,
) {
    for player in PlayerId::all() {
        if state.knight(player).is_destroyed() && !destroyed_logged[player] {
            destroyed_logged[player] = true;
            tracing::info!(player = player.label(), "knight destroyed");
            events.push(TurnEvent::Destroyed { player });
        }
    }
}
