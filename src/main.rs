//! Headless skirmish runner
//!
//! Loads data content, builds two Knights, and resolves scripted turns
//! until one Knight falls. Outputs the combat log as text or JSON.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;

use knightfall::content::load_content;
use knightfall::core::error::Result;
use knightfall::core::types::{PerPlayer, PlayerId, Vec2};
use knightfall::skirmish::dice::DiceRoller;
use knightfall::skirmish::events::render_log;
use knightfall::skirmish::grid::ComponentGroup;
use knightfall::skirmish::plan::{ActionType, TurnOrders, TurnPlan};
use knightfall::skirmish::state::SkirmishState;
use knightfall::skirmish::terrain::Rect;
use knightfall::skirmish::turn::resolve_turn;

/// Headless Knightfall runner - scripted duels for engine validation
#[derive(Parser, Debug)]
#[command(name = "knightfall")]
#[command(about = "Run a scripted two-Knight skirmish and print the combat log")]
struct Args {
    /// Content directory holding weapons/chassis/maps/loadouts TOML
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Map preset name
    #[arg(long, default_value = "ruined-plaza")]
    map: String,

    /// Chassis for player 1
    #[arg(long, default_value = "paladin")]
    chassis1: String,

    /// Chassis for player 2
    #[arg(long, default_value = "lancer")]
    chassis2: String,

    /// Loadout for player 1
    #[arg(long, default_value = "lance-pattern")]
    loadout1: String,

    /// Loadout for player 2
    #[arg(long, default_value = "fusillade-pattern")]
    loadout2: String,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum turns before calling the duel a draw
    #[arg(long, default_value_t = 12)]
    max_turns: u32,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "knightfall=info".into()),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "starting skirmish");

    let content = load_content(&args.data_dir)?;
    let map = content.map(&args.map)?.clone();

    let knight1 = content.build_knight("Oathkeeper", &args.chassis1, &args.loadout1)?;
    let knight2 = content.build_knight("Stormwrack", &args.chassis2, &args.loadout2)?;

    let mut state = SkirmishState::new(
        PerPlayer::new(knight1, knight2),
        PerPlayer::new(
            Vec2::new(4.0, map.height / 2.0),
            Vec2::new(map.width - 5.0, map.height / 2.0),
        ),
        PerPlayer::new(0.0, 180.0),
        map.pieces.clone(),
        Rect::new(0.0, 0.0, map.width, map.height),
        PerPlayer::new(args.chassis1.clone(), args.chassis2.clone()),
    );

    let mut dice = DiceRoller::seeded(seed);
    let mut all_events = Vec::new();

    for _ in 0..args.max_turns {
        let orders = PerPlayer::new(
            drill_orders(&state, PlayerId::P1),
            drill_orders(&state, PlayerId::P2),
        );
        let events = resolve_turn(&mut state, &content, &orders, &mut dice)?;

        if args.format == "text" {
            println!("=== Turn {} ===", state.turn);
            for line in render_log(&events) {
                println!("{line}");
            }
        }
        all_events.extend(events);

        if state.is_over() {
            break;
        }
    }

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&all_events)?);
    } else {
        let verdict = PlayerId::all()
            .into_iter()
            .find(|p| !state.knight(*p).is_destroyed() && state.knight(p.opponent()).is_destroyed())
            .map(|p| format!("{} ({}) stands", state.knight(p).name, p.label()))
            .unwrap_or_else(|| "draw".to_string());
        println!("=== {verdict} after {} turns ===", state.turn);
    }

    Ok(())
}

/// Scripted closing-and-firing orders: no heuristics, just a drill that
/// exercises movement, shooting, and the charge.
fn drill_orders(state: &SkirmishState, player: PlayerId) -> TurnOrders {
    let opponent = player.opponent();
    let range = state.measured_range();
    let enemy_pos = state.positions[opponent];

    let actions = if range > 24.0 {
        vec![ActionType::Advance, ActionType::Run, ActionType::SnapAttack]
    } else if range > 4.0 {
        vec![
            ActionType::Advance,
            ActionType::StandardAttack,
            ActionType::SnapAttack,
            ActionType::ShieldShift,
        ]
    } else {
        vec![ActionType::Charge, ActionType::StandardAttack, ActionType::SnapAttack]
    };
    // Drop actions the budget or a lost shield can no longer pay for
    let knight = state.knight(player);
    let mut budget = knight.max_action_points as i32;
    let actions = actions
        .into_iter()
        .filter(|a| {
            if *a == ActionType::ShieldShift && !knight.shield_intact {
                return false;
            }
            let cost = a.cost() as i32;
            if budget >= cost {
                budget -= cost;
                true
            } else {
                false
            }
        })
        .collect();

    // Aim everything at the opponent's first torso cell
    let aim_cell = state
        .knight(opponent)
        .grid
        .cells
        .iter()
        .find(|c| c.group == ComponentGroup::Torso)
        .or_else(|| state.knight(opponent).grid.cells.first())
        .map(|c| c.id.clone())
        .unwrap_or_default();
    let mut targets = HashMap::new();
    for weapon in &state.knight(player).weapons {
        targets.insert(weapon.name.clone(), aim_cell.clone());
    }

    TurnOrders {
        plan: TurnPlan::new(actions),
        advance_to: Some(enemy_pos),
        run_to: Some(enemy_pos),
        charge_to: None,
        end_facing: None,
        shield_arc: None,
        targets,
        dice: Default::default(),
    }
}
