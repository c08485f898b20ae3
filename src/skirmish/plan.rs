//! Turn plans and their validation
//!
//! A plan is an unordered set of action types paid for from a fixed
//! action-point budget. Validation runs before any state mutation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;
use crate::skirmish::dice::DiceScript;
use crate::skirmish::facing::Arc;
use crate::skirmish::weapons::AttackKind;

/// The seven plannable actions, listed in initiative order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    SnapAttack,
    Advance,
    ShieldShift,
    StandardAttack,
    Run,
    AimedAttack,
    Charge,
}

/// Fixed initiative order: every turn walks this sequence
pub const INITIATIVE_ORDER: [ActionType; 7] = [
    ActionType::SnapAttack,
    ActionType::Advance,
    ActionType::ShieldShift,
    ActionType::StandardAttack,
    ActionType::Run,
    ActionType::AimedAttack,
    ActionType::Charge,
];

impl ActionType {
    /// Action-point price
    pub fn cost(&self) -> u8 {
        match self {
            ActionType::SnapAttack => 1,
            ActionType::Advance => 1,
            ActionType::ShieldShift => 1,
            ActionType::StandardAttack => 2,
            ActionType::Run => 1,
            ActionType::AimedAttack => 3,
            ActionType::Charge => 2,
        }
    }

    /// Precision table used when this action fires ranged weapons
    pub fn attack_kind(&self) -> Option<AttackKind> {
        match self {
            ActionType::SnapAttack => Some(AttackKind::Snap),
            ActionType::StandardAttack => Some(AttackKind::Standard),
            ActionType::AimedAttack => Some(AttackKind::Aimed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionType::SnapAttack => "snap attack",
            ActionType::Advance => "advance",
            ActionType::ShieldShift => "shield shift",
            ActionType::StandardAttack => "standard attack",
            ActionType::Run => "run",
            ActionType::AimedAttack => "aimed attack",
            ActionType::Charge => "charge",
        }
    }
}

/// A player's chosen actions for one turn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnPlan {
    pub actions: Vec<ActionType>,
}

impl TurnPlan {
    pub fn new(actions: Vec<ActionType>) -> Self {
        Self { actions }
    }

    pub fn includes(&self, action: ActionType) -> bool {
        self.actions.contains(&action)
    }

    pub fn total_cost(&self) -> u32 {
        self.actions.iter().map(|a| a.cost() as u32).sum()
    }
}

/// Issue severity from plan validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// One validation finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanIssue {
    pub severity: Severity,
    pub message: String,
}

impl PlanIssue {
    fn error(message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: message.into() }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, message: message.into() }
    }
}

/// What the validator needs to know about the planning Knight
#[derive(Debug, Clone, Copy)]
pub struct PlanContext {
    pub max_action_points: u8,
    pub shield_intact: bool,
}

/// Check a plan against the budget and prerequisites.
///
/// Errors block turn execution; warnings are advisory only.
pub fn validate_plan(plan: &TurnPlan, ctx: &PlanContext) -> Vec<PlanIssue> {
    let mut issues = Vec::new();

    for action in INITIATIVE_ORDER {
        let count = plan.actions.iter().filter(|a| **a == action).count();
        if count > 1 {
            issues.push(PlanIssue::error(format!(
                "duplicate action: {}",
                action.label()
            )));
        }
    }

    let cost = plan.total_cost();
    let budget = ctx.max_action_points as u32;
    if cost > budget {
        issues.push(PlanIssue::error(format!(
            "plan costs {cost} action points, budget is {budget}"
        )));
    } else if cost < budget && !plan.actions.is_empty() {
        issues.push(PlanIssue::warning(format!(
            "{} action points left unspent",
            budget - cost
        )));
    }

    if plan.includes(ActionType::ShieldShift) && !ctx.shield_intact {
        issues.push(PlanIssue::error("shield shift requires an intact shield"));
    }

    issues
}

/// A player's full order sheet for one turn: plan plus structured inputs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnOrders {
    pub plan: TurnPlan,
    /// Advance-move destination
    pub advance_to: Option<Vec2>,
    /// Run-move destination
    pub run_to: Option<Vec2>,
    /// Charge destination; defaults to the opponent's position
    pub charge_to: Option<Vec2>,
    /// Explicit end-of-movement facing, overriding auto-face
    pub end_facing: Option<f32>,
    /// Arc to rotate the shield onto
    pub shield_arc: Option<Arc>,
    /// Equipped weapon name -> target cell id on the opponent's grid
    pub targets: HashMap<String, String>,
    /// Scripted dice for this player's rolls
    pub dice: DiceScript,
}
