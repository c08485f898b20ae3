use thiserror::Error;

use crate::skirmish::plan::PlanIssue;

#[derive(Error, Debug)]
pub enum KnightfallError {
    #[error("Content error in {file}: {message}")]
    Content { file: String, message: String },

    #[error("Unknown weapon key: {0}")]
    UnknownWeapon(String),

    #[error("Unknown chassis: {0}")]
    UnknownChassis(String),

    #[error("Unknown map preset: {0}")]
    UnknownMap(String),

    #[error("Unknown loadout: {0}")]
    UnknownLoadout(String),

    #[error("Plan rejected for {player}: {}", format_issues(.issues))]
    InvalidPlan { player: String, issues: Vec<PlanIssue> },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

fn format_issues(issues: &[PlanIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, KnightfallError>;
