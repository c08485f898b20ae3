pub mod error;
pub mod types;

pub use error::{KnightfallError, Result};
pub use types::{PerPlayer, PlayerId, TurnNumber, Vec2};
