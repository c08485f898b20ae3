//! Injectable dice
//!
//! Every roll in the engine drains a scripted override queue before
//! touching the RNG, so a turn is exactly replayable from (state,
//! orders, seed) and tests can pin any individual die.

use std::collections::{HashMap, VecDeque};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::PlayerId;

/// What a die is being rolled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieKind {
    /// Horizontal scatter die
    ScatterRed,
    /// Vertical scatter die
    ScatterBlue,
    ShieldSave,
    ArmorSave,
    Damage,
    /// Run-move allowance dice
    Run,
}

/// Scripted die values, drained in push order per kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiceScript {
    queues: HashMap<DieKind, VecDeque<u8>>,
}

impl DiceScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DieKind, value: u8) -> &mut Self {
        self.queues.entry(kind).or_default().push_back(value);
        self
    }

    /// Builder-style convenience for tests
    pub fn with(mut self, kind: DieKind, value: u8) -> Self {
        self.push(kind, value);
        self
    }

    fn pop(&mut self, kind: DieKind) -> Option<u8> {
        self.queues.get_mut(&kind).and_then(|q| q.pop_front())
    }

    pub fn is_empty(&self) -> bool {
        self.queues.values().all(|q| q.is_empty())
    }
}

/// Seeded roller shared by a whole turn resolution
#[derive(Debug, Clone)]
pub struct DiceRoller {
    rng: ChaCha8Rng,
    /// Scripted initiative winners, drained before the RNG coin flip
    order_queue: VecDeque<PlayerId>,
}

impl DiceRoller {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            order_queue: VecDeque::new(),
        }
    }

    /// Roll a d6, consuming a scripted value first if one is queued.
    /// Scripted values are clamped into 1..=6.
    pub fn d6(&mut self, script: &mut DiceScript, kind: DieKind) -> u8 {
        match script.pop(kind) {
            Some(v) => v.clamp(1, 6),
            None => self.rng.gen_range(1..=6),
        }
    }

    /// Pin the winner of the next simultaneity coin flip
    pub fn queue_first_mover(&mut self, player: PlayerId) {
        self.order_queue.push_back(player);
    }

    /// Uniform coin flip for execution order when both players act
    pub fn first_mover(&mut self) -> PlayerId {
        if let Some(p) = self.order_queue.pop_front() {
            return p;
        }
        if self.rng.gen_bool(0.5) {
            PlayerId::P1
        } else {
            PlayerId::P2
        }
    }
}
