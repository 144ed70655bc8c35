//! Move selection for the computer opponent.
//!
//! Two selectors exist: the minimax search, and a uniformly random pick among the legal
//! moves which is kept as a separate configuration (it never runs inside the search).

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use shakmaty::Move;

use crate::rules::{RulesEngine, move_to_uci};
use crate::search;
use crate::types::BotKind;

pub struct Bot {
    kind: BotKind,
    depth: u8,
    rng: StdRng,
}

impl Bot {
    pub fn new(kind: BotKind, depth: u8, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            kind,
            depth: depth.max(1),
            rng,
        }
    }

    pub fn kind(&self) -> BotKind {
        self.kind
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn set_depth(&mut self, depth: u8) {
        self.depth = depth.max(1);
    }

    pub fn set_kind(&mut self, kind: BotKind) {
        self.kind = kind;
    }

    /// Chooses a move for the side to move. `None` means checkmate or stalemate.
    pub fn choose<R: RulesEngine>(&mut self, rules: &mut R) -> Option<Move> {
        let choice = match self.kind {
            BotKind::Minimax => search::find_best_move(rules, self.depth),
            BotKind::Random => rules.legal_moves().choose(&mut self.rng).cloned(),
        };
        if let Some(ref mv) = choice {
            log::info!("bot ({:?}) plays {}", self.kind, move_to_uci(mv));
        }
        choice
    }
}
