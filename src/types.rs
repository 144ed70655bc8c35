use std::time::Duration;

use shakmaty::Move;

pub type Score = i32;

/// Larger than any reachable evaluation, used as the open alpha-beta window.
pub const SCORE_INFINITY: Score = 1_000_000;
pub const SCORE_MATE: Score = 50_000;
pub const DEFAULT_DEPTH: u8 = 3;
pub const MAX_DEPTH: u8 = 8;
pub const DEFAULT_CLOCK_SECS: u64 = 600;
pub const DEFAULT_BOT_DELAY_MS: u64 = 500;
pub const ROOM_JOIN_WAIT_MS: u64 = 3_000;

/// Which move selector the bot uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BotKind {
    Minimax,
    Random,
}

impl BotKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "minimax" => Some(BotKind::Minimax),
            "random" => Some(BotKind::Random),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub depth: u8,
    pub bot: BotKind,
    pub clock: Duration,
    pub bot_delay: Duration,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            bot: BotKind::Minimax,
            clock: Duration::from_secs(DEFAULT_CLOCK_SECS),
            bot_delay: Duration::from_millis(DEFAULT_BOT_DELAY_MS),
            seed: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: Score,
    pub depth: u8,
    pub nodes: u64,
}

// Scores are always from one fixed perspective: the color that was to move at the root.
// Mate is a flat +-SCORE_MATE with no distance adjustment, so a faster mate is not preferred.
