pub mod bot;
pub mod clock;
pub mod console;
pub mod error;
pub mod evaluation;
pub mod render;
pub mod room;
pub mod rules;
pub mod search;
pub mod selection;
pub mod session;
pub mod types;

pub use error::{ParlorError, Result};
pub use rules::{BoardSnapshot, RulesEngine, ShakmatyRules};
pub use search::find_best_move;
pub use session::{GameMode, GameSession, GameStatus};
