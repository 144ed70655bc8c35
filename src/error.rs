//! Error types for session, rules and room operations.
//!
//! The bot itself never fails; these cover input and state errors around it.

use shakmaty::Color;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParlorError {
    /// Move not legal in the current position
    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("invalid square: {0}")]
    InvalidSquare(String),

    /// Text that does not parse as a UCI move
    #[error("invalid move notation: {0}")]
    InvalidMove(String),

    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("please enter a room code")]
    EmptyRoomCode,

    #[error("no game in progress")]
    NoGame,

    #[error("game is over")]
    GameOver,

    #[error("not {0:?}'s turn")]
    NotYourTurn(Color),

    /// Nothing left to take back
    #[error("no move to undo")]
    NothingToUndo,
}

pub type Result<T> = std::result::Result<T, ParlorError>;
