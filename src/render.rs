use std::fmt::Write;

use shakmaty::{Color, Piece, Role};

use crate::clock::{Clock, format_time};
use crate::rules::{BoardSnapshot, RulesEngine};
use crate::selection::Selection;
use crate::session::{GameMode, GameSession, color_name};

pub fn piece_symbol(piece: Piece) -> char {
    match (piece.color, piece.role) {
        (Color::White, Role::King) => '♔',
        (Color::White, Role::Queen) => '♕',
        (Color::White, Role::Rook) => '♖',
        (Color::White, Role::Bishop) => '♗',
        (Color::White, Role::Knight) => '♘',
        (Color::White, Role::Pawn) => '♙',
        (Color::Black, Role::King) => '♚',
        (Color::Black, Role::Queen) => '♛',
        (Color::Black, Role::Rook) => '♜',
        (Color::Black, Role::Bishop) => '♝',
        (Color::Black, Role::Knight) => '♞',
        (Color::Black, Role::Pawn) => '♟',
    }
}

/// Draws the grid rank 8 first. `[p]` marks the selected piece, `*` a quiet target and
/// `(p)` a capture target.
pub fn render_board(snapshot: &BoardSnapshot, selection: &Selection) -> String {
    let mut out = String::new();
    for (row, cells) in snapshot.cells.iter().enumerate() {
        let _ = write!(out, "{} ", 8 - row);
        for (col, cell) in cells.iter().enumerate() {
            let sq = BoardSnapshot::square_at(row, col);
            let symbol = cell.map(piece_symbol).unwrap_or('.');
            if selection.square() == Some(sq) {
                let _ = write!(out, "[{}]", symbol);
            } else if let Some(target) = selection.target_at(sq) {
                if target.capture {
                    let _ = write!(out, "({})", symbol);
                } else {
                    out.push_str(" * ");
                }
            } else {
                let _ = write!(out, " {} ", symbol);
            }
        }
        out.push('\n');
    }
    out.push_str("   a  b  c  d  e  f  g  h\n");
    out
}

pub fn render_clock(clock: &Clock) -> String {
    format!(
        "White {} | Black {}",
        format_time(clock.remaining(Color::White)),
        format_time(clock.remaining(Color::Black))
    )
}

pub fn render<R: RulesEngine + Clone>(session: &GameSession<R>) -> String {
    let mut out = render_board(&session.rules().snapshot(), session.selection());
    if let GameMode::Online { room, color } = session.mode() {
        let _ = writeln!(out, "Room {} (you play {})", room, color_name(*color));
    }
    let _ = writeln!(out, "{}", render_clock(session.clock()));
    let _ = writeln!(out, "{}", session.status());
    out
}
