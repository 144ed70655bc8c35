//! Rules engine boundary.
//!
//! All chess legality lives in `shakmaty`. The bot and the session only talk to a
//! [`RulesEngine`]: enumerate, apply, undo and inspect. [`ShakmatyRules`] keeps a stack of
//! prior positions so every `apply` can be reverted by exactly one `undo`.

use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{
    Bitboard, Board, CastlingMode, Chess, Color, EnPassantMode, File, Move, MoveList, Piece,
    Position, Rank, Role, Square,
};

use crate::error::{ParlorError, Result};

/// 8x8 read-only projection of a position. Row 0 is rank 8, column 0 is file a.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub cells: [[Option<Piece>; 8]; 8],
}

impl BoardSnapshot {
    pub fn empty() -> Self {
        Self { cells: [[None; 8]; 8] }
    }

    /// Square shown at `(row, col)` of the grid.
    pub fn square_at(row: usize, col: usize) -> Square {
        Square::from_coords(File::new(col as u32), Rank::new(7 - row as u32))
    }

    pub fn get(&self, sq: Square) -> Option<Piece> {
        let idx = sq as usize;
        self.cells[7 - idx / 8][idx % 8]
    }

    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.cells.iter().flatten().filter_map(|c| *c)
    }
}

pub trait RulesEngine {
    fn turn(&self) -> Color;

    fn legal_moves(&self) -> MoveList;

    /// Legal moves whose origin is `square`, used for selection highlighting.
    fn legal_moves_from(&self, square: Square) -> MoveList {
        let mut moves = self.legal_moves();
        moves.retain(|m| m.from() == Some(square));
        moves
    }

    /// Applies a legal move. The position is untouched on error.
    fn apply(&mut self, m: &Move) -> Result<()>;

    /// Reverts the last applied move. Returns false if there is none.
    fn undo(&mut self) -> bool;

    fn is_checkmate(&self) -> bool;

    fn is_stalemate(&self) -> bool;

    fn is_draw(&self) -> bool;

    fn is_check(&self) -> bool;

    fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }

    fn piece_at(&self, square: Square) -> Option<Piece>;

    fn snapshot(&self) -> BoardSnapshot;

    /// Resolves an origin/destination pair to a legal move, promoting to a queen when
    /// a promotion is required.
    fn find_move(&self, from: Square, to: Square) -> Option<Move> {
        let moves = self.legal_moves_from(from);
        let mut fallback = None;
        for m in moves {
            if destination(&m) != to {
                continue;
            }
            match m.promotion() {
                None | Some(Role::Queen) => return Some(m),
                Some(_) => {
                    if fallback.is_none() {
                        fallback = Some(m);
                    }
                }
            }
        }
        fallback
    }

    /// Number of moves that can currently be undone.
    fn ply_count(&self) -> usize;
}

/// Destination square as a player would click it (castling targets the king's square).
pub fn destination(m: &Move) -> Square {
    match m.to_uci(CastlingMode::Standard) {
        UciMove::Normal { to, .. } => to,
        _ => m.to(),
    }
}

pub fn move_to_uci(m: &Move) -> String {
    m.to_uci(CastlingMode::Standard).to_string()
}

pub fn parse_square(text: &str) -> Result<Square> {
    text.trim()
        .to_ascii_lowercase()
        .parse::<Square>()
        .map_err(|_| ParlorError::InvalidSquare(text.to_string()))
}

#[derive(Clone, PartialEq)]
struct RepetitionKey {
    board: Board,
    turn: Color,
    castling: Bitboard,
    ep: Option<Square>,
}

impl RepetitionKey {
    fn of(pos: &Chess) -> Self {
        Self {
            board: pos.board().clone(),
            turn: pos.turn(),
            castling: pos.castles().castling_rights(),
            ep: pos.ep_square(EnPassantMode::Legal),
        }
    }
}

/// Rules engine backed by `shakmaty::Chess` with a position stack for undo.
#[derive(Clone, Debug, Default)]
pub struct ShakmatyRules {
    pos: Chess,
    history: Vec<Chess>,
}

impl ShakmatyRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        let parsed: Fen = fen
            .trim()
            .parse()
            .map_err(|_| ParlorError::InvalidFen(fen.to_string()))?;
        let pos: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|_| ParlorError::InvalidFen(fen.to_string()))?;
        Ok(Self {
            pos,
            history: Vec::new(),
        })
    }

    pub fn position(&self) -> &Chess {
        &self.pos
    }

    /// Parses a UCI move (`e2e4`, `e7e8q`) against the current position.
    pub fn parse_uci(&self, text: &str) -> Result<Move> {
        let uci: UciMove = text
            .trim()
            .parse()
            .map_err(|_| ParlorError::InvalidMove(text.to_string()))?;
        uci.to_move(&self.pos)
            .map_err(|_| ParlorError::IllegalMove(text.to_string()))
    }

    /// Threefold repetition over the applied-move history.
    fn is_threefold(&self) -> bool {
        let current = RepetitionKey::of(&self.pos);
        let seen = self
            .history
            .iter()
            .filter(|p| RepetitionKey::of(p) == current)
            .count();
        seen >= 2
    }
}

impl RulesEngine for ShakmatyRules {
    fn turn(&self) -> Color {
        self.pos.turn()
    }

    fn legal_moves(&self) -> MoveList {
        self.pos.legal_moves()
    }

    fn apply(&mut self, m: &Move) -> Result<()> {
        if !self.pos.is_legal(m) {
            return Err(ParlorError::IllegalMove(move_to_uci(m)));
        }
        self.history.push(self.pos.clone());
        self.pos.play_unchecked(m);
        Ok(())
    }

    fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(prev) => {
                self.pos = prev;
                true
            }
            None => false,
        }
    }

    fn is_checkmate(&self) -> bool {
        self.pos.is_checkmate()
    }

    fn is_stalemate(&self) -> bool {
        self.pos.is_stalemate()
    }

    fn is_draw(&self) -> bool {
        self.pos.is_stalemate()
            || self.pos.is_insufficient_material()
            || self.pos.halfmoves() >= 100
            || self.is_threefold()
    }

    fn is_check(&self) -> bool {
        self.pos.is_check()
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.pos.board().piece_at(square)
    }

    fn snapshot(&self) -> BoardSnapshot {
        let mut snap = BoardSnapshot::empty();
        for (row, cells) in snap.cells.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                *cell = self.pos.board().piece_at(BoardSnapshot::square_at(row, col));
            }
        }
        snap
    }

    fn ply_count(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_has_twenty_moves() {
        let rules = ShakmatyRules::new();
        assert_eq!(rules.legal_moves().len(), 20);
        assert_eq!(rules.turn(), Color::White);
    }

    #[test]
    fn test_apply_undo_restores_snapshot() {
        let mut rules = ShakmatyRules::new();
        let before = rules.snapshot();
        let mv = rules.parse_uci("e2e4").unwrap();
        rules.apply(&mv).unwrap();
        assert_ne!(rules.snapshot(), before);
        assert_eq!(rules.turn(), Color::Black);
        assert!(rules.undo());
        assert_eq!(rules.snapshot(), before);
        assert!(!rules.undo(), "nothing left to undo");
    }

    #[test]
    fn test_apply_rejects_illegal_move() {
        let mut rules = ShakmatyRules::new();
        let before = rules.snapshot();
        let other = ShakmatyRules::from_fen("4k3/8/8/8/8/8/3Q4/4K3 w - - 0 1").unwrap();
        let queen_move = other.parse_uci("d2d7").unwrap();
        assert!(matches!(
            rules.apply(&queen_move),
            Err(ParlorError::IllegalMove(_))
        ));
        assert_eq!(rules.ply_count(), 0);
        assert_eq!(rules.snapshot(), before);
        assert_eq!(rules.turn(), Color::White);
    }

    #[test]
    fn test_snapshot_orientation() {
        let snap = ShakmatyRules::new().snapshot();
        // a8 is a black rook, e1 the white king
        let a8 = snap.cells[0][0].unwrap();
        assert_eq!(a8.role, Role::Rook);
        assert_eq!(a8.color, Color::Black);
        let e1 = snap.get(Square::E1).unwrap();
        assert_eq!(e1.role, Role::King);
        assert_eq!(e1.color, Color::White);
        assert_eq!(snap.pieces().count(), 32);
    }

    #[test]
    fn test_legal_moves_from_square() {
        let rules = ShakmatyRules::new();
        assert_eq!(rules.legal_moves_from(Square::G1).len(), 2);
        assert_eq!(rules.legal_moves_from(Square::E4).len(), 0);
    }

    #[test]
    fn test_find_move_castles_by_king_square() {
        let rules = ShakmatyRules::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let mv = rules.find_move(Square::E1, Square::G1).expect("castling");
        assert_eq!(move_to_uci(&mv), "e1g1");
        assert_eq!(destination(&mv), Square::G1);
    }

    #[test]
    fn test_find_move_promotes_to_queen() {
        let rules = ShakmatyRules::from_fen("8/P7/8/8/8/8/8/K6k w - - 0 1").unwrap();
        let mv = rules.find_move(Square::A7, Square::A8).unwrap();
        assert_eq!(mv.promotion(), Some(Role::Queen));
    }

    #[test]
    fn test_checkmate_and_stalemate_detection() {
        let mate = ShakmatyRules::from_fen(
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        )
        .unwrap();
        assert!(mate.is_checkmate());
        assert!(mate.is_game_over());
        assert!(!mate.is_draw());

        let stale = ShakmatyRules::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(stale.is_stalemate());
        assert!(stale.is_draw());
        assert!(stale.legal_moves().is_empty());
    }

    #[test]
    fn test_threefold_repetition_is_draw() {
        let mut rules = ShakmatyRules::new();
        for _ in 0..2 {
            for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
                let mv = rules.parse_uci(uci).unwrap();
                rules.apply(&mv).unwrap();
            }
        }
        assert!(rules.is_draw(), "startpos reached a third time");
    }

    #[test]
    fn test_parse_square() {
        assert_eq!(parse_square("E4").unwrap(), Square::E4);
        assert!(matches!(parse_square("z9"), Err(ParlorError::InvalidSquare(_))));
    }

    #[test]
    fn test_invalid_fen() {
        assert!(matches!(
            ShakmatyRules::from_fen("not a fen"),
            Err(ParlorError::InvalidFen(_))
        ));
    }
}
