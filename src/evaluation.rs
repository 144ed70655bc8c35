use shakmaty::{Color, Role};

use crate::rules::{BoardSnapshot, RulesEngine};
use crate::types::{Score, SCORE_MATE};

/// Material value of a piece type
pub fn piece_value(role: Role) -> Score {
    match role {
        Role::Pawn => 100,
        Role::Knight => 320,
        Role::Bishop => 330,
        Role::Rook => 500,
        Role::Queen => 900,
        Role::King => 20_000,
    }
}

/// Material balance of a snapshot seen from `perspective`: own pieces count positive,
/// opponent pieces negative.
pub fn material(snapshot: &BoardSnapshot, perspective: Color) -> Score {
    snapshot
        .pieces()
        .map(|piece| {
            let value = piece_value(piece.role);
            if piece.color == perspective { value } else { -value }
        })
        .sum()
}

/// Evaluates the current position from `perspective`.
/// A checkmate dominates material: the mated side is always the side to move.
pub fn evaluate<R: RulesEngine>(rules: &R, perspective: Color) -> Score {
    if rules.is_checkmate() {
        return if rules.turn() == perspective {
            -SCORE_MATE
        } else {
            SCORE_MATE
        };
    }
    material(&rules.snapshot(), perspective)
}


// Material only: no piece-square tables, mobility or king safety.
// King value is counted for both sides and cancels out while both kings stand.
