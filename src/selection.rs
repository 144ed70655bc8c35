use arrayvec::ArrayVec;
use shakmaty::{Move, Square};

use crate::rules::{RulesEngine, destination};

/// A square the selected piece can move to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Target {
    pub square: Square,
    pub capture: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    Selected(Square),
    Moved(Move),
    Deselected,
    Ignored,
}

/// The currently selected square and its highlighted targets.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    square: Option<Square>,
    // a queen reaches at most 27 squares
    targets: ArrayVec<Target, 32>,
}

impl Selection {
    pub fn square(&self) -> Option<Square> {
        self.square
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn target_at(&self, sq: Square) -> Option<&Target> {
        self.targets.iter().find(|t| t.square == sq)
    }

    pub fn clear(&mut self) {
        self.square = None;
        self.targets.clear();
    }

    pub fn select<R: RulesEngine>(&mut self, rules: &R, sq: Square) {
        self.clear();
        self.square = Some(sq);
        for m in rules.legal_moves_from(sq) {
            let to = destination(&m);
            if self.target_at(to).is_none() {
                self.targets.push(Target {
                    square: to,
                    capture: m.is_capture(),
                });
            }
        }
    }

    /// Click-to-move. With a selection, the click tries selected -> clicked (queen on
    /// promotion); failing that it reselects an own piece or drops the selection.
    /// Without one, only a piece of the side to move can be selected.
    pub fn click<R: RulesEngine>(&mut self, rules: &mut R, sq: Square) -> ClickOutcome {
        let own_piece = rules
            .piece_at(sq)
            .is_some_and(|p| p.color == rules.turn());

        if let Some(from) = self.square {
            if let Some(mv) = rules.find_move(from, sq) {
                if rules.apply(&mv).is_ok() {
                    self.clear();
                    return ClickOutcome::Moved(mv);
                }
            }
            if own_piece {
                self.select(rules, sq);
                return ClickOutcome::Selected(sq);
            }
            self.clear();
            return ClickOutcome::Deselected;
        }

        if own_piece {
            self.select(rules, sq);
            ClickOutcome::Selected(sq)
        } else {
            ClickOutcome::Ignored
        }
    }
}
