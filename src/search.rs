use std::time::Instant;

use shakmaty::{Color, Move};

use crate::evaluation::evaluate;
use crate::rules::{RulesEngine, move_to_uci};
use crate::types::{SCORE_INFINITY, SCORE_MATE, Score, SearchResult};

/// Mutable search state shared across recursion
pub struct SearchState {
    pub nodes: u64,
    pub start_time: Instant,
    /// Color every score is measured for: the side to move at the root.
    pub perspective: Color,
}

impl SearchState {
    pub fn new(perspective: Color) -> Self {
        Self {
            nodes: 0,
            start_time: Instant::now(),
            perspective,
        }
    }
}

/// Format a score for log output.
pub fn format_score(score: Score) -> String {
    if score >= SCORE_MATE {
        "mate +".to_string()
    } else if score <= -SCORE_MATE {
        "mate -".to_string()
    } else {
        format!("cp {}", score)
    }
}

/// Picks the best move for the side to move, or `None` when it has no legal move.
pub fn find_best_move<R: RulesEngine>(rules: &mut R, depth: u8) -> Option<Move> {
    search(rules, depth).best_move
}

/// Fixed-depth root search. Every root move is applied, scored and undone; the first
/// move with the strictly highest score wins.
pub fn search<R: RulesEngine>(rules: &mut R, depth: u8) -> SearchResult {
    let depth = depth.max(1);
    let mut state = SearchState::new(rules.turn());

    let mut best_move: Option<Move> = None;
    let mut best_score: Score = -SCORE_INFINITY;
    let mut alpha = -SCORE_INFINITY;
    let beta = SCORE_INFINITY;

    for mv in rules.legal_moves() {
        if rules.apply(&mv).is_err() {
            continue;
        }
        state.nodes += 1;
        let score = minimax(rules, &mut state, depth - 1, alpha, beta, false);
        rules.undo();

        if best_move.is_none() || score > best_score {
            best_score = score;
            best_move = Some(mv);
        }
        // A later move can only replace the best by beating it, so the window may
        // tighten without changing which move is chosen.
        alpha = alpha.max(best_score);
    }

    let elapsed_ms = state.start_time.elapsed().as_millis().max(1) as u64;
    log::debug!(
        "search depth {} score {} nodes {} time {}ms best {}",
        depth,
        format_score(best_score),
        state.nodes,
        elapsed_ms,
        best_move.as_ref().map(move_to_uci).unwrap_or_else(|| "none".to_string()),
    );

    SearchResult {
        score: if best_move.is_some() { best_score } else { evaluate(rules, state.perspective) },
        best_move,
        depth,
        nodes: state.nodes,
    }
}

/// Minimax with alpha-beta pruning from `state.perspective`.
/// `maximizing` is true at nodes where the perspective color is to move.
pub fn minimax<R: RulesEngine>(
    rules: &mut R,
    state: &mut SearchState,
    depth: u8,
    mut alpha: Score,
    mut beta: Score,
    maximizing: bool,
) -> Score {
    if depth == 0 || rules.is_game_over() {
        return evaluate(rules, state.perspective);
    }

    let moves = rules.legal_moves();
    if moves.is_empty() {
        return evaluate(rules, state.perspective);
    }

    if maximizing {
        let mut best = -SCORE_INFINITY;
        for mv in &moves {
            if rules.apply(mv).is_err() {
                continue;
            }
            state.nodes += 1;
            let score = minimax(rules, state, depth - 1, alpha, beta, false);
            rules.undo();

            best = best.max(score);
            alpha = alpha.max(best);
            if beta <= alpha {
                break;
            }
        }
        best
    } else {
        let mut best = SCORE_INFINITY;
        for mv in &moves {
            if rules.apply(mv).is_err() {
                continue;
            }
            state.nodes += 1;
            let score = minimax(rules, state, depth - 1, alpha, beta, true);
            rules.undo();

            best = best.min(score);
            beta = beta.min(best);
            if beta <= alpha {
                break;
            }
        }
        best
    }
}


// Fixed-depth minimax with alpha-beta pruning. No iterative deepening, transposition table
// or quiescence: the move chosen depends only on the position, the depth and the order in
// which the rules engine lists legal moves.
