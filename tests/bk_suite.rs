use shakmaty::san::SanPlus;

use parlor::rules::{RulesEngine, ShakmatyRules, move_to_uci};
use parlor::search::find_best_move;

const BK_POSITIONS: &str = r#"1k1r4/pp1b1R2/3q2pp/4p3/2B5/4Q3/PPP2B2/2K5 b - - bm Qd1+; id "BK.01";
3r1k2/4npp1/1ppr3p/p6P/P2PPPP1/1NR5/5K2/2R5 w - - bm d5; id "BK.02";
2q1rr1k/3bbnnp/p2p1pp1/2pPp3/PpP1P1P1/1P2BNNP/2BQ1PRK/7R b - - bm f5; id "BK.03";
rnbqkb1r/p3pppp/1p6/2ppP3/3N4/2P5/PPP1QPPP/R1B1KB1R w KQkq - bm e6; id "BK.04";
r1b2rk1/2q1b1pp/p2ppn2/1p6/3QP3/1BN1B3/PPP3PP/R4RK1 w - - bm Nd5 a4; id "BK.05";
"#;

/// Parse an EPD line: "<FEN> bm <move(s)>; id "<name>";"
fn parse_epd_line(line: &str) -> Option<(String, Vec<String>, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let bm_idx = line.find(" bm ")?;
    let fen = line[..bm_idx].to_string();
    let rest = &line[bm_idx + 4..];

    let semi_idx = rest.find(';')?;
    let best_moves: Vec<String> = rest[..semi_idx]
        .split_whitespace()
        .map(|s| s.to_string())
        .collect();

    let id = rest
        .find("id \"")
        .and_then(|start| {
            let content = &rest[start + 4..];
            content.find('"').map(|end| content[..end].to_string())
        })
        .unwrap_or_else(|| "unknown".to_string());

    Some((fen, best_moves, id))
}

fn load_suite() -> Vec<(ShakmatyRules, Vec<String>, String)> {
    BK_POSITIONS
        .lines()
        .filter_map(parse_epd_line)
        .map(|(fen, moves, id)| {
            let rules = ShakmatyRules::from_fen(&format!("{fen} 0 1"))
                .unwrap_or_else(|e| panic!("{id}: {e}"));
            (rules, moves, id)
        })
        .collect()
}

#[test]
fn test_epd_parser() {
    let line = "1k1r4/pp1b1R2/3q2pp/4p3/2B5/4Q3/PPP2B2/2K5 b - - bm Qd1+; id \"BK.01\";";
    let (fen, moves, id) = parse_epd_line(line).unwrap();
    assert_eq!(fen, "1k1r4/pp1b1R2/3q2pp/4p3/2B5/4Q3/PPP2B2/2K5 b - -");
    assert_eq!(moves, vec!["Qd1+"]);
    assert_eq!(id, "BK.01");
}

#[test]
fn test_suite_best_moves_resolve_by_squares() {
    let suite = load_suite();
    assert_eq!(suite.len(), 5);
    for (rules, best_moves, id) in &suite {
        for san in best_moves {
            let parsed: SanPlus = san.parse().unwrap_or_else(|_| panic!("{id}: bad SAN {san}"));
            let mv = parsed
                .san
                .to_move(rules.position())
                .unwrap_or_else(|_| panic!("{id}: {san} not legal"));
            let from = mv.from().unwrap_or_else(|| panic!("{id}: {san} has no origin"));
            assert_eq!(
                rules.find_move(from, mv.to()),
                Some(mv.clone()),
                "{id}: {san} not reachable by clicking {from} then {}",
                mv.to()
            );
            assert!(rules.legal_moves_from(from).contains(&mv), "{id}: {san}");
        }
    }
}

#[test]
fn test_bot_returns_legal_move_and_restores_position() {
    for (mut rules, _, id) in load_suite() {
        let legal = rules.legal_moves();
        let before = rules.snapshot();
        let turn = rules.turn();

        let best = find_best_move(&mut rules, 2).unwrap_or_else(|| panic!("{id}: no move"));

        assert!(legal.contains(&best), "{id}: {} is not legal", move_to_uci(&best));
        assert_eq!(rules.snapshot(), before, "{id}: board changed");
        assert_eq!(rules.turn(), turn, "{id}: side to move changed");
        assert_eq!(rules.ply_count(), 0, "{id}: history not unwound");
    }
}
