//! Search tactics: short mates and hanging pieces the engine must find
//!
//! Run with: cargo test --test search_tests

use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;

use magic_chess::board::{Board, STARTING_POSITION_FEN};
use magic_chess::config::{PhaseRule, SearchConfig, TableConfig};
use magic_chess::search::{Search, SearchResult, CHECKMATE_SCORE};
use magic_chess::tables::Tables;

static TABLES: Lazy<Tables> = Lazy::new(|| Tables::new(&TableConfig::default()).unwrap());

fn run(fen: &str, config: SearchConfig) -> SearchResult {
    let board = Board::from_fen(&TABLES, fen).unwrap();
    Search::new(board, config.tt_size_mb(4)).search()
}

fn best(result: &SearchResult) -> String {
    result.best_move.map(|m| m.to_uci()).unwrap_or_default()
}

#[test]
fn back_rank_mate() {
    for depth in 2..=4 {
        let result = run("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", SearchConfig::new().max_depth(depth));
        assert_eq!(best(&result), "a1a8", "depth {depth}");
        assert_eq!(result.score, CHECKMATE_SCORE - 1, "depth {depth}");
    }
}

#[test]
fn back_rank_mate_for_black() {
    let result = run("r5k1/8/8/8/8/8/5PPP/6K1 b - - 0 1", SearchConfig::new().max_depth(3));
    assert_eq!(best(&result), "a8a1");
    assert_eq!(result.score, CHECKMATE_SCORE - 1);
    assert_eq!(result.mate_in(), Some(1));
}

#[test]
fn rook_mate_in_corner() {
    let result = run("k7/8/1K6/8/8/8/8/7R w - - 0 1", SearchConfig::new().max_depth(4));
    assert_eq!(best(&result), "h1h8");
    assert_eq!(result.pv[0].to_uci(), "h1h8");
}

#[test]
fn mate_found_under_both_phase_rules() {
    for rule in [PhaseRule::Observed, PhaseRule::Material] {
        let config = SearchConfig::new().max_depth(3).phase_rule(rule);
        let result = run("k7/8/1K6/8/8/8/8/7R w - - 0 1", config);
        assert_eq!(best(&result), "h1h8", "{rule:?}");
    }
}

#[test]
fn mate_in_two_with_and_without_pruning() {
    let fen = "r2qkb1r/pp2nppp/3p4/2pNN1B1/2BnP3/3P4/PPP2PPP/R2bK2R w KQkq - 1 1";
    for pruning in [true, false] {
        for depth in [5, 7] {
            let config = SearchConfig::new().max_depth(depth).null_move(pruning).lmr(pruning);
            let result = run(fen, config);
            assert_eq!(result.score, CHECKMATE_SCORE - 3, "depth {depth}, pruning {pruning}");
            assert_eq!(result.pv_string(), "d5f6 g7f6 c4f7", "depth {depth}, pruning {pruning}");
            assert_eq!(result.mate_in(), Some(2));
        }
    }
}

#[test]
fn rook_ladder_mate_in_three() {
    for pruning in [true, false] {
        let config = SearchConfig::new().max_depth(7).null_move(pruning).lmr(pruning);
        let result = run("8/8/6k1/1R6/R7/8/8/7K w - - 0 1", config);
        assert_eq!(result.score, CHECKMATE_SCORE - 5, "pruning {pruning}");
        assert_eq!(result.pv.len(), 5, "pruning {pruning}");
        assert_eq!(result.mate_in(), Some(3));
    }
}

#[test]
fn takes_hanging_queen() {
    let result = run("4k3/8/8/3q4/8/8/3R4/3K4 w - - 0 1", SearchConfig::new().max_depth(4));
    assert_eq!(best(&result), "d2d5");
    assert!(result.score > 300);
}

#[test]
fn pruning_does_not_change_the_mate() {
    let config = SearchConfig::new().max_depth(4).null_move(false).lmr(false);
    let result = run("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", config);
    assert_eq!(best(&result), "a1a8");
    assert_eq!(result.score, CHECKMATE_SCORE - 1);
}

#[test]
fn search_is_deterministic() {
    let config = || SearchConfig::new().max_depth(4);
    let first = run(STARTING_POSITION_FEN, config());
    let second = run(STARTING_POSITION_FEN, config());
    assert_eq!(first, second);
    assert_eq!(first.depth, 4);
    assert!(first.pv.len() >= 1);
}

#[test]
fn search_after_game_moves() {
    let board = Board::starting_position(&TABLES);
    let mut search = Search::new(board, SearchConfig::new().max_depth(3).tt_size_mb(4));
    for mv in ["e2e4", "e7e5", "g1f3"] {
        search.play_uci_move(mv).unwrap();
    }
    let before = *search.board();
    let result = search.search();
    assert!(result.best_move.is_some());
    assert_eq!(*search.board(), before);
    assert_eq!(
        search.board().to_fen(),
        "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 0 1"
    );
}
