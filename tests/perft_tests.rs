//! Perft regression over the standard test positions
//!
//! https://www.chessprogramming.org/Perft_Results
//!
//! Run with: cargo test --test perft_tests

use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;

use magic_chess::board::{Board, STARTING_POSITION_FEN};
use magic_chess::config::TableConfig;
use magic_chess::perft::{perft, perft_divide};
use magic_chess::tables::Tables;

static TABLES: Lazy<Tables> = Lazy::new(|| Tables::new(&TableConfig::default()).unwrap());

fn check(fen: &str, expected: &[u64]) {
    let board = Board::from_fen(&TABLES, fen).unwrap();
    for (i, &nodes) in expected.iter().enumerate() {
        let depth = i as u8 + 1;
        assert_eq!(perft(&board, depth), nodes, "{fen} at depth {depth}");
    }
}

#[test]
fn perft_start() {
    check(STARTING_POSITION_FEN, &[20, 400, 8902, 197_281]);
}

#[test]
fn perft_kiwipete() {
    check(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        &[48, 2039, 97_862],
    );
}

#[test]
fn perft_pos_3() {
    check("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", &[14, 191, 2812, 43_238]);
}

#[test]
fn perft_pos_4() {
    check(
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        &[6, 264, 9467],
    );
}

#[test]
fn perft_pos_5() {
    check("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8", &[44, 1486, 62_379]);
}

#[test]
fn perft_same_with_other_seeds() {
    // Different magics and keys must not change the move tree
    let config = TableConfig {
        magic_seed: 42,
        zobrist_seed: 7,
        ..TableConfig::default()
    };
    let tables = Tables::new(&config).unwrap();
    let board = Board::from_fen(&tables, "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8").unwrap();
    assert_eq!(perft(&board, 2), 1486);
}

#[test]
fn perft_divide_start() {
    let board = Board::starting_position(&TABLES);
    let divide = perft_divide(&board, 3);
    assert_eq!(divide.len(), 20);
    for (mv, nodes) in &divide {
        // Every first move gives black 20 replies; the count below varies
        assert!(*nodes >= 380, "{mv}: {nodes}");
    }
    assert_eq!(divide.iter().map(|(_, n)| n).sum::<u64>(), 8902);
}
