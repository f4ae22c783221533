use crate::board::Board;
use crate::moves::Move;

/// Count leaf nodes of the legal move tree to `depth`.
///
/// https://www.chessprogramming.org/Perft_Results
pub fn perft(board: &Board, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut nodes = 0;
    for mv in board.generate_moves().iter() {
        let mut next = *board;
        if !next.make_move(mv) {
            continue;
        }
        nodes += if depth == 1 { 1 } else { perft(&next, depth - 1) };
    }
    nodes
}

/// Per-root-move node counts, in generation order
pub fn perft_divide(board: &Board, depth: u8) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }

    let mut counts = Vec::new();
    for mv in board.generate_moves().iter() {
        let mut next = *board;
        if next.make_move(mv) {
            counts.push((mv, perft(&next, depth - 1)));
        }
    }
    counts
}
