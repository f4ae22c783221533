//! Static evaluation.
//!
//! Material and piece-square scores are kept separately for the opening and
//! the endgame, plus pawn structure, mobility, open files and a pawn shield.
//! The total non-king material decides which of the two is used, or how they
//! are blended.

use crate::bitboard::*;
use crate::board::Board;
use crate::config::PhaseRule;
use crate::types::*;

/// Material above this is an opening
pub const OPENING_SCORE: i32 = 6192;
/// Material below this is an endgame
pub const ENDGAME_SCORE: i32 = 518;

/// Piece values by phase, indexed by `PieceType`
const MATERIAL_OPENING: [i32; 6] = [82, 337, 365, 477, 1025, 12000];
const MATERIAL_ENDGAME: [i32; 6] = [94, 281, 297, 512, 936, 12000];

const DOUBLED_PAWN_OPENING: i32 = -5;
const DOUBLED_PAWN_ENDGAME: i32 = -10;
const ISOLATED_PAWN_OPENING: i32 = -5;
const ISOLATED_PAWN_ENDGAME: i32 = -10;

/// Passed pawn bonus by rank, from the pawn's own side
const PASSED_PAWN_BONUS: [i32; 8] = [0, 10, 30, 50, 75, 100, 150, 200];

const SEMI_OPEN_FILE_SCORE: i32 = 10;
const OPEN_FILE_SCORE: i32 = 15;

/// Attacked squares a piece is expected to have before mobility counts
const BISHOP_BASE_MOBILITY: i32 = 4;
const QUEEN_BASE_MOBILITY: i32 = 9;
const BISHOP_MOBILITY_OPENING: i32 = 5;
const BISHOP_MOBILITY_ENDGAME: i32 = 5;
const QUEEN_MOBILITY_OPENING: i32 = 1;
const QUEEN_MOBILITY_ENDGAME: i32 = 2;

/// Bonus per own pawn next to the king
const KING_SHIELD_BONUS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

/// White-relative phase scores of a position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub opening: i32,
    pub endgame: i32,
    /// Non-king material of both sides at opening values
    pub game_score: i32,
}

impl Evaluation {
    pub fn phase(&self, rule: PhaseRule) -> GamePhase {
        match rule {
            // Anything that is not an opening falls straight through to the endgame
            PhaseRule::Observed => {
                if self.game_score > OPENING_SCORE {
                    GamePhase::Opening
                } else {
                    GamePhase::Endgame
                }
            }
            PhaseRule::Material => {
                if self.game_score > OPENING_SCORE {
                    GamePhase::Opening
                } else if self.game_score < ENDGAME_SCORE {
                    GamePhase::Endgame
                } else {
                    GamePhase::Middlegame
                }
            }
        }
    }

    /// White-relative score after resolving the phase
    pub fn score(&self, rule: PhaseRule) -> i32 {
        match self.phase(rule) {
            GamePhase::Opening => self.opening,
            GamePhase::Endgame => self.endgame,
            GamePhase::Middlegame => {
                (self.opening * self.game_score + self.endgame * (OPENING_SCORE - self.game_score)) / OPENING_SCORE
            }
        }
    }
}

/// Non-king material of both sides, at opening values
pub fn game_score(board: &Board) -> i32 {
    ALL_PIECES
        .iter()
        .filter(|p| p.piece_type() != PieceType::King)
        .map(|&p| board.bitboard(p).count_ones() as i32 * MATERIAL_OPENING[p.piece_type().index()])
        .sum()
}

/// Score from the side to move's point of view
pub fn static_evaluate(board: &Board, rule: PhaseRule) -> i32 {
    let score = evaluate_phases(board).score(rule);
    match board.side() {
        Color::White => score,
        Color::Black => -score,
    }
}

pub fn evaluate_phases(board: &Board) -> Evaluation {
    let mut opening = 0;
    let mut endgame = 0;
    for color in [Color::White, Color::Black] {
        let (o, e) = evaluate_side(board, color);
        let sign = if color == Color::White { 1 } else { -1 };
        opening += sign * o;
        endgame += sign * e;
    }
    Evaluation {
        opening,
        endgame,
        game_score: game_score(board),
    }
}

/// Opening and endgame score of one side's pieces, positive meaning good for that side
fn evaluate_side(board: &Board, color: Color) -> (i32, i32) {
    let tables = board.tables();
    let attacks = &tables.attacks;
    let masks = &tables.masks;
    let occupied = board.occupied();
    let own_pawns = board.bitboard(Piece::new(color, PieceType::Pawn));
    let enemy_pawns = board.bitboard(Piece::new(color.other_color(), PieceType::Pawn));
    let all_pawns = own_pawns | enemy_pawns;

    let mut opening = 0;
    let mut endgame = 0;

    for piece_type in PIECE_TYPES {
        for sq in BitboardIter(board.bitboard(Piece::new(color, piece_type))) {
            // Tables are written from white's side with a8 first
            let relative = match color {
                Color::White => sq,
                Color::Black => mirror(sq),
            };
            let file = masks.file[file_of(sq) as usize];

            opening += MATERIAL_OPENING[piece_type.index()] + pst(piece_type, false)[relative as usize];
            endgame += MATERIAL_ENDGAME[piece_type.index()] + pst(piece_type, true)[relative as usize];

            match piece_type {
                PieceType::Pawn => {
                    let doubled = (own_pawns & file).count_ones() as i32 - 1;
                    if doubled > 0 {
                        opening += doubled * DOUBLED_PAWN_OPENING;
                        endgame += doubled * DOUBLED_PAWN_ENDGAME;
                    }
                    if own_pawns & masks.isolated[file_of(sq) as usize] == 0 {
                        opening += ISOLATED_PAWN_OPENING;
                        endgame += ISOLATED_PAWN_ENDGAME;
                    }
                    let passed_mask = match color {
                        Color::White => masks.white_passed[sq as usize],
                        Color::Black => masks.black_passed[sq as usize],
                    };
                    if enemy_pawns & passed_mask == 0 {
                        let bonus = PASSED_PAWN_BONUS[7 - rank_of(relative) as usize];
                        opening += bonus;
                        endgame += bonus;
                    }
                }
                PieceType::Bishop => {
                    let mobility = attacks.bishop_attacks(sq, occupied).count_ones() as i32 - BISHOP_BASE_MOBILITY;
                    opening += mobility * BISHOP_MOBILITY_OPENING;
                    endgame += mobility * BISHOP_MOBILITY_ENDGAME;
                }
                PieceType::Rook => {
                    let bonus = open_file_score(own_pawns, all_pawns, file);
                    opening += bonus;
                    endgame += bonus;
                }
                PieceType::Queen => {
                    let mobility = attacks.queen_attacks(sq, occupied).count_ones() as i32 - QUEEN_BASE_MOBILITY;
                    opening += mobility * QUEEN_MOBILITY_OPENING;
                    endgame += mobility * QUEEN_MOBILITY_ENDGAME;
                }
                PieceType::King => {
                    // Open files are a liability next to the king
                    let penalty = open_file_score(own_pawns, all_pawns, file);
                    let shield = (attacks.king_attacks(sq) & own_pawns).count_ones() as i32 * KING_SHIELD_BONUS;
                    opening += shield - penalty;
                    endgame += shield - penalty;
                }
                PieceType::Knight => {}
            }
        }
    }

    (opening, endgame)
}

fn open_file_score(own_pawns: Bitboard, all_pawns: Bitboard, file: Bitboard) -> i32 {
    let mut score = 0;
    if own_pawns & file == 0 {
        score += SEMI_OPEN_FILE_SCORE;
    }
    if all_pawns & file == 0 {
        score += OPEN_FILE_SCORE;
    }
    score
}

fn pst(piece_type: PieceType, endgame: bool) -> &'static [i32; 64] {
    match piece_type {
        PieceType::Pawn => {
            if endgame {
                &PAWNS_END
            } else {
                &PAWNS
            }
        }
        PieceType::Knight => &KNIGHTS,
        PieceType::Bishop => &BISHOPS,
        PieceType::Rook => &ROOKS,
        PieceType::Queen => &QUEENS,
        PieceType::King => {
            if endgame {
                &KING_END
            } else {
                &KING_START
            }
        }
    }
}

#[rustfmt::skip]
const PAWNS: [i32; 64] = [
     0,  0,   0,   0,   0,   0,  0,  0,
    50, 50,  50,  50,  50,  50, 50, 50,
    10, 10,  20,  30,  30,  20, 10, 10,
     5,  5,  10,  25,  25,  10,  5,  5,
     0,  0,   0,  20,  20,   0,  0,  0,
     5, -5, -10,   0,   0, -10, -5,  5,
     5, 10,  10, -20, -20,  10, 10,  5,
     0,  0,   0,   0,   0,   0,  0,  0,
];

#[rustfmt::skip]
const PAWNS_END: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    80, 80, 80, 80, 80, 80, 80, 80,
    50, 50, 50, 50, 50, 50, 50, 50,
    30, 30, 30, 30, 30, 30, 30, 30,
    20, 20, 20, 20, 20, 20, 20, 20,
    10, 10, 10, 10, 10, 10, 10, 10,
    10, 10, 10, 10, 10, 10, 10, 10,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHTS: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
];

#[rustfmt::skip]
const BISHOPS: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
const ROOKS: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const QUEENS: [i32; 64] = [
    -20, -10, -10, -5, -5, -10, -10, -20,
    -10,   0,   0,  0,  0,   0,   0, -10,
    -10,   0,   5,  5,  5,   5,   0, -10,
     -5,   0,   5,  5,  5,   5,   0,  -5,
      0,   0,   5,  5,  5,   5,   0,  -5,
    -10,   5,   5,  5,  5,   5,   0, -10,
    -10,   0,   5,  0,  0,   0,   0, -10,
    -20, -10, -10, -5, -5, -10, -10, -20,
];

#[rustfmt::skip]
const KING_START: [i32; 64] = [
    -80, -70, -70, -70, -70, -70, -70, -80,
    -60, -60, -60, -60, -60, -60, -60, -60,
    -40, -50, -50, -60, -60, -50, -50, -40,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -10, -20, -20, -20, -20, -20, -20, -10,
     20,  20, -15, -15, -15,  -5,  20,  20,
     20,  30,  10, -10,   0,  10,  30,  20,
];

#[rustfmt::skip]
const KING_END: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
     -5,   0,   5,   5,   5,   5,   0,  -5,
    -10,  -5,  20,  30,  30,  20,  -5, -10,
    -15, -10,  35,  45,  45,  35, -10, -15,
    -20, -15,  30,  40,  40,  30, -15, -20,
    -25, -20,  20,  25,  25,  20, -20, -25,
    -30, -25,   0,   0,   0,   0, -25, -30,
    -50, -30, -30, -30, -30, -30, -30, -50,
];
