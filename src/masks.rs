//! Raw attack patterns and evaluation masks.
//!
//! Everything here is a pure function of the square (and occupancy, for the
//! blocked ray walks). The lookup tables in [`crate::attacks`] are built from
//! these, and the magic search uses the ray walks as its reference answer.

use crate::bitboard::*;
use crate::types::Color;

/// Diagonal ray directions as (rank_delta, file_delta)
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Squares attacked by a pawn of `color` standing on `sq`
pub fn mask_pawn_attacks(sq: u8, color: Color) -> Bitboard {
    let pawn = sq_to_bb(sq);
    let mut attacks = 0u64;

    match color {
        // White pawns attack towards the 8th rank, i.e. towards lower indices
        Color::White => {
            if pawn & NOT_H_FILE != 0 {
                attacks |= pawn >> 7;
            }
            if pawn & NOT_A_FILE != 0 {
                attacks |= pawn >> 9;
            }
        }
        Color::Black => {
            if pawn & NOT_H_FILE != 0 {
                attacks |= pawn << 9;
            }
            if pawn & NOT_A_FILE != 0 {
                attacks |= pawn << 7;
            }
        }
    }
    attacks
}

pub fn mask_knight_attacks(sq: u8) -> Bitboard {
    let knight = sq_to_bb(sq);
    let mut attacks = 0u64;

    if knight & NOT_H_FILE != 0 {
        attacks |= knight >> 15;
        attacks |= knight << 17;
    }
    if knight & NOT_A_FILE != 0 {
        attacks |= knight >> 17;
        attacks |= knight << 15;
    }
    if knight & NOT_HG_FILE != 0 {
        attacks |= knight >> 6;
        attacks |= knight << 10;
    }
    if knight & NOT_AB_FILE != 0 {
        attacks |= knight >> 10;
        attacks |= knight << 6;
    }
    attacks
}

pub fn mask_king_attacks(sq: u8) -> Bitboard {
    let king = sq_to_bb(sq);
    // Vertical steps fall off the board on their own
    let mut attacks = (king >> 8) | (king << 8);

    if king & NOT_H_FILE != 0 {
        attacks |= king >> 7;
        attacks |= king << 9;
        attacks |= king << 1;
    }
    if king & NOT_A_FILE != 0 {
        attacks |= king >> 9;
        attacks |= king << 7;
        attacks |= king >> 1;
    }
    attacks
}

/// Walk each ray from `sq`. With `relevant_only` the ray stops one square
/// short of the edge; otherwise it stops on (and includes) the first blocker.
fn walk_rays(sq: u8, directions: &[(i8, i8); 4], occupied: Bitboard, relevant_only: bool) -> Bitboard {
    let rank = rank_of(sq) as i8;
    let file = file_of(sq) as i8;
    let (lo, hi) = if relevant_only { (1, 6) } else { (0, 7) };
    let mut attacks = 0u64;

    for &(dr, df) in directions {
        let mut r = rank + dr;
        let mut f = file + df;
        // A ray along a rank (dr == 0) or file (df == 0) is only bounded in the moving axis
        while (dr == 0 || (lo..=hi).contains(&r)) && (df == 0 || (lo..=hi).contains(&f)) {
            let target = (r * 8 + f) as u8;
            set_bit(&mut attacks, target);
            if get_bit(occupied, target) {
                break;
            }
            r += dr;
            f += df;
        }
    }
    attacks
}

/// Bishop relevance mask: the unblocked diagonals without the board edge
pub fn mask_bishop_attacks(sq: u8) -> Bitboard {
    walk_rays(sq, &BISHOP_DIRECTIONS, 0, true)
}

/// Rook relevance mask: the unblocked rank and file without the board edge
pub fn mask_rook_attacks(sq: u8) -> Bitboard {
    walk_rays(sq, &ROOK_DIRECTIONS, 0, true)
}

/// Actual bishop attacks for a given occupancy, blockers included
pub fn generate_bishop_attacks(sq: u8, occupied: Bitboard) -> Bitboard {
    walk_rays(sq, &BISHOP_DIRECTIONS, occupied, false)
}

/// Actual rook attacks for a given occupancy, blockers included
pub fn generate_rook_attacks(sq: u8, occupied: Bitboard) -> Bitboard {
    walk_rays(sq, &ROOK_DIRECTIONS, occupied, false)
}

/// Mask of a whole file and/or a whole row (row counted from the 8th rank)
pub fn generate_mask(file: Option<u8>, rank: Option<u8>) -> Bitboard {
    let mut mask = 0u64;
    for sq in 0..64u8 {
        if file == Some(file_of(sq)) || rank == Some(rank_of(sq)) {
            set_bit(&mut mask, sq);
        }
    }
    mask
}

/// File, rank and pawn-structure masks used by the evaluator
#[derive(Clone)]
pub struct EvaluationMasks {
    pub file: [Bitboard; 8],
    pub rank: [Bitboard; 8],
    /// Neighbouring files of each file
    pub isolated: [Bitboard; 8],
    /// Squares in front of a white pawn (own and adjacent files) that an enemy pawn could block
    pub white_passed: [Bitboard; 64],
    pub black_passed: [Bitboard; 64],
}

impl EvaluationMasks {
    pub fn new() -> Self {
        let mut file = [0u64; 8];
        let mut rank = [0u64; 8];
        let mut isolated = [0u64; 8];
        let mut white_passed = [0u64; 64];
        let mut black_passed = [0u64; 64];

        for i in 0..8u8 {
            rank[i as usize] = generate_mask(None, Some(i));
            file[i as usize] = generate_mask(Some(i), None);
        }
        for f in 0..8usize {
            if f > 0 {
                isolated[f] |= file[f - 1];
            }
            if f < 7 {
                isolated[f] |= file[f + 1];
            }
        }

        for sq in 0..64u8 {
            let f = file_of(sq) as usize;
            let r = rank_of(sq) as usize;
            let span = isolated[f] | file[f];

            // White pawns advance towards row 0, black pawns towards row 7
            white_passed[sq as usize] = span;
            black_passed[sq as usize] = span;
            for (row, &row_mask) in rank.iter().enumerate() {
                if row >= r {
                    white_passed[sq as usize] &= !row_mask;
                }
                if row <= r {
                    black_passed[sq as usize] &= !row_mask;
                }
            }
        }

        EvaluationMasks {
            file,
            rank,
            isolated,
            white_passed,
            black_passed,
        }
    }
}

impl Default for EvaluationMasks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> u8 {
        parse_square(name).unwrap()
    }

    fn bb(names: &[&str]) -> Bitboard {
        names.iter().fold(0, |acc, n| acc | sq_to_bb(sq(n)))
    }

    #[test]
    fn test_knight_attacks() {
        // Knight on e4 should attack d2, f2, c3, g3, c5, g5, d6, f6
        let attacks = mask_knight_attacks(sq("e4"));
        assert_eq!(attacks, bb(&["d2", "f2", "c3", "g3", "c5", "g5", "d6", "f6"]));
    }

    #[test]
    fn test_knight_corner() {
        assert_eq!(mask_knight_attacks(sq("a1")), bb(&["b3", "c2"]));
        assert_eq!(mask_knight_attacks(sq("h8")), bb(&["g6", "f7"]));
        assert_eq!(mask_knight_attacks(sq("b7")), bb(&["d8", "d6", "a5", "c5"]));
    }

    #[test]
    fn test_king_attacks() {
        assert_eq!(mask_king_attacks(sq("e4")).count_ones(), 8);
        assert_eq!(mask_king_attacks(sq("a1")), bb(&["a2", "b2", "b1"]));
        assert_eq!(mask_king_attacks(sq("h8")), bb(&["g8", "g7", "h7"]));
    }

    #[test]
    fn test_pawn_attacks() {
        assert_eq!(mask_pawn_attacks(sq("e4"), Color::White), bb(&["d5", "f5"]));
        assert_eq!(mask_pawn_attacks(sq("e5"), Color::Black), bb(&["d4", "f4"]));
        // No wrap-around on the edge files
        assert_eq!(mask_pawn_attacks(sq("a2"), Color::White), bb(&["b3"]));
        assert_eq!(mask_pawn_attacks(sq("h7"), Color::Black), bb(&["g6"]));
    }

    #[test]
    fn test_relevance_masks_skip_edges() {
        // Rook on a1: a2..a7 and b1..g1
        assert_eq!(mask_rook_attacks(sq("a1")).count_ones(), 12);
        assert_eq!(mask_rook_attacks(sq("e4")).count_ones(), 10);
        assert_eq!(mask_bishop_attacks(sq("a1")).count_ones(), 6);
        assert_eq!(mask_bishop_attacks(sq("e4")).count_ones(), 9);
        assert_eq!(mask_bishop_attacks(sq("e4")) & !NOT_H_FILE, 0);
    }

    #[test]
    fn test_rook_attacks_with_blockers() {
        // Rook on e4, with pieces on e2 and g4
        let attacks = generate_rook_attacks(sq("e4"), bb(&["e2", "g4"]));
        assert!(get_bit(attacks, sq("e2")));
        assert!(get_bit(attacks, sq("g4")));
        assert!(!get_bit(attacks, sq("e1")));
        assert!(!get_bit(attacks, sq("h4")));
        assert_eq!(generate_rook_attacks(sq("e4"), 0).count_ones(), 14);
    }

    #[test]
    fn test_bishop_attacks_with_blockers() {
        // Bishop on e4, with pieces on c2 and g6
        let attacks = generate_bishop_attacks(sq("e4"), bb(&["c2", "g6"]));
        assert!(get_bit(attacks, sq("c2")));
        assert!(get_bit(attacks, sq("g6")));
        assert!(!get_bit(attacks, sq("b1")));
        assert!(!get_bit(attacks, sq("h7")));
        assert_eq!(generate_bishop_attacks(sq("e4"), 0).count_ones(), 13);
    }

    #[test]
    fn test_evaluation_masks() {
        let masks = EvaluationMasks::new();
        assert_eq!(masks.file[0], !NOT_A_FILE);
        assert_eq!(masks.rank[0], 0xFF);
        assert_eq!(masks.isolated[0], masks.file[1]);
        assert_eq!(masks.isolated[4], masks.file[3] | masks.file[5]);

        // A white pawn on e5 is passed unless a black pawn sits on d6-f8
        let passed = masks.white_passed[sq("e5") as usize];
        assert_eq!(passed, bb(&["d6", "e6", "f6", "d7", "e7", "f7", "d8", "e8", "f8"]));

        // Black mirror: a black pawn on e4 looks down towards the first rank
        let passed = masks.black_passed[sq("e4") as usize];
        assert_eq!(passed, bb(&["d3", "e3", "f3", "d2", "e2", "f2", "d1", "e1", "f1"]));
    }
}
