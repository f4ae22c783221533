//! Bitboard primitives.
//!
//! A bitboard is a 64-bit integer where each bit represents a square on the chess board.
//! Square indexing is rank-major from the top-left corner:
//! a8 = 0, b8 = 1, ..., h8 = 7, a7 = 8, ..., a1 = 56, ..., h1 = 63.
//! So `rank_index = sq / 8` counts down from the 8th rank and `file = sq % 8`.

pub type Bitboard = u64;

/// All squares except the a file
pub const NOT_A_FILE: Bitboard = 0xFEFE_FEFE_FEFE_FEFE;
/// All squares except the h file
pub const NOT_H_FILE: Bitboard = 0x7F7F_7F7F_7F7F_7F7F;
/// All squares except the g and h files
pub const NOT_HG_FILE: Bitboard = 0x3F3F_3F3F_3F3F_3F3F;
/// All squares except the a and b files
pub const NOT_AB_FILE: Bitboard = 0xFCFC_FCFC_FCFC_FCFC;

/// Set the bit for `sq`
#[inline(always)]
pub fn set_bit(bb: &mut Bitboard, sq: u8) {
    *bb |= 1u64 << sq;
}

/// Clear the bit for `sq` (no-op if it was not set)
#[inline(always)]
pub fn clear_bit(bb: &mut Bitboard, sq: u8) {
    *bb &= !(1u64 << sq);
}

/// Test the bit for `sq`
#[inline(always)]
pub const fn get_bit(bb: Bitboard, sq: u8) -> bool {
    bb & (1u64 << sq) != 0
}

#[inline(always)]
pub const fn pop_count(bb: Bitboard) -> u32 {
    bb.count_ones()
}

/// Index of the least significant set bit, or `None` for an empty board
#[inline(always)]
pub const fn ls1b_index(bb: Bitboard) -> Option<u8> {
    if bb == 0 {
        None
    } else {
        Some(bb.trailing_zeros() as u8)
    }
}

/// Convert a square index to a bitboard with that single bit set
#[inline(always)]
pub const fn sq_to_bb(sq: u8) -> Bitboard {
    1u64 << sq
}

/// Row index counted from the 8th rank (0 for a8..h8, 7 for a1..h1)
#[inline(always)]
pub const fn rank_of(sq: u8) -> u8 {
    sq >> 3
}

#[inline(always)]
pub const fn file_of(sq: u8) -> u8 {
    sq & 7
}

/// The same square seen from the other side of the board
#[inline(always)]
pub const fn mirror(sq: u8) -> u8 {
    sq ^ 56
}

/// Algebraic name of a square, e.g. 0 -> "a8", 63 -> "h1"
pub fn square_name(sq: u8) -> String {
    format!(
        "{}{}",
        (b'a' + file_of(sq)) as char,
        (b'8' - rank_of(sq)) as char
    )
}

/// Parse an algebraic square name ("e4") into an index
pub fn parse_square(s: &str) -> Option<u8> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = bytes[0].wrapping_sub(b'a');
    let rank = bytes[1].wrapping_sub(b'1');
    if file > 7 || rank > 7 {
        return None;
    }
    Some((7 - rank) * 8 + file)
}

/// Iterate over set bits in a bitboard, returning square indices
pub struct BitboardIter(pub Bitboard);

impl Iterator for BitboardIter {
    type Item = u8;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            None
        } else {
            let sq = self.0.trailing_zeros() as u8;
            self.0 &= self.0 - 1; // Clear the lowest set bit
            Some(sq)
        }
    }
}

/// Render a bitboard as an 8x8 grid with rank and file labels
pub fn render_bitboard(bb: Bitboard) -> String {
    let mut out = String::new();
    for rank in 0..8u8 {
        out.push_str(&format!("{}  ", 8 - rank));
        for file in 0..8u8 {
            out.push(if get_bit(bb, rank * 8 + file) { '1' } else { '.' });
            out.push(' ');
        }
        out.push('\n');
    }
    out.push_str("\n   a b c d e f g h\n");
    out
}
