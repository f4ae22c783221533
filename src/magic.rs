//! Magic number search.
//!
//! For every square and slider we look for a 64-bit multiplier that maps each
//! subset of the relevance mask to a table slot, such that two subsets only
//! share a slot when they also share the same attack set. Candidates are random
//! numbers with few bits set, which tend to hash well.

use std::fmt;

use rand::rngs::StdRng;
use rand::Rng;

use crate::bitboard::*;
use crate::error::{EngineError, Result};
use crate::masks::*;

/// Number of bits in the bishop relevance mask for each square
pub const BISHOP_RELEVANT_BITS: [u8; 64] = [
    6, 5, 5, 5, 5, 5, 5, 6,
    5, 5, 5, 5, 5, 5, 5, 5,
    5, 5, 7, 7, 7, 7, 5, 5,
    5, 5, 7, 9, 9, 7, 5, 5,
    5, 5, 7, 9, 9, 7, 5, 5,
    5, 5, 7, 7, 7, 7, 5, 5,
    5, 5, 5, 5, 5, 5, 5, 5,
    6, 5, 5, 5, 5, 5, 5, 6,
];

/// Number of bits in the rook relevance mask for each square
pub const ROOK_RELEVANT_BITS: [u8; 64] = [
    12, 11, 11, 11, 11, 11, 11, 12,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    12, 11, 11, 11, 11, 11, 11, 12,
];

/// Largest subset count for any square: 2^12 rook occupancies
pub const MAX_OCCUPANCIES: usize = 4096;

/// Trial cap used when no other limit is configured
pub const DEFAULT_MAX_TRIALS: u64 = 100_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slider {
    Bishop,
    Rook,
}

impl Slider {
    pub fn relevance_mask(self, sq: u8) -> Bitboard {
        match self {
            Slider::Bishop => mask_bishop_attacks(sq),
            Slider::Rook => mask_rook_attacks(sq),
        }
    }

    pub fn relevant_bits(self, sq: u8) -> u8 {
        match self {
            Slider::Bishop => BISHOP_RELEVANT_BITS[sq as usize],
            Slider::Rook => ROOK_RELEVANT_BITS[sq as usize],
        }
    }

    /// Reference ray walk, used to fill and to verify the tables
    pub fn attacks(self, sq: u8, occupied: Bitboard) -> Bitboard {
        match self {
            Slider::Bishop => generate_bishop_attacks(sq, occupied),
            Slider::Rook => generate_rook_attacks(sq, occupied),
        }
    }
}

impl fmt::Display for Slider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slider::Bishop => write!(f, "bishop"),
            Slider::Rook => write!(f, "rook"),
        }
    }
}

/// Hash an occupancy (already masked to the relevant squares) into a table slot
#[inline(always)]
pub fn magic_index(occupancy: Bitboard, magic: u64, relevant_bits: u8) -> usize {
    (occupancy.wrapping_mul(magic) >> (64 - relevant_bits as u32)) as usize
}

/// Distribute the low bits of `index` over the set bits of `mask`, lowest first.
/// Enumerating `index` over `0..1 << mask.count_ones()` visits every subset once.
pub fn occupancy_from_index(index: usize, mask: Bitboard) -> Bitboard {
    let mut occupancy = 0u64;
    for (bit, sq) in BitboardIter(mask).enumerate() {
        if index & (1 << bit) != 0 {
            set_bit(&mut occupancy, sq);
        }
    }
    occupancy
}

/// A random 64-bit number with few bits set
#[inline]
fn random_few_bits(rng: &mut StdRng) -> u64 {
    rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>()
}

/// Searches magic numbers with a seeded generator so the tables are reproducible.
pub struct MagicSearch {
    rng: StdRng,
    max_trials: u64,
    /// Scratch slot table reused across candidates
    used: Vec<Bitboard>,
    /// Trials spent by the last successful search
    pub last_trials: u64,
}

impl MagicSearch {
    pub fn new(rng: StdRng, max_trials: u64) -> Self {
        MagicSearch {
            rng,
            max_trials,
            used: vec![0; MAX_OCCUPANCIES],
            last_trials: 0,
        }
    }

    /// Find a magic number for `slider` on `sq`.
    ///
    /// Fails with `MagicNumberNotFound` once the trial cap is exhausted.
    pub fn find(&mut self, sq: u8, slider: Slider) -> Result<u64> {
        let mask = slider.relevance_mask(sq);
        let relevant_bits = mask.count_ones() as u8;
        let subsets = 1usize << relevant_bits;

        let occupancies: Vec<Bitboard> = (0..subsets).map(|i| occupancy_from_index(i, mask)).collect();
        let attacks: Vec<Bitboard> = occupancies.iter().map(|&occ| slider.attacks(sq, occ)).collect();

        for trial in 0..self.max_trials {
            let magic = random_few_bits(&mut self.rng);

            // Cheap density filter before the full validation pass
            if (mask.wrapping_mul(magic) & 0xFF00_0000_0000_0000).count_ones() < 6 {
                continue;
            }

            // Slider attack sets are never empty, so zero marks a free slot
            self.used[..subsets].fill(0);
            let collides = occupancies.iter().zip(&attacks).any(|(&occ, &att)| {
                let slot = &mut self.used[magic_index(occ, magic, relevant_bits)];
                if *slot == 0 {
                    *slot = att;
                    false
                } else {
                    *slot != att
                }
            });

            if !collides {
                self.last_trials = trial + 1;
                return Ok(magic);
            }
        }

        Err(EngineError::MagicNumberNotFound { square: sq, slider })
    }
}
