//! Precomputed attack tables.
//!
//! Leaper attacks are plain per-square lookups. Slider attacks are indexed by
//! a magic hash of the relevant occupancy; see [`crate::magic`].

use std::time::Instant;

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bitboard::*;
use crate::config::TableConfig;
use crate::error::{EngineError, Result};
use crate::magic::*;
use crate::masks::*;
use crate::types::Color;

const BISHOP_TABLE_SIZE: usize = 512;
const ROOK_TABLE_SIZE: usize = 4096;

/// Per-square magic data for one slider
#[derive(Clone, Copy, Default)]
struct MagicEntry {
    mask: Bitboard,
    magic: u64,
    relevant_bits: u8,
}

impl MagicEntry {
    #[inline(always)]
    fn index(&self, occupied: Bitboard) -> usize {
        magic_index(occupied & self.mask, self.magic, self.relevant_bits)
    }
}

/// Immutable attack lookups for all six piece kinds.
#[derive(Clone)]
pub struct AttackTable {
    pawn: [[Bitboard; 64]; 2],
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
    bishop_magics: [MagicEntry; 64],
    rook_magics: [MagicEntry; 64],
    /// 64 blocks of 512 entries
    bishop: Vec<Bitboard>,
    /// 64 blocks of 4096 entries
    rook: Vec<Bitboard>,
}

impl AttackTable {
    /// Search magic numbers for every square, then fill the tables.
    pub fn build(config: &TableConfig) -> Result<Self> {
        let start = Instant::now();
        let mut search = MagicSearch::new(StdRng::seed_from_u64(config.magic_seed), config.max_magic_trials);

        let mut bishop = [0u64; 64];
        let mut rook = [0u64; 64];
        let mut trials = 0u64;
        for sq in 0..64u8 {
            bishop[sq as usize] = search.find(sq, Slider::Bishop)?;
            trials += search.last_trials;
        }
        for sq in 0..64u8 {
            rook[sq as usize] = search.find(sq, Slider::Rook)?;
            trials += search.last_trials;
        }
        debug!("Found 128 magic numbers in {:?} ({} candidates)", start.elapsed(), trials);

        Self::with_magics(&bishop, &rook)
    }

    /// Fill the tables from known magic numbers.
    ///
    /// Fails with `TableNotInitialized` if any magic is zero, and with
    /// `MagicNumberNotFound` if a magic maps two different attack sets to one slot.
    pub fn with_magics(bishop_magics: &[u64; 64], rook_magics: &[u64; 64]) -> Result<Self> {
        if bishop_magics.contains(&0) || rook_magics.contains(&0) {
            return Err(EngineError::TableNotInitialized);
        }

        let mut pawn = [[0u64; 64]; 2];
        let mut knight = [0u64; 64];
        let mut king = [0u64; 64];
        for sq in 0..64u8 {
            pawn[Color::White.index()][sq as usize] = mask_pawn_attacks(sq, Color::White);
            pawn[Color::Black.index()][sq as usize] = mask_pawn_attacks(sq, Color::Black);
            knight[sq as usize] = mask_knight_attacks(sq);
            king[sq as usize] = mask_king_attacks(sq);
        }

        let (bishop_entries, bishop) = fill_slider(Slider::Bishop, bishop_magics, BISHOP_TABLE_SIZE)?;
        let (rook_entries, rook) = fill_slider(Slider::Rook, rook_magics, ROOK_TABLE_SIZE)?;

        Ok(AttackTable {
            pawn,
            knight,
            king,
            bishop_magics: bishop_entries,
            rook_magics: rook_entries,
            bishop,
            rook,
        })
    }

    #[inline(always)]
    pub fn pawn_attacks(&self, color: Color, sq: u8) -> Bitboard {
        self.pawn[color.index()][sq as usize]
    }

    #[inline(always)]
    pub fn knight_attacks(&self, sq: u8) -> Bitboard {
        self.knight[sq as usize]
    }

    #[inline(always)]
    pub fn king_attacks(&self, sq: u8) -> Bitboard {
        self.king[sq as usize]
    }

    #[inline(always)]
    pub fn bishop_attacks(&self, sq: u8, occupied: Bitboard) -> Bitboard {
        let entry = &self.bishop_magics[sq as usize];
        self.bishop[sq as usize * BISHOP_TABLE_SIZE + entry.index(occupied)]
    }

    #[inline(always)]
    pub fn rook_attacks(&self, sq: u8, occupied: Bitboard) -> Bitboard {
        let entry = &self.rook_magics[sq as usize];
        self.rook[sq as usize * ROOK_TABLE_SIZE + entry.index(occupied)]
    }

    #[inline(always)]
    pub fn queen_attacks(&self, sq: u8, occupied: Bitboard) -> Bitboard {
        self.bishop_attacks(sq, occupied) | self.rook_attacks(sq, occupied)
    }

    pub fn slider_attacks(&self, slider: Slider, sq: u8, occupied: Bitboard) -> Bitboard {
        match slider {
            Slider::Bishop => self.bishop_attacks(sq, occupied),
            Slider::Rook => self.rook_attacks(sq, occupied),
        }
    }

    pub fn bishop_magics(&self) -> [u64; 64] {
        self.bishop_magics.map(|e| e.magic)
    }

    pub fn rook_magics(&self) -> [u64; 64] {
        self.rook_magics.map(|e| e.magic)
    }
}

fn fill_slider(slider: Slider, magics: &[u64; 64], block: usize) -> Result<([MagicEntry; 64], Vec<Bitboard>)> {
    let mut entries = [MagicEntry::default(); 64];
    let mut table = vec![0u64; 64 * block];

    for sq in 0..64u8 {
        let mask = slider.relevance_mask(sq);
        let entry = MagicEntry {
            mask,
            magic: magics[sq as usize],
            relevant_bits: mask.count_ones() as u8,
        };
        let slots = &mut table[sq as usize * block..(sq as usize + 1) * block];

        for i in 0..(1usize << entry.relevant_bits) {
            let occupancy = occupancy_from_index(i, mask);
            let attacks = slider.attacks(sq, occupancy);
            let slot = &mut slots[entry.index(occupancy)];
            if *slot != 0 && *slot != attacks {
                return Err(EngineError::MagicNumberNotFound { square: sq, slider });
            }
            *slot = attacks;
        }
        entries[sq as usize] = entry;
    }

    Ok((entries, table))
}
