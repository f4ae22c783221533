use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{EngineError, Result};
use crate::types::Piece;

/// Zobrist hashing keys for chess positions.
/// These are pseudo-random u64 values XORed together to create a unique hash for each position.
#[derive(Clone)]
pub struct ZobristKeys {
    /// One key per (piece, square): 12 * 64 = 768 keys
    pub pieces: [[u64; 64]; 12],
    /// Keys for en passant file (0-7 for files a-h)
    pub en_passant: [u64; 8],
    /// One key per castling-rights bitmask
    pub castling: [u64; 16],
    /// Key for side to move (XORed when it's black's turn)
    pub side: u64,
}

impl ZobristKeys {
    /// Draw every key from a generator seeded with `seed`, so the same seed
    /// always produces the same hashes.
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        // A zero key would make its feature invisible to the hash
        let mut next = move || loop {
            let key: u64 = rng.gen();
            if key != 0 {
                break key;
            }
        };

        let mut pieces = [[0u64; 64]; 12];
        for piece_keys in pieces.iter_mut() {
            for key in piece_keys.iter_mut() {
                *key = next();
            }
        }

        let mut en_passant = [0u64; 8];
        for key in en_passant.iter_mut() {
            *key = next();
        }

        let mut castling = [0u64; 16];
        for key in castling.iter_mut() {
            *key = next();
        }

        let side = next();

        ZobristKeys {
            pieces,
            en_passant,
            castling,
            side,
        }
    }

    /// All-zero keys, i.e. not yet initialised. Only useful to exercise
    /// [`ZobristKeys::validate`].
    pub fn empty() -> Self {
        ZobristKeys {
            pieces: [[0; 64]; 12],
            en_passant: [0; 8],
            castling: [0; 16],
            side: 0,
        }
    }

    /// Fails with `HashKeysNotInitialized` if any key is zero.
    pub fn validate(&self) -> Result<()> {
        let all_set = self.side != 0
            && self.pieces.iter().flatten().all(|&k| k != 0)
            && self.en_passant.iter().all(|&k| k != 0)
            && self.castling.iter().all(|&k| k != 0);
        if all_set {
            Ok(())
        } else {
            Err(EngineError::HashKeysNotInitialized)
        }
    }

    #[inline(always)]
    pub fn piece_key(&self, piece: Piece, sq: u8) -> u64 {
        self.pieces[piece.index()][sq as usize]
    }

    /// Key for an en passant target square, by its file
    #[inline(always)]
    pub fn en_passant_key(&self, sq: u8) -> u64 {
        self.en_passant[(sq & 7) as usize]
    }

    #[inline(always)]
    pub fn castling_key(&self, rights: u8) -> u64 {
        self.castling[(rights & 15) as usize]
    }
}
