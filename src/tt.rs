use crate::search::CHECKMATE_BOUND;

/// Transposition table entry flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TTFlag {
    /// Exact score (PV node)
    Exact,
    /// Score is a lower bound (cut node - failed high)
    LowerBound,
    /// Score is an upper bound (all node - failed low)
    UpperBound,
}

/// A single entry in the transposition table
#[derive(Debug, Clone, Copy)]
pub struct TTEntry {
    /// Zobrist hash of the position
    pub hash: u64,
    /// Depth of the search when this entry was stored
    pub depth: u8,
    /// Score, with mate scores made relative to the stored node
    pub score: i32,
    pub flag: TTFlag,
}

impl TTEntry {
    pub fn empty() -> Self {
        TTEntry {
            hash: 0,
            depth: 0,
            score: 0,
            flag: TTFlag::Exact,
        }
    }
}

/// Fixed-size table indexed by `hash % len`. Every store overwrites its slot,
/// so a probe has to check the stored hash before trusting anything.
pub struct TranspositionTable {
    entries: Vec<TTEntry>,
    pub hits: u64,
    pub stores: u64,
    pub collisions: u64,
}

impl TranspositionTable {
    /// Create a new transposition table with approximately `size_mb` megabytes of memory
    pub fn new(size_mb: usize) -> Self {
        let entry_size = std::mem::size_of::<TTEntry>();
        Self::with_entries((size_mb * 1024 * 1024) / entry_size)
    }

    /// A table with exactly `count` slots (at least one)
    pub fn with_entries(count: usize) -> Self {
        TranspositionTable {
            entries: vec![TTEntry::empty(); count.max(1)],
            hits: 0,
            stores: 0,
            collisions: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash % self.entries.len() as u64) as usize
    }

    /// Look up a cutoff score for the position.
    ///
    /// Answers only when the stored hash matches, the stored depth is at least
    /// `depth`, the bound licenses a cutoff against the window, and the node is
    /// not the root (`ply == 0` always searches). Bound hits return the window
    /// edge they cut on.
    pub fn probe(&mut self, hash: u64, alpha: i32, beta: i32, depth: u8, ply: usize) -> Option<i32> {
        if ply == 0 {
            return None;
        }
        let entry = self.entries[self.index(hash)];
        if entry.hash != hash || entry.depth < depth {
            return None;
        }

        let score = score_from_tt(entry.score, ply);
        let cutoff = match entry.flag {
            TTFlag::Exact => Some(score),
            TTFlag::UpperBound if score <= alpha => Some(alpha),
            TTFlag::LowerBound if score >= beta => Some(beta),
            _ => None,
        };
        if cutoff.is_some() {
            self.hits += 1;
        }
        cutoff
    }

    /// Store a search result, replacing whatever occupied the slot
    pub fn store(&mut self, hash: u64, depth: u8, score: i32, flag: TTFlag, ply: usize) {
        let idx = self.index(hash);
        let existing = &self.entries[idx];
        if existing.hash != 0 && existing.hash != hash {
            self.collisions += 1;
        }

        self.entries[idx] = TTEntry {
            hash,
            depth,
            score: score_to_tt(score, ply),
            flag,
        };
        self.stores += 1;
    }

    /// Raw entry in the slot for `hash`, whichever position it belongs to
    pub fn entry(&self, hash: u64) -> &TTEntry {
        &self.entries[self.index(hash)]
    }

    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            *entry = TTEntry::empty();
        }
        self.hits = 0;
        self.stores = 0;
        self.collisions = 0;
    }

    /// Get the fill rate (percentage of entries used)
    pub fn fill_rate(&self) -> f64 {
        let used = self.entries.iter().filter(|e| e.hash != 0).count();
        (used as f64) / (self.entries.len() as f64) * 100.0
    }

    pub fn info(&self) -> String {
        format!(
            "TT: {} entries, {:.1}% filled, {} hits, {} stores, {} collisions",
            self.entries.len(),
            self.fill_rate(),
            self.hits,
            self.stores,
            self.collisions
        )
    }
}

/// Mate scores count plies from the root; in the table they count from the node.
fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score > CHECKMATE_BOUND {
        score + ply as i32
    } else if score < -CHECKMATE_BOUND {
        score - ply as i32
    } else {
        score
    }
}

fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score > CHECKMATE_BOUND {
        score - ply as i32
    } else if score < -CHECKMATE_BOUND {
        score + ply as i32
    } else {
        score
    }
}
