//! Table-construction and search configuration.

use std::time::Duration;

use crate::magic::DEFAULT_MAX_TRIALS;

/// Seeds and limits for building the precomputed tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Seed for the magic-number candidate generator
    pub magic_seed: u64,
    /// Seed for the Zobrist key generator
    pub zobrist_seed: u64,
    /// Candidates tried per square before giving up
    pub max_magic_trials: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            magic_seed: 1804289383,
            zobrist_seed: 0x1234_5678_90AB_CDEF,
            max_magic_trials: DEFAULT_MAX_TRIALS,
        }
    }
}

/// How the evaluator decides between opening, middlegame and endgame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseRule {
    /// Any position with material at or below the opening threshold scores
    /// as an endgame; there is no middlegame blend.
    #[default]
    Observed,
    /// Compare material against both thresholds and interpolate in between.
    Material,
}

/// Search parameters for the engine
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum iterative-deepening depth in plies
    pub max_depth: u8,

    /// Transposition table size in megabytes
    pub tt_size_mb: usize,

    /// Half-width of the aspiration window in centipawns
    pub aspiration_window: i32,

    pub null_move: bool,

    /// Depth taken off the null-move search; also its minimum depth
    pub null_move_reduction: u8,

    pub lmr: bool,

    /// Moves searched at full depth before reductions kick in
    pub full_depth_moves: usize,

    /// Minimum remaining depth for a reduction
    pub reduction_limit: u8,

    pub time_limit: Option<Duration>,

    pub node_limit: Option<u64>,

    pub phase_rule: PhaseRule,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            tt_size_mb: 16,
            aspiration_window: 50,
            null_move: true,
            null_move_reduction: 3,
            lmr: true,
            full_depth_moves: 4,
            reduction_limit: 3,
            time_limit: None,
            node_limit: None,
            phase_rule: PhaseRule::Observed,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn tt_size_mb(mut self, size_mb: usize) -> Self {
        self.tt_size_mb = size_mb;
        self
    }

    pub fn aspiration_window(mut self, window: i32) -> Self {
        self.aspiration_window = window;
        self
    }

    pub fn null_move(mut self, enabled: bool) -> Self {
        self.null_move = enabled;
        self
    }

    pub fn lmr(mut self, enabled: bool) -> Self {
        self.lmr = enabled;
        self
    }

    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    pub fn phase_rule(mut self, rule: PhaseRule) -> Self {
        self.phase_rule = rule;
        self
    }
}
