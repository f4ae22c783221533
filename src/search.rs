use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::board::Board;
use crate::config::SearchConfig;
use crate::error::Result;
use crate::evaluate::static_evaluate;
use crate::moves::Move;
use crate::movelist::MoveList;
use crate::tt::{TTFlag, TranspositionTable};
use crate::types::PieceType;

/// Score of being mated at the root; a mate `n` plies away scores `CHECKMATE_SCORE - n`
pub const CHECKMATE_SCORE: i32 = 49_000;
/// Anything beyond this is a mate score
pub const CHECKMATE_BOUND: i32 = 48_000;
pub const INF: i32 = 50_000;
pub const DRAW_SCORE: i32 = 0;
/// Deepest ply the search will reach, quiescence included
pub const MAX_PLY: usize = 64;

// Move ordering priorities
const PV_SCORE: i32 = 15_000;
const CAPTURE_SCORE: i32 = 10_000;
const FIRST_KILLER_SCORE: i32 = 5_000;
const SECOND_KILLER_SCORE: i32 = 1_000;
const HISTORY_SCORE: i32 = 100;

/// Most valuable victim, least valuable attacker: PxQ = 505, QxP = 101
#[inline]
fn mvv_lva(attacker: PieceType, victim: PieceType) -> i32 {
    (victim.index() as i32 + 1) * 100 + 5 - attacker.index() as i32
}

/// Search abort error - returned when a time or node limit is hit mid-search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchAborted;

/// Deadline, node budget and external stop signal for one search
#[derive(Debug)]
pub struct SearchControl {
    pub start_time: Instant,
    pub time_limit: Option<Duration>,
    pub node_limit: Option<u64>,
    pub stop: Arc<AtomicBool>,
}

impl SearchControl {
    pub fn new(time_limit: Option<Duration>, node_limit: Option<u64>) -> Self {
        Self {
            start_time: Instant::now(),
            time_limit,
            node_limit,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a search control that never times out (for fixed depth searches)
    pub fn infinite() -> Self {
        Self::new(None, None)
    }

    /// Check if we should abort the search (called at every node)
    #[inline]
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }

        // Limits are only looked at every 2048 nodes
        if nodes & 2047 != 0 {
            return false;
        }
        if self.node_limit.is_some_and(|limit| nodes >= limit) {
            return true;
        }
        self.time_limit.is_some_and(|limit| self.start_time.elapsed() >= limit)
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Signal the search to stop
    pub fn signal_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Default for SearchControl {
    fn default() -> Self {
        Self::infinite()
    }
}

/// Outcome of the last fully completed iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: i32,
    pub pv: Vec<Move>,
    pub depth: u8,
    pub nodes: u64,
}

impl SearchResult {
    /// Moves to mate, positive when the side to move mates
    pub fn mate_in(&self) -> Option<i32> {
        if self.score > CHECKMATE_BOUND {
            Some((CHECKMATE_SCORE - self.score + 1) / 2)
        } else if self.score < -CHECKMATE_BOUND {
            Some(-(CHECKMATE_SCORE + self.score) / 2)
        } else {
            None
        }
    }

    pub fn pv_string(&self) -> String {
        pv_to_string(&self.pv)
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let best = self.best_move.map_or("none".to_string(), |m| m.to_uci());
        write!(
            f,
            "depth {} score {} nodes {} bestmove {} pv {}",
            self.depth,
            self.score,
            self.nodes,
            best,
            self.pv_string()
        )
    }
}

fn pv_to_string(pv: &[Move]) -> String {
    pv.iter().map(|m| m.to_uci()).collect::<Vec<_>>().join(" ")
}

/// Iterative-deepening negamax over one root position.
///
/// Owns the transposition table, the ordering heuristics and the hashes of
/// every position seen so far (game moves plus the current search line), so
/// repetitions are found across both.
pub struct Search<'t> {
    board: Board<'t>,
    config: SearchConfig,
    tt: TranspositionTable,
    control: SearchControl,
    stop: Arc<AtomicBool>,

    killers: [[Move; MAX_PLY + 1]; 2],
    /// Last quiet move that raised alpha, by moving piece and target square
    history: [[Move; 64]; 12],
    pv_table: [[Move; MAX_PLY + 1]; MAX_PLY + 1],
    pv_length: [usize; MAX_PLY + 1],
    ply: usize,
    follow_pv: bool,
    score_pv: bool,
    best_move: Move,

    repetitions: Vec<u64>,
    nodes: u64,
}

impl<'t> Search<'t> {
    pub fn new(board: Board<'t>, config: SearchConfig) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        Search {
            board,
            tt: TranspositionTable::new(config.tt_size_mb),
            control: SearchControl::infinite(),
            stop,
            config,
            killers: [[Move::NONE; MAX_PLY + 1]; 2],
            history: [[Move::NONE; 64]; 12],
            pv_table: [[Move::NONE; MAX_PLY + 1]; MAX_PLY + 1],
            pv_length: [0; MAX_PLY + 1],
            ply: 0,
            follow_pv: false,
            score_pv: false,
            best_move: Move::NONE,
            repetitions: Vec::with_capacity(256),
            nodes: 0,
        }
    }

    pub fn board(&self) -> &Board<'t> {
        &self.board
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Setting the returned flag stops a running search at its next node
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Replace the root position and forget the game history
    pub fn set_board(&mut self, board: Board<'t>) {
        self.board = board;
        self.repetitions.clear();
    }

    /// Play a game move, remembering the position it left for repetition checks
    pub fn play_uci_move(&mut self, notation: &str) -> Result<Move> {
        let hash = self.board.hash();
        let mv = self.board.apply_uci_move(notation)?;
        self.repetitions.push(hash);
        Ok(mv)
    }

    /// Has the current position occurred before, in the game or the search line?
    pub fn is_repetition(&self) -> bool {
        let hash = self.board.hash();
        self.repetitions.iter().any(|&h| h == hash)
    }

    pub fn evaluate(&self) -> i32 {
        static_evaluate(&self.board, self.config.phase_rule)
    }

    fn reset_search_state(&mut self) {
        self.killers = [[Move::NONE; MAX_PLY + 1]; 2];
        self.history = [[Move::NONE; 64]; 12];
        self.pv_table = [[Move::NONE; MAX_PLY + 1]; MAX_PLY + 1];
        self.pv_length = [0; MAX_PLY + 1];
        self.ply = 0;
        self.follow_pv = false;
        self.score_pv = false;
        self.best_move = Move::NONE;
        self.nodes = 0;
    }

    /// Ordering priority of a move at the current ply
    pub fn score_move(&mut self, mv: Move) -> i32 {
        if self.score_pv && self.pv_table[0][self.ply] == mv {
            // Only the first match per ply
            self.score_pv = false;
            return PV_SCORE;
        }

        if mv.is_capture() {
            // En passant leaves the target empty; the victim is still a pawn
            let victim = self.board.piece_at(mv.target()).map_or(PieceType::Pawn, |p| p.piece_type());
            return mvv_lva(mv.piece().piece_type(), victim) + CAPTURE_SCORE;
        }

        if self.killers[0][self.ply] == mv {
            FIRST_KILLER_SCORE
        } else if self.killers[1][self.ply] == mv {
            SECOND_KILLER_SCORE
        } else if self.history[mv.piece().index()][mv.target() as usize] == mv {
            HISTORY_SCORE
        } else {
            0
        }
    }

    /// Score every move, then sort best first keeping generation order on ties
    pub fn sort_moves(&mut self, moves: &mut MoveList) {
        for i in 0..moves.len() {
            let score = self.score_move(moves.get(i));
            moves.set_score(i, score);
        }
        moves.sort_by_score();
    }

    /// Keep following the previous principal variation only while its move at
    /// this ply is among the generated moves.
    fn update_pv_score(&mut self, moves: &MoveList) {
        self.follow_pv = false;
        if moves.contains(self.pv_table[0][self.ply]) {
            self.score_pv = true;
            self.follow_pv = true;
        }
    }

    /// Try a move one ply deeper. Returns the position to restore, or `None`
    /// if the move was illegal and nothing changed.
    fn make(&mut self, mv: Move) -> Option<Board<'t>> {
        let snapshot = self.board;
        if !self.board.make_move(mv) {
            return None;
        }
        self.repetitions.push(snapshot.hash());
        self.ply += 1;
        Some(snapshot)
    }

    fn make_null(&mut self) -> Board<'t> {
        let snapshot = self.board;
        self.board.make_null_move();
        self.repetitions.push(snapshot.hash());
        self.ply += 1;
        snapshot
    }

    fn unmake(&mut self, snapshot: Board<'t>) {
        self.repetitions.pop();
        self.ply -= 1;
        self.board = snapshot;
    }

    #[inline]
    fn count_node(&mut self) -> std::result::Result<(), SearchAborted> {
        self.nodes += 1;
        if self.control.should_stop(self.nodes) {
            return Err(SearchAborted);
        }
        Ok(())
    }

    /// Captures-only search below the nominal depth
    fn quiescence(&mut self, mut alpha: i32, beta: i32) -> std::result::Result<i32, SearchAborted> {
        self.count_node()?;

        let eval = self.evaluate();
        if self.ply >= MAX_PLY {
            return Ok(eval);
        }
        if eval >= beta {
            return Ok(beta);
        }
        if eval > alpha {
            alpha = eval;
        }

        let mut moves = self.board.generate_captures();
        self.sort_moves(&mut moves);

        for mv in moves.iter() {
            let Some(snapshot) = self.make(mv) else {
                continue;
            };
            let result = self.quiescence(-beta, -alpha);
            self.unmake(snapshot);
            let score = -result?;

            if score >= beta {
                return Ok(beta);
            }
            if score > alpha {
                alpha = score;
            }
        }

        Ok(alpha)
    }

    fn negamax(&mut self, mut alpha: i32, beta: i32, mut depth: i32) -> std::result::Result<i32, SearchAborted> {
        self.pv_length[self.ply] = self.ply;
        self.count_node()?;

        if self.ply > 0 && self.is_repetition() {
            return Ok(DRAW_SCORE);
        }

        let hash = self.board.hash();
        let pv_node = beta - alpha > 1;
        if !pv_node {
            if let Some(score) = self.tt.probe(hash, alpha, beta, depth.max(0) as u8, self.ply) {
                return Ok(score);
            }
        }

        if depth <= 0 {
            return self.quiescence(alpha, beta);
        }
        if self.ply >= MAX_PLY {
            return Ok(self.evaluate());
        }

        let in_check = self.board.is_king_in_check();
        if in_check {
            depth += 1;
        }

        let null_reduction = self.config.null_move_reduction as i32;
        if self.config.null_move && depth >= null_reduction && !in_check && self.ply > 0 {
            let snapshot = self.make_null();
            let result = self.negamax(-beta, -beta + 1, depth - null_reduction);
            self.unmake(snapshot);
            if -result? >= beta {
                return Ok(beta);
            }
        }

        let mut moves = self.board.generate_moves();
        if self.follow_pv {
            self.update_pv_score(&moves);
        }
        self.sort_moves(&mut moves);

        let mut flag = TTFlag::UpperBound;
        let mut legal_moves = 0;
        let mut moves_searched = 0;

        for mv in moves.iter() {
            let Some(snapshot) = self.make(mv) else {
                continue;
            };
            legal_moves += 1;

            let result = self.search_move(mv, alpha, beta, depth, moves_searched, in_check);
            self.unmake(snapshot);
            let score = result?;
            moves_searched += 1;

            let ply = self.ply;
            if score >= beta {
                self.tt.store(hash, depth as u8, beta, TTFlag::LowerBound, ply);
                if !mv.is_capture() {
                    self.killers[1][ply] = self.killers[0][ply];
                    self.killers[0][ply] = mv;
                }
                return Ok(beta);
            }

            if score > alpha {
                flag = TTFlag::Exact;
                if !mv.is_capture() {
                    self.history[mv.piece().index()][mv.target() as usize] = mv;
                }
                alpha = score;

                // Triangular PV: this move followed by the child's line
                self.pv_table[ply][ply] = mv;
                for next in ply + 1..self.pv_length[ply + 1] {
                    self.pv_table[ply][next] = self.pv_table[ply + 1][next];
                }
                self.pv_length[ply] = self.pv_length[ply + 1];

                if ply == 0 {
                    self.best_move = mv;
                }
            }
        }

        if legal_moves == 0 {
            return Ok(if in_check {
                -CHECKMATE_SCORE + self.ply as i32
            } else {
                DRAW_SCORE
            });
        }

        self.tt.store(hash, depth as u8, alpha, flag, self.ply);
        Ok(alpha)
    }

    /// Score of a move already made: full window for the first move, then a
    /// null-window probe (reduced for late quiet moves) that is widened only
    /// when it beats alpha.
    fn search_move(
        &mut self,
        mv: Move,
        alpha: i32,
        beta: i32,
        depth: i32,
        moves_searched: usize,
        in_check: bool,
    ) -> std::result::Result<i32, SearchAborted> {
        if moves_searched == 0 {
            return Ok(-self.negamax(-beta, -alpha, depth - 1)?);
        }

        let reducible = self.config.lmr
            && moves_searched >= self.config.full_depth_moves
            && depth >= self.config.reduction_limit as i32
            && !in_check
            && !mv.is_capture()
            && mv.promoted().is_none();

        let mut score = if reducible {
            -self.negamax(-alpha - 1, -alpha, depth - 2)?
        } else {
            alpha + 1
        };

        if score > alpha {
            score = -self.negamax(-alpha - 1, -alpha, depth - 1)?;
            if score > alpha && score < beta {
                score = -self.negamax(-beta, -alpha, depth - 1)?;
            }
        }
        Ok(score)
    }

    /// Principal variation of the last iteration
    pub fn pv(&self) -> Vec<Move> {
        self.pv_table[0][..self.pv_length[0]].to_vec()
    }

    pub fn pv_string(&self) -> String {
        pv_to_string(&self.pv())
    }

    /// Iterative deepening up to `max_depth`, with an aspiration window around
    /// each iteration's score. A score outside the window re-searches the same
    /// depth with a full window. An iteration cut short by the time or node
    /// limit is thrown away.
    pub fn search(&mut self) -> SearchResult {
        self.reset_search_state();
        self.stop.store(false, Ordering::Relaxed);
        self.control = SearchControl {
            stop: Arc::clone(&self.stop),
            ..SearchControl::new(self.config.time_limit, self.config.node_limit)
        };

        let root = self.board;
        let history_len = self.repetitions.len();
        let window = self.config.aspiration_window;
        let mut alpha = -INF;
        let mut beta = INF;
        let mut result = SearchResult {
            best_move: None,
            score: 0,
            pv: Vec::new(),
            depth: 0,
            nodes: 0,
        };

        let mut depth = 1;
        while depth <= self.config.max_depth {
            self.follow_pv = true;

            let score = match self.negamax(alpha, beta, depth as i32) {
                Ok(score) => score,
                Err(SearchAborted) => {
                    self.board = root;
                    self.repetitions.truncate(history_len);
                    self.ply = 0;
                    info!(
                        "Search stopped during depth {} after {} nodes ({} ms)",
                        depth,
                        self.nodes,
                        self.control.elapsed_ms()
                    );
                    break;
                }
            };

            let full_window = alpha == -INF && beta == INF;
            if !full_window && (score <= alpha || score >= beta) {
                debug!(
                    "Aspiration miss at depth {}: score {} outside [{}, {}]",
                    depth, score, alpha, beta
                );
                alpha = -INF;
                beta = INF;
                continue;
            }

            alpha = score - window;
            beta = score + window;

            result = SearchResult {
                best_move: (!self.best_move.is_none()).then_some(self.best_move),
                score,
                pv: self.pv(),
                depth,
                nodes: self.nodes,
            };
            info!(
                "depth {} score {} nodes {} time {} ms pv {}",
                depth,
                score,
                self.nodes,
                self.control.elapsed_ms(),
                result.pv_string()
            );
            depth += 1;
        }

        debug!("{}", self.tt.info());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::STARTING_POSITION_FEN;
    use crate::tables::test_tables;
    use pretty_assertions::assert_eq;

    fn search(fen: &str, config: SearchConfig) -> Search<'static> {
        Search::new(Board::from_fen(test_tables(), fen).unwrap(), config.tt_size_mb(1))
    }

    #[test]
    fn test_mvv_lva_order() {
        assert_eq!(mvv_lva(PieceType::Pawn, PieceType::Queen), 505);
        assert_eq!(mvv_lva(PieceType::Queen, PieceType::Pawn), 101);
        assert!(mvv_lva(PieceType::Knight, PieceType::Rook) > mvv_lva(PieceType::Rook, PieceType::Rook));
        assert!(mvv_lva(PieceType::King, PieceType::Queen) > mvv_lva(PieceType::Pawn, PieceType::Rook));
    }

    #[test]
    fn test_score_move_priorities() {
        let mut s = search("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1", SearchConfig::default());
        let capture = s.board().parse_move("e4d5").unwrap();
        let quiet = s.board().parse_move("e4e5").unwrap();
        let king = s.board().parse_move("e1d1").unwrap();

        assert_eq!(s.score_move(capture), CAPTURE_SCORE + 505);
        assert_eq!(s.score_move(quiet), 0);

        s.killers[0][0] = quiet;
        s.killers[1][0] = king;
        assert_eq!(s.score_move(quiet), FIRST_KILLER_SCORE);
        assert_eq!(s.score_move(king), SECOND_KILLER_SCORE);

        s.killers = [[Move::NONE; MAX_PLY + 1]; 2];
        s.history[king.piece().index()][king.target() as usize] = king;
        assert_eq!(s.score_move(king), HISTORY_SCORE);

        // The PV move outranks everything, once
        s.pv_table[0][0] = quiet;
        s.score_pv = true;
        assert_eq!(s.score_move(quiet), PV_SCORE);
        assert_eq!(s.score_move(quiet), 0);
    }

    #[test]
    fn test_en_passant_scores_as_pawn_capture() {
        let mut s = search("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1", SearchConfig::default());
        let ep = s.board().parse_move("e5d6").unwrap();
        assert!(ep.is_en_passant());
        assert_eq!(s.score_move(ep), CAPTURE_SCORE + 105);
    }

    #[test]
    fn test_sort_moves_keeps_generation_order_for_quiet_moves() {
        let mut s = search(STARTING_POSITION_FEN, SearchConfig::default());
        let mut moves = s.board().generate_moves();
        let before: Vec<Move> = moves.iter().collect();

        // A killer jumps to the front, everything else keeps its order
        let killer = moves.get(7);
        s.killers[0][0] = killer;
        s.sort_moves(&mut moves);

        let after: Vec<Move> = moves.iter().collect();
        let mut expected = vec![killer];
        expected.extend(before.iter().copied().filter(|&m| m != killer));
        assert_eq!(after, expected);
    }

    #[test]
    fn test_repetition_from_game_history() {
        let mut s = search(STARTING_POSITION_FEN, SearchConfig::default());
        for mv in ["g1f3", "g8f6", "f3g1"] {
            s.play_uci_move(mv).unwrap();
            assert!(!s.is_repetition());
        }
        s.play_uci_move("f6g8").unwrap();
        assert!(s.is_repetition());
    }

    #[test]
    fn test_play_uci_move_errors_leave_history_alone() {
        let mut s = search(STARTING_POSITION_FEN, SearchConfig::default());
        assert!(s.play_uci_move("e2e5").is_err());
        assert!(s.play_uci_move("zz").is_err());
        assert!(s.repetitions.is_empty());
    }

    #[test]
    fn test_mate_in_one() {
        let mut s = search("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", SearchConfig::new().max_depth(3));
        let result = s.search();
        assert_eq!(result.best_move.map(|m| m.to_uci()), Some("a1a8".to_string()));
        assert_eq!(result.score, CHECKMATE_SCORE - 1);
        assert_eq!(result.mate_in(), Some(1));
        assert_eq!(result.pv[0].to_uci(), "a1a8");
        assert_eq!(result.depth, 3);
    }

    #[test]
    fn test_checkmated_root() {
        // Fool's mate, white to move and mated
        let fen = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
        let mut s = search(fen, SearchConfig::new().max_depth(2));
        let result = s.search();
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, -CHECKMATE_SCORE);
    }

    #[test]
    fn test_stalemate_scores_draw() {
        let mut s = search("k7/8/1Q6/8/8/8/8/7K b - - 0 1", SearchConfig::new().max_depth(2));
        let result = s.search();
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, DRAW_SCORE);
    }

    #[test]
    fn test_search_restores_root_position() {
        let mut s = search(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            SearchConfig::new().max_depth(3),
        );
        let before = *s.board();
        let result = s.search();
        assert_eq!(*s.board(), before);
        assert!(s.repetitions.is_empty());
        assert!(result.best_move.is_some());
        assert_eq!(result.pv.first().copied(), result.best_move);
    }

    #[test]
    fn test_node_limit_discards_unfinished_iteration() {
        let mut s = search(STARTING_POSITION_FEN, SearchConfig::new().max_depth(30).node_limit(4096));
        let before = *s.board();
        let result = s.search();
        assert!(result.depth >= 1 && result.depth < 30);
        assert!(result.best_move.is_some());
        assert!(result.nodes <= 4096);
        assert_eq!(*s.board(), before);
    }

    #[test]
    fn test_stop_signal_is_seen_immediately() {
        let control = SearchControl::infinite();
        assert!(!control.should_stop(1));
        control.signal_stop();
        assert!(control.should_stop(1));
    }

    #[test]
    fn test_search_clears_stale_stop_signal() {
        let mut s = search(STARTING_POSITION_FEN, SearchConfig::new().max_depth(2));
        s.stop_handle().store(true, Ordering::Relaxed);
        assert_eq!(s.search().depth, 2);
    }

    #[test]
    fn test_search_control_polls_every_2048_nodes() {
        let control = SearchControl::new(Some(Duration::ZERO), Some(10));
        assert!(!control.should_stop(100));
        assert!(!control.should_stop(2047));
        assert!(control.should_stop(2048));
        assert!(!SearchControl::infinite().should_stop(4096));
    }
}
