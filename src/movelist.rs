//! Fixed-capacity move buffer.
//!
//! Move generation fills a `MoveList` on the stack; the search then scores and
//! sorts it in place. Nothing here allocates.

use crate::moves::Move;

/// Upper bound on pseudo-legal moves in any reachable position (218), rounded up.
pub const MAX_MOVES: usize = 256;

/// Moves plus one ordering score per move.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    scores: [i32; MAX_MOVES],
    count: usize,
}

impl MoveList {
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            moves: [Move::NONE; MAX_MOVES],
            scores: [0; MAX_MOVES],
            count: 0,
        }
    }

    #[inline(always)]
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.count < MAX_MOVES, "MoveList overflow");
        self.moves[self.count] = mv;
        self.scores[self.count] = 0;
        self.count += 1;
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Get a move by index (copied out, so the list can stay borrowed mutably elsewhere).
    #[inline(always)]
    pub fn get(&self, idx: usize) -> Move {
        debug_assert!(idx < self.count, "MoveList index out of bounds");
        self.moves[idx]
    }

    #[inline(always)]
    pub fn get_score(&self, idx: usize) -> i32 {
        debug_assert!(idx < self.count, "MoveList index out of bounds");
        self.scores[idx]
    }

    #[inline(always)]
    pub fn set_score(&mut self, idx: usize, score: i32) {
        debug_assert!(idx < self.count, "MoveList index out of bounds");
        self.scores[idx] = score;
    }

    #[inline(always)]
    pub fn clear(&mut self) {
        self.count = 0;
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.count]
    }

    /// First move matching `mv` on source, target and promotion
    pub fn find_same(&self, mv: Move) -> Option<Move> {
        self.iter().find(|m| m.same_move(mv))
    }

    pub fn contains(&self, mv: Move) -> bool {
        self.as_slice().contains(&mv)
    }

    /// Sort by score, highest first. Merge sort: equal scores keep their
    /// generation order.
    pub fn sort_by_score(&mut self) {
        let n = self.count;
        if n < 2 {
            return;
        }
        let mut moves_buf = [Move::NONE; MAX_MOVES];
        let mut scores_buf = [0i32; MAX_MOVES];

        // Bottom-up passes over runs of width 1, 2, 4, ...
        let mut width = 1;
        while width < n {
            let mut start = 0;
            while start < n {
                let mid = (start + width).min(n);
                let end = (start + 2 * width).min(n);
                let (mut i, mut j, mut k) = (start, mid, start);
                while i < mid && j < end {
                    // Take from the left run on ties
                    if self.scores[i] >= self.scores[j] {
                        moves_buf[k] = self.moves[i];
                        scores_buf[k] = self.scores[i];
                        i += 1;
                    } else {
                        moves_buf[k] = self.moves[j];
                        scores_buf[k] = self.scores[j];
                        j += 1;
                    }
                    k += 1;
                }
                let left = mid - i;
                moves_buf[k..k + left].copy_from_slice(&self.moves[i..mid]);
                scores_buf[k..k + left].copy_from_slice(&self.scores[i..mid]);
                k += left;
                let right = end - j;
                moves_buf[k..k + right].copy_from_slice(&self.moves[j..end]);
                scores_buf[k..k + right].copy_from_slice(&self.scores[j..end]);
                start = end;
            }
            self.moves[..n].copy_from_slice(&moves_buf[..n]);
            self.scores[..n].copy_from_slice(&scores_buf[..n]);
            width *= 2;
        }
    }

    pub fn iter(&self) -> MoveListIter<'_> {
        MoveListIter { list: self, idx: 0 }
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over moves in a MoveList.
pub struct MoveListIter<'a> {
    list: &'a MoveList,
    idx: usize,
}

impl Iterator for MoveListIter<'_> {
    type Item = Move;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx < self.list.count {
            let mv = self.list.moves[self.idx];
            self.idx += 1;
            Some(mv)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.list.count - self.idx;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MoveListIter<'_> {}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveList")
            .field("count", &self.count)
            .field(
                "moves",
                &self.moves[..self.count.min(10)].iter().map(|m| m.to_uci()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Piece;
    use pretty_assertions::assert_eq;

    fn quiet(source: u8, target: u8) -> Move {
        Move::new(source, target, Piece::WhitePawn, None, 0)
    }

    #[test]
    fn test_movelist_basic() {
        let mut list = MoveList::new();
        assert!(list.is_empty());

        let m1 = quiet(52, 36); // e2e4
        let m2 = quiet(52, 44); // e2e3
        list.push(m1);
        list.push(m2);
        list.set_score(0, 100);
        list.set_score(1, 50);

        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0), m1);
        assert_eq!(list.get(1), m2);
        assert_eq!(list.get_score(0), 100);
        assert!(list.contains(m2));

        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn test_sort_descending() {
        let mut list = MoveList::new();
        let scores = [5, 300, -2, 40, 10000, 0, 40];
        for (i, &score) in scores.iter().enumerate() {
            list.push(quiet(i as u8, 20));
            list.set_score(i, score);
        }
        list.sort_by_score();
        let sorted: Vec<i32> = (0..list.len()).map(|i| list.get_score(i)).collect();
        assert_eq!(sorted, vec![10000, 300, 40, 40, 5, 0, -2]);
        assert_eq!(list.get(0), quiet(4, 20));
    }

    #[test]
    fn test_sort_is_stable() {
        let mut list = MoveList::new();
        // Many equal scores interleaved with a few distinct ones
        for i in 0..40u8 {
            list.push(quiet(i, 63 - i));
            list.set_score(i as usize, if i % 7 == 0 { 500 } else { 0 });
        }
        list.sort_by_score();

        let order: Vec<u8> = list.iter().map(|m| m.source()).collect();
        let mut expected: Vec<u8> = (0..40).filter(|i| i % 7 == 0).collect();
        expected.extend((0..40).filter(|i| i % 7 != 0));
        assert_eq!(order, expected);
    }

    #[test]
    fn test_find_same() {
        let mut list = MoveList::new();
        let promo = Move::new(12, 4, Piece::WhitePawn, Some(Piece::WhiteRook), 0);
        list.push(Move::new(12, 4, Piece::WhitePawn, Some(Piece::WhiteKnight), 0));
        list.push(promo);
        let typed = Move::new(12, 4, Piece::WhitePawn, Some(Piece::WhiteRook), 0);
        assert_eq!(list.find_same(typed), Some(promo));
        assert_eq!(list.find_same(quiet(12, 4)), None);
    }
}
