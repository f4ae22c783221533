//! Bitboard position: piece placement, side to move, castling rights, en
//! passant target and an incrementally maintained Zobrist hash.
//!
//! A `Board` is `Copy`. Trial moves are made on the board itself and undone by
//! restoring a copy taken beforehand.

use std::fmt;

use crate::bitboard::*;
use crate::error::{EngineError, Result};
use crate::moves::Move;
use crate::tables::Tables;
use crate::types::*;

pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Indices into `occupancies`
const BOTH: usize = 2;

/// Castling rights that survive a move touching each square
#[rustfmt::skip]
const CASTLE_STATE: [u8; 64] = [
     7, 15, 15, 15,  3, 15, 15, 11,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    13, 15, 15, 15, 12, 15, 15, 14,
];

// Squares involved in castling
pub(crate) const A8: u8 = 0;
pub(crate) const B8: u8 = 1;
pub(crate) const C8: u8 = 2;
pub(crate) const D8: u8 = 3;
pub(crate) const E8: u8 = 4;
pub(crate) const F8: u8 = 5;
pub(crate) const G8: u8 = 6;
pub(crate) const H8: u8 = 7;
pub(crate) const A1: u8 = 56;
pub(crate) const B1: u8 = 57;
pub(crate) const C1: u8 = 58;
pub(crate) const D1: u8 = 59;
pub(crate) const E1: u8 = 60;
pub(crate) const F1: u8 = 61;
pub(crate) const G1: u8 = 62;
pub(crate) const H1: u8 = 63;

#[derive(Clone, Copy)]
pub struct Board<'t> {
    tables: &'t Tables,
    bitboards: [Bitboard; 12],
    /// White, black, both
    occupancies: [Bitboard; 3],
    side: Color,
    castling: u8,
    en_passant: Option<u8>,
    hash: u64,
}

impl<'t> Board<'t> {
    /// A board with no pieces, white to move
    pub fn empty(tables: &'t Tables) -> Self {
        let mut board = Board {
            tables,
            bitboards: [0; 12],
            occupancies: [0; 3],
            side: Color::White,
            castling: 0,
            en_passant: None,
            hash: 0,
        };
        board.hash = board.hash_from_scratch();
        board
    }

    pub fn starting_position(tables: &'t Tables) -> Self {
        let mut board = Board::empty(tables);
        board.bitboards = [
            0x00FF_0000_0000_0000, // P: a2-h2
            0x4200_0000_0000_0000, // N: b1, g1
            0x2400_0000_0000_0000, // B: c1, f1
            0x8100_0000_0000_0000, // R: a1, h1
            0x0800_0000_0000_0000, // Q: d1
            0x1000_0000_0000_0000, // K: e1
            0x0000_0000_0000_FF00, // p: a7-h7
            0x0000_0000_0000_0042,
            0x0000_0000_0000_0024,
            0x0000_0000_0000_0081,
            0x0000_0000_0000_0008,
            0x0000_0000_0000_0010,
        ];
        board.castling = WHITE_KINGSIDE | WHITE_QUEENSIDE | BLACK_KINGSIDE | BLACK_QUEENSIDE;
        board.update_occupancies();
        board.hash = board.hash_from_scratch();
        board
    }

    /// Parse a FEN string. The halfmove and fullmove counters are optional and ignored.
    pub fn from_fen(tables: &'t Tables, fen: &str) -> Result<Self> {
        let invalid = || EngineError::InvalidFen(fen.to_string());
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 || parts.len() > 6 {
            return Err(invalid());
        }

        let mut board = Board::empty(tables);

        let rows: Vec<&str> = parts[0].split('/').collect();
        if rows.len() != 8 {
            return Err(invalid());
        }
        for (rank, row) in rows.iter().enumerate() {
            let mut file = 0u8;
            for c in row.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if skip == 0 || skip > 8 {
                        return Err(invalid());
                    }
                    file += skip as u8;
                } else {
                    let piece = Piece::from_char(c).ok_or_else(invalid)?;
                    if file > 7 {
                        return Err(invalid());
                    }
                    set_bit(&mut board.bitboards[piece.index()], rank as u8 * 8 + file);
                    file += 1;
                }
                if file > 8 {
                    return Err(invalid());
                }
            }
            if file != 8 {
                return Err(invalid());
            }
        }

        let mut side_chars = parts[1].chars();
        board.side = match (side_chars.next().and_then(Color::from_char), side_chars.next()) {
            (Some(color), None) => color,
            _ => return Err(invalid()),
        };

        if parts[2] != "-" {
            for c in parts[2].chars() {
                board.castling |= match c {
                    'K' => WHITE_KINGSIDE,
                    'Q' => WHITE_QUEENSIDE,
                    'k' => BLACK_KINGSIDE,
                    'q' => BLACK_QUEENSIDE,
                    _ => return Err(invalid()),
                };
            }
        }

        if parts[3] != "-" {
            let sq = parse_square(parts[3]).ok_or_else(invalid)?;
            // Only the 3rd and 6th ranks can hold an en passant target
            if rank_of(sq) != 2 && rank_of(sq) != 5 {
                return Err(invalid());
            }
            board.en_passant = Some(sq);
        }

        for counter in &parts[4..] {
            counter.parse::<u32>().map_err(|_| invalid())?;
        }

        if board.bitboards[Piece::WhiteKing.index()].count_ones() != 1
            || board.bitboards[Piece::BlackKing.index()].count_ones() != 1
        {
            return Err(invalid());
        }

        board.update_occupancies();
        board.hash = board.hash_from_scratch();
        Ok(board)
    }

    /// FEN of the position. Move counters are not tracked and always read "0 1".
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for rank in 0..8u8 {
            let mut empty = 0;
            for file in 0..8u8 {
                match self.piece_at(rank * 8 + file) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank < 7 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side {
            Color::White => 'w',
            Color::Black => 'b',
        });
        fen.push(' ');
        fen.push_str(&self.castling_string());
        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&square_name(sq)),
            None => fen.push('-'),
        }
        fen.push_str(" 0 1");
        fen
    }

    fn castling_string(&self) -> String {
        let s: String = [
            (WHITE_KINGSIDE, 'K'),
            (WHITE_QUEENSIDE, 'Q'),
            (BLACK_KINGSIDE, 'k'),
            (BLACK_QUEENSIDE, 'q'),
        ]
        .iter()
        .filter(|(right, _)| self.castling & right != 0)
        .map(|&(_, c)| c)
        .collect();
        if s.is_empty() {
            "-".to_string()
        } else {
            s
        }
    }

    #[inline(always)]
    pub fn tables(&self) -> &'t Tables {
        self.tables
    }

    #[inline(always)]
    pub fn side(&self) -> Color {
        self.side
    }

    #[inline(always)]
    pub fn castling(&self) -> u8 {
        self.castling
    }

    #[inline(always)]
    pub fn en_passant(&self) -> Option<u8> {
        self.en_passant
    }

    #[inline(always)]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline(always)]
    pub fn bitboard(&self, piece: Piece) -> Bitboard {
        self.bitboards[piece.index()]
    }

    #[inline(always)]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.occupancies[color.index()]
    }

    #[inline(always)]
    pub fn occupied(&self) -> Bitboard {
        self.occupancies[BOTH]
    }

    pub fn piece_at(&self, sq: u8) -> Option<Piece> {
        ALL_PIECES.into_iter().find(|p| get_bit(self.bitboards[p.index()], sq))
    }

    /// Enemy piece of `color`'s opponent standing on `sq`
    fn piece_of_color_at(&self, color: Color, sq: u8) -> Option<Piece> {
        PIECE_TYPES
            .into_iter()
            .map(|pt| Piece::new(color, pt))
            .find(|p| get_bit(self.bitboards[p.index()], sq))
    }

    pub fn king_square(&self, color: Color) -> Option<u8> {
        ls1b_index(self.bitboards[Piece::new(color, PieceType::King).index()])
    }

    fn update_occupancies(&mut self) {
        let white = self.bitboards[..6].iter().fold(0, |acc, bb| acc | bb);
        let black = self.bitboards[6..].iter().fold(0, |acc, bb| acc | bb);
        self.occupancies = [white, black, white | black];
    }

    /// Hash of the current state computed from nothing
    pub fn hash_from_scratch(&self) -> u64 {
        let keys = &self.tables.keys;
        let mut hash = 0u64;
        for piece in ALL_PIECES {
            for sq in BitboardIter(self.bitboards[piece.index()]) {
                hash ^= keys.piece_key(piece, sq);
            }
        }
        if let Some(ep) = self.en_passant {
            hash ^= keys.en_passant_key(ep);
        }
        hash ^= keys.castling_key(self.castling);
        if self.side == Color::Black {
            hash ^= keys.side;
        }
        hash
    }

    /// Is `sq` attacked by any piece of color `by`?
    pub fn is_square_attacked(&self, sq: u8, by: Color) -> bool {
        let attacks = &self.tables.attacks;
        let occupied = self.occupancies[BOTH];
        let bb = |pt: PieceType| self.bitboards[Piece::new(by, pt).index()];

        // A pawn of `by` attacks sq iff a pawn of the other color on sq would attack it back
        if attacks.pawn_attacks(by.other_color(), sq) & bb(PieceType::Pawn) != 0 {
            return true;
        }
        if attacks.knight_attacks(sq) & bb(PieceType::Knight) != 0 {
            return true;
        }
        if attacks.bishop_attacks(sq, occupied) & (bb(PieceType::Bishop) | bb(PieceType::Queen)) != 0 {
            return true;
        }
        if attacks.rook_attacks(sq, occupied) & (bb(PieceType::Rook) | bb(PieceType::Queen)) != 0 {
            return true;
        }
        attacks.king_attacks(sq) & bb(PieceType::King) != 0
    }

    /// Is the side to move in check?
    pub fn is_king_in_check(&self) -> bool {
        self.is_color_in_check(self.side)
    }

    fn is_color_in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .map_or(false, |sq| self.is_square_attacked(sq, color.other_color()))
    }

    /// Flip one piece on or off, keeping the hash in step
    #[inline(always)]
    fn toggle_piece(&mut self, piece: Piece, sq: u8) {
        self.bitboards[piece.index()] ^= sq_to_bb(sq);
        self.hash ^= self.tables.keys.piece_key(piece, sq);
    }

    #[inline(always)]
    fn set_en_passant(&mut self, sq: Option<u8>) {
        let keys = &self.tables.keys;
        if let Some(old) = self.en_passant {
            self.hash ^= keys.en_passant_key(old);
        }
        if let Some(new) = sq {
            self.hash ^= keys.en_passant_key(new);
        }
        self.en_passant = sq;
    }

    /// Apply a pseudo-legal move.
    ///
    /// Returns `false` and leaves the board exactly as it was if the move would
    /// leave the mover's king in check.
    pub fn make_move(&mut self, mv: Move) -> bool {
        let snapshot = *self;
        let us = self.side;
        let them = us.other_color();
        let piece = mv.piece();
        let source = mv.source();
        let target = mv.target();

        if mv.is_capture() && !mv.is_en_passant() {
            if let Some(captured) = self.piece_of_color_at(them, target) {
                self.toggle_piece(captured, target);
            }
        }

        self.toggle_piece(piece, source);
        match mv.promoted() {
            Some(promoted) => self.toggle_piece(promoted, target),
            None => self.toggle_piece(piece, target),
        }

        if mv.is_en_passant() {
            let captured_sq = match us {
                Color::White => target + 8,
                Color::Black => target - 8,
            };
            self.toggle_piece(Piece::new(them, PieceType::Pawn), captured_sq);
        }

        let new_ep = if mv.is_double_push() {
            Some(match us {
                Color::White => target + 8,
                Color::Black => target - 8,
            })
        } else {
            None
        };
        self.set_en_passant(new_ep);

        if mv.is_castling() {
            let (rook, from, to) = match target {
                G1 => (Piece::WhiteRook, H1, F1),
                C1 => (Piece::WhiteRook, A1, D1),
                G8 => (Piece::BlackRook, H8, F8),
                _ => (Piece::BlackRook, A8, D8),
            };
            self.toggle_piece(rook, from);
            self.toggle_piece(rook, to);
        }

        let tables = self.tables;
        let keys = &tables.keys;
        self.hash ^= keys.castling_key(self.castling);
        self.castling &= CASTLE_STATE[source as usize] & CASTLE_STATE[target as usize];
        self.hash ^= keys.castling_key(self.castling);

        self.update_occupancies();

        if self.is_color_in_check(us) {
            *self = snapshot;
            return false;
        }

        self.side = them;
        self.hash ^= keys.side;
        true
    }

    /// Pass the turn: clear en passant and flip the side to move
    pub fn make_null_move(&mut self) {
        self.set_en_passant(None);
        self.side = self.side.other_color();
        self.hash ^= self.tables.keys.side;
    }

    /// Resolve coordinate notation ("e2e4", "e7e8q") against the pseudo-legal moves.
    pub fn parse_move(&self, notation: &str) -> Result<Move> {
        let invalid = || EngineError::InvalidMoveNotation(notation.to_string());
        if !notation.is_ascii() || !(4..=5).contains(&notation.len()) {
            return Err(invalid());
        }
        let source = parse_square(&notation[0..2]).ok_or_else(invalid)?;
        let target = parse_square(&notation[2..4]).ok_or_else(invalid)?;
        let promoted = match notation[4..].chars().next().map(|c| c.to_ascii_lowercase()) {
            None => None,
            Some('n') => Some(PieceType::Knight),
            Some('b') => Some(PieceType::Bishop),
            Some('r') => Some(PieceType::Rook),
            Some('q') => Some(PieceType::Queen),
            Some(_) => return Err(invalid()),
        };

        let wanted = Move::new(
            source,
            target,
            Piece::new(self.side, PieceType::Pawn),
            promoted.map(|pt| Piece::new(self.side, pt)),
            0,
        );
        self.generate_moves()
            .find_same(wanted)
            .ok_or_else(|| EngineError::NoMatchingMove(notation.to_string()))
    }

    /// Parse and play a move given in coordinate notation.
    pub fn apply_uci_move(&mut self, notation: &str) -> Result<Move> {
        let mv = self.parse_move(notation)?;
        if self.make_move(mv) {
            Ok(mv)
        } else {
            Err(EngineError::IllegalMove(notation.to_string()))
        }
    }
}

impl PartialEq for Board<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.bitboards == other.bitboards
            && self.occupancies == other.occupancies
            && self.side == other.side
            && self.castling == other.castling
            && self.en_passant == other.en_passant
            && self.hash == other.hash
    }
}

impl Eq for Board<'_> {}

impl fmt::Debug for Board<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("fen", &self.to_fen())
            .field("hash", &format_args!("{:#018x}", self.hash))
            .finish()
    }
}

impl fmt::Display for Board<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in 0..8u8 {
            write!(f, "{}  ", 8 - rank)?;
            for file in 0..8u8 {
                let c = self.piece_at(rank * 8 + file).map_or('.', |p| p.to_char());
                write!(f, "{} ", c)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "\n   a b c d e f g h\n")?;
        writeln!(f, "Side:       {}", self.side.to_human())?;
        writeln!(f, "Castling:   {}", self.castling_string())?;
        writeln!(
            f,
            "En passant: {}",
            self.en_passant.map_or("-".to_string(), square_name)
        )?;
        write!(f, "Hash:       {:#018x}", self.hash)
    }
}
