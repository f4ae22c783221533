use std::fmt;

use crate::bitboard::square_name;
use crate::types::Piece;

/// A move packed into 24 bits:
///
/// ```text
/// 0000 0000 0000 0000 0011 1111  source square
/// 0000 0000 0000 1111 1100 0000  target square
/// 0000 0000 1111 0000 0000 0000  moving piece
/// 0000 1111 0000 0000 0000 0000  promoted piece (0 = none)
/// 0001 0000 0000 0000 0000 0000  capture
/// 0010 0000 0000 0000 0000 0000  double pawn push
/// 0100 0000 0000 0000 0000 0000  en passant
/// 1000 0000 0000 0000 0000 0000  castling
/// ```
///
/// A pawn is never a promotion target, so the white pawn's index 0 doubles as "none".
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Move(u32);

impl Move {
    pub const NONE: Move = Move(0);

    pub const CAPTURE: u32 = 1 << 20;
    pub const DOUBLE_PUSH: u32 = 1 << 21;
    pub const EN_PASSANT: u32 = 1 << 22;
    pub const CASTLING: u32 = 1 << 23;

    #[inline(always)]
    pub fn new(source: u8, target: u8, piece: Piece, promoted: Option<Piece>, flags: u32) -> Move {
        let promoted = promoted.map_or(0, |p| p.index() as u32);
        Move(source as u32 | (target as u32) << 6 | (piece.index() as u32) << 12 | promoted << 16 | flags)
    }

    #[inline(always)]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub fn source(self) -> u8 {
        (self.0 & 0x3f) as u8
    }

    #[inline(always)]
    pub fn target(self) -> u8 {
        ((self.0 >> 6) & 0x3f) as u8
    }

    #[inline(always)]
    pub fn piece(self) -> Piece {
        // Always in range: the constructor only writes indices 0..=11
        Piece::from_index(((self.0 >> 12) & 0xf) as usize).unwrap_or(Piece::WhitePawn)
    }

    #[inline(always)]
    pub fn promoted(self) -> Option<Piece> {
        match (self.0 >> 16) & 0xf {
            0 => None,
            index => Piece::from_index(index as usize),
        }
    }

    #[inline(always)]
    pub fn is_capture(self) -> bool {
        self.0 & Self::CAPTURE != 0
    }

    #[inline(always)]
    pub fn is_double_push(self) -> bool {
        self.0 & Self::DOUBLE_PUSH != 0
    }

    #[inline(always)]
    pub fn is_en_passant(self) -> bool {
        self.0 & Self::EN_PASSANT != 0
    }

    #[inline(always)]
    pub fn is_castling(self) -> bool {
        self.0 & Self::CASTLING != 0
    }

    /// Same source, target and promotion; used to match typed-in moves
    pub fn same_move(self, other: Move) -> bool {
        self.source() == other.source() && self.target() == other.target() && self.promoted() == other.promoted()
    }

    /// Coordinate notation, e.g. "e2e4" or "e7e8q"
    pub fn to_uci(self) -> String {
        let mut s = format!("{}{}", square_name(self.source()), square_name(self.target()));
        if let Some(promoted) = self.promoted() {
            s.push(promoted.to_char().to_ascii_lowercase());
        }
        s
    }

    pub fn to_human(self) -> String {
        let piece = self.piece();
        if self.is_castling() {
            let side = if self.target() > self.source() { "kingside" } else { "queenside" };
            return format!("{} castles {}", piece.color().to_human(), side);
        }
        let mut s = format!(
            "{} moves {} from {} to {}",
            piece.color().to_human(),
            piece.piece_type().to_human(),
            square_name(self.source()),
            square_name(self.target())
        );
        if self.is_en_passant() {
            s.push_str(" capturing en passant");
        } else if self.is_capture() {
            s.push_str(" capturing");
        }
        if let Some(promoted) = self.promoted() {
            s.push_str(&format!(" promoting to {}", promoted.piece_type().to_human()));
        }
        s
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return write!(f, "Move(none)");
        }
        write!(f, "Move({} {:?}", self.to_uci(), self.piece())?;
        for (flag, name) in [
            (Self::CAPTURE, "capture"),
            (Self::DOUBLE_PUSH, "double"),
            (Self::EN_PASSANT, "ep"),
            (Self::CASTLING, "castle"),
        ] {
            if self.0 & flag != 0 {
                write!(f, " {}", name)?;
            }
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::parse_square;

    fn sq(name: &str) -> u8 {
        parse_square(name).unwrap()
    }

    #[test]
    fn test_fields_decode() {
        let mv = Move::new(sq("e7"), sq("d8"), Piece::WhitePawn, Some(Piece::WhiteQueen), Move::CAPTURE);
        assert_eq!(mv.source(), sq("e7"));
        assert_eq!(mv.target(), sq("d8"));
        assert_eq!(mv.piece(), Piece::WhitePawn);
        assert_eq!(mv.promoted(), Some(Piece::WhiteQueen));
        assert!(mv.is_capture());
        assert!(!mv.is_double_push());
        assert!(!mv.is_en_passant());
        assert!(!mv.is_castling());
        assert_eq!(mv.to_uci(), "e7d8q");
    }

    #[test]
    fn test_flags_are_independent() {
        let mv = Move::new(sq("e1"), sq("g1"), Piece::WhiteKing, None, Move::CASTLING);
        assert!(mv.is_castling());
        assert!(!mv.is_capture());
        assert_eq!(mv.promoted(), None);
        assert_eq!(mv.to_human(), "white castles kingside");

        let mv = Move::new(sq("d4"), sq("e3"), Piece::BlackPawn, None, Move::CAPTURE | Move::EN_PASSANT);
        assert!(mv.is_en_passant() && mv.is_capture());
        assert_eq!(mv.piece(), Piece::BlackPawn);
        assert_eq!(mv.raw() >> 24, 0);
    }

    #[test]
    fn test_same_move_ignores_flags() {
        let a = Move::new(sq("e2"), sq("e4"), Piece::WhitePawn, None, Move::DOUBLE_PUSH);
        let b = Move::new(sq("e2"), sq("e4"), Piece::WhitePawn, None, 0);
        let c = Move::new(sq("e7"), sq("e8"), Piece::WhitePawn, Some(Piece::WhiteKnight), 0);
        let d = Move::new(sq("e7"), sq("e8"), Piece::WhitePawn, Some(Piece::WhiteQueen), 0);
        assert!(a.same_move(b));
        assert_ne!(a, b);
        assert!(!c.same_move(d));
    }

    #[test]
    fn test_none() {
        assert!(Move::NONE.is_none());
        assert_eq!(format!("{:?}", Move::NONE), "Move(none)");
        assert!(!Move::new(sq("b1"), sq("c3"), Piece::WhiteKnight, None, 0).is_none());
    }
}
