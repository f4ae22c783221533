//! Colors, piece kinds, and the twelve colored pieces used as bitboard indices.

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub fn from_char(c: char) -> Option<Color> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn other_color(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn to_human(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum PieceType {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

pub const PIECE_TYPES: [PieceType; 6] = [
    PieceType::Pawn,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Rook,
    PieceType::Queen,
    PieceType::King,
];

/// Promotion choices, in the order they are generated
pub const PIECES_CAN_PROMOTE_TO: [PieceType; 4] = [
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Rook,
    PieceType::Queen,
];

impl PieceType {
    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn to_human(self) -> &'static str {
        match self {
            Self::Pawn => "pawn",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Rook => "rook",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }
}

/// One of the twelve colored pieces. The discriminant doubles as the index
/// into the board's bitboard array.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Piece {
    WhitePawn = 0,
    WhiteKnight = 1,
    WhiteBishop = 2,
    WhiteRook = 3,
    WhiteQueen = 4,
    WhiteKing = 5,
    BlackPawn = 6,
    BlackKnight = 7,
    BlackBishop = 8,
    BlackRook = 9,
    BlackQueen = 10,
    BlackKing = 11,
}

pub const ALL_PIECES: [Piece; 12] = [
    Piece::WhitePawn,
    Piece::WhiteKnight,
    Piece::WhiteBishop,
    Piece::WhiteRook,
    Piece::WhiteQueen,
    Piece::WhiteKing,
    Piece::BlackPawn,
    Piece::BlackKnight,
    Piece::BlackBishop,
    Piece::BlackRook,
    Piece::BlackQueen,
    Piece::BlackKing,
];

const PIECE_CHARS: [char; 12] = ['P', 'N', 'B', 'R', 'Q', 'K', 'p', 'n', 'b', 'r', 'q', 'k'];

impl Piece {
    #[inline(always)]
    pub fn new(color: Color, piece_type: PieceType) -> Piece {
        ALL_PIECES[color.index() * 6 + piece_type.index()]
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Decode a 4-bit piece index; anything above 11 is rejected
    #[inline(always)]
    pub fn from_index(index: usize) -> Option<Piece> {
        ALL_PIECES.get(index).copied()
    }

    #[inline(always)]
    pub fn color(self) -> Color {
        if (self as u8) < 6 {
            Color::White
        } else {
            Color::Black
        }
    }

    #[inline(always)]
    pub fn piece_type(self) -> PieceType {
        PIECE_TYPES[self.index() % 6]
    }

    /// FEN letter: uppercase for white, lowercase for black
    pub fn to_char(self) -> char {
        PIECE_CHARS[self.index()]
    }

    pub fn from_char(c: char) -> Option<Piece> {
        PIECE_CHARS
            .iter()
            .position(|&p| p == c)
            .map(|i| ALL_PIECES[i])
    }
}

/// Castling right bits
pub const WHITE_KINGSIDE: u8 = 1;
pub const WHITE_QUEENSIDE: u8 = 2;
pub const BLACK_KINGSIDE: u8 = 4;
pub const BLACK_QUEENSIDE: u8 = 8;
