//! Pseudo-legal move generation.
//!
//! Moves are produced piece by piece in the order pawn, knight, bishop, rook,
//! queen, king, with castling ahead of ordinary king moves. Whether a move
//! leaves the king in check is only decided when it is made.

use crate::bitboard::*;
use crate::board::*;
use crate::moves::Move;
use crate::movelist::MoveList;
use crate::types::*;

impl Board<'_> {
    pub fn generate_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        let us = self.side();
        for piece_type in PIECE_TYPES {
            let piece = Piece::new(us, piece_type);
            match piece_type {
                PieceType::Pawn => self.generate_pawn_moves(piece, &mut moves),
                PieceType::King => {
                    self.generate_castling_moves(piece, &mut moves);
                    self.generate_piece_moves(piece, &mut moves);
                }
                _ => self.generate_piece_moves(piece, &mut moves),
            }
        }
        moves
    }

    /// Only the captures among the pseudo-legal moves, in generation order
    pub fn generate_captures(&self) -> MoveList {
        let mut captures = MoveList::new();
        for mv in self.generate_moves().iter().filter(|m| m.is_capture()) {
            captures.push(mv);
        }
        captures
    }

    fn generate_pawn_moves(&self, piece: Piece, moves: &mut MoveList) {
        let us = piece.color();
        let attacks = &self.tables().attacks;
        let occupied = self.occupied();
        let enemies = self.occupancy(us.other_color());

        // Rows are counted from the 8th rank, so white pawns move to lower indices
        let (forward, promotion_row, start_row): (i8, u8, u8) = match us {
            Color::White => (-8, 1, 6),
            Color::Black => (8, 6, 1),
        };

        for source in BitboardIter(self.bitboard(piece)) {
            let promotes = rank_of(source) == promotion_row;
            let mut push = |target: u8, flags: u32| {
                if promotes {
                    for promoted in PIECES_CAN_PROMOTE_TO {
                        moves.push(Move::new(source, target, piece, Some(Piece::new(us, promoted)), flags));
                    }
                } else {
                    moves.push(Move::new(source, target, piece, None, flags));
                }
            };

            let single = source as i8 + forward;
            if (0..64).contains(&single) && !get_bit(occupied, single as u8) {
                push(single as u8, 0);
                let double = single + forward;
                if rank_of(source) == start_row && !get_bit(occupied, double as u8) {
                    push(double as u8, Move::DOUBLE_PUSH);
                }
            }

            let pawn_attacks = attacks.pawn_attacks(us, source);
            for target in BitboardIter(pawn_attacks & enemies) {
                push(target, Move::CAPTURE);
            }

            if let Some(ep) = self.en_passant() {
                if get_bit(pawn_attacks, ep) {
                    moves.push(Move::new(source, ep, piece, None, Move::CAPTURE | Move::EN_PASSANT));
                }
            }
        }
    }

    fn generate_castling_moves(&self, king: Piece, moves: &mut MoveList) {
        let us = king.color();
        let them = us.other_color();
        let occupied = self.occupied();
        let rights = self.castling();
        let empty = |squares: &[u8]| squares.iter().all(|&sq| !get_bit(occupied, sq));
        let safe = |squares: &[u8]| squares.iter().all(|&sq| !self.is_square_attacked(sq, them));

        let (kingside, queenside, home) = match us {
            Color::White => (WHITE_KINGSIDE, WHITE_QUEENSIDE, [E1, F1, G1, D1, C1, B1]),
            Color::Black => (BLACK_KINGSIDE, BLACK_QUEENSIDE, [E8, F8, G8, D8, C8, B8]),
        };
        let [e, f, g, d, c, b] = home;

        if rights & kingside != 0 && empty(&[f, g]) && safe(&[e, f]) {
            moves.push(Move::new(e, g, king, None, Move::CASTLING));
        }
        if rights & queenside != 0 && empty(&[d, c, b]) && safe(&[e, d]) {
            moves.push(Move::new(e, c, king, None, Move::CASTLING));
        }
    }

    /// Knight, bishop, rook, queen and ordinary king moves
    fn generate_piece_moves(&self, piece: Piece, moves: &mut MoveList) {
        let us = piece.color();
        let attacks = &self.tables().attacks;
        let occupied = self.occupied();
        let own = self.occupancy(us);
        let enemies = self.occupancy(us.other_color());

        for source in BitboardIter(self.bitboard(piece)) {
            let targets = match piece.piece_type() {
                PieceType::Knight => attacks.knight_attacks(source),
                PieceType::Bishop => attacks.bishop_attacks(source, occupied),
                PieceType::Rook => attacks.rook_attacks(source, occupied),
                PieceType::Queen => attacks.queen_attacks(source, occupied),
                PieceType::King => attacks.king_attacks(source),
                PieceType::Pawn => 0,
            } & !own;

            for target in BitboardIter(targets) {
                let flags = if get_bit(enemies, target) { Move::CAPTURE } else { 0 };
                moves.push(Move::new(source, target, piece, None, flags));
            }
        }
    }
}
