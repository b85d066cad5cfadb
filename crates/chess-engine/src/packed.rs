//! The engine's internal move encoding.
//!
//! Move generation needs to know *how* a move is made (double push, castle,
//! en passant) so that [`make_move`](crate::make_move) does not have to
//! rediscover it. Those details never leave the engine: callers see plain
//! [`chess_core::Move`] values.

use chess_core::{Move, Piece, Square};
use std::fmt;

/// How a move is carried out on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveFlag {
    Normal = 0,
    /// Pawn push of two squares from its starting rank.
    DoublePush = 1,
    CastleKingside = 2,
    CastleQueenside = 3,
    EnPassant = 4,
    PromoteKnight = 5,
    PromoteBishop = 6,
    PromoteRook = 7,
    PromoteQueen = 8,
}

impl MoveFlag {
    /// Promotion flags in the order they are generated.
    pub const PROMOTIONS: [MoveFlag; 4] = [
        MoveFlag::PromoteQueen,
        MoveFlag::PromoteRook,
        MoveFlag::PromoteBishop,
        MoveFlag::PromoteKnight,
    ];

    #[inline]
    pub const fn promotion_piece(self) -> Option<Piece> {
        match self {
            MoveFlag::PromoteKnight => Some(Piece::Knight),
            MoveFlag::PromoteBishop => Some(Piece::Bishop),
            MoveFlag::PromoteRook => Some(Piece::Rook),
            MoveFlag::PromoteQueen => Some(Piece::Queen),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.promotion_piece().is_some()
    }

    #[inline]
    pub const fn is_castling(self) -> bool {
        matches!(self, MoveFlag::CastleKingside | MoveFlag::CastleQueenside)
    }

    const fn from_bits(bits: u8) -> MoveFlag {
        match bits {
            1 => MoveFlag::DoublePush,
            2 => MoveFlag::CastleKingside,
            3 => MoveFlag::CastleQueenside,
            4 => MoveFlag::EnPassant,
            5 => MoveFlag::PromoteKnight,
            6 => MoveFlag::PromoteBishop,
            7 => MoveFlag::PromoteRook,
            8 => MoveFlag::PromoteQueen,
            _ => MoveFlag::Normal,
        }
    }
}

/// A move with its flag, packed into 16 bits: 6 bits from, 6 bits to,
/// 4 bits flag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedMove(u16);

impl PackedMove {
    /// Placeholder for unused slots of a [`MoveList`](crate::MoveList).
    pub const NULL: PackedMove = PackedMove(0);

    #[inline]
    pub const fn new(from: Square, to: Square, flag: MoveFlag) -> Self {
        PackedMove((from.index() as u16) | ((to.index() as u16) << 6) | ((flag as u16) << 12))
    }

    #[inline]
    pub const fn normal(from: Square, to: Square) -> Self {
        Self::new(from, to, MoveFlag::Normal)
    }

    #[inline]
    pub const fn from(self) -> Square {
        Square::from_index_masked((self.0 & 0x3F) as u8)
    }

    #[inline]
    pub const fn to(self) -> Square {
        Square::from_index_masked(((self.0 >> 6) & 0x3F) as u8)
    }

    #[inline]
    pub const fn flag(self) -> MoveFlag {
        MoveFlag::from_bits((self.0 >> 12) as u8)
    }

    /// The move as seen from outside the engine.
    #[inline]
    pub const fn to_move(self) -> Move {
        Move::new(self.from(), self.to(), self.flag().promotion_piece())
    }

    /// Whether this move is what `m` describes (same squares and promotion).
    #[inline]
    pub fn matches(self, m: Move) -> bool {
        self.to_move() == m
    }
}

impl From<PackedMove> for Move {
    fn from(m: PackedMove) -> Self {
        m.to_move()
    }
}

impl fmt::Debug for PackedMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackedMove({}, {:?})", self.to_move(), self.flag())
    }
}

impl fmt::Display for PackedMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_move())
    }
}
