//! Move representation.

use crate::{Piece, Square};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing a long-algebraic move string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("invalid move length: expected 4 or 5 characters, got {0}")]
    InvalidLength(usize),

    #[error("invalid square '{0}'")]
    InvalidSquare(String),

    #[error("invalid promotion piece '{0}'")]
    InvalidPromotion(char),
}

/// A chess move as the learning code sees it.
///
/// A move is just a from-square, a to-square and an optional promotion piece.
/// Backends attach their own flags (castling, en passant) internally; two
/// moves from different backends are the same move when these three fields
/// agree. The long-algebraic form (`e2e4`, `e7e8q`) is derived on demand and
/// therefore can never disagree with the fields.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    from: Square,
    to: Square,
    promotion: Option<Piece>,
}

impl Move {
    /// Creates a move.
    ///
    /// `promotion` must be a knight, bishop, rook or queen when present.
    #[inline]
    pub const fn new(from: Square, to: Square, promotion: Option<Piece>) -> Self {
        Move {
            from,
            to,
            promotion,
        }
    }

    /// Creates a move without promotion.
    #[inline]
    pub const fn normal(from: Square, to: Square) -> Self {
        Self::new(from, to, None)
    }

    #[inline]
    pub const fn from(self) -> Square {
        self.from
    }

    #[inline]
    pub const fn to(self) -> Square {
        self.to
    }

    #[inline]
    pub const fn promotion(self) -> Option<Piece> {
        self.promotion
    }

    /// Returns true if `other` has the same from and to squares.
    #[inline]
    pub fn same_squares(self, other: Move) -> bool {
        self.from == other.from && self.to == other.to
    }

    /// Returns the long-algebraic form (e.g., "e2e4", "e7e8q").
    pub fn to_uci(self) -> String {
        self.to_string()
    }

    /// Parses a long-algebraic move, returning `None` on malformed input.
    pub fn from_uci(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if !(4..=5).contains(&chars.len()) {
            return Err(MoveParseError::InvalidLength(chars.len()));
        }
        let square = |pair: &[char]| {
            let text: String = pair.iter().collect();
            Square::from_algebraic(&text).ok_or(MoveParseError::InvalidSquare(text))
        };
        let from = square(&chars[0..2])?;
        let to = square(&chars[2..4])?;
        let promotion = match chars.get(4) {
            Some(&c) => Some(Piece::from_promotion_char(c).ok_or(MoveParseError::InvalidPromotion(c))?),
            None => None,
        };
        Ok(Move::new(from, to, promotion))
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.to_char())?;
        }
        Ok(())
    }
}
