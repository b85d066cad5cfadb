//! Position notation (FEN) validation and field access.
//!
//! Validation here is purely syntactic: eight rank groups of eight squares,
//! a valid side-to-move token, well-formed castling, en-passant and clock
//! fields. Whether the described position can actually arise (one king per
//! side, nobody left in check) is for a backend to decide.

use crate::{Color, Square};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The standard starting position.
pub const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Errors that can occur when parsing a notation string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("invalid notation: expected 6 fields, got {0}")]
    InvalidFieldCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid side to move: expected 'w' or 'b', got '{0}'")]
    InvalidSideToMove(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// A syntactically valid notation string split into its six fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notation {
    /// Piece placement, eighth rank first (e.g., "rnbqkbnr/pppppppp/8/...").
    pub placement: String,
    pub side_to_move: Color,
    /// Castling availability (e.g., "KQkq", "-").
    pub castling: String,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Notation {
    pub fn parse(s: &str) -> Result<Self, NotationError> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(NotationError::InvalidFieldCount(fields.len()));
        }

        validate_placement(fields[0])?;

        let side_to_move = Color::from_token(fields[1])
            .ok_or_else(|| NotationError::InvalidSideToMove(fields[1].to_string()))?;

        validate_castling(fields[2])?;

        let en_passant = parse_en_passant(fields[3])?;

        let halfmove_clock = fields[4]
            .parse::<u32>()
            .map_err(|_| NotationError::InvalidHalfmoveClock(fields[4].to_string()))?;

        let fullmove_number = fields[5]
            .parse::<u32>()
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| NotationError::InvalidFullmoveNumber(fields[5].to_string()))?;

        Ok(Notation {
            placement: fields[0].to_string(),
            side_to_move,
            castling: fields[2].to_string(),
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Returns the placement, side, castling and en-passant fields.
    ///
    /// Two positions with equal keys are the same position for repetition
    /// purposes; the move clocks are deliberately excluded.
    pub fn repetition_key(&self) -> String {
        let ep = match self.en_passant {
            Some(sq) => sq.to_algebraic(),
            None => "-".to_string(),
        };
        format!(
            "{} {} {} {}",
            self.placement,
            self.side_to_move.token(),
            self.castling,
            ep
        )
    }
}

impl FromStr for Notation {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Notation::parse(s)
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.repetition_key(),
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

fn validate_placement(placement: &str) -> Result<(), NotationError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(NotationError::InvalidPiecePlacement(format!(
            "expected 8 ranks, got {}",
            ranks.len()
        )));
    }

    for (i, rank) in ranks.iter().enumerate() {
        let mut squares = 0;
        let mut previous_was_digit = false;
        for c in rank.chars() {
            match c {
                '1'..='8' => {
                    if previous_was_digit {
                        return Err(NotationError::InvalidPiecePlacement(format!(
                            "consecutive digits in rank {}",
                            8 - i
                        )));
                    }
                    squares += c as u32 - '0' as u32;
                    previous_was_digit = true;
                }
                'p' | 'n' | 'b' | 'r' | 'q' | 'k' | 'P' | 'N' | 'B' | 'R' | 'Q' | 'K' => {
                    squares += 1;
                    previous_was_digit = false;
                }
                _ => {
                    return Err(NotationError::InvalidPiecePlacement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        8 - i
                    )))
                }
            }
        }
        if squares != 8 {
            return Err(NotationError::InvalidPiecePlacement(format!(
                "rank {} has {} squares, expected 8",
                8 - i,
                squares
            )));
        }
    }

    Ok(())
}

fn validate_castling(castling: &str) -> Result<(), NotationError> {
    if castling == "-" {
        return Ok(());
    }

    let mut seen = Vec::with_capacity(4);
    for c in castling.chars() {
        if !"KQkq".contains(c) {
            return Err(NotationError::InvalidCastlingRights(format!(
                "invalid character '{}'",
                c
            )));
        }
        if seen.contains(&c) {
            return Err(NotationError::InvalidCastlingRights(format!(
                "duplicate right '{}'",
                c
            )));
        }
        seen.push(c);
    }

    Ok(())
}

fn parse_en_passant(ep: &str) -> Result<Option<Square>, NotationError> {
    if ep == "-" {
        return Ok(None);
    }

    match Square::from_algebraic(ep) {
        Some(sq) if matches!(sq.rank().to_char(), '3' | '6') => Ok(Some(sq)),
        _ => Err(NotationError::InvalidEnPassantSquare(ep.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_startpos() {
        let n = Notation::parse(STARTPOS).unwrap();
        assert_eq!(n.side_to_move, Color::White);
        assert_eq!(n.castling, "KQkq");
        assert_eq!(n.en_passant, None);
        assert_eq!(n.halfmove_clock, 0);
        assert_eq!(n.fullmove_number, 1);
        assert_eq!(n.to_string(), STARTPOS);
    }

    #[test]
    fn roundtrip_with_en_passant() {
        let original = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let parsed = Notation::parse(original).unwrap();
        assert_eq!(parsed.side_to_move, Color::Black);
        assert_eq!(parsed.en_passant, Square::from_algebraic("e3"));
        assert_eq!(parsed.to_string(), original);
    }

    #[test]
    fn repetition_key_ignores_clocks() {
        let a = Notation::parse("8/8/8/8/8/8/8/K6k w - - 0 1").unwrap();
        let b = Notation::parse("8/8/8/8/8/8/8/K6k w - - 12 40").unwrap();
        assert_eq!(a.repetition_key(), b.repetition_key());
        assert_eq!(a.repetition_key(), "8/8/8/8/8/8/8/K6k w - -");
    }

    #[test]
    fn wrong_field_count() {
        assert_eq!(
            Notation::parse("invalid"),
            Err(NotationError::InvalidFieldCount(1))
        );
        assert!(matches!(
            Notation::parse("8/8/8/8/8/8/8/K6k w - -"),
            Err(NotationError::InvalidFieldCount(4))
        ));
    }

    #[test]
    fn invalid_side_to_move() {
        assert!(matches!(
            Notation::parse("8/8/8/8/8/8/8/K6k x - - 0 1"),
            Err(NotationError::InvalidSideToMove(_))
        ));
    }

    #[test]
    fn invalid_rank_count() {
        assert!(matches!(
            Notation::parse("8/8/8/8/8/8/K6k w - - 0 1"),
            Err(NotationError::InvalidPiecePlacement(_))
        ));
    }

    #[test]
    fn invalid_rank_width() {
        assert!(matches!(
            Notation::parse("rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(NotationError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            Notation::parse("7/8/8/8/8/8/8/K6k w - - 0 1"),
            Err(NotationError::InvalidPiecePlacement(_))
        ));
    }

    #[test]
    fn invalid_placement_characters() {
        assert!(matches!(
            Notation::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPXPPP/RNBQKBNR w KQkq - 0 1"),
            Err(NotationError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            Notation::parse("44/8/8/8/8/8/8/K6k w - - 0 1"),
            Err(NotationError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            Notation::parse("08/8/8/8/8/8/8/K6k w - - 0 1"),
            Err(NotationError::InvalidPiecePlacement(_))
        ));
    }

    #[test]
    fn invalid_castling() {
        assert!(matches!(
            Notation::parse("8/8/8/8/8/8/8/K6k w XYZ - 0 1"),
            Err(NotationError::InvalidCastlingRights(_))
        ));
        assert!(matches!(
            Notation::parse("8/8/8/8/8/8/8/K6k w KK - 0 1"),
            Err(NotationError::InvalidCastlingRights(_))
        ));
    }

    #[test]
    fn invalid_en_passant() {
        for ep in ["abc", "x3", "e4", "e9"] {
            let s = format!("8/8/8/8/8/8/8/K6k w - {} 0 1", ep);
            assert!(
                matches!(
                    Notation::parse(&s),
                    Err(NotationError::InvalidEnPassantSquare(_))
                ),
                "{}",
                ep
            );
        }
    }

    #[test]
    fn invalid_clocks() {
        assert!(matches!(
            Notation::parse("8/8/8/8/8/8/8/K6k w - - abc 1"),
            Err(NotationError::InvalidHalfmoveClock(_))
        ));
        assert!(matches!(
            Notation::parse("8/8/8/8/8/8/8/K6k w - - 0 xyz"),
            Err(NotationError::InvalidFullmoveNumber(_))
        ));
        assert!(matches!(
            Notation::parse("8/8/8/8/8/8/8/K6k w - - 0 0"),
            Err(NotationError::InvalidFullmoveNumber(_))
        ));
    }

    #[test]
    fn error_display_carries_input() {
        let err = NotationError::InvalidSideToMove("x".to_string());
        assert!(err.to_string().contains('x'));
        let err = NotationError::InvalidFieldCount(3);
        assert!(err.to_string().contains('3'));
    }
}
