//! The immutable position value handed across the adapter boundary.

use crate::{Color, Move, Notation, NotationError, STARTPOS};
use std::fmt;
use std::sync::Arc;

/// One board state, identified by its notation string.
///
/// A `Position` is never mutated. Applying a move produces a new value that
/// shares nothing mutable with its parent, so positions can be handed to
/// other threads freely; clones are cheap because every field is reference
/// counted.
///
/// Besides the notation the value carries:
/// - the repetition history: keys of the earlier positions of the game since
///   the last irreversible move, needed to detect threefold repetition
///   without any state hidden inside a backend;
/// - optionally, the legal moves a backend computed for exactly this
///   notation. The cache is informational. Backends recompute rather than
///   trust it, because nothing stops a caller from attaching a wrong list.
#[derive(Clone)]
pub struct Position {
    notation: Arc<str>,
    key: Arc<str>,
    side_to_move: Color,
    halfmove_clock: u32,
    history: Arc<[Arc<str>]>,
    legal_moves: Option<Arc<[Move]>>,
}

impl Position {
    /// The standard starting position.
    pub fn startpos() -> Self {
        match Self::from_notation(STARTPOS) {
            Ok(position) => position,
            Err(err) => unreachable!("STARTPOS is valid: {err}"),
        }
    }

    /// Builds a position from a notation string, checking syntax only.
    ///
    /// The stored notation is re-serialized from the parsed fields, so runs
    /// of whitespace between fields are normalized. The history is empty.
    pub fn from_notation(notation: &str) -> Result<Self, NotationError> {
        let parsed = Notation::parse(notation)?;
        Ok(Self::from_parsed(&parsed, Arc::from(Vec::new())))
    }

    fn from_parsed(parsed: &Notation, history: Arc<[Arc<str>]>) -> Self {
        Position {
            notation: Arc::from(parsed.to_string()),
            key: Arc::from(parsed.repetition_key()),
            side_to_move: parsed.side_to_move,
            halfmove_clock: parsed.halfmove_clock,
            history,
            legal_moves: None,
        }
    }

    /// Builds the position reached from `self` by one move, given the
    /// successor's notation.
    ///
    /// The successor's history is this position's history plus this
    /// position's key. An irreversible move (halfmove clock back at zero)
    /// starts a fresh history, since no earlier position can recur.
    pub fn successor(&self, notation: &str) -> Result<Self, NotationError> {
        let parsed = Notation::parse(notation)?;
        let history: Arc<[Arc<str>]> = if parsed.halfmove_clock == 0 {
            Arc::from(Vec::new())
        } else {
            self.history
                .iter()
                .cloned()
                .chain(std::iter::once(self.key.clone()))
                .collect()
        };
        Ok(Self::from_parsed(&parsed, history))
    }

    /// Returns a copy of this position carrying `moves` as its cached
    /// legal-move list.
    pub fn with_legal_moves(&self, moves: impl Into<Arc<[Move]>>) -> Self {
        Position {
            legal_moves: Some(moves.into()),
            ..self.clone()
        }
    }

    #[inline]
    pub fn notation(&self) -> &str {
        &self.notation
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// The placement, side, castling and en-passant fields of the notation.
    #[inline]
    pub fn repetition_key(&self) -> &str {
        &self.key
    }

    /// Keys of the earlier positions, oldest first.
    pub fn history(&self) -> &[Arc<str>] {
        &self.history
    }

    /// How many times this position has occurred, counting itself.
    pub fn repetition_count(&self) -> usize {
        1 + self
            .history
            .iter()
            .filter(|key| ***key == *self.key)
            .count()
    }

    /// The cached legal moves, if a backend attached them.
    pub fn cached_legal_moves(&self) -> Option<&[Move]> {
        self.legal_moves.as_deref()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

/// Equality ignores the move cache: two positions are equal when they have
/// the same notation and the same history.
impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.notation == other.notation && self.history == other.history
    }
}

impl Eq for Position {}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("notation", &self.notation)
            .field("history_len", &self.history.len())
            .field("cached_moves", &self.legal_moves.as_ref().map(|m| m.len()))
            .finish()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation)
    }
}
