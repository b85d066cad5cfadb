//! Value types shared by every rules backend.
//!
//! This crate holds the immutable data model the learning code sees:
//! - [`Square`], [`File`] and [`Rank`] for board coordinates
//! - [`Piece`] and [`Color`]
//! - [`Move`], a from/to/promotion triple with a derived long-algebraic form
//! - [`Position`], a notation string plus side to move, repetition history
//!   and an optional cached legal-move list
//! - [`TerminalInfo`], the backend-independent game-over classification
//! - [`action`], the 4096-slot action-space codec
//!
//! Nothing here knows how to generate moves; that is the job of a backend.

pub mod action;
mod color;
mod mov;
mod notation;
mod piece;
mod position;
mod square;
mod terminal;

pub use action::{ActionError, ACTION_SPACE};
pub use color::Color;
pub use mov::{Move, MoveParseError};
pub use notation::{Notation, NotationError, STARTPOS};
pub use piece::Piece;
pub use position::Position;
pub use square::{File, Rank, Square};
pub use terminal::{Outcome, TerminalInfo, TerminalReason};
