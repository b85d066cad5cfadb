//! The 4096-slot action space.
//!
//! A policy network emits one logit per (from, to) square pair. The index of
//! a move is `from * 64 + to`, with squares numbered `rank * 8 + file`.
//! Promotion is not part of the index, so the four promotions of one pawn
//! share a slot; [`match_legal_move`] resolves them, preferring the queen.

use crate::{Move, Piece, Square};
use thiserror::Error;

/// Number of slots in the action space.
pub const ACTION_SPACE: usize = Square::COUNT * Square::COUNT;

/// Errors from the action codec.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The index is outside `0..4096`. This is a bug upstream of the codec.
    #[error("action index {0} is outside 0..4096")]
    OutOfRange(usize),

    /// The decoded move has no legal counterpart. Expected from an untrained
    /// policy; callers treat it as an invalid move, not a crash.
    #[error("action {index} ({decoded}) matches no legal move")]
    Unmatched { index: usize, decoded: Move },
}

/// Returns the square index used by the codec (`rank * 8 + file`).
#[inline]
pub const fn square_index(sq: Square) -> usize {
    sq.index() as usize
}

/// Maps a move to its action index.
#[inline]
pub const fn encode(m: Move) -> usize {
    square_index(m.from()) * Square::COUNT + square_index(m.to())
}

/// Maps an action index back to a promotion-less move.
pub fn decode(index: usize) -> Result<Move, ActionError> {
    if index >= ACTION_SPACE {
        return Err(ActionError::OutOfRange(index));
    }
    let from = Square::from_index_masked((index / Square::COUNT) as u8);
    let to = Square::from_index_masked((index % Square::COUNT) as u8);
    Ok(Move::normal(from, to))
}

/// Returns a mask with `true` at every index some legal move encodes to.
pub fn mask(legal_moves: &[Move]) -> Vec<bool> {
    let mut mask = vec![false; ACTION_SPACE];
    for &m in legal_moves {
        mask[encode(m)] = true;
    }
    mask
}

/// Returns the distinct indices reachable by `legal_moves`, ascending.
pub fn legal_indices(legal_moves: &[Move]) -> Vec<usize> {
    let mut indices: Vec<usize> = legal_moves.iter().map(|&m| encode(m)).collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}

/// Finds the legal move a decoded action stands for.
///
/// Priority order:
/// 1. a legal move equal to `decoded` in from, to and promotion;
/// 2. the only legal move sharing from/to with `decoded`;
/// 3. among several such moves, the queen promotion;
/// 4. otherwise the first of them in `legal_moves` order.
///
/// Returns `None` when no legal move shares from/to with `decoded`.
pub fn match_legal_move(decoded: Move, legal_moves: &[Move]) -> Option<Move> {
    if let Some(&exact) = legal_moves.iter().find(|&&m| m == decoded) {
        return Some(exact);
    }

    let mut candidates = legal_moves.iter().copied().filter(|m| m.same_squares(decoded));
    let first = candidates.next()?;
    if first.promotion() == Some(Piece::Queen) {
        return Some(first);
    }
    let queen = candidates.find(|m| m.promotion() == Some(Piece::Queen));
    Some(queen.unwrap_or(first))
}

/// Decodes `index` and resolves it against `legal_moves`.
pub fn decode_legal(index: usize, legal_moves: &[Move]) -> Result<Move, ActionError> {
    let decoded = decode(index)?;
    match_legal_move(decoded, legal_moves).ok_or(ActionError::Unmatched { index, decoded })
}
