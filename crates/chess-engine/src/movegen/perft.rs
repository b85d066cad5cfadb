//! Perft (performance test) for move generator validation.
//!
//! Perft counts the leaf nodes of the legal move tree to a given depth.
//! Comparing the counts against published values is the standard check of a
//! move generator.

use super::{generate_moves, make_move};
use crate::Board;
use chess_core::Move;

/// Counts the leaf nodes at the given depth. Depth 0 counts the root.
pub fn perft(board: &Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_moves(board);

    if depth == 1 {
        return moves.len() as u64;
    }

    moves
        .as_slice()
        .iter()
        .map(|&m| perft(&make_move(board, m), depth - 1))
        .sum()
}

/// Leaf counts per root move, sorted by UCI string.
///
/// Useful to find the move whose subtree disagrees with another generator.
pub fn perft_divide(board: &Board, depth: u32) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }

    let mut results: Vec<(Move, u64)> = generate_moves(board)
        .as_slice()
        .iter()
        .map(|&m| (m.to_move(), perft(&make_move(board, m), depth - 1)))
        .collect();

    results.sort_by_key(|(m, _)| m.to_uci());
    results
}
