//! Native chess rules engine with bitboard representation.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit square sets with efficient operations
//! - [`Board`] - full board state loaded from and written back to notation
//! - legal move generation, move application and perft
//! - [`rules`] - checkmate, stalemate and draw detection
//!
//! Every operation takes a board by reference and returns new values, so a
//! board can be shared between threads without locking.
//!
//! # Example
//!
//! ```
//! use chess_engine::{generate_moves, make_move, Board};
//!
//! let board = Board::startpos();
//! let moves = generate_moves(&board);
//! assert_eq!(moves.len(), 20);
//!
//! let next = make_move(&board, moves[0]);
//! assert_eq!(next.side_to_move, chess_core::Color::Black);
//! ```

mod bitboard;
mod board;
pub mod movegen;
mod packed;
pub mod rules;

pub use bitboard::Bitboard;
pub use board::{Board, BoardError, CastlingRights};
pub use movegen::perft::{perft, perft_divide};
pub use movegen::{
    attackers_to, bishop_attacks, generate_moves, is_king_attacked, is_square_attacked,
    king_attacks, knight_attacks, make_move, pawn_attacks, queen_attacks, rook_attacks, MoveList,
};
pub use packed::{MoveFlag, PackedMove};
pub use rules::{classify, is_insufficient_material};
