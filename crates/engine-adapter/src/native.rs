//! Backend backed by the in-workspace bitboard engine.

use chess_core::{Move, Position, TerminalInfo};
use chess_engine::{classify, generate_moves, make_move, perft, perft_divide, Board};
use tracing::debug;

use crate::{AdapterError, EngineAdapter};

/// Adapter over [`chess_engine`].
///
/// Each call loads a fresh [`Board`] from the position's notation, so the
/// board can never carry castling, en-passant or clock state from one call
/// into another.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NativeAdapter;

impl NativeAdapter {
    pub const NAME: &'static str = "native";

    pub fn new() -> Self {
        NativeAdapter
    }

    fn board(&self, notation: &str) -> Result<Board, AdapterError> {
        Board::from_fen(notation).map_err(|err| {
            debug!(backend = Self::NAME, notation, error = %err, "rejected notation");
            AdapterError::malformed(notation, err)
        })
    }
}

impl EngineAdapter for NativeAdapter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn initial_state(&self) -> Position {
        Position::startpos()
    }

    fn legal_moves(&self, position: &Position) -> Result<Vec<Move>, AdapterError> {
        let board = self.board(position.notation())?;
        Ok(generate_moves(&board).to_moves())
    }

    fn apply_move(&self, position: &Position, mv: Move) -> Result<Position, AdapterError> {
        let board = self.board(position.notation())?;
        let Some(packed) = generate_moves(&board).find(mv) else {
            debug!(backend = Self::NAME, notation = position.notation(), uci = %mv, "illegal move");
            return Err(AdapterError::illegal(mv, position.notation()));
        };

        let next = make_move(&board, packed);
        let notation = next.to_fen();
        let successor = position
            .successor(&notation)
            .map_err(|err| AdapterError::malformed(&notation, err))?;
        Ok(successor.with_legal_moves(generate_moves(&next).to_moves()))
    }

    fn outcome(&self, position: &Position) -> Result<TerminalInfo, AdapterError> {
        let board = self.board(position.notation())?;
        Ok(classify(&board, position.repetition_count()))
    }

    fn from_notation(&self, notation: &str) -> Result<Position, AdapterError> {
        let board = self.board(notation)?;
        Position::from_notation(&board.to_fen())
            .map_err(|err| AdapterError::malformed(notation, err))
    }

    fn perft(&self, position: &Position, depth: u32) -> Result<u64, AdapterError> {
        Ok(perft(&self.board(position.notation())?, depth))
    }

    fn perft_divide(
        &self,
        position: &Position,
        depth: u32,
    ) -> Result<Vec<(Move, u64)>, AdapterError> {
        Ok(perft_divide(&self.board(position.notation())?, depth))
    }
}
