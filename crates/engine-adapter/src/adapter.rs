//! The contract every rule-engine backend implements.

use chess_core::{action, Move, Position, TerminalInfo};

use crate::AdapterError;

/// A chess rule engine seen through immutable [`Position`] values.
///
/// Implementations hold no per-game state: every call rebuilds whatever
/// board it needs from the position's notation and drops it before
/// returning. One adapter can therefore serve any number of games on any
/// number of threads.
///
/// A position's cached legal moves are never trusted. Implementations
/// compute legal moves from the notation on every call.
pub trait EngineAdapter: Send + Sync {
    /// Stable identifier used in logs and by the backend selector.
    fn name(&self) -> &'static str;

    /// The standard starting position.
    fn initial_state(&self) -> Position;

    /// All legal moves, in the backend's generation order.
    fn legal_moves(&self, position: &Position) -> Result<Vec<Move>, AdapterError>;

    /// Plays `mv` and returns the successor, which carries its own legal
    /// moves as cache. Fails with [`AdapterError::IllegalMove`] when `mv` is
    /// not legal; `position` is never modified.
    fn apply_move(&self, position: &Position, mv: Move) -> Result<Position, AdapterError>;

    /// Whether the game is over, the result and why.
    fn outcome(&self, position: &Position) -> Result<TerminalInfo, AdapterError>;

    /// Always agrees with [`outcome`](EngineAdapter::outcome).
    fn is_terminal(&self, position: &Position) -> Result<bool, AdapterError> {
        Ok(self.outcome(position)?.is_terminal())
    }

    fn to_notation(&self, position: &Position) -> String {
        position.notation().to_string()
    }

    /// Parses and validates a notation string. Malformed or unplayable
    /// input is reported as [`AdapterError::MalformedNotation`].
    fn from_notation(&self, notation: &str) -> Result<Position, AdapterError>;

    /// Number of leaf positions exactly `depth` plies ahead.
    fn perft(&self, position: &Position, depth: u32) -> Result<u64, AdapterError>;

    /// Perft counts per root move, sorted by the move's long-algebraic form.
    fn perft_divide(&self, position: &Position, depth: u32)
        -> Result<Vec<(Move, u64)>, AdapterError>;

    /// The 4096-slot mask of the position's legal moves.
    fn action_mask(&self, position: &Position) -> Result<Vec<bool>, AdapterError> {
        Ok(action::mask(&self.legal_moves(position)?))
    }

    /// Resolves a policy action to a legal move of `position`.
    fn decode_action(&self, position: &Position, index: usize) -> Result<Move, AdapterError> {
        let legal = self.legal_moves(position)?;
        Ok(action::decode_legal(index, &legal)?)
    }
}
