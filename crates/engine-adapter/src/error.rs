//! Errors crossing the adapter boundary.

use chess_core::{ActionError, Move};
use thiserror::Error;

use crate::config::ConfigError;

/// Every failure an adapter operation can report.
///
/// Backends convert their own failures (parse errors, rejected setups,
/// library play errors) into these variants, so callers never see a
/// backend-specific error type.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The notation string could not be turned into a playable position.
    #[error("malformed notation '{notation}': {reason}")]
    MalformedNotation { notation: String, reason: String },

    /// The move is not among the legal moves of the position.
    #[error("illegal move {mv} in position '{notation}'")]
    IllegalMove { mv: Move, notation: String },

    /// An action index outside `0..4096`.
    #[error("action index {0} is outside 0..4096")]
    ActionIndexOutOfRange(usize),

    /// A decoded action that matches no legal move.
    #[error("action {index} ({decoded}) matches no legal move")]
    UnmatchedAction { index: usize, decoded: Move },

    /// The backend selector was given a name it does not know.
    #[error("unknown backend '{0}', expected 'native' or 'third-party'")]
    UnknownBackend(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AdapterError {
    pub(crate) fn malformed(notation: &str, reason: impl ToString) -> Self {
        AdapterError::MalformedNotation {
            notation: notation.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn illegal(mv: Move, notation: &str) -> Self {
        AdapterError::IllegalMove {
            mv,
            notation: notation.to_string(),
        }
    }
}

impl From<ActionError> for AdapterError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::OutOfRange(index) => AdapterError::ActionIndexOutOfRange(index),
            ActionError::Unmatched { index, decoded } => {
                AdapterError::UnmatchedAction { index, decoded }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_errors_map_onto_adapter_kinds() {
        let err = AdapterError::from(ActionError::OutOfRange(5000));
        assert!(matches!(err, AdapterError::ActionIndexOutOfRange(5000)));

        let decoded = Move::from_uci("a1a2").unwrap();
        let err = AdapterError::from(ActionError::Unmatched { index: 1, decoded });
        assert!(matches!(err, AdapterError::UnmatchedAction { index: 1, .. }));
    }

    #[test]
    fn messages_name_the_input() {
        let err = AdapterError::malformed("garbage", "expected 6 fields");
        assert!(err.to_string().contains("garbage"));

        let err = AdapterError::UnknownBackend("stockfish".to_string());
        assert!(err.to_string().contains("stockfish"));
    }
}
