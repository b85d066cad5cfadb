//! The closed set of backends and the selector that picks one by name.

use std::fmt;
use std::str::FromStr;

use chess_core::{Move, Position, TerminalInfo};
use tracing::debug;

use crate::{AdapterError, EngineAdapter, NativeAdapter, ShakmatyAdapter};

/// Which rule engine to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendKind {
    /// The workspace's own bitboard engine. Used when nothing is selected.
    #[default]
    Native,
    /// The `shakmaty` library.
    ThirdParty,
}

impl BackendKind {
    pub const ALL: [BackendKind; 2] = [BackendKind::Native, BackendKind::ThirdParty];

    pub const fn name(self) -> &'static str {
        match self {
            BackendKind::Native => NativeAdapter::NAME,
            BackendKind::ThirdParty => ShakmatyAdapter::NAME,
        }
    }

    /// Resolves an optional selection; `None` means the native default.
    pub fn select(name: Option<&str>) -> Result<Self, AdapterError> {
        name.map_or(Ok(BackendKind::default()), |name| name.parse())
    }

    pub fn build(self) -> Backend {
        debug!(backend = self.name(), "constructing backend");
        match self {
            BackendKind::Native => Backend::Native(NativeAdapter::new()),
            BackendKind::ThirdParty => Backend::ThirdParty(ShakmatyAdapter::new()),
        }
    }
}

impl FromStr for BackendKind {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s.trim())
            .ok_or_else(|| AdapterError::UnknownBackend(s.to_string()))
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A constructed backend of one of the known kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Native(NativeAdapter),
    ThirdParty(ShakmatyAdapter),
}

impl Backend {
    /// Builds the backend named `name`, or the native one when `name` is
    /// `None`. Unknown names are an error, never a fallback.
    pub fn select(name: Option<&str>) -> Result<Self, AdapterError> {
        Ok(BackendKind::select(name)?.build())
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Native(_) => BackendKind::Native,
            Backend::ThirdParty(_) => BackendKind::ThirdParty,
        }
    }

    fn inner(&self) -> &dyn EngineAdapter {
        match self {
            Backend::Native(adapter) => adapter,
            Backend::ThirdParty(adapter) => adapter,
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        BackendKind::default().build()
    }
}

impl EngineAdapter for Backend {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn initial_state(&self) -> Position {
        self.inner().initial_state()
    }

    fn legal_moves(&self, position: &Position) -> Result<Vec<Move>, AdapterError> {
        self.inner().legal_moves(position)
    }

    fn apply_move(&self, position: &Position, mv: Move) -> Result<Position, AdapterError> {
        self.inner().apply_move(position, mv)
    }

    fn outcome(&self, position: &Position) -> Result<TerminalInfo, AdapterError> {
        self.inner().outcome(position)
    }

    fn to_notation(&self, position: &Position) -> String {
        self.inner().to_notation(position)
    }

    fn from_notation(&self, notation: &str) -> Result<Position, AdapterError> {
        self.inner().from_notation(notation)
    }

    fn perft(&self, position: &Position, depth: u32) -> Result<u64, AdapterError> {
        self.inner().perft(position, depth)
    }

    fn perft_divide(
        &self,
        position: &Position,
        depth: u32,
    ) -> Result<Vec<(Move, u64)>, AdapterError> {
        self.inner().perft_divide(position, depth)
    }
}
