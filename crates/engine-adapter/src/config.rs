//! Configuration file loading for backend selection.
//!
//! The configuration lives in `adapter.toml` in the working directory. A
//! missing file means the defaults: the native backend and shallow parity
//! perft.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::{AdapterError, Backend, BackendKind};

/// Environment variable that overrides the configured backend.
pub const BACKEND_ENV: &str = "CHESS_ADAPTER_BACKEND";

/// Errors that can occur when loading the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Settings for comparing two backends.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ParityConfig {
    /// Deepest perft compared per reference position.
    pub perft_depth: u32,
    /// Largest perft depth the command-line tool will run.
    pub max_perft_depth: u32,
}

impl Default for ParityConfig {
    fn default() -> Self {
        ParityConfig {
            perft_depth: 2,
            max_perft_depth: 4,
        }
    }
}

/// Top-level adapter configuration.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AdapterConfig {
    /// Backend name, `"native"` or `"third-party"`. Absent means native.
    pub backend: Option<String>,
    pub parity: ParityConfig,
}

impl AdapterConfig {
    /// Loads `adapter.toml`, falling back to defaults when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be
    /// read, or [`ConfigError::ParseError`] if it is not valid TOML.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads the configuration at `path`, falling back to defaults when
    /// the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn config_path() -> PathBuf {
        PathBuf::from("adapter.toml")
    }

    /// Applies [`BACKEND_ENV`] when it is set.
    pub fn with_env_override(self) -> Self {
        self.with_backend_override(std::env::var(BACKEND_ENV).ok())
    }

    /// Replaces the backend name when `backend` is `Some`.
    pub fn with_backend_override(mut self, backend: Option<String>) -> Self {
        if backend.is_some() {
            self.backend = backend;
        }
        self
    }

    /// The selected backend kind.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::UnknownBackend`] for a name the selector
    /// does not know.
    pub fn backend_kind(&self) -> Result<BackendKind, AdapterError> {
        BackendKind::select(self.backend.as_deref())
    }

    pub fn build(&self) -> Result<Backend, AdapterError> {
        Ok(self.backend_kind()?.build())
    }
}
