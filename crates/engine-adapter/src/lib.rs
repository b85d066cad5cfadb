//! A single contract over interchangeable chess rule engines.
//!
//! Game-playing code talks to an [`EngineAdapter`] and never to a rule
//! engine directly. Two backends implement it:
//!
//! - [`NativeAdapter`], over the workspace's own bitboard engine
//! - [`ShakmatyAdapter`], over the `shakmaty` library
//!
//! [`Backend`] picks one by name (native when nothing is selected), and
//! [`ParityChecker`] compares two backends over a battery of reference
//! positions.
//!
//! # Example
//!
//! ```
//! use chess_core::Move;
//! use engine_adapter::{Backend, EngineAdapter};
//!
//! let adapter = Backend::select(None).unwrap();
//! let start = adapter.initial_state();
//! let next = adapter.apply_move(&start, Move::from_uci("e2e4").unwrap()).unwrap();
//! assert_eq!(
//!     adapter.to_notation(&next),
//!     "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
//! );
//! ```

mod adapter;
mod backend;
mod config;
mod error;
mod native;
pub mod parity;
mod third_party;

pub use adapter::EngineAdapter;
pub use backend::{Backend, BackendKind};
pub use config::{AdapterConfig, ConfigError, ParityConfig, BACKEND_ENV};
pub use error::AdapterError;
pub use native::NativeAdapter;
pub use parity::{Divergence, ParityChecker, ParityReport, ReferencePosition};
pub use third_party::ShakmatyAdapter;
