//! Session primitives shared across the mathpad crates.
//!
//! This crate is delegate-agnostic: it knows nothing about how expressions
//! are evaluated, only how session state (bindings, history, persistence)
//! is stored.

pub mod env;
pub mod history;
pub mod persist;
pub mod types;

pub use env::VariableStore;
pub use history::HistoryCache;
pub use persist::{BlobStore, FsBlobStore, HistoryPersistence};
pub use types::{HistoryConfig, HistoryRecord, Icon};
