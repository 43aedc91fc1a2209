//! Evaluation-session orchestration: command dispatch, pending-result
//! staging, and the commit protocol into the bounded history cache.
//!
//! The engine is stateless about math: every computation goes through a
//! caller-supplied [`MathDelegate`]. Callers construct an [`Engine`]
//! explicitly and hold the instance; there is no process-wide default.

pub mod delegate;
pub mod dispatch;
pub mod engine;
pub mod error;

pub use delegate::{DelegateError, MathDelegate};
pub use dispatch::{dispatch, CommandOutcome};
pub use engine::{ChangeEvent, Engine};
pub use error::CommandError;
