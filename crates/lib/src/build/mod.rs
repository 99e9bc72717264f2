//! Build configuration and per-build state.
//!
//! # Submodules
//!
//! - [`cancel`] - Cooperative cancellation and deadlines
//! - [`options`] - Caller-supplied build configuration
//! - [`session`] - State scoped to a single build call

pub mod cancel;
mod options;
mod session;
mod types;

pub use cancel::{CancelToken, Interrupted};
pub use options::*;
pub use session::BuildSession;
pub use types::*;
