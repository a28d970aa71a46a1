//! Use-case level entry points for Bolajon clients.
//!
//! Every call opens the configured database, runs one core use-case, and
//! returns an [`ApiResponse`] envelope. Nothing here panics.

pub mod api;
mod envelope;

pub use envelope::{ApiErrorKind, ApiResponse};
