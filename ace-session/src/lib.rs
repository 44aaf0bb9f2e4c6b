//! Comparison session for ACE
//!
//! `ComparisonSession` is the host-facing entry point: select a source
//! asset, feed it input and ticks, run the decode requests it hands out,
//! and read back preview instructions.

mod config;
mod error;
mod session;
mod stats;

pub use config::{ClockSource, SessionConfig};
pub use error::CompareError;
pub use session::{ComparisonSession, Selection, SessionState};
pub use stats::{CopyState, CopyStats};
