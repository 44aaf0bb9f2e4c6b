//! Input handling for ACE
//!
//! Translates terminal key events into comparison commands.

mod commands;
mod modal;

pub use commands::Command;
pub use modal::{InputHandler, Mode};
