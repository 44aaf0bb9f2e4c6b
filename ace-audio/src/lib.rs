//! Audio playback for ACE - lockstep A/B comparison
//!
//! This module provides:
//! - ClipChannel: a single transport over a decoded clip
//! - AbSwitcher: two channels in lockstep, audible side chosen by gain

mod channel;
mod switcher;

pub use channel::ClipChannel;
pub use switcher::{AbSwitcher, PlaybackState, SharedSwitcher, TransportEvent};
