//! Command definitions for ACE

use ace_analysis::CopyLabel;
use ace_library::QualityStep;

/// Commands that can be dispatched from input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Playback
    TogglePlayback,
    SwitchChannel,
    Stop,

    // Copy configuration
    Focus(CopyLabel),
    /// Lower/raise the primary quality knob of the focused copy
    Adjust(CopyLabel, QualityStep),
    /// Step the secondary knob (texture compression, audio mono)
    Cycle(CopyLabel, QualityStep),
    /// `key=value,...` settings typed in command mode
    Configure(CopyLabel, String),

    // Split view
    ZoomIn,
    ZoomOut,
    /// Move the divider by a normalized amount
    MoveDivider(f32),
    ResetView,

    // Mode
    EnterCommandMode,
    EnterNormalMode,

    Snapshot,
    Quit,
}
