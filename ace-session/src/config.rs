use ace_library::{EngineConfig, WaveformSpec};

/// What advances the playback transports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockSource {
    /// `tick` advances both channels by the elapsed time
    #[default]
    Internal,
    /// An audio device renders through the shared switcher; `tick` only polls
    Host,
}

/// In-memory session settings
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfig {
    pub waveform: WaveformSpec,
    pub clock: ClockSource,
}

impl SessionConfig {
    pub fn from_engine(engine: &EngineConfig, clock: ClockSource) -> Self {
        Self {
            waveform: WaveformSpec {
                width: engine.waveform_width,
                height: engine.waveform_height,
                ..Default::default()
            },
            clock,
        }
    }
}
