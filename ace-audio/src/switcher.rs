//! A/B switcher - two channels in lockstep, one audible at a time
//!
//! Both channels always start together and advance from the same clock.
//! Switching only swaps gains, so the comparison is gapless and
//! sample-accurate.

use crate::channel::ClipChannel;
use ace_analysis::{CopyLabel, PcmClip};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Switcher shared between the session and an audio device thread
pub type SharedSwitcher = Arc<Mutex<AbSwitcher>>;

/// Transport state of the pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

/// Notifications raised while polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    /// Both channels reached the end of their clips
    Finished,
}

/// Drives the two playback channels bound to copies A and B
#[derive(Debug, Default)]
pub struct AbSwitcher {
    channels: [ClipChannel; 2],
    audible: CopyLabel,
    state: PlaybackState,
    /// Normalized playback cursor (0.0 - 1.0) of the audible channel
    cursor: f64,
}

impl AbSwitcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in a mutex for sharing with an audio callback
    pub fn into_shared(self) -> SharedSwitcher {
        Arc::new(Mutex::new(self))
    }

    /// Bind a decoded clip to one channel. Playback stops so lockstep is kept.
    pub fn load(&mut self, label: CopyLabel, clip: Option<Arc<PcmClip>>) {
        if self.state == PlaybackState::Playing {
            self.stop();
        }
        self.channels[label.index()].load(clip);
        self.apply_gains();
    }

    /// Stop, unload both clips and select channel A
    pub fn reset(&mut self) {
        self.stop();
        for ch in &mut self.channels {
            ch.load(None);
        }
        self.audible = CopyLabel::A;
        self.apply_gains();
    }

    /// Both channels have a clip loaded
    pub fn is_ready(&self) -> bool {
        self.channels.iter().all(ClipChannel::is_loaded)
    }

    /// Start both channels from zero. Returns false without a clip on either side.
    pub fn play(&mut self) -> bool {
        if !self.is_ready() {
            debug!("play ignored: both channels need a clip");
            return false;
        }
        for ch in &mut self.channels {
            ch.start();
        }
        self.apply_gains();
        self.state = PlaybackState::Playing;
        self.cursor = 0.0;
        true
    }

    /// Halt both channels and rewind the cursor
    pub fn stop(&mut self) {
        for ch in &mut self.channels {
            ch.stop();
        }
        self.state = PlaybackState::Stopped;
        self.cursor = 0.0;
    }

    /// Toggle between playing and stopped
    pub fn toggle(&mut self) -> PlaybackState {
        match self.state {
            PlaybackState::Playing => self.stop(),
            PlaybackState::Stopped => {
                self.play();
            }
        }
        self.state
    }

    /// Make the other channel audible. The transport is not touched.
    pub fn switch_channel(&mut self) -> CopyLabel {
        self.resync();
        self.audible = self.audible.other();
        self.apply_gains();
        debug!(audible = %self.audible, "switched channel");
        self.audible
    }

    /// Align the inaudible channel's transport to the audible one.
    ///
    /// A channel that already ran off the end of a shorter clip carries no
    /// position worth copying, so the other side is left where it is.
    fn resync(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let audible = &self.channels[self.audible.index()];
        if !audible.is_playing() {
            return;
        }
        let elapsed = audible.elapsed_secs();
        self.channels[self.audible.other().index()].seek_secs(elapsed);
    }

    fn apply_gains(&mut self) {
        let audible = self.audible;
        for label in CopyLabel::ALL {
            let gain = if label == audible { 1.0 } else { 0.0 };
            self.channels[label.index()].set_gain(gain);
        }
    }

    /// Advance both transports by the same elapsed time
    pub fn advance(&mut self, secs: f64) {
        if self.state != PlaybackState::Playing {
            return;
        }
        for ch in &mut self.channels {
            ch.advance(secs);
        }
    }

    /// Render both channels into an interleaved device buffer
    pub fn render(&mut self, output: &mut [f32], output_channels: usize, output_rate: u32) {
        output.fill(0.0);
        if self.state != PlaybackState::Playing {
            return;
        }
        for ch in &mut self.channels {
            ch.render(output, output_channels, output_rate);
        }
    }

    /// Refresh the cursor; called once per display refresh.
    ///
    /// Returns `Finished` when neither channel is still playing.
    pub fn poll(&mut self) -> Option<TransportEvent> {
        if self.state != PlaybackState::Playing {
            return None;
        }
        if !self.channels.iter().any(ClipChannel::is_playing) {
            self.stop();
            return Some(TransportEvent::Finished);
        }

        let ch = &self.channels[self.audible.index()];
        let length = ch.length_secs();
        self.cursor = if length > 0.0 {
            (ch.elapsed_secs() / length).clamp(0.0, 1.0)
        } else {
            0.0
        };
        None
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    pub fn audible(&self) -> CopyLabel {
        self.audible
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn channel(&self, label: CopyLabel) -> &ClipChannel {
        &self.channels[label.index()]
    }
}
