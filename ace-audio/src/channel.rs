//! Clip channel - transport and rendering for one decoded clip

use ace_analysis::PcmClip;
use std::sync::Arc;

/// One playback channel bound to a scratch copy's decoded clip
#[derive(Debug, Clone)]
pub struct ClipChannel {
    /// Decoded clip - Arc to avoid copying sample data
    clip: Option<Arc<PcmClip>>,
    /// Transport position in source frames
    position: f64,
    /// Whether the transport is running
    playing: bool,
    /// Output gain (0.0 - 1.0)
    gain: f32,
}

impl Default for ClipChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipChannel {
    /// Create an empty channel
    pub fn new() -> Self {
        Self {
            clip: None,
            position: 0.0,
            playing: false,
            gain: 1.0,
        }
    }

    /// Replace the loaded clip; the transport stops and rewinds
    pub fn load(&mut self, clip: Option<Arc<PcmClip>>) {
        self.clip = clip.filter(|c| !c.is_empty());
        self.position = 0.0;
        self.playing = false;
    }

    /// Check if a clip is loaded
    pub fn is_loaded(&self) -> bool {
        self.clip.is_some()
    }

    pub fn clip(&self) -> Option<&Arc<PcmClip>> {
        self.clip.as_ref()
    }

    /// Rewind and start the transport
    pub fn start(&mut self) {
        if self.is_loaded() {
            self.position = 0.0;
            self.playing = true;
        }
    }

    /// Stop and rewind
    pub fn stop(&mut self) {
        self.playing = false;
        self.position = 0.0;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain.clamp(0.0, 1.0);
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    fn sample_rate(&self) -> u32 {
        self.clip.as_ref().map(|c| c.sample_rate).unwrap_or(0)
    }

    fn frames(&self) -> usize {
        self.clip.as_ref().map(|c| c.frames()).unwrap_or(0)
    }

    /// Transport position in seconds
    pub fn elapsed_secs(&self) -> f64 {
        let rate = self.sample_rate();
        if rate == 0 {
            return 0.0;
        }
        self.position / rate as f64
    }

    /// Clip length in seconds
    pub fn length_secs(&self) -> f64 {
        self.clip.as_ref().map(|c| c.duration_secs()).unwrap_or(0.0)
    }

    /// Move the transport to a time in seconds, clamped to the clip
    pub fn seek_secs(&mut self, secs: f64) {
        let max = self.frames() as f64;
        self.position = (secs * self.sample_rate() as f64).clamp(0.0, max);
    }

    /// Advance the transport by elapsed wall time. Stops at the end of the clip.
    pub fn advance(&mut self, secs: f64) {
        if !self.playing {
            return;
        }
        let frames = self.frames() as f64;
        self.position += secs.max(0.0) * self.sample_rate() as f64;
        if self.position >= frames {
            self.position = frames;
            self.playing = false;
        }
    }

    /// Mix this channel into an interleaved output buffer and advance the transport.
    ///
    /// Output is added to `output`, scaled by the channel gain. Mono clips are
    /// spread across all output channels.
    pub fn render(&mut self, output: &mut [f32], output_channels: usize, output_rate: u32) {
        let clip = match (&self.clip, self.playing) {
            (Some(clip), true) => Arc::clone(clip),
            _ => return,
        };
        if output_channels == 0 || output_rate == 0 {
            return;
        }

        let clip_channels = clip.channels as usize;
        let frames = clip.frames();
        let step = clip.sample_rate as f64 / output_rate as f64;

        for frame in output.chunks_mut(output_channels) {
            let pos = self.position as usize;
            if pos >= frames {
                self.position = frames as f64;
                self.playing = false;
                break;
            }

            // Linear interpolation between neighbouring frames
            let frac = self.position.fract() as f32;
            let next = (pos + 1).min(frames - 1);

            for (ch, out) in frame.iter_mut().enumerate() {
                let src_ch = ch % clip_channels;
                let s0 = clip.samples[pos * clip_channels + src_ch];
                let s1 = clip.samples[next * clip_channels + src_ch];
                *out += (s0 + frac * (s1 - s0)) * self.gain;
            }

            self.position += step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(secs: f64, rate: u32) -> Arc<PcmClip> {
        Arc::new(PcmClip::silence(secs, rate, 1))
    }

    #[test]
    fn test_start_requires_clip() {
        let mut ch = ClipChannel::new();
        ch.start();
        assert!(!ch.is_playing());

        ch.load(Some(clip(1.0, 1000)));
        ch.start();
        assert!(ch.is_playing());
    }

    #[test]
    fn test_empty_clip_is_not_loaded() {
        let mut ch = ClipChannel::new();
        ch.load(Some(Arc::new(PcmClip::new(Vec::new(), 44100, 1))));
        assert!(!ch.is_loaded());
    }

    #[test]
    fn test_advance_tracks_time_and_stops_at_end() {
        let mut ch = ClipChannel::new();
        ch.load(Some(clip(1.0, 1000)));
        ch.start();
        ch.advance(0.25);
        assert!((ch.elapsed_secs() - 0.25).abs() < 1e-9);
        ch.advance(1.0);
        assert!(!ch.is_playing());
        assert!((ch.elapsed_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_render_applies_gain_and_spreads_mono() {
        let mut ch = ClipChannel::new();
        ch.load(Some(Arc::new(PcmClip::new(vec![0.5; 100], 100, 1))));
        ch.set_gain(0.5);
        ch.start();

        let mut out = vec![0.0f32; 20];
        ch.render(&mut out, 2, 100);
        assert!(out.iter().all(|&s| (s - 0.25).abs() < 1e-6));
        assert!((ch.elapsed_secs() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_render_resamples_by_rate_ratio() {
        let mut ch = ClipChannel::new();
        ch.load(Some(clip(1.0, 22050)));
        ch.start();
        let mut out = vec![0.0f32; 4410 * 2];
        ch.render(&mut out, 2, 44100);
        assert!((ch.elapsed_secs() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_render_stops_at_end() {
        let mut ch = ClipChannel::new();
        ch.load(Some(clip(0.01, 1000)));
        ch.start();
        let mut out = vec![0.0f32; 100];
        ch.render(&mut out, 1, 1000);
        assert!(!ch.is_playing());
    }
}
