//! Decoded PCM clip

use std::sync::Arc;

/// A decoded audio clip: interleaved f32 samples in [-1, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct PcmClip {
    /// Interleaved samples - Arc so copies and channels share one buffer
    pub samples: Arc<Vec<f32>>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channels: u16,
}

impl PcmClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples: Arc::new(samples),
            sample_rate,
            channels: channels.max(1),
        }
    }

    /// Silent clip of the given length
    pub fn silence(duration_secs: f64, sample_rate: u32, channels: u16) -> Self {
        let channels = channels.max(1);
        let frames = (duration_secs * sample_rate as f64).round() as usize;
        Self::new(vec![0.0; frames * channels as usize], sample_rate, channels)
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Clip length in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_duration() {
        let clip = PcmClip::silence(1.0, 44100, 1);
        assert_eq!(clip.frames(), 44100);
        assert!((clip.duration_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_stereo_frames() {
        let clip = PcmClip::new(vec![0.0; 200], 100, 2);
        assert_eq!(clip.frames(), 100);
        assert!((clip.duration_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_rate_duration() {
        let clip = PcmClip::new(vec![0.5; 10], 0, 1);
        assert_eq!(clip.duration_secs(), 0.0);
    }
}
