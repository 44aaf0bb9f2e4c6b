//! Min/max waveform envelope rasterizer
//!
//! Interleaved multi-channel audio is treated as one flat sample stream;
//! channels are not separated or averaged. The stream is split into
//! `width` equal buckets using integer division, so a trailing partial
//! bucket is dropped. Both behaviors are a known approximation kept on
//! purpose so envelopes stay comparable between copies.

use image::{Rgba, RgbaImage};

/// Colors used when painting an envelope bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveformStyle {
    pub background: Rgba<u8>,
    pub foreground: Rgba<u8>,
}

impl Default for WaveformStyle {
    fn default() -> Self {
        Self {
            background: Rgba([0x20, 0x22, 0x26, 0xff]),
            foreground: Rgba([0xff, 0x9a, 0x1f, 0xff]),
        }
    }
}

/// Minimum and maximum sample value within one pixel column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeColumn {
    pub min: f32,
    pub max: f32,
}

impl EnvelopeColumn {
    /// Map both extrema to pixel rows, returned as (low_row, high_row)
    pub fn rows(&self, height: u32) -> (u32, u32) {
        let a = value_to_row(self.min, height);
        let b = value_to_row(self.max, height);
        (a.min(b), a.max(b))
    }
}

/// Map a sample value to a row: `y = half + value * half`, clamped to the bitmap
fn value_to_row(value: f32, height: u32) -> u32 {
    let half = height as f32 * 0.5;
    let y = (half + value * half).clamp(0.0, (height - 1) as f32);
    y as u32
}

/// Compute per-column min/max over `width` contiguous equal buckets.
///
/// Only complete buckets are returned. When there are fewer samples than
/// columns each bucket holds a single sample and the trailing columns
/// have no entry.
pub fn envelope(samples: &[f32], width: usize) -> Vec<EnvelopeColumn> {
    if samples.is_empty() || width == 0 {
        return Vec::new();
    }

    let samples_per_pixel = (samples.len() / width).max(1);

    samples
        .chunks_exact(samples_per_pixel)
        .take(width)
        .map(|bucket| {
            let (min, max) = bucket
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
                    (lo.min(s), hi.max(s))
                });
            EnvelopeColumn { min, max }
        })
        .collect()
}

/// Rasterize a min/max envelope bitmap of `width` x `height` pixels.
///
/// `channels` is informational only: interleaved frames are rasterized as
/// one flat stream. Returns `None` for empty input or a zero-sized bitmap.
/// Every call allocates a fresh bitmap.
pub fn rasterize(
    samples: &[f32],
    channels: u16,
    width: u32,
    height: u32,
    style: &WaveformStyle,
) -> Option<RgbaImage> {
    debug_assert!(channels > 0, "clip must have at least one channel");
    if samples.is_empty() || width == 0 || height == 0 {
        return None;
    }

    let mut bitmap = RgbaImage::from_pixel(width, height, style.background);

    for (x, column) in envelope(samples, width as usize).iter().enumerate() {
        let (low, high) = column.rows(height);
        for y in low..=high {
            bitmap.put_pixel(x as u32, y, style.foreground);
        }
    }

    Some(bitmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn painted_rows(bitmap: &RgbaImage, x: u32, style: &WaveformStyle) -> Vec<u32> {
        (0..bitmap.height())
            .filter(|&y| *bitmap.get_pixel(x, y) == style.foreground)
            .collect()
    }

    #[test]
    fn test_silence_is_center_line() {
        let style = WaveformStyle::default();
        let bitmap = rasterize(&vec![0.0; 44100], 1, 512, 128, &style).unwrap();
        assert_eq!(bitmap.width(), 512);
        for x in 0..512 {
            assert_eq!(painted_rows(&bitmap, x, &style), vec![64]);
        }
    }

    #[test]
    fn test_constant_value_same_span_every_column() {
        let style = WaveformStyle::default();
        let bitmap = rasterize(&vec![0.5; 10_000], 1, 100, 64, &style).unwrap();
        let first = painted_rows(&bitmap, 0, &style);
        assert_eq!(first, vec![48]);
        for x in 1..100 {
            assert_eq!(painted_rows(&bitmap, x, &style), first);
        }
    }

    #[test]
    fn test_rasterize_is_deterministic() {
        let style = WaveformStyle::default();
        let samples: Vec<f32> = (0..48_000).map(|i| ((i as f32) * 0.013).sin()).collect();
        let a = rasterize(&samples, 2, 512, 96, &style).unwrap();
        let b = rasterize(&samples, 2, 512, 96, &style).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_span_covers_min_to_max() {
        let style = WaveformStyle::default();
        // One bucket per column: [-1, 1] spans the full height
        let bitmap = rasterize(&[-1.0, 1.0], 1, 1, 10, &style).unwrap();
        assert_eq!(painted_rows(&bitmap, 0, &style), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_trailing_partial_bucket_dropped() {
        // 10 samples over 3 columns: 3 per column, the last sample is ignored
        let mut samples = vec![0.0; 10];
        samples[9] = 1.0;
        let columns = envelope(&samples, 3);
        assert_eq!(columns.len(), 3);
        assert!(columns.iter().all(|c| c.max == 0.0));
    }

    #[test]
    fn test_short_input_leaves_background() {
        let style = WaveformStyle::default();
        let bitmap = rasterize(&[0.0, 0.0], 1, 4, 8, &style).unwrap();
        assert_eq!(painted_rows(&bitmap, 0, &style), vec![4]);
        assert_eq!(painted_rows(&bitmap, 1, &style), vec![4]);
        assert!(painted_rows(&bitmap, 2, &style).is_empty());
        assert!(painted_rows(&bitmap, 3, &style).is_empty());
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let style = WaveformStyle::default();
        assert!(rasterize(&[], 1, 512, 128, &style).is_none());
        assert!(rasterize(&[0.0; 16], 1, 0, 128, &style).is_none());
        assert!(envelope(&[], 8).is_empty());
    }
}
