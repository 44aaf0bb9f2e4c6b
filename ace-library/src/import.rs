//! Import pipeline - applies a copy's settings to raw content

use crate::asset::AssetKind;
use crate::content::{DecodedContent, DecodedImage, ImportedContent, RawContent};
use crate::settings::{AudioSettings, ImportSettings, SampleRateSetting, TextureSettings};
use ace_analysis::PcmClip;
use image::{DynamicImage, RgbaImage};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while applying import settings
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("{settings:?} settings cannot import {content:?} content")]
    KindMismatch {
        content: AssetKind,
        settings: AssetKind,
    },
    #[error("Content is empty")]
    EmptyContent,
    #[error("Sample rate {0} Hz is out of range")]
    SampleRate(u32),
    #[error("Resample error: {0}")]
    Resample(String),
}

/// Apply import settings to raw content
pub fn import(raw: &RawContent, settings: &ImportSettings) -> Result<ImportedContent, ImportError> {
    match (raw, settings) {
        (RawContent::Image(img), ImportSettings::Texture(s)) => import_texture(img, s),
        (RawContent::Pcm(clip), ImportSettings::Audio(s)) => import_audio(clip, s),
        _ => Err(ImportError::KindMismatch {
            content: raw.kind(),
            settings: settings.kind(),
        }),
    }
}

fn import_texture(img: &DynamicImage, settings: &TextureSettings) -> Result<ImportedContent, ImportError> {
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(ImportError::EmptyContent);
    }

    // resize() keeps the aspect ratio and fits inside the bounds
    let mut rgba = if width.max(height) > settings.max_size {
        img.resize(settings.max_size, settings.max_size, settings.filter.filter_type())
            .to_rgba8()
    } else {
        img.to_rgba8()
    };

    quantize_image(&mut rgba, settings.compression.bits_per_channel());

    let pixels = rgba.width() as u64 * rgba.height() as u64;
    let mut imported_size = pixels * settings.compression.bits_per_pixel() / 8;
    if settings.generate_mipmaps {
        imported_size = imported_size * 4 / 3;
    }

    Ok(ImportedContent {
        content: DecodedContent::Texture(DecodedImage {
            image: Arc::new(rgba),
            source_width: width,
            source_height: height,
        }),
        imported_size,
    })
}

/// Reduce color channels to `bits` of precision; alpha is kept
fn quantize_image(img: &mut RgbaImage, bits: u8) {
    if bits >= 8 {
        return;
    }
    let levels = ((1u32 << bits) - 1) as f32;
    for pixel in img.pixels_mut() {
        for c in &mut pixel.0[..3] {
            let q = (*c as f32 / 255.0 * levels).round() / levels;
            *c = (q * 255.0).round() as u8;
        }
    }
}

fn import_audio(clip: &PcmClip, settings: &AudioSettings) -> Result<ImportedContent, ImportError> {
    if clip.is_empty() || clip.sample_rate == 0 {
        return Err(ImportError::EmptyContent);
    }

    let mut channels = clip.channels;
    let mut samples: Vec<f32> = if settings.force_mono && channels > 1 {
        let ch = channels as usize;
        channels = 1;
        clip.samples
            .chunks_exact(ch)
            .map(|frame| frame.iter().sum::<f32>() / ch as f32)
            .collect()
    } else {
        clip.samples.to_vec()
    };

    let mut sample_rate = clip.sample_rate;
    if let SampleRateSetting::Override(target) = settings.sample_rate {
        if !(AudioSettings::MIN_SAMPLE_RATE..=AudioSettings::MAX_SAMPLE_RATE).contains(&target) {
            return Err(ImportError::SampleRate(target));
        }
        if target != sample_rate {
            samples = resample(&samples, sample_rate, target, channels)?;
            sample_rate = target;
        }
    }

    let bits = settings.bits();
    quantize_samples(&mut samples, bits);

    let imported_size = samples.len() as u64 * bits as u64 / 8;
    Ok(ImportedContent {
        content: DecodedContent::Audio(Arc::new(PcmClip::new(samples, sample_rate, channels))),
        imported_size,
    })
}

/// Round samples to a signed `bits`-bit grid
fn quantize_samples(samples: &mut [f32], bits: u32) {
    if bits >= 24 {
        return;
    }
    let levels = (1u32 << (bits - 1)) as f32;
    for s in samples.iter_mut() {
        *s = ((*s * levels).round() / levels).clamp(-1.0, 1.0);
    }
}

/// Resample interleaved audio to a new sample rate.
///
/// The output is aligned with the input in time: the resampler's delay is
/// trimmed from the front and its buffered tail is flushed, so a frame at
/// `t` seconds in the source lands at `t` seconds in the result.
fn resample(
    samples: &[f32],
    source_rate: u32,
    target_rate: u32,
    channels: u16,
) -> Result<Vec<f32>, ImportError> {
    use rubato::{FftFixedInOut, Resampler};

    let channels_usize = channels as usize;
    let frames = samples.len() / channels_usize;
    let expected = (frames as u64 * target_rate as u64 / source_rate as u64) as usize;

    let mut resampler = FftFixedInOut::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        1024,
        channels_usize,
    )
    .map_err(|e| ImportError::Resample(e.to_string()))?;
    let delay = resampler.output_delay();

    let deinterleaved: Vec<Vec<f32>> = (0..channels_usize)
        .map(|ch| {
            samples
                .iter()
                .skip(ch)
                .step_by(channels_usize)
                .copied()
                .collect()
        })
        .collect();

    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(expected + delay); channels_usize];
    let push = |resampled: Vec<Vec<f32>>, output: &mut Vec<Vec<f32>>| {
        for (ch, data) in resampled.into_iter().enumerate() {
            output[ch].extend(data);
        }
    };

    let mut pos = 0;
    loop {
        let chunk_size = resampler.input_frames_next();
        if pos + chunk_size > frames {
            break;
        }
        let input_refs: Vec<&[f32]> = deinterleaved
            .iter()
            .map(|ch| &ch[pos..pos + chunk_size])
            .collect();
        let resampled = resampler
            .process(&input_refs, None)
            .map_err(|e| ImportError::Resample(e.to_string()))?;
        push(resampled, &mut output);
        pos += chunk_size;
    }

    if pos < frames {
        let tail: Vec<&[f32]> = deinterleaved.iter().map(|ch| &ch[pos..]).collect();
        let resampled = resampler
            .process_partial(Some(&tail), None)
            .map_err(|e| ImportError::Resample(e.to_string()))?;
        push(resampled, &mut output);
    }

    // Flush frames still held back by the resampler's delay
    while output[0].len() < delay + expected {
        let resampled = resampler
            .process_partial(None::<&[&[f32]]>, None)
            .map_err(|e| ImportError::Resample(e.to_string()))?;
        if resampled.first().map_or(true, Vec::is_empty) {
            break;
        }
        push(resampled, &mut output);
    }

    let available = output[0].len().saturating_sub(delay).min(expected);
    let mut interleaved = Vec::with_capacity(available * channels_usize);
    for frame_idx in delay..delay + available {
        for channel in &output {
            interleaved.push(channel[frame_idx]);
        }
    }

    Ok(interleaved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Compression;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RawContent {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 255 / width) as u8, (y * 255 / height) as u8, 77, 255])
        });
        RawContent::Image(Arc::new(DynamicImage::ImageRgba8(img)))
    }

    #[test]
    fn test_texture_downscale_keeps_aspect() {
        let settings = ImportSettings::Texture(TextureSettings {
            max_size: 64,
            ..Default::default()
        });
        let imported = import(&gradient(256, 128), &settings).unwrap();
        let img = imported.content.image().unwrap();
        assert_eq!(img.image.dimensions(), (64, 32));
        assert_eq!((img.source_width, img.source_height), (256, 128));
    }

    #[test]
    fn test_texture_size_statistic() {
        let settings = ImportSettings::Texture(TextureSettings {
            max_size: 2048,
            compression: Compression::None,
            generate_mipmaps: false,
            ..Default::default()
        });
        let imported = import(&gradient(256, 256), &settings).unwrap();
        assert_eq!(imported.imported_size, 256 * 256 * 4);

        let settings = ImportSettings::Texture(TextureSettings::default());
        let imported = import(&gradient(256, 256), &settings).unwrap();
        assert_eq!(imported.imported_size, 256 * 256 / 2 * 4 / 3);
    }

    #[test]
    fn test_texture_quantization_reduces_levels() {
        let settings = ImportSettings::Texture(TextureSettings {
            compression: Compression::LowQuality,
            ..Default::default()
        });
        let imported = import(&gradient(256, 1), &settings).unwrap();
        let img = &imported.content.image().unwrap().image;
        let mut reds: Vec<u8> = img.pixels().map(|p| p[0]).collect();
        reds.dedup();
        assert!(reds.len() <= 16);
        assert!(img.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_kind_mismatch() {
        let settings = ImportSettings::Audio(AudioSettings::default());
        assert!(matches!(
            import(&gradient(4, 4), &settings),
            Err(ImportError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_audio_force_mono() {
        let clip = PcmClip::new(vec![0.5, -0.5, 1.0, 0.0], 1000, 2);
        let settings = ImportSettings::Audio(AudioSettings {
            force_mono: true,
            quality: 100,
            ..Default::default()
        });
        let imported = import(&RawContent::Pcm(Arc::new(clip)), &settings).unwrap();
        let out = imported.content.clip().unwrap();
        assert_eq!(out.channels, 1);
        assert_eq!(out.samples.as_slice(), &[0.0, 0.5]);
        assert_eq!(imported.imported_size, 2 * 16 / 8);
    }

    #[test]
    fn test_audio_resample_preserves_duration() {
        let clip = PcmClip::silence(1.0, 44100, 1);
        let settings = ImportSettings::Audio(AudioSettings {
            sample_rate: SampleRateSetting::Override(22050),
            ..Default::default()
        });
        let imported = import(&RawContent::Pcm(Arc::new(clip)), &settings).unwrap();
        let out = imported.content.clip().unwrap();
        assert_eq!(out.sample_rate, 22050);
        assert_eq!(out.frames(), 22050);
    }

    fn peak_index(samples: &[f32]) -> usize {
        samples
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn test_audio_resample_keeps_timing() {
        let mut samples = vec![0.0f32; 44100];
        samples[22050] = 1.0;
        let clip = PcmClip::new(samples, 44100, 1);
        let settings = ImportSettings::Audio(AudioSettings {
            sample_rate: SampleRateSetting::Override(22050),
            quality: 100,
            ..Default::default()
        });
        let imported = import(&RawContent::Pcm(Arc::new(clip)), &settings).unwrap();
        let out = imported.content.clip().unwrap();

        // The impulse sits at 0.5 s in both copies
        let peak = peak_index(&out.samples);
        assert!((peak as i64 - 11025).abs() <= 4, "peak at {peak}");
    }

    #[test]
    fn test_audio_resample_keeps_timing_per_channel() {
        let mut samples = vec![0.0f32; 2 * 48000];
        samples[2 * 12000 + 1] = 1.0;
        let clip = PcmClip::new(samples, 48000, 2);
        let settings = ImportSettings::Audio(AudioSettings {
            sample_rate: SampleRateSetting::Override(32000),
            quality: 100,
            ..Default::default()
        });
        let imported = import(&RawContent::Pcm(Arc::new(clip)), &settings).unwrap();
        let out = imported.content.clip().unwrap();
        assert_eq!(out.frames(), 32000);

        let right: Vec<f32> = out.samples.iter().skip(1).step_by(2).copied().collect();
        let peak = peak_index(&right);
        assert!((peak as i64 - 8000).abs() <= 4, "peak at {peak}");
    }

    #[test]
    fn test_audio_quantization_grid() {
        let clip = PcmClip::new(vec![0.3, -0.61], 1000, 1);
        let settings = ImportSettings::Audio(AudioSettings {
            quality: 1,
            ..Default::default()
        });
        let imported = import(&RawContent::Pcm(Arc::new(clip)), &settings).unwrap();
        // 4 bits: steps of 1/8
        assert_eq!(imported.content.clip().unwrap().samples.as_slice(), &[0.25, -0.625]);
    }

    #[test]
    fn test_out_of_range_rate_rejected() {
        let clip = PcmClip::silence(0.1, 44100, 1);
        let settings = ImportSettings::Audio(AudioSettings {
            sample_rate: SampleRateSetting::Override(4_000_000_000),
            ..Default::default()
        });
        assert!(matches!(
            import(&RawContent::Pcm(Arc::new(clip)), &settings),
            Err(ImportError::SampleRate(4_000_000_000))
        ));
    }

    #[test]
    fn test_empty_audio_rejected() {
        let clip = PcmClip::new(Vec::new(), 1000, 1);
        let settings = ImportSettings::Audio(AudioSettings::default());
        assert!(matches!(
            import(&RawContent::Pcm(Arc::new(clip)), &settings),
            Err(ImportError::EmptyContent)
        ));
    }
}
