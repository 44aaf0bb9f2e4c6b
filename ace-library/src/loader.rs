//! Raw content loading from files

use crate::asset::AssetKind;
use crate::content::RawContent;
use ace_analysis::PcmClip;
use std::path::Path;
use std::sync::Arc;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;
use tracing::{trace, warn};

/// Errors that can occur while reading raw content
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("No audio track found in file")]
    NoAudioTrack,
    #[error("Unsupported format")]
    UnsupportedFormat,
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Load a file as raw content of the given kind
pub fn load_file(path: &Path, kind: AssetKind) -> Result<RawContent, LoadError> {
    match kind {
        AssetKind::Texture => Ok(RawContent::Image(Arc::new(image::open(path)?))),
        AssetKind::Audio => Ok(RawContent::Pcm(Arc::new(load_audio(path)?))),
        AssetKind::Unsupported | AssetKind::None => Err(LoadError::UnsupportedFormat),
    }
}

/// Decode an audio file to interleaved f32 at its native rate and layout
pub fn load_audio(path: &Path) -> Result<PcmClip, LoadError> {
    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let mut format = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| LoadError::Decode(e.to_string()))?
        .format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(LoadError::NoAudioTrack)?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(|e| LoadError::Decode(e.to_string()))?;

    // Layout from the container; the first decoded packet is authoritative
    let mut sample_rate = params.sample_rate;
    let mut channels = params.channels.map(|c| c.count() as u16);
    let mut buffer: Option<SampleBuffer<f32>> = None;
    let mut samples: Vec<f32> = Vec::new();
    let mut skipped = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(LoadError::Decode(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(reason)) => {
                skipped += 1;
                trace!(%reason, "skipping corrupt packet");
                continue;
            }
            Err(e) => return Err(LoadError::Decode(e.to_string())),
        };

        let spec = *decoded.spec();
        sample_rate.get_or_insert(spec.rate);
        channels.get_or_insert(spec.channels.count() as u16);

        let needed = decoded.capacity() * spec.channels.count();
        let buf = match buffer.take() {
            Some(buf) if buf.capacity() >= needed => buffer.insert(buf),
            _ => buffer.insert(SampleBuffer::new(decoded.capacity() as u64, spec)),
        };
        buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buf.samples());
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "audio packets could not be decoded");
    }
    match (sample_rate, channels) {
        (Some(rate), Some(ch)) if !samples.is_empty() => Ok(PcmClip::new(samples, rate, ch)),
        _ => Err(LoadError::Decode("no samples decoded".into())),
    }
}
