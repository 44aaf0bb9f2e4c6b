//! Sample analysis for ACE
//!
//! Shared comparison primitives (copy labels, decoded PCM clips) and the
//! min/max waveform envelope rasterizer.

mod label;
mod pcm;
mod waveform;

pub use label::CopyLabel;
pub use pcm::PcmClip;
pub use waveform::{envelope, rasterize, EnvelopeColumn, WaveformStyle};
