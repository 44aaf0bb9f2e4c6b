//! Raw and decoded asset content

use crate::asset::AssetKind;
use ace_analysis::PcmClip;
use image::{DynamicImage, RgbaImage};
use std::sync::Arc;

/// Content as read from the asset database, before import settings apply
#[derive(Debug, Clone)]
pub enum RawContent {
    Image(Arc<DynamicImage>),
    Pcm(Arc<PcmClip>),
}

impl RawContent {
    pub fn kind(&self) -> AssetKind {
        match self {
            RawContent::Image(_) => AssetKind::Texture,
            RawContent::Pcm(_) => AssetKind::Audio,
        }
    }
}

/// An imported texture ready for preview
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: Arc<RgbaImage>,
    /// Dimensions of the source before downscaling
    pub source_width: u32,
    pub source_height: u32,
}

/// Content of a scratch copy after its import settings were applied
#[derive(Debug, Clone)]
pub enum DecodedContent {
    Texture(DecodedImage),
    Audio(Arc<PcmClip>),
}

impl DecodedContent {
    pub fn kind(&self) -> AssetKind {
        match self {
            DecodedContent::Texture(_) => AssetKind::Texture,
            DecodedContent::Audio(_) => AssetKind::Audio,
        }
    }

    pub fn image(&self) -> Option<&DecodedImage> {
        match self {
            DecodedContent::Texture(img) => Some(img),
            DecodedContent::Audio(_) => None,
        }
    }

    pub fn clip(&self) -> Option<&Arc<PcmClip>> {
        match self {
            DecodedContent::Audio(clip) => Some(clip),
            DecodedContent::Texture(_) => None,
        }
    }
}

/// Import result: decoded content plus its storage cost
#[derive(Debug, Clone)]
pub struct ImportedContent {
    pub content: DecodedContent,
    /// Estimated imported size in bytes
    pub imported_size: u64,
}
