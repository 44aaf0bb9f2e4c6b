//! Source asset model

use crate::settings::ImportSettings;
use std::path::{Path, PathBuf};

/// Content kind of a source asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetKind {
    Texture,
    Audio,
    /// Exists but cannot be compared
    Unsupported,
    /// Missing or nothing selected
    #[default]
    None,
}

impl AssetKind {
    const TEXTURE_EXTENSIONS: [&'static str; 8] =
        ["png", "jpg", "jpeg", "bmp", "tga", "tif", "tiff", "gif"];
    const AUDIO_EXTENSIONS: [&'static str; 6] = ["wav", "mp3", "flac", "ogg", "aac", "m4a"];

    /// Classify a path by its file extension
    pub fn from_extension(path: &Path) -> Self {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_ascii_lowercase(),
            None => return AssetKind::Unsupported,
        };
        if Self::TEXTURE_EXTENSIONS.contains(&ext.as_str()) {
            AssetKind::Texture
        } else if Self::AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            AssetKind::Audio
        } else {
            AssetKind::Unsupported
        }
    }
}

/// The user-selected asset. Replaced wholesale on re-selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceAsset {
    pub path: PathBuf,
    pub kind: AssetKind,
    /// Raw byte size on disk
    pub size: u64,
    /// Import settings stored with the asset, if any
    pub settings: Option<ImportSettings>,
}

impl SourceAsset {
    /// Settings the scratch copies start from: the asset's own, else the kind's defaults
    pub fn import_settings(&self) -> Option<ImportSettings> {
        self.settings
            .filter(|s| s.kind() == self.kind)
            .or_else(|| ImportSettings::default_for(self.kind))
    }

    /// File name for display
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("<unnamed>")
            .to_string()
    }
}
