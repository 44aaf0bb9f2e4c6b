//! Import settings - the independently editable configuration of a copy
//!
//! Settings serialize to the same `key=value` text used by the config
//! file, one pair per line. Parsing also accepts commas as separators so
//! settings can be passed on a command line.

use crate::asset::AssetKind;
use image::imageops::FilterType;

/// Block compression applied to an imported texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    None,
    HighQuality,
    #[default]
    Normal,
    LowQuality,
}

impl Compression {
    const ORDER: [Compression; 4] = [
        Compression::None,
        Compression::HighQuality,
        Compression::Normal,
        Compression::LowQuality,
    ];

    /// Bits kept per color channel after import
    pub fn bits_per_channel(self) -> u8 {
        match self {
            Compression::None => 8,
            Compression::HighQuality => 6,
            Compression::Normal => 5,
            Compression::LowQuality => 4,
        }
    }

    /// Storage cost of one imported pixel
    pub fn bits_per_pixel(self) -> u64 {
        match self {
            Compression::None => 32,
            Compression::HighQuality => 8,
            Compression::Normal | Compression::LowQuality => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::HighQuality => "high",
            Compression::Normal => "normal",
            Compression::LowQuality => "low",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|c| c.as_str() == value)
    }

    fn step(self, step: QualityStep) -> Self {
        let idx = Self::ORDER.iter().position(|&c| c == self).unwrap_or(2);
        let idx = match step {
            QualityStep::Lower => (idx + 1).min(Self::ORDER.len() - 1),
            QualityStep::Raise => idx.saturating_sub(1),
        };
        Self::ORDER[idx]
    }
}

/// Filter used when a texture is downscaled to its max size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeFilter {
    Point,
    #[default]
    Bilinear,
    Trilinear,
}

impl ResizeFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            ResizeFilter::Point => FilterType::Nearest,
            ResizeFilter::Bilinear => FilterType::Triangle,
            ResizeFilter::Trilinear => FilterType::CatmullRom,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResizeFilter::Point => "point",
            ResizeFilter::Bilinear => "bilinear",
            ResizeFilter::Trilinear => "trilinear",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "point" => Some(ResizeFilter::Point),
            "bilinear" => Some(ResizeFilter::Bilinear),
            "trilinear" => Some(ResizeFilter::Trilinear),
            _ => None,
        }
    }
}

/// Texture import settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSettings {
    /// Longest side after import, in pixels
    pub max_size: u32,
    pub compression: Compression,
    pub filter: ResizeFilter,
    pub generate_mipmaps: bool,
}

impl TextureSettings {
    pub const MIN_SIZE: u32 = 32;
    pub const MAX_SIZE: u32 = 8192;
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            max_size: 2048,
            compression: Compression::Normal,
            filter: ResizeFilter::Bilinear,
            generate_mipmaps: true,
        }
    }
}

/// Target sample rate for an imported clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleRateSetting {
    #[default]
    Preserve,
    Override(u32),
}

/// Audio import settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSettings {
    pub force_mono: bool,
    pub sample_rate: SampleRateSetting,
    /// Encoder quality (1 - 100)
    pub quality: u8,
}

impl AudioSettings {
    pub const MIN_SAMPLE_RATE: u32 = 8000;
    pub const MAX_SAMPLE_RATE: u32 = 192_000;

    /// Bit depth the clip is quantized to (4 at quality 0, 16 at quality 100)
    pub fn bits(&self) -> u32 {
        4 + self.quality.min(100) as u32 * 12 / 100
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            force_mono: false,
            sample_rate: SampleRateSetting::Preserve,
            quality: 70,
        }
    }
}

/// Direction for the primary quality knob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityStep {
    Lower,
    Raise,
}

/// Import configuration of a source asset or scratch copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportSettings {
    Texture(TextureSettings),
    Audio(AudioSettings),
}

impl ImportSettings {
    /// Default settings for a content kind; `None` for kinds that cannot be imported
    pub fn default_for(kind: AssetKind) -> Option<Self> {
        match kind {
            AssetKind::Texture => Some(ImportSettings::Texture(TextureSettings::default())),
            AssetKind::Audio => Some(ImportSettings::Audio(AudioSettings::default())),
            AssetKind::Unsupported | AssetKind::None => None,
        }
    }

    pub fn kind(&self) -> AssetKind {
        match self {
            ImportSettings::Texture(_) => AssetKind::Texture,
            ImportSettings::Audio(_) => AssetKind::Audio,
        }
    }

    /// Parse settings for a kind, starting from its defaults
    pub fn parse(kind: AssetKind, content: &str) -> Option<Self> {
        let mut settings = Self::default_for(kind)?;
        settings.apply_str(content);
        Some(settings)
    }

    /// Apply `key=value` pairs on top of the current values.
    ///
    /// Unknown keys and malformed values are ignored.
    pub fn apply_str(&mut self, content: &str) {
        for pair in content.split(['\n', ',']) {
            let pair = pair.trim();
            if pair.is_empty() || pair.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = pair.split_once('=') {
                self.apply_pair(key.trim(), value.trim());
            }
        }
    }

    fn apply_pair(&mut self, key: &str, value: &str) {
        match self {
            ImportSettings::Texture(t) => match key {
                "max_size" => {
                    if let Ok(size) = value.parse::<u32>() {
                        t.max_size = size.clamp(TextureSettings::MIN_SIZE, TextureSettings::MAX_SIZE);
                    }
                }
                "compression" => {
                    if let Some(c) = Compression::parse(value) {
                        t.compression = c;
                    }
                }
                "filter" => {
                    if let Some(f) = ResizeFilter::parse(value) {
                        t.filter = f;
                    }
                }
                "mipmaps" => {
                    if let Ok(b) = value.parse::<bool>() {
                        t.generate_mipmaps = b;
                    }
                }
                _ => {}
            },
            ImportSettings::Audio(a) => match key {
                "force_mono" => {
                    if let Ok(b) = value.parse::<bool>() {
                        a.force_mono = b;
                    }
                }
                "sample_rate" => {
                    if value == "preserve" {
                        a.sample_rate = SampleRateSetting::Preserve;
                    } else if let Ok(hz) = value.parse::<u32>() {
                        if hz > 0 {
                            let hz = hz.clamp(AudioSettings::MIN_SAMPLE_RATE, AudioSettings::MAX_SAMPLE_RATE);
                            a.sample_rate = SampleRateSetting::Override(hz);
                        }
                    }
                }
                "quality" => {
                    if let Ok(q) = value.parse::<u8>() {
                        a.quality = q.clamp(1, 100);
                    }
                }
                _ => {}
            },
        }
    }

    /// Serialize to `key=value` lines
    pub fn serialize(&self) -> String {
        let lines = match self {
            ImportSettings::Texture(t) => vec![
                format!("max_size={}", t.max_size),
                format!("compression={}", t.compression.as_str()),
                format!("filter={}", t.filter.as_str()),
                format!("mipmaps={}", t.generate_mipmaps),
            ],
            ImportSettings::Audio(a) => vec![
                format!("force_mono={}", a.force_mono),
                match a.sample_rate {
                    SampleRateSetting::Preserve => "sample_rate=preserve".to_string(),
                    SampleRateSetting::Override(hz) => format!("sample_rate={}", hz),
                },
                format!("quality={}", a.quality),
            ],
        };
        lines.join("\n")
    }

    /// Move the primary quality knob one step
    pub fn adjust(&mut self, step: QualityStep) {
        match self {
            ImportSettings::Texture(t) => {
                t.max_size = match step {
                    QualityStep::Lower => t.max_size / 2,
                    QualityStep::Raise => t.max_size.saturating_mul(2),
                }
                .clamp(TextureSettings::MIN_SIZE, TextureSettings::MAX_SIZE);
            }
            ImportSettings::Audio(a) => {
                a.quality = match step {
                    QualityStep::Lower => a.quality.saturating_sub(10),
                    QualityStep::Raise => a.quality.saturating_add(10),
                }
                .clamp(1, 100);
            }
        }
    }

    /// Cycle the secondary knob (texture compression, audio mono down-mix)
    pub fn cycle(&mut self, step: QualityStep) {
        match self {
            ImportSettings::Texture(t) => t.compression = t.compression.step(step),
            ImportSettings::Audio(a) => a.force_mono = step == QualityStep::Lower,
        }
    }

    /// Short human-readable summary for status lines
    pub fn summary(&self) -> String {
        match self {
            ImportSettings::Texture(t) => {
                format!("max {} {} {}", t.max_size, t.compression.as_str(), t.filter.as_str())
            }
            ImportSettings::Audio(a) => {
                let rate = match a.sample_rate {
                    SampleRateSetting::Preserve => "native".to_string(),
                    SampleRateSetting::Override(hz) => format!("{}Hz", hz),
                };
                let layout = if a.force_mono { "mono" } else { "orig" };
                format!("q{} {} {}", a.quality, rate, layout)
            }
        }
    }
}
