//! Engine configuration persistence
//!
//! Simple key=value file under the user config dir.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const DEFAULT_WAVEFORM_WIDTH: u32 = 512;
const DEFAULT_WAVEFORM_HEIGHT: u32 = 128;
const DEFAULT_VIEWPORT_WIDTH: u32 = 1024;
const DEFAULT_VIEWPORT_HEIGHT: u32 = 512;

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Where scratch copies are written. Defaults to the system temp dir.
    pub scratch_dir: Option<PathBuf>,
    pub waveform_width: u32,
    pub waveform_height: u32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Last asset that was compared
    pub last_asset: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scratch_dir: None,
            waveform_width: DEFAULT_WAVEFORM_WIDTH,
            waveform_height: DEFAULT_WAVEFORM_HEIGHT,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            last_asset: None,
        }
    }
}

impl EngineConfig {
    /// Load config from the default location
    ///
    /// Returns default config if file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path()).unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    pub fn save(&self) -> io::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.serialize())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ace")
            .join("config.txt")
    }

    /// Effective scratch directory
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("ace-scratch"))
    }

    fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();

            match key.trim() {
                "scratch_dir" if !value.is_empty() => {
                    config.scratch_dir = Some(PathBuf::from(value))
                }
                "last_asset" if !value.is_empty() => config.last_asset = Some(PathBuf::from(value)),
                "waveform_width" => parse_dimension(value, &mut config.waveform_width),
                "waveform_height" => parse_dimension(value, &mut config.waveform_height),
                "viewport_width" => parse_dimension(value, &mut config.viewport_width),
                "viewport_height" => parse_dimension(value, &mut config.viewport_height),
                _ => {}
            }
        }

        config
    }

    fn serialize(&self) -> String {
        let mut lines = vec!["# ACE Configuration".to_string()];
        if let Some(ref dir) = self.scratch_dir {
            lines.push(format!("scratch_dir={}", dir.display()));
        }
        lines.push(format!("waveform_width={}", self.waveform_width));
        lines.push(format!("waveform_height={}", self.waveform_height));
        lines.push(format!("viewport_width={}", self.viewport_width));
        lines.push(format!("viewport_height={}", self.viewport_height));
        if let Some(ref asset) = self.last_asset {
            lines.push(format!("last_asset={}", asset.display()));
        }
        lines.join("\n")
    }
}

/// Zero and unparsable values keep the default
fn parse_dimension(value: &str, target: &mut u32) {
    if let Ok(v) = value.parse::<u32>() {
        if v > 0 {
            *target = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        assert_eq!(EngineConfig::parse(""), EngineConfig::default());
    }

    #[test]
    fn test_parse_values() {
        let config = EngineConfig::parse(
            "# c\nscratch_dir=/tmp/s\nwaveform_width=256\nviewport_height=0\nlast_asset=/a/b.png",
        );
        assert_eq!(config.scratch_dir, Some(PathBuf::from("/tmp/s")));
        assert_eq!(config.waveform_width, 256);
        assert_eq!(config.waveform_height, 128);
        assert_eq!(config.viewport_height, 512);
        assert_eq!(config.last_asset, Some(PathBuf::from("/a/b.png")));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = EngineConfig {
            scratch_dir: Some(PathBuf::from("/scratch")),
            waveform_width: 300,
            last_asset: Some(PathBuf::from("/x.wav")),
            ..Default::default()
        };
        assert_eq!(EngineConfig::parse(&config.serialize()), config);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir()
            .join(format!("ace-config-{}", std::process::id()))
            .join("config.txt");
        let config = EngineConfig {
            viewport_width: 640,
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(EngineConfig::load_from(&path).unwrap(), config);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
