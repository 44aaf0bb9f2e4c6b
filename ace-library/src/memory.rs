//! In-memory asset database for embedding hosts and tests

use crate::asset::{AssetKind, SourceAsset};
use crate::content::RawContent;
use crate::loader::LoadError;
use crate::store::{AssetDatabase, ContentSource, StoreError};
use ace_analysis::{CopyLabel, PcmClip};
use image::DynamicImage;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Entry {
    kind: AssetKind,
    size: u64,
    content: Option<RawContent>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<PathBuf, Entry>,
    fail_duplicates: bool,
    importing: bool,
}

/// Asset database held in memory. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetDatabase {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryAssetDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, path: impl Into<PathBuf>, entry: Entry) {
        self.inner.write().entries.insert(path.into(), entry);
    }

    /// Store an image asset
    pub fn insert_image(&self, path: impl Into<PathBuf>, image: DynamicImage) {
        let size = image.width() as u64 * image.height() as u64 * 4;
        self.insert(
            path,
            Entry {
                kind: AssetKind::Texture,
                size,
                content: Some(RawContent::Image(Arc::new(image))),
            },
        );
    }

    /// Store an audio asset
    pub fn insert_clip(&self, path: impl Into<PathBuf>, clip: PcmClip) {
        let size = clip.samples.len() as u64 * 4;
        self.insert(
            path,
            Entry {
                kind: AssetKind::Audio,
                size,
                content: Some(RawContent::Pcm(Arc::new(clip))),
            },
        );
    }

    /// Store an asset that exists but cannot be compared
    pub fn insert_unsupported(&self, path: impl Into<PathBuf>, size: u64) {
        self.insert(
            path,
            Entry {
                kind: AssetKind::Unsupported,
                size,
                content: None,
            },
        );
    }

    /// Make every following duplication fail
    pub fn set_fail_duplicates(&self, fail: bool) {
        self.inner.write().fail_duplicates = fail;
    }

    /// Simulate a background import in progress
    pub fn set_importing(&self, importing: bool) {
        self.inner.write().importing = importing;
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.inner.read().entries.contains_key(path)
    }

    /// Number of stored assets, scratch copies included
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }
}

impl AssetDatabase for MemoryAssetDatabase {
    fn describe(&self, path: &Path) -> Result<SourceAsset, StoreError> {
        let inner = self.inner.read();
        Ok(match inner.entries.get(path) {
            Some(entry) => SourceAsset {
                path: path.to_path_buf(),
                kind: entry.kind,
                size: entry.size,
                settings: None,
            },
            None => SourceAsset {
                path: path.to_path_buf(),
                kind: AssetKind::None,
                size: 0,
                settings: None,
            },
        })
    }

    fn duplicate(&mut self, source: &SourceAsset, label: CopyLabel) -> Result<PathBuf, StoreError> {
        let mut inner = self.inner.write();
        if inner.fail_duplicates {
            return Err(StoreError::Duplicate {
                path: source.path.clone(),
                reason: "duplication disabled".into(),
            });
        }
        let entry = inner
            .entries
            .get(&source.path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(source.path.clone()))?;

        let mut name = source.path.as_os_str().to_owned();
        name.push(format!("#{}", label));
        let dest = PathBuf::from(name);
        inner.entries.insert(dest.clone(), entry);
        Ok(dest)
    }

    fn delete(&mut self, path: &Path) -> Result<(), StoreError> {
        self.inner.write().entries.remove(path);
        Ok(())
    }

    fn file_size(&self, path: &Path) -> Result<u64, StoreError> {
        self.inner
            .read()
            .entries
            .get(path)
            .map(|e| e.size)
            .ok_or_else(|| StoreError::NotFound(path.to_path_buf()))
    }

    fn is_importing(&self) -> bool {
        self.inner.read().importing
    }
}

impl ContentSource for MemoryAssetDatabase {
    fn load(&self, path: &Path, kind: AssetKind) -> Result<RawContent, LoadError> {
        let inner = self.inner.read();
        let entry = inner.entries.get(path).ok_or_else(|| {
            LoadError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not in memory database", path.display()),
            ))
        })?;
        match &entry.content {
            Some(content) if content.kind() == kind => Ok(content.clone()),
            _ => Err(LoadError::UnsupportedFormat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn test_duplicate_shares_content() {
        let mut db = MemoryAssetDatabase::new();
        db.insert_image("tex.png", DynamicImage::ImageRgba8(RgbaImage::new(4, 4)));
        let source = db.describe(Path::new("tex.png")).unwrap();
        assert_eq!(source.size, 64);

        let copy = db.duplicate(&source, CopyLabel::A).unwrap();
        assert_eq!(copy, PathBuf::from("tex.png#A"));
        assert!(matches!(db.load(&copy, AssetKind::Texture), Ok(RawContent::Image(_))));
        assert_eq!(db.len(), 2);

        db.delete(&copy).unwrap();
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn test_failure_injection() {
        let mut db = MemoryAssetDatabase::new();
        db.insert_clip("a.wav", PcmClip::silence(0.1, 1000, 1));
        db.set_fail_duplicates(true);
        let source = db.describe(Path::new("a.wav")).unwrap();
        assert!(db.duplicate(&source, CopyLabel::B).is_err());
    }

    #[test]
    fn test_load_kind_mismatch() {
        let db = MemoryAssetDatabase::new();
        db.insert_clip("a.wav", PcmClip::silence(0.1, 1000, 1));
        assert!(matches!(
            db.load(Path::new("a.wav"), AssetKind::Texture),
            Err(LoadError::UnsupportedFormat)
        ));
    }
}
