//! Asset database collaborators
//!
//! The host owns the real asset database. The engine only needs to
//! describe a source, duplicate it into a labeled scratch copy, delete
//! copies, and read raw content back.

use crate::asset::{AssetKind, SourceAsset};
use crate::content::RawContent;
use crate::loader::{self, LoadError};
use crate::settings::ImportSettings;
use ace_analysis::CopyLabel;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors reported by an asset database
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Asset not found: {0}")]
    NotFound(PathBuf),
    #[error("Cannot duplicate {path}: {reason}")]
    Duplicate { path: PathBuf, reason: String },
}

/// Asset storage provided by the host
pub trait AssetDatabase: Send {
    /// Describe an asset. Missing assets report `AssetKind::None`.
    fn describe(&self, path: &Path) -> Result<SourceAsset, StoreError>;

    /// Duplicate a source into a scratch copy, returning the copy's path
    fn duplicate(&mut self, source: &SourceAsset, label: CopyLabel) -> Result<PathBuf, StoreError>;

    /// Delete a scratch copy. Deleting a missing copy is not an error.
    fn delete(&mut self, path: &Path) -> Result<(), StoreError>;

    /// Byte size of a stored asset
    fn file_size(&self, path: &Path) -> Result<u64, StoreError>;

    /// True while the host is importing in the background and copies must not be touched
    fn is_importing(&self) -> bool {
        false
    }
}

/// Raw content access, callable from any thread
pub trait ContentSource: Send + Sync {
    fn load(&self, path: &Path, kind: AssetKind) -> Result<RawContent, LoadError>;
}

/// Path of the settings sidecar stored next to an asset (`<asset>.import`)
pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".import");
    PathBuf::from(name)
}

/// Filesystem-backed asset database with a private scratch directory
#[derive(Debug, Clone)]
pub struct FsAssetDatabase {
    scratch_dir: PathBuf,
    importing: Arc<AtomicBool>,
}

impl FsAssetDatabase {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            importing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Flag the host raises while a background import runs
    pub fn importing_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.importing)
    }

    fn scratch_path(&self, source: &Path, label: CopyLabel) -> PathBuf {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("asset");
        let name = match source.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}.{}", stem, label, ext),
            None => format!("{}.{}", stem, label),
        };
        self.scratch_dir.join(name)
    }
}

impl AssetDatabase for FsAssetDatabase {
    fn describe(&self, path: &Path) -> Result<SourceAsset, StoreError> {
        if !path.is_file() {
            return Ok(SourceAsset {
                path: path.to_path_buf(),
                kind: AssetKind::None,
                size: 0,
                settings: None,
            });
        }

        let kind = AssetKind::from_extension(path);
        let size = fs::metadata(path)?.len();
        let settings = fs::read_to_string(sidecar_path(path))
            .ok()
            .and_then(|content| ImportSettings::parse(kind, &content));

        Ok(SourceAsset {
            path: path.to_path_buf(),
            kind,
            size,
            settings,
        })
    }

    fn duplicate(&mut self, source: &SourceAsset, label: CopyLabel) -> Result<PathBuf, StoreError> {
        let dest = self.scratch_path(&source.path, label);
        fs::create_dir_all(&self.scratch_dir)
            .and_then(|_| fs::copy(&source.path, &dest))
            .map_err(|e| StoreError::Duplicate {
                path: source.path.clone(),
                reason: e.to_string(),
            })?;
        Ok(dest)
    }

    fn delete(&mut self, path: &Path) -> Result<(), StoreError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn file_size(&self, path: &Path) -> Result<u64, StoreError> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn is_importing(&self) -> bool {
        self.importing.load(Ordering::Relaxed)
    }
}

impl ContentSource for FsAssetDatabase {
    fn load(&self, path: &Path, kind: AssetKind) -> Result<RawContent, LoadError> {
        loader::load_file(path, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ace-store-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_describe_missing_is_none() {
        let db = FsAssetDatabase::new(temp_dir("missing"));
        let asset = db.describe(Path::new("/no/such/file.png")).unwrap();
        assert_eq!(asset.kind, AssetKind::None);
    }

    #[test]
    fn test_describe_reads_sidecar() {
        let dir = temp_dir("sidecar");
        let source = dir.join("brick.png");
        fs::write(&source, b"not really a png").unwrap();
        fs::write(sidecar_path(&source), "max_size=512\ncompression=high").unwrap();

        let db = FsAssetDatabase::new(dir.join("scratch"));
        let asset = db.describe(&source).unwrap();
        assert_eq!(asset.kind, AssetKind::Texture);
        assert_eq!(asset.size, 16);
        assert!(matches!(
            asset.settings,
            Some(ImportSettings::Texture(t)) if t.max_size == 512
        ));
    }

    #[test]
    fn test_duplicate_and_delete() {
        let dir = temp_dir("dup");
        let source = dir.join("hit.wav");
        fs::write(&source, b"RIFF").unwrap();

        let mut db = FsAssetDatabase::new(dir.join("scratch"));
        let asset = db.describe(&source).unwrap();
        let copy = db.duplicate(&asset, CopyLabel::B).unwrap();
        assert_eq!(copy.file_name().unwrap(), "hit.B.wav");
        assert_eq!(db.file_size(&copy).unwrap(), 4);

        db.delete(&copy).unwrap();
        assert!(!copy.exists());
        // Second delete is a no-op
        db.delete(&copy).unwrap();
        assert!(matches!(db.file_size(&copy), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_duplicate_missing_source_fails() {
        let dir = temp_dir("dupfail");
        let mut db = FsAssetDatabase::new(dir.join("scratch"));
        let asset = SourceAsset {
            path: dir.join("gone.png"),
            kind: AssetKind::Texture,
            size: 0,
            settings: None,
        };
        assert!(matches!(
            db.duplicate(&asset, CopyLabel::A),
            Err(StoreError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_importing_flag() {
        let db = FsAssetDatabase::new(temp_dir("flag"));
        assert!(!db.is_importing());
        db.importing_flag().store(true, Ordering::Relaxed);
        assert!(db.is_importing());
    }
}
