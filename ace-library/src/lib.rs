//! Asset library for ACE - import settings, decoding, and scratch copies

mod asset;
mod config;
mod content;
mod import;
mod loader;
mod memory;
mod scratch;
mod settings;
mod store;
mod worker;

pub use asset::{AssetKind, SourceAsset};
pub use config::EngineConfig;
pub use content::{DecodedContent, DecodedImage, ImportedContent, RawContent};
pub use import::{import, ImportError};
pub use loader::{load_audio, load_file, LoadError};
pub use memory::MemoryAssetDatabase;
pub use scratch::{
    Accepted, CopyError, DecodeError, DecodeOutcome, DecodeRequest, DecodeTicket, PreviewState,
    ScratchCopy, ScratchCopyManager, WaveformSpec,
};
pub use settings::{
    AudioSettings, Compression, ImportSettings, QualityStep, ResizeFilter, SampleRateSetting,
    TextureSettings,
};
pub use store::{sidecar_path, AssetDatabase, ContentSource, FsAssetDatabase, StoreError};
pub use worker::ImportWorker;
