//! Scratch copy manager - two independently configured duplicates of a source
//!
//! Copies are created as a pair and destroyed as a pair. Decoding is not
//! done here: every configuration change produces a `DecodeRequest` the
//! host runs wherever it likes, and the outcome is handed back through
//! `accept`. Outcomes are matched against an epoch (bumped on every
//! initialize/dispose) and a per-copy generation, so late results for a
//! disposed or re-edited copy are rejected.

use crate::asset::{AssetKind, SourceAsset};
use crate::content::{DecodedContent, ImportedContent};
use crate::import::{self, ImportError};
use crate::loader::LoadError;
use crate::settings::ImportSettings;
use crate::store::{AssetDatabase, ContentSource, StoreError};
use ace_analysis::{rasterize, CopyLabel, WaveformStyle};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from creating or editing scratch copies
#[derive(Error, Debug)]
pub enum CopyError {
    #[error("{path} is not a comparable asset ({kind:?})")]
    Unsupported { path: PathBuf, kind: AssetKind },
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("No scratch copies exist")]
    NoCopies,
    #[error("{settings:?} settings do not apply to a {content:?} copy")]
    KindMismatch {
        content: AssetKind,
        settings: AssetKind,
    },
}

/// Errors from decoding a copy
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Import(#[from] ImportError),
}

/// Identifies which copy state a decode belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeTicket {
    pub epoch: u64,
    pub label: CopyLabel,
    pub generation: u64,
}

/// Work item for the host: load a copy and apply its settings
#[derive(Debug, Clone)]
pub struct DecodeRequest {
    pub ticket: DecodeTicket,
    pub path: PathBuf,
    pub kind: AssetKind,
    pub settings: ImportSettings,
}

impl DecodeRequest {
    /// Load and import the copy. Blocking; run it off the interactive thread for large assets.
    pub fn run(&self, source: &dyn ContentSource) -> DecodeOutcome {
        let result = source
            .load(&self.path, self.kind)
            .map_err(DecodeError::from)
            .and_then(|raw| import::import(&raw, &self.settings).map_err(DecodeError::from));
        DecodeOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

/// Completed decode delivered back to the manager
#[derive(Debug)]
pub struct DecodeOutcome {
    pub ticket: DecodeTicket,
    pub result: Result<ImportedContent, DecodeError>,
}

/// Preview availability of one copy
#[derive(Debug, Clone)]
pub enum PreviewState {
    /// Never decoded yet
    Pending,
    Ready(DecodedContent),
    /// Last decode failed; the reason is shown in place of the preview
    Unavailable(String),
}

/// Size and colors of generated waveform envelopes
#[derive(Debug, Clone, Copy)]
pub struct WaveformSpec {
    pub width: u32,
    pub height: u32,
    pub style: WaveformStyle,
}

impl Default for WaveformSpec {
    fn default() -> Self {
        Self {
            width: 512,
            height: 128,
            style: WaveformStyle::default(),
        }
    }
}

/// One labeled scratch copy and its derived artifacts
#[derive(Debug, Clone)]
pub struct ScratchCopy {
    label: CopyLabel,
    path: PathBuf,
    kind: AssetKind,
    settings: ImportSettings,
    preview: PreviewState,
    imported_size: Option<u64>,
    waveform: Option<Arc<RgbaImage>>,
    generation: u64,
    in_flight: bool,
    /// Latest edit received while a decode was in flight
    queued: Option<ImportSettings>,
}

impl ScratchCopy {
    fn new(label: CopyLabel, path: PathBuf, kind: AssetKind, settings: ImportSettings) -> Self {
        Self {
            label,
            path,
            kind,
            settings,
            preview: PreviewState::Pending,
            imported_size: None,
            waveform: None,
            generation: 0,
            in_flight: false,
            queued: None,
        }
    }

    pub fn label(&self) -> CopyLabel {
        self.label
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Settings the copy will have once queued edits are applied
    pub fn latest_settings(&self) -> &ImportSettings {
        self.queued.as_ref().unwrap_or(&self.settings)
    }

    pub fn preview(&self) -> &PreviewState {
        &self.preview
    }

    pub fn content(&self) -> Option<&DecodedContent> {
        match &self.preview {
            PreviewState::Ready(content) => Some(content),
            _ => None,
        }
    }

    pub fn imported_size(&self) -> Option<u64> {
        self.imported_size
    }

    pub fn waveform(&self) -> Option<&Arc<RgbaImage>> {
        self.waveform.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn issue(&mut self, epoch: u64) -> DecodeRequest {
        self.generation += 1;
        self.in_flight = true;
        DecodeRequest {
            ticket: DecodeTicket {
                epoch,
                label: self.label,
                generation: self.generation,
            },
            path: self.path.clone(),
            kind: self.kind,
            settings: self.settings,
        }
    }
}

/// Result of accepting a decode outcome
#[derive(Debug)]
pub struct Accepted {
    pub label: CopyLabel,
    /// Decode failure reason, if the copy is now unavailable
    pub failure: Option<String>,
    /// Request for an edit that was queued behind this decode
    pub followup: Option<DecodeRequest>,
}

/// Owns the pair of scratch copies for the current source
#[derive(Debug, Default)]
pub struct ScratchCopyManager {
    source: Option<SourceAsset>,
    copies: Option<[ScratchCopy; 2]>,
    epoch: u64,
    waveform: WaveformSpec,
}

impl ScratchCopyManager {
    pub fn new(waveform: WaveformSpec) -> Self {
        Self {
            waveform,
            ..Default::default()
        }
    }

    /// Duplicate `source` into copies A and B with identical settings.
    ///
    /// Prior copies are disposed first. Either both copies exist afterwards
    /// or neither does. Returns the initial decode requests.
    pub fn initialize(
        &mut self,
        db: &mut dyn AssetDatabase,
        source: &SourceAsset,
    ) -> Result<[DecodeRequest; 2], CopyError> {
        self.dispose(db);

        let settings = source
            .import_settings()
            .ok_or_else(|| CopyError::Unsupported {
                path: source.path.clone(),
                kind: source.kind,
            })?;

        let path_a = db.duplicate(source, CopyLabel::A)?;
        let path_b = match db.duplicate(source, CopyLabel::B) {
            Ok(path) => path,
            Err(e) => {
                if let Err(cleanup) = db.delete(&path_a) {
                    warn!(path = %path_a.display(), "failed to remove partial copy: {}", cleanup);
                }
                return Err(e.into());
            }
        };

        let mut copies = [
            ScratchCopy::new(CopyLabel::A, path_a, source.kind, settings),
            ScratchCopy::new(CopyLabel::B, path_b, source.kind, settings),
        ];
        let epoch = self.epoch;
        let requests = [copies[0].issue(epoch), copies[1].issue(epoch)];

        debug!(source = %source.path.display(), epoch, "scratch copies created");
        self.copies = Some(copies);
        self.source = Some(source.clone());
        Ok(requests)
    }

    /// Apply new settings to one copy.
    ///
    /// Returns a decode request, or `None` when the edit was queued behind
    /// a decode already in flight for that copy.
    pub fn update_configuration(
        &mut self,
        label: CopyLabel,
        settings: ImportSettings,
    ) -> Result<Option<DecodeRequest>, CopyError> {
        let epoch = self.epoch;
        let copy = self
            .copies
            .as_mut()
            .map(|c| &mut c[label.index()])
            .ok_or(CopyError::NoCopies)?;

        if settings.kind() != copy.kind {
            return Err(CopyError::KindMismatch {
                content: copy.kind,
                settings: settings.kind(),
            });
        }

        if copy.in_flight {
            debug!(%label, "edit queued behind in-flight decode");
            copy.queued = Some(settings);
            return Ok(None);
        }

        copy.settings = settings;
        Ok(Some(copy.issue(epoch)))
    }

    /// Take a decode outcome. Stale outcomes are returned as `Err` untouched.
    pub fn accept(&mut self, outcome: DecodeOutcome) -> Result<Accepted, DecodeOutcome> {
        let epoch = self.epoch;
        let shape = self.waveform;
        let ticket = outcome.ticket;

        let copy = match self.copies.as_mut() {
            Some(copies) if ticket.epoch == epoch => &mut copies[ticket.label.index()],
            _ => return Err(outcome),
        };
        if ticket.generation != copy.generation || !copy.in_flight {
            return Err(outcome);
        }
        copy.in_flight = false;

        let failure = match outcome.result {
            Ok(imported) => {
                // Replace the envelope wholesale; never repaint the old bitmap
                copy.waveform = imported.content.clip().and_then(|clip| {
                    rasterize(&clip.samples, clip.channels, shape.width, shape.height, &shape.style)
                        .map(Arc::new)
                });
                copy.imported_size = Some(imported.imported_size);
                copy.preview = PreviewState::Ready(imported.content);
                None
            }
            Err(e) => {
                let reason = e.to_string();
                copy.preview = PreviewState::Unavailable(reason.clone());
                copy.imported_size = None;
                copy.waveform = None;
                Some(reason)
            }
        };

        let followup = copy.queued.take().map(|settings| {
            copy.settings = settings;
            copy.issue(epoch)
        });

        Ok(Accepted {
            label: ticket.label,
            failure,
            followup,
        })
    }

    /// Release both copies and everything derived from them. Safe to repeat.
    pub fn dispose(&mut self, db: &mut dyn AssetDatabase) {
        self.epoch += 1;
        self.source = None;
        let Some(copies) = self.copies.take() else {
            return;
        };
        for copy in &copies {
            if let Err(e) = db.delete(&copy.path) {
                warn!(path = %copy.path.display(), "failed to delete scratch copy: {}", e);
            }
        }
        debug!(epoch = self.epoch, "scratch copies disposed");
    }

    pub fn source(&self) -> Option<&SourceAsset> {
        self.source.as_ref()
    }

    pub fn copy(&self, label: CopyLabel) -> Option<&ScratchCopy> {
        self.copies.as_ref().map(|c| &c[label.index()])
    }

    pub fn is_initialized(&self) -> bool {
        self.copies.is_some()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}
