//! Comparison session - top-level state machine
//!
//! Owns the source asset, the two scratch copies, split-view state, and
//! the A/B switcher. Decoding is delegated to the host through
//! `take_decode_requests` / `complete_decode`.

use crate::config::{ClockSource, SessionConfig};
use crate::error::CompareError;
use crate::stats::CopyStats;
use ace_analysis::CopyLabel;
use ace_audio::{AbSwitcher, PlaybackState, SharedSwitcher, TransportEvent};
use ace_library::{
    AssetDatabase, AssetKind, CopyError, DecodeOutcome, DecodeRequest, ImportSettings,
    PreviewState, QualityStep, ScratchCopyManager, SourceAsset,
};
use ace_preview::{
    audio_preview, compose, AudioPreview, DrawCommand, InputEvent, Rect, SideSlot,
    SplitViewState, TextureId,
};
use image::RgbaImage;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Empty,
    Classifying,
    TextureReady,
    AudioReady,
    Unsupported,
}

impl SessionState {
    pub fn display_name(&self) -> &'static str {
        match self {
            SessionState::Empty => "EMPTY",
            SessionState::Classifying => "CLASSIFYING",
            SessionState::TextureReady => "TEXTURE",
            SessionState::AudioReady => "AUDIO",
            SessionState::Unsupported => "UNSUPPORTED",
        }
    }
}

/// Result of a selection request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Applied immediately; the session is now in this state
    Applied(SessionState),
    /// The host is importing; applied on a later tick
    Deferred,
}

/// Selection changes waiting for the host to finish importing
#[derive(Debug, Clone)]
enum PendingAction {
    Select(PathBuf),
    Clear,
}

pub struct ComparisonSession {
    db: Box<dyn AssetDatabase>,
    config: SessionConfig,
    state: SessionState,
    manager: ScratchCopyManager,
    split: SplitViewState,
    switcher: SharedSwitcher,
    pending_actions: VecDeque<PendingAction>,
    requests: Vec<DecodeRequest>,
    notice: Option<String>,
}

impl ComparisonSession {
    pub fn new(db: Box<dyn AssetDatabase>, config: SessionConfig) -> Self {
        Self {
            db,
            config,
            state: SessionState::Empty,
            manager: ScratchCopyManager::new(config.waveform),
            split: SplitViewState::default(),
            switcher: AbSwitcher::new().into_shared(),
            pending_actions: VecDeque::new(),
            requests: Vec::new(),
            notice: None,
        }
    }

    // --- Selection ---

    /// Select a new source asset, tearing down any current comparison first.
    ///
    /// Deferred while the host database is importing.
    pub fn select_source(&mut self, path: impl Into<PathBuf>) -> Result<Selection, CompareError> {
        let path = path.into();
        if self.must_defer() {
            debug!(path = %path.display(), "selection deferred until import completes");
            self.pending_actions.push_back(PendingAction::Select(path));
            return Ok(Selection::Deferred);
        }
        self.apply_select(&path).map(Selection::Applied)
    }

    /// Drop the current comparison and return to `Empty`
    pub fn clear_selection(&mut self) -> Selection {
        if self.must_defer() {
            self.pending_actions.push_back(PendingAction::Clear);
            return Selection::Deferred;
        }
        self.apply_clear();
        Selection::Applied(self.state)
    }

    fn must_defer(&self) -> bool {
        self.db.is_importing() || !self.pending_actions.is_empty()
    }

    fn apply_select(&mut self, path: &Path) -> Result<SessionState, CompareError> {
        self.teardown();
        self.notice = None;
        self.state = SessionState::Classifying;
        info!(path = %path.display(), "classifying source asset");

        let source = match self.db.describe(path) {
            Ok(source) => source,
            Err(e) => return Err(self.reject(path, e.to_string())),
        };

        let next = match source.kind {
            AssetKind::Texture => SessionState::TextureReady,
            AssetKind::Audio => SessionState::AudioReady,
            AssetKind::Unsupported => {
                return Err(self.reject(path, "not a texture or audio clip".to_string()))
            }
            AssetKind::None => return Err(self.reject(path, "asset not found".to_string())),
        };

        match self.manager.initialize(self.db.as_mut(), &source) {
            Ok(requests) => self.requests.extend(requests),
            Err(CopyError::Store(e)) => {
                warn!(path = %path.display(), "scratch copy failed: {}", e);
                self.state = SessionState::Empty;
                self.notice = Some(format!("Could not duplicate {}: {}", source.display_name(), e));
                return Err(CompareError::CopyFailure(e));
            }
            Err(e) => return Err(self.reject(path, e.to_string())),
        }

        match next {
            SessionState::TextureReady => self.split.reset(),
            _ => self.switcher.lock().reset(),
        }
        self.state = next;
        info!(
            source = %source.display_name(),
            state = next.display_name(),
            "comparison ready"
        );
        Ok(next)
    }

    fn reject(&mut self, path: &Path, reason: String) -> CompareError {
        warn!(path = %path.display(), "unsupported source: {}", reason);
        self.state = SessionState::Unsupported;
        self.notice = Some(format!("{}: {}", path.display(), reason));
        CompareError::InvalidSource {
            path: path.to_path_buf(),
            reason,
        }
    }

    fn apply_clear(&mut self) {
        self.teardown();
        self.notice = None;
        if self.state != SessionState::Empty {
            info!("selection cleared");
        }
        self.state = SessionState::Empty;
    }

    /// Dispose copies and everything derived from them
    fn teardown(&mut self) {
        self.requests.clear();
        self.manager.dispose(self.db.as_mut());
        self.switcher.lock().reset();
    }

    /// Run selection changes deferred by an in-progress import
    fn drain_pending(&mut self) {
        while !self.db.is_importing() {
            let Some(action) = self.pending_actions.pop_front() else {
                break;
            };
            match action {
                PendingAction::Select(path) => {
                    // Failures are already surfaced through state and notice
                    if let Err(e) = self.apply_select(&path) {
                        debug!("deferred selection failed: {}", e);
                    }
                }
                PendingAction::Clear => self.apply_clear(),
            }
        }
    }

    // --- Configuration and decoding ---

    /// Apply edited import settings to one copy
    pub fn on_configuration_changed(
        &mut self,
        label: CopyLabel,
        settings: ImportSettings,
    ) -> Result<(), CompareError> {
        match self.manager.update_configuration(label, settings) {
            Ok(Some(request)) => {
                self.requests.push(request);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(CopyError::KindMismatch { content, settings }) => {
                let reason = format!("{:?} settings cannot apply to {:?} content", settings, content);
                warn!(%label, "{}", reason);
                Err(CompareError::DecodeFailure { label, reason })
            }
            Err(e) => Err(CompareError::InvalidSource {
                path: self.source().map(|s| s.path.clone()).unwrap_or_default(),
                reason: e.to_string(),
            }),
        }
    }

    /// Lower or raise the primary quality knob of one copy
    pub fn adjust_quality(&mut self, label: CopyLabel, step: QualityStep) -> Result<(), CompareError> {
        self.edit(label, |s| s.adjust(step))
    }

    /// Step the secondary knob of one copy
    pub fn cycle_setting(&mut self, label: CopyLabel, step: QualityStep) -> Result<(), CompareError> {
        self.edit(label, |s| s.cycle(step))
    }

    /// Apply `key=value` settings text to one copy
    pub fn configure(&mut self, label: CopyLabel, text: &str) -> Result<(), CompareError> {
        self.edit(label, |s| s.apply_str(text))
    }

    fn edit<F: FnOnce(&mut ImportSettings)>(&mut self, label: CopyLabel, f: F) -> Result<(), CompareError> {
        let Some(copy) = self.manager.copy(label) else {
            return Err(CompareError::InvalidSource {
                path: PathBuf::new(),
                reason: "no comparison in progress".to_string(),
            });
        };
        let mut settings = *copy.latest_settings();
        f(&mut settings);
        self.on_configuration_changed(label, settings)
    }

    /// Decode work the host must run, oldest first
    pub fn take_decode_requests(&mut self) -> Vec<DecodeRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Deliver a finished decode.
    ///
    /// Only the affected copy's preview is replaced. Results for disposed or
    /// superseded copies are discarded.
    pub fn complete_decode(&mut self, outcome: DecodeOutcome) -> Result<CopyLabel, CompareError> {
        let label = outcome.ticket.label;
        let accepted = match self.manager.accept(outcome) {
            Ok(accepted) => accepted,
            Err(stale) => {
                debug!(%label, epoch = stale.ticket.epoch, "stale decode discarded");
                return Err(CompareError::StaleCallback { label });
            }
        };

        if let Some(followup) = accepted.followup {
            self.requests.push(followup);
        }

        if self.state == SessionState::AudioReady {
            let clip = self
                .manager
                .copy(label)
                .and_then(|c| c.content())
                .and_then(|c| c.clip())
                .cloned();
            self.switcher.lock().load(label, clip);
        }

        match accepted.failure {
            Some(reason) => {
                warn!(%label, "decode failed: {}", reason);
                Err(CompareError::DecodeFailure { label, reason })
            }
            None => {
                debug!(%label, "copy regenerated");
                Ok(label)
            }
        }
    }

    // --- Playback ---

    pub fn toggle_playback(&mut self) -> PlaybackState {
        if self.state != SessionState::AudioReady {
            return PlaybackState::Stopped;
        }
        self.switcher.lock().toggle()
    }

    pub fn stop_playback(&mut self) {
        self.switcher.lock().stop();
    }

    /// Swap the audible channel. Returns the label now heard.
    pub fn switch_channel(&mut self) -> CopyLabel {
        self.switcher.lock().switch_channel()
    }

    /// Per-frame update: runs deferred selections, advances and polls playback
    pub fn tick(&mut self, elapsed: Duration) -> Option<TransportEvent> {
        self.drain_pending();

        let mut switcher = self.switcher.lock();
        if self.config.clock == ClockSource::Internal {
            switcher.advance(elapsed.as_secs_f64());
        }
        let event = switcher.poll();
        if event == Some(TransportEvent::Finished) {
            debug!("playback finished");
        }
        event
    }

    /// Choose what advances the transports; set `Host` once a device renders through `switcher()`
    pub fn set_clock(&mut self, clock: ClockSource) {
        self.config.clock = clock;
    }

    /// Handle for an audio device thread
    pub fn switcher(&self) -> SharedSwitcher {
        Arc::clone(&self.switcher)
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.switcher.lock().state()
    }

    pub fn audible(&self) -> CopyLabel {
        self.switcher.lock().audible()
    }

    pub fn cursor(&self) -> f64 {
        self.switcher.lock().cursor()
    }

    // --- Previews ---

    /// Split-view instructions after applying this frame's input.
    /// Empty outside `TextureReady`.
    pub fn texture_preview(&mut self, viewport: Rect, events: &[InputEvent]) -> Vec<DrawCommand> {
        if self.state != SessionState::TextureReady {
            return Vec::new();
        }
        for event in events {
            self.split.handle_input(&viewport, *event);
        }
        self.texture_commands(viewport)
    }

    /// Split-view instructions for the current state, without input
    pub fn texture_commands(&self, viewport: Rect) -> Vec<DrawCommand> {
        if self.state != SessionState::TextureReady {
            return Vec::new();
        }
        let source_size = CopyLabel::ALL.iter().find_map(|&label| {
            self.manager
                .copy(label)
                .and_then(|c| c.content())
                .and_then(|c| c.image())
                .map(|img| (img.source_width, img.source_height))
        });
        let layout = compose(viewport, source_size, self.split.divider(), self.split.zoom());
        layout.commands(&self.side_slot(CopyLabel::A), &self.side_slot(CopyLabel::B))
    }

    fn side_slot(&self, label: CopyLabel) -> SideSlot {
        match self.manager.copy(label).map(|c| c.preview()) {
            Some(PreviewState::Ready(_)) => SideSlot::Texture,
            Some(PreviewState::Unavailable(reason)) => SideSlot::Unavailable(reason.clone()),
            Some(PreviewState::Pending) | None => SideSlot::Pending,
        }
    }

    /// Waveform instructions and the audible label. `None` outside `AudioReady`.
    pub fn audio_preview(&self, viewport: Rect) -> Option<AudioPreview> {
        if self.state != SessionState::AudioReady {
            return None;
        }
        let (audible, cursor) = {
            let switcher = self.switcher.lock();
            (switcher.audible(), switcher.cursor())
        };
        let ready = self.waveform(audible).is_some();
        Some(audio_preview(viewport, audible, cursor as f32, ready))
    }

    pub fn split_view(&self) -> &SplitViewState {
        &self.split
    }

    pub fn split_view_mut(&mut self) -> &mut SplitViewState {
        &mut self.split
    }

    /// Decoded image of a copy
    pub fn texture(&self, label: CopyLabel) -> Option<Arc<RgbaImage>> {
        self.manager
            .copy(label)
            .and_then(|c| c.content())
            .and_then(|c| c.image())
            .map(|img| Arc::clone(&img.image))
    }

    pub fn waveform(&self, label: CopyLabel) -> Option<Arc<RgbaImage>> {
        self.manager.copy(label).and_then(|c| c.waveform()).cloned()
    }

    /// Resolve texture ids referenced by preview instructions
    pub fn resolve_texture(&self, id: TextureId) -> Option<Arc<RgbaImage>> {
        match id {
            TextureId::Copy(label) => self.texture(label),
            TextureId::Waveform(label) => self.waveform(label),
        }
    }

    // --- Inspection ---

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn source(&self) -> Option<&SourceAsset> {
        self.manager.source()
    }

    /// User-facing message for the last selection problem
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn stats(&self) -> Option<[CopyStats; 2]> {
        let source_size = self.source()?.size;
        let a = self.manager.copy(CopyLabel::A)?;
        let b = self.manager.copy(CopyLabel::B)?;
        Some([CopyStats::of(a, source_size), CopyStats::of(b, source_size)])
    }

    /// Settings of one copy, including edits still queued
    pub fn settings(&self, label: CopyLabel) -> Option<ImportSettings> {
        self.manager.copy(label).map(|c| *c.latest_settings())
    }

    pub fn has_pending_actions(&self) -> bool {
        !self.pending_actions.is_empty()
    }

    /// Dispose everything. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.pending_actions.clear();
        self.apply_clear();
    }
}

impl Drop for ComparisonSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
