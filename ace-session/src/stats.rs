use ace_analysis::CopyLabel;
use ace_library::{ImportSettings, PreviewState, ScratchCopy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyState {
    Pending,
    Ready,
    Unavailable(String),
}

/// Per-copy summary for status displays
#[derive(Debug, Clone, PartialEq)]
pub struct CopyStats {
    pub label: CopyLabel,
    pub settings: ImportSettings,
    /// Size the copy would occupy after import, once decoded
    pub imported_size: Option<u64>,
    pub source_size: u64,
    pub state: CopyState,
}

impl CopyStats {
    pub(crate) fn of(copy: &ScratchCopy, source_size: u64) -> Self {
        let state = match copy.preview() {
            PreviewState::Pending => CopyState::Pending,
            PreviewState::Ready(_) => CopyState::Ready,
            PreviewState::Unavailable(reason) => CopyState::Unavailable(reason.clone()),
        };
        Self {
            label: copy.label(),
            settings: *copy.settings(),
            imported_size: copy.imported_size(),
            source_size,
            state,
        }
    }

    /// Imported size as a fraction of the source size
    pub fn ratio(&self) -> Option<f64> {
        match self.imported_size {
            Some(size) if self.source_size > 0 => Some(size as f64 / self.source_size as f64),
            _ => None,
        }
    }
}
