//! Boundaries to the collaborators that sit around the mirror: device
//! discovery, notebook rendering and text extraction.

use std::net::IpAddr;
use std::path::Path;

use crate::path::is_note_file;
use crate::totals::{SyncTotals, TransferOutcome};

/// Finds the device on the network when no address is configured.
#[async_trait::async_trait]
pub trait DeviceLocator: Send + Sync {
    /// The first responding device address, or `None` if nothing answered.
    async fn locate(&self) -> Option<IpAddr>;
}

/// Renders a notebook file into a PDF.
pub trait NoteRenderer: Send + Sync {
    /// Render `input` to `output`, or to a path derived from `input` when
    /// `output` is `None`. Returns whether a PDF was produced.
    fn render(&self, input: &Path, output: Option<&Path>) -> bool;
}

/// Render every `.note` file under `dir`, recursing into subdirectories.
///
/// Unreadable directories are logged and contribute nothing.
pub fn render_notes(renderer: &dyn NoteRenderer, dir: &Path) -> SyncTotals {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "cannot read directory");
            return SyncTotals::empty();
        }
    };

    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if is_note_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    subdirs.sort();

    let mut totals = SyncTotals::from_outcomes(files.iter().map(|file| {
        if renderer.render(file, None) {
            TransferOutcome::Transferred
        } else {
            tracing::warn!(path = %file.display(), "render failed");
            TransferOutcome::Failed
        }
    }));

    for subdir in &subdirs {
        totals += render_notes(renderer, subdir);
    }

    totals
}

/// A recognized run of text with the engine's confidence in it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl TextBlock {
    pub fn band(&self) -> Confidence {
        if self.confidence > 0.7 {
            Confidence::High
        } else if self.confidence > 0.5 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unsupported input: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Engine(String),
}

/// Extracts text from a local notebook or PDF.
pub trait TextExtractor: Send + Sync {
    /// `progress` receives `(current, total, message)` as work advances.
    fn extract(
        &self,
        input: &Path,
        progress: &mut dyn FnMut(usize, usize, &str),
    ) -> Result<Vec<TextBlock>, ExtractError>;
}
