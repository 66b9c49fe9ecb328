use std::fmt;

use crate::policy::SkipDecision;
use crate::totals::SyncTotals;

/// Progress reported by the synchronizers while they walk a tree.
///
/// This lets callers decide how to present progress (the CLI prints
/// lines, tests count concurrent transfers) without the walkers knowing
/// about either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Listed {
        path: String,
        files: usize,
        directories: usize,
    },
    ListingFailed {
        path: String,
        reason: String,
    },
    Skipped {
        uri: String,
        decision: SkipDecision,
    },
    TransferStarted {
        uri: String,
    },
    TransferFinished {
        uri: String,
        succeeded: bool,
    },
    DirectoryDone {
        path: String,
        totals: SyncTotals,
    },
}

impl SyncEvent {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ListingFailed { .. }
                | Self::TransferFinished {
                    succeeded: false,
                    ..
                }
        )
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listed {
                path,
                files,
                directories,
            } => write!(
                f,
                "listed {}: {files} files, {directories} directories",
                display_path(path)
            ),
            Self::ListingFailed { path, reason } => {
                write!(f, "no files found in {}: {reason}", display_path(path))
            }
            Self::Skipped { uri, decision } => write!(f, "skipping {uri} ({decision})"),
            Self::TransferStarted { uri } => write!(f, "downloading {uri}"),
            Self::TransferFinished {
                uri,
                succeeded: true,
            } => write!(f, "downloaded {uri}"),
            Self::TransferFinished {
                uri,
                succeeded: false,
            } => write!(f, "failed to download {uri}"),
            Self::DirectoryDone { path, totals } => write!(
                f,
                "processed {totals} files in {}",
                display_path(path)
            ),
        }
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "root" } else { path }
}

/// Receives [`SyncEvent`]s. Implementations must tolerate calls from
/// several worker threads at once.
pub trait SyncObserver: Send + Sync {
    fn on_event(&self, event: &SyncEvent);
}

impl<F> SyncObserver for F
where
    F: Fn(&SyncEvent) + Send + Sync,
{
    fn on_event(&self, event: &SyncEvent) {
        self(event)
    }
}
