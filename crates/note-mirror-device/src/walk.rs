use std::path::Path;
use std::sync::Arc;

use note_mirror::{
    ListingError, RemoteEntry, SyncEvent, SyncObserver, SyncOptions, SyncTotals, TransferError,
    TransferOutcome,
};

/// Logging and observer plumbing shared by both synchronizers.
#[derive(Clone, Default)]
pub(crate) struct Reporter {
    observer: Option<Arc<dyn SyncObserver>>,
}

impl Reporter {
    pub(crate) fn new(observer: Option<Arc<dyn SyncObserver>>) -> Self {
        Self { observer }
    }

    fn emit(&self, event: SyncEvent) {
        if let Some(observer) = &self.observer {
            observer.on_event(&event);
        }
    }

    /// Turn a listing result into entries. Failures become an empty
    /// listing so the walk can carry on.
    pub(crate) fn entries(
        &self,
        directory: &str,
        listing: Result<Vec<RemoteEntry>, ListingError>,
    ) -> Vec<RemoteEntry> {
        match listing {
            Ok(entries) => {
                let directories = entries.iter().filter(|e| e.is_directory).count();
                let files = entries.len() - directories;
                if entries.is_empty() {
                    tracing::info!(path = directory, "directory is empty");
                } else {
                    tracing::debug!(path = directory, files, directories, "listed directory");
                }
                self.emit(SyncEvent::Listed {
                    path: directory.to_owned(),
                    files,
                    directories,
                });
                entries
            }
            Err(e) => {
                tracing::warn!(path = directory, error = %e, "no files found");
                self.emit(SyncEvent::ListingFailed {
                    path: directory.to_owned(),
                    reason: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    /// The subdirectories of `directory` that are safe to walk. Entries
    /// pointing at the directory itself, an ancestor, or elsewhere are
    /// logged and left out.
    pub(crate) fn subdirectories<'e>(
        &self,
        directory: &str,
        entries: &'e [RemoteEntry],
    ) -> Vec<&'e RemoteEntry> {
        entries
            .iter()
            .filter(|entry| {
                let below = entry.is_below(directory);
                if !below {
                    tracing::warn!(path = directory, uri = %entry.uri, "not descending into entry outside directory");
                }
                below
            })
            .collect()
    }

    /// Apply the skip policy for a listed file.
    pub(crate) fn skip(&self, options: SyncOptions, entry: &RemoteEntry, local_path: &Path) -> bool {
        let decision = options.decide(entry.size, local_path);
        decision.log(local_path);

        if decision.skips() {
            self.emit(SyncEvent::Skipped {
                uri: entry.uri.clone(),
                decision,
            });
        }

        decision.skips()
    }

    pub(crate) fn started(&self, uri: &str) {
        tracing::debug!(uri, "downloading");
        self.emit(SyncEvent::TransferStarted {
            uri: uri.to_owned(),
        });
    }

    /// Report a transfer that failed before its request was sent. The start
    /// is still emitted so observers always see matched pairs.
    pub(crate) fn abandoned(
        &self,
        uri: &str,
        local_path: &Path,
        error: TransferError,
    ) -> TransferOutcome {
        self.started(uri);
        self.finished(uri, local_path, Err(error))
    }

    pub(crate) fn finished(
        &self,
        uri: &str,
        local_path: &Path,
        result: Result<(), TransferError>,
    ) -> TransferOutcome {
        let outcome = match result {
            Ok(()) => {
                tracing::info!(uri, path = %local_path.display(), "downloaded");
                TransferOutcome::Transferred
            }
            Err(e) => {
                tracing::warn!(uri, error = %e, "download failed");
                TransferOutcome::Failed
            }
        };

        self.emit(SyncEvent::TransferFinished {
            uri: uri.to_owned(),
            succeeded: outcome.succeeded(),
        });

        outcome
    }

    /// Summary for one directory's own files (subdirectories excluded).
    pub(crate) fn directory_done(&self, directory: &str, totals: SyncTotals) {
        if totals.total == 0 {
            return;
        }
        tracing::info!(path = directory, "processed {totals} files");
        self.emit(SyncEvent::DirectoryDone {
            path: directory.to_owned(),
            totals,
        });
    }
}
