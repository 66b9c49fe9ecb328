use std::path::Path;
use std::sync::Arc;

use note_mirror::{
    DeviceConfig, ListingError, MirrorError, RemoteEntry, SyncObserver, SyncOptions, SyncTotals,
    TransferError, TransferOutcome, partition,
};
use rayon::prelude::*;

use crate::headers::default_headers;
use crate::listing::parse_listing;
use crate::walk::Reporter;

/// Mirrors a device tree using blocking requests on a bounded thread pool.
///
/// Each directory level gets its own pool of `max_workers` threads for its
/// files; subdirectories are walked one after another, so no more than
/// `max_workers` transfers are ever in flight.
///
/// The underlying client must not be created or dropped inside an async
/// runtime; call it from a plain thread or `spawn_blocking`.
pub struct BlockingMirror {
    config: DeviceConfig,
    client: reqwest::blocking::Client,
    reporter: Reporter,
}

impl BlockingMirror {
    pub fn new(config: DeviceConfig) -> Result<Self, MirrorError> {
        config.ensure_local_root()?;

        let client = reqwest::blocking::Client::builder()
            .default_headers(default_headers())
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| MirrorError::Client(e.to_string()))?;

        Ok(Self {
            config,
            client,
            reporter: Reporter::default(),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn SyncObserver>) -> Self {
        self.reporter = Reporter::new(Some(observer));
        self
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// List one directory. An empty `directory` lists the device root.
    pub fn list_files(&self, directory: &str) -> Result<Vec<RemoteEntry>, ListingError> {
        let url = self.config.url_for(directory)?;
        tracing::debug!(%url, "listing");

        let response = self
            .client
            .get(url)
            .timeout(self.config.listing_timeout)
            .send()
            .map_err(|e| ListingError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ListingError::Status(response.status().as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| ListingError::Network(e.to_string()))?;

        parse_listing(&body)
    }

    /// Transfer one file, applying the skip policy when the listing entry
    /// is known. Failures are logged and reported as [`TransferOutcome::Failed`].
    pub fn transfer_file(
        &self,
        remote_path: &str,
        local_path: Option<&Path>,
        options: SyncOptions,
        entry: Option<&RemoteEntry>,
    ) -> TransferOutcome {
        let local_path = match local_path {
            Some(path) => path.to_path_buf(),
            None => self.config.local_path_for(remote_path),
        };

        if let Some(entry) = entry
            && self.reporter.skip(options, entry, &local_path)
        {
            return TransferOutcome::Skipped;
        }

        self.reporter.started(remote_path);
        let result = self.fetch_to(remote_path, &local_path);
        self.reporter.finished(remote_path, &local_path, result)
    }

    fn fetch_to(&self, remote_path: &str, local_path: &Path) -> Result<(), TransferError> {
        if let Some(parent) = local_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let url = self.config.url_for(remote_path)?;
        let response = self
            .client
            .get(url)
            .timeout(self.config.transfer_timeout)
            .send()
            .map_err(|e| TransferError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransferError::Status(response.status().as_u16()));
        }

        let bytes = response
            .bytes()
            .map_err(|e| TransferError::Network(e.to_string()))?;

        std::fs::write(local_path, &bytes)?;
        Ok(())
    }

    /// Recursively mirror `directory`, returning `(succeeded, total)` over
    /// every file found beneath it.
    pub fn sync_directory(
        &self,
        directory: &str,
        max_workers: usize,
        options: SyncOptions,
    ) -> SyncTotals {
        let entries = self.reporter.entries(directory, self.list_files(directory));
        if entries.is_empty() {
            return SyncTotals::empty();
        }

        let (files, directories) = partition(entries);

        let mut totals = self.transfer_batch(directory, &files, max_workers, options);

        for subdir in self.reporter.subdirectories(directory, &directories) {
            totals += self.sync_directory(subdir.relative_uri(), max_workers, options);
        }

        totals
    }

    fn transfer_batch(
        &self,
        directory: &str,
        files: &[RemoteEntry],
        max_workers: usize,
        options: SyncOptions,
    ) -> SyncTotals {
        if files.is_empty() {
            return SyncTotals::empty();
        }

        tracing::info!(path = directory, files = files.len(), "processing files");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(max_workers.max(1))
            .thread_name(|i| format!("note-mirror-worker-{i}"))
            .build();

        let totals = match pool {
            Ok(pool) => pool.install(|| {
                let outcomes: Vec<TransferOutcome> = files
                    .par_iter()
                    .map(|entry| self.transfer_file(&entry.uri, None, options, Some(entry)))
                    .collect();
                SyncTotals::from_outcomes(outcomes)
            }),
            Err(e) => {
                tracing::error!(path = directory, error = %e, "could not start worker pool");
                SyncTotals {
                    succeeded: 0,
                    total: files.len(),
                }
            }
        };

        self.reporter.directory_done(directory, totals);
        totals
    }
}
