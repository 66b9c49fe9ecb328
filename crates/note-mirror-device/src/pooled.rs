use std::path::Path;
use std::sync::Arc;

use futures::future::{BoxFuture, join_all};
use note_mirror::{
    DeviceConfig, ListingError, MirrorError, RemoteEntry, SyncObserver, SyncOptions, SyncTotals,
    TransferError, TransferOutcome, partition,
};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::{OnceCell, Semaphore};

use crate::dns::CachingResolver;
use crate::headers::default_headers;
use crate::listing::parse_listing;
use crate::walk::Reporter;

/// File bodies are written to disk in pieces of this size.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// The connection pool and transfer permits for one top-level walk.
///
/// Nothing is built until the first request of the walk. The owner
/// releases the pool with [`PooledSession::close`]; dropping the session
/// also releases it, so early returns cannot leak connections.
pub struct PooledSession {
    config: DeviceConfig,
    max_concurrent: usize,
    state: OnceCell<SessionState>,
}

struct SessionState {
    client: reqwest::Client,
    permits: Semaphore,
}

impl PooledSession {
    pub fn new(config: DeviceConfig, max_concurrent: usize) -> Self {
        Self {
            config,
            max_concurrent: max_concurrent.max(1),
            state: OnceCell::new(),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// True once the first request has built the connection pool.
    pub fn is_open(&self) -> bool {
        self.state.initialized()
    }

    async fn state(&self) -> Result<&SessionState, MirrorError> {
        self.state
            .get_or_try_init(|| async { self.connect() })
            .await
    }

    fn connect(&self) -> Result<SessionState, MirrorError> {
        let pool_size = self.max_concurrent * 2;
        tracing::debug!(
            remote_root = %self.config.remote_root,
            pool_size,
            "opening pooled session"
        );

        let client = reqwest::Client::builder()
            .default_headers(default_headers())
            .pool_max_idle_per_host(pool_size)
            .pool_idle_timeout(self.config.keepalive)
            .tcp_keepalive(self.config.keepalive)
            .connect_timeout(self.config.connect_timeout)
            .read_timeout(self.config.transfer_timeout)
            .timeout(self.config.request_timeout)
            .dns_resolver(Arc::new(CachingResolver::new(self.config.dns_ttl)))
            .build()
            .map_err(|e| MirrorError::Client(e.to_string()))?;

        Ok(SessionState {
            client,
            permits: Semaphore::new(self.max_concurrent),
        })
    }

    /// Release the connection pool.
    pub fn close(self) {
        if let Some(state) = self.state.into_inner() {
            tracing::debug!(remote_root = %self.config.remote_root, "closing pooled session");
            state.permits.close();
        }
    }
}

/// Mirrors a device tree with async requests sharing one [`PooledSession`].
///
/// All transfer tasks of a directory run concurrently on the calling task;
/// the session's semaphore caps in-flight transfers across the whole walk.
pub struct AsyncMirror {
    config: DeviceConfig,
    reporter: Reporter,
}

impl AsyncMirror {
    pub fn new(config: DeviceConfig) -> Result<Self, MirrorError> {
        config.ensure_local_root()?;
        Ok(Self {
            config,
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

    /// A fresh, unopened session for one walk.
    pub fn session(&self, max_concurrent: usize) -> PooledSession {
        PooledSession::new(self.config.clone(), max_concurrent)
    }

    /// Mirror `directory` with a session created for this call and closed
    /// before returning.
    pub async fn mirror(
        &self,
        directory: &str,
        max_concurrent: usize,
        options: SyncOptions,
    ) -> SyncTotals {
        let session = self.session(max_concurrent);
        let totals = self.sync_directory(&session, directory, options).await;
        session.close();
        totals
    }

    pub async fn list_files(
        &self,
        session: &PooledSession,
        directory: &str,
    ) -> Result<Vec<RemoteEntry>, ListingError> {
        let state = session
            .state()
            .await
            .map_err(|e| ListingError::Network(e.to_string()))?;

        let url = self.config.url_for(directory)?;
        tracing::debug!(%url, "listing");

        let response = state
            .client
            .get(url)
            .timeout(self.config.listing_timeout)
            .send()
            .await
            .map_err(|e| ListingError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ListingError::Status(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ListingError::Network(e.to_string()))?;

        parse_listing(&body)
    }

    /// Transfer one file under a session permit, streaming the body to disk.
    pub async fn transfer_file(
        &self,
        session: &PooledSession,
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

        if let Some(parent) = local_path.parent()
            && let Err(e) = tokio::fs::create_dir_all(parent).await
        {
            return self
                .reporter
                .abandoned(remote_path, &local_path, TransferError::Io(e));
        }

        let state = match session.state().await {
            Ok(state) => state,
            Err(e) => {
                let error = TransferError::Network(e.to_string());
                return self.reporter.abandoned(remote_path, &local_path, error);
            }
        };

        let permit = match state.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                let error = TransferError::Network("session closed".into());
                return self.reporter.abandoned(remote_path, &local_path, error);
            }
        };

        self.reporter.started(remote_path);
        let result = self.stream_to(state, remote_path, &local_path).await;
        let outcome = self.reporter.finished(remote_path, &local_path, result);
        drop(permit);

        outcome
    }

    async fn stream_to(
        &self,
        state: &SessionState,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<(), TransferError> {
        let url = self.config.url_for(remote_path)?;
        let response = state
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransferError::Status(response.status().as_u16()));
        }

        let file = tokio::fs::File::create(local_path).await?;

        if let Err(e) = write_body(response, file).await {
            if let Err(remove_err) = tokio::fs::remove_file(local_path).await {
                tracing::debug!(path = %local_path.display(), error = %remove_err, "could not remove partial file");
            }
            return Err(e);
        }

        Ok(())
    }

    /// Recursively mirror `directory` using `session`.
    ///
    /// Files of one directory are transferred concurrently; subdirectories
    /// are walked one after another in listing order.
    pub fn sync_directory<'a>(
        &'a self,
        session: &'a PooledSession,
        directory: &'a str,
        options: SyncOptions,
    ) -> BoxFuture<'a, SyncTotals> {
        Box::pin(async move {
            if let Err(e) = session.state().await {
                tracing::error!(error = %e, "could not open pooled session");
                return SyncTotals::empty();
            }

            let listing = self.list_files(session, directory).await;
            let entries = self.reporter.entries(directory, listing);
            if entries.is_empty() {
                return SyncTotals::empty();
            }

            let (files, directories) = partition(entries);

            let mut totals = self.transfer_batch(session, directory, &files, options).await;

            for subdir in self.reporter.subdirectories(directory, &directories) {
                totals += self
                    .sync_directory(session, subdir.relative_uri(), options)
                    .await;
            }

            totals
        })
    }

    async fn transfer_batch(
        &self,
        session: &PooledSession,
        directory: &str,
        files: &[RemoteEntry],
        options: SyncOptions,
    ) -> SyncTotals {
        if files.is_empty() {
            return SyncTotals::empty();
        }

        tracing::info!(
            path = directory,
            files = files.len(),
            max_concurrent = session.max_concurrent(),
            "processing files"
        );

        let tasks = files
            .iter()
            .map(|entry| self.transfer_file(session, &entry.uri, None, options, Some(entry)));
        let totals = SyncTotals::from_outcomes(join_all(tasks).await);

        self.reporter.directory_done(directory, totals);
        totals
    }
}

async fn write_body(
    mut response: reqwest::Response,
    file: tokio::fs::File,
) -> Result<(), TransferError> {
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| TransferError::Network(e.to_string()))?
    {
        writer.write_all(&chunk).await?;
    }

    writer.flush().await?;
    Ok(())
}
