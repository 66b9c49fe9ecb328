use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

/// Port the device's file-listing server listens on.
pub const DEFAULT_PORT: u16 = 8089;

/// Local directory used when no output directory is configured.
pub const DEFAULT_LOCAL_DIR: &str = "supernote_files";

/// Where to mirror from and to, plus per-request time limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Base URL under which listing and file endpoints live.
    pub remote_root: String,
    pub local_root: PathBuf,
    pub listing_timeout: Duration,
    pub transfer_timeout: Duration,
    pub connect_timeout: Duration,
    /// Whole-request limit for the pooled session.
    pub request_timeout: Duration,
    /// How long idle pooled connections are kept alive.
    pub keepalive: Duration,
    /// How long a resolved device address is reused by the pooled session.
    pub dns_ttl: Duration,
}

impl DeviceConfig {
    pub fn new(remote_root: impl Into<String>, local_root: impl Into<PathBuf>) -> Self {
        Self {
            remote_root: remote_root.into().trim_end_matches('/').to_owned(),
            local_root: local_root.into(),
            listing_timeout: Duration::from_secs(10),
            transfer_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            keepalive: Duration::from_secs(30),
            dns_ttl: Duration::from_secs(300),
        }
    }

    pub fn for_host(host: &str, port: u16, local_root: impl Into<PathBuf>) -> Self {
        Self::new(format!("http://{host}:{port}"), local_root)
    }

    pub fn with_timeouts(mut self, listing: Duration, transfer: Duration) -> Self {
        self.listing_timeout = listing;
        self.transfer_timeout = transfer;
        self
    }

    /// URL for a device path under the remote root.
    pub fn url_for(&self, path: &str) -> Result<Url, url::ParseError> {
        crate::path::remote_url(&self.remote_root, path)
    }

    /// Local mirror location for a device URI.
    pub fn local_path_for(&self, uri: &str) -> PathBuf {
        crate::path::local_path(&self.local_root, uri)
    }

    /// Create the local root if it does not exist yet.
    pub fn ensure_local_root(&self) -> std::io::Result<&Path> {
        std::fs::create_dir_all(&self.local_root)?;
        Ok(&self.local_root)
    }
}
