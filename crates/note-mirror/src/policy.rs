use std::fmt;
use std::path::Path;

/// Knobs shared by both synchronizers and by single-file transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Re-transfer even when a local copy exists.
    pub force: bool,
    /// Compare the listing size against the local byte length.
    pub check_size: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            force: false,
            check_size: true,
        }
    }
}

/// Why a local copy was (or was not) reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipDecision {
    Forced,
    Missing,
    /// `check_size` is off and the file exists.
    Exists,
    SameSize(u64),
    SizeChanged { local: u64, remote: u64 },
    /// The device did not report a size; existence is enough.
    SizeUnknown,
}

impl SkipDecision {
    pub fn skips(self) -> bool {
        matches!(self, Self::Exists | Self::SameSize(_) | Self::SizeUnknown)
    }

    /// Advisory log line for a decision about `local_path`.
    pub fn log(self, local_path: &Path) {
        match self {
            Self::SizeChanged { .. } => tracing::info!(
                path = %local_path.display(),
                "re-transferring ({self})"
            ),
            d if d.skips() => tracing::debug!(
                path = %local_path.display(),
                "skipping ({self})"
            ),
            _ => {}
        }
    }
}

impl fmt::Display for SkipDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forced => write!(f, "forced"),
            Self::Missing => write!(f, "missing locally"),
            Self::Exists | Self::SizeUnknown => write!(f, "exists locally"),
            Self::SameSize(size) => write!(f, "same size: {size} bytes"),
            Self::SizeChanged { local, remote } => {
                write!(f, "size changed: {local} -> {remote} bytes")
            }
        }
    }
}

impl SyncOptions {
    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }

    /// Apply the skip rules in order: force, existence, size check,
    /// size comparison, unknown size.
    pub fn decide(&self, remote_size: Option<u64>, local_path: &Path) -> SkipDecision {
        if self.force {
            return SkipDecision::Forced;
        }

        let Ok(metadata) = std::fs::metadata(local_path) else {
            return SkipDecision::Missing;
        };

        if !self.check_size {
            return SkipDecision::Exists;
        }

        match remote_size {
            Some(remote) if remote == metadata.len() => SkipDecision::SameSize(remote),
            Some(remote) => SkipDecision::SizeChanged {
                local: metadata.len(),
                remote,
            },
            None => SkipDecision::SizeUnknown,
        }
    }

    pub fn should_skip(&self, remote_size: Option<u64>, local_path: &Path) -> bool {
        let decision = self.decide(remote_size, local_path);
        decision.log(local_path);
        decision.skips()
    }
}
