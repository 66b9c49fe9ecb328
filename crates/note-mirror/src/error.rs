/// Errors from a single directory listing call.
///
/// Walkers treat every variant as "zero entries" and log it; none of
/// these abort a recursion.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("network error: {0}")]
    Network(String),

    #[error("listing returned HTTP {0}")]
    Status(u16),

    #[error("invalid listing URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("no listing payload in response")]
    MissingPayload,

    #[error("malformed listing payload: {0}")]
    Malformed(String),
}

/// Errors from a single file transfer.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("network error: {0}")]
    Network(String),

    #[error("transfer returned HTTP {0}")]
    Status(u16),

    #[error("invalid file URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that prevent a synchronizer from being set up at all.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
