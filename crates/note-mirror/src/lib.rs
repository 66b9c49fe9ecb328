pub mod collab;
pub mod config;
pub mod entry;
pub mod error;
pub mod event;
pub mod path;
pub mod policy;
pub mod totals;

pub use collab::{
    Confidence, DeviceLocator, ExtractError, NoteRenderer, TextBlock, TextExtractor, render_notes,
};
pub use config::{DEFAULT_LOCAL_DIR, DEFAULT_PORT, DeviceConfig};
pub use entry::{Listing, RemoteEntry, partition};
pub use error::{ListingError, MirrorError, TransferError};
pub use event::{SyncEvent, SyncObserver};
pub use path::{local_path, remote_url};
pub use policy::{SkipDecision, SyncOptions};
pub use totals::{SyncTotals, TransferOutcome};
