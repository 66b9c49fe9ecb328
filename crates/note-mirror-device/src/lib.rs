pub mod blocking;
pub mod discovery;
pub mod dns;
pub mod headers;
pub mod info;
pub mod listing;
pub mod pooled;
mod walk;

pub use blocking::BlockingMirror;
pub use discovery::{DiscoveryError, PortScanLocator};
pub use info::{DeviceInfo, DeviceStatus, device_info};
pub use listing::parse_listing;
pub use pooled::{AsyncMirror, CHUNK_SIZE, PooledSession};
