use std::fmt;

use note_mirror::DeviceConfig;

use crate::headers::default_headers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Connected,
    Disconnected,
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub remote_root: String,
    pub status: DeviceStatus,
}

/// Request the remote root once. Any failure reads as disconnected.
pub async fn device_info(config: &DeviceConfig) -> DeviceInfo {
    let status = match reach(config).await {
        Ok(()) => DeviceStatus::Connected,
        Err(e) => {
            tracing::info!(remote_root = %config.remote_root, error = %e, "device not reachable");
            DeviceStatus::Disconnected
        }
    };

    DeviceInfo {
        remote_root: config.remote_root.clone(),
        status,
    }
}

async fn reach(config: &DeviceConfig) -> Result<(), reqwest::Error> {
    let client = reqwest::Client::builder()
        .default_headers(default_headers())
        .connect_timeout(config.connect_timeout)
        .build()?;

    client
        .get(&config.remote_root)
        .timeout(config.listing_timeout)
        .send()
        .await?
        .error_for_status()?;

    Ok(())
}
