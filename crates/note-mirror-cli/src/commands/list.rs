use note_mirror::{DeviceConfig, ListingError, RemoteEntry};
use note_mirror_device::AsyncMirror;

/// Fetch one directory listing with a single-use session.
pub async fn fetch(config: DeviceConfig, directory: &str) -> Result<Vec<RemoteEntry>, ListingError> {
    let mirror = AsyncMirror::new(config).map_err(|e| ListingError::Network(e.to_string()))?;
    let session = mirror.session(1);
    let listing = mirror.list_files(&session, directory).await;
    session.close();
    listing
}

pub fn format_entry(entry: &RemoteEntry) -> String {
    let marker = if entry.is_directory { "d" } else { "-" };
    let date = entry.date.as_deref().unwrap_or("");
    match entry.size {
        Some(size) if !entry.is_directory => {
            format!("{marker} {:<40} {size:>10}  {date}", entry.name)
        }
        _ => format!("{marker} {:<40} {:>10}  {date}", entry.name, ""),
    }
}

/// Print a directory listing; failures are reported, not raised.
pub async fn run(config: DeviceConfig, directory: &str) {
    match fetch(config, directory).await {
        Ok(entries) => {
            for entry in &entries {
                println!("{}", format_entry(entry));
            }
            println!("\n{} entries", entries.len());
        }
        Err(e) => eprintln!("could not list {directory:?}: {e}"),
    }
}
