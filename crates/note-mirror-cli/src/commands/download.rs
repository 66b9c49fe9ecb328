use std::sync::Arc;

use anyhow::{Context, Result};
use note_mirror::{DeviceConfig, SyncEvent, SyncObserver, SyncOptions, SyncTotals};
use note_mirror_device::{AsyncMirror, BlockingMirror};

pub struct DownloadArgs {
    pub path: String,
    pub workers: usize,
    pub use_async: bool,
    pub options: SyncOptions,
}

/// What a `download` path names on the device.
#[derive(Debug, PartialEq, Eq)]
pub enum Target<'a> {
    File(&'a str),
    Directory(&'a str),
}

/// A path with a separator that does not end in one is a single file;
/// anything else is a directory to walk.
pub fn target(path: &str) -> Target<'_> {
    if path.contains('/') && !path.ends_with('/') {
        Target::File(path)
    } else {
        Target::Directory(path.trim_matches('/'))
    }
}

/// Prints transfer progress as the walk runs.
pub struct ConsoleObserver;

impl SyncObserver for ConsoleObserver {
    fn on_event(&self, event: &SyncEvent) {
        match event {
            SyncEvent::Listed { .. } | SyncEvent::TransferStarted { .. } => {}
            e if e.is_failure() => eprintln!("warning: {e}"),
            e => println!("{e}"),
        }
    }
}

pub async fn run(config: DeviceConfig, args: &DownloadArgs) -> Result<SyncTotals> {
    let observer: Arc<dyn SyncObserver> = Arc::new(ConsoleObserver);

    let totals = if args.use_async {
        let mirror = AsyncMirror::new(config)
            .context("failed to prepare local directory")?
            .with_observer(observer);

        match target(&args.path) {
            Target::File(path) => {
                let session = mirror.session(1);
                let outcome = mirror
                    .transfer_file(&session, path, None, args.options, None)
                    .await;
                session.close();
                SyncTotals::from_outcomes([outcome])
            }
            Target::Directory(dir) => mirror.mirror(dir, args.workers, args.options).await,
        }
    } else {
        let path = args.path.clone();
        let workers = args.workers;
        let options = args.options;

        tokio::task::spawn_blocking(move || -> Result<SyncTotals> {
            let mirror = BlockingMirror::new(config)
                .context("failed to prepare download client")?
                .with_observer(observer);

            Ok(match target(&path) {
                Target::File(file) => {
                    SyncTotals::from_outcomes([mirror.transfer_file(file, None, options, None)])
                }
                Target::Directory(dir) => mirror.sync_directory(dir, workers, options),
            })
        })
        .await
        .context("download worker stopped unexpectedly")??
    };

    println!("Downloaded {totals} files.");
    if !totals.is_complete() {
        eprintln!("warning: {} file(s) failed", totals.failed());
    }

    Ok(totals)
}
