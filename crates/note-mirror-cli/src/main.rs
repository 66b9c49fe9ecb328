mod commands;
mod config;
mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use note_mirror::{DeviceConfig, DeviceLocator};
use note_mirror_device::PortScanLocator;

use crate::commands::download::DownloadArgs;
use crate::config::{Overrides, Settings};

#[derive(Parser)]
#[command(name = "note-mirror")]
#[command(about = "Mirror notebooks from a Supernote device's Browse & Access server")]
struct Cli {
    /// Device address (discovered on the local network when omitted)
    #[arg(long, global = true)]
    ip: Option<String>,
    /// Device port [default: 8089]
    #[arg(long, global = true)]
    port: Option<u16>,
    /// Local directory to mirror into [default: ./supernote_files]
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
    /// Increase log verbosity (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the local network for a device
    Find,
    /// List a directory on the device
    List {
        /// Device directory (defaults to the root)
        #[arg(default_value = "")]
        directory: String,
    },
    /// Download a file, or mirror a directory recursively
    Download {
        /// Device path; `Note/a.note` is a file, `Note` or `Note/` a directory
        path: String,
        /// Maximum concurrent transfers [default: 20]
        #[arg(long)]
        workers: Option<usize>,
        /// Use the thread-pool downloader instead of the pooled async one
        #[arg(long)]
        no_async: bool,
        /// Download even when a local copy exists
        #[arg(long)]
        force: bool,
        /// Treat any existing local copy as current
        #[arg(long)]
        no_check_size: bool,
    },
    /// Show connection details and whether the device answers
    Info,
}

/// The configured address, or one found by scanning.
async fn device_host(settings: &Settings) -> Result<String> {
    if let Some(ip) = &settings.ip {
        return Ok(ip.clone());
    }

    eprintln!("No device address given, scanning the local network...");
    let found = PortScanLocator::with_port(settings.port).locate().await;
    let ip = found.context("no device found on the local network; pass --ip")?;
    eprintln!("Found device at {ip}");
    Ok(ip.to_string())
}

async fn device_config(settings: &Settings) -> Result<(String, DeviceConfig)> {
    let host = device_host(settings).await?;
    let config = DeviceConfig::for_host(&host, settings.port, settings.output.clone());
    tracing::debug!(
        remote_root = %config.remote_root,
        local_root = %config.local_root.display(),
        workers = settings.workers,
        "resolved device config"
    );
    Ok((host, config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let file = config::load_config();
    let mut flags = Overrides {
        ip: cli.ip,
        port: cli.port,
        output: cli.output,
        ..Overrides::default()
    };

    match cli.command {
        Command::Find => {
            let settings = Settings::resolve(file, flags);
            let locator = PortScanLocator::with_port(settings.port);
            if commands::find::run(&locator).await.is_none() {
                anyhow::bail!("no device found");
            }
            Ok(())
        }
        Command::List { directory } => {
            let settings = Settings::resolve(file, flags);
            let (_, config) = device_config(&settings).await?;
            commands::list::run(config, &directory).await;
            Ok(())
        }
        Command::Download {
            path,
            workers,
            no_async,
            force,
            no_check_size,
        } => {
            flags.workers = workers;
            flags.force = force;
            flags.no_check_size = no_check_size;
            let settings = Settings::resolve(file, flags);
            let (_, config) = device_config(&settings).await?;

            let args = DownloadArgs {
                path,
                workers: settings.workers,
                use_async: !no_async,
                options: settings.options,
            };
            commands::download::run(config, &args).await?;
            Ok(())
        }
        Command::Info => {
            let settings = Settings::resolve(file, flags);
            let (host, config) = device_config(&settings).await?;
            commands::info::run(&config, &host, settings.port).await;
            Ok(())
        }
    }
}
