use std::path::PathBuf;

use note_mirror::{DEFAULT_LOCAL_DIR, DEFAULT_PORT, SyncOptions};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WORKERS: usize = 20;

/// Contents of the optional config file. Every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    pub ip: Option<String>,
    pub port: Option<u16>,
    pub output: Option<PathBuf>,
    pub workers: Option<usize>,
    pub check_size: Option<bool>,
}

/// Config file path: `~/.config/note-mirror/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("note-mirror").join("config.toml"))
}

/// Load config from file, falling back to defaults if missing.
pub fn load_config() -> AppConfig {
    if let Some(path) = config_path()
        && let Ok(contents) = std::fs::read_to_string(&path)
    {
        match toml::from_str::<AppConfig>(&contents) {
            Ok(config) => return config,
            Err(e) => eprintln!(
                "warning: failed to parse config at {}, using defaults: {e}",
                path.display()
            ),
        }
    }

    AppConfig::default()
}

/// Flags given on the command line; these win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub ip: Option<String>,
    pub port: Option<u16>,
    pub output: Option<PathBuf>,
    pub workers: Option<usize>,
    pub force: bool,
    pub no_check_size: bool,
}

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub ip: Option<String>,
    pub port: u16,
    pub output: PathBuf,
    pub workers: usize,
    pub options: SyncOptions,
}

impl Settings {
    pub fn resolve(file: AppConfig, flags: Overrides) -> Self {
        let check_size = !flags.no_check_size && file.check_size.unwrap_or(true);

        Self {
            ip: flags.ip.or(file.ip),
            port: flags.port.or(file.port).unwrap_or(DEFAULT_PORT),
            output: flags
                .output
                .or(file.output)
                .unwrap_or_else(|| PathBuf::from(".").join(DEFAULT_LOCAL_DIR)),
            workers: flags.workers.or(file.workers).unwrap_or(DEFAULT_WORKERS),
            options: SyncOptions {
                force: flags.force,
                check_size,
            },
        }
    }
}
