//! File-backed tracing. The terminal belongs to the UI, so nothing is written to stderr.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "boardhand.log";

/// `explicit` if given, else `<cache dir>/boardhand/boardhand.log`.
pub fn log_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => dirs::cache_dir().map(|d| d.join("boardhand").join(LOG_FILE)),
    }
}

fn open_log(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber. Returns the log path, or `None` when
/// logging is off because the file could not be opened.
///
/// Reads `RUST_LOG`; defaults to `info`.
pub fn init(explicit: Option<&Path>) -> Option<PathBuf> {
    let path = log_path(explicit)?;
    let file = open_log(&path).ok()?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .ok()?;
    Some(path)
}
