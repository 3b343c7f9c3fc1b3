//! Log setup: stderr plus an append-only file at `{tempdir}/tde.log`.
//!
//! The file is rotated at startup once it reaches 5 MB, keeping three
//! backups (`tde.log.1` .. `tde.log.3`). Both sinks share one filter taken
//! from `TDE_LOG_LEVEL` (default `warn`).

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log level or filter directives.
pub const LOG_ENV: &str = "TDE_LOG_LEVEL";
pub const LOG_FILE_NAME: &str = "tde.log";
pub const LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub const LOG_BACKUPS: usize = 3;
const DEFAULT_LEVEL: &str = "warn";

pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}

/// Map level names as commonly spelled (`WARNING`, `Info`, `CRITICAL`) to
/// filter directives. Anything else passes through untouched so full
/// directives like `tde=debug` still work.
pub fn normalize_level(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "" => DEFAULT_LEVEL.to_string(),
        "warning" | "warn" => "warn".to_string(),
        "error" | "critical" | "fatal" => "error".to_string(),
        "info" => "info".to_string(),
        "debug" => "debug".to_string(),
        "trace" => "trace".to_string(),
        "off" => "off".to_string(),
        _ => trimmed.to_string(),
    }
}

fn build_filter(raw: &str) -> EnvFilter {
    EnvFilter::try_new(normalize_level(raw)).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

fn backup_path(path: &Path, n: usize) -> PathBuf {
    let mut s = OsString::from(path.as_os_str());
    s.push(format!(".{}", n));
    PathBuf::from(s)
}

/// Shift `path` to `path.1`, `path.1` to `path.2`, ... once `path` has
/// reached `max_bytes`. The oldest backup beyond `backups` is overwritten.
pub fn rotate(path: &Path, max_bytes: u64, backups: usize) -> io::Result<()> {
    let size = match fs::metadata(path) {
        Ok(md) => md.len(),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if size < max_bytes {
        return Ok(());
    }
    if backups == 0 {
        return fs::remove_file(path);
    }
    for n in (1..backups).rev() {
        let from = backup_path(path, n);
        if from.exists() {
            fs::rename(&from, backup_path(path, n + 1))?;
        }
    }
    fs::rename(path, backup_path(path, 1))
}

fn open_log_file(path: &Path) -> io::Result<File> {
    rotate(path, LOG_MAX_BYTES, LOG_BACKUPS)?;
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber. Returns the log file path when the file
/// sink could be opened; stderr logging works either way.
pub fn init() -> Option<PathBuf> {
    let filter = build_filter(&std::env::var(LOG_ENV).unwrap_or_default());
    let path = log_file_path();
    let file = open_log_file(&path).ok();
    let opened = file.is_some();
    let file_layer = file.map(|f| {
        fmt::layer()
            .with_writer(Mutex::new(f))
            .with_ansi(false)
    });
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(file_layer)
        .with(filter)
        .try_init();
    opened.then_some(path)
}
