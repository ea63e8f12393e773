//! Log setup for the plugin binary.
//!
//! stdout carries the host protocol, so logs go to a file and fall back to
//! stderr when the file cannot be opened.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` overrides the default level.
pub fn init(log_file: &Path, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    let writer = match open_log_file(log_file) {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(e) => {
            eprintln!("cannot open {}: {e}, logging to stderr", log_file.display());
            BoxMakeWriter::new(io::stderr)
        }
    };

    // Already installed (tests, repeated init) is fine.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .try_init();
}

/// Open `path` for appending, creating its parent directory.
///
/// # Errors
///
/// Returns the I/O error if the directory or file cannot be created.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}
