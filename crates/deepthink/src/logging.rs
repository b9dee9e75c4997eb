//! Optional file-backed logging.
//!
//! `DEEPTHINK_LOG` turns logging on; its value names a `log` level
//! (`error`, `warn`, `info`, `debug`, `trace`). Records go to a file under
//! the user cache directory, never to the terminal the REPL owns, and any
//! setup failure disables logging silently for the same reason.

use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{LevelFilter, Log, Metadata, Record};

/// Environment variable that enables and scopes logging.
pub const LOG_ENV_VAR: &str = "DEEPTHINK_LOG";

static LOGGER: OnceLock<FileLogger> = OnceLock::new();

/// Installs the file logger when `DEEPTHINK_LOG` requests one.
pub fn init() {
    let level = match env::var(LOG_ENV_VAR) {
        Ok(raw) => match parse_level(&raw) {
            Some(level) if level != LevelFilter::Off => level,
            _ => return,
        },
        Err(_) => return,
    };

    let Some(path) = log_file_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let logger = LOGGER.get_or_init(|| FileLogger {
        file: Mutex::new(file),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}

/// Level requested by an environment value; `None` means logging stays off.
/// Unrecognized non-blank values log at `info`.
fn parse_level(raw: &str) -> Option<LevelFilter> {
    let spec = raw.trim();
    if spec.is_empty() {
        return None;
    }
    Some(spec.parse::<LevelFilter>().unwrap_or(LevelFilter::Info))
}

/// `<cache dir>/deepthink/deepthink.log`.
#[must_use]
pub fn log_file_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("deepthink").join("deepthink.log"))
}

struct FileLogger {
    file: Mutex<File>,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let line = format!(
            "[{}.{:06}] [{}] [{}] {}\n",
            timestamp.as_secs(),
            timestamp.subsec_micros(),
            record.level(),
            record.target(),
            record.args()
        );
        let mut file = lock_unpoisoned(&self.file);
        let _ = file.write_all(line.as_bytes());
        let _ = file.flush();
    }

    fn flush(&self) {
        let mut file = lock_unpoisoned(&self.file);
        let _ = file.flush();
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
