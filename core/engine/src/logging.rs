//! FILENAME: core/engine/src/logging.rs
// PURPOSE: Sequenced trace log for parsing and evaluation.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use once_cell::sync::Lazy;
use thiserror::Error;

// ============================================================================
// SEQUENCED LOG
// ============================================================================

/// Global sequence counter, shared by every thread that logs
static LOG_SEQ: AtomicU64 = AtomicU64::new(0);

/// Optional log file. When unset, lines only go to the `log` facade.
pub static LOG_FILE: Lazy<Mutex<Option<File>>> = Lazy::new(|| Mutex::new(None));

#[derive(Debug, Error)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Log file lock poisoned")]
    Lock,
}

/// Get next sequence number
pub fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst) + 1
}

/// Opens (and truncates) the log file. Every later line is appended to it.
pub fn init_log_file(path: impl AsRef<Path>) -> Result<PathBuf, LogError> {
    let path = path.as_ref().to_path_buf();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)?;

    let mut guard = LOG_FILE.lock().map_err(|_| LogError::Lock)?;
    *guard = Some(file);
    drop(guard);

    crate::log_info!("LOG", "log file opened at {}", path.display());
    Ok(path)
}

/// Flushes and detaches the log file, if any.
pub fn close_log_file() -> Result<(), LogError> {
    let mut guard = LOG_FILE.lock().map_err(|_| LogError::Lock)?;
    if let Some(mut file) = guard.take() {
        file.flush()?;
    }
    Ok(())
}

fn level_of(level: &str) -> log::Level {
    match level {
        "E" => log::Level::Error,
        "W" => log::Level::Warn,
        "I" => log::Level::Info,
        "T" => log::Level::Trace,
        _ => log::Level::Debug,
    }
}

/// Write a log line in the `seq|level|category|message` format
pub fn write_log(level: &str, category: &str, message: &str) {
    let seq = next_seq();
    let line = format!("{}|{}|{}|{}", seq, level, category, message);

    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(ref mut file) = *guard {
            if let Err(e) = writeln!(file, "{}", line) {
                log::error!(target: "LOG", "failed to write log line: {}", e);
            }
            let _ = file.flush();
        }
    }

    log::log!(target: category, level_of(level), "{}", line);
}

/// Write an ENTER log line for function entry
pub fn write_log_enter(level: &str, category: &str, func_name: &str, params: &str) {
    let message = if params.is_empty() {
        format!("ENTER {}", func_name)
    } else {
        format!("ENTER {} {}", func_name, params)
    };
    write_log(level, category, &message);
}

/// Write an EXIT log line for function exit
pub fn write_log_exit(level: &str, category: &str, func_name: &str, result: &str) {
    let message = if result.is_empty() {
        format!("EXIT {}", func_name)
    } else {
        format!("EXIT {} {}", func_name, result)
    };
    write_log(level, category, &message);
}

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================

#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("D", $cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("I", $cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("W", $cat, &format!($($arg)*))
    };
}

// ENTER/EXIT macros for function tracing

#[macro_export]
macro_rules! log_enter {
    ($cat:expr, $func:expr) => {
        $crate::logging::write_log_enter("D", $cat, $func, "")
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::write_log_enter("D", $cat, $func, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_exit {
    ($cat:expr, $func:expr) => {
        $crate::logging::write_log_exit("D", $cat, $func, "")
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::write_log_exit("D", $cat, $func, &format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_increasing() {
        let a = next_seq();
        let b = next_seq();
        assert!(b > a);
    }

    #[test]
    fn test_log_file_receives_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace").join("formula.log");

        init_log_file(&path).unwrap();
        crate::log_debug!("TEST", "value={}", 42);
        crate::log_enter!("TEST", "probe", "x={}", 1.5);
        crate::log_exit!("TEST", "probe");
        close_log_file().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        // Other tests may log concurrently, so only look for our own lines
        assert!(lines.iter().any(|l| l.ends_with("|D|TEST|value=42")));
        assert!(lines.iter().any(|l| l.ends_with("|D|TEST|ENTER probe x=1.5")));
        assert!(lines.iter().any(|l| l.ends_with("|D|TEST|EXIT probe")));

        for line in &lines {
            let seq = line.split('|').next().unwrap();
            assert!(seq.parse::<u64>().is_ok(), "bad line: {}", line);
        }
    }
}
