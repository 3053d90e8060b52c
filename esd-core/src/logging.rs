//! Structured logging setup (spec.md §6: size-rotated log file + stderr)
//!
//! `tracing-appender` ships hourly/daily rolling, not size-based rotation, so
//! the byte-count-and-backup-count policy here is hand-rolled - the same
//! shape as Python's `logging.handlers.RotatingFileHandler` the original
//! tool used. It still plugs into the standard `tracing_appender::non_blocking`
//! + `tracing_subscriber::fmt::layer()` pipeline, the way kumomta's
//! `diagnostic_logging.rs` and firezone's `logging/src/file.rs` wire up their
//! own custom writers.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_appender::non_blocking::WorkerGuard;

const MAX_BYTES: u64 = 5 * 1024 * 1024;
const MAX_BACKUPS: u32 = 7;

/// A `tracing`-compatible writer that rotates `path` once it exceeds
/// `MAX_BYTES`, keeping up to `MAX_BACKUPS` numbered copies (`esd.log.1` is
/// the newest backup, `esd.log.7` the oldest - higher numbers are evicted).
pub struct RotatingFileWriter {
    inner: Mutex<RotatingFileInner>,
}

struct RotatingFileInner {
    path: PathBuf,
    file: File,
    written: u64,
}

impl RotatingFileWriter {
    pub fn new(dir: impl AsRef<Path>, file_name: &str) -> io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            inner: Mutex::new(RotatingFileInner { path, file, written }),
        })
    }

    fn rotate(inner: &mut RotatingFileInner) -> io::Result<()> {
        for index in (1..MAX_BACKUPS).rev() {
            let src = backup_path(&inner.path, index);
            let dst = backup_path(&inner.path, index + 1);
            if src.exists() {
                fs::rename(src, dst)?;
            }
        }
        fs::rename(&inner.path, backup_path(&inner.path, 1))?;
        inner.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&inner.path)?;
        inner.written = 0;
        Ok(())
    }
}

fn backup_path(base: &Path, index: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        if inner.written + buf.len() as u64 > MAX_BYTES {
            RotatingFileWriter::rotate(&mut inner)?;
        }
        let written = inner.file.write(buf)?;
        inner.written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().unwrap().file.flush()
    }
}

/// Initialize the global `tracing` subscriber: pretty stderr output plus the
/// rotating file sink, both honoring `RUST_LOG` (default `info`).
///
/// The returned `WorkerGuard` must be held for the process lifetime - the
/// non-blocking file writer stops flushing once it's dropped, the same
/// caveat `tracing-appender` always carries.
pub fn init(log_dir: impl AsRef<Path>, file_name: &str) -> io::Result<WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let file_writer = RotatingFileWriter::new(log_dir, file_name)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_writer);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("esd-logging-test-{tag}-{:?}", std::thread::current().id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn writes_accumulate_without_rotating_below_the_threshold() {
        let dir = scratch_dir("small");
        let mut writer = RotatingFileWriter::new(&dir, "esd.log").unwrap();
        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();
        let contents = fs::read_to_string(dir.join("esd.log")).unwrap();
        assert_eq!(contents, "hello\n");
        assert!(!backup_path(&dir.join("esd.log"), 1).exists());
    }

    #[test]
    fn rotation_produces_a_numbered_backup() {
        let dir = scratch_dir("rotate");
        let mut writer = RotatingFileWriter::new(&dir, "esd.log").unwrap();
        {
            let mut inner = writer.inner.lock().unwrap();
            inner.written = MAX_BYTES;
        }
        writer.write_all(b"triggers rotation\n").unwrap();
        assert!(backup_path(&dir.join("esd.log"), 1).exists());
    }
}
