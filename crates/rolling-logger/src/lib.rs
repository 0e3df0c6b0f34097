//! Rolling Logger
//!
//! File logger for the app backend. Lines go to `<app>.log` in the log
//! directory; when the file exceeds its size cap it is rotated to
//! `<app>.1.log`, `<app>.2.log`, ... and the oldest file is dropped.
//! The most recent lines are also kept in memory so they can be shown
//! without touching the filesystem.
//!
//! `log` records are bridged into `tracing`, so backend code can use
//! either facade.

use std::collections::VecDeque;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default size at which the active file is rotated.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;
/// Default number of rotated files kept next to the active one.
pub const DEFAULT_MAX_FILES: usize = 3;
/// Default number of lines kept in the in-memory buffer.
pub const DEFAULT_BUFFER_LINES: usize = 500;

static LOGGER: OnceLock<RollingWriter> = OnceLock::new();

/// Logger errors
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("log file error: {0}")]
    Io(#[from] io::Error),
    #[error("logger already initialized")]
    AlreadyInitialized,
    #[error("logger not initialized")]
    NotInitialized,
}

/// Rotation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingOptions {
    pub max_file_bytes: u64,
    pub max_files: usize,
    pub buffer_lines: usize,
}

impl Default for RollingOptions {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_files: DEFAULT_MAX_FILES,
            buffer_lines: DEFAULT_BUFFER_LINES,
        }
    }
}

struct RollingState {
    dir: PathBuf,
    app_name: String,
    options: RollingOptions,
    file: File,
    written: u64,
    recent: VecDeque<String>,
    partial: String,
}

impl RollingState {
    fn active_path(dir: &Path, app_name: &str) -> PathBuf {
        dir.join(format!("{}.log", app_name))
    }

    fn rotated_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.{}.log", self.app_name, index))
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.options.max_files == 0 {
            self.file = File::create(Self::active_path(&self.dir, &self.app_name))?;
            self.written = 0;
            return Ok(());
        }

        let oldest = self.rotated_path(self.options.max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.options.max_files).rev() {
            let from = self.rotated_path(index);
            if from.exists() {
                fs::rename(&from, self.rotated_path(index + 1))?;
            }
        }
        let active = Self::active_path(&self.dir, &self.app_name);
        fs::rename(&active, self.rotated_path(1))?;

        self.file = File::create(&active)?;
        self.written = 0;
        Ok(())
    }

    fn remember(&mut self, chunk: &[u8]) {
        self.partial.push_str(&String::from_utf8_lossy(chunk));
        while let Some(pos) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=pos).collect();
            let line = line.trim_end_matches(['\n', '\r']).to_string();
            if self.options.buffer_lines == 0 {
                continue;
            }
            if self.recent.len() == self.options.buffer_lines {
                self.recent.pop_front();
            }
            self.recent.push_back(line);
        }
    }

    fn write_chunk(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.options.max_file_bytes {
            self.rotate()?;
        }
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;
        self.remember(buf);
        Ok(buf.len())
    }
}

fn tail_lines(path: &Path, limit: usize) -> io::Result<VecDeque<String>> {
    let content = fs::read(path)?;
    let content = String::from_utf8_lossy(&content);
    let lines: Vec<&str> = content.lines().collect();
    let skip = lines.len().saturating_sub(limit);
    Ok(lines[skip..].iter().map(|line| line.to_string()).collect())
}

/// Shared handle to the active log file and its line buffer.
#[derive(Clone)]
pub struct RollingWriter {
    state: Arc<Mutex<RollingState>>,
}

impl RollingWriter {
    /// Open (or create) `<dir>/<app_name>.log` for appending. The line
    /// buffer starts with the tail of what the file already holds.
    pub fn open(dir: impl Into<PathBuf>, app_name: &str, options: RollingOptions) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let path = RollingState::active_path(&dir, app_name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        let recent = if written > 0 {
            tail_lines(&path, options.buffer_lines)?
        } else {
            VecDeque::new()
        };

        Ok(Self {
            state: Arc::new(Mutex::new(RollingState {
                dir,
                app_name: app_name.to_string(),
                options,
                file,
                written,
                recent,
                partial: String::new(),
            })),
        })
    }

    /// Up to `limit` most recent complete lines, oldest first.
    pub fn recent_lines(&self, limit: usize) -> Vec<String> {
        let Ok(state) = self.state.lock() else {
            return Vec::new();
        };
        let skip = state.recent.len().saturating_sub(limit);
        state.recent.iter().skip(skip).cloned().collect()
    }

    /// Path of the file currently being written.
    pub fn active_path(&self) -> Option<PathBuf> {
        let state = self.state.lock().ok()?;
        Some(RollingState::active_path(&state.dir, &state.app_name))
    }
}

impl fmt::Debug for RollingWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RollingWriter").finish_non_exhaustive()
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;
        state.write_chunk(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;
        state.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Initialize the global logger with default rotation settings.
///
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_logger(log_dir: impl Into<PathBuf>, app_name: &str) -> Result<(), LoggerError> {
    init_logger_with(log_dir, app_name, RollingOptions::default())
}

/// Initialize the global logger.
pub fn init_logger_with(
    log_dir: impl Into<PathBuf>,
    app_name: &str,
    options: RollingOptions,
) -> Result<(), LoggerError> {
    if LOGGER.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }
    let writer = RollingWriter::open(log_dir, app_name, options)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer.clone())
        .finish();

    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Info)
                .with_tag(app_name),
        );
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|_| LoggerError::AlreadyInitialized)?;
    }

    #[cfg(not(target_os = "android"))]
    subscriber
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    LOGGER
        .set(writer)
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    tracing::info!(
        started_at = %chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        "{} logger started",
        app_name
    );
    Ok(())
}

fn ensure_initialized() -> Result<(), LoggerError> {
    if LOGGER.get().is_some() {
        Ok(())
    } else {
        Err(LoggerError::NotInitialized)
    }
}

/// Log an info line.
pub fn info(msg: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::info!("{}", msg);
    Ok(())
}

/// Most recent lines of the global logger's active file, including lines
/// written before this process opened it.
pub fn recent_lines(limit: usize) -> Vec<String> {
    LOGGER
        .get()
        .map(|writer| writer.recent_lines(limit))
        .unwrap_or_default()
}

/// Path of the global logger's active file.
pub fn log_file_path() -> Option<PathBuf> {
    LOGGER.get().and_then(RollingWriter::active_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(max_file_bytes: u64, max_files: usize, buffer_lines: usize) -> RollingOptions {
        RollingOptions {
            max_file_bytes,
            max_files,
            buffer_lines,
        }
    }

    #[test]
    fn test_writes_to_active_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RollingWriter::open(dir.path(), "App", RollingOptions::default()).unwrap();

        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();

        let content = fs::read_to_string(dir.path().join("App.log")).unwrap();
        assert_eq!(content, "hello\n");
    }

    #[test]
    fn test_rotates_when_full() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RollingWriter::open(dir.path(), "App", small(10, 2, 10)).unwrap();

        writer.write_all(b"first...\n").unwrap();
        writer.write_all(b"second..\n").unwrap();
        writer.write_all(b"third...\n").unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("App.log")).unwrap(), "third...\n");
        assert_eq!(fs::read_to_string(dir.path().join("App.1.log")).unwrap(), "second..\n");
        assert_eq!(fs::read_to_string(dir.path().join("App.2.log")).unwrap(), "first...\n");
    }

    #[test]
    fn test_drops_oldest_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RollingWriter::open(dir.path(), "App", small(4, 1, 10)).unwrap();

        for line in ["aaa\n", "bbb\n", "ccc\n"] {
            writer.write_all(line.as_bytes()).unwrap();
        }

        assert!(!dir.path().join("App.2.log").exists());
        assert_eq!(fs::read_to_string(dir.path().join("App.1.log")).unwrap(), "bbb\n");
    }

    #[test]
    fn test_circular_buffer_keeps_latest_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RollingWriter::open(dir.path(), "App", small(1024, 1, 2)).unwrap();

        writer.write_all(b"one\ntwo\n").unwrap();
        writer.write_all(b"thr").unwrap();
        writer.write_all(b"ee\n").unwrap();

        assert_eq!(writer.recent_lines(10), vec!["two".to_string(), "three".to_string()]);
        assert_eq!(writer.recent_lines(1), vec!["three".to_string()]);
    }

    #[test]
    fn test_reopen_restores_recent_lines() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut writer = RollingWriter::open(dir.path(), "App", small(1024, 1, 10)).unwrap();
            writer.write_all(b"one\ntwo\nthree\n").unwrap();
            writer.flush().unwrap();
        }

        let mut writer = RollingWriter::open(dir.path(), "App", small(1024, 1, 2)).unwrap();
        assert_eq!(writer.recent_lines(10), vec!["two".to_string(), "three".to_string()]);

        writer.write_all(b"four\n").unwrap();
        assert_eq!(writer.recent_lines(10), vec!["three".to_string(), "four".to_string()]);
    }

    #[test]
    fn test_helpers_require_init() {
        if LOGGER.get().is_none() {
            assert!(matches!(info("x"), Err(LoggerError::NotInitialized)));
        }
    }
}
