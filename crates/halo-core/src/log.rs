//! Append-only file log for the chrome host.
//!
//! Lines go to `<config dir>/logs/halo.log`. Once the file passes its
//! size budget it is shifted to `halo.log.1` (older backups move up one
//! number) and a fresh file is started.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

const FILE_NAME: &str = "halo.log";

static SINK: OnceLock<Sink> = OnceLock::new();

/// `[logging]` section of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Off unless the user opts in.
    pub enabled: bool,
    /// Lowest level written: "debug", "info", "warn" or "error".
    pub level: String,
    /// Size budget of the live file, in megabytes. 0 disables rotation.
    pub max_file_mb: u64,
    /// Rotated files kept next to the live one (at least 1).
    pub backups: u32,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".into(),
            max_file_mb: 10,
            backups: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    /// Parses a level name; unknown names mean `Info`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Self::Debug,
            "warn" | "warning" => Self::Warn,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO ",
            Self::Warn => "WARN ",
            Self::Error => "ERROR",
        }
    }
}

struct Output {
    file: File,
    size: u64,
}

/// A log file with its level filter and rotation policy.
struct Sink {
    path: PathBuf,
    min_level: Level,
    budget: u64,
    backups: u32,
    out: Mutex<Output>,
}

impl Sink {
    fn open(dir: &Path, config: &LogConfig) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(FILE_NAME);
        let file = append(&path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            path,
            min_level: Level::parse(&config.level),
            budget: config.max_file_mb.saturating_mul(1024 * 1024),
            backups: config.backups.max(1),
            out: Mutex::new(Output { file, size }),
        })
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        if level < self.min_level {
            return;
        }
        let line = format_line(clock(), level, std::thread::current().name(), args);
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        if out.file.write_all(line.as_bytes()).is_err() {
            return;
        }
        out.size += line.len() as u64;
        if self.budget > 0 && out.size >= self.budget {
            self.rotate(&mut out);
        }
    }

    fn rotate(&self, out: &mut Output) {
        for n in (1..self.backups).rev() {
            let _ = fs::rename(backup_path(&self.path, n), backup_path(&self.path, n + 1));
        }
        let _ = fs::rename(&self.path, backup_path(&self.path, 1));
        if let Ok(file) = append(&self.path) {
            out.file = file;
        }
        out.size = 0;
    }
}

fn append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn backup_path(path: &Path, n: u32) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{n}"));
    PathBuf::from(name)
}

/// Milliseconds since midnight UTC.
fn clock() -> u64 {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (since_epoch.as_millis() % 86_400_000) as u64
}

fn format_line(ms: u64, level: Level, thread: Option<&str>, args: fmt::Arguments<'_>) -> String {
    let (h, m, s, frac) = (ms / 3_600_000, ms / 60_000 % 60, ms / 1000 % 60, ms % 1000);
    let thread = thread.unwrap_or("?");
    format!("{h:02}:{m:02}:{s:02}.{frac:03} {} {thread}: {args}\n", level.label())
}

/// Installs the process-wide log file. Later calls are ignored, as is a
/// disabled config or a missing config directory.
pub fn init(config: &LogConfig) {
    if !config.enabled || SINK.get().is_some() {
        return;
    }
    let Some(dir) = crate::config::config_dir() else {
        return;
    };
    match Sink::open(&dir.join("logs"), config) {
        Ok(sink) => {
            let _ = SINK.set(sink);
        }
        Err(e) => eprintln!("halo: cannot open log file: {e}"),
    }
}

/// Writes one line through the installed log file, if any.
pub fn write(level: Level, args: fmt::Arguments<'_>) {
    if let Some(sink) = SINK.get() {
        sink.emit(level, args);
    }
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { $crate::log::write($crate::log::Level::Debug, format_args!($($arg)*)) };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { $crate::log::write($crate::log::Level::Info, format_args!($($arg)*)) };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { $crate::log::write($crate::log::Level::Warn, format_args!($($arg)*)) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { $crate::log::write($crate::log::Level::Error, format_args!($($arg)*)) };
}
