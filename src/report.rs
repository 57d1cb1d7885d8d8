//! Diagnostics sink injected into the assembler.
//!
//! The library never installs a global subscriber. It reports through a
//! [`Reporter`], and [`TracingReporter`] forwards to `tracing` so a binary can
//! decide where events go.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Severity of a reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// Structured context attached to a message.
///
/// Unset fields are omitted from the emitted event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fields<'a> {
    /// Book title, scoped to the volume.
    pub title: Option<&'a str>,
    /// Volume label.
    pub volume: Option<&'a str>,
    /// File being read or written.
    pub path: Option<&'a Path>,
}

impl<'a> Fields<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn with_volume(mut self, volume: &'a str) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_path(mut self, path: &'a Path) -> Self {
        self.path = Some(path);
        self
    }
}

/// Receives progress and diagnostic messages.
pub trait Reporter: Send + Sync {
    fn report(&self, level: Level, message: &str, fields: &Fields<'_>);

    fn debug(&self, message: &str, fields: &Fields<'_>) {
        self.report(Level::Debug, message, fields);
    }

    fn info(&self, message: &str, fields: &Fields<'_>) {
        self.report(Level::Info, message, fields);
    }

    fn warn(&self, message: &str, fields: &Fields<'_>) {
        self.report(Level::Warn, message, fields);
    }

    fn error(&self, message: &str, fields: &Fields<'_>) {
        self.report(Level::Error, message, fields);
    }
}

/// Forwards messages to `tracing` events under the `novel_binder` target.
///
/// Fields become event fields named `title`, `volume` and `path`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, level: Level, message: &str, fields: &Fields<'_>) {
        let path = fields.path.map(|p| p.display().to_string());
        let (title, volume, path) = (fields.title, fields.volume, path.as_deref());
        match level {
            Level::Debug => tracing::debug!(target: "novel_binder", title, volume, path, "{message}"),
            Level::Info => tracing::info!(target: "novel_binder", title, volume, path, "{message}"),
            Level::Warn => tracing::warn!(target: "novel_binder", title, volume, path, "{message}"),
            Level::Error => tracing::error!(target: "novel_binder", title, volume, path, "{message}"),
        }
    }
}

/// A message captured by [`MemoryReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub level: Level,
    pub message: String,
    pub title: Option<String>,
    pub volume: Option<String>,
    pub path: Option<PathBuf>,
}

/// Collects messages in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: Mutex<Vec<Entry>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn entries(&self) -> Vec<Entry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Messages reported at exactly `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, level: Level, message: &str, fields: &Fields<'_>) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.push(Entry {
            level,
            message: message.to_string(),
            title: fields.title.map(str::to_string),
            volume: fields.volume.map(str::to_string),
            path: fields.path.map(Path::to_path_buf),
        });
    }
}
