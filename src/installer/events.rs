//! Installer event stream
//!
//! The dispatcher communicates exclusively through these events plus its
//! boolean outcomes. Consumers (CLI, GUI, tests) receive them over a
//! standard mpsc channel; nothing in the installer touches presentation
//! state directly.

use chrono::Local;
use std::sync::mpsc::Sender;

/// Severity of a log event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One timestamped log line
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

/// Events emitted by the installer worker
#[derive(Debug, Clone)]
pub enum InstallerEvent {
    Log(LogEvent),
    /// Batch progress in [0.0, 1.0]
    Progress(f32),
    /// Short status line for the presentation layer
    Status(String),
    /// Byte-level progress of the current download
    Download { downloaded: u64, total: u64 },
    /// Outcome of one catalog entry
    AppResult {
        id: String,
        name: String,
        success: bool,
    },
    /// Batch finished
    Done { completed: usize, total: usize },
}

/// Sends events to the presentation side and mirrors log lines to the
/// `log` facade. Cloneable so helpers can share one channel.
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<InstallerEvent>,
}

impl EventSender {
    pub fn new(tx: Sender<InstallerEvent>) -> Self {
        Self { tx }
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Error => log::error!("{}", message),
            LogLevel::Warning => log::warn!("{}", message),
            _ => log::info!("{}", message),
        }

        let event = LogEvent {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            level,
            message,
        };
        // The receiver side may already be gone when the window closes
        let _ = self.tx.send(InstallerEvent::Log(event));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.log(LogLevel::Success, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    pub fn progress(&self, fraction: f32) {
        let _ = self
            .tx
            .send(InstallerEvent::Progress(fraction.clamp(0.0, 1.0)));
    }

    pub fn status(&self, status: impl Into<String>) {
        let _ = self.tx.send(InstallerEvent::Status(status.into()));
    }

    pub fn download_progress(&self, downloaded: u64, total: u64) {
        let _ = self
            .tx
            .send(InstallerEvent::Download { downloaded, total });
    }

    pub fn app_result(&self, id: &str, name: &str, success: bool) {
        let _ = self.tx.send(InstallerEvent::AppResult {
            id: id.to_string(),
            name: name.to_string(),
            success,
        });
    }

    pub fn done(&self, completed: usize, total: usize) {
        let _ = self.tx.send(InstallerEvent::Done { completed, total });
    }
}
