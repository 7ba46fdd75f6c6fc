// EN: src/notify.rs

//! Notification collaborator.
//!
//! Executors hand finished-action reports to a [`Notifier`]. Delivery is fire-and-forget
//! from the executor's perspective: a failing notifier is logged, never turned into an
//! action failure.

use chrono::Local;
use colored::Colorize;
use std::fmt;
use std::io::{self, Write};
use thiserror::Error;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Neutral information.
    Info,
    /// The action completed and produced output.
    Success,
    /// Something worth attention that is not a failure.
    Warning,
    /// The action failed.
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        f.write_str(name)
    }
}

/// One message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: Level,
    /// Short headline, usually the action description.
    pub title: String,
    /// Message body (for scripts, the captured output).
    pub body: String,
}

impl Notification {
    /// Builds a notification.
    pub fn new(level: Level, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Why a notification could not be delivered.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// No delivery channel exists here.
    #[error("Notifier is not available on this system.")]
    Unavailable,
    /// Writing the notification failed.
    #[error("Failed to deliver notification: {0}")]
    Io(#[from] io::Error),
}

/// Delivers notifications. Implementations must be cheap to share between threads.
pub trait Notifier: fmt::Debug + Send + Sync {
    /// Sends one notification.
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to stderr as timestamped, colored lines.
#[derive(Debug, Clone)]
pub struct ConsoleNotifier {
    max_body_len: usize,
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self { max_body_len: 2048 }
    }
}

impl ConsoleNotifier {
    /// A console notifier that clips bodies longer than `max_body_len` bytes.
    pub fn with_max_body_len(max_body_len: usize) -> Self {
        Self { max_body_len }
    }

    fn render(&self, notification: &Notification) -> String {
        let prefix = match notification.level {
            Level::Info => "[INFO]".cyan(),
            Level::Success => "[SUCCESS]".green(),
            Level::Warning => "[WARN]".yellow(),
            Level::Error => "[ERROR]".red(),
        };
        let mut line = format!(
            "[{}] {} {}",
            Local::now().format("%H:%M:%S"),
            prefix.bold(),
            notification.title
        );
        let body = clip(notification.body.trim_end(), self.max_body_len);
        if !body.is_empty() {
            for body_line in body.lines() {
                line.push_str("\n        ");
                line.push_str(body_line);
            }
        }
        line
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let rendered = self.render(notification);
        let mut stderr = io::stderr().lock();
        writeln!(stderr, "{}", rendered)?;
        Ok(())
    }
}

/// Cuts `text` to at most `max` bytes on a char boundary, marking the cut.
fn clip(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", text.get(..end).unwrap_or_default())
}
