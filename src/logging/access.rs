//! Access logging decoupled from request handling.
//!
//! Request handlers never touch the log file. They push [`LogEntry`] values
//! into an unbounded channel through a cheap clonable [`AccessLog`] handle;
//! a single writer task owns the file and appends one line per entry to the
//! current day's `{YYYY-MM-DD}.log`. When every handle is dropped the writer
//! drains the queue to completion before exiting, so a graceful shutdown
//! loses no entries.

use chrono::{DateTime, Local};
use std::path::PathBuf;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Extra information attached to a log entry.
#[derive(Debug, Clone)]
pub enum LogDetail {
    /// A POST body, logged verbatim
    Body(String),
    /// What went wrong with the request
    Error(String),
}

/// One access-log line, created by a handler and consumed exactly once by
/// the writer task.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub client_ip: String,
    pub method: String,
    pub path: String,
    pub detail: Option<LogDetail>,
}

impl LogEntry {
    pub fn new(client_ip: &str, method: &str, path: &str) -> Self {
        Self {
            timestamp: Local::now(),
            client_ip: client_ip.to_string(),
            method: method.to_string(),
            path: path.to_string(),
            detail: None,
        }
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.detail = Some(LogDetail::Body(body));
        self
    }

    pub fn with_error(mut self, detail: String) -> Self {
        self.detail = Some(LogDetail::Error(detail));
        self
    }

    /// `[{timestamp}] {ip} - {method} {path}[ - Body: ...| - Error: ...]`
    fn format_line(&self) -> String {
        let mut line = format!(
            "[{}] {} - {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.client_ip,
            self.method,
            self.path,
        );

        match &self.detail {
            Some(LogDetail::Body(body)) => {
                line.push_str(" - Body: ");
                line.push_str(body);
            }
            Some(LogDetail::Error(detail)) => {
                line.push_str(" - Error: ");
                line.push_str(detail);
            }
            None => {}
        }

        line.push('\n');
        line
    }
}

/// Producer side of the access log.
///
/// `record` never blocks and never fails from the caller's view; the queue
/// is bounded only by memory.
#[derive(Clone)]
pub struct AccessLog {
    tx: mpsc::UnboundedSender<LogEntry>,
}

impl AccessLog {
    pub fn record(&self, entry: LogEntry) {
        // Send only fails once the writer task is gone, during shutdown;
        // entries are dropped then rather than surfacing an error.
        let _ = self.tx.send(entry);
    }
}

/// Starts the single writer task appending into `dir`.
///
/// Returns the producer handle and the writer's join handle. Awaiting the
/// join handle after dropping every producer clone waits for the queue to
/// drain.
pub fn start(dir: impl Into<PathBuf>) -> (AccessLog, JoinHandle<()>) {
    let dir = dir.into();
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(write_loop(dir, rx));
    (AccessLog { tx }, handle)
}

async fn write_loop(dir: PathBuf, mut rx: mpsc::UnboundedReceiver<LogEntry>) {
    // The target file is named from the date at write time, not enqueue
    // time: an entry queued just before midnight can land in the next
    // day's file. The open handle is reused until the date rolls over.
    let mut current: Option<(String, File)> = None;

    while let Some(entry) = rx.recv().await {
        let day = Local::now().format("%Y-%m-%d").to_string();

        let stale = match &current {
            Some((open_day, _)) => *open_day != day,
            None => true,
        };
        if stale {
            let path = dir.join(format!("{day}.log"));
            match OpenOptions::new().create(true).append(true).open(&path).await {
                Ok(file) => current = Some((day, file)),
                Err(e) => {
                    tracing::error!("failed to open access log {}: {}", path.display(), e);
                    current = None;
                    continue;
                }
            }
        }

        if let Some((_, file)) = &mut current {
            // One write per line; the single consumer guarantees lines are
            // never interleaved mid-line.
            let line = entry.format_line();
            if let Err(e) = file.write_all(line.as_bytes()).await {
                tracing::error!("failed to append access log line: {}", e);
            }
        }
    }

    // Channel closed and fully drained.
    if let Some((_, mut file)) = current {
        let _ = file.flush().await;
    }
}
