//! Debounced re-rendering of a watched file.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Default quiet period before a change is acted upon.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Single-shot deadline restarted by every change.
///
/// Bursts of changes collapse into one notification once no new change
/// arrived for the whole delay.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Records a change, pushing the deadline back.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Time left until the pending deadline, `None` when idle.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Returns true once when the deadline has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

/// Calls `on_change` after `path` changed and then stayed quiet for `delay`.
///
/// The parent directory is watched so editors that save by renaming a
/// temporary file are noticed too. `on_change` runs on the calling thread,
/// so invocations never overlap; its errors are logged and watching goes
/// on. Returns when the watcher shuts down.
///
/// # Errors
///
/// Returns error if the file name cannot be determined or the watcher
/// cannot be started
pub fn watch_file(
    path: &Path,
    delay: Duration,
    mut on_change: impl FnMut() -> Result<()>,
) -> Result<()> {
    let path = std::path::absolute(path)
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    let file_name = path
        .file_name()
        .with_context(|| format!("Not a file path: {}", path.display()))?
        .to_os_string();
    let dir = path
        .parent()
        .with_context(|| format!("No parent directory: {}", path.display()))?;

    let (tx, rx) = mpsc::channel();
    let mut watcher = RecommendedWatcher::new(tx, notify::Config::default())
        .context("Failed to create file watcher")?;
    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", dir.display()))?;

    tracing::info!(
        path = %path.display(),
        delay_ms = delay.as_millis() as u64,
        "Watching for changes"
    );

    let mut debouncer = Debouncer::new(delay);

    loop {
        let event = match debouncer.remaining(Instant::now()) {
            Some(timeout) => rx.recv_timeout(timeout),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match event {
            Ok(Ok(event)) => {
                if is_relevant(&event, &file_name) {
                    tracing::debug!(kind = ?event.kind, "File changed");
                    debouncer.trigger(Instant::now());
                }
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "File watcher error");
            }
            Err(RecvTimeoutError::Timeout) => {
                if debouncer.fire(Instant::now())
                    && let Err(err) = on_change()
                {
                    tracing::error!("Re-render failed: {err:#}");
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                tracing::debug!("File watcher channel closed");
                break;
            }
        }
    }

    Ok(())
}

/// Create and modify events touching a file with the watched name.
fn is_relevant(event: &Event, file_name: &OsStr) -> bool {
    let kind_matches = matches!(
        event.kind,
        EventKind::Any | EventKind::Create(_) | EventKind::Modify(_) | EventKind::Other
    );

    kind_matches
        && event
            .paths
            .iter()
            .any(|changed| changed.file_name() == Some(file_name))
}
