//! Active survey selection.
//!
//! Screens never look up the active survey on their own. The binary picks a
//! [`SurveySource`] (fixed value or watched file) and hands the current id to
//! whatever needs it; [`SurveyWatcher`] turns a polled source into change
//! notifications.

use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Identifier of a survey campaign.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurveyId(String);

impl SurveyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SurveyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurveyError {
    /// The source could not be read.
    Io(String),
}

impl fmt::Display for SurveyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurveyError::Io(msg) => write!(f, "survey source I/O error: {}", msg),
        }
    }
}

impl std::error::Error for SurveyError {}

impl From<std::io::Error> for SurveyError {
    fn from(e: std::io::Error) -> Self {
        SurveyError::Io(e.to_string())
    }
}

/// Where the active survey id comes from.
pub trait SurveySource {
    /// Currently selected survey, `None` when nothing is selected.
    fn active_survey(&self) -> Result<Option<SurveyId>, SurveyError>;
}

impl<T: SurveySource + ?Sized> SurveySource for Box<T> {
    fn active_survey(&self) -> Result<Option<SurveyId>, SurveyError> {
        (**self).active_survey()
    }
}

/// Constant selection, e.g. from the command line.
#[derive(Debug, Clone, Default)]
pub struct FixedSurveySource(pub Option<SurveyId>);

impl SurveySource for FixedSurveySource {
    fn active_survey(&self) -> Result<Option<SurveyId>, SurveyError> {
        Ok(self.0.clone())
    }
}

/// Reads the id from the first non-empty line of a text file.
/// A missing or blank file means no survey is selected.
#[derive(Debug, Clone)]
pub struct FileSurveySource {
    path: PathBuf,
}

impl FileSurveySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SurveySource for FileSurveySource {
    fn active_survey(&self) -> Result<Option<SurveyId>, SurveyError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(SurveyId::new))
    }
}

/// Active survey transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyChange {
    pub previous: Option<SurveyId>,
    pub current: Option<SurveyId>,
}

/// Polls a [`SurveySource`] on a background thread and reports changes.
///
/// The first successful read is always reported. Read errors are logged and
/// do not count as a change. The thread exits when the watcher is dropped.
pub struct SurveyWatcher {
    rx: Receiver<SurveyChange>,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SurveyWatcher {
    pub fn spawn<S>(source: S, interval: Duration) -> Self
    where
        S: SurveySource + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            let mut last: Option<Option<SurveyId>> = None;
            loop {
                match source.active_survey() {
                    Ok(current) => {
                        if last.as_ref() != Some(&current) {
                            let change = SurveyChange {
                                previous: last.take().flatten(),
                                current: current.clone(),
                            };
                            debug!(
                                "Active survey changed: {:?} -> {:?}",
                                change.previous, change.current
                            );
                            if tx.send(change).is_err() {
                                break;
                            }
                            last = Some(current);
                        }
                    }
                    Err(e) => warn!("Failed to read active survey: {}", e),
                }
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    _ => break,
                }
            }
        });

        Self {
            rx,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Next pending change, without blocking.
    pub fn try_recv(&self) -> Option<SurveyChange> {
        self.rx.try_recv().ok()
    }

    /// Waits up to `timeout` for the next change.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<SurveyChange> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl Drop for SurveyWatcher {
    fn drop(&mut self) {
        // Disconnecting the stop channel wakes the poller immediately.
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const WAIT: Duration = Duration::from_secs(2);
    const POLL: Duration = Duration::from_millis(10);

    #[test]
    fn test_file_source_first_non_empty_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("active_survey");
        std::fs::write(&path, "\n   \n  S-2024-07  \nS-other\n").unwrap();
        let source = FileSurveySource::new(&path);
        assert_eq!(source.active_survey(), Ok(Some(SurveyId::new("S-2024-07"))));
    }

    #[test]
    fn test_file_source_missing_or_blank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("active_survey");
        let source = FileSurveySource::new(&path);
        assert_eq!(source.active_survey(), Ok(None));
        std::fs::write(&path, "  \n").unwrap();
        assert_eq!(source.active_survey(), Ok(None));
    }

    #[test]
    fn test_file_source_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSurveySource::new(dir.path());
        assert!(source.active_survey().is_err());
    }

    #[test]
    fn test_fixed_source() {
        let source = FixedSurveySource(Some(SurveyId::new("S-1")));
        assert_eq!(source.active_survey(), Ok(Some(SurveyId::new("S-1"))));
    }

    #[derive(Clone)]
    struct SharedSource(Arc<Mutex<Option<SurveyId>>>);

    impl SurveySource for SharedSource {
        fn active_survey(&self) -> Result<Option<SurveyId>, SurveyError> {
            Ok(self.0.lock().unwrap().clone())
        }
    }

    #[test]
    fn test_watcher_reports_initial_then_changes_only() {
        let shared = SharedSource(Arc::new(Mutex::new(Some(SurveyId::new("S-1")))));
        let watcher = SurveyWatcher::spawn(shared.clone(), POLL);

        let initial = watcher.recv_timeout(WAIT).unwrap();
        assert_eq!(initial.previous, None);
        assert_eq!(initial.current, Some(SurveyId::new("S-1")));

        // Several polls with the same value produce nothing.
        thread::sleep(POLL * 5);
        assert!(watcher.try_recv().is_none());

        *shared.0.lock().unwrap() = Some(SurveyId::new("S-2"));
        let change = watcher.recv_timeout(WAIT).unwrap();
        assert_eq!(change.previous, Some(SurveyId::new("S-1")));
        assert_eq!(change.current, Some(SurveyId::new("S-2")));

        *shared.0.lock().unwrap() = None;
        let cleared = watcher.recv_timeout(WAIT).unwrap();
        assert_eq!(cleared.previous, Some(SurveyId::new("S-2")));
        assert_eq!(cleared.current, None);
    }

    #[test]
    fn test_watcher_reports_initial_none() {
        let watcher = SurveyWatcher::spawn(FixedSurveySource(None), POLL);
        let initial = watcher.recv_timeout(WAIT).unwrap();
        assert_eq!(
            initial,
            SurveyChange {
                previous: None,
                current: None
            }
        );
    }

    #[test]
    fn test_watcher_follows_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("active_survey");
        std::fs::write(&path, "S-A\n").unwrap();
        let watcher = SurveyWatcher::spawn(FileSurveySource::new(&path), POLL);
        assert_eq!(
            watcher.recv_timeout(WAIT).unwrap().current,
            Some(SurveyId::new("S-A"))
        );
        std::fs::write(&path, "S-B\n").unwrap();
        assert_eq!(
            watcher.recv_timeout(WAIT).unwrap().current,
            Some(SurveyId::new("S-B"))
        );
    }

    #[test]
    fn test_watcher_drop_stops_thread() {
        let watcher = SurveyWatcher::spawn(FixedSurveySource(None), Duration::from_secs(3600));
        assert!(watcher.recv_timeout(WAIT).is_some());
        // Would block for an hour if the poller ignored the drop.
        drop(watcher);
    }
}
