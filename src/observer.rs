// src/observer.rs

//! Conversion observers
//!
//! Components never configure logging themselves. Instead an observer is
//! handed to the repair engine and the converter, and every notable event
//! (job state transitions, renames, permission fixups, failures) is reported
//! through it.
//!
//! Implementations:
//! - `LogObserver`: structured logging through tracing
//! - `SilentObserver`: no-op for quiet mode
//! - `CallbackObserver`: forwards [`ConversionEvent`]s to a closure
//!
//! # Example
//!
//! ```ignore
//! use rdiff2restic::observer::{CallbackObserver, ConversionEvent};
//!
//! let observer = CallbackObserver::new(|event| {
//!     if let ConversionEvent::Renamed { to, .. } = event {
//!         println!("renamed to {}", to.display());
//!     }
//! });
//! ```

use crate::conversion::JobState;
use crate::timestamp::Timestamp;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Receiver for conversion and repair events
pub trait ConversionObserver {
    /// A job entered a new state
    fn job_state(&self, timestamp: &Timestamp, state: JobState);

    /// A job failed while in `step`
    fn job_failed(&self, timestamp: &Timestamp, step: JobState, error: &str);

    /// An entry was (or, in dry run, would be) renamed
    fn renamed(&self, from: &Path, to: &Path, dry_run: bool);

    /// A directory lacked owner-write permission
    ///
    /// `granted` is false in dry run, where the permission is only checked.
    fn not_writable(&self, dir: &Path, granted: bool);

    /// A working directory could not be removed and was left behind
    fn cleanup_failed(&self, dir: &Path, error: &str);

    /// Free form status message
    fn message(&self, message: &str);
}

/// Silent observer (no-op)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl ConversionObserver for SilentObserver {
    fn job_state(&self, _timestamp: &Timestamp, _state: JobState) {}

    fn job_failed(&self, _timestamp: &Timestamp, _step: JobState, _error: &str) {}

    fn renamed(&self, _from: &Path, _to: &Path, _dry_run: bool) {}

    fn not_writable(&self, _dir: &Path, _granted: bool) {}

    fn cleanup_failed(&self, _dir: &Path, _error: &str) {}

    fn message(&self, _message: &str) {}
}

/// Logging observer
///
/// Job transitions and messages are logged at info level, individual renames
/// at debug level unless they are dry-run findings.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ConversionObserver for LogObserver {
    fn job_state(&self, timestamp: &Timestamp, state: JobState) {
        info!("[{}] {}", timestamp, state);
    }

    fn job_failed(&self, timestamp: &Timestamp, step: JobState, error: &str) {
        error!("[{}] failed during {}: {}", timestamp, step, error);
    }

    fn renamed(&self, from: &Path, to: &Path, dry_run: bool) {
        if dry_run {
            info!("Would rename {} => {}", from.display(), to.display());
        } else {
            debug!("Rename {} => {}", from.display(), to.display());
        }
    }

    fn not_writable(&self, dir: &Path, granted: bool) {
        if granted {
            warn!("Granted owner write permission on {}", dir.display());
        } else {
            warn!("Directory is not writable: {}", dir.display());
        }
    }

    fn cleanup_failed(&self, dir: &Path, error: &str) {
        warn!("Failed to remove working directory {}: {}", dir.display(), error);
    }

    fn message(&self, message: &str) {
        info!("{}", message);
    }
}

/// Events emitted by the callback observer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionEvent {
    State {
        timestamp: Timestamp,
        state: JobState,
    },
    Failed {
        timestamp: Timestamp,
        step: JobState,
        error: String,
    },
    Renamed {
        from: PathBuf,
        to: PathBuf,
        dry_run: bool,
    },
    NotWritable {
        dir: PathBuf,
        granted: bool,
    },
    CleanupFailed {
        dir: PathBuf,
        error: String,
    },
    Message(String),
}

/// Callback-based observer
///
/// Calls a user-provided function for every event.
pub struct CallbackObserver<F>
where
    F: Fn(ConversionEvent),
{
    callback: F,
}

impl<F> CallbackObserver<F>
where
    F: Fn(ConversionEvent),
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ConversionObserver for CallbackObserver<F>
where
    F: Fn(ConversionEvent),
{
    fn job_state(&self, timestamp: &Timestamp, state: JobState) {
        (self.callback)(ConversionEvent::State {
            timestamp: timestamp.clone(),
            state,
        });
    }

    fn job_failed(&self, timestamp: &Timestamp, step: JobState, error: &str) {
        (self.callback)(ConversionEvent::Failed {
            timestamp: timestamp.clone(),
            step,
            error: error.to_string(),
        });
    }

    fn renamed(&self, from: &Path, to: &Path, dry_run: bool) {
        (self.callback)(ConversionEvent::Renamed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            dry_run,
        });
    }

    fn not_writable(&self, dir: &Path, granted: bool) {
        (self.callback)(ConversionEvent::NotWritable {
            dir: dir.to_path_buf(),
            granted,
        });
    }

    fn cleanup_failed(&self, dir: &Path, error: &str) {
        (self.callback)(ConversionEvent::CleanupFailed {
            dir: dir.to_path_buf(),
            error: error.to_string(),
        });
    }

    fn message(&self, message: &str) {
        (self.callback)(ConversionEvent::Message(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_callback_observer_forwards_events() {
        let events = RefCell::new(Vec::new());
        let observer = CallbackObserver::new(|e| events.borrow_mut().push(e));
        let ts = Timestamp::parse("2015-10-01T08:00:00").unwrap();

        observer.job_state(&ts, JobState::Restoring);
        observer.renamed(Path::new("/a"), Path::new("/b"), true);
        observer.message("done");

        let events = events.into_inner();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            ConversionEvent::State {
                timestamp: ts,
                state: JobState::Restoring
            }
        );
        assert!(matches!(events[1], ConversionEvent::Renamed { dry_run: true, .. }));
        assert_eq!(events[2], ConversionEvent::Message("done".to_string()));
    }

    #[test]
    fn test_silent_and_log_observers_accept_events() {
        let ts = Timestamp::parse("2015-10-01T08:00:00").unwrap();
        let observers: [&dyn ConversionObserver; 2] = [&SilentObserver, &LogObserver];
        for observer in observers {
            observer.job_state(&ts, JobState::Done);
            observer.job_failed(&ts, JobState::Snapshotting, "boom");
            observer.not_writable(Path::new("/ro"), false);
            observer.cleanup_failed(Path::new("/tmp/rdiff2restic-x"), "permission denied");
        }
    }

    #[test]
    fn test_callback_observer_cleanup_failure() {
        let events = RefCell::new(Vec::new());
        let observer = CallbackObserver::new(|e| events.borrow_mut().push(e));

        observer.cleanup_failed(Path::new("/tmp/rdiff2restic-x"), "permission denied");

        assert_eq!(
            events.into_inner(),
            vec![ConversionEvent::CleanupFailed {
                dir: PathBuf::from("/tmp/rdiff2restic-x"),
                error: "permission denied".to_string(),
            }]
        );
    }
}
