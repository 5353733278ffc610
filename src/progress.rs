//! Progress reporting for import runs
//!
//! Translates [`ImportEvent`]s into compact JSON lines on stderr so an
//! embedding process (or a curious user) can follow a run. Frequent
//! per-record events are rate limited; errors and terminal events are
//! emitted immediately.

use serde::Serialize;
use std::cell::Cell;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::importer::ImportEvent;
use crate::models::ImportSummary;

/// Start message sent when a run begins
#[derive(Debug, Clone, Serialize)]
pub struct StartMessage {
    /// Message type identifier
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// Number of directories in the run
    pub directories: usize,
}

/// Progress message sent while a run is underway
#[derive(Debug, Clone, Serialize)]
pub struct ProgressMessage {
    /// Message type identifier ("p" for progress)
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// Status line for the event
    pub status: String,
    /// Overall progress fraction in [0, 1]
    #[serde(rename = "f")]
    pub fraction: f64,
    /// Path the event refers to
    pub path: String,
}

/// Error message sent when a directory or record fails
#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    /// Message type identifier ("err" for error)
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// Failed unit of work ("directory" or "record")
    pub scope: &'static str,
    /// Path that caused the error
    pub path: String,
    /// Error message description
    pub message: String,
}

/// Done message sent when a run completes or is cancelled
#[derive(Debug, Clone, Serialize)]
pub struct DoneMessage {
    /// Message type identifier ("done" for completion)
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// Number of directories processed
    #[serde(rename = "dp")]
    pub directories_processed: u64,
    /// Number of directories that failed to scan
    #[serde(rename = "df")]
    pub directories_failed: u64,
    /// Number of records imported
    #[serde(rename = "ri")]
    pub records_imported: u64,
    /// Number of records that failed to persist
    #[serde(rename = "rf")]
    pub records_failed: u64,
    /// Whether the run was cancelled
    pub cancelled: bool,
    /// Total run duration in milliseconds
    pub ms: u64,
}

impl DoneMessage {
    fn from_summary(seq: u64, ts: u64, summary: &ImportSummary) -> Self {
        Self {
            msg_type: "done",
            seq,
            ts,
            directories_processed: summary.directories_processed,
            directories_failed: summary.directories_failed,
            records_imported: summary.records_imported,
            records_failed: summary.records_failed,
            cancelled: summary.cancelled,
            ms: summary.duration_ms,
        }
    }
}

/// Reporter turning import events into JSON lines on stderr
pub struct ProgressReporter {
    /// Whether reporting is enabled
    enabled: bool,
    /// Minimum interval between per-record messages in milliseconds
    interval_ms: u64,
    /// Last per-record report time
    last_report: Cell<Instant>,
    /// Sequence number for messages (atomic for thread safety)
    seq: AtomicU64,
    /// Start time of the reporter
    start_time: Instant,
}

impl ProgressReporter {
    /// Create a new reporter
    ///
    /// # Arguments
    /// * `enabled` - Whether reporting is enabled
    /// * `interval_ms` - Minimum interval between per-record messages
    pub fn new(enabled: bool, interval_ms: u64) -> Self {
        let now = Instant::now();
        Self {
            enabled,
            interval_ms,
            last_report: Cell::new(now),
            seq: AtomicU64::new(0),
            start_time: now,
        }
    }

    /// Check if enough time has passed since the last per-record report
    pub fn should_report(&self) -> bool {
        if !self.enabled {
            return false;
        }
        let elapsed = self.last_report.get().elapsed().as_millis() as u64;
        elapsed >= self.interval_ms
    }

    /// Get the next sequence number (monotonically increasing)
    pub fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Get the current timestamp in milliseconds since reporter creation
    pub fn current_timestamp(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Output a serializable message to stderr as JSON
    pub fn output_to_stderr<T: Serialize>(&self, msg: &T) {
        if let Ok(json) = serde_json::to_string(msg) {
            eprintln!("{}", json);
            std::io::stderr().flush().ok();
        }
    }

    /// Check if the reporter is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Report one import event.
    ///
    /// Returns true if a message was actually written. Per-record
    /// `Progress` events respect the interval; everything else is
    /// written immediately.
    pub fn report(&self, event: &ImportEvent) -> bool {
        if !self.enabled {
            return false;
        }

        match event {
            ImportEvent::Started { directories } => {
                let msg = StartMessage {
                    msg_type: "start",
                    seq: self.next_seq(),
                    ts: self.current_timestamp(),
                    directories: *directories,
                };
                self.output_to_stderr(&msg);
                true
            }
            ImportEvent::Progress { path, fraction } => {
                if !self.should_report() {
                    return false;
                }
                let msg = ProgressMessage {
                    msg_type: "p",
                    seq: self.next_seq(),
                    ts: self.current_timestamp(),
                    status: event.status_message(),
                    fraction: *fraction,
                    path: path.clone(),
                };
                self.output_to_stderr(&msg);
                self.last_report.set(Instant::now());
                true
            }
            ImportEvent::ScanningDirectory { path, fraction }
            | ImportEvent::DirectoryDone { path, fraction, .. } => {
                let msg = ProgressMessage {
                    msg_type: "p",
                    seq: self.next_seq(),
                    ts: self.current_timestamp(),
                    status: event.status_message(),
                    fraction: *fraction,
                    path: path.clone(),
                };
                self.output_to_stderr(&msg);
                true
            }
            ImportEvent::DirectoryError { path, message } => {
                self.report_error("directory", path, message);
                true
            }
            ImportEvent::RecordError { path, message } => {
                self.report_error("record", path, message);
                true
            }
            ImportEvent::Completed { summary } | ImportEvent::Cancelled { summary } => {
                let msg =
                    DoneMessage::from_summary(self.next_seq(), self.current_timestamp(), summary);
                self.output_to_stderr(&msg);
                true
            }
        }
    }

    fn report_error(&self, scope: &'static str, path: &str, message: &str) {
        let msg = ErrorMessage {
            msg_type: "err",
            seq: self.next_seq(),
            ts: self.current_timestamp(),
            scope,
            path: path.to_string(),
            message: message.to_string(),
        };
        self.output_to_stderr(&msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_message_serialization() {
        let msg = StartMessage {
            msg_type: "start",
            seq: 1,
            ts: 100,
            directories: 3,
        };
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["_t"], "start");
        assert_eq!(parsed["seq"], 1);
        assert_eq!(parsed["ts"], 100);
        assert_eq!(parsed["directories"], 3);
    }

    #[test]
    fn test_progress_message_serialization() {
        let msg = ProgressMessage {
            msg_type: "p",
            seq: 2,
            ts: 200,
            status: "scanning albums".to_string(),
            fraction: 0.5,
            path: "/music/albums".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["_t"], "p");
        assert_eq!(parsed["seq"], 2);
        assert_eq!(parsed["status"], "scanning albums");
        assert_eq!(parsed["f"], 0.5);
        assert_eq!(parsed["path"], "/music/albums");
    }

    #[test]
    fn test_error_message_serialization() {
        let msg = ErrorMessage {
            msg_type: "err",
            seq: 3,
            ts: 300,
            scope: "directory",
            path: "/music/broken".to_string(),
            message: "permission denied".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["_t"], "err");
        assert_eq!(parsed["scope"], "directory");
        assert_eq!(parsed["path"], "/music/broken");
        assert_eq!(parsed["message"], "permission denied");
    }

    #[test]
    fn test_done_message_from_summary() {
        let summary = ImportSummary {
            directories_processed: 4,
            directories_failed: 1,
            records_imported: 100,
            records_failed: 2,
            cancelled: false,
            duration_ms: 4500,
        };
        let msg = DoneMessage::from_summary(10, 5000, &summary);
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["_t"], "done");
        assert_eq!(parsed["dp"], 4);
        assert_eq!(parsed["df"], 1);
        assert_eq!(parsed["ri"], 100);
        assert_eq!(parsed["rf"], 2);
        assert_eq!(parsed["cancelled"], false);
        assert_eq!(parsed["ms"], 4500);
    }

    #[test]
    fn test_reporter_sequence_numbers() {
        let reporter = ProgressReporter::new(true, 200);

        let seq1 = reporter.next_seq();
        let seq2 = reporter.next_seq();
        let seq3 = reporter.next_seq();

        assert_eq!(seq1, 0);
        assert_eq!(seq2, 1);
        assert_eq!(seq3, 2);
    }

    #[test]
    fn test_reporter_disabled_reports_nothing() {
        let reporter = ProgressReporter::new(false, 200);
        assert!(!reporter.is_enabled());
        assert!(!reporter.should_report());

        let reported = reporter.report(&ImportEvent::Started { directories: 1 });
        assert!(!reported);
    }

    #[test]
    fn test_reporter_rate_limits_progress_events() {
        let reporter = ProgressReporter::new(true, 10_000);
        reporter.last_report.set(Instant::now());

        let event = ImportEvent::Progress {
            path: "/music/a.mp3".to_string(),
            fraction: 0.5,
        };
        assert!(!reporter.report(&event));

        // Terminal events ignore the interval
        let done = ImportEvent::Completed {
            summary: ImportSummary::default(),
        };
        assert!(reporter.report(&done));
    }

    #[test]
    fn test_reporter_errors_bypass_interval() {
        let reporter = ProgressReporter::new(true, 10_000);
        reporter.last_report.set(Instant::now());

        let event = ImportEvent::DirectoryError {
            path: "/music/broken".to_string(),
            message: "boom".to_string(),
        };
        assert!(reporter.report(&event));
    }
}
