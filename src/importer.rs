//! Import coordinator - orchestrates one import run over root directories
//!
//! The coordinator walks the requested directories in order, scans each
//! through a [`MediaScanner`], persists every returned record through a
//! [`RecordStore`], records the root as scanned, and reports progress
//! as a stream of [`ImportEvent`]s. A single directory's failure never
//! aborts the run.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::db::RecordStore;
use crate::models::ImportSummary;
use crate::scanner::MediaScanner;

/// Maximum number of events that may queue up in the channel.
///
/// A consumer that stops draining back-pressures the worker instead of
/// growing the heap without bound.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Progress and status events emitted during an import run
#[derive(Debug, Clone)]
pub enum ImportEvent {
    /// The run started with the given number of directories
    Started { directories: usize },
    /// A directory is about to be scanned
    ScanningDirectory { path: String, fraction: f64 },
    /// One record was processed (persisted or counted as failed)
    Progress { path: String, fraction: f64 },
    /// Scanning one directory failed; the run continues
    DirectoryError { path: String, message: String },
    /// Persisting one record failed; the run continues
    RecordError { path: String, message: String },
    /// All records of one directory were processed
    DirectoryDone {
        path: String,
        records: u64,
        fraction: f64,
    },
    /// The run finished
    Completed { summary: ImportSummary },
    /// The run was cancelled; partial persistence stands
    Cancelled { summary: ImportSummary },
}

impl ImportEvent {
    /// The overall progress fraction carried by this event, if any
    pub fn fraction(&self) -> Option<f64> {
        match self {
            ImportEvent::ScanningDirectory { fraction, .. }
            | ImportEvent::Progress { fraction, .. }
            | ImportEvent::DirectoryDone { fraction, .. } => Some(*fraction),
            ImportEvent::Started { .. } => Some(0.0),
            ImportEvent::Completed { .. } => Some(1.0),
            _ => None,
        }
    }

    /// Human-readable status line for this event
    pub fn status_message(&self) -> String {
        match self {
            ImportEvent::Started { directories } => {
                format!("importing {} directories", directories)
            }
            ImportEvent::ScanningDirectory { path, .. } => {
                format!("scanning {}", short_name(path))
            }
            ImportEvent::Progress { path, .. } => {
                format!("importing {}", short_name(path))
            }
            ImportEvent::DirectoryError { path, message } => {
                format!("error scanning {}: {}", short_name(path), message)
            }
            ImportEvent::RecordError { path, message } => {
                format!("error importing {}: {}", short_name(path), message)
            }
            ImportEvent::DirectoryDone { path, records, .. } => {
                format!("{}: {} files imported", short_name(path), records)
            }
            ImportEvent::Completed { .. } => "scan completed".to_string(),
            ImportEvent::Cancelled { .. } => "scan cancelled".to_string(),
        }
    }
}

fn short_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

/// Orchestrates one import run over a set of root directories
pub struct ImportCoordinator<S, T> {
    scanner: S,
    store: T,
    events: Sender<ImportEvent>,
    cancel: Arc<AtomicBool>,
}

impl<S: MediaScanner, T: RecordStore> ImportCoordinator<S, T> {
    /// Create a coordinator emitting events to the given sender
    pub fn new(scanner: S, store: T, events: Sender<ImportEvent>, cancel: Arc<AtomicBool>) -> Self {
        Self {
            scanner,
            store,
            events,
            cancel,
        }
    }

    /// Consume the coordinator and return the store
    pub fn into_store(self) -> T {
        self.store
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn emit(&self, event: ImportEvent) {
        // A disconnected receiver must not kill the run
        let _ = self.events.send(event);
    }

    /// Run one import over the given directories, in input order.
    ///
    /// Progress fractions weight every directory equally at `1/n` and
    /// interpolate within a directory by its own record count, so the
    /// emitted sequence is non-decreasing and ends at exactly 1.0 on
    /// an uncancelled run.
    pub fn run(&mut self, directories: &[PathBuf]) -> ImportSummary {
        let start = Instant::now();
        let mut summary = ImportSummary::new();
        let total = directories.len();

        self.emit(ImportEvent::Started { directories: total });

        for (i, dir) in directories.iter().enumerate() {
            if self.cancelled() {
                return self.finish_cancelled(summary, start);
            }

            let dir_str = dir.to_string_lossy().into_owned();
            self.emit(ImportEvent::ScanningDirectory {
                path: dir_str.clone(),
                fraction: i as f64 / total as f64,
            });

            let records = match self.scanner.scan(std::slice::from_ref(dir)) {
                Ok(records) => records,
                Err(e) => {
                    log::error!("scan of {:?} failed: {}", dir, e);
                    summary.directories_failed += 1;
                    self.emit(ImportEvent::DirectoryError {
                        path: dir_str,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let count = records.len();
            for (j, record) in records.iter().enumerate() {
                // Cooperative cancellation: checked between records,
                // an in-flight persist runs to completion
                if self.cancelled() {
                    return self.finish_cancelled(summary, start);
                }

                let record_str = record.path.to_string_lossy().into_owned();
                match self.store.persist(record) {
                    Ok(()) => summary.records_imported += 1,
                    Err(e) => {
                        log::warn!("failed to persist {:?}: {}", record.path, e);
                        summary.records_failed += 1;
                        self.emit(ImportEvent::RecordError {
                            path: record_str.clone(),
                            message: e.to_string(),
                        });
                    }
                }

                self.emit(ImportEvent::Progress {
                    path: record_str,
                    fraction: (i as f64 + (j + 1) as f64 / count as f64) / total as f64,
                });
            }

            if let Err(e) = self.store.record_scanned_root(dir) {
                log::warn!("failed to record scanned root {:?}: {}", dir, e);
                summary.records_failed += 1;
                self.emit(ImportEvent::RecordError {
                    path: dir_str.clone(),
                    message: e.to_string(),
                });
            }

            summary.directories_processed += 1;
            self.emit(ImportEvent::DirectoryDone {
                path: dir_str,
                records: count as u64,
                fraction: (i + 1) as f64 / total as f64,
            });
        }

        summary.duration_ms = start.elapsed().as_millis() as u64;
        self.emit(ImportEvent::Completed {
            summary: summary.clone(),
        });
        summary
    }

    fn finish_cancelled(&self, mut summary: ImportSummary, start: Instant) -> ImportSummary {
        summary.cancelled = true;
        summary.duration_ms = start.elapsed().as_millis() as u64;
        log::info!("import cancelled after {} records", summary.records_imported);
        self.emit(ImportEvent::Cancelled {
            summary: summary.clone(),
        });
        summary
    }
}

/// Handle to a running import. Allows cancellation, draining progress
/// events, and joining for the final summary.
pub struct ImportHandle {
    /// Receiver for events from the worker thread
    pub events: Receiver<ImportEvent>,
    cancel: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<ImportSummary>>,
}

impl ImportHandle {
    /// Request the run to stop as soon as possible
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Wait for the worker to finish and return the final summary
    pub fn join(mut self) -> ImportSummary {
        match self.thread.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                log::error!("import worker panicked");
                ImportSummary::default()
            }),
            None => ImportSummary::default(),
        }
    }
}

/// Start an import on a background worker thread.
///
/// The invoking thread only drains events from the returned handle; one
/// run at a time per store is the caller's responsibility.
pub fn start_import<S, T>(scanner: S, store: T, directories: Vec<PathBuf>) -> ImportHandle
where
    S: MediaScanner + Send + 'static,
    T: RecordStore + Send + 'static,
{
    let (events_tx, events_rx) = bounded::<ImportEvent>(EVENT_CHANNEL_CAPACITY);
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel.clone();

    let thread = thread::Builder::new()
        .name("music-importer".into())
        .spawn(move || {
            let mut coordinator = ImportCoordinator::new(scanner, store, events_tx, cancel_clone);
            coordinator.run(&directories)
        })
        .ok();

    if thread.is_none() {
        log::error!("failed to spawn import worker");
    }

    ImportHandle {
        events: events_rx,
        cancel,
        thread,
    }
}
