//! Music library importer with scan-history tracking
//!
//! This library orchestrates import runs over root directories: each
//! directory is scanned for audio files, every discovered record is
//! persisted individually, the root is remembered in the scan history,
//! and progress is streamed back over an event channel. Previously
//! scanned roots can be listed, selected, and re-imported.

pub mod config;
pub mod db;
pub mod error;
pub mod importer;
pub mod models;
pub mod progress;
pub mod scanner;
pub mod selection;

pub use config::ImportConfig;
pub use db::{HistoryDb, RecordStore};
pub use error::{ImportError, ImportErrorKind};
pub use importer::{start_import, ImportCoordinator, ImportEvent, ImportHandle};
pub use models::{
    AudioFormat, DirectoryEntry, ImportSummary, MediaRecord, ScannedRoot,
};
pub use progress::ProgressReporter;
pub use scanner::{MediaScanner, WalkScanner};
pub use selection::DirectorySelectionModel;
