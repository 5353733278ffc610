//! Core data models for the library importer

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Audio container format, inferred from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Flac,
    Wav,
    Aac,
    Ogg,
    Wma,
    M4a,
    Opus,
    Aiff,
    /// Unknown or unsupported format
    Unknown,
}

impl AudioFormat {
    /// Infer the format from a file extension (case-insensitive, no dot)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "mp3" => AudioFormat::Mp3,
            "flac" => AudioFormat::Flac,
            "wav" => AudioFormat::Wav,
            "aac" => AudioFormat::Aac,
            "ogg" => AudioFormat::Ogg,
            "wma" => AudioFormat::Wma,
            "m4a" => AudioFormat::M4a,
            "opus" => AudioFormat::Opus,
            "aiff" | "aif" => AudioFormat::Aiff,
            _ => AudioFormat::Unknown,
        }
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
            AudioFormat::Aac => "aac",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Wma => "wma",
            AudioFormat::M4a => "m4a",
            AudioFormat::Opus => "opus",
            AudioFormat::Aiff => "aiff",
            AudioFormat::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One scanned audio file with its metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Full path to the file
    pub path: PathBuf,
    /// File name without path
    pub name: String,
    /// File size in bytes
    pub size: u64,
    /// Modification time as Unix timestamp
    pub mtime: i64,
    /// File extension (lowercase, without dot)
    pub extension: String,
    /// Inferred audio format
    pub format: AudioFormat,
    /// File content hash (MD5, possibly partial)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Whether the hash is a partial hash (for large files)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_partial_hash: bool,
}

impl MediaRecord {
    /// Create a new record with basic metadata
    pub fn new(path: PathBuf, name: String, size: u64, mtime: i64, extension: String) -> Self {
        let format = AudioFormat::from_extension(&extension);
        Self {
            path,
            name,
            size,
            mtime,
            extension,
            format,
            hash: None,
            is_partial_hash: false,
        }
    }

    /// Set the content hash
    pub fn with_hash(mut self, hash: String, is_partial: bool) -> Self {
        self.hash = Some(hash);
        self.is_partial_hash = is_partial;
        self
    }
}

/// A root directory that was imported at some point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedRoot {
    /// Absolute directory path
    pub path: String,
    /// Time of the most recent import as Unix timestamp
    pub last_scanned: i64,
}

impl ScannedRoot {
    /// Last import time as a UTC datetime, if the stored timestamp is valid
    pub fn last_scanned_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.last_scanned, 0).single()
    }

    /// Human-readable last import time
    pub fn last_scanned_display(&self) -> String {
        self.last_scanned_utc()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string())
    }
}

/// Status label applied to freshly refreshed selection entries
pub const STATUS_PREVIOUSLY_SCANNED: &str = "previously scanned";

/// One row in the directory selection list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Directory path
    pub path: String,
    /// Whether the entry is currently selected for re-import
    pub selected: bool,
    /// Status label shown for the entry
    pub status: String,
    /// Human-readable last import time
    pub last_scanned: String,
    /// Whether this entry is a root directory (as opposed to an
    /// expanded subdirectory of one)
    pub is_root: bool,
    /// Path of the owning root directory
    pub root_path: String,
}

impl DirectoryEntry {
    /// Create an entry for a previously scanned root directory
    pub fn root(root: &ScannedRoot) -> Self {
        Self {
            path: root.path.clone(),
            selected: false,
            status: STATUS_PREVIOUSLY_SCANNED.to_string(),
            last_scanned: root.last_scanned_display(),
            is_root: true,
            root_path: root.path.clone(),
        }
    }
}

/// Totals for one import run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Number of directories processed (scanned without error)
    pub directories_processed: u64,
    /// Number of directories whose scan failed
    pub directories_failed: u64,
    /// Number of records persisted
    pub records_imported: u64,
    /// Number of records that failed to persist
    pub records_failed: u64,
    /// Whether the run was cancelled before completing
    pub cancelled: bool,
    /// Total run duration in milliseconds
    pub duration_ms: u64,
}

impl ImportSummary {
    /// Create a new empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether the run completed without any failures
    pub fn is_clean(&self) -> bool {
        self.directories_failed == 0 && self.records_failed == 0 && !self.cancelled
    }
}
