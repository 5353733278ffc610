//! Configuration for the library importer

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Default large file threshold (100 MB)
pub const DEFAULT_LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Default max depth for recursive scanning
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Default minimum interval between progress messages (milliseconds)
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 500;

/// Configuration for an import run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// File extensions to include (whitelist)
    /// If empty, all audio extensions are included
    pub extensions: HashSet<String>,

    /// Directory names to ignore
    pub ignore_dirs: HashSet<String>,

    /// Whether to compute file hashes
    pub compute_hash: bool,

    /// Threshold for using partial hash (bytes)
    /// Files larger than this use partial hash (first 1MB + last 1MB)
    pub large_file_threshold: u64,

    /// Database path for storing records and scan history
    pub db_path: Option<PathBuf>,

    /// Whether to scan subdirectories recursively
    /// If false, only scan files directly under each root
    pub recursive: bool,

    /// Maximum depth for recursive scanning
    pub max_depth: usize,

    /// Minimum interval between progress messages in milliseconds
    pub progress_interval_ms: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            extensions: Self::default_extensions(),
            ignore_dirs: Self::default_ignore_dirs(),
            compute_hash: true,
            large_file_threshold: DEFAULT_LARGE_FILE_THRESHOLD,
            db_path: None,
            recursive: true,
            max_depth: DEFAULT_MAX_DEPTH,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
        }
    }
}

impl ImportConfig {
    /// Create a config builder
    pub fn builder() -> ImportConfigBuilder {
        ImportConfigBuilder::new()
    }

    /// Get the default audio extensions
    pub fn default_extensions() -> HashSet<String> {
        [
            "mp3", "flac", "wav", "aac", "ogg", "wma", "m4a", "opus", "aiff", "aif",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Get the default directories to ignore
    pub fn default_ignore_dirs() -> HashSet<String> {
        [
            "$RECYCLE.BIN",
            "System Volume Information",
            ".Trash",
            ".Trash-1000",
            "@eaDir",
            ".git",
            ".svn",
            "node_modules",
            "__pycache__",
            ".cache",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Check if an extension should be included
    pub fn should_include_extension(&self, ext: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        self.extensions.contains(&ext.to_lowercase())
    }

    /// Check if a directory should be ignored
    pub fn should_ignore_dir(&self, name: &str) -> bool {
        // Hidden directories are always skipped
        if name.starts_with('.') {
            return true;
        }
        self.ignore_dirs.contains(name)
    }

    /// Get the effective max depth for walkdir
    pub fn effective_max_depth(&self) -> usize {
        if !self.recursive {
            1 // Only scan immediate children (depth 1)
        } else {
            self.max_depth
        }
    }
}

/// Builder for ImportConfig
#[derive(Debug, Default)]
pub struct ImportConfigBuilder {
    config: ImportConfig,
}

impl ImportConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the extensions whitelist
    pub fn extensions(mut self, extensions: HashSet<String>) -> Self {
        self.config.extensions = extensions;
        self
    }

    /// Set the directories to ignore
    pub fn ignore_dirs(mut self, dirs: HashSet<String>) -> Self {
        self.config.ignore_dirs = dirs;
        self
    }

    /// Add a directory name to ignore
    pub fn add_ignore_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.ignore_dirs.insert(dir.into());
        self
    }

    /// Enable or disable hash computation
    pub fn compute_hash(mut self, enabled: bool) -> Self {
        self.config.compute_hash = enabled;
        self
    }

    /// Set the large file threshold
    pub fn large_file_threshold(mut self, threshold: u64) -> Self {
        self.config.large_file_threshold = threshold;
        self
    }

    /// Set the database path
    pub fn db_path(mut self, path: PathBuf) -> Self {
        self.config.db_path = Some(path);
        self
    }

    /// Enable or disable recursive scanning
    pub fn recursive(mut self, enabled: bool) -> Self {
        self.config.recursive = enabled;
        self
    }

    /// Set the maximum depth for recursive scanning
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Set the minimum progress reporting interval
    pub fn progress_interval_ms(mut self, interval: u64) -> Self {
        self.config.progress_interval_ms = interval;
        self
    }

    /// Build the config
    pub fn build(self) -> ImportConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ImportConfig::default();
        assert!(config.compute_hash);
        assert!(config.recursive);
        assert_eq!(config.large_file_threshold, DEFAULT_LARGE_FILE_THRESHOLD);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_default_extensions() {
        let extensions = ImportConfig::default_extensions();
        assert!(extensions.contains("mp3"));
        assert!(extensions.contains("flac"));
        assert!(extensions.contains("opus"));
        assert!(!extensions.contains("mp4"));
        assert!(!extensions.contains("txt"));
    }

    #[test]
    fn test_should_include_extension() {
        let config = ImportConfig::default();
        assert!(config.should_include_extension("mp3"));
        assert!(config.should_include_extension("MP3"));
        assert!(!config.should_include_extension("txt"));

        let open = ImportConfig::builder().extensions(HashSet::new()).build();
        assert!(open.should_include_extension("txt"));
    }

    #[test]
    fn test_should_ignore_dir() {
        let config = ImportConfig::default();
        // Hidden directories
        assert!(config.should_ignore_dir(".git"));
        assert!(config.should_ignore_dir(".hidden"));
        // System directories
        assert!(config.should_ignore_dir("$RECYCLE.BIN"));
        assert!(config.should_ignore_dir("System Volume Information"));
        // Normal directories
        assert!(!config.should_ignore_dir("Albums"));
        assert!(!config.should_ignore_dir("Singles"));
    }

    #[test]
    fn test_config_builder() {
        let config = ImportConfig::builder()
            .compute_hash(false)
            .recursive(false)
            .max_depth(2)
            .add_ignore_dir("incoming")
            .db_path(PathBuf::from("/tmp/library.db"))
            .build();

        assert!(!config.compute_hash);
        assert!(!config.recursive);
        assert_eq!(config.max_depth, 2);
        assert!(config.ignore_dirs.contains("incoming"));
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/library.db")));
    }

    #[test]
    fn test_effective_max_depth() {
        let config = ImportConfig::builder().recursive(false).max_depth(5).build();
        assert_eq!(config.effective_max_depth(), 1);

        let recursive = ImportConfig::builder().max_depth(5).build();
        assert_eq!(recursive.effective_max_depth(), 5);
    }
}
