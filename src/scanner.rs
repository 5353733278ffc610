//! Scanner module - discovers audio files under root directories

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::models::MediaRecord;

/// File discovery engine consumed by the import coordinator.
///
/// A scan covers the given roots and returns one record per discovered
/// audio file. Errors are per invocation; the coordinator catches them
/// at the directory level.
pub trait MediaScanner {
    /// Scan the given roots and return the discovered records
    fn scan(&self, roots: &[PathBuf]) -> Result<Vec<MediaRecord>, ImportError>;
}

/// Walkdir-based scanner honoring the import configuration
pub struct WalkScanner {
    config: ImportConfig,
}

impl WalkScanner {
    /// Create a scanner with the given configuration
    pub fn new(config: ImportConfig) -> Self {
        Self { config }
    }

    /// Collect candidate file paths under one root, in traversal order
    fn collect_candidates(&self, root: &Path) -> Result<Vec<PathBuf>, ImportError> {
        let mut candidates = Vec::new();

        let walker = WalkDir::new(root)
            .max_depth(self.config.effective_max_depth())
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                // The root itself is never filtered
                if entry.depth() == 0 {
                    return true;
                }
                if entry.file_type().is_dir() {
                    if let Some(name) = entry.file_name().to_str() {
                        return !self.config.should_ignore_dir(name);
                    }
                }
                true
            });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    let path = entry.path();
                    let extension = path
                        .extension()
                        .and_then(|e| e.to_str())
                        .map(|e| e.to_lowercase())
                        .unwrap_or_default();
                    if self.config.should_include_extension(&extension) {
                        candidates.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    // An unreadable root fails the whole scan; deeper
                    // errors are skipped and logged
                    if e.depth() == 0 {
                        return Err(walk_error_to_import_error(root, e));
                    }
                    log::warn!("skipping unreadable entry under {:?}: {}", root, e);
                }
            }
        }

        Ok(candidates)
    }
}

impl MediaScanner for WalkScanner {
    fn scan(&self, roots: &[PathBuf]) -> Result<Vec<MediaRecord>, ImportError> {
        let mut records = Vec::new();

        for root in roots {
            if !root.exists() {
                return Err(ImportError::not_found(root.clone()));
            }

            let candidates = self.collect_candidates(root)?;

            // Metadata and hashing run in parallel; collect preserves
            // candidate order
            let scanned: Vec<Option<MediaRecord>> = candidates
                .par_iter()
                .map(|path| process_file(path, &self.config))
                .collect();

            records.extend(scanned.into_iter().flatten());
        }

        Ok(records)
    }
}

fn walk_error_to_import_error(root: &Path, err: walkdir::Error) -> ImportError {
    if err.io_error().map(|e| e.kind()) == Some(std::io::ErrorKind::PermissionDenied) {
        ImportError::permission_denied(root.to_path_buf())
    } else {
        ImportError::io(Some(root.to_path_buf()), err.to_string())
    }
}

/// Process a single file and return a record if its metadata is readable
fn process_file(path: &Path, config: &ImportConfig) -> Option<MediaRecord> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            log::debug!("skipping {:?}: {}", path, e);
            return None;
        }
    };

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string();

    let mtime = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    let mut record = MediaRecord::new(path.to_path_buf(), name, metadata.len(), mtime, extension);

    if config.compute_hash {
        if let Some((hash, is_partial)) = compute_file_hash(path, config.large_file_threshold) {
            record = record.with_hash(hash, is_partial);
        }
    }

    Some(record)
}

/// Compute file hash (MD5)
/// For large files, compute partial hash (first 1MB + last 1MB)
fn compute_file_hash(path: &Path, large_file_threshold: u64) -> Option<(String, bool)> {
    use md5::{Digest, Md5};
    use std::fs::File;
    use std::io::{Read, Seek, SeekFrom};

    let file = File::open(path).ok()?;
    let metadata = file.metadata().ok()?;
    let file_size = metadata.len();

    let mut hasher = Md5::new();

    if file_size <= large_file_threshold {
        // Full hash for small files
        let mut file = file;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer).ok()?;
        hasher.update(&buffer);
        let result = hasher.finalize();
        Some((format!("{:x}", result), false))
    } else {
        // Partial hash for large files (first 1MB + last 1MB)
        let chunk_size = 1024 * 1024; // 1MB
        let mut file = file;
        let mut buffer = vec![0u8; chunk_size];

        let bytes_read = file.read(&mut buffer).ok()?;
        hasher.update(&buffer[..bytes_read]);

        if file_size > chunk_size as u64 {
            file.seek(SeekFrom::End(-(chunk_size as i64))).ok()?;
            let bytes_read = file.read(&mut buffer).ok()?;
            hasher.update(&buffer[..bytes_read]);
        }

        let result = hasher.finalize();
        Some((format!("{:x}", result), true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImportErrorKind;
    use crate::models::AudioFormat;
    use std::fs;

    fn touch(path: &Path, contents: &[u8]) {
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_scan_filters_audio_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.mp3"), b"aaa");
        touch(&dir.path().join("b.flac"), b"bbb");
        touch(&dir.path().join("notes.txt"), b"ccc");

        let scanner = WalkScanner::new(ImportConfig::builder().compute_hash(false).build());
        let records = scanner.scan(&[dir.path().to_path_buf()]).unwrap();

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a.mp3", "b.flac"]);
        assert_eq!(records[0].format, AudioFormat::Mp3);
        assert_eq!(records[1].format, AudioFormat::Flac);
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let scanner = WalkScanner::new(ImportConfig::default());
        let err = scanner.scan(&[missing]).unwrap_err();
        assert_eq!(err.kind, ImportErrorKind::NotFound);
    }

    #[test]
    fn test_scan_recursive_and_flat() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("top.mp3"), b"top");
        fs::create_dir(dir.path().join("album")).unwrap();
        touch(&dir.path().join("album").join("deep.mp3"), b"deep");

        let recursive = WalkScanner::new(ImportConfig::builder().compute_hash(false).build());
        let records = recursive.scan(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(records.len(), 2);

        let flat = WalkScanner::new(
            ImportConfig::builder()
                .compute_hash(false)
                .recursive(false)
                .build(),
        );
        let records = flat.scan(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["top.mp3"]);
    }

    #[test]
    fn test_scan_skips_ignored_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".cache")).unwrap();
        touch(&dir.path().join(".cache").join("hidden.mp3"), b"x");
        fs::create_dir(dir.path().join("albums")).unwrap();
        touch(&dir.path().join("albums").join("visible.mp3"), b"y");

        let scanner = WalkScanner::new(ImportConfig::builder().compute_hash(false).build());
        let records = scanner.scan(&[dir.path().to_path_buf()]).unwrap();

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["visible.mp3"]);
    }

    #[test]
    fn test_scan_computes_hash() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.mp3"), b"hello");

        let scanner = WalkScanner::new(ImportConfig::default());
        let records = scanner.scan(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(records.len(), 1);
        // md5("hello")
        assert_eq!(
            records[0].hash.as_deref(),
            Some("5d41402abc4b2a76b9719d911017c592")
        );
        assert!(!records[0].is_partial_hash);
    }

    #[test]
    fn test_scan_partial_hash_above_threshold() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("big.wav"), &vec![0u8; 64]);

        let scanner = WalkScanner::new(
            ImportConfig::builder().large_file_threshold(16).build(),
        );
        let records = scanner.scan(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].hash.is_some());
        assert!(records[0].is_partial_hash);
    }
}
