//! Durable append/read of homogeneous record lists.
//!
//! Records are stored as JSON lines: one self-describing record per line.
//! Both directions work record by record so that a single bad record is
//! skipped and logged instead of failing the whole file.

use crate::error::{FinderError, Result};
use crate::paths::RECORD_EXTENSION;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read and write lists of records of one type per file
pub trait RecordStore: Send + Sync {
    /// Decode every record in `path`, skipping records that fail to decode
    fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>>;

    /// Create (or truncate) `path` and write `records` to it.
    ///
    /// Returns the number of records actually written; records that fail to
    /// encode are skipped.
    fn write<T: Serialize>(&self, path: &Path, records: &[T]) -> Result<usize>;
}

/// [`RecordStore`] backed by newline-delimited JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesStore;

impl RecordStore for JsonLinesStore {
    fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        let file = File::open(path).map_err(|e| FinderError::storage(path, e))?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(path = %path.display(), line = line_no, error = %e, "Unreadable record line");
                    skipped += 1;
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<T>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(path = %path.display(), line = line_no, error = %e, "Skipping undecodable record");
                    skipped += 1;
                }
            }
        }

        debug!(
            path = %path.display(),
            records = records.len(),
            skipped,
            "Read record file"
        );
        Ok(records)
    }

    fn write<T: Serialize>(&self, path: &Path, records: &[T]) -> Result<usize> {
        let file = File::create(path).map_err(|e| FinderError::storage(path, e))?;
        let mut writer = BufWriter::new(file);

        let mut written = 0usize;
        for (idx, record) in records.iter().enumerate() {
            let encoded = match serde_json::to_string(record) {
                Ok(encoded) => encoded,
                Err(e) => {
                    warn!(path = %path.display(), record = idx, error = %e, "Skipping unencodable record");
                    continue;
                }
            };
            writeln!(writer, "{}", encoded).map_err(|e| FinderError::storage(path, e))?;
            written += 1;
        }
        writer.flush().map_err(|e| FinderError::storage(path, e))?;

        debug!(path = %path.display(), written, total = records.len(), "Wrote record file");
        Ok(written)
    }
}

/// List the record files (`*.jsonl`) directly inside `dir`, sorted by name
pub fn list_record_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| FinderError::storage(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FinderError::storage(dir, e))?;
        let path = entry.path();
        let is_record = path.is_file()
            && path.extension().and_then(|ext| ext.to_str()) == Some(RECORD_EXTENSION);
        if is_record {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Create `dir` (and parents) if missing; failure here aborts a run
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| FinderError::setup(dir.display().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::{Critic, NormalizedReview};
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read_critics() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("critics.jsonl");
        let critics = vec![Critic::new("Hutzi", "butzi"), Critic::new("Butzi", "hutzi")];

        let written = JsonLinesStore.write(&path, &critics).unwrap();
        assert_eq!(written, 2);

        let read: Vec<Critic> = JsonLinesStore.read(&path).unwrap();
        assert_eq!(read, critics);
    }

    #[test]
    fn test_read_skips_bad_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("normalized.jsonl");
        std::fs::write(
            &path,
            "{\"score\":0.5,\"media_url\":\"/m/a\"}\nnot json\n\n{\"score\":1.0,\"media_url\":\"/m/b\"}\n",
        )
        .unwrap();

        let read: Vec<NormalizedReview> = JsonLinesStore.read(&path).unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[1].media_url, "/m/b");
    }

    #[test]
    fn test_write_truncates_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("critics.jsonl");

        JsonLinesStore
            .write(&path, &[Critic::new("a", "a"), Critic::new("b", "b")])
            .unwrap();
        JsonLinesStore.write(&path, &[Critic::new("c", "c")]).unwrap();

        let read: Vec<Critic> = JsonLinesStore.read(&path).unwrap();
        assert_eq!(read, vec![Critic::new("c", "c")]);
    }

    #[test]
    fn test_read_missing_file_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let err = JsonLinesStore
            .read::<Critic>(&dir.path().join("missing.jsonl"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_list_record_files_filters_extension() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.jsonl"), "").unwrap();
        std::fs::write(dir.path().join("a.jsonl"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = list_record_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jsonl", "b.jsonl"]);
    }
}
