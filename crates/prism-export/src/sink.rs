//! Append-only CSV export files, one per analysis kind

use crate::codec::{encode_row, parse_csv};
use crate::row::{header_row, record_row};
use crate::ExportError;
use prism_domain::{AnalysisKind, AnalysisRecord, ExportReceipt, RecordSink};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex};
use tracing::{debug, info, warn};

/// One lock per destination path, shared by every sink in the process
///
/// Entries nobody holds are dropped the next time a lock is taken, so the
/// map only tracks paths with an append in flight.
static PATH_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// CSV implementation of [`RecordSink`]
///
/// Writes `<export_dir>/<kind>.csv`, creating the directory on first use.
///
/// # Examples
///
/// ```no_run
/// use prism_domain::AnalysisKind;
/// use prism_export::CsvSink;
///
/// let sink = CsvSink::new("/tmp/prism-exports");
/// assert!(sink.path_for(AnalysisKind::Swot).ends_with("swot.csv"));
/// ```
#[derive(Debug, Clone)]
pub struct CsvSink {
    export_dir: PathBuf,
}

impl CsvSink {
    /// Create a sink writing into `export_dir`
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    /// Directory holding the export files
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Export file for an analysis kind
    pub fn path_for(&self, kind: AnalysisKind) -> PathBuf {
        self.export_dir.join(format!("{}.csv", kind.as_str()))
    }
}

impl RecordSink for CsvSink {
    type Error = ExportError;

    fn export(&self, record: &AnalysisRecord) -> Result<ExportReceipt, Self::Error> {
        append_record(record, &self.path_for(record.analysis_kind))
    }

    fn destination(&self, record: &AnalysisRecord) -> PathBuf {
        self.path_for(record.analysis_kind)
    }
}

/// Append one record to `path`
///
/// The header row is written only when the file is missing or empty. Header
/// and row go out in a single write; if that write fails the file is cut
/// back to its previous length. Concurrent appends to the same path are
/// serialized.
pub fn append_record(record: &AnalysisRecord, path: &Path) -> Result<ExportReceipt, ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
    }

    let lock = path_lock(path);
    let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ExportError::io(path, e))?;

    let previous_len = file.metadata().map_err(|e| ExportError::io(path, e))?.len();
    let header_written = previous_len == 0;

    let mut buffer = String::new();
    if header_written {
        buffer.push_str(&encode_row(&header_row(record.analysis_kind)));
    }
    buffer.push_str(&encode_row(&record_row(record)));

    if let Err(e) = file.write_all(buffer.as_bytes()) {
        if let Err(rollback) = file.set_len(previous_len) {
            warn!("Could not roll back {}: {}", path.display(), rollback);
        }
        return Err(ExportError::io(path, e));
    }
    file.sync_data().map_err(|e| ExportError::io(path, e))?;

    if header_written {
        info!("Created export file {}", path.display());
    }
    debug!("Appended {} bytes to {}", buffer.len(), path.display());

    Ok(ExportReceipt {
        path: path.to_path_buf(),
        bytes_written: buffer.len(),
        header_written,
    })
}

/// Read every row of an export file, header included
pub fn read_rows(path: impl AsRef<Path>) -> Result<Vec<Vec<String>>, ExportError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| ExportError::io(path, e))?;
    Ok(parse_csv(&text))
}

fn path_lock(path: &Path) -> Arc<Mutex<()>> {
    let key = lock_key(path);
    let mut locks = PATH_LOCKS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    // Clones are only handed out under the map lock, so a count of one is final.
    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    Arc::clone(locks.entry(key).or_default())
}


/// Resolve the directory so different spellings of one file share a lock
fn lock_key(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => fs::canonicalize(if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        })
        .map(|dir| dir.join(name))
        .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn is_tracked(path: &Path) -> bool {
        PATH_LOCKS.lock().unwrap().contains_key(&lock_key(path))
    }

    #[test]
    fn test_path_for_uses_kind_name() {
        let sink = CsvSink::new("/exports");
        assert_eq!(
            sink.path_for(AnalysisKind::StoryBrand),
            PathBuf::from("/exports/storybrand.csv")
        );
    }

    #[test]
    fn test_released_locks_are_pruned() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("rating.csv");
        let second = dir.path().join("swot.csv");

        let held = path_lock(&first);
        let _ = path_lock(&second);
        assert!(is_tracked(&first));

        drop(held);
        let _other = path_lock(&second);
        assert!(!is_tracked(&first));
        assert!(is_tracked(&second));
    }

    #[test]
    fn test_lock_key_normalizes_spelling() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a");
        fs::create_dir_all(&nested).unwrap();
        let direct = lock_key(&nested.join("x.csv"));
        let dotted = lock_key(&nested.join(".").join("x.csv"));
        assert_eq!(direct, dotted);
    }
}
