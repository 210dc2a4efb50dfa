use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use gridlab_core::errors::{ErrorInfo, LabError};
use gridlab_core::serde::to_canonical_json_bytes;
use gridlab_core::{
    record_from_binary_slice, record_from_json_slice, record_to_binary_bytes,
    record_to_json_bytes, Record, RecordFormat, SpecificationIdentity,
};
use serde::{Deserialize, Serialize};

/// Filename of the per-batch completion marker.
///
/// Informational for external tooling only; skip logic never consults it.
pub const COMPLETION_MARKER: &str = "completed.json";

/// Summary written into the completion marker once a batch finalizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Batch name the summary belongs to.
    pub batch: String,
    /// Specifications that completed successfully in this invocation.
    pub completed: usize,
    /// Specifications that failed in this invocation.
    pub failed: usize,
    /// Specifications skipped because their identity was already checkpointed.
    pub skipped: usize,
    /// Record files that failed to deserialize during resume.
    pub corrupt_records: usize,
}

/// Checkpoint state recovered from disk when resuming a batch.
#[derive(Debug, Default)]
pub struct ResumeState {
    /// Records successfully reloaded from either format.
    pub records: Vec<Record>,
    /// Identities recovered from the reloaded records.
    pub completed: BTreeSet<SpecificationIdentity>,
    /// Paths of record files that parsed under neither format.
    pub corrupt: Vec<PathBuf>,
}

fn io_error(code: &str, path: &Path, err: impl ToString) -> LabError {
    LabError::Persistence(
        ErrorInfo::new(code, "checkpoint store I/O failure")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}

/// On-disk record set for named batches.
///
/// Each batch owns a directory under the store root holding one record file
/// per completed specification identity plus the completion marker. The
/// record filename stem is the identity, the extension names the format.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    root: PathBuf,
}

impl CheckpointStore {
    /// Creates a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding all record files for a batch name.
    pub fn batch_dir(&self, batch: &str) -> PathBuf {
        self.root.join(batch)
    }

    fn marker_path(&self, batch: &str) -> PathBuf {
        self.batch_dir(batch).join(COMPLETION_MARKER)
    }

    /// Durably persists one record, choosing the format at write time.
    ///
    /// The primary attempt is human-readable JSON; payloads JSON cannot
    /// represent fall back to the binary format for this record only. The
    /// write is complete before this returns, so a later resume observing
    /// the file may safely skip the identity.
    pub fn save_record(
        &self,
        batch: &str,
        record: &Record,
    ) -> Result<(SpecificationIdentity, RecordFormat), LabError> {
        let identity = SpecificationIdentity::of(&record.specification)?;
        let dir = self.batch_dir(batch);
        fs::create_dir_all(&dir).map_err(|err| io_error("batch-dir-create", &dir, err))?;

        let (format, bytes) = match record_to_json_bytes(record) {
            Ok(bytes) => (RecordFormat::Json, bytes),
            Err(json_err) => {
                log::debug!(
                    "record {} not JSON-representable, using binary fallback: {json_err}",
                    identity.short()
                );
                let bytes = record_to_binary_bytes(record).map_err(|bin_err| {
                    LabError::Persistence(
                        ErrorInfo::new(
                            "record-unwritable",
                            "record could not be encoded in either format",
                        )
                        .with_context("identity", identity.as_str())
                        .with_hint(bin_err.to_string()),
                    )
                })?;
                (RecordFormat::Binary, bytes)
            }
        };

        let path = dir.join(format!("{}.{}", identity, format.extension()));
        fs::write(&path, bytes).map_err(|err| io_error("record-write", &path, err))?;
        Ok((identity, format))
    }

    /// Enumerates existing records for a batch, tolerating corruption.
    ///
    /// Each file is parsed by trying the primary JSON codec first and the
    /// binary codec second; the identity is recovered from the record's
    /// content, never from its filename. Files that parse under neither
    /// format are collected as corrupt and logged, not treated as fatal.
    pub fn load_batch(&self, batch: &str) -> Result<ResumeState, LabError> {
        let dir = self.batch_dir(batch);
        let mut state = ResumeState::default();
        if !dir.exists() {
            return Ok(state);
        }
        let entries = fs::read_dir(&dir).map_err(|err| io_error("batch-dir-read", &dir, err))?;
        for entry in entries {
            let entry = entry.map_err(|err| io_error("batch-dir-entry", &dir, err))?;
            let path = entry.path();
            if !path.is_file() || path.file_name() == Some(OsStr::new(COMPLETION_MARKER)) {
                continue;
            }
            let bytes = fs::read(&path).map_err(|err| io_error("record-read", &path, err))?;
            let parsed = record_from_json_slice(&bytes)
                .or_else(|_| record_from_binary_slice(&bytes))
                .and_then(|record| {
                    let identity = SpecificationIdentity::of(&record.specification)?;
                    Ok((record, identity))
                });
            match parsed {
                Ok((record, identity)) => {
                    state.completed.insert(identity);
                    state.records.push(record);
                }
                Err(err) => {
                    log::warn!(
                        "skipping corrupt record {}: {err}",
                        path.display()
                    );
                    state.corrupt.push(path);
                }
            }
        }
        Ok(state)
    }

    /// Writes the completion marker for a finalized batch.
    pub fn mark_complete(&self, batch: &str, summary: &BatchSummary) -> Result<(), LabError> {
        let dir = self.batch_dir(batch);
        fs::create_dir_all(&dir).map_err(|err| io_error("batch-dir-create", &dir, err))?;
        let bytes = to_canonical_json_bytes(summary)?;
        let path = self.marker_path(batch);
        fs::write(&path, bytes).map_err(|err| io_error("marker-write", &path, err))
    }

    /// Returns true when the batch's completion marker exists.
    pub fn is_complete(&self, batch: &str) -> bool {
        self.marker_path(batch).is_file()
    }
}
