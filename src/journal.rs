/// Persistent journal of file operations, with undo of the latest move batch.
///
/// The journal is a bounded list of closed [`Batch`]es stored as JSON in a
/// single file, most recent last. A batch is opened with
/// [`OperationJournal::begin`], filled with [`OperationJournal::record`] and
/// closed with [`OperationJournal::commit`], which also persists the journal.
use crate::config::OperationKind;
use crate::error::{OrganizeError, OrganizeResult};
use crate::file_organizer::FileOrganizer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum number of batches kept after any persist.
pub const MAX_BATCHES: usize = 20;

/// File name of the journal inside the user's home directory.
pub const HISTORY_FILE_NAME: &str = ".tidysort_history.json";

/// One recorded move, enough to put the file back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedMove {
    /// Where the file was before the operation.
    pub source: PathBuf,
    /// Where the operation put it.
    pub destination: PathBuf,
}

/// A group of operations recorded together. Closed batches are never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    kind: OperationKind,
    timestamp: DateTime<Utc>,
    operations: Vec<RecordedMove>,
}

impl Batch {
    fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            operations: Vec::new(),
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Recorded moves in recording order.
    pub fn operations(&self) -> &[RecordedMove] {
        &self.operations
    }
}

/// How the journal file was found when the journal was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalLoad {
    /// The file was read; holds the number of batches.
    Loaded(usize),
    /// No journal file exists yet.
    Missing,
    /// The file could not be read or parsed and the journal starts empty.
    Reset(String),
}

/// Outcome of reversing a move batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UndoReport {
    /// Number of files moved back to their original location.
    pub restored: usize,
    /// Files that could not be restored, with the reason.
    pub failed: Vec<(PathBuf, String)>,
    /// Set when the journal could not be written after the restores.
    pub journal_error: Option<String>,
}

impl UndoReport {
    /// Returns true if every recorded move was reversed.
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.failed.is_empty() {
            format!("Restored {} files", self.restored)
        } else {
            format!("Restored: {} | Errors: {}", self.restored, self.failed.len())
        }
    }
}

/// Owner of the persisted batch history.
#[derive(Debug)]
pub struct OperationJournal {
    path: PathBuf,
    batches: Vec<Batch>,
    open: Option<Batch>,
    load: JournalLoad,
}

impl OperationJournal {
    /// Opens the journal stored at `path`.
    ///
    /// A missing, unreadable or malformed file yields an empty journal; the
    /// reason is available from [`OperationJournal::load_status`].
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (batches, load) = Self::load(&path);

        if let JournalLoad::Reset(reason) = &load {
            tracing::warn!(
                path = %path.display(),
                %reason,
                "history file unusable, starting empty"
            );
        }

        Self {
            path,
            batches,
            open: None,
            load,
        }
    }

    /// Opens the journal at the per-user location.
    pub fn open_default() -> Self {
        Self::open(Self::default_path())
    }

    /// `~/.tidysort_history.json`, or the working directory when no home
    /// directory is known.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(HISTORY_FILE_NAME)
    }

    fn load(path: &Path) -> (Vec<Batch>, JournalLoad) {
        if !path.exists() {
            return (Vec::new(), JournalLoad::Missing);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => return (Vec::new(), JournalLoad::Reset(e.to_string())),
        };

        match serde_json::from_str::<Vec<Batch>>(&content) {
            Ok(batches) => {
                let count = batches.len();
                (batches, JournalLoad::Loaded(count))
            }
            Err(e) => (Vec::new(), JournalLoad::Reset(format!("JSON parse error: {}", e))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_status(&self) -> &JournalLoad {
        &self.load
    }

    /// Closed batches, oldest first.
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Up to `count` most recent batches, newest first.
    pub fn recent(&self, count: usize) -> Vec<&Batch> {
        self.batches.iter().rev().take(count).collect()
    }

    /// Opens a new batch. An uncommitted batch is discarded.
    pub fn begin(&mut self, kind: OperationKind) {
        if let Some(previous) = self.open.replace(Batch::new(kind)) {
            tracing::warn!(
                kind = %previous.kind,
                operations = previous.operations.len(),
                "discarding uncommitted batch"
            );
        }
    }

    /// Appends a move to the open batch. Does nothing if no batch is open.
    pub fn record(&mut self, source: impl Into<PathBuf>, destination: impl Into<PathBuf>) {
        match self.open.as_mut() {
            Some(batch) => batch.operations.push(RecordedMove {
                source: source.into(),
                destination: destination.into(),
            }),
            None => tracing::debug!("record called without an open batch"),
        }
    }

    /// Closes the open batch and persists the journal.
    ///
    /// A batch that recorded nothing (every copy batch, or a move batch where
    /// every file failed) is not kept: there is nothing it could undo.
    pub fn commit(&mut self) -> OrganizeResult<()> {
        if let Some(batch) = self.open.take() {
            if batch.operations.is_empty() {
                tracing::debug!(kind = %batch.kind, "dropping batch with no recorded moves");
            } else {
                tracing::info!(
                    kind = %batch.kind,
                    operations = batch.operations.len(),
                    "committing batch"
                );
                self.batches.push(batch);
            }
        }
        self.persist()
    }

    /// Reverses the most recent batch, newest move first.
    ///
    /// Missing destinations and failed moves are counted as failures without
    /// stopping the loop. The batch is removed and the journal persisted
    /// whatever the failure count. `on_progress` receives `(done, total)`
    /// after each recorded move.
    ///
    /// # Errors
    ///
    /// * [`OrganizeError::NothingToUndo`] if the journal is empty
    /// * [`OrganizeError::UnsupportedUndo`] if the last batch is not a move
    /// * [`OrganizeError::EmptyBatch`] if the last batch recorded nothing; the
    ///   batch is dropped
    /// * a journal write error if the dropped empty batch cannot be persisted
    ///
    /// Once any file has been touched, a failure to persist is reported in
    /// [`UndoReport::journal_error`] instead.
    pub fn undo_last<F>(&mut self, mut on_progress: F) -> OrganizeResult<UndoReport>
    where
        F: FnMut(usize, usize),
    {
        let last = self.batches.last().ok_or(OrganizeError::NothingToUndo)?;

        if last.kind != OperationKind::Move {
            return Err(OrganizeError::UnsupportedUndo { kind: last.kind });
        }

        if last.operations.is_empty() {
            self.batches.pop();
            self.persist()?;
            return Err(OrganizeError::EmptyBatch);
        }

        let Some(batch) = self.batches.pop() else {
            return Err(OrganizeError::NothingToUndo);
        };

        let total = batch.operations.len();
        let mut report = UndoReport::default();

        for (i, operation) in batch.operations.iter().rev().enumerate() {
            match Self::restore(operation) {
                Ok(()) => report.restored += 1,
                Err(reason) => {
                    tracing::debug!(
                        path = %operation.destination.display(),
                        %reason,
                        "restore failed"
                    );
                    report.failed.push((operation.destination.clone(), reason));
                }
            }
            on_progress(i + 1, total);
        }

        tracing::info!(
            restored = report.restored,
            failed = report.failed.len(),
            "undo finished"
        );

        if let Err(e) = self.persist() {
            tracing::warn!(error = %e, "could not save history after undo");
            report.journal_error = Some(e.to_string());
        }
        Ok(report)
    }

    /// Moves one file back to where it came from.
    ///
    /// A file occupying the original location is left alone and the restore
    /// counts as failed.
    fn restore(operation: &RecordedMove) -> Result<(), String> {
        if !operation.destination.exists() {
            return Err("File not found at expected location".to_string());
        }

        if operation.source.exists() {
            return Err(format!(
                "Original location is occupied: {}",
                operation.source.display()
            ));
        }

        if let Some(parent) = operation.source.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Could not recreate {}: {}", parent.display(), e))?;
        }

        FileOrganizer::move_file(&operation.destination, &operation.source)
            .map_err(|e| format!("Failed to restore file: {}", e))
    }

    /// Removes every batch and persists the empty journal.
    pub fn clear(&mut self) -> OrganizeResult<()> {
        self.batches.clear();
        self.persist()
    }

    /// Truncates to [`MAX_BATCHES`] and writes the journal file.
    fn persist(&mut self) -> OrganizeResult<()> {
        if self.batches.len() > MAX_BATCHES {
            let excess = self.batches.len() - MAX_BATCHES;
            self.batches.drain(..excess);
        }

        let json = serde_json::to_string_pretty(&self.batches)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| OrganizeError::JournalWrite {
                path: self.path.clone(),
                source: e,
            })?;
        }

        fs::write(&self.path, json).map_err(|e| OrganizeError::JournalWrite {
            path: self.path.clone(),
            source: e,
        })
    }
}
