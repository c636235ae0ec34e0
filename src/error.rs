//! Error types shared by the organizer engine and the operation journal.

use crate::config::OperationKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop an operation before any per-file work begins.
///
/// Failures on individual files are never surfaced through this type; they are
/// collected into the operation's report and processing continues.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// No source directory was configured.
    #[error("Source directory is required")]
    MissingSource,

    /// No destination directory was configured.
    #[error("Destination directory is required")]
    MissingDestination,

    /// The configured source does not exist or is not a directory.
    #[error("Source is not a directory: {}", .0.display())]
    InvalidSource(PathBuf),

    /// The configured destination does not exist or is not a directory.
    #[error("Destination is not a directory: {}", .0.display())]
    InvalidDestination(PathBuf),

    /// The scan produced no files to work on.
    #[error("No files match the current filters")]
    NoMatchingFiles,

    /// The journal holds no batches.
    #[error("Nothing to undo")]
    NothingToUndo,

    /// The most recent batch cannot be reversed.
    #[error("Cannot undo a {kind} operation: only move batches are undoable")]
    UnsupportedUndo { kind: OperationKind },

    /// The most recent batch recorded no moves. It has been dropped.
    #[error("The last batch is empty")]
    EmptyBatch,

    /// Failed to write the journal file.
    #[error("Failed to write history file {}: {source}", path.display())]
    JournalWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize the journal.
    #[error("Failed to serialize history: {0}")]
    JournalSerialize(#[from] serde_json::Error),
}

/// Result type for organizer operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;
