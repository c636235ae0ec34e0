//! The organizer engine: scan, preview, execute, duplicate search and undo.
//!
//! Every operation takes the [`OrganizerConfig`] to apply and a progress
//! callback receiving `(completed, total)`. The engine keeps the most recent
//! scan result so that preview, execute and duplicate search work on the same
//! file set.

use crate::config::{ClassifyMode, DestinationPolicy, OperationKind, OrganizerConfig};
use crate::duplicates::{self, DuplicateReport};
use crate::error::{OrganizeError, OrganizeResult};
use crate::file_metadata::{FileMetadata, PreviewEntry};
use crate::file_organizer::FileOrganizer;
use crate::journal::{Batch, OperationJournal, UndoReport};
use crate::rule_filter;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Folder used in extension mode for files without an extension.
pub const NO_EXTENSION_FOLDER: &str = "no_extension";

/// Folder name inside the destination for `file`.
///
/// An extension override wins; otherwise the classify mode decides.
///
/// ```
/// use chrono::{Local, TimeZone};
/// use std::path::PathBuf;
/// use tidysort::config::{ClassifyMode, OrganizerConfig};
/// use tidysort::engine::resolve_destination_folder;
/// use tidysort::file_metadata::FileMetadata;
///
/// let modified = Local.with_ymd_and_hms(2023, 7, 4, 12, 0, 0).unwrap();
/// let file = FileMetadata::new(PathBuf::from("/in/Song.MP3"), 4096, modified);
///
/// let by_ext = OrganizerConfig::builder().build();
/// assert_eq!(resolve_destination_folder(&file, by_ext.policy()), "mp3");
///
/// let by_date = OrganizerConfig::builder().classify(ClassifyMode::Date).build();
/// assert_eq!(resolve_destination_folder(&file, by_date.policy()), "2023/07");
///
/// let overridden = OrganizerConfig::builder().destination_override("mp3", "Music").build();
/// assert_eq!(resolve_destination_folder(&file, overridden.policy()), "Music");
/// ```
pub fn resolve_destination_folder(file: &FileMetadata, policy: &DestinationPolicy) -> String {
    if let Some(folder) = policy.override_for(&file.extension) {
        return folder.to_string();
    }

    match policy.mode() {
        ClassifyMode::Extension => match file.extension.strip_prefix('.') {
            Some(ext) if !ext.is_empty() => ext.to_string(),
            _ => NO_EXTENSION_FOLDER.to_string(),
        },
        ClassifyMode::Date => file.modified.format("%Y/%m").to_string(),
        ClassifyMode::Size => file.size_bucket.label().to_string(),
    }
}

/// A report that can be turned into a completion message.
pub trait Report {
    /// Whether the operation counts as successful.
    fn succeeded(&self) -> bool;
    /// One-line human-readable summary.
    fn summary(&self) -> String;
}

/// Completion record: delivered once per operation, after the last progress
/// callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub success: bool,
    pub message: String,
}

impl OperationOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl<T: Report> From<OrganizeResult<T>> for OperationOutcome {
    fn from(result: OrganizeResult<T>) -> Self {
        match result {
            Ok(report) => Self {
                success: report.succeeded(),
                message: report.summary(),
            },
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

impl Report for UndoReport {
    fn succeeded(&self) -> bool {
        true
    }

    fn summary(&self) -> String {
        UndoReport::summary(self)
    }
}

impl Report for DuplicateReport {
    fn succeeded(&self) -> bool {
        true
    }

    fn summary(&self) -> String {
        DuplicateReport::summary(self)
    }
}

/// One file that reached its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Folder name the file was classified into.
    pub folder: String,
}

/// Outcome of an execute run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteReport {
    pub kind: OperationKind,
    /// Files copied or moved, in processing order.
    pub placed: Vec<PlacedFile>,
    /// Files that failed, with the reason.
    pub errors: Vec<(PathBuf, String)>,
    /// Set when the journal could not be written after the run.
    pub journal_error: Option<String>,
}

impl ExecuteReport {
    fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            placed: Vec::new(),
            errors: Vec::new(),
            journal_error: None,
        }
    }

    pub fn any_succeeded(&self) -> bool {
        !self.placed.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut message = format!("Processed: {} files", self.placed.len());
        if !self.errors.is_empty() {
            message.push_str(&format!(" | Errors: {}", self.errors.len()));
        }
        message
    }

    /// Number of placed files per destination folder.
    pub fn folder_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for placed in &self.placed {
            *counts.entry(placed.folder.clone()).or_insert(0) += 1;
        }
        counts
    }
}

impl Report for ExecuteReport {
    fn succeeded(&self) -> bool {
        self.any_succeeded()
    }

    fn summary(&self) -> String {
        ExecuteReport::summary(self)
    }
}

/// Orchestrates scanning, placement, duplicate search and undo.
pub struct OrganizerEngine {
    journal: OperationJournal,
    scanned: Option<Vec<FileMetadata>>,
}

impl OrganizerEngine {
    pub fn new(journal: OperationJournal) -> Self {
        Self {
            journal,
            scanned: None,
        }
    }

    pub fn journal(&self) -> &OperationJournal {
        &self.journal
    }

    /// Files kept by the last scan, if it is still valid.
    pub fn scanned(&self) -> Option<&[FileMetadata]> {
        self.scanned.as_deref()
    }

    /// Walks the source directory and caches the files that pass the filter.
    ///
    /// Enumeration runs first so that progress can report `(examined, total)`.
    /// Entries that cannot be read are logged and skipped.
    ///
    /// # Errors
    ///
    /// Fails if the source directory is unset or not a directory.
    pub fn scan<F>(
        &mut self,
        config: &OrganizerConfig,
        mut on_progress: F,
    ) -> OrganizeResult<&[FileMetadata]>
    where
        F: FnMut(usize, usize),
    {
        self.scanned = None;
        let source = validate_source(config)?;
        let filter = config.filter();

        let max_depth = if filter.recursive() { usize::MAX } else { 1 };
        let candidates: Vec<PathBuf> = WalkDir::new(source)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                    None
                }
            })
            .filter(|entry| {
                if entry.file_type().is_symlink() {
                    tracing::debug!(path = %entry.path().display(), "skipping symbolic link");
                    return false;
                }
                entry.file_type().is_file()
            })
            .map(|entry| entry.into_path())
            .collect();

        let total = candidates.len();
        let mut matched = Vec::new();

        for (i, path) in candidates.iter().enumerate() {
            match FileMetadata::from_path(path) {
                Ok(file) => {
                    if rule_filter::matches(&file, filter) {
                        matched.push(file);
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        path = %path.display(),
                        error = %e,
                        "skipping file without metadata"
                    );
                }
            }
            on_progress(i + 1, total);
        }

        tracing::info!(
            source = %source.display(),
            examined = total,
            matched = matched.len(),
            "scan finished"
        );

        let scanned: &[FileMetadata] = self.scanned.insert(matched);
        Ok(scanned)
    }

    /// Display rows for the cached scan set. Empty if nothing is cached.
    pub fn preview(&self) -> Vec<PreviewEntry> {
        self.scanned
            .iter()
            .flatten()
            .map(FileMetadata::preview)
            .collect()
    }

    pub fn resolve_destination_folder(
        &self,
        file: &FileMetadata,
        config: &OrganizerConfig,
    ) -> String {
        resolve_destination_folder(file, config.policy())
    }

    /// Copies or moves every cached file into its destination folder.
    ///
    /// Scans first when no files are cached. A failure on one file is recorded
    /// and the run continues. Moves are journaled so they can be undone; the
    /// journal is committed at the end whatever the error count.
    ///
    /// # Errors
    ///
    /// * a configuration error if source or destination is unset or missing
    /// * [`OrganizeError::NoMatchingFiles`] if the scan yields nothing
    pub fn execute<F>(
        &mut self,
        config: &OrganizerConfig,
        mut on_progress: F,
    ) -> OrganizeResult<ExecuteReport>
    where
        F: FnMut(usize, usize),
    {
        validate_source(config)?;
        let destination = validate_destination(config)?;

        if self.scanned.as_ref().is_none_or(Vec::is_empty) {
            self.scan(config, |_, _| {})?;
        }

        let files = self.scanned.take().unwrap_or_default();
        if files.is_empty() {
            self.scanned = Some(files);
            return Err(OrganizeError::NoMatchingFiles);
        }

        let kind = config.operation();
        let total = files.len();
        let mut report = ExecuteReport::new(kind);

        tracing::info!(%kind, files = total, destination = %destination.display(), "executing");
        self.journal.begin(kind);

        for (i, file) in files.iter().enumerate() {
            let folder = resolve_destination_folder(file, config.policy());

            match FileOrganizer::place(&file.path, destination, &folder, kind) {
                Ok(placed) => {
                    tracing::debug!(
                        from = %file.path.display(),
                        to = %placed.display(),
                        "placed file"
                    );
                    if kind == OperationKind::Move {
                        self.journal.record(&file.path, &placed);
                    }
                    report.placed.push(PlacedFile {
                        source: file.path.clone(),
                        destination: placed,
                        folder,
                    });
                }
                Err(e) => {
                    tracing::warn!(path = %file.path.display(), error = %e, "failed to place file");
                    report.errors.push((file.path.clone(), e.to_string()));
                }
            }
            on_progress(i + 1, total);
        }

        if let Err(e) = self.journal.commit() {
            tracing::warn!(error = %e, "could not save history");
            report.journal_error = Some(e.to_string());
        }

        // Moved files are no longer where the scan saw them.
        if kind == OperationKind::Copy {
            self.scanned = Some(files);
        }

        tracing::info!(
            placed = report.placed.len(),
            errors = report.errors.len(),
            "execute finished"
        );
        Ok(report)
    }

    /// Groups the cached files by identical content, scanning first if
    /// nothing is cached.
    ///
    /// When a scan is cached, its file set is searched as is and `config` is
    /// not consulted: the filters of that earlier scan apply. Call
    /// [`OrganizerEngine::scan`] first to search a different set, for example
    /// an unfiltered one.
    pub fn find_duplicates<F>(
        &mut self,
        config: &OrganizerConfig,
        on_progress: F,
    ) -> OrganizeResult<DuplicateReport>
    where
        F: FnMut(usize, usize),
    {
        if self.scanned.as_ref().is_none_or(Vec::is_empty) {
            self.scan(config, |_, _| {})?;
        }

        let files = self.scanned.as_deref().unwrap_or_default();
        Ok(duplicates::find(files, on_progress))
    }

    /// Reverses the most recent move batch.
    pub fn undo<F>(&mut self, on_progress: F) -> OrganizeResult<UndoReport>
    where
        F: FnMut(usize, usize),
    {
        self.journal.undo_last(on_progress)
    }

    /// Up to `count` most recent batches, newest first.
    pub fn history(&self, count: usize) -> Vec<&Batch> {
        self.journal.recent(count)
    }
}

fn validate_source(config: &OrganizerConfig) -> OrganizeResult<&Path> {
    let source = config.source().ok_or(OrganizeError::MissingSource)?;
    if !source.is_dir() {
        return Err(OrganizeError::InvalidSource(source.to_path_buf()));
    }
    Ok(source)
}

fn validate_destination(config: &OrganizerConfig) -> OrganizeResult<&Path> {
    let destination = config.destination().ok_or(OrganizeError::MissingDestination)?;
    if !destination.is_dir() {
        return Err(OrganizeError::InvalidDestination(destination.to_path_buf()));
    }
    Ok(destination)
}
