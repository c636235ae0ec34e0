/// File metadata snapshots collected during a scan.
///
/// A [`FileMetadata`] is built once per visited directory entry and never
/// changes afterwards. Content hashes are not part of it: they are computed on
/// demand by the duplicate detector.
///
/// # Examples
///
/// ```
/// use tidysort::file_metadata::SizeBucket;
///
/// assert_eq!(SizeBucket::from_size(512), SizeBucket::Small);
/// assert_eq!(SizeBucket::from_size(5 * 1024 * 1024), SizeBucket::Medium);
/// assert_eq!(SizeBucket::Huge.label(), "Huge (over 1 GB)");
/// ```
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// Fixed, ordered byte-size ranges used for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SizeBucket {
    /// Under 1 MiB.
    Small,
    /// 1 MiB up to 100 MiB.
    Medium,
    /// 100 MiB up to 1 GiB.
    Large,
    /// 1 GiB and above.
    Huge,
}

impl SizeBucket {
    /// All buckets, smallest first.
    pub const ALL: [SizeBucket; 4] = [
        SizeBucket::Small,
        SizeBucket::Medium,
        SizeBucket::Large,
        SizeBucket::Huge,
    ];

    pub fn from_size(size: u64) -> Self {
        match size {
            s if s < MIB => SizeBucket::Small,
            s if s < 100 * MIB => SizeBucket::Medium,
            s if s < GIB => SizeBucket::Large,
            _ => SizeBucket::Huge,
        }
    }

    /// Folder-safe label, also used as the destination folder name.
    pub fn label(&self) -> &'static str {
        match self {
            SizeBucket::Small => "Small (under 1 MB)",
            SizeBucket::Medium => "Medium (1 MB - 100 MB)",
            SizeBucket::Large => "Large (100 MB - 1 GB)",
            SizeBucket::Huge => "Huge (over 1 GB)",
        }
    }
}

/// Immutable snapshot of one regular file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    /// Absolute path at scan time.
    pub path: PathBuf,
    /// Base name, including the extension.
    pub name: String,
    /// Lowercase extension with its leading `.`, or empty.
    pub extension: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: DateTime<Local>,
    /// Bucket derived from `size`.
    pub size_bucket: SizeBucket,
}

impl FileMetadata {
    /// Reads the metadata of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying error when the file cannot be stat'ed or its
    /// modification time is unavailable on this platform.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let meta = fs::metadata(path)?;
        let modified: DateTime<Local> = meta.modified()?.into();
        Ok(Self::new(path.to_path_buf(), meta.len(), modified))
    }

    /// Builds a snapshot from already-known values, deriving name, extension
    /// and size bucket.
    pub fn new(path: PathBuf, size: u64, modified: DateTime<Local>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();

        Self {
            path,
            name,
            extension,
            size,
            modified,
            size_bucket: SizeBucket::from_size(size),
        }
    }

    /// Lightweight record for display.
    pub fn preview(&self) -> PreviewEntry {
        PreviewEntry {
            name: self.name.clone(),
            extension: self.extension.clone(),
            size: format_size(self.size),
            modified: self.modified.to_rfc3339(),
            size_bucket: self.size_bucket.label().to_string(),
        }
    }
}

/// Read-only preview row derived from a scanned file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewEntry {
    pub name: String,
    pub extension: String,
    /// Human-readable size, e.g. `1.5 KB`.
    pub size: String,
    /// ISO 8601 modification timestamp.
    pub modified: String,
    pub size_bucket: String,
}

/// Formats a byte count for display.
///
/// ```
/// use tidysort::file_metadata::format_size;
///
/// assert_eq!(format_size(999), "999 B");
/// assert_eq!(format_size(1536), "1.5 KB");
/// assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
/// ```
pub fn format_size(size: u64) -> String {
    if size < KIB {
        format!("{} B", size)
    } else if size < MIB {
        format!("{:.1} KB", size as f64 / KIB as f64)
    } else if size < GIB {
        format!("{:.1} MB", size as f64 / MIB as f64)
    } else {
        format!("{:.2} GB", size as f64 / GIB as f64)
    }
}
