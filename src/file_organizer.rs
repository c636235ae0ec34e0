/// Per-file placement: folder creation, collision-free naming, copy and move.
///
/// These helpers act on a single file and report failures as
/// [`PlacementError`] so the caller can record them and carry on with the
/// next file.
use crate::config::OperationKind;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure while placing one file into its destination folder.
#[derive(Debug, Error)]
pub enum PlacementError {
    /// Failed to create the destination folder.
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    /// The source path ends in `..` or is a root.
    #[error("Path has no file name: {}", .0.display())]
    NoFileName(PathBuf),

    /// Failed to copy the file.
    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// Failed to move the file.
    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

/// Places files into destination folders.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Copies or moves `file_path` into `dest_root/folder`, creating the folder
    /// if needed and never overwriting an existing file.
    ///
    /// Returns the final destination path.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tidysort::config::OperationKind;
    /// use tidysort::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let placed = FileOrganizer::place(
    ///     Path::new("/path/to/source/report.pdf"),
    ///     Path::new("/path/to/sorted"),
    ///     "pdf",
    ///     OperationKind::Move,
    /// );
    ///
    /// match placed {
    ///     Ok(path) => println!("Moved to {}", path.display()),
    ///     Err(e) => eprintln!("Placement failed: {}", e),
    /// }
    /// ```
    pub fn place(
        file_path: &Path,
        dest_root: &Path,
        folder: &str,
        kind: OperationKind,
    ) -> Result<PathBuf, PlacementError> {
        let folder_path = dest_root.join(folder);

        if !folder_path.is_dir() {
            fs::create_dir_all(&folder_path).map_err(|e| {
                PlacementError::DirectoryCreationFailed {
                    path: folder_path.clone(),
                    source: e,
                }
            })?;
        }

        let file_name = file_path
            .file_name()
            .ok_or_else(|| PlacementError::NoFileName(file_path.to_path_buf()))?;

        let destination = Self::unique_destination(&folder_path, file_name);

        match kind {
            OperationKind::Copy => {
                Self::copy_file(file_path, &destination).map_err(|e| PlacementError::CopyFailed {
                    from: file_path.to_path_buf(),
                    to: destination.clone(),
                    source: e,
                })?
            }
            OperationKind::Move => {
                Self::move_file(file_path, &destination).map_err(|e| PlacementError::MoveFailed {
                    from: file_path.to_path_buf(),
                    to: destination.clone(),
                    source: e,
                })?
            }
        }

        Ok(destination)
    }

    /// First free path for `file_name` inside `dir`.
    ///
    /// Tries `name.ext`, then `name_1.ext`, `name_2.ext`, ... The suffix goes
    /// before the last extension only. Names need not be valid UTF-8.
    pub fn unique_destination(dir: &Path, file_name: impl AsRef<OsStr>) -> PathBuf {
        let file_name = Path::new(file_name.as_ref());
        let candidate = dir.join(file_name);
        if !candidate.exists() {
            return candidate;
        }

        let stem = file_name.file_stem().unwrap_or(file_name.as_os_str());
        let ext = file_name.extension();

        let mut counter = 1;
        loop {
            let mut name = OsString::from(stem);
            name.push(format!("_{}", counter));
            if let Some(ext) = ext {
                name.push(".");
                name.push(ext);
            }

            let candidate = dir.join(&name);
            if !candidate.exists() {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Renames `from` to `to`, falling back to copy and delete when the two
    /// paths are on different filesystems.
    pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                tracing::debug!(
                    from = %from.display(),
                    to = %to.display(),
                    "cross-device move, copying"
                );
                Self::copy_file(from, to)?;
                fs::remove_file(from)
            }
            Err(e) => Err(e),
        }
    }

    /// Copies `from` to `to` and carries over the modification time.
    pub fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
        fs::copy(from, to)?;

        let modified = fs::metadata(from).and_then(|m| m.modified());
        let applied = modified.and_then(|time| {
            fs::OpenOptions::new()
                .write(true)
                .open(to)
                .and_then(|dest| dest.set_modified(time))
        });
        if let Err(e) = applied {
            tracing::debug!(
                path = %to.display(),
                error = %e,
                "could not preserve modification time"
            );
        }

        Ok(())
    }
}
