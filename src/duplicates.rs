//! Two-phase duplicate detection.
//!
//! Files are first bucketed by exact size; only buckets with more than one
//! member are hashed, so a file with a unique size is never read. Hash groups
//! with at least two members are reported.

use crate::file_metadata::FileMetadata;
use crate::hasher::{self, ContentHash};
use std::collections::HashMap;

/// Files sharing one size and one content hash. Always at least two members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub hash: ContentHash,
    pub size: u64,
    /// Members in discovery order.
    pub files: Vec<FileMetadata>,
}

impl DuplicateGroup {
    /// First member by discovery order. Not necessarily the oldest file.
    pub fn original(&self) -> &FileMetadata {
        &self.files[0]
    }

    /// Every member after the original.
    pub fn duplicates(&self) -> &[FileMetadata] {
        &self.files[1..]
    }

    /// Bytes that removing the duplicates would free.
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicates().len() as u64
    }
}

/// Result of a duplicate search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    /// Groups in size-bucket discovery order.
    pub groups: Vec<DuplicateGroup>,
}

impl DuplicateReport {
    /// Number of redundant copies across all groups.
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(|g| g.duplicates().len()).sum()
    }

    /// Total bytes held by redundant copies.
    pub fn wasted_space(&self) -> u64 {
        self.groups.iter().map(DuplicateGroup::wasted_space).sum()
    }

    pub fn group(&self, hash: ContentHash) -> Option<&DuplicateGroup> {
        self.groups.iter().find(|g| g.hash == hash)
    }

    pub fn summary(&self) -> String {
        format!(
            "Found {} duplicate {} in {} {}",
            self.duplicate_count(),
            if self.duplicate_count() == 1 { "file" } else { "files" },
            self.groups.len(),
            if self.groups.len() == 1 { "group" } else { "groups" },
        )
    }
}

/// Groups `files` into clusters of byte-identical content.
///
/// `on_progress` receives `(hashed, total)` after each successful hash, where
/// `total` counts the files in multi-member size buckets. Files that cannot be
/// read are left out of every group.
pub fn find<F>(files: &[FileMetadata], mut on_progress: F) -> DuplicateReport
where
    F: FnMut(usize, usize),
{
    let mut size_order: Vec<u64> = Vec::new();
    let mut by_size: HashMap<u64, Vec<&FileMetadata>> = HashMap::new();
    for file in files {
        by_size
            .entry(file.size)
            .or_insert_with(|| {
                size_order.push(file.size);
                Vec::new()
            })
            .push(file);
    }

    let total: usize = by_size.values().filter(|b| b.len() > 1).map(Vec::len).sum();
    tracing::debug!(
        files = files.len(),
        candidates = total,
        "bucketed files by size"
    );

    let mut report = DuplicateReport::default();
    let mut hashed = 0;

    for size in size_order {
        let bucket = &by_size[&size];
        if bucket.len() < 2 {
            continue;
        }

        let mut hash_order: Vec<ContentHash> = Vec::new();
        let mut by_hash: HashMap<ContentHash, Vec<FileMetadata>> = HashMap::new();

        for file in bucket {
            let hash = match hasher::digest(&file.path) {
                Ok(hash) => hash,
                Err(e) => {
                    tracing::debug!(
                        path = %file.path.display(),
                        error = %e,
                        "skipping unreadable file"
                    );
                    continue;
                }
            };

            by_hash
                .entry(hash)
                .or_insert_with(|| {
                    hash_order.push(hash);
                    Vec::new()
                })
                .push((*file).clone());

            hashed += 1;
            on_progress(hashed, total);
        }

        for hash in hash_order {
            if let Some(members) = by_hash.remove(&hash)
                && members.len() > 1
            {
                report.groups.push(DuplicateGroup {
                    hash,
                    size,
                    files: members,
                });
            }
        }
    }

    tracing::info!(
        groups = report.groups.len(),
        duplicates = report.duplicate_count(),
        "duplicate search finished"
    );
    report
}
