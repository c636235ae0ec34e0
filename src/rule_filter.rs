//! Rule-based file filtering.
//!
//! Checks are performed in this order, with early termination:
//! 1. Extension allow-list (empty list accepts everything)
//! 2. Required name substring (case-insensitive)
//! 3. Forbidden name substring (case-insensitive)
//! 4. Inclusive size range

use crate::config::FilterConfig;
use crate::file_metadata::FileMetadata;

/// Returns true if `file` passes every rule in `filter`.
pub fn matches(file: &FileMetadata, filter: &FilterConfig) -> bool {
    if !filter.extensions().is_empty() && !filter.extensions().contains(&file.extension) {
        return false;
    }

    let name = file.name.to_lowercase();

    if !filter.must_contain().is_empty() && !name.contains(filter.must_contain()) {
        return false;
    }

    if !filter.must_not_contain().is_empty() && name.contains(filter.must_not_contain()) {
        return false;
    }

    if file.size < filter.min_size() {
        return false;
    }

    if let Some(max) = filter.max_size()
        && file.size > max
    {
        return false;
    }

    true
}
