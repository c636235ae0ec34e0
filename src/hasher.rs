//! Streaming content digests for duplicate grouping.
//!
//! The digest only needs to separate different contents well enough for
//! equality grouping; it is not a security boundary.

use std::fmt;
use std::fs::File;
use std::hash::Hasher as _;
use std::io::{self, Read};
use std::path::Path;
use twox_hash::XxHash64;

/// Size of each read fed to the hash accumulator.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// 64-bit content digest, displayed as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(pub u64);

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Hashes the file at `path` in [`CHUNK_SIZE`] reads.
///
/// # Errors
///
/// Returns the I/O error if the file cannot be opened or a read fails part way.
pub fn digest(path: &Path) -> io::Result<ContentHash> {
    let file = File::open(path)?;
    digest_reader(file)
}

/// Hashes everything readable from `reader`.
pub fn digest_reader<R: Read>(mut reader: R) -> io::Result<ContentHash> {
    let mut hasher = XxHash64::with_seed(0);
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.write(&buffer[..read]);
    }

    Ok(ContentHash(hasher.finish()))
}
