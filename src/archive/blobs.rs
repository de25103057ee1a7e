//! Registry of blobs already written to an archive

use crate::error::{ArchiveError, Result};
use crate::image::{BlobInfo, Digest};
use std::collections::HashMap;

/// Per-archive map of stored blobs, keyed by digest.
///
/// Grows monotonically for the lifetime of the owning writer.
#[derive(Debug, Default)]
pub struct BlobRegistry {
    blobs: HashMap<Digest, u64>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether a blob with `info.digest` was already stored.
    ///
    /// Returns the recorded digest and size on a hit; the recorded size is
    /// authoritative over `info.size`. A miss is `Ok(None)`, not an error.
    pub fn try_reuse(&self, info: &BlobInfo) -> Result<Option<BlobInfo>> {
        let Some(digest) = &info.digest else {
            return Err(ArchiveError::invalid_input(
                "Can not check for a blob with unknown digest",
            ));
        };
        Ok(self
            .blobs
            .get(digest)
            .map(|size| BlobInfo::new(digest.clone(), *size)))
    }

    /// Records a stored blob, replacing any previous entry for the digest.
    pub fn record(&mut self, digest: Digest, size: u64) {
        self.blobs.insert(digest, size);
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}
