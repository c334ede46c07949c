//! Content-addressed blob storage with integrity verification.

use crate::error::{GitliteError, Result};
use crate::object_id::{canonical_bytes, ObjectKind, HEADER_LEN, MAGIC};
use crate::store::{RecordKey, RecordStore};
use crate::types::Blob;
use crate::worktree::WorkingTree;
use crate::ObjectId;
use tracing::debug;

/// Default maximum size for a single blob (100 MB).
pub const DEFAULT_MAX_BLOB_SIZE: usize = 100 * 1024 * 1024;

/// Content-addressed blob storage.
///
/// Each blob is written once under its id as an envelope (magic, kind,
/// length) around the postcard-encoded [`Blob`]. Reads re-hash the content
/// and reject objects that do not match their id.
pub struct BlobStore {
    records: RecordStore,
    max_blob_size: usize,
}

impl BlobStore {
    /// Creates a blob store over the repository's record store.
    pub fn new(records: RecordStore, max_blob_size: usize) -> Self {
        Self {
            records,
            max_blob_size,
        }
    }

    /// Snapshots the working-tree file at `path` and returns its blob id.
    ///
    /// Identical content yields the identical id and no second write.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if `path` is not a file in the working tree,
    /// `BlobTooLarge` if it exceeds the configured limit.
    pub fn put(&self, worktree: &WorkingTree, path: &str) -> Result<ObjectId> {
        let content = worktree.read(path)?;
        self.put_bytes(content, path)
    }

    /// Stores raw content attributed to `source_path`.
    pub fn put_bytes(&self, content: Vec<u8>, source_path: &str) -> Result<ObjectId> {
        if content.len() > self.max_blob_size {
            return Err(GitliteError::BlobTooLarge {
                size: content.len(),
                limit: self.max_blob_size,
            });
        }

        let blob = Blob::new(content, source_path);
        let id = blob.id();

        if self.exists(id) {
            debug!(blob = %id.short(), path = source_path, "blob already stored");
            return Ok(id);
        }

        let payload =
            postcard::to_allocvec(&blob).map_err(|e| GitliteError::Serialization(e.to_string()))?;
        self.records
            .put_bytes(RecordKey::Blob(id), &canonical_bytes(ObjectKind::Blob, &payload))?;
        debug!(blob = %id.short(), path = source_path, "stored blob");

        Ok(id)
    }

    /// Retrieves blob content by id.
    ///
    /// # Errors
    ///
    /// Returns `CorruptedObject` if the object is missing, malformed, or its
    /// content does not hash to `id`. Every id passed here comes from a tree
    /// or the staging area, so a missing object is corruption.
    pub fn get(&self, id: ObjectId) -> Result<Vec<u8>> {
        Ok(self.get_blob(id)?.content)
    }

    /// Retrieves the full blob record.
    pub fn get_blob(&self, id: ObjectId) -> Result<Blob> {
        let corrupted = |reason: String| GitliteError::CorruptedObject {
            id: id.as_hex(),
            reason,
        };

        let bytes = match self.records.get_bytes(RecordKey::Blob(id)) {
            Ok(bytes) => bytes,
            Err(GitliteError::MissingRecord(_)) => {
                return Err(corrupted("object is missing".to_string()))
            }
            Err(e) => return Err(e),
        };

        if bytes.len() < HEADER_LEN {
            return Err(corrupted("object too small".to_string()));
        }
        if &bytes[..MAGIC.len()] != MAGIC {
            return Err(corrupted("invalid magic bytes".to_string()));
        }
        if bytes[MAGIC.len()] != ObjectKind::Blob as u8 {
            return Err(corrupted(format!("unexpected kind {}", bytes[MAGIC.len()])));
        }

        let mut len_bytes = [0u8; 8];
        len_bytes.copy_from_slice(&bytes[MAGIC.len() + 1..HEADER_LEN]);
        let len = u64::from_le_bytes(len_bytes) as usize;
        let payload = &bytes[HEADER_LEN..];
        if payload.len() != len {
            return Err(corrupted(format!(
                "length mismatch: header says {}, got {}",
                len,
                payload.len()
            )));
        }

        let blob: Blob = postcard::from_bytes(payload).map_err(|e| corrupted(e.to_string()))?;
        let actual = blob.id();
        if actual != id {
            return Err(corrupted(format!("content hashes to {}", actual.as_hex())));
        }

        Ok(blob)
    }

    /// Checks if a blob object exists.
    pub fn exists(&self, id: ObjectId) -> bool {
        self.records.exists(RecordKey::Blob(id))
    }
}
