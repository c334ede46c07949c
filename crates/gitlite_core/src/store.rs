//! Typed key-value record store over the `.gitlite` directory.
//!
//! Every persisted piece of repository state is a [`RecordKey`]: a handful of
//! singleton records (staging area, commit set, branch map, ...), one line
//! file per branch head, and one object file per blob. All writes replace the
//! whole file atomically (temp file + fsync + rename); nothing is appended.

use crate::error::{GitliteError, Result};
use crate::ObjectId;
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Identifies one persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKey<'a> {
    /// The staging area.
    StagingArea,
    /// The complete commit set.
    Commits,
    /// Path -> most recently added blob id.
    BlobIndex,
    /// Branch name -> commit id.
    BranchMap,
    /// Current HEAD commit id.
    Head,
    /// Name of the checked-out branch.
    CurrentBranch,
    /// Head commit id of a single branch.
    BranchHead(&'a str),
    /// A stored blob object.
    Blob(ObjectId),
}

impl RecordKey<'_> {
    /// Path of the record relative to the repository directory.
    pub fn relative_path(&self) -> PathBuf {
        match self {
            Self::StagingArea => PathBuf::from("staging.json"),
            Self::Commits => PathBuf::from("commits.json"),
            Self::BlobIndex => PathBuf::from("blobs.json"),
            Self::BranchMap => PathBuf::from("branches.json"),
            Self::Head => PathBuf::from("HEAD"),
            Self::CurrentBranch => PathBuf::from("CURRENT_BRANCH"),
            Self::BranchHead(name) => Path::new("branches").join(name),
            Self::Blob(id) => Path::new("objects").join(id.shard()).join(id.as_hex()),
        }
    }
}

/// Flat-file record storage rooted at a repository directory.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    /// Creates a store rooted at the given `.gitlite` directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Returns the repository directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a record.
    pub fn path(&self, key: RecordKey<'_>) -> PathBuf {
        self.root.join(key.relative_path())
    }

    /// Checks if a record exists.
    pub fn exists(&self, key: RecordKey<'_>) -> bool {
        self.path(key).is_file()
    }

    /// Reads and deserializes a JSON record.
    ///
    /// # Errors
    ///
    /// Returns `MissingRecord` if the file is absent and `CorruptedRecord` if
    /// it does not parse.
    pub fn get_json<T: DeserializeOwned>(&self, key: RecordKey<'_>) -> Result<T> {
        let path = self.path(key);
        let content = self.read_existing(&path)?;
        serde_json::from_slice(&content).map_err(|e| GitliteError::CorruptedRecord {
            path,
            reason: e.to_string(),
        })
    }

    /// Serializes a value as pretty JSON and replaces the record.
    pub fn put_json<T: Serialize>(&self, key: RecordKey<'_>, value: &T) -> Result<()> {
        let mut content = serde_json::to_vec_pretty(value)
            .map_err(|e| GitliteError::Serialization(e.to_string()))?;
        content.push(b'\n');
        self.write_atomic(&self.path(key), &content)
    }

    /// Reads a single-line text record, trimmed.
    pub fn get_line(&self, key: RecordKey<'_>) -> Result<String> {
        let path = self.path(key);
        let content = self.read_existing(&path)?;
        let text = String::from_utf8(content).map_err(|e| GitliteError::CorruptedRecord {
            path,
            reason: e.to_string(),
        })?;
        Ok(text.trim().to_string())
    }

    /// Replaces a single-line text record.
    pub fn put_line(&self, key: RecordKey<'_>, line: &str) -> Result<()> {
        self.write_atomic(&self.path(key), format!("{}\n", line).as_bytes())
    }

    /// Reads a record holding one hex commit id.
    pub fn get_id(&self, key: RecordKey<'_>) -> Result<ObjectId> {
        let line = self.get_line(key)?;
        ObjectId::from_hex(&line).map_err(|e| GitliteError::CorruptedRecord {
            path: self.path(key),
            reason: e.to_string(),
        })
    }

    /// Replaces a record holding one hex commit id.
    pub fn put_id(&self, key: RecordKey<'_>, id: ObjectId) -> Result<()> {
        self.put_line(key, &id.as_hex())
    }

    /// Reads raw record bytes.
    pub fn get_bytes(&self, key: RecordKey<'_>) -> Result<Vec<u8>> {
        self.read_existing(&self.path(key))
    }

    /// Replaces raw record bytes.
    pub fn put_bytes(&self, key: RecordKey<'_>, bytes: &[u8]) -> Result<()> {
        self.write_atomic(&self.path(key), bytes)
    }

    /// Deletes a record. Does nothing if it doesn't exist.
    pub fn delete(&self, key: RecordKey<'_>) -> Result<()> {
        let path = self.path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(GitliteError::Io(e)),
        }
    }

    /// Lists the names of all per-branch head files, sorted.
    pub fn list_branch_heads(&self) -> Result<Vec<String>> {
        let dir = self.root.join("branches");
        if !dir.exists() {
            return Ok(vec![]);
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) == Some("tmp") {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_existing(&self, path: &Path) -> Result<Vec<u8>> {
        match fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(GitliteError::MissingRecord(path.to_path_buf()))
            }
            Err(e) => Err(GitliteError::Io(e)),
        }
    }

    /// Writes bytes to `path` atomically.
    ///
    /// Uses temp file + fsync + rename for crash safety.
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("tmp");

        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }

        fs::rename(&tmp_path, path)?;

        // fsync parent directory (Unix-specific for crash safety)
        #[cfg(unix)]
        {
            if let Some(parent) = path.parent() {
                if let Ok(dir_file) = File::open(parent) {
                    let _ = dir_file.sync_all();
                }
            }
        }

        Ok(())
    }
}
