//! Working directory access and path normalization.

use crate::error::{GitliteError, Result};
use crate::types::Tree;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Name of the repository directory inside the working tree.
pub const REPO_DIR: &str = ".gitlite";

/// The user's working directory, minus the repository directory.
///
/// All paths are repository-relative strings with `/` separators.
#[derive(Debug, Clone)]
pub struct WorkingTree {
    root: PathBuf,
}

impl WorkingTree {
    /// Creates a handle for the working tree rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Returns the working tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists every regular file, recursively, sorted.
    pub fn list_files(&self) -> Result<BTreeSet<String>> {
        let mut files = BTreeSet::new();
        self.collect_files(&self.root, &mut files)?;
        Ok(files)
    }

    /// Returns true if `path` is a regular file.
    pub fn is_file(&self, path: &str) -> bool {
        self.absolute(path).is_file()
    }

    /// Reads a file's bytes.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if `path` is not a regular file.
    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.absolute(path);
        if !full.is_file() {
            return Err(GitliteError::FileNotFound(path.to_string()));
        }
        Ok(fs::read(full)?)
    }

    /// Writes a file, creating parent directories as needed.
    pub fn write(&self, path: &str, content: &[u8]) -> Result<()> {
        let full = self.absolute(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, content)?;
        Ok(())
    }

    /// Deletes a file if present and prunes directories it leaves empty.
    pub fn remove(&self, path: &str) -> Result<()> {
        let full = self.absolute(path);
        match fs::remove_file(&full) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(GitliteError::Io(e)),
        }

        let mut dir = full.parent();
        while let Some(d) = dir {
            if d == self.root || fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
        Ok(())
    }

    fn absolute(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn collect_files(&self, dir: &Path, files: &mut BTreeSet<String>) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;

            if dir == self.root && entry.file_name() == REPO_DIR {
                continue;
            }

            if file_type.is_dir() {
                self.collect_files(&path, files)?;
            } else if file_type.is_file() {
                if let Ok(rel) = path.strip_prefix(&self.root) {
                    files.insert(to_slash_path(rel));
                }
            }
        }
        Ok(())
    }
}

fn to_slash_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Normalizes a user-supplied path to repository-relative form.
///
/// Strips `.` components and redundant separators. Rejects empty, absolute,
/// parent-escaping paths and paths inside the repository directory.
pub fn normalize_path(input: &str) -> Result<String> {
    let invalid = || GitliteError::InvalidPath(input.to_string());

    let mut parts = Vec::new();
    for component in Path::new(input).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(invalid)?.to_string()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(invalid())
            }
        }
    }

    if parts.is_empty() || parts[0] == REPO_DIR {
        return Err(invalid());
    }

    Ok(parts.join("/"))
}

/// Paths that `switch`/`reset` would clobber: present in the working tree,
/// untracked by HEAD, tracked by the target commit. Sorted.
pub fn untracked_conflicts(
    worktree_paths: &BTreeSet<String>,
    head_tree: &Tree,
    target_tree: &Tree,
) -> Vec<String> {
    worktree_paths
        .iter()
        .filter(|path| !head_tree.contains_key(*path) && target_tree.contains_key(*path))
        .cloned()
        .collect()
}

/// Files left in place by a checkout that would stop `target_tree` from
/// being written: a file where the target needs a directory, or a file
/// inside a directory the target needs as a file. Sorted.
pub fn blocking_paths(surviving: &BTreeSet<String>, target_tree: &Tree) -> Vec<String> {
    surviving
        .iter()
        .filter(|path| {
            target_tree
                .keys()
                .any(|target| is_nested(target, path) || is_nested(path, target))
        })
        .cloned()
        .collect()
}

fn is_nested(child: &str, dir: &str) -> bool {
    child.len() > dir.len() && child.starts_with(dir) && child.as_bytes()[dir.len()] == b'/'
}
