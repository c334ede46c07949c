use anyhow::{Context, Result};
use gitlite_core::{Repository, REPO_DIR};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Manages isolated working directories with tempfile
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    /// Create an empty workspace
    pub fn empty() -> Result<Self> {
        let dir = TempDir::new().context("Failed to create temp directory")?;
        Ok(Self { dir })
    }

    /// Create workspace with initial files
    pub fn with_files(files: HashMap<String, Vec<u8>>) -> Result<Self> {
        let workspace = Self::empty()?;
        for (path, content) in files {
            workspace.write_file(&path, &content)?;
        }
        Ok(workspace)
    }

    /// Get workspace path
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Initialize a repository in the workspace
    pub fn init_repo(&self) -> Result<Repository> {
        Ok(Repository::init(self.path())?)
    }

    /// Open the existing repository
    pub fn open_repo(&self) -> Result<Repository> {
        Ok(Repository::open(self.path())?)
    }

    /// Write file to workspace
    pub fn write_file(&self, path: &str, content: &[u8]) -> Result<()> {
        let full_path = self.path().join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directories for {}", path))?;
        }

        fs::write(&full_path, content)
            .with_context(|| format!("Failed to write file: {}", path))?;

        Ok(())
    }

    /// Read file from workspace
    pub fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.path().join(path);
        fs::read(&full_path).with_context(|| format!("Failed to read file: {}", path))
    }

    /// Delete file from workspace
    pub fn delete_file(&self, path: &str) -> Result<()> {
        fs::remove_file(self.path().join(path))
            .with_context(|| format!("Failed to delete file: {}", path))
    }

    /// Check if file exists
    pub fn file_exists(&self, path: &str) -> bool {
        self.path().join(path).exists()
    }

    /// Every working-tree file and its bytes, excluding the repository directory
    pub fn snapshot_files(&self) -> Result<BTreeMap<String, Vec<u8>>> {
        let mut files = BTreeMap::new();
        collect_files(self.path(), self.path(), &mut files)?;
        Ok(files)
    }

    /// Number of stored blob objects
    pub fn object_count(&self) -> Result<usize> {
        let objects = self.path().join(REPO_DIR).join("objects");
        if !objects.exists() {
            return Ok(0);
        }
        let mut count = 0;
        for shard in fs::read_dir(objects)? {
            count += fs::read_dir(shard?.path())?.count();
        }
        Ok(count)
    }
}

fn collect_files(root: &Path, dir: &Path, files: &mut BTreeMap<String, Vec<u8>>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if dir == root && entry.file_name() == REPO_DIR {
            continue;
        }
        if entry.file_type()?.is_dir() {
            collect_files(root, &path, files)?;
        } else {
            let rel = path
                .strip_prefix(root)?
                .to_string_lossy()
                .replace('\\', "/");
            files.insert(rel, fs::read(&path)?);
        }
    }
    Ok(())
}
