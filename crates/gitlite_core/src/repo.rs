//! Repository handle providing the gitlite command API.

use crate::blob_store::BlobStore;
use crate::config::Config;
use crate::error::{GitliteError, Result};
use crate::lock::LockGuard;
use crate::staging::AddOutcome;
use crate::state::RepoState;
use crate::status::StatusReport;
use crate::store::RecordStore;
use crate::types::Commit;
use crate::worktree::{
    blocking_paths, normalize_path, untracked_conflicts, WorkingTree, REPO_DIR,
};
use crate::ObjectId;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// gitlite repository handle.
///
/// Holds no repository state between calls: every command loads a
/// [`RepoState`], computes the complete new state in memory, applies
/// working-tree effects and then rewrites every record. Mutating commands
/// hold the repository lock for their duration.
pub struct Repository {
    /// Working tree root (parent of `.gitlite`).
    root: PathBuf,
    records: RecordStore,
    blobs: BlobStore,
    worktree: WorkingTree,
    config: Config,
    /// Time provider for testing (None = use system time).
    time_provider: Option<Arc<dyn Fn() -> i64 + Send + Sync>>,
}

/// Which working-tree files a checkout deletes besides those it overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    /// Files HEAD tracks and the target does not (`switch`).
    Tracked,
    /// Every file the target does not track (`reset`).
    All,
}

impl Repository {
    /// Initializes a repository with default configuration.
    ///
    /// Creates `.gitlite/` with the config file, the root commit, the default
    /// branch pointing at it, an empty staging area and an empty blob index.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyInitialized` if `.gitlite/` already exists.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gitlite_core::Repository;
    ///
    /// let repo = Repository::init(".").unwrap();
    /// ```
    pub fn init(path: impl AsRef<Path>) -> Result<Self> {
        Self::init_with_config(path, Config::default())
    }

    /// Initializes a repository with the given configuration.
    pub fn init_with_config(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let repo_dir = root.join(REPO_DIR);
        if repo_dir.exists() {
            return Err(GitliteError::AlreadyInitialized);
        }

        let state = RepoState::initial(&config.core.default_branch)?;

        fs::create_dir_all(&repo_dir)?;
        config.save(&repo_dir)?;
        let repo = Self::assemble(root, config);
        state.save(&repo.records)?;

        info!(
            root = %repo.root.display(),
            branch = state.branches.current(),
            "initialized repository"
        );
        Ok(repo)
    }

    /// Opens an existing repository rooted at `path`.
    ///
    /// # Errors
    ///
    /// Returns `NotARepository` if `path/.gitlite` is missing, `ConfigError` if
    /// the config file does not parse.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gitlite_core::Repository;
    ///
    /// let repo = Repository::open(".").unwrap();
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let repo_dir = root.join(REPO_DIR);
        if !repo_dir.is_dir() {
            return Err(GitliteError::NotARepository(root));
        }
        let config = Config::load(&repo_dir)?;
        Ok(Self::assemble(root, config))
    }

    /// Sets a custom clock (unix seconds) used for commit timestamps.
    pub fn with_time_provider(
        mut self,
        provider: impl Fn() -> i64 + Send + Sync + 'static,
    ) -> Self {
        self.time_provider = Some(Arc::new(provider));
        self
    }

    fn assemble(root: PathBuf, config: Config) -> Self {
        let records = RecordStore::new(root.join(REPO_DIR));
        let blobs = BlobStore::new(records.clone(), config.storage.max_blob_size);
        let worktree = WorkingTree::new(&root);
        Self {
            root,
            records,
            blobs,
            worktree,
            config,
            time_provider: None,
        }
    }

    /// Working tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot of the persisted state.
    pub fn state(&self) -> Result<RepoState> {
        RepoState::load(&self.records)
    }

    /// Id of the commit HEAD points to.
    pub fn head(&self) -> Result<ObjectId> {
        Ok(self.state()?.branches.head())
    }

    /// Content of a stored blob.
    pub fn read_blob(&self, id: ObjectId) -> Result<Vec<u8>> {
        self.blobs.get(id)
    }

    /// Snapshots `path` and reconciles the staging area against HEAD.
    ///
    /// # Errors
    ///
    /// `InvalidPath`, `FileNotFound` if the file is absent, `BlobTooLarge`.
    pub fn add(&self, path: &str) -> Result<AddOutcome> {
        let path = normalize_path(path)?;
        let _lock = self.lock()?;
        let mut state = self.state()?;

        let blob = self.blobs.put(&self.worktree, &path)?;
        let committed = state.head_commit()?.blob_for(&path);
        let outcome = state.staging.reconcile_add(&path, blob, committed);
        state.blob_index.insert(path.clone(), blob);

        state.save(&self.records)?;
        debug!(path = %path, blob = %blob.short(), ?outcome, "add");
        Ok(outcome)
    }

    /// Records the staged changes as a new commit on the current branch.
    ///
    /// # Errors
    ///
    /// `EmptyMessage` for a blank message, `NothingToCommit` if nothing is
    /// staged.
    pub fn commit(&self, message: &str) -> Result<ObjectId> {
        if message.trim().is_empty() {
            return Err(GitliteError::EmptyMessage);
        }
        let _lock = self.lock()?;
        let mut state = self.state()?;
        if state.staging.is_empty() {
            return Err(GitliteError::NothingToCommit);
        }

        let head = state.branches.head();
        let mut tree = state.head_commit()?.tree().clone();
        for path in state.staging.staged_for_removal() {
            tree.remove(path);
        }
        for (path, blob) in state.staging.staged_for_addition() {
            tree.insert(path.clone(), *blob);
        }

        let id = state
            .graph
            .create_commit(message, Some(head), tree, self.now())?
            .id();
        state.branches.advance(id);
        state.staging.clear();

        state.save(&self.records)?;
        info!(
            commit = %id.short(),
            branch = state.branches.current(),
            "created commit"
        );
        Ok(id)
    }

    /// Unstages `path` and, if HEAD tracks it, stages its removal and deletes
    /// the working-tree file.
    ///
    /// # Errors
    ///
    /// `NoReasonToRemove` if the path is neither staged nor tracked.
    pub fn rm(&self, path: &str) -> Result<()> {
        let path = normalize_path(path)?;
        let _lock = self.lock()?;
        let mut state = self.state()?;

        let staged = state.staging.is_staged_for_addition(&path);
        let tracked = state.head_commit()?.tracks(&path);
        if !staged && !tracked {
            return Err(GitliteError::NoReasonToRemove);
        }

        state.staging.unstage_add(&path);
        if tracked {
            state.staging.stage_remove(&path);
        }

        state.save(&self.records)?;
        if tracked {
            self.worktree.remove(&path)?;
        }
        debug!(path = %path, tracked, "rm");
        Ok(())
    }

    /// Restores `path` from HEAD.
    ///
    /// # Errors
    ///
    /// `FileNotInCommit` if HEAD does not track the path.
    pub fn restore(&self, path: &str) -> Result<()> {
        let path = normalize_path(path)?;
        let _lock = self.lock()?;
        let mut state = self.state()?;
        let head = state.branches.head();

        self.restore_path(&mut state, head, &path)?;
        state.save(&self.records)
    }

    /// Restores `path` from the commit named by a full id or unique prefix.
    ///
    /// # Errors
    ///
    /// `CommitNotFound` / `AmbiguousCommitId` for a bad id, `FileNotInCommit`
    /// if that commit does not track the path.
    pub fn restore_from(&self, commit: &str, path: &str) -> Result<()> {
        let path = normalize_path(path)?;
        let _lock = self.lock()?;
        let mut state = self.state()?;
        let id = state.graph.resolve(commit)?;

        self.restore_path(&mut state, id, &path)?;
        state.save(&self.records)
    }

    // Both restore forms stage the minimal diff against HEAD afterwards.
    fn restore_path(&self, state: &mut RepoState, commit: ObjectId, path: &str) -> Result<()> {
        let blob = state
            .graph
            .get(commit)?
            .blob_for(path)
            .ok_or_else(|| GitliteError::FileNotInCommit(path.to_string()))?;
        let content = self.blobs.get(blob)?;
        let committed = state.head_commit()?.blob_for(path);

        let outcome = state.staging.reconcile_add(path, blob, committed);
        self.worktree.write(path, &content)?;
        debug!(path, commit = %commit.short(), ?outcome, "restored file");
        Ok(())
    }

    /// History from HEAD back to the root commit, newest first.
    pub fn log(&self) -> Result<Vec<Commit>> {
        let state = self.state()?;
        state
            .graph
            .ancestors(state.branches.head())
            .map(|c| c.cloned())
            .collect()
    }

    /// Every commit ever made, in no particular order.
    pub fn global_log(&self) -> Result<Vec<Commit>> {
        let state = self.state()?;
        Ok(state.graph.all_commits().cloned().collect())
    }

    /// Ids of commits whose message is exactly `message`.
    ///
    /// # Errors
    ///
    /// `NoCommitWithMessage` if there are none.
    pub fn find(&self, message: &str) -> Result<Vec<ObjectId>> {
        let ids = self.state()?.graph.find_by_message(message);
        if ids.is_empty() {
            return Err(GitliteError::NoCommitWithMessage(message.to_string()));
        }
        Ok(ids)
    }

    /// Branches, staged changes and working-tree drift. Writes nothing.
    pub fn status(&self) -> Result<StatusReport> {
        let state = self.state()?;
        StatusReport::compute(&state, &self.worktree)
    }

    /// Creates a branch at HEAD without switching to it.
    pub fn branch(&self, name: &str) -> Result<ObjectId> {
        let _lock = self.lock()?;
        let mut state = self.state()?;
        let id = state.branches.create_branch(name)?;
        state.save(&self.records)?;
        info!(branch = name, commit = %id.short(), "created branch");
        Ok(id)
    }

    /// Deletes a branch. Its commits are kept.
    pub fn rm_branch(&self, name: &str) -> Result<()> {
        let _lock = self.lock()?;
        let mut state = self.state()?;
        state.branches.delete_branch(name)?;
        state.save(&self.records)?;
        info!(branch = name, "removed branch");
        Ok(())
    }

    /// Checks out `name`: the working tree matches its commit, it becomes the
    /// current branch and the staging area is cleared. Files HEAD does not
    /// track are left where they are.
    ///
    /// # Errors
    ///
    /// `BranchNotFound`, `AlreadyOnBranch`, or `UntrackedFileInTheWay` before
    /// anything is touched.
    pub fn switch(&self, name: &str) -> Result<()> {
        let _lock = self.lock()?;
        let mut state = self.state()?;

        let target = state.branches.get(name)?;
        if state.branches.current() == name {
            return Err(GitliteError::AlreadyOnBranch(name.to_string()));
        }

        self.check_out_commit(&state, target, Sweep::Tracked)?;
        state.branches.check_out(name)?;
        state.staging.clear();

        state.save(&self.records)?;
        info!(branch = name, commit = %target.short(), "switched branch");
        Ok(())
    }

    /// Moves the current branch to a commit (full id or unique prefix) and
    /// replaces the whole working tree with its snapshot: files the commit
    /// does not track are deleted, untracked ones included. The staging area
    /// is cleared.
    ///
    /// # Errors
    ///
    /// `CommitNotFound` / `AmbiguousCommitId`, or `UntrackedFileInTheWay`
    /// before anything is touched.
    pub fn reset(&self, commit: &str) -> Result<ObjectId> {
        let _lock = self.lock()?;
        let mut state = self.state()?;
        let target = state.graph.resolve(commit)?;

        self.check_out_commit(&state, target, Sweep::All)?;
        state.branches.advance(target);
        state.staging.clear();

        state.save(&self.records)?;
        info!(
            branch = state.branches.current(),
            commit = %target.short(),
            "reset branch"
        );
        Ok(target)
    }

    /// Makes the working tree match `target`.
    ///
    /// Every precondition is checked and all blobs are read before the first
    /// removal, so a conflict or a corrupted object aborts with the working
    /// tree untouched.
    fn check_out_commit(&self, state: &RepoState, target: ObjectId, sweep: Sweep) -> Result<()> {
        let head_tree = state.head_commit()?.tree();
        let target_tree = state.graph.get(target)?.tree();
        let files = self.worktree.list_files()?;

        let candidates: Vec<&String> = match sweep {
            Sweep::Tracked => head_tree.keys().collect(),
            Sweep::All => files.iter().collect(),
        };
        let removals: BTreeSet<&str> = candidates
            .into_iter()
            .filter(|p| !target_tree.contains_key(*p))
            .map(String::as_str)
            .collect();
        let survivors: BTreeSet<String> = files
            .iter()
            .filter(|p| !target_tree.contains_key(*p) && !removals.contains(p.as_str()))
            .cloned()
            .collect();

        let mut conflicts = untracked_conflicts(&files, head_tree, target_tree);
        conflicts.extend(blocking_paths(&survivors, target_tree));
        if !conflicts.is_empty() {
            conflicts.sort();
            conflicts.dedup();
            return Err(GitliteError::UntrackedFileInTheWay { paths: conflicts });
        }

        let contents = target_tree
            .iter()
            .map(|(path, blob)| Ok((path.as_str(), self.blobs.get(*blob)?)))
            .collect::<Result<Vec<_>>>()?;

        for path in removals {
            self.worktree.remove(path)?;
        }
        for (path, content) in contents {
            self.worktree.write(path, &content)?;
        }
        Ok(())
    }

    fn lock(&self) -> Result<LockGuard> {
        LockGuard::acquire(self.records.root())
    }

    fn now(&self) -> i64 {
        match &self.time_provider {
            Some(provider) => provider(),
            None => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0),
        }
    }
}
