use super::assertions::Assertion;
use super::clock::MockClock;
use super::steps::{Action, CommitRef, ScenarioStep};
use super::workspace::TestWorkspace;
use anyhow::{anyhow, bail, ensure, Context, Result};
use gitlite_core::{GitliteError, ObjectId, RepoState, Repository};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Records plus working tree at one point in a scenario
struct Snapshot {
    state: RepoState,
    files: BTreeMap<String, Vec<u8>>,
}

/// Executes scenarios against a real repository in a temp directory
pub struct ScenarioRunner {
    workspace: TestWorkspace,
    repo: Repository,
    clock: MockClock,
    labels: HashMap<String, ObjectId>,
    snapshots: HashMap<String, Snapshot>,
    current_step: usize,
}

impl ScenarioRunner {
    /// Create a new runner with initial files and a fresh repository
    pub fn new(initial_files: HashMap<String, Vec<u8>>) -> Result<Self> {
        let workspace = TestWorkspace::with_files(initial_files)?;
        let clock = MockClock::new();
        let repo = workspace
            .init_repo()?
            .with_time_provider(clock.as_provider());

        let mut labels = HashMap::new();
        labels.insert("root".to_string(), repo.head()?);

        Ok(Self {
            workspace,
            repo,
            clock,
            labels,
            snapshots: HashMap::new(),
            current_step: 0,
        })
    }

    /// Get current step number
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Execute all steps in sequence
    pub fn execute(&mut self, steps: &[ScenarioStep]) -> Result<()> {
        for (i, step) in steps.iter().enumerate() {
            self.current_step = i;
            self.execute_step(step)
                .with_context(|| format!("Step {}: {:?}", i, step))?;
        }
        Ok(())
    }

    /// Execute a single step
    fn execute_step(&mut self, step: &ScenarioStep) -> Result<()> {
        match step {
            ScenarioStep::WriteFile { path, content } => self.workspace.write_file(path, content),
            ScenarioStep::DeleteFile { path } => self.workspace.delete_file(path),

            ScenarioStep::Run { action } => Ok(self.perform(action)?),
            ScenarioStep::Fail { action, expected } => self.handle_expected_failure(action, expected),

            ScenarioStep::RememberHead { label } => {
                let head = self.repo.head()?;
                self.labels.insert(label.clone(), head);
                Ok(())
            }
            ScenarioStep::Snapshot { label } => {
                let snapshot = self.capture()?;
                self.snapshots.insert(label.clone(), snapshot);
                Ok(())
            }

            ScenarioStep::Wait { duration } => self.handle_wait(*duration),
            ScenarioStep::Reopen => self.handle_reopen(),

            ScenarioStep::Assert { assertion } => self.handle_assertion(assertion),
        }
    }

    // ===== Command handlers =====

    fn perform(&self, action: &Action) -> std::result::Result<(), GitliteError> {
        match action {
            Action::Add { path } => self.repo.add(path).map(drop),
            Action::Commit { message } => self.repo.commit(message).map(drop),
            Action::Rm { path } => self.repo.rm(path),
            Action::Restore { path } => self.repo.restore(path),
            Action::RestoreFrom { commit, path } => {
                let commit = self.commit_text(commit);
                self.repo.restore_from(&commit, path)
            }
            Action::Branch { name } => self.repo.branch(name).map(drop),
            Action::RmBranch { name } => self.repo.rm_branch(name),
            Action::Switch { branch } => self.repo.switch(branch),
            Action::Reset { commit } => {
                let commit = self.commit_text(commit);
                self.repo.reset(&commit).map(drop)
            }
            Action::Find { message } => self.repo.find(message).map(drop),
        }
    }

    fn handle_expected_failure(&self, action: &Action, expected: &GitliteError) -> Result<()> {
        match self.perform(action) {
            Ok(()) => bail!("{:?} succeeded, expected {:?}", action, expected),
            Err(actual) if std::mem::discriminant(&actual) == std::mem::discriminant(expected) => {
                Ok(())
            }
            Err(actual) => bail!("expected {:?}, got {:?}", expected, actual),
        }
    }

    /// Unknown labels pass through unchanged so lookups fail in the repository.
    fn commit_text(&self, commit: &CommitRef) -> String {
        match commit {
            CommitRef::Label(label) => self
                .labels
                .get(label)
                .map(ObjectId::as_hex)
                .unwrap_or_else(|| label.clone()),
            CommitRef::Prefix { label, len } => self
                .labels
                .get(label)
                .map(|id| id.as_hex()[..*len].to_string())
                .unwrap_or_else(|| label.clone()),
            CommitRef::Literal(text) => text.clone(),
        }
    }

    fn label(&self, commit: &CommitRef) -> Result<ObjectId> {
        match commit {
            CommitRef::Label(label) | CommitRef::Prefix { label, .. } => self
                .labels
                .get(label)
                .copied()
                .ok_or_else(|| anyhow!("no commit remembered as {:?}", label)),
            CommitRef::Literal(text) => Ok(ObjectId::from_hex(text)?),
        }
    }

    fn handle_wait(&mut self, duration: Duration) -> Result<()> {
        self.clock.advance(duration);
        Ok(())
    }

    fn handle_reopen(&mut self) -> Result<()> {
        self.repo = self
            .workspace
            .open_repo()?
            .with_time_provider(self.clock.as_provider());
        Ok(())
    }

    fn capture(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            state: self.repo.state()?,
            files: self.workspace.snapshot_files()?,
        })
    }

    // ===== Assertions =====

    fn handle_assertion(&self, assertion: &Assertion) -> Result<()> {
        let state = self.repo.state()?;
        let head = state.head_commit()?;

        match assertion {
            Assertion::CommitCount(n) => {
                ensure!(state.graph.len() == *n, "expected {} commits, found {}", n, state.graph.len());
            }
            Assertion::HeadMessage(message) => {
                ensure!(
                    head.message() == message,
                    "HEAD message is {:?}, expected {:?}",
                    head.message(),
                    message
                );
            }
            Assertion::HeadIs(commit) => {
                let expected = self.label(commit)?;
                ensure!(head.id() == expected, "HEAD is {}, expected {}", head.id(), expected);
            }
            Assertion::LogMessages(expected) => {
                let actual: Vec<String> = self
                    .repo
                    .log()?
                    .iter()
                    .map(|c| c.message().to_string())
                    .collect();
                ensure!(actual == *expected, "log is {:?}, expected {:?}", actual, expected);
            }
            Assertion::HeadTimestamp(ts) => {
                ensure!(
                    head.timestamp_unix() == *ts,
                    "HEAD timestamp is {}, expected {}",
                    head.timestamp_unix(),
                    ts
                );
            }
            Assertion::CurrentBranch(branch) => {
                ensure!(
                    state.branches.current() == branch,
                    "current branch is {:?}, expected {:?}",
                    state.branches.current(),
                    branch
                );
            }
            Assertion::BranchAt { branch, commit } => {
                let expected = self.label(commit)?;
                let actual = state.branches.get(branch)?;
                ensure!(actual == expected, "{} is at {}, expected {}", branch, actual, expected);
            }
            Assertion::Branches(expected) => {
                let actual: Vec<String> = state.branches.branches().keys().cloned().collect();
                ensure!(actual == *expected, "branches are {:?}, expected {:?}", actual, expected);
            }
            Assertion::FileContent { path, content } => {
                let actual = self.workspace.read_file(path)?;
                ensure!(
                    actual == *content,
                    "{} contains {:?}, expected {:?}",
                    path,
                    String::from_utf8_lossy(&actual),
                    String::from_utf8_lossy(content)
                );
            }
            Assertion::FileMissing { path } => {
                ensure!(!self.workspace.file_exists(path), "{} should not exist", path);
            }
            Assertion::FileTracked { path } => {
                ensure!(head.tracks(path), "HEAD does not track {}", path);
            }
            Assertion::FileNotTracked { path } => {
                ensure!(!head.tracks(path), "HEAD tracks {}", path);
            }
            Assertion::StagingEmpty => {
                ensure!(state.staging.is_empty(), "staging is not empty: {:?}", state.staging);
            }
            Assertion::StagedForAddition(expected) => {
                let actual: Vec<String> =
                    state.staging.staged_for_addition().keys().cloned().collect();
                ensure!(actual == *expected, "staged {:?}, expected {:?}", actual, expected);
            }
            Assertion::StagedForRemoval(expected) => {
                let actual: Vec<String> =
                    state.staging.staged_for_removal().iter().cloned().collect();
                ensure!(actual == *expected, "removed {:?}, expected {:?}", actual, expected);
            }
            Assertion::NoPathStagedTwice => {
                for path in state.staging.staged_for_addition().keys() {
                    ensure!(
                        !state.staging.is_staged_for_removal(path),
                        "{} staged for addition and removal",
                        path
                    );
                }
            }
            Assertion::Modifications(expected) => {
                let actual = self.repo.status()?.modifications;
                ensure!(actual == *expected, "modifications {:?}, expected {:?}", actual, expected);
            }
            Assertion::Untracked(expected) => {
                let actual = self.repo.status()?.untracked;
                ensure!(actual == *expected, "untracked {:?}, expected {:?}", actual, expected);
            }
            Assertion::ObjectCount(n) => {
                let actual = self.workspace.object_count()?;
                ensure!(actual == *n, "{} objects stored, expected {}", actual, n);
            }
            Assertion::Unchanged { snapshot } => {
                let before = self
                    .snapshots
                    .get(snapshot)
                    .ok_or_else(|| anyhow!("no snapshot named {:?}", snapshot))?;
                let now = self.capture()?;
                ensure!(now.state == before.state, "repository records changed");
                ensure!(now.files == before.files, "working tree changed");
            }
            Assertion::Custom(check) => check(&self.repo, &self.workspace)?,
        }
        Ok(())
    }
}
