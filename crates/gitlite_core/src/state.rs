//! Request-scoped repository state: loaded at command start, saved at the end.

use crate::commit_graph::CommitGraph;
use crate::error::{GitliteError, Result};
use crate::refs::BranchRegistry;
use crate::staging::StagingArea;
use crate::store::{RecordKey, RecordStore};
use crate::types::Commit;
use crate::ObjectId;
use std::collections::BTreeMap;
use tracing::debug;

/// The four mutable leaves of a repository, as one value.
///
/// Commands load a `RepoState`, compute the complete new state in memory,
/// then [`save`](Self::save) it. Nothing here touches the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoState {
    /// Pending additions and removals.
    pub staging: StagingArea,
    /// Every commit.
    pub graph: CommitGraph,
    /// Path -> blob most recently produced by `add` for it.
    pub blob_index: BTreeMap<String, ObjectId>,
    /// Branches, current branch and HEAD.
    pub branches: BranchRegistry,
}

impl RepoState {
    /// State of a freshly initialized repository: the root commit on
    /// `branch`, nothing staged.
    pub fn initial(branch: &str) -> Result<Self> {
        crate::refs::validate_branch_name(branch)?;
        let mut graph = CommitGraph::new();
        let root = graph.insert(Commit::root()?).id();
        Ok(Self {
            staging: StagingArea::new(),
            graph,
            blob_index: BTreeMap::new(),
            branches: BranchRegistry::new(branch, root),
        })
    }

    /// Loads every record.
    ///
    /// # Errors
    ///
    /// `MissingRecord` / `CorruptedRecord` for absent or unreadable records
    /// (including a path staged both ways),
    /// `CorruptedObject` if a commit fails to re-hash or a branch points at a
    /// commit that does not exist.
    pub fn load(records: &RecordStore) -> Result<Self> {
        let staging: StagingArea = records.get_json(RecordKey::StagingArea)?;
        let commits: BTreeMap<ObjectId, Commit> = records.get_json(RecordKey::Commits)?;
        let blob_index: BTreeMap<String, ObjectId> = records.get_json(RecordKey::BlobIndex)?;
        let branch_map: BTreeMap<String, ObjectId> = records.get_json(RecordKey::BranchMap)?;
        let current = records.get_line(RecordKey::CurrentBranch)?;
        let head = records.get_id(RecordKey::Head)?;

        staging
            .check_disjoint()
            .map_err(|reason| GitliteError::CorruptedRecord {
                path: records.path(RecordKey::StagingArea),
                reason,
            })?;

        let graph = CommitGraph::from_records(commits)?;
        for (name, id) in &branch_map {
            if !graph.contains(*id) {
                return Err(GitliteError::CorruptedObject {
                    id: id.as_hex(),
                    reason: format!("branch {} points at a missing commit", name),
                });
            }
        }

        let branches = BranchRegistry::from_records(branch_map, current, head).map_err(
            |reason| GitliteError::CorruptedRecord {
                path: records.path(RecordKey::Head),
                reason,
            },
        )?;

        debug!(
            commits = graph.len(),
            branch = branches.current(),
            "loaded repository state"
        );

        Ok(Self {
            staging,
            graph,
            blob_index,
            branches,
        })
    }

    /// Rewrites every record in full. HEAD is written last.
    pub fn save(&self, records: &RecordStore) -> Result<()> {
        records.put_json(RecordKey::Commits, self.graph.records())?;
        records.put_json(RecordKey::BlobIndex, &self.blob_index)?;
        records.put_json(RecordKey::StagingArea, &self.staging)?;
        records.put_json(RecordKey::BranchMap, self.branches.branches())?;

        for (name, id) in self.branches.branches() {
            records.put_id(RecordKey::BranchHead(name), *id)?;
        }
        for stale in records.list_branch_heads()? {
            if !self.branches.branches().contains_key(&stale) {
                records.delete(RecordKey::BranchHead(&stale))?;
            }
        }

        records.put_line(RecordKey::CurrentBranch, self.branches.current())?;
        records.put_id(RecordKey::Head, self.branches.head())?;
        Ok(())
    }

    /// The commit HEAD points to.
    pub fn head_commit(&self) -> Result<&Commit> {
        self.graph.get(self.branches.head())
    }
}
