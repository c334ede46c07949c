//! gitlite core library
//!
//! A minimal local version-control engine:
//! - Content-addressed blob storage
//! - Immutable commit history with first-parent ancestry
//! - A staging area reconciled against HEAD
//! - Branches and a movable HEAD
//!
//! # Quick Start
//!
//! ```
//! use gitlite_core::Repository;
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let tmp = TempDir::new().unwrap();
//! let repo = Repository::init(tmp.path()).unwrap();
//!
//! fs::write(tmp.path().join("hello.txt"), "hello").unwrap();
//! repo.add("hello.txt").unwrap();
//! let id = repo.commit("say hello").unwrap();
//!
//! let log = repo.log().unwrap();
//! assert_eq!(log[0].id(), id);
//! assert_eq!(log[1].message(), "initial commit");
//! ```
//!
//! # Features
//!
//! ## Content Addressing
//!
//! Identical bytes always produce the same id, whatever path they came from:
//!
//! ```
//! use gitlite_core::ObjectId;
//!
//! let a = ObjectId::hash_blob(b"content");
//! let b = ObjectId::hash_blob(b"content");
//! assert_eq!(a, b);
//! assert_ne!(a, ObjectId::hash_blob(b"other"));
//! ```
//!
//! ## Branches
//!
//! ```
//! use gitlite_core::Repository;
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let tmp = TempDir::new().unwrap();
//! let repo = Repository::init(tmp.path()).unwrap();
//! fs::write(tmp.path().join("f.txt"), "v1").unwrap();
//! repo.add("f.txt").unwrap();
//! let main_head = repo.commit("v1").unwrap();
//!
//! repo.branch("topic").unwrap();
//! repo.switch("topic").unwrap();
//! fs::write(tmp.path().join("f.txt"), "v2").unwrap();
//! repo.add("f.txt").unwrap();
//! repo.commit("v2").unwrap();
//!
//! repo.switch("main").unwrap();
//! assert_eq!(fs::read_to_string(tmp.path().join("f.txt")).unwrap(), "v1");
//! assert_eq!(repo.head().unwrap(), main_head);
//! ```

mod blob_store;
mod commit_graph;
mod config;
mod error;
mod lock;
mod object_id;
mod refs;
mod repo;
mod state;
mod status;
mod staging;
mod store;
mod types;
mod worktree;

pub use blob_store::{BlobStore, DEFAULT_MAX_BLOB_SIZE};
pub use commit_graph::{Ancestors, CommitGraph};
pub use config::{Config, CoreConfig, LogConfig, StorageConfig, CONFIG_FILE};
pub use error::{GitliteError, Result};
pub use lock::{LockGuard, LOCK_FILE};
pub use object_id::ObjectId;
pub use refs::{validate_branch_name, BranchRegistry};
pub use repo::Repository;
pub use state::RepoState;
pub use staging::{AddOutcome, StagingArea};
pub use status::{Modification, StatusReport};
pub use store::{RecordKey, RecordStore};
pub use types::*;
pub use worktree::{
    blocking_paths, normalize_path, untracked_conflicts, WorkingTree, REPO_DIR,
};
