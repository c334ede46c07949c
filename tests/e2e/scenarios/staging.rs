use crate::harness::steps::Action;
use crate::harness::{Assertion, Scenario};
use gitlite_core::{GitliteError, Modification};

#[test]
fn test_add_commit_clears_staging() {
    Scenario::new("add_commit")
        .with_file("file.txt", b"A")
        .add("file.txt")
        .assert_staged(&["file.txt"])
        .commit("m1")
        .assert_staging_empty()
        .assert_tracked("file.txt")
        .assert_commit_count(2)
        .assert_head_message("m1")
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_add_is_idempotent() {
    Scenario::new("add_idempotent")
        .with_file("file.txt", b"A")
        .add("file.txt")
        .snapshot("once")
        .add("file.txt")
        .assert_unchanged("once")
        .assert(Assertion::ObjectCount(1))
        .run()
        .unwrap();
}

#[test]
fn test_identical_content_shares_one_blob() {
    Scenario::new("dedup")
        .with_file("a.txt", b"same bytes")
        .with_file("dir/b.txt", b"same bytes")
        .add("a.txt")
        .add("dir/b.txt")
        .assert(Assertion::ObjectCount(1))
        .assert_staged(&["a.txt", "dir/b.txt"])
        .run()
        .unwrap();
}

#[test]
fn test_edit_back_to_committed_content_unstages() {
    Scenario::new("revert_unstages")
        .with_file("f.txt", b"v1")
        .add("f.txt")
        .commit("v1")
        .write("f.txt", b"v2")
        .add("f.txt")
        .assert_staged(&["f.txt"])
        .write("f.txt", b"v1")
        .add("f.txt")
        .assert_staging_empty()
        .run()
        .unwrap();
}

#[test]
fn test_add_after_rm_cancels_removal() {
    Scenario::new("add_cancels_rm")
        .with_file("f.txt", b"v1")
        .add("f.txt")
        .commit("v1")
        .rm("f.txt")
        .assert_removed(&["f.txt"])
        .assert_file_missing("f.txt")
        .write("f.txt", b"v1")
        .add("f.txt")
        .assert_staging_empty()
        .assert(Assertion::NoPathStagedTwice)
        .run()
        .unwrap();
}

#[test]
fn test_rm_of_staged_untracked_file_keeps_it_on_disk() {
    Scenario::new("rm_untracked")
        .with_file("new.txt", b"n")
        .add("new.txt")
        .rm("new.txt")
        .assert_staging_empty()
        .assert_file("new.txt", b"n")
        .assert(Assertion::Untracked(vec!["new.txt".into()]))
        .run()
        .unwrap();
}

#[test]
fn test_rm_without_reason() {
    Scenario::new("rm_no_reason")
        .with_file("loose.txt", b"x")
        .snapshot("before")
        .expect_error(
            Action::Rm {
                path: "loose.txt".into(),
            },
            GitliteError::NoReasonToRemove,
        )
        .assert_unchanged("before")
        .run()
        .unwrap();
}

#[test]
fn test_add_rejects_missing_and_escaping_paths() {
    Scenario::new("add_errors")
        .expect_error(
            Action::Add {
                path: "missing.txt".into(),
            },
            GitliteError::FileNotFound(String::new()),
        )
        .expect_error(
            Action::Add {
                path: "../outside.txt".into(),
            },
            GitliteError::InvalidPath(String::new()),
        )
        .expect_error(
            Action::Add {
                path: ".gitlite/HEAD".into(),
            },
            GitliteError::InvalidPath(String::new()),
        )
        .assert_staging_empty()
        .run()
        .unwrap();
}

#[test]
fn test_commit_errors_leave_history_unchanged() {
    Scenario::new("commit_errors")
        .with_file("f.txt", b"x")
        .snapshot("clean")
        .expect_error(
            Action::Commit {
                message: "anything".into(),
            },
            GitliteError::NothingToCommit,
        )
        .assert_unchanged("clean")
        .add("f.txt")
        .snapshot("staged")
        .expect_error(
            Action::Commit {
                message: String::new(),
            },
            GitliteError::EmptyMessage,
        )
        .assert_unchanged("staged")
        .assert_commit_count(1)
        .run()
        .unwrap();
}

#[test]
fn test_status_reports_unstaged_changes() {
    Scenario::new("status")
        .with_file("edited.txt", b"1")
        .with_file("gone.txt", b"2")
        .add("edited.txt")
        .add("gone.txt")
        .commit("base")
        .write("edited.txt", b"changed")
        .delete("gone.txt")
        .write("fresh.txt", b"new")
        .assert(Assertion::Modifications(vec![
            ("edited.txt".into(), Modification::Modified),
            ("gone.txt".into(), Modification::Deleted),
        ]))
        .assert(Assertion::Untracked(vec!["fresh.txt".into()]))
        .run()
        .unwrap();
}
