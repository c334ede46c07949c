use crate::harness::steps::Action;
use crate::harness::{CommitRef, Scenario};
use gitlite_core::GitliteError;

#[test]
fn test_restore_from_head() {
    Scenario::new("restore_head")
        .with_file("file.txt", b"A")
        .add("file.txt")
        .commit("m1")
        .write("file.txt", b"B")
        .restore("file.txt")
        .assert_file("file.txt", b"A")
        .assert_staging_empty()
        .run()
        .expect("restore should bring back committed content");
}

#[test]
fn test_restore_from_head_discards_staged_edit() {
    Scenario::new("restore_staged")
        .with_file("file.txt", b"A")
        .add("file.txt")
        .commit("m1")
        .write("file.txt", b"B")
        .add("file.txt")
        .assert_staged(&["file.txt"])
        .restore("file.txt")
        .assert_file("file.txt", b"A")
        .assert_staging_empty()
        .run()
        .unwrap();
}

#[test]
fn test_restore_deleted_file() {
    Scenario::new("restore_deleted")
        .with_file("dir/nested.txt", b"deep")
        .add("dir/nested.txt")
        .commit("nested")
        .delete("dir/nested.txt")
        .restore("dir/nested.txt")
        .assert_file("dir/nested.txt", b"deep")
        .run()
        .unwrap();
}

#[test]
fn test_restore_from_older_commit_stages_it() {
    Scenario::new("restore_older")
        .with_file("f.txt", b"v1")
        .add("f.txt")
        .commit_as("v1", "first")
        .write("f.txt", b"v2")
        .add("f.txt")
        .commit("v2")
        .restore_from(
            CommitRef::Prefix {
                label: "first".into(),
                len: 8,
            },
            "f.txt",
        )
        .assert_file("f.txt", b"v1")
        .assert_staged(&["f.txt"])
        .commit("back to v1")
        .assert_log(&["back to v1", "v2", "v1", "initial commit"])
        .run()
        .unwrap();
}

#[test]
fn test_restore_errors() {
    Scenario::new("restore_errors")
        .with_file("f.txt", b"v1")
        .add("f.txt")
        .commit_as("v1", "first")
        .snapshot("before")
        .expect_error(
            Action::Restore {
                path: "never.txt".into(),
            },
            GitliteError::FileNotInCommit(String::new()),
        )
        .expect_error(
            Action::RestoreFrom {
                commit: CommitRef::Literal("deadbeef".into()),
                path: "f.txt".into(),
            },
            GitliteError::CommitNotFound(String::new()),
        )
        .expect_error(
            Action::RestoreFrom {
                commit: CommitRef::Label("root".into()),
                path: "f.txt".into(),
            },
            GitliteError::FileNotInCommit(String::new()),
        )
        .assert_unchanged("before")
        .run()
        .unwrap();
}
