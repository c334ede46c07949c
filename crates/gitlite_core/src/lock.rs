//! Exclusive repository lock for mutating commands.

use crate::error::{GitliteError, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the lock file inside the repository directory.
pub const LOCK_FILE: &str = "LOCK";

/// RAII guard for the repository lock.
///
/// The LOCK file holds the owner's PID. Dropping the guard releases the file
/// lock and removes the file.
#[derive(Debug)]
pub struct LockGuard {
    file: Option<File>,
    path: PathBuf,
}

impl LockGuard {
    /// Acquires the lock in `repo_dir`, cleaning up a stale lock left by a
    /// dead process.
    ///
    /// # Errors
    ///
    /// `LockHeld` if a live process owns the lock, `RepositoryLocked` if the
    /// lock cannot be taken for any other reason.
    pub fn acquire(repo_dir: &Path) -> Result<Self> {
        acquire_with_retry(&repo_dir.join(LOCK_FILE), 0)
    }

    /// Path of the held lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            drop(file);
        }
        let _ = fs::remove_file(&self.path);
    }
}

fn acquire_with_retry(lock_path: &Path, retry_count: u32) -> Result<LockGuard> {
    if retry_count > 2 {
        return Err(GitliteError::RepositoryLocked);
    }

    match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(lock_path)
    {
        Ok(mut file) => {
            writeln!(file, "{}", std::process::id())?;
            file.flush()?;
            file.try_lock_exclusive()
                .map_err(|_| GitliteError::RepositoryLocked)?;
            debug!(path = %lock_path.display(), "acquired repository lock");

            Ok(LockGuard {
                file: Some(file),
                path: lock_path.to_path_buf(),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            handle_existing_lock(lock_path, retry_count)
        }
        Err(e) => Err(GitliteError::Io(e)),
    }
}

fn handle_existing_lock(lock_path: &Path, retry_count: u32) -> Result<LockGuard> {
    match fs::read_to_string(lock_path) {
        Ok(content) => {
            if let Ok(pid) = content.trim().parse::<u32>() {
                if is_process_alive(pid) {
                    return Err(GitliteError::LockHeld { pid });
                }

                warn!(pid = pid, "removing stale lock left by dead process");
                if let Err(e) = fs::remove_file(lock_path) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        return Err(GitliteError::Io(e));
                    }
                }
                return acquire_with_retry(lock_path, retry_count + 1);
            }

            // Partially written or garbage.
            warn!("lock file has invalid content, removing it");
            let _ = fs::remove_file(lock_path);
            acquire_with_retry(lock_path, retry_count + 1)
        }
        // Released between our open and read.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            acquire_with_retry(lock_path, retry_count + 1)
        }
        Err(_) => Err(GitliteError::RepositoryLocked),
    }
}

/// Returns true if a process with `pid` exists.
///
/// Non-Unix platforms always report alive, so stale locks there must be
/// removed by hand.
#[cfg(target_os = "linux")]
fn is_process_alive(pid: u32) -> bool {
    // Zombies keep /proc/<pid> but /proc/<pid>/stat is the reliable check.
    Path::new(&format!("/proc/{}/stat", pid)).exists()
}

#[cfg(all(unix, not(target_os = "linux")))]
fn is_process_alive(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(true)
}

#[cfg(not(unix))]
fn is_process_alive(_pid: u32) -> bool {
    true
}
