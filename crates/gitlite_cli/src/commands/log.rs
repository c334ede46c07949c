//! History commands: log, global-log, find.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gitlite_core::Commit;
use std::fmt::Write;

const FALLBACK_DATE_FORMAT: &str = "%a %b %-d %H:%M:%S %Y %z";

/// Print history from HEAD back to the initial commit.
pub fn log() -> Result<()> {
    let repo = super::open_repo()?;
    let commits = repo.log().context("failed to walk history")?;
    let date_format = &repo.config().log.date_format;
    for commit in &commits {
        print!("{}", format_entry(commit, date_format));
    }
    Ok(())
}

/// Print every commit, newest first.
pub fn global_log() -> Result<()> {
    let repo = super::open_repo()?;
    let mut commits = repo.global_log().context("failed to read commits")?;
    commits.sort_by(|a, b| {
        b.timestamp_unix()
            .cmp(&a.timestamp_unix())
            .then_with(|| a.id().cmp(&b.id()))
    });
    let date_format = &repo.config().log.date_format;
    for commit in &commits {
        print!("{}", format_entry(commit, date_format));
    }
    Ok(())
}

/// Print the ids of all commits with exactly `message`, one per line.
pub fn find(message: &str) -> Result<()> {
    let repo = super::open_repo()?;
    for id in repo.find(message)? {
        println!("{}", id);
    }
    Ok(())
}

/// One `log` entry, including the trailing blank line.
pub(crate) fn format_entry(commit: &Commit, date_format: &str) -> String {
    format!(
        "===\ncommit {}\nDate: {}\n{}\n\n",
        commit.id(),
        format_date(commit.timestamp_unix(), date_format),
        commit.message()
    )
}

/// Formats unix seconds in UTC. An unusable format string falls back to the
/// default one.
fn format_date(timestamp_unix: i64, date_format: &str) -> String {
    let date = DateTime::<Utc>::from_timestamp(timestamp_unix, 0).unwrap_or_default();
    let mut out = String::new();
    if write!(out, "{}", date.format(date_format)).is_err() {
        out.clear();
        let _ = write!(out, "{}", date.format(FALLBACK_DATE_FORMAT));
    }
    out
}
