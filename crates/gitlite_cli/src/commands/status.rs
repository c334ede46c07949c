//! Status command.

use anyhow::{Context, Result};
use console::style;
use gitlite_core::StatusReport;

/// Print branches, staged and removed files, unstaged modifications and
/// untracked files.
pub fn run() -> Result<()> {
    let repo = super::open_repo()?;
    let report = repo.status().context("failed to compute status")?;
    print!("{}", render(&report, true));
    Ok(())
}

/// Renders the report. `styled` highlights the current branch on a terminal.
pub(crate) fn render(report: &StatusReport, styled: bool) -> String {
    let mut out = String::from("=== Branches ===\n");
    for branch in &report.branches {
        if *branch == report.current_branch {
            let marked = format!("*{}", branch);
            if styled {
                out.push_str(&style(marked).green().to_string());
            } else {
                out.push_str(&marked);
            }
        } else {
            out.push_str(branch);
        }
        out.push('\n');
    }
    out.push('\n');

    section(&mut out, "Staged Files", report.staged.iter().cloned());
    section(&mut out, "Removed Files", report.removed.iter().cloned());
    section(
        &mut out,
        "Modifications Not Staged For Commit",
        report
            .modifications
            .iter()
            .map(|(path, kind)| format!("{} ({})", path, kind.label())),
    );
    section(&mut out, "Untracked Files", report.untracked.iter().cloned());
    out
}

fn section(out: &mut String, title: &str, lines: impl Iterator<Item = String>) {
    out.push_str(&format!("=== {} ===\n", title));
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
}
