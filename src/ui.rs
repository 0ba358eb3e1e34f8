//! Terminal UI: the transfer spinner, per-path outcome lines and the final summary.
//!
//! - While a transfer runs the user sees only a spinner and the source path. The sync binary's
//!   output is captured and logged at debug level.
//! - Each path ends with one ✓/⚠/✗ line naming what happened to it, and the run closes with a
//!   summary.  These go to stdout; diagnostics go through `tracing` on stderr.

use std::{
    process::{Command, Output, Stdio},
    time::Duration,
};

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{error::BackupError, registrar::Registration, runner::BackupTask};

// ─── Icons ───────────────────────────────────────────────────────────────────

static SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

fn icon_ok() -> console::StyledObject<&'static str> {
    style("✓").green().bold()
}
fn icon_warn() -> console::StyledObject<&'static str> {
    style("⚠").yellow().bold()
}
fn icon_err() -> console::StyledObject<&'static str> {
    style("✗").red().bold()
}
fn icon_done() -> console::StyledObject<&'static str> {
    style("✓").cyan().bold()
}

// ─── Path outcome ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Transferred, and scheduled if a schedule was asked for.
    Done,
    /// Transferred, but the schedule was not registered.
    Partial,
    /// Nothing happened for this path.
    Skipped,
    /// The transfer failed; the run stops here.
    Failed,
}

/// What happened to one backup path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathOutcome {
    pub path: String,
    pub status: Status,
    pub note: String,
}

impl PathOutcome {
    pub fn skipped(path: &str, err: &BackupError) -> Self {
        Self {
            path: path.to_string(),
            status: Status::Skipped,
            note: err.to_string(),
        }
    }

    pub fn failed(path: &str, err: &BackupError) -> Self {
        Self {
            path: path.to_string(),
            status: Status::Failed,
            note: err.to_string(),
        }
    }

    /// A finished transfer, plus the cron outcome if one was attempted.
    pub fn transferred(task: &BackupTask, registration: Option<&Registration>) -> Self {
        let destination = task.transfer_args.last().cloned().unwrap_or_default();
        let note = match registration {
            None => format!("→ {destination}"),
            Some(Registration::Created { fingerprint }) => {
                format!("→ {destination}, cron job {} created", short(fingerprint))
            },
            Some(Registration::Replaced {
                fingerprint,
                previous,
            }) => format!(
                "→ {destination}, cron job {} replaced (was '{}')",
                short(fingerprint),
                previous.schedule
            ),
            Some(Registration::Conflict { existing }) => format!(
                "→ {destination}, cron job already exists at '{}' (use --force)",
                existing.schedule
            ),
            Some(Registration::Rejected(reason)) => {
                format!("→ {destination}, cron job rejected: {reason}")
            },
        };
        let status = match registration {
            Some(r) if !r.persisted() => Status::Partial,
            _ => Status::Done,
        };
        Self {
            path: task.source.clone(),
            status,
            note,
        }
    }

    pub fn print(&self) {
        let icon = match self.status {
            Status::Done => icon_ok(),
            Status::Partial => icon_warn(),
            Status::Skipped | Status::Failed => icon_err(),
        };
        println!(
            "  {}  {}  {}",
            icon,
            style(&self.path).bold(),
            style(&self.note).dim()
        );
    }

    pub fn is_clean(&self) -> bool {
        self.status == Status::Done
    }
}

fn short(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}

// ─── Spinner ──────────────────────────────────────────────────────────────────

fn make_spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::with_template("  {spinner:.cyan}  {msg}") {
        pb.set_style(spinner_style.tick_chars(SPINNER_CHARS));
    }
    pb.set_message(format!("{}", style(label).dim()));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

// ─── Captured execution ───────────────────────────────────────────────────────

/// Run a command, capturing stdout and stderr.
///
/// Returns `(success, combined_output, status)` where the combined output is
/// stdout followed by stderr.
pub fn run_captured(args: &[String]) -> Result<(bool, String, String)> {
    let (prog, rest) = args.split_first().context("cannot run an empty command")?;

    let output: Output = Command::new(prog)
        .args(rest)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("failed to spawn: {}", args.join(" ")))?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    Ok((output.status.success(), combined, output.status.to_string()))
}

/// Run `task`'s transfer behind a spinner, returning its combined output.
///
/// A transfer that cannot be spawned or exits non-zero is a
/// [`BackupError::TransferFailed`].
pub fn run_transfer(task: &BackupTask) -> Result<String, BackupError> {
    let spinner = make_spinner(&task.source);
    let result = run_captured(&task.transfer_args);
    spinner.finish_and_clear();

    match result {
        Ok((true, output, _)) => Ok(output),
        Ok((false, output, status)) => Err(BackupError::TransferFailed {
            command: task.command_line(),
            status,
            output,
        }),
        Err(e) => Err(BackupError::TransferFailed {
            command: task.command_line(),
            status: "not started".into(),
            output: format!("{e:#}"),
        }),
    }
}

// ─── Summary banner ───────────────────────────────────────────────────────────

pub fn print_summary(outcomes: &[PathOutcome]) {
    let unclean: Vec<&PathOutcome> = outcomes.iter().filter(|o| !o.is_clean()).collect();
    println!();
    if unclean.is_empty() {
        println!(
            "  {} {}",
            icon_done(),
            style(format!("{} path(s) backed up.", outcomes.len()))
                .cyan()
                .bold()
        );
    } else {
        println!(
            "  {}  {}",
            icon_warn(),
            style(format!(
                "{} of {} path(s) need attention.",
                unclean.len(),
                outcomes.len()
            ))
            .yellow()
            .bold()
        );
        for o in &unclean {
            println!("    {} {}", icon_err(), style(&o.path).red());
        }
    }
    println!();
}

// ─── Tests ────────────────────────────────────────────────────────────────────
