//! The user's crontab, as seen by this tool.
//!
//! [`CronTable`] is an in-memory copy of one crontab.  Job lines are parsed
//! into [`CronJob`]s; every other line (comments, blank lines, `MAILTO=`
//! assignments, disabled jobs) is carried through untouched so that
//! [`CronTable::render`] never loses anything the user wrote by hand.
//!
//! Jobs registered by this tool look like:
//!
//! ```text
//! 0 2 * * * rsync -avz /home/alice /mnt/backup/alice # 3f0a…c91e
//! ```
//!
//! where the trailing comment is the command's
//! [fingerprint](crate::fingerprint::fingerprint).
//!
//! Reading and writing the backing store goes through [`CronStore`], with one
//! implementation for the real per-user crontab and one for a plain file.

use std::{
    fmt,
    io::Write,
    path::PathBuf,
    process::{Command, Stdio},
};

use anyhow::{Context, Result, bail};

use crate::schedule::{self, ScheduleError};

// ─── Jobs ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronJob {
    pub schedule: String,
    /// Command text as it appears in the crontab, so `%` is escaped.
    pub command: String,
    pub comment: Option<String>,
}

impl CronJob {
    /// A job with no schedule yet; it fails validation until [`CronJob::set_schedule`].
    pub fn new(command: &str, comment: &str) -> Self {
        Self {
            schedule: String::new(),
            command: escape_command(command),
            comment: Some(comment.to_string()),
        }
    }

    pub fn set_schedule(&mut self, expr: &str) {
        self.schedule = schedule::canonical(expr);
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        schedule::validate(&self.schedule)
    }

    /// Parse one crontab line, or `None` if it is not an active job.
    fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        let (schedule, rest) = if trimmed.starts_with('@') {
            let (head, rest) = trimmed.split_once(char::is_whitespace)?;
            (head.to_string(), rest)
        } else {
            let mut rest = trimmed;
            let mut fields = Vec::with_capacity(5);
            for _ in 0..5 {
                let (field, tail) = rest.split_once(char::is_whitespace)?;
                fields.push(field);
                rest = tail.trim_start();
            }
            (fields.join(" "), rest)
        };

        // `MAILTO=root` style assignments never parse as a valid schedule.
        if schedule::validate(&schedule).is_err() {
            return None;
        }

        let (command, comment) = match rest.rsplit_once(" # ") {
            Some((command, comment)) => (command.trim(), Some(comment.trim().to_string())),
            None => (rest.trim(), None),
        };
        if command.is_empty() {
            return None;
        }

        Some(Self {
            schedule,
            command: command.to_string(),
            comment,
        })
    }
}

impl fmt::Display for CronJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.schedule, self.command)?;
        if let Some(ref comment) = self.comment {
            write!(f, " # {comment}")?;
        }
        Ok(())
    }
}

/// cron turns a bare `%` into a newline and feeds the rest to stdin.
fn escape_command(command: &str) -> String {
    command.replace('%', "\\%")
}

// ─── Table ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Job(CronJob),
    Verbatim(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CronTable {
    lines: Vec<Line>,
}

impl CronTable {
    pub fn parse(text: &str) -> Self {
        let lines = text
            .lines()
            .map(|l| match CronJob::parse(l) {
                Some(job) => Line::Job(job),
                None => Line::Verbatim(l.to_string()),
            })
            .collect();
        Self { lines }
    }

    /// Active jobs, in file order.
    pub fn jobs(&self) -> impl Iterator<Item = &CronJob> {
        self.lines.iter().filter_map(|l| match l {
            Line::Job(job) => Some(job),
            Line::Verbatim(_) => None,
        })
    }

    /// Index of the first job whose comment equals `comment`.
    pub fn find_by_comment(&self, comment: &str) -> Option<usize> {
        self.lines.iter().position(|l| {
            matches!(l, Line::Job(job) if job.comment.as_deref() == Some(comment))
        })
    }

    /// Index of the first job that runs exactly `command`.
    pub fn find_by_command(&self, command: &str) -> Option<usize> {
        let escaped = escape_command(command);
        self.lines
            .iter()
            .position(|l| matches!(l, Line::Job(job) if job.command == escaped))
    }

    pub fn get(&self, index: usize) -> Option<&CronJob> {
        match self.lines.get(index) {
            Some(Line::Job(job)) => Some(job),
            _ => None,
        }
    }

    /// Remove the job at `index` (as returned by the `find_*` methods).
    pub fn remove(&mut self, index: usize) -> Option<CronJob> {
        match self.lines.get(index) {
            Some(Line::Job(_)) => match self.lines.remove(index) {
                Line::Job(job) => Some(job),
                Line::Verbatim(_) => None,
            },
            _ => None,
        }
    }

    pub fn push(&mut self, job: CronJob) {
        self.lines.push(Line::Job(job));
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Job(job) => out.push_str(&job.to_string()),
                Line::Verbatim(text) => out.push_str(text),
            }
            out.push('\n');
        }
        out
    }
}

// ─── Backing stores ──────────────────────────────────────────────────────────

/// Where a [`CronTable`] is loaded from and saved to.
pub trait CronStore {
    fn load(&self) -> Result<CronTable>;
    fn save(&self, table: &CronTable) -> Result<()>;
}

/// The invoking user's crontab, via the `crontab` command.
#[derive(Debug, Default)]
pub struct SystemCrontab;

impl CronStore for SystemCrontab {
    fn load(&self) -> Result<CronTable> {
        let output = Command::new("crontab")
            .arg("-l")
            .output()
            .context("failed to run crontab -l")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_missing_crontab(&stderr) {
                return Ok(CronTable::default());
            }
            bail!("crontab -l failed ({}): {}", output.status, stderr.trim());
        }
        Ok(CronTable::parse(&String::from_utf8_lossy(&output.stdout)))
    }

    fn save(&self, table: &CronTable) -> Result<()> {
        let mut child = Command::new("crontab")
            .arg("-")
            .stdin(Stdio::piped())
            .spawn()
            .context("failed to spawn crontab -")?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(table.render().as_bytes())
                .context("failed to write to crontab")?;
        }

        let status = child.wait().context("failed to wait for crontab")?;
        if !status.success() {
            bail!("crontab - exited non-zero ({status})");
        }
        Ok(())
    }
}

/// `crontab -l` reports a user without a crontab as "no crontab for <user>".
/// Any other failure means the table could not be read.
fn is_missing_crontab(stderr: &str) -> bool {
    stderr.to_lowercase().contains("no crontab")
}

/// A crontab kept in a plain file; a missing file is an empty table.
#[derive(Debug)]
pub struct FileCrontab {
    pub path: PathBuf,
}

impl CronStore for FileCrontab {
    fn load(&self) -> Result<CronTable> {
        if !self.path.exists() {
            return Ok(CronTable::default());
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        Ok(CronTable::parse(&text))
    }

    fn save(&self, table: &CronTable) -> Result<()> {
        std::fs::write(&self.path, table.render())
            .with_context(|| format!("writing {}", self.path.display()))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
