//! Idempotent cron registration for one transfer command.
//!
//! Each transfer owns at most one job, identified by its fingerprint stored as
//! the job comment.  Registering the same command again is a no-op that
//! reports a conflict, unless `force` is set, in which case the old job is
//! replaced.
//!
//! ```text
//! Searching ─┬─ no match ────────────────────────────┐
//!            ├─ match, !force ─► Conflict            ▼
//!            └─ match,  force ─► remove old ─► Creating ─┬─ valid ─► save ─► Created/Replaced
//!                                                        └─ invalid ────────► Rejected
//! ```
//!
//! The table is only saved after the new job has validated, so an invalid
//! schedule never reaches the store and a forced replacement with a bad
//! schedule leaves the old job in place.

use anyhow::Result;
use tracing::{debug, error, trace};

use crate::{
    crontab::{CronJob, CronStore},
    error::BackupError,
    fingerprint::fingerprint,
    schedule::ScheduleError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Created { fingerprint: String },
    /// `previous` is the job that was removed to make room.
    Replaced {
        fingerprint: String,
        previous: CronJob,
    },
    /// A job for this command exists and `force` was not set.
    Conflict { existing: CronJob },
    Rejected(ScheduleError),
}

impl Registration {
    /// Whether the store now holds a job for this command with the new schedule.
    pub const fn persisted(&self) -> bool {
        matches!(self, Self::Created { .. } | Self::Replaced { .. })
    }
}

/// Register `command` on `schedule_expr` in `store`.
///
/// Conflicts and invalid schedules are logged and returned as outcomes; only
/// failures to read or write the store are errors.
pub fn register(
    store: &dyn CronStore,
    command: &str,
    schedule_expr: &str,
    force: bool,
) -> Result<Registration> {
    let fp = fingerprint(command);
    let mut table = store.load()?;
    trace!(
        "Existing cron jobs: {:?}",
        table.jobs().map(ToString::to_string).collect::<Vec<_>>()
    );

    let existing = table
        .find_by_comment(&fp)
        .or_else(|| table.find_by_command(command));

    let previous = match existing {
        Some(index) if !force => {
            let existing = table
                .get(index)
                .cloned()
                .unwrap_or_else(|| CronJob::new(command, &fp));
            error!(
                "{}",
                BackupError::ConflictingScheduledJob {
                    command: command.to_string()
                }
            );
            return Ok(Registration::Conflict { existing });
        },
        Some(index) => {
            let removed = table.remove(index);
            if let Some(ref job) = removed {
                debug!(
                    "Cron job already exists... DELETING {}",
                    job.comment.as_deref().unwrap_or(&job.command)
                );
            }
            removed
        },
        None => None,
    };

    let mut job = CronJob::new(command, &fp);
    job.set_schedule(schedule_expr);

    if let Err(reason) = job.validate() {
        error!(
            "{}",
            BackupError::InvalidSchedule {
                command: command.to_string(),
                source: reason.clone(),
            }
        );
        return Ok(Registration::Rejected(reason));
    }

    debug!("Creating cron job: {job}");
    table.push(job);
    store.save(&table)?;

    Ok(match previous {
        Some(previous) => Registration::Replaced {
            fingerprint: fp,
            previous,
        },
        None => Registration::Created { fingerprint: fp },
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────────
