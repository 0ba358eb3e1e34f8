//! The backup pipeline.
//!
//! # Per-path stages (in order)
//!
//! | # | Stage    | On failure                                          |
//! |---|----------|-----------------------------------------------------|
//! | 1 | Resolve  | path skipped, run continues                         |
//! | 2 | Transfer | run aborted                                         |
//! | 3 | Schedule | only with a schedule; conflict/invalid is logged    |
//!
//! Before the first path, the output root is created (one level only; its
//! parent must exist).  Paths are handled one at a time, in the order given.
//!
//! A failed transfer stops the whole run: later paths are not attempted and
//! no job is registered for the failed one.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, error, trace};

use crate::{
    config::Settings,
    crontab::CronStore,
    error::BackupError,
    registrar::register,
    runner::BackupTask,
    ui::{PathOutcome, print_summary, run_transfer},
};

// ─── Entry point ──────────────────────────────────────────────────────────────

/// Back up every path in `cfg`, registering cron jobs in `store` if a
/// schedule is set.
pub fn run(cfg: &Settings, store: &dyn CronStore) -> Result<()> {
    ensure_output_dir(&cfg.output)?;

    trace!("paths_to_backup: {:?}", cfg.paths);
    trace!("output: {}", cfg.output);
    trace!("force: {}", cfg.force);
    trace!("cron: {:?}", cfg.cron);

    let mut outcomes: Vec<PathOutcome> = Vec::with_capacity(cfg.paths.len());

    for path in &cfg.paths {
        // 1. Resolve
        let task = match BackupTask::resolve(path, cfg) {
            Ok(task) => task,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                error!("{e}");
                let outcome = PathOutcome::skipped(path, &e);
                outcome.print();
                outcomes.push(outcome);
                continue;
            },
        };

        // 2. Transfer
        debug!("{} -> {}/{}", task.source, cfg.output, task.destination_name);
        debug!("EXEC CMD: {}", task.command_line());
        match run_transfer(&task) {
            Ok(output) => debug!("{output}"),
            Err(e) => {
                error!("{e}");
                if let BackupError::TransferFailed { ref output, .. } = e {
                    if !output.is_empty() {
                        error!("transfer output:\n{output}");
                    }
                }
                let outcome = PathOutcome::failed(path, &e);
                outcome.print();
                outcomes.push(outcome);
                print_summary(&outcomes);
                return Err(e.into());
            },
        }

        // 3. Schedule
        let registration = match cfg.cron.as_deref() {
            Some(expr) => Some(register(store, &task.command_line(), expr, cfg.force)?),
            None => None,
        };

        let outcome = PathOutcome::transferred(&task, registration.as_ref());
        outcome.print();
        outcomes.push(outcome);
    }

    print_summary(&outcomes);
    Ok(())
}

/// Create the output root if it is not already a directory.
///
/// Only the last component is created; a missing parent is an error.
pub fn ensure_output_dir(output: &str) -> Result<(), BackupError> {
    let path = Path::new(output);
    if path.is_dir() {
        return Ok(());
    }
    std::fs::create_dir(path).map_err(|source| BackupError::OutputDirectory {
        path: path.to_path_buf(),
        source,
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────────
