//! Error taxonomy for a backup run.
//!
//! Only two of these are fatal: [`BackupError::TransferFailed`] and
//! [`BackupError::OutputDirectory`].  Everything else is logged against the
//! path that caused it and the run moves on to the next path.

use std::path::PathBuf;

use thiserror::Error;

use crate::schedule::ScheduleError;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("{} does not exist!", .0.display())]
    PathNotFound(PathBuf),

    #[error("cannot derive a destination name from {}", .0.display())]
    UnnamedSource(PathBuf),

    #[error("Cron job already exists for {command}!")]
    ConflictingScheduledJob { command: String },

    #[error("Cannot create cron job for {command}: {source}")]
    InvalidSchedule {
        command: String,
        #[source]
        source: ScheduleError,
    },

    /// The sync process could not be spawned or exited non-zero.
    #[error("transfer failed ({status}): {command}")]
    TransferFailed {
        command: String,
        status: String,
        output: String,
    },

    #[error("cannot create output directory {}", path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BackupError {
    /// Whether the run must stop when this error is raised.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::TransferFailed { .. } | Self::OutputDirectory { .. }
        )
    }
}
