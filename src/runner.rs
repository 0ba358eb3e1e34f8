//! Transfer command construction.
//!
//! This module only *builds* the argument list handed to the sync binary.
//! Execution lives in [`crate::ui`] so the spinner can own the terminal while
//! the transfer runs, and everything here stays testable without spawning
//! anything.
//!
//! The command line built here doubles as the cron job's command and as the
//! input to [`crate::fingerprint::fingerprint`], so it must be byte-for-byte
//! stable for a given source and output root.

use crate::{
    config::Settings,
    error::BackupError,
    resolve::{destination_name, normalize},
};

/// Archive mode, compression, verbose.  Not user-configurable.
pub const SYNC_FLAGS: &str = "-avz";

/// One path's worth of work for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupTask {
    pub source: String,
    pub destination_name: String,
    /// `[sync_binary, -avz, source, destination]`, both paths normalised.
    pub transfer_args: Vec<String>,
}

impl BackupTask {
    /// Resolve `path` against the output root in `cfg`.
    pub fn resolve(path: &str, cfg: &Settings) -> Result<Self, BackupError> {
        let destination_name = destination_name(path)?;
        let transfer_args = transfer_args(
            &cfg.sync_binary,
            path,
            &format!("{}/{}", cfg.output, destination_name),
        );
        Ok(Self {
            source: path.to_string(),
            destination_name,
            transfer_args,
        })
    }

    /// The transfer as a single shell-style line, as stored in the crontab.
    pub fn command_line(&self) -> String {
        self.transfer_args.join(" ")
    }
}

/// `<sync_binary> -avz <source> <destination>`, with both paths normalised.
pub fn transfer_args(sync_binary: &str, source: &str, destination: &str) -> Vec<String> {
    vec![
        sync_binary.to_string(),
        SYNC_FLAGS.to_string(),
        normalize(source),
        normalize(destination),
    ]
}

// ─── Tests ────────────────────────────────────────────────────────────────────
