//! `backup-cron`: rsync a set of paths into a backup root, and optionally
//! keep a cron job that repeats the same transfer.
//!
//! # Usage
//!
//! ```text
//! backup-cron /home/alice                          # sync into ./output/alice
//! backup-cron -o /mnt/backup /home/alice /etc/     # sync into /mnt/backup/{alice,etc}
//! backup-cron -o /mnt/backup -c '0 2 * * *' /srv   # ...and run it nightly at 02:00
//! backup-cron -f -o /mnt/backup -c '@daily' /srv   # replace the job if one exists
//! ```
//!
//! Running the same command twice never creates a second cron job: each job is
//! tagged with the SHA-256 of its command line, and an existing job is only
//! replaced when `--force` is given.
//!
//! # Module layout
//!
//! | Module            | Responsibility                                   |
//! |-------------------|--------------------------------------------------|
//! | [`cli`]           | Flag/option/path tokenising                      |
//! | [`config`]        | Defaults, config file, `BACKUP_*` env, flags     |
//! | [`logging`]       | `tracing` subscriber setup                       |
//! | [`error`]         | Error taxonomy                                   |
//! | [`resolve`]       | Destination names and path normalisation         |
//! | [`runner`]        | Transfer command construction                    |
//! | [`ui`]            | Spinner, captured execution, per-path output     |
//! | [`fingerprint`]   | Job identity                                     |
//! | [`schedule`]      | Five-field schedule validation                   |
//! | [`crontab`]       | Crontab model and backing stores                 |
//! | [`registrar`]     | Idempotent job registration                      |
//! | [`commands::run`] | The per-path pipeline                            |

mod cli;
mod commands;
mod config;
mod crontab;
mod error;
mod fingerprint;
mod logging;
mod registrar;
mod resolve;
mod runner;
mod schedule;
mod ui;

use anyhow::Result;
use cli::ParseOutcome;
use crontab::{CronStore, FileCrontab, SystemCrontab};

fn main() -> Result<()> {
    let argv: Vec<String> = std::env::args_os()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    let program = argv.first().cloned().unwrap_or_else(|| "backup-cron".into());

    let args = match cli::parse(cli::strip_program_name(&argv, &program)) {
        ParseOutcome::Run(args) => args,
        ParseOutcome::Help => {
            println!("{}", cli::usage(&program));
            std::process::exit(1);
        },
    };

    let settings = config::load(args)?;
    logging::init(settings.verbosity);

    let store: Box<dyn CronStore> = match settings.crontab_file {
        Some(ref path) => Box::new(FileCrontab { path: path.clone() }),
        None => Box::new(SystemCrontab),
    };

    commands::run::run(&settings, store.as_ref())
}
