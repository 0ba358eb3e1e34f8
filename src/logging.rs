//! Logging setup.
//!
//! Every line is timestamped and tagged with its level, and goes to stderr so
//! that stdout only carries the usage text and the run summary.
//!
//! | verbosity | filter  | what shows up                                   |
//! |-----------|---------|-------------------------------------------------|
//! | 0         | `info`  | errors and schedule conflicts                   |
//! | 1 (`-v`)  | `debug` | executed commands, their output, created jobs   |
//! | 2 (`-vv`) | `trace` | resolved settings, the existing job table       |
//!
//! `RUST_LOG` overrides the table above.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

pub fn init(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("backup_cron={},warn", level_for(verbosity)))
    });

    let console_layer = fmt::layer()
        .with_target(false)
        .with_ansi(console::colors_enabled_stderr())
        .with_writer(std::io::stderr);

    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}
