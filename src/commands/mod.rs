//! Command handlers.
//!
//! | File     | Invocation                | Description                          |
//! |----------|---------------------------|--------------------------------------|
//! | `run.rs` | `backup-cron [opts] paths` | Sync each path, optionally schedule |

pub mod run;
