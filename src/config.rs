//! Settings for one run, and the layers they are built from.
//!
//! Lowest to highest precedence:
//!
//! 1. Built-in defaults ([`DEFAULT_OUTPUT`], `rsync`, the user's crontab).
//! 2. An optional TOML file: `$BACKUP_CONFIG`, else `~/.config/backup-cron/config.toml`.
//! 3. `BACKUP_*` environment variables.
//! 4. Command-line flags.
//!
//! The result is a [`Settings`] value that is built once in `main` and only
//! ever borrowed afterwards.
//!
//! # File format
//!
//! ```toml
//! output      = "/mnt/backup"
//! verbose     = 1
//! cron        = "0 2 * * *"
//! force       = false
//! sync_binary = "/usr/bin/rsync"
//! crontab_file = "/home/alice/.backup-crontab"   # omit to use `crontab -l`
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::CliArgs;

pub const DEFAULT_OUTPUT: &str = "output";
pub const DEFAULT_SYNC_BINARY: &str = "rsync";

pub const ENV_CONFIG: &str = "BACKUP_CONFIG";
pub const ENV_OUTPUT: &str = "BACKUP_OUTPUT_PATH";
pub const ENV_DEBUG: &str = "BACKUP_DEBUG";
pub const ENV_CRON: &str = "BACKUP_CRON_SLICE";
pub const ENV_FORCE: &str = "BACKUP_FORCE";
pub const ENV_SYNC_BIN: &str = "BACKUP_SYNC_BIN";
pub const ENV_CRONTAB_FILE: &str = "BACKUP_CRONTAB_FILE";

// ─── Resolved settings ────────────────────────────────────────────────────────

/// Everything a run needs to know, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub verbosity: u8,
    /// Replace a conflicting cron job instead of skipping registration.
    pub force: bool,
    /// Destination root; each path is synced to `output/<name>`.
    pub output: String,
    /// Five-field schedule; `None` means no cron registration at all.
    pub cron: Option<String>,
    pub paths: Vec<String>,
    pub sync_binary: String,
    /// Use this file as the crontab instead of the user's real one.
    pub crontab_file: Option<PathBuf>,
}

// ─── Partial layers ───────────────────────────────────────────────────────────

/// One configuration layer, where every field is optional.
///
/// Also the on-disk shape of the config file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub verbose: Option<u8>,
    #[serde(default)]
    pub cron: Option<String>,
    #[serde(default)]
    pub force: Option<bool>,
    #[serde(default)]
    pub sync_binary: Option<String>,
    #[serde(default)]
    pub crontab_file: Option<PathBuf>,
}

impl PartialConfig {
    /// Overlay `other` on top of `self`; `other` wins field by field.
    pub fn merge(self, other: Self) -> Self {
        Self {
            output: other.output.or(self.output),
            verbose: other.verbose.or(self.verbose),
            cron: other.cron.or(self.cron),
            force: other.force.or(self.force),
            sync_binary: other.sync_binary.or(self.sync_binary),
            crontab_file: other.crontab_file.or(self.crontab_file),
        }
    }

    /// Read the `BACKUP_*` variables through `lookup`.
    ///
    /// Taking a lookup function keeps this testable without touching the real
    /// process environment.
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let verbose = lookup(ENV_DEBUG)
            .map(|v| {
                v.trim()
                    .parse::<u8>()
                    .with_context(|| format!("{ENV_DEBUG} must be a small integer, got '{v}'"))
            })
            .transpose()?;

        Ok(Self {
            output: lookup(ENV_OUTPUT),
            verbose,
            cron: lookup(ENV_CRON),
            force: lookup(ENV_FORCE).map(|v| is_truthy(&v)),
            sync_binary: lookup(ENV_SYNC_BIN),
            crontab_file: lookup(ENV_CRONTAB_FILE).map(PathBuf::from),
        })
    }

    /// Apply command-line flags on top of this layer.
    pub fn resolve(self, cli: CliArgs) -> Settings {
        Settings {
            verbosity: self.verbose.unwrap_or(0).saturating_add(cli.verbosity),
            force: cli.force || self.force.unwrap_or(false),
            output: cli
                .output
                .or(self.output)
                .unwrap_or_else(|| DEFAULT_OUTPUT.into()),
            cron: if cli.cron_set { cli.cron } else { self.cron },
            paths: cli.paths,
            sync_binary: self
                .sync_binary
                .unwrap_or_else(|| DEFAULT_SYNC_BINARY.into()),
            crontab_file: self.crontab_file,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ─── Loader ───────────────────────────────────────────────────────────────────

/// Parse a config file, returning `Ok(None)` when it does not exist.
///
/// A file that exists but cannot be read or parsed is an error.
pub fn parse_partial(path: &Path) -> Result<Option<PartialConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let cfg = toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(cfg))
}

/// Where the config file is looked up.
pub fn config_path(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    lookup(ENV_CONFIG).map(PathBuf::from).or_else(|| {
        dirs_next::config_dir().map(|d| d.join("backup-cron").join("config.toml"))
    })
}

/// Merge file, environment and flags into the final [`Settings`].
pub fn load(cli: CliArgs) -> Result<Settings> {
    let env = |key: &str| std::env::var(key).ok();

    let file = match config_path(env) {
        Some(path) => parse_partial(&path)?.unwrap_or_default(),
        None => PartialConfig::default(),
    };
    let environment = PartialConfig::from_env(env)?;

    Ok(file.merge(environment).resolve(cli))
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // ── defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn empty_layers_resolve_to_defaults() {
        let s = PartialConfig::default().resolve(CliArgs::default());
        assert_eq!(s.output, DEFAULT_OUTPUT);
        assert_eq!(s.verbosity, 0);
        assert!(!s.force);
        assert!(s.cron.is_none());
        assert_eq!(s.sync_binary, "rsync");
        assert!(s.crontab_file.is_none());
        assert!(s.paths.is_empty());
    }

    // ── environment ───────────────────────────────────────────────────────────

    #[test]
    fn env_supplies_defaults() {
        let env = PartialConfig::from_env(env_of(&[
            (ENV_OUTPUT, "/mnt/env"),
            (ENV_DEBUG, "2"),
            (ENV_CRON, "0 3 * * *"),
            (ENV_FORCE, "yes"),
        ]))
        .unwrap();
        let s = env.resolve(CliArgs::default());
        assert_eq!(s.output, "/mnt/env");
        assert_eq!(s.verbosity, 2);
        assert_eq!(s.cron.as_deref(), Some("0 3 * * *"));
        assert!(s.force);
    }

    #[test]
    fn env_force_accepts_only_truthy_values() {
        for (value, expected) in [("1", true), ("TRUE", true), ("on", true), ("0", false), ("", false)] {
            let env = PartialConfig::from_env(env_of(&[(ENV_FORCE, value)])).unwrap();
            assert_eq!(env.force, Some(expected), "{value:?}");
        }
    }

    #[test]
    fn env_debug_must_be_numeric() {
        let err = PartialConfig::from_env(env_of(&[(ENV_DEBUG, "lots")])).unwrap_err();
        assert!(err.to_string().contains(ENV_DEBUG));
    }

    // ── flags over env ────────────────────────────────────────────────────────

    #[test]
    fn flags_override_env() {
        let env = PartialConfig::from_env(env_of(&[
            (ENV_OUTPUT, "/mnt/env"),
            (ENV_CRON, "0 3 * * *"),
        ]))
        .unwrap();
        let cli = CliArgs {
            output: Some("/mnt/flag".into()),
            cron: Some("@daily".into()),
            cron_set: true,
            ..CliArgs::default()
        };
        let s = env.resolve(cli);
        assert_eq!(s.output, "/mnt/flag");
        assert_eq!(s.cron.as_deref(), Some("@daily"));
    }

    #[test]
    fn trailing_cron_flag_without_value_clears_env_schedule() {
        let env = PartialConfig::from_env(env_of(&[(ENV_CRON, "0 3 * * *")])).unwrap();
        let cli = CliArgs {
            cron: None,
            cron_set: true,
            ..CliArgs::default()
        };
        assert!(env.resolve(cli).cron.is_none());
    }

    #[test]
    fn verbosity_flags_add_to_env_level() {
        let env = PartialConfig::from_env(env_of(&[(ENV_DEBUG, "1")])).unwrap();
        let cli = CliArgs {
            verbosity: 2,
            ..CliArgs::default()
        };
        assert_eq!(env.resolve(cli).verbosity, 3);
    }

    // ── file layer ────────────────────────────────────────────────────────────

    #[test]
    fn merge_prefers_the_overlay() {
        let file = PartialConfig {
            output: Some("/mnt/file".into()),
            sync_binary: Some("/opt/rsync".into()),
            ..PartialConfig::default()
        };
        let env = PartialConfig {
            output: Some("/mnt/env".into()),
            ..PartialConfig::default()
        };
        let merged = file.merge(env);
        assert_eq!(merged.output.as_deref(), Some("/mnt/env"));
        assert_eq!(merged.sync_binary.as_deref(), Some("/opt/rsync"));
    }

    #[test]
    fn parse_partial_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(parse_partial(&dir.path().join("absent.toml")).unwrap().is_none());
    }

    #[test]
    fn parse_partial_reads_all_keys() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"
            output       = "/mnt/backup"
            verbose      = 1
            cron         = "0 2 * * *"
            force        = true
            sync_binary  = "/usr/bin/rsync"
            crontab_file = "/tmp/crontab"
            "#
        )
        .unwrap();

        let cfg = parse_partial(f.path()).unwrap().unwrap();
        assert_eq!(cfg.output.as_deref(), Some("/mnt/backup"));
        assert_eq!(cfg.verbose, Some(1));
        assert_eq!(cfg.cron.as_deref(), Some("0 2 * * *"));
        assert_eq!(cfg.force, Some(true));
        assert_eq!(cfg.sync_binary.as_deref(), Some("/usr/bin/rsync"));
        assert_eq!(cfg.crontab_file, Some(PathBuf::from("/tmp/crontab")));
    }

    #[test]
    fn parse_partial_errors_on_invalid_toml() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "not valid toml ][[[").unwrap();
        assert!(parse_partial(f.path()).is_err());
    }

    #[test]
    fn parse_partial_rejects_unknown_keys() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "outptu = \"/typo\"").unwrap();
        assert!(parse_partial(f.path()).is_err());
    }

    #[test]
    fn config_path_honours_override() {
        let path = config_path(env_of(&[(ENV_CONFIG, "/etc/backup-cron.toml")]));
        assert_eq!(path, Some(PathBuf::from("/etc/backup-cron.toml")));
    }
}
