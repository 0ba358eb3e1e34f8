//! Command-line parsing.
//!
//! The grammar is deliberately loose: anything that is not a recognised flag
//! or option ends up as a backup path, so a typo never aborts a scheduled run.
//!
//! Parsing happens in two passes over the raw tokens:
//!
//! 1. Boolean flags (`-v`, `-f`, `-h`) are counted and removed.
//! 2. The rest is classified into [`Token`]s.  `-o`/`-c` take the following token
//!    as their value; every other token is a positional path.
//!
//! Flag values only describe what was typed.  Merging them with the
//! environment and the config file happens in [`crate::config`].

use std::path::Path;

use crate::config::DEFAULT_OUTPUT;

/// Usage text printed for `-h`/`--help`.
pub fn usage(program: &str) -> String {
    format!(
        "\
Usage: {program}: [options...] <paths>
\t-v, --verbose\tEnable debug output (ENV VAR: BACKUP_DEBUG). -v -v for very verbose.
\t-h, --help\tDisplay this info
\t-o, --output <path>\tThe directory to copy paths to. (ENV VAR: BACKUP_OUTPUT_PATH)
\t-c, --cron <tab definition>\tThe cron 'm h dom mon dow' e.g. '0 * * * *' (ENV VAR: BACKUP_CRON_SLICE)
\t-f, --force\tOverride existing cron job if conflict (ENV VAR: BACKUP_FORCE)."
    )
}

// ─── Parsed form ──────────────────────────────────────────────────────────────

/// What the command line asked for, before any defaults are applied.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub verbosity: u8,
    pub force: bool,
    pub output: Option<String>,
    pub cron: Option<String>,
    /// `-c` appeared at all, even without a value.
    pub cron_set: bool,
    pub paths: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParseOutcome {
    Run(CliArgs),
    /// `-h`/`--help` was given; nothing else should happen.
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKey {
    Output,
    Cron,
}

impl OptionKey {
    fn from_flag(token: &str) -> Option<Self> {
        match token {
            "-o" | "--output" => Some(Self::Output),
            "-c" | "--cron" => Some(Self::Cron),
            _ => None,
        }
    }
}

/// A token after boolean flags have been stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Option {
        key: OptionKey,
        value: Option<String>,
    },
    Positional(String),
}

// ─── Program name ─────────────────────────────────────────────────────────────

/// Base name cut at its first `.`, so `backup-cron.exe` and `backup-cron` match.
fn stem(token: &str) -> &str {
    let base = Path::new(token)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(token);
    base.split('.').next().unwrap_or(base)
}

/// Drop the program name from `argv`.
///
/// Tokens are taken from the end until one looks like `program` itself,
/// which copes with launchers that split a program path containing spaces
/// into several leading tokens.
pub fn strip_program_name(argv: &[String], program: &str) -> Vec<String> {
    let program = stem(program);

    let mut args: Vec<String> = argv
        .iter()
        .rev()
        .take_while(|tok| stem(tok) != program)
        .cloned()
        .collect();
    args.reverse();
    args
}

// ─── Pass 1: boolean flags ────────────────────────────────────────────────────

/// Remove `-v`, `-f` and `-h` (and long forms), recording them in `args`.
///
/// Returns `None` as soon as help is requested.
fn strip_boolean_flags(tokens: Vec<String>, args: &mut CliArgs) -> Option<Vec<String>> {
    let mut rest = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token.as_str() {
            "-v" | "--verbose" => args.verbosity = args.verbosity.saturating_add(1),
            "-h" | "--help" => return None,
            "-f" | "--force" => args.force = true,
            _ => rest.push(token),
        }
    }
    Some(rest)
}

// ─── Pass 2: options and positionals ──────────────────────────────────────────

pub fn tokenize(tokens: Vec<String>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        match OptionKey::from_flag(&token) {
            Some(key) => out.push(Token::Option {
                key,
                value: iter.next(),
            }),
            None => out.push(Token::Positional(token)),
        }
    }
    out
}

fn apply(tokens: Vec<Token>, args: &mut CliArgs) {
    for token in tokens {
        match token {
            Token::Option {
                key: OptionKey::Output,
                value,
            } => {
                // First one wins, unless it only restated the default.
                let unset = args.output.as_deref().is_none_or(|o| o == DEFAULT_OUTPUT);
                if unset && value.is_some() {
                    args.output = value;
                }
            },
            Token::Option {
                key: OptionKey::Cron,
                value,
            } => {
                args.cron = value;
                args.cron_set = true;
            },
            Token::Positional(path) => args.paths.push(path),
        }
    }
}

/// Parse the tokens that follow the program name.
pub fn parse(tokens: Vec<String>) -> ParseOutcome {
    let mut args = CliArgs::default();
    let Some(rest) = strip_boolean_flags(tokens, &mut args) else {
        return ParseOutcome::Help;
    };
    apply(tokenize(rest), &mut args);
    ParseOutcome::Run(args)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
