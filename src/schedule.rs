//! Five-field cron schedule validation.
//!
//! Accepts the classic `minute hour day-of-month month day-of-week` syntax
//! understood by the system `crontab`, plus the `@daily`-style shorthands.
//!
//! ```text
//! 0 2 * * *          # every day at 02:00
//! */15 9-17 * * 1-5  # every quarter hour during office hours
//! 0 0 1 jan,jul *    # twice a year
//! @weekly
//! ```

use thiserror::Error;

// ─── Field domains ───────────────────────────────────────────────────────────

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const DAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

const MACROS: [&str; 8] = [
    "@reboot",
    "@yearly",
    "@annually",
    "@monthly",
    "@weekly",
    "@daily",
    "@midnight",
    "@hourly",
];

struct Field {
    name: &'static str,
    min: u32,
    max: u32,
    /// Names accepted in place of numbers; index 0 maps to `min`.
    names: &'static [&'static str],
}

const FIELDS: [Field; 5] = [
    Field { name: "minute", min: 0, max: 59, names: &[] },
    Field { name: "hour", min: 0, max: 23, names: &[] },
    Field { name: "day-of-month", min: 1, max: 31, names: &[] },
    Field { name: "month", min: 1, max: 12, names: &MONTH_NAMES },
    // 7 is Sunday again, as in Vixie cron.
    Field { name: "day-of-week", min: 0, max: 7, names: &DAY_NAMES },
];

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("expected 5 fields (m h dom mon dow), found {0}")]
    FieldCount(usize),

    #[error("unknown schedule shorthand '{0}'")]
    UnknownMacro(String),

    #[error("invalid {field} field '{value}'")]
    InvalidField { field: &'static str, value: String },
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Check `expr` against the crontab grammar, reporting the first fault.
pub fn validate(expr: &str) -> Result<(), ScheduleError> {
    let fields: Vec<&str> = expr.split_whitespace().collect();

    if let [single] = fields.as_slice() {
        if single.starts_with('@') {
            let lower = single.to_ascii_lowercase();
            return if MACROS.contains(&lower.as_str()) {
                Ok(())
            } else {
                Err(ScheduleError::UnknownMacro((*single).to_string()))
            };
        }
    }

    if fields.len() != FIELDS.len() {
        return Err(ScheduleError::FieldCount(fields.len()));
    }

    for (value, field) in fields.iter().zip(FIELDS.iter()) {
        if !field_is_valid(value, field) {
            return Err(ScheduleError::InvalidField {
                field: field.name,
                value: (*value).to_string(),
            });
        }
    }
    Ok(())
}

/// Collapse runs of whitespace so the stored schedule is canonical.
pub fn canonical(expr: &str) -> String {
    expr.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn field_is_valid(value: &str, field: &Field) -> bool {
    !value.is_empty() && value.split(',').all(|item| item_is_valid(item, field))
}

/// One comma-separated item: `*`, `N`, `N-M`, each optionally `/step`.
fn item_is_valid(item: &str, field: &Field) -> bool {
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => (range, Some(step)),
        None => (item, None),
    };

    if let Some(step) = step {
        match step.parse::<u32>() {
            Ok(n) if n >= 1 => {},
            _ => return false,
        }
    }

    if range == "*" {
        return true;
    }

    match range.split_once('-') {
        Some((lo, hi)) => match (value_of(lo, field), value_of(hi, field)) {
            (Some(lo), Some(hi)) => lo <= hi,
            _ => false,
        },
        None => value_of(range, field).is_some(),
    }
}

fn value_of(token: &str, field: &Field) -> Option<u32> {
    if let Ok(n) = token.parse::<u32>() {
        return (field.min..=field.max).contains(&n).then_some(n);
    }
    let lower = token.to_ascii_lowercase();
    field
        .names
        .iter()
        .position(|name| *name == lower)
        .map(|i| field.min + i as u32)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_schedules() {
        for expr in [
            "0 2 * * *",
            "* * * * *",
            "*/15 9-17 * * 1-5",
            "0 0 1 jan,jul *",
            "30 4 1,15 * 0",
            "0 0 * * 7",
            "0 0 * * sun",
            "5 0 * 8 MON-FRI",
            "0-30/10 * * * *",
            "  0   2 * *   * ",
        ] {
            assert_eq!(validate(expr), Ok(()), "{expr}");
        }
    }

    #[test]
    fn accepts_shorthands() {
        for expr in ["@daily", "@hourly", "@reboot", "@WEEKLY"] {
            assert_eq!(validate(expr), Ok(()), "{expr}");
        }
    }

    #[test]
    fn rejects_unknown_shorthand() {
        assert_eq!(
            validate("@fortnightly"),
            Err(ScheduleError::UnknownMacro("@fortnightly".into()))
        );
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert_eq!(validate("0 2 * *"), Err(ScheduleError::FieldCount(4)));
        assert_eq!(validate("0 2 * * * *"), Err(ScheduleError::FieldCount(6)));
        assert_eq!(validate(""), Err(ScheduleError::FieldCount(0)));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            validate("60 * * * *"),
            Err(ScheduleError::InvalidField {
                field: "minute",
                value: "60".into()
            })
        );
        assert!(matches!(
            validate("0 24 * * *"),
            Err(ScheduleError::InvalidField { field: "hour", .. })
        ));
        assert!(matches!(
            validate("0 0 0 * *"),
            Err(ScheduleError::InvalidField { field: "day-of-month", .. })
        ));
        assert!(matches!(
            validate("0 0 * 13 *"),
            Err(ScheduleError::InvalidField { field: "month", .. })
        ));
        assert!(matches!(
            validate("0 0 * * 8"),
            Err(ScheduleError::InvalidField { field: "day-of-week", .. })
        ));
    }

    #[test]
    fn rejects_malformed_items() {
        for expr in [
            "*/0 * * * *",
            "5-1 * * * *",
            "a * * * *",
            "1,,2 * * * *",
            "0 2 * foo *",
            "*/x * * * *",
            "0 2 * * mon-",
        ] {
            assert!(validate(expr).is_err(), "{expr} should be rejected");
        }
    }

    #[test]
    fn canonical_collapses_whitespace() {
        assert_eq!(canonical("  0   2 * *\t* "), "0 2 * * *");
    }
}
