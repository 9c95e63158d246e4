//! Refresh interval expressions.
//!
//! Accepted forms:
//! - `@every <duration>` (e.g. `@every 1m`, `@every 1.5m`)
//! - `<duration>` (e.g. `30s`)
//! - a standard five-field cron expression (e.g. `*/5 * * * *`)
//! - a descriptor: `@yearly`, `@annually`, `@monthly`, `@weekly`,
//!   `@daily`, `@midnight` or `@hourly`
//!
//! A duration is one or more `<number><unit>` pairs with units `h`, `m`,
//! `s`, `ms`, `us` (or `µs`) and `ns`, so `1m30s` is ninety seconds and
//! `1.5h` is ninety minutes. Fixed periods run on whole seconds: any
//! sub-second remainder is dropped and periods under one second run once
//! a second.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use croner::Cron;

use crate::errors::ConfigError;

const EVERY_PREFIX: &str = "@every";

const DESCRIPTORS: [(&str, &str); 7] = [
    ("@yearly", "0 0 1 1 *"),
    ("@annually", "0 0 1 1 *"),
    ("@monthly", "0 0 1 * *"),
    ("@weekly", "0 0 * * 0"),
    ("@daily", "0 0 * * *"),
    ("@midnight", "0 0 * * *"),
    ("@hourly", "0 * * * *"),
];

/// When cycles start after the first one.
#[derive(Clone)]
pub enum Cadence {
    /// A fixed period between starts.
    Every(Duration),
    /// Wall-clock times matching a cron pattern, in UTC.
    Cron(Arc<Cron>),
}

impl Cadence {
    /// The first start strictly after `after`, or `None` if there is none.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Cadence::Every(period) => chrono::Duration::from_std(*period)
                .ok()
                .and_then(|step| after.checked_add_signed(step)),
            Cadence::Cron(cron) => cron.find_next_occurrence(&after, false).ok(),
        }
    }
}

impl fmt::Debug for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cadence::Every(period) => f.debug_tuple("Every").field(period).finish(),
            Cadence::Cron(_) => f.write_str("Cron"),
        }
    }
}

/// A validated refresh schedule together with the expression it came from.
#[derive(Debug, Clone)]
pub struct RefreshInterval {
    expr: String,
    cadence: Cadence,
}

impl RefreshInterval {
    pub fn cadence(&self) -> &Cadence {
        &self.cadence
    }

    /// The fixed period, for `@every` and bare durations.
    pub fn period(&self) -> Option<Duration> {
        match self.cadence {
            Cadence::Every(period) => Some(period),
            Cadence::Cron(_) => None,
        }
    }
}

impl PartialEq for RefreshInterval {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
    }
}

impl Eq for RefreshInterval {}

impl fmt::Display for RefreshInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr)
    }
}

impl FromStr for RefreshInterval {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expr = s.trim();
        let invalid = |reason: &str| ConfigError::InvalidInterval {
            expr: s.to_string(),
            reason: reason.to_string(),
        };

        let cadence = if let Some(rest) = expr.strip_prefix(EVERY_PREFIX) {
            if !rest.starts_with(char::is_whitespace) {
                return Err(invalid("expected a duration after '@every'"));
            }
            every(rest.trim_start()).map_err(|reason| invalid(&reason))?
        } else if expr.starts_with('@') {
            let pattern = DESCRIPTORS
                .iter()
                .find(|(name, _)| *name == expr)
                .map(|(_, pattern)| *pattern)
                .ok_or_else(|| invalid("unknown descriptor"))?;
            cron(pattern).map_err(|reason| invalid(&reason))?
        } else if expr.contains(char::is_whitespace) {
            if expr.split_whitespace().count() != 5 {
                return Err(invalid("cron expressions need exactly five fields"));
            }
            cron(expr).map_err(|reason| invalid(&reason))?
        } else {
            every(expr).map_err(|reason| invalid(&reason))?
        };

        Ok(Self {
            expr: expr.to_string(),
            cadence,
        })
    }
}

fn every(body: &str) -> Result<Cadence, String> {
    let period = parse_duration(body)?;
    if period.is_zero() {
        return Err("interval must be greater than zero".to_string());
    }
    let whole_secs = Duration::from_secs(period.as_secs().max(1));
    Ok(Cadence::Every(whole_secs))
}

fn cron(pattern: &str) -> Result<Cadence, String> {
    Cron::new(pattern)
        .parse()
        .map(|parsed| Cadence::Cron(Arc::new(parsed)))
        .map_err(|e| e.to_string())
}

/// Parse a compact duration such as `1h`, `90s`, `1m30s`, `1.5m` or `500ms`.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    if input.is_empty() {
        return Err("missing duration".to_string());
    }
    if input == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total_nanos: u128 = 0;
    let mut rest = input;

    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        let number = &rest[..number_end];
        rest = &rest[number_end..];

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
            return Err(format!("expected a number in '{}'", input));
        }

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        rest = &rest[unit_end..];

        let unit_nanos: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60_000_000_000,
            "h" => 3_600_000_000_000,
            "" => return Err(format!("missing unit after '{}'", number)),
            other => return Err(format!("unknown unit '{}'", other)),
        };

        let too_large = || format!("duration too large in '{}'", input);
        let whole_value: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| too_large())?
        };
        let mut step = whole_value.checked_mul(unit_nanos).ok_or_else(too_large)?;

        let mut scale = unit_nanos;
        for digit in fraction.chars().filter_map(|c| c.to_digit(10)) {
            scale /= 10;
            if scale == 0 {
                break;
            }
            step += u128::from(digit) * scale;
        }

        total_nanos = total_nanos.checked_add(step).ok_or_else(too_large)?;
    }

    let secs = u64::try_from(total_nanos / 1_000_000_000)
        .map_err(|_| format!("duration too large in '{}'", input))?;
    let nanos = (total_nanos % 1_000_000_000) as u32;
    Ok(Duration::new(secs, nanos))
}
