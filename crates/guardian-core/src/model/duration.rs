// ── Durations ──
//
// Two unrelated duration formats meet here:
//
// - `OnlineDuration`: how long a device has been connected, as reported by
//   the service. The canonical wire form is Python's `timedelta` rendering,
//   `[D day[s], ]H:MM:SS[.ffffff]`.
// - `BlockDuration`: how long a block should last, sent to `/block`.
//   Grammar: `<positive integer><h|m>`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

// ── OnlineDuration ──────────────────────────────────────────────────

/// A parsed online duration, truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OnlineDuration {
    total_secs: u64,
}

impl OnlineDuration {
    pub fn from_secs(total_secs: u64) -> Self {
        Self { total_secs }
    }

    /// Parse `"4 days, 2:23:19.137918"`, `"1 day, 0:00:05"`, `"2:23:19"`
    /// or `"03:15:00"`. Returns `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (days, clock) = match raw.split_once(',') {
            Some((day_part, clock)) => (parse_days(day_part)?, clock.trim()),
            None => (0, raw),
        };
        let clock_secs = parse_clock(clock)?;
        Some(Self {
            total_secs: days.checked_mul(SECS_PER_DAY)?.checked_add(clock_secs)?,
        })
    }

    pub fn days(&self) -> u64 {
        self.total_secs / SECS_PER_DAY
    }

    pub fn as_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.total_secs)
    }
}

/// `"4 days"` / `"1 day"` -> day count.
fn parse_days(part: &str) -> Option<u64> {
    let mut words = part.split_whitespace();
    let count = words.next()?.parse().ok()?;
    match (words.next(), words.next()) {
        (Some("day" | "days"), None) => Some(count),
        _ => None,
    }
}

/// `H:MM:SS[.ffffff]` -> seconds, dropping the fraction.
fn parse_clock(clock: &str) -> Option<u64> {
    let mut fields = clock.split(':');
    let (h, m, s) = (fields.next()?, fields.next()?, fields.next()?);
    if fields.next().is_some() {
        return None;
    }
    let hours: u64 = h.parse().ok()?;
    let minutes: u64 = m.parse().ok()?;
    let whole_secs = s.split_once('.').map_or(s, |(whole, frac)| {
        if frac.chars().all(|c| c.is_ascii_digit()) {
            whole
        } else {
            ""
        }
    });
    let seconds: u64 = whole_secs.parse().ok()?;
    if minutes >= 60 || seconds >= 60 || m.len() != 2 || whole_secs.len() != 2 {
        return None;
    }
    Some(hours * SECS_PER_HOUR + minutes * SECS_PER_MINUTE + seconds)
}

impl fmt::Display for OnlineDuration {
    /// `"4 days 02:23:19"`, `"1 day 00:00:05"` or `"02:23:19"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.days();
        let rem = self.total_secs % SECS_PER_DAY;
        let (h, m, s) = (
            rem / SECS_PER_HOUR,
            (rem % SECS_PER_HOUR) / SECS_PER_MINUTE,
            rem % SECS_PER_MINUTE,
        );
        match days {
            0 => write!(f, "{h:02}:{m:02}:{s:02}"),
            1 => write!(f, "1 day {h:02}:{m:02}:{s:02}"),
            d => write!(f, "{d} days {h:02}:{m:02}:{s:02}"),
        }
    }
}

/// Render a raw online-duration value for display.
///
/// Absent or blank values render as `-`. Values that don't parse as a
/// `timedelta` fall back to joining the first two comma-separated parts
/// with a space, or are shown verbatim when there is no comma.
pub fn format_online_duration(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return "-".into();
    };
    if let Some(parsed) = OnlineDuration::parse(raw) {
        return parsed.to_string();
    }
    let mut parts = raw.split(',');
    match (parts.next(), parts.next()) {
        (Some(first), Some(second)) => format!("{} {}", first.trim(), second.trim()),
        _ => raw.to_owned(),
    }
}

// ── BlockDuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockUnit {
    Hours,
    Minutes,
}

/// A positive block length such as `1h` or `30m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockDuration {
    amount: u32,
    unit: BlockUnit,
}

impl BlockDuration {
    pub fn hours(amount: u32) -> Result<Self, CoreError> {
        Self::new(amount, BlockUnit::Hours)
    }

    pub fn minutes(amount: u32) -> Result<Self, CoreError> {
        Self::new(amount, BlockUnit::Minutes)
    }

    fn new(amount: u32, unit: BlockUnit) -> Result<Self, CoreError> {
        let duration = Self { amount, unit };
        if amount == 0 {
            return Err(CoreError::InvalidDuration {
                input: duration.to_string(),
            });
        }
        Ok(duration)
    }

    pub fn unit(&self) -> BlockUnit {
        self.unit
    }

    pub fn as_duration(&self) -> Duration {
        let unit_secs = match self.unit {
            BlockUnit::Hours => SECS_PER_HOUR,
            BlockUnit::Minutes => SECS_PER_MINUTE,
        };
        Duration::from_secs(u64::from(self.amount) * unit_secs)
    }
}

impl FromStr for BlockDuration {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidDuration { input: s.to_owned() };
        let trimmed = s.trim();
        let (digits, unit) = match trimmed.char_indices().last() {
            Some((idx, 'h')) => (&trimmed[..idx], BlockUnit::Hours),
            Some((idx, 'm')) => (&trimmed[..idx], BlockUnit::Minutes),
            _ => return Err(invalid()),
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let amount: u32 = digits.parse().map_err(|_| invalid())?;
        Self::new(amount, unit).map_err(|_| invalid())
    }
}

impl fmt::Display for BlockDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.unit {
            BlockUnit::Hours => 'h',
            BlockUnit::Minutes => 'm',
        };
        write!(f, "{}{suffix}", self.amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_timedelta_with_days_and_fraction() {
        let d = OnlineDuration::parse("4 days, 2:23:19.137918").unwrap();
        assert_eq!(d.days(), 4);
        assert_eq!(d.as_secs(), 4 * SECS_PER_DAY + 2 * 3600 + 23 * 60 + 19);
        assert_eq!(d.to_string(), "4 days 02:23:19");
    }

    #[test]
    fn parses_single_day_and_padded_clock() {
        assert_eq!(
            OnlineDuration::parse("1 day, 0:00:05").unwrap().to_string(),
            "1 day 00:00:05"
        );
        assert_eq!(
            OnlineDuration::parse("2 days, 03:15:00").unwrap().to_string(),
            "2 days 03:15:00"
        );
        assert_eq!(
            OnlineDuration::parse("0:05:09").unwrap().to_string(),
            "00:05:09"
        );
    }

    #[test]
    fn rejects_malformed_durations() {
        for raw in ["", "abc", "4 days", "1:2:3", "1:60:00", "2 weeks, 1:00:00", "1:00:00.x"] {
            assert!(OnlineDuration::parse(raw).is_none(), "{raw:?} should not parse");
        }
    }

    #[test]
    fn format_falls_back_to_comma_split() {
        assert_eq!(format_online_duration(None), "-");
        assert_eq!(format_online_duration(Some("  ")), "-");
        assert_eq!(format_online_duration(Some("3 hours, 12 minutes")), "3 hours 12 minutes");
        assert_eq!(format_online_duration(Some("a while")), "a while");
        assert_eq!(
            format_online_duration(Some("4 days, 2:23:19.137918")),
            "4 days 02:23:19"
        );
    }

    #[test]
    fn block_duration_grammar() {
        let d: BlockDuration = "1h".parse().unwrap();
        assert_eq!(d.unit(), BlockUnit::Hours);
        assert_eq!(d.as_duration(), Duration::from_secs(3600));

        let d: BlockDuration = " 30m ".parse().unwrap();
        assert_eq!(d.to_string(), "30m");
        assert_eq!(d.as_duration(), Duration::from_secs(1800));
    }

    #[test]
    fn block_duration_rejects_bad_input() {
        for raw in ["", "h", "0h", "1", "1d", "-1h", "1.5h", "1 h", "1hm", "99999999999m"] {
            assert!(
                matches!(raw.parse::<BlockDuration>(), Err(CoreError::InvalidDuration { .. })),
                "{raw:?} should be rejected"
            );
        }
    }
}
