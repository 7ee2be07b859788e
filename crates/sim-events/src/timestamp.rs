//! World time types.
//!
//! World time advances in fixed `turnMinutes`-sized steps (10 world-minutes
//! per turn). It is stored internally as whole minutes since the Unix epoch
//! so that it serializes as an ordinary ISO-8601 UTC timestamp on disk and in
//! logs, and so that turn/hour/day cadence checks are simple modular
//! arithmetic over a monotone integer rather than calendar math.
//!
//! # Example
//!
//! ```
//! use sim_events::WorldTime;
//!
//! let t = WorldTime::parse("2024-01-01T00:00:00Z").unwrap();
//! let next = t.advance_turns(1);
//! assert_eq!(next.to_string(), "2024-01-01T00:10:00Z");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// World-minutes per turn. Fixed by specification.
pub const TURN_MINUTES: i64 = 10;
/// Turns per hour.
pub const HOUR_TURNS: i64 = 6;
/// Hours per day.
pub const DAY_HOURS: i64 = 24;
/// Turns per day (`HOUR_TURNS * DAY_HOURS`).
pub const DAY_TURNS: i64 = HOUR_TURNS * DAY_HOURS;

/// A point in world time, stored as whole minutes since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorldTime(i64);

impl Default for WorldTime {
    /// The Unix epoch. Only meaningful as a `serde(default)` fallback for a
    /// pre-seed snapshot field; every real `WorldTime` comes from
    /// [`WorldTime::parse`] or [`WorldTime::advance_turns`].
    fn default() -> Self {
        Self(0)
    }
}

impl WorldTime {
    /// Constructs a `WorldTime` from raw minutes-since-epoch. Callers should
    /// normally go through [`WorldTime::parse`] or [`WorldTime::advance_turns`].
    pub fn from_minutes(minutes: i64) -> Self {
        Self(minutes)
    }

    /// Raw minutes-since-epoch.
    pub fn as_minutes(self) -> i64 {
        self.0
    }

    /// Advances by `n` turns (`n` may be negative for defensive callers, but
    /// the scheduler never calls this with a negative count).
    pub fn advance_turns(self, n: i64) -> Self {
        Self(self.0 + n * TURN_MINUTES)
    }

    /// Number of whole turns elapsed between `self` and an earlier `since`.
    /// Returns 0 if `self <= since`.
    pub fn turns_since(self, since: WorldTime) -> i64 {
        ((self.0 - since.0).max(0)) / TURN_MINUTES
    }

    /// The turn index since the Unix epoch. Used for `% HOUR_TURNS` /
    /// `% DAY_TURNS` cadence checks.
    pub fn turn_index(self) -> i64 {
        self.0 / TURN_MINUTES
    }

    /// True if this turn is the start of an hour tick.
    pub fn is_hour_boundary(self) -> bool {
        self.turn_index() % HOUR_TURNS == 0
    }

    /// True if this turn is the start of a day tick.
    pub fn is_day_boundary(self) -> bool {
        self.turn_index() % DAY_TURNS == 0
    }

    /// Adds whole minutes (used by the real-time scheduler to recompute world
    /// time from elapsed wall-clock time).
    pub fn plus_minutes(self, minutes: i64) -> Self {
        Self(self.0 + minutes)
    }

    fn to_civil(self) -> (i64, u32, u32, u32, u32) {
        let mins = self.0;
        let days = mins.div_euclid(24 * 60);
        let rem_minutes = mins.rem_euclid(24 * 60);
        let hour = (rem_minutes / 60) as u32;
        let minute = (rem_minutes % 60) as u32;
        let (y, m, d) = civil_from_days(days);
        (y, m, d, hour, minute)
    }

    fn from_civil(year: i64, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        let days = days_from_civil(year, month, day);
        Self(days * 24 * 60 + hour as i64 * 60 + minute as i64)
    }

    /// Parses an ISO-8601 UTC timestamp of the form `YYYY-MM-DDTHH:MM:SSZ`.
    /// Seconds are accepted but truncated, since world time has minute
    /// granularity.
    pub fn parse(s: &str) -> Result<Self, ParseWorldTimeError> {
        let s = s.trim();
        let bytes = s.as_bytes();
        if bytes.len() < 16 || bytes[4] != b'-' || bytes[7] != b'-' || bytes[10] != b'T' {
            return Err(ParseWorldTimeError(s.to_string()));
        }
        let year: i64 = s[0..4].parse().map_err(|_| ParseWorldTimeError(s.to_string()))?;
        let month: u32 = s[5..7].parse().map_err(|_| ParseWorldTimeError(s.to_string()))?;
        let day: u32 = s[8..10].parse().map_err(|_| ParseWorldTimeError(s.to_string()))?;
        let hour: u32 = s[11..13].parse().map_err(|_| ParseWorldTimeError(s.to_string()))?;
        let minute: u32 = s[14..16].parse().map_err(|_| ParseWorldTimeError(s.to_string()))?;
        if !(1..=12).contains(&month) || day == 0 || day > 31 || hour > 23 || minute > 59 {
            return Err(ParseWorldTimeError(s.to_string()));
        }
        Ok(Self::from_civil(year, month, day, hour, minute))
    }
}

impl fmt::Display for WorldTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (y, m, d, hh, mm) = self.to_civil();
        write!(f, "{:04}-{:02}-{:02}T{:02}:{:02}:00Z", y, m, d, hh, mm)
    }
}

impl FromStr for WorldTime {
    type Err = ParseWorldTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for WorldTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for WorldTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        WorldTime::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Error parsing a `WorldTime` from a string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseWorldTimeError(String);

impl fmt::Display for ParseWorldTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid ISO-8601 world time: '{}'", self.0)
    }
}

impl std::error::Error for ParseWorldTimeError {}

/// Howard Hinnant's `days_from_civil`: days since 1970-01-01 for a
/// proleptic-Gregorian civil date. Used instead of pulling in a calendar
/// crate since `spec.md` only needs whole-minute ISO-8601 round-tripping.
fn days_from_civil(y: i64, m: u32, d: u32) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as i64;
    let mp = (m as i64 + 9) % 12;
    let doy = (153 * mp + 2) / 5 + d as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe - 719468
}

/// Inverse of [`days_from_civil`].
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    (if m <= 2 { y + 1 } else { y }, m, d)
}

/// Season of the year, derived from a `WorldTime` for flavor purposes in the
/// calendar/weather subsystem. Purely cosmetic; does not affect scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Derives a season from the calendar month of a `WorldTime`.
    pub fn of(t: WorldTime) -> Self {
        let (_, m, _, _, _) = t.to_civil();
        match m {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_parse_and_display() {
        let s = "2024-03-05T14:20:00Z";
        let t = WorldTime::parse(s).unwrap();
        assert_eq!(t.to_string(), s);
    }

    #[test]
    fn advance_turns_crosses_hour_and_day() {
        let t = WorldTime::parse("2024-01-01T00:00:00Z").unwrap();
        let one_turn = t.advance_turns(1);
        assert_eq!(one_turn.to_string(), "2024-01-01T00:10:00Z");

        let one_hour = t.advance_turns(HOUR_TURNS);
        assert_eq!(one_hour.to_string(), "2024-01-01T01:00:00Z");

        let one_day = t.advance_turns(DAY_TURNS);
        assert_eq!(one_day.to_string(), "2024-01-02T00:00:00Z");
    }

    #[test]
    fn boundary_checks() {
        let t0 = WorldTime::parse("2024-01-01T00:00:00Z").unwrap();
        assert!(t0.is_hour_boundary());
        assert!(t0.is_day_boundary());

        let t1 = t0.advance_turns(1);
        assert!(!t1.is_hour_boundary());
        assert!(!t1.is_day_boundary());

        let t6 = t0.advance_turns(HOUR_TURNS);
        assert!(t6.is_hour_boundary());
        assert!(!t6.is_day_boundary());
    }

    #[test]
    fn turns_since_is_monotone_and_nonnegative() {
        let t0 = WorldTime::parse("2024-01-01T00:00:00Z").unwrap();
        let t1 = t0.advance_turns(10);
        assert_eq!(t1.turns_since(t0), 10);
        assert_eq!(t0.turns_since(t1), 0);
    }

    #[test]
    fn serde_roundtrip() {
        let t = WorldTime::parse("2024-12-31T23:50:00Z").unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"2024-12-31T23:50:00Z\"");
        let back: WorldTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(WorldTime::parse("not-a-date").is_err());
        assert!(WorldTime::parse("2024-13-01T00:00:00Z").is_err());
    }

    #[test]
    fn season_of_month() {
        assert_eq!(Season::of(WorldTime::parse("2024-04-01T00:00:00Z").unwrap()), Season::Spring);
        assert_eq!(Season::of(WorldTime::parse("2024-07-01T00:00:00Z").unwrap()), Season::Summer);
        assert_eq!(Season::of(WorldTime::parse("2024-10-01T00:00:00Z").unwrap()), Season::Autumn);
        assert_eq!(Season::of(WorldTime::parse("2024-01-01T00:00:00Z").unwrap()), Season::Winter);
    }
}
