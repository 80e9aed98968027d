//! Time-of-day values and daily operating windows.
//!
//! Comparisons are chronological on minutes since midnight, never on the
//! textual `"HH:MM"` form.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::InvalidInput;

/// Minutes since midnight, totally ordered. Parses and prints as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Result<Self, InvalidInput> {
        if hour > 23 || minute > 59 {
            return Err(InvalidInput::BadTimeOfDay {
                text: format!("{hour:02}:{minute:02}"),
            });
        }
        Ok(Self((hour * 60 + minute) as u16))
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0) / 60
    }

    pub fn minute(self) -> u32 {
        u32::from(self.0) % 60
    }

    pub fn minutes_since_midnight(self) -> u32 {
        u32::from(self.0)
    }

    /// The same instant as a `chrono` clock time (seconds zero), for
    /// comparing against timestamp components.
    pub fn as_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0)
            .unwrap_or(NaiveTime::MIN)
    }

    /// Truncates a clock time to whole minutes.
    pub fn from_naive_time(t: NaiveTime) -> Self {
        Self((t.hour() * 60 + t.minute()) as u16)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = InvalidInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || InvalidInput::BadTimeOfDay {
            text: s.to_string(),
        };
        let (h, m) = s.split_once(':').ok_or_else(bad)?;
        // `u32::from_str` accepts a leading `+`; a time of day does not.
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(h) || !all_digits(m) {
            return Err(bad());
        }
        let hour: u32 = h.parse().map_err(|_| bad())?;
        let minute: u32 = m.parse().map_err(|_| bad())?;
        Self::new(hour, minute).map_err(|_| bad())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Daily open/close bounds. Invariant: `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl OperatingWindow {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, InvalidInput> {
        if end <= start {
            return Err(InvalidInput::WindowOrder);
        }
        Ok(Self { start, end })
    }

    /// Inclusive on both bounds.
    pub fn contains(&self, t: TimeOfDay) -> bool {
        self.start <= t && t <= self.end
    }

    /// Window membership for a full clock time, at seconds precision.
    pub fn contains_time(&self, t: NaiveTime) -> bool {
        self.start.as_naive_time() <= t && t <= self.end.as_naive_time()
    }

    pub fn duration_hours(&self) -> f64 {
        f64::from(self.end.minutes_since_midnight() - self.start.minutes_since_midnight()) / 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tod(text: &str) -> TimeOfDay {
        text.parse().unwrap()
    }

    #[test]
    fn parses_and_prints_hh_mm() {
        let t = tod("09:30");
        assert_eq!(t.hour(), 9);
        assert_eq!(t.minute(), 30);
        assert_eq!(t.to_string(), "09:30");
    }

    #[test]
    fn parses_non_padded_text_by_value() {
        // "9:5" is non-canonical but unambiguous; ordering must stay
        // chronological regardless of padding.
        assert_eq!(tod("9:5"), tod("09:05"));
        assert!(tod("9:30") < tod("10:00"));
        assert!(tod("19:30") > tod("2:00"));
    }

    #[test]
    fn rejects_malformed_text() {
        for text in ["", "9", "24:00", "12:60", "ab:cd", "12:", ":30", "+9:30", "09:30:00"] {
            assert!(text.parse::<TimeOfDay>().is_err(), "accepted {text:?}");
        }
    }

    #[test]
    fn window_requires_end_after_start() {
        assert!(OperatingWindow::new(tod("09:00"), tod("09:00")).is_err());
        assert!(OperatingWindow::new(tod("18:00"), tod("09:00")).is_err());
        assert!(OperatingWindow::new(tod("09:00"), tod("18:00")).is_ok());
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let w = OperatingWindow::new(tod("09:00"), tod("18:00")).unwrap();
        assert!(w.contains(tod("09:00")));
        assert!(w.contains(tod("18:00")));
        assert!(w.contains(tod("12:34")));
        assert!(!w.contains(tod("08:59")));
        assert!(!w.contains(tod("18:01")));
    }

    #[test]
    fn duration_is_fractional_hours() {
        let w = OperatingWindow::new(tod("09:00"), tod("18:00")).unwrap();
        assert!((w.duration_hours() - 9.0).abs() < 1e-9);

        let w = OperatingWindow::new(tod("09:15"), tod("17:45")).unwrap();
        assert!((w.duration_hours() - 8.5).abs() < 1e-9);
    }

    #[test]
    fn serde_round_trips_as_string() {
        let w = OperatingWindow::new(tod("08:05"), tod("21:40")).unwrap();
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, r#"{"start":"08:05","end":"21:40"}"#);
        let back: OperatingWindow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, w);
    }
}
