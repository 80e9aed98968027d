//! Ride availability state machine: Ready → InRide → OnBreak → Ready.
//!
//! Transitions are driven purely by elapsed time; the only explicit event is
//! a ride start. Status is always derived from the last ride-end marker and
//! "now", never stored.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::timewindow::TimeOfDay;
use crate::types::{Coaster, RideRecord, Wagon};

/// Mandatory rest after a ride before the same wagon may start another.
const BREAK_MINUTES: i64 = 5;

/// Persisted form of ride-end markers.
pub const RIDE_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn break_duration() -> Duration {
    Duration::minutes(BREAK_MINUTES)
}

/// Travel time for one circuit: track length over wagon speed, rounded to
/// whole seconds (markers persist at second precision).
pub fn ride_duration(coaster: &Coaster, wagon: &Wagon) -> Duration {
    let seconds = f64::from(coaster.track_length_m) / wagon.speed_mps;
    Duration::seconds(seconds.round() as i64)
}

// ---------------------------------------------------------------------------
// Derived status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WagonStatus {
    Ready,
    InRide { ends_at: NaiveDateTime },
    OnBreak { available_at: NaiveDateTime },
}

impl std::fmt::Display for WagonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::InRide { ends_at } => {
                write!(f, "in ride until {}", ends_at.format("%H:%M:%S"))
            }
            Self::OnBreak { available_at } => {
                write!(f, "on break until {}", available_at.format("%H:%M:%S"))
            }
        }
    }
}

/// Pure status derivation. Exactly one variant holds for a given
/// (record, now) pair.
pub fn evaluate_status(record: Option<&RideRecord>, now: NaiveDateTime) -> WagonStatus {
    let Some(record) = record else {
        return WagonStatus::Ready;
    };
    if now < record.last_ride_end {
        return WagonStatus::InRide {
            ends_at: record.last_ride_end,
        };
    }
    let available_at = record.last_ride_end + break_duration();
    if now < available_at {
        return WagonStatus::OnBreak { available_at };
    }
    WagonStatus::Ready
}

// ---------------------------------------------------------------------------
// Ride-start decision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenialReason {
    #[error("coaster is not operating at this time")]
    OutsideOperatingHours,
    #[error("ride would not finish before closing time {closes_at}")]
    WouldExceedClosingTime { closes_at: TimeOfDay },
    #[error("wagon is resting until {available_at}")]
    WagonResting { available_at: NaiveDateTime },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RideDecision {
    Allowed { estimated_end: NaiveDateTime },
    Denied(DenialReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RideReceipt {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub next_available: NaiveDateTime,
}

impl RideReceipt {
    pub fn issue(coaster: &Coaster, wagon: &Wagon, now: NaiveDateTime) -> Self {
        let end = now + ride_duration(coaster, wagon);
        Self {
            start: now,
            end,
            next_available: end + break_duration(),
        }
    }
}

/// Whether `wagon` may start a ride at `now`. Denial reasons are checked in
/// a fixed priority order: operating hours, closing time, then rest.
pub fn check_can_start(
    coaster: &Coaster,
    wagon: &Wagon,
    record: Option<&RideRecord>,
    now: NaiveDateTime,
) -> RideDecision {
    let window = &coaster.operating_window;
    if !window.contains_time(now.time()) {
        return RideDecision::Denied(DenialReason::OutsideOperatingHours);
    }

    let end = now + ride_duration(coaster, wagon);
    // A ride that rolls past midnight has necessarily passed the window end.
    if end.date() != now.date() || end.time() > window.end.as_naive_time() {
        return RideDecision::Denied(DenialReason::WouldExceedClosingTime {
            closes_at: window.end,
        });
    }

    if let Some(record) = record {
        let available_at = record.last_ride_end + break_duration();
        if now < available_at {
            return RideDecision::Denied(DenialReason::WagonResting { available_at });
        }
    }

    RideDecision::Allowed { estimated_end: end }
}
