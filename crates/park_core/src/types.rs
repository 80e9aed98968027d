//! Domain records and ID newtypes.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::timewindow::{OperatingWindow, TimeOfDay};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(CoasterId);
string_id!(WagonId);

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

/// Rejected caller input. Surfaced synchronously, never retried, never an
/// incident.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInput {
    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },
    #[error("invalid time of day {text:?}, expected HH:MM")]
    BadTimeOfDay { text: String },
    #[error("operating window must end after it starts")]
    WindowOrder,
}

fn positive_int(value: u32, field: &'static str) -> Result<u32, InvalidInput> {
    if value == 0 {
        return Err(InvalidInput::NonPositive { field });
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// Coaster
// ---------------------------------------------------------------------------

/// A ride installation. Everything except `track_length_m` is mutable after
/// registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coaster {
    pub staff_count: u32,
    pub daily_customer_target: u32,
    pub track_length_m: u32,
    pub operating_window: OperatingWindow,
}

impl Coaster {
    pub fn new(
        staff_count: u32,
        daily_customer_target: u32,
        track_length_m: u32,
        operating_start: TimeOfDay,
        operating_end: TimeOfDay,
    ) -> Result<Self, InvalidInput> {
        Ok(Self {
            staff_count: positive_int(staff_count, "staff_count")?,
            daily_customer_target: positive_int(daily_customer_target, "daily_customer_target")?,
            track_length_m: positive_int(track_length_m, "track_length_m")?,
            operating_window: OperatingWindow::new(operating_start, operating_end)?,
        })
    }

    /// Applies a partial update. `CoasterUpdate` carries no track-length
    /// field, so the track cannot change after registration. Validates the
    /// whole update before mutating anything.
    pub fn apply_update(&mut self, update: CoasterUpdate) -> Result<(), InvalidInput> {
        let staff_count = match update.staff_count {
            Some(staff) => positive_int(staff, "staff_count")?,
            None => self.staff_count,
        };
        let daily_customer_target = match update.daily_customer_target {
            Some(target) => positive_int(target, "daily_customer_target")?,
            None => self.daily_customer_target,
        };
        let start = update.operating_start.unwrap_or(self.operating_window.start);
        let end = update.operating_end.unwrap_or(self.operating_window.end);
        let operating_window = OperatingWindow::new(start, end)?;

        self.staff_count = staff_count;
        self.daily_customer_target = daily_customer_target;
        self.operating_window = operating_window;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoasterUpdate {
    pub staff_count: Option<u32>,
    pub daily_customer_target: Option<u32>,
    pub operating_start: Option<TimeOfDay>,
    pub operating_end: Option<TimeOfDay>,
}

// ---------------------------------------------------------------------------
// Wagon
// ---------------------------------------------------------------------------

/// A ride vehicle, owned by exactly one coaster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wagon {
    pub seat_count: u32,
    pub speed_mps: f64,
}

impl Wagon {
    pub fn new(seat_count: u32, speed_mps: f64) -> Result<Self, InvalidInput> {
        if speed_mps <= 0.0 || !speed_mps.is_finite() {
            return Err(InvalidInput::NonPositive { field: "speed_mps" });
        }
        Ok(Self {
            seat_count: positive_int(seat_count, "seat_count")?,
            speed_mps,
        })
    }
}

// ---------------------------------------------------------------------------
// Ride record
// ---------------------------------------------------------------------------

/// Marker left behind by the most recent ride start. Wagon status is always
/// derived from this timestamp and "now", never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideRecord {
    pub last_ride_end: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{tod, window};

    #[test]
    fn coaster_rejects_non_positive_fields() {
        let err = Coaster::new(0, 100, 500, tod(9, 0), tod(18, 0)).unwrap_err();
        assert_eq!(
            err,
            InvalidInput::NonPositive {
                field: "staff_count"
            }
        );

        assert!(Coaster::new(4, 0, 500, tod(9, 0), tod(18, 0)).is_err());
        assert!(Coaster::new(4, 100, 0, tod(9, 0), tod(18, 0)).is_err());
    }

    #[test]
    fn coaster_rejects_inverted_window() {
        let err = Coaster::new(4, 100, 500, tod(18, 0), tod(9, 0)).unwrap_err();
        assert_eq!(err, InvalidInput::WindowOrder);
    }

    #[test]
    fn wagon_rejects_non_positive_speed() {
        assert!(Wagon::new(32, 0.0).is_err());
        assert!(Wagon::new(32, -1.0).is_err());
        assert!(Wagon::new(32, f64::NAN).is_err());
        assert!(Wagon::new(0, 1.2).is_err());
    }

    #[test]
    fn update_cannot_touch_track_length() {
        let mut coaster = Coaster::new(4, 100, 500, tod(9, 0), tod(18, 0)).unwrap();
        coaster
            .apply_update(CoasterUpdate {
                staff_count: Some(7),
                daily_customer_target: Some(300),
                operating_start: Some(tod(8, 0)),
                operating_end: Some(tod(20, 0)),
            })
            .unwrap();
        assert_eq!(coaster.staff_count, 7);
        assert_eq!(coaster.daily_customer_target, 300);
        assert_eq!(coaster.track_length_m, 500);
        assert_eq!(coaster.operating_window, window(8, 0, 20, 0));
    }

    #[test]
    fn update_validates_combined_window() {
        let mut coaster = Coaster::new(4, 100, 500, tod(9, 0), tod(18, 0)).unwrap();
        // Moving only the start past the existing end must fail.
        let err = coaster
            .apply_update(CoasterUpdate {
                operating_start: Some(tod(19, 0)),
                ..CoasterUpdate::default()
            })
            .unwrap_err();
        assert_eq!(err, InvalidInput::WindowOrder);
        // The failed update must not leave the record half-applied.
        assert_eq!(coaster.operating_window, window(9, 0, 18, 0));
    }

    #[test]
    fn coaster_json_round_trip() {
        let coaster = Coaster::new(4, 100, 500, tod(9, 0), tod(18, 0)).unwrap();
        let json = serde_json::to_string(&coaster).unwrap();
        let back: Coaster = serde_json::from_str(&json).unwrap();
        assert_eq!(back, coaster);
    }
}
