//! Shared fixtures for unit and integration tests.
//!
//! Gated behind the `test-support` feature so dependent crates can reuse
//! them without shipping test data in release builds.

use chrono::{NaiveDate, NaiveDateTime};

use crate::timewindow::{OperatingWindow, TimeOfDay};
use crate::types::{Coaster, Wagon};

pub fn tod(hour: u32, minute: u32) -> TimeOfDay {
    TimeOfDay::new(hour, minute).expect("fixture time of day")
}

pub fn window(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> OperatingWindow {
    OperatingWindow::new(tod(start_h, start_m), tod(end_h, end_m)).expect("fixture window")
}

/// A timestamp on a fixed calendar day, so tests never depend on wall time.
pub fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .expect("fixture date")
        .and_hms_opt(hour, minute, second)
        .expect("fixture time")
}

/// 500 m track, open 09:00-18:00, the dimensions most scenarios use.
pub fn standard_coaster() -> Coaster {
    coaster_with(4, 5000)
}

pub fn coaster_with(staff_count: u32, daily_customer_target: u32) -> Coaster {
    Coaster::new(staff_count, daily_customer_target, 500, tod(9, 0), tod(18, 0))
        .expect("fixture coaster")
}

/// 32 seats at 1.2 m/s.
pub fn standard_wagon() -> Wagon {
    Wagon::new(32, 1.2).expect("fixture wagon")
}
