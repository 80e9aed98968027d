//! `park_core` — pure coaster-fleet domain math.
//!
//! No IO, no clocks. "Now" is always an explicit parameter.

mod capacity;
mod health;
mod schedule;
pub mod timewindow;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use capacity::{aggregate_capacity, wagon_hourly_capacity, CapacityReport};
pub use health::{diagnose, required_staff, Finding, FleetChange, MIN_WAGONS};
pub use schedule::{
    break_duration, check_can_start, evaluate_status, ride_duration, DenialReason, RideDecision,
    RideReceipt, WagonStatus, RIDE_TS_FORMAT,
};
pub use timewindow::{OperatingWindow, TimeOfDay};
pub use types::{Coaster, CoasterId, CoasterUpdate, InvalidInput, RideRecord, Wagon, WagonId};
