//! Throughput math: seats per hour per wagon, aggregated per coaster.

use serde::Serialize;

use crate::types::{Coaster, Wagon};

/// Fixed loading/turnaround seconds per ride cycle, additive to travel time.
const TURNAROUND_SECONDS: f64 = 60.0;

/// Seats per hour one wagon can move on the given track:
/// `seat_count * (3600 / (track/speed + 60))`.
pub fn wagon_hourly_capacity(wagon: &Wagon, track_length_m: u32) -> f64 {
    let cycle_seconds = f64::from(track_length_m) / wagon.speed_mps + TURNAROUND_SECONDS;
    f64::from(wagon.seat_count) * (3600.0 / cycle_seconds)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityReport {
    pub hourly_capacity: f64,
    pub daily_capacity: f64,
    pub total_seats: u32,
    pub operating_hours: f64,
}

/// Sums per-wagon throughput and scales by the operating window. All zero
/// with no wagons.
pub fn aggregate_capacity(coaster: &Coaster, wagons: &[Wagon]) -> CapacityReport {
    let hourly_capacity: f64 = wagons
        .iter()
        .map(|wagon| wagon_hourly_capacity(wagon, coaster.track_length_m))
        .sum();
    let operating_hours = coaster.operating_window.duration_hours();

    CapacityReport {
        hourly_capacity,
        daily_capacity: hourly_capacity * operating_hours,
        total_seats: wagons.iter().map(|wagon| wagon.seat_count).sum(),
        operating_hours,
    }
}
