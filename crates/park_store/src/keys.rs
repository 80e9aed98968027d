//! Key schema for the shared store.
//!
//! All coaster data hangs off a `coaster:{id}` prefix; the `coasters` index
//! set replaces prefix scans for discovery, so enumeration cost does not grow
//! with unrelated keys in the same store.

use park_core::{CoasterId, WagonId};

/// Index set of all registered coaster ids.
pub const COASTER_INDEX: &str = "coasters";

pub fn coaster(id: &CoasterId) -> String {
    format!("coaster:{id}")
}

/// Membership set of wagon ids owned by one coaster.
pub fn wagon_set(id: &CoasterId) -> String {
    format!("coaster:{id}:wagons")
}

pub fn wagon(coaster_id: &CoasterId, wagon_id: &WagonId) -> String {
    format!("coaster:{coaster_id}:wagons:{wagon_id}")
}

/// Ride-end marker for one wagon.
pub fn last_ride(coaster_id: &CoasterId, wagon_id: &WagonId) -> String {
    format!("coaster:{coaster_id}:wagons:{wagon_id}:last_ride")
}
