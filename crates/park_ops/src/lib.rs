//! `park_ops` — store-coupled operations over the pure domain core.
//!
//! Ride starts, fleet assessment, and the monitoring tick body. Every
//! component takes the shared store handle explicitly; "now" is always a
//! parameter.

mod fleet;
mod monitor;
mod rides;

pub use fleet::{CoasterReport, FleetAnalyzer, WagonReport};
pub use monitor::Monitor;
pub use rides::{RideError, RideScheduler};
