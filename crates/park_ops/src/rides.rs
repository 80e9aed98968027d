//! Ride starts against the shared store.
//!
//! The pure check runs on a snapshot of the ride marker; the marker write is
//! conditional on that snapshot still being current, so two callers racing
//! on the same wagon cannot both start a ride.

use std::sync::Arc;

use chrono::NaiveDateTime;
use park_core::{
    check_can_start, evaluate_status, CoasterId, DenialReason, RideDecision, RideReceipt,
    WagonId, WagonStatus,
};
use park_store::{
    keys, load_coaster, load_wagon, read_ride_marker, write_ride_marker_if, StateStore,
    StoreError,
};

/// Bound on compare-and-swap rounds. A lost round means another caller just
/// started a ride, so the re-check denies on the next pass; more than a few
/// rounds only happens if the store is misbehaving.
const CAS_ATTEMPTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum RideError {
    /// Expected business outcome, not an infrastructure failure.
    #[error("ride start denied: {0}")]
    Denied(DenialReason),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct RideScheduler {
    store: Arc<dyn StateStore>,
}

impl RideScheduler {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Derived status for one wagon. Fails on store trouble rather than
    /// guessing; callers decide whether "unknown" is acceptable.
    pub async fn wagon_status(
        &self,
        coaster_id: &CoasterId,
        wagon_id: &WagonId,
        now: NaiveDateTime,
    ) -> Result<WagonStatus, StoreError> {
        let member = self
            .store
            .set_is_member(&keys::wagon_set(coaster_id), &wagon_id.0)
            .await?;
        if !member {
            return Err(StoreError::Missing {
                key: keys::wagon(coaster_id, wagon_id),
            });
        }
        let marker = read_ride_marker(self.store.as_ref(), coaster_id, wagon_id).await?;
        Ok(evaluate_status(
            marker.as_ref().map(|m| &m.record),
            now,
        ))
    }

    /// Whether a ride could start right now, without starting one.
    pub async fn check_can_start(
        &self,
        coaster_id: &CoasterId,
        wagon_id: &WagonId,
        now: NaiveDateTime,
    ) -> Result<RideDecision, StoreError> {
        let coaster = load_coaster(self.store.as_ref(), coaster_id).await?;
        let wagon = load_wagon(self.store.as_ref(), coaster_id, wagon_id).await?;
        let marker = read_ride_marker(self.store.as_ref(), coaster_id, wagon_id).await?;
        Ok(check_can_start(
            &coaster,
            &wagon,
            marker.as_ref().map(|m| &m.record),
            now,
        ))
    }

    /// Starts a ride: re-checks availability, then persists the new ride-end
    /// marker conditionally on the marker observed at check time. A lost
    /// race is re-checked against the fresh marker, which denies with
    /// `WagonResting`.
    pub async fn start_ride(
        &self,
        coaster_id: &CoasterId,
        wagon_id: &WagonId,
        now: NaiveDateTime,
    ) -> Result<RideReceipt, RideError> {
        let store = self.store.as_ref();
        let coaster = load_coaster(store, coaster_id).await?;
        let wagon = load_wagon(store, coaster_id, wagon_id).await?;

        for _ in 0..CAS_ATTEMPTS {
            let marker = read_ride_marker(store, coaster_id, wagon_id).await?;
            match check_can_start(&coaster, &wagon, marker.as_ref().map(|m| &m.record), now) {
                RideDecision::Denied(reason) => return Err(RideError::Denied(reason)),
                RideDecision::Allowed { .. } => {}
            }

            let receipt = RideReceipt::issue(&coaster, &wagon, now);
            if write_ride_marker_if(store, coaster_id, wagon_id, marker.as_ref(), receipt.end)
                .await?
            {
                return Ok(receipt);
            }
        }

        Err(RideError::Store(StoreError::Unavailable(format!(
            "ride marker contention on {}",
            keys::last_ride(coaster_id, wagon_id)
        ))))
    }
}
