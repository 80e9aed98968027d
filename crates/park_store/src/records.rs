//! Typed record access on top of the raw key-value interface.
//!
//! Coaster and wagon records are JSON; ride markers are bare timestamp text
//! so they can double as compare-and-swap tokens.

use chrono::NaiveDateTime;
use park_core::{Coaster, CoasterId, RideRecord, Wagon, WagonId, RIDE_TS_FORMAT};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::{keys, StateStore, StoreError};

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

fn encode<T: serde::Serialize>(key: &str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Coasters
// ---------------------------------------------------------------------------

pub async fn coaster_ids(store: &dyn StateStore) -> Result<Vec<CoasterId>, StoreError> {
    Ok(store
        .set_members(keys::COASTER_INDEX)
        .await?
        .into_iter()
        .map(CoasterId)
        .collect())
}

/// Writes the coaster record and adds it to the discovery index.
pub async fn register_coaster(
    store: &dyn StateStore,
    id: &CoasterId,
    coaster: &Coaster,
) -> Result<(), StoreError> {
    save_coaster(store, id, coaster).await?;
    store.set_add(keys::COASTER_INDEX, &id.0).await
}

pub async fn save_coaster(
    store: &dyn StateStore,
    id: &CoasterId,
    coaster: &Coaster,
) -> Result<(), StoreError> {
    let key = keys::coaster(id);
    let json = encode(&key, coaster)?;
    store.set(&key, &json, None).await
}

pub async fn load_coaster(store: &dyn StateStore, id: &CoasterId) -> Result<Coaster, StoreError> {
    let key = keys::coaster(id);
    let raw = store
        .get(&key)
        .await?
        .ok_or_else(|| StoreError::Missing { key: key.clone() })?;
    decode(&key, &raw)
}

// ---------------------------------------------------------------------------
// Wagons
// ---------------------------------------------------------------------------

pub async fn wagon_ids(
    store: &dyn StateStore,
    coaster_id: &CoasterId,
) -> Result<Vec<WagonId>, StoreError> {
    Ok(store
        .set_members(&keys::wagon_set(coaster_id))
        .await?
        .into_iter()
        .map(WagonId)
        .collect())
}

/// Writes the wagon record and registers membership under its coaster.
pub async fn save_wagon(
    store: &dyn StateStore,
    coaster_id: &CoasterId,
    wagon_id: &WagonId,
    wagon: &Wagon,
) -> Result<(), StoreError> {
    let key = keys::wagon(coaster_id, wagon_id);
    let json = encode(&key, wagon)?;
    store.set(&key, &json, None).await?;
    store.set_add(&keys::wagon_set(coaster_id), &wagon_id.0).await
}

pub async fn load_wagon(
    store: &dyn StateStore,
    coaster_id: &CoasterId,
    wagon_id: &WagonId,
) -> Result<Wagon, StoreError> {
    let key = keys::wagon(coaster_id, wagon_id);
    let raw = store
        .get(&key)
        .await?
        .ok_or_else(|| StoreError::Missing { key: key.clone() })?;
    decode(&key, &raw)
}

/// Loads every wagon in the coaster's membership set. Members whose record
/// is missing or unreadable are logged and skipped rather than failing the
/// whole fleet.
pub async fn load_wagons(
    store: &dyn StateStore,
    coaster_id: &CoasterId,
) -> Result<Vec<(WagonId, Wagon)>, StoreError> {
    let mut wagons = Vec::new();
    for wagon_id in wagon_ids(store, coaster_id).await? {
        match load_wagon(store, coaster_id, &wagon_id).await {
            Ok(wagon) => wagons.push((wagon_id, wagon)),
            Err(err @ (StoreError::Missing { .. } | StoreError::Corrupt { .. })) => {
                warn!("skipping wagon {wagon_id} of {coaster_id}: {err}");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(wagons)
}

/// Removes the wagon from its coaster: membership, record, and ride marker.
pub async fn delete_wagon(
    store: &dyn StateStore,
    coaster_id: &CoasterId,
    wagon_id: &WagonId,
) -> Result<(), StoreError> {
    store
        .set_remove(&keys::wagon_set(coaster_id), &wagon_id.0)
        .await?;
    store.delete(&keys::wagon(coaster_id, wagon_id)).await?;
    store.delete(&keys::last_ride(coaster_id, wagon_id)).await
}

// ---------------------------------------------------------------------------
// Ride markers
// ---------------------------------------------------------------------------

/// A parsed ride marker together with the raw text it was read as. The raw
/// form is the compare-and-swap token for [`write_ride_marker_if`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RideMarker {
    pub record: RideRecord,
    pub raw: String,
}

pub async fn read_ride_marker(
    store: &dyn StateStore,
    coaster_id: &CoasterId,
    wagon_id: &WagonId,
) -> Result<Option<RideMarker>, StoreError> {
    let key = keys::last_ride(coaster_id, wagon_id);
    let Some(raw) = store.get(&key).await? else {
        return Ok(None);
    };
    let last_ride_end = NaiveDateTime::parse_from_str(&raw, RIDE_TS_FORMAT).map_err(|e| {
        StoreError::Corrupt {
            key,
            reason: e.to_string(),
        }
    })?;
    Ok(Some(RideMarker {
        record: RideRecord { last_ride_end },
        raw,
    }))
}

/// Writes a new ride-end marker only if the stored marker still matches the
/// one read earlier (`None` = no marker existed). Returns whether the write
/// landed.
pub async fn write_ride_marker_if(
    store: &dyn StateStore,
    coaster_id: &CoasterId,
    wagon_id: &WagonId,
    expected: Option<&RideMarker>,
    ride_end: NaiveDateTime,
) -> Result<bool, StoreError> {
    let key = keys::last_ride(coaster_id, wagon_id);
    let value = ride_end.format(RIDE_TS_FORMAT).to_string();
    store
        .set_if(&key, expected.map(|marker| marker.raw.as_str()), &value)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use park_core::test_fixtures::{at, standard_coaster, standard_wagon};

    fn cid(text: &str) -> CoasterId {
        CoasterId(text.to_string())
    }

    fn wid(text: &str) -> WagonId {
        WagonId(text.to_string())
    }

    #[tokio::test]
    async fn coaster_round_trip_is_field_for_field() {
        let store = MemoryStore::new();
        let id = cid("coaster_a");
        let coaster = standard_coaster();

        register_coaster(&store, &id, &coaster).await.unwrap();
        let loaded = load_coaster(&store, &id).await.unwrap();
        assert_eq!(loaded, coaster);
        assert_eq!(coaster_ids(&store).await.unwrap(), vec![id]);
    }

    #[tokio::test]
    async fn missing_coaster_is_a_missing_record() {
        let store = MemoryStore::new();
        let err = load_coaster(&store, &cid("coaster_x")).await.unwrap_err();
        assert!(matches!(err, StoreError::Missing { .. }));
    }

    #[tokio::test]
    async fn corrupt_coaster_is_reported_as_corrupt() {
        let store = MemoryStore::new();
        let id = cid("coaster_a");
        store
            .set(&keys::coaster(&id), "not json", None)
            .await
            .unwrap();
        let err = load_coaster(&store, &id).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn load_wagons_skips_dangling_members() {
        let store = MemoryStore::new();
        let id = cid("coaster_a");
        save_wagon(&store, &id, &wid("wagon_1"), &standard_wagon())
            .await
            .unwrap();
        // A member with no record behind it (deleted out of band).
        store
            .set_add(&keys::wagon_set(&id), "wagon_ghost")
            .await
            .unwrap();

        let wagons = load_wagons(&store, &id).await.unwrap();
        assert_eq!(wagons.len(), 1);
        assert_eq!(wagons[0].0, wid("wagon_1"));
    }

    #[tokio::test]
    async fn delete_wagon_removes_membership_record_and_marker() {
        let store = MemoryStore::new();
        let id = cid("coaster_a");
        let wagon_id = wid("wagon_1");
        save_wagon(&store, &id, &wagon_id, &standard_wagon())
            .await
            .unwrap();
        write_ride_marker_if(&store, &id, &wagon_id, None, at(10, 6, 57))
            .await
            .unwrap();

        delete_wagon(&store, &id, &wagon_id).await.unwrap();

        assert!(wagon_ids(&store, &id).await.unwrap().is_empty());
        assert!(load_wagon(&store, &id, &wagon_id).await.is_err());
        assert_eq!(read_ride_marker(&store, &id, &wagon_id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn ride_marker_round_trip_and_cas() {
        let store = MemoryStore::new();
        let id = cid("coaster_a");
        let wagon_id = wid("wagon_1");

        assert_eq!(read_ride_marker(&store, &id, &wagon_id).await.unwrap(), None);

        // First write expects no marker.
        assert!(write_ride_marker_if(&store, &id, &wagon_id, None, at(10, 6, 57))
            .await
            .unwrap());
        let marker = read_ride_marker(&store, &id, &wagon_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(marker.record.last_ride_end, at(10, 6, 57));
        assert_eq!(marker.raw, "2024-06-15 10:06:57");

        // A writer with a stale view (still expecting "absent") must lose.
        assert!(!write_ride_marker_if(&store, &id, &wagon_id, None, at(11, 0, 0))
            .await
            .unwrap());

        // A writer holding the current marker wins.
        assert!(
            write_ride_marker_if(&store, &id, &wagon_id, Some(&marker), at(11, 0, 0))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn unparsable_ride_marker_is_corrupt() {
        let store = MemoryStore::new();
        let id = cid("coaster_a");
        let wagon_id = wid("wagon_1");
        store
            .set(&keys::last_ride(&id, &wagon_id), "yesterday-ish", None)
            .await
            .unwrap();
        let err = read_ride_marker(&store, &id, &wagon_id).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }
}
