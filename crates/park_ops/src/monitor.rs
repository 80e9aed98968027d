//! Periodic fleet sweep: the body of one monitoring tick.
//!
//! The tick reads advisory snapshots only: it never takes locks against the
//! ride-start path, and one coaster's bad data never stops the sweep.

use std::sync::Arc;

use chrono::NaiveDateTime;
use park_store::{coaster_ids, StateStore};
use tracing::warn;

use crate::fleet::{CoasterReport, FleetAnalyzer};

pub struct Monitor {
    store: Arc<dyn StateStore>,
    analyzer: FleetAnalyzer,
}

impl Monitor {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        let analyzer = FleetAnalyzer::new(Arc::clone(&store));
        Self { store, analyzer }
    }

    /// One sweep over every registered coaster. Infrastructure errors are
    /// logged and skip only the affected coaster; the tick itself never
    /// fails.
    pub async fn run_tick(&self, now: NaiveDateTime) -> Vec<CoasterReport> {
        let ids = match coaster_ids(self.store.as_ref()).await {
            Ok(ids) => ids,
            Err(err) => {
                warn!("coaster enumeration failed, skipping tick: {err}");
                return Vec::new();
            }
        };

        let mut reports = Vec::with_capacity(ids.len());
        for id in ids {
            match self.analyzer.assess(&id, now).await {
                Ok(report) => {
                    if report.needs_attention() {
                        if report.wagons.is_empty() {
                            warn!("coaster {id} has no wagons attached");
                        }
                        if !report.findings.is_empty() {
                            warn!("coaster {id}: {}", report.finding_summary());
                        }
                    }
                    reports.push(report);
                }
                Err(err) => {
                    warn!("skipping coaster {id} this tick: {err}");
                }
            }
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use park_core::test_fixtures::{at, coaster_with, standard_wagon};
    use park_core::{CoasterId, WagonId};
    use park_store::{keys, register_coaster, save_wagon, MemoryStore};

    async fn seed_coaster(
        store: &dyn StateStore,
        id: &str,
        staff: u32,
        target: u32,
        wagon_count: usize,
    ) {
        let coaster_id = CoasterId(id.to_string());
        register_coaster(store, &coaster_id, &coaster_with(staff, target))
            .await
            .unwrap();
        for i in 0..wagon_count {
            save_wagon(
                store,
                &coaster_id,
                &WagonId(format!("wagon_{i}")),
                &standard_wagon(),
            )
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn tick_covers_all_registered_coasters() {
        let store = Arc::new(MemoryStore::new());
        seed_coaster(store.as_ref(), "coaster_a", 7, 5000, 3).await;
        seed_coaster(store.as_ref(), "coaster_b", 1, 200, 0).await;

        let monitor = Monitor::new(store);
        let reports = monitor.run_tick(at(12, 0, 0)).await;

        assert_eq!(reports.len(), 2);
        // Index order is sorted, so coaster_a comes first.
        assert!(!reports[0].needs_attention());
        assert!(reports[1].needs_attention());
    }

    #[tokio::test]
    async fn corrupt_coaster_is_isolated_from_the_tick() {
        let store = Arc::new(MemoryStore::new());
        seed_coaster(store.as_ref(), "coaster_a", 7, 5000, 3).await;

        // A registered coaster whose record is unreadable.
        let bad = CoasterId("coaster_bad".to_string());
        store.set_add(keys::COASTER_INDEX, &bad.0).await.unwrap();
        store
            .set(&keys::coaster(&bad), "{malformed", None)
            .await
            .unwrap();

        let monitor = Monitor::new(store);
        let reports = monitor.run_tick(at(12, 0, 0)).await;

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].coaster_id, CoasterId("coaster_a".to_string()));
    }

    #[tokio::test]
    async fn empty_store_yields_empty_tick() {
        let monitor = Monitor::new(Arc::new(MemoryStore::new()));
        assert!(monitor.run_tick(at(12, 0, 0)).await.is_empty());
    }
}
