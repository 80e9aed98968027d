use crate::state::{AppState, ReportTx};
use chrono::Local;
use park_ops::{CoasterReport, Monitor};
use park_store::StateStore;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Periodic fleet monitor. One logical thread of execution: ticks are
/// serialized through the interval and never overlap each other.
pub async fn run_monitor_loop(
    store: Arc<dyn StateStore>,
    latest_reports: Arc<RwLock<Vec<CoasterReport>>>,
    report_tx: ReportTx,
    period: Duration,
) {
    let monitor = Monitor::new(store);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let now = Local::now().naive_local();
        let reports = monitor.run_tick(now).await;
        *latest_reports.write() = reports.clone();
        // Receivers are optional; a closed channel just means no listeners.
        let _ = report_tx.send(reports);
    }
}

pub fn spawn(state: &AppState, period: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(run_monitor_loop(
        Arc::clone(&state.store),
        Arc::clone(&state.latest_reports),
        state.report_tx.clone(),
        period,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use park_core::test_fixtures::coaster_with;
    use park_core::CoasterId;
    use park_store::{register_coaster, MemoryStore};

    #[tokio::test]
    async fn loop_publishes_reports_on_each_tick() {
        let store = Arc::new(MemoryStore::new());
        register_coaster(
            store.as_ref(),
            &CoasterId("coaster_a".to_string()),
            &coaster_with(1, 200),
        )
        .await
        .unwrap();

        let state = AppState::new(store);
        let mut rx = state.report_tx.subscribe();
        let handle = spawn(&state, Duration::from_millis(10));

        let reports = rx.recv().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].needs_attention());
        assert_eq!(state.latest_reports.read().len(), 1);

        handle.abort();
    }
}
