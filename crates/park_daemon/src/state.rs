use park_ops::CoasterReport;
use park_store::StateStore;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;

pub type ReportTx = broadcast::Sender<Vec<CoasterReport>>;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StateStore>,
    /// Snapshot of the most recent monitor tick, for `/api/reports`.
    pub latest_reports: Arc<RwLock<Vec<CoasterReport>>>,
    pub report_tx: ReportTx,
}

impl AppState {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        let (report_tx, _) = broadcast::channel(16);
        Self {
            store,
            latest_reports: Arc::new(RwLock::new(Vec::new())),
            report_tx,
        }
    }
}
