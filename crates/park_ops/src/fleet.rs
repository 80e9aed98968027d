//! Fleet health assessment for one coaster: capacity, staffing, findings,
//! and per-wagon status, assembled into a report.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use park_core::{
    aggregate_capacity, diagnose, evaluate_status, required_staff, CapacityReport, Coaster,
    CoasterId, Finding, Wagon, WagonId, WagonStatus,
};
use park_store::{load_coaster, load_wagons, read_ride_marker, StateStore, StoreError};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
pub struct WagonReport {
    pub wagon_id: WagonId,
    pub seat_count: u32,
    pub speed_mps: f64,
    /// `None` when the ride marker could not be read: unknown, not ready.
    pub status: Option<WagonStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoasterReport {
    pub coaster_id: CoasterId,
    pub staff_count: u32,
    pub required_staff: u32,
    pub daily_customer_target: u32,
    pub track_length_m: u32,
    pub operating_start: park_core::TimeOfDay,
    pub operating_end: park_core::TimeOfDay,
    pub capacity: CapacityReport,
    pub findings: Vec<Finding>,
    pub wagons: Vec<WagonReport>,
}

impl CoasterReport {
    /// Whether the monitor should raise this report at warning level.
    pub fn needs_attention(&self) -> bool {
        !self.findings.is_empty() || self.wagons.is_empty()
    }

    pub fn finding_summary(&self) -> String {
        self.findings
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for CoasterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "coaster {}", self.coaster_id)?;
        writeln!(f, "{}", "-".repeat(40))?;
        writeln!(
            f,
            "1. staff: {} present, {} required (1 base + {} wagon crew)",
            self.staff_count,
            self.required_staff,
            self.required_staff - 1
        )?;
        writeln!(
            f,
            "2. customers: {} planned daily, {} serviceable daily ({}/h)",
            self.daily_customer_target,
            self.capacity.daily_capacity.ceil() as u64,
            self.capacity.hourly_capacity.ceil() as u64
        )?;
        writeln!(f, "3. track length: {} m", self.track_length_m)?;
        writeln!(
            f,
            "4. operating hours: {} - {}",
            self.operating_start, self.operating_end
        )?;
        writeln!(f, "5. wagons:")?;
        if self.wagons.is_empty() {
            writeln!(f, "   - none attached!")?;
        }
        for wagon in &self.wagons {
            let status = wagon
                .status
                .as_ref()
                .map_or_else(|| "status unknown".to_string(), ToString::to_string);
            writeln!(
                f,
                "   - {}: {} seats, {:.1} m/s, {status}",
                wagon.wagon_id, wagon.seat_count, wagon.speed_mps
            )?;
        }
        if self.findings.is_empty() {
            writeln!(f, "6. status: OK")
        } else {
            writeln!(f, "6. status: {}", self.finding_summary())
        }
    }
}

pub struct FleetAnalyzer {
    store: Arc<dyn StateStore>,
}

impl FleetAnalyzer {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    pub async fn capacity_report(
        &self,
        coaster_id: &CoasterId,
    ) -> Result<CapacityReport, StoreError> {
        let coaster = load_coaster(self.store.as_ref(), coaster_id).await?;
        let wagons = self.wagon_records(coaster_id).await?;
        Ok(aggregate_capacity(&coaster, &wagons))
    }

    pub async fn diagnose(&self, coaster_id: &CoasterId) -> Result<Vec<Finding>, StoreError> {
        let coaster = load_coaster(self.store.as_ref(), coaster_id).await?;
        let wagons = self.wagon_records(coaster_id).await?;
        Ok(park_core::diagnose(&coaster, &wagons))
    }

    /// Full assessment: findings plus per-wagon derived status. A wagon whose
    /// ride marker cannot be read gets an unknown status instead of failing
    /// the whole report.
    pub async fn assess(
        &self,
        coaster_id: &CoasterId,
        now: NaiveDateTime,
    ) -> Result<CoasterReport, StoreError> {
        let store = self.store.as_ref();
        let coaster = load_coaster(store, coaster_id).await?;
        let owned = load_wagons(store, coaster_id).await?;
        let wagons: Vec<Wagon> = owned.iter().map(|(_, wagon)| wagon.clone()).collect();

        let mut wagon_reports = Vec::with_capacity(owned.len());
        for (wagon_id, wagon) in &owned {
            let status = match read_ride_marker(store, coaster_id, wagon_id).await {
                Ok(marker) => Some(evaluate_status(marker.as_ref().map(|m| &m.record), now)),
                Err(err) => {
                    warn!("ride marker unreadable for {coaster_id}/{wagon_id}: {err}");
                    None
                }
            };
            wagon_reports.push(WagonReport {
                wagon_id: wagon_id.clone(),
                seat_count: wagon.seat_count,
                speed_mps: wagon.speed_mps,
                status,
            });
        }

        Ok(build_report(coaster_id, &coaster, &wagons, wagon_reports))
    }

    async fn wagon_records(&self, coaster_id: &CoasterId) -> Result<Vec<Wagon>, StoreError> {
        Ok(load_wagons(self.store.as_ref(), coaster_id)
            .await?
            .into_iter()
            .map(|(_, wagon)| wagon)
            .collect())
    }
}

fn build_report(
    coaster_id: &CoasterId,
    coaster: &Coaster,
    wagons: &[Wagon],
    wagon_reports: Vec<WagonReport>,
) -> CoasterReport {
    CoasterReport {
        coaster_id: coaster_id.clone(),
        staff_count: coaster.staff_count,
        required_staff: required_staff(wagons.len()),
        daily_customer_target: coaster.daily_customer_target,
        track_length_m: coaster.track_length_m,
        operating_start: coaster.operating_window.start,
        operating_end: coaster.operating_window.end,
        capacity: aggregate_capacity(coaster, wagons),
        findings: diagnose(coaster, wagons),
        wagons: wagon_reports,
    }
}
