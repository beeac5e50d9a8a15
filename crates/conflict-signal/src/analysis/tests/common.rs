use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::analysis::domain::{
    IncidentId, IncidentRecord, IncidentRow, IncidentStatus, RiskIndicatorRecord, Severity,
    VerificationStatus,
};
use crate::analysis::escalation::EscalationPrediction;
use crate::analysis::peace::PeaceOpportunity;
use crate::analysis::repository::{
    AnalysisArchive, IncidentRepository, PatternSnapshot, RiskIndicatorRepository, StorageError,
};
use crate::analysis::{analysis_router, ConflictAnalysisService};
use crate::config::AnalysisConfig;

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 15, 12, 0, 0).unwrap()
}

pub(super) fn incident(
    id: &str,
    region: &str,
    severity: Severity,
    category: &str,
    days_ago: i64,
) -> IncidentRecord {
    IncidentRecord {
        id: IncidentId(id.to_string()),
        title: format!("Incident {id}"),
        description: "Reported by field monitor".to_string(),
        location: "Local government area".to_string(),
        region: region.to_string(),
        state: None,
        category: category.to_string(),
        severity,
        status: IncidentStatus::Active,
        verification_status: VerificationStatus::Verified,
        reported_at: now() - Duration::days(days_ago),
        impacted_population: None,
        resolved_at: None,
    }
}

pub(super) fn indicator(name: &str, region: &str, value: f64) -> RiskIndicatorRecord {
    RiskIndicatorRecord {
        id: format!("ind-{name}-{region}"),
        name: name.to_string(),
        region: region.to_string(),
        value,
        timestamp: now() - Duration::hours(6),
    }
}

/// low -> high -> critical on consecutive days in one region.
pub(super) fn escalating_sequence() -> Vec<IncidentRecord> {
    vec![
        incident("esc-1", "North West", Severity::Low, "banditry", 3),
        incident("esc-2", "North West", Severity::High, "banditry", 2),
        incident("esc-3", "North West", Severity::Critical, "banditry", 1),
    ]
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) incidents: Arc<Mutex<Vec<IncidentRow>>>,
    pub(super) indicators: Arc<Mutex<Vec<RiskIndicatorRecord>>>,
}

impl MemoryStore {
    pub(super) fn with_incidents(records: &[IncidentRecord]) -> Self {
        let store = Self::default();
        store
            .incidents
            .lock()
            .expect("store mutex poisoned")
            .extend(records.iter().map(IncidentRow::from));
        store
    }

    pub(super) fn push_row(&self, row: IncidentRow) {
        self.incidents
            .lock()
            .expect("store mutex poisoned")
            .push(row);
    }

    pub(super) fn push_indicator(&self, reading: RiskIndicatorRecord) {
        self.indicators
            .lock()
            .expect("store mutex poisoned")
            .push(reading);
    }
}

impl IncidentRepository for MemoryStore {
    fn fetch(&self, id: &IncidentId) -> Result<Option<IncidentRow>, StorageError> {
        let guard = self.incidents.lock().expect("store mutex poisoned");
        Ok(guard
            .iter()
            .find(|row| row.id.as_deref() == Some(id.0.as_str()))
            .cloned())
    }

    fn list(&self, since: Option<DateTime<Utc>>) -> Result<Vec<IncidentRow>, StorageError> {
        let guard = self.incidents.lock().expect("store mutex poisoned");
        Ok(guard
            .iter()
            .filter(|row| match (since, row.reported_at) {
                (None, _) => true,
                (Some(since), Some(at)) => at >= since,
                (Some(_), None) => false,
            })
            .cloned()
            .collect())
    }
}

impl RiskIndicatorRepository for MemoryStore {
    fn top_for_region(
        &self,
        region: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RiskIndicatorRecord>, StorageError> {
        let guard = self.indicators.lock().expect("store mutex poisoned");
        let mut readings: Vec<RiskIndicatorRecord> = guard
            .iter()
            .filter(|reading| region.map_or(true, |region| reading.region == region))
            .cloned()
            .collect();
        readings.sort_by(|a, b| b.value.total_cmp(&a.value));
        readings.truncate(limit);
        Ok(readings)
    }

    fn all(&self) -> Result<Vec<RiskIndicatorRecord>, StorageError> {
        Ok(self.indicators.lock().expect("store mutex poisoned").clone())
    }
}

pub(super) struct UnavailableStore;

impl IncidentRepository for UnavailableStore {
    fn fetch(&self, _id: &IncidentId) -> Result<Option<IncidentRow>, StorageError> {
        Err(StorageError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _since: Option<DateTime<Utc>>) -> Result<Vec<IncidentRow>, StorageError> {
        Err(StorageError::Unavailable("database offline".to_string()))
    }
}

impl RiskIndicatorRepository for UnavailableStore {
    fn top_for_region(
        &self,
        _region: Option<&str>,
        _limit: usize,
    ) -> Result<Vec<RiskIndicatorRecord>, StorageError> {
        Err(StorageError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<RiskIndicatorRecord>, StorageError> {
        Err(StorageError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryArchive {
    predictions: Arc<Mutex<Vec<EscalationPrediction>>>,
    opportunities: Arc<Mutex<Vec<PeaceOpportunity>>>,
    snapshots: Arc<Mutex<Vec<PatternSnapshot>>>,
}

impl MemoryArchive {
    pub(super) fn predictions(&self) -> Vec<EscalationPrediction> {
        self.predictions.lock().expect("archive mutex poisoned").clone()
    }

    pub(super) fn opportunities(&self) -> Vec<PeaceOpportunity> {
        self.opportunities
            .lock()
            .expect("archive mutex poisoned")
            .clone()
    }

    pub(super) fn snapshot_count(&self) -> usize {
        self.snapshots.lock().expect("archive mutex poisoned").len()
    }
}

impl AnalysisArchive for MemoryArchive {
    fn record_prediction(&self, prediction: &EscalationPrediction) -> Result<(), StorageError> {
        self.predictions
            .lock()
            .expect("archive mutex poisoned")
            .push(prediction.clone());
        Ok(())
    }

    fn record_opportunity(&self, opportunity: &PeaceOpportunity) -> Result<(), StorageError> {
        self.opportunities
            .lock()
            .expect("archive mutex poisoned")
            .push(opportunity.clone());
        Ok(())
    }

    fn record_patterns(&self, snapshot: &PatternSnapshot) -> Result<(), StorageError> {
        self.snapshots
            .lock()
            .expect("archive mutex poisoned")
            .push(snapshot.clone());
        Ok(())
    }
}

pub(super) struct FailingArchive;

impl AnalysisArchive for FailingArchive {
    fn record_prediction(&self, _prediction: &EscalationPrediction) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("archive offline".to_string()))
    }

    fn record_opportunity(&self, _opportunity: &PeaceOpportunity) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("archive offline".to_string()))
    }

    fn record_patterns(&self, _snapshot: &PatternSnapshot) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("archive offline".to_string()))
    }
}

pub(super) fn build_service(
    records: &[IncidentRecord],
) -> (
    ConflictAnalysisService<MemoryStore, MemoryArchive>,
    Arc<MemoryStore>,
    Arc<MemoryArchive>,
) {
    let store = Arc::new(MemoryStore::with_incidents(records));
    let archive = Arc::new(MemoryArchive::default());
    let service =
        ConflictAnalysisService::new(store.clone(), archive.clone(), &AnalysisConfig::default());
    (service, store, archive)
}

pub(super) fn router_with_service<S, A>(service: ConflictAnalysisService<S, A>) -> axum::Router
where
    S: IncidentRepository + RiskIndicatorRepository + 'static,
    A: AnalysisArchive + 'static,
{
    analysis_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
