use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{AlertRecord, IncidentId, IncidentRow, RiskIndicatorRecord};
use super::escalation::EscalationPrediction;
use super::patterns::ConflictPattern;
use super::peace::PeaceOpportunity;
use super::thresholds::AlertDraft;

/// Read access to stored incidents so analysis can run without a database.
pub trait IncidentRepository: Send + Sync {
    fn fetch(&self, id: &IncidentId) -> Result<Option<IncidentRow>, StorageError>;
    /// Rows reported at or after `since`; every row when `since` is `None`.
    fn list(&self, since: Option<DateTime<Utc>>) -> Result<Vec<IncidentRow>, StorageError>;
}

/// Read access to risk indicator readings.
pub trait RiskIndicatorRepository: Send + Sync {
    /// Highest-valued readings for a region (all regions when `None`), descending.
    fn top_for_region(
        &self,
        region: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RiskIndicatorRecord>, StorageError>;
    fn all(&self) -> Result<Vec<RiskIndicatorRecord>, StorageError>;
}

/// Best-effort sink for predictions and snapshots produced by analysis calls.
pub trait AnalysisArchive: Send + Sync {
    fn record_prediction(&self, prediction: &EscalationPrediction) -> Result<(), StorageError>;
    fn record_opportunity(&self, opportunity: &PeaceOpportunity) -> Result<(), StorageError>;
    fn record_patterns(&self, snapshot: &PatternSnapshot) -> Result<(), StorageError>;
}

/// Storage for alerts raised by the threshold monitor.
pub trait AlertRepository: Send + Sync {
    fn create(&self, draft: AlertDraft) -> Result<AlertRecord, StorageError>;
}

/// Snapshot of a pattern detection run handed to the archive.
#[derive(Debug, Clone, Serialize)]
pub struct PatternSnapshot {
    pub timeframe_days: u32,
    pub patterns: Vec<ConflictPattern>,
    pub generated_at: DateTime<Utc>,
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
