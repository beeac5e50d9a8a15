use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use super::advisor::{ResponseAdvisor, ResponsePlan};
use super::anomaly::{self, AnomalyConfig, AnomalyReport, QualityReport};
use super::domain::{IncidentId, IncidentRecord, IncidentRow, TimeWindow};
use super::escalation::{EscalationPrediction, EscalationPredictor};
use super::patterns::{PatternDetectionResult, PatternMiner};
use super::peace::{PeaceIndicatorsResult, PeacePredictor};
use super::repository::{
    AnalysisArchive, IncidentRepository, PatternSnapshot, RiskIndicatorRepository,
};
use super::text::{ConflictAnalysis, ScreeningResult, SimilarityResult, TextSignalScorer};
use crate::config::AnalysisConfig;
use crate::error::EngineError;

/// Longest timeframe accepted by the windowed analyses.
pub const MAX_TIMEFRAME_DAYS: u32 = 365;

/// Facade tying the stateless analysers to the incident store and archive.
pub struct ConflictAnalysisService<S, A> {
    store: Arc<S>,
    archive: Arc<A>,
    scorer: TextSignalScorer,
    miner: PatternMiner,
    peace: PeacePredictor,
    escalation: EscalationPredictor,
    advisor: ResponseAdvisor,
    anomalies: AnomalyConfig,
}

impl<S, A> ConflictAnalysisService<S, A>
where
    S: IncidentRepository + RiskIndicatorRepository + 'static,
    A: AnalysisArchive + 'static,
{
    pub fn new(store: Arc<S>, archive: Arc<A>, config: &AnalysisConfig) -> Self {
        Self::with_scorer(store, archive, config, TextSignalScorer::default())
    }

    pub fn with_scorer(
        store: Arc<S>,
        archive: Arc<A>,
        config: &AnalysisConfig,
        scorer: TextSignalScorer,
    ) -> Self {
        let advisor =
            ResponseAdvisor::new(scorer.clone(), config.patterns.resource.keywords.clone());
        Self {
            store,
            archive,
            scorer,
            miner: PatternMiner::new(config.patterns.clone()),
            peace: PeacePredictor::new(config.peace.clone()),
            escalation: EscalationPredictor::new(config.escalation.clone()),
            advisor,
            anomalies: config.anomalies.clone(),
        }
    }

    pub fn analyze_text(&self, text: &str) -> Result<ConflictAnalysis, EngineError> {
        require_text("text", text)?;
        let analysis = self.scorer.analyze(text);
        debug!(
            conflict_score = analysis.conflict_score,
            peace_score = analysis.peace_score,
            risk = analysis.risk_level.label(),
            "text analysed"
        );
        Ok(analysis)
    }

    pub fn screen_statement(&self, statement: &str) -> Result<ScreeningResult, EngineError> {
        require_text("statement", statement)?;
        Ok(self.scorer.screen_statement(statement))
    }

    pub fn calculate_similarity(
        &self,
        first: &str,
        second: &str,
    ) -> Result<SimilarityResult, EngineError> {
        require_text("text1", first)?;
        require_text("text2", second)?;
        Ok(self.scorer.compare(first, second))
    }

    pub fn detect_patterns(
        &self,
        timeframe_days: u32,
    ) -> Result<PatternDetectionResult, EngineError> {
        self.detect_patterns_at(timeframe_days, Utc::now())
    }

    pub fn detect_patterns_at(
        &self,
        timeframe_days: u32,
        now: DateTime<Utc>,
    ) -> Result<PatternDetectionResult, EngineError> {
        let incidents = self.load_window(timeframe_days, now)?;
        let result = self.miner.detect(&incidents, timeframe_days, now);

        let snapshot = PatternSnapshot {
            timeframe_days,
            patterns: result.patterns.clone(),
            generated_at: result.generated_at,
        };
        if let Err(error) = self.archive.record_patterns(&snapshot) {
            warn!(%error, timeframe_days, "failed to archive pattern snapshot");
        }

        info!(
            timeframe_days,
            analyzed = result.analyzed_incidents,
            patterns = result.patterns.len(),
            "pattern detection complete"
        );
        Ok(result)
    }

    pub fn predict_peace(
        &self,
        timeframe_days: u32,
        region: Option<&str>,
    ) -> Result<PeaceIndicatorsResult, EngineError> {
        self.predict_peace_at(timeframe_days, region, Utc::now())
    }

    pub fn predict_peace_at(
        &self,
        timeframe_days: u32,
        region: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<PeaceIndicatorsResult, EngineError> {
        let region = region.map(str::trim).filter(|region| !region.is_empty());
        let incidents = self.load_window(timeframe_days, now)?;
        let result = self.peace.predict(&incidents, timeframe_days, region, now);

        for opportunity in &result.opportunities {
            if let Err(error) = self.archive.record_opportunity(opportunity) {
                warn!(%error, opportunity = %opportunity.id, "failed to archive peace opportunity");
            }
        }

        info!(
            timeframe_days,
            region = region.unwrap_or("all"),
            opportunities = result.opportunities.len(),
            "peace prediction complete"
        );
        Ok(result)
    }

    pub fn predict_escalation(
        &self,
        incident_id: &IncidentId,
    ) -> Result<EscalationPrediction, EngineError> {
        self.predict_escalation_at(incident_id, Utc::now())
    }

    pub fn predict_escalation_at(
        &self,
        incident_id: &IncidentId,
        now: DateTime<Utc>,
    ) -> Result<EscalationPrediction, EngineError> {
        let prediction = self.build_prediction(incident_id, now)?;
        if let Err(error) = self.archive.record_prediction(&prediction) {
            warn!(%error, incident = %incident_id, "failed to archive escalation prediction");
        }
        info!(
            incident = %incident_id,
            probability = prediction.probability,
            risk = prediction.escalation_risk.label(),
            "escalation predicted"
        );
        Ok(prediction)
    }

    pub fn recommendations(
        &self,
        incident_id: Option<&str>,
        region: Option<&str>,
    ) -> Result<ResponsePlan, EngineError> {
        self.recommendations_at(incident_id, region, Utc::now())
    }

    /// Incident scope wins when both an incident and a region are supplied.
    pub fn recommendations_at(
        &self,
        incident_id: Option<&str>,
        region: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ResponsePlan, EngineError> {
        let incident_id = incident_id.map(str::trim).filter(|id| !id.is_empty());
        let region = region.map(str::trim).filter(|region| !region.is_empty());

        match (incident_id, region) {
            (Some(id), _) => {
                let id = IncidentId(id.to_string());
                let incident = self.load_incident(&id)?;
                let prediction = self.predict_for(&incident, now)?;
                Ok(self.advisor.for_incident(&incident, prediction, now))
            }
            (None, Some(region)) => {
                let since = now - Duration::days(i64::from(super::advisor::REGION_LOOKBACK_DAYS));
                let incidents = valid_records(self.store.list(Some(since))?);
                Ok(self.advisor.for_region(region, &incidents, now))
            }
            (None, None) => Err(EngineError::validation(
                "either incident_id or region is required",
            )),
        }
    }

    pub fn detect_anomalies(
        &self,
        lookback_days: Option<u32>,
    ) -> Result<AnomalyReport, EngineError> {
        self.detect_anomalies_at(lookback_days, Utc::now())
    }

    pub fn detect_anomalies_at(
        &self,
        lookback_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<AnomalyReport, EngineError> {
        let mut config = self.anomalies.clone();
        if let Some(days) = lookback_days {
            validate_timeframe(days)?;
            config.lookback_days = days;
        }

        let span = i64::from(config.lookback_days) + i64::from(config.moving_average_days) + 1;
        let incidents = valid_records(self.store.list(Some(now - Duration::days(span)))?);
        let report = anomaly::detect_anomalies(&incidents, now, &config);
        info!(
            lookback_days = config.lookback_days,
            anomalies = report.anomalies.len(),
            "anomaly scan complete"
        );
        Ok(report)
    }

    pub fn scan_quality(&self) -> Result<QualityReport, EngineError> {
        self.scan_quality_at(Utc::now())
    }

    pub fn scan_quality_at(&self, now: DateTime<Utc>) -> Result<QualityReport, EngineError> {
        let rows = self.store.list(None)?;
        let report = anomaly::scan_quality(&rows, now);
        info!(
            scanned = report.scanned,
            issues = report.issues.len(),
            "data quality scan complete"
        );
        Ok(report)
    }

    fn load_window(
        &self,
        timeframe_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<IncidentRecord>, EngineError> {
        validate_timeframe(timeframe_days)?;
        let window = TimeWindow::trailing_days(now, timeframe_days);
        Ok(valid_records(self.store.list(Some(window.start))?))
    }

    fn load_incident(&self, incident_id: &IncidentId) -> Result<IncidentRecord, EngineError> {
        let row = self
            .store
            .fetch(incident_id)?
            .ok_or_else(|| EngineError::not_found("incident", incident_id.0.clone()))?;
        Ok(IncidentRecord::try_from(row)?)
    }

    fn build_prediction(
        &self,
        incident_id: &IncidentId,
        now: DateTime<Utc>,
    ) -> Result<EscalationPrediction, EngineError> {
        let incident = self.load_incident(incident_id)?;
        self.predict_for(&incident, now)
    }

    fn predict_for(
        &self,
        incident: &IncidentRecord,
        now: DateTime<Utc>,
    ) -> Result<EscalationPrediction, EngineError> {
        let region = Some(incident.region.trim()).filter(|region| !region.is_empty());
        let indicators = self
            .store
            .top_for_region(region, self.escalation.config().indicator_limit)?;
        Ok(self.escalation.predict(incident, &indicators, now))
    }
}

fn require_text(field: &str, value: &str) -> Result<(), EngineError> {
    if value.trim().is_empty() {
        return Err(EngineError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn validate_timeframe(days: u32) -> Result<(), EngineError> {
    if days == 0 || days > MAX_TIMEFRAME_DAYS {
        return Err(EngineError::validation(format!(
            "timeframe_days must be between 1 and {MAX_TIMEFRAME_DAYS}"
        )));
    }
    Ok(())
}

/// Converts stored rows, dropping the ones that fail validation.
pub(crate) fn valid_records(rows: Vec<IncidentRow>) -> Vec<IncidentRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.entity_id();
            match IncidentRecord::try_from(row) {
                Ok(record) => Some(record),
                Err(error) => {
                    debug!(incident = %id, %error, "skipping invalid incident row");
                    None
                }
            }
        })
        .collect()
}
