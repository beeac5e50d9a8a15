//! Multi-pass pattern mining over a window of incidents.

mod config;
mod detectors;

pub use config::{
    ActorThresholds, GeographicThresholds, PatternThresholds, ResourceThresholds,
    SeverityEscalationThresholds, TemporalThresholds,
};

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{IncidentId, IncidentRecord, Severity, TimeWindow};
use detectors::DetectionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    GeographicEscalation,
    TemporalClustering,
    ActorBased,
    ResourceConflict,
    SeverityEscalation,
}

impl PatternKind {
    pub const fn slug(self) -> &'static str {
        match self {
            PatternKind::GeographicEscalation => "geographic-escalation",
            PatternKind::TemporalClustering => "temporal-clustering",
            PatternKind::ActorBased => "actor-based",
            PatternKind::ResourceConflict => "resource-conflict",
            PatternKind::SeverityEscalation => "severity-escalation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictPattern {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub title: String,
    pub description: String,
    pub confidence: u8,
    pub severity: Severity,
    pub affected_regions: Vec<String>,
    pub time_window: TimeWindow,
    pub indicators: Vec<String>,
    pub related_incidents: Vec<IncidentId>,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub detected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSummary {
    pub total_patterns: usize,
    pub critical_patterns: usize,
    pub emerging_threats: usize,
    pub affected_regions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDetectionResult {
    pub patterns: Vec<ConflictPattern>,
    pub summary: PatternSummary,
    pub timeframe_days: u32,
    pub analyzed_incidents: usize,
    pub generated_at: DateTime<Utc>,
}

const EMERGING_THREAT_CONFIDENCE: u8 = 75;

/// Stateless miner running the five detectors with the configured thresholds.
#[derive(Debug, Clone, Default)]
pub struct PatternMiner {
    thresholds: PatternThresholds,
}

impl PatternMiner {
    pub fn new(thresholds: PatternThresholds) -> Self {
        Self { thresholds }
    }

    pub fn detect(
        &self,
        incidents: &[IncidentRecord],
        timeframe_days: u32,
        now: DateTime<Utc>,
    ) -> PatternDetectionResult {
        let window = TimeWindow::trailing_days(now, timeframe_days);
        let ctx = DetectionContext {
            incidents: window.select(incidents),
            window,
            now,
            thresholds: &self.thresholds,
        };

        let mut patterns: Vec<ConflictPattern> = [
            detectors::geographic_escalation(&ctx),
            detectors::temporal_clustering(&ctx),
            detectors::actor_based(&ctx),
            detectors::resource_conflict(&ctx),
            detectors::severity_escalation(&ctx),
        ]
        .into_iter()
        .flatten()
        .collect();

        patterns.sort_by(|a, b| b.confidence.cmp(&a.confidence));

        PatternDetectionResult {
            summary: summarize(&patterns),
            patterns,
            timeframe_days,
            analyzed_incidents: ctx.incidents.len(),
            generated_at: now,
        }
    }
}

fn summarize(patterns: &[ConflictPattern]) -> PatternSummary {
    let affected_regions: BTreeSet<String> = patterns
        .iter()
        .flat_map(|pattern| pattern.affected_regions.iter().cloned())
        .collect();

    PatternSummary {
        total_patterns: patterns.len(),
        critical_patterns: patterns
            .iter()
            .filter(|pattern| pattern.severity == Severity::Critical)
            .count(),
        emerging_threats: patterns
            .iter()
            .filter(|pattern| pattern.confidence > EMERGING_THREAT_CONFIDENCE)
            .count(),
        affected_regions: affected_regions.into_iter().collect(),
    }
}

#[cfg(test)]
pub(crate) fn escalation_rate_for_tests(incidents: &[&IncidentRecord]) -> f64 {
    detectors::escalation_rate(incidents)
}
