//! Peace opportunity forecasting from recent incident history.

mod config;
mod detectors;

pub use config::{
    DecliningViolenceThresholds, PeaceThresholds, PoliticalStabilityThresholds,
    ReconciliationThresholds, ResolutionThresholds, SeasonalThresholds,
};

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{IncidentRecord, TimeWindow};
use detectors::PeaceContext;

/// Region label for opportunities that apply country-wide.
pub const NATIONAL_REGION: &str = "National";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    DecliningViolence,
    ResolutionPattern,
    SeasonalWindow,
    PoliticalStability,
    ReconciliationSignal,
}

impl OpportunityKind {
    pub const fn slug(self) -> &'static str {
        match self {
            OpportunityKind::DecliningViolence => "declining-violence",
            OpportunityKind::ResolutionPattern => "resolution-pattern",
            OpportunityKind::SeasonalWindow => "seasonal-window",
            OpportunityKind::PoliticalStability => "political-stability",
            OpportunityKind::ReconciliationSignal => "reconciliation-signal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn from_confidence(confidence: u8) -> Self {
        match confidence {
            90.. => Priority::Critical,
            80..=89 => Priority::High,
            65..=79 => Priority::Medium,
            _ => Priority::Low,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub optimal: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeaceOpportunity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: OpportunityKind,
    pub title: String,
    pub description: String,
    pub region: String,
    pub confidence: u8,
    pub priority: Priority,
    pub time_window: OpportunityWindow,
    pub indicators: Vec<String>,
    pub prerequisites: Vec<String>,
    pub recommendations: Vec<String>,
    pub risk_factors: Vec<String>,
    pub success_probability: u8,
    pub detected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeaceSummary {
    pub total_opportunities: usize,
    pub high_priority: usize,
    pub average_confidence: u8,
    pub average_success_probability: u8,
    pub regions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeaceIndicatorsResult {
    pub opportunities: Vec<PeaceOpportunity>,
    pub summary: PeaceSummary,
    pub timeframe_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct PeacePredictor {
    thresholds: PeaceThresholds,
}

impl PeacePredictor {
    pub fn new(thresholds: PeaceThresholds) -> Self {
        Self { thresholds }
    }

    pub fn predict(
        &self,
        incidents: &[IncidentRecord],
        timeframe_days: u32,
        region: Option<&str>,
        now: DateTime<Utc>,
    ) -> PeaceIndicatorsResult {
        let window = TimeWindow::trailing_days(now, timeframe_days);
        let ctx = PeaceContext {
            incidents: window.select(incidents),
            window,
            now,
            thresholds: &self.thresholds,
        };

        let mut opportunities: Vec<PeaceOpportunity> = detectors::declining_violence(&ctx)
            .into_iter()
            .chain(detectors::resolution_pattern(&ctx))
            .chain(detectors::seasonal_windows(&ctx))
            .chain(detectors::political_stability(&ctx))
            .chain(detectors::reconciliation_signals(&ctx))
            .collect();

        if let Some(requested) = region {
            opportunities.retain(|opportunity| {
                opportunity.region == requested || opportunity.region == NATIONAL_REGION
            });
        }

        opportunities.sort_by(|a, b| b.confidence.cmp(&a.confidence));

        PeaceIndicatorsResult {
            summary: summarize(&opportunities),
            opportunities,
            timeframe_days,
            region: region.map(str::to_string),
            generated_at: now,
        }
    }
}

fn summarize(opportunities: &[PeaceOpportunity]) -> PeaceSummary {
    let count = opportunities.len();
    let average = |values: Vec<u32>| -> u8 {
        if count == 0 {
            0
        } else {
            (f64::from(values.iter().sum::<u32>()) / count as f64).round() as u8
        }
    };

    PeaceSummary {
        total_opportunities: count,
        high_priority: opportunities
            .iter()
            .filter(|opportunity| opportunity.priority >= Priority::High)
            .count(),
        average_confidence: average(
            opportunities
                .iter()
                .map(|opportunity| u32::from(opportunity.confidence))
                .collect(),
        ),
        average_success_probability: average(
            opportunities
                .iter()
                .map(|opportunity| u32::from(opportunity.success_probability))
                .collect(),
        ),
        regions: opportunities
            .iter()
            .map(|opportunity| opportunity.region.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    }
}
