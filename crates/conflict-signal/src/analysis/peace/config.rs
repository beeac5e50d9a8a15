use serde::{Deserialize, Serialize};

/// Tunable constants for the peace opportunity detectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeaceThresholds {
    /// Days ahead covered by region-level opportunity windows.
    pub horizon_days: i64,
    /// Offset of the optimal engagement date inside the window.
    pub optimal_offset_days: i64,
    pub declining: DecliningViolenceThresholds,
    pub resolution: ResolutionThresholds,
    pub seasonal: SeasonalThresholds,
    pub political: PoliticalStabilityThresholds,
    pub reconciliation: ReconciliationThresholds,
}

impl Default for PeaceThresholds {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            optimal_offset_days: 7,
            declining: DecliningViolenceThresholds::default(),
            resolution: ResolutionThresholds::default(),
            seasonal: SeasonalThresholds::default(),
            political: PoliticalStabilityThresholds::default(),
            reconciliation: ReconciliationThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecliningViolenceThresholds {
    pub min_incidents: usize,
    /// Required drop in average severity score between halves.
    pub min_severity_drop: f64,
    /// Second-half volume must stay below this share of the first half.
    pub max_volume_ratio: f64,
    pub base_confidence: f64,
    pub max_confidence: u32,
}

impl Default for DecliningViolenceThresholds {
    fn default() -> Self {
        Self {
            min_incidents: 2,
            min_severity_drop: 0.5,
            max_volume_ratio: 0.8,
            base_confidence: 50.0,
            max_confidence: 90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionThresholds {
    pub min_resolved: usize,
    pub max_average_days: f64,
    pub base_confidence: u32,
    pub confidence_per_resolution: u32,
    pub max_confidence: u32,
}

impl Default for ResolutionThresholds {
    fn default() -> Self {
        Self {
            min_resolved: 3,
            max_average_days: 30.0,
            base_confidence: 55,
            confidence_per_resolution: 5,
            max_confidence: 90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalThresholds {
    /// Months below this share of the monthly average are candidates.
    pub candidate_ratio: f64,
    /// Months below this share of the monthly average become opportunities.
    pub opportunity_ratio: f64,
    pub base_confidence: f64,
    pub max_confidence: u32,
}

impl Default for SeasonalThresholds {
    fn default() -> Self {
        Self {
            candidate_ratio: 0.7,
            opportunity_ratio: 0.5,
            base_confidence: 55.0,
            max_confidence: 85,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoliticalStabilityThresholds {
    pub category: String,
    pub confidence: u8,
}

impl Default for PoliticalStabilityThresholds {
    fn default() -> Self {
        Self {
            category: "political".to_string(),
            confidence: 75,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationThresholds {
    pub category: String,
    pub quiet_days: i64,
    pub confidence: u8,
}

impl Default for ReconciliationThresholds {
    fn default() -> Self {
        Self {
            category: "conflict".to_string(),
            quiet_days: 30,
            confidence: 65,
        }
    }
}
