use serde::{Deserialize, Serialize};

/// Tunable constants for the five pattern detectors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternThresholds {
    pub geographic: GeographicThresholds,
    pub temporal: TemporalThresholds,
    pub actor: ActorThresholds,
    pub resource: ResourceThresholds,
    pub severity: SeverityEscalationThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeographicThresholds {
    /// Share of a region's incidents that must be escalating pairs.
    pub spreading_ratio: f64,
    pub min_spreading_regions: usize,
    pub base_confidence: u32,
    pub confidence_per_region: u32,
    pub max_confidence: u32,
    pub high_regions: usize,
    pub critical_regions: usize,
}

impl Default for GeographicThresholds {
    fn default() -> Self {
        Self {
            spreading_ratio: 0.3,
            min_spreading_regions: 2,
            base_confidence: 60,
            confidence_per_region: 10,
            max_confidence: 95,
            high_regions: 3,
            critical_regions: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalThresholds {
    /// Multiple of the average daily count a day must exceed to be flagged.
    pub spike_multiplier: f64,
    pub min_flagged_days: usize,
    pub base_confidence: u32,
    pub confidence_per_day: u32,
    pub max_confidence: u32,
    pub high_flagged_days: usize,
}

impl Default for TemporalThresholds {
    fn default() -> Self {
        Self {
            spike_multiplier: 2.0,
            min_flagged_days: 3,
            base_confidence: 50,
            confidence_per_day: 8,
            max_confidence: 90,
            high_flagged_days: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorThresholds {
    pub min_incidents: usize,
    pub min_regions: usize,
    pub base_confidence: u32,
    pub confidence_per_fragment: u32,
    pub max_confidence: u32,
    pub high_fragments: usize,
}

impl Default for ActorThresholds {
    fn default() -> Self {
        Self {
            min_incidents: 5,
            min_regions: 3,
            base_confidence: 40,
            confidence_per_fragment: 15,
            max_confidence: 85,
            high_fragments: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceThresholds {
    pub keywords: Vec<String>,
    pub min_matches: usize,
    pub base_confidence: u32,
    pub confidence_per_match: u32,
    pub max_confidence: u32,
    /// High/critical matches needed for a `high` pattern.
    pub high_severe_matches: usize,
    /// High/critical matches needed for a `medium` pattern.
    pub medium_severe_matches: usize,
}

impl Default for ResourceThresholds {
    fn default() -> Self {
        Self {
            keywords: [
                "farmer", "herder", "land", "water", "grazing", "crop", "cattle", "resource",
            ]
            .iter()
            .map(|keyword| keyword.to_string())
            .collect(),
            min_matches: 8,
            base_confidence: 50,
            confidence_per_match: 3,
            max_confidence: 90,
            high_severe_matches: 5,
            medium_severe_matches: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityEscalationThresholds {
    /// Escalation rate that must be exceeded for the pattern to fire.
    pub min_rate: f64,
    pub base_confidence: f64,
    pub rate_weight: f64,
    pub max_confidence: u32,
    pub high_rate: f64,
    pub critical_rate: f64,
}

impl Default for SeverityEscalationThresholds {
    fn default() -> Self {
        Self {
            min_rate: 0.3,
            base_confidence: 40.0,
            rate_weight: 100.0,
            max_confidence: 95,
            high_rate: 0.4,
            critical_rate: 0.6,
        }
    }
}
