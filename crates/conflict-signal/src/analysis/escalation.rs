use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    IncidentId, IncidentRecord, IncidentStatus, RiskIndicatorRecord, Severity, VerificationStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationRisk {
    Low,
    Medium,
    High,
}

impl EscalationRisk {
    pub const fn label(self) -> &'static str {
        match self {
            EscalationRisk::Low => "low",
            EscalationRisk::Medium => "medium",
            EscalationRisk::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationPrediction {
    pub incident_id: IncidentId,
    pub region: String,
    pub current_severity: Severity,
    pub escalation_risk: EscalationRisk,
    pub probability: u8,
    pub time_window_days: u16,
    pub key_drivers: Vec<String>,
    pub recommended_actions: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Weights and bands for the escalation risk score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    pub indicator_limit: usize,
    pub severity_weight: f64,
    pub indicator_weight: f64,
    pub active_bonus: f64,
    pub unverified_penalty: f64,
    pub min_probability: u8,
    pub max_probability: u8,
    pub high_threshold: u8,
    pub medium_threshold: u8,
    pub high_window_days: u16,
    pub medium_window_days: u16,
    pub low_window_days: u16,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            indicator_limit: 10,
            severity_weight: 20.0,
            indicator_weight: 0.5,
            active_bonus: 10.0,
            unverified_penalty: 5.0,
            min_probability: 5,
            max_probability: 95,
            high_threshold: 70,
            medium_threshold: 40,
            high_window_days: 14,
            medium_window_days: 21,
            low_window_days: 30,
        }
    }
}

const KEY_INDICATOR_DRIVERS: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct EscalationPredictor {
    config: EscalationConfig,
}

impl EscalationPredictor {
    pub fn new(config: EscalationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EscalationConfig {
        &self.config
    }

    /// Predict escalation for `incident`; `indicators` must already be ordered by
    /// value descending and limited to the incident's region.
    pub fn predict(
        &self,
        incident: &IncidentRecord,
        indicators: &[RiskIndicatorRecord],
        now: DateTime<Utc>,
    ) -> EscalationPrediction {
        let config = &self.config;
        let average_indicator = if indicators.is_empty() {
            0.0
        } else {
            indicators.iter().map(|indicator| indicator.value).sum::<f64>()
                / indicators.len() as f64
        };

        let mut risk_score = config.severity_weight * f64::from(incident.severity.score())
            + config.indicator_weight * average_indicator;
        if incident.status == IncidentStatus::Active {
            risk_score += config.active_bonus;
        }
        if incident.verification_status == VerificationStatus::Unverified {
            risk_score -= config.unverified_penalty;
        }

        let probability = risk_score.round().clamp(
            f64::from(config.min_probability),
            f64::from(config.max_probability),
        ) as u8;

        let escalation_risk = if probability >= config.high_threshold {
            EscalationRisk::High
        } else if probability >= config.medium_threshold {
            EscalationRisk::Medium
        } else {
            EscalationRisk::Low
        };

        let time_window_days = match escalation_risk {
            EscalationRisk::High => config.high_window_days,
            EscalationRisk::Medium => config.medium_window_days,
            EscalationRisk::Low => config.low_window_days,
        };

        let mut key_drivers: Vec<String> = indicators
            .iter()
            .take(KEY_INDICATOR_DRIVERS)
            .map(|indicator| indicator.name.clone())
            .collect();
        for context in [&incident.category, &incident.location] {
            let trimmed = context.trim();
            if !trimmed.is_empty() {
                key_drivers.push(trimmed.to_string());
            }
        }

        EscalationPrediction {
            incident_id: incident.id.clone(),
            region: incident.region.clone(),
            current_severity: incident.severity,
            escalation_risk,
            probability,
            time_window_days,
            key_drivers,
            recommended_actions: recommended_actions(escalation_risk),
            generated_at: now,
        }
    }
}

fn recommended_actions(risk: EscalationRisk) -> Vec<String> {
    let actions: &[&str] = match risk {
        EscalationRisk::High => &[
            "Deploy rapid response teams to the affected area",
            "Engage community and religious leaders for immediate de-escalation",
            "Alert neighbouring regions and security agencies",
            "Pre-position humanitarian assistance",
        ],
        EscalationRisk::Medium => &[
            "Increase monitoring and patrols in the area",
            "Convene local peace committee meetings",
            "Verify reports with field monitors",
        ],
        EscalationRisk::Low => &[
            "Continue routine monitoring",
            "Maintain contact with community focal points",
        ],
    };
    actions.iter().map(|action| action.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
    }

    fn incident(severity: Severity, status: IncidentStatus) -> IncidentRecord {
        IncidentRecord {
            id: IncidentId("inc-7".to_string()),
            title: "Attack on village".to_string(),
            description: "Gunmen attacked a village".to_string(),
            location: "Bokkos".to_string(),
            region: "North Central".to_string(),
            state: Some("Plateau".to_string()),
            category: "conflict".to_string(),
            severity,
            status,
            verification_status: VerificationStatus::Verified,
            reported_at: now(),
            impacted_population: None,
            resolved_at: None,
        }
    }

    fn indicator(name: &str, value: f64) -> RiskIndicatorRecord {
        RiskIndicatorRecord {
            id: format!("ind-{name}"),
            name: name.to_string(),
            region: "North Central".to_string(),
            value,
            timestamp: now(),
        }
    }

    #[test]
    fn critical_active_incident_with_hot_indicators_is_high_risk() {
        let predictor = EscalationPredictor::default();
        let indicators = vec![
            indicator("displacement", 90.0),
            indicator("arms flow", 80.0),
            indicator("hate speech", 70.0),
            indicator("food prices", 40.0),
        ];

        let prediction = predictor.predict(
            &incident(Severity::Critical, IncidentStatus::Active),
            &indicators,
            now(),
        );

        // 80 + 0.5 * 70 + 10 = 125, clamped to 95
        assert_eq!(prediction.probability, 95);
        assert_eq!(prediction.escalation_risk, EscalationRisk::High);
        assert_eq!(prediction.time_window_days, 14);
        assert_eq!(
            prediction.key_drivers,
            vec!["displacement", "arms flow", "hate speech", "conflict", "Bokkos"]
        );
    }

    #[test]
    fn low_resolved_unverified_incident_is_low_risk() {
        let predictor = EscalationPredictor::default();
        let mut record = incident(Severity::Low, IncidentStatus::Resolved);
        record.verification_status = VerificationStatus::Unverified;

        let prediction = predictor.predict(&record, &[], now());

        // 20 - 5 = 15
        assert_eq!(prediction.probability, 15);
        assert_eq!(prediction.escalation_risk, EscalationRisk::Low);
        assert_eq!(prediction.time_window_days, 30);
        assert_eq!(prediction.key_drivers, vec!["conflict", "Bokkos"]);
    }

    #[test]
    fn medium_band_uses_three_week_window() {
        let predictor = EscalationPredictor::default();
        let prediction = predictor.predict(
            &incident(Severity::Medium, IncidentStatus::Active),
            &[indicator("tension", 20.0)],
            now(),
        );

        // 40 + 10 + 10 = 60
        assert_eq!(prediction.probability, 60);
        assert_eq!(prediction.escalation_risk, EscalationRisk::Medium);
        assert_eq!(prediction.time_window_days, 21);
        assert!(!prediction.recommended_actions.is_empty());
    }

    #[test]
    fn probability_never_drops_below_floor() {
        let config = EscalationConfig {
            severity_weight: 0.0,
            ..EscalationConfig::default()
        };
        let predictor = EscalationPredictor::new(config);
        let mut record = incident(Severity::Low, IncidentStatus::Pending);
        record.verification_status = VerificationStatus::Unverified;

        let prediction = predictor.predict(&record, &[], now());
        assert_eq!(prediction.probability, 5);
    }
}
