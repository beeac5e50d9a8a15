use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::analysis::{
    AnomalyConfig, EscalationConfig, PatternThresholds, PeaceThresholds, ThresholdRuleConfig,
};
use crate::notifications::NotificationPolicy;

/// Tunables for every analysis component; sections missing from the JSON keep their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub patterns: PatternThresholds,
    pub peace: PeaceThresholds,
    pub escalation: EscalationConfig,
    pub anomalies: AnomalyConfig,
    pub thresholds: ThresholdRuleConfig,
    pub notifications: NotificationPolicy,
}

impl AnalysisConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::AnalysisFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw, path)
    }

    fn from_json(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|source| ConfigError::AnalysisFormat {
            path: PathBuf::from(origin),
            source,
        })
    }
}
