use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for reported incidents.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IncidentId(pub String);

impl std::fmt::Display for IncidentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Severity band, totally ordered from `Low` to `Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// Numeric weight used by escalation comparisons (low=1 .. critical=4).
    pub const fn score(self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }

    pub fn is_severe(self) -> bool {
        self >= Severity::High
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Active,
    Resolved,
    Pending,
}

impl IncidentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            IncidentStatus::Active => "active",
            IncidentStatus::Resolved => "resolved",
            IncidentStatus::Pending => "pending",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Some(IncidentStatus::Active),
            "resolved" => Some(IncidentStatus::Resolved),
            "pending" => Some(IncidentStatus::Pending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Verified,
    Unverified,
    Pending,
}

impl VerificationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            VerificationStatus::Verified => "verified",
            VerificationStatus::Unverified => "unverified",
            VerificationStatus::Pending => "pending",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "verified" => Some(VerificationStatus::Verified),
            "unverified" => Some(VerificationStatus::Unverified),
            "pending" => Some(VerificationStatus::Pending),
            _ => None,
        }
    }
}

/// Validated incident consumed by every analysis component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub id: IncidentId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub region: String,
    #[serde(default)]
    pub state: Option<String>,
    pub category: String,
    pub severity: Severity,
    pub status: IncidentStatus,
    pub verification_status: VerificationStatus,
    pub reported_at: DateTime<Utc>,
    #[serde(default)]
    pub impacted_population: Option<u32>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl IncidentRecord {
    pub fn has_category(&self, category: &str) -> bool {
        self.category.trim().eq_ignore_ascii_case(category)
    }

    /// Title and description joined for text scoring and keyword matching.
    pub fn narrative(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

/// Incident as handed out by storage, before enumeration and presence checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub verification_status: Option<String>,
    #[serde(default)]
    pub reported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub impacted_population: Option<u32>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl IncidentRow {
    pub fn entity_id(&self) -> String {
        present(&self.id).unwrap_or("unknown").to_string()
    }
}

impl From<&IncidentRecord> for IncidentRow {
    fn from(record: &IncidentRecord) -> Self {
        Self {
            id: Some(record.id.0.clone()),
            title: Some(record.title.clone()),
            description: Some(record.description.clone()),
            location: Some(record.location.clone()),
            region: Some(record.region.clone()),
            state: record.state.clone(),
            category: Some(record.category.clone()),
            severity: Some(record.severity.label().to_string()),
            status: Some(record.status.label().to_string()),
            verification_status: Some(record.verification_status.label().to_string()),
            reported_at: Some(record.reported_at),
            impacted_population: record.impacted_population,
            resolved_at: record.resolved_at,
        }
    }
}

/// Reasons a stored row cannot become an [`IncidentRecord`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IncidentValidationError {
    #[error("incident is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("incident field `{field}` has unsupported value `{value}`")]
    InvalidValue { field: &'static str, value: String },
}

impl TryFrom<IncidentRow> for IncidentRecord {
    type Error = IncidentValidationError;

    fn try_from(row: IncidentRow) -> Result<Self, Self::Error> {
        let id = present(&row.id)
            .ok_or(IncidentValidationError::MissingField("id"))?
            .to_string();

        let severity_raw =
            present(&row.severity).ok_or(IncidentValidationError::MissingField("severity"))?;
        let severity =
            Severity::parse(severity_raw).ok_or_else(|| IncidentValidationError::InvalidValue {
                field: "severity",
                value: severity_raw.to_string(),
            })?;

        let status_raw =
            present(&row.status).ok_or(IncidentValidationError::MissingField("status"))?;
        let status = IncidentStatus::parse(status_raw).ok_or_else(|| {
            IncidentValidationError::InvalidValue {
                field: "status",
                value: status_raw.to_string(),
            }
        })?;

        let verification_status = match present(&row.verification_status) {
            Some(raw) => VerificationStatus::parse(raw).ok_or_else(|| {
                IncidentValidationError::InvalidValue {
                    field: "verification_status",
                    value: raw.to_string(),
                }
            })?,
            None => VerificationStatus::Pending,
        };

        let reported_at = row
            .reported_at
            .ok_or(IncidentValidationError::MissingField("reported_at"))?;

        Ok(IncidentRecord {
            id: IncidentId(id),
            title: row.title.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            location: row.location.unwrap_or_default(),
            region: row.region.unwrap_or_default().trim().to_string(),
            state: row.state.filter(|value| !value.trim().is_empty()),
            category: row.category.unwrap_or_default(),
            severity,
            status,
            verification_status,
            reported_at,
            impacted_population: row.impacted_population,
            resolved_at: row.resolved_at,
        })
    }
}

pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Reading from a tracked risk indicator (0-100 scale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskIndicatorRecord {
    pub id: String,
    pub name: String,
    pub region: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Where an alert originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSource {
    ThresholdRule,
    Manual,
    System,
}

impl AlertSource {
    pub const fn label(self) -> &'static str {
        match self {
            AlertSource::ThresholdRule => "threshold_rule",
            AlertSource::Manual => "manual",
            AlertSource::System => "system",
        }
    }
}

/// Alert raised either by an operator or by the threshold monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub source: AlertSource,
    #[serde(default)]
    pub escalation_level: u8,
    pub created_at: DateTime<Utc>,
}

/// Inclusive timestamp range scoping an analysis call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn trailing_days(now: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: now - chrono::Duration::days(i64::from(days)),
            end: now,
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    /// Incidents reported inside the window, ordered by time then id.
    pub fn select<'a>(&self, incidents: &'a [IncidentRecord]) -> Vec<&'a IncidentRecord> {
        let mut selected: Vec<&IncidentRecord> = incidents
            .iter()
            .filter(|incident| self.contains(incident.reported_at))
            .collect();
        sort_chronologically(&mut selected);
        selected
    }
}

pub(crate) fn sort_chronologically(incidents: &mut [&IncidentRecord]) {
    incidents.sort_by(|a, b| {
        a.reported_at
            .cmp(&b.reported_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Count of chronologically adjacent pairs whose severity strictly increases.
pub(crate) fn escalating_pairs(ordered: &[&IncidentRecord]) -> usize {
    ordered
        .windows(2)
        .filter(|pair| pair[1].severity > pair[0].severity)
        .count()
}
