use serde::{Deserialize, Serialize};

use crate::analysis::{AlertRecord, IncidentRecord, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Supervisor,
    Analyst,
    FieldOfficer,
    Viewer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    #[serde(default)]
    pub security_level: u8,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    IncidentCreated,
    AlertCreated,
}

impl NotificationEvent {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationEvent::IncidentCreated => "incident_created",
            NotificationEvent::AlertCreated => "alert_created",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    #[default]
    Info,
    Warning,
    Critical,
    Success,
}

/// Optional filters; every present, non-empty list must contain the record's value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConditions {
    #[serde(alias = "severityIn")]
    pub severity_in: Option<Vec<String>>,
    #[serde(alias = "regionIn")]
    pub region_in: Option<Vec<String>>,
    #[serde(alias = "categoryIn")]
    pub category_in: Option<Vec<String>>,
    #[serde(alias = "sourceIn")]
    pub source_in: Option<Vec<String>>,
    #[serde(alias = "escalationLevelGte")]
    pub escalation_level_gte: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationActions {
    #[serde(alias = "notifyRoles")]
    pub notify_roles: Vec<UserRole>,
    #[serde(alias = "notifyUserIds")]
    pub notify_user_ids: Vec<String>,
    #[serde(alias = "notificationType")]
    pub notification_type: NotificationType,
    #[serde(alias = "titleTemplate")]
    pub title_template: Option<String>,
    #[serde(alias = "messageTemplate")]
    pub message_template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRule {
    pub id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub event: NotificationEvent,
    #[serde(default)]
    pub conditions: Option<NotificationConditions>,
    #[serde(default)]
    pub actions: NotificationActions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub entity_type: String,
    pub entity_id: String,
}

/// Notification handed to the sink for one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    pub entity: EntityRef,
}

/// Field lookup used by conditions and templates.
pub trait NotificationSubject {
    fn field(&self, name: &str) -> Option<String>;
    fn severity(&self) -> Severity;
    fn escalation_level(&self) -> Option<u8>;
    fn entity(&self) -> EntityRef;
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl NotificationSubject for IncidentRecord {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.0.clone()),
            "title" => non_blank(&self.title),
            "description" => non_blank(&self.description),
            "location" => non_blank(&self.location),
            "region" => non_blank(&self.region),
            "state" => self.state.as_deref().and_then(non_blank),
            "category" => non_blank(&self.category),
            "severity" => Some(self.severity.label().to_string()),
            "status" => Some(self.status.label().to_string()),
            "verification_status" | "verificationStatus" => {
                Some(self.verification_status.label().to_string())
            }
            "reported_at" | "reportedAt" => Some(self.reported_at.to_rfc3339()),
            "impacted_population" | "impactedPopulation" => {
                self.impacted_population.map(|count| count.to_string())
            }
            _ => None,
        }
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn escalation_level(&self) -> Option<u8> {
        None
    }

    fn entity(&self) -> EntityRef {
        EntityRef {
            entity_type: "incident".to_string(),
            entity_id: self.id.0.clone(),
        }
    }
}

impl NotificationSubject for AlertRecord {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.clone()),
            "title" => non_blank(&self.title),
            "message" => non_blank(&self.message),
            "severity" => Some(self.severity.label().to_string()),
            "region" => self.region.as_deref().and_then(non_blank),
            "category" => self.category.as_deref().and_then(non_blank),
            "source" => Some(self.source.label().to_string()),
            "escalation_level" | "escalationLevel" => Some(self.escalation_level.to_string()),
            "created_at" | "createdAt" => Some(self.created_at.to_rfc3339()),
            _ => None,
        }
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn escalation_level(&self) -> Option<u8> {
        Some(self.escalation_level)
    }

    fn entity(&self) -> EntityRef {
        EntityRef {
            entity_type: "alert".to_string(),
            entity_id: self.id.clone(),
        }
    }
}
