use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};

use crate::analysis::{
    AlertRecord, AlertSource, IncidentId, IncidentRecord, IncidentStatus, Severity, StorageError,
    VerificationStatus,
};
use crate::notifications::{
    DispatchError, NotificationActions, NotificationConditions, NotificationDirectory,
    NotificationDraft, NotificationEngine, NotificationEvent, NotificationPolicy,
    NotificationRule, NotificationSink, NotificationType, UserRecord, UserRole,
};

pub(super) fn user(id: &str, role: UserRole, security_level: u8, active: bool) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        name: format!("User {id}"),
        role,
        security_level,
        active,
    }
}

/// Three users eligible under the default policy plus two who are not.
pub(super) fn staff() -> Vec<UserRecord> {
    vec![
        user("admin-1", UserRole::Admin, 1, true),
        user("sup-1", UserRole::Supervisor, 7, true),
        user("analyst-1", UserRole::Analyst, 5, true),
        user("viewer-1", UserRole::Viewer, 2, true),
        user("admin-2", UserRole::Admin, 9, false),
    ]
}

pub(super) fn incident(severity: Severity) -> IncidentRecord {
    IncidentRecord {
        id: IncidentId("inc-42".to_string()),
        title: "Attack on market".to_string(),
        description: "Gunmen opened fire at a market".to_string(),
        location: "Maiduguri".to_string(),
        region: "North East".to_string(),
        state: Some("Borno".to_string()),
        category: "terrorism".to_string(),
        severity,
        status: IncidentStatus::Active,
        verification_status: VerificationStatus::Verified,
        reported_at: Utc.with_ymd_and_hms(2025, 3, 3, 10, 0, 0).unwrap(),
        impacted_population: Some(30),
        resolved_at: None,
    }
}

pub(super) fn alert(escalation_level: u8) -> AlertRecord {
    AlertRecord {
        id: "alert-7".to_string(),
        title: "Incident surge in North East".to_string(),
        message: "6 incidents reported in North East within 24 hours".to_string(),
        severity: Severity::High,
        region: Some("North East".to_string()),
        category: Some("incident_volume".to_string()),
        source: AlertSource::ThresholdRule,
        escalation_level,
        created_at: Utc.with_ymd_and_hms(2025, 3, 3, 11, 0, 0).unwrap(),
    }
}

pub(super) fn rule(
    id: &str,
    event: NotificationEvent,
    conditions: Option<NotificationConditions>,
    actions: NotificationActions,
) -> NotificationRule {
    NotificationRule {
        id: id.to_string(),
        name: format!("Rule {id}"),
        enabled: true,
        event,
        conditions,
        actions,
    }
}

pub(super) fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[derive(Default, Clone)]
pub(super) struct MemoryDirectory {
    pub(super) rules: Arc<Mutex<Vec<NotificationRule>>>,
    pub(super) users: Arc<Mutex<Vec<UserRecord>>>,
}

impl MemoryDirectory {
    pub(super) fn new(rules: Vec<NotificationRule>, users: Vec<UserRecord>) -> Self {
        Self {
            rules: Arc::new(Mutex::new(rules)),
            users: Arc::new(Mutex::new(users)),
        }
    }
}

impl NotificationDirectory for MemoryDirectory {
    fn rules_for(&self, event: NotificationEvent) -> Result<Vec<NotificationRule>, StorageError> {
        let guard = self.rules.lock().expect("directory mutex poisoned");
        Ok(guard
            .iter()
            .filter(|rule| rule.event == event)
            .cloned()
            .collect())
    }

    fn users(&self) -> Result<Vec<UserRecord>, StorageError> {
        Ok(self.users.lock().expect("directory mutex poisoned").clone())
    }
}

pub(super) struct UnavailableDirectory;

impl NotificationDirectory for UnavailableDirectory {
    fn rules_for(&self, _event: NotificationEvent) -> Result<Vec<NotificationRule>, StorageError> {
        Err(StorageError::Unavailable("settings store offline".to_string()))
    }

    fn users(&self) -> Result<Vec<UserRecord>, StorageError> {
        Err(StorageError::Unavailable("settings store offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemorySink {
    sent: Arc<Mutex<Vec<NotificationDraft>>>,
    reject: Option<String>,
}

impl MemorySink {
    pub(super) fn rejecting(user_id: &str) -> Self {
        Self {
            sent: Arc::default(),
            reject: Some(user_id.to_string()),
        }
    }

    pub(super) fn sent(&self) -> Vec<NotificationDraft> {
        self.sent.lock().expect("sink mutex poisoned").clone()
    }
}

impl NotificationSink for MemorySink {
    fn create(&self, draft: NotificationDraft) -> Result<(), DispatchError> {
        if self.reject.as_deref() == Some(draft.user_id.as_str()) {
            return Err(DispatchError::Rejected(draft.user_id));
        }
        self.sent.lock().expect("sink mutex poisoned").push(draft);
        Ok(())
    }
}

pub(super) fn build_engine(
    rules: Vec<NotificationRule>,
    sink: MemorySink,
) -> (
    NotificationEngine<MemoryDirectory, MemorySink>,
    Arc<MemorySink>,
) {
    let directory = Arc::new(MemoryDirectory::new(rules, staff()));
    let sink = Arc::new(sink);
    let engine = NotificationEngine::new(directory, sink.clone(), NotificationPolicy::default());
    (engine, sink)
}

pub(super) fn critical_only_rule() -> NotificationRule {
    rule(
        "critical-only",
        NotificationEvent::IncidentCreated,
        Some(NotificationConditions {
            severity_in: Some(strings(&["critical"])),
            ..NotificationConditions::default()
        }),
        NotificationActions {
            notify_roles: vec![UserRole::Admin],
            notification_type: NotificationType::Critical,
            ..NotificationActions::default()
        },
    )
}
