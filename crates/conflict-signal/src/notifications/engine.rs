use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::conditions::conditions_match;
use super::domain::{
    NotificationDraft, NotificationEvent, NotificationRule, NotificationSubject, NotificationType,
    UserRecord, UserRole,
};
use super::template::render_template;
use crate::analysis::StorageError;
use crate::error::EngineError;

/// Read access to rules and users; rules are read fresh on every evaluation.
pub trait NotificationDirectory: Send + Sync {
    /// Rules registered for `event`, in insertion order.
    fn rules_for(&self, event: NotificationEvent) -> Result<Vec<NotificationRule>, StorageError>;
    fn users(&self) -> Result<Vec<UserRecord>, StorageError>;
}

/// Store receiving one notification per recipient.
pub trait NotificationSink: Send + Sync {
    fn create(&self, draft: NotificationDraft) -> Result<(), DispatchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("notification store unavailable: {0}")]
    Unavailable(String),
    #[error("recipient `{0}` cannot receive notifications")]
    Rejected(String),
}

/// Who is notified when no enabled rule exists for an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPolicy {
    pub min_security_level: u8,
}

impl Default for NotificationPolicy {
    fn default() -> Self {
        Self {
            min_security_level: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPlan {
    pub rules_evaluated: usize,
    pub rules_matched: usize,
    pub default_policy_applied: bool,
    pub drafts: Vec<NotificationDraft>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub event: NotificationEvent,
    pub rules_evaluated: usize,
    pub rules_matched: usize,
    pub default_policy_applied: bool,
    pub attempted: usize,
    pub created: usize,
}

/// Decide who is notified about `subject`. Pure; dispatch happens in the engine.
pub fn plan_notifications(
    event: NotificationEvent,
    rules: &[NotificationRule],
    users: &[UserRecord],
    subject: &dyn NotificationSubject,
    policy: &NotificationPolicy,
) -> NotificationPlan {
    let enabled: Vec<&NotificationRule> = rules
        .iter()
        .filter(|rule| rule.enabled && rule.event == event)
        .collect();
    let (default_title, default_message) = default_templates(event);

    if enabled.is_empty() {
        let notification_type = if subject.severity().is_severe() {
            NotificationType::Critical
        } else {
            NotificationType::Warning
        };
        let title = render_template(default_title, subject);
        let message = render_template(default_message, subject);
        let drafts = users
            .iter()
            .filter(|user| {
                user.active
                    && (user.role == UserRole::Admin
                        || user.security_level >= policy.min_security_level)
            })
            .map(|user| NotificationDraft {
                user_id: user.id.clone(),
                title: title.clone(),
                message: message.clone(),
                notification_type,
                rule_id: None,
                entity: subject.entity(),
            })
            .collect();
        return NotificationPlan {
            rules_evaluated: 0,
            rules_matched: 0,
            default_policy_applied: true,
            drafts,
        };
    }

    let mut drafts = Vec::new();
    let mut matched = 0;
    for rule in &enabled {
        if !conditions_match(rule.conditions.as_ref(), subject) {
            debug!(rule = %rule.id, "notification rule conditions not met");
            continue;
        }
        matched += 1;

        let actions = &rule.actions;
        let title = render_template(
            actions.title_template.as_deref().unwrap_or(default_title),
            subject,
        );
        let message = render_template(
            actions.message_template.as_deref().unwrap_or(default_message),
            subject,
        );
        for user in recipients(rule, users) {
            drafts.push(NotificationDraft {
                user_id: user.id.clone(),
                title: title.clone(),
                message: message.clone(),
                notification_type: actions.notification_type,
                rule_id: Some(rule.id.clone()),
                entity: subject.entity(),
            });
        }
    }

    NotificationPlan {
        rules_evaluated: enabled.len(),
        rules_matched: matched,
        default_policy_applied: false,
        drafts,
    }
}

/// Explicit active users first, then active users holding a listed role; each id once.
fn recipients<'a>(rule: &NotificationRule, users: &'a [UserRecord]) -> Vec<&'a UserRecord> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut selected = Vec::new();

    let explicit = rule
        .actions
        .notify_user_ids
        .iter()
        .filter_map(|id| users.iter().find(|user| &user.id == id));
    let by_role = users
        .iter()
        .filter(|user| rule.actions.notify_roles.contains(&user.role));

    for user in explicit.chain(by_role) {
        if user.active && seen.insert(user.id.as_str()) {
            selected.push(user);
        }
    }
    selected
}

fn default_templates(event: NotificationEvent) -> (&'static str, &'static str) {
    match event {
        NotificationEvent::IncidentCreated => (
            "New incident: {{title}}",
            "A {{severity}} severity incident was reported in {{region}} ({{location}}).",
        ),
        NotificationEvent::AlertCreated => ("New alert: {{title}}", "{{message}}"),
    }
}

/// Evaluates rules for new incidents and alerts and dispatches the notifications.
pub struct NotificationEngine<D, N> {
    directory: Arc<D>,
    sink: Arc<N>,
    policy: NotificationPolicy,
}

impl<D, N> NotificationEngine<D, N>
where
    D: NotificationDirectory + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(directory: Arc<D>, sink: Arc<N>, policy: NotificationPolicy) -> Self {
        Self {
            directory,
            sink,
            policy,
        }
    }

    /// Dispatch notifications for `subject`. Repeated calls notify again.
    pub fn evaluate(
        &self,
        event: NotificationEvent,
        subject: &dyn NotificationSubject,
    ) -> Result<DispatchSummary, EngineError> {
        let rules = self.directory.rules_for(event)?;
        let users = self.directory.users()?;
        let plan = plan_notifications(event, &rules, &users, subject, &self.policy);

        let attempted = plan.drafts.len();
        let mut created = 0;
        for draft in plan.drafts {
            let user_id = draft.user_id.clone();
            match self.sink.create(draft) {
                Ok(()) => created += 1,
                Err(error) => warn!(%error, user = %user_id, "failed to create notification"),
            }
        }

        let entity = subject.entity();
        info!(
            event = event.label(),
            entity = %entity.entity_id,
            rules_matched = plan.rules_matched,
            created,
            "notification rules evaluated"
        );

        Ok(DispatchSummary {
            event,
            rules_evaluated: plan.rules_evaluated,
            rules_matched: plan.rules_matched,
            default_policy_applied: plan.default_policy_applied,
            attempted,
            created,
        })
    }
}
