//! Rule-driven notifications for newly created incidents and alerts.

pub mod conditions;
pub mod domain;
pub mod engine;
pub mod router;
pub mod template;

#[cfg(test)]
mod tests;

pub use conditions::conditions_match;
pub use domain::{
    EntityRef, NotificationActions, NotificationConditions, NotificationDraft, NotificationEvent,
    NotificationRule, NotificationSubject, NotificationType, UserRecord, UserRole,
};
pub use engine::{
    plan_notifications, DispatchError, DispatchSummary, NotificationDirectory, NotificationEngine,
    NotificationPlan, NotificationPolicy, NotificationSink,
};
pub use router::{notification_router, threshold_router, AlertingState};
pub use template::render_template;
