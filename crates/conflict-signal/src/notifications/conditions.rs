use super::domain::{NotificationConditions, NotificationSubject};

/// Whether `subject` satisfies every present condition. No conditions always match.
pub fn conditions_match(
    conditions: Option<&NotificationConditions>,
    subject: &dyn NotificationSubject,
) -> bool {
    let Some(conditions) = conditions else {
        return true;
    };

    let lists = [
        ("severity", &conditions.severity_in),
        ("region", &conditions.region_in),
        ("category", &conditions.category_in),
        ("source", &conditions.source_in),
    ];
    for (field, allowed) in lists {
        let Some(allowed) = allowed.as_ref().filter(|allowed| !allowed.is_empty()) else {
            continue;
        };
        let Some(value) = subject.field(field) else {
            return false;
        };
        if !allowed
            .iter()
            .any(|candidate| candidate.trim().eq_ignore_ascii_case(&value))
        {
            return false;
        }
    }

    match conditions.escalation_level_gte {
        Some(minimum) => subject.escalation_level().unwrap_or(0) >= minimum,
        None => true,
    }
}
