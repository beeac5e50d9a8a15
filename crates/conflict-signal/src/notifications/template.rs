use super::domain::NotificationSubject;

/// Replace `{{field}}` placeholders with subject values; unknown fields render empty.
pub fn render_template(template: &str, subject: &dyn NotificationSubject) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        let Some(close) = rest[open + 2..].find("}}") else {
            break;
        };
        rendered.push_str(&rest[..open]);
        let name = rest[open + 2..open + 2 + close].trim();
        if let Some(value) = subject.field(name) {
            rendered.push_str(&value);
        }
        rest = &rest[open + 2 + close + 2..];
    }

    rendered.push_str(rest);
    rendered
}
