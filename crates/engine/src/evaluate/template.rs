use std::collections::BTreeMap;

use mqwatch_common::severity::Severity;

use crate::config::MessageTemplate;

/// Values substituted into a message template. All pre-formatted; the
/// template layer never does numeric formatting of its own beyond this.
#[derive(Debug, Clone)]
pub struct RenderCtx {
    pub name: String,
    pub value: String,
    pub limit: String,
    pub percent: Option<String>,
}

/// Template for `key`, falling back to the built-in default so no alert is
/// ever silently textless.
pub fn lookup(messages: &BTreeMap<String, MessageTemplate>, key: &str) -> MessageTemplate {
    messages.get(key).cloned().unwrap_or_else(|| builtin(key))
}

pub fn render(text: &str, ctx: &RenderCtx) -> String {
    text.replace("{name}", &ctx.name)
        .replace("{value}", &ctx.value)
        .replace("{limit}", &ctx.limit)
        .replace("{percent}", ctx.percent.as_deref().unwrap_or(""))
}

pub fn fmt_count(v: u64) -> String {
    v.to_string()
}

pub fn fmt_percent(v: f64) -> String {
    format!("{v:.1}")
}

fn builtin(key: &str) -> MessageTemplate {
    let (severity, text) = match key {
        "max_depth" => (
            Severity::Critical,
            "Queue {name} depth {value} exceeds maximum {limit}",
        ),
        "high_depth" => (
            Severity::Warning,
            "Queue {name} depth {value} exceeds warning level {limit}",
        ),
        "max_depth_percent" => (
            Severity::Critical,
            "Queue {name} is {percent}% full, over maximum {limit}%",
        ),
        "high_depth_percent" => (
            Severity::Warning,
            "Queue {name} is {percent}% full, over warning level {limit}%",
        ),
        "no_consumers" => (
            Severity::Warning,
            "Queue {name} has {value} consumers, requires at least {limit}",
        ),
        "stuck_messages" => (
            Severity::Warning,
            "Queue {name} holds {value} messages but has no active consumers",
        ),
        "wrong_status" => (
            Severity::Warning,
            "Channel {name} is {value}, required {limit}",
        ),
        "inactive" => (Severity::Warning, "Channel {name} is inactive"),
        "max_connections" => (
            Severity::Critical,
            "Channel {name} has {value} connections, maximum {limit}",
        ),
        "high_connections" => (
            Severity::Warning,
            "Channel {name} has {value} connections, warning level {limit}",
        ),
        _ => (
            Severity::Warning,
            "{name}: observed {value} against limit {limit}",
        ),
    };
    MessageTemplate {
        severity,
        text: text.to_string(),
    }
}
