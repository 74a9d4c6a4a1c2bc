use mqwatch_common::check::CheckResult;
use mqwatch_common::object::ObjectId;
use mqwatch_common::severity::Severity;

use crate::broker::ChannelState;
use crate::config::ChannelRule;

use super::template::{fmt_count, lookup, render, RenderCtx};
use super::ChannelMetrics;

/// Grades one channel observation. Status checks and the connection-count
/// chain are independent; a channel in the wrong state with too many
/// connections reports both.
pub fn evaluate_channel(
    id: &ObjectId,
    m: &ChannelMetrics,
    rule: &ChannelRule,
    now_ms: i64,
) -> Vec<CheckResult> {
    let mut out = Vec::new();

    if let Some(required) = rule.required_status.as_deref() {
        if m.state.as_str() != required {
            let template = lookup(&rule.messages, "wrong_status");
            let ctx = RenderCtx {
                name: m.name.clone(),
                value: m.state.as_str().to_string(),
                limit: required.to_string(),
                percent: None,
            };
            out.push(CheckResult {
                object: id.clone(),
                severity: template.severity,
                alert_key: "wrong_status".into(),
                message: render(&template.text, &ctx),
                timestamp_ms: now_ms,
                value: None,
                limit: None,
                codes: None,
            });
        }
    }

    if rule.inactive_warning && m.state == ChannelState::Inactive {
        let template = lookup(&rule.messages, "inactive");
        let ctx = RenderCtx {
            name: m.name.clone(),
            value: m.state.as_str().to_string(),
            limit: String::new(),
            percent: None,
        };
        out.push(CheckResult {
            object: id.clone(),
            severity: template.severity,
            alert_key: "inactive".into(),
            message: render(&template.text, &ctx),
            timestamp_ms: now_ms,
            value: None,
            limit: None,
            codes: None,
        });
    }

    if let Some(alert) = connection_alert(id, m, rule, now_ms) {
        out.push(alert);
    }

    if out.is_empty() {
        out.push(CheckResult::ok(
            id.clone(),
            format!(
                "Channel {} is {} ({} connections)",
                m.name,
                m.state.as_str(),
                m.connections
            ),
            now_ms,
        ));
    }

    out
}

fn connection_alert(
    id: &ObjectId,
    m: &ChannelMetrics,
    rule: &ChannelRule,
    now_ms: i64,
) -> Option<CheckResult> {
    let critical = rule.max_connections.is_some_and(|limit| m.connections >= limit);
    let warning = rule
        .warning_connections
        .is_some_and(|limit| m.connections >= limit);

    let (severity, alert_key, limit) = if critical {
        (
            Severity::Critical,
            "max_connections",
            rule.max_connections.unwrap_or(0),
        )
    } else if warning {
        (
            Severity::Warning,
            "high_connections",
            rule.warning_connections.unwrap_or(0),
        )
    } else {
        return None;
    };

    let template = lookup(&rule.messages, alert_key);
    let ctx = RenderCtx {
        name: m.name.clone(),
        value: fmt_count(m.connections),
        limit: fmt_count(limit),
        percent: None,
    };
    Some(CheckResult {
        object: id.clone(),
        severity,
        alert_key: alert_key.into(),
        message: render(&template.text, &ctx),
        timestamp_ms: now_ms,
        value: Some(m.connections as f64),
        limit: Some(limit as f64),
        codes: None,
    })
}
