use mqwatch_common::check::CheckResult;
use mqwatch_common::object::ObjectId;
use mqwatch_common::severity::Severity;

use crate::config::QueueRule;

use super::template::{fmt_count, fmt_percent, lookup, render, RenderCtx};
use super::QueueMetrics;

/// Grades one queue observation. Depth is a single precedence chain
/// (critical beats warning, absolute and percentage thresholds feed the
/// same chain); the consumer and stuck checks are independent and
/// additive, so one queue can produce several results. No triggered alert
/// means exactly one OK result.
pub fn evaluate_queue(
    id: &ObjectId,
    m: &QueueMetrics,
    rule: &QueueRule,
    now_ms: i64,
) -> Vec<CheckResult> {
    let mut out = Vec::new();

    let percent = if m.max_depth > 0 {
        Some(m.depth as f64 / m.max_depth as f64 * 100.0)
    } else {
        None
    };

    if let Some(alert) = depth_alert(id, m, rule, percent, now_ms) {
        out.push(alert);
    }

    if let Some(required) = rule.required_consumers {
        if m.open_input < required {
            let template = lookup(&rule.messages, "no_consumers");
            let ctx = RenderCtx {
                name: m.name.clone(),
                value: fmt_count(m.open_input as u64),
                limit: fmt_count(required as u64),
                percent: None,
            };
            out.push(CheckResult {
                object: id.clone(),
                severity: template.severity,
                alert_key: "no_consumers".into(),
                message: render(&template.text, &ctx),
                timestamp_ms: now_ms,
                value: Some(m.open_input as f64),
                limit: Some(required as f64),
                codes: None,
            });
        }
    }

    if rule.stuck_queue_warning && m.depth > 0 && m.open_input == 0 {
        let template = lookup(&rule.messages, "stuck_messages");
        let ctx = RenderCtx {
            name: m.name.clone(),
            value: fmt_count(m.depth),
            limit: String::new(),
            percent: None,
        };
        out.push(CheckResult {
            object: id.clone(),
            severity: template.severity,
            alert_key: "stuck_messages".into(),
            message: render(&template.text, &ctx),
            timestamp_ms: now_ms,
            value: Some(m.depth as f64),
            limit: None,
            codes: None,
        });
    }

    if out.is_empty() {
        out.push(CheckResult::ok(
            id.clone(),
            format!(
                "Queue {} depth {}/{}, consumers {}",
                m.name, m.depth, m.max_depth, m.open_input
            ),
            now_ms,
        ));
    }

    out
}

fn depth_alert(
    id: &ObjectId,
    m: &QueueMetrics,
    rule: &QueueRule,
    percent: Option<f64>,
    now_ms: i64,
) -> Option<CheckResult> {
    let abs_critical = rule.max_depth.is_some_and(|limit| m.depth >= limit);
    let pct_critical = match (percent, rule.max_depth_percent) {
        (Some(p), Some(limit)) => p >= limit,
        _ => false,
    };
    let abs_warning = rule.warning_depth.is_some_and(|limit| m.depth >= limit);
    let pct_warning = match (percent, rule.warning_depth_percent) {
        (Some(p), Some(limit)) => p >= limit,
        _ => false,
    };

    let (severity, critical, absolute) = if abs_critical || pct_critical {
        (Severity::Critical, true, abs_critical)
    } else if abs_warning || pct_warning {
        (Severity::Warning, false, abs_warning)
    } else {
        return None;
    };

    // The absolute threshold names the alert when both forms trip at the
    // same grade.
    let (alert_key, value, limit, ctx) = if absolute {
        let limit = if critical {
            rule.max_depth.unwrap_or(0)
        } else {
            rule.warning_depth.unwrap_or(0)
        };
        (
            if critical { "max_depth" } else { "high_depth" },
            m.depth as f64,
            limit as f64,
            RenderCtx {
                name: m.name.clone(),
                value: fmt_count(m.depth),
                limit: fmt_count(limit),
                percent: percent.map(fmt_percent),
            },
        )
    } else {
        let p = percent.unwrap_or(0.0);
        let limit = if critical {
            rule.max_depth_percent.unwrap_or(0.0)
        } else {
            rule.warning_depth_percent.unwrap_or(0.0)
        };
        (
            if critical {
                "max_depth_percent"
            } else {
                "high_depth_percent"
            },
            p,
            limit,
            RenderCtx {
                name: m.name.clone(),
                value: fmt_percent(p),
                limit: fmt_percent(limit),
                percent: Some(fmt_percent(p)),
            },
        )
    };

    let template = lookup(&rule.messages, alert_key);
    Some(CheckResult {
        object: id.clone(),
        severity,
        alert_key: alert_key.into(),
        message: render(&template.text, &ctx),
        timestamp_ms: now_ms,
        value: Some(value),
        limit: Some(limit),
        codes: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mqwatch_common::object::ObjectKind;

    fn id() -> ObjectId {
        ObjectId::new("srv", "QM1", ObjectKind::Queue, "APP.A")
    }

    fn metrics(depth: u64, max_depth: u64, open_input: u32) -> QueueMetrics {
        QueueMetrics {
            name: "APP.A".into(),
            depth,
            max_depth,
            open_input,
        }
    }

    fn rule() -> QueueRule {
        QueueRule {
            max_depth: Some(100),
            warning_depth: Some(50),
            ..Default::default()
        }
    }

    #[test]
    fn depth_partition_ok_warning_critical() {
        let r = rule();
        for (depth, expected) in [
            (0, Severity::Ok),
            (49, Severity::Ok),
            (50, Severity::Warning),
            (99, Severity::Warning),
            (100, Severity::Critical),
            (500, Severity::Critical),
        ] {
            let out = evaluate_queue(&id(), &metrics(depth, 1000, 1), &r, 1);
            assert_eq!(out[0].severity, expected, "depth {depth}");
        }
    }

    #[test]
    fn percentage_partition() {
        let r = QueueRule {
            max_depth_percent: Some(90.0),
            warning_depth_percent: Some(70.0),
            ..Default::default()
        };
        for (depth, expected) in [
            (69, Severity::Ok),
            (70, Severity::Warning),
            (89, Severity::Warning),
            (90, Severity::Critical),
        ] {
            let out = evaluate_queue(&id(), &metrics(depth, 100, 1), &r, 1);
            assert_eq!(out[0].severity, expected, "depth {depth}");
        }
    }

    #[test]
    fn percent_critical_beats_absolute_warning() {
        // 9200 of 10000 is 92%: below the absolute max but over the
        // percentage ceiling, so the chain lands on CRITICAL.
        let r = QueueRule {
            max_depth: Some(10000),
            warning_depth: Some(5000),
            max_depth_percent: Some(90.0),
            ..Default::default()
        };
        let out = evaluate_queue(&id(), &metrics(9200, 10000, 1), &r, 1);
        assert_eq!(out[0].severity, Severity::Critical);
        assert_eq!(out[0].alert_key, "max_depth_percent");
        assert_eq!(out[0].value, Some(92.0));
    }

    #[test]
    fn percentage_skipped_when_max_depth_zero() {
        let r = QueueRule {
            max_depth_percent: Some(90.0),
            ..Default::default()
        };
        let out = evaluate_queue(&id(), &metrics(10, 0, 1), &r, 1);
        assert_eq!(out[0].severity, Severity::Ok);
    }

    #[test]
    fn stuck_alert_is_additive_to_depth_alert() {
        let r = QueueRule {
            warning_depth: Some(50),
            stuck_queue_warning: true,
            ..Default::default()
        };
        let out = evaluate_queue(&id(), &metrics(60, 1000, 0), &r, 1);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].alert_key, "high_depth");
        assert_eq!(out[1].alert_key, "stuck_messages");
        assert_eq!(out[1].severity, Severity::Warning);
    }

    #[test]
    fn stuck_alone_when_no_depth_threshold_breached() {
        let r = QueueRule {
            warning_depth: Some(50),
            stuck_queue_warning: true,
            ..Default::default()
        };
        let out = evaluate_queue(&id(), &metrics(3, 1000, 0), &r, 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].alert_key, "stuck_messages");
    }

    #[test]
    fn no_stuck_alert_when_disabled() {
        let r = QueueRule::default();
        let out = evaluate_queue(&id(), &metrics(3, 1000, 0), &r, 1);
        assert_eq!(out[0].severity, Severity::Ok);
    }

    #[test]
    fn consumer_shortfall_warns_by_default() {
        let r = QueueRule {
            required_consumers: Some(2),
            ..Default::default()
        };
        let out = evaluate_queue(&id(), &metrics(0, 1000, 1), &r, 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].alert_key, "no_consumers");
        assert_eq!(out[0].severity, Severity::Warning);
        assert!(out[0].message.contains('1'));
    }

    #[test]
    fn consumer_severity_can_be_overridden_to_ok() {
        use crate::config::MessageTemplate;
        let mut r = QueueRule {
            required_consumers: Some(1),
            ..Default::default()
        };
        r.messages.insert(
            "no_consumers".into(),
            MessageTemplate {
                severity: Severity::Ok,
                text: "Event queue {name} has no consumers by design".into(),
            },
        );
        let out = evaluate_queue(&id(), &metrics(0, 1000, 0), &r, 1);
        assert_eq!(out[0].severity, Severity::Ok);
        assert!(out[0].message.contains("by design"));
    }

    #[test]
    fn configured_template_renders_placeholders() {
        use crate::config::MessageTemplate;
        let mut r = QueueRule {
            max_depth: Some(100),
            ..Default::default()
        };
        r.messages.insert(
            "max_depth".into(),
            MessageTemplate {
                severity: Severity::Critical,
                text: "{name} full: {value}/{limit}".into(),
            },
        );
        let out = evaluate_queue(&id(), &metrics(150, 1000, 1), &r, 1);
        assert_eq!(out[0].message, "APP.A full: 150/100");
    }

    #[test]
    fn healthy_queue_yields_single_ok() {
        let out = evaluate_queue(&id(), &metrics(5, 1000, 2), &rule(), 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].severity, Severity::Ok);
        assert_eq!(out[0].alert_key, "ok");
    }
}
