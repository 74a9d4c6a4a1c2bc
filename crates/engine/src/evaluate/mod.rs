mod channel;
mod queue;
mod template;

pub use channel::evaluate_channel;
pub use queue::evaluate_queue;
pub use template::{render, RenderCtx};

use mqwatch_common::check::CheckResult;
use mqwatch_common::object::ObjectId;

use crate::broker::{ChannelState, ChannelStatus, QueueStatus};
use crate::config::EffectiveRule;

/// One observation about one object, produced and consumed within a single
/// diagnostic pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Metric {
    Queue(QueueMetrics),
    Channel(ChannelMetrics),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueueMetrics {
    pub name: String,
    pub depth: u64,
    pub max_depth: u64,
    pub open_input: u32,
}

impl From<&QueueStatus> for QueueMetrics {
    fn from(s: &QueueStatus) -> Self {
        Self {
            name: s.name.clone(),
            depth: s.depth,
            max_depth: s.max_depth,
            open_input: s.open_input,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMetrics {
    pub name: String,
    pub state: ChannelState,
    pub connections: u64,
}

impl From<&ChannelStatus> for ChannelMetrics {
    fn from(s: &ChannelStatus) -> Self {
        Self {
            name: s.name.clone(),
            state: s.state,
            connections: s.connections,
        }
    }
}

/// Grades one metric against its resolved rule. Total: a metric/rule shape
/// mismatch yields a single UNKNOWN result instead of an error, so one odd
/// record can never take down a run.
pub fn evaluate(
    id: &ObjectId,
    metric: &Metric,
    rule: &EffectiveRule,
    now_ms: i64,
) -> Vec<CheckResult> {
    match (metric, rule) {
        (Metric::Queue(m), EffectiveRule::Queue(r)) => evaluate_queue(id, m, r, now_ms),
        (Metric::Channel(m), EffectiveRule::Channel(r)) => evaluate_channel(id, m, r, now_ms),
        _ => vec![CheckResult::unknown(
            id.clone(),
            format!("metric shape does not match the resolved rule for {id}"),
            now_ms,
            None,
        )],
    }
}
