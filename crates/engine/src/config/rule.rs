use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use mqwatch_common::severity::Severity;

/// Message template for one alert key, with the severity the alert carries
/// when the engine does not fix it structurally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub severity: Severity,
    pub text: String,
}

/// Fully merged monitoring policy for one queue. Immutable after
/// resolution; unset thresholds disable that check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueRule {
    pub max_depth: Option<u64>,
    pub warning_depth: Option<u64>,
    pub max_depth_percent: Option<f64>,
    pub warning_depth_percent: Option<f64>,
    pub required_consumers: Option<u32>,
    pub stuck_queue_warning: bool,
    pub messages: BTreeMap<String, MessageTemplate>,
}

/// Fully merged monitoring policy for one channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelRule {
    pub required_status: Option<String>,
    pub inactive_warning: bool,
    pub max_connections: Option<u64>,
    pub warning_connections: Option<u64>,
    pub messages: BTreeMap<String, MessageTemplate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectiveRule {
    Queue(QueueRule),
    Channel(ChannelRule),
}
