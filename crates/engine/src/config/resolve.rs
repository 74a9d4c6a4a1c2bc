use std::collections::BTreeMap;

use mqwatch_common::object::ObjectKind;
use mqwatch_common::pattern::glob_match;
use mqwatch_common::severity::Severity;

use super::error::ConfigError;
use super::rule::{ChannelRule, EffectiveRule, MessageTemplate, QueueRule};
use super::schema::{MonitorDocument, RuleSection};

/// Layered configuration resolver. Built once per document; `resolve_*` is
/// a pure function of the stored layers, so resolving the same object twice
/// yields value-equal rules.
///
/// Merge order, later wins: built-in defaults, top-level `global`,
/// object-kind `global`, `specific` glob entries (least literal first, so
/// the most specific glob lands last), `specific` exact-name entry.
/// Message templates merge per key.
#[derive(Debug)]
pub struct Resolver {
    queues: KindLayers,
    channels: KindLayers,
}

#[derive(Debug)]
struct KindLayers {
    global: Layer,
    kind_global: Layer,
    exact: BTreeMap<String, Layer>,
    globs: Vec<(String, Layer)>,
}

/// One raw section with its severity literals already validated.
#[derive(Debug, Clone, Default)]
struct Layer {
    section: RuleSection,
    messages: BTreeMap<String, MessageTemplate>,
}

impl Resolver {
    pub fn from_document(doc: &MonitorDocument) -> Result<Self, ConfigError> {
        let global = Layer::parse("global", &doc.global.monitoring)?;
        Ok(Self {
            queues: KindLayers::build(
                global.clone(),
                "queues_monitoring",
                &doc.queues_monitoring.global,
                &doc.queues_monitoring.specific,
            )?,
            channels: KindLayers::build(
                global,
                "channels_monitoring",
                &doc.channels_monitoring.global,
                &doc.channels_monitoring.specific,
            )?,
        })
    }

    pub fn resolve_queue(&self, name: &str) -> QueueRule {
        let mut rule = QueueRule::default();
        for layer in self.queues.matching(name) {
            apply_queue(&mut rule, layer);
        }
        rule
    }

    pub fn resolve_channel(&self, name: &str) -> ChannelRule {
        let mut rule = ChannelRule::default();
        for layer in self.channels.matching(name) {
            apply_channel(&mut rule, layer);
        }
        rule
    }

    /// Kind-dispatched form of the contract. Queue managers carry no
    /// threshold policy, so they resolve to nothing.
    pub fn resolve(&self, kind: ObjectKind, name: &str) -> Option<EffectiveRule> {
        match kind {
            ObjectKind::Queue => Some(EffectiveRule::Queue(self.resolve_queue(name))),
            ObjectKind::Channel => Some(EffectiveRule::Channel(self.resolve_channel(name))),
            ObjectKind::QueueManager => None,
        }
    }
}

impl KindLayers {
    fn build(
        global: Layer,
        section_name: &str,
        kind_global: &RuleSection,
        specific: &BTreeMap<String, RuleSection>,
    ) -> Result<Self, ConfigError> {
        let kind_global = Layer::parse(&format!("{section_name}.global"), kind_global)?;

        let mut exact = BTreeMap::new();
        let mut globs = Vec::new();
        for (key, section) in specific {
            let layer = Layer::parse(&format!("{section_name}.specific.{key}"), section)?;
            if key.contains('*') {
                globs.push((key.clone(), layer));
            } else {
                exact.insert(key.clone(), layer);
            }
        }
        // Broadest glob first so narrower globs override it.
        globs.sort_by_key(|(key, _)| (literal_chars(key), key.clone()));

        Ok(Self {
            global,
            kind_global,
            exact,
            globs,
        })
    }

    fn matching<'a>(&'a self, name: &str) -> Vec<&'a Layer> {
        let mut layers = vec![&self.global, &self.kind_global];
        for (glob, layer) in &self.globs {
            if glob_match(glob, name) {
                layers.push(layer);
            }
        }
        if let Some(layer) = self.exact.get(name) {
            layers.push(layer);
        }
        layers
    }
}

impl Layer {
    fn parse(section: &str, raw: &RuleSection) -> Result<Self, ConfigError> {
        let mut messages = BTreeMap::new();
        for (key, spec) in &raw.messages {
            let severity = Severity::parse(&spec.severity).ok_or_else(|| {
                ConfigError::UnknownSeverity {
                    section: section.to_string(),
                    key: key.clone(),
                    literal: spec.severity.clone(),
                }
            })?;
            messages.insert(
                key.clone(),
                MessageTemplate {
                    severity,
                    text: spec.text.clone(),
                },
            );
        }
        Ok(Self {
            section: raw.clone(),
            messages,
        })
    }
}

fn apply_queue(rule: &mut QueueRule, layer: &Layer) {
    let s = &layer.section;
    if s.max_depth.is_some() {
        rule.max_depth = s.max_depth;
    }
    if s.warning_depth.is_some() {
        rule.warning_depth = s.warning_depth;
    }
    if s.max_depth_percent.is_some() {
        rule.max_depth_percent = s.max_depth_percent;
    }
    if s.warning_depth_percent.is_some() {
        rule.warning_depth_percent = s.warning_depth_percent;
    }
    if s.required_consumers.is_some() {
        rule.required_consumers = s.required_consumers;
    }
    if let Some(v) = s.stuck_queue_warning {
        rule.stuck_queue_warning = v;
    }
    merge_messages(&mut rule.messages, &layer.messages);
}

fn apply_channel(rule: &mut ChannelRule, layer: &Layer) {
    let s = &layer.section;
    if s.required_status.is_some() {
        rule.required_status = s.required_status.clone();
    }
    if let Some(v) = s.inactive_warning {
        rule.inactive_warning = v;
    }
    if s.max_connections.is_some() {
        rule.max_connections = s.max_connections;
    }
    if s.warning_connections.is_some() {
        rule.warning_connections = s.warning_connections;
    }
    merge_messages(&mut rule.messages, &layer.messages);
}

/// Per-key merge: overriding one alert key keeps the parent's siblings.
fn merge_messages(
    into: &mut BTreeMap<String, MessageTemplate>,
    from: &BTreeMap<String, MessageTemplate>,
) {
    for (key, template) in from {
        into.insert(key.clone(), template.clone());
    }
}

fn literal_chars(glob: &str) -> usize {
    glob.chars().filter(|c| *c != '*').count()
}
