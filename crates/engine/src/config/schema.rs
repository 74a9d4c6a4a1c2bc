use std::collections::BTreeMap;

use serde::Deserialize;

use mqwatch_common::pattern::ObjectPattern;

use super::error::ConfigError;

/// In-memory form of the monitoring configuration document. How the YAML
/// text reaches the process (file, env, stdin) is the host's concern; the
/// engine only parses and validates it. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorDocument {
    pub global: GlobalSection,
    pub platform_specific: PlatformSection,
    pub mq_servers: Vec<ServerConfig>,
    pub output: OutputSection,
    pub channels_monitoring: MonitoringSection,
    pub queues_monitoring: MonitoringSection,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GlobalSection {
    pub encoding: String,
    /// Upper bound for any single connect or administrative query.
    pub connect_timeout_secs: u64,
    /// Thresholds at this level apply to every object kind before the
    /// kind-level `global` sections refine them.
    #[serde(flatten)]
    pub monitoring: RuleSection,
}

impl Default for GlobalSection {
    fn default() -> Self {
        Self {
            encoding: "utf-8".into(),
            connect_timeout_secs: 10,
            monitoring: RuleSection::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlatformSection {
    pub unix: PlatformPaths,
    pub windows: PlatformPaths,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlatformPaths {
    pub log_dir: String,
    pub ssl_key_repository: String,
}

impl Default for PlatformPaths {
    fn default() -> Self {
        Self {
            log_dir: "/var/log/mqwatch".into(),
            ssl_key_repository: "/var/mqm/ssl/key".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub queue_managers: Vec<QueueManagerConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct QueueManagerConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub channel: String,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub ssl: bool,
    pub ssl_config: Option<SslConfig>,
    #[serde(default)]
    pub queues_to_monitor: ObjectPattern,
    #[serde(default)]
    pub channels_to_monitor: ObjectPattern,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SslConfig {
    #[serde(default)]
    pub cipher_spec: String,
    pub key_repository: Option<String>,
}

/// Parsed and tolerated; rendering itself lives outside the engine.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputSection {
    pub format: String,
    pub colored: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: "console".into(),
            colored: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitoringSection {
    pub global: RuleSection,
    /// Keyed by exact object name or a `*` glob. Exact entries beat glob
    /// entries; among globs the one with the most literal characters wins.
    pub specific: BTreeMap<String, RuleSection>,
}

/// One raw configuration layer. Every field optional; unset fields inherit
/// from the previous layer during resolution.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuleSection {
    pub max_depth: Option<u64>,
    pub warning_depth: Option<u64>,
    pub max_depth_percent: Option<f64>,
    pub warning_depth_percent: Option<f64>,
    pub required_consumers: Option<u32>,
    pub stuck_queue_warning: Option<bool>,
    pub required_status: Option<String>,
    pub inactive_warning: Option<bool>,
    pub max_connections: Option<u64>,
    pub warning_connections: Option<u64>,
    pub messages: BTreeMap<String, MessageSpec>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MessageSpec {
    pub severity: String,
    pub text: String,
}

fn default_port() -> u16 {
    1414
}

/// Parses and structurally validates a document. Severity literals are
/// checked later when the resolver is built, so a document that parses here
/// can still fail resolution.
pub fn from_str(yaml: &str) -> Result<MonitorDocument, ConfigError> {
    let doc: MonitorDocument = serde_yaml::from_str(yaml)?;
    validate(&doc)?;
    Ok(doc)
}

pub fn validate(doc: &MonitorDocument) -> Result<(), ConfigError> {
    const FORMATS: [&str; 4] = ["console", "json", "csv", "table"];
    if !FORMATS.contains(&doc.output.format.as_str()) {
        return Err(ConfigError::Validation(format!(
            "output.format '{}' is not one of console, json, csv, table",
            doc.output.format
        )));
    }
    if doc.global.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "global.connect_timeout_secs must be > 0".into(),
        ));
    }
    for server in &doc.mq_servers {
        if server.name.is_empty() {
            return Err(ConfigError::Validation("server name must not be empty".into()));
        }
        if server.host.is_empty() {
            return Err(ConfigError::Validation(format!(
                "server '{}' is missing a host",
                server.name
            )));
        }
        if server.port == 0 {
            return Err(ConfigError::Validation(format!(
                "server '{}' has port 0",
                server.name
            )));
        }
        for qm in &server.queue_managers {
            if qm.name.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "server '{}' has a queue manager without a name",
                    server.name
                )));
            }
            if qm.channel.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "queue manager '{}' on server '{}' is missing a channel",
                    qm.name, server.name
                )));
            }
            if qm.ssl && qm.ssl_config.is_none() {
                return Err(ConfigError::Validation(format!(
                    "queue manager '{}' enables ssl without an ssl_config",
                    qm.name
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
global:
  connect_timeout_secs: 5
  warning_depth_percent: 75
platform_specific:
  unix:
    log_dir: /var/log/mqwatch
    ssl_key_repository: /var/mqm/ssl/key
mq_servers:
  - name: prod-mq-01
    host: mq01.example.com
    port: 1414
    queue_managers:
      - name: QM1
        channel: MONITOR.SVRCONN
        user: mqmon
        password: secret
        queues_to_monitor:
          - "APP.*"
          - "!APP.TMP.*"
        channels_to_monitor:
          - "APP.SVRCONN"
output:
  format: table
channels_monitoring:
  global:
    required_status: RUNNING
    inactive_warning: true
queues_monitoring:
  global:
    max_depth: 10000
    warning_depth: 5000
  specific:
    "SYSTEM.*":
      stuck_queue_warning: false
    "APP.BATCH.QUEUE":
      max_depth_percent: 90
      messages:
        max_depth_percent:
          severity: CRITICAL
          text: "Batch backlog on {name}: {percent}% of capacity"
"#;

    #[test]
    fn parses_full_document() {
        let doc = from_str(SAMPLE).unwrap();
        assert_eq!(doc.mq_servers.len(), 1);
        let qm = &doc.mq_servers[0].queue_managers[0];
        assert_eq!(qm.name, "QM1");
        assert_eq!(qm.queues_to_monitor.tokens(), ["APP.*", "!APP.TMP.*"]);
        assert_eq!(doc.global.monitoring.warning_depth_percent, Some(75.0));
        assert_eq!(
            doc.queues_monitoring.specific["APP.BATCH.QUEUE"].max_depth_percent,
            Some(90.0)
        );
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let doc = from_str("global:\n  some_future_knob: 3\nmq_servers: []\n").unwrap();
        assert!(doc.mq_servers.is_empty());
    }

    #[test]
    fn bad_output_format_rejected() {
        let err = from_str("output:\n  format: xml\n").unwrap_err();
        assert!(err.to_string().contains("output.format"));
    }

    #[test]
    fn server_without_host_rejected() {
        let yaml = "mq_servers:\n  - name: s1\n    queue_managers: []\n";
        let err = from_str(yaml).unwrap_err();
        assert!(err.to_string().contains("missing a host"));
    }

    #[test]
    fn qm_without_channel_rejected() {
        let yaml = r#"
mq_servers:
  - name: s1
    host: h
    queue_managers:
      - name: QM1
"#;
        let err = from_str(yaml).unwrap_err();
        assert!(err.to_string().contains("missing a channel"));
    }

    #[test]
    fn ssl_requires_ssl_config() {
        let yaml = r#"
mq_servers:
  - name: s1
    host: h
    queue_managers:
      - name: QM1
        channel: C
        ssl: true
"#;
        let err = from_str(yaml).unwrap_err();
        assert!(err.to_string().contains("ssl_config"));
    }

    #[test]
    fn defaults_applied() {
        let doc = from_str("mq_servers: []\n").unwrap();
        assert_eq!(doc.global.connect_timeout_secs, 10);
        assert_eq!(doc.output.format, "console");
        assert_eq!(doc.platform_specific.unix.ssl_key_repository, "/var/mqm/ssl/key");
    }
}
