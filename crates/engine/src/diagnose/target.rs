use mqwatch_common::object::{ObjectId, ObjectKind};
use mqwatch_common::pattern::ObjectPattern;

use crate::broker::{ConnectParams, Credentials, TlsSpec};
use crate::config::MonitorDocument;

/// One queue-manager instance to diagnose, fully merged from server-level
/// and instance-level configuration. Immutable for the life of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub server: String,
    pub host: String,
    pub port: u16,
    pub qmgr: String,
    pub channel: String,
    pub credentials: Option<Credentials>,
    pub tls: Option<TlsSpec>,
    pub queues: ObjectPattern,
    pub channels: ObjectPattern,
}

impl Target {
    pub fn connect_params(&self) -> ConnectParams {
        ConnectParams {
            host: self.host.clone(),
            port: self.port,
            channel: self.channel.clone(),
            qmgr: self.qmgr.clone(),
            credentials: self.credentials.clone(),
            tls: self.tls.clone(),
        }
    }

    /// Identity the manager-level results are filed under.
    pub fn manager_id(&self) -> ObjectId {
        ObjectId::new(&self.server, &self.qmgr, ObjectKind::QueueManager, &self.qmgr)
    }
}

/// Flattens the configured server tree into per-instance targets. The
/// instance overrides the server port when it carries its own; credentials
/// require both user and password; a TLS spec is built only when `ssl` is
/// set, with the platform key repository as the fallback path.
pub fn build_targets(doc: &MonitorDocument) -> Vec<Target> {
    let mut out = Vec::new();
    for server in &doc.mq_servers {
        for qm in &server.queue_managers {
            let credentials = match (&qm.user, &qm.password) {
                (Some(user), Some(password)) => Some(Credentials {
                    user: user.clone(),
                    password: password.clone(),
                }),
                _ => None,
            };
            let tls = if qm.ssl {
                qm.ssl_config.as_ref().map(|ssl| TlsSpec {
                    cipher_spec: ssl.cipher_spec.clone(),
                    key_repository: ssl
                        .key_repository
                        .clone()
                        .unwrap_or_else(|| doc.platform_specific.unix.ssl_key_repository.clone()),
                })
            } else {
                None
            };
            out.push(Target {
                server: server.name.clone(),
                host: server.host.clone(),
                port: qm.port.unwrap_or(server.port),
                qmgr: qm.name.clone(),
                channel: qm.channel.clone(),
                credentials,
                tls,
                queues: qm.queues_to_monitor.clone(),
                channels: qm.channels_to_monitor.clone(),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::from_str;

    const DOC: &str = r#"
platform_specific:
  unix:
    ssl_key_repository: /var/mqm/ssl/key
mq_servers:
  - name: prod-mq-01
    host: mq01.example.net
    port: 1414
    queue_managers:
      - name: QM1
        channel: MON.SVRCONN
        user: mqmon
        password: secret
        queues_to_monitor:
          - "APP.*"
      - name: QM2
        channel: MON.SVRCONN
        port: 1415
        ssl: true
        ssl_config:
          cipher_spec: TLS_RSA_WITH_AES_256_CBC_SHA256
"#;

    #[test]
    fn flattens_servers_into_one_target_per_instance() {
        let doc = from_str(DOC).unwrap();
        let targets = build_targets(&doc);
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].server, "prod-mq-01");
        assert_eq!(targets[0].qmgr, "QM1");
        assert_eq!(targets[1].qmgr, "QM2");
    }

    #[test]
    fn instance_port_overrides_server_port() {
        let doc = from_str(DOC).unwrap();
        let targets = build_targets(&doc);
        assert_eq!(targets[0].port, 1414);
        assert_eq!(targets[1].port, 1415);
    }

    #[test]
    fn credentials_require_both_user_and_password() {
        let doc = from_str(DOC).unwrap();
        let targets = build_targets(&doc);
        assert_eq!(targets[0].credentials.as_ref().map(|c| c.user.as_str()), Some("mqmon"));
        assert!(targets[1].credentials.is_none());
    }

    #[test]
    fn tls_spec_falls_back_to_platform_key_repository() {
        let doc = from_str(DOC).unwrap();
        let targets = build_targets(&doc);
        assert!(targets[0].tls.is_none());
        let tls = targets[1].tls.as_ref().unwrap();
        assert_eq!(tls.cipher_spec, "TLS_RSA_WITH_AES_256_CBC_SHA256");
        assert_eq!(tls.key_repository, "/var/mqm/ssl/key");
    }

    #[test]
    fn connect_params_mirror_the_target() {
        let doc = from_str(DOC).unwrap();
        let params = build_targets(&doc)[1].connect_params();
        assert_eq!(params.host, "mq01.example.net");
        assert_eq!(params.port, 1415);
        assert_eq!(params.qmgr, "QM2");
        assert!(params.tls.is_some());
    }
}
