use std::time::Duration;

use mqwatch_common::codes::{reason, CodePair};

use crate::broker::{
    Broker, BrokerHandle, ConnectParams, ConnectionErrorKind, ConnectionFailure,
};
use crate::diagnose::Target;

/// A resolved, live connection. `codes` is the collaborator's pair for the
/// attempt that produced the handle; after an auth fallback it keeps the
/// rejected first attempt's pair so operators can see why credentials were
/// dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub handle: BrokerHandle,
    pub used_fallback: bool,
    pub codes: CodePair,
}

/// Connection establishment policy: authenticated attempt first, exactly
/// one automatic no-auth retry on an auth-class rejection, TLS negotiated
/// on the first attempt only, every attempt bounded by `timeout`.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionResolver {
    pub timeout: Duration,
}

impl ConnectionResolver {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn connect(
        &self,
        broker: &dyn Broker,
        target: &Target,
    ) -> Result<Connection, ConnectionFailure> {
        let params = target.connect_params();
        match self.attempt(broker, &params).await {
            Ok(handle) => Ok(Connection {
                handle,
                used_fallback: false,
                codes: CodePair::ok(),
            }),
            Err(first)
                if first.kind == ConnectionErrorKind::Auth && params.credentials.is_some() =>
            {
                tracing::warn!(
                    qmgr = %target.qmgr,
                    codes = %first.codes,
                    "authenticated connect rejected, retrying without credentials"
                );
                let bare = ConnectParams {
                    credentials: None,
                    tls: None,
                    ..params
                };
                let handle = self.attempt(broker, &bare).await?;
                Ok(Connection {
                    handle,
                    used_fallback: true,
                    codes: first.codes,
                })
            }
            Err(failure) => Err(failure),
        }
    }

    async fn attempt(
        &self,
        broker: &dyn Broker,
        params: &ConnectParams,
    ) -> Result<BrokerHandle, ConnectionFailure> {
        match tokio::time::timeout(self.timeout, broker.connect(params)).await {
            Ok(result) => result,
            Err(_) => Err(ConnectionFailure::new(
                ConnectionErrorKind::Network,
                CodePair::failed(reason::HOST_NOT_AVAILABLE),
                format!(
                    "no answer from {}:{} within {:?}",
                    params.host, params.port, self.timeout
                ),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{Credentials, InMemoryBroker, ScriptedManager, TlsSpec};
    use mqwatch_common::pattern::ObjectPattern;

    fn target(qmgr: &str, credentials: Option<Credentials>, tls: Option<TlsSpec>) -> Target {
        Target {
            server: "srv".into(),
            host: "localhost".into(),
            port: 1414,
            qmgr: qmgr.into(),
            channel: "MON.SVRCONN".into(),
            credentials,
            tls,
            queues: ObjectPattern::default(),
            channels: ObjectPattern::default(),
        }
    }

    fn creds() -> Option<Credentials> {
        Some(Credentials {
            user: "mqmon".into(),
            password: "secret".into(),
        })
    }

    fn resolver() -> ConnectionResolver {
        ConnectionResolver::new(Duration::from_millis(200))
    }

    #[tokio::test]
    async fn plain_connect_succeeds() {
        let broker = InMemoryBroker::new();
        broker.add_manager("QM1", ScriptedManager::default());

        let conn = resolver().connect(&broker, &target("QM1", None, None)).await.unwrap();
        assert!(!conn.used_fallback);
        assert_eq!(conn.codes, CodePair::ok());
    }

    #[tokio::test]
    async fn auth_rejection_falls_back_once() {
        let broker = InMemoryBroker::new();
        broker.add_manager(
            "QM1",
            ScriptedManager {
                reject_credentials: true,
                ..Default::default()
            },
        );

        let conn = resolver()
            .connect(&broker, &target("QM1", creds(), None))
            .await
            .unwrap();
        assert!(conn.used_fallback);
        assert_eq!(conn.codes, CodePair::failed(reason::NOT_AUTHORIZED));

        let attempts = broker.connect_attempts();
        assert_eq!(attempts.len(), 2);
        assert!(attempts[0].credentials.is_some());
        assert!(attempts[1].credentials.is_none());
    }

    #[tokio::test]
    async fn no_fallback_without_credentials() {
        let broker = InMemoryBroker::new();
        broker.add_manager(
            "QM1",
            ScriptedManager {
                connect_failure: Some(ConnectionFailure::new(
                    ConnectionErrorKind::Auth,
                    CodePair::failed(reason::NOT_AUTHORIZED),
                    "channel blocked",
                )),
                ..Default::default()
            },
        );

        let err = resolver()
            .connect(&broker, &target("QM1", None, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ConnectionErrorKind::Auth);
        assert_eq!(broker.connect_attempts().len(), 1);
    }

    #[tokio::test]
    async fn ssl_failure_is_terminal() {
        let broker = InMemoryBroker::new();
        broker.add_manager(
            "QM1",
            ScriptedManager {
                reject_tls: true,
                ..Default::default()
            },
        );

        let tls = Some(TlsSpec {
            cipher_spec: "TLS_RSA_WITH_AES_128_CBC_SHA256".into(),
            key_repository: "/var/mqm/ssl/key".into(),
        });
        let err = resolver()
            .connect(&broker, &target("QM1", creds(), tls))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ConnectionErrorKind::Ssl);
        assert_eq!(err.codes.reason, reason::SSL_INITIALIZATION_ERROR);
        // One attempt only: no no-auth retry after a handshake failure.
        assert_eq!(broker.connect_attempts().len(), 1);
    }

    #[tokio::test]
    async fn network_failure_is_terminal() {
        let broker = InMemoryBroker::new();
        let err = resolver()
            .connect(&broker, &target("GONE", creds(), None))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ConnectionErrorKind::Unavailable);
        assert_eq!(broker.connect_attempts().len(), 1);
    }

    #[tokio::test]
    async fn timeout_surfaces_as_network_failure() {
        let broker = InMemoryBroker::new();
        broker.add_manager(
            "QM1",
            ScriptedManager {
                connect_delay: Some(Duration::from_secs(30)),
                ..Default::default()
            },
        );

        let short = ConnectionResolver::new(Duration::from_millis(20));
        let err = short
            .connect(&broker, &target("QM1", None, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ConnectionErrorKind::Network);
        assert_eq!(err.codes, CodePair::failed(reason::HOST_NOT_AVAILABLE));
    }

    #[tokio::test]
    async fn fallback_retry_drops_tls_spec() {
        let broker = InMemoryBroker::new();
        broker.add_manager(
            "QM1",
            ScriptedManager {
                reject_credentials: true,
                ..Default::default()
            },
        );

        let tls = Some(TlsSpec {
            cipher_spec: "ANY_TLS12".into(),
            key_repository: "/var/mqm/ssl/key".into(),
        });
        let conn = resolver()
            .connect(&broker, &target("QM1", creds(), tls))
            .await
            .unwrap();
        assert!(conn.used_fallback);

        let attempts = broker.connect_attempts();
        assert!(attempts[0].tls.is_some());
        assert!(attempts[1].tls.is_none());
    }
}
