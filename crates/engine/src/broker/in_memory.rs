use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use mqwatch_common::codes::{reason, CodePair};
use mqwatch_common::pattern::glob_match;

use super::client::{
    Broker, BrokerHandle, ChannelState, ChannelStatus, ClientInfo, ConnectParams,
    ConnectionErrorKind, ConnectionFailure, ManagerStatus, QueryFailure, QueueStatus,
    SecurityPosture,
};

/// Scripted behavior for one queue manager inside [`InMemoryBroker`].
#[derive(Debug, Clone)]
pub struct ScriptedManager {
    pub running: bool,
    pub command_level: i32,
    pub channels: Vec<ChannelStatus>,
    pub queues: Vec<QueueStatus>,
    /// `None` makes the posture probe fail.
    pub posture: Option<SecurityPosture>,
    /// Unconditional connect failure, checked before everything else.
    pub connect_failure: Option<ConnectionFailure>,
    /// Reject any attempt that presents credentials (lets a no-auth
    /// fallback succeed).
    pub reject_credentials: bool,
    /// Reject any attempt that carries a TLS spec.
    pub reject_tls: bool,
    /// Delay applied to connect attempts, for timeout tests.
    pub connect_delay: Option<Duration>,
    /// Delay applied to every administrative query, for timeout tests.
    pub query_delay: Option<Duration>,
    pub manager_query_failure: Option<QueryFailure>,
    pub channel_query_failure: Option<QueryFailure>,
    pub queue_query_failure: Option<QueryFailure>,
}

impl Default for ScriptedManager {
    fn default() -> Self {
        Self {
            running: true,
            command_level: 930,
            channels: Vec::new(),
            queues: Vec::new(),
            posture: Some(SecurityPosture {
                chlauth_enabled: Some(true),
                can_connect: Some(true),
                can_browse: Some(true),
            }),
            connect_failure: None,
            reject_credentials: false,
            reject_tls: false,
            connect_delay: None,
            query_delay: None,
            manager_query_failure: None,
            channel_query_failure: None,
            queue_query_failure: None,
        }
    }
}

/// Fake collaborator backing unit and integration tests; no live broker
/// involved anywhere in the test suite.
#[derive(Default)]
pub struct InMemoryBroker {
    managers: Mutex<HashMap<String, ScriptedManager>>,
    handles: Mutex<HashMap<u64, String>>,
    next_handle: AtomicU64,
    connect_log: Mutex<Vec<ConnectParams>>,
    client_failure: Mutex<Option<ConnectionFailure>>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_manager(&self, name: &str, scripted: ScriptedManager) {
        self.managers
            .lock()
            .unwrap()
            .insert(name.to_string(), scripted);
    }

    pub fn fail_client(&self, failure: ConnectionFailure) {
        *self.client_failure.lock().unwrap() = Some(failure);
    }

    /// Every connect attempt seen, in order, including failed ones.
    pub fn connect_attempts(&self) -> Vec<ConnectParams> {
        self.connect_log.lock().unwrap().clone()
    }

    pub fn open_handles(&self) -> usize {
        self.handles.lock().unwrap().len()
    }

    fn scripted(&self, qmgr: &str) -> Option<ScriptedManager> {
        self.managers.lock().unwrap().get(qmgr).cloned()
    }

    fn scripted_for_handle(&self, handle: BrokerHandle) -> Result<ScriptedManager, QueryFailure> {
        let qmgr = self
            .handles
            .lock()
            .unwrap()
            .get(&handle.0)
            .cloned()
            .ok_or_else(|| {
                QueryFailure::new(
                    CodePair::failed(reason::CONNECTION_BROKEN),
                    "handle is not connected",
                )
            })?;
        self.scripted(&qmgr).ok_or_else(|| {
            QueryFailure::new(
                CodePair::failed(reason::Q_MGR_NOT_AVAILABLE),
                format!("queue manager {qmgr} disappeared"),
            )
        })
    }
}

pub fn queue(name: &str, depth: u64, max_depth: u64, open_input: u32) -> QueueStatus {
    QueueStatus {
        name: name.to_string(),
        queue_type: "LOCAL".into(),
        depth,
        max_depth,
        open_input,
        open_output: 0,
    }
}

pub fn channel(name: &str, state: ChannelState, connections: u64) -> ChannelStatus {
    ChannelStatus {
        name: name.to_string(),
        channel_type: "SVRCONN".into(),
        state,
        connections,
        last_msg_time: None,
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn verify_client(&self) -> Result<ClientInfo, ConnectionFailure> {
        if let Some(failure) = self.client_failure.lock().unwrap().clone() {
            return Err(failure);
        }
        Ok(ClientInfo {
            version: "9.3.0.0".into(),
            library_path: "/opt/mqm/lib64".into(),
        })
    }

    async fn connect(&self, params: &ConnectParams) -> Result<BrokerHandle, ConnectionFailure> {
        self.connect_log.lock().unwrap().push(params.clone());

        let Some(scripted) = self.scripted(&params.qmgr) else {
            return Err(ConnectionFailure::new(
                ConnectionErrorKind::Unavailable,
                CodePair::failed(reason::Q_MGR_NOT_AVAILABLE),
                format!("queue manager {} is not available", params.qmgr),
            ));
        };

        if let Some(delay) = scripted.connect_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(failure) = scripted.connect_failure {
            return Err(failure);
        }
        if scripted.reject_tls && params.tls.is_some() {
            return Err(ConnectionFailure::new(
                ConnectionErrorKind::Ssl,
                CodePair::failed(reason::SSL_INITIALIZATION_ERROR),
                "cipher spec negotiation failed",
            ));
        }
        if scripted.reject_credentials && params.credentials.is_some() {
            return Err(ConnectionFailure::new(
                ConnectionErrorKind::Auth,
                CodePair::failed(reason::NOT_AUTHORIZED),
                "user not authorized on channel",
            ));
        }

        let id = self.next_handle.fetch_add(1, Ordering::SeqCst);
        self.handles.lock().unwrap().insert(id, params.qmgr.clone());
        Ok(BrokerHandle(id))
    }

    async fn query_manager(&self, handle: BrokerHandle) -> Result<ManagerStatus, QueryFailure> {
        let scripted = self.scripted_for_handle(handle)?;
        if let Some(delay) = scripted.query_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(failure) = scripted.manager_query_failure {
            return Err(failure);
        }
        let qmgr = self.handles.lock().unwrap()[&handle.0].clone();
        Ok(ManagerStatus {
            name: qmgr,
            running: scripted.running,
            command_level: Some(scripted.command_level),
        })
    }

    async fn query_channels(
        &self,
        handle: BrokerHandle,
        pattern: &str,
    ) -> Result<Vec<ChannelStatus>, QueryFailure> {
        let scripted = self.scripted_for_handle(handle)?;
        if let Some(delay) = scripted.query_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(failure) = scripted.channel_query_failure {
            return Err(failure);
        }
        Ok(scripted
            .channels
            .into_iter()
            .filter(|c| glob_match(pattern, &c.name))
            .collect())
    }

    async fn query_queues(
        &self,
        handle: BrokerHandle,
        pattern: &str,
    ) -> Result<Vec<QueueStatus>, QueryFailure> {
        let scripted = self.scripted_for_handle(handle)?;
        if let Some(delay) = scripted.query_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(failure) = scripted.queue_query_failure {
            return Err(failure);
        }
        Ok(scripted
            .queues
            .into_iter()
            .filter(|q| glob_match(pattern, &q.name))
            .collect())
    }

    async fn security_posture(&self, handle: BrokerHandle) -> Result<SecurityPosture, QueryFailure> {
        let scripted = self.scripted_for_handle(handle)?;
        if let Some(delay) = scripted.query_delay {
            tokio::time::sleep(delay).await;
        }
        scripted.posture.ok_or_else(|| {
            QueryFailure::new(
                CodePair::failed(reason::NOT_AUTHORIZED),
                "not authorized to inquire on the queue manager",
            )
        })
    }

    async fn disconnect(&self, handle: BrokerHandle) {
        self.handles.lock().unwrap().remove(&handle.0);
    }
}
