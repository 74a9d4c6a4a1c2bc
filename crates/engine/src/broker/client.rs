use async_trait::async_trait;

use mqwatch_common::codes::CodePair;

/// Credentials for an authenticated client connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Transport-security negotiation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSpec {
    pub cipher_spec: String,
    pub key_repository: String,
}

/// Everything the collaborator needs to open one client connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub channel: String,
    pub qmgr: String,
    pub credentials: Option<Credentials>,
    pub tls: Option<TlsSpec>,
}

/// Opaque token for one live connection. Never shared across targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BrokerHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// Host unreachable, port closed, or the call timed out.
    Network,
    /// The broker rejected the presented credentials.
    Auth,
    /// Transport-security negotiation failed.
    Ssl,
    /// The broker answered but the queue manager is not available.
    Unavailable,
}

/// Typed connection failure. `codes` is the collaborator's native
/// completion/reason pair, preserved verbatim for operator diagnosis.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionFailure {
    pub kind: ConnectionErrorKind,
    pub codes: CodePair,
    pub detail: String,
}

impl ConnectionFailure {
    pub fn new(kind: ConnectionErrorKind, codes: CodePair, detail: impl Into<String>) -> Self {
        Self {
            kind,
            codes,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for ConnectionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            ConnectionErrorKind::Network => "network",
            ConnectionErrorKind::Auth => "auth",
            ConnectionErrorKind::Ssl => "ssl",
            ConnectionErrorKind::Unavailable => "broker unavailable",
        };
        write!(f, "connect failed [{kind}] ({}): {}", self.codes, self.detail)
    }
}

impl std::error::Error for ConnectionFailure {}

/// Administrative query failure, scoped to one phase of one target.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFailure {
    pub codes: CodePair,
    pub detail: String,
}

impl QueryFailure {
    pub fn new(codes: CodePair, detail: impl Into<String>) -> Self {
        Self {
            codes,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for QueryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "query failed ({}): {}", self.codes, self.detail)
    }
}

impl std::error::Error for QueryFailure {}

/// Installed client library discovered by the environment phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub version: String,
    pub library_path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManagerStatus {
    pub name: String,
    pub running: bool,
    pub command_level: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Inactive,
    Binding,
    Starting,
    Running,
    Stopping,
    Retrying,
    Stopped,
    Requesting,
    Paused,
    Disconnected,
    Initializing,
    Switching,
}

impl ChannelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "INACTIVE",
            Self::Binding => "BINDING",
            Self::Starting => "STARTING",
            Self::Running => "RUNNING",
            Self::Stopping => "STOPPING",
            Self::Retrying => "RETRYING",
            Self::Stopped => "STOPPED",
            Self::Requesting => "REQUESTING",
            Self::Paused => "PAUSED",
            Self::Disconnected => "DISCONNECTED",
            Self::Initializing => "INITIALIZING",
            Self::Switching => "SWITCHING",
        }
    }
}

impl std::fmt::Display for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelStatus {
    pub name: String,
    pub channel_type: String,
    pub state: ChannelState,
    pub connections: u64,
    pub last_msg_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueueStatus {
    pub name: String,
    pub queue_type: String,
    pub depth: u64,
    pub max_depth: u64,
    pub open_input: u32,
    pub open_output: u32,
}

/// Security capabilities probed best-effort; `None` means the probe could
/// not determine the answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecurityPosture {
    pub chlauth_enabled: Option<bool>,
    pub can_connect: Option<bool>,
    pub can_browse: Option<bool>,
}

/// The one true I/O boundary: everything the engine asks of the broker
/// client library. Implementations wrap the real client; tests use
/// [`super::InMemoryBroker`].
#[async_trait]
pub trait Broker: Send + Sync {
    /// Environment prerequisite: is a usable client library present.
    async fn verify_client(&self) -> Result<ClientInfo, ConnectionFailure>;

    async fn connect(&self, params: &ConnectParams) -> Result<BrokerHandle, ConnectionFailure>;

    async fn query_manager(&self, handle: BrokerHandle) -> Result<ManagerStatus, QueryFailure>;

    /// Raw status records for channels matching a broker-native pattern.
    async fn query_channels(
        &self,
        handle: BrokerHandle,
        pattern: &str,
    ) -> Result<Vec<ChannelStatus>, QueryFailure>;

    async fn query_queues(
        &self,
        handle: BrokerHandle,
        pattern: &str,
    ) -> Result<Vec<QueueStatus>, QueryFailure>;

    async fn security_posture(&self, handle: BrokerHandle) -> Result<SecurityPosture, QueryFailure>;

    async fn disconnect(&self, handle: BrokerHandle);
}
