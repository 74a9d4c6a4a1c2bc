mod client;
mod in_memory;

pub use client::{
    Broker, BrokerHandle, ChannelState, ChannelStatus, ClientInfo, ConnectParams,
    ConnectionErrorKind, ConnectionFailure, Credentials, ManagerStatus, QueryFailure, QueueStatus,
    SecurityPosture, TlsSpec,
};
pub use in_memory::{channel, queue, InMemoryBroker, ScriptedManager};
