mod error;
mod resolve;
mod rule;
mod schema;

pub use error::ConfigError;
pub use resolve::Resolver;
pub use rule::{ChannelRule, EffectiveRule, MessageTemplate, QueueRule};
pub use schema::{
    from_str, GlobalSection, MessageSpec, MonitorDocument, MonitoringSection, OutputSection,
    PlatformPaths, PlatformSection, QueueManagerConfig, RuleSection, ServerConfig, SslConfig,
};
