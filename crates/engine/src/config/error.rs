#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_yaml::Error),
    Validation(String),
    /// A monitoring section names a severity literal the engine does not
    /// define. Surfaced before any target is touched, never dropped.
    UnknownSeverity {
        section: String,
        key: String,
        literal: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Validation(msg) => write!(f, "validation: {msg}"),
            Self::UnknownSeverity {
                section,
                key,
                literal,
            } => write!(
                f,
                "unknown severity '{literal}' for message '{key}' in section '{section}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e)
    }
}
