use serde::{Deserialize, Serialize};

/// Broker-native completion/reason code pair, carried verbatim so operators
/// can cross-reference the broker's own diagnostics (MQCC/MQRC style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodePair {
    pub completion: i32,
    pub reason: i32,
}

impl CodePair {
    pub const fn new(completion: i32, reason: i32) -> Self {
        Self { completion, reason }
    }

    pub const fn ok() -> Self {
        Self::new(completion::OK, 0)
    }

    pub const fn failed(reason: i32) -> Self {
        Self::new(completion::FAILED, reason)
    }
}

impl std::fmt::Display for CodePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MQCC={} MQRC={}", self.completion, self.reason)
    }
}

pub mod completion {
    pub const OK: i32 = 0;
    pub const FAILED: i32 = 2;
}

/// Well-known reason codes the engine branches on or synthesizes. Anything
/// else flows through untouched.
pub mod reason {
    pub const CONNECTION_BROKEN: i32 = 2009;
    pub const NOT_AUTHORIZED: i32 = 2035;
    pub const Q_MGR_NOT_AVAILABLE: i32 = 2059;
    pub const SELECTOR_ERROR: i32 = 2067;
    pub const SSL_INITIALIZATION_ERROR: i32 = 2393;
    pub const HOST_NOT_AVAILABLE: i32 = 2538;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_operator_readable() {
        let pair = CodePair::failed(reason::NOT_AUTHORIZED);
        assert_eq!(pair.to_string(), "MQCC=2 MQRC=2035");
    }

    #[test]
    fn ok_pair() {
        assert_eq!(CodePair::ok(), CodePair::new(0, 0));
    }
}
