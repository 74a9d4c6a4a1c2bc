/// Per-target phases, run strictly in order. Environment verification is
/// run-level and happens before any target starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connect,
    ManagerStatus,
    Channels,
    Queues,
    Security,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::ManagerStatus => "manager-status",
            Self::Channels => "channels",
            Self::Queues => "queues",
            Self::Security => "security",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of one target after its phases ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    /// Every phase completed.
    Full,
    /// Connected, but at least one query phase failed or was cancelled.
    Partial,
    /// The connect phase failed; no queries were attempted.
    Unreachable,
}

impl TargetState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Partial => "partial",
            Self::Unreachable => "unreachable",
        }
    }
}

impl std::fmt::Display for TargetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
