use serde::{Deserialize, Serialize};

/// Graded health state of one monitored object or of a whole run.
///
/// `Unknown` means the state could not be determined (query failed,
/// unreachable instance). For worst-of rollups it outranks `Ok` but not a
/// confirmed `Warning` or `Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Ok,
    Unknown,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Unknown => "UNKNOWN",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }

    /// Rollup rank: OK < UNKNOWN < WARNING < CRITICAL.
    fn rank(&self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Unknown => 1,
            Self::Warning => 2,
            Self::Critical => 3,
        }
    }

    pub fn worst(self, other: Self) -> Self {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }

    /// Parses the literal form used in configuration files. Returns `None`
    /// for anything that is not a known severity, so callers can reject
    /// bad config instead of silently defaulting.
    pub fn parse(literal: &str) -> Option<Self> {
        match literal {
            "OK" => Some(Self::Ok),
            "UNKNOWN" => Some(Self::Unknown),
            "WARNING" => Some(Self::Warning),
            "CRITICAL" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worst_of_ordering() {
        assert_eq!(Severity::Ok.worst(Severity::Unknown), Severity::Unknown);
        assert_eq!(Severity::Unknown.worst(Severity::Warning), Severity::Warning);
        assert_eq!(Severity::Warning.worst(Severity::Critical), Severity::Critical);
        assert_eq!(Severity::Critical.worst(Severity::Ok), Severity::Critical);
    }

    #[test]
    fn worst_is_commutative() {
        assert_eq!(
            Severity::Warning.worst(Severity::Unknown),
            Severity::Unknown.worst(Severity::Warning)
        );
    }

    #[test]
    fn parse_known_literals() {
        assert_eq!(Severity::parse("OK"), Some(Severity::Ok));
        assert_eq!(Severity::parse("WARNING"), Some(Severity::Warning));
        assert_eq!(Severity::parse("CRITICAL"), Some(Severity::Critical));
        assert_eq!(Severity::parse("UNKNOWN"), Some(Severity::Unknown));
    }

    #[test]
    fn parse_rejects_unknown_literal() {
        assert_eq!(Severity::parse("FATAL"), None);
        assert_eq!(Severity::parse("warning"), None);
    }

    #[test]
    fn serde_uses_uppercase() {
        let s = serde_yaml::to_string(&Severity::Critical).unwrap();
        assert_eq!(s.trim(), "CRITICAL");
        let back: Severity = serde_yaml::from_str("WARNING").unwrap();
        assert_eq!(back, Severity::Warning);
    }
}
