use serde::{Deserialize, Serialize};

use crate::codes::CodePair;
use crate::object::ObjectId;
use crate::severity::Severity;

/// One graded observation about one object. Immutable once produced; the
/// aggregator consumes these in the order the orchestrator emitted them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub object: ObjectId,
    pub severity: Severity,
    /// Alert key that triggered this result ("max_depth", "stuck_messages",
    /// "ok", ...). Lets consumers group without parsing message text.
    pub alert_key: String,
    pub message: String,
    pub timestamp_ms: i64,
    /// Raw observed value the grading was derived from, when numeric.
    pub value: Option<f64>,
    /// Configured limit the value was graded against, when any.
    pub limit: Option<f64>,
    /// Broker completion/reason pair, present when the result came out of a
    /// failed broker interaction rather than a threshold decision.
    pub codes: Option<CodePair>,
}

impl CheckResult {
    pub fn ok(object: ObjectId, message: String, timestamp_ms: i64) -> Self {
        Self {
            object,
            severity: Severity::Ok,
            alert_key: "ok".into(),
            message,
            timestamp_ms,
            value: None,
            limit: None,
            codes: None,
        }
    }

    pub fn unknown(
        object: ObjectId,
        message: String,
        timestamp_ms: i64,
        codes: Option<CodePair>,
    ) -> Self {
        Self {
            object,
            severity: Severity::Unknown,
            alert_key: "unknown".into(),
            message,
            timestamp_ms,
            value: None,
            limit: None,
            codes,
        }
    }
}

/// Worst severity across a slice of results; `Ok` for an empty slice.
pub fn worst_of(results: &[CheckResult]) -> Severity {
    results
        .iter()
        .fold(Severity::Ok, |acc, r| acc.worst(r.severity))
}
