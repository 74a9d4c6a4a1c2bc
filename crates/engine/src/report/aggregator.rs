use std::collections::BTreeMap;

use tokio::sync::mpsc;

use mqwatch_common::check::{worst_of, CheckResult};
use mqwatch_common::severity::Severity;

use crate::broker::{ClientInfo, SecurityPosture};
use crate::diagnose::TargetState;

/// How one target ended up, independent of the results it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSummary {
    pub server: String,
    pub qmgr: String,
    pub state: TargetState,
    pub used_fallback: bool,
    pub posture: SecurityPosture,
}

/// Run verdict. A run in which no target could even connect is its own
/// outcome, not just a sea of UNKNOWN results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunVerdict {
    Completed(Severity),
    AllTargetsUnreachable,
}

/// Everything one diagnostic pass produced. Results keep arrival order;
/// rollups are computed on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub client: ClientInfo,
    pub targets: Vec<TargetSummary>,
    pub results: Vec<CheckResult>,
}

impl RunReport {
    pub fn worst(&self) -> Severity {
        worst_of(&self.results)
    }

    pub fn verdict(&self) -> RunVerdict {
        if !self.targets.is_empty()
            && self
                .targets
                .iter()
                .all(|t| t.state == TargetState::Unreachable)
        {
            return RunVerdict::AllTargetsUnreachable;
        }
        RunVerdict::Completed(self.worst())
    }

    /// Worst severity across one queue-manager instance.
    pub fn instance_rollup(&self, server: &str, qmgr: &str) -> Severity {
        self.results
            .iter()
            .filter(|r| r.object.server == server && r.object.qmgr == qmgr)
            .fold(Severity::Ok, |acc, r| acc.worst(r.severity))
    }

    /// Worst severity per server, across all its instances.
    pub fn server_rollups(&self) -> BTreeMap<String, Severity> {
        let mut out = BTreeMap::new();
        for r in &self.results {
            let entry = out.entry(r.object.server.clone()).or_insert(Severity::Ok);
            *entry = entry.worst(r.severity);
        }
        out
    }
}

/// Receiving half of the run's single result channel. Targets hold sender
/// clones; the collector is the only reader and owns the ordered log.
pub struct ReportCollector {
    rx: mpsc::Receiver<CheckResult>,
}

impl ReportCollector {
    pub fn channel(capacity: usize) -> (mpsc::Sender<CheckResult>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx })
    }

    /// Drains until every sender is dropped.
    pub async fn collect(mut self) -> Vec<CheckResult> {
        let mut out = Vec::new();
        while let Some(result) = self.rx.recv().await {
            out.push(result);
        }
        out
    }
}
