use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use mqwatch_common::check::CheckResult;
use mqwatch_common::codes::{reason, CodePair};
use mqwatch_common::object::{ObjectId, ObjectKind};
use mqwatch_common::severity::Severity;
use mqwatch_common::time::now_ms;

use crate::broker::{
    Broker, ConnectionErrorKind, ConnectionFailure, ManagerStatus, QueryFailure,
};
use crate::config::{EffectiveRule, Resolver};
use crate::connect::ConnectionResolver;
use crate::evaluate::{evaluate, ChannelMetrics, Metric, QueueMetrics};
use crate::report::{ReportCollector, RunReport, TargetSummary};

use super::{Phase, Target, TargetState};

const RESULT_CHANNEL_CAPACITY: usize = 256;

/// Run-level failure. Target-level trouble never surfaces here; it becomes
/// UNKNOWN results and a non-Full target state instead.
#[derive(Debug, Clone, PartialEq)]
pub enum RunError {
    /// No usable broker client library; nothing can be diagnosed.
    Environment(ConnectionFailure),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Environment(failure) => write!(f, "environment check failed: {failure}"),
        }
    }
}

impl std::error::Error for RunError {}

/// Drives one diagnostic pass: a run-level environment check, then every
/// target concurrently, each through its phases strictly in order.
pub struct Orchestrator {
    broker: Arc<dyn Broker>,
    resolver: Arc<Resolver>,
    connector: ConnectionResolver,
}

impl Orchestrator {
    pub fn new(broker: Arc<dyn Broker>, resolver: Resolver, connect_timeout: Duration) -> Self {
        Self {
            broker,
            resolver: Arc::new(resolver),
            connector: ConnectionResolver::new(connect_timeout),
        }
    }

    pub async fn run(
        &self,
        targets: Vec<Target>,
        cancel: watch::Receiver<bool>,
    ) -> Result<RunReport, RunError> {
        let timeout = self.connector.timeout;
        let client = match tokio::time::timeout(timeout, self.broker.verify_client()).await {
            Ok(result) => result.map_err(RunError::Environment)?,
            Err(_) => {
                return Err(RunError::Environment(ConnectionFailure::new(
                    ConnectionErrorKind::Network,
                    CodePair::failed(reason::HOST_NOT_AVAILABLE),
                    format!("client verification did not answer within {timeout:?}"),
                )))
            }
        };
        tracing::info!(
            version = %client.version,
            path = %client.library_path,
            targets = targets.len(),
            "broker client verified, starting diagnostic pass"
        );

        let (tx, collector) = ReportCollector::channel(RESULT_CHANNEL_CAPACITY);
        let collector = tokio::spawn(collector.collect());

        let mut tasks = Vec::with_capacity(targets.len());
        for target in targets {
            if *cancel.borrow() {
                tracing::info!(qmgr = %target.qmgr, "cancelled, target not started");
                continue;
            }
            let broker = Arc::clone(&self.broker);
            let resolver = Arc::clone(&self.resolver);
            let connector = self.connector;
            let tx = tx.clone();
            let cancel = cancel.clone();
            tasks.push(tokio::spawn(async move {
                run_target(broker, resolver, connector, target, tx, cancel).await
            }));
        }
        drop(tx);

        let mut summaries = Vec::with_capacity(tasks.len());
        for task in tasks {
            if let Ok(summary) = task.await {
                summaries.push(summary);
            }
        }
        let results = collector.await.unwrap_or_default();

        Ok(RunReport {
            client,
            targets: summaries,
            results,
        })
    }
}

async fn run_target(
    broker: Arc<dyn Broker>,
    resolver: Arc<Resolver>,
    connector: ConnectionResolver,
    target: Target,
    tx: mpsc::Sender<CheckResult>,
    cancel: watch::Receiver<bool>,
) -> TargetSummary {
    let timeout = connector.timeout;
    let mut summary = TargetSummary {
        server: target.server.clone(),
        qmgr: target.qmgr.clone(),
        state: TargetState::Full,
        used_fallback: false,
        posture: Default::default(),
    };

    let connection = match connector.connect(broker.as_ref(), &target).await {
        Ok(connection) => connection,
        Err(failure) => {
            tracing::warn!(
                qmgr = %target.qmgr,
                phase = %Phase::Connect,
                error = %failure,
                "target unreachable"
            );
            emit(
                &tx,
                CheckResult::unknown(
                    target.manager_id(),
                    format!("Cannot connect to {}: {}", target.qmgr, failure.detail),
                    now_ms(),
                    Some(failure.codes),
                ),
            )
            .await;
            summary.state = TargetState::Unreachable;
            return summary;
        }
    };
    summary.used_fallback = connection.used_fallback;
    let handle = connection.handle;

    if cancelled(&cancel) {
        summary.state = TargetState::Partial;
        broker.disconnect(handle).await;
        return summary;
    }

    match bounded(timeout, broker.query_manager(handle)).await {
        Ok(status) => emit(&tx, manager_result(&target, &status)).await,
        Err(failure) => {
            // Without a responsive manager the object queries are noise;
            // the remaining phases are skipped for this target only.
            phase_unknown(&tx, &target, Phase::ManagerStatus, &failure).await;
            summary.state = TargetState::Partial;
            broker.disconnect(handle).await;
            return summary;
        }
    }

    if cancelled(&cancel) {
        summary.state = TargetState::Partial;
        broker.disconnect(handle).await;
        return summary;
    }

    match bounded(timeout, broker.query_channels(handle, "*")).await {
        Ok(statuses) => {
            let selected = target.channels.filter(statuses.iter().map(|c| c.name.as_str()));
            for status in statuses.iter().filter(|c| selected.contains(&c.name)) {
                let id = ObjectId::new(
                    &target.server,
                    &target.qmgr,
                    ObjectKind::Channel,
                    &status.name,
                );
                let rule = EffectiveRule::Channel(resolver.resolve_channel(&status.name));
                let metric = Metric::Channel(ChannelMetrics::from(status));
                for result in evaluate(&id, &metric, &rule, now_ms()) {
                    emit(&tx, result).await;
                }
            }
        }
        Err(failure) => {
            phase_unknown(&tx, &target, Phase::Channels, &failure).await;
            summary.state = TargetState::Partial;
        }
    }

    if cancelled(&cancel) {
        summary.state = TargetState::Partial;
        broker.disconnect(handle).await;
        return summary;
    }

    match bounded(timeout, broker.query_queues(handle, "*")).await {
        Ok(statuses) => {
            let selected = target.queues.filter(statuses.iter().map(|q| q.name.as_str()));
            for status in statuses.iter().filter(|q| selected.contains(&q.name)) {
                let id = ObjectId::new(
                    &target.server,
                    &target.qmgr,
                    ObjectKind::Queue,
                    &status.name,
                );
                let rule = EffectiveRule::Queue(resolver.resolve_queue(&status.name));
                let metric = Metric::Queue(QueueMetrics::from(status));
                for result in evaluate(&id, &metric, &rule, now_ms()) {
                    emit(&tx, result).await;
                }
            }
        }
        Err(failure) => {
            phase_unknown(&tx, &target, Phase::Queues, &failure).await;
            summary.state = TargetState::Partial;
        }
    }

    // Best-effort: an inconclusive probe leaves the posture fields unknown
    // and never degrades the target.
    match bounded(timeout, broker.security_posture(handle)).await {
        Ok(posture) => summary.posture = posture,
        Err(failure) => {
            tracing::debug!(
                qmgr = %target.qmgr,
                phase = %Phase::Security,
                error = %failure,
                "security probe inconclusive"
            );
        }
    }

    broker.disconnect(handle).await;
    summary
}

fn cancelled(cancel: &watch::Receiver<bool>) -> bool {
    *cancel.borrow()
}

/// Bounds one administrative query by the run's timeout. Expiry becomes an
/// ordinary query failure with the synthesized host-not-available pair, so
/// a wedged broker call degrades its phase instead of hanging the run.
async fn bounded<T, F>(timeout: Duration, query: F) -> Result<T, QueryFailure>
where
    F: std::future::Future<Output = Result<T, QueryFailure>>,
{
    match tokio::time::timeout(timeout, query).await {
        Ok(result) => result,
        Err(_) => Err(QueryFailure::new(
            CodePair::failed(reason::HOST_NOT_AVAILABLE),
            format!("no answer within {timeout:?}"),
        )),
    }
}

async fn emit(tx: &mpsc::Sender<CheckResult>, result: CheckResult) {
    if tx.send(result).await.is_err() {
        tracing::debug!("result collector gone, dropping result");
    }
}

async fn phase_unknown(
    tx: &mpsc::Sender<CheckResult>,
    target: &Target,
    phase: Phase,
    failure: &QueryFailure,
) {
    tracing::warn!(
        qmgr = %target.qmgr,
        phase = %phase,
        error = %failure,
        "query phase failed"
    );
    let (kind, name) = match phase {
        Phase::Channels => (ObjectKind::Channel, "*"),
        Phase::Queues => (ObjectKind::Queue, "*"),
        _ => (ObjectKind::QueueManager, target.qmgr.as_str()),
    };
    emit(
        tx,
        CheckResult::unknown(
            ObjectId::new(&target.server, &target.qmgr, kind, name),
            format!("{} query failed on {}: {}", phase, target.qmgr, failure.detail),
            now_ms(),
            Some(failure.codes),
        ),
    )
    .await;
}

fn manager_result(target: &Target, status: &ManagerStatus) -> CheckResult {
    if status.running {
        let message = match status.command_level {
            Some(level) => format!(
                "Queue manager {} is running (command level {level})",
                status.name
            ),
            None => format!("Queue manager {} is running", status.name),
        };
        CheckResult::ok(target.manager_id(), message, now_ms())
    } else {
        CheckResult {
            object: target.manager_id(),
            severity: Severity::Critical,
            alert_key: "not_running".into(),
            message: format!("Queue manager {} is not running", status.name),
            timestamp_ms: now_ms(),
            value: None,
            limit: None,
            codes: None,
        }
    }
}
