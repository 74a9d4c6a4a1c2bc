mod aggregator;

pub use aggregator::{ReportCollector, RunReport, RunVerdict, TargetSummary};
