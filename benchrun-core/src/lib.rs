//! Core measurement engine for benchrun.
//!
//! This crate provides the timing loop, the statistics computed over its
//! samples, the comparison records shared by every front end, and the
//! reporters that render them.

pub mod clock;
pub mod record;
pub mod report;
pub mod stats;
pub mod trial;

// Re-export main types for convenience
pub use clock::{Clock, MonotonicClock};
pub use record::{speedup, BenchmarkRecord, ComparisonResults, SortKey};
pub use report::{
    bar_chart, format_results_table, format_time, JsonReporter, ReportError, Reporter,
    TerminalReporter,
};
pub use stats::{summarize, SampleSet, Stability, StatisticalSummary, StatsError};
pub use trial::{
    run_trials, run_trials_with_clock, BoxError, FnProbe, MetricProbe, Outcome, Output, Phase,
    Routine, TrialConfig, TrialError, TrialFailure, TrialMetric, TrialRun,
};
