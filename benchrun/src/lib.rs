//! benchrun: compare competing implementations of the same operation
//!
//! This library drives the measurement engine in `benchrun-core`: it
//! registers named implementations into a comparison session, runs them
//! under a shared trial configuration and ranks the results.

pub mod cli;
pub mod config;
pub mod session;
pub mod sweep;
pub mod workloads;

// Re-export core types for convenience
pub use benchrun_core::report;
pub use benchrun_core::{
    bar_chart, format_results_table, format_time, run_trials, run_trials_with_clock, speedup,
    summarize, BenchmarkRecord, Clock, ComparisonResults, FnProbe, JsonReporter, MetricProbe,
    MonotonicClock, Output, Phase, ReportError, Reporter, Routine, SampleSet, SortKey, Stability,
    StatisticalSummary, StatsError, TerminalReporter, TrialConfig, TrialError, TrialFailure,
    TrialMetric, TrialRun,
};

// Re-export main types from this crate
pub use cli::Cli;
pub use config::Config;
pub use session::{ComparisonSession, SessionError, SessionState};
pub use sweep::Sweep;
pub use workloads::WorkloadGroup;
