//! Result records of a comparison run, speedup assignment and ranking.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::report::format_time;
use crate::stats::{summarize, SampleSet, StatisticalSummary, StatsError};
use crate::trial::{TrialMetric, TrialRun};

/// Statistic used to rank or compare records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Mean,
    Median,
    Min,
    Max,
}

impl SortKey {
    /// Value of this statistic in `summary`, in seconds.
    pub fn value(&self, summary: &StatisticalSummary) -> f64 {
        match self {
            SortKey::Mean => summary.mean,
            SortKey::Median => summary.median,
            SortKey::Min => summary.min,
            SortKey::Max => summary.max,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Mean => write!(f, "mean"),
            SortKey::Median => write!(f, "median"),
            SortKey::Min => write!(f, "min"),
            SortKey::Max => write!(f, "max"),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" => Ok(SortKey::Mean),
            "median" => Ok(SortKey::Median),
            "min" | "min_time" => Ok(SortKey::Min),
            "max" | "max_time" => Ok(SortKey::Max),
            other => Err(format!(
                "Invalid metric '{other}'. Must be one of mean, median, min, max"
            )),
        }
    }
}

/// Measurements and statistics of one implementation from one run.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkRecord {
    name: String,
    runs: usize,
    warmup: usize,
    samples: SampleSet,
    summary: StatisticalSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    metrics: Vec<TrialMetric>,
    speedup: Option<f64>,
    relative_performance: Option<f64>,
}

impl BenchmarkRecord {
    /// Summarize a finished trial run into a record without speedup.
    pub fn new(name: impl Into<String>, warmup: usize, run: TrialRun) -> Result<Self, StatsError> {
        let summary = summarize(&run.samples)?;
        Ok(Self {
            name: name.into(),
            runs: run.samples.len(),
            warmup,
            samples: run.samples,
            summary,
            metrics: run.metrics,
            speedup: None,
            relative_performance: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of timed trials.
    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn warmup(&self) -> usize {
        self.warmup
    }

    /// Raw durations in execution order.
    pub fn samples(&self) -> &SampleSet {
        &self.samples
    }

    pub fn summary(&self) -> &StatisticalSummary {
        &self.summary
    }

    /// Per-trial probe outputs; empty when no probes were registered.
    pub fn metrics(&self) -> &[TrialMetric] {
        &self.metrics
    }

    /// Fastest mean of the comparison divided by this record's mean.
    pub fn speedup(&self) -> Option<f64> {
        self.speedup
    }

    /// Speedup expressed as a percentage.
    pub fn relative_performance(&self) -> Option<f64> {
        self.relative_performance
    }

    pub fn mean(&self) -> f64 {
        self.summary.mean
    }
}

impl fmt::Display for BenchmarkRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;
        writeln!(f, "Benchmark Results: {}", self.name)?;
        writeln!(f, "  Runs: {} (warmup: {})", self.runs, self.warmup)?;
        writeln!(f, "  Mean:   {}", format_time(s.mean))?;
        writeln!(f, "  Median: {}", format_time(s.median))?;
        writeln!(f, "  Std:    {}", format_time(s.std_dev))?;
        writeln!(f, "  Min:    {}", format_time(s.min))?;
        write!(f, "  Max:    {}", format_time(s.max))?;
        if let Some(speedup) = self.speedup {
            write!(f, "\n  Speedup: {:.2}x", speedup)?;
        }
        if let Some(relative) = self.relative_performance {
            write!(f, "\n  Relative: {:.1}%", relative)?;
        }
        Ok(())
    }
}

/// Records of one comparison run, kept in registration order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ComparisonResults {
    records: Vec<BenchmarkRecord>,
}

impl ComparisonResults {
    /// Collect records and assign each its speedup relative to the fastest mean.
    ///
    /// The record(s) with the minimum mean get a speedup of exactly `1.0`.
    /// A zero mean (below clock resolution) also yields `1.0`.
    pub fn new(mut records: Vec<BenchmarkRecord>) -> Self {
        let fastest = records
            .iter()
            .map(BenchmarkRecord::mean)
            .fold(f64::INFINITY, f64::min);

        for record in &mut records {
            let mean = record.mean();
            let speedup = if mean == fastest || mean <= 0.0 {
                1.0
            } else {
                fastest / mean
            };
            record.speedup = Some(speedup);
            record.relative_performance = Some(speedup * 100.0);
        }

        Self { records }
    }

    pub fn get(&self, name: &str) -> Option<&BenchmarkRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Records in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, BenchmarkRecord> {
        self.records.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by `key`, ascending; ties keep registration order.
    pub fn ranked(&self, key: SortKey) -> Vec<&BenchmarkRecord> {
        let mut ranked: Vec<&BenchmarkRecord> = self.records.iter().collect();
        ranked.sort_by(|a, b| key.value(&a.summary).total_cmp(&key.value(&b.summary)));
        ranked
    }

    /// Record with the lowest `key`; the earliest registered wins ties.
    pub fn fastest(&self, key: SortKey) -> Option<&BenchmarkRecord> {
        self.ranked(key).into_iter().next()
    }

    /// Record with the highest `key`; the earliest registered wins ties.
    pub fn slowest(&self, key: SortKey) -> Option<&BenchmarkRecord> {
        self.records.iter().fold(None, |slowest, record| match slowest {
            Some(s) if key.value(&s.summary) >= key.value(&record.summary) => Some(s),
            _ => Some(record),
        })
    }
}

impl Index<&str> for ComparisonResults {
    type Output = BenchmarkRecord;

    /// # Panics
    /// Panics if no record has the given name.
    fn index(&self, name: &str) -> &Self::Output {
        match self.get(name) {
            Some(record) => record,
            None => panic!("no benchmark record named '{name}'"),
        }
    }
}

impl<'a> IntoIterator for &'a ComparisonResults {
    type Item = &'a BenchmarkRecord;
    type IntoIter = std::slice::Iter<'a, BenchmarkRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Speedup of `comparison` over `baseline` on `key`.
///
/// Values above `1.0` mean `comparison` is faster. Returns infinity when the
/// comparison value is zero.
pub fn speedup(baseline: &BenchmarkRecord, comparison: &BenchmarkRecord, key: SortKey) -> f64 {
    let baseline_time = key.value(&baseline.summary);
    let comparison_time = key.value(&comparison.summary);

    if comparison_time == 0.0 {
        return f64::INFINITY;
    }

    baseline_time / comparison_time
}
