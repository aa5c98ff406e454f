//! Trial executor: runs a callable a fixed number of times and records one
//! duration per timed trial.
//!
//! Warmup trials run first and are neither timed nor probed. Every timed
//! trial reads the clock immediately before and after the call. Execution is
//! strictly sequential and stops at the first failure; no partial sample set
//! is ever returned.

use std::any::Any;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::hint::black_box;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::{Clock, MonotonicClock};
use crate::stats::SampleSet;

/// Boxed error returned by a fallible benchmarked callable.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Why a single invocation of a benchmarked callable failed.
#[derive(Debug, Error)]
pub enum TrialFailure {
    /// The callable returned an error.
    #[error("{0}")]
    Error(BoxError),

    /// The callable panicked.
    #[error("panicked: {0}")]
    Panic(String),
}

/// The part of a run in which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Warmup,
    Timed,
    /// A metric probe attached to a timed trial.
    Probe,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Warmup => write!(f, "warmup"),
            Phase::Timed => write!(f, "timed"),
            Phase::Probe => write!(f, "probe"),
        }
    }
}

/// Errors that can occur while running trials.
#[derive(Debug, Error)]
pub enum TrialError {
    /// The trial configuration was rejected before any trial executed.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The callable (or a probe) failed; `iteration` is 1-based within `phase`.
    #[error("Execution failed during {phase} trial {iteration}: {cause}")]
    ExecutionFailure {
        phase: Phase,
        iteration: usize,
        #[source]
        cause: TrialFailure,
    },
}

/// Number of timed and warmup trials for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialConfig {
    /// Timed trials; at least one.
    pub runs: usize,
    /// Untimed trials executed before the timed ones.
    pub warmup: usize,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            runs: 100,
            warmup: 0,
        }
    }
}

impl TrialConfig {
    pub fn new(runs: usize, warmup: usize) -> Self {
        Self { runs, warmup }
    }

    pub fn validate(&self) -> Result<(), TrialError> {
        if self.runs < 1 {
            return Err(TrialError::InvalidConfiguration(format!(
                "runs must be a positive integer, got {}",
                self.runs
            )));
        }
        Ok(())
    }
}

/// What a benchmarked callable may return.
///
/// `()` is an infallible call producing nothing; a `Result` fails the trial
/// on `Err` and hands its `Ok` value to metric probes.
pub trait Outcome {
    type Output: Any;

    fn into_result(self) -> Result<Self::Output, TrialFailure>;
}

impl Outcome for () {
    type Output = ();

    #[inline]
    fn into_result(self) -> Result<(), TrialFailure> {
        Ok(())
    }
}

impl<T, E> Outcome for Result<T, E>
where
    T: Any,
    E: Into<BoxError>,
{
    type Output = T;

    #[inline]
    fn into_result(self) -> Result<T, TrialFailure> {
        self.map_err(|e| TrialFailure::Error(e.into()))
    }
}

/// The value produced by the timed call of one trial.
pub struct Output(Box<dyn Any>);

impl Output {
    pub fn new<T: Any>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// The produced value, if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Output { .. }")
    }
}

/// A zero-argument callable under measurement.
///
/// Any parameters must already be bound, typically by a closure.
pub trait Routine {
    /// Call once, discarding the produced value.
    fn invoke(&mut self) -> Result<(), TrialFailure>;

    /// Call once between two readings of `clock`.
    ///
    /// Returns the elapsed seconds and the produced value. The value is
    /// boxed after the second reading.
    fn invoke_timed(&mut self, clock: &dyn Clock) -> Result<(f64, Output), TrialFailure>;
}

impl<F, O> Routine for F
where
    F: FnMut() -> O,
    O: Outcome,
{
    #[inline]
    fn invoke(&mut self) -> Result<(), TrialFailure> {
        let produced = catch_unwind(AssertUnwindSafe(|| black_box((*self)())));
        settle(produced).map(|value| {
            black_box(value);
        })
    }

    #[inline]
    fn invoke_timed(&mut self, clock: &dyn Clock) -> Result<(f64, Output), TrialFailure> {
        let start = clock.now();
        let produced = catch_unwind(AssertUnwindSafe(|| black_box((*self)())));
        let end = clock.now();

        let value = settle(produced)?;
        Ok((clock.elapsed(start, end), Output::new(value)))
    }
}

fn settle<O: Outcome>(produced: std::thread::Result<O>) -> Result<O::Output, TrialFailure> {
    match produced {
        Ok(outcome) => outcome.into_result(),
        Err(panic) => Err(TrialFailure::Panic(panic_message(panic.as_ref()))),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Auxiliary measurements captured for one timed trial, keyed by metric name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrialMetric {
    values: BTreeMap<String, serde_json::Value>,
}

impl TrialMetric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a metric value, replacing any previous value of the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.values.get(name)
    }

    /// Numeric value of a metric, if present and numeric.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(serde_json::Value::as_f64)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn merge(&mut self, other: TrialMetric) {
        self.values.extend(other.values);
    }
}

/// A pluggable measurement taken once per timed trial.
///
/// The probe receives the value the timed call produced and the routine
/// being benchmarked. It may invoke the routine again; such invocations are
/// extra, unmeasured executions.
pub trait MetricProbe {
    fn name(&self) -> &str;

    fn measure(
        &mut self,
        routine: &mut dyn Routine,
        output: &Output,
    ) -> Result<TrialMetric, TrialFailure>;
}

/// A [`MetricProbe`] backed by a closure.
pub struct FnProbe<F> {
    name: String,
    f: F,
}

impl<F> FnProbe<F>
where
    F: FnMut(&mut dyn Routine, &Output) -> Result<TrialMetric, TrialFailure>,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> MetricProbe for FnProbe<F>
where
    F: FnMut(&mut dyn Routine, &Output) -> Result<TrialMetric, TrialFailure>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn measure(
        &mut self,
        routine: &mut dyn Routine,
        output: &Output,
    ) -> Result<TrialMetric, TrialFailure> {
        (self.f)(routine, output)
    }
}

impl fmt::Debug for dyn MetricProbe + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricProbe")
            .field("name", &self.name())
            .finish()
    }
}

/// Raw output of one executor run.
#[derive(Debug, Clone, Default)]
pub struct TrialRun {
    /// One duration per timed trial, in execution order.
    pub samples: SampleSet,
    /// One merged metric map per timed trial; empty when no probes ran.
    pub metrics: Vec<TrialMetric>,
}

/// Run `routine` under `config` with a [`MonotonicClock`].
pub fn run_trials<R>(
    routine: &mut R,
    config: &TrialConfig,
    probes: &mut [Box<dyn MetricProbe>],
) -> Result<TrialRun, TrialError>
where
    R: Routine + ?Sized,
{
    run_trials_with_clock(routine, config, probes, &MonotonicClock::new())
}

/// Upper bound on the sample storage reserved before the first trial.
const PREALLOCATED_TRIALS: usize = 4096;

/// Run `routine` under `config`, timing each trial with `clock`.
pub fn run_trials_with_clock<R, C>(
    routine: &mut R,
    config: &TrialConfig,
    probes: &mut [Box<dyn MetricProbe>],
    clock: &C,
) -> Result<TrialRun, TrialError>
where
    R: Routine + ?Sized,
    C: Clock,
{
    config.validate()?;

    for i in 0..config.warmup {
        routine
            .invoke()
            .map_err(|cause| TrialError::ExecutionFailure {
                phase: Phase::Warmup,
                iteration: i + 1,
                cause,
            })?;
    }

    // Storage grows past the reservation as trials complete.
    let reserved = config.runs.min(PREALLOCATED_TRIALS);
    let mut samples = SampleSet::with_capacity(reserved);
    let mut metrics = Vec::with_capacity(if probes.is_empty() { 0 } else { reserved });

    for i in 0..config.runs {
        let iteration = i + 1;

        let (elapsed, output) = routine
            .invoke_timed(clock)
            .map_err(|cause| TrialError::ExecutionFailure {
                phase: Phase::Timed,
                iteration,
                cause,
            })?;
        samples.push(elapsed);

        if !probes.is_empty() {
            let mut trial_metric = TrialMetric::new();
            for probe in probes.iter_mut() {
                let measured = probe
                    .measure(&mut AsDyn(&mut *routine), &output)
                    .map_err(|cause| TrialError::ExecutionFailure {
                        phase: Phase::Probe,
                        iteration,
                        cause,
                    })?;
                trial_metric.merge(measured);
            }
            metrics.push(trial_metric);
        }
    }

    Ok(TrialRun { samples, metrics })
}

/// Lends a possibly unsized routine to probes as `&mut dyn Routine`.
struct AsDyn<'a, R: ?Sized>(&'a mut R);

impl<R: Routine + ?Sized> Routine for AsDyn<'_, R> {
    fn invoke(&mut self) -> Result<(), TrialFailure> {
        self.0.invoke()
    }

    fn invoke_timed(&mut self, clock: &dyn Clock) -> Result<(f64, Output), TrialFailure> {
        self.0.invoke_timed(clock)
    }
}
