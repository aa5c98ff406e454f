//! Comparison sessions: register several implementations, run them under a
//! shared trial configuration, and rank the results.
//!
//! Implementations run strictly one after another in registration order so
//! that their trials never overlap. A run either produces a record for every
//! implementation or fails as a whole.

use std::any::type_name;
use std::fmt;

use thiserror::Error;

use benchrun_core::clock::{Clock, MonotonicClock};
use benchrun_core::record::{BenchmarkRecord, ComparisonResults};
use benchrun_core::stats::StatsError;
use benchrun_core::trial::{run_trials_with_clock, MetricProbe, Routine, TrialConfig, TrialError};

/// Errors that can occur while driving a comparison session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// An implementation with this name is already registered.
    #[error("Duplicate implementation name: {0}")]
    DuplicateName(String),

    /// `run()` was called before any implementation was added.
    #[error("No implementations added. Use add_implementation() first.")]
    NotConfigured,

    /// Results were requested before a successful `run()`.
    #[error("No results available. Call run() first.")]
    NoResults,

    /// The shared trial configuration was rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An implementation failed while being benchmarked.
    #[error("Benchmark '{name}' failed: {source}")]
    Trial {
        name: String,
        #[source]
        source: TrialError,
    },

    /// Statistics could not be computed for an implementation.
    #[error("Statistics for '{name}' failed: {source}")]
    Stats {
        name: String,
        #[source]
        source: StatsError,
    },
}

/// Lifecycle of a [`ComparisonSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No implementations registered.
    Empty,
    /// Implementations registered, no current results.
    Configured,
    /// The last `run()` succeeded and its results are stored.
    Ran,
}

struct Implementation {
    name: String,
    routine: Box<dyn Routine>,
}

/// Benchmarks several implementations of the same operation against each other.
///
/// # Example
///
/// ```ignore
/// use benchrun::{ComparisonSession, SortKey, TrialConfig};
///
/// let mut session = ComparisonSession::new(TrialConfig::new(100, 10));
/// session
///     .add_implementation("iterator", || {
///         std::hint::black_box((0..1000u64).sum::<u64>());
///     })?
///     .add_implementation("closed_form", || {
///         std::hint::black_box(999u64 * 1000 / 2);
///     })?;
///
/// let results = session.run()?;
/// let fastest = results.fastest(SortKey::Mean).unwrap();
/// println!("{} is fastest", fastest.name());
/// ```
pub struct ComparisonSession<C = MonotonicClock> {
    config: TrialConfig,
    clock: C,
    implementations: Vec<Implementation>,
    probes: Vec<Box<dyn MetricProbe>>,
    results: Option<ComparisonResults>,
    unnamed_count: usize,
}

impl ComparisonSession<MonotonicClock> {
    /// Create an empty session timed with a [`MonotonicClock`].
    pub fn new(config: TrialConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C> fmt::Debug for ComparisonSession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.implementations.iter().map(|i| i.name.as_str()).collect();
        f.debug_struct("ComparisonSession")
            .field("config", &self.config)
            .field("implementations", &names)
            .field("probes", &self.probes)
            .field("has_results", &self.results.is_some())
            .finish()
    }
}

impl Default for ComparisonSession<MonotonicClock> {
    fn default() -> Self {
        Self::new(TrialConfig::default())
    }
}

impl<C: Clock> ComparisonSession<C> {
    /// Create an empty session timed with `clock`.
    pub fn with_clock(config: TrialConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            implementations: Vec::new(),
            probes: Vec::new(),
            results: None,
            unnamed_count: 0,
        }
    }

    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        if self.implementations.is_empty() {
            SessionState::Empty
        } else if self.results.is_some() {
            SessionState::Ran
        } else {
            SessionState::Configured
        }
    }

    /// Number of registered implementations.
    pub fn len(&self) -> usize {
        self.implementations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.implementations.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.implementations.iter().any(|i| i.name == name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.implementations.iter().map(|i| i.name.as_str())
    }

    /// Register `routine` under `name`.
    ///
    /// Fails without modifying the session if the name is taken. Adding to a
    /// session that already ran discards its results.
    pub fn add_implementation<R>(
        &mut self,
        name: impl Into<String>,
        routine: R,
    ) -> Result<&mut Self, SessionError>
    where
        R: Routine + 'static,
    {
        let name = name.into();
        if self.contains(&name) {
            return Err(SessionError::DuplicateName(name));
        }

        self.results = None;
        self.implementations.push(Implementation {
            name,
            routine: Box::new(routine),
        });
        Ok(self)
    }

    /// Register `routine` under a name derived from its type.
    ///
    /// Named functions use their own name; closures are numbered `impl_1`,
    /// `impl_2`, ... A derived name that collides fails like an explicit one.
    pub fn add_unnamed<R>(&mut self, routine: R) -> Result<&mut Self, SessionError>
    where
        R: Routine + 'static,
    {
        let name = match function_name::<R>() {
            Some(name) => name,
            None => {
                let name = format!("impl_{}", self.unnamed_count + 1);
                if !self.contains(&name) {
                    self.unnamed_count += 1;
                }
                name
            }
        };
        self.add_implementation(name, routine)
    }

    /// Attach a probe invoked once per timed trial of every implementation.
    pub fn add_probe<P>(&mut self, probe: P) -> &mut Self
    where
        P: MetricProbe + 'static,
    {
        self.probes.push(Box::new(probe));
        self
    }

    /// Benchmark every implementation in registration order.
    ///
    /// On failure no results are stored and the session stays configured, so
    /// the run can be retried.
    pub fn run(&mut self) -> Result<&ComparisonResults, SessionError> {
        if self.implementations.is_empty() {
            return Err(SessionError::NotConfigured);
        }
        self.results = None;

        self.config.validate().map_err(|e| match e {
            TrialError::InvalidConfiguration(msg) => SessionError::InvalidConfiguration(msg),
            other => SessionError::InvalidConfiguration(other.to_string()),
        })?;

        let mut records = Vec::with_capacity(self.implementations.len());
        for implementation in &mut self.implementations {
            let run = run_trials_with_clock(
                &mut *implementation.routine,
                &self.config,
                &mut self.probes,
                &self.clock,
            )
            .map_err(|source| SessionError::Trial {
                name: implementation.name.clone(),
                source,
            })?;

            let record = BenchmarkRecord::new(implementation.name.clone(), self.config.warmup, run)
                .map_err(|source| SessionError::Stats {
                    name: implementation.name.clone(),
                    source,
                })?;
            records.push(record);
        }

        Ok(self.results.insert(ComparisonResults::new(records)))
    }

    /// Results of the last successful run.
    pub fn results(&self) -> Result<&ComparisonResults, SessionError> {
        self.results.as_ref().ok_or(SessionError::NoResults)
    }

    /// Drop all implementations and results. Probes and configuration are kept.
    pub fn clear(&mut self) {
        self.implementations.clear();
        self.results = None;
        self.unnamed_count = 0;
    }
}

/// Name of a plain function item, or `None` for closures.
///
/// Generic arguments are dropped before taking the last path segment, so
/// `Wrapper::<u8>::run` is named `run`.
fn function_name<R>() -> Option<String> {
    let full = type_name::<R>();
    if full.contains("{{closure}}") {
        return None;
    }

    let mut path = String::with_capacity(full.len());
    let mut depth = 0usize;
    for c in full.chars() {
        match c {
            '<' => depth += 1,
            '>' if depth > 0 => depth -= 1,
            _ if depth == 0 => path.push(c),
            _ => {}
        }
    }

    path.rsplit("::")
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
