//! Parameter sweeps: one benchmark expanded over a list of input values.

use std::collections::HashSet;
use std::fmt::Display;

use benchrun_core::clock::Clock;
use benchrun_core::record::{BenchmarkRecord, ComparisonResults};
use benchrun_core::trial::Routine;

use crate::session::{ComparisonSession, SessionError};

/// A named benchmark expanded over the values of one parameter.
///
/// Each value becomes its own implementation named `name[key=value]`, so
/// `Sweep::new("fib", "n", vec![10, 20])` registers `fib[n=10]` and
/// `fib[n=20]`.
#[derive(Debug, Clone)]
pub struct Sweep<P> {
    name: String,
    key: String,
    values: Vec<P>,
}

impl<P> Sweep<P>
where
    P: Display + Clone,
{
    pub fn new(name: impl Into<String>, key: impl Into<String>, values: Vec<P>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the swept parameter.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn values(&self) -> &[P] {
        &self.values
    }

    /// Name of the implementation generated for `value`.
    pub fn entry_name(&self, value: &P) -> String {
        format!("{}[{}={}]", self.name, self.key, value)
    }

    /// Generated names in value order.
    pub fn names(&self) -> Vec<String> {
        self.values.iter().map(|v| self.entry_name(v)).collect()
    }

    /// Register one implementation per value, in value order.
    ///
    /// `factory` receives each value and returns the routine with that value
    /// bound. If any generated name is already taken, or two values render
    /// to the same name, nothing is registered.
    pub fn register<C, F, R>(
        &self,
        session: &mut ComparisonSession<C>,
        mut factory: F,
    ) -> Result<(), SessionError>
    where
        C: Clock,
        F: FnMut(P) -> R,
        R: Routine + 'static,
    {
        let names = self.names();

        let mut seen = HashSet::new();
        for name in &names {
            if session.contains(name) || !seen.insert(name.as_str()) {
                return Err(SessionError::DuplicateName(name.clone()));
            }
        }

        for (name, value) in names.into_iter().zip(self.values.iter().cloned()) {
            session.add_implementation(name, factory(value))?;
        }
        Ok(())
    }

    /// Pair each value with its record in `results`, in value order.
    ///
    /// Values without a record are skipped.
    pub fn records<'r>(&self, results: &'r ComparisonResults) -> Vec<(&P, &'r BenchmarkRecord)> {
        self.values
            .iter()
            .filter_map(|value| results.get(&self.entry_name(value)).map(|r| (value, r)))
            .collect()
    }
}
