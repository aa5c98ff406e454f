//! Built-in workload groups run by the `benchrun` binary.
//!
//! Each group registers competing implementations of one operation into a
//! session. Inputs are built once at registration time and captured by the
//! closures, so only the operation itself is timed.

use std::convert::Infallible;
use std::hint::black_box;

use benchrun_core::trial::{FnProbe, MetricProbe, Output, Routine, TrialMetric};

use crate::session::{ComparisonSession, SessionError};
use crate::sweep::Sweep;

type RegisterFn = fn(&mut ComparisonSession, usize) -> Result<(), SessionError>;

/// A named set of implementations compared against each other.
#[derive(Clone, Copy)]
pub struct WorkloadGroup {
    pub name: &'static str,
    pub description: &'static str,
    register: RegisterFn,
}

impl WorkloadGroup {
    /// Register this group's implementations for an input of `size`.
    pub fn register(
        &self,
        session: &mut ComparisonSession,
        size: usize,
    ) -> Result<(), SessionError> {
        (self.register)(session, size)
    }
}

impl std::fmt::Debug for WorkloadGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkloadGroup")
            .field("name", &self.name)
            .finish()
    }
}

/// All workload groups, in display order.
pub fn groups() -> Vec<WorkloadGroup> {
    vec![
        WorkloadGroup {
            name: "sum",
            description: "Summing 0..size with a loop, iterator adaptors and a closed form",
            register: register_sum,
        },
        WorkloadGroup {
            name: "sort",
            description: "Sorting a reversed vector of `size` integers",
            register: register_sort,
        },
        WorkloadGroup {
            name: "fib",
            description: "Recursive vs iterative Fibonacci over a sweep of n",
            register: register_fib,
        },
    ]
}

pub fn find(name: &str) -> Option<WorkloadGroup> {
    groups().into_iter().find(|g| g.name == name)
}

/// Probe recording the input size alongside every timed trial.
fn input_size_probe(size: usize) -> impl MetricProbe {
    FnProbe::new("input_size", move |_: &mut dyn Routine, _: &Output| {
        Ok(TrialMetric::new().with("input_size", size))
    })
}

/// Probe checking the vector a sort routine produced.
fn sorted_output_probe() -> impl MetricProbe {
    FnProbe::new("sorted_output", |_: &mut dyn Routine, output: &Output| {
        let mut metric = TrialMetric::new();
        if let Some(data) = output.downcast_ref::<Vec<u32>>() {
            metric.insert("elements", data.len());
            metric.insert("sorted", data.windows(2).all(|w| w[0] <= w[1]));
        }
        Ok(metric)
    })
}

fn register_sum(session: &mut ComparisonSession, size: usize) -> Result<(), SessionError> {
    let n = size as u64;
    session
        .add_probe(input_size_probe(size))
        .add_implementation("for_loop", move || {
            let mut total = 0u64;
            for i in 0..black_box(n) {
                total = total.wrapping_add(i);
            }
            black_box(total);
        })?
        .add_implementation("iterator_sum", move || {
            black_box((0..black_box(n)).sum::<u64>());
        })?
        .add_implementation("fold", move || {
            black_box((0..black_box(n)).fold(0u64, |acc, i| acc.wrapping_add(i)));
        })?
        .add_implementation("closed_form", move || {
            black_box(closed_form_sum(black_box(n)));
        })?;
    Ok(())
}

/// Sum of `0..n`, wrapping on overflow like the looping variants.
pub fn closed_form_sum(n: u64) -> u64 {
    n.saturating_sub(1).wrapping_mul(n) / 2
}

fn reversed(size: usize) -> Vec<u32> {
    (0..size as u32).rev().collect()
}

pub fn bubble_sort<T: PartialOrd>(items: &mut [T]) {
    let len = items.len();
    for pass in 0..len {
        let mut swapped = false;
        for j in 0..len - 1 - pass {
            if items[j] > items[j + 1] {
                items.swap(j, j + 1);
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }
}

pub fn insertion_sort<T: PartialOrd>(items: &mut [T]) {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && items[j - 1] > items[j] {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}

fn register_sort(session: &mut ComparisonSession, size: usize) -> Result<(), SessionError> {
    let input = reversed(size);

    // Each trial sorts a fresh copy so every run sees the same input.
    let sorter = |sort: fn(&mut [u32])| {
        let input = input.clone();
        move || {
            let mut data = input.clone();
            sort(&mut data);
            Ok::<_, Infallible>(data)
        }
    };

    session
        .add_probe(sorted_output_probe())
        .add_implementation("bubble_sort", sorter(bubble_sort))?
        .add_implementation("insertion_sort", sorter(insertion_sort))?
        .add_implementation("std_sort", sorter(|d: &mut [u32]| d.sort()))?
        .add_implementation(
            "std_sort_unstable",
            sorter(|d: &mut [u32]| d.sort_unstable()),
        )?;
    Ok(())
}

pub fn fib_recursive(n: u32) -> u64 {
    if n < 2 {
        n as u64
    } else {
        fib_recursive(n - 1) + fib_recursive(n - 2)
    }
}

pub fn fib_iterative(n: u32) -> u64 {
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 0..n {
        let next = a.wrapping_add(b);
        a = b;
        b = next;
    }
    a
}

/// Sweep values for `fib`: `size` only scales the sweep, recursion stays bounded.
fn fib_inputs(size: usize) -> Vec<u32> {
    let top = (size.max(1).ilog2() * 2).clamp(5, 25);
    let mut values = vec![top / 2, (top * 3) / 4, top];
    values.dedup();
    values
}

fn register_fib(session: &mut ComparisonSession, size: usize) -> Result<(), SessionError> {
    let inputs = fib_inputs(size);

    Sweep::new("recursive", "n", inputs.clone())
        .register(session, |n| move || {
            black_box(fib_recursive(black_box(n)));
        })?;
    Sweep::new("iterative", "n", inputs)
        .register(session, |n| move || {
            black_box(fib_iterative(black_box(n)));
        })?;
    Ok(())
}
