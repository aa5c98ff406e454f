use crate::record::{ComparisonResults, SortKey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait Reporter: Send + Sync {
    fn report(&self, results: &ComparisonResults) -> Result<(), ReportError>;
}

/// Format a duration in seconds with the most readable unit.
pub fn format_time(seconds: f64) -> String {
    if seconds >= 1.0 {
        format!("{:.6}s", seconds)
    } else if seconds >= 1e-3 {
        format!("{:.3}ms", seconds * 1e3)
    } else if seconds >= 1e-6 {
        format!("{:.3}μs", seconds * 1e6)
    } else {
        format!("{:.3}ns", seconds * 1e9)
    }
}

/// Per-record detail lines, ordered by `key`.
pub fn format_results_table(results: &ComparisonResults, key: SortKey) -> Vec<String> {
    if results.is_empty() {
        return vec!["No results to display.".to_string()];
    }

    let mut lines = vec![
        String::new(),
        "Benchmark Results".to_string(),
        "=".repeat(50),
    ];

    for record in results.ranked(key) {
        let summary = record.summary();
        lines.push(String::new());
        lines.push(format!("{}:", record.name()));
        lines.push(format!("  Mean:   {}", format_time(summary.mean)));
        lines.push(format!("  Median: {}", format_time(summary.median)));
        lines.push(format!("  Std:    {}", format_time(summary.std_dev)));
        lines.push(format!("  Min:    {}", format_time(summary.min)));
        lines.push(format!("  Max:    {}", format_time(summary.max)));
        if let Some(speedup) = record.speedup() {
            lines.push(format!("  Speedup: {:.2}x", speedup));
        }
    }

    lines
}

/// ASCII bar chart of `key`, with the largest value spanning `width` cells.
pub fn bar_chart(results: &ComparisonResults, key: SortKey, width: usize) -> String {
    if results.is_empty() {
        return "No results to display.".to_string();
    }

    let ranked = results.ranked(key);
    let max_value = ranked
        .iter()
        .map(|r| key.value(r.summary()))
        .fold(0.0, f64::max);
    if max_value == 0.0 {
        return "All values are zero.".to_string();
    }

    let name_width = ranked
        .iter()
        .map(|r| r.name().chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = vec![
        String::new(),
        format!("Bar Chart ({})", key),
        "=".repeat(width + 30),
        String::new(),
    ];

    for record in ranked {
        let value = key.value(record.summary());
        let bar_length = ((value / max_value) * width as f64) as usize;
        lines.push(format!(
            "{:<name_width$}  {}  {}",
            record.name(),
            "█".repeat(bar_length),
            format_time(value),
        ));
    }
    lines.push(String::new());

    lines.join("\n")
}

pub mod json;
mod terminal;
pub use json::JsonReporter;
pub use terminal::TerminalReporter;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::BenchmarkRecord;
    use crate::stats::SampleSet;
    use crate::trial::TrialRun;

    fn results(entries: Vec<(&str, Vec<f64>)>) -> ComparisonResults {
        ComparisonResults::new(
            entries
                .into_iter()
                .map(|(name, durations)| {
                    let run = TrialRun {
                        samples: SampleSet::new(durations).unwrap(),
                        metrics: Vec::new(),
                    };
                    BenchmarkRecord::new(name, 0, run).unwrap()
                })
                .collect(),
        )
    }

    #[test]
    fn test_format_time_units() {
        assert_eq!(format_time(1.5), "1.500000s");
        assert_eq!(format_time(0.0012346), "1.235ms");
        assert_eq!(format_time(0.0000025), "2.500μs");
        assert_eq!(format_time(0.000000123), "123.000ns");
        assert_eq!(format_time(0.0), "0.000ns");
    }

    #[test]
    fn test_format_results_table() {
        let results = results(vec![("slow", vec![0.002, 0.002]), ("fast", vec![0.001, 0.001])]);
        let lines = format_results_table(&results, SortKey::Mean);

        assert_eq!(lines[1], "Benchmark Results");
        let fast = lines.iter().position(|l| l == "fast:").unwrap();
        let slow = lines.iter().position(|l| l == "slow:").unwrap();
        assert!(fast < slow);
        assert!(lines.contains(&"  Mean:   1.000ms".to_string()));
        assert!(lines.contains(&"  Speedup: 0.50x".to_string()));
    }

    #[test]
    fn test_format_results_table_empty() {
        let lines = format_results_table(&ComparisonResults::default(), SortKey::Mean);
        assert_eq!(lines, vec!["No results to display."]);
    }

    #[test]
    fn test_bar_chart_scales_to_largest() {
        let results = results(vec![("fast", vec![1.0]), ("slow", vec![4.0])]);
        let chart = bar_chart(&results, SortKey::Mean, 40);

        assert!(chart.contains("Bar Chart (mean)"));
        let fast_line = chart.lines().find(|l| l.starts_with("fast")).unwrap();
        let slow_line = chart.lines().find(|l| l.starts_with("slow")).unwrap();
        assert_eq!(fast_line.matches('█').count(), 10);
        assert_eq!(slow_line.matches('█').count(), 40);
    }

    #[test]
    fn test_bar_chart_edge_cases() {
        assert_eq!(
            bar_chart(&ComparisonResults::default(), SortKey::Mean, 10),
            "No results to display."
        );
        let zeros = results(vec![("a", vec![0.0]), ("b", vec![0.0])]);
        assert_eq!(bar_chart(&zeros, SortKey::Max, 10), "All values are zero.");
    }
}
