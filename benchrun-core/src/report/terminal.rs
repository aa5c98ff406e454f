use std::io::{self, Write};

use colored::Colorize;

use super::{format_time, ReportError, Reporter};
use crate::record::{BenchmarkRecord, ComparisonResults, SortKey};

/// A reporter that prints a comparison table of benchmark results to the terminal.
#[derive(Debug, Clone)]
pub struct TerminalReporter {
    /// Whether to use colors in output (defaults to true).
    use_colors: bool,
    /// Statistic used to order the rows.
    sort_by: SortKey,
    /// Show median/min/max columns in addition to mean and std dev.
    show_all_stats: bool,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalReporter {
    /// Create a new terminal reporter with default settings.
    pub fn new() -> Self {
        Self {
            use_colors: true,
            sort_by: SortKey::Mean,
            show_all_stats: true,
        }
    }

    /// Create a terminal reporter with color output disabled.
    pub fn without_colors() -> Self {
        Self {
            use_colors: false,
            ..Self::new()
        }
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn sort_by(mut self, key: SortKey) -> Self {
        self.sort_by = key;
        self
    }

    pub fn show_all_stats(mut self, show: bool) -> Self {
        self.show_all_stats = show;
        self
    }

    fn paint_bold(&self, text: String) -> String {
        if self.use_colors {
            text.bold().to_string()
        } else {
            text
        }
    }

    fn paint_green(&self, text: String) -> String {
        if self.use_colors {
            text.green().bold().to_string()
        } else {
            text
        }
    }

    fn name_width(results: &ComparisonResults) -> usize {
        results
            .names()
            .map(|n| n.chars().count())
            .max()
            .unwrap_or(0)
            .max("Implementation".len())
    }

    fn format_speedup(record: &BenchmarkRecord, is_fastest: bool) -> String {
        let mut text = match record.speedup() {
            Some(speedup) => format!("{:.2}x", speedup),
            None => "N/A".to_string(),
        };
        if is_fastest {
            text.push_str(" ★");
        }
        text
    }

    /// Print the title and table header.
    fn print_header(&self, writer: &mut impl Write, name_width: usize) -> io::Result<()> {
        writeln!(writer)?;
        writeln!(writer, "{}", self.paint_bold("Benchmark Comparison".to_string()))?;
        writeln!(writer, "{}", "=".repeat(100))?;
        writeln!(writer)?;

        let header = if self.show_all_stats {
            format!(
                "{:<name_width$}  {:>12}  {:>12}  {:>12}  {:>12}  {:>12}  {:>10}",
                "Implementation", "Mean", "Median", "Std Dev", "Min", "Max", "Speedup"
            )
        } else {
            format!(
                "{:<name_width$}  {:>12}  {:>12}  {:>10}",
                "Implementation", "Mean", "Std Dev", "Speedup"
            )
        };
        let rule = "─".repeat(header.chars().count());
        writeln!(writer, "{}", self.paint_bold(header))?;
        writeln!(writer, "{}", rule)?;
        Ok(())
    }

    /// Print a single result row.
    fn print_row(
        &self,
        writer: &mut impl Write,
        record: &BenchmarkRecord,
        name_width: usize,
        is_fastest: bool,
    ) -> io::Result<()> {
        let summary = record.summary();

        // Pad before coloring so ANSI codes do not disturb alignment.
        let speedup = format!("{:>10}", Self::format_speedup(record, is_fastest));
        let speedup = if is_fastest {
            self.paint_green(speedup)
        } else {
            speedup
        };

        if self.show_all_stats {
            writeln!(
                writer,
                "{:<name_width$}  {:>12}  {:>12}  {:>12}  {:>12}  {:>12}  {}",
                record.name(),
                format_time(summary.mean),
                format_time(summary.median),
                format_time(summary.std_dev),
                format_time(summary.min),
                format_time(summary.max),
                speedup,
            )
        } else {
            writeln!(
                writer,
                "{:<name_width$}  {:>12}  {:>12}  {}",
                record.name(),
                format_time(summary.mean),
                format_time(summary.std_dev),
                speedup,
            )
        }
    }

    /// Print the summary footer.
    fn print_summary(
        &self,
        writer: &mut impl Write,
        fastest: &BenchmarkRecord,
        slowest: &BenchmarkRecord,
        count: usize,
    ) -> io::Result<()> {
        writeln!(writer)?;
        writeln!(writer, "{}", self.paint_bold("Summary:".to_string()))?;
        writeln!(
            writer,
            "  Fastest: {} ({})",
            fastest.name(),
            format_time(fastest.mean())
        )?;
        writeln!(
            writer,
            "  Slowest: {} ({})",
            slowest.name(),
            format_time(slowest.mean())
        )?;

        if count > 1 {
            if fastest.mean() > 0.0 {
                writeln!(
                    writer,
                    "  Difference: {:.2}x",
                    slowest.mean() / fastest.mean()
                )?;
            } else {
                writeln!(writer, "  Difference: N/A")?;
            }
        }

        writeln!(writer)?;
        Ok(())
    }

    /// Write the full comparison table for `results` to `writer`.
    pub fn write_to(&self, writer: &mut impl Write, results: &ComparisonResults) -> io::Result<()> {
        let ranked = results.ranked(self.sort_by);
        let (Some(&fastest), Some(&slowest)) = (ranked.first(), ranked.last()) else {
            return writeln!(writer, "No results to display.");
        };

        let name_width = Self::name_width(results);
        self.print_header(writer, name_width)?;

        for record in &ranked {
            let is_fastest = std::ptr::eq(*record, fastest);
            self.print_row(writer, record, name_width, is_fastest)?;
        }

        self.print_summary(writer, fastest, slowest, ranked.len())
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, results: &ComparisonResults) -> Result<(), ReportError> {
        let stdout = io::stdout();
        let mut writer = stdout.lock();

        self.write_to(&mut writer, results)?;

        Ok(())
    }
}
