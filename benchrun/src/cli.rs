//! Command-line interface for benchrun.

use crate::config::Config;
use benchrun_core::record::SortKey;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "benchrun")]
#[command(about = "Micro-benchmark competing implementations and rank them")]
#[command(version)]
pub struct Cli {
    /// Workload group(s) to run (repeatable; all groups when omitted)
    #[arg(short, long)]
    pub workload: Vec<String>,

    /// Number of timed trials per implementation
    #[arg(long)]
    pub runs: Option<usize>,

    /// Number of untimed warmup trials per implementation
    #[arg(long)]
    pub warmup: Option<usize>,

    /// Statistic used to rank results (mean, median, min, max)
    #[arg(long)]
    pub sort_by: Option<SortKey>,

    /// Only show mean and standard deviation columns
    #[arg(long)]
    pub compact: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Also print a bar chart of the ranking statistic
    #[arg(long)]
    pub chart: bool,

    /// Print results as JSON instead of a table
    #[arg(long, conflicts_with_all = ["chart", "compact"])]
    pub json: bool,

    /// List the available workload groups and exit
    #[arg(long)]
    pub list: bool,

    /// Input size passed to every workload
    #[arg(long, default_value_t = 1000)]
    pub size: usize,

    /// Path to config file (defaults to .benchrun.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply CLI overrides to the configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn apply_to_config(&self, config: &mut Config) {
        if let Some(runs) = self.runs {
            config.trials.runs = runs;
        }

        if let Some(warmup) = self.warmup {
            config.trials.warmup = warmup;
        }

        if let Some(sort_by) = self.sort_by {
            config.report.sort_by = sort_by;
        }

        if self.compact {
            config.report.show_all_stats = false;
        }

        if self.no_color {
            config.report.colors = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_to_config_with_overrides() {
        let cli = Cli::parse_from([
            "benchrun",
            "--runs",
            "20",
            "--warmup",
            "3",
            "--sort-by",
            "median",
            "--compact",
            "--no-color",
        ]);

        let mut config = Config::default();
        cli.apply_to_config(&mut config);

        assert_eq!(config.trials.runs, 20);
        assert_eq!(config.trials.warmup, 3);
        assert_eq!(config.report.sort_by, SortKey::Median);
        assert!(!config.report.show_all_stats);
        assert!(!config.report.colors);
    }

    #[test]
    fn test_apply_to_config_without_overrides() {
        let cli = Cli::parse_from(["benchrun"]);

        let mut config = Config::default();
        config.trials.runs = 42;
        config.report.sort_by = SortKey::Max;

        cli.apply_to_config(&mut config);

        assert_eq!(config.trials.runs, 42);
        assert_eq!(config.trials.warmup, 0);
        assert_eq!(config.report.sort_by, SortKey::Max);
        assert!(config.report.show_all_stats);
        assert!(config.report.colors);
    }

    #[test]
    fn test_cli_parse_minimal() {
        let cli = Cli::parse_from(["benchrun"]);

        assert!(cli.workload.is_empty());
        assert_eq!(cli.runs, None);
        assert_eq!(cli.warmup, None);
        assert_eq!(cli.sort_by, None);
        assert_eq!(cli.size, 1000);
        assert!(cli.config.is_none());
        assert!(!cli.json);
        assert!(!cli.list);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_workloads() {
        let cli = Cli::parse_from([
            "benchrun", "--workload", "sum", "-w", "fib", "--size", "64", "-v",
        ]);

        assert_eq!(cli.workload, vec!["sum", "fib"]);
        assert_eq!(cli.size, 64);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_sort_key_aliases() {
        let cli = Cli::parse_from(["benchrun", "--sort-by", "min_time"]);
        assert_eq!(cli.sort_by, Some(SortKey::Min));
    }

    #[test]
    fn test_cli_rejects_unknown_sort_key() {
        assert!(Cli::try_parse_from(["benchrun", "--sort-by", "fastest"]).is_err());
    }

    #[test]
    fn test_cli_json_conflicts_with_chart() {
        assert!(Cli::try_parse_from(["benchrun", "--json", "--chart"]).is_err());
    }
}
