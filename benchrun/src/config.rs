//! Configuration loading for benchrun.
//!
//! Supports loading configuration from TOML files, with sensible defaults
//! for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use benchrun_core::record::SortKey;
use benchrun_core::report::TerminalReporter;
use benchrun_core::trial::TrialConfig;

/// Top-level configuration for benchrun.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings shared by every comparison session.
    pub trials: TrialsConfig,
    /// Settings for rendering results.
    pub report: ReportConfig,
}

/// How many times each implementation is executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialsConfig {
    /// Number of timed trials per implementation.
    pub runs: usize,
    /// Number of untimed trials executed first.
    pub warmup: usize,
}

/// Configuration for result output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Statistic used to order table rows and charts.
    pub sort_by: SortKey,
    /// Show median/min/max columns in the comparison table.
    pub show_all_stats: bool,
    /// Colorize terminal output.
    pub colors: bool,
    /// Width of the longest bar in `--chart` output.
    pub bar_width: usize,
}

impl Default for TrialsConfig {
    fn default() -> Self {
        let defaults = TrialConfig::default();
        Self {
            runs: defaults.runs,
            warmup: defaults.warmup,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            sort_by: SortKey::Mean,
            show_all_stats: true,
            colors: true,
            bar_width: 50,
        }
    }
}

impl TrialsConfig {
    pub fn trial_config(&self) -> TrialConfig {
        TrialConfig::new(self.runs, self.warmup)
    }
}

impl ReportConfig {
    /// Terminal reporter honouring these settings.
    pub fn terminal_reporter(&self) -> TerminalReporter {
        TerminalReporter::new()
            .with_colors(self.colors)
            .sort_by(self.sort_by)
            .show_all_stats(self.show_all_stats)
    }
}

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = ".benchrun.toml";

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load `.benchrun.toml` from the current directory, or use defaults
    /// when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be parsed.
    pub fn load_or_default() -> Result<Config> {
        let path = Path::new(DEFAULT_CONFIG_FILE);

        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from `path` if given, otherwise fall back to [`Config::load_or_default`].
    pub fn load_from(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(p) => Self::load(p),
            None => Self::load_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.trials.runs, 100);
        assert_eq!(config.trials.warmup, 0);
        assert_eq!(config.report.sort_by, SortKey::Mean);
        assert!(config.report.show_all_stats);
        assert!(config.report.colors);
        assert_eq!(config.report.bar_width, 50);
    }

    #[test]
    fn test_load_partial_config() {
        let toml_content = r#"
[trials]
warmup = 10

[report]
sort_by = "median"
"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.trials.warmup, 10);
        assert_eq!(config.report.sort_by, SortKey::Median);

        assert_eq!(config.trials.runs, 100);
        assert!(config.report.colors);
    }

    #[test]
    fn test_load_full_config() {
        let toml_content = r#"
[trials]
runs = 250
warmup = 5

[report]
sort_by = "min"
show_all_stats = false
colors = false
bar_width = 30
"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.trials.trial_config(), TrialConfig::new(250, 5));
        assert_eq!(config.report.sort_by, SortKey::Min);
        assert!(!config.report.show_all_stats);
        assert!(!config.report.colors);
        assert_eq!(config.report.bar_width, 30);
    }

    #[test]
    fn test_load_unknown_sort_key() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[report]\nsort_by = \"fastest\"\n").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"this is not valid toml {{{{").unwrap();

        let result = Config::load(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[trials]\nruns = 7\n").unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.trials.runs, 7);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = Config::default();
        config.report.sort_by = SortKey::Max;
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.trials.runs, config.trials.runs);
        assert_eq!(parsed.report.sort_by, SortKey::Max);
        assert_eq!(parsed.report.bar_width, config.report.bar_width);
    }
}
