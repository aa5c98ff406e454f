//! JSON output of comparison results.

use std::io::{self, Write};

use serde::Serialize;

use super::{ReportError, Reporter};
use crate::record::{ComparisonResults, SortKey};

/// Top-level JSON document.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    /// Name of the fastest implementation by mean.
    fastest: Option<&'a str>,
    results: &'a ComparisonResults,
}

/// Serialize results, in registration order, as prettified JSON.
pub fn to_json(results: &ComparisonResults) -> Result<String, serde_json::Error> {
    let report = JsonReport {
        fastest: results.fastest(SortKey::Mean).map(|r| r.name()),
        results,
    };
    serde_json::to_string_pretty(&report)
}

/// A reporter that prints results as JSON to stdout.
#[derive(Debug, Clone, Default)]
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn report(&self, results: &ComparisonResults) -> Result<(), ReportError> {
        let json = to_json(results)?;
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        writeln!(writer, "{}", json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::BenchmarkRecord;
    use crate::stats::SampleSet;
    use crate::trial::{TrialMetric, TrialRun};

    #[test]
    fn test_to_json_structure() {
        let run = TrialRun {
            samples: SampleSet::new(vec![0.25, 0.75]).unwrap(),
            metrics: vec![
                TrialMetric::new().with("bytes", 64),
                TrialMetric::new().with("bytes", 128),
            ],
        };
        let results = ComparisonResults::new(vec![BenchmarkRecord::new("probe", 1, run).unwrap()]);

        let json = to_json(&results).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["fastest"], "probe");
        let record = &value["results"][0];
        assert_eq!(record["runs"], 2);
        assert_eq!(record["warmup"], 1);
        assert_eq!(record["summary"]["mean"], 0.5);
        assert_eq!(record["metrics"][1]["bytes"], 128);
    }

    #[test]
    fn test_to_json_empty() {
        let json = to_json(&ComparisonResults::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["fastest"].is_null());
        assert_eq!(value["results"], serde_json::json!([]));
    }
}
