use anyhow::{anyhow, Context, Result};
use benchrun::config::Config;
use benchrun::workloads::{self, WorkloadGroup};
use benchrun::{
    bar_chart, report, Cli, ComparisonResults, ComparisonSession, JsonReporter, Reporter,
};
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config and apply CLI overrides
    let mut config = Config::load_from(cli.config.as_deref())?;
    cli.apply_to_config(&mut config);

    if cli.verbose {
        eprintln!("Configuration: {:?}", config);
    }

    if cli.list {
        for group in workloads::groups() {
            println!("{:<6} {}", group.name, group.description);
        }
        return Ok(());
    }

    let selected = select_groups(&cli.workload)?;
    let trial_config = config.trials.trial_config();

    for group in selected {
        eprintln!(
            "Running {} benchmarks ({} runs, {} warmup, size {})...",
            group.name, trial_config.runs, trial_config.warmup, cli.size
        );

        let mut session = ComparisonSession::new(trial_config);
        group
            .register(&mut session, cli.size)
            .with_context(|| format!("Failed to register workload '{}'", group.name))?;

        if cli.verbose {
            eprintln!("Implementations: {}", session.names().collect::<Vec<_>>().join(", "));
        }

        let results = session
            .run()
            .with_context(|| format!("Failed to run workload '{}'", group.name))?;

        print_results(&cli, &config, results)?;
    }

    Ok(())
}

fn select_groups(names: &[String]) -> Result<Vec<WorkloadGroup>> {
    if names.is_empty() {
        return Ok(workloads::groups());
    }

    names
        .iter()
        .map(|name| {
            workloads::find(name).ok_or_else(|| {
                anyhow!(
                    "Unknown workload '{}'. Use --list to see the available workloads",
                    name
                )
            })
        })
        .collect()
}

fn print_results(
    cli: &Cli,
    config: &Config,
    results: &ComparisonResults,
) -> Result<(), report::ReportError> {
    if cli.json {
        return JsonReporter.report(results);
    }

    config.report.terminal_reporter().report(results)?;

    if cli.chart {
        println!(
            "{}",
            bar_chart(results, config.report.sort_by, config.report.bar_width)
        );
    }

    if cli.verbose {
        for record in results.ranked(config.report.sort_by) {
            eprintln!("{}", record);
            eprintln!(
                "  Stability: {} (CV {:.2}%)",
                record.summary().stability(),
                record.summary().coefficient_of_variation()
            );
            if let Some(metric) = record.metrics().first() {
                for (key, value) in metric.iter() {
                    eprintln!("  {}: {}", key, value);
                }
            }
        }
    }

    Ok(())
}
