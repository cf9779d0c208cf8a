//! Refresh command: run one orchestrated collection cycle.

use crate::collectors::default_collectors;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::orchestrator::{Orchestrator, RefreshReport, RefreshScope};
use crate::providers::football_api::FootballApiProvider;
use crate::providers::valuation::ValuationApiProvider;
use crate::storage::StrengthDatabase;
use std::sync::Arc;

/// Run a refresh cycle over the scope and print the report.
pub async fn handle_refresh(
    db: &mut StrengthDatabase,
    config: EngineConfig,
    scope: RefreshScope,
    as_json: bool,
    verbose: bool,
) -> Result<()> {
    let matches = Arc::new(FootballApiProvider::new(config.providers.matches.clone()));
    let valuation = Arc::new(ValuationApiProvider::new(config.providers.valuation.clone()));
    let collectors = default_collectors(matches.clone(), valuation);

    if verbose {
        eprintln!(
            "refreshing season {} with {} collectors, {} in-flight per provider",
            config.season,
            collectors.len(),
            config.collector.concurrency_per_provider
        );
    }

    let orchestrator = Orchestrator::new(config, matches, collectors)?;
    let report = orchestrator.run(db, &scope).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &RefreshReport) {
    println!(
        "Refresh for season {} finished in {:.1}s (cycle end {})",
        report.season, report.wall_secs, report.cycle_end
    );
    for (parameter, stats) in &report.parameters {
        println!(
            "  {parameter}: {} attempted, {} succeeded, {} transient, {} permanent",
            stats.attempted, stats.succeeded, stats.transient_failures, stats.permanent_failures
        );
    }
    for coverage in &report.competitions {
        println!(
            "  {} ({}): {:.1}% coverage across {} teams",
            coverage.competition,
            coverage.season,
            coverage.coverage * 100.0,
            coverage.team_count
        );
    }
    if report.deferred > 0 {
        println!("  {} tasks deferred to the next cycle", report.deferred);
    }
    for name in &report.failed_competitions {
        println!("  sync FAILED for {name}; derived values not recomputed");
    }
}
