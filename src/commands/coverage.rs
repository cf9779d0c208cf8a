//! Coverage and freshness report command.

use crate::cli::types::Season;
use crate::error::{EngineError, Result};
use crate::storage::StrengthDatabase;

/// Print coverage per competition for a season.
pub fn handle_coverage(
    db: &StrengthDatabase,
    season: Season,
    competition: Option<String>,
    as_json: bool,
) -> Result<()> {
    let mut reports = db.season_coverage(season)?;
    if let Some(filter) = &competition {
        reports.retain(|r| r.competition.eq_ignore_ascii_case(filter));
        if reports.is_empty() {
            return Err(EngineError::CompetitionNotFound {
                name: filter.clone(),
            });
        }
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    if reports.is_empty() {
        println!("No competitions stored for season {season}");
        return Ok(());
    }
    for report in reports {
        println!(
            "{} ({}): {:.1}% of cells filled across {} teams",
            report.competition,
            report.season,
            report.coverage * 100.0,
            report.team_count
        );
        for (parameter, count) in &report.filled {
            println!("  {parameter}: {count}/{}", report.team_count);
        }
        match (report.oldest_update, report.newest_update) {
            (Some(oldest), Some(newest)) => {
                println!("  updated between @{oldest} and @{newest}");
            }
            _ => println!("  no values written yet"),
        }
    }
    Ok(())
}
