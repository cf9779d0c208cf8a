//! Strength lookup command.

use super::{format_timestamp, resolve_team};
use crate::cli::types::{Parameter, Season};
use crate::error::{EngineError, Result};
use crate::storage::models::TeamRecord;
use crate::storage::StrengthDatabase;
use serde::Serialize;

/// Strength view for one team-in-competition, shaped for output.
#[derive(Debug, Serialize)]
pub struct StrengthView {
    pub competition: String,
    pub season: Season,
    pub overall_strength: Option<f64>,
    /// Presentation convenience; the 0-1 value is canonical.
    pub overall_percent: Option<f64>,
    pub local_league_strength: Option<f64>,
    pub european_strength: Option<f64>,
    pub confidence: Option<f64>,
    pub normalized: Vec<(String, Option<f64>)>,
    pub last_updated: u64,
}

impl From<&TeamRecord> for StrengthView {
    fn from(record: &TeamRecord) -> Self {
        Self {
            competition: record.competition_name.clone(),
            season: record.season,
            overall_strength: record.overall_strength,
            overall_percent: record.overall_percent(),
            local_league_strength: record.local_strength,
            european_strength: record.european_strength,
            confidence: record.confidence,
            normalized: Parameter::ALL
                .iter()
                .map(|p| {
                    (
                        p.key().to_string(),
                        record.normalized.get(p).copied().flatten(),
                    )
                })
                .collect(),
            last_updated: record.last_updated,
        }
    }
}

/// Look a team up by name and print its strength records for the season.
pub fn handle_strength(
    db: &StrengthDatabase,
    season: Season,
    name: &str,
    competition: Option<String>,
    as_json: bool,
) -> Result<()> {
    let team = resolve_team(db, name)?;
    let mut records = db.records_for_team(team.team_id, season)?;
    if let Some(filter) = &competition {
        records.retain(|r| r.competition_name.eq_ignore_ascii_case(filter));
    }
    if records.is_empty() {
        return Err(EngineError::InsufficientCoverage {
            team: team.name,
            missing: vec!["no records for the requested scope".to_string()],
        });
    }

    let views: Vec<StrengthView> = records.iter().map(StrengthView::from).collect();
    if as_json {
        let payload = serde_json::json!({ "team": team.name, "records": views });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("{}", team.name);
    for view in views {
        let overall = view
            .overall_percent
            .map(|p| format!("{p:.1}%"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {} ({}): overall {overall} local {} european {} confidence {} {}",
            view.competition,
            view.season,
            fmt_opt(view.local_league_strength),
            fmt_opt(view.european_strength),
            fmt_opt(view.confidence),
            format_timestamp(view.last_updated),
        );
        for (key, value) in &view.normalized {
            println!("    {key}: {}", fmt_opt(*value));
        }
    }
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.3}"))
        .unwrap_or_else(|| "-".to_string())
}
