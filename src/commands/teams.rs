//! Team directory command.

use crate::cli::types::Season;
use crate::error::Result;
use crate::storage::StrengthDatabase;

/// List teams for a season, optionally restricted to one competition.
pub fn handle_teams(
    db: &StrengthDatabase,
    season: Season,
    competition: Option<String>,
    as_json: bool,
) -> Result<()> {
    let directory = db.team_directory(season, competition.as_deref())?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&directory)?);
        return Ok(());
    }

    if directory.is_empty() {
        println!("No teams stored for season {season}");
        return Ok(());
    }
    for entry in directory {
        let confederation = entry.confederation.as_deref().unwrap_or("-");
        println!(
            "{} {} [{}] {}",
            entry.team_id,
            entry.name,
            confederation,
            entry.competitions.join(", ")
        );
    }
    Ok(())
}
