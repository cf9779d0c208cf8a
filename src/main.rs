//! Entry point: parse CLI and dispatch to command handlers.

use clap::Parser;
use footy_odds::{
    cli::{Commands, FootyOdds},
    commands::{
        coverage::handle_coverage, odds::handle_odds, refresh::handle_refresh,
        strength::handle_strength, teams::handle_teams,
    },
    orchestrator::RefreshScope,
    storage::StrengthDatabase,
    EngineConfig, Result, CONFIG_ENV_VAR,
};
use std::path::PathBuf;

/// Run the CLI.
#[tokio::main]
async fn main() -> Result<()> {
    let app = FootyOdds::parse();

    let config_path = app.config.or_else(|| {
        std::env::var(CONFIG_ENV_VAR)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
    });
    let mut config = EngineConfig::load(config_path.as_deref())?;
    if let Some(season) = app.season {
        config.season = season;
    }

    let mut db = match &app.db {
        Some(path) => StrengthDatabase::open_at(path)?,
        None => StrengthDatabase::new()?,
    };

    match app.command {
        Commands::Refresh {
            competition,
            parameter,
            json,
            verbose,
        } => {
            let scope = RefreshScope {
                competitions: competition,
                parameters: parameter,
            };
            handle_refresh(&mut db, config, scope, json, verbose).await?
        }

        Commands::Teams { competition, json } => {
            handle_teams(&db, config.season, competition, json)?
        }

        Commands::Strength {
            name,
            competition,
            json,
        } => handle_strength(&db, config.season, &name, competition, json)?,

        Commands::Odds {
            home,
            away,
            neutral,
            json,
        } => handle_odds(&db, &config, &home, &away, neutral, json)?,

        Commands::Coverage { competition, json } => {
            handle_coverage(&db, config.season, competition, json)?
        }
    }

    Ok(())
}
