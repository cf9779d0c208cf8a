//! CLI argument definitions and parsing structures.

use super::types::{Parameter, Season};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(
    name = "footy-odds",
    about = "Team-strength scores and betting odds for football competitions"
)]
pub struct FootyOdds {
    /// Path to the SQLite database (or set `FOOTY_ODDS_DB`).
    #[clap(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to a JSON configuration file (or set `FOOTY_ODDS_CONFIG`).
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Season tag override (e.g. 2025); defaults to the configured season.
    #[clap(long, short, global = true)]
    pub season: Option<Season>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a refresh cycle: collect raw values, renormalize and reaggregate.
    ///
    /// With no `--competition`, refreshes every competition already stored
    /// for the season; naming an unknown competition discovers it through
    /// the match provider.
    Refresh {
        /// Competition to refresh (repeatable).
        #[clap(long, short)]
        competition: Vec<String>,

        /// Restrict collection to a parameter subset (repeatable).
        #[clap(short = 'p', long = "parameter", value_parser = clap::value_parser!(Parameter))]
        parameter: Vec<Parameter>,

        /// Output the refresh report as JSON instead of text lines.
        #[clap(long)]
        json: bool,

        /// Show progress detail on stderr.
        #[clap(long)]
        verbose: bool,
    },

    /// List stored teams with the competitions they play in.
    Teams {
        /// Filter by competition name.
        #[clap(long, short)]
        competition: Option<String>,

        /// Output as JSON instead of text lines.
        #[clap(long)]
        json: bool,
    },

    /// Look up a team's strength scores and normalized parameters.
    Strength {
        /// Team name (case-insensitive; substring match as a fallback).
        name: String,

        /// Restrict to one competition.
        #[clap(long, short)]
        competition: Option<String>,

        /// Output as JSON instead of text lines.
        #[clap(long)]
        json: bool,
    },

    /// Price the 1X2, over/under 2.5 and BTTS markets for a pairing.
    Odds {
        /// Home side.
        home: String,

        /// Away side.
        away: String,

        /// Price for a neutral venue (no home boost).
        #[clap(long)]
        neutral: bool,

        /// Output as JSON instead of text lines.
        #[clap(long)]
        json: bool,
    },

    /// Coverage and freshness per competition.
    Coverage {
        /// Filter by competition name.
        #[clap(long, short)]
        competition: Option<String>,

        /// Output as JSON instead of text lines.
        #[clap(long)]
        json: bool,
    },
}
