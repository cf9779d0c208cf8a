//! Odds lookup command: resolve two teams, select the comparable strength
//! variant, and price the markets.

use super::{resolve_team, round_odds};
use crate::cli::types::Parameter;
use crate::collectors::H2H_WINDOW;
use crate::config::{EngineConfig, PartialCoveragePolicy};
use crate::engine::odds::{
    price_markets, MarketPrices, MatchContext, OddsInput, PairwiseRecord, Quote, TeamSide,
};
use crate::error::{EngineError, Result};
use crate::storage::models::TeamRecord;
use crate::storage::StrengthDatabase;
use serde::Serialize;

/// Full odds payload for one pairing.
#[derive(Debug, Serialize)]
pub struct OddsResponse {
    pub home: String,
    pub away: String,
    pub context: MatchContext,
    /// Which strength variant the engine compared.
    pub strength_variant: String,
    /// Why that variant was selected.
    pub rationale: String,
    pub home_strength: f64,
    pub away_strength: f64,
    /// Minimum coverage confidence across the pair; 1.0 = full.
    pub confidence: f64,
    pub markets: MarketPrices,
}

/// Assemble the odds payload for a pairing. Read-only; prices with the
/// frozen configuration passed in.
pub fn build_odds(
    db: &StrengthDatabase,
    config: &EngineConfig,
    home_name: &str,
    away_name: &str,
    neutral_venue: bool,
) -> Result<OddsResponse> {
    let home_team = resolve_team(db, home_name)?;
    let away_team = resolve_team(db, away_name)?;

    let home_records = db.records_for_team(home_team.team_id, config.season)?;
    let away_records = db.records_for_team(away_team.team_id, config.season)?;

    let shared = home_records.iter().find_map(|h| {
        away_records
            .iter()
            .find(|a| a.competition_id == h.competition_id)
            .map(|a| (h, a))
    });

    let (home_record, away_record, same_competition) = match shared {
        Some((h, a)) => (h, a, true),
        None => (
            representative(&home_records, &home_team.name)?,
            representative(&away_records, &away_team.name)?,
            false,
        ),
    };

    if config.partial_coverage_policy == PartialCoveragePolicy::StrictNull {
        for record in [home_record, away_record] {
            if record.overall_strength.is_none() {
                return Err(insufficient(record, config));
            }
        }
    }

    let context = if neutral_venue {
        MatchContext::NeutralVenue
    } else if same_competition {
        MatchContext::SameCompetition
    } else {
        MatchContext::CrossCompetition
    };
    let (variant, rationale) = if same_competition {
        ("local-league", "same-competition")
    } else {
        ("european", "cross-competition")
    };

    let home_strength = selected_strength(home_record, same_competition, config)?;
    let away_strength = selected_strength(away_record, same_competition, config)?;

    let head_to_head = pairwise_record(db, home_record, away_record)?;

    let input = OddsInput {
        home: side_from(&home_team.name, home_strength, home_record),
        away: side_from(&away_team.name, away_strength, away_record),
        context,
        head_to_head,
    };
    let mut markets = price_markets(&input, &config.odds);
    round_markets(&mut markets);

    let confidence = home_record
        .confidence
        .unwrap_or(0.0)
        .min(away_record.confidence.unwrap_or(0.0));

    Ok(OddsResponse {
        home: home_team.name,
        away: away_team.name,
        context,
        strength_variant: variant.to_string(),
        rationale: rationale.to_string(),
        home_strength,
        away_strength,
        confidence,
        markets,
    })
}

/// Cross-competition comparisons need a single record per team: prefer one
/// that carries a european strength, then any with an overall strength.
fn representative<'a>(records: &'a [TeamRecord], team: &str) -> Result<&'a TeamRecord> {
    records
        .iter()
        .find(|r| r.european_strength.is_some())
        .or_else(|| records.iter().find(|r| r.overall_strength.is_some()))
        .or_else(|| records.first())
        .ok_or_else(|| EngineError::InsufficientCoverage {
            team: team.to_string(),
            missing: vec!["no records for the active season".to_string()],
        })
}

/// The §4.5 selection rule: local strength within one competition,
/// european strength across competitions, overall strength as the last
/// resort when the variant has not been derived yet.
fn selected_strength(
    record: &TeamRecord,
    same_competition: bool,
    config: &EngineConfig,
) -> Result<f64> {
    let variant = if same_competition {
        record.local_strength
    } else {
        record.european_strength
    };
    variant
        .or(record.overall_strength)
        .ok_or_else(|| insufficient(record, config))
}

fn insufficient(record: &TeamRecord, config: &EngineConfig) -> EngineError {
    let missing: Vec<String> = Parameter::ALL
        .iter()
        .filter(|p| config.weights.get(**p) > 0.0)
        .filter(|p| record.normalized.get(*p).copied().flatten().is_none())
        .map(|p| p.key().to_string())
        .collect();
    EngineError::InsufficientCoverage {
        team: record.team.name.clone(),
        missing,
    }
}

fn side_from(name: &str, strength: f64, record: &TeamRecord) -> TeamSide {
    let normalized = |p: Parameter| record.normalized.get(&p).copied().flatten();
    TeamSide {
        name: name.to_string(),
        strength,
        attacking: normalized(Parameter::OffensiveRating),
        defending: normalized(Parameter::DefensiveRating),
        style: normalized(Parameter::TacticalMatchup),
    }
}

/// Stored meetings between the pair, seen from the home side.
fn pairwise_record(
    db: &StrengthDatabase,
    home: &TeamRecord,
    away: &TeamRecord,
) -> Result<Option<PairwiseRecord>> {
    let meetings = db.head_to_head(home.team.team_id, away.team.team_id, H2H_WINDOW as u32)?;
    if meetings.is_empty() {
        return Ok(None);
    }
    let mut record = PairwiseRecord::default();
    for meeting in meetings {
        let (Some(home_goals), Some(away_goals)) = (meeting.home_goals, meeting.away_goals) else {
            continue;
        };
        let home_side_goals = if meeting.home_team_id == home.team.team_id {
            (home_goals, away_goals)
        } else {
            (away_goals, home_goals)
        };
        if home_side_goals.0 > home_side_goals.1 {
            record.home_wins += 1;
        } else if home_side_goals.0 == home_side_goals.1 {
            record.draws += 1;
        } else {
            record.away_wins += 1;
        }
    }
    Ok(Some(record))
}

fn round_quote(quote: &mut Quote) {
    quote.decimal_odds = round_odds(quote.decimal_odds);
}

fn round_markets(markets: &mut MarketPrices) {
    round_quote(&mut markets.one_x_two.home);
    round_quote(&mut markets.one_x_two.draw);
    round_quote(&mut markets.one_x_two.away);
    round_quote(&mut markets.over_under.over);
    round_quote(&mut markets.over_under.under);
    round_quote(&mut markets.btts.yes);
    round_quote(&mut markets.btts.no);
}

/// Print the odds payload for a pairing.
pub fn handle_odds(
    db: &StrengthDatabase,
    config: &EngineConfig,
    home: &str,
    away: &str,
    neutral_venue: bool,
    as_json: bool,
) -> Result<()> {
    let response = build_odds(db, config, home, away, neutral_venue)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!(
        "{} vs {} [{} / {}]",
        response.home, response.away, response.strength_variant, response.rationale
    );
    println!(
        "strengths: {:.3} vs {:.3} (confidence {:.2})",
        response.home_strength, response.away_strength, response.confidence
    );
    let m = &response.markets;
    println!(
        "1X2: H {:.3} @ {:.2} | D {:.3} @ {:.2} | A {:.3} @ {:.2}",
        m.one_x_two.home.probability,
        m.one_x_two.home.decimal_odds,
        m.one_x_two.draw.probability,
        m.one_x_two.draw.decimal_odds,
        m.one_x_two.away.probability,
        m.one_x_two.away.decimal_odds,
    );
    println!(
        "O/U {:.1}: over {:.3} @ {:.2} | under {:.3} @ {:.2}",
        m.over_under.line,
        m.over_under.over.probability,
        m.over_under.over.decimal_odds,
        m.over_under.under.probability,
        m.over_under.under.decimal_odds,
    );
    println!(
        "BTTS: yes {:.3} @ {:.2} | no {:.3} @ {:.2}",
        m.btts.yes.probability,
        m.btts.yes.decimal_odds,
        m.btts.no.probability,
        m.btts.no.decimal_odds,
    );
    println!(
        "expected goals {:.2}, most likely score {}",
        m.expected_goals, m.likely_score
    );
    Ok(())
}
