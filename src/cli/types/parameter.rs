//! The fixed strength-parameter set.
//!
//! Weight vectors, normalized maps and aggregation all key off this enum, so
//! the set and its order are frozen. Adding a parameter means extending `ALL`
//! and the default weight table together; the weight-sum invariant is checked
//! at startup.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One strength parameter of a team-in-competition record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Elo,
    SquadValue,
    Form,
    SquadDepth,
    KeyPlayerAvailability,
    Motivation,
    TacticalMatchup,
    OffensiveRating,
    DefensiveRating,
    H2hPerformance,
}

/// Whether larger raw values mean a stronger team.
///
/// Every parameter in the current set is higher-is-better; the normalizer
/// still supports inversion so a lower-is-better parameter can be added
/// without touching the scaling code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    HigherIsBetter,
    LowerIsBetter,
}

impl Parameter {
    /// Every parameter, in frozen order.
    pub const ALL: [Parameter; 10] = [
        Parameter::Elo,
        Parameter::SquadValue,
        Parameter::Form,
        Parameter::SquadDepth,
        Parameter::KeyPlayerAvailability,
        Parameter::Motivation,
        Parameter::TacticalMatchup,
        Parameter::OffensiveRating,
        Parameter::DefensiveRating,
        Parameter::H2hPerformance,
    ];

    /// Stable storage/config key.
    pub fn key(&self) -> &'static str {
        match self {
            Parameter::Elo => "elo",
            Parameter::SquadValue => "squad_value",
            Parameter::Form => "form",
            Parameter::SquadDepth => "squad_depth",
            Parameter::KeyPlayerAvailability => "key_player_availability",
            Parameter::Motivation => "motivation",
            Parameter::TacticalMatchup => "tactical_matchup",
            Parameter::OffensiveRating => "offensive_rating",
            Parameter::DefensiveRating => "defensive_rating",
            Parameter::H2hPerformance => "h2h_performance",
        }
    }

    /// Declared default weight; the full vector sums to 1.0.
    pub fn default_weight(&self) -> f64 {
        match self {
            Parameter::Elo => 0.18,
            Parameter::SquadValue => 0.15,
            Parameter::Form => 0.05,
            Parameter::SquadDepth => 0.02,
            Parameter::KeyPlayerAvailability => 0.10,
            Parameter::Motivation => 0.10,
            Parameter::TacticalMatchup => 0.10,
            Parameter::OffensiveRating => 0.10,
            Parameter::DefensiveRating => 0.10,
            Parameter::H2hPerformance => 0.10,
        }
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::HigherIsBetter
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Parameter {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .iter()
            .copied()
            .find(|p| p.key() == s)
            .ok_or_else(|| EngineError::UnknownParameter {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let sum: f64 = Parameter::ALL.iter().map(|p| p.default_weight()).sum();
        assert!((sum - 1.0).abs() < 1e-9, "weights sum to {sum}");
    }

    #[test]
    fn keys_round_trip_through_from_str() {
        for p in Parameter::ALL {
            assert_eq!(p.key().parse::<Parameter>().unwrap(), p);
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = "fatigue".parse::<Parameter>().unwrap_err();
        assert!(matches!(err, EngineError::UnknownParameter { .. }));
    }

    #[test]
    fn serde_uses_snake_case_keys() {
        let json = serde_json::to_string(&Parameter::KeyPlayerAvailability).unwrap();
        assert_eq!(json, "\"key_player_availability\"");
        let back: Parameter = serde_json::from_str("\"h2h_performance\"").unwrap();
        assert_eq!(back, Parameter::H2hPerformance);
    }
}
