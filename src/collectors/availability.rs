//! Fraction of key players fit to play, quality-weighted.

use super::{CollectContext, Collector, CollectorOutcome};
use crate::cli::types::Parameter;
use crate::providers::{SquadPlayer, ValuationProvider};
use async_trait::async_trait;
use std::sync::Arc;

pub struct AvailabilityCollector {
    provider: Arc<dyn ValuationProvider>,
}

impl AvailabilityCollector {
    pub fn new(provider: Arc<dyn ValuationProvider>) -> Self {
        Self { provider }
    }
}

/// Value-weighted availability over the key players; a missing star weighs
/// more than a missing rotation piece. Squads without key-player flags fall
/// back to the whole squad.
pub(crate) fn availability_ratio(players: &[SquadPlayer]) -> Option<f64> {
    let key: Vec<&SquadPlayer> = players.iter().filter(|p| p.key_player).collect();
    let pool: Vec<&SquadPlayer> = if key.is_empty() {
        players.iter().collect()
    } else {
        key
    };

    let total: f64 = pool.iter().map(|p| p.market_value.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }
    let fit: f64 = pool
        .iter()
        .filter(|p| p.available)
        .map(|p| p.market_value.max(0.0))
        .sum();
    Some(fit / total)
}

#[async_trait]
impl Collector for AvailabilityCollector {
    fn parameter(&self) -> Parameter {
        Parameter::KeyPlayerAvailability
    }

    fn provider_name(&self) -> &str {
        self.provider.name()
    }

    async fn collect(&self, ctx: &CollectContext) -> CollectorOutcome {
        let squad = match self.provider.squad(&ctx.team.name).await {
            Ok(squad) => squad,
            Err(err) => return err.into(),
        };
        match availability_ratio(&squad.players) {
            Some(ratio) => CollectorOutcome::validated(ratio),
            None => CollectorOutcome::missing("squad carries no market value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(value: f64, key_player: bool, available: bool) -> SquadPlayer {
        SquadPlayer {
            name: "p".to_string(),
            market_value: value,
            key_player,
            available,
        }
    }

    #[test]
    fn weighted_by_value() {
        // The 40M star is out; the 10M key player is fit.
        let players = [player(40e6, true, false), player(10e6, true, true)];
        let ratio = availability_ratio(&players).unwrap();
        assert!((ratio - 0.2).abs() < 1e-12);
    }

    #[test]
    fn all_fit_is_one() {
        let players = [player(40e6, true, true), player(10e6, true, true)];
        assert_eq!(availability_ratio(&players), Some(1.0));
    }

    #[test]
    fn falls_back_to_full_squad_without_key_flags() {
        let players = [player(10e6, false, true), player(10e6, false, false)];
        let ratio = availability_ratio(&players).unwrap();
        assert!((ratio - 0.5).abs() < 1e-12);
    }

    #[test]
    fn valueless_squad_yields_none() {
        let players = [player(0.0, true, true)];
        assert_eq!(availability_ratio(&players), None);
    }
}
