//! Aggregate market value of the squad.

use super::{CollectContext, Collector, CollectorOutcome};
use crate::cli::types::Parameter;
use crate::providers::ValuationProvider;
use async_trait::async_trait;
use std::sync::Arc;

pub struct SquadValueCollector {
    provider: Arc<dyn ValuationProvider>,
}

impl SquadValueCollector {
    pub fn new(provider: Arc<dyn ValuationProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Collector for SquadValueCollector {
    fn parameter(&self) -> Parameter {
        Parameter::SquadValue
    }

    fn provider_name(&self) -> &str {
        self.provider.name()
    }

    async fn collect(&self, ctx: &CollectContext) -> CollectorOutcome {
        let squad = match self.provider.squad(&ctx.team.name).await {
            Ok(squad) => squad,
            Err(err) => return err.into(),
        };
        if squad.players.is_empty() {
            return CollectorOutcome::missing("empty squad");
        }
        if squad.players.iter().any(|p| p.market_value < 0.0) {
            return CollectorOutcome::missing("negative player market value");
        }
        let total: f64 = squad.players.iter().map(|p| p.market_value).sum();
        if total <= 0.0 {
            return CollectorOutcome::missing("squad has no market value");
        }
        CollectorOutcome::validated(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::test_support::context;
    use crate::providers::stub::StaticProvider;
    use crate::providers::{SquadPlayer, SquadSnapshot};

    fn squad(values: &[f64]) -> SquadSnapshot {
        SquadSnapshot {
            team: "Inter".to_string(),
            players: values
                .iter()
                .enumerate()
                .map(|(i, v)| SquadPlayer {
                    name: format!("P{i}"),
                    market_value: *v,
                    key_player: false,
                    available: true,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn sums_player_values() {
        let provider = Arc::new(StaticProvider::new("valuation"));
        provider.set_squad("Inter", squad(&[40e6, 25e6, 10e6]));
        let collector = SquadValueCollector::new(provider);

        let outcome = collector.collect(&context("Inter", "Serie A")).await;
        assert_eq!(outcome, CollectorOutcome::Value(75e6));
    }

    #[tokio::test]
    async fn negative_value_is_invalid() {
        let provider = Arc::new(StaticProvider::new("valuation"));
        provider.set_squad("Inter", squad(&[40e6, -5e6]));
        let collector = SquadValueCollector::new(provider);

        let outcome = collector.collect(&context("Inter", "Serie A")).await;
        match outcome {
            CollectorOutcome::Unavailable { permanent, reason } => {
                assert!(permanent);
                assert!(reason.contains("negative"));
            }
            other => panic!("expected unavailable, got {other:?}"),
        }
    }
}
