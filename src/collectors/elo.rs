//! Match-based team rating from the external provider.

use super::{CollectContext, Collector, CollectorOutcome};
use crate::cli::types::Parameter;
use crate::providers::MatchDataProvider;
use async_trait::async_trait;
use std::sync::Arc;

pub struct EloCollector {
    provider: Arc<dyn MatchDataProvider>,
}

impl EloCollector {
    pub fn new(provider: Arc<dyn MatchDataProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Collector for EloCollector {
    fn parameter(&self) -> Parameter {
        Parameter::Elo
    }

    fn provider_name(&self) -> &str {
        self.provider.name()
    }

    async fn collect(&self, ctx: &CollectContext) -> CollectorOutcome {
        match self.provider.team_rating(&ctx.team.name).await {
            Ok(rating) if rating > 0.0 => CollectorOutcome::validated(rating),
            Ok(rating) => CollectorOutcome::missing(format!("non-positive rating {rating}")),
            Err(err) => err.into(),
        }
    }
}
