//! REST adapter for the squad-valuation provider.

use super::http::get_json;
use super::{ProviderConfig, ProviderResult, SquadSnapshot, ValuationProvider};
use async_trait::async_trait;

pub struct ValuationApiProvider {
    config: ProviderConfig,
}

impl ValuationApiProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ValuationProvider for ValuationApiProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn squad(&self, team: &str) -> ProviderResult<SquadSnapshot> {
        get_json(&self.config, &format!("/squads/{team}"), &[]).await
    }
}
