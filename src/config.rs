//! Engine configuration.
//!
//! All knobs live in one immutable [`EngineConfig`] value that is loaded and
//! validated at startup and passed down to the orchestrator and engines.
//! Hot-reload happens only between refresh cycles: a cycle captures the config
//! it was started with and never observes edits.

use crate::cli::types::{Parameter, Season};
use crate::error::{EngineError, Result};
use crate::providers::ProviderConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// The active weight vector, keyed by [`Parameter`].
///
/// Parameters missing from a config file keep their declared default weight,
/// so a file only overriding the full vector passes validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weights {
    by_parameter: BTreeMap<Parameter, f64>,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            by_parameter: Parameter::ALL
                .iter()
                .map(|p| (*p, p.default_weight()))
                .collect(),
        }
    }
}

impl Weights {
    pub fn get(&self, parameter: Parameter) -> f64 {
        self.by_parameter
            .get(&parameter)
            .copied()
            .unwrap_or_else(|| parameter.default_weight())
    }

    /// Sum over every parameter, including configured zeros.
    pub fn sum(&self) -> f64 {
        Parameter::ALL.iter().map(|p| self.get(*p)).sum()
    }

    /// Parameters with a strictly positive weight, in frozen order.
    pub fn active(&self) -> Vec<(Parameter, f64)> {
        Parameter::ALL
            .iter()
            .filter_map(|p| {
                let w = self.get(*p);
                (w > 0.0).then_some((*p, w))
            })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        for (p, w) in &self.by_parameter {
            if !w.is_finite() || *w < 0.0 {
                return Err(EngineError::Config {
                    message: format!("weight for {p} must be a finite non-negative number"),
                });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(EngineError::WeightSum { sum });
        }
        Ok(())
    }
}

/// What the aggregator does when a positively weighted parameter is null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PartialCoveragePolicy {
    /// Sum over present parameters and divide by their weight; mark partial.
    #[default]
    #[serde(rename = "skip-and-renormalize")]
    SkipAndRenormalize,
    /// Overall strength stays null until every weighted parameter is covered.
    #[serde(rename = "strict-null")]
    StrictNull,
}

/// Odds-engine shape parameters. Frozen for the duration of a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OddsConfig {
    /// Multiplicative home-side boost applied to the 1X2 win split.
    pub home_boost_alpha: f64,
    /// Slope of draw probability against the normalized strength gap.
    pub draw_beta: f64,
    /// Gap scaling: a gap of 1/k maps to the draw floor.
    pub draw_k: f64,
    /// Clamp bounds for the draw probability.
    pub draw_min: f64,
    pub draw_max: f64,
    /// Bookmaker overround applied when converting probability to odds.
    pub margin: f64,
}

impl Default for OddsConfig {
    fn default() -> Self {
        Self {
            home_boost_alpha: 0.10,
            draw_beta: 0.13,
            draw_k: 2.0,
            draw_min: 0.20,
            draw_max: 0.33,
            margin: 0.05,
        }
    }
}

impl OddsConfig {
    fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.home_boost_alpha) {
            return Err(EngineError::Config {
                message: format!("odds.home_boost_alpha {} outside [0, 1)", self.home_boost_alpha),
            });
        }
        if self.draw_min < 0.0 || self.draw_max > 1.0 || self.draw_min > self.draw_max {
            return Err(EngineError::Config {
                message: format!(
                    "odds draw clamp [{}, {}] is not a valid range",
                    self.draw_min, self.draw_max
                ),
            });
        }
        if self.draw_beta < 0.0 || self.draw_k <= 0.0 {
            return Err(EngineError::Config {
                message: "odds.draw_beta must be >= 0 and odds.draw_k > 0".to_string(),
            });
        }
        if self.margin < 0.0 {
            return Err(EngineError::Config {
                message: format!("odds.margin {} must be non-negative", self.margin),
            });
        }
        Ok(())
    }
}

/// Retry schedule for transient collector failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub initial_delay_secs: u64,
    pub factor: f64,
    pub cap_secs: u64,
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: 1,
            factor: 2.0,
            cap_secs: 60,
            max_attempts: 5,
        }
    }
}

/// Collection-phase knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// In-flight calls allowed per external provider.
    pub concurrency_per_provider: usize,
    pub retry: RetryConfig,
    /// Deadline for a single collector call, in seconds.
    pub call_timeout_secs: u64,
    /// Overall deadline for one refresh cycle; remaining work is deferred.
    pub cycle_timeout_secs: Option<u64>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            concurrency_per_provider: 5,
            retry: RetryConfig::default(),
            call_timeout_secs: 30,
            cycle_timeout_secs: None,
        }
    }
}

/// The two external data sources. URLs and credentials are injected here,
/// never encoded in the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub matches: ProviderConfig,
    pub valuation: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            matches: ProviderConfig {
                name: "football-data".to_string(),
                base_url: "https://api.football-data.org/v4".to_string(),
                api_key: None,
                rate_limit: None,
            },
            valuation: ProviderConfig {
                name: "squad-valuation".to_string(),
                base_url: "https://valuation.example.invalid/v1".to_string(),
                api_key: None,
                rate_limit: None,
            },
        }
    }
}

/// Immutable engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: Weights,
    pub partial_coverage_policy: PartialCoveragePolicy,
    pub odds: OddsConfig,
    pub collector: CollectorConfig,
    pub season: Season,
    pub providers: ProvidersConfig,
}

impl EngineConfig {
    /// Load from a JSON file, or defaults when no path is given.
    /// Validation failures are fatal: a refresh refuses to run on them.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p)?;
                serde_json::from_str::<EngineConfig>(&raw).map_err(|e| EngineError::Config {
                    message: format!("{}: {e}", p.display()),
                })?
            }
            None => EngineConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.odds.validate()?;
        if self.collector.concurrency_per_provider == 0 {
            return Err(EngineError::Config {
                message: "collector.concurrency_per_provider must be at least 1".to_string(),
            });
        }
        if self.collector.retry.max_attempts == 0 {
            return Err(EngineError::Config {
                message: "collector.retry.max_attempts must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
