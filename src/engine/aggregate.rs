//! Weighted aggregation of normalized parameter values.

use crate::cli::types::Parameter;
use crate::config::{PartialCoveragePolicy, Weights};
use std::collections::BTreeMap;

/// Aggregation result for one team-in-competition.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Overall strength in [0, 1]; null under strict-null with gaps, or when
    /// nothing is covered at all.
    pub strength: Option<f64>,
    /// Covered weight / total active weight; 1.0 means full coverage.
    pub confidence: f64,
    /// Positively weighted parameters with a null normalized value.
    pub missing: Vec<Parameter>,
}

impl Aggregate {
    pub fn is_partial(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// Combine normalized values with the active weight vector.
///
/// Pure in its inputs: the same normalized map, weights and policy always
/// produce the same result. Raw values are never consulted here.
pub fn aggregate(
    normalized: &BTreeMap<Parameter, Option<f64>>,
    weights: &Weights,
    policy: PartialCoveragePolicy,
) -> Aggregate {
    let mut covered_weight = 0.0;
    let mut total_weight = 0.0;
    let mut dot = 0.0;
    let mut missing = Vec::new();

    for (parameter, weight) in weights.active() {
        total_weight += weight;
        match normalized.get(&parameter).copied().flatten() {
            Some(value) => {
                covered_weight += weight;
                dot += weight * value;
            }
            None => missing.push(parameter),
        }
    }

    let confidence = if total_weight > 0.0 {
        covered_weight / total_weight
    } else {
        0.0
    };

    let strength = if missing.is_empty() {
        (total_weight > 0.0).then(|| dot / total_weight)
    } else {
        match policy {
            PartialCoveragePolicy::StrictNull => None,
            PartialCoveragePolicy::SkipAndRenormalize => {
                (covered_weight > 0.0).then(|| dot / covered_weight)
            }
        }
    };

    Aggregate {
        strength,
        confidence,
        missing,
    }
}
