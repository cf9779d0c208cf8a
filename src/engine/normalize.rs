//! Min-max normalization within a peer group.
//!
//! The mapping depends only on the multiset of raw values, never on input
//! order, and is idempotent on an unchanged snapshot.

use crate::cli::types::Orientation;

/// Normalized value used when the peer group cannot span a range: fewer than
/// two non-null values, or all values equal. Reserved for this case; missing
/// data stays null.
pub const DEGENERATE_NORMALIZED: f64 = 0.5;

/// Rescale one (competition, season, parameter) snapshot into [0, 1].
///
/// Null raw values stay null. With at least two distinct values the best team
/// maps to 1.0 and the worst to 0.0; equal raw values map to equal normalized
/// values.
pub fn min_max<K: Copy>(
    values: &[(K, Option<f64>)],
    orientation: Orientation,
) -> Vec<(K, Option<f64>)> {
    let present: Vec<f64> = values.iter().filter_map(|(_, v)| *v).collect();

    if present.len() < 2 {
        return values
            .iter()
            .map(|(k, v)| (*k, v.map(|_| DEGENERATE_NORMALIZED)))
            .collect();
    }

    let min = present.iter().copied().fold(f64::INFINITY, f64::min);
    let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max == min {
        return values
            .iter()
            .map(|(k, v)| (*k, v.map(|_| DEGENERATE_NORMALIZED)))
            .collect();
    }

    let span = max - min;
    values
        .iter()
        .map(|(k, v)| {
            let normalized = v.map(|raw| {
                let scaled = (raw - min) / span;
                match orientation {
                    Orientation::HigherIsBetter => scaled,
                    Orientation::LowerIsBetter => 1.0 - scaled,
                }
            });
            (*k, normalized)
        })
        .collect()
}
