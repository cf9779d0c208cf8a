//! Market pricing from two strength scores.
//!
//! Everything here is a pure function of the input sides and a frozen
//! [`OddsConfig`]; one call prices all three markets plus the most likely
//! scoreline so a single response can never mix configurations.

use crate::config::OddsConfig;
use serde::{Deserialize, Serialize};

/// League-average total goals per match, the anchor of the expected-goals
/// curve.
const GOALS_TOTAL_BASE: f64 = 2.6;

/// Bounds required of the over-2.5 probability.
const OVER_MIN: f64 = 0.35;
const OVER_MAX: f64 = 0.75;

/// Bounds required of the BTTS-yes probability.
const BTTS_MIN: f64 = 0.35;
const BTTS_MAX: f64 = 0.80;

/// Cap on the pairwise style tilt applied to the win split.
const STYLE_TILT: f64 = 0.05;
/// Cap on the pairwise head-to-head tilt applied to the win split.
const H2H_TILT: f64 = 0.03;

/// Floor on either win share, keeping priced odds finite even against a
/// bottomed-out strength score.
const MIN_WIN_SHARE: f64 = 0.01;

/// Venue / competition context for one pricing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchContext {
    SameCompetition,
    CrossCompetition,
    NeutralVenue,
}

impl MatchContext {
    fn home_boost_applies(&self) -> bool {
        !matches!(self, MatchContext::NeutralVenue)
    }
}

/// One side of a pricing request, resolved to its selected strength variant
/// and the attack/defense/style components the markets consume.
#[derive(Debug, Clone)]
pub struct TeamSide {
    pub name: String,
    /// Selected strength variant (local or european), in [0, 1].
    pub strength: f64,
    /// Normalized offensive rating, when covered.
    pub attacking: Option<f64>,
    /// Normalized defensive rating, when covered.
    pub defending: Option<f64>,
    /// Normalized tactical style profile, when covered.
    pub style: Option<f64>,
}

/// Stored head-to-head record between the pair, seen from the home side.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairwiseRecord {
    pub home_wins: u32,
    pub draws: u32,
    pub away_wins: u32,
}

impl PairwiseRecord {
    fn played(&self) -> u32 {
        self.home_wins + self.draws + self.away_wins
    }
}

#[derive(Debug, Clone)]
pub struct OddsInput {
    pub home: TeamSide,
    pub away: TeamSide,
    pub context: MatchContext,
    /// Pairwise refinement source; the stored per-team h2h scalar stays the
    /// aggregate baseline.
    pub head_to_head: Option<PairwiseRecord>,
}

/// A probability with its priced decimal odds. The probability is the true
/// model probability; the odds already carry the bookmaker margin. Odds are
/// rounded only at the response boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Quote {
    pub probability: f64,
    pub decimal_odds: f64,
}

impl Quote {
    fn price(probability: f64, margin: f64) -> Self {
        Self {
            probability,
            decimal_odds: (1.0 + margin) / probability,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneXTwo {
    pub home: Quote,
    pub draw: Quote,
    pub away: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverUnder {
    pub line: f64,
    pub over: Quote,
    pub under: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Btts {
    pub yes: Quote,
    pub no: Quote,
}

/// Full pricing output for one fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketPrices {
    pub one_x_two: OneXTwo,
    pub over_under: OverUnder,
    pub btts: Btts,
    pub expected_goals: f64,
    pub likely_score: String,
}

/// Price all markets for one fixture.
pub fn price_markets(input: &OddsInput, config: &OddsConfig) -> MarketPrices {
    let s_home = input.home.strength.clamp(0.0, 1.0);
    let s_away = input.away.strength.clamp(0.0, 1.0);

    let (p_home_share, p_away_share) = win_split(input, s_home, s_away, config);
    let p_draw = draw_probability(s_home, s_away, config);

    let p_home = (1.0 - p_draw) * p_home_share;
    let p_away = (1.0 - p_draw) * p_away_share;

    let attack_home = input.home.attacking.unwrap_or(s_home);
    let attack_away = input.away.attacking.unwrap_or(s_away);
    let defend_home = input.home.defending.unwrap_or(s_home);
    let defend_away = input.away.defending.unwrap_or(s_away);

    let expected_goals = expected_goals(attack_home, attack_away, defend_home, defend_away);
    let p_over = over_probability(expected_goals);
    let p_btts = btts_probability(attack_home, attack_away);

    let margin = config.margin;
    MarketPrices {
        one_x_two: OneXTwo {
            home: Quote::price(p_home, margin),
            draw: Quote::price(p_draw, margin),
            away: Quote::price(p_away, margin),
        },
        over_under: OverUnder {
            line: 2.5,
            over: Quote::price(p_over, margin),
            under: Quote::price(1.0 - p_over, margin),
        },
        btts: Btts {
            yes: Quote::price(p_btts, margin),
            no: Quote::price(1.0 - p_btts, margin),
        },
        expected_goals,
        likely_score: likely_score(p_home, p_draw, p_away, expected_goals),
    }
}

/// Two-way win split before the draw is carved out. Applies the bounded
/// pairwise tilts, then the home boost, and renormalizes to sum 1.
fn win_split(input: &OddsInput, s_home: f64, s_away: f64, config: &OddsConfig) -> (f64, f64) {
    let tilt = pairwise_tilt(input);
    let eff_home = (s_home * (1.0 + tilt)).max(0.0);
    let eff_away = (s_away * (1.0 - tilt)).max(0.0);

    let sum = eff_home + eff_away;
    let mut share_home = if sum > 0.0 { eff_home / sum } else { 0.5 };

    if input.context.home_boost_applies() {
        let alpha = config.home_boost_alpha;
        let boosted_home = share_home * (1.0 + alpha);
        let boosted_away = (1.0 - share_home) * (1.0 - alpha);
        share_home = boosted_home / (boosted_home + boosted_away);
    }

    share_home = share_home.clamp(MIN_WIN_SHARE, 1.0 - MIN_WIN_SHARE);
    (share_home, 1.0 - share_home)
}

/// Bounded tilt in favor of the home side from the pairwise context: style
/// profile gap plus the stored head-to-head balance. Both inputs are fixed
/// for a given pairing, so the split stays monotonic in either strength.
fn pairwise_tilt(input: &OddsInput) -> f64 {
    let mut tilt = 0.0;
    if let (Some(style_home), Some(style_away)) = (input.home.style, input.away.style) {
        tilt += STYLE_TILT * (style_home - style_away);
    }
    if let Some(record) = input.head_to_head {
        let played = record.played();
        if played > 0 {
            let balance =
                (record.home_wins as f64 - record.away_wins as f64) / played as f64;
            tilt += H2H_TILT * balance;
        }
    }
    tilt
}

/// Draw probability falls linearly with the normalized strength gap and is
/// clamped to the configured band.
fn draw_probability(s_home: f64, s_away: f64, config: &OddsConfig) -> f64 {
    let gap = ((s_home - s_away).abs() * config.draw_k).min(1.0);
    (config.draw_max - config.draw_beta * gap).clamp(config.draw_min, config.draw_max)
}

/// Expected total goals, monotonic increasing in the combined attacking
/// quality and decreasing in the combined defensive quality. Anchored so an
/// average pairing prices at the league-average total.
fn expected_goals(attack_home: f64, attack_away: f64, defend_home: f64, defend_away: f64) -> f64 {
    let attack = (attack_home + attack_away) / 2.0;
    let defense = (defend_home + defend_away) / 2.0;
    let quality = (attack - 0.5 * (defense - 0.5)).clamp(0.0, 1.0);
    GOALS_TOTAL_BASE * (0.5 + quality)
}

fn over_probability(expected_goals: f64) -> f64 {
    let span = GOALS_TOTAL_BASE * 1.0; // e ranges over one GOALS_TOTAL_BASE
    let t = (expected_goals - GOALS_TOTAL_BASE * 0.5) / span;
    (OVER_MIN + (OVER_MAX - OVER_MIN) * t).clamp(OVER_MIN, OVER_MAX)
}

fn btts_probability(attack_home: f64, attack_away: f64) -> f64 {
    let weaker = attack_home.min(attack_away).clamp(0.0, 1.0);
    (BTTS_MIN + 0.45 * weaker).clamp(BTTS_MIN, BTTS_MAX)
}

/// Most likely scoreline: a pure lookup keyed on the dominant 1X2 bucket and
/// the expected total rounded to the nearest half goal.
fn likely_score(p_home: f64, p_draw: f64, p_away: f64, expected_goals: f64) -> String {
    let half_rounded = (expected_goals * 2.0).round() / 2.0;
    let total = (half_rounded.round() as i64).clamp(1, 5) as u32;

    if p_draw >= p_home && p_draw >= p_away {
        let each = total / 2;
        format!("{each}-{each}")
    } else {
        let loser = total.saturating_sub(1) / 2;
        let winner = total - loser;
        if p_home >= p_away {
            format!("{winner}-{loser}")
        } else {
            format!("{loser}-{winner}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(strength: f64) -> TeamSide {
        TeamSide {
            name: "side".to_string(),
            strength,
            attacking: None,
            defending: None,
            style: None,
        }
    }

    fn input(s_home: f64, s_away: f64, context: MatchContext) -> OddsInput {
        OddsInput {
            home: side(s_home),
            away: side(s_away),
            context,
            head_to_head: None,
        }
    }

    fn config_with(alpha: f64, margin: f64) -> OddsConfig {
        OddsConfig {
            home_boost_alpha: alpha,
            margin,
            ..OddsConfig::default()
        }
    }

    #[test]
    fn evenly_matched_without_boost() {
        // Scenario D: s = 0.6/0.6, alpha = 0, margin = 0.05.
        let prices = price_markets(
            &input(0.6, 0.6, MatchContext::NeutralVenue),
            &config_with(0.0, 0.05),
        );
        let m = &prices.one_x_two;
        assert!((m.draw.probability - 0.33).abs() < 1e-12);
        assert!((m.home.probability - 0.335).abs() < 1e-12);
        assert!((m.away.probability - 0.335).abs() < 1e-12);
        assert!((m.home.decimal_odds - 1.05 / 0.335).abs() < 1e-9);
        assert!((m.draw.decimal_odds - 1.05 / 0.33).abs() < 1e-9);
    }

    #[test]
    fn home_boost_with_moderate_gap() {
        // Scenario E: s = 0.7/0.5, alpha = 0.10. Gap 0.2 -> normalized 0.4,
        // draw = 0.33 - 0.13 * 0.4 = 0.278. Base split 7/12 and 5/12; the
        // boosted split renormalizes (x1.1, x0.9) to ~0.6312/0.3688.
        let prices = price_markets(
            &input(0.7, 0.5, MatchContext::SameCompetition),
            &config_with(0.10, 0.05),
        );
        let m = &prices.one_x_two;
        assert!((m.draw.probability - 0.278).abs() < 1e-12);

        let base_home = 0.7 / 1.2;
        let base_away = 0.5 / 1.2;
        let boosted_sum = base_home * 1.1 + base_away * 0.9;
        let expected_home = (1.0 - 0.278) * base_home * 1.1 / boosted_sum;
        let expected_away = (1.0 - 0.278) * base_away * 0.9 / boosted_sum;
        assert!((m.home.probability - expected_home).abs() < 1e-12);
        assert!((m.away.probability - expected_away).abs() < 1e-12);
        assert!(m.home.probability > m.away.probability);
    }

    #[test]
    fn probabilities_sum_to_one_per_market() {
        let config = OddsConfig::default();
        for (a, b) in [(0.0, 0.0), (0.1, 0.9), (0.55, 0.45), (1.0, 0.2)] {
            let prices = price_markets(&input(a, b, MatchContext::SameCompetition), &config);
            let sum_1x2 = prices.one_x_two.home.probability
                + prices.one_x_two.draw.probability
                + prices.one_x_two.away.probability;
            assert!((sum_1x2 - 1.0).abs() < 1e-9, "1X2 sums to {sum_1x2}");

            let sum_ou = prices.over_under.over.probability + prices.over_under.under.probability;
            assert!((sum_ou - 1.0).abs() < 1e-9);

            let sum_btts = prices.btts.yes.probability + prices.btts.no.probability;
            assert!((sum_btts - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn odds_times_probability_equals_one_plus_margin() {
        let config = config_with(0.10, 0.05);
        let prices = price_markets(&input(0.8, 0.3, MatchContext::SameCompetition), &config);
        for quote in [
            prices.one_x_two.home,
            prices.one_x_two.draw,
            prices.one_x_two.away,
            prices.over_under.over,
            prices.over_under.under,
            prices.btts.yes,
            prices.btts.no,
        ] {
            assert!((quote.probability * quote.decimal_odds - 1.05).abs() < 1e-9);
        }
    }

    #[test]
    fn draw_probability_stays_in_band() {
        let config = OddsConfig::default();
        for a in [0.0, 0.2, 0.5, 0.8, 1.0] {
            for b in [0.0, 0.3, 0.6, 1.0] {
                let prices = price_markets(&input(a, b, MatchContext::SameCompetition), &config);
                let draw = prices.one_x_two.draw.probability;
                assert!((0.20..=0.33).contains(&draw), "draw {draw} for {a}/{b}");
            }
        }
    }

    #[test]
    fn over_and_btts_stay_in_band() {
        let config = OddsConfig::default();
        let mut extreme_low = input(0.0, 0.0, MatchContext::SameCompetition);
        extreme_low.home.attacking = Some(0.0);
        extreme_low.away.attacking = Some(0.0);
        extreme_low.home.defending = Some(1.0);
        extreme_low.away.defending = Some(1.0);
        let low = price_markets(&extreme_low, &config);
        assert!(low.over_under.over.probability >= 0.35);
        // Scenario F: both attacks at the floor -> BTTS-yes at its floor.
        assert!((low.btts.yes.probability - 0.35).abs() < 1e-12);
        assert!((low.btts.no.probability - 0.65).abs() < 1e-12);

        let mut extreme_high = input(1.0, 1.0, MatchContext::SameCompetition);
        extreme_high.home.attacking = Some(1.0);
        extreme_high.away.attacking = Some(1.0);
        extreme_high.home.defending = Some(0.0);
        extreme_high.away.defending = Some(0.0);
        let high = price_markets(&extreme_high, &config);
        assert!(high.over_under.over.probability <= 0.75);
        assert!(high.btts.yes.probability <= 0.80);
    }

    #[test]
    fn over_probability_monotonic_in_expected_goals() {
        let config = OddsConfig::default();
        let mut last_over = 0.0;
        let mut last_e = 0.0;
        for step in 0..=10 {
            let attack = step as f64 / 10.0;
            let mut io = input(0.5, 0.5, MatchContext::SameCompetition);
            io.home.attacking = Some(attack);
            io.away.attacking = Some(attack);
            io.home.defending = Some(0.5);
            io.away.defending = Some(0.5);
            let prices = price_markets(&io, &config);
            assert!(prices.expected_goals >= last_e);
            assert!(prices.over_under.over.probability >= last_over);
            last_e = prices.expected_goals;
            last_over = prices.over_under.over.probability;
        }
    }

    #[test]
    fn home_win_monotonic_in_home_strength() {
        let config = OddsConfig::default();
        let mut last_home = 0.0;
        let mut last_away = 1.0;
        for step in 0..=20 {
            let s_home = step as f64 / 20.0;
            let prices = price_markets(&input(s_home, 0.7, MatchContext::SameCompetition), &config);
            let p_home = prices.one_x_two.home.probability;
            let p_away = prices.one_x_two.away.probability;
            assert!(p_home >= last_home - 1e-12, "p_home fell at s={s_home}");
            assert!(p_away <= last_away + 1e-12, "p_away rose at s={s_home}");
            last_home = p_home;
            last_away = p_away;
        }
    }

    #[test]
    fn no_boost_and_equal_strengths_is_symmetric() {
        let config = config_with(0.0, 0.05);
        for s in [0.0, 0.25, 0.6, 1.0] {
            let prices = price_markets(&input(s, s, MatchContext::SameCompetition), &config);
            assert_eq!(
                prices.one_x_two.home.probability.to_bits(),
                prices.one_x_two.away.probability.to_bits()
            );
        }
    }

    #[test]
    fn neutral_venue_drops_the_boost() {
        let config = config_with(0.10, 0.05);
        let home = price_markets(&input(0.6, 0.6, MatchContext::SameCompetition), &config);
        let neutral = price_markets(&input(0.6, 0.6, MatchContext::NeutralVenue), &config);
        assert!(home.one_x_two.home.probability > neutral.one_x_two.home.probability);
        assert_eq!(
            neutral.one_x_two.home.probability,
            neutral.one_x_two.away.probability
        );
    }

    #[test]
    fn both_zero_strengths_split_evenly() {
        let config = config_with(0.0, 0.05);
        let prices = price_markets(&input(0.0, 0.0, MatchContext::NeutralVenue), &config);
        assert_eq!(
            prices.one_x_two.home.probability,
            prices.one_x_two.away.probability
        );
    }

    #[test]
    fn h2h_record_tilts_toward_dominant_side() {
        let config = config_with(0.0, 0.05);
        let mut with_history = input(0.5, 0.5, MatchContext::NeutralVenue);
        with_history.head_to_head = Some(PairwiseRecord {
            home_wins: 4,
            draws: 1,
            away_wins: 0,
        });
        let tilted = price_markets(&with_history, &config);
        let flat = price_markets(&input(0.5, 0.5, MatchContext::NeutralVenue), &config);
        assert!(tilted.one_x_two.home.probability > flat.one_x_two.home.probability);
        // The tilt is bounded.
        let gap = tilted.one_x_two.home.probability - tilted.one_x_two.away.probability;
        assert!(gap < 0.05);
    }

    #[test]
    fn style_gap_tilts_the_split() {
        let config = config_with(0.0, 0.05);
        let mut styled = input(0.5, 0.5, MatchContext::NeutralVenue);
        styled.home.style = Some(0.9);
        styled.away.style = Some(0.1);
        let prices = price_markets(&styled, &config);
        assert!(prices.one_x_two.home.probability > prices.one_x_two.away.probability);
    }

    #[test]
    fn likely_score_buckets() {
        // Draw-dominant around the average total.
        assert_eq!(likely_score(0.3, 0.4, 0.3, 2.6), "1-1");
        // Home-dominant.
        assert_eq!(likely_score(0.5, 0.25, 0.25, 2.6), "2-1");
        // Away-dominant.
        assert_eq!(likely_score(0.2, 0.25, 0.55, 2.6), "1-2");
        // Low-scoring home win.
        assert_eq!(likely_score(0.5, 0.3, 0.2, 1.2), "1-0");
    }

    #[test]
    fn pricing_is_deterministic() {
        let config = OddsConfig::default();
        let io = input(0.62, 0.48, MatchContext::SameCompetition);
        let a = price_markets(&io, &config);
        let b = price_markets(&io, &config);
        assert_eq!(
            a.one_x_two.home.probability.to_bits(),
            b.one_x_two.home.probability.to_bits()
        );
        assert_eq!(a.likely_score, b.likely_score);
        assert_eq!(a.expected_goals.to_bits(), b.expected_goals.to_bits());
    }
}
