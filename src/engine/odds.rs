//! Two competitor profiles in, win probabilities and decimal odds out.
//!
//! Score pipeline (player1's perspective, 0.5 = even):
//!   1. six tanh-saturated factors
//!   2. gap-dependent weights
//!   3. `0.5 + Σ weight × factor`
//!   4. blend toward the raw h2h rate once there are enough meetings
//!   5. injected perturbation, so repeated calls are not byte-identical
//!   6. h2h dominance floor
//!   7. clamp into bounds that widen with the rating gap
//!
//! The perturbation is intentional. Pass a seeded RNG or set
//! `perturbation = 0` when exact replay matters.

use chrono::{NaiveDate, Utc};
use rand::Rng;

use super::confidence;
use super::factors::compute_factors;
use super::input::{orient_head_to_head, validate_profile, ValidationError};
use super::insights::recommendations;
use super::types::{
    CompetitorProfile, HeadToHeadRecord, MatchContext, OddsResult, OrientedHeadToHead,
};
use super::weights::FactorWeights;
use crate::config::{BoundsConfig, HeadToHeadConfig, OddsConfig};

/// Stateless apart from its tuning table; share freely across threads.
#[derive(Debug, Clone, Default)]
pub struct OddsCalculator {
    config: OddsConfig,
}

impl OddsCalculator {
    /// Wrap a tuning table without checking it.
    ///
    /// # Panics
    ///
    /// `compute_odds` panics if a probability bound has `low > high`. Use
    /// [`try_new`](Self::try_new) for tables that did not come through
    /// [`Config::validate`](crate::config::Config::validate).
    pub fn new(config: OddsConfig) -> Self {
        Self { config }
    }

    /// Validate the tuning table, then wrap it.
    pub fn try_new(config: OddsConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &OddsConfig {
        &self.config
    }

    /// Compute odds using the thread-local RNG for the perturbation.
    pub fn compute_odds(
        &self,
        a: &CompetitorProfile,
        b: &CompetitorProfile,
        context: &MatchContext,
        h2h: Option<&HeadToHeadRecord>,
    ) -> Result<OddsResult, ValidationError> {
        self.compute_odds_with_rng(a, b, context, h2h, &mut rand::thread_rng())
    }

    /// Same as [`compute_odds`](Self::compute_odds) with a caller-supplied RNG.
    pub fn compute_odds_with_rng<R: Rng + ?Sized>(
        &self,
        a: &CompetitorProfile,
        b: &CompetitorProfile,
        context: &MatchContext,
        h2h: Option<&HeadToHeadRecord>,
        rng: &mut R,
    ) -> Result<OddsResult, ValidationError> {
        let config = &self.config;
        validate_profile(a, &config.rating)?;
        validate_profile(b, &config.rating)?;
        let h2h = h2h.map(|r| orient_head_to_head(r, a, b)).transpose()?;

        let noise = sample_perturbation(config.perturbation, rng);
        let today = context.date.unwrap_or_else(|| Utc::now().date_naive());
        Ok(self.evaluate(a, b, context, h2h.as_ref(), today, noise))
    }

    fn evaluate(
        &self,
        a: &CompetitorProfile,
        b: &CompetitorProfile,
        context: &MatchContext,
        h2h: Option<&OrientedHeadToHead>,
        today: NaiveDate,
        noise: f64,
    ) -> OddsResult {
        let config = &self.config;
        let gap = (a.rating - b.rating).abs();
        let meetings = h2h.map(|h| h.meetings()).unwrap_or(0);

        let factors = compute_factors(a, b, context.surface, h2h, today, config);
        let weights = FactorWeights::allocate(a.rating, b.rating, meetings, &config.weights);
        let mut score = 0.5 + weights.apply(&factors);

        if let Some(h) = h2h {
            score = blend_toward_history(score, h, gap, &config.head_to_head);
        }

        score += noise;

        if let Some(h) = h2h {
            score = enforce_history_floor(score, h, &config.head_to_head);
        }

        let (low, high) = probability_bounds(gap, meetings, config);
        let p1 = score.clamp(low, high);
        let p2 = 1.0 - p1;

        let player1_odds = self.decimal_odds(p1);
        let player2_odds = self.decimal_odds(p2);

        tracing::debug!(
            player1 = %a.id,
            player2 = %b.id,
            surface = %context.surface,
            gap,
            meetings,
            rating_weight = weights.rating,
            other_weight = weights.each_other,
            raw_score = score,
            p1,
            low,
            high,
            "computed match odds"
        );

        OddsResult {
            player1_win_probability: p1,
            player2_win_probability: p2,
            player1_odds,
            player2_odds,
            confidence: confidence::estimate(a, b, context.surface, h2h, &factors, &config.confidence),
            factors,
            recommendations: recommendations(a, b, context.surface, h2h, &factors, &config.insights),
        }
    }

    /// `(1/p) × (1 + margin)`, two decimals, capped at `max_decimal_odds`.
    pub fn decimal_odds(&self, probability: f64) -> f64 {
        let raw = round2((1.0 / probability) * (1.0 + self.config.margin));
        if raw > self.config.max_decimal_odds {
            tracing::warn!(probability, raw, cap = self.config.max_decimal_odds, "decimal odds capped");
            return self.config.max_decimal_odds;
        }
        raw
    }
}

fn sample_perturbation<R: Rng + ?Sized>(half_width: f64, rng: &mut R) -> f64 {
    if half_width <= 0.0 {
        return 0.0;
    }
    rng.gen_range(-half_width..=half_width)
}

/// Similar ratings let history count for more; long records count for more.
fn blend_toward_history(
    score: f64,
    h2h: &OrientedHeadToHead,
    gap: f64,
    config: &HeadToHeadConfig,
) -> f64 {
    let Some(rate) = h2h.win_rate() else {
        return score;
    };
    if h2h.meetings() < config.blend_min_meetings {
        return score;
    }
    let strength = (config.blend_per_meeting * h2h.meetings() as f64
        / (1.0 + config.blend_gap_damping * gap))
        .min(config.blend_cap);
    score * (1.0 - strength) + rate * strength
}

/// A side that has won strictly more meetings never drops below
/// `0.5 + floor_tilt × (rate - 0.5)`.
fn enforce_history_floor(score: f64, h2h: &OrientedHeadToHead, config: &HeadToHeadConfig) -> f64 {
    if h2h.meetings() < config.blend_min_meetings || h2h.wins == h2h.losses {
        return score;
    }
    let Some(rate) = h2h.win_rate() else {
        return score;
    };
    let tilt = 0.5 + config.floor_tilt * (rate - 0.5);
    if h2h.wins > h2h.losses {
        score.max(tilt)
    } else {
        score.min(tilt)
    }
}

/// Allowed range for player1's probability. Tightest for evenly rated
/// competitors with no shared history, widening with the gap.
pub fn probability_bounds(gap: f64, meetings: u32, config: &OddsConfig) -> (f64, f64) {
    bounds_for(gap, meetings, config.weights.even_gap, &config.bounds)
}

fn bounds_for(gap: f64, meetings: u32, even_gap: f64, config: &BoundsConfig) -> (f64, f64) {
    if gap < even_gap && meetings == 0 {
        return config.even;
    }
    config
        .brackets
        .iter()
        .find(|b| gap < b.max_gap)
        .map(|b| (b.low, b.high))
        .unwrap_or(config.widest)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{profile, quiet_config};
    use crate::engine::types::{MatchOutcome, StreakType, Surface};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ctx() -> MatchContext {
        MatchContext::on(Surface::Hard, day(2024, 6, 1))
    }

    fn h2h(a_wins: u32, b_wins: u32) -> HeadToHeadRecord {
        HeadToHeadRecord {
            player1_id: "a".to_string(),
            player2_id: "b".to_string(),
            player1_wins: a_wins,
            player2_wins: b_wins,
            last_winner_id: None,
            last_match_date: None,
        }
    }

    #[test]
    fn test_identical_profiles_are_even_money() {
        let calc = OddsCalculator::new(quiet_config());
        let r = calc
            .compute_odds(&profile("a", 4.0), &profile("b", 4.0), &ctx(), None)
            .unwrap();
        assert_eq!(r.player1_win_probability, 0.5);
        assert_eq!(r.player1_odds, 2.1);
        assert_eq!(r.player2_odds, 2.1);
    }

    #[test]
    fn test_identical_profiles_with_noise_stay_near_half() {
        let calc = OddsCalculator::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let r = calc
                .compute_odds_with_rng(&profile("a", 4.0), &profile("b", 4.0), &ctx(), None, &mut rng)
                .unwrap();
            assert!((r.player1_win_probability - 0.5).abs() <= 0.05);
            assert!((r.player2_win_probability - 0.5).abs() <= 0.05);
        }
    }

    #[test]
    fn test_seeded_rng_replays_exactly() {
        let calc = OddsCalculator::default();
        let a = profile("a", 4.2);
        let b = profile("b", 3.9);
        let r1 = calc
            .compute_odds_with_rng(&a, &b, &ctx(), None, &mut StdRng::seed_from_u64(42))
            .unwrap();
        let r2 = calc
            .compute_odds_with_rng(&a, &b, &ctx(), None, &mut StdRng::seed_from_u64(42))
            .unwrap();
        assert_eq!(r1, r2);
    }

    #[test]
    fn test_large_gap_low_tier_favours_stronger() {
        let calc = OddsCalculator::new(quiet_config());
        let strong = profile("a", 3.6);
        let weak = profile("b", 2.0);
        let r = calc.compute_odds(&strong, &weak, &ctx(), None).unwrap();
        assert!(r.player1_win_probability > 0.6, "got {}", r.player1_win_probability);
        let (low, high) = probability_bounds(1.6, 0, calc.config());
        assert!(low <= 0.05 && high >= 0.95);
        // Saturated at the widest bound; the odds cap keeps p=0.05 under 20.
        assert!((r.player1_win_probability - 0.95).abs() < 1e-9);
        assert!(r.player2_odds < 20.0);
    }

    #[test]
    fn test_even_bounds_clamp_small_edges() {
        let calc = OddsCalculator::new(quiet_config());
        let mut a = profile("a", 4.0);
        a.recent_results = vec![MatchOutcome::Win; 5];
        a.streak = 9;
        a.streak_type = StreakType::Win;
        let mut b = profile("b", 4.0);
        b.recent_results = vec![MatchOutcome::Loss; 5];
        b.streak = 9;
        b.streak_type = StreakType::Loss;
        let r = calc.compute_odds(&a, &b, &ctx(), None).unwrap();
        assert!(r.player1_win_probability > 0.5);
        assert!(r.player1_win_probability <= 0.58 + 1e-12);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let calc = OddsCalculator::default();
        let mut rng = StdRng::seed_from_u64(1);
        for (ra, rb) in [(1.0, 7.0), (3.3, 3.4), (5.5, 4.9), (6.0, 4.1)] {
            let r = calc
                .compute_odds_with_rng(&profile("a", ra), &profile("b", rb), &ctx(), None, &mut rng)
                .unwrap();
            let sum = r.player1_win_probability + r.player2_win_probability;
            assert!((sum - 1.0).abs() < 1e-9, "sum={sum}");
            assert!(r.player1_odds > 1.0 && r.player1_odds < 20.0);
            assert!(r.player2_odds > 1.0 && r.player2_odds < 20.0);
        }
    }

    #[test]
    fn test_history_blend_pulls_toward_record() {
        let calc = OddsCalculator::new(quiet_config());
        let a = profile("a", 4.2);
        let b = profile("b", 4.0);
        let without = calc.compute_odds(&a, &b, &ctx(), None).unwrap();
        let losing = calc.compute_odds(&a, &b, &ctx(), Some(&h2h(0, 6))).unwrap();
        assert!(losing.player1_win_probability < without.player1_win_probability);
    }

    #[test]
    fn test_history_floor_protects_dominant_side() {
        let calc = OddsCalculator::new(quiet_config());
        // Player1 is weaker on paper but has won every meeting.
        let a = profile("a", 3.7);
        let b = profile("b", 4.0);
        let r = calc.compute_odds(&a, &b, &ctx(), Some(&h2h(5, 0))).unwrap();
        // floor = 0.5 + 0.3 * 0.5
        assert!(r.player1_win_probability >= 0.65 - 1e-12, "got {}", r.player1_win_probability);
    }

    #[test]
    fn test_history_ceiling_caps_dominated_side() {
        let calc = OddsCalculator::new(quiet_config());
        // Player1 is stronger on paper but has lost every meeting.
        let a = profile("a", 4.5);
        let b = profile("b", 4.0);
        let plain = calc.compute_odds(&a, &b, &ctx(), None).unwrap();
        assert!(plain.player1_win_probability > 0.5, "got {}", plain.player1_win_probability);

        let r = calc.compute_odds(&a, &b, &ctx(), Some(&h2h(0, 5))).unwrap();
        // ceiling = 0.5 - 0.3 * 0.5, inside the (0.15, 0.85) bounds for a 0.5 gap
        assert!((r.player1_win_probability - 0.35).abs() < 1e-12, "got {}", r.player1_win_probability);
        assert!((r.player2_win_probability - 0.65).abs() < 1e-12);
    }

    #[test]
    fn test_try_new_rejects_inverted_bounds() {
        let mut config = quiet_config();
        config.bounds.even = (0.6, 0.4);
        let err = OddsCalculator::try_new(config).unwrap_err();
        assert!(err.to_string().contains("0 < low < high < 1"), "got {err}");
        assert!(OddsCalculator::try_new(quiet_config()).is_ok());
    }

    #[test]
    fn test_history_floor_ignored_below_two_meetings() {
        let cfg = HeadToHeadConfig::default();
        let h = OrientedHeadToHead { wins: 1, losses: 0, last_won: None, last_match_date: None };
        assert_eq!(enforce_history_floor(0.3, &h, &cfg), 0.3);
        assert_eq!(blend_toward_history(0.3, &h, 0.0, &cfg), 0.3);
    }

    #[test]
    fn test_blend_strength_caps() {
        let cfg = HeadToHeadConfig::default();
        let h = OrientedHeadToHead { wins: 100, losses: 0, last_won: None, last_match_date: None };
        let blended = blend_toward_history(0.5, &h, 0.0, &cfg);
        assert!((blended - (0.5 * 0.15 + 0.85)).abs() < 1e-12, "got {blended}");
    }

    #[test]
    fn test_bounds_widen_with_gap() {
        let cfg = OddsConfig::default();
        assert_eq!(probability_bounds(0.05, 0, &cfg), (0.42, 0.58));
        assert_eq!(probability_bounds(0.05, 3, &cfg), (0.38, 0.62));
        assert_eq!(probability_bounds(0.3, 0, &cfg), (0.32, 0.68));
        assert_eq!(probability_bounds(0.4, 0, &cfg), (0.25, 0.75));
        assert_eq!(probability_bounds(0.5, 0, &cfg), (0.15, 0.85));
        assert_eq!(probability_bounds(1.2, 0, &cfg), (0.10, 0.90));
        assert_eq!(probability_bounds(1.5, 0, &cfg), (0.05, 0.95));
        assert_eq!(probability_bounds(6.0, 0, &cfg), (0.05, 0.95));
    }

    #[test]
    fn test_decimal_odds_margin_and_rounding() {
        let calc = OddsCalculator::default();
        assert_eq!(calc.decimal_odds(0.5), 2.1);
        assert_eq!(calc.decimal_odds(0.95), 1.11);
        assert_eq!(calc.decimal_odds(0.25), 4.2);
        assert_eq!(calc.decimal_odds(0.05), 19.99);
    }

    #[test]
    fn test_validation_runs_before_math() {
        let calc = OddsCalculator::default();
        let mut bad = profile("b", 4.0);
        bad.recent_results.push(MatchOutcome::Win);
        let err = calc.compute_odds(&profile("a", 4.0), &bad, &ctx(), None).unwrap_err();
        assert!(matches!(err, ValidationError::RecentResultsLength { got: 6, .. }));
    }

    #[test]
    fn test_mismatched_h2h_rejected() {
        let calc = OddsCalculator::default();
        let mut record = h2h(1, 1);
        record.player2_id = "zz".to_string();
        let err = calc
            .compute_odds(&profile("a", 4.0), &profile("b", 4.0), &ctx(), Some(&record))
            .unwrap_err();
        assert!(matches!(err, ValidationError::HeadToHeadMismatch { .. }));
    }

    #[test]
    fn test_zero_perturbation_never_touches_rng() {
        struct Exploding;
        impl rand::RngCore for Exploding {
            fn next_u32(&mut self) -> u32 {
                panic!("rng used")
            }
            fn next_u64(&mut self) -> u64 {
                panic!("rng used")
            }
            fn fill_bytes(&mut self, _: &mut [u8]) {
                panic!("rng used")
            }
            fn try_fill_bytes(&mut self, _: &mut [u8]) -> Result<(), rand::Error> {
                panic!("rng used")
            }
        }
        assert_eq!(sample_perturbation(0.0, &mut Exploding), 0.0);
    }
}
