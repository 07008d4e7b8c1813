//! Compound ("parlay") wager arithmetic.

use super::types::{ParlayCalculation, WagerLeg};
use crate::config::ParlayConfig;

/// Combine legs into one compound wager.
///
/// - base odds: product of every leg's decimal odds
/// - bonus: `bonus_percentage` once there are `bonus_min_legs` legs
/// - streak booster: `streak_step` per win from `streak_min` on, capped
///   at `streak_cap`
///
/// No legs means nothing to pay out: every multiplier is 1 and payout is 0.
pub fn compute_parlay(
    legs: &[WagerLeg],
    stake: f64,
    streak_count: u32,
    is_safe_wager: bool,
    config: &ParlayConfig,
) -> ParlayCalculation {
    if legs.is_empty() {
        return ParlayCalculation {
            leg_count: 0,
            base_odds: 1.0,
            bonus_multiplier: 1.0,
            streak_booster: 1.0,
            final_odds: 1.0,
            potential_payout: 0.0,
            bonus_percentage: 0.0,
            bonus_eligible: false,
            safe_wager_cost: 0,
        };
    }

    let base_odds: f64 = legs.iter().map(|leg| leg.odds).product();

    let bonus_eligible = legs.len() >= config.bonus_min_legs;
    let bonus = if bonus_eligible { config.bonus_percentage } else { 0.0 };
    let bonus_multiplier = 1.0 + bonus;

    let streak_booster = streak_booster(streak_count, config);
    // Payout is quoted against the odds the bettor sees.
    let final_odds = round2(base_odds * bonus_multiplier * streak_booster);
    let potential_payout = round2(stake * final_odds);

    let calc = ParlayCalculation {
        leg_count: legs.len(),
        base_odds: round2(base_odds),
        bonus_multiplier,
        streak_booster,
        final_odds,
        potential_payout,
        bonus_percentage: round2(bonus * 100.0),
        bonus_eligible,
        safe_wager_cost: if is_safe_wager { safe_wager_cost(legs.len(), config) } else { 0 },
    };
    tracing::debug!(
        legs = calc.leg_count,
        base_odds = calc.base_odds,
        final_odds = calc.final_odds,
        streak_count,
        is_safe_wager,
        "computed parlay"
    );
    calc
}

/// 1.0 below `streak_min`, then `1 + step × (streak - min + 1)` up to the cap.
pub fn streak_booster(streak_count: u32, config: &ParlayConfig) -> f64 {
    if streak_count < config.streak_min {
        return 1.0;
    }
    let levels = (streak_count - config.streak_min + 1) as f64;
    1.0 + (config.streak_step * levels).min(config.streak_cap)
}

/// Tokens a safe wager consumes.
pub fn safe_wager_cost(leg_count: usize, config: &ParlayConfig) -> u32 {
    config
        .safe_tokens_per_leg
        .saturating_mul(u32::try_from(leg_count).unwrap_or(u32::MAX))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
