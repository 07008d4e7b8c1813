//! The six saturated factor scores. Every function returns a value in
//! [-1, 1] where positive favours player1 (`a`).

use chrono::NaiveDate;

use super::types::{
    CompetitorProfile, FactorBreakdown, MatchOutcome, OrientedHeadToHead, StreakType, Surface,
};
use crate::config::{
    ExperienceConfig, FormConfig, HeadToHeadConfig, MomentumConfig, OddsConfig,
    RatingFactorConfig, SurfaceConfig,
};

/// All six factors for one pairing.
pub fn compute_factors(
    a: &CompetitorProfile,
    b: &CompetitorProfile,
    surface: Surface,
    h2h: Option<&OrientedHeadToHead>,
    today: NaiveDate,
    config: &OddsConfig,
) -> FactorBreakdown {
    FactorBreakdown {
        rating_advantage: rating_advantage(a.rating, b.rating, &config.rating),
        recent_form: form_advantage(a, b, &config.form),
        surface_advantage: surface_advantage(a, b, surface, &config.surface),
        experience: experience_advantage(a, b, &config.experience),
        momentum: momentum_advantage(a, b, &config.momentum),
        head_to_head: h2h
            .map(|h| head_to_head_advantage(h, today, &config.head_to_head))
            .unwrap_or(0.0),
    }
}

/// Decisive gaps get a steep linear multiplier; small gaps scale with the
/// lower rating's tier so weak fields compound less.
pub fn rating_advantage(a: f64, b: f64, config: &RatingFactorConfig) -> f64 {
    let diff = a - b;
    let gap = diff.abs();
    if gap >= config.steep_gap {
        return (diff * config.steep_multiplier).tanh();
    }
    let scale = tier_scale(a.min(b), config);
    (diff * scale * (1.0 + gap)).tanh()
}

fn tier_scale(lower_rating: f64, config: &RatingFactorConfig) -> f64 {
    config
        .tier_scales
        .iter()
        .find(|(below, _)| lower_rating < *below)
        .map(|(_, scale)| *scale)
        .unwrap_or(config.top_tier_scale)
}

pub fn form_advantage(a: &CompetitorProfile, b: &CompetitorProfile, config: &FormConfig) -> f64 {
    ((form_score(a, config) - form_score(b, config)) * config.scale).tanh()
}

/// Shrunk overall win rate blended with recency-weighted recent results.
/// The recency share grows with match count.
pub fn form_score(profile: &CompetitorProfile, config: &FormConfig) -> f64 {
    let total = profile.total_matches() as f64;
    let shrunk = (profile.wins as f64 + 0.5 * config.prior_matches) / (total + config.prior_matches);

    let recency: f64 = profile
        .recent_results
        .iter()
        .zip(&config.recency_weights)
        .filter(|(outcome, _)| **outcome == MatchOutcome::Win)
        .map(|(_, w)| w)
        .sum();

    let share = config.recency_share_min
        + (config.recency_share_max - config.recency_share_min)
            * (total / (total + config.recency_half_matches));

    share * recency + (1.0 - share) * shrunk
}

pub fn surface_rate(profile: &CompetitorProfile, surface: Surface, config: &SurfaceConfig) -> f64 {
    profile.surface_rate(surface).unwrap_or(if profile.preferred_surface == surface {
        config.preferred_rate
    } else {
        config.other_rate
    })
}

pub fn surface_advantage(
    a: &CompetitorProfile,
    b: &CompetitorProfile,
    surface: Surface,
    config: &SurfaceConfig,
) -> f64 {
    let diff = surface_rate(a, surface, config) - surface_rate(b, surface, config);
    (diff * config.scale).tanh()
}

fn experience_score(profile: &CompetitorProfile, config: &ExperienceConfig) -> f64 {
    let age = (profile.age as f64).min(config.age_cap) / config.age_cap;
    let matches = (profile.total_matches() as f64).min(config.matches_cap) / config.matches_cap;
    config.age_weight * age + config.matches_weight * matches
}

pub fn experience_advantage(
    a: &CompetitorProfile,
    b: &CompetitorProfile,
    config: &ExperienceConfig,
) -> f64 {
    ((experience_score(a, config) - experience_score(b, config)) * config.scale).tanh()
}

/// sqrt damping: a 9-match streak counts three times a 1-match streak.
fn momentum_score(profile: &CompetitorProfile) -> f64 {
    let magnitude = (profile.streak as f64).sqrt();
    match profile.streak_type {
        StreakType::Win => magnitude,
        StreakType::Loss => -magnitude,
    }
}

pub fn momentum_advantage(
    a: &CompetitorProfile,
    b: &CompetitorProfile,
    config: &MomentumConfig,
) -> f64 {
    ((momentum_score(a) - momentum_score(b)) * config.scale).tanh()
}

pub fn head_to_head_advantage(
    h2h: &OrientedHeadToHead,
    today: NaiveDate,
    config: &HeadToHeadConfig,
) -> f64 {
    let Some(rate) = h2h.win_rate() else {
        return 0.0;
    };
    let volume = (1.0 + config.volume_step * h2h.meetings() as f64).min(config.volume_cap);
    let mut raw = (rate - 0.5) * 2.0 * volume;

    if let (Some(won), Some(date)) = (h2h.last_won, h2h.last_match_date) {
        let age_days = today.signed_duration_since(date).num_days();
        if (0..=config.recency_days).contains(&age_days) {
            raw += if won { config.recency_bonus } else { -config.recency_bonus };
        }
    }
    raw.tanh()
}
