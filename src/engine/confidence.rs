use super::types::{CompetitorProfile, FactorBreakdown, OrientedHeadToHead, Surface};
use crate::config::ConfidenceConfig;

/// How much the inputs back the estimate, in `[config.min, config.max]`.
///
/// Credits match depth on both sides (two steps), per-surface data for both
/// competitors, any head-to-head history, and overall factor magnitude (two
/// steps).
pub fn estimate(
    a: &CompetitorProfile,
    b: &CompetitorProfile,
    surface: Surface,
    h2h: Option<&OrientedHeadToHead>,
    factors: &FactorBreakdown,
    config: &ConfidenceConfig,
) -> f64 {
    let mut score = config.base;

    let shallowest = a.total_matches().min(b.total_matches());
    if shallowest >= config.depth_matches {
        score += config.depth_bonus;
    }
    if shallowest >= config.deep_matches {
        score += config.deep_bonus;
    }

    if a.surface_rate(surface).is_some() && b.surface_rate(surface).is_some() {
        score += config.surface_bonus;
    }

    if h2h.is_some_and(|h| h.meetings() > 0) {
        score += config.h2h_bonus;
    }

    let magnitude = factors.total_magnitude();
    if magnitude > config.magnitude_threshold {
        score += config.magnitude_bonus;
    }
    if magnitude > config.strong_magnitude_threshold {
        score += config.strong_magnitude_bonus;
    }

    score.clamp(config.min, config.max)
}
