//! Short human-readable notes explaining the biggest factors.

use super::types::{CompetitorProfile, FactorBreakdown, OrientedHeadToHead, Surface};
use crate::config::InsightConfig;

/// Up to `max_recommendations` lines in priority order: head-to-head, rating,
/// surface, recent form. Falls back to a single "evenly matched" line.
pub fn recommendations(
    a: &CompetitorProfile,
    b: &CompetitorProfile,
    surface: Surface,
    h2h: Option<&OrientedHeadToHead>,
    factors: &FactorBreakdown,
    config: &InsightConfig,
) -> Vec<String> {
    let favoured = |value: f64| if value >= 0.0 { (a, b) } else { (b, a) };
    let mut out = Vec::with_capacity(config.max_recommendations);

    if factors.head_to_head.abs() > config.h2h_threshold {
        if let Some(h) = h2h {
            let (lead, trail) = favoured(factors.head_to_head);
            let (w, l) = if lead.id == a.id { (h.wins, h.losses) } else { (h.losses, h.wins) };
            out.push(format!(
                "{} leads the head-to-head against {} {}-{}",
                lead.name, trail.name, w, l
            ));
        }
    }

    if factors.rating_advantage.abs() > config.rating_threshold {
        let (lead, trail) = favoured(factors.rating_advantage);
        out.push(format!(
            "{} holds a {:.1}-point rating edge over {}",
            lead.name,
            lead.rating - trail.rating,
            trail.name
        ));
    }

    if factors.surface_advantage.abs() > config.surface_threshold {
        let (lead, _) = favoured(factors.surface_advantage);
        if let Some(rate) = lead.surface_rate(surface) {
            out.push(format!(
                "{} excels on {} ({:.0}% win rate)",
                lead.name,
                surface,
                rate * 100.0
            ));
        }
    }

    if factors.recent_form.abs() > config.form_threshold {
        let (lead, _) = favoured(factors.recent_form);
        out.push(format!("{} arrives in stronger recent form", lead.name));
    }

    out.truncate(config.max_recommendations);
    if out.is_empty() {
        out.push(format!(
            "{} and {} are evenly matched; no single factor stands out",
            a.name, b.name
        ));
    }
    out
}
