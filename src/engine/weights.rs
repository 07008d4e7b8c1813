use super::types::FactorBreakdown;
use crate::config::WeightConfig;

/// How much each factor moves the score away from 0.5.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorWeights {
    pub rating: f64,
    pub head_to_head: f64,
    /// Shared by form, surface, experience and momentum.
    pub each_other: f64,
}

impl FactorWeights {
    /// Rating weight steps up with the gap, and steps higher when even the
    /// weaker competitor is strong. H2H weight grows with meetings (capped).
    /// The rest is split evenly over the other four factors, compressed for
    /// evenly rated pairs that have never met.
    pub fn allocate(rating_a: f64, rating_b: f64, meetings: u32, config: &WeightConfig) -> Self {
        let gap = (rating_a - rating_b).abs();
        let weaker = rating_a.min(rating_b);
        let high_tier = weaker >= config.high_tier_rating;

        let rating = config
            .rating_brackets
            .iter()
            .find(|b| gap >= b.min_gap)
            .map(|b| if high_tier { b.high_tier_weight } else { b.weight })
            .unwrap_or(config.base_rating_weight);

        let head_to_head = if meetings == 0 {
            0.0
        } else {
            (config.h2h_base + config.h2h_per_meeting * meetings as f64).min(config.h2h_cap)
        };

        let remaining = (1.0 - rating - head_to_head).max(0.0);
        let mut each_other = remaining / 4.0;
        if gap < config.even_gap && meetings == 0 {
            each_other *= config.even_compression;
        }

        Self {
            rating,
            head_to_head,
            each_other,
        }
    }

    /// Weighted sum of the factors.
    pub fn apply(&self, f: &FactorBreakdown) -> f64 {
        self.rating * f.rating_advantage
            + self.head_to_head * f.head_to_head
            + self.each_other * (f.recent_form + f.surface_advantage + f.experience + f.momentum)
    }

    pub fn total(&self) -> f64 {
        self.rating + self.head_to_head + 4.0 * self.each_other
    }
}
