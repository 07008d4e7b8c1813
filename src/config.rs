use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::engine::types::RECENT_RESULTS_LEN;

/// Environment variable that points the binary at a non-default config file.
pub const CONFIG_PATH_ENV: &str = "TENNIS_ODDS_CONFIG";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub odds: OddsConfig,
    #[serde(default)]
    pub parlay: ParlayConfig,
}

/// Every tunable constant of the odds calculator.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OddsConfig {
    /// Bookmaker margin folded into decimal odds (0.05 = 5%).
    pub margin: f64,
    /// Half-width of the uniform score perturbation. 0 disables it.
    pub perturbation: f64,
    /// Decimal odds never exceed this value.
    pub max_decimal_odds: f64,
    pub rating: RatingFactorConfig,
    pub form: FormConfig,
    pub surface: SurfaceConfig,
    pub experience: ExperienceConfig,
    pub momentum: MomentumConfig,
    pub head_to_head: HeadToHeadConfig,
    pub weights: WeightConfig,
    pub bounds: BoundsConfig,
    pub confidence: ConfidenceConfig,
    pub insights: InsightConfig,
}

impl Default for OddsConfig {
    fn default() -> Self {
        Self {
            margin: 0.05,
            perturbation: 0.025,
            max_decimal_odds: 19.99,
            rating: RatingFactorConfig::default(),
            form: FormConfig::default(),
            surface: SurfaceConfig::default(),
            experience: ExperienceConfig::default(),
            momentum: MomentumConfig::default(),
            head_to_head: HeadToHeadConfig::default(),
            weights: WeightConfig::default(),
            bounds: BoundsConfig::default(),
            confidence: ConfidenceConfig::default(),
            insights: InsightConfig::default(),
        }
    }
}

impl OddsConfig {
    /// Reject calculator tables that would break its invariants (or panic
    /// in `f64::clamp` on inverted bounds).
    pub fn validate(&self) -> Result<()> {
        let odds = self;
        if odds.form.recency_weights.len() != RECENT_RESULTS_LEN {
            anyhow::bail!(
                "odds.form.recency_weights must have {} entries, got {}",
                RECENT_RESULTS_LEN,
                odds.form.recency_weights.len()
            );
        }
        if !(odds.margin >= 0.0 && odds.margin < 1.0) {
            anyhow::bail!("odds.margin must be in [0, 1), got {}", odds.margin);
        }
        if !(odds.perturbation >= 0.0 && odds.perturbation < 0.5) {
            anyhow::bail!("odds.perturbation must be in [0, 0.5), got {}", odds.perturbation);
        }
        if odds.max_decimal_odds <= 1.0 {
            anyhow::bail!("odds.max_decimal_odds must exceed 1.0");
        }
        if odds.rating.min_rating >= odds.rating.max_rating {
            anyhow::bail!("odds.rating.min_rating must be below max_rating");
        }

        let bounds = &odds.bounds;
        let all_bounds = std::iter::once(bounds.even)
            .chain(bounds.brackets.iter().map(|b| (b.low, b.high)))
            .chain(std::iter::once(bounds.widest));
        for (low, high) in all_bounds {
            if !(0.0 < low && low < high && high < 1.0) {
                anyhow::bail!("probability bounds ({low}, {high}) must satisfy 0 < low < high < 1");
            }
        }
        if bounds.brackets.windows(2).any(|w| w[0].max_gap >= w[1].max_gap) {
            anyhow::bail!("odds.bounds.brackets must be ordered by increasing max_gap");
        }
        if odds
            .weights
            .rating_brackets
            .windows(2)
            .any(|w| w[0].min_gap <= w[1].min_gap)
        {
            anyhow::bail!("odds.weights.rating_brackets must be ordered by decreasing min_gap");
        }
        if odds.confidence.min > odds.confidence.max {
            anyhow::bail!("odds.confidence.min must not exceed max");
        }
        if odds.insights.max_recommendations == 0 {
            anyhow::bail!("odds.insights.max_recommendations must be at least 1");
        }
        for (name, value) in [
            ("odds.head_to_head.blend_cap", odds.head_to_head.blend_cap),
            ("odds.head_to_head.floor_tilt", odds.head_to_head.floor_tilt),
            ("odds.weights.even_compression", odds.weights.even_compression),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("{name} must be in [0, 1], got {value}");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RatingFactorConfig {
    pub min_rating: f64,
    pub max_rating: f64,
    /// Gaps at or above this use the steep linear multiplier.
    pub steep_gap: f64,
    pub steep_multiplier: f64,
    /// `(below_rating, scale)` pairs for small gaps, keyed on the lower rating.
    pub tier_scales: Vec<(f64, f64)>,
    pub top_tier_scale: f64,
}

impl Default for RatingFactorConfig {
    fn default() -> Self {
        Self {
            min_rating: 1.0,
            max_rating: 7.0,
            steep_gap: 0.5,
            steep_multiplier: 3.0,
            tier_scales: vec![(3.0, 1.2), (4.5, 1.6)],
            top_tier_scale: 2.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FormConfig {
    /// Most-recent-first weights over the recent results.
    pub recency_weights: Vec<f64>,
    /// Pseudo-matches at 50% used to shrink the overall win rate.
    pub prior_matches: f64,
    pub recency_share_min: f64,
    pub recency_share_max: f64,
    /// Match count at which the recency share is halfway between min and max.
    pub recency_half_matches: f64,
    pub scale: f64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            recency_weights: vec![0.4, 0.25, 0.2, 0.1, 0.05],
            prior_matches: 10.0,
            recency_share_min: 0.3,
            recency_share_max: 0.7,
            recency_half_matches: 20.0,
            scale: 2.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SurfaceConfig {
    pub preferred_rate: f64,
    pub other_rate: f64,
    pub scale: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            preferred_rate: 0.65,
            other_rate: 0.35,
            scale: 0.8,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExperienceConfig {
    pub age_weight: f64,
    pub matches_weight: f64,
    pub age_cap: f64,
    pub matches_cap: f64,
    pub scale: f64,
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            age_weight: 0.3,
            matches_weight: 0.7,
            age_cap: 35.0,
            matches_cap: 300.0,
            scale: 0.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MomentumConfig {
    pub scale: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self { scale: 0.25 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HeadToHeadConfig {
    pub volume_step: f64,
    pub volume_cap: f64,
    pub recency_days: i64,
    pub recency_bonus: f64,
    /// Meetings needed before the score is blended toward the raw h2h rate
    /// and the dominance floor applies.
    pub blend_min_meetings: u32,
    pub blend_per_meeting: f64,
    pub blend_gap_damping: f64,
    pub blend_cap: f64,
    /// Fraction of the h2h edge over 0.5 kept as a probability floor.
    pub floor_tilt: f64,
}

impl Default for HeadToHeadConfig {
    fn default() -> Self {
        Self {
            volume_step: 0.2,
            volume_cap: 3.0,
            recency_days: 180,
            recency_bonus: 0.1,
            blend_min_meetings: 2,
            blend_per_meeting: 0.08,
            blend_gap_damping: 2.0,
            blend_cap: 0.85,
            floor_tilt: 0.3,
        }
    }
}

/// One rating-weight bracket: applies when the gap is at least `min_gap`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RatingWeightBracket {
    pub min_gap: f64,
    pub weight: f64,
    /// Used instead of `weight` when the weaker rating is at or above
    /// `WeightConfig::high_tier_rating`.
    pub high_tier_weight: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WeightConfig {
    /// Highest `min_gap` first.
    pub rating_brackets: Vec<RatingWeightBracket>,
    pub base_rating_weight: f64,
    pub high_tier_rating: f64,
    pub h2h_base: f64,
    pub h2h_per_meeting: f64,
    pub h2h_cap: f64,
    /// Gap below which two competitors count as evenly rated.
    pub even_gap: f64,
    /// Share of the non-rating weight kept for evenly rated, no-history matches.
    pub even_compression: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            rating_brackets: vec![
                RatingWeightBracket { min_gap: 1.5, weight: 0.60, high_tier_weight: 0.70 },
                RatingWeightBracket { min_gap: 1.0, weight: 0.50, high_tier_weight: 0.60 },
                RatingWeightBracket { min_gap: 0.5, weight: 0.40, high_tier_weight: 0.50 },
            ],
            base_rating_weight: 0.30,
            high_tier_rating: 4.0,
            h2h_base: 0.05,
            h2h_per_meeting: 0.03,
            h2h_cap: 0.25,
            even_gap: 0.1,
            even_compression: 0.3,
        }
    }
}

/// Probability bounds applied while the rating gap is below `max_gap`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GapBound {
    pub max_gap: f64,
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BoundsConfig {
    /// Bounds for evenly rated competitors with no shared history.
    pub even: (f64, f64),
    /// Narrowest first.
    pub brackets: Vec<GapBound>,
    pub widest: (f64, f64),
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            even: (0.42, 0.58),
            brackets: vec![
                GapBound { max_gap: 0.2, low: 0.38, high: 0.62 },
                GapBound { max_gap: 0.35, low: 0.32, high: 0.68 },
                GapBound { max_gap: 0.5, low: 0.25, high: 0.75 },
                GapBound { max_gap: 1.0, low: 0.15, high: 0.85 },
                GapBound { max_gap: 1.5, low: 0.10, high: 0.90 },
            ],
            widest: (0.05, 0.95),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub base: f64,
    pub depth_matches: u32,
    pub depth_bonus: f64,
    pub deep_matches: u32,
    pub deep_bonus: f64,
    pub surface_bonus: f64,
    pub h2h_bonus: f64,
    pub magnitude_threshold: f64,
    pub magnitude_bonus: f64,
    pub strong_magnitude_threshold: f64,
    pub strong_magnitude_bonus: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            base: 0.5,
            depth_matches: 10,
            depth_bonus: 0.1,
            deep_matches: 50,
            deep_bonus: 0.1,
            surface_bonus: 0.05,
            h2h_bonus: 0.1,
            magnitude_threshold: 0.5,
            magnitude_bonus: 0.05,
            strong_magnitude_threshold: 1.0,
            strong_magnitude_bonus: 0.05,
            min: 0.3,
            max: 0.95,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InsightConfig {
    pub max_recommendations: usize,
    pub h2h_threshold: f64,
    pub rating_threshold: f64,
    pub surface_threshold: f64,
    pub form_threshold: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            max_recommendations: 3,
            h2h_threshold: 0.1,
            rating_threshold: 0.15,
            surface_threshold: 0.1,
            form_threshold: 0.1,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ParlayConfig {
    pub min_legs: usize,
    pub bonus_min_legs: usize,
    /// 0.05 = 5% bonus.
    pub bonus_percentage: f64,
    pub streak_min: u32,
    pub streak_step: f64,
    pub streak_cap: f64,
    pub safe_tokens_per_leg: u32,
}

impl Default for ParlayConfig {
    fn default() -> Self {
        Self {
            min_legs: 2,
            bonus_min_legs: 3,
            bonus_percentage: 0.05,
            streak_min: 3,
            streak_step: 0.02,
            streak_cap: 0.20,
            safe_tokens_per_leg: 1,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `$TENNIS_ODDS_CONFIG`, else `config.toml` if present, else defaults.
    pub fn load_or_default() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.is_empty() {
                return Self::load(Path::new(&path));
            }
        }
        let local = Path::new("config.toml");
        if local.exists() {
            return Self::load(local);
        }
        Ok(Self::default())
    }

    /// Reject tables that would break the engine's invariants.
    pub fn validate(&self) -> Result<()> {
        self.odds.validate()?;

        let parlay = &self.parlay;
        if parlay.bonus_percentage < 0.0 || parlay.streak_step < 0.0 || parlay.streak_cap < 0.0 {
            anyhow::bail!("parlay multipliers must be non-negative");
        }
        Ok(())
    }
}
