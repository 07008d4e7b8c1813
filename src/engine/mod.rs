pub mod confidence;
pub mod factors;
pub mod input;
pub mod insights;
pub mod odds;
pub mod parlay;
pub mod types;
pub mod wager;
pub mod weights;

pub use input::ValidationError;
pub use odds::{probability_bounds, OddsCalculator};
pub use parlay::{compute_parlay, safe_wager_cost, streak_booster};
pub use types::{
    CompetitorProfile, FactorBreakdown, HeadToHeadRecord, MatchContext, OddsResult,
    ParlayCalculation, Surface, WagerLeg,
};
pub use wager::{validate_wager, RejectionReason, WagerValidation, WalletSnapshot};

#[cfg(test)]
pub(crate) mod testing {
    use super::types::{CompetitorProfile, Hand, MatchOutcome, StreakType, Surface};
    use crate::config::OddsConfig;

    /// A mid-career right-hander with a 10-10 record and mixed recent form.
    pub fn profile(id: &str, rating: f64) -> CompetitorProfile {
        CompetitorProfile {
            id: id.to_string(),
            name: format!("Player {id}"),
            rating,
            wins: 10,
            losses: 10,
            recent_results: vec![
                MatchOutcome::Win,
                MatchOutcome::Loss,
                MatchOutcome::Win,
                MatchOutcome::Loss,
                MatchOutcome::Win,
            ],
            streak: 0,
            streak_type: StreakType::Win,
            preferred_surface: Surface::Hard,
            surface_win_rates: Default::default(),
            aggressiveness: 5,
            stamina: 5,
            consistency: 5,
            age: 25,
            hand: Hand::Right,
            notes: String::new(),
            last_match_date: None,
            injury_status: None,
            seasonal_form: None,
        }
    }

    /// Defaults with the perturbation switched off.
    pub fn quiet_config() -> OddsConfig {
        OddsConfig {
            perturbation: 0.0,
            ..OddsConfig::default()
        }
    }
}
