use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::input::ValidationError;

/// Number of entries in `CompetitorProfile::recent_results`.
pub const RECENT_RESULTS_LEN: usize = 5;

/// Playing surface. Parsed case-insensitively; anything else is a
/// validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Surface {
    Hard,
    Clay,
    Grass,
    Carpet,
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Hard => "hard",
            Surface::Clay => "clay",
            Surface::Grass => "grass",
            Surface::Carpet => "carpet",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Surface {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hard" => Ok(Surface::Hard),
            "clay" => Ok(Surface::Clay),
            "grass" => Ok(Surface::Grass),
            "carpet" => Ok(Surface::Carpet),
            _ => Err(ValidationError::UnknownSurface(s.to_string())),
        }
    }
}

impl TryFrom<String> for Surface {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    Win,
    Loss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakType {
    Win,
    Loss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjuryStatus {
    Healthy,
    Doubtful,
    Injured,
}

/// One competitor as supplied by the player-data store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorProfile {
    pub id: String,
    pub name: String,
    /// Skill rating, 1.0 (novice) to 7.0 (elite).
    pub rating: f64,
    pub wins: u32,
    pub losses: u32,
    /// Most recent first, exactly `RECENT_RESULTS_LEN` entries.
    pub recent_results: Vec<MatchOutcome>,
    pub streak: u32,
    pub streak_type: StreakType,
    pub preferred_surface: Surface,
    /// Win rate in [0, 1] per surface, where known.
    #[serde(default)]
    pub surface_win_rates: HashMap<Surface, f64>,
    pub aggressiveness: u8,
    pub stamina: u8,
    pub consistency: u8,
    pub age: u32,
    pub hand: Hand,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub last_match_date: Option<NaiveDate>,
    #[serde(default)]
    pub injury_status: Option<InjuryStatus>,
    /// Current-season win rate in [0, 1].
    #[serde(default)]
    pub seasonal_form: Option<f64>,
}

impl CompetitorProfile {
    pub fn total_matches(&self) -> u32 {
        self.wins.saturating_add(self.losses)
    }

    pub fn surface_rate(&self, surface: Surface) -> Option<f64> {
        self.surface_win_rates.get(&surface).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchContext {
    pub surface: Surface,
    /// Day the match is played; "today" (UTC) when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl MatchContext {
    pub fn new(surface: Surface) -> Self {
        Self { surface, date: None }
    }

    pub fn on(surface: Surface, date: NaiveDate) -> Self {
        Self { surface, date: Some(date) }
    }
}

/// Aggregate results between two specific competitors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadToHeadRecord {
    pub player1_id: String,
    pub player2_id: String,
    pub player1_wins: u32,
    pub player2_wins: u32,
    #[serde(default)]
    pub last_winner_id: Option<String>,
    #[serde(default)]
    pub last_match_date: Option<NaiveDate>,
}

/// A head-to-head record re-oriented onto the calculator's (player1, player2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedHeadToHead {
    pub wins: u32,
    pub losses: u32,
    /// `Some(true)` when player1 won the latest meeting.
    pub last_won: Option<bool>,
    pub last_match_date: Option<NaiveDate>,
}

impl OrientedHeadToHead {
    pub fn meetings(&self) -> u32 {
        self.wins.saturating_add(self.losses)
    }

    /// Player1's share of meetings, `None` without any meeting.
    pub fn win_rate(&self) -> Option<f64> {
        match self.meetings() {
            0 => None,
            n => Some(self.wins as f64 / n as f64),
        }
    }
}

/// Per-factor contributions, each in [-1, 1]. Positive favours player1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub rating_advantage: f64,
    pub recent_form: f64,
    pub surface_advantage: f64,
    pub experience: f64,
    pub momentum: f64,
    pub head_to_head: f64,
}

impl FactorBreakdown {
    pub fn total_magnitude(&self) -> f64 {
        self.rating_advantage.abs()
            + self.recent_form.abs()
            + self.surface_advantage.abs()
            + self.experience.abs()
            + self.momentum.abs()
            + self.head_to_head.abs()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsResult {
    pub player1_win_probability: f64,
    pub player2_win_probability: f64,
    pub player1_odds: f64,
    pub player2_odds: f64,
    pub confidence: f64,
    pub factors: FactorBreakdown,
    pub recommendations: Vec<String>,
}

/// One selection inside a compound wager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WagerLeg {
    pub match_id: String,
    pub selection_id: String,
    /// Decimal odds for the selection.
    pub odds: f64,
    #[serde(default)]
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParlayCalculation {
    pub leg_count: usize,
    pub base_odds: f64,
    pub bonus_multiplier: f64,
    pub streak_booster: f64,
    pub final_odds: f64,
    pub potential_payout: f64,
    /// Bonus as a whole percentage (5.0 = 5%).
    pub bonus_percentage: f64,
    pub bonus_eligible: bool,
    /// Safe-wager tokens this wager consumes, 0 for a normal wager.
    pub safe_wager_cost: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_parses_case_insensitively() {
        assert_eq!("Clay".parse::<Surface>().unwrap(), Surface::Clay);
        assert_eq!(" GRASS ".parse::<Surface>().unwrap(), Surface::Grass);
    }

    #[test]
    fn test_unknown_surface_is_validation_error() {
        let err = "ice".parse::<Surface>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownSurface("ice".to_string()));
    }

    #[test]
    fn test_surface_json_rejects_unknown_value() {
        let err = serde_json::from_str::<MatchContext>(r#"{"surface":"sand"}"#).unwrap_err();
        assert!(err.to_string().contains("unrecognized surface"), "got {err}");
    }

    #[test]
    fn test_surface_map_keys_round_trip_through_json() {
        let json = r#"{"clay": 0.7, "hard": 0.5}"#;
        let rates: HashMap<Surface, f64> = serde_json::from_str(json).unwrap();
        assert_eq!(rates.get(&Surface::Clay), Some(&0.7));
        assert_eq!(rates.get(&Surface::Grass), None);
    }

    #[test]
    fn test_oriented_h2h_rate() {
        let h2h = OrientedHeadToHead {
            wins: 3,
            losses: 1,
            last_won: Some(true),
            last_match_date: None,
        };
        assert_eq!(h2h.meetings(), 4);
        assert_eq!(h2h.win_rate(), Some(0.75));

        let empty = OrientedHeadToHead { wins: 0, losses: 0, last_won: None, last_match_date: None };
        assert_eq!(empty.win_rate(), None);
    }
}
