//! Boundary checks run before any odds arithmetic.

use thiserror::Error;

use super::types::{
    CompetitorProfile, HeadToHeadRecord, OrientedHeadToHead, RECENT_RESULTS_LEN,
};
use crate::config::RatingFactorConfig;

const TRAIT_RANGE: std::ops::RangeInclusive<u8> = 1..=10;
const AGE_RANGE: std::ops::RangeInclusive<u32> = 1..=100;

/// Malformed or out-of-contract calculator input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{player}: rating {value} outside [{min}, {max}]")]
    RatingOutOfRange {
        player: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{player}: recent results must have exactly {expected} entries, got {got}")]
    RecentResultsLength {
        player: String,
        expected: usize,
        got: usize,
    },

    #[error("unrecognized surface '{0}'")]
    UnknownSurface(String),

    #[error("{player}: {name} score {value} outside 1..=10")]
    TraitOutOfRange {
        player: String,
        name: &'static str,
        value: u8,
    },

    #[error("{player}: age {value} outside 1..=100")]
    AgeOutOfRange { player: String, value: u32 },

    #[error("{player}: {field} {value} must be a rate in [0, 1]")]
    InvalidRate {
        player: String,
        field: String,
        value: f64,
    },

    #[error("head-to-head record covers {record:?}, match is between {expected:?}")]
    HeadToHeadMismatch {
        record: (String, String),
        expected: (String, String),
    },

    #[error("head-to-head last winner '{0}' is not one of the two competitors")]
    UnknownLastWinner(String),
}

pub fn validate_profile(
    profile: &CompetitorProfile,
    rating: &RatingFactorConfig,
) -> Result<(), ValidationError> {
    let player = || profile.id.clone();

    if !profile.rating.is_finite()
        || profile.rating < rating.min_rating
        || profile.rating > rating.max_rating
    {
        return Err(ValidationError::RatingOutOfRange {
            player: player(),
            value: profile.rating,
            min: rating.min_rating,
            max: rating.max_rating,
        });
    }

    if profile.recent_results.len() != RECENT_RESULTS_LEN {
        return Err(ValidationError::RecentResultsLength {
            player: player(),
            expected: RECENT_RESULTS_LEN,
            got: profile.recent_results.len(),
        });
    }

    for (name, value) in [
        ("aggressiveness", profile.aggressiveness),
        ("stamina", profile.stamina),
        ("consistency", profile.consistency),
    ] {
        if !TRAIT_RANGE.contains(&value) {
            return Err(ValidationError::TraitOutOfRange {
                player: player(),
                name,
                value,
            });
        }
    }

    if !AGE_RANGE.contains(&profile.age) {
        return Err(ValidationError::AgeOutOfRange {
            player: player(),
            value: profile.age,
        });
    }

    for (surface, rate) in &profile.surface_win_rates {
        check_rate(profile, || format!("{surface} win rate"), *rate)?;
    }
    if let Some(form) = profile.seasonal_form {
        check_rate(profile, || "seasonal form".to_string(), form)?;
    }

    Ok(())
}

fn check_rate(
    profile: &CompetitorProfile,
    field: impl FnOnce() -> String,
    value: f64,
) -> Result<(), ValidationError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        return Ok(());
    }
    Err(ValidationError::InvalidRate {
        player: profile.id.clone(),
        field: field(),
        value,
    })
}

/// Check that `record` covers exactly `a` and `b` and flip it onto their order.
pub fn orient_head_to_head(
    record: &HeadToHeadRecord,
    a: &CompetitorProfile,
    b: &CompetitorProfile,
) -> Result<OrientedHeadToHead, ValidationError> {
    let (wins, losses) = if record.player1_id == a.id && record.player2_id == b.id {
        (record.player1_wins, record.player2_wins)
    } else if record.player1_id == b.id && record.player2_id == a.id {
        (record.player2_wins, record.player1_wins)
    } else {
        return Err(ValidationError::HeadToHeadMismatch {
            record: (record.player1_id.clone(), record.player2_id.clone()),
            expected: (a.id.clone(), b.id.clone()),
        });
    };

    let last_won = match record.last_winner_id.as_deref() {
        None => None,
        Some(id) if id == a.id => Some(true),
        Some(id) if id == b.id => Some(false),
        Some(id) => return Err(ValidationError::UnknownLastWinner(id.to_string())),
    };

    Ok(OrientedHeadToHead {
        wins,
        losses,
        last_won,
        last_match_date: record.last_match_date,
    })
}
