//! Admission checks for a proposed compound wager.
//!
//! Rejections are ordinary values, not errors: the caller relays the reason
//! to the user.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::parlay::safe_wager_cost;
use super::types::WagerLeg;
use crate::config::ParlayConfig;

/// Balance and lock state supplied by the wallet collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub balance: f64,
    #[serde(default)]
    pub safe_tokens: u32,
    /// Matches that no longer accept wagers.
    #[serde(default)]
    pub locked_match_ids: HashSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
    TooFewLegs { required: usize, got: usize },
    NonPositiveStake { stake: f64 },
    InsufficientBalance { stake: f64, balance: f64 },
    MatchLocked { match_id: String },
    DuplicateMatch { match_id: String },
    InvalidOdds { match_id: String, odds: f64 },
    InsufficientSafeTokens { required: u32, available: u32 },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewLegs { required, got } => {
                write!(f, "Parlay requires at least {required} legs (got {got})")
            }
            Self::NonPositiveStake { .. } => write!(f, "Stake must be greater than 0"),
            Self::InsufficientBalance { stake, balance } => {
                write!(f, "Insufficient balance: stake {stake:.2} exceeds {balance:.2}")
            }
            Self::MatchLocked { match_id } => write!(f, "Match {match_id} is locked"),
            Self::DuplicateMatch { match_id } => {
                write!(f, "Match {match_id} appears in more than one leg")
            }
            Self::InvalidOdds { match_id, odds } => {
                write!(f, "Leg on match {match_id} has invalid odds {odds}")
            }
            Self::InsufficientSafeTokens { required, available } => write!(
                f,
                "Insufficient safe-wager tokens: need {required}, have {available}"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WagerValidation {
    Valid,
    Invalid { reason: RejectionReason },
}

impl WagerValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, WagerValidation::Valid)
    }

    /// User-facing text for a rejection.
    pub fn reason(&self) -> Option<String> {
        match self {
            WagerValidation::Valid => None,
            WagerValidation::Invalid { reason } => Some(reason.to_string()),
        }
    }
}

/// Check a proposed compound wager. The first failing rule wins, in this
/// order: leg count, stake, balance, per-leg checks (odds, duplicates,
/// locks), safe tokens.
pub fn validate_wager(
    legs: &[WagerLeg],
    stake: f64,
    is_safe_wager: bool,
    wallet: &WalletSnapshot,
    config: &ParlayConfig,
) -> WagerValidation {
    match check(legs, stake, is_safe_wager, wallet, config) {
        Ok(()) => WagerValidation::Valid,
        Err(reason) => {
            tracing::debug!(%reason, legs = legs.len(), stake, "wager rejected");
            WagerValidation::Invalid { reason }
        }
    }
}

fn check(
    legs: &[WagerLeg],
    stake: f64,
    is_safe_wager: bool,
    wallet: &WalletSnapshot,
    config: &ParlayConfig,
) -> Result<(), RejectionReason> {
    if legs.len() < config.min_legs {
        return Err(RejectionReason::TooFewLegs {
            required: config.min_legs,
            got: legs.len(),
        });
    }
    // NaN fails this comparison too.
    if !(stake > 0.0) {
        return Err(RejectionReason::NonPositiveStake { stake });
    }
    if stake > wallet.balance {
        return Err(RejectionReason::InsufficientBalance {
            stake,
            balance: wallet.balance,
        });
    }

    let mut seen = HashSet::with_capacity(legs.len());
    for leg in legs {
        if !leg.odds.is_finite() || leg.odds <= 1.0 {
            return Err(RejectionReason::InvalidOdds {
                match_id: leg.match_id.clone(),
                odds: leg.odds,
            });
        }
        if !seen.insert(leg.match_id.as_str()) {
            return Err(RejectionReason::DuplicateMatch {
                match_id: leg.match_id.clone(),
            });
        }
        if wallet.locked_match_ids.contains(&leg.match_id) {
            return Err(RejectionReason::MatchLocked {
                match_id: leg.match_id.clone(),
            });
        }
    }

    if is_safe_wager {
        let required = safe_wager_cost(legs.len(), config);
        if required > wallet.safe_tokens {
            return Err(RejectionReason::InsufficientSafeTokens {
                required,
                available: wallet.safe_tokens,
            });
        }
    }
    Ok(())
}
