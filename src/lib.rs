//! Match outcome and wagering computation engine.
//!
//! [`engine::OddsCalculator`] turns two competitor profiles into win
//! probabilities and decimal odds; [`engine::compute_parlay`] and
//! [`engine::validate_wager`] price and admit compound wagers built from
//! those odds. Everything here is pure: no storage, no network.
pub mod config;
pub mod engine;
