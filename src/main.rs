use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use tennis_odds::config::Config;
use tennis_odds::engine::{
    compute_parlay, validate_wager, CompetitorProfile, HeadToHeadRecord, MatchContext,
    OddsCalculator, ParlayCalculation, WagerLeg, WagerValidation, WalletSnapshot,
};

const USAGE: &str = "usage: tennis-odds [--config <path>] <odds|parlay> <request.json>";

/// `odds` request: both profiles, the match context, optional history.
#[derive(Debug, Deserialize)]
struct OddsRequest {
    player1: CompetitorProfile,
    player2: CompetitorProfile,
    context: MatchContext,
    #[serde(default)]
    head_to_head: Option<HeadToHeadRecord>,
}

#[derive(Debug, Deserialize)]
struct ParlayRequest {
    legs: Vec<WagerLeg>,
    stake: f64,
    #[serde(default)]
    streak_count: u32,
    #[serde(default)]
    is_safe_wager: bool,
    /// When present the wager is also checked for admission.
    #[serde(default)]
    wallet: Option<WalletSnapshot>,
}

#[derive(Debug, Serialize)]
struct ParlayResponse {
    calculation: ParlayCalculation,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation: Option<WagerValidation>,
}

struct Args {
    config: Option<PathBuf>,
    command: String,
    request: PathBuf,
}

fn parse_args() -> Result<Args> {
    let mut config = None;
    let mut positional = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            let path = args.next().context("--config needs a path")?;
            config = Some(PathBuf::from(path));
        } else if arg == "--help" || arg == "-h" {
            println!("{USAGE}");
            std::process::exit(0);
        } else {
            positional.push(arg);
        }
    }
    match <[String; 2]>::try_from(positional) {
        Ok([command, request]) => Ok(Args {
            config,
            command,
            request: PathBuf::from(request),
        }),
        Err(_) => anyhow::bail!(USAGE),
    }
}

fn read_request<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse request JSON: {}", path.display()))
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tennis_odds=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default()?,
    };

    let output = match args.command.as_str() {
        "odds" => {
            let req: OddsRequest = read_request(&args.request)?;
            let calculator = OddsCalculator::new(config.odds);
            let result = calculator
                .compute_odds(&req.player1, &req.player2, &req.context, req.head_to_head.as_ref())
                .context("Invalid odds request")?;
            serde_json::to_string_pretty(&result)?
        }
        "parlay" => {
            let req: ParlayRequest = read_request(&args.request)?;
            let calculation = compute_parlay(
                &req.legs,
                req.stake,
                req.streak_count,
                req.is_safe_wager,
                &config.parlay,
            );
            let validation = req.wallet.as_ref().map(|wallet| {
                validate_wager(&req.legs, req.stake, req.is_safe_wager, wallet, &config.parlay)
            });
            serde_json::to_string_pretty(&ParlayResponse { calculation, validation })?
        }
        other => anyhow::bail!("unknown command '{other}'\n{USAGE}"),
    };

    println!("{output}");
    Ok(())
}
