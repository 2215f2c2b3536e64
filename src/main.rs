//! Plinko Table entry point
//!
//! Runs a headless auto-play session against a ledger-backed wallet and
//! prints where the balls landed.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use plinko_table::consts::SIM_HZ;
use plinko_table::sim::{GameEvent, PlinkoState, RiskTier, TickInput, tick};
use plinko_table::wallet::{Ledger, RemoteWallet};
use plinko_table::{Settings, format_cents};

const PLAYER_ID: &str = "player";

/// Stop waiting on balls after this many ticks with nothing dropping
const DRAIN_TICK_CAP: u64 = 60 * SIM_HZ as u64;

#[derive(Parser, Debug)]
#[command(name = "plinko-table")]
#[command(about = "Run a seeded Plinko session and report the payouts")]
struct Args {
    /// Settings JSON file (defaults apply when omitted)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Balls to resolve before stopping
    #[arg(short, long, default_value_t = 100)]
    drops: u64,

    /// RNG seed (overrides settings)
    #[arg(long)]
    seed: Option<u64>,

    /// Risk tier (overrides settings)
    #[arg(long, value_parser = parse_risk)]
    risk: Option<RiskTier>,
}

fn parse_risk(s: &str) -> Result<RiskTier, String> {
    RiskTier::from_str(s).ok_or_else(|| format!("unknown risk tier '{s}' (low, medium, high)"))
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut settings = match &args.settings {
        Some(path) => match Settings::load(path) {
            Ok(s) => s,
            Err(e) => {
                log::error!("Failed to load settings: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = Some(seed);
    }
    if let Some(risk) = args.risk {
        settings.risk = risk;
    }

    let starting_balance = settings.starting_balance;
    let mut state = match PlinkoState::new(settings) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Invalid settings: {e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("Plinko Table starting (seed {})", state.seed());

    let mut ledger = Ledger::new();
    ledger.open_wallet(PLAYER_ID, starting_balance);
    let mut wallet = RemoteWallet::new(PLAYER_ID, ledger);

    let bucket_count = state.board().bucket_count();
    let mut hits = vec![0u64; bucket_count];
    let mut resolved = 0u64;
    let mut idle_ticks = 0u64;

    state.start_auto_play();
    loop {
        if resolved + state.balls().len() as u64 >= args.drops {
            state.stop_auto_play();
        }
        for event in tick(&mut state, &TickInput::default(), &mut wallet) {
            match event {
                GameEvent::Payout(p) => {
                    resolved += 1;
                    if let Some(slot) = hits.get_mut(p.bucket) {
                        *slot += 1;
                    }
                }
                GameEvent::AutoPlayStopped { reason } => {
                    log::info!("Auto-play stopped at tick {}: {reason:?}", state.time_ticks());
                }
                _ => {}
            }
        }
        if state.is_auto_playing() {
            continue;
        }
        if state.is_idle() {
            break;
        }
        idle_ticks += 1;
        if idle_ticks > DRAIN_TICK_CAP {
            log::warn!(
                "Gave up with {} balls in flight and {} credits pending",
                state.balls().len(),
                state.pending_credits().count()
            );
            break;
        }
    }

    let stats = state.stats();
    let balance = wallet.transport().balance_of(PLAYER_ID).unwrap_or(0);
    log::info!(
        "Session done: {} drops, {} resolved, {} discarded",
        stats.drops,
        stats.resolved,
        stats.discarded
    );

    println!("Risk: {}  Rows: {}", state.board().risk(), state.board().rows());
    println!("Bucket  Multiplier  Hits");
    let max_hits = hits.iter().copied().max().unwrap_or(0).max(1);
    for (i, (&count, multiplier)) in hits.iter().zip(state.board().multipliers).enumerate() {
        let bar = "#".repeat((count * 40 / max_hits) as usize);
        println!("{i:>6}  {:>10}  {count:>4} {bar}", multiplier.to_string());
    }
    println!("Wagered:  {}", format_cents(stats.wagered));
    println!("Paid out: {}", format_cents(stats.paid_out));
    println!(
        "Balance:  {} (started at {})",
        format_cents(balance),
        format_cents(starting_balance)
    );

    ExitCode::SUCCESS
}
