//! Roulette Simulator
//!
//! Runs rounds against in-memory collaborators and logs every settlement.

use clap::Parser;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use roulette_engine::{
    games::{EngineServices, RoundScheduler, SeededWheel, ThreadRngWheel, WheelRng},
    store::{BalanceLedger, InMemoryBank, InMemoryConfigStore, InMemoryStatsStore},
    ConfigLoader, RouletteResult,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Bets the simulated players pick from
const BET_MENU: [&str; 10] = [
    "red",
    "black",
    "odd",
    "even",
    "1st dozen",
    "3rd column",
    "2nd half",
    "0",
    "17",
    "5, 8, 11",
];

#[derive(Parser, Debug)]
#[command(name = "roulette-sim")]
#[command(about = "Simulate roulette rounds", long_about = None)]
struct Args {
    /// Number of rooms playing concurrently
    #[arg(long, default_value = "2")]
    rooms: u64,

    /// Players per room
    #[arg(long, default_value = "4")]
    players: u64,

    /// Rounds per room
    #[arg(long, default_value = "3")]
    rounds: usize,

    /// Stake per selection
    #[arg(long, default_value = "100")]
    stake: u64,

    /// Starting balance for every player
    #[arg(long, default_value = "10000")]
    starting_balance: u64,

    /// Balance ceiling for every player
    #[arg(long, default_value = "1000000")]
    max_balance: u64,

    /// Seed for reproducible draws and bet choices
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the ball's travel time
    #[arg(long)]
    no_delay: bool,

    /// Print each settled round as a JSON line
    #[arg(long)]
    json: bool,

    /// Roulette configuration file (TOML)
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    run(args).await?;
    Ok(())
}

async fn run(args: Args) -> RouletteResult<()> {
    let loader = match args.config {
        Some(ref path) => ConfigLoader::new().with_path(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load()?;
    if args.no_delay {
        config.timing.spin_delay_min_secs = 0;
        config.timing.spin_delay_max_secs = 0;
    }

    let bank = Arc::new(InMemoryBank::new(args.max_balance));
    let stats = Arc::new(InMemoryStatsStore::new());
    let wheel: Arc<dyn WheelRng> = match args.seed {
        Some(seed) => Arc::new(SeededWheel::new(seed)),
        None => Arc::new(ThreadRngWheel),
    };
    let mut picker = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    };

    let scheduler = RoundScheduler::new(EngineServices {
        bank: bank.clone(),
        config: Arc::new(InMemoryConfigStore::new(config)),
        stats,
        wheel,
    });
    let mut outcomes = scheduler.subscribe();

    let players_of = |room: u64| (1..=args.players).map(move |p| room * 1_000 + p);
    for room in 1..=args.rooms {
        for player in players_of(room) {
            bank.set_balance(player, args.starting_balance);
        }
    }

    for round in 1..=args.rounds {
        info!(round, "Taking bets");
        let mut spinning = 0;
        for room in 1..=args.rooms {
            for player in players_of(room) {
                let pick = BET_MENU.choose(&mut picker).copied().unwrap_or("red");
                match scheduler.place_bets(room, player, args.stake, pick).await {
                    Ok(receipt) => {
                        for rejection in &receipt.rejected {
                            warn!(room, player, %rejection, "Bet refused");
                        }
                    }
                    Err(e) => warn!(room, player, error = %e, "Submission refused"),
                }
            }
            if scheduler.is_active(room) {
                scheduler.spin_now(room)?;
                spinning += 1;
            }
        }

        for _ in 0..spinning {
            let outcome = match outcomes.recv().await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(error = %e, "Outcome stream interrupted");
                    break;
                }
            };
            if args.json {
                match serde_json::to_string(&outcome) {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!(room = outcome.room, error = %e, "Failed to encode outcome"),
                }
            }
            let s = &outcome.settlement;
            info!(
                room = outcome.room,
                number = s.pocket.number(),
                color = %s.pocket.color(),
                bonus = %s.bonus,
                winners = s.winners.len(),
                paid = s.total_paid,
                staked = s.total_staked,
                "Round settled"
            );
            for line in &s.winners {
                info!(
                    room = outcome.room,
                    bettor = line.bettor,
                    bet = %line.selection,
                    amount = line.amount,
                    "Winner"
                );
            }
        }
    }

    for (rank, (user, entry)) in scheduler.leaderboard().standings(10).await?.iter().enumerate() {
        let balance = bank.balance(*user).await?;
        info!(
            rank = rank + 1,
            user,
            games = entry.games,
            total = entry.total,
            balance,
            "Standing"
        );
    }

    Ok(())
}
