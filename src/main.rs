use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swiss_pairing::config::AppConfig;
use swiss_pairing::ledger::{Ledger, LedgerReport};
use swiss_pairing::models::{Competitor, Pairing, StandingsRow};
use swiss_pairing::round::{compute_standings_only, plan_round, RoundPlan};
use swiss_pairing::storage::{
    append_pairings, read_pairings, read_roster, write_standings, StorageConfig,
};

#[derive(Parser)]
#[command(name = "swiss-pairing")]
#[command(about = "Swiss tournament pairing engine with board allocation and standings")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pair every waiting competitor and assign boards
    Pair {
        /// Print the pairings without writing them
        #[arg(long)]
        dry_run: bool,

        /// Seed for color coin flips, for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Recompute the standings table
    Standings {
        /// Print the standings without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show roster and history status
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    info!("Starting swiss-pairing v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());
    let (roster, history) = load_data(&storage)?;

    match cli.command {
        Commands::Pair { dry_run, seed } => {
            let plan = match seed {
                Some(seed) => {
                    let mut rng = StdRng::seed_from_u64(seed);
                    plan_round(&config, &roster, &history, &mut rng)
                }
                None => plan_round(&config, &roster, &history, &mut rand::thread_rng()),
            }
            .context("Failed to build the player ledger")?;

            print_pairings(&plan);
            print_report(&plan.ledger_report);

            if dry_run {
                println!("\n(dry run - no data written to disk)");
            } else {
                let written = append_pairings(&storage, &plan.pairings)
                    .context("Failed to append pairings")?;
                write_standings(&storage, &plan.standings)
                    .context("Failed to write standings")?;
                println!(
                    "\nAppended {} pairing(s) to {:?}",
                    written,
                    storage.pairings_path()
                );
            }
        }

        Commands::Standings { dry_run } => {
            let (standings, report) = compute_standings_only(&config, &roster, &history)
                .context("Failed to build the player ledger")?;

            print_standings(&standings);
            print_report(&report);

            if dry_run {
                println!("\n(dry run - no data written to disk)");
            } else {
                write_standings(&storage, &standings).context("Failed to write standings")?;
                println!("\nStandings written to {:?}", storage.standings_path());
            }
        }

        Commands::Status => {
            let ledger =
                Ledger::build(&roster, &history).context("Failed to build the player ledger")?;
            let report = ledger.report();

            println!("=== Tournament Status ===");
            println!("Data directory:   {:?}", storage.data_dir);
            if ledger.is_empty() {
                println!("No competitors registered in {:?}", storage.roster_path());
                return Ok(());
            }
            println!("Competitors:      {}", ledger.len());
            println!("Finished games:   {}", report.finished);
            println!("Running games:    {}", report.pending);
            println!("Now playing:      {}", ledger.currently_playing().len());
            println!(
                "Fewest games:     {}",
                ledger.min_games_played().unwrap_or(0)
            );
            println!("Points awarded:   {}", ledger.total_points());
            println!("Color rule:       {}", config.pairing.color_rule);
            println!("Tie-breaks:       {}", config.standings.tiebreaks);
            println!(
                "Boards:           {} x {} game(s), {} at once",
                config.boards.count,
                config.boards.per_board_limit,
                config.boards.capacity()
            );
            println!("Byes credited:    {}", report.byes);
            print_report(report);
        }
    }

    Ok(())
}

/// Read roster and history, reporting lines that could not be parsed.
fn load_data(storage: &StorageConfig) -> Result<(Vec<Competitor>, Vec<Pairing>)> {
    let roster = read_roster(storage)
        .with_context(|| format!("Failed to read roster from {:?}", storage.roster_path()))?;
    let history = read_pairings(storage).with_context(|| {
        format!("Failed to read pairings from {:?}", storage.pairings_path())
    })?;

    if roster.malformed > 0 {
        warn!("Skipped {} malformed roster line(s)", roster.malformed);
    }
    if history.malformed > 0 {
        warn!("Skipped {} malformed pairing line(s)", history.malformed);
    }
    if roster.records.is_empty() {
        warn!("Roster at {:?} is empty", storage.roster_path());
    }

    Ok((roster.records, history.records))
}

fn print_pairings(plan: &RoundPlan) {
    println!("=== Pairings ===");
    if plan.pairings.is_empty() {
        println!("No new pairings ({} competitor(s) waiting)", plan.available);
    } else {
        println!("{:>5}  {:>5}  {:<24} {:<24}", "Round", "Board", "White", "Black");
        for p in &plan.pairings {
            println!(
                "{:>5}  {:>5}  {:<24} {:<24}",
                p.round,
                p.board.to_string(),
                p.white_name.as_deref().unwrap_or_default(),
                p.black_name.as_deref().unwrap_or_default()
            );
        }
    }

    if let Some(strategy) = plan.strategy {
        println!("\nMatcher:          {}", strategy);
    }
    if !plan.unpaired_names.is_empty() {
        println!("Unpaired:         {}", plan.unpaired_names.join(", "));
    }
}

fn print_standings(rows: &[StandingsRow]) {
    fn opt(value: Option<f64>) -> String {
        value.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string())
    }

    println!("=== Standings ===");
    println!(
        "{:>4}  {:<24} {:>5} {:>6} {:>6} {:>5} {:>6}",
        "Rank", "Name", "Pts", "BucT", "Buc1", "DE", "SB"
    );
    for row in rows {
        println!(
            "{:>4}  {:<24} {:>5.1} {:>6.1} {:>6} {:>5} {:>6}",
            row.rank,
            row.name,
            row.points,
            row.buchholz_total,
            opt(row.buchholz_cut1),
            opt(row.direct_encounter),
            opt(row.sonneborn_berger)
        );
    }
}

fn print_report(report: &LedgerReport) {
    if report.skipped() > 0 {
        println!(
            "\nIgnored {} history row(s): {} with unknown competitors, {} self-pairings",
            report.skipped(),
            report.unknown_competitor,
            report.self_pairing
        );
    }
}
