use anyhow::Context;
use clap::{Parser, Subcommand};
use dicehouse_execution::{Casino, Dice, EntropyDice, Error, FileStore, SeededDice};
use dicehouse_terminal::{render, Config};
use dicehouse_types::casino::{parse_amount, GameType, Parity};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(author, version, about = "Single-player dice table.", long_about = None)]
struct Args {
    /// YAML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the saved session.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Table to play: parity or point.
    #[arg(short, long)]
    game: Option<GameType>,

    /// Hex-encoded 32-byte seed for deterministic dice.
    #[arg(long)]
    seed: Option<String>,

    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sit down at the table.
    Register { name: String },
    /// Wager on the next roll.
    Roll {
        amount: String,
        /// even or odd, required on the parity table.
        pick: Option<String>,
    },
    /// Start the next round once the current one is decided.
    NextRound,
    /// Show the player and the round.
    Status,
    /// Show recent bets, newest first.
    History {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the best balances.
    Leaderboard {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Leave the table and wipe the saved session.
    Exit,
}

fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();

    // Load config
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(game) = args.game {
        config.game = game;
    }
    if let Some(directory) = &args.data_dir {
        config.directory = directory.to_string_lossy().into_owned();
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(log_level) = args.log_level {
        config.log_level = log_level;
    }
    let config = config.validate().context("invalid configuration")?;

    // Create logger
    if config.json_logs {
        tracing_subscriber::fmt()
            .with_max_level(config.log_level)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(config.log_level)
            .with_writer(std::io::stderr)
            .init();
    }

    // Open table
    let dice: Box<dyn Dice> = match &config.seed {
        Some(seed) => {
            debug!("using seeded dice");
            Box::new(SeededDice::new(*seed))
        }
        None => Box::new(EntropyDice::new()),
    };
    let store = FileStore::open(&config.directory)
        .with_context(|| format!("failed to open session in {:?}", config.directory))?;
    let mut casino =
        Casino::open(config.rules.clone(), store, dice).context("failed to load session")?;

    match args.command {
        Command::Register { name } => {
            let game = casino.game_type();
            let player = casino.register(&name)?;
            println!(
                "welcome {}, you have ${} at the {game} table",
                player.name, player.ledger.balance
            );
        }
        Command::Roll { amount, pick } => {
            let amount = parse_amount(&amount)?;
            let pick = pick.map(|pick| pick.parse::<Parity>()).transpose()?;
            match casino.roll(amount, pick) {
                Ok(rolled) => println!("{}", render::roll(&rolled, amount)),
                Err(Error::Persistence(err)) => {
                    if let Some(rolled) = casino.last_roll() {
                        println!("{}", render::roll(rolled, amount));
                    }
                    return Err(err).context("roll was not saved");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::NextRound => {
            if casino.next_round()? {
                println!("new round, place your bet");
            } else {
                println!("round still in play ({})", casino.current_phase());
            }
        }
        Command::Status => {
            println!(
                "{}",
                render::status(
                    casino.game_type(),
                    casino.player(),
                    casino.current_phase(),
                    casino.locked_wager(),
                )
            );
        }
        Command::History { limit } => {
            let limit = limit.unwrap_or(config.history_display_limit);
            println!("{}", render::history(casino.history(), limit));
        }
        Command::Leaderboard { limit } => {
            let limit = limit.unwrap_or(config.leaderboard_display_limit);
            println!("{}", render::leaderboard(casino.leaderboard(), limit));
        }
        Command::Exit => {
            casino.exit().context("failed to clear session")?;
            println!("session cleared, goodbye");
        }
    }

    Ok(())
}
