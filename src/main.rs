use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;
use rand::rngs::StdRng;
use rand::SeedableRng;

use twenty48::config::GameConfig;
use twenty48::session::{GameSession, Outcome};
use twenty48::storage::{FileStore, KeyValueStore};

#[derive(Debug, Parser)]
#[command(name = "twenty48", about = "Play 2048 in the terminal: w/a/s/d or up/down/left/right, r to restart, q to quit")]
struct Args {
    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Best-score store (JSON); defaults to the platform data directory
    #[arg(long, value_name = "FILE")]
    store: Option<PathBuf>,

    /// Seed for a reproducible game
    #[arg(long)]
    seed: Option<u64>,

    /// Board side length
    #[arg(long)]
    size: Option<usize>,
}

const DEFAULT_LOG_FILTER: &str = "info";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_LOG_FILTER)).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::from_toml(path)?,
        None => GameConfig::default(),
    };
    if let Some(size) = args.size {
        config.size = size;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.store.is_some() {
        config.store_path = args.store.clone();
    }
    config.validate()?;

    let store_path = config.store_path.clone().unwrap_or_else(FileStore::default_path);
    log::info!("best score store: {}", store_path.display());
    let store = FileStore::open_or_empty(store_path);
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut game = GameSession::start(&config, store, rng);
    print_state(&game)?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let key = line.trim();
        match key {
            "q" | "quit" => break,
            "r" | "restart" => {
                game.restart();
                print_state(&game)?;
            }
            _ => match game.handle_key(key) {
                Outcome::Moved { .. } => print_state(&game)?,
                Outcome::Unchanged => println!("(no tiles can move that way)"),
                Outcome::Ignored if game.is_terminal() => println!("Game over. r to restart, q to quit."),
                Outcome::Ignored => {}
            },
        }
    }
    Ok(())
}

fn print_state<S: KeyValueStore, R: rand::Rng>(game: &GameSession<S, R>) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write!(out, "{}", game.grid())?;
    writeln!(out, "Score: {}   Best: {}", game.score(), game.best_score())?;
    if game.is_terminal() {
        writeln!(out, "Game over!")?;
    }
    out.flush()
}
