use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use spin_four::config::AppConfig;
use spin_four::game::PlayerId;
use spin_four::logging;
use spin_four::session::{Action, Match};

/// Replay a scripted Connect Four game (with optional column spins) and print
/// the final turn as JSON.
#[derive(Parser)]
#[command(name = "spin-four", about = "Replay a Connect Four game with column spins")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "spin_four.toml")]
    config: PathBuf,

    /// Override number of rows
    #[arg(long)]
    rows: Option<usize>,

    /// Override number of columns
    #[arg(long)]
    columns: Option<usize>,

    /// Disable column spins
    #[arg(long)]
    no_spin: bool,

    /// Moves in turn order, player 1 first: `3` drops a chip in column 3,
    /// `s3` spins column 3
    #[arg(required = true)]
    moves: Vec<Action>,
}

/// Load the config file and apply CLI overrides. Also reports whether the
/// file existed, so the caller can log it once a subscriber is installed.
fn load_settings(cli: &Cli) -> Result<(AppConfig, bool)> {
    let found = cli.config.exists();
    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(rows) = cli.rows {
        config.game.rows = rows;
    }
    if let Some(columns) = cli.columns {
        config.game.columns = columns;
    }
    if cli.no_spin {
        config.game.spin_enabled = false;
    }
    config.validate().context("invalid settings")?;

    Ok((config, found))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, found) = load_settings(&cli)?;
    logging::init(&config.logging.filter);
    if !found {
        warn!(path = %cli.config.display(), "config file not found, using defaults");
    }

    let mut game = Match::challenge(PlayerId(1), PlayerId(2), config.game)?;
    let total = cli.moves.len();
    let mut last = None;

    for (i, action) in cli.moves.into_iter().enumerate() {
        let user = game.engine().current_turn();
        let turn = game
            .act(user, action)
            .with_context(|| format!("move {} ({action:?}) by player {user}", i + 1))?;
        info!(turn = turn.turn, player = %user, ?action, status = ?turn.status, "turn played");

        let over = turn.status.is_over();
        last = Some(turn);
        if over {
            if i + 1 < total {
                warn!(ignored = total - i - 1, "game ended before the script did");
            }
            break;
        }
    }

    let turn = last.context("no moves given")?;
    println!("{}", serde_json::to_string_pretty(&turn)?);
    Ok(())
}
