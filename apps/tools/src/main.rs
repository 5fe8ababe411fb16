mod canary;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::DEFAULT_CONFIG_FILE, load_settings, GameServer, HttpGameServer,
};
use shared::domain::{Board, Disc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    /// Base URL of the move server; overrides the config file.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a warm-up request.
    Warm,
    /// Ask the server for its move on a board loaded from a text file.
    Recommend {
        #[arg(long)]
        board: PathBuf,
        #[arg(long, value_parser = parse_disc)]
        player: Disc,
    },
    /// Replay the known-good exchange and fail on any difference.
    Canary,
}

fn parse_disc(raw: &str) -> Result<Disc, String> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => {
            Disc::from_symbol(symbol).ok_or_else(|| format!("unknown disc '{raw}', use r or y"))
        }
        _ => Err(format!("unknown disc '{raw}', use r or y")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(url) = cli.server_url {
        settings.server_url = url;
        settings.validate()?;
    }
    let server = HttpGameServer::from_settings(&settings)?;
    info!(endpoint = %server.endpoint(), "using move server");

    match cli.command {
        Command::Warm => {
            server.warm().await?;
            println!("warm-up sent");
        }
        Command::Recommend { board, player } => {
            let raw = fs::read_to_string(&board)
                .with_context(|| format!("reading board {}", board.display()))?;
            let board: Board = raw.parse()?;
            let reply = server.recommend(player, &board).await?;
            println!(
                "recommended column {} (lands on row {}), state {:?}",
                reply.recommend_column + 1,
                reply.recommend_row + 1,
                reply.game_state
            );
            println!("{}", reply.board);
        }
        Command::Canary => {
            let expected = canary::expected_reply()?;
            let actual = server
                .next(canary::PLAYER, &canary::request_board()?, canary::COLUMN)
                .await
                .context("canary request failed")?;
            let fields = canary::mismatches(&expected, &actual);
            if !fields.is_empty() {
                error!(?fields, actual = %serde_json::to_string(&actual)?, "canary reply differs");
                bail!("canary reply differs in {}", fields.join(", "));
            }
            println!("canary passed");
        }
    }

    Ok(())
}
