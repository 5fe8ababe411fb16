mod terminal;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    config::DEFAULT_CONFIG_FILE, load_settings, GameSessionController, HttpGameServer, Phase,
    SessionHandle, SessionSnapshot,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::watch,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::terminal::TerminalRenderer;

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser, Debug)]
struct Args {
    /// Base URL of the move server; overrides the config file.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Let the bot open the first game.
    #[arg(long)]
    ai_first: bool,
    /// Keep the same opener after every reset.
    #[arg(long)]
    no_swap: bool,
    #[arg(long)]
    no_warm: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(url) = args.server_url {
        settings.server_url = url;
    }
    if args.ai_first {
        settings.human_first = false;
    }
    if args.no_swap {
        settings.swap_on_reset = false;
    }
    if args.no_warm {
        settings.warm_on_start = false;
    }
    settings.validate()?;

    let server = HttpGameServer::from_settings(&settings)?;
    info!(endpoint = %server.endpoint(), "starting trainer");

    let (controller, handle) = GameSessionController::new(
        settings.session_options(),
        Arc::new(server),
        TerminalRenderer::default(),
    );
    let controller = controller.with_warm_up(settings.warm_on_start);
    let snapshots = controller.subscribe();
    let session = tokio::spawn(controller.run());

    read_commands(handle, snapshots).await?;
    session.await.context("session task failed")?;
    Ok(())
}

/// Forwards stdin lines to the session until `q` or end of input.
async fn read_commands(
    handle: SessionHandle,
    snapshots: watch::Receiver<SessionSnapshot>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let game_over = snapshots.borrow().phase == Phase::GameOver;
        match line {
            "q" | "quit" => break,
            "n" | "new" => {
                handle.new_game();
            }
            _ if game_over => {
                handle.click(0);
            }
            _ => {
                if let Some(rest) = line.strip_prefix('h') {
                    match rest.trim().parse::<i64>() {
                        Ok(col) => {
                            handle.hover(col - 1);
                        }
                        Err(_) => eprintln!("usage: h <column>"),
                    }
                    continue;
                }
                match line.parse::<i64>() {
                    Ok(col) => {
                        handle.click(col - 1);
                    }
                    Err(_) => eprintln!("enter a column number, n or q"),
                }
            }
        }
    }
    Ok(())
}
