mod config;
mod host;
mod services;
mod session;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::config::SessionConfig;
use crate::services::storage::{MemoryBlobStore, MemoryNoteStore};
use crate::session::Session;

const HOST_EVENT_QUEUE_CAPACITY: usize = 256;

#[derive(Parser, Debug)]
#[command(name = "tabletop", about = "Shared tabletop session host: reads host events as JSON lines on stdin")]
struct Cli {
    /// Player views to open at startup.
    #[arg(long, env = "PLAYERS", default_value_t = 1)]
    players: usize,

    /// Master tick period in milliseconds (overrides TICK_MS).
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Player view limit (overrides MAX_PLAYERS).
    #[arg(long)]
    max_players: Option<usize>,

    /// Fog raster side in world units (overrides FOG_EXTENT).
    #[arg(long)]
    fog_extent: Option<u32>,
}

impl Cli {
    fn apply(&self, mut config: SessionConfig) -> SessionConfig {
        if let Some(tick_ms) = self.tick_ms {
            config.tick_ms = tick_ms.max(1);
        }
        if let Some(max_players) = self.max_players {
            config.max_players = max_players;
        }
        if let Some(fog_extent) = self.fog_extent {
            config.fog_extent = fog_extent.max(1);
        }
        config
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("ignoring unreadable .env: {e}");
        }
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = cli.apply(SessionConfig::from_env());
    tracing::info!(?config, "tabletop session starting");

    let mut session = Session::new(config, Arc::new(MemoryBlobStore::new()), Arc::new(MemoryNoteStore::new()));
    for _ in 0..cli.players {
        if let Err(e) = session.open_player() {
            tracing::warn!(error = %e, "startup player view not opened");
            break;
        }
    }

    tracing::info!(players = session.player_count(), "reading host events from stdin");

    let (tx, rx) = mpsc::channel(HOST_EVENT_QUEUE_CAPACITY);
    let master = services::master::spawn_master_loop(session, rx);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match host::parse_line(&line) {
                Ok(Some(event)) => {
                    if tx.send(event).await.is_err() {
                        tracing::warn!("master loop gone; stopping input");
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "skipping host line"),
            },
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        }
    }
    drop(tx);

    match master.await {
        Ok(session) => {
            session.shutdown().await;
        }
        Err(e) => tracing::error!(error = %e, "master loop panicked"),
    }
}
