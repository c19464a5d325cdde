//! # Quest2Earn Node
//!
//! Headless node: executes a block script against a fresh chain and
//! prints one JSON receipt per line, followed by a summary line.
//!
//! ```bash
//! quest2earn_node --script data/scenario.json --config data/game.toml
//! RUST_LOG=debug quest2earn_node --script data/scenario.json
//! ```
//!
//! Logs go to stderr so stdout stays machine readable.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use quest2earn::chain::{ChainConfig, GameChain};
use quest2earn::engine::GameEngine;
use quest2earn::shared::{Principal, DEFAULT_CONTRACT_OWNER};
use quest2earn::{load_config, load_script, run_script};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Per-transaction headroom in the receipt and event channels.
const CHANNEL_SLOTS_PER_TX: usize = 16;

#[derive(Parser)]
#[command(version, about = "Quest2Earn node - executes a block script")]
struct Cli {
    /// Block script (JSON array of blocks)
    #[arg(long)]
    script: PathBuf,

    /// Game configuration (TOML); defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Contract owner principal
    #[arg(long, default_value = DEFAULT_CONTRACT_OWNER)]
    owner: String,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let owner: Principal = cli
        .owner
        .parse()
        .with_context(|| format!("invalid owner principal {}", cli.owner))?;
    let blocks = load_script(&cli.script)?;

    tracing::info!(
        "Quest2Earn node v{} | owner {} | {} blocks",
        env!("CARGO_PKG_VERSION"),
        owner,
        blocks.len()
    );

    // Nothing drains the receipt subscription here, so it holds the whole
    // run; events are drained once per block.
    let total: usize = blocks.iter().map(Vec::len).sum();
    let largest = blocks.iter().map(Vec::len).max().unwrap_or(0);
    let chain_config = ChainConfig {
        channel_buffer: total
            .max(largest.saturating_mul(CHANNEL_SLOTS_PER_TX))
            .max(ChainConfig::default().channel_buffer),
    };
    let engine = GameEngine::new(config, owner)?;
    let chain = GameChain::new(engine, &chain_config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = run_script(&chain, &blocks, &mut out)?;
    serde_json::to_writer(&mut out, &serde_json::json!({ "summary": summary }))?;
    writeln!(out)?;

    let stats = chain.stats();
    tracing::info!(
        "Done at height {} | {} txs, {} failed | supply {}",
        summary.height,
        summary.transactions,
        summary.failed,
        summary.total_supply
    );
    let dropped = stats
        .dropped_notifications
        .load(std::sync::atomic::Ordering::Relaxed);
    if dropped > 0 {
        tracing::warn!("{} notifications dropped", dropped);
    }
    Ok(())
}
