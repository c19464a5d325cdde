//! # Node Runner
//!
//! Loads a configuration and a block script, feeds the blocks to a
//! [`GameChain`] and writes every receipt as one JSON line.
//!
//! A script is a JSON array of blocks, each block an array of
//! transactions. An empty block just advances the height.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use quest2earn_chain::{GameChain, Transaction};
use quest2earn_engine::GameConfig;
use quest2earn_shared::{BlockHeight, TokenAmount};
use serde::Serialize;

/// Final state of a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Height of the tip.
    pub height: BlockHeight,
    /// Hash of the tip, hex.
    pub tip: String,
    /// Transactions executed.
    pub transactions: u64,
    /// Transactions that failed.
    pub failed: u64,
    /// Characters in the game.
    pub characters: usize,
    /// Quests registered.
    pub quests: usize,
    /// Items in existence.
    pub items: usize,
    /// Token supply.
    pub total_supply: TokenAmount,
}

/// Loads a configuration file, or the defaults when `path` is `None`.
///
/// # Errors
///
/// Fails if the file cannot be read or is invalid.
pub fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(GameConfig::default()),
    }
}

/// Parses a block script.
///
/// # Errors
///
/// Fails on malformed JSON or an unknown call.
pub fn parse_script(text: &str) -> Result<Vec<Vec<Transaction>>> {
    serde_json::from_str(text).context("parsing block script")
}

/// Loads a block script from a file.
///
/// # Errors
///
/// Fails if the file cannot be read or parsed.
pub fn load_script(path: &Path) -> Result<Vec<Vec<Transaction>>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    parse_script(&text)
}

/// Executes `blocks` on `chain`, writing receipts to `out` as JSON lines.
///
/// Receipts come straight from each executed block, so the output is
/// complete whatever the size of the chain's subscription channels. Events
/// are read from the event subscription and logged at debug level.
///
/// # Errors
///
/// Fails on a chain error or if `out` cannot be written.
pub fn run_script(
    chain: &GameChain,
    blocks: &[Vec<Transaction>],
    out: &mut impl Write,
) -> Result<RunSummary> {
    let events = chain.events();
    let mut transactions = 0u64;
    let mut failed = 0u64;

    for block in blocks {
        let result = chain
            .submit_block(block)
            .with_context(|| format!("executing block {}", chain.height() + 1))?;
        tracing::debug!("Block {} hash {}", result.header.height, result.header.hash);

        for receipt in &result.receipts {
            transactions += 1;
            if !receipt.is_success() {
                failed += 1;
            }
            serde_json::to_writer(&mut *out, receipt)?;
            writeln!(out)?;
        }
        for event in events.try_iter() {
            tracing::debug!(
                "Event {}:{} {:?}",
                event.block_height,
                event.tx_index,
                event.event
            );
        }
    }

    let height = chain.height();
    let tip = chain.tip().to_string();
    let summary = chain.read(|state| RunSummary {
        height,
        tip,
        transactions,
        failed,
        characters: state.character_count(),
        quests: state.quests().count(),
        items: state.item_count(),
        total_supply: state.total_supply(),
    });
    Ok(summary)
}
