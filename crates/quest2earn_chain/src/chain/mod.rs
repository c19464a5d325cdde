//! # Game Chain
//!
//! The running ledger: one lock around the state, blocks executed one at
//! a time, receipts and events published to subscribers after commit.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ submit_block │ ──▶ │  ChainState  │ ──▶ │   Channels   │ ──▶ Clients
//! │  (writer)    │     │  (RwLock)    │     │  (Bounded)   │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::RwLock;
use quest2earn_engine::{GameEngine, GameEvent, GameState};
use quest2earn_shared::BlockHeight;

use crate::block::{genesis_header, BlockHash, BlockHeader};
use crate::error::ChainResult;
use crate::state::ChainState;
use crate::transaction::{Receipt, Transaction};

/// Configuration for the chain.
#[derive(Clone, Debug)]
pub struct ChainConfig {
    /// Buffer size of the receipt and event channels.
    pub channel_buffer: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 1024,
        }
    }
}

/// Counters of the chain.
#[derive(Debug, Default)]
pub struct ChainStats {
    /// Blocks executed.
    pub blocks: AtomicU64,
    /// Transactions executed.
    pub transactions: AtomicU64,
    /// Transactions that failed.
    pub failed_transactions: AtomicU64,
    /// Receipts or events dropped because a channel was full.
    pub dropped_notifications: AtomicU64,
}

/// A game event tagged with where it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainEvent {
    /// Block height.
    pub block_height: BlockHeight,
    /// Transaction index.
    pub tx_index: u32,
    /// The event.
    pub event: GameEvent,
}

/// Result of [`GameChain::submit_block`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockResult {
    /// Header of the new block.
    pub header: BlockHeader,
    /// One receipt per transaction, in order.
    pub receipts: Vec<Receipt>,
}

/// The running ledger.
pub struct GameChain {
    engine: GameEngine,
    state: RwLock<ChainState>,
    headers: RwLock<Vec<BlockHeader>>,
    receipt_sender: Sender<Receipt>,
    receipt_receiver: Receiver<Receipt>,
    event_sender: Sender<ChainEvent>,
    event_receiver: Receiver<ChainEvent>,
    stats: Arc<ChainStats>,
}

impl GameChain {
    /// Starts a chain at genesis.
    ///
    /// # Errors
    ///
    /// Returns an error if the genesis state cannot be built.
    pub fn new(engine: GameEngine, config: &ChainConfig) -> ChainResult<Self> {
        let state = ChainState::genesis(&engine)?;
        let (receipt_sender, receipt_receiver) = bounded(config.channel_buffer);
        let (event_sender, event_receiver) = bounded(config.channel_buffer);

        tracing::info!(
            "Chain started at genesis {} (owner {}, supply {})",
            state.tip,
            engine.owner(),
            state.game.total_supply()
        );

        Ok(Self {
            engine,
            state: RwLock::new(state),
            headers: RwLock::new(vec![genesis_header()?]),
            receipt_sender,
            receipt_receiver,
            event_sender,
            event_receiver,
            stats: Arc::new(ChainStats::default()),
        })
    }

    /// The rules engine.
    #[must_use]
    pub const fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// Receiver of every receipt, in execution order.
    #[must_use]
    pub fn receipts(&self) -> Receiver<Receipt> {
        self.receipt_receiver.clone()
    }

    /// Receiver of every event, in execution order.
    #[must_use]
    pub fn events(&self) -> Receiver<ChainEvent> {
        self.event_receiver.clone()
    }

    /// Counters.
    #[must_use]
    pub fn stats(&self) -> Arc<ChainStats> {
        Arc::clone(&self.stats)
    }

    /// Height of the tip.
    #[must_use]
    pub fn height(&self) -> BlockHeight {
        self.state.read().height
    }

    /// Hash of the tip.
    #[must_use]
    pub fn tip(&self) -> BlockHash {
        self.state.read().tip
    }

    /// Headers from genesis to tip.
    #[must_use]
    pub fn headers(&self) -> Vec<BlockHeader> {
        self.headers.read().clone()
    }

    /// Runs a read-only query against the current game state.
    pub fn read<R>(&self, query: impl FnOnce(&GameState) -> R) -> R {
        query(&self.state.read().game)
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ChainState {
        self.state.read().clone()
    }

    /// Executes a block and publishes its receipts and events.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::Codec` if the block cannot be hashed. Failing
    /// transactions are not errors; they show up in the receipts.
    pub fn submit_block(&self, transactions: &[Transaction]) -> ChainResult<BlockResult> {
        let (header, receipts) = {
            let mut state = self.state.write();
            let result = state.execute_block(&self.engine, transactions)?;
            self.headers.write().push(result.0);
            result
        };

        let failed = receipts.iter().filter(|r| !r.is_success()).count() as u64;
        self.stats.blocks.fetch_add(1, Ordering::Relaxed);
        self.stats
            .transactions
            .fetch_add(receipts.len() as u64, Ordering::Relaxed);
        self.stats
            .failed_transactions
            .fetch_add(failed, Ordering::Relaxed);

        self.publish(&receipts);
        Ok(BlockResult { header, receipts })
    }

    fn publish(&self, receipts: &[Receipt]) {
        let mut dropped = 0u64;
        for receipt in receipts {
            for event in &receipt.events {
                let event = ChainEvent {
                    block_height: receipt.block_height,
                    tx_index: receipt.tx_index,
                    event: event.clone(),
                };
                if self.event_sender.try_send(event).is_err() {
                    dropped += 1;
                }
            }
            if self.receipt_sender.try_send(receipt.clone()).is_err() {
                dropped += 1;
            }
        }
        if dropped > 0 {
            tracing::warn!("Dropped {} notifications: subscriber channel full", dropped);
            self.stats
                .dropped_notifications
                .fetch_add(dropped, Ordering::Relaxed);
        }
    }
}

/// Replays blocks from genesis on a fresh state.
///
/// # Errors
///
/// Returns the first chain error.
pub fn replay(
    engine: &GameEngine,
    blocks: &[Vec<Transaction>],
) -> ChainResult<(ChainState, Vec<BlockResult>)> {
    let mut state = ChainState::genesis(engine)?;
    let mut results = Vec::with_capacity(blocks.len());
    for transactions in blocks {
        let (header, receipts) = state.execute_block(engine, transactions)?;
        results.push(BlockResult { header, receipts });
    }
    Ok((state, results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::ContractCall;
    use quest2earn_engine::GameConfig;
    use quest2earn_shared::Principal;

    fn owner() -> Principal {
        "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM".parse().unwrap()
    }

    fn chain(buffer: usize) -> GameChain {
        let engine = GameEngine::new(GameConfig::default(), owner()).unwrap();
        GameChain::new(
            engine,
            &ChainConfig {
                channel_buffer: buffer,
            },
        )
        .unwrap()
    }

    fn create(name: &str) -> Transaction {
        Transaction::new(
            owner(),
            ContractCall::CreateCharacter {
                name: name.to_string(),
                class: 4,
            },
        )
    }

    #[test]
    fn test_chain_creation() {
        let chain = chain(16);
        assert_eq!(chain.height(), 0);
        assert_eq!(chain.headers().len(), 1);
        assert_eq!(chain.tip(), chain.headers()[0].hash);
    }

    #[test]
    fn test_receipts_are_published() {
        let chain = chain(16);
        let receipts = chain.receipts();
        let events = chain.events();

        let result = chain.submit_block(&[create("A"), create("B")]).unwrap();
        assert_eq!(result.header.height, 1);
        assert_eq!(chain.height(), 1);
        assert_eq!(chain.read(GameState::character_count), 2);

        let first = receipts.try_recv().unwrap();
        assert_eq!(first.tx_index, 0);
        assert_eq!(receipts.try_recv().unwrap().tx_index, 1);
        assert!(receipts.try_recv().is_err());

        let event = events.try_recv().unwrap();
        assert_eq!(event.block_height, 1);
        assert!(matches!(event.event, GameEvent::CharacterCreated { character_id: 1, .. }));
    }

    #[test]
    fn test_full_channel_counts_drops() {
        let chain = chain(1);
        chain.submit_block(&[create("A"), create("B")]).unwrap();
        let stats = chain.stats();
        assert!(stats.dropped_notifications.load(Ordering::Relaxed) > 0);
        assert_eq!(stats.transactions.load(Ordering::Relaxed), 2);
        assert_eq!(chain.read(GameState::character_count), 2);
    }
}
