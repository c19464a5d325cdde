//! # Chain State
//!
//! Game state plus the chain tip. Block execution is a plain function of
//! `(state, transactions)`; [`crate::GameChain`] only adds locking and
//! publishing on top.

use quest2earn_engine::{CallContext, GameEngine, GameState};
use quest2earn_shared::BlockHeight;
use serde::{Deserialize, Serialize};

use crate::block::{block_hash, genesis_header, BlockHash, BlockHeader};
use crate::error::{ChainError, ChainResult};
use crate::transaction::{Receipt, ReceiptError, Transaction};

/// Most transactions a single block may carry.
pub const MAX_BLOCK_TRANSACTIONS: usize = 10_000;

/// Where a transaction runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockContext {
    /// Height of the block being built.
    pub height: BlockHeight,
    /// Hash of its parent.
    pub parent: BlockHash,
}

/// Game state at a chain tip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainState {
    /// The game.
    pub game: GameState,
    /// Height of the last executed block.
    pub height: BlockHeight,
    /// Hash of the last executed block.
    pub tip: BlockHash,
}

impl ChainState {
    /// State at genesis.
    ///
    /// # Errors
    ///
    /// Returns an error if genesis balances overflow.
    pub fn genesis(engine: &GameEngine) -> ChainResult<Self> {
        Ok(Self {
            game: engine.genesis_state()?,
            height: 0,
            tip: genesis_header()?.hash,
        })
    }

    /// Context of the next block.
    #[must_use]
    pub const fn next_block(&self) -> BlockContext {
        BlockContext {
            height: self.height + 1,
            parent: self.tip,
        }
    }

    /// Runs one transaction in place and returns its receipt.
    ///
    /// A failed call leaves the state as it was.
    pub fn apply(
        &mut self,
        engine: &GameEngine,
        block: BlockContext,
        tx_index: u32,
        tx: &Transaction,
    ) -> Receipt {
        let ctx = CallContext::new(tx.sender.clone(), block.height).with_salt(block.parent.salt());
        let result = tx.apply(engine, &mut self.game, &ctx);
        let events = self.game.drain_events();

        match result {
            Ok(outcome) => Receipt {
                block_height: block.height,
                tx_index,
                sender: tx.sender.clone(),
                outcome: Some(outcome),
                error: None,
                events,
            },
            Err(err) => {
                tracing::debug!(
                    "Transaction {}:{} from {} failed: {}",
                    block.height,
                    tx_index,
                    tx.sender,
                    err
                );
                Receipt {
                    block_height: block.height,
                    tx_index,
                    sender: tx.sender.clone(),
                    outcome: None,
                    error: Some(ReceiptError::from(&err)),
                    events: Vec::new(),
                }
            }
        }
    }

    /// Executes a block on top of the current tip.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::BlockTooLarge` past [`MAX_BLOCK_TRANSACTIONS`]
    /// and `ChainError::Codec` if the block cannot be hashed; the state is
    /// unchanged in both cases.
    pub fn execute_block(
        &mut self,
        engine: &GameEngine,
        transactions: &[Transaction],
    ) -> ChainResult<(BlockHeader, Vec<Receipt>)> {
        let too_large = || ChainError::BlockTooLarge {
            count: transactions.len(),
            limit: MAX_BLOCK_TRANSACTIONS,
        };
        if transactions.len() > MAX_BLOCK_TRANSACTIONS {
            return Err(too_large());
        }
        let tx_count = u32::try_from(transactions.len()).map_err(|_| too_large())?;

        let block = self.next_block();
        let hash = block_hash(block.parent, block.height, transactions)?;

        let mut receipts = Vec::with_capacity(transactions.len());
        let mut success_count = 0u32;
        for (tx_index, tx) in (0..tx_count).zip(transactions) {
            let receipt = self.apply(engine, block, tx_index, tx);
            if receipt.is_success() {
                success_count += 1;
            }
            receipts.push(receipt);
        }

        let header = BlockHeader {
            height: block.height,
            parent: block.parent,
            hash,
            tx_count,
            success_count,
        };
        self.height = block.height;
        self.tip = hash;

        tracing::info!(
            "Block {} executed: {}/{} transactions succeeded, hash {}",
            header.height,
            success_count,
            header.tx_count,
            hash
        );
        Ok((header, receipts))
    }
}

/// Pure single-transaction transition.
///
/// Returns the next state and the receipt without touching `state`.
#[must_use]
pub fn transition(
    engine: &GameEngine,
    state: &ChainState,
    block: BlockContext,
    tx_index: u32,
    tx: &Transaction,
) -> (ChainState, Receipt) {
    let mut next = state.clone();
    let receipt = next.apply(engine, block, tx_index, tx);
    (next, receipt)
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

    fn player() -> Principal {
        "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG".parse().unwrap()
    }

    fn engine() -> GameEngine {
        GameEngine::new(GameConfig::default(), owner()).unwrap()
    }

    #[test]
    fn test_transition_leaves_input_untouched() {
        let engine = engine();
        let state = ChainState::genesis(&engine).unwrap();
        let tx = Transaction::new(
            player(),
            ContractCall::CreateCharacter {
                name: "Hero".to_string(),
                class: 2,
            },
        );

        let (next, receipt) = transition(&engine, &state, state.next_block(), 0, &tx);
        assert!(receipt.is_success());
        assert_eq!(receipt.block_height, 1);
        assert_eq!(receipt.events.len(), 1);
        assert!(state.game.character(1).is_none());
        assert!(next.game.character(1).is_some());
    }

    #[test]
    fn test_failed_transition_is_identity() {
        let engine = engine();
        let state = ChainState::genesis(&engine).unwrap();
        let tx = Transaction::new(
            player(),
            ContractCall::MintTokens {
                amount: 10,
                recipient: player(),
            },
        );

        let (next, receipt) = transition(&engine, &state, state.next_block(), 0, &tx);
        assert_eq!(next, state);
        let error = receipt.error.unwrap();
        assert_eq!(error.name, "ERR-NOT-AUTHORIZED");
        assert!(receipt.events.is_empty());
    }

    #[test]
    fn test_execute_block_advances_tip() {
        let engine = engine();
        let mut state = ChainState::genesis(&engine).unwrap();
        let genesis_tip = state.tip;

        let txs = vec![
            Transaction::new(
                player(),
                ContractCall::CreateCharacter {
                    name: "Hero".to_string(),
                    class: 1,
                },
            ),
            Transaction::new(
                player(),
                ContractCall::CreateCharacter {
                    name: "Bad".to_string(),
                    class: 9,
                },
            ),
        ];
        let (header, receipts) = state.execute_block(&engine, &txs).unwrap();

        assert_eq!(header.height, 1);
        assert_eq!(header.parent, genesis_tip);
        assert_eq!(header.tx_count, 2);
        assert_eq!(header.success_count, 1);
        assert_eq!(state.height, 1);
        assert_eq!(state.tip, header.hash);
        assert_eq!(receipts[1].error.as_ref().unwrap().name, "ERR-INVALID-CLASS");
        assert_eq!(receipts[1].tx_index, 1);
    }

    #[test]
    fn test_oversized_block_is_rejected() {
        let engine = engine();
        let mut state = ChainState::genesis(&engine).unwrap();
        let tx = Transaction::new(
            player(),
            ContractCall::TransferTokens {
                amount: 0,
                recipient: owner(),
            },
        );
        let txs = vec![tx; MAX_BLOCK_TRANSACTIONS + 1];

        let err = state.execute_block(&engine, &txs).unwrap_err();
        assert!(matches!(
            err,
            ChainError::BlockTooLarge { count, limit }
                if count == MAX_BLOCK_TRANSACTIONS + 1 && limit == MAX_BLOCK_TRANSACTIONS
        ));
        assert_eq!(state.height, 0);

        let (header, receipts) = state
            .execute_block(&engine, &txs[..MAX_BLOCK_TRANSACTIONS])
            .unwrap();
        assert_eq!(header.tx_count as usize, MAX_BLOCK_TRANSACTIONS);
        assert_eq!(header.success_count, 0);
        assert_eq!(receipts.last().unwrap().tx_index as usize, MAX_BLOCK_TRANSACTIONS - 1);
    }
}
