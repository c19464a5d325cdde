//! # Quest2Earn Chain
//!
//! A minimal ledger around the rules engine: transactions are ordered into
//! blocks, executed one at a time, and every outcome is reported in a
//! receipt.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐   blocks    ┌─────────────────┐
//! │  Transactions   │ ──────────▶ │   GameChain     │
//! │  (JSON)         │             │   (one writer)  │
//! └─────────────────┘             └────────┬────────┘
//!                                          │
//!                                          ▼
//!                                 ┌─────────────────┐
//!                                 │ Receipts/Events │
//!                                 │ (channels)      │
//!                                 └─────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod block;
pub mod chain;
pub mod error;
pub mod state;
pub mod transaction;

pub use block::{BlockHash, BlockHeader};
pub use chain::{replay, BlockResult, ChainConfig, ChainEvent, ChainStats, GameChain};
pub use error::{ChainError, ChainResult};
pub use state::{transition, BlockContext, ChainState, MAX_BLOCK_TRANSACTIONS};
pub use transaction::{CallOutcome, ContractCall, Receipt, ReceiptError, Transaction};
