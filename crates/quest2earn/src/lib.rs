//! # Quest2Earn
//!
//! The main crate, tying the rules engine and the ledger together.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │ quest2earn_     │     │ quest2earn_     │     │ quest2earn_     │
//! │ shared          │────>│ engine          │────>│ chain           │
//! │ • Principal     │     │ • Characters    │     │ • Blocks        │
//! │ • Constants     │     │ • Quests        │     │ • Receipts      │
//! │                 │     │ • Battles       │     │ • Subscriptions │
//! │                 │     │ • Items, Tokens │     │                 │
//! └─────────────────┘     └─────────────────┘     └────────┬────────┘
//!                                                          │
//!                                                          ▼
//!                                                 ┌─────────────────┐
//!                                                 │ quest2earn_node │
//!                                                 └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `node`: script loading and block-by-block execution

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod node;

// Re-export the layers
pub use quest2earn_chain as chain;
pub use quest2earn_engine as engine;
pub use quest2earn_shared as shared;

pub use node::{load_config, load_script, parse_script, run_script, RunSummary};
