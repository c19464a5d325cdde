//! # Chain Error Types

use quest2earn_engine::GameError;
use thiserror::Error;

/// Errors of the block executor itself.
///
/// A failing transaction is NOT a chain error: it produces a receipt with
/// an error and the block goes on.
#[derive(Error, Debug)]
pub enum ChainError {
    /// Engine could not be set up.
    #[error("engine setup failed: {0}")]
    Engine(#[from] GameError),

    /// Transactions could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Block holds more transactions than one block may carry.
    #[error("block too large: {count} transactions, limit is {limit}")]
    BlockTooLarge {
        /// Transactions submitted.
        count: usize,
        /// Per-block limit.
        limit: usize,
    },
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;
