//! # Blocks
//!
//! Block headers and hashing. A block hash is SipHash-1-3 (128-bit) over
//! the parent hash, the height, the transaction count and the JSON encoding
//! of every transaction. The hash of block `h` salts the battle rolls of
//! block `h + 1`.

use std::fmt;
use std::hash::Hasher;

use quest2earn_engine::BlockSalt;
use quest2earn_shared::BlockHeight;
use serde::{Deserialize, Serialize};
use siphasher::sip128::{Hasher128, SipHasher13};

use crate::error::ChainResult;
use crate::transaction::Transaction;

/// Hash keys. Fixed so every node computes the same hashes.
const HASH_KEYS: (u64, u64) = (0x7175_6573_7432_6561, 0x726e_2d63_6861_696e);

/// 128-bit block hash.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockHash(pub [u8; 16]);

impl BlockHash {
    /// Parent of the genesis block.
    pub const ZERO: Self = Self([0u8; 16]);

    /// Battle salt for the block built on top of this one.
    #[must_use]
    pub fn salt(&self) -> BlockSalt {
        BlockSalt::from_hash(self.0)
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({self})")
    }
}

/// Header of an executed block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Height, genesis is 0.
    pub height: BlockHeight,
    /// Hash of the previous block.
    pub parent: BlockHash,
    /// Hash of this block.
    pub hash: BlockHash,
    /// Transactions in the block.
    pub tx_count: u32,
    /// Transactions that succeeded.
    pub success_count: u32,
}

/// Computes the hash of a block.
///
/// # Errors
///
/// Returns `ChainError::Codec` if a transaction cannot be encoded.
pub fn block_hash(
    parent: BlockHash,
    height: BlockHeight,
    transactions: &[Transaction],
) -> ChainResult<BlockHash> {
    let mut hasher = SipHasher13::new_with_keys(HASH_KEYS.0, HASH_KEYS.1);
    hasher.write(&parent.0);
    hasher.write_u64(height);
    hasher.write_u64(transactions.len() as u64);
    for tx in transactions {
        let bytes = serde_json::to_vec(tx)?;
        hasher.write_u64(bytes.len() as u64);
        hasher.write(&bytes);
    }
    Ok(BlockHash(hasher.finish128().as_bytes()))
}

/// Header of the genesis block.
///
/// # Errors
///
/// Never fails for an empty block; kept fallible to share [`block_hash`].
pub fn genesis_header() -> ChainResult<BlockHeader> {
    Ok(BlockHeader {
        height: 0,
        parent: BlockHash::ZERO,
        hash: block_hash(BlockHash::ZERO, 0, &[])?,
        tx_count: 0,
        success_count: 0,
    })
}
