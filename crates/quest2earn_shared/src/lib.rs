//! # Quest2Earn Shared
//!
//! Common types used by the engine, the chain executor and the node.
//!
//! ## CRITICAL RULE
//!
//! This crate must stay free of game rules. It only names things:
//! - who is acting (`Principal`)
//! - what is being acted on (`CharacterId`, `QuestId`, `ItemId`)
//! - when it happens (`BlockHeight`)

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod principal;

pub use constants::{
    CONTRACT_NAME, DEFAULT_CONTRACT_OWNER, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH,
    MAX_PRINCIPAL_LENGTH, MAX_TITLE_LENGTH,
};
pub use principal::{Principal, PrincipalError};

/// Identifier of a character. Assigned sequentially from 1.
pub type CharacterId = u64;

/// Identifier of a quest definition. Assigned sequentially from 1.
pub type QuestId = u64;

/// Identifier of an item. Assigned sequentially from 1.
pub type ItemId = u64;

/// Block height. Every timestamp in the game is a block height.
pub type BlockHeight = u64;

/// Amount of the game token, in whole units.
pub type TokenAmount = u64;
