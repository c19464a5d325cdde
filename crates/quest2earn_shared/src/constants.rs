//! # Contract Constants
//!
//! Values baked into the contract surface.
//!
//! **CRITICAL:** Changing any of these changes which transactions are valid.
//! Balance numbers (rewards, costs, archetypes) live in the engine config,
//! not here.

/// Name the rules engine is deployed under.
pub const CONTRACT_NAME: &str = "quest2earn";

/// Default deployer account.
///
/// The deployer is the only account allowed to create quests and items and
/// to mint tokens. Nodes may override it on startup.
pub const DEFAULT_CONTRACT_OWNER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

/// Maximum length of a character name (ASCII characters).
pub const MAX_NAME_LENGTH: usize = 32;

/// Maximum length of a quest or item name.
pub const MAX_TITLE_LENGTH: usize = 64;

/// Maximum length of a quest description.
pub const MAX_DESCRIPTION_LENGTH: usize = 256;

/// Maximum length of a principal string.
pub const MAX_PRINCIPAL_LENGTH: usize = 128;
