//! # Game Error Types
//!
//! All errors that can occur in a state-changing operation.
//!
//! Every variant carries a stable numeric code so receipts stay comparable
//! across versions. Lookups of missing entities are NOT errors: read
//! operations return `Option`.

use quest2earn_shared::{CharacterId, ItemId, QuestId};
use thiserror::Error;

/// Errors that can occur in the rules engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Character class outside {1, 2, 3, 4}.
    #[error("invalid character class: {0}")]
    InvalidClass(u8),

    /// Character name empty or too long.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Owner already has the maximum number of characters.
    #[error("too many characters: limit is {limit}")]
    TooManyCharacters {
        /// Configured limit.
        limit: u32,
    },

    /// Character does not exist.
    #[error("character not found: {0}")]
    CharacterNotFound(CharacterId),

    /// Quest does not exist.
    #[error("quest not found: {0}")]
    QuestNotFound(QuestId),

    /// Item does not exist.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// Caller does not own the character.
    #[error("caller does not own character {0}")]
    NotCharacterOwner(CharacterId),

    /// Caller does not own the item.
    #[error("caller does not own item {0}")]
    NotItemOwner(ItemId),

    /// Caller is not the contract owner.
    #[error("caller is not authorized")]
    NotAuthorized,

    /// Not enough energy for the action.
    #[error("insufficient energy: need {required}, have {available}")]
    InsufficientEnergy {
        /// Energy required.
        required: u32,
        /// Energy available after regeneration.
        available: u32,
    },

    /// Not enough tokens for the action.
    #[error("insufficient balance: need {required}, have {available}")]
    InsufficientBalance {
        /// Tokens required.
        required: u64,
        /// Tokens available.
        available: u64,
    },

    /// Token amount must be positive.
    #[error("amount must be greater than zero")]
    InvalidAmount,

    /// Sender and recipient are the same account.
    #[error("cannot transfer to self")]
    SelfTransfer,

    /// Character level below a requirement.
    #[error("level too low: need {required}, have {actual}")]
    LevelTooLow {
        /// Level required.
        required: u32,
        /// Character level.
        actual: u32,
    },

    /// Quest restricted to another class.
    #[error("quest requires a different class")]
    ClassMismatch,

    /// Quest is not active.
    #[error("quest {0} is not active")]
    QuestInactive(QuestId),

    /// Character has used up all completions of the quest.
    #[error("maximum completions reached for quest {0}")]
    MaxCompletionsReached(QuestId),

    /// Quest is already in progress for this character.
    #[error("quest {0} already started")]
    QuestAlreadyStarted(QuestId),

    /// Quest was never started by this character.
    #[error("quest {0} not started")]
    QuestNotStarted(QuestId),

    /// The latest run of the quest is already completed.
    #[error("quest {0} already completed")]
    AlreadyCompleted(QuestId),

    /// Completion time has not elapsed yet.
    #[error("quest not ready: completable at block {ready_at}")]
    QuestNotReady {
        /// First block at which completion is allowed.
        ready_at: u64,
    },

    /// A character cannot battle itself.
    #[error("character cannot battle itself")]
    SelfBattle,

    /// Consumables cannot be equipped.
    #[error("item {0} cannot be equipped")]
    NotEquippable(ItemId),

    /// Item is equipped by another character.
    #[error("item {item_id} already equipped by character {character_id}")]
    ItemAlreadyEquipped {
        /// The item.
        item_id: ItemId,
        /// The character wearing it.
        character_id: CharacterId,
    },

    /// Item is equipped and cannot be moved or burned.
    #[error("item {0} is equipped")]
    ItemEquipped(ItemId),

    /// Item is not a consumable.
    #[error("item {0} is not consumable")]
    NotConsumable(ItemId),

    /// Quest definition failed validation.
    #[error("invalid quest: {0}")]
    InvalidQuest(String),

    /// Item definition failed validation.
    #[error("invalid item: {0}")]
    InvalidItem(String),

    /// Arithmetic overflow in a balance or stat calculation.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GameError {
    /// Stable numeric error code.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::NotAuthorized => 100,
            Self::CharacterNotFound(_) => 101,
            Self::QuestNotFound(_) => 102,
            Self::ItemNotFound(_) => 103,
            Self::NotCharacterOwner(_) => 104,
            Self::NotItemOwner(_) => 105,
            Self::InvalidClass(_) => 110,
            Self::InvalidName(_) => 111,
            Self::TooManyCharacters { .. } => 112,
            Self::InsufficientEnergy { .. } => 120,
            Self::InsufficientBalance { .. } => 121,
            Self::InvalidAmount => 122,
            Self::SelfTransfer => 123,
            Self::LevelTooLow { .. } => 130,
            Self::ClassMismatch => 131,
            Self::QuestInactive(_) => 132,
            Self::MaxCompletionsReached(_) => 133,
            Self::QuestAlreadyStarted(_) => 134,
            Self::QuestNotStarted(_) => 135,
            Self::AlreadyCompleted(_) => 136,
            Self::QuestNotReady { .. } => 137,
            Self::SelfBattle => 140,
            Self::NotEquippable(_) => 150,
            Self::ItemAlreadyEquipped { .. } => 151,
            Self::ItemEquipped(_) => 152,
            Self::NotConsumable(_) => 153,
            Self::InvalidQuest(_) => 160,
            Self::InvalidItem(_) => 161,
            Self::ArithmeticOverflow => 170,
            Self::InvalidConfig(_) => 171,
        }
    }

    /// Contract-style error name, e.g. `ERR-INVALID-CLASS`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NotAuthorized => "ERR-NOT-AUTHORIZED",
            Self::CharacterNotFound(_) => "ERR-CHARACTER-NOT-FOUND",
            Self::QuestNotFound(_) => "ERR-QUEST-NOT-FOUND",
            Self::ItemNotFound(_) => "ERR-ITEM-NOT-FOUND",
            Self::NotCharacterOwner(_) => "ERR-NOT-CHARACTER-OWNER",
            Self::NotItemOwner(_) => "ERR-NOT-ITEM-OWNER",
            Self::InvalidClass(_) => "ERR-INVALID-CLASS",
            Self::InvalidName(_) => "ERR-INVALID-NAME",
            Self::TooManyCharacters { .. } => "ERR-TOO-MANY-CHARACTERS",
            Self::InsufficientEnergy { .. } => "ERR-INSUFFICIENT-ENERGY",
            Self::InsufficientBalance { .. } => "ERR-INSUFFICIENT-BALANCE",
            Self::InvalidAmount => "ERR-INVALID-AMOUNT",
            Self::SelfTransfer => "ERR-SELF-TRANSFER",
            Self::LevelTooLow { .. } => "ERR-LEVEL-TOO-LOW",
            Self::ClassMismatch => "ERR-CLASS-MISMATCH",
            Self::QuestInactive(_) => "ERR-QUEST-INACTIVE",
            Self::MaxCompletionsReached(_) => "ERR-MAX-COMPLETIONS",
            Self::QuestAlreadyStarted(_) => "ERR-QUEST-ALREADY-STARTED",
            Self::QuestNotStarted(_) => "ERR-QUEST-NOT-STARTED",
            Self::AlreadyCompleted(_) => "ERR-ALREADY-COMPLETED",
            Self::QuestNotReady { .. } => "ERR-QUEST-NOT-READY",
            Self::SelfBattle => "ERR-SELF-BATTLE",
            Self::NotEquippable(_) => "ERR-NOT-EQUIPPABLE",
            Self::ItemAlreadyEquipped { .. } => "ERR-ITEM-ALREADY-EQUIPPED",
            Self::ItemEquipped(_) => "ERR-ITEM-EQUIPPED",
            Self::NotConsumable(_) => "ERR-NOT-CONSUMABLE",
            Self::InvalidQuest(_) => "ERR-INVALID-QUEST",
            Self::InvalidItem(_) => "ERR-INVALID-ITEM",
            Self::ArithmeticOverflow => "ERR-OVERFLOW",
            Self::InvalidConfig(_) => "ERR-INVALID-CONFIG",
        }
    }
}

/// Result type for engine operations.
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let all = [
            GameError::InvalidClass(5),
            GameError::InvalidName(String::new()),
            GameError::TooManyCharacters { limit: 1 },
            GameError::CharacterNotFound(1),
            GameError::QuestNotFound(1),
            GameError::ItemNotFound(1),
            GameError::NotCharacterOwner(1),
            GameError::NotItemOwner(1),
            GameError::NotAuthorized,
            GameError::InsufficientEnergy { required: 1, available: 0 },
            GameError::InsufficientBalance { required: 1, available: 0 },
            GameError::InvalidAmount,
            GameError::SelfTransfer,
            GameError::LevelTooLow { required: 2, actual: 1 },
            GameError::ClassMismatch,
            GameError::QuestInactive(1),
            GameError::MaxCompletionsReached(1),
            GameError::QuestAlreadyStarted(1),
            GameError::QuestNotStarted(1),
            GameError::AlreadyCompleted(1),
            GameError::QuestNotReady { ready_at: 10 },
            GameError::SelfBattle,
            GameError::NotEquippable(1),
            GameError::ItemAlreadyEquipped { item_id: 1, character_id: 2 },
            GameError::ItemEquipped(1),
            GameError::NotConsumable(1),
            GameError::InvalidQuest(String::new()),
            GameError::InvalidItem(String::new()),
            GameError::ArithmeticOverflow,
            GameError::InvalidConfig(String::new()),
        ];

        let mut codes: Vec<u32> = all.iter().map(GameError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_display_mentions_values() {
        let err = GameError::InsufficientBalance { required: 150, available: 100 };
        assert_eq!(err.to_string(), "insufficient balance: need 150, have 100");
        assert_eq!(err.name(), "ERR-INSUFFICIENT-BALANCE");
    }
}
