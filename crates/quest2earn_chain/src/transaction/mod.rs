//! # Transactions and Receipts
//!
//! Wire format of the ledger. Transactions are JSON objects tagged by
//! `call`:
//!
//! ```json
//! { "sender": "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG",
//!   "call": "create_character", "name": "TestHero", "class": 1 }
//! ```

use quest2earn_engine::battle::BattleOutcome;
use quest2earn_engine::{
    CallContext, EquipmentSlot, GameEngine, GameError, GameEvent, GameResult, GameState, ItemSpec,
    QuestReward, QuestSpec,
};
use quest2earn_shared::{BlockHeight, CharacterId, ItemId, Principal, QuestId, TokenAmount};
use serde::{Deserialize, Serialize};

/// A state-changing call of the game contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum ContractCall {
    /// Create a character.
    CreateCharacter {
        /// Display name.
        name: String,
        /// Class code 1..=4.
        class: u8,
    },
    /// Rest a character.
    RestCharacter {
        /// The character.
        character_id: CharacterId,
    },
    /// Register a quest.
    CreateQuest {
        /// Definition.
        quest: QuestSpec,
    },
    /// Switch a quest on or off.
    SetQuestActive {
        /// The quest.
        quest_id: QuestId,
        /// New flag.
        active: bool,
    },
    /// Start a quest.
    StartQuest {
        /// The character.
        character_id: CharacterId,
        /// The quest.
        quest_id: QuestId,
    },
    /// Complete a quest.
    CompleteQuest {
        /// The character.
        character_id: CharacterId,
        /// The quest.
        quest_id: QuestId,
    },
    /// Fight another character.
    BattleCharacter {
        /// Caller's character.
        attacker_id: CharacterId,
        /// Opponent.
        defender_id: CharacterId,
    },
    /// Mint an item.
    CreateItem {
        /// Definition.
        item: ItemSpec,
    },
    /// Equip an item.
    EquipItem {
        /// The character.
        character_id: CharacterId,
        /// The item.
        item_id: ItemId,
    },
    /// Clear an equipment slot.
    UnequipItem {
        /// The character.
        character_id: CharacterId,
        /// The slot.
        slot: EquipmentSlot,
    },
    /// Use a consumable.
    UseItem {
        /// The character.
        character_id: CharacterId,
        /// The item.
        item_id: ItemId,
    },
    /// Give an item away.
    TransferItem {
        /// The item.
        item_id: ItemId,
        /// New owner.
        recipient: Principal,
    },
    /// Send tokens.
    TransferTokens {
        /// Amount.
        amount: TokenAmount,
        /// Recipient.
        recipient: Principal,
    },
    /// Create tokens.
    MintTokens {
        /// Amount.
        amount: TokenAmount,
        /// Recipient.
        recipient: Principal,
    },
}

/// A signed-by-assumption call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Calling account.
    pub sender: Principal,
    /// The call.
    #[serde(flatten)]
    pub call: ContractCall,
}

impl Transaction {
    /// Creates a transaction.
    #[must_use]
    pub fn new(sender: Principal, call: ContractCall) -> Self {
        Self { sender, call }
    }

    /// Runs the call against `state`.
    ///
    /// # Errors
    ///
    /// Returns the engine error; `state` is unchanged in that case.
    pub fn apply(
        &self,
        engine: &GameEngine,
        state: &mut GameState,
        ctx: &CallContext,
    ) -> GameResult<CallOutcome> {
        match &self.call {
            ContractCall::CreateCharacter { name, class } => engine
                .create_character(state, ctx, name, *class)
                .map(|character_id| CallOutcome::CharacterCreated { character_id }),
            ContractCall::RestCharacter { character_id } => engine
                .rest_character(state, ctx, *character_id)
                .map(|()| CallOutcome::Done),
            ContractCall::CreateQuest { quest } => engine
                .create_quest(state, ctx, quest.clone())
                .map(|quest_id| CallOutcome::QuestCreated { quest_id }),
            ContractCall::SetQuestActive { quest_id, active } => engine
                .set_quest_active(state, ctx, *quest_id, *active)
                .map(|()| CallOutcome::Done),
            ContractCall::StartQuest {
                character_id,
                quest_id,
            } => engine
                .start_quest(state, ctx, *character_id, *quest_id)
                .map(|()| CallOutcome::Done),
            ContractCall::CompleteQuest {
                character_id,
                quest_id,
            } => engine
                .complete_quest(state, ctx, *character_id, *quest_id)
                .map(CallOutcome::QuestCompleted),
            ContractCall::BattleCharacter {
                attacker_id,
                defender_id,
            } => engine
                .battle_character(state, ctx, *attacker_id, *defender_id)
                .map(CallOutcome::Battle),
            ContractCall::CreateItem { item } => engine
                .create_item(state, ctx, item.clone())
                .map(|item_id| CallOutcome::ItemCreated { item_id }),
            ContractCall::EquipItem {
                character_id,
                item_id,
            } => engine
                .equip_item(state, ctx, *character_id, *item_id)
                .map(|()| CallOutcome::Done),
            ContractCall::UnequipItem { character_id, slot } => engine
                .unequip_item(state, ctx, *character_id, *slot)
                .map(|item_id| CallOutcome::Unequipped { item_id }),
            ContractCall::UseItem {
                character_id,
                item_id,
            } => engine
                .use_item(state, ctx, *character_id, *item_id)
                .map(|healed| CallOutcome::ItemUsed { healed }),
            ContractCall::TransferItem { item_id, recipient } => engine
                .transfer_item(state, ctx, *item_id, recipient)
                .map(|()| CallOutcome::Done),
            ContractCall::TransferTokens { amount, recipient } => engine
                .transfer_tokens(state, ctx, *amount, recipient)
                .map(|()| CallOutcome::Done),
            ContractCall::MintTokens { amount, recipient } => engine
                .mint_tokens(state, ctx, *amount, recipient)
                .map(|()| CallOutcome::Done),
        }
    }
}

/// Return value of a successful call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallOutcome {
    /// Call returned nothing.
    Done,
    /// New character id.
    CharacterCreated {
        /// The id.
        character_id: CharacterId,
    },
    /// New quest id.
    QuestCreated {
        /// The id.
        quest_id: QuestId,
    },
    /// New item id.
    ItemCreated {
        /// The id.
        item_id: ItemId,
    },
    /// Quest rewards.
    QuestCompleted(QuestReward),
    /// Battle result.
    Battle(BattleOutcome),
    /// Item removed from a slot, if any.
    Unequipped {
        /// The item.
        item_id: Option<ItemId>,
    },
    /// Health restored by a consumable.
    ItemUsed {
        /// Amount healed.
        healed: u32,
    },
}

/// Error part of a failed receipt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptError {
    /// Stable numeric code.
    pub code: u32,
    /// `ERR-*` name.
    pub name: String,
    /// Human-readable message.
    pub message: String,
}

impl From<&GameError> for ReceiptError {
    fn from(err: &GameError) -> Self {
        Self {
            code: err.code(),
            name: err.name().to_string(),
            message: err.to_string(),
        }
    }
}

/// Result of one transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Block the transaction ran in.
    pub block_height: BlockHeight,
    /// Position inside the block.
    pub tx_index: u32,
    /// Calling account.
    pub sender: Principal,
    /// Return value on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CallOutcome>,
    /// Error on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ReceiptError>,
    /// Events emitted, empty on failure.
    #[serde(default)]
    pub events: Vec<GameEvent>,
}

impl Receipt {
    /// True if the call succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_json() {
        let json = r#"{
            "sender": "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG",
            "call": "create_character",
            "name": "TestHero",
            "class": 1
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.sender.as_str(), "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG");
        assert_eq!(
            tx.call,
            ContractCall::CreateCharacter {
                name: "TestHero".to_string(),
                class: 1
            }
        );
    }

    #[test]
    fn test_nested_specs_and_slots() {
        let json = r#"{
            "sender": "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM",
            "call": "unequip_item",
            "character_id": 3,
            "slot": "armor"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(
            tx.call,
            ContractCall::UnequipItem {
                character_id: 3,
                slot: EquipmentSlot::Armor
            }
        );
    }

    #[test]
    fn test_unknown_call_rejected() {
        let json = r#"{
            "sender": "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM",
            "call": "delete_everything"
        }"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }

    #[test]
    fn test_receipt_error_fields() {
        let err = GameError::InsufficientBalance {
            required: 150,
            available: 100,
        };
        let receipt_error = ReceiptError::from(&err);
        assert_eq!(receipt_error.code, 121);
        assert_eq!(receipt_error.name, "ERR-INSUFFICIENT-BALANCE");
        assert_eq!(receipt_error.message, "insufficient balance: need 150, have 100");
    }
}
