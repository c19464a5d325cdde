//! # Game Events
//!
//! Everything a successful operation changed, in the order it happened.
//! Operations push events into the state's buffer; the block executor
//! drains them into the receipt of the transaction.

use quest2earn_shared::{CharacterId, ItemId, Principal, QuestId, TokenAmount};
use serde::{Deserialize, Serialize};

use crate::character::{CharacterClass, EquipmentSlot};

/// A state change worth telling clients about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// A character was created.
    CharacterCreated {
        /// New character.
        character_id: CharacterId,
        /// Owner.
        owner: Principal,
        /// Class.
        class: CharacterClass,
    },
    /// A character reached a new level.
    LevelUp {
        /// The character.
        character_id: CharacterId,
        /// New level.
        level: u32,
    },
    /// A character rested.
    CharacterRested {
        /// The character.
        character_id: CharacterId,
        /// Tokens burned.
        cost: TokenAmount,
    },
    /// A quest was registered.
    QuestCreated {
        /// New quest.
        quest_id: QuestId,
    },
    /// A quest was switched on or off.
    QuestActivityChanged {
        /// The quest.
        quest_id: QuestId,
        /// New flag.
        active: bool,
    },
    /// A character started a quest.
    QuestStarted {
        /// The character.
        character_id: CharacterId,
        /// The quest.
        quest_id: QuestId,
    },
    /// A character completed a quest.
    QuestCompleted {
        /// The character.
        character_id: CharacterId,
        /// The quest.
        quest_id: QuestId,
        /// Experience gained.
        experience: u64,
        /// Tokens minted.
        tokens: TokenAmount,
    },
    /// A battle was resolved.
    BattleResolved {
        /// Winner.
        winner: CharacterId,
        /// Loser.
        loser: CharacterId,
        /// Health the loser lost.
        damage: u32,
        /// Weaker side won.
        upset: bool,
    },
    /// An item was minted.
    ItemCreated {
        /// New item.
        item_id: ItemId,
        /// Receiving account.
        owner: Principal,
    },
    /// An item was put into a slot.
    ItemEquipped {
        /// The character.
        character_id: CharacterId,
        /// The item.
        item_id: ItemId,
        /// The slot.
        slot: EquipmentSlot,
    },
    /// A slot was cleared.
    ItemUnequipped {
        /// The character.
        character_id: CharacterId,
        /// The item.
        item_id: ItemId,
        /// The slot.
        slot: EquipmentSlot,
    },
    /// A consumable was used up.
    ItemConsumed {
        /// The character.
        character_id: CharacterId,
        /// The item.
        item_id: ItemId,
        /// Health restored.
        healed: u32,
    },
    /// An item changed owner.
    ItemTransferred {
        /// The item.
        item_id: ItemId,
        /// Previous owner.
        from: Principal,
        /// New owner.
        to: Principal,
    },
    /// Tokens moved between accounts.
    TokensTransferred {
        /// Sender.
        from: Principal,
        /// Recipient.
        to: Principal,
        /// Amount.
        amount: TokenAmount,
    },
    /// Tokens were created.
    TokensMinted {
        /// Recipient.
        to: Principal,
        /// Amount.
        amount: TokenAmount,
    },
    /// Tokens were destroyed.
    TokensBurned {
        /// Holder.
        from: Principal,
        /// Amount.
        amount: TokenAmount,
    },
}
