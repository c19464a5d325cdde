//! # Game State
//!
//! The complete state of one deployment: every registry, the ledger, the id
//! counters and the event buffer. Operations in [`crate::engine`] take it by
//! `&mut`; the block executor clones it for value-semantics transitions.

use std::collections::BTreeMap;

use quest2earn_shared::{CharacterId, ItemId, Principal, QuestId, TokenAmount};
use serde::{Deserialize, Serialize};

use crate::battle::EffectiveStats;
use crate::character::Character;
use crate::config::GameConfig;
use crate::error::GameResult;
use crate::events::GameEvent;
use crate::item::{Item, StatBonus};
use crate::ledger::TokenLedger;
use crate::quest::{Quest, QuestProgress};

/// Mutable state of the game.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) characters: BTreeMap<CharacterId, Character>,
    pub(crate) player_characters: BTreeMap<Principal, Vec<CharacterId>>,
    pub(crate) quests: BTreeMap<QuestId, Quest>,
    pub(crate) quest_progress: BTreeMap<CharacterId, BTreeMap<QuestId, QuestProgress>>,
    pub(crate) items: BTreeMap<ItemId, Item>,
    pub(crate) ledger: TokenLedger,
    pub(crate) next_character_id: CharacterId,
    pub(crate) next_quest_id: QuestId,
    pub(crate) next_item_id: ItemId,
    /// Battles resolved so far; mixed into every roll.
    pub(crate) battle_nonce: u64,
    #[serde(skip)]
    pub(crate) event_buffer: Vec<GameEvent>,
}

impl GameState {
    /// Creates the state at deployment, crediting genesis balances.
    ///
    /// # Errors
    ///
    /// Returns `GameError::ArithmeticOverflow` if genesis balances overflow
    /// the supply.
    pub fn genesis(config: &GameConfig) -> GameResult<Self> {
        Ok(Self {
            ledger: TokenLedger::from_genesis(&config.genesis.balances)?,
            next_character_id: 1,
            next_quest_id: 1,
            next_item_id: 1,
            ..Self::default()
        })
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Looks up a character.
    #[must_use]
    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(&id)
    }

    /// Characters of an owner in creation order.
    #[must_use]
    pub fn player_characters(&self, owner: &Principal) -> &[CharacterId] {
        self.player_characters
            .get(owner)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of characters.
    #[must_use]
    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    /// Looks up a quest.
    #[must_use]
    pub fn quest(&self, id: QuestId) -> Option<&Quest> {
        self.quests.get(&id)
    }

    /// Quests in id order.
    pub fn quests(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values()
    }

    /// Progress of a character on a quest.
    #[must_use]
    pub fn quest_progress(&self, character: CharacterId, quest: QuestId) -> Option<&QuestProgress> {
        self.quest_progress.get(&character)?.get(&quest)
    }

    /// Looks up an item.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Number of items in existence.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Items owned by an account, in id order.
    #[must_use]
    pub fn player_items(&self, owner: &Principal) -> Vec<ItemId> {
        self.items
            .values()
            .filter(|item| &item.owner == owner)
            .map(|item| item.id)
            .collect()
    }

    /// Token balance, zero for unknown accounts.
    #[must_use]
    pub fn balance_of(&self, account: &Principal) -> TokenAmount {
        self.ledger.balance_of(account)
    }

    /// Total token supply.
    #[must_use]
    pub const fn total_supply(&self) -> TokenAmount {
        self.ledger.total_supply()
    }

    /// The token ledger.
    #[must_use]
    pub const fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    /// Battles resolved so far.
    #[must_use]
    pub const fn battle_nonce(&self) -> u64 {
        self.battle_nonce
    }

    /// Sum of bonuses of everything `character` wears.
    #[must_use]
    pub fn equipment_bonus(&self, character: &Character) -> StatBonus {
        character
            .equipment
            .items()
            .filter_map(|id| self.items.get(&id))
            .fold(StatBonus::default(), |acc, item| acc.combine(item.bonus))
    }

    /// Stats of `character` with equipment applied.
    #[must_use]
    pub fn effective_stats(&self, character: &Character) -> EffectiveStats {
        EffectiveStats::of(character, self.equipment_bonus(character))
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.event_buffer.push(event);
    }

    /// Events emitted since the last drain.
    #[must_use]
    pub fn pending_events(&self) -> &[GameEvent] {
        &self.event_buffer
    }

    /// Takes all buffered events.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.event_buffer)
    }
}
