//! # Game Engine
//!
//! Every operation of the game as a function of `(state, call context,
//! arguments)`. The engine itself holds only the immutable configuration
//! and the contract owner.
//!
//! ## Atomicity
//!
//! Each state-changing operation runs in two phases:
//!
//! 1. **Validate** - all lookups, permission checks and fallible arithmetic
//!    run against `&GameState`.
//! 2. **Apply** - writes that can no longer fail.
//!
//! A returned error therefore always means the state is untouched.

use quest2earn_shared::{BlockHeight, CharacterId, ItemId, Principal, QuestId, TokenAmount};
use serde::{Deserialize, Serialize};

use crate::battle::{
    attacker_wins, battle_damage, battle_roll, health_after, scale_bp, BattleOutcome, BlockSalt,
};
use crate::character::{validate_name, Character, CharacterClass, EquipmentSlot};
use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::events::GameEvent;
use crate::item::{Item, ItemSpec};
use crate::quest::{Quest, QuestProgress, QuestReward, QuestSpec};
use crate::state::GameState;

/// Who is calling, and when.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Account sending the call.
    pub sender: Principal,
    /// Height of the block the call executes in.
    pub block_height: BlockHeight,
    /// Salt of that block.
    #[serde(default)]
    pub salt: BlockSalt,
}

impl CallContext {
    /// Context with a zero salt.
    #[must_use]
    pub fn new(sender: Principal, block_height: BlockHeight) -> Self {
        Self {
            sender,
            block_height,
            salt: BlockSalt::default(),
        }
    }

    /// Replaces the salt.
    #[must_use]
    pub fn with_salt(mut self, salt: BlockSalt) -> Self {
        self.salt = salt;
        self
    }
}

/// The rules of the game.
#[derive(Clone, Debug)]
pub struct GameEngine {
    config: GameConfig,
    owner: Principal,
}

impl GameEngine {
    /// Creates an engine for a deployment owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidConfig` if the configuration is invalid.
    pub fn new(config: GameConfig, owner: Principal) -> GameResult<Self> {
        config.validate()?;
        Ok(Self { config, owner })
    }

    /// Balance configuration.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Contract owner.
    #[must_use]
    pub const fn owner(&self) -> &Principal {
        &self.owner
    }

    /// Fresh state with genesis balances.
    ///
    /// # Errors
    ///
    /// Returns `GameError::ArithmeticOverflow` if genesis balances overflow.
    pub fn genesis_state(&self) -> GameResult<GameState> {
        GameState::genesis(&self.config)
    }

    fn require_owner(&self, ctx: &CallContext) -> GameResult<()> {
        if ctx.sender == self.owner {
            Ok(())
        } else {
            Err(GameError::NotAuthorized)
        }
    }

    fn owned_character<'s>(
        state: &'s GameState,
        ctx: &CallContext,
        id: CharacterId,
    ) -> GameResult<&'s Character> {
        let character = state
            .character(id)
            .ok_or(GameError::CharacterNotFound(id))?;
        if character.owner != ctx.sender {
            return Err(GameError::NotCharacterOwner(id));
        }
        Ok(character)
    }

    /// Credits experience and emits one event per level gained.
    fn award_experience(&self, state: &mut GameState, id: CharacterId, amount: u64) {
        let Some(character) = state.characters.get_mut(&id) else {
            return;
        };
        let growth = self.config.archetype(character.class).growth;
        let gained = character.gain_experience(amount, &self.config.progression, &growth);
        let level = character.level;

        for l in (level - gained + 1)..=level {
            tracing::info!("Character {} reached level {}", id, l);
            state.emit(GameEvent::LevelUp {
                character_id: id,
                level: l,
            });
        }
    }

    /// Lowers current health to the effective maximum.
    fn clamp_health(state: &mut GameState, id: CharacterId) {
        let Some(character) = state.character(id) else {
            return;
        };
        let max = state.effective_stats(character).max_health;
        if let Some(character) = state.characters.get_mut(&id) {
            character.health = character.health.min(max);
        }
    }

    // ========================================================================
    // Character Registry
    // ========================================================================

    /// Creates a level-1 character owned by the caller.
    ///
    /// # Errors
    ///
    /// - `GameError::InvalidClass` for class codes outside 1..=4
    /// - `GameError::InvalidName` for empty or over-long names
    /// - `GameError::TooManyCharacters` past the per-player limit
    pub fn create_character(
        &self,
        state: &mut GameState,
        ctx: &CallContext,
        name: &str,
        class: u8,
    ) -> GameResult<CharacterId> {
        let class = CharacterClass::from_code(class)?;
        validate_name(name)?;
        let limit = self.config.limits.max_characters_per_player;
        if state.player_characters(&ctx.sender).len() >= limit as usize {
            return Err(GameError::TooManyCharacters { limit });
        }

        let id = state.next_character_id;
        let character = Character::new(
            id,
            ctx.sender.clone(),
            name.to_string(),
            class,
            self.config.archetype(class),
            ctx.block_height,
        );

        state.next_character_id += 1;
        state.characters.insert(id, character);
        state
            .player_characters
            .entry(ctx.sender.clone())
            .or_default()
            .push(id);
        state.emit(GameEvent::CharacterCreated {
            character_id: id,
            owner: ctx.sender.clone(),
            class,
        });

        tracing::debug!("Created character {} ({:?}) for {}", id, class, ctx.sender);
        Ok(id)
    }

    /// Energy of a character at block `now`.
    #[must_use]
    pub fn calculate_current_energy(
        &self,
        state: &GameState,
        id: CharacterId,
        now: BlockHeight,
    ) -> Option<u32> {
        state
            .character(id)
            .map(|c| c.current_energy(now, &self.config.energy))
    }

    /// Burns the rest cost and restores energy and health to full.
    ///
    /// # Errors
    ///
    /// - `GameError::CharacterNotFound` / `GameError::NotCharacterOwner`
    /// - `GameError::InsufficientBalance` if the caller cannot pay
    pub fn rest_character(
        &self,
        state: &mut GameState,
        ctx: &CallContext,
        id: CharacterId,
    ) -> GameResult<()> {
        let character = Self::owned_character(state, ctx, id)?;
        let max_health = state.effective_stats(character).max_health;
        let cost = self.config.rest.token_cost;

        state.ledger.burn(&ctx.sender, cost)?;
        if let Some(character) = state.characters.get_mut(&id) {
            character.rest(ctx.block_height, max_health);
        }
        if cost > 0 {
            state.emit(GameEvent::TokensBurned {
                from: ctx.sender.clone(),
                amount: cost,
            });
        }
        state.emit(GameEvent::CharacterRested {
            character_id: id,
            cost,
        });

        tracing::debug!("Character {} rested for {} tokens", id, cost);
        Ok(())
    }

    // ========================================================================
    // Quest Engine
    // ========================================================================

    /// Registers a new, active quest. Owner only.
    ///
    /// # Errors
    ///
    /// - `GameError::NotAuthorized` for any caller but the owner
    /// - `GameError::InvalidQuest` for a bad definition
    pub fn create_quest(
        &self,
        state: &mut GameState,
        ctx: &CallContext,
        spec: QuestSpec,
    ) -> GameResult<QuestId> {
        self.require_owner(ctx)?;
        spec.validate()?;

        let id = state.next_quest_id;
        let quest = Quest::from_spec(id, spec, ctx.sender.clone(), ctx.block_height);
        tracing::debug!("Created quest {} '{}'", id, quest.name);

        state.next_quest_id += 1;
        state.quests.insert(id, quest);
        state.emit(GameEvent::QuestCreated { quest_id: id });
        Ok(id)
    }

    /// Switches a quest on or off. Owner only.
    ///
    /// # Errors
    ///
    /// - `GameError::NotAuthorized` for any caller but the owner
    /// - `GameError::QuestNotFound` for an unknown quest
    pub fn set_quest_active(
        &self,
        state: &mut GameState,
        ctx: &CallContext,
        id: QuestId,
        active: bool,
    ) -> GameResult<()> {
        self.require_owner(ctx)?;
        let quest = state
            .quests
            .get_mut(&id)
            .ok_or(GameError::QuestNotFound(id))?;
        quest.is_active = active;
        state.emit(GameEvent::QuestActivityChanged {
            quest_id: id,
            active,
        });
        Ok(())
    }

    /// Whether a character may start a quest right now, ignoring energy.
    #[must_use]
    pub fn is_quest_available(
        &self,
        state: &GameState,
        character: CharacterId,
        quest: QuestId,
    ) -> bool {
        match (state.character(character), state.quest(quest)) {
            (Some(c), Some(q)) => q
                .check_eligibility(c, state.quest_progress(character, quest))
                .is_ok(),
            _ => false,
        }
    }

    /// Starts a quest, spending its energy cost.
    ///
    /// # Errors
    ///
    /// - `GameError::CharacterNotFound` / `GameError::NotCharacterOwner`
    /// - `GameError::QuestNotFound`
    /// - the eligibility errors of [`Quest::check_eligibility`]
    /// - `GameError::QuestAlreadyStarted` while a run is in progress
    /// - `GameError::InsufficientEnergy`
    pub fn start_quest(
        &self,
        state: &mut GameState,
        ctx: &CallContext,
        character_id: CharacterId,
        quest_id: QuestId,
    ) -> GameResult<()> {
        let character = Self::owned_character(state, ctx, character_id)?;
        let quest = state
            .quest(quest_id)
            .ok_or(GameError::QuestNotFound(quest_id))?;
        let progress = state.quest_progress(character_id, quest_id).copied();

        quest.check_eligibility(character, progress.as_ref())?;
        if progress.is_some_and(|p| p.in_progress()) {
            return Err(GameError::QuestAlreadyStarted(quest_id));
        }

        let cost = quest.energy_cost;
        let mut updated = character.clone();
        updated.spend_energy(cost, ctx.block_height, &self.config.energy)?;

        state.characters.insert(character_id, updated);
        state
            .quest_progress
            .entry(character_id)
            .or_default()
            .insert(
                quest_id,
                QuestProgress {
                    started_at: ctx.block_height,
                    completed_at: None,
                    completion_count: progress.map_or(0, |p| p.completion_count),
                },
            );
        state.emit(GameEvent::QuestStarted {
            character_id,
            quest_id,
        });

        tracing::debug!(
            "Character {} started quest {} at block {}",
            character_id,
            quest_id,
            ctx.block_height
        );
        Ok(())
    }

    /// Completes the running quest and pays out its rewards.
    ///
    /// # Errors
    ///
    /// - `GameError::CharacterNotFound` / `GameError::NotCharacterOwner`
    /// - `GameError::QuestNotFound`
    /// - `GameError::QuestNotStarted` if the quest was never started
    /// - `GameError::AlreadyCompleted` if the latest run is finished
    /// - `GameError::QuestNotReady` before the completion time elapsed
    /// - `GameError::ArithmeticOverflow` if the reward cannot be minted
    pub fn complete_quest(
        &self,
        state: &mut GameState,
        ctx: &CallContext,
        character_id: CharacterId,
        quest_id: QuestId,
    ) -> GameResult<QuestReward> {
        let character = Self::owned_character(state, ctx, character_id)?;
        let quest = state
            .quest(quest_id)
            .ok_or(GameError::QuestNotFound(quest_id))?;
        let progress = *state
            .quest_progress(character_id, quest_id)
            .ok_or(GameError::QuestNotStarted(quest_id))?;

        if !progress.in_progress() {
            return Err(GameError::AlreadyCompleted(quest_id));
        }
        let ready_at = quest.ready_at(progress.started_at);
        if ctx.block_height < ready_at {
            return Err(GameError::QuestNotReady { ready_at });
        }

        let reward = quest.reward_for(character.level, &self.config.quest)?;
        let owner = character.owner.clone();

        // Mint is the only fallible write and leaves the ledger untouched on error.
        state.ledger.mint(&owner, reward.tokens_gained)?;

        if let Some(character) = state.characters.get_mut(&character_id) {
            character.total_quests_completed = character.total_quests_completed.saturating_add(1);
        }
        if let Some(p) = state
            .quest_progress
            .get_mut(&character_id)
            .and_then(|m| m.get_mut(&quest_id))
        {
            p.completed_at = Some(ctx.block_height);
            p.completion_count = p.completion_count.saturating_add(1);
        }
        state.emit(GameEvent::QuestCompleted {
            character_id,
            quest_id,
            experience: reward.experience_gained,
            tokens: reward.tokens_gained,
        });
        if reward.tokens_gained > 0 {
            state.emit(GameEvent::TokensMinted {
                to: owner,
                amount: reward.tokens_gained,
            });
        }
        self.award_experience(state, character_id, reward.experience_gained);

        tracing::debug!(
            "Character {} completed quest {}: +{} xp, +{} tokens",
            character_id,
            quest_id,
            reward.experience_gained,
            reward.tokens_gained
        );
        Ok(reward)
    }

    // ========================================================================
    // Battle Resolver
    // ========================================================================

    /// Battle power of a character with its equipment.
    #[must_use]
    pub fn calculate_battle_power(&self, state: &GameState, id: CharacterId) -> Option<u32> {
        let character = state.character(id)?;
        Some(
            state
                .effective_stats(character)
                .power(self.config.battle.power_per_level),
        )
    }

    /// Resolves a battle started by the caller's character.
    ///
    /// # Errors
    ///
    /// - `GameError::SelfBattle` when both ids are equal
    /// - `GameError::CharacterNotFound` for either side
    /// - `GameError::NotCharacterOwner` when the caller does not own the attacker
    /// - `GameError::InsufficientEnergy` when the attacker is too tired
    /// - `GameError::ArithmeticOverflow` if the reward cannot be minted
    pub fn battle_character(
        &self,
        state: &mut GameState,
        ctx: &CallContext,
        attacker_id: CharacterId,
        defender_id: CharacterId,
    ) -> GameResult<BattleOutcome> {
        if attacker_id == defender_id {
            return Err(GameError::SelfBattle);
        }
        let attacker = Self::owned_character(state, ctx, attacker_id)?;
        let defender = state
            .character(defender_id)
            .ok_or(GameError::CharacterNotFound(defender_id))?;

        let battle = &self.config.battle;
        let mut tired = attacker.clone();
        tired.spend_energy(battle.energy_cost, ctx.block_height, &self.config.energy)?;

        let a_stats = state.effective_stats(attacker);
        let d_stats = state.effective_stats(defender);
        let a_power = a_stats.power(battle.power_per_level);
        let d_power = d_stats.power(battle.power_per_level);

        let roll = battle_roll(
            ctx.salt,
            attacker_id,
            defender_id,
            ctx.block_height,
            state.battle_nonce,
        );
        let attacker_won = attacker_wins(roll, a_power, d_power);

        let (winner, loser, w_stats, l_stats, w_power, l_power) = if attacker_won {
            (attacker, defender, a_stats, d_stats, a_power, d_power)
        } else {
            (defender, attacker, d_stats, a_stats, d_power, a_power)
        };
        let winner_id = winner.id;
        let loser_id = loser.id;
        let winner_owner = winner.owner.clone();

        let upset = w_power < l_power;
        let multiplier = if upset { battle.upset_bonus_bp } else { 10_000 };
        let experience_gained = scale_bp(u64::from(battle.experience_reward), multiplier)?;
        let tokens_gained = scale_bp(battle.token_reward, multiplier)?;
        let damage = battle_damage(w_stats.attack, l_stats.defense);

        state.ledger.mint(&winner_owner, tokens_gained)?;

        state.characters.insert(attacker_id, tired);
        state.battle_nonce = state.battle_nonce.wrapping_add(1);
        if let Some(c) = state.characters.get_mut(&loser_id) {
            c.health = health_after(c.health, damage);
            c.total_battles_lost = c.total_battles_lost.saturating_add(1);
        }
        if let Some(c) = state.characters.get_mut(&winner_id) {
            c.total_battles_won = c.total_battles_won.saturating_add(1);
        }
        state.emit(GameEvent::BattleResolved {
            winner: winner_id,
            loser: loser_id,
            damage,
            upset,
        });
        if tokens_gained > 0 {
            state.emit(GameEvent::TokensMinted {
                to: winner_owner,
                amount: tokens_gained,
            });
        }
        self.award_experience(state, winner_id, experience_gained);

        tracing::debug!(
            "Battle {} vs {}: power {} vs {}, winner {}{}",
            attacker_id,
            defender_id,
            a_power,
            d_power,
            winner_id,
            if upset { " (upset)" } else { "" }
        );

        Ok(BattleOutcome {
            winner: winner_id,
            loser: loser_id,
            experience_gained,
            tokens_gained,
            damage,
            upset,
        })
    }

    // ========================================================================
    // Item Registry
    // ========================================================================

    /// Mints an item to `spec.recipient`. Owner only.
    ///
    /// # Errors
    ///
    /// - `GameError::NotAuthorized` for any caller but the owner
    /// - `GameError::InvalidItem` for a bad definition
    pub fn create_item(
        &self,
        state: &mut GameState,
        ctx: &CallContext,
        spec: ItemSpec,
    ) -> GameResult<ItemId> {
        self.require_owner(ctx)?;
        spec.validate()?;

        let id = state.next_item_id;
        let item = Item::from_spec(id, spec, ctx.sender.clone(), ctx.block_height);
        let owner = item.owner.clone();
        tracing::debug!("Minted item {} '{}' to {}", id, item.name, owner);

        state.next_item_id += 1;
        state.items.insert(id, item);
        state.emit(GameEvent::ItemCreated { item_id: id, owner });
        Ok(id)
    }

    /// Puts an item into the matching slot, unequipping what was there.
    ///
    /// # Errors
    ///
    /// - `GameError::CharacterNotFound` / `GameError::NotCharacterOwner`
    /// - `GameError::ItemNotFound` / `GameError::NotItemOwner`
    /// - `GameError::LevelTooLow` below the item's required level
    /// - `GameError::NotEquippable` for consumables
    /// - `GameError::ItemAlreadyEquipped` if another character wears it
    pub fn equip_item(
        &self,
        state: &mut GameState,
        ctx: &CallContext,
        character_id: CharacterId,
        item_id: ItemId,
    ) -> GameResult<()> {
        let character = Self::owned_character(state, ctx, character_id)?;
        let item = state.item(item_id).ok_or(GameError::ItemNotFound(item_id))?;
        if item.owner != ctx.sender {
            return Err(GameError::NotItemOwner(item_id));
        }
        if character.level < item.required_level {
            return Err(GameError::LevelTooLow {
                required: item.required_level,
                actual: character.level,
            });
        }
        let slot = item
            .item_type
            .slot()
            .ok_or(GameError::NotEquippable(item_id))?;
        match item.equipped_by {
            Some(other) if other == character_id => return Ok(()),
            Some(other) => {
                return Err(GameError::ItemAlreadyEquipped {
                    item_id,
                    character_id: other,
                })
            }
            None => {}
        }

        let previous = state
            .characters
            .get_mut(&character_id)
            .and_then(|c| c.equipment.replace(slot, Some(item_id)));
        if let Some(item) = state.items.get_mut(&item_id) {
            item.equipped_by = Some(character_id);
        }
        if let Some(old) = previous {
            if let Some(item) = state.items.get_mut(&old) {
                item.equipped_by = None;
            }
            state.emit(GameEvent::ItemUnequipped {
                character_id,
                item_id: old,
                slot,
            });
        }
        Self::clamp_health(state, character_id);
        state.emit(GameEvent::ItemEquipped {
            character_id,
            item_id,
            slot,
        });

        tracing::debug!("Character {} equipped item {} as {:?}", character_id, item_id, slot);
        Ok(())
    }

    /// Clears a slot. Returns the item that was in it.
    ///
    /// # Errors
    ///
    /// `GameError::CharacterNotFound` / `GameError::NotCharacterOwner`
    pub fn unequip_item(
        &self,
        state: &mut GameState,
        ctx: &CallContext,
        character_id: CharacterId,
        slot: EquipmentSlot,
    ) -> GameResult<Option<ItemId>> {
        let character = Self::owned_character(state, ctx, character_id)?;
        let Some(item_id) = character.equipment.get(slot) else {
            return Ok(None);
        };

        if let Some(c) = state.characters.get_mut(&character_id) {
            c.equipment.replace(slot, None);
        }
        if let Some(item) = state.items.get_mut(&item_id) {
            item.equipped_by = None;
        }
        Self::clamp_health(state, character_id);
        state.emit(GameEvent::ItemUnequipped {
            character_id,
            item_id,
            slot,
        });
        Ok(Some(item_id))
    }

    /// Uses a consumable on a character: heals by its health bonus and
    /// burns it. Returns the health restored.
    ///
    /// # Errors
    ///
    /// - `GameError::CharacterNotFound` / `GameError::NotCharacterOwner`
    /// - `GameError::ItemNotFound` / `GameError::NotItemOwner`
    /// - `GameError::NotConsumable` for equipment
    /// - `GameError::LevelTooLow` below the item's required level
    pub fn use_item(
        &self,
        state: &mut GameState,
        ctx: &CallContext,
        character_id: CharacterId,
        item_id: ItemId,
    ) -> GameResult<u32> {
        let character = Self::owned_character(state, ctx, character_id)?;
        let item = state.item(item_id).ok_or(GameError::ItemNotFound(item_id))?;
        if item.owner != ctx.sender {
            return Err(GameError::NotItemOwner(item_id));
        }
        if !item.is_consumable {
            return Err(GameError::NotConsumable(item_id));
        }
        if character.level < item.required_level {
            return Err(GameError::LevelTooLow {
                required: item.required_level,
                actual: character.level,
            });
        }

        let max_health = state.effective_stats(character).max_health;
        let healed = item
            .bonus
            .health
            .min(max_health.saturating_sub(character.health));

        if let Some(c) = state.characters.get_mut(&character_id) {
            c.health += healed;
        }
        state.items.remove(&item_id);
        state.emit(GameEvent::ItemConsumed {
            character_id,
            item_id,
            healed,
        });
        Ok(healed)
    }

    /// Gives an unequipped item to another account.
    ///
    /// # Errors
    ///
    /// - `GameError::ItemNotFound` / `GameError::NotItemOwner`
    /// - `GameError::SelfTransfer` when the recipient is the caller
    /// - `GameError::ItemEquipped` while a character wears it
    pub fn transfer_item(
        &self,
        state: &mut GameState,
        ctx: &CallContext,
        item_id: ItemId,
        recipient: &Principal,
    ) -> GameResult<()> {
        let item = state.item(item_id).ok_or(GameError::ItemNotFound(item_id))?;
        if item.owner != ctx.sender {
            return Err(GameError::NotItemOwner(item_id));
        }
        if recipient == &ctx.sender {
            return Err(GameError::SelfTransfer);
        }
        if item.equipped_by.is_some() {
            return Err(GameError::ItemEquipped(item_id));
        }

        if let Some(item) = state.items.get_mut(&item_id) {
            item.owner = recipient.clone();
        }
        state.emit(GameEvent::ItemTransferred {
            item_id,
            from: ctx.sender.clone(),
            to: recipient.clone(),
        });
        Ok(())
    }

    // ========================================================================
    // Token Ledger
    // ========================================================================

    /// Moves tokens from the caller to `recipient`.
    ///
    /// # Errors
    ///
    /// `GameError::InvalidAmount`, `GameError::SelfTransfer` or
    /// `GameError::InsufficientBalance`.
    pub fn transfer_tokens(
        &self,
        state: &mut GameState,
        ctx: &CallContext,
        amount: TokenAmount,
        recipient: &Principal,
    ) -> GameResult<()> {
        state.ledger.transfer(&ctx.sender, recipient, amount)?;
        state.emit(GameEvent::TokensTransferred {
            from: ctx.sender.clone(),
            to: recipient.clone(),
            amount,
        });
        Ok(())
    }

    /// Creates tokens for `recipient`. Owner only.
    ///
    /// # Errors
    ///
    /// - `GameError::NotAuthorized` for any caller but the owner
    /// - `GameError::InvalidAmount` for zero
    /// - `GameError::ArithmeticOverflow` past `u64::MAX` supply
    pub fn mint_tokens(
        &self,
        state: &mut GameState,
        ctx: &CallContext,
        amount: TokenAmount,
        recipient: &Principal,
    ) -> GameResult<()> {
        self.require_owner(ctx)?;
        if amount == 0 {
            return Err(GameError::InvalidAmount);
        }
        state.ledger.mint(recipient, amount)?;
        state.emit(GameEvent::TokensMinted {
            to: recipient.clone(),
            amount,
        });
        Ok(())
    }
}
