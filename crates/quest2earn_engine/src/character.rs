//! # Character Registry
//!
//! Character records, class archetypes, energy regeneration and the level
//! curve. This module is the leaf of the engine: it knows nothing about
//! quests, items or tokens.
//!
//! ## Energy
//!
//! Energy is stored lazily. A character keeps `energy` as of
//! `last_energy_update`; the current value is derived on read:
//!
//! ```text
//! current = min(max_energy, energy + floor(elapsed / interval) * amount)
//! ```
//!
//! Spending settles the accrued amount first and keeps the partial
//! interval, so splitting a wait into several reads never loses energy.

use quest2earn_shared::{BlockHeight, CharacterId, ItemId, Principal, MAX_NAME_LENGTH};
use serde::{Deserialize, Serialize};

use crate::config::{Archetype, EnergyConfig, ProgressionConfig, StatBlock};
use crate::error::{GameError, GameResult};

/// The four playable classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum CharacterClass {
    /// Heavy melee, highest health.
    Warrior = 1,
    /// Spellcaster, largest energy pool.
    Mage = 2,
    /// Ranged, high agility.
    Ranger = 3,
    /// Fast melee, highest agility.
    Rogue = 4,
}

impl CharacterClass {
    /// All classes in code order.
    pub const ALL: [Self; 4] = [Self::Warrior, Self::Mage, Self::Ranger, Self::Rogue];

    /// Converts a contract class code.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidClass` for codes outside 1..=4.
    pub const fn from_code(code: u8) -> GameResult<Self> {
        match code {
            1 => Ok(Self::Warrior),
            2 => Ok(Self::Mage),
            3 => Ok(Self::Ranger),
            4 => Ok(Self::Rogue),
            other => Err(GameError::InvalidClass(other)),
        }
    }

    /// Returns the contract class code.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Config key of the class (`classes.<key>`).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Warrior => "warrior",
            Self::Mage => "mage",
            Self::Ranger => "ranger",
            Self::Rogue => "rogue",
        }
    }
}

impl TryFrom<u8> for CharacterClass {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_code(value)
    }
}

impl From<CharacterClass> for u8 {
    fn from(value: CharacterClass) -> Self {
        value.code()
    }
}

/// Equipment slot of a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    /// Weapon slot.
    Weapon,
    /// Armor slot.
    Armor,
    /// Accessory slot.
    Accessory,
}

/// Items currently worn by a character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    /// Equipped weapon.
    pub weapon: Option<ItemId>,
    /// Equipped armor.
    pub armor: Option<ItemId>,
    /// Equipped accessory.
    pub accessory: Option<ItemId>,
}

impl Equipment {
    /// Returns the item in a slot.
    #[inline]
    #[must_use]
    pub const fn get(&self, slot: EquipmentSlot) -> Option<ItemId> {
        match slot {
            EquipmentSlot::Weapon => self.weapon,
            EquipmentSlot::Armor => self.armor,
            EquipmentSlot::Accessory => self.accessory,
        }
    }

    /// Replaces the item in a slot, returning the previous one.
    pub fn replace(&mut self, slot: EquipmentSlot, item: Option<ItemId>) -> Option<ItemId> {
        let target = match slot {
            EquipmentSlot::Weapon => &mut self.weapon,
            EquipmentSlot::Armor => &mut self.armor,
            EquipmentSlot::Accessory => &mut self.accessory,
        };
        std::mem::replace(target, item)
    }

    /// Iterates over equipped item ids.
    pub fn items(&self) -> impl Iterator<Item = ItemId> {
        [self.weapon, self.armor, self.accessory].into_iter().flatten()
    }
}

/// A player character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Unique identifier.
    pub id: CharacterId,
    /// Owning account.
    pub owner: Principal,
    /// Display name.
    pub name: String,
    /// Class.
    pub class: CharacterClass,
    /// Level, starting at 1.
    pub level: u32,
    /// Cumulative experience.
    pub experience: u64,
    /// Current health.
    pub health: u32,
    /// Base maximum health (without item bonuses).
    pub max_health: u32,
    /// Energy as of `last_energy_update`.
    pub energy: u32,
    /// Maximum energy.
    pub max_energy: u32,
    /// Base attack.
    pub attack: u32,
    /// Base defense.
    pub defense: u32,
    /// Base magic.
    pub magic: u32,
    /// Base agility.
    pub agility: u32,
    /// Block at which `energy` was last settled.
    pub last_energy_update: BlockHeight,
    /// Equipped items.
    pub equipment: Equipment,
    /// Quest completions.
    pub total_quests_completed: u32,
    /// Battles won.
    pub total_battles_won: u32,
    /// Battles lost.
    pub total_battles_lost: u32,
    /// Block of creation.
    pub creation_time: BlockHeight,
}

impl Character {
    /// Creates a level-1 character from its archetype.
    ///
    /// Health and energy start full.
    #[must_use]
    pub fn new(
        id: CharacterId,
        owner: Principal,
        name: String,
        class: CharacterClass,
        archetype: &Archetype,
        now: BlockHeight,
    ) -> Self {
        let base = archetype.base;
        Self {
            id,
            owner,
            name,
            class,
            level: 1,
            experience: 0,
            health: base.max_health,
            max_health: base.max_health,
            energy: base.max_energy,
            max_energy: base.max_energy,
            attack: base.attack,
            defense: base.defense,
            magic: base.magic,
            agility: base.agility,
            last_energy_update: now,
            equipment: Equipment::default(),
            total_quests_completed: 0,
            total_battles_won: 0,
            total_battles_lost: 0,
            creation_time: now,
        }
    }

    /// Regenerated energy and the block to anchor further regeneration at.
    fn regenerated(&self, now: BlockHeight, config: &EnergyConfig) -> (u32, BlockHeight) {
        if self.energy >= self.max_energy {
            return (self.max_energy, now.max(self.last_energy_update));
        }

        let interval = config.regen_interval_blocks.max(1);
        let steps = now.saturating_sub(self.last_energy_update) / interval;
        let gained = steps.saturating_mul(u64::from(config.regen_amount));
        let total = u64::from(self.energy).saturating_add(gained);

        if total >= u64::from(self.max_energy) {
            (self.max_energy, now)
        } else {
            // total < max_energy, so it fits in u32
            (total as u32, self.last_energy_update + steps * interval)
        }
    }

    /// Energy available at block `now`.
    #[must_use]
    pub fn current_energy(&self, now: BlockHeight, config: &EnergyConfig) -> u32 {
        self.regenerated(now, config).0
    }

    /// Folds regenerated energy into the stored value.
    pub fn settle_energy(&mut self, now: BlockHeight, config: &EnergyConfig) {
        let (energy, anchor) = self.regenerated(now, config);
        self.energy = energy;
        self.last_energy_update = anchor;
    }

    /// Spends energy at block `now`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InsufficientEnergy` without touching the
    /// character if the current energy is below `amount`.
    pub fn spend_energy(
        &mut self,
        amount: u32,
        now: BlockHeight,
        config: &EnergyConfig,
    ) -> GameResult<()> {
        let available = self.current_energy(now, config);
        if available < amount {
            return Err(GameError::InsufficientEnergy {
                required: amount,
                available,
            });
        }
        self.settle_energy(now, config);
        self.energy -= amount;
        Ok(())
    }

    /// Restores energy to full and health to `effective_max_health`.
    pub fn rest(&mut self, now: BlockHeight, effective_max_health: u32) {
        self.energy = self.max_energy;
        self.last_energy_update = now;
        self.health = effective_max_health;
    }

    /// Total experience needed to reach `level`.
    #[must_use]
    pub fn experience_for_level(level: u32, progression: &ProgressionConfig) -> u64 {
        let l = u64::from(level.saturating_sub(1));
        progression
            .experience_per_level
            .saturating_mul(l.saturating_mul(l + 1) / 2)
    }

    /// Experience still missing for the next level, `None` at the cap.
    #[must_use]
    pub fn experience_to_next_level(&self, progression: &ProgressionConfig) -> Option<u64> {
        if self.level >= progression.max_level {
            return None;
        }
        let next = Self::experience_for_level(self.level + 1, progression);
        Some(next.saturating_sub(self.experience))
    }

    /// Adds experience and applies every level-up it unlocks.
    ///
    /// Returns the number of levels gained.
    pub fn gain_experience(
        &mut self,
        amount: u64,
        progression: &ProgressionConfig,
        growth: &StatBlock,
    ) -> u32 {
        self.experience = self.experience.saturating_add(amount);

        let mut gained = 0;
        while self.level < progression.max_level
            && self.experience >= Self::experience_for_level(self.level + 1, progression)
        {
            self.level += 1;
            self.max_health = self.max_health.saturating_add(growth.max_health);
            self.health = self.health.saturating_add(growth.max_health);
            self.max_energy = self.max_energy.saturating_add(growth.max_energy);
            self.energy = self.energy.saturating_add(growth.max_energy);
            self.attack = self.attack.saturating_add(growth.attack);
            self.defense = self.defense.saturating_add(growth.defense);
            self.magic = self.magic.saturating_add(growth.magic);
            self.agility = self.agility.saturating_add(growth.agility);
            gained += 1;
        }
        gained
    }
}

/// Validates a character name.
///
/// # Errors
///
/// Returns `GameError::InvalidName` for empty, over-long, non-ASCII or
/// control-character names.
pub fn validate_name(name: &str) -> GameResult<()> {
    if name.trim().is_empty() {
        return Err(GameError::InvalidName("name is empty".to_string()));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(GameError::InvalidName(format!(
            "name longer than {MAX_NAME_LENGTH} characters"
        )));
    }
    if !name.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
        return Err(GameError::InvalidName("name must be printable ASCII".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn owner() -> Principal {
        Principal::new("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM").unwrap()
    }

    fn warrior(now: BlockHeight) -> Character {
        let config = GameConfig::default();
        Character::new(
            1,
            owner(),
            "TestHero".to_string(),
            CharacterClass::Warrior,
            config.archetype(CharacterClass::Warrior),
            now,
        )
    }

    #[test]
    fn test_class_codes() {
        for code in 1..=4u8 {
            assert_eq!(CharacterClass::from_code(code).unwrap().code(), code);
        }
        assert_eq!(CharacterClass::from_code(0), Err(GameError::InvalidClass(0)));
        assert_eq!(CharacterClass::from_code(5), Err(GameError::InvalidClass(5)));
    }

    #[test]
    fn test_warrior_archetype() {
        let hero = warrior(100);
        assert_eq!(hero.level, 1);
        assert_eq!(hero.health, 120);
        assert_eq!(hero.max_health, 120);
        assert_eq!(hero.energy, 80);
        assert_eq!(hero.attack, 15);
        assert_eq!(hero.defense, 12);
        assert_eq!(hero.magic, 5);
        assert_eq!(hero.agility, 8);
        assert_eq!(hero.last_energy_update, 100);
        assert_eq!(hero.creation_time, 100);
        assert_eq!(hero.equipment, Equipment::default());
    }

    #[test]
    fn test_energy_regenerates_and_caps() {
        let energy = EnergyConfig {
            regen_interval_blocks: 2,
            regen_amount: 3,
        };
        let mut hero = warrior(100);
        hero.spend_energy(30, 100, &energy).unwrap();
        assert_eq!(hero.current_energy(100, &energy), 50);
        assert_eq!(hero.current_energy(101, &energy), 50);
        assert_eq!(hero.current_energy(102, &energy), 53);
        assert_eq!(hero.current_energy(120, &energy), 80);
        assert_eq!(hero.current_energy(10_000, &energy), 80);
    }

    #[test]
    fn test_settle_keeps_partial_interval() {
        let energy = EnergyConfig {
            regen_interval_blocks: 4,
            regen_amount: 1,
        };
        let mut hero = warrior(0);
        hero.spend_energy(10, 0, &energy).unwrap();

        // Settle at block 6: one full step, two blocks carried over.
        hero.settle_energy(6, &energy);
        assert_eq!(hero.energy, 71);
        assert_eq!(hero.last_energy_update, 4);
        assert_eq!(hero.current_energy(8, &energy), 72);
    }

    #[test]
    fn test_spend_insufficient_leaves_character_untouched() {
        let energy = EnergyConfig::default();
        let mut hero = warrior(0);
        hero.spend_energy(75, 0, &energy).unwrap();
        let before = hero.clone();

        let err = hero.spend_energy(20, 3, &energy).unwrap_err();
        assert_eq!(
            err,
            GameError::InsufficientEnergy {
                required: 20,
                available: 8
            }
        );
        assert_eq!(hero, before);
    }

    #[test]
    fn test_level_curve() {
        let progression = ProgressionConfig::default();
        assert_eq!(Character::experience_for_level(1, &progression), 0);
        assert_eq!(Character::experience_for_level(2, &progression), 100);
        assert_eq!(Character::experience_for_level(3, &progression), 300);
        assert_eq!(Character::experience_for_level(4, &progression), 600);
    }

    #[test]
    fn test_gain_experience_levels_up_with_growth() {
        let config = GameConfig::default();
        let growth = config.archetype(CharacterClass::Warrior).growth;
        let mut hero = warrior(0);

        assert_eq!(hero.gain_experience(55, &config.progression, &growth), 0);
        assert_eq!(hero.experience_to_next_level(&config.progression), Some(45));

        assert_eq!(hero.gain_experience(250, &config.progression, &growth), 2);
        assert_eq!(hero.level, 3);
        assert_eq!(hero.max_health, 120 + 2 * growth.max_health);
        assert_eq!(hero.health, hero.max_health);
        assert_eq!(hero.attack, 15 + 2 * growth.attack);
    }

    #[test]
    fn test_level_cap() {
        let mut progression = ProgressionConfig::default();
        progression.max_level = 2;
        let growth = StatBlock::default();
        let mut hero = warrior(0);

        hero.gain_experience(1_000_000, &progression, &growth);
        assert_eq!(hero.level, 2);
        assert_eq!(hero.experience_to_next_level(&progression), None);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Hero").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
        assert!(validate_name("Hér0").is_err());
    }

    #[test]
    fn test_equipment_replace() {
        let mut eq = Equipment::default();
        assert_eq!(eq.replace(EquipmentSlot::Weapon, Some(1)), None);
        assert_eq!(eq.replace(EquipmentSlot::Weapon, Some(2)), Some(1));
        assert_eq!(eq.get(EquipmentSlot::Weapon), Some(2));
        assert_eq!(eq.items().collect::<Vec<_>>(), vec![2]);
    }
}
