//! # Item Registry
//!
//! Minted equipment and consumables. Every item has exactly one owning
//! account and is worn by at most one character at a time.

use quest2earn_shared::{BlockHeight, CharacterId, ItemId, Principal, MAX_TITLE_LENGTH};
use serde::{Deserialize, Serialize};

use crate::character::EquipmentSlot;
use crate::error::{GameError, GameResult};

/// Item category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ItemType {
    /// Goes into the weapon slot.
    Weapon = 1,
    /// Goes into the armor slot.
    Armor = 2,
    /// Goes into the accessory slot.
    Accessory = 3,
    /// Used once, never equipped.
    Consumable = 4,
}

impl ItemType {
    /// Slot the item occupies when equipped. `None` for consumables.
    #[must_use]
    pub const fn slot(self) -> Option<EquipmentSlot> {
        match self {
            Self::Weapon => Some(EquipmentSlot::Weapon),
            Self::Armor => Some(EquipmentSlot::Armor),
            Self::Accessory => Some(EquipmentSlot::Accessory),
            Self::Consumable => None,
        }
    }
}

impl TryFrom<u8> for ItemType {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Weapon),
            2 => Ok(Self::Armor),
            3 => Ok(Self::Accessory),
            4 => Ok(Self::Consumable),
            other => Err(GameError::InvalidItem(format!("unknown item type {other}"))),
        }
    }
}

impl From<ItemType> for u8 {
    fn from(value: ItemType) -> Self {
        value as u8
    }
}

/// Item rarity tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Rarity {
    /// Tier 1.
    Common = 1,
    /// Tier 2.
    Uncommon = 2,
    /// Tier 3.
    Rare = 3,
    /// Tier 4.
    Epic = 4,
    /// Tier 5.
    Legendary = 5,
}

impl TryFrom<u8> for Rarity {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Common),
            2 => Ok(Self::Uncommon),
            3 => Ok(Self::Rare),
            4 => Ok(Self::Epic),
            5 => Ok(Self::Legendary),
            other => Err(GameError::InvalidItem(format!("unknown rarity {other}"))),
        }
    }
}

impl From<Rarity> for u8 {
    fn from(value: Rarity) -> Self {
        value as u8
    }
}

/// Stat bonuses granted by an item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBonus {
    /// Attack bonus.
    pub attack: u32,
    /// Defense bonus.
    pub defense: u32,
    /// Magic bonus.
    pub magic: u32,
    /// Agility bonus.
    pub agility: u32,
    /// Max health bonus, or healing for consumables.
    pub health: u32,
}

impl StatBonus {
    /// Field-wise saturating sum.
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        Self {
            attack: self.attack.saturating_add(other.attack),
            defense: self.defense.saturating_add(other.defense),
            magic: self.magic.saturating_add(other.magic),
            agility: self.agility.saturating_add(other.agility),
            health: self.health.saturating_add(other.health),
        }
    }
}

/// Parameters of a new item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    /// Display name.
    pub name: String,
    /// Category.
    pub item_type: ItemType,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Bonuses.
    #[serde(default)]
    pub bonus: StatBonus,
    /// Minimum level to equip.
    pub required_level: u32,
    /// Must equal `item_type == Consumable`.
    pub is_consumable: bool,
    /// Account that receives the item.
    pub recipient: Principal,
}

impl ItemSpec {
    /// Validates the definition.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidItem` describing the first bad field.
    pub fn validate(&self) -> GameResult<()> {
        if self.name.trim().is_empty() {
            return Err(GameError::InvalidItem("name is empty".to_string()));
        }
        if self.name.len() > MAX_TITLE_LENGTH {
            return Err(GameError::InvalidItem(format!(
                "name longer than {MAX_TITLE_LENGTH} characters"
            )));
        }
        if self.required_level == 0 {
            return Err(GameError::InvalidItem(
                "required level must be at least 1".to_string(),
            ));
        }
        if self.is_consumable != (self.item_type == ItemType::Consumable) {
            return Err(GameError::InvalidItem(
                "is_consumable must match the consumable item type".to_string(),
            ));
        }
        Ok(())
    }
}

/// A minted item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Category.
    pub item_type: ItemType,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Bonuses.
    pub bonus: StatBonus,
    /// Minimum level to equip.
    pub required_level: u32,
    /// Whether the item is used up on use.
    pub is_consumable: bool,
    /// Account that minted the item.
    pub creator: Principal,
    /// Current owner.
    pub owner: Principal,
    /// Character wearing the item.
    pub equipped_by: Option<CharacterId>,
    /// Block of minting.
    pub creation_time: BlockHeight,
}

impl Item {
    /// Builds an item from a validated spec.
    #[must_use]
    pub fn from_spec(id: ItemId, spec: ItemSpec, creator: Principal, now: BlockHeight) -> Self {
        Self {
            id,
            name: spec.name,
            item_type: spec.item_type,
            rarity: spec.rarity,
            bonus: spec.bonus,
            required_level: spec.required_level,
            is_consumable: spec.is_consumable,
            creator,
            owner: spec.recipient,
            equipped_by: None,
            creation_time: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(item_type: ItemType, is_consumable: bool) -> ItemSpec {
        ItemSpec {
            name: "Iron Sword".to_string(),
            item_type,
            rarity: Rarity::Common,
            bonus: StatBonus {
                attack: 5,
                ..StatBonus::default()
            },
            required_level: 1,
            is_consumable,
            recipient: Principal::new("ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG").unwrap(),
        }
    }

    #[test]
    fn test_codes() {
        assert_eq!(ItemType::try_from(3).unwrap(), ItemType::Accessory);
        assert!(ItemType::try_from(0).is_err());
        assert!(ItemType::try_from(5).is_err());
        assert_eq!(Rarity::try_from(5).unwrap(), Rarity::Legendary);
        assert!(Rarity::try_from(6).is_err());
    }

    #[test]
    fn test_slots() {
        assert_eq!(ItemType::Weapon.slot(), Some(EquipmentSlot::Weapon));
        assert_eq!(ItemType::Consumable.slot(), None);
    }

    #[test]
    fn test_consumable_consistency() {
        assert!(spec(ItemType::Weapon, false).validate().is_ok());
        assert!(spec(ItemType::Consumable, true).validate().is_ok());
        assert!(spec(ItemType::Weapon, true).validate().is_err());
        assert!(spec(ItemType::Consumable, false).validate().is_err());
    }

    #[test]
    fn test_rejects_bad_rarity_in_json() {
        let json = r#"{
            "name": "Ring",
            "item_type": 3,
            "rarity": 9,
            "required_level": 1,
            "is_consumable": false,
            "recipient": "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG"
        }"#;
        assert!(serde_json::from_str::<ItemSpec>(json).is_err());
    }

    #[test]
    fn test_combine() {
        let a = StatBonus { attack: 3, health: 10, ..StatBonus::default() };
        let b = StatBonus { attack: 2, defense: 4, ..StatBonus::default() };
        let c = a.combine(b);
        assert_eq!(c.attack, 5);
        assert_eq!(c.defense, 4);
        assert_eq!(c.health, 10);
    }
}
