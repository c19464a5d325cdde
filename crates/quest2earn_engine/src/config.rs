//! # Balance Configuration
//!
//! Every tunable number in the game: archetypes, regeneration, costs and
//! reward curves. Loaded once at deployment from a TOML file; every section
//! and field has a default, so an empty file is a valid configuration.
//!
//! ```toml
//! [energy]
//! regen_interval_blocks = 1
//! regen_amount = 1
//!
//! [rest]
//! token_cost = 10
//!
//! [classes.warrior.base]
//! max_health = 120
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use quest2earn_shared::{Principal, TokenAmount};
use serde::{Deserialize, Serialize};

use crate::character::CharacterClass;
use crate::error::{GameError, GameResult};

/// Highest `progression.max_level` a configuration may set. Level-ups run
/// one step per level inside a single call.
pub const MAX_LEVEL_CAP: u32 = 1000;

/// Energy regeneration settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Blocks per regeneration step. Must be at least 1.
    pub regen_interval_blocks: u64,
    /// Energy restored per step.
    pub regen_amount: u32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            regen_interval_blocks: 1,
            regen_amount: 1,
        }
    }
}

/// Cost of resting a character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestConfig {
    /// Tokens burned per rest.
    pub token_cost: TokenAmount,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self { token_cost: 10 }
    }
}

/// Level scaling applied to quest rewards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestRewardConfig {
    /// Extra experience per character level.
    pub experience_bonus_per_level: u32,
    /// Extra tokens per character level.
    pub token_bonus_per_level: TokenAmount,
}

impl Default for QuestRewardConfig {
    fn default() -> Self {
        Self {
            experience_bonus_per_level: 5,
            token_bonus_per_level: 10,
        }
    }
}

/// PvP settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Energy the attacker spends per battle.
    pub energy_cost: u32,
    /// Experience awarded to the winner.
    pub experience_reward: u32,
    /// Tokens minted to the winner's owner.
    pub token_reward: TokenAmount,
    /// Battle power added per level.
    pub power_per_level: u32,
    /// Reward multiplier for an upset win, in basis points (10000 = 1x).
    pub upset_bonus_bp: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            energy_cost: 10,
            experience_reward: 50,
            token_reward: 25,
            power_per_level: 5,
            upset_bonus_bp: 15_000,
        }
    }
}

/// Level curve.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Experience to go from level L to L+1 is this times L.
    pub experience_per_level: u64,
    /// Level cap.
    pub max_level: u32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            experience_per_level: 100,
            max_level: 50,
        }
    }
}

/// Per-account limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Characters one account may own.
    pub max_characters_per_player: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_characters_per_player: 10,
        }
    }
}

/// A block of the six core stats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBlock {
    /// Maximum health.
    pub max_health: u32,
    /// Maximum energy.
    pub max_energy: u32,
    /// Attack.
    pub attack: u32,
    /// Defense.
    pub defense: u32,
    /// Magic.
    pub magic: u32,
    /// Agility.
    pub agility: u32,
}

impl StatBlock {
    /// Creates a stat block.
    #[must_use]
    pub const fn new(
        max_health: u32,
        max_energy: u32,
        attack: u32,
        defense: u32,
        magic: u32,
        agility: u32,
    ) -> Self {
        Self {
            max_health,
            max_energy,
            attack,
            defense,
            magic,
            agility,
        }
    }
}

/// Starting stats and per-level growth of a class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archetype {
    /// Stats at level 1.
    pub base: StatBlock,
    /// Stats gained on every level-up.
    pub growth: StatBlock,
}

/// Archetypes of the four classes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassTable {
    /// Warrior archetype.
    pub warrior: Archetype,
    /// Mage archetype.
    pub mage: Archetype,
    /// Ranger archetype.
    pub ranger: Archetype,
    /// Rogue archetype.
    pub rogue: Archetype,
}

impl Default for ClassTable {
    fn default() -> Self {
        Self {
            warrior: Archetype {
                base: StatBlock::new(120, 80, 15, 12, 5, 8),
                growth: StatBlock::new(12, 4, 3, 2, 1, 1),
            },
            mage: Archetype {
                base: StatBlock::new(80, 120, 6, 6, 18, 10),
                growth: StatBlock::new(8, 6, 1, 1, 3, 2),
            },
            ranger: Archetype {
                base: StatBlock::new(100, 100, 12, 8, 6, 14),
                growth: StatBlock::new(10, 5, 2, 1, 1, 3),
            },
            rogue: Archetype {
                base: StatBlock::new(90, 110, 13, 7, 5, 15),
                growth: StatBlock::new(9, 5, 2, 1, 1, 3),
            },
        }
    }
}

/// Token balances present at deployment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    /// Initial balance per account.
    pub balances: BTreeMap<Principal, TokenAmount>,
}

/// Complete balance configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Energy regeneration.
    pub energy: EnergyConfig,
    /// Rest cost.
    pub rest: RestConfig,
    /// Quest reward scaling.
    pub quest: QuestRewardConfig,
    /// PvP settings.
    pub battle: BattleConfig,
    /// Level curve.
    pub progression: ProgressionConfig,
    /// Per-account limits.
    pub limits: LimitsConfig,
    /// Class archetypes.
    pub classes: ClassTable,
    /// Initial token balances.
    pub genesis: GenesisConfig,
}

impl GameConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidConfig` if the text does not parse or a
    /// value is out of range.
    pub fn from_toml_str(text: &str) -> GameResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| GameError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidConfig` if the file cannot be read or is
    /// invalid.
    pub fn from_toml_file(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| GameError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidConfig` naming the first bad field.
    pub fn validate(&self) -> GameResult<()> {
        if self.energy.regen_interval_blocks == 0 {
            return Err(GameError::InvalidConfig(
                "energy.regen_interval_blocks must be at least 1".to_string(),
            ));
        }
        if self.progression.experience_per_level == 0 {
            return Err(GameError::InvalidConfig(
                "progression.experience_per_level must be at least 1".to_string(),
            ));
        }
        if self.progression.max_level == 0 {
            return Err(GameError::InvalidConfig(
                "progression.max_level must be at least 1".to_string(),
            ));
        }
        if self.progression.max_level > MAX_LEVEL_CAP {
            return Err(GameError::InvalidConfig(format!(
                "progression.max_level must be at most {MAX_LEVEL_CAP}"
            )));
        }
        if self.battle.upset_bonus_bp < 10_000 {
            return Err(GameError::InvalidConfig(
                "battle.upset_bonus_bp must be at least 10000".to_string(),
            ));
        }
        if self.limits.max_characters_per_player == 0 {
            return Err(GameError::InvalidConfig(
                "limits.max_characters_per_player must be at least 1".to_string(),
            ));
        }
        for class in CharacterClass::ALL {
            let base = self.archetype(class).base;
            if base.max_health == 0 || base.max_energy == 0 {
                return Err(GameError::InvalidConfig(format!(
                    "classes.{}.base needs positive max_health and max_energy",
                    class.key()
                )));
            }
        }
        Ok(())
    }

    /// Returns the archetype of a class.
    #[must_use]
    pub const fn archetype(&self, class: CharacterClass) -> &Archetype {
        match class {
            CharacterClass::Warrior => &self.classes.warrior,
            CharacterClass::Mage => &self.classes.mage,
            CharacterClass::Ranger => &self.classes.ranger,
            CharacterClass::Rogue => &self.classes.rogue,
        }
    }
}
