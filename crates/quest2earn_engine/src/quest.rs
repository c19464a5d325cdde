//! # Quest Engine
//!
//! Quest definitions, per-character progress and the reward curve.
//!
//! ## State machine (per character and quest)
//!
//! ```text
//! NotStarted --start--> Started --complete--> Completed
//!                          ^                      |
//!                          +-------start----------+  (while completions remain)
//! ```

use quest2earn_shared::{BlockHeight, Principal, QuestId, TokenAmount};
use quest2earn_shared::{MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH};
use serde::{Deserialize, Serialize};

use crate::character::{Character, CharacterClass};
use crate::config::QuestRewardConfig;
use crate::error::{GameError, GameResult};

/// Parameters of a new quest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestSpec {
    /// Title.
    pub name: String,
    /// Flavour text.
    #[serde(default)]
    pub description: String,
    /// Minimum character level.
    pub required_level: u32,
    /// Energy spent on start.
    pub energy_cost: u32,
    /// Experience before level scaling.
    pub base_experience_reward: u64,
    /// Tokens before level scaling.
    pub base_token_reward: TokenAmount,
    /// Class restriction.
    #[serde(default)]
    pub required_class: Option<CharacterClass>,
    /// Blocks between start and completion.
    #[serde(default)]
    pub completion_time: u64,
    /// Completion cap per character.
    #[serde(default)]
    pub max_completions: Option<u32>,
}

impl QuestSpec {
    /// Validates the definition.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidQuest` describing the first bad field.
    pub fn validate(&self) -> GameResult<()> {
        if self.name.trim().is_empty() {
            return Err(GameError::InvalidQuest("name is empty".to_string()));
        }
        if self.name.len() > MAX_TITLE_LENGTH {
            return Err(GameError::InvalidQuest(format!(
                "name longer than {MAX_TITLE_LENGTH} characters"
            )));
        }
        if self.description.len() > MAX_DESCRIPTION_LENGTH {
            return Err(GameError::InvalidQuest(format!(
                "description longer than {MAX_DESCRIPTION_LENGTH} characters"
            )));
        }
        if self.required_level == 0 {
            return Err(GameError::InvalidQuest(
                "required level must be at least 1".to_string(),
            ));
        }
        if self.max_completions == Some(0) {
            return Err(GameError::InvalidQuest(
                "max completions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A registered quest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    /// Unique identifier.
    pub id: QuestId,
    /// Title.
    pub name: String,
    /// Flavour text.
    pub description: String,
    /// Minimum character level.
    pub required_level: u32,
    /// Energy spent on start.
    pub energy_cost: u32,
    /// Experience before level scaling.
    pub base_experience_reward: u64,
    /// Tokens before level scaling.
    pub base_token_reward: TokenAmount,
    /// Class restriction.
    pub required_class: Option<CharacterClass>,
    /// Blocks between start and completion.
    pub completion_time: u64,
    /// Whether characters may start the quest.
    pub is_active: bool,
    /// Completion cap per character.
    pub max_completions: Option<u32>,
    /// Account that registered the quest.
    pub creator: Principal,
    /// Block of registration.
    pub creation_time: BlockHeight,
}

impl Quest {
    /// Builds an active quest from a validated spec.
    #[must_use]
    pub fn from_spec(id: QuestId, spec: QuestSpec, creator: Principal, now: BlockHeight) -> Self {
        Self {
            id,
            name: spec.name,
            description: spec.description,
            required_level: spec.required_level,
            energy_cost: spec.energy_cost,
            base_experience_reward: spec.base_experience_reward,
            base_token_reward: spec.base_token_reward,
            required_class: spec.required_class,
            completion_time: spec.completion_time,
            is_active: true,
            max_completions: spec.max_completions,
            creator,
            creation_time: now,
        }
    }

    /// Checks whether `character` may take the quest.
    ///
    /// # Errors
    ///
    /// Returns the first reason the quest is unavailable, in the order
    /// inactive, level, class, completions.
    pub fn check_eligibility(
        &self,
        character: &Character,
        progress: Option<&QuestProgress>,
    ) -> GameResult<()> {
        if !self.is_active {
            return Err(GameError::QuestInactive(self.id));
        }
        if character.level < self.required_level {
            return Err(GameError::LevelTooLow {
                required: self.required_level,
                actual: character.level,
            });
        }
        if let Some(class) = self.required_class {
            if class != character.class {
                return Err(GameError::ClassMismatch);
            }
        }
        if let Some(max) = self.max_completions {
            let done = progress.map_or(0, |p| p.completion_count);
            if done >= max {
                return Err(GameError::MaxCompletionsReached(self.id));
            }
        }
        Ok(())
    }

    /// First block at which a run started at `started_at` may complete.
    #[inline]
    #[must_use]
    pub const fn ready_at(&self, started_at: BlockHeight) -> BlockHeight {
        started_at.saturating_add(self.completion_time)
    }

    /// Rewards for completing the quest at `level`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::ArithmeticOverflow` if a reward does not fit.
    pub fn reward_for(&self, level: u32, config: &QuestRewardConfig) -> GameResult<QuestReward> {
        let level = u64::from(level);
        let experience_gained = u64::from(config.experience_bonus_per_level)
            .checked_mul(level)
            .and_then(|bonus| self.base_experience_reward.checked_add(bonus))
            .ok_or(GameError::ArithmeticOverflow)?;
        let tokens_gained = config
            .token_bonus_per_level
            .checked_mul(level)
            .and_then(|bonus| self.base_token_reward.checked_add(bonus))
            .ok_or(GameError::ArithmeticOverflow)?;
        Ok(QuestReward {
            experience_gained,
            tokens_gained,
        })
    }
}

/// Progress of one character on one quest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestProgress {
    /// Block the latest run started.
    pub started_at: BlockHeight,
    /// Block the latest run completed, if it did.
    pub completed_at: Option<BlockHeight>,
    /// Finished runs.
    pub completion_count: u32,
}

impl QuestProgress {
    /// True while a run is started and not completed.
    #[inline]
    #[must_use]
    pub const fn in_progress(&self) -> bool {
        self.completed_at.is_none()
    }
}

/// Outcome of a completed quest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestReward {
    /// Experience credited to the character.
    pub experience_gained: u64,
    /// Tokens minted to the owner.
    pub tokens_gained: TokenAmount,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn spec() -> QuestSpec {
        QuestSpec {
            name: "Slay the Dragon".to_string(),
            description: "Defeat the ancient dragon".to_string(),
            required_level: 1,
            energy_cost: 20,
            base_experience_reward: 50,
            base_token_reward: 25,
            required_class: None,
            completion_time: 10,
            max_completions: None,
        }
    }

    fn creator() -> Principal {
        Principal::new("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM").unwrap()
    }

    fn hero() -> Character {
        let config = GameConfig::default();
        Character::new(
            1,
            creator(),
            "Hero".to_string(),
            CharacterClass::Warrior,
            config.archetype(CharacterClass::Warrior),
            0,
        )
    }

    #[test]
    fn test_spec_validation() {
        assert!(spec().validate().is_ok());

        let mut bad = spec();
        bad.name = String::new();
        assert!(matches!(bad.validate(), Err(GameError::InvalidQuest(_))));

        let mut bad = spec();
        bad.name = "q".repeat(MAX_TITLE_LENGTH + 1);
        assert!(bad.validate().is_err());

        let mut bad = spec();
        bad.required_level = 0;
        assert!(bad.validate().is_err());

        let mut bad = spec();
        bad.max_completions = Some(0);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_reward_scales_with_level() {
        let quest = Quest::from_spec(1, spec(), creator(), 0);
        let config = QuestRewardConfig::default();

        let reward = quest.reward_for(1, &config).unwrap();
        assert_eq!(reward.experience_gained, 55);
        assert_eq!(reward.tokens_gained, 35);

        let reward = quest.reward_for(4, &config).unwrap();
        assert_eq!(reward.experience_gained, 70);
        assert_eq!(reward.tokens_gained, 65);
    }

    #[test]
    fn test_reward_overflow() {
        let mut s = spec();
        s.base_token_reward = u64::MAX;
        let quest = Quest::from_spec(1, s, creator(), 0);
        assert_eq!(
            quest.reward_for(1, &QuestRewardConfig::default()),
            Err(GameError::ArithmeticOverflow)
        );
    }

    #[test]
    fn test_eligibility_order() {
        let mut s = spec();
        s.required_level = 5;
        s.required_class = Some(CharacterClass::Mage);
        let mut quest = Quest::from_spec(1, s, creator(), 0);
        let hero = hero();

        quest.is_active = false;
        assert_eq!(
            quest.check_eligibility(&hero, None),
            Err(GameError::QuestInactive(1))
        );

        quest.is_active = true;
        assert_eq!(
            quest.check_eligibility(&hero, None),
            Err(GameError::LevelTooLow { required: 5, actual: 1 })
        );

        quest.required_level = 1;
        assert_eq!(
            quest.check_eligibility(&hero, None),
            Err(GameError::ClassMismatch)
        );

        quest.required_class = Some(CharacterClass::Warrior);
        assert!(quest.check_eligibility(&hero, None).is_ok());
    }

    #[test]
    fn test_max_completions() {
        let mut s = spec();
        s.max_completions = Some(2);
        let quest = Quest::from_spec(1, s, creator(), 0);
        let hero = hero();

        let mut progress = QuestProgress {
            started_at: 0,
            completed_at: Some(10),
            completion_count: 1,
        };
        assert!(quest.check_eligibility(&hero, Some(&progress)).is_ok());

        progress.completion_count = 2;
        assert_eq!(
            quest.check_eligibility(&hero, Some(&progress)),
            Err(GameError::MaxCompletionsReached(1))
        );
    }

    #[test]
    fn test_spec_deserializes_with_defaults() {
        let json = r#"{
            "name": "Gather Herbs",
            "required_level": 1,
            "energy_cost": 5,
            "base_experience_reward": 10,
            "base_token_reward": 5,
            "required_class": 2
        }"#;
        let spec: QuestSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.required_class, Some(CharacterClass::Mage));
        assert_eq!(spec.completion_time, 0);
        assert_eq!(spec.max_completions, None);
        assert!(spec.description.is_empty());
    }
}
