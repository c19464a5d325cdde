//! # Quest2Earn Rules Engine
//!
//! Deterministic rules for an on-chain role-playing game: characters,
//! quests, PvP battles, items and the game token.
//!
//! ## Design Principles
//!
//! 1. **Pure transitions** - operations read and write an explicit
//!    [`GameState`]; no I/O, no clock, no OS randomness
//! 2. **All-or-nothing** - every operation validates before its first write
//! 3. **Integer math** - rewards and stats use checked or saturating `u32`/`u64`
//! 4. **External configuration** - all balance numbers in TOML
//!
//! ## Example
//!
//! ```rust,ignore
//! use quest2earn_engine::{CallContext, GameConfig, GameEngine};
//!
//! let engine = GameEngine::new(GameConfig::from_toml_file("data/game.toml")?, owner)?;
//! let mut state = engine.genesis_state()?;
//!
//! let ctx = CallContext::new(player, 1);
//! let hero = engine.create_character(&mut state, &ctx, "Hero", 1)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod battle;
pub mod character;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod item;
pub mod ledger;
pub mod quest;
pub mod state;

pub use battle::{BattleOutcome, BlockSalt, EffectiveStats};
pub use character::{Character, CharacterClass, Equipment, EquipmentSlot};
pub use config::GameConfig;
pub use engine::{CallContext, GameEngine};
pub use error::{GameError, GameResult};
pub use events::GameEvent;
pub use item::{Item, ItemSpec, ItemType, Rarity, StatBonus};
pub use ledger::TokenLedger;
pub use quest::{Quest, QuestProgress, QuestReward, QuestSpec};
pub use state::GameState;
