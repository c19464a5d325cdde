//! # Battle Resolver
//!
//! Battle power and PvP resolution.
//!
//! ## Determinism
//!
//! Battles must give the same result on every node replaying the chain, so
//! there is no OS randomness here. The roll is SipHash-2-4 keyed with the
//! block salt (derived from the parent block hash) over the two character
//! ids, the block height and a per-state battle nonce:
//!
//! ```text
//! roll = siphash24(salt; attacker, defender, height, nonce) mod (pA + pD)
//! attacker wins iff roll < pA
//! ```
//!
//! A character with twice the power wins two thirds of the time.

use std::hash::Hasher;

use quest2earn_shared::{BlockHeight, CharacterId, TokenAmount};
use serde::{Deserialize, Serialize};
use siphasher::sip128::{Hasher128, SipHasher24};

use crate::character::Character;
use crate::error::{GameError, GameResult};
use crate::item::StatBonus;

/// Basis points for a 1x multiplier.
pub const BASIS_POINTS: u64 = 10_000;

/// Per-block salt for battle rolls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockSalt {
    /// Lower 64 bits of the parent hash.
    pub low: u64,
    /// Upper 64 bits of the parent hash.
    pub high: u64,
}

impl BlockSalt {
    /// Derives the salt from a 128-bit block hash.
    #[must_use]
    pub fn from_hash(hash: [u8; 16]) -> Self {
        let mut low = [0u8; 8];
        let mut high = [0u8; 8];
        low.copy_from_slice(&hash[..8]);
        high.copy_from_slice(&hash[8..]);
        Self {
            low: u64::from_le_bytes(low),
            high: u64::from_le_bytes(high),
        }
    }

    /// Fixed salt for tests and benches.
    #[must_use]
    pub const fn test_salt() -> Self {
        Self {
            low: 0x5145_5354_3245_4152,
            high: 0x4E00_0000_CAFE_F00D,
        }
    }
}

/// Stats of a character with equipment bonuses applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveStats {
    /// Character level.
    pub level: u32,
    /// Attack.
    pub attack: u32,
    /// Defense.
    pub defense: u32,
    /// Magic.
    pub magic: u32,
    /// Agility.
    pub agility: u32,
    /// Max health.
    pub max_health: u32,
}

impl EffectiveStats {
    /// Applies `bonus` to the base stats of `character`.
    #[must_use]
    pub const fn of(character: &Character, bonus: StatBonus) -> Self {
        Self {
            level: character.level,
            attack: character.attack.saturating_add(bonus.attack),
            defense: character.defense.saturating_add(bonus.defense),
            magic: character.magic.saturating_add(bonus.magic),
            agility: character.agility.saturating_add(bonus.agility),
            max_health: character.max_health.saturating_add(bonus.health),
        }
    }

    /// Battle power: the four combat stats plus a per-level bonus.
    #[must_use]
    pub const fn power(&self, power_per_level: u32) -> u32 {
        self.attack
            .saturating_add(self.defense)
            .saturating_add(self.magic)
            .saturating_add(self.agility)
            .saturating_add(self.level.saturating_mul(power_per_level))
    }
}

/// Keyed hash deciding a battle.
#[must_use]
pub fn battle_roll(
    salt: BlockSalt,
    attacker: CharacterId,
    defender: CharacterId,
    height: BlockHeight,
    nonce: u64,
) -> u64 {
    let mut hasher = SipHasher24::new_with_keys(salt.low, salt.high);
    hasher.write_u64(attacker);
    hasher.write_u64(defender);
    hasher.write_u64(height);
    hasher.write_u64(nonce);
    let result = hasher.finish128();
    result.h1 ^ result.h2
}

/// True when the attacker wins a roll between the given powers.
///
/// With both powers zero the defender holds.
#[must_use]
pub const fn attacker_wins(roll: u64, attacker_power: u32, defender_power: u32) -> bool {
    let total = attacker_power as u64 + defender_power as u64;
    if total == 0 {
        return false;
    }
    roll % total < attacker_power as u64
}

/// Health the loser loses: `max(1, winner_attack - loser_defense / 2)`.
#[must_use]
pub const fn battle_damage(winner_attack: u32, loser_defense: u32) -> u32 {
    let dmg = winner_attack.saturating_sub(loser_defense / 2);
    if dmg == 0 {
        1
    } else {
        dmg
    }
}

/// Health after taking `damage`. Battles never knock a character below 1.
#[must_use]
pub const fn health_after(health: u32, damage: u32) -> u32 {
    let left = health.saturating_sub(damage);
    if left == 0 {
        1
    } else {
        left
    }
}

/// Scales `amount` by a basis-point multiplier, rounding down.
///
/// # Errors
///
/// Returns `GameError::ArithmeticOverflow` if the product overflows.
pub fn scale_bp(amount: u64, bp: u32) -> GameResult<u64> {
    amount
        .checked_mul(u64::from(bp))
        .map(|v| v / BASIS_POINTS)
        .ok_or(GameError::ArithmeticOverflow)
}

/// Outcome of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleOutcome {
    /// Winning character.
    pub winner: CharacterId,
    /// Losing character.
    pub loser: CharacterId,
    /// Experience credited to the winner.
    pub experience_gained: u64,
    /// Tokens minted to the winner's owner.
    pub tokens_gained: TokenAmount,
    /// Health the loser lost.
    pub damage: u32,
    /// The weaker side won.
    pub upset: bool,
}
