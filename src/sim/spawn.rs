//! Spawn and loot tables. Pure functions of a uniform roll so they can be
//! tested without a world.

use super::enemy::EnemyKind;
use super::powerup::PowerUpKind;
use crate::consts::{MIN_SPAWN_INTERVAL_MS, SPAWN_SCORE_FACTOR};

/// A drop roll above this may free a hostage instead of dropping loot
pub const HOSTAGE_DROP_ROLL: f32 = 0.82;

/// Cumulative bands over the normalised drop roll
const LOOT_BANDS: [(f32, PowerUpKind); 4] = [
    (0.2, PowerUpKind::Grenade),
    (0.45, PowerUpKind::Spread),
    (0.7, PowerUpKind::Heavy),
    (0.88, PowerUpKind::Laser),
];

/// Enemy spawn interval, shrinking as the score grows
pub fn spawn_interval(base_ms: f32, score: u64) -> f32 {
    (base_ms - score as f32 * SPAWN_SCORE_FACTOR).max(MIN_SPAWN_INTERVAL_MS)
}

/// `(aerial, heavy)` spawn chances at `score`
pub fn enemy_chances(score: u64) -> (f32, f32) {
    let score = score as f32;
    let aerial = (0.05 + score / 3500.0).min(0.18);
    let heavy = (0.1 + score / 2000.0).min(0.25);
    (aerial, heavy)
}

pub fn roll_enemy_kind(roll: f32, score: u64) -> EnemyKind {
    let (aerial, heavy) = enemy_chances(score);
    if roll < aerial {
        EnemyKind::Aerial
    } else if roll < aerial + heavy {
        EnemyKind::Heavy
    } else {
        EnemyKind::Grunt
    }
}

/// Which pickup a normalised roll in [0, 1) selects
pub fn power_up_for_band(normalized: f32) -> PowerUpKind {
    LOOT_BANDS
        .iter()
        .find(|(upper, _)| normalized < *upper)
        .map(|(_, kind)| *kind)
        .unwrap_or(PowerUpKind::Life)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    PowerUp(PowerUpKind),
    /// Free a hostage, if there is room for one
    Hostage,
    Nothing,
}

/// Resolve a destroyed enemy's drop roll
pub fn resolve_drop(roll: f32, kind: EnemyKind) -> DropOutcome {
    let chance = kind.drop_chance();
    if roll < chance {
        DropOutcome::PowerUp(power_up_for_band(roll / chance))
    } else if roll > HOSTAGE_DROP_ROLL {
        DropOutcome::Hostage
    } else {
        DropOutcome::Nothing
    }
}
