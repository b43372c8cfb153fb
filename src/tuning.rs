//! Run configuration
//!
//! Values a host may tweak per run without touching the gameplay rules in
//! [`crate::consts`]. Loaded from JSON; missing fields take their defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MAX_GRENADES, MAX_PARTICLES, MAX_PROJECTILES};

/// Errors produced while loading a [`Tuning`]
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} out of range: {reason}")]
    OutOfRange {
        field: &'static str,
        reason: &'static str,
    },
}

/// Per-run tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Seed for the run RNG
    pub seed: u64,

    // === World ===
    pub width: f32,
    pub height: f32,
    /// Height of the ground strip at the bottom of the screen
    pub ground_height: f32,

    // === Player economy ===
    pub starting_lives: u32,
    pub max_lives: u32,
    pub starting_grenades: i32,
    pub max_grenades: i32,

    // === Pacing ===
    /// Base enemy spawn interval before the score ramp (ms)
    pub spawn_interval_ms: f32,
    /// Minimum time between two hits on the player (ms)
    pub damage_cooldown_ms: f32,

    // === Pool capacities (oldest entry evicted when full) ===
    pub projectile_pool: usize,
    pub particle_pool: usize,
    pub grenade_pool: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            seed: 0x5EED_1234,

            width: 960.0,
            height: 540.0,
            ground_height: 110.0,

            starting_lives: 3,
            max_lives: 5,
            starting_grenades: 4,
            max_grenades: 8,

            spawn_interval_ms: 1500.0,
            damage_cooldown_ms: 900.0,

            projectile_pool: MAX_PROJECTILES,
            particle_pool: MAX_PARTICLES,
            grenade_pool: MAX_GRENADES,
        }
    }
}

impl Tuning {
    /// Ground line in world coordinates
    pub fn ground_y(&self) -> f32 {
        self.height - self.ground_height
    }

    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Parse a tuning document, falling back to defaults when it is rejected
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Rejected tuning ({e}), using defaults");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Check the values the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(TuningError::OutOfRange {
                field: "width/height",
                reason: "must be positive",
            });
        }
        if self.ground_height < 0.0 || self.ground_height >= self.height {
            return Err(TuningError::OutOfRange {
                field: "ground_height",
                reason: "must lie inside the screen",
            });
        }
        if self.max_lives == 0 {
            return Err(TuningError::OutOfRange {
                field: "max_lives",
                reason: "must be at least 1",
            });
        }
        if self.max_grenades < 0 || self.starting_grenades < 0 {
            return Err(TuningError::OutOfRange {
                field: "grenades",
                reason: "must not be negative",
            });
        }
        if self.spawn_interval_ms <= 0.0 || self.damage_cooldown_ms < 0.0 {
            return Err(TuningError::OutOfRange {
                field: "timers",
                reason: "spawn interval must be positive and cooldown non-negative",
            });
        }
        if self.projectile_pool == 0 || self.particle_pool == 0 || self.grenade_pool == 0 {
            return Err(TuningError::OutOfRange {
                field: "pools",
                reason: "capacities must be at least 1",
            });
        }
        Ok(())
    }
}
