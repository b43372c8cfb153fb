//! Loot dropped by destroyed enemies

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Bounds;
use super::player::WeaponKind;
use crate::Rect;
use crate::consts::*;

/// Power-ups stop bouncing below this speed
const REST_SPEED: f32 = 80.0;
/// Power-ups settle slightly above the ground line
const GROUND_INSET: f32 = 8.0;
/// Initial upward pop when dropped
const LAUNCH_VY: f32 = -220.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Heavy,
    Spread,
    Laser,
    Grenade,
    Life,
}

/// What a pickup grants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUpConfig {
    pub label: &'static str,
    pub color: u32,
    pub accent: u32,
    /// Weapon duration (ms), for weapon pickups
    pub duration_ms: f32,
    /// Grenades granted
    pub grenades: i32,
    /// Score awarded on pickup
    pub score: u64,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::Heavy,
        PowerUpKind::Spread,
        PowerUpKind::Laser,
        PowerUpKind::Grenade,
        PowerUpKind::Life,
    ];

    /// Parse a kind name; anything unrecognised becomes `Heavy`
    pub fn from_name(name: &str) -> Self {
        match name {
            "spread" => PowerUpKind::Spread,
            "laser" => PowerUpKind::Laser,
            "grenade" => PowerUpKind::Grenade,
            "life" => PowerUpKind::Life,
            _ => PowerUpKind::Heavy,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PowerUpKind::Heavy => "heavy",
            PowerUpKind::Spread => "spread",
            PowerUpKind::Laser => "laser",
            PowerUpKind::Grenade => "grenade",
            PowerUpKind::Life => "life",
        }
    }

    pub fn config(&self) -> PowerUpConfig {
        match self {
            PowerUpKind::Heavy => PowerUpConfig {
                label: "H",
                color: 0xf4a261,
                accent: 0xffe8a3,
                duration_ms: 9000.0,
                grenades: 0,
                score: 0,
            },
            PowerUpKind::Spread => PowerUpConfig {
                label: "S",
                color: 0x4895ef,
                accent: 0xa9d6ff,
                duration_ms: 9000.0,
                grenades: 0,
                score: 0,
            },
            PowerUpKind::Laser => PowerUpConfig {
                label: "L",
                color: 0xf72585,
                accent: 0xff9f9f,
                duration_ms: 7200.0,
                grenades: 0,
                score: 0,
            },
            PowerUpKind::Grenade => PowerUpConfig {
                label: "G",
                color: 0x52b788,
                accent: 0x95d5b2,
                duration_ms: 0.0,
                grenades: 2,
                score: 50,
            },
            PowerUpKind::Life => PowerUpConfig {
                label: "+1",
                color: 0xff6b6b,
                accent: 0xffe5ec,
                duration_ms: 0.0,
                grenades: 0,
                score: 200,
            },
        }
    }

    /// The weapon this pickup arms, if it is a weapon pickup
    pub fn weapon(&self) -> Option<WeaponKind> {
        match self {
            PowerUpKind::Heavy => Some(WeaponKind::Heavy),
            PowerUpKind::Spread => Some(WeaponKind::Spread),
            PowerUpKind::Laser => Some(WeaponKind::Laser),
            PowerUpKind::Grenade | PowerUpKind::Life => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub vy: f32,
    /// Age (ms), drives the bob
    pub timer_ms: f32,
    pub marked_for_deletion: bool,
}

impl PowerUp {
    pub fn new(x: f32, y: f32, kind: PowerUpKind) -> Self {
        Self {
            kind,
            pos: Vec2::new(x, y),
            size: Vec2::new(POWERUP_WIDTH, POWERUP_HEIGHT),
            vy: LAUNCH_VY,
            timer_ms: 0.0,
            marked_for_deletion: false,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn config(&self) -> PowerUpConfig {
        self.kind.config()
    }

    pub fn update(&mut self, delta_ms: f32, bounds: &Bounds) {
        let dt = delta_ms / 1000.0;
        self.timer_ms += delta_ms;
        self.vy += POWERUP_GRAVITY * dt;
        self.pos.y += self.vy * dt;

        let floor = bounds.ground_y - GROUND_INSET;
        if self.pos.y + self.size.y >= floor {
            self.pos.y = floor - self.size.y;
            if self.vy.abs() > REST_SPEED {
                self.vy *= -POWERUP_RESTITUTION;
            } else {
                self.vy = 0.0;
            }
        }
    }

    /// Vertical draw offset, one cycle per second
    pub fn bob_offset(&self) -> f32 {
        ((self.timer_ms / 1000.0) * std::f32::consts::TAU).sin() * 4.0
    }
}
