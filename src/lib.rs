//! Ground Strike - A side-scrolling run-and-gun arcade shooter
//!
//! Core modules:
//! - `sim`: Simulation (entities, collisions, spawning, game state)
//! - `input`: Held-key input state
//! - `renderer`: Draw-list snapshot of the final frame state
//! - `platform`: Host session driver (frame clock, overlays, web glue)
//! - `tuning`: Data-driven run configuration

pub mod input;
pub mod platform;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use input::{InputState, KeyCode};
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Gameplay rule constants
pub mod consts {
    /// Frame deltas above this are clamped by the host (ms)
    pub const MAX_FRAME_DELTA_MS: f32 = 100.0;

    /// Entities are culled once they leave the screen by this margin
    pub const OFFSCREEN_PADDING: f32 = 60.0;

    /// Pool capacities
    pub const MAX_PROJECTILES: usize = 140;
    pub const MAX_PARTICLES: usize = 220;
    pub const MAX_GRENADES: usize = 12;

    /// Player body and movement
    pub const PLAYER_WIDTH: f32 = 52.0;
    pub const PLAYER_HEIGHT: f32 = 70.0;
    pub const PLAYER_SPEED: f32 = 280.0;
    pub const PLAYER_START_X: f32 = 120.0;
    pub const PLAYER_JUMP_VELOCITY: f32 = -520.0;
    pub const PLAYER_GRAVITY: f32 = 1500.0;
    /// Horizontal margin kept from each screen edge
    pub const PLAYER_EDGE_MARGIN: f32 = 40.0;
    /// Tolerance for the grounded check (px)
    pub const GROUND_TOLERANCE: f32 = 0.5;
    pub const PLAYER_HIT_FLASH_MS: f32 = 220.0;
    pub const GRENADE_THROW_DELAY_MS: f32 = 420.0;

    /// Grenade physics
    pub const GRENADE_SIZE: f32 = 18.0;
    pub const GRENADE_GRAVITY: f32 = 1500.0;
    pub const GRENADE_FUSE_MS: f32 = 680.0;
    pub const GRENADE_BOUNCE_DAMPING: f32 = 0.42;
    pub const GRENADE_BLAST_RADIUS: f32 = 96.0;
    pub const GRENADE_BLAST_DAMAGE: i32 = 4;

    /// Particle physics
    pub const PARTICLE_GRAVITY: f32 = 520.0;

    /// Power-up physics
    pub const POWERUP_WIDTH: f32 = 34.0;
    pub const POWERUP_HEIGHT: f32 = 28.0;
    pub const POWERUP_GRAVITY: f32 = 900.0;
    pub const POWERUP_RESTITUTION: f32 = 0.36;

    /// Hostage body and escape speed
    pub const HOSTAGE_WIDTH: f32 = 44.0;
    pub const HOSTAGE_HEIGHT: f32 = 60.0;
    pub const HOSTAGE_ESCAPE_SPEED: f32 = 180.0;
    /// Unrescued hostages allowed at once
    pub const MAX_WAITING_HOSTAGES: usize = 2;

    /// Rescue rewards
    pub const RESCUE_SCORE: u64 = 240;
    pub const RESCUE_GRENADES: i32 = 2;
    /// Paid instead of a life when lives are already capped
    pub const RESCUE_FULL_LIVES_SCORE: u64 = 80;

    /// Damage feedback
    pub const SCREEN_FLASH_MS: f32 = 260.0;
    pub const ENEMY_HIT_FLASH_MS: f32 = 200.0;

    /// Spawn pacing
    pub const MIN_SPAWN_INTERVAL_MS: f32 = 600.0;
    pub const SPAWN_SCORE_FACTOR: f32 = 0.8;
}

/// Axis-aligned rectangle in world space
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from a top-left position and a size
    #[inline]
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Move `value` toward zero by `amount`, never past it
#[inline]
pub fn count_down(value: f32, amount: f32) -> f32 {
    (value - amount).max(0.0)
}
