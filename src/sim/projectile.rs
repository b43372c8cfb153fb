//! Bullets, shells and laser bolts

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Bounds;
use crate::Rect;
use crate::consts::OFFSCREEN_PADDING;

/// Spawn options for a projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileSpec {
    /// Default 18
    pub width: f32,
    /// Default 6
    pub height: f32,
    /// Horizontal speed used when no explicit `vx` is set. Default 700
    pub speed: f32,
    /// Explicit horizontal velocity, overriding `speed * direction`
    pub vx: Option<f32>,
    /// Initial vertical velocity. Default 0
    pub vy: f32,
    /// Downward acceleration. Default 0
    pub gravity: f32,
    /// Default 1
    pub damage: i32,
    /// Extra enemies the shot may pass through. Default 0
    pub pierce: u32,
    /// Lifetime in ms; 0 means no limit
    pub life_ms: f32,
    /// Fired by an enemy (hurts the player instead of enemies)
    pub from_enemy: bool,
    pub color: u32,
    pub glow: u32,
}

impl Default for ProjectileSpec {
    fn default() -> Self {
        Self {
            width: 18.0,
            height: 6.0,
            speed: 700.0,
            vx: None,
            vy: 0.0,
            gravity: 0.0,
            damage: 1,
            pierce: 0,
            life_ms: 0.0,
            from_enemy: false,
            color: 0xffe066,
            glow: 0xffd166,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Projectile {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    /// -1 left, +1 right
    pub direction: f32,
    pub vx: Option<f32>,
    pub vy: f32,
    pub gravity: f32,
    pub damage: i32,
    pub pierce: u32,
    pub life_ms: f32,
    pub elapsed_ms: f32,
    pub from_enemy: bool,
    pub color: u32,
    pub glow: u32,
    /// Enemy ids already damaged by this projectile
    pub hit_targets: HashSet<u32>,
    pub marked_for_deletion: bool,
}

impl Projectile {
    pub fn new(x: f32, y: f32, direction: f32, spec: ProjectileSpec) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(spec.width, spec.height),
            speed: spec.speed,
            direction,
            vx: spec.vx,
            vy: spec.vy,
            gravity: spec.gravity,
            damage: spec.damage,
            pierce: spec.pierce,
            life_ms: spec.life_ms,
            elapsed_ms: 0.0,
            from_enemy: spec.from_enemy,
            color: spec.color,
            glow: spec.glow,
            hit_targets: HashSet::new(),
            marked_for_deletion: false,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn update(&mut self, delta_ms: f32, bounds: &Bounds) {
        let dt = delta_ms / 1000.0;
        match self.vx {
            Some(vx) => self.pos.x += vx * dt,
            None => self.pos.x += self.speed * dt * self.direction,
        }
        if self.gravity != 0.0 {
            self.vy += self.gravity * dt;
        }
        self.pos.y += self.vy * dt;

        if self.life_ms > 0.0 {
            self.elapsed_ms += delta_ms;
            if self.elapsed_ms >= self.life_ms {
                self.marked_for_deletion = true;
            }
        }

        if bounds.is_outside(&self.rect(), OFFSCREEN_PADDING) {
            self.marked_for_deletion = true;
        }
    }

    pub fn has_hit(&self, enemy_id: u32) -> bool {
        self.hit_targets.contains(&enemy_id)
    }

    /// Record a hit on `enemy_id`, spending pierce or consuming the shot.
    /// Returns false if that enemy was already hit.
    pub fn register_hit(&mut self, enemy_id: u32) -> bool {
        if !self.hit_targets.insert(enemy_id) {
            return false;
        }
        if self.pierce > 0 {
            self.pierce -= 1;
        } else {
            self.marked_for_deletion = true;
        }
        true
    }
}
