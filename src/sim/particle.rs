//! Cosmetic sparks. Never collide with anything.

use glam::Vec2;

use super::rng::GameRng;
use crate::consts::PARTICLE_GRAVITY;

#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: u32,
    /// Total lifetime (ms)
    pub life_ms: f32,
    pub remaining_ms: f32,
    pub marked_for_deletion: bool,
}

impl Particle {
    /// Spray a particle upward and outward from `(x, y)`
    pub fn new(x: f32, y: f32, color: u32, rng: &mut GameRng) -> Self {
        let radius = rng.range(4.0, 10.0);
        let vx = rng.signed() * 180.0;
        let vy = (-rng.next_f32() - 0.2) * 220.0;
        let life_ms = rng.range(420.0, 800.0);
        Self {
            pos: Vec2::new(x, y),
            vel: Vec2::new(vx, vy),
            radius,
            color,
            life_ms,
            remaining_ms: life_ms,
            marked_for_deletion: false,
        }
    }

    pub fn update(&mut self, delta_ms: f32) {
        let dt = delta_ms / 1000.0;
        self.remaining_ms -= delta_ms;
        self.vel.y += PARTICLE_GRAVITY * dt;
        self.pos += self.vel * dt;
        if self.remaining_ms <= 0.0 {
            self.marked_for_deletion = true;
        }
    }

    /// Fade factor in [0, 1]
    pub fn alpha(&self) -> f32 {
        (self.remaining_ms / self.life_ms).clamp(0.0, 1.0)
    }
}
