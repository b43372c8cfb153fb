//! Thrown grenades

use glam::Vec2;

use super::explosion::ExplosionSpec;
use super::rng::GameRng;
use super::services::WorldServices;
use crate::Rect;
use crate::consts::*;

/// Below this impact speed the grenade stops bouncing
const BOUNCE_MIN_SPEED: f32 = 120.0;
/// Horizontal damping applied on each bounce
const BOUNCE_FRICTION: f32 = 0.7;
/// Grenades settle slightly above the ground line
const GROUND_INSET: f32 = 4.0;

#[derive(Debug, Clone)]
pub struct Grenade {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub fuse_ms: f32,
    pub bounce_damping: f32,
    pub marked_for_deletion: bool,
}

impl Grenade {
    pub fn new(x: f32, y: f32, direction: f32, rng: &mut GameRng) -> Self {
        Self {
            pos: Vec2::new(x, y),
            vel: Vec2::new(direction * rng.range(320.0, 400.0), -560.0),
            size: GRENADE_SIZE,
            rotation: rng.next_f32() * std::f32::consts::TAU,
            rotation_speed: rng.signed() * 8.0,
            fuse_ms: GRENADE_FUSE_MS,
            bounce_damping: GRENADE_BOUNCE_DAMPING,
            marked_for_deletion: false,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size, self.size)
    }

    pub fn update(&mut self, delta_ms: f32, services: &mut dyn WorldServices) {
        let dt = delta_ms / 1000.0;
        self.fuse_ms -= delta_ms;
        self.vel.y += GRENADE_GRAVITY * dt;
        self.pos += self.vel * dt;
        self.rotation += self.rotation_speed * dt;

        let floor = services.bounds().ground_y - GROUND_INSET;
        if self.pos.y + self.size >= floor {
            self.pos.y = floor - self.size;
            if self.vel.y.abs() > BOUNCE_MIN_SPEED {
                self.vel.y *= -self.bounce_damping;
                self.vel.x *= BOUNCE_FRICTION;
            } else {
                self.vel.y = 0.0;
            }
        }

        if self.fuse_ms <= 0.0 {
            self.explode(services);
        }
    }

    /// Detonate at the grenade's centre. Does nothing after the first call.
    pub fn explode(&mut self, services: &mut dyn WorldServices) {
        if self.marked_for_deletion {
            return;
        }
        let center = self.rect().center();
        services.spawn_explosion(
            center.x,
            center.y,
            ExplosionSpec {
                radius: GRENADE_BLAST_RADIUS,
                damage: GRENADE_BLAST_DAMAGE,
                ..Default::default()
            },
        );
        self.marked_for_deletion = true;
    }
}
