//! Blasts. Damage lands once, shortly after detonation; the fireball keeps
//! drawing for the rest of the duration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::services::WorldServices;

/// Spawn options for an explosion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionSpec {
    /// Visible lifetime (ms). Default 520
    pub duration_ms: f32,
    /// Peak drawn radius. Default 120
    pub max_radius: f32,
    /// Damage radius. Default 90
    pub radius: f32,
    /// Default 4
    pub damage: i32,
    /// Time from detonation to damage (ms). Default 80
    pub damage_delay_ms: f32,
}

impl Default for ExplosionSpec {
    fn default() -> Self {
        Self {
            duration_ms: 520.0,
            max_radius: 120.0,
            radius: 90.0,
            damage: 4,
            damage_delay_ms: 80.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Explosion {
    pub center: Vec2,
    pub elapsed_ms: f32,
    pub duration_ms: f32,
    pub max_radius: f32,
    pub radius: f32,
    pub damage: i32,
    pub damage_delay_ms: f32,
    pub damaged: bool,
    pub marked_for_deletion: bool,
}

impl Explosion {
    pub fn new(x: f32, y: f32, spec: ExplosionSpec) -> Self {
        Self {
            center: Vec2::new(x, y),
            elapsed_ms: 0.0,
            duration_ms: spec.duration_ms,
            max_radius: spec.max_radius,
            radius: spec.radius,
            damage: spec.damage,
            damage_delay_ms: spec.damage_delay_ms,
            damaged: false,
            marked_for_deletion: false,
        }
    }

    pub fn update(&mut self, delta_ms: f32, services: &mut dyn WorldServices) {
        self.elapsed_ms += delta_ms;
        if !self.damaged && self.elapsed_ms >= self.damage_delay_ms {
            self.damaged = true;
            services.damage_enemies_in_radius(self.center.x, self.center.y, self.radius, self.damage);
        }
        if self.elapsed_ms >= self.duration_ms {
            self.marked_for_deletion = true;
        }
    }

    /// 0 at detonation, 1 at the end of the duration
    pub fn progress(&self) -> f32 {
        (self.elapsed_ms / self.duration_ms).min(1.0)
    }

    /// Drawn fireball radius: swells then collapses, never below 10
    pub fn visual_radius(&self) -> f32 {
        (self.max_radius * (self.progress() * std::f32::consts::PI).sin()).max(10.0)
    }
}
