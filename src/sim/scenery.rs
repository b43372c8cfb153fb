//! Background clouds drifting left. Purely cosmetic, but they draw from the
//! run RNG so a seeded run replays identically.

use glam::Vec2;

use super::collision::Bounds;
use super::rng::GameRng;

pub const CLOUD_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Cloud {
    pub pos: Vec2,
    pub speed: f32,
    pub scale: f32,
}

impl Cloud {
    fn random_y(bounds: &Bounds, rng: &mut GameRng) -> f32 {
        60.0 + rng.next_f32() * (bounds.ground_y - 200.0)
    }

    fn new(bounds: &Bounds, rng: &mut GameRng) -> Self {
        let x = rng.next_f32() * bounds.width;
        let y = Self::random_y(bounds, rng);
        Self {
            pos: Vec2::new(x, y),
            speed: rng.range(18.0, 42.0),
            scale: rng.range(0.6, 1.4),
        }
    }

    fn update(&mut self, delta_ms: f32, bounds: &Bounds, rng: &mut GameRng) {
        self.pos.x -= self.speed * delta_ms / 1000.0;
        if self.pos.x < -160.0 * self.scale {
            self.pos.x = bounds.width + rng.next_f32() * 140.0;
            self.pos.y = Self::random_y(bounds, rng);
            self.speed = rng.range(18.0, 42.0);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scenery {
    pub clouds: Vec<Cloud>,
}

impl Scenery {
    pub fn new(bounds: &Bounds, rng: &mut GameRng) -> Self {
        Self {
            clouds: (0..CLOUD_COUNT).map(|_| Cloud::new(bounds, rng)).collect(),
        }
    }

    pub fn update(&mut self, delta_ms: f32, bounds: &Bounds, rng: &mut GameRng) {
        for cloud in &mut self.clouds {
            cloud.update(delta_ms, bounds, rng);
        }
    }
}
