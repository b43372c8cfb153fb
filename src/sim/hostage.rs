//! Captives waiting for rescue

use glam::Vec2;

use super::services::WorldServices;
use crate::Rect;
use crate::consts::*;

/// Deleted once this far past the left edge
const EXIT_MARGIN: f32 = 50.0;

#[derive(Debug, Clone)]
pub struct Hostage {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub rescued: bool,
    /// Run direction once freed (-1 = left)
    pub direction: f32,
    /// Age (ms), drives the bob and the escape stride
    pub bob_timer_ms: f32,
    pub marked_for_deletion: bool,
}

impl Hostage {
    /// Place a hostage standing on the ground at `x`
    pub fn new(x: f32, ground_y: f32) -> Self {
        Self {
            pos: Vec2::new(x, ground_y - HOSTAGE_HEIGHT),
            size: Vec2::new(HOSTAGE_WIDTH, HOSTAGE_HEIGHT),
            rescued: false,
            direction: -1.0,
            bob_timer_ms: 0.0,
            marked_for_deletion: false,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn update(&mut self, delta_ms: f32) {
        let dt = delta_ms / 1000.0;
        self.bob_timer_ms += delta_ms;
        if self.rescued {
            let stride = HOSTAGE_ESCAPE_SPEED + (self.bob_timer_ms / 160.0).sin() * 20.0;
            self.pos.x += self.direction * stride * dt;
            if self.pos.x + self.size.x < -EXIT_MARGIN {
                self.marked_for_deletion = true;
            }
        }
    }

    /// Free the hostage. Returns false if already rescued.
    pub fn rescue(&mut self, services: &mut dyn WorldServices) -> bool {
        if self.rescued {
            return false;
        }
        self.rescued = true;
        let center = self.rect().center();
        services.add_particles(center.x, center.y, 16, 0xffd166);
        true
    }

    /// Vertical draw offset
    pub fn bob_offset(&self) -> f32 {
        let amplitude = if self.rescued { 6.0 } else { 4.0 };
        ((self.bob_timer_ms / 1000.0) * std::f32::consts::TAU).sin() * amplitude
    }
}
