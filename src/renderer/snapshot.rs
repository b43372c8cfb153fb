//! Flat, backend-agnostic description of one frame

use std::f32::consts::PI;

use glam::Vec2;
use serde::Serialize;

use crate::Rect;
use crate::consts::{PLAYER_HIT_FLASH_MS, SCREEN_FLASH_MS};
use crate::sim::{GamePhase, World};

/// Peak opacity of the red damage overlay
pub const SCREEN_FLASH_OPACITY: f32 = 0.35;

/// Unpack a `0xRRGGBB` colour into linear-ish RGBA floats
pub fn rgba(hex: u32, alpha: f32) -> [f32; 4] {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    [r, g, b, alpha.clamp(0.0, 1.0)]
}

/// Paint layer, in back-to-front order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Layer {
    Scenery,
    PowerUp,
    Hostage,
    Enemy,
    Player,
    Grenade,
    Projectile,
    Explosion,
    Particle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Shape {
    Rect(Rect),
    Circle { center: Vec2, radius: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawItem {
    pub layer: Layer,
    pub shape: Shape,
    pub color: [f32; 4],
    /// Short text drawn centred on the shape (power-up letters)
    pub label: Option<&'static str>,
}

impl DrawItem {
    fn rect(layer: Layer, rect: Rect, color: [f32; 4]) -> Self {
        Self {
            layer,
            shape: Shape::Rect(rect),
            color,
            label: None,
        }
    }

    fn circle(layer: Layer, center: Vec2, radius: f32, color: [f32; 4]) -> Self {
        Self {
            layer,
            shape: Shape::Circle { center, radius },
            color,
            label: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub score: u64,
    pub best_score: u64,
    pub lives: u32,
    pub max_lives: u32,
    pub grenades: i32,
    pub weapon_label: &'static str,
    /// Remaining fraction of a timed weapon; `None` for the pistol
    pub weapon_ratio: Option<f32>,
    /// Show the controls hint line
    pub show_controls: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub width: f32,
    pub height: f32,
    pub ground_y: f32,
    pub phase: GamePhase,
    /// World clock, drives the grass sway
    pub elapsed_secs: f32,
    /// Cloud puffs behind everything else
    pub clouds: Vec<DrawItem>,
    /// Entities in painter order
    pub items: Vec<DrawItem>,
    /// Remaining damage flash, 1 right after a hit fading to 0
    pub screen_flash: f32,
    pub hud: Hud,
}

impl FrameSnapshot {
    pub fn capture(world: &World) -> Self {
        let playing = world.phase == GamePhase::Playing;
        let mut items = Vec::with_capacity(
            world.power_ups.len()
                + world.hostages.len()
                + world.enemies.len()
                + 1
                + world.grenades.len()
                + world.projectiles.len()
                + world.explosions.len()
                + world.particles.len(),
        );

        for power_up in &world.power_ups {
            let config = power_up.config();
            let mut rect = power_up.rect();
            rect.y += power_up.bob_offset();
            items.push(DrawItem {
                label: Some(config.label),
                ..DrawItem::rect(Layer::PowerUp, rect, rgba(config.color, 1.0))
            });
        }

        for hostage in &world.hostages {
            let mut rect = hostage.rect();
            rect.y += hostage.bob_offset();
            let color = if hostage.rescued { 0xffb703 } else { 0xf4a261 };
            items.push(DrawItem::rect(Layer::Hostage, rect, rgba(color, 1.0)));
        }

        for enemy in &world.enemies {
            let color = enemy.kind.stats().color;
            items.push(DrawItem::rect(
                Layer::Enemy,
                enemy.rect(),
                rgba(color, enemy.flash_alpha()),
            ));
        }

        let player = &world.player;
        let (bob_rate, bob_amplitude) = if playing { (12.0, 1.8) } else { (4.0, 3.5) };
        let mut player_rect = player.rect();
        player_rect.y += (player.idle_timer * bob_rate).sin() * bob_amplitude;
        let player_alpha = if player.hit_flash_ms > 0.0 {
            0.6 + 0.4 * ((player.hit_flash_ms / PLAYER_HIT_FLASH_MS) * PI).sin()
        } else {
            1.0
        };
        items.push(DrawItem::rect(
            Layer::Player,
            player_rect,
            rgba(0x2d6a4f, player_alpha),
        ));

        for grenade in world.grenades.iter() {
            items.push(DrawItem::rect(Layer::Grenade, grenade.rect(), rgba(0x2b9348, 1.0)));
        }

        for projectile in world.projectiles.iter() {
            items.push(DrawItem::rect(
                Layer::Projectile,
                projectile.rect(),
                rgba(projectile.color, 1.0),
            ));
        }

        for explosion in &world.explosions {
            let fade = 1.0 - explosion.progress();
            items.push(DrawItem::circle(
                Layer::Explosion,
                explosion.center,
                explosion.visual_radius(),
                rgba(0xff9636, 0.9 * fade),
            ));
        }

        for particle in world.particles.iter() {
            items.push(DrawItem::circle(
                Layer::Particle,
                particle.pos,
                particle.radius,
                rgba(particle.color, particle.alpha()),
            ));
        }

        let clouds = world
            .scenery
            .clouds
            .iter()
            .map(|cloud| {
                DrawItem::circle(Layer::Scenery, cloud.pos, 26.0 * cloud.scale, rgba(0xffffff, 0.2))
            })
            .collect();

        Self {
            width: world.bounds.width,
            height: world.bounds.height,
            ground_y: world.bounds.ground_y,
            phase: world.phase,
            elapsed_secs: world.elapsed_secs,
            clouds,
            items,
            screen_flash: (world.flash_timer_ms / SCREEN_FLASH_MS).max(0.0),
            hud: Hud {
                score: world.score,
                best_score: world.best_score,
                lives: world.lives,
                max_lives: world.tuning.max_lives,
                grenades: player.grenades,
                weapon_label: player.weapon_label(),
                weapon_ratio: player.weapon_ratio(),
                show_controls: playing,
            },
        }
    }

    /// Grass tuft heights along the ground line, swaying with time
    pub fn grass_heights(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        (0..)
            .map(|i| i as f32 * 42.0)
            .take_while(|x| *x < self.width)
            .map(move |x| (x, 12.0 + ((x / 50.0 + self.elapsed_secs) * 2.0).sin() * 6.0))
    }
}

/// Centre offsets and radii of the three puffs making up a cloud
pub fn puff_offsets(scale: f32) -> [(Vec2, f32); 3] {
    [
        (Vec2::ZERO, 26.0 * scale),
        (Vec2::new(26.0, -8.0) * scale, 24.0 * scale),
        (Vec2::new(52.0, 2.0) * scale, 26.0 * scale),
    ]
}
