//! Hostile soldiers and aircraft advancing from the right

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Bounds;
use super::projectile::ProjectileSpec;
use super::rng::GameRng;
use super::services::WorldServices;
use super::state::GamePhase;
use crate::Rect;
use crate::consts::ENEMY_HIT_FLASH_MS;
use crate::count_down;

/// Enemies only open fire once this far inside the right edge
const FIRE_LINE_INSET: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnemyKind {
    #[default]
    Grunt,
    Heavy,
    Aerial,
}

/// Per-kind constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub health: i32,
    pub shoot_delay_ms: f32,
    pub shoot_variance_ms: f32,
    pub score: u64,
    pub color: u32,
    pub weapon_color: u32,
}

impl EnemyKind {
    pub fn stats(&self) -> EnemyStats {
        match self {
            EnemyKind::Grunt => EnemyStats {
                width: 54.0,
                height: 62.0,
                speed: 140.0,
                health: 2,
                shoot_delay_ms: 1400.0,
                shoot_variance_ms: 500.0,
                score: 120,
                color: 0xe36414,
                weapon_color: 0xe9c46a,
            },
            EnemyKind::Heavy => EnemyStats {
                width: 68.0,
                height: 78.0,
                speed: 90.0,
                health: 4,
                shoot_delay_ms: 1700.0,
                shoot_variance_ms: 500.0,
                score: 250,
                color: 0xbb3e03,
                weapon_color: 0xf2cc8f,
            },
            EnemyKind::Aerial => EnemyStats {
                width: 96.0,
                height: 48.0,
                speed: 160.0,
                health: 6,
                shoot_delay_ms: 1500.0,
                shoot_variance_ms: 700.0,
                score: 320,
                color: 0x1d3557,
                weapon_color: 0xa8dadc,
            },
        }
    }

    /// How far past the left edge the enemy may travel before it counts as
    /// having broken through
    pub fn exit_margin(&self) -> f32 {
        match self {
            EnemyKind::Aerial => 120.0,
            EnemyKind::Grunt | EnemyKind::Heavy => 80.0,
        }
    }

    /// Chance that destroying this kind drops loot
    pub fn drop_chance(&self) -> f32 {
        match self {
            EnemyKind::Grunt => 0.22,
            EnemyKind::Heavy => 0.35,
            EnemyKind::Aerial => 0.4,
        }
    }

    pub fn is_airborne(&self) -> bool {
        matches!(self, EnemyKind::Aerial)
    }
}

/// Vertical bob of an aerial enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hover {
    pub base_y: f32,
    pub amplitude: f32,
    pub speed: f32,
    pub phase: f32,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    /// Unique for the lifetime of the world, used by projectile hit sets
    pub id: u32,
    pub kind: EnemyKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub health: i32,
    pub shoot_delay_ms: f32,
    pub shoot_variance_ms: f32,
    pub shoot_timer_ms: f32,
    pub score: u64,
    pub hover: Option<Hover>,
    pub hit_flash_ms: f32,
    /// Seconds alive
    pub elapsed: f32,
    pub marked_for_deletion: bool,
}

impl Enemy {
    /// Spawn just past the right edge
    pub fn new(id: u32, kind: EnemyKind, bounds: &Bounds, rng: &mut GameRng) -> Self {
        let stats = kind.stats();
        let x = bounds.width + rng.next_f32() * 80.0;
        let hover = kind.is_airborne().then(|| Hover {
            base_y: bounds.ground_y - stats.height - rng.range(120.0, 200.0),
            amplitude: rng.range(22.0, 40.0),
            speed: rng.range(1.4, 2.1),
            phase: rng.next_f32() * std::f32::consts::TAU,
        });
        let y = match hover {
            Some(hover) => hover.base_y,
            None => bounds.ground_y - stats.height,
        };
        Self {
            id,
            kind,
            pos: Vec2::new(x, y),
            size: Vec2::new(stats.width, stats.height),
            speed: stats.speed,
            health: stats.health,
            shoot_delay_ms: stats.shoot_delay_ms,
            shoot_variance_ms: stats.shoot_variance_ms,
            shoot_timer_ms: rng.range(800.0, 2000.0),
            score: stats.score,
            hover,
            hit_flash_ms: 0.0,
            elapsed: 0.0,
            marked_for_deletion: false,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn update(&mut self, delta_ms: f32, services: &mut dyn WorldServices) {
        let dt = delta_ms / 1000.0;
        self.elapsed += dt;
        self.pos.x -= self.speed * dt;
        self.shoot_timer_ms -= delta_ms;
        self.hit_flash_ms = count_down(self.hit_flash_ms, delta_ms);

        if let Some(hover) = self.hover {
            self.pos.y = hover.base_y + (self.elapsed * hover.speed + hover.phase).sin() * hover.amplitude;
        }

        let playing = services.phase() == GamePhase::Playing;
        if self.pos.x + self.size.x < -self.kind.exit_margin() {
            self.marked_for_deletion = true;
            if playing {
                services.take_damage(1);
            }
        }

        let fire_line = services.bounds().width - FIRE_LINE_INSET;
        if playing && self.shoot_timer_ms <= 0.0 && self.pos.x < fire_line {
            self.shoot(services);
            self.shoot_timer_ms = self.shoot_delay_ms + services.random() * self.shoot_variance_ms;
        }
    }

    /// Fire toward the player's side of the screen
    pub fn shoot(&mut self, services: &mut dyn WorldServices) {
        match self.kind {
            EnemyKind::Aerial => {
                services.spawn_projectile(
                    self.pos.x + self.size.x / 2.0 - 8.0,
                    self.pos.y + self.size.y - 6.0,
                    -1.0,
                    ProjectileSpec {
                        width: 14.0,
                        height: 14.0,
                        speed: 80.0,
                        vx: Some(-160.0),
                        vy: 60.0,
                        gravity: 680.0,
                        damage: 2,
                        from_enemy: true,
                        color: 0xffba08,
                        glow: 0xffd166,
                        ..Default::default()
                    },
                );
            }
            EnemyKind::Grunt | EnemyKind::Heavy => {
                let heavy = self.kind == EnemyKind::Heavy;
                services.spawn_projectile(
                    self.pos.x + 6.0,
                    self.pos.y + self.size.y * 0.6,
                    -1.0,
                    ProjectileSpec {
                        width: 16.0,
                        height: 6.0,
                        speed: if heavy { 420.0 } else { 360.0 },
                        vy: -60.0,
                        gravity: 240.0,
                        damage: if heavy { 2 } else { 1 },
                        from_enemy: true,
                        color: 0xff8c66,
                        glow: 0xffad90,
                        ..Default::default()
                    },
                );
            }
        }
    }

    /// Apply damage. A destroyed enemy scores, bursts and rolls for loot;
    /// further hits on it are ignored.
    pub fn take_damage(&mut self, amount: i32, services: &mut dyn WorldServices) {
        if self.marked_for_deletion {
            return;
        }
        self.health -= amount;
        self.hit_flash_ms = ENEMY_HIT_FLASH_MS;
        let center = self.rect().center();
        if self.health <= 0 {
            self.marked_for_deletion = true;
            services.add_score(self.score);
            let count = if self.kind == EnemyKind::Heavy { 20 } else { 12 };
            services.add_particles(center.x, center.y, count, 0xffb703);
            services.try_spawn_drop(center.x, center.y, self.kind);
        } else {
            services.add_particles(center.x, center.y, 6, 0xfb8500);
        }
    }

    /// Draw alpha while flashing from a hit
    pub fn flash_alpha(&self) -> f32 {
        if self.hit_flash_ms > 0.0 {
            0.6 + 0.4 * ((self.hit_flash_ms / ENEMY_HIT_FLASH_MS) * std::f32::consts::TAU).sin()
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::services::{TestServices, WorldCommand};

    fn enemy(kind: EnemyKind, services: &mut TestServices) -> Enemy {
        let bounds = services.bounds;
        Enemy::new(1, kind, &bounds, &mut services.rng)
    }

    #[test]
    fn test_spawn_placement() {
        let mut services = TestServices::new();
        for kind in [EnemyKind::Grunt, EnemyKind::Heavy] {
            let e = enemy(kind, &mut services);
            assert_eq!(e.rect().bottom(), services.bounds.ground_y);
            assert!(e.pos.x >= services.bounds.width);
            assert!(e.hover.is_none());
        }
        let chopper = enemy(EnemyKind::Aerial, &mut services);
        let hover = chopper.hover.unwrap();
        let lift = services.bounds.ground_y - chopper.size.y - hover.base_y;
        assert!((120.0..200.0).contains(&lift));
        assert!((800.0..2000.0).contains(&chopper.shoot_timer_ms));
    }

    #[test]
    fn test_take_damage_after_death_is_noop() {
        let mut services = TestServices::new();
        let mut grunt = enemy(EnemyKind::Grunt, &mut services);

        grunt.take_damage(1, &mut services.buffer());
        assert!(!grunt.marked_for_deletion);
        assert_eq!(services.take().len(), 1);

        grunt.take_damage(5, &mut services.buffer());
        assert!(grunt.marked_for_deletion);
        let commands = services.take();
        assert!(commands.contains(&WorldCommand::AddScore(120)));
        assert!(
            commands
                .iter()
                .any(|c| matches!(c, WorldCommand::TrySpawnDrop { kind: EnemyKind::Grunt, .. }))
        );

        grunt.take_damage(5, &mut services.buffer());
        assert!(services.take().is_empty());
    }

    #[test]
    fn test_heavy_death_burst() {
        let mut services = TestServices::new();
        let mut heavy = enemy(EnemyKind::Heavy, &mut services);
        heavy.take_damage(4, &mut services.buffer());
        let burst = services.take().into_iter().find_map(|c| match c {
            WorldCommand::AddParticles { count, color, .. } => Some((count, color)),
            _ => None,
        });
        assert_eq!(burst, Some((20, 0xffb703)));
    }

    #[test]
    fn test_breakthrough_costs_life_only_while_playing() {
        let mut services = TestServices::new();
        let mut grunt = enemy(EnemyKind::Grunt, &mut services);
        grunt.pos.x = -grunt.size.x - 79.0;
        grunt.shoot_timer_ms = f32::MAX;
        grunt.update(16.0, &mut services.buffer());
        assert!(grunt.marked_for_deletion);
        assert_eq!(services.take(), vec![WorldCommand::TakeDamage(1)]);

        services.phase = GamePhase::GameOver;
        let mut late = enemy(EnemyKind::Aerial, &mut services);
        late.pos.x = -late.size.x - 119.0;
        late.shoot_timer_ms = f32::MAX;
        late.update(16.0, &mut services.buffer());
        assert!(late.marked_for_deletion);
        assert!(services.take().is_empty());
    }

    #[test]
    fn test_holds_fire_until_inside_fire_line() {
        let mut services = TestServices::new();
        let mut grunt = enemy(EnemyKind::Grunt, &mut services);
        grunt.pos.x = services.bounds.width;
        grunt.shoot_timer_ms = 0.0;
        grunt.update(16.0, &mut services.buffer());
        assert!(services.take().is_empty());

        grunt.pos.x = 500.0;
        grunt.update(16.0, &mut services.buffer());
        let commands = services.take();
        assert_eq!(commands.len(), 1);
        match &commands[0] {
            WorldCommand::SpawnProjectile { direction, spec, .. } => {
                assert_eq!(*direction, -1.0);
                assert!(spec.from_enemy);
                assert_eq!((spec.speed, spec.vy, spec.gravity), (360.0, -60.0, 240.0));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(grunt.shoot_timer_ms >= 1400.0);
    }

    #[test]
    fn test_aerial_shot_drops() {
        let mut services = TestServices::new();
        let mut chopper = enemy(EnemyKind::Aerial, &mut services);
        chopper.shoot(&mut services.buffer());
        match services.take().as_slice() {
            [WorldCommand::SpawnProjectile { spec, .. }] => {
                assert_eq!(spec.vx, Some(-160.0));
                assert_eq!((spec.vy, spec.gravity, spec.damage), (60.0, 680.0, 2));
            }
            other => panic!("unexpected commands {other:?}"),
        }
    }
}
