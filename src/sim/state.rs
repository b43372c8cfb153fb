//! World state and the operations entities request through commands
//!
//! Everything a run needs lives in [`World`]. The RNG is seeded from the
//! tuning so a run replays identically given the same inputs.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Bounds, within_radius};
use super::enemy::{Enemy, EnemyKind};
use super::explosion::{Explosion, ExplosionSpec};
use super::grenade::Grenade;
use super::hostage::Hostage;
use super::particle::Particle;
use super::player::{Player, WeaponKind};
use super::pool::BoundedPool;
use super::powerup::{PowerUp, PowerUpKind};
use super::projectile::{Projectile, ProjectileSpec};
use super::rng::GameRng;
use super::scenery::Scenery;
use super::services::{CommandBuffer, WorldCommand};
use super::spawn::{DropOutcome, resolve_drop, roll_enemy_kind};
use crate::consts::*;
use crate::input::InputState;
use crate::tuning::Tuning;

/// Hostage interval before the first run
const INITIAL_HOSTAGE_INTERVAL_MS: f32 = 9000.0;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing spawns
    #[default]
    Start,
    /// Active gameplay
    Playing,
    /// Run ended; the world keeps animating but ignores input
    GameOver,
}

/// Notifications for the host, drained once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    RunStarted,
    GameOver { score: u64, best_score: u64 },
    PlayerHit { lives: u32 },
    HostageRescued,
    PowerUpCollected { kind: PowerUpKind },
}

/// Text shown on the game-over screen
pub fn score_line(score: u64, best_score: u64) -> String {
    format!("Score: {score}  Best: {best_score}")
}

#[derive(Debug, Clone)]
pub struct World {
    pub tuning: Tuning,
    pub bounds: Bounds,
    pub phase: GamePhase,

    pub player: Player,
    pub projectiles: BoundedPool<Projectile>,
    pub particles: BoundedPool<Particle>,
    pub grenades: BoundedPool<Grenade>,
    pub explosions: Vec<Explosion>,
    pub power_ups: Vec<PowerUp>,
    pub hostages: Vec<Hostage>,
    pub enemies: Vec<Enemy>,
    pub scenery: Scenery,

    pub score: u64,
    /// Highest score this process has seen; survives restarts
    pub best_score: u64,
    pub lives: u32,

    pub spawn_timer_ms: f32,
    pub spawn_interval_ms: f32,
    pub hostage_timer_ms: f32,
    pub hostage_interval_ms: f32,
    /// Remaining invulnerability after a hit (ms)
    pub damage_cooldown_ms: f32,
    /// Remaining red screen flash (ms)
    pub flash_timer_ms: f32,
    /// Seconds since the world was created
    pub elapsed_secs: f32,

    pub(crate) rng: GameRng,
    pub(crate) commands: VecDeque<WorldCommand>,
    events: Vec<GameEvent>,
    /// Never reset, so ids stay unique for the life of the world
    next_enemy_id: u32,
}

impl World {
    pub fn new(tuning: Tuning) -> Self {
        let bounds = Bounds::from_tuning(&tuning);
        let mut rng = GameRng::new(tuning.seed);
        let scenery = Scenery::new(&bounds, &mut rng);
        Self {
            bounds,
            phase: GamePhase::Start,
            player: Player::new(&tuning),
            projectiles: BoundedPool::new(tuning.projectile_pool),
            particles: BoundedPool::new(tuning.particle_pool),
            grenades: BoundedPool::new(tuning.grenade_pool),
            explosions: Vec::new(),
            power_ups: Vec::new(),
            hostages: Vec::new(),
            enemies: Vec::new(),
            scenery,
            score: 0,
            best_score: 0,
            lives: tuning.starting_lives.min(tuning.max_lives),
            spawn_timer_ms: 0.0,
            spawn_interval_ms: tuning.spawn_interval_ms,
            hostage_timer_ms: 0.0,
            hostage_interval_ms: INITIAL_HOSTAGE_INTERVAL_MS,
            damage_cooldown_ms: 0.0,
            flash_timer_ms: 0.0,
            elapsed_secs: 0.0,
            rng,
            commands: VecDeque::new(),
            events: Vec::new(),
            next_enemy_id: 1,
            tuning,
        }
    }

    /// Advance one frame
    pub fn update(&mut self, delta_ms: f32, input: &InputState) {
        super::tick::tick(self, input, delta_ms);
    }

    /// Clear the field for a new run. Best score is kept.
    pub fn reset(&mut self) {
        self.player.reset(&self.bounds);
        self.projectiles.clear();
        self.particles.clear();
        self.grenades.clear();
        self.explosions.clear();
        self.power_ups.clear();
        self.hostages.clear();
        self.enemies.clear();
        self.commands.clear();
        self.scenery = Scenery::new(&self.bounds, &mut self.rng);
        self.score = 0;
        self.lives = self.tuning.starting_lives.min(self.tuning.max_lives);
        self.spawn_timer_ms = 0.0;
        self.spawn_interval_ms = self.tuning.spawn_interval_ms;
        self.hostage_timer_ms = 0.0;
        self.hostage_interval_ms = self.rng.range(8000.0, 10000.0);
        self.damage_cooldown_ms = 0.0;
        self.flash_timer_ms = 0.0;
    }

    pub fn start(&mut self) {
        self.reset();
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::RunStarted);
        log::info!("Run started (seed {:#x}, best {})", self.rng.seed(), self.best_score);
    }

    /// Start a new run from the title or game-over screen. Returns false
    /// (and does nothing) mid-run.
    pub fn request_restart(&mut self) -> bool {
        match self.phase {
            GamePhase::Start | GamePhase::GameOver => {
                self.start();
                true
            }
            GamePhase::Playing => false,
        }
    }

    pub fn end_game(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.best_score = self.best_score.max(self.score);
        self.events.push(GameEvent::GameOver {
            score: self.score,
            best_score: self.best_score,
        });
        log::info!("Game over: score {} best {}", self.score, self.best_score);
    }

    pub fn final_score_text(&self) -> String {
        score_line(self.score, self.best_score)
    }

    /// Take every event raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hostages still waiting to be freed
    pub fn waiting_hostages(&self) -> usize {
        self.hostages.iter().filter(|h| !h.rescued).count()
    }

    /// Apply queued entity requests until the queue is empty. Applying a
    /// command may queue more (a blast kills an enemy which drops loot).
    pub(crate) fn flush_commands(&mut self) {
        while let Some(command) = self.commands.pop_front() {
            self.apply_command(command);
        }
    }

    fn apply_command(&mut self, command: WorldCommand) {
        match command {
            WorldCommand::SpawnProjectile {
                x,
                y,
                direction,
                spec,
            } => self.spawn_projectile(x, y, direction, spec),
            WorldCommand::SpawnGrenade { x, y, direction } => self.spawn_grenade(x, y, direction),
            WorldCommand::SpawnExplosion { x, y, spec } => self.spawn_explosion(x, y, spec),
            WorldCommand::AddParticles { x, y, count, color } => {
                self.add_particles(x, y, count, color)
            }
            WorldCommand::AddScore(points) => self.add_score(points),
            WorldCommand::GainLife(amount) => self.gain_life(amount),
            WorldCommand::TakeDamage(amount) => self.take_damage(amount),
            WorldCommand::TrySpawnDrop { x, y, kind } => self.try_spawn_drop(x, y, kind),
            WorldCommand::DamageEnemiesInRadius {
                x,
                y,
                radius,
                damage,
            } => self.damage_enemies_in_radius(x, y, radius, damage),
        }
    }

    pub fn spawn_projectile(&mut self, x: f32, y: f32, direction: f32, spec: ProjectileSpec) {
        self.projectiles.push(Projectile::new(x, y, direction, spec));
    }

    pub fn spawn_grenade(&mut self, x: f32, y: f32, direction: f32) {
        let grenade = Grenade::new(x, y, direction, &mut self.rng);
        self.grenades.push(grenade);
    }

    pub fn spawn_explosion(&mut self, x: f32, y: f32, spec: ExplosionSpec) {
        self.explosions.push(Explosion::new(x, y, spec));
        self.add_particles(x, y, 18, 0xffb703);
    }

    pub fn add_particles(&mut self, x: f32, y: f32, count: u32, color: u32) {
        for _ in 0..count {
            let particle = Particle::new(x, y, color, &mut self.rng);
            self.particles.push(particle);
        }
    }

    /// Damage every live enemy whose centre lies within `radius`
    pub fn damage_enemies_in_radius(&mut self, x: f32, y: f32, radius: f32, damage: i32) {
        let center = Vec2::new(x, y);
        let (phase, bounds) = (self.phase, self.bounds);
        for enemy in &mut self.enemies {
            if enemy.marked_for_deletion {
                continue;
            }
            if within_radius(enemy.rect().center(), center, radius) {
                let mut services =
                    CommandBuffer::new(&mut self.rng, &mut self.commands, phase, bounds);
                enemy.take_damage(damage, &mut services);
            }
        }
        self.flush_commands();
    }

    /// Roll loot for a destroyed enemy at `(x, y)`
    pub fn try_spawn_drop(&mut self, x: f32, y: f32, kind: EnemyKind) {
        let roll = self.rng.next_f32();
        match resolve_drop(roll, kind) {
            DropOutcome::PowerUp(loot) => {
                log::debug!("{:?} dropped {}", kind, loot.name());
                self.power_ups
                    .push(PowerUp::new(x - POWERUP_WIDTH / 2.0, (y - 36.0).max(40.0), loot));
            }
            DropOutcome::Hostage if self.hostages.len() < MAX_WAITING_HOSTAGES => {
                let offset = self.rng.next_f32() * 120.0 - 60.0;
                self.spawn_hostage(Some(x + offset));
            }
            DropOutcome::Hostage | DropOutcome::Nothing => {}
        }
    }

    /// Place a hostage at `x`, or just past the right edge when `x` is
    /// missing or too far left to reach safely
    pub fn spawn_hostage(&mut self, x: Option<f32>) {
        let offscreen = self.bounds.width + 80.0;
        let x = match x {
            Some(x) if x >= self.bounds.width * 0.6 => x,
            _ => offscreen,
        };
        log::debug!("Hostage spawned at x={x:.0}");
        self.hostages.push(Hostage::new(x, self.bounds.ground_y));
    }

    /// Free the hostage at `index` and pay out the reward
    pub fn rescue_hostage(&mut self, index: usize) -> bool {
        let (phase, bounds) = (self.phase, self.bounds);
        let Some(hostage) = self.hostages.get_mut(index) else {
            return false;
        };
        let mut services = CommandBuffer::new(&mut self.rng, &mut self.commands, phase, bounds);
        if !hostage.rescue(&mut services) {
            return false;
        }
        self.flush_commands();

        self.add_score(RESCUE_SCORE);
        self.player.add_grenades(RESCUE_GRENADES);
        if self.lives < self.tuning.max_lives {
            self.gain_life(1);
        } else {
            self.add_score(RESCUE_FULL_LIVES_SCORE);
        }
        self.events.push(GameEvent::HostageRescued);
        log::debug!("Hostage rescued, score {}", self.score);
        true
    }

    /// Spawn one enemy, weighted toward tougher kinds as the score grows
    pub fn add_enemy(&mut self) {
        let kind = roll_enemy_kind(self.rng.next_f32(), self.score);
        let id = self.next_enemy_id;
        self.next_enemy_id += 1;
        let enemy = Enemy::new(id, kind, &self.bounds, &mut self.rng);
        self.enemies.push(enemy);
    }

    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
        self.best_score = self.best_score.max(self.score);
    }

    pub fn gain_life(&mut self, amount: u32) {
        let previous = self.lives;
        self.lives = self.lives.saturating_add(amount).min(self.tuning.max_lives);
        if self.lives > previous {
            let x = self.player.rect().center().x;
            let y = self.player.pos.y + 10.0;
            self.add_particles(x, y, 14, 0xffcad4);
        }
    }

    /// Hurt the player. Ignored while the post-hit cooldown runs.
    pub fn take_damage(&mut self, amount: u32) {
        if self.damage_cooldown_ms > 0.0 {
            return;
        }
        self.lives = self.lives.saturating_sub(amount);
        self.damage_cooldown_ms = self.tuning.damage_cooldown_ms;
        self.flash_timer_ms = SCREEN_FLASH_MS;
        self.player.take_hit();
        self.player.set_weapon(WeaponKind::Pistol, 0.0);
        let center = self.player.rect().center();
        self.add_particles(center.x, center.y, 10, 0xf94144);
        self.events.push(GameEvent::PlayerHit { lives: self.lives });
        log::debug!("Player hit for {amount}, {} lives left", self.lives);
        if self.lives == 0 {
            self.end_game();
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn playing_world() -> World {
        let mut world = World::default();
        world.start();
        world
    }

    #[test]
    fn test_lethal_hit_ends_run() {
        let mut world = playing_world();
        world.lives = 1;
        world.take_damage(1);
        assert_eq!(world.lives, 0);
        assert_eq!(world.phase, GamePhase::GameOver);
        assert_eq!(world.player.weapon, WeaponKind::Pistol);
        assert!(world.drain_events().contains(&GameEvent::GameOver {
            score: 0,
            best_score: 0
        }));
    }

    #[test]
    fn test_cooldown_blocks_second_hit() {
        let mut world = playing_world();
        world.take_damage(1);
        world.take_damage(1);
        assert_eq!(world.lives, 2);
        assert_eq!(world.flash_timer_ms, SCREEN_FLASH_MS);

        world.damage_cooldown_ms = 0.0;
        world.take_damage(5);
        assert_eq!(world.lives, 0);
    }

    #[test]
    fn test_end_game_idempotent() {
        let mut world = playing_world();
        world.add_score(300);
        world.end_game();
        world.add_score(50);
        world.end_game();
        let game_overs = world
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
        assert_eq!(world.final_score_text(), "Score: 350  Best: 350");
    }

    #[test]
    fn test_restart_keeps_best_score() {
        let mut world = World::default();
        assert!(world.request_restart());
        assert!(!world.request_restart());

        world.add_score(900);
        world.lives = 1;
        world.take_damage(1);
        assert_eq!(world.phase, GamePhase::GameOver);

        assert!(world.request_restart());
        assert_eq!(world.phase, GamePhase::Playing);
        assert_eq!(world.score, 0);
        assert_eq!(world.lives, 3);
        assert_eq!(world.best_score, 900);
        assert!(world.enemies.is_empty());
        assert!((8000.0..10000.0).contains(&world.hostage_interval_ms));
    }

    #[test]
    fn test_projectile_pool_evicts_oldest() {
        let mut world = World::default();
        for i in 0..145 {
            world.spawn_projectile(
                i as f32,
                0.0,
                1.0,
                ProjectileSpec {
                    damage: i,
                    ..Default::default()
                },
            );
        }
        assert_eq!(world.projectiles.len(), MAX_PROJECTILES);
        // Spawns 0..=4 were evicted, the 6th spawned is now oldest
        assert_eq!(world.projectiles.front().map(|p| p.damage), Some(5));
    }

    #[test]
    fn test_particle_pool_capped() {
        let mut world = World::default();
        world.add_particles(0.0, 0.0, 500, 0xffffff);
        assert_eq!(world.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_heavy_drop_rate_and_bands() {
        let mut world = World::default();
        let trials = 10_000;
        for _ in 0..trials {
            world.try_spawn_drop(400.0, 300.0, EnemyKind::Heavy);
        }
        let drops = world.power_ups.len() as f32;
        let rate = drops / trials as f32;
        assert!((rate - 0.35).abs() < 0.02, "drop rate {rate}");

        let share = |kind: PowerUpKind| {
            world.power_ups.iter().filter(|p| p.kind == kind).count() as f32 / drops
        };
        assert!((share(PowerUpKind::Grenade) - 0.2).abs() < 0.03);
        assert!((share(PowerUpKind::Spread) - 0.25).abs() < 0.03);
        assert!((share(PowerUpKind::Heavy) - 0.25).abs() < 0.03);
        assert!((share(PowerUpKind::Laser) - 0.18).abs() < 0.03);
        assert!((share(PowerUpKind::Life) - 0.12).abs() < 0.03);
        assert!(world.hostages.len() <= MAX_WAITING_HOSTAGES);
    }

    #[test]
    fn test_drop_position() {
        let mut world = World::default();
        while world.power_ups.is_empty() {
            world.try_spawn_drop(400.0, 50.0, EnemyKind::Aerial);
        }
        let drop = &world.power_ups[0];
        assert_eq!(drop.pos.x, 383.0);
        assert_eq!(drop.pos.y, 40.0);
    }

    #[test]
    fn test_hostage_spawn_position() {
        let mut world = World::default();
        world.spawn_hostage(Some(100.0));
        world.spawn_hostage(Some(700.0));
        world.spawn_hostage(None);
        let xs: Vec<f32> = world.hostages.iter().map(|h| h.pos.x).collect();
        assert_eq!(xs, vec![1040.0, 700.0, 1040.0]);
    }

    #[test]
    fn test_rescue_rewards() {
        let mut world = playing_world();
        world.spawn_hostage(None);
        let grenades = world.player.grenades;
        assert!(world.rescue_hostage(0));
        assert!(!world.rescue_hostage(0));
        assert_eq!(world.score, RESCUE_SCORE);
        assert_eq!(world.lives, 4);
        assert_eq!(world.player.grenades, grenades + RESCUE_GRENADES);

        world.lives = world.tuning.max_lives;
        world.spawn_hostage(None);
        assert!(world.rescue_hostage(1));
        assert_eq!(world.score, 2 * RESCUE_SCORE + RESCUE_FULL_LIVES_SCORE);
        assert_eq!(world.lives, world.tuning.max_lives);
    }

    #[test]
    fn test_gain_life_particles_only_when_gained() {
        let mut world = World::default();
        world.gain_life(1);
        assert_eq!(world.particles.len(), 14);
        world.lives = world.tuning.max_lives;
        world.gain_life(1);
        assert_eq!(world.particles.len(), 14);
    }

    #[test]
    fn test_blast_kills_enemy_and_scores() {
        let mut world = playing_world();
        world.add_enemy();
        let center = world.enemies[0].rect().center();
        let health = world.enemies[0].health;
        world.damage_enemies_in_radius(center.x + 50.0, center.y, 60.0, health);
        assert!(world.enemies[0].marked_for_deletion);
        assert_eq!(world.score, world.enemies[0].score);

        // Out of range
        world.add_enemy();
        let far = world.enemies[1].rect().center();
        world.damage_enemies_in_radius(far.x + 61.0, far.y, 60.0, 99);
        assert!(!world.enemies[1].marked_for_deletion);
    }

    #[test]
    fn test_enemy_ids_unique_across_runs() {
        let mut world = playing_world();
        world.add_enemy();
        world.add_enemy();
        let first = world.enemies[1].id;
        world.end_game();
        world.request_restart();
        world.add_enemy();
        assert!(world.enemies[0].id > first);
    }

    proptest! {
        #[test]
        fn prop_lives_never_below_zero(hits in proptest::collection::vec(0u32..6, 1..20)) {
            let mut world = playing_world();
            for amount in hits {
                world.damage_cooldown_ms = 0.0;
                world.take_damage(amount);
                prop_assert!(world.lives <= world.tuning.max_lives);
            }
            if world.lives == 0 {
                prop_assert_eq!(world.phase, GamePhase::GameOver);
            }
        }
    }
}
