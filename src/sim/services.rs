//! The narrow view of the world that entities act through
//!
//! Entities never hold the world. During a phase they push requests into a
//! [`CommandBuffer`]; the world applies them once the phase has finished
//! iterating, so spawns never land in a collection mid-iteration.

use std::collections::VecDeque;

use super::collision::Bounds;
use super::enemy::EnemyKind;
use super::explosion::ExplosionSpec;
use super::projectile::ProjectileSpec;
use super::rng::GameRng;
use super::state::GamePhase;

/// A deferred request against the world
#[derive(Debug, Clone, PartialEq)]
pub enum WorldCommand {
    SpawnProjectile {
        x: f32,
        y: f32,
        direction: f32,
        spec: ProjectileSpec,
    },
    SpawnGrenade {
        x: f32,
        y: f32,
        direction: f32,
    },
    SpawnExplosion {
        x: f32,
        y: f32,
        spec: ExplosionSpec,
    },
    AddParticles {
        x: f32,
        y: f32,
        count: u32,
        color: u32,
    },
    AddScore(u64),
    GainLife(u32),
    /// Damage to the player (subject to the damage cooldown)
    TakeDamage(u32),
    TrySpawnDrop {
        x: f32,
        y: f32,
        kind: EnemyKind,
    },
    DamageEnemiesInRadius {
        x: f32,
        y: f32,
        radius: f32,
        damage: i32,
    },
}

/// Capabilities an entity may use while updating
pub trait WorldServices {
    /// Uniform draw in [0, 1) from the run RNG
    fn random(&mut self) -> f32;
    fn phase(&self) -> GamePhase;
    fn bounds(&self) -> Bounds;

    fn spawn_projectile(&mut self, x: f32, y: f32, direction: f32, spec: ProjectileSpec);
    fn spawn_grenade(&mut self, x: f32, y: f32, direction: f32);
    fn spawn_explosion(&mut self, x: f32, y: f32, spec: ExplosionSpec);
    fn add_particles(&mut self, x: f32, y: f32, count: u32, color: u32);
    fn add_score(&mut self, points: u64);
    fn gain_life(&mut self, amount: u32);
    fn take_damage(&mut self, amount: u32);
    fn try_spawn_drop(&mut self, x: f32, y: f32, kind: EnemyKind);
    fn damage_enemies_in_radius(&mut self, x: f32, y: f32, radius: f32, damage: i32);
}

/// Queues requests for the world to apply after the current phase
pub struct CommandBuffer<'a> {
    rng: &'a mut GameRng,
    queue: &'a mut VecDeque<WorldCommand>,
    phase: GamePhase,
    bounds: Bounds,
}

impl<'a> CommandBuffer<'a> {
    pub fn new(
        rng: &'a mut GameRng,
        queue: &'a mut VecDeque<WorldCommand>,
        phase: GamePhase,
        bounds: Bounds,
    ) -> Self {
        Self {
            rng,
            queue,
            phase,
            bounds,
        }
    }

    fn push(&mut self, command: WorldCommand) {
        self.queue.push_back(command);
    }
}

impl WorldServices for CommandBuffer<'_> {
    fn random(&mut self) -> f32 {
        self.rng.next_f32()
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn spawn_projectile(&mut self, x: f32, y: f32, direction: f32, spec: ProjectileSpec) {
        self.push(WorldCommand::SpawnProjectile {
            x,
            y,
            direction,
            spec,
        });
    }

    fn spawn_grenade(&mut self, x: f32, y: f32, direction: f32) {
        self.push(WorldCommand::SpawnGrenade { x, y, direction });
    }

    fn spawn_explosion(&mut self, x: f32, y: f32, spec: ExplosionSpec) {
        self.push(WorldCommand::SpawnExplosion { x, y, spec });
    }

    fn add_particles(&mut self, x: f32, y: f32, count: u32, color: u32) {
        self.push(WorldCommand::AddParticles { x, y, count, color });
    }

    fn add_score(&mut self, points: u64) {
        self.push(WorldCommand::AddScore(points));
    }

    fn gain_life(&mut self, amount: u32) {
        self.push(WorldCommand::GainLife(amount));
    }

    fn take_damage(&mut self, amount: u32) {
        self.push(WorldCommand::TakeDamage(amount));
    }

    fn try_spawn_drop(&mut self, x: f32, y: f32, kind: EnemyKind) {
        self.push(WorldCommand::TrySpawnDrop { x, y, kind });
    }

    fn damage_enemies_in_radius(&mut self, x: f32, y: f32, radius: f32, damage: i32) {
        self.push(WorldCommand::DamageEnemiesInRadius {
            x,
            y,
            radius,
            damage,
        });
    }
}

/// Owns its RNG and queue so entities can be exercised without a world
#[cfg(test)]
pub(crate) struct TestServices {
    pub rng: GameRng,
    pub commands: VecDeque<WorldCommand>,
    pub phase: GamePhase,
    pub bounds: Bounds,
}

#[cfg(test)]
impl TestServices {
    pub fn new() -> Self {
        Self {
            rng: GameRng::new(7),
            commands: VecDeque::new(),
            phase: GamePhase::Playing,
            bounds: Bounds::new(960.0, 540.0, 430.0),
        }
    }

    pub fn buffer(&mut self) -> CommandBuffer<'_> {
        CommandBuffer::new(&mut self.rng, &mut self.commands, self.phase, self.bounds)
    }

    pub fn take(&mut self) -> Vec<WorldCommand> {
        self.commands.drain(..).collect()
    }
}
