//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only
//! - Entities reach the world through [`WorldServices`] and never hold it
//! - No rendering or platform dependencies

pub mod collision;
pub mod enemy;
pub mod explosion;
pub mod grenade;
pub mod hostage;
pub mod particle;
pub mod player;
pub mod pool;
pub mod powerup;
pub mod projectile;
pub mod rng;
pub mod scenery;
pub mod services;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Bounds, rects_overlap, within_radius};
pub use enemy::{Enemy, EnemyKind};
pub use explosion::{Explosion, ExplosionSpec};
pub use grenade::Grenade;
pub use hostage::Hostage;
pub use particle::Particle;
pub use player::{Player, WeaponKind};
pub use pool::BoundedPool;
pub use powerup::{PowerUp, PowerUpKind};
pub use projectile::{Projectile, ProjectileSpec};
pub use rng::GameRng;
pub use scenery::{Cloud, Scenery};
pub use services::{CommandBuffer, WorldCommand, WorldServices};
pub use state::{GameEvent, GamePhase, World, score_line};
pub use tick::tick;
