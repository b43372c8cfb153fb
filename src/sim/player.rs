//! The player's soldier: movement, weapons and grenades

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Bounds;
use super::powerup::{PowerUp, PowerUpKind};
use super::projectile::ProjectileSpec;
use super::services::WorldServices;
use crate::Rect;
use crate::consts::*;
use crate::count_down;
use crate::input::{Action, InputState};
use crate::tuning::Tuning;

/// Knockback applied by `take_hit`
const HIT_KNOCKBACK_VX: f32 = 160.0;
const HIT_KNOCKBACK_VY: f32 = -280.0;

/// Spread shot fan (radians from the facing direction)
const SPREAD_ANGLES: [f32; 3] = [-0.25, 0.0, 0.25];
/// Heavy machine gun barrel offsets
const HEAVY_OFFSETS: [f32; 2] = [-6.0, 4.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeaponKind {
    #[default]
    Pistol,
    Heavy,
    Spread,
    Laser,
}

impl WeaponKind {
    /// Time between shots (ms)
    pub fn shoot_interval_ms(&self) -> f32 {
        match self {
            WeaponKind::Pistol => 180.0,
            WeaponKind::Heavy => 90.0,
            WeaponKind::Spread => 240.0,
            WeaponKind::Laser => 320.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeaponKind::Pistol => "Pistol",
            WeaponKind::Heavy => "Heavy MG",
            WeaponKind::Spread => "Shotgun",
            WeaponKind::Laser => "Laser Cannon",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    /// +1 right, -1 left
    pub facing: f32,

    pub weapon: WeaponKind,
    pub shoot_interval_ms: f32,
    pub shoot_cooldown_ms: f32,
    /// Remaining armed time of a timed weapon (ms)
    pub weapon_timer_ms: f32,
    /// Full armed time of the current weapon, for the HUD bar (ms)
    pub weapon_duration_ms: f32,

    pub grenades: i32,
    pub max_grenades: i32,
    pub starting_grenades: i32,
    pub grenade_cooldown_ms: f32,
    /// Grenade key was down last frame (one throw per press)
    pub grenade_hold: bool,

    pub hit_flash_ms: f32,
    /// Seconds alive, drives the idle bob
    pub idle_timer: f32,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        let mut player = Self {
            pos: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            vel: Vec2::ZERO,
            facing: 1.0,
            weapon: WeaponKind::Pistol,
            shoot_interval_ms: WeaponKind::Pistol.shoot_interval_ms(),
            shoot_cooldown_ms: 0.0,
            weapon_timer_ms: 0.0,
            weapon_duration_ms: 0.0,
            grenades: 0,
            max_grenades: tuning.max_grenades,
            starting_grenades: tuning.starting_grenades,
            grenade_cooldown_ms: 0.0,
            grenade_hold: false,
            hit_flash_ms: 0.0,
            idle_timer: 0.0,
        };
        player.reset(&Bounds::from_tuning(tuning));
        player
    }

    /// Back to the start of a run: standing at the left, pistol, starting grenades
    pub fn reset(&mut self, bounds: &Bounds) {
        self.pos = Vec2::new(PLAYER_START_X, bounds.ground_y - self.size.y);
        self.vel = Vec2::ZERO;
        self.facing = 1.0;
        self.shoot_cooldown_ms = 0.0;
        self.hit_flash_ms = 0.0;
        self.set_weapon(WeaponKind::Pistol, 0.0);
        self.weapon_duration_ms = 0.0;
        self.grenades = self.starting_grenades.min(self.max_grenades);
        self.grenade_cooldown_ms = 0.0;
        self.grenade_hold = false;
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn on_ground(&self, ground_y: f32) -> bool {
        self.pos.y >= ground_y - self.size.y - GROUND_TOLERANCE
    }

    /// Advance one frame. With `active` false the player only settles under
    /// gravity and ignores input.
    pub fn update(
        &mut self,
        delta_ms: f32,
        active: bool,
        input: &InputState,
        services: &mut dyn WorldServices,
    ) {
        let dt = delta_ms / 1000.0;
        self.idle_timer += dt;
        self.hit_flash_ms = count_down(self.hit_flash_ms, delta_ms);

        if self.weapon_timer_ms > 0.0 {
            self.weapon_timer_ms = count_down(self.weapon_timer_ms, delta_ms);
            if self.weapon_timer_ms == 0.0 && self.weapon != WeaponKind::Pistol {
                self.set_weapon(WeaponKind::Pistol, 0.0);
            }
        }

        self.grenade_cooldown_ms = count_down(self.grenade_cooldown_ms, delta_ms);

        let bounds = services.bounds();
        let ground_y = bounds.ground_y;

        if !active {
            self.vel.x = 0.0;
            if !self.on_ground(ground_y) {
                self.vel.y += PLAYER_GRAVITY * dt;
                self.pos.y += self.vel.y * dt;
                if self.on_ground(ground_y) {
                    self.pos.y = ground_y - self.size.y;
                    self.vel.y = 0.0;
                }
            }
            return;
        }

        let mut moving = 0.0;
        if input.action_down(Action::MoveLeft) {
            self.vel.x = -PLAYER_SPEED;
            moving = -1.0;
        } else if input.action_down(Action::MoveRight) {
            self.vel.x = PLAYER_SPEED;
            moving = 1.0;
        } else {
            self.vel.x = 0.0;
        }

        if input.action_down(Action::Jump) && self.on_ground(ground_y) {
            self.vel.y = PLAYER_JUMP_VELOCITY;
        }

        if moving != 0.0 {
            self.facing = moving;
        }

        self.shoot_cooldown_ms = count_down(self.shoot_cooldown_ms, delta_ms);

        if input.action_down(Action::Grenade) {
            if !self.grenade_hold && self.grenade_cooldown_ms == 0.0 {
                self.throw_grenade(services);
            }
            self.grenade_hold = true;
        } else {
            self.grenade_hold = false;
        }

        if input.action_down(Action::Shoot) {
            self.shoot(services);
        }

        self.pos.x += self.vel.x * dt;
        let max_x = bounds.width - self.size.x - PLAYER_EDGE_MARGIN;
        self.pos.x = self.pos.x.min(max_x).max(PLAYER_EDGE_MARGIN);

        self.vel.y += PLAYER_GRAVITY * dt;
        self.pos.y += self.vel.y * dt;
        if self.pos.y + self.size.y >= ground_y {
            self.pos.y = ground_y - self.size.y;
            self.vel.y = 0.0;
        }
    }

    /// Muzzle position for the current facing
    fn muzzle(&self) -> Vec2 {
        let offset_x = if self.facing > 0.0 {
            self.size.x - 12.0
        } else {
            -6.0
        };
        Vec2::new(self.pos.x + offset_x, self.pos.y + self.size.y * 0.45)
    }

    /// Fire the current weapon if it has cooled down
    pub fn shoot(&mut self, services: &mut dyn WorldServices) {
        if self.shoot_cooldown_ms > 0.0 {
            return;
        }
        let muzzle = self.muzzle();
        let facing = self.facing;

        match self.weapon {
            WeaponKind::Pistol => {
                services.spawn_projectile(
                    muzzle.x,
                    muzzle.y,
                    facing,
                    ProjectileSpec {
                        width: 20.0,
                        height: 6.0,
                        speed: 760.0,
                        color: 0xffe066,
                        glow: 0xfff3b0,
                        ..Default::default()
                    },
                );
                let flash_x = if facing > 0.0 { muzzle.x } else { muzzle.x + 6.0 };
                services.add_particles(flash_x, muzzle.y + 2.0, 4, 0xffef9f);
            }
            WeaponKind::Heavy => {
                for offset in HEAVY_OFFSETS {
                    services.spawn_projectile(
                        muzzle.x,
                        muzzle.y + offset,
                        facing,
                        ProjectileSpec {
                            width: 20.0,
                            height: 6.0,
                            speed: 900.0,
                            ..Default::default()
                        },
                    );
                }
                services.add_particles(muzzle.x, muzzle.y, 6, 0xffdd99);
            }
            WeaponKind::Spread => {
                let base_speed = 760.0;
                for angle in SPREAD_ANGLES {
                    let vx = angle.cos() * base_speed * facing;
                    let vy = angle.sin() * base_speed;
                    services.spawn_projectile(
                        muzzle.x,
                        muzzle.y,
                        facing,
                        ProjectileSpec {
                            width: 18.0,
                            height: 6.0,
                            speed: vx.abs(),
                            vx: Some(vx),
                            vy,
                            color: 0xffe8a3,
                            ..Default::default()
                        },
                    );
                }
                services.add_particles(muzzle.x, muzzle.y, 8, 0xffe8a3);
            }
            WeaponKind::Laser => {
                services.spawn_projectile(
                    muzzle.x,
                    muzzle.y - 4.0,
                    facing,
                    ProjectileSpec {
                        width: 26.0,
                        height: 8.0,
                        speed: 1200.0,
                        damage: 3,
                        pierce: 2,
                        life_ms: 520.0,
                        color: 0xb5179e,
                        glow: 0xf72585,
                        ..Default::default()
                    },
                );
                services.add_particles(muzzle.x, muzzle.y, 10, 0xf72585);
            }
        }
        self.shoot_cooldown_ms = self.shoot_interval_ms;
    }

    /// Arm `kind` for `duration_ms`. The pistol never expires.
    pub fn set_weapon(&mut self, kind: WeaponKind, duration_ms: f32) {
        self.weapon = kind;
        self.shoot_interval_ms = kind.shoot_interval_ms();
        self.weapon_duration_ms = duration_ms;
        self.weapon_timer_ms = if kind == WeaponKind::Pistol {
            0.0
        } else {
            duration_ms
        };
        if self.shoot_cooldown_ms > self.shoot_interval_ms {
            self.shoot_cooldown_ms = self.shoot_interval_ms;
        }
    }

    pub fn weapon_label(&self) -> &'static str {
        self.weapon.label()
    }

    /// Remaining fraction of a timed weapon, `None` for the pistol
    pub fn weapon_ratio(&self) -> Option<f32> {
        if self.weapon == WeaponKind::Pistol || self.weapon_duration_ms <= 0.0 {
            return None;
        }
        Some((self.weapon_timer_ms / self.weapon_duration_ms).clamp(0.0, 1.0))
    }

    /// Add (or remove, when negative) grenades, clamped to `[0, max_grenades]`
    pub fn add_grenades(&mut self, amount: i32) {
        self.grenades = self
            .grenades
            .saturating_add(amount)
            .min(self.max_grenades)
            .max(0);
    }

    /// Lob a grenade forward. Returns false when out of grenades.
    pub fn throw_grenade(&mut self, services: &mut dyn WorldServices) -> bool {
        if self.grenades <= 0 {
            return false;
        }
        let start_x = self.pos.x
            + if self.facing > 0.0 {
                self.size.x - 8.0
            } else {
                -12.0
            };
        let start_y = self.pos.y + self.size.y * 0.4;
        services.spawn_grenade(start_x, start_y, self.facing);
        services.add_particles(start_x, start_y, 6, 0xff9f1c);
        self.add_grenades(-1);
        self.grenade_cooldown_ms = GRENADE_THROW_DELAY_MS;
        true
    }

    /// Apply a touched power-up and flag it consumed
    pub fn collect_power_up(
        &mut self,
        power_up: &mut PowerUp,
        services: &mut dyn WorldServices,
    ) -> bool {
        if power_up.marked_for_deletion {
            return false;
        }
        let config = power_up.config();
        match power_up.kind.weapon() {
            Some(weapon) => self.set_weapon(weapon, config.duration_ms),
            None if power_up.kind == PowerUpKind::Life => services.gain_life(1),
            None => self.add_grenades(config.grenades),
        }
        if config.score > 0 {
            services.add_score(config.score);
        }
        let center = power_up.rect().center();
        services.add_particles(center.x, center.y, 12, 0xfff3b0);
        power_up.marked_for_deletion = true;
        true
    }

    /// Knockback and flash after being damaged
    pub fn take_hit(&mut self) {
        self.hit_flash_ms = PLAYER_HIT_FLASH_MS;
        self.vel.y = HIT_KNOCKBACK_VY;
        self.vel.x = -self.facing * HIT_KNOCKBACK_VX;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;
    use crate::sim::services::{TestServices, WorldCommand};
    use proptest::prelude::*;

    fn spawned_projectiles(commands: &[WorldCommand]) -> Vec<ProjectileSpec> {
        commands
            .iter()
            .filter_map(|c| match c {
                WorldCommand::SpawnProjectile { spec, .. } => Some(spec.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_spread_pickup_expires_to_pistol() {
        let mut services = TestServices::new();
        let mut player = Player::new(&Tuning::default());
        let mut power_up = PowerUp::new(0.0, 0.0, PowerUpKind::Spread);
        assert!(player.collect_power_up(&mut power_up, &mut services.buffer()));
        assert_eq!(player.weapon, WeaponKind::Spread);
        assert!(power_up.marked_for_deletion);

        let input = InputState::new();
        for _ in 0..89 {
            player.update(100.0, true, &input, &mut services.buffer());
        }
        assert_eq!(player.weapon, WeaponKind::Spread);
        player.update(100.0, true, &input, &mut services.buffer());
        assert_eq!(player.weapon, WeaponKind::Pistol);
        assert_eq!(player.shoot_interval_ms, 180.0);
    }

    #[test]
    fn test_collect_consumed_power_up_is_noop() {
        let mut services = TestServices::new();
        let mut player = Player::new(&Tuning::default());
        let mut power_up = PowerUp::new(0.0, 0.0, PowerUpKind::Life);
        power_up.marked_for_deletion = true;
        assert!(!player.collect_power_up(&mut power_up, &mut services.buffer()));
        assert!(services.take().is_empty());
    }

    #[test]
    fn test_grenade_pickup_grants_and_scores() {
        let mut services = TestServices::new();
        let mut player = Player::new(&Tuning::default());
        let before = player.grenades;
        let mut power_up = PowerUp::new(0.0, 0.0, PowerUpKind::Grenade);
        player.collect_power_up(&mut power_up, &mut services.buffer());
        assert_eq!(player.grenades, before + 2);
        assert!(services.take().contains(&WorldCommand::AddScore(50)));
    }

    #[test]
    fn test_set_weapon_caps_cooldown() {
        let mut player = Player::new(&Tuning::default());
        player.set_weapon(WeaponKind::Laser, 7200.0);
        player.shoot_cooldown_ms = 320.0;
        player.set_weapon(WeaponKind::Heavy, 9000.0);
        assert_eq!(player.shoot_cooldown_ms, 90.0);
        assert_eq!(player.weapon_ratio(), Some(1.0));
    }

    #[test]
    fn test_weapon_patterns() {
        let mut services = TestServices::new();
        let mut player = Player::new(&Tuning::default());

        player.shoot(&mut services.buffer());
        assert_eq!(spawned_projectiles(&services.take()).len(), 1);
        // Cooling down
        player.shoot(&mut services.buffer());
        assert!(services.take().is_empty());

        player.shoot_cooldown_ms = 0.0;
        player.set_weapon(WeaponKind::Heavy, 1000.0);
        player.shoot(&mut services.buffer());
        let heavy = spawned_projectiles(&services.take());
        assert_eq!(heavy.len(), 2);
        assert!(heavy.iter().all(|s| s.speed == 900.0));

        player.shoot_cooldown_ms = 0.0;
        player.set_weapon(WeaponKind::Spread, 1000.0);
        player.shoot(&mut services.buffer());
        let spread = spawned_projectiles(&services.take());
        assert_eq!(spread.len(), 3);
        for (spec, angle) in spread.iter().zip(SPREAD_ANGLES) {
            let vx = spec.vx.unwrap();
            assert!((vx.hypot(spec.vy) - 760.0).abs() < 1e-2);
            assert!((spec.vy.atan2(vx) - angle).abs() < 1e-4);
        }

        player.shoot_cooldown_ms = 0.0;
        player.set_weapon(WeaponKind::Laser, 1000.0);
        player.shoot(&mut services.buffer());
        let laser = spawned_projectiles(&services.take());
        assert_eq!(laser.len(), 1);
        assert_eq!((laser[0].damage, laser[0].pierce, laser[0].life_ms), (3, 2, 520.0));
        assert_eq!(player.shoot_cooldown_ms, 320.0);
    }

    #[test]
    fn test_grenade_single_fire_per_press() {
        let mut services = TestServices::new();
        let mut player = Player::new(&Tuning::default());
        let mut input = InputState::new();
        input.press(KeyCode::KeyG);

        for _ in 0..60 {
            player.update(16.0, true, &input, &mut services.buffer());
        }
        let throws = services
            .take()
            .iter()
            .filter(|c| matches!(c, WorldCommand::SpawnGrenade { .. }))
            .count();
        assert_eq!(throws, 1);
        assert_eq!(player.grenades, 3);

        input.release(KeyCode::KeyG);
        player.update(16.0, true, &input, &mut services.buffer());
        input.press(KeyCode::KeyG);
        player.update(16.0, true, &input, &mut services.buffer());
        assert_eq!(player.grenades, 2);
    }

    #[test]
    fn test_grenade_rate_limited() {
        let mut services = TestServices::new();
        let mut player = Player::new(&Tuning::default());
        let mut input = InputState::new();
        input.press(KeyCode::KeyK);
        player.update(16.0, true, &input, &mut services.buffer());
        input.release(KeyCode::KeyK);
        player.update(16.0, true, &input, &mut services.buffer());
        input.press(KeyCode::KeyK);
        player.update(16.0, true, &input, &mut services.buffer());
        // Second press landed inside the 420ms delay
        assert_eq!(player.grenades, 3);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let mut services = TestServices::new();
        let mut player = Player::new(&Tuning::default());
        let mut input = InputState::new();
        input.press(KeyCode::Space);

        player.update(16.0, true, &input, &mut services.buffer());
        assert!(player.vel.y < 0.0);
        let airborne_vy = player.vel.y;
        player.update(16.0, true, &input, &mut services.buffer());
        // Gravity only, no second jump impulse
        assert!(player.vel.y > airborne_vy);
    }

    #[test]
    fn test_horizontal_clamp() {
        let mut services = TestServices::new();
        let mut player = Player::new(&Tuning::default());
        let mut input = InputState::new();
        input.press(KeyCode::ArrowLeft);
        for _ in 0..100 {
            player.update(16.0, true, &input, &mut services.buffer());
        }
        assert_eq!(player.pos.x, PLAYER_EDGE_MARGIN);
        assert_eq!(player.facing, -1.0);

        input.release(KeyCode::ArrowLeft);
        input.press(KeyCode::KeyD);
        for _ in 0..400 {
            player.update(16.0, true, &input, &mut services.buffer());
        }
        let max_x = services.bounds.width - PLAYER_WIDTH - PLAYER_EDGE_MARGIN;
        assert_eq!(player.pos.x, max_x);
    }

    #[test]
    fn test_passive_mode_settles_and_ignores_input() {
        let mut services = TestServices::new();
        let mut player = Player::new(&Tuning::default());
        player.pos.y -= 100.0;
        let mut input = InputState::new();
        input.press(KeyCode::KeyF);
        for _ in 0..120 {
            player.update(16.0, false, &input, &mut services.buffer());
        }
        assert!(player.on_ground(services.bounds.ground_y));
        assert_eq!(player.vel.y, 0.0);
        assert!(services.take().is_empty());
    }

    #[test]
    fn test_take_hit_knockback() {
        let mut player = Player::new(&Tuning::default());
        player.take_hit();
        assert_eq!(player.vel, Vec2::new(-160.0, -280.0));
        assert_eq!(player.hit_flash_ms, 220.0);
    }

    proptest! {
        #[test]
        fn prop_add_grenades_clamped(start in 0i32..=8, amount in any::<i32>()) {
            let mut player = Player::new(&Tuning::default());
            player.grenades = start;
            player.add_grenades(amount);
            prop_assert!(player.grenades >= 0);
            prop_assert!(player.grenades <= player.max_grenades);
        }
    }
}
