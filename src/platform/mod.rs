//! Platform abstraction layer
//!
//! Handles host differences for:
//! - Frame timing
//! - Key events
//! - Start / game-over overlays
//!
//! [`Session`] is the only thing a host has to drive; the browser build wires
//! it to the DOM in [`web`].

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::consts::MAX_FRAME_DELTA_MS;
use crate::input::InputState;
use crate::renderer::FrameSnapshot;
use crate::sim::{GameEvent, GamePhase, World, score_line};

/// Key that starts or restarts a run
pub const RESTART_KEY: &str = "Enter";

/// Screens layered over the playfield
pub trait Overlay {
    fn hide_start(&mut self);
    fn hide_game_over(&mut self);
    fn show_game_over(&mut self, final_score: &str);
}

/// Overlay for headless hosts
#[derive(Debug, Default)]
pub struct NullOverlay;

impl Overlay for NullOverlay {
    fn hide_start(&mut self) {}
    fn hide_game_over(&mut self) {}
    fn show_game_over(&mut self, final_score: &str) {
        log::info!("{final_score}");
    }
}

/// Turns host timestamps into frame deltas
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the previous call: 0 on the first call, never
    /// negative, and clamped so a stalled tab does not teleport entities.
    /// The clamp is a host-side choice; `World::update` takes any delta.
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let delta = match self.last_ms {
            Some(last) => (now_ms - last).max(0.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        delta.min(MAX_FRAME_DELTA_MS)
    }

    /// Forget the last timestamp (after the host was suspended)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// One game instance bound to a host
pub struct Session {
    world: World,
    input: InputState,
    clock: FrameClock,
    overlay: Box<dyn Overlay>,
}

impl Session {
    pub fn new(world: World, overlay: Box<dyn Overlay>) -> Self {
        Self {
            world,
            input: InputState::new(),
            clock: FrameClock::new(),
            overlay,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// Forward a key press. Returns true when the game consumed the key.
    pub fn key_down(&mut self, code: &str) -> bool {
        if code == RESTART_KEY {
            self.restart();
            return true;
        }
        self.input.key_down(code)
    }

    pub fn key_up(&mut self, code: &str) {
        self.input.key_up(code);
    }

    /// Drop held keys, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.input.clear();
    }

    /// Start a run if none is in progress
    pub fn restart(&mut self) -> bool {
        let started = self.world.request_restart();
        self.relay_events();
        started
    }

    /// Advance by the time elapsed since the last frame and capture the result
    pub fn frame(&mut self, now_ms: f64) -> FrameSnapshot {
        let delta_ms = self.clock.delta(now_ms);
        self.world.update(delta_ms, &self.input);
        self.relay_events();
        FrameSnapshot::capture(&self.world)
    }

    pub fn phase(&self) -> GamePhase {
        self.world.phase
    }

    fn relay_events(&mut self) {
        for event in self.world.drain_events() {
            match event {
                GameEvent::RunStarted => {
                    self.overlay.hide_start();
                    self.overlay.hide_game_over();
                }
                GameEvent::GameOver { score, best_score } => {
                    self.overlay.show_game_over(&score_line(score, best_score));
                }
                GameEvent::PlayerHit { .. }
                | GameEvent::HostageRescued
                | GameEvent::PowerUpCollected { .. } => {}
            }
        }
    }
}
