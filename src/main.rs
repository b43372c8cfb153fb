//! Ground Strike entry point
//!
//! The browser build wires a [`Session`](ground_strike::platform::Session) to
//! the page. The native build has no window; it runs a headless autopilot so
//! tuning files can be tried out from the terminal.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("logger unavailable: {e}").into());
    }
    log::info!("Ground Strike starting...");
    ground_strike::platform::web::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use ground_strike::platform::{NullOverlay, Session};
    use ground_strike::sim::{GamePhase, World};
    use ground_strike::{KeyCode, Tuning};

    /// 60 fps worth of frame time
    const FRAME_MS: f64 = 1000.0 / 60.0;

    #[derive(Debug, Default)]
    pub struct RunSummary {
        pub frames: u32,
        pub runs: u32,
        pub best_score: u64,
        pub peak_enemies: usize,
        pub peak_projectiles: usize,
    }

    /// Drive a session with a scripted player for `frames` frames
    pub fn autopilot(tuning: Tuning, frames: u32) -> RunSummary {
        let mut session = Session::new(World::new(tuning), Box::new(NullOverlay));
        let mut summary = RunSummary::default();

        session.key_down("Enter");
        session.input_mut().press(KeyCode::KeyF);

        for frame in 0..frames {
            let now = frame as f64 * FRAME_MS;

            // Lob a grenade every 2s, hop every 1.5s
            let input = session.input_mut();
            if frame % 120 == 0 {
                input.press(KeyCode::KeyG);
            } else {
                input.release(KeyCode::KeyG);
            }
            if frame % 90 == 0 {
                input.press(KeyCode::Space);
            } else {
                input.release(KeyCode::Space);
            }

            session.frame(now);

            let world = session.world();
            summary.frames += 1;
            summary.peak_enemies = summary.peak_enemies.max(world.enemies.len());
            summary.peak_projectiles = summary.peak_projectiles.max(world.projectiles.len());

            if session.phase() == GamePhase::GameOver {
                summary.runs += 1;
                log::debug!("Run {} ended at frame {frame}", summary.runs);
                session.key_down("Enter");
            }
        }

        summary.best_score = session.world().best_score.max(session.world().score);
        summary
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Ground Strike (native) starting...");
    log::info!("Native mode runs a headless autopilot - use `trunk serve` for the web version");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => ground_strike::Tuning::from_json_or_default(&json),
            Err(e) => {
                log::warn!("Could not read {path}: {e}");
                ground_strike::Tuning::default()
            }
        },
        None => ground_strike::Tuning::default(),
    };
    let frames = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(60 * 120);

    let summary = headless::autopilot(tuning, frames);
    log::info!(
        "Autopilot: {} frames, {} finished runs, best score {}, peak enemies {}, peak projectiles {}",
        summary.frames,
        summary.runs,
        summary.best_score,
        summary.peak_enemies,
        summary.peak_projectiles
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}
