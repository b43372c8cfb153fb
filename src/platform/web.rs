//! Browser host: DOM overlays, keyboard listeners, a 2D canvas painter and
//! the `requestAnimationFrame` loop

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, KeyboardEvent};

use super::{Overlay, Session};
use crate::renderer::{DrawItem, FrameSnapshot, SCREEN_FLASH_OPACITY, Shape, puff_offsets};
use crate::sim::{GamePhase, World};
use crate::tuning::Tuning;

const CANVAS_ID: &str = "gameCanvas";
const START_OVERLAY_ID: &str = "startOverlay";
const GAME_OVER_OVERLAY_ID: &str = "gameOverOverlay";
const FINAL_SCORE_ID: &str = "finalScore";
const RETRY_BUTTON_ID: &str = "retryButton";
const HIDDEN_CLASS: &str = "hidden";

/// Overlay backed by DOM elements; missing elements are skipped
pub struct DomOverlay {
    start: Option<Element>,
    game_over: Option<Element>,
    final_score: Option<Element>,
}

impl DomOverlay {
    pub fn from_document(document: &Document) -> Self {
        Self {
            start: document.get_element_by_id(START_OVERLAY_ID),
            game_over: document.get_element_by_id(GAME_OVER_OVERLAY_ID),
            final_score: document.get_element_by_id(FINAL_SCORE_ID),
        }
    }

    fn set_hidden(element: &Option<Element>, hidden: bool) {
        if let Some(element) = element {
            let classes = element.class_list();
            let result = if hidden {
                classes.add_1(HIDDEN_CLASS)
            } else {
                classes.remove_1(HIDDEN_CLASS)
            };
            if let Err(e) = result {
                log::warn!("Could not toggle overlay: {:?}", e);
            }
        }
    }
}

impl Overlay for DomOverlay {
    fn hide_start(&mut self) {
        Self::set_hidden(&self.start, true);
    }

    fn hide_game_over(&mut self) {
        Self::set_hidden(&self.game_over, true);
    }

    fn show_game_over(&mut self, final_score: &str) {
        if let Some(el) = &self.final_score {
            el.set_text_content(Some(final_score));
        }
        Self::set_hidden(&self.game_over, false);
    }
}

fn css(color: [f32; 4]) -> String {
    format!(
        "rgba({}, {}, {}, {})",
        (color[0] * 255.0).round() as u8,
        (color[1] * 255.0).round() as u8,
        (color[2] * 255.0).round() as u8,
        color[3]
    )
}

/// Paints snapshots onto a 2D canvas
pub struct CanvasPainter {
    ctx: CanvasRenderingContext2d,
}

impl CanvasPainter {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { ctx })
    }

    pub fn paint(&self, frame: &FrameSnapshot) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let (w, h) = (frame.width as f64, frame.height as f64);
        let ground = frame.ground_y as f64;

        ctx.clear_rect(0.0, 0.0, w, h);
        ctx.set_fill_style_str("#0b1d2d");
        ctx.fill_rect(0.0, 0.0, w, h);

        for cloud in &frame.clouds {
            if let Shape::Circle { center, radius } = cloud.shape {
                ctx.set_fill_style_str(&css(cloud.color));
                ctx.begin_path();
                for (offset, puff) in puff_offsets(radius / 26.0) {
                    let c = center + offset;
                    ctx.move_to((c.x + puff) as f64, c.y as f64);
                    ctx.arc(c.x as f64, c.y as f64, puff as f64, 0.0, TAU)?;
                }
                ctx.fill();
            }
        }

        ctx.set_fill_style_str("#1d3a2f");
        ctx.fill_rect(0.0, ground, w, h - ground);
        ctx.set_fill_style_str("#274d3d");
        for (x, height) in frame.grass_heights() {
            ctx.fill_rect(x as f64, ground - height as f64, 24.0, height as f64);
        }

        for item in &frame.items {
            self.paint_item(item)?;
        }

        self.paint_hud(frame)?;

        if frame.screen_flash > 0.0 {
            let alpha = frame.screen_flash * SCREEN_FLASH_OPACITY;
            ctx.set_fill_style_str(&format!("rgba(255, 82, 82, {alpha})"));
            ctx.fill_rect(0.0, 0.0, w, h);
        }
        Ok(())
    }

    fn paint_item(&self, item: &DrawItem) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(&css(item.color));
        match item.shape {
            Shape::Rect(r) => {
                ctx.fill_rect(r.x as f64, r.y as f64, r.width as f64, r.height as f64);
                if let Some(label) = item.label {
                    let center = r.center();
                    ctx.set_fill_style_str("#ffffff");
                    ctx.set_font("bold 16px sans-serif");
                    ctx.set_text_align("center");
                    ctx.set_text_baseline("middle");
                    ctx.fill_text(label, center.x as f64, center.y as f64 + 1.0)?;
                }
            }
            Shape::Circle { center, radius } => {
                ctx.begin_path();
                ctx.arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)?;
                ctx.fill();
            }
        }
        Ok(())
    }

    fn paint_hud(&self, frame: &FrameSnapshot) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let hud = &frame.hud;
        ctx.set_text_align("left");
        ctx.set_text_baseline("alphabetic");
        ctx.set_fill_style_str("rgba(6, 12, 20, 0.62)");
        ctx.fill_rect(16.0, 16.0, 280.0, 140.0);

        ctx.set_fill_style_str("#f1faee");
        ctx.set_font("22px sans-serif");
        ctx.fill_text(&format!("Score {}", hud.score), 32.0, 48.0)?;
        ctx.set_font("16px sans-serif");
        ctx.set_fill_style_str("#a8dadc");
        ctx.fill_text(&format!("Best {}", hud.best_score), 32.0, 72.0)?;
        ctx.set_fill_style_str("#ffe066");
        ctx.fill_text(&format!("Weapon {}", hud.weapon_label), 32.0, 98.0)?;
        ctx.set_fill_style_str("#ffb4a2");
        ctx.fill_text(&format!("Grenades x{}", hud.grenades), 32.0, 122.0)?;

        if let Some(ratio) = hud.weapon_ratio {
            ctx.set_fill_style_str("rgba(255, 224, 102, 0.28)");
            ctx.fill_rect(32.0, 130.0, 180.0, 6.0);
            ctx.set_fill_style_str("#ffe066");
            ctx.fill_rect(32.0, 130.0, 180.0 * ratio as f64, 6.0);
        }

        for i in 0..hud.max_lives {
            let color = if i < hud.lives {
                "#ff5d73"
            } else {
                "rgba(255, 93, 115, 0.25)"
            };
            ctx.set_fill_style_str(color);
            ctx.begin_path();
            ctx.arc(180.0 + i as f64 * 26.0, 62.0, 9.0, 0.0, TAU)?;
            ctx.fill();
        }

        if hud.show_controls {
            ctx.set_fill_style_str("rgba(255, 255, 255, 0.6)");
            ctx.set_font("14px sans-serif");
            ctx.fill_text(
                "F/J shoot - K/G grenade - rescue hostages for rewards",
                24.0,
                frame.height as f64 - 24.0,
            )?;
        }
        Ok(())
    }
}

struct App {
    session: Session,
    painter: CanvasPainter,
}

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

fn request_animation_frame(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    let closure = Closure::once(move |time: f64| {
        {
            let mut app = app.borrow_mut();
            let frame = app.session.frame(time);
            if let Err(e) = app.painter.paint(&frame) {
                log::warn!("Paint failed: {:?}", e);
            }
        }
        if let Err(e) = request_animation_frame(app) {
            log::error!("Frame loop stopped: {:?}", e);
        }
    });
    window()?.request_animation_frame(closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn setup_keyboard(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    let window = window()?;
    {
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if app.borrow_mut().session.key_down(&event.code()) {
                event.prevent_default();
            }
        });
        window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            app.borrow_mut().session.key_up(&event.code());
        });
        window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            app.borrow_mut().session.release_all();
        });
        window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn setup_retry_button(document: &Document, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    if let Some(btn) = document.get_element_by_id(RETRY_BUTTON_ID) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            let mut app = app.borrow_mut();
            if app.session.phase() != GamePhase::Playing {
                app.session.restart();
            }
        });
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

/// Build the session against the page and start the frame loop
pub fn run() -> Result<(), JsValue> {
    let window = window()?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas: HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| JsValue::from_str("no canvas"))?
        .dyn_into()?;

    let tuning = Tuning {
        seed: js_sys::Date::now() as u64,
        width: canvas.width() as f32,
        height: canvas.height() as f32,
        ..Default::default()
    };
    let tuning = match tuning.validate() {
        Ok(()) => tuning,
        Err(e) => {
            log::warn!("Canvas size rejected ({e}), using defaults");
            Tuning::default()
        }
    };
    log::info!("Ground Strike starting with seed {:#x}", tuning.seed);

    let session = Session::new(
        World::new(tuning),
        Box::new(DomOverlay::from_document(&document)),
    );
    let app = Rc::new(RefCell::new(App {
        session,
        painter: CanvasPainter::new(&canvas)?,
    }));

    setup_keyboard(app.clone())?;
    setup_retry_button(&document, app.clone())?;
    request_animation_frame(app)
}
