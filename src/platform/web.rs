//! Browser bindings
//!
//! - `CanvasSurface`: overlay canvas (transparent, stacked above the engine's canvas)
//! - `PerformanceClock`: `performance.now()`
//! - `JsEngine`: bridge to a JavaScript rigid-body engine exposed by the page as a
//!   global `pegRaceEngine` object
//! - `WebRace`: handle exported to the page
//!
//! Collision batches cross the boundary as JSON arrays of
//! `{"label_a": ..., "label_b": ...}` objects, bodies and world configs as the
//! serde form of `BodyDef` / `WorldConfig`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Performance};

use super::{Clock, FrameLoop, FrameTicket};
use crate::engine::{
    BodyDef, CollisionBatch, CollisionSink, PhysicsEngine, WorldConfig, WorldId,
};
use crate::error::{EngineError, RaceError, SurfaceError};
use crate::renderer::{Color, DrawSurface};
use crate::settings::Settings;
use crate::sim::RaceController;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = pegRaceEngine, js_name = createWorld)]
    fn js_create_world(config: &str) -> Result<u32, JsValue>;

    #[wasm_bindgen(catch, js_namespace = pegRaceEngine, js_name = addBodies)]
    fn js_add_bodies(world: u32, bodies: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = pegRaceEngine, js_name = onCollisionStart)]
    fn js_on_collision_start(
        world: u32,
        callback: &Closure<dyn FnMut(String)>,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = pegRaceEngine, js_name = startRender)]
    fn js_start_render(world: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = pegRaceEngine, js_name = stopRender)]
    fn js_stop_render(world: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = pegRaceEngine, js_name = startRunner)]
    fn js_start_runner(world: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = pegRaceEngine, js_name = stopRunner)]
    fn js_stop_runner(world: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = pegRaceEngine, js_name = clearWorld)]
    fn js_clear_world(world: u32) -> Result<(), JsValue>;
}

fn js_message(e: &JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// 2D canvas overlay
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Look up a canvas by element id
    pub fn from_id(id: &str) -> Result<Self, SurfaceError> {
        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or_else(|| SurfaceError::MissingCanvas(id.to_string()))?;
        Self::new(canvas)
    }

    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, SurfaceError> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or(SurfaceError::MissingContext)?;
        Ok(Self { canvas, ctx })
    }
}

fn draw_error(e: JsValue) -> SurfaceError {
    SurfaceError::Draw(js_message(&e))
}

impl DrawSurface for CanvasSurface {
    fn size(&self) -> Vec2 {
        Vec2::new(self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn clear(&mut self) -> Result<(), SurfaceError> {
        let size = self.size();
        self.ctx.clear_rect(0.0, 0.0, size.x as f64, size.y as f64);
        Ok(())
    }

    fn fill_rect(
        &mut self,
        origin: Vec2,
        size: Vec2,
        color: Color,
        alpha: f32,
    ) -> Result<(), SurfaceError> {
        self.ctx.set_global_alpha(alpha as f64);
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx
            .fill_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
        self.ctx.set_global_alpha(1.0);
        Ok(())
    }

    fn fill_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        color: Color,
        alpha: f32,
    ) -> Result<(), SurfaceError> {
        self.ctx.set_global_alpha(alpha as f64);
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        let drawn = self.ctx.arc(
            center.x as f64,
            center.y as f64,
            radius as f64,
            0.0,
            std::f64::consts::TAU,
        );
        if drawn.is_ok() {
            self.ctx.fill();
        }
        self.ctx.set_global_alpha(1.0);
        drawn.map_err(draw_error)
    }

    fn fill_text(
        &mut self,
        text: &str,
        at: Vec2,
        font: &str,
        color: Color,
    ) -> Result<(), SurfaceError> {
        self.ctx.set_font(font);
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx
            .fill_text(text, at.x as f64, at.y as f64)
            .map_err(draw_error)
    }
}

/// `performance.now()` clock
#[derive(Clone)]
pub struct PerformanceClock {
    performance: Performance,
}

impl PerformanceClock {
    pub fn new() -> Option<Self> {
        let performance = web_sys::window()?.performance()?;
        Some(Self { performance })
    }
}

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        self.performance.now()
    }
}

/// Physics engine living on the JavaScript side
///
/// Collision callbacks only push into the subscriber's channel; the race
/// controller drains it on its next `poll`.
#[derive(Default)]
pub struct JsEngine {
    listeners: HashMap<WorldId, Vec<Closure<dyn FnMut(String)>>>,
}

impl JsEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<String, EngineError> {
    serde_json::to_string(value).map_err(|e| EngineError::Other(e.to_string()))
}

impl PhysicsEngine for JsEngine {
    fn create_world(&mut self, config: &WorldConfig) -> Result<WorldId, EngineError> {
        let world = js_create_world(&encode(config)?)
            .map_err(|e| EngineError::WorldCreation(js_message(&e)))?;
        Ok(WorldId(world))
    }

    fn add_bodies(&mut self, world: WorldId, bodies: &[BodyDef]) -> Result<(), EngineError> {
        js_add_bodies(world.0, &encode(&bodies)?).map_err(|e| EngineError::Bodies(js_message(&e)))
    }

    fn subscribe_collisions(
        &mut self,
        world: WorldId,
        sink: CollisionSink,
    ) -> Result<(), EngineError> {
        let callback = Closure::<dyn FnMut(String)>::new(move |json: String| {
            match serde_json::from_str::<CollisionBatch>(&json) {
                // A closed receiver means the race moved on; drop the batch
                Ok(batch) => {
                    let _ = sink.send(batch);
                }
                Err(e) => log::warn!("Malformed collision batch: {e}"),
            }
        });
        js_on_collision_start(world.0, &callback)
            .map_err(|e| EngineError::Other(js_message(&e)))?;
        self.listeners.entry(world).or_default().push(callback);
        Ok(())
    }

    fn start_render(&mut self, world: WorldId) -> Result<(), EngineError> {
        js_start_render(world.0).map_err(|e| EngineError::Render(js_message(&e)))
    }

    fn stop_render(&mut self, world: WorldId) -> Result<(), EngineError> {
        js_stop_render(world.0).map_err(|e| EngineError::Render(js_message(&e)))
    }

    fn start_runner(&mut self, world: WorldId) -> Result<(), EngineError> {
        js_start_runner(world.0).map_err(|e| EngineError::Runner(js_message(&e)))
    }

    fn stop_runner(&mut self, world: WorldId) -> Result<(), EngineError> {
        js_stop_runner(world.0).map_err(|e| EngineError::Runner(js_message(&e)))
    }

    fn clear_world(&mut self, world: WorldId) -> Result<(), EngineError> {
        let result = js_clear_world(world.0).map_err(|e| EngineError::Other(js_message(&e)));
        // The engine no longer calls back into this world's listeners
        self.listeners.remove(&world);
        result
    }
}

type WebController = RaceController<JsEngine, CanvasSurface, PerformanceClock>;

/// Race handle exported to the page
///
/// Either call `run` once to let the race drive itself from
/// `requestAnimationFrame`, or call `poll` / `animation_frame` from the page's
/// own loop. `after_render` belongs on the engine's render-complete event.
#[wasm_bindgen]
pub struct WebRace {
    inner: Rc<RefCell<WebController>>,
    frames: FrameLoop,
}

#[wasm_bindgen]
impl WebRace {
    #[wasm_bindgen(constructor)]
    pub fn new(overlay_canvas_id: &str, settings_json: Option<String>) -> Result<WebRace, JsValue> {
        let settings = match settings_json {
            Some(json) => Settings::from_json(&json).map_err(to_js)?,
            None => Settings::default(),
        };
        log::set_max_level(settings.level_filter());

        let surface = CanvasSurface::from_id(overlay_canvas_id)
            .map_err(RaceError::from)
            .map_err(to_js)?;
        let clock = PerformanceClock::new()
            .ok_or_else(|| JsValue::from_str("performance.now() is unavailable"))?;
        let controller = RaceController::new(JsEngine::new(), surface, clock, settings);
        Ok(WebRace {
            inner: Rc::new(RefCell::new(controller)),
            frames: FrameLoop::new(),
        })
    }

    pub fn start(&self) -> Result<(), JsValue> {
        self.inner.borrow_mut().start().map_err(to_js)
    }

    pub fn reset(&self) -> Result<(), JsValue> {
        self.inner.borrow_mut().reset().map_err(to_js)
    }

    /// Forward one collision-start batch directly
    pub fn on_collision(&self, pairs_json: &str) -> Result<(), JsValue> {
        let batch: CollisionBatch = serde_json::from_str(pairs_json).map_err(to_js)?;
        self.inner.borrow_mut().on_collision_start(&batch);
        Ok(())
    }

    pub fn after_render(&self) {
        self.inner.borrow_mut().after_render();
    }

    /// Advance fireworks one frame; `true` while more frames are wanted
    pub fn animation_frame(&self) -> bool {
        self.inner.borrow_mut().animation_frame()
    }

    pub fn poll(&self) -> u32 {
        self.inner.borrow_mut().poll() as u32
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.borrow().snapshot()).map_err(to_js)
    }

    /// Podium contents as JSON, `undefined` until the podium shows
    pub fn podium_json(&self) -> Result<Option<String>, JsValue> {
        self.inner
            .borrow()
            .podium()
            .map(|p| serde_json::to_string(&p))
            .transpose()
            .map_err(to_js)
    }

    pub fn seed(&self) -> u64 {
        self.inner.borrow().seed()
    }

    /// Drive `poll` and the fireworks from `requestAnimationFrame`
    pub fn run(&self) {
        let Some(ticket) = self.frames.begin() else {
            return;
        };
        request_animation_frame(self.inner.clone(), ticket);
    }

    /// Stop the frame loop started by `run`
    pub fn stop(&self) {
        self.frames.stop();
    }

    /// Stop the frame loop and tear the race down (the page is going away)
    pub fn cleanup(&self) {
        self.frames.stop();
        self.inner.borrow_mut().cleanup();
    }
}

impl Drop for WebRace {
    fn drop(&mut self) {
        // Lets the pending frame callback release its handle on the controller
        self.frames.stop();
    }
}

fn request_animation_frame(race: Rc<RefCell<WebController>>, ticket: FrameTicket) {
    let Some(window) = web_sys::window() else {
        log::error!("No window; frame loop not started");
        return;
    };
    let closure = Closure::once(move |_time: f64| {
        frame_loop(race, ticket);
    });
    if let Err(e) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        log::error!("requestAnimationFrame failed: {}", js_message(&e));
    }
    closure.forget();
}

fn frame_loop(race: Rc<RefCell<WebController>>, ticket: FrameTicket) {
    if !ticket.is_live() {
        log::debug!("Frame loop stopped");
        return;
    }
    {
        let mut race = race.borrow_mut();
        race.poll();
        if race.is_celebrating() {
            race.animation_frame();
        }
    }
    request_animation_frame(race, ticket);
}
