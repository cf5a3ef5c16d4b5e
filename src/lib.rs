pub mod channel;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;

use crate::config::ScopeConfig;
use crate::dsp::oscillator::SineParams;
use crate::engine::{DragPhase, ScopeEngine};
use crate::channel::ConfigSource;
use wasm_bindgen::prelude::*;

pub use crate::error::{Result, ScopeError};

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the panic hook so Rust panics show up in the browser console.
#[cfg(feature = "console_error_panic_hook")]
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed: return the wavescope-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-exposed handle owning one scope surface.
///
/// Created when the page sets up its canvases and freed with it; the page
/// calls `tick()` from `requestAnimationFrame` and draws the returned traces.
#[wasm_bindgen]
pub struct WaveScope {
    engine: ScopeEngine,
}

#[wasm_bindgen]
impl WaveScope {
    /// Build from a JSON scope description, or the default layout when absent.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> std::result::Result<WaveScope, JsValue> {
        let config = match config_json {
            Some(json) => ScopeConfig::from_json(&json).map_err(js_err)?,
            None => ScopeConfig::default(),
        };
        let engine = ScopeEngine::new(&config).map_err(js_err)?;
        Ok(WaveScope { engine })
    }

    /// Advance one frame. Returns messages for channels that failed to render.
    pub fn tick(&mut self) -> Vec<String> {
        self.engine.tick().iter().map(ToString::to_string).collect()
    }

    pub fn resize(&mut self, width: usize, height: Option<f64>) -> std::result::Result<Vec<String>, JsValue> {
        let failures = self.engine.resize(width, height).map_err(js_err)?;
        Ok(failures.iter().map(ToString::to_string).collect())
    }

    /// Forward a pointer event; `phase` is `"start"`, `"move"` or `"end"`.
    pub fn drag(&mut self, channel: usize, x: i32, y: f64, phase: JsValue) -> std::result::Result<bool, JsValue> {
        let phase: DragPhase = serde_wasm_bindgen::from_value(phase).map_err(js_err)?;
        self.engine.drag(channel, x as i64, y, phase).map_err(js_err)
    }

    pub fn clear(&mut self) {
        self.engine.clear();
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> usize {
        self.engine.width()
    }

    #[wasm_bindgen(getter)]
    pub fn channel_count(&self) -> usize {
        self.engine.channels().len()
    }

    /// Latest trace of a channel.
    pub fn samples(&self, channel: usize) -> Option<Vec<f64>> {
        self.engine.frame(channel).ok()?.samples.map(<[f64]>::to_vec)
    }

    /// Wrapped freehand stroke of a capture channel.
    pub fn overlay(&self, channel: usize) -> Option<Vec<f64>> {
        self.engine.frame(channel).ok()?.overlay.map(<[f64]>::to_vec)
    }

    /// Vertical pixel for a plot value, for drawing.
    pub fn offset(&self, value: f64) -> f64 {
        self.engine.viewport().offset(value)
    }

    /// `{ frequency, amplitude, phaseDegrees }` of a generator.
    pub fn params(&self, channel: usize) -> std::result::Result<JsValue, JsValue> {
        let params = self.engine.params(channel).map_err(js_err)?;
        serde_wasm_bindgen::to_value(&params).map_err(js_err)
    }

    /// Ranked harmonic components of a capture channel's stroke as
    /// `[{ harmonic, cosine, frequency, amplitude, phase }]`.
    pub fn candidates(&self, channel: usize) -> std::result::Result<JsValue, JsValue> {
        let ranked = self.engine.candidates(channel).map_err(js_err)?;
        serde_wasm_bindgen::to_value(&ranked).map_err(js_err)
    }

    /// Whether a generator was last written by the analyzer.
    pub fn is_auto(&self, channel: usize) -> std::result::Result<bool, JsValue> {
        let source = self.engine.config_source(channel).map_err(js_err)?;
        Ok(source == ConfigSource::Auto)
    }

    /// Manual control write.
    pub fn set_params(
        &mut self,
        channel: usize,
        frequency: f64,
        amplitude: f64,
        phase_degrees: f64,
    ) -> std::result::Result<(), JsValue> {
        let params = SineParams::new(frequency, amplitude, phase_degrees);
        self.engine
            .set_params(channel, params, ConfigSource::Manual)
            .map_err(js_err)
    }
}
