//! WebAssembly exports for the torn paper effect.
//!
//! These functions are exposed to JavaScript via wasm-bindgen.
//!
//! ## Bit Depth Support
//!
//! - **u8**: 8-bit per channel (0-255), premultiplied output
//! - **f32**: Float per channel (0.0-1.0), straight alpha output
//!
//! Output buffers are larger than the input: `(width + 2m) * (height + 2m) * 4`
//! with `m` from `torn_paper_margin_wasm`.

use ndarray::{Array3, ArrayView3};
use wasm_bindgen::prelude::*;

use crate::config::{TornPaperConfig, TornPaperSettings};
use crate::error::TornPaperError;
use crate::procedural::pixel::Channel;
use crate::torn_paper::RenderCore;

fn js_error(err: TornPaperError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn resolve(settings_json: Option<String>, downsample: f64) -> Result<TornPaperConfig, JsValue> {
    let settings = match settings_json {
        Some(json) => TornPaperSettings::from_json(&json).map_err(js_error)?,
        None => TornPaperSettings::default(),
    };
    settings.resolve(downsample).map_err(js_error)
}

fn render_flat<T: Channel>(
    data: &[T],
    width: usize,
    height: usize,
    settings_json: Option<String>,
    downsample: f64,
) -> Result<Vec<T>, JsValue> {
    let input = ArrayView3::from_shape((height, width, 4), data)
        .map_err(|e| js_error(TornPaperError::invalid_shape(e.to_string())))?;
    let core = RenderCore::new(resolve(settings_json, downsample)?);
    let result: Array3<T> = core.render(input).map_err(js_error)?;
    Ok(result.into_raw_vec_and_offset().0)
}

// ============================================================================
// Torn Paper - u8 (8-bit)
// ============================================================================

/// Apply the torn paper effect to RGBA u8 pixels.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `settings_json` - Optional JSON settings; missing fields use defaults
/// * `downsample` - Preview resolution ratio (1.0 = full resolution)
///
/// # Returns
/// Flat array of premultiplied RGBA bytes for the padded canvas
#[wasm_bindgen]
pub fn torn_paper_rgba_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    settings_json: Option<String>,
    downsample: f64,
) -> Result<Vec<u8>, JsValue> {
    render_flat(data, width, height, settings_json, downsample)
}

// ============================================================================
// Torn Paper - f32 (float)
// ============================================================================

/// Apply the torn paper effect to RGBA f32 pixels (0.0-1.0).
#[wasm_bindgen]
pub fn torn_paper_rgba_f32_wasm(
    data: &[f32],
    width: usize,
    height: usize,
    settings_json: Option<String>,
    downsample: f64,
) -> Result<Vec<f32>, JsValue> {
    render_flat(data, width, height, settings_json, downsample)
}

/// Canvas padding per side for the given settings.
#[wasm_bindgen]
pub fn torn_paper_margin_wasm(settings_json: Option<String>, downsample: f64) -> Result<usize, JsValue> {
    Ok(resolve(settings_json, downsample)?.canvas_margin())
}

/// Factory settings as a JSON document.
#[wasm_bindgen]
pub fn torn_paper_default_settings_wasm() -> Result<String, JsValue> {
    TornPaperSettings::default().to_json().map_err(js_error)
}
