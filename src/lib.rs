//! Torn Paper Rust Extensions
//!
//! Procedural "torn paper" effect for alpha-masked RGBA layers, with Python
//! bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//! Input and output are RGBA arrays of shape (height, width, 4):
//! - `u8`: 8-bit per channel (0-255), output premultiplied
//! - `u16`: 16-bit per channel (0-32768), output premultiplied
//! - `f32`: Float per channel (0.0-1.0), output straight alpha
//!
//! The output canvas is larger than the input: every side is padded by
//! [`TornPaperConfig::canvas_margin`] pixels so fibers and shadows can
//! extend past the input outline.
//!
//! ## Layout
//! - [`procedural`] - noise, distance field and pixel access building blocks
//! - [`torn_paper`] - edges, fibers, fold, grunge and the compositor
//! - [`config`] - host settings (serde) and resolved render parameters
//! - [`error`] - error type for the input/settings boundary

pub mod config;
pub mod error;
pub mod procedural;
pub mod torn_paper;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::{TornPaperConfig, TornPaperSettings};
pub use error::{Result, TornPaperError};
pub use torn_paper::{render_torn_paper, RenderCore};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::config::{TornPaperConfig, TornPaperSettings};
    use crate::error::TornPaperError;
    use crate::torn_paper::RenderCore;

    impl From<TornPaperError> for PyErr {
        fn from(err: TornPaperError) -> PyErr {
            PyValueError::new_err(err.to_string())
        }
    }

    /// Parse optional JSON settings and resolve them for one render.
    fn resolve(settings: Option<&str>, downsample: f64) -> PyResult<TornPaperConfig> {
        let settings = match settings {
            Some(json) => TornPaperSettings::from_json(json)?,
            None => TornPaperSettings::default(),
        };
        Ok(settings.resolve(downsample)?)
    }

    // ========================================================================
    // Torn Paper
    // ========================================================================

    /// Apply the torn paper effect to an RGBA u8 image.
    ///
    /// # Arguments
    /// * `image` - Source RGBA image (height, width, 4) as u8
    /// * `settings` - JSON settings document; missing fields use defaults
    /// * `downsample` - Preview resolution ratio (1.0 = full resolution)
    ///
    /// # Returns
    /// Premultiplied RGBA image, padded on every side by the canvas margin
    #[pyfunction]
    #[pyo3(signature = (image, settings=None, downsample=1.0))]
    pub fn torn_paper_rgba<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        settings: Option<&str>,
        downsample: f64,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let core = RenderCore::new(resolve(settings, downsample)?);
        let result = core.render(image.as_array())?;
        Ok(result.into_pyarray(py))
    }

    /// Apply the torn paper effect to an RGBA u16 image (0-32768 range).
    #[pyfunction]
    #[pyo3(signature = (image, settings=None, downsample=1.0))]
    pub fn torn_paper_rgba_u16<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u16>,
        settings: Option<&str>,
        downsample: f64,
    ) -> PyResult<Bound<'py, PyArray3<u16>>> {
        let core = RenderCore::new(resolve(settings, downsample)?);
        let result = core.render(image.as_array())?;
        Ok(result.into_pyarray(py))
    }

    /// Apply the torn paper effect to an RGBA f32 image.
    ///
    /// Input/output values are 0.0-1.0; output alpha is straight.
    #[pyfunction]
    #[pyo3(signature = (image, settings=None, downsample=1.0))]
    pub fn torn_paper_rgba_f32<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, f32>,
        settings: Option<&str>,
        downsample: f64,
    ) -> PyResult<Bound<'py, PyArray3<f32>>> {
        let core = RenderCore::new(resolve(settings, downsample)?);
        let result = core.render(image.as_array())?;
        Ok(result.into_pyarray(py))
    }

    /// Canvas padding (pixels per side) the given settings produce.
    #[pyfunction]
    #[pyo3(signature = (settings=None, downsample=1.0))]
    pub fn torn_paper_margin(settings: Option<&str>, downsample: f64) -> PyResult<usize> {
        Ok(resolve(settings, downsample)?.canvas_margin())
    }

    /// Factory settings as a JSON document.
    #[pyfunction]
    pub fn default_settings_json() -> PyResult<String> {
        Ok(TornPaperSettings::default().to_json()?)
    }

    // ========================================================================
    // Module
    // ========================================================================

    #[pymodule]
    pub fn torn_paper(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(torn_paper_rgba, m)?)?;
        m.add_function(wrap_pyfunction!(torn_paper_rgba_u16, m)?)?;
        m.add_function(wrap_pyfunction!(torn_paper_rgba_f32, m)?)?;
        m.add_function(wrap_pyfunction!(torn_paper_margin, m)?)?;
        m.add_function(wrap_pyfunction!(default_settings_json, m)?)?;
        Ok(())
    }
}
