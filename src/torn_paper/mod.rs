//! Torn paper effect.
//!
//! Turns an alpha-masked RGBA layer into a piece of torn paper: the alpha
//! outline becomes a band of paper between two noise-displaced tear edges,
//! with fibers sticking out of each edge, paper grain, shadows, an optional
//! fold crease and grunge.
//!
//! | Module | Role |
//! |--------|------|
//! | `edge` | Outer, inner and middle tear edge placement |
//! | `fiber` | Implicit fiber strands along an edge |
//! | `fold` | Crease line, side cracks, perpendicular cracks, fold shadows |
//! | `grunge` | Dirt, smudge and dust masks |
//! | `compositor` | Per-pixel pipeline and parallel frame driver |
//!
//! All of them are pure functions of position, seed and configuration.

pub mod compositor;
pub mod edge;
pub mod fiber;
pub mod fold;
pub mod grunge;

use ndarray::{Array3, ArrayView3};

use crate::config::TornPaperConfig;
use crate::error::Result;
use crate::procedural::pixel::Channel;

pub use compositor::RenderCore;

/// Render one frame with a resolved configuration.
///
/// Shorthand for `RenderCore::new(config.clone()).render(input)`.
pub fn render_torn_paper<T: Channel>(input: ArrayView3<'_, T>, config: &TornPaperConfig) -> Result<Array3<T>> {
    RenderCore::new(config.clone()).render(input)
}
