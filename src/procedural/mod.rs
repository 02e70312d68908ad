//! Procedural building blocks shared by the torn paper layers.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `math` | smoothstep, clamp, lerp |
//! | `noise` | hash, value noise, fBm, ridged multifractal, Worley |
//! | `distance_field` | signed distance + gradient from an alpha mask |
//! | `pixel` | storage-independent RGBA access for u8 / u16 / f32 |
//!
//! Nothing here holds mutable state after construction, so every function
//! and every built `DistanceField` can be shared freely across rayon workers.

pub mod distance_field;
pub mod math;
pub mod noise;
pub mod pixel;
