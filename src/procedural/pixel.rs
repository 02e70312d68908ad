//! Storage-independent pixel access.
//!
//! ## Supported Formats
//!
//! | Storage | Shape | Read | Write |
//! |---------|-------|------|-------|
//! | `u8` | (H, W, 4) | value / 255 | premultiplied, x 255, truncated |
//! | `u16` | (H, W, 4) | value / 32768 | premultiplied, x 32768, truncated |
//! | `f32` | (H, W, 4) | as-is | straight alpha |
//!
//! The 16-bit range follows the 0..=32768 convention of compositing hosts
//! rather than the full `u16` range.
//!
//! Everything past this module works on normalized `f64` values; only
//! `Channel` knows how a number is stored.

use ndarray::ArrayView3;

use crate::error::{Result, TornPaperError};

/// A storage type for one color channel.
pub trait Channel: Copy + Default + Send + Sync + 'static {
    /// Whether color channels are written multiplied by alpha.
    const PREMULTIPLIED: bool;

    /// Convert a stored value to normalized [0, 1] semantics.
    fn to_unit(self) -> f64;

    /// Convert a normalized value (already clamped) to storage.
    fn from_unit(v: f64) -> Self;
}

impl Channel for u8 {
    const PREMULTIPLIED: bool = true;

    #[inline]
    fn to_unit(self) -> f64 {
        self as f64 / 255.0
    }

    #[inline]
    fn from_unit(v: f64) -> Self {
        (v * 255.0) as u8
    }
}

impl Channel for u16 {
    const PREMULTIPLIED: bool = true;

    #[inline]
    fn to_unit(self) -> f64 {
        self as f64 / 32768.0
    }

    #[inline]
    fn from_unit(v: f64) -> Self {
        (v * 32768.0) as u16
    }
}

impl Channel for f32 {
    const PREMULTIPLIED: bool = false;

    #[inline]
    fn to_unit(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_unit(v: f64) -> Self {
        v as f32
    }
}

/// Normalized RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Convert an 8-bit color picker value.
    pub fn from_u8(c: [u8; 3]) -> Self {
        Self::new(c[0] as f64 / 255.0, c[1] as f64 / 255.0, c[2] as f64 / 255.0)
    }

    /// Move toward `other` by `t`.
    #[inline]
    pub fn mix(self, other: Rgb, t: f64) -> Rgb {
        Rgb::new(
            self.r * (1.0 - t) + other.r * t,
            self.g * (1.0 - t) + other.g * t,
            self.b * (1.0 - t) + other.b * t,
        )
    }
}

/// Normalized straight-alpha RGBA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }

    /// Clamp and write four channels of storage, premultiplying when the
    /// storage format expects it.
    #[inline]
    pub fn store<T: Channel>(&self, dst: &mut [T]) {
        let a = self.a.clamp(0.0, 1.0);
        let k = if T::PREMULTIPLIED { a } else { 1.0 };
        dst[0] = T::from_unit(self.r.clamp(0.0, 1.0) * k);
        dst[1] = T::from_unit(self.g.clamp(0.0, 1.0) * k);
        dst[2] = T::from_unit(self.b.clamp(0.0, 1.0) * k);
        dst[3] = T::from_unit(a);
    }
}

/// Read-only access to an RGBA image in normalized units.
pub trait PixelAccessor: Sync {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Pixel at `(x, y)`; callers stay in bounds.
    fn pixel(&self, x: usize, y: usize) -> Rgba;

    fn alpha(&self, x: usize, y: usize) -> f64 {
        self.pixel(x, y).a
    }
}

/// `PixelAccessor` over an `(H, W, 4)` ndarray view.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a, T: Channel> {
    view: ArrayView3<'a, T>,
}

impl<'a, T: Channel> ImageView<'a, T> {
    /// Wrap a view, checking that it is non-empty RGBA.
    pub fn new(view: ArrayView3<'a, T>) -> Result<Self> {
        let (height, width, channels) = view.dim();
        if channels != 4 {
            return Err(TornPaperError::invalid_shape(format!(
                "expected 4 channels (RGBA), got {channels}"
            )));
        }
        if width == 0 || height == 0 {
            return Err(TornPaperError::invalid_shape(format!(
                "image must not be empty, got {width}x{height}"
            )));
        }
        Ok(Self { view })
    }
}

impl<T: Channel> PixelAccessor for ImageView<'_, T> {
    fn width(&self) -> usize {
        self.view.dim().1
    }

    fn height(&self) -> usize {
        self.view.dim().0
    }

    #[inline]
    fn pixel(&self, x: usize, y: usize) -> Rgba {
        Rgba::new(
            self.view[[y, x, 0]].to_unit(),
            self.view[[y, x, 1]].to_unit(),
            self.view[[y, x, 2]].to_unit(),
            self.view[[y, x, 3]].to_unit(),
        )
    }

    #[inline]
    fn alpha(&self, x: usize, y: usize) -> f64 {
        self.view[[y, x, 3]].to_unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_u8_premultiplied_store() {
        let mut out = [0u8; 4];
        Rgba::new(1.0, 0.5, 0.0, 0.5).store(&mut out);
        assert_eq!(out, [127, 63, 0, 127]);
    }

    #[test]
    fn test_u16_uses_32768_range() {
        assert_eq!(32768u16.to_unit(), 1.0);
        let mut out = [0u16; 4];
        Rgba::new(1.0, 1.0, 1.0, 1.0).store(&mut out);
        assert_eq!(out, [32768; 4]);
    }

    #[test]
    fn test_f32_store_is_straight_alpha() {
        let mut out = [0.0f32; 4];
        Rgba::new(0.8, 0.4, 0.2, 0.5).store(&mut out);
        assert_eq!(out, [0.8, 0.4, 0.2, 0.5]);
    }

    #[test]
    fn test_store_clamps() {
        let mut out = [0.0f32; 4];
        Rgba::new(1.5, -0.5, 0.5, 2.0).store(&mut out);
        assert_eq!(out, [1.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_image_view_rejects_rgb() {
        let img = Array3::<u8>::zeros((2, 2, 3));
        assert!(ImageView::new(img.view()).is_err());
    }

    #[test]
    fn test_image_view_rejects_empty() {
        let img = Array3::<f32>::zeros((0, 5, 4));
        assert!(ImageView::new(img.view()).is_err());
    }

    #[test]
    fn test_image_view_reads_normalized() {
        let mut img = Array3::<u8>::zeros((1, 2, 4));
        img[[0, 1, 0]] = 255;
        img[[0, 1, 3]] = 51;
        let view = ImageView::new(img.view()).unwrap();
        assert_eq!(view.width(), 2);
        assert_eq!(view.height(), 1);
        let p = view.pixel(1, 0);
        assert_eq!(p.r, 1.0);
        assert!((view.alpha(1, 0) - 0.2).abs() < 1e-12);
    }
}
