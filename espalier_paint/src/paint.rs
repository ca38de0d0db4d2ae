// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colors and paint state.
//!
//! [`Paint`] is a plain value: every recorded command stores its own clone,
//! so mutating a caller's paint after a draw call never reaches the command
//! list.

use core::fmt;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// An 8-bit-per-channel RGBA color (non-premultiplied).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (0 = transparent, 255 = opaque).
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::from_rgba8(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::from_rgba8(0, 0, 0, 0xFF);
    /// Opaque white.
    pub const WHITE: Self = Self::from_rgba8(0xFF, 0xFF, 0xFF, 0xFF);

    /// Creates a color from its four channels.
    #[inline]
    #[must_use]
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from a packed `0xAARRGGBB` value.
    #[inline]
    #[must_use]
    pub const fn from_argb32(value: u32) -> Self {
        let [a, r, g, b] = value.to_be_bytes();
        Self { r, g, b, a }
    }

    /// Returns the packed `0xAARRGGBB` value.
    #[inline]
    #[must_use]
    pub const fn to_argb32(self) -> u32 {
        u32::from_be_bytes([self.a, self.r, self.g, self.b])
    }

    /// Returns a copy with the alpha channel replaced.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Returns a copy whose alpha is scaled by `factor` (clamped to `[0, 1]`).
    #[must_use]
    pub fn scale_alpha(self, factor: f64) -> Self {
        let opacity = f64::from(self.a) / 255.0 * factor.max(0.0).min(1.0);
        self.with_alpha(alpha_from_opacity(opacity))
    }

    /// Returns the alpha channel as an opacity in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn opacity(self) -> f64 {
        f64::from(self.a) / 255.0
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color(0x{:08x})", self.to_argb32())
    }
}

/// Converts an opacity in `[0, 1]` to an 8-bit alpha, rounding to nearest.
///
/// Values outside the range are clamped first.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "the value is clamped to [0, 255] before the cast"
)]
pub fn alpha_from_opacity(opacity: f64) -> u8 {
    (opacity.max(0.0).min(1.0) * 255.0).round() as u8
}

/// Whether a shape is filled or outlined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PaintStyle {
    /// Fill the interior of the shape.
    #[default]
    Fill,
    /// Stroke the outline of the shape with [`Paint::stroke_width`].
    Stroke,
}

/// How a blur mask spreads relative to the shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlurStyle {
    /// Blur inside and outside the shape.
    #[default]
    Normal,
    /// Solid inside, blurred outside.
    Solid,
    /// Nothing inside, blurred outside.
    Outer,
    /// Blurred inside, nothing outside.
    Inner,
}

/// A blur applied to the coverage mask of a draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaskFilter {
    /// Spread of the blur.
    pub style: BlurStyle,
    /// Standard deviation of the Gaussian, in device pixels.
    pub sigma: f64,
}

impl MaskFilter {
    /// Creates a blur mask filter.
    #[inline]
    #[must_use]
    pub const fn blur(style: BlurStyle, sigma: f64) -> Self {
        Self { style, sigma }
    }
}

/// Style description for a draw call.
#[derive(Clone, Debug, PartialEq)]
pub struct Paint {
    /// Source color.
    pub color: Color,
    /// Fill or stroke.
    pub style: PaintStyle,
    /// Stroke width in logical pixels (ignored for fills). Zero means hairline.
    pub stroke_width: f64,
    /// Optional blur applied to the coverage mask.
    pub mask_filter: Option<MaskFilter>,
    /// Whether edges are anti-aliased.
    pub anti_alias: bool,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            style: PaintStyle::Fill,
            stroke_width: 0.0,
            mask_filter: None,
            anti_alias: true,
        }
    }
}

impl Paint {
    /// A fill paint of the given color.
    #[must_use]
    pub fn fill(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// A stroke paint of the given color and width.
    #[must_use]
    pub fn stroke(color: Color, width: f64) -> Self {
        Self {
            color,
            style: PaintStyle::Stroke,
            stroke_width: width,
            ..Self::default()
        }
    }

    /// A paint that only carries an alpha, as used for opacity layers.
    #[must_use]
    pub fn from_alpha(alpha: u8) -> Self {
        Self::fill(Color::BLACK.with_alpha(alpha))
    }

    /// Returns a copy with the given mask filter.
    #[must_use]
    pub fn with_mask_filter(mut self, filter: MaskFilter) -> Self {
        self.mask_filter = Some(filter);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argb_round_trip() {
        let c = Color::from_argb32(0x80_11_22_33);
        assert_eq!(c, Color::from_rgba8(0x11, 0x22, 0x33, 0x80));
        assert_eq!(c.to_argb32(), 0x80_11_22_33);
    }

    #[test]
    fn alpha_rounds_to_nearest() {
        assert_eq!(alpha_from_opacity(0.0), 0);
        assert_eq!(alpha_from_opacity(1.0), 255);
        assert_eq!(alpha_from_opacity(0.5), 128);
        assert_eq!(alpha_from_opacity(0.001), 0);
        assert_eq!(alpha_from_opacity(0.999), 255);
    }

    #[test]
    fn alpha_clamps_out_of_range() {
        assert_eq!(alpha_from_opacity(-3.0), 0);
        assert_eq!(alpha_from_opacity(7.0), 255);
    }

    #[test]
    fn scale_alpha_multiplies_opacity() {
        let c = Color::WHITE.scale_alpha(0.25);
        assert_eq!(c.a, 64);
        assert_eq!(c.with_alpha(255), Color::WHITE);
    }

    #[test]
    fn stroke_paint_carries_width() {
        let p = Paint::stroke(Color::BLACK, 2.0);
        assert_eq!(p.style, PaintStyle::Stroke);
        assert_eq!(p.stroke_width, 2.0);
        assert!(p.mask_filter.is_none());
    }
}
