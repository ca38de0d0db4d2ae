// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layered shadow synthesis.
//!
//! A shadow is approximated by two blurred copies of the casting path: a
//! faint ambient layer in place, and a denser spot layer pushed down by a
//! light source above the scene. Blur sigmas are in device pixels, which is
//! why the device-pixel-ratio has to be known at record time.

use crate::canvas::Canvas;
use crate::paint::{BlurStyle, Color, MaskFilter, Paint};
use crate::path::Path;

/// Alpha multiplier for the ambient layer.
pub const AMBIENT_ALPHA: f64 = 0.039;
/// Alpha multiplier for the spot layer.
pub const SPOT_ALPHA: f64 = 0.25;
/// Height of the key light above the canvas, in logical pixels.
pub const LIGHT_HEIGHT: f64 = 600.0;
/// Radius of the key light, in logical pixels.
pub const LIGHT_RADIUS: f64 = 800.0;

/// Records the shadow of `path` cast from `elevation` onto `canvas`.
///
/// Non-positive elevations cast no shadow.
pub fn draw_shadow(
    canvas: &mut dyn Canvas,
    path: &Path,
    color: Color,
    elevation: f64,
    device_pixel_ratio: f64,
) {
    if elevation <= 0.0 || path.is_empty() {
        return;
    }

    let ambient_sigma = 0.5 * elevation * device_pixel_ratio;
    let spot_sigma = 0.5 * elevation * LIGHT_RADIUS / LIGHT_HEIGHT * device_pixel_ratio;
    let spot_dy = elevation * 0.5;

    let ambient = Paint::fill(color.scale_alpha(AMBIENT_ALPHA))
        .with_mask_filter(MaskFilter::blur(BlurStyle::Normal, ambient_sigma));
    let spot = Paint::fill(color.scale_alpha(SPOT_ALPHA))
        .with_mask_filter(MaskFilter::blur(BlurStyle::Normal, spot_sigma));

    canvas.save();
    canvas.draw_path(path, &ambient);
    canvas.translate(0.0, spot_dy);
    canvas.draw_path(path, &spot);
    canvas.restore();
}
