// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pipeline configuration.

use espalier_paint::DisplayContext;
use kurbo::Size;

use crate::constraints::BoxConstraints;

/// Surface-level settings for a [`RenderTree`](crate::tree::RenderTree).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Constraints handed to the root node on every layout flush.
    pub root_constraints: BoxConstraints,
    /// Display facts injected into paint (device-pixel-ratio for shadows and
    /// image configurations).
    pub display: DisplayContext,
    /// Outline every laid-out box with its size after it paints.
    pub debug_paint_size: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::for_surface(Size::new(800.0, 600.0), 1.0)
    }
}

impl PipelineConfig {
    /// Configuration for a surface of the given logical size: the root is
    /// forced to fill it exactly.
    #[must_use]
    pub const fn for_surface(size: Size, device_pixel_ratio: f64) -> Self {
        Self {
            root_constraints: BoxConstraints::tight(size),
            display: DisplayContext::new(device_pixel_ratio),
            debug_paint_size: false,
        }
    }

    /// Configuration whose root may pick any size up to `size`.
    #[must_use]
    pub const fn loose(size: Size, device_pixel_ratio: f64) -> Self {
        Self {
            root_constraints: BoxConstraints::loose(size),
            display: DisplayContext::new(device_pixel_ratio),
            debug_paint_size: false,
        }
    }

    /// Returns a copy with size outlines enabled.
    #[must_use]
    pub const fn with_debug_paint_size(mut self, enabled: bool) -> Self {
        self.debug_paint_size = enabled;
        self
    }
}
