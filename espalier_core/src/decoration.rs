// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decorations painted by [`DecoratedBox`](crate::node::DecoratedBox).
//!
//! A [`Decoration`] is an immutable description; painting goes through a
//! [`BoxPainter`] it creates on demand. The node caches the painter and
//! disposes it explicitly when the decoration changes or the node is
//! detached.

use alloc::boxed::Box;
use core::fmt;

use espalier_paint::{Canvas, Color, Paint};
use kurbo::{Point, Rect, RoundedRect, Shape, Size, Vec2};

/// Where a decoration paints relative to the child.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DecorationPosition {
    /// Behind the child.
    #[default]
    Background,
    /// In front of the child.
    Foreground,
}

/// Facts about the environment a decoration paints into.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ImageConfiguration {
    /// Size of the box being decorated, filled in at paint time.
    pub size: Option<Size>,
    /// Device pixels per logical pixel, if known.
    pub device_pixel_ratio: Option<f64>,
}

impl ImageConfiguration {
    /// A configuration with nothing known.
    pub const EMPTY: Self = Self {
        size: None,
        device_pixel_ratio: None,
    };

    /// Returns a copy with `size` filled in.
    #[must_use]
    pub fn with_size(self, size: Size) -> Self {
        Self {
            size: Some(size),
            ..self
        }
    }
}

/// An immutable description of how to paint a box.
pub trait Decoration: fmt::Debug {
    /// Creates a painter for this decoration.
    fn create_box_painter(&self) -> Box<dyn BoxPainter>;

    /// Whether `position` (relative to the box origin) hits the decorated
    /// shape of a box of `size`. Defaults to the box itself.
    fn hit_test(&self, size: Size, position: Point) -> bool {
        Rect::from_origin_size(Point::ORIGIN, size).contains(position)
    }

    /// Whether painting is expensive enough to be worth caching.
    fn is_complex(&self) -> bool {
        false
    }
}

/// Paints one [`Decoration`].
pub trait BoxPainter {
    /// Paints the decoration for a box at `offset`.
    ///
    /// Every `save`/`save_layer` must be matched by a `restore` before
    /// returning.
    fn paint(&mut self, canvas: &mut dyn Canvas, offset: Vec2, configuration: &ImageConfiguration);

    /// Releases any resources held by the painter.
    fn dispose(&mut self) {}
}

/// Fills the box with a solid color, optionally with rounded corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorDecoration {
    /// Fill color.
    pub color: Color,
    /// Corner radius; zero for a plain rectangle.
    pub corner_radius: f64,
}

impl ColorDecoration {
    /// A rectangular fill.
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            corner_radius: 0.0,
        }
    }

    /// Returns a copy with rounded corners.
    #[must_use]
    pub const fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = radius;
        self
    }

    fn rounded(&self, rect: Rect) -> Option<RoundedRect> {
        (self.corner_radius > 0.0).then(|| rect.to_rounded_rect(self.corner_radius))
    }
}

impl Decoration for ColorDecoration {
    fn create_box_painter(&self) -> Box<dyn BoxPainter> {
        Box::new(ColorBoxPainter { decoration: *self })
    }

    fn hit_test(&self, size: Size, position: Point) -> bool {
        let rect = Rect::from_origin_size(Point::ORIGIN, size);
        match self.rounded(rect) {
            Some(rrect) => rrect.contains(position),
            None => rect.contains(position),
        }
    }
}

#[derive(Debug)]
struct ColorBoxPainter {
    decoration: ColorDecoration,
}

impl BoxPainter for ColorBoxPainter {
    fn paint(&mut self, canvas: &mut dyn Canvas, offset: Vec2, configuration: &ImageConfiguration) {
        debug_assert!(
            configuration.size.is_some(),
            "ColorDecoration painted without a size"
        );
        let size = configuration.size.unwrap_or(Size::ZERO);
        let rect = Rect::from_origin_size(offset.to_point(), size);
        let paint = Paint::fill(self.decoration.color);
        match self.decoration.rounded(rect) {
            Some(rrect) => canvas.draw_rrect(rrect, &paint),
            None => canvas.draw_rect(rect, &paint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use espalier_paint::{DisplayContext, DrawCmd, PictureRecorder, RecorderCanvas};

    #[test]
    fn color_fill_records_one_path_at_offset() {
        let mut rec = PictureRecorder::new();
        let mut canvas = RecorderCanvas::new(&mut rec, DisplayContext::default());
        let mut painter = ColorDecoration::new(Color::WHITE).create_box_painter();
        painter.paint(
            &mut canvas,
            Vec2::new(10.0, 20.0),
            &ImageConfiguration::EMPTY.with_size(Size::new(30.0, 40.0)),
        );
        assert_eq!(rec.len(), 1);
        match &rec.commands()[0] {
            DrawCmd::DrawPath { path, paint } => {
                assert_eq!(path.bounding_box(), Rect::new(10.0, 20.0, 40.0, 60.0));
                assert_eq!(paint.color, Color::WHITE);
            }
            other => panic!("expected DrawPath, got {other:?}"),
        }
    }

    #[test]
    fn rounded_hit_test_excludes_corners() {
        let deco = ColorDecoration::new(Color::BLACK).with_corner_radius(10.0);
        let size = Size::new(100.0, 100.0);
        assert!(deco.hit_test(size, Point::new(50.0, 50.0)));
        assert!(!deco.hit_test(size, Point::new(0.5, 0.5)));
        assert!(ColorDecoration::new(Color::BLACK).hit_test(size, Point::new(0.5, 0.5)));
    }

    #[test]
    fn with_size_keeps_other_fields() {
        let config = ImageConfiguration {
            size: None,
            device_pixel_ratio: Some(2.0),
        }
        .with_size(Size::new(1.0, 2.0));
        assert_eq!(config.size, Some(Size::new(1.0, 2.0)));
        assert_eq!(config.device_pixel_ratio, Some(2.0));
    }
}
