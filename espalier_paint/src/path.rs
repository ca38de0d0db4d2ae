// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paths with fill rules.

use kurbo::{Arc, BezPath, Circle, Ellipse, PathEl, Point, Rect, RoundedRect, Shape, Vec2};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Flattening tolerance used when converting shapes to Bézier segments.
pub const TOLERANCE: f64 = 0.1;

/// How the interior of a self-overlapping path is decided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillRule {
    /// A point is inside if the winding number is non-zero.
    #[default]
    NonZero,
    /// A point is inside if the winding number is odd.
    EvenOdd,
}

/// A Bézier path plus the rule used to fill it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    bez: BezPath,
    fill_rule: FillRule,
}

impl Path {
    /// Creates an empty path with the non-zero fill rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing Bézier path.
    #[must_use]
    pub fn from_bez(bez: BezPath, fill_rule: FillRule) -> Self {
        Self { bez, fill_rule }
    }

    /// A closed rectangle path.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        let mut path = Self::new();
        path.add_rect(rect);
        path
    }

    /// Returns the fill rule.
    #[inline]
    #[must_use]
    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    /// Sets the fill rule.
    pub fn set_fill_rule(&mut self, fill_rule: FillRule) {
        self.fill_rule = fill_rule;
    }

    /// Returns the underlying Bézier path.
    #[inline]
    #[must_use]
    pub fn as_bez(&self) -> &BezPath {
        &self.bez
    }

    /// Returns the path elements.
    #[inline]
    #[must_use]
    pub fn elements(&self) -> &[PathEl] {
        self.bez.elements()
    }

    /// Returns `true` if the path has no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bez.elements().is_empty()
    }

    /// Returns the smallest rectangle enclosing the path.
    #[must_use]
    pub fn bounding_box(&self) -> Rect {
        self.bez.bounding_box()
    }

    /// Returns a copy translated by `delta`.
    #[must_use]
    pub fn translated(&self, delta: Vec2) -> Self {
        let mut bez = self.bez.clone();
        bez.apply_affine(kurbo::Affine::translate(delta));
        Self {
            bez,
            fill_rule: self.fill_rule,
        }
    }

    /// Returns `true` if `point` is inside the path under its fill rule.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        let winding = self.bez.winding(point);
        match self.fill_rule {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding % 2 != 0,
        }
    }

    // -- Builders --

    /// Starts a new subpath at `p`.
    pub fn move_to(&mut self, p: Point) {
        self.bez.move_to(p);
    }

    /// Adds a line from the current point to `p`.
    pub fn line_to(&mut self, p: Point) {
        self.bez.line_to(p);
    }

    /// Closes the current subpath.
    pub fn close(&mut self) {
        self.bez.close_path();
    }

    /// Appends a closed rectangle.
    pub fn add_rect(&mut self, rect: Rect) {
        self.extend_shape(&rect);
    }

    /// Appends a closed rounded rectangle.
    pub fn add_rrect(&mut self, rrect: RoundedRect) {
        self.extend_shape(&rrect);
    }

    /// Appends the ellipse inscribed in `rect`.
    pub fn add_oval(&mut self, rect: Rect) {
        self.extend_shape(&Ellipse::from_rect(rect));
    }

    /// Appends a circle.
    pub fn add_circle(&mut self, center: Point, radius: f64) {
        self.extend_shape(&Circle::new(center, radius));
    }

    /// Appends every element of `other`.
    pub fn add_path(&mut self, other: &Self) {
        for &el in other.elements() {
            self.bez.push(el);
        }
    }

    /// Appends an arc of the ellipse inscribed in `rect`.
    ///
    /// Angles are in radians, clockwise from the positive x axis. The arc
    /// starts with a move when `force_move_to` is set or the path is empty;
    /// otherwise a line joins the current point to the arc's start.
    pub fn arc_to(&mut self, rect: Rect, start_angle: f64, sweep_angle: f64, force_move_to: bool) {
        let center = rect.center();
        let radii = Vec2::new(rect.width() / 2.0, rect.height() / 2.0);
        let start = Point::new(
            center.x + radii.x * start_angle.cos(),
            center.y + radii.y * start_angle.sin(),
        );
        if force_move_to || self.is_empty() {
            self.bez.move_to(start);
        } else {
            self.bez.line_to(start);
        }
        let arc = Arc {
            center,
            radii,
            start_angle,
            sweep_angle,
            x_rotation: 0.0,
        };
        arc.to_cubic_beziers(TOLERANCE, |p1, p2, p| self.bez.curve_to(p1, p2, p));
    }

    fn extend_shape(&mut self, shape: &impl Shape) {
        for el in shape.path_elements(TOLERANCE) {
            self.bez.push(el);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_path_is_closed_and_bounded() {
        let path = Path::from_rect(Rect::new(10.0, 20.0, 30.0, 60.0));
        assert_eq!(path.bounding_box(), Rect::new(10.0, 20.0, 30.0, 60.0));
        assert!(matches!(path.elements().last(), Some(PathEl::ClosePath)));
        assert!(path.contains(Point::new(15.0, 25.0)));
        assert!(!path.contains(Point::new(5.0, 25.0)));
    }

    #[test]
    fn even_odd_leaves_a_hole() {
        let mut path = Path::new();
        path.add_rrect(RoundedRect::from_rect(Rect::new(0.0, 0.0, 100.0, 100.0), 0.0));
        path.add_rrect(RoundedRect::from_rect(Rect::new(25.0, 25.0, 75.0, 75.0), 0.0));
        path.set_fill_rule(FillRule::EvenOdd);
        assert!(path.contains(Point::new(10.0, 10.0)));
        assert!(!path.contains(Point::new(50.0, 50.0)));
    }

    #[test]
    fn arc_to_moves_to_start_point() {
        let mut path = Path::new();
        path.arc_to(Rect::new(0.0, 0.0, 20.0, 10.0), 0.0, core::f64::consts::FRAC_PI_2, false);
        match path.elements().first() {
            Some(PathEl::MoveTo(p)) => {
                assert!((p.x - 20.0).abs() < 1e-9, "x was {}", p.x);
                assert!((p.y - 5.0).abs() < 1e-9, "y was {}", p.y);
            }
            other => panic!("expected MoveTo, got {other:?}"),
        }
        assert!(path.elements().len() > 1);
    }

    #[test]
    fn arc_to_without_force_joins_with_line() {
        let mut path = Path::new();
        path.move_to(Point::new(10.0, 5.0));
        path.arc_to(Rect::new(0.0, 0.0, 20.0, 10.0), 0.0, core::f64::consts::PI, false);
        assert!(matches!(path.elements()[1], PathEl::LineTo(_)));
    }

    #[test]
    fn translated_moves_bounds() {
        let path = Path::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let moved = path.translated(Vec2::new(5.0, -5.0));
        assert_eq!(moved.bounding_box(), Rect::new(5.0, -5.0, 15.0, 5.0));
    }
}
