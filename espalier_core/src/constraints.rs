// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box constraints.
//!
//! A [`BoxConstraints`] bounds the size a node may choose: a closed range per
//! axis, with `f64::INFINITY` allowed as a maximum. Every operation returns a
//! new value; nothing mutates a constraint in place.

use core::fmt;

use kurbo::Size;

/// Immutable min/max bounds for a node's width and height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxConstraints {
    /// Minimum width.
    pub min_width: f64,
    /// Maximum width (may be infinite).
    pub max_width: f64,
    /// Minimum height.
    pub min_height: f64,
    /// Maximum height (may be infinite).
    pub max_height: f64,
}

impl Default for BoxConstraints {
    fn default() -> Self {
        Self::UNCONSTRAINED
    }
}

/// Clamps `v` into `[lo, hi]`, preferring `hi` when the range is inverted.
#[inline]
fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

impl BoxConstraints {
    /// Constraints that accept any size.
    pub const UNCONSTRAINED: Self = Self::new(0.0, f64::INFINITY, 0.0, f64::INFINITY);

    /// Creates constraints from explicit bounds.
    #[inline]
    #[must_use]
    pub const fn new(min_width: f64, max_width: f64, min_height: f64, max_height: f64) -> Self {
        Self {
            min_width,
            max_width,
            min_height,
            max_height,
        }
    }

    /// Constraints satisfied only by `size`.
    #[inline]
    #[must_use]
    pub const fn tight(size: Size) -> Self {
        Self::new(size.width, size.width, size.height, size.height)
    }

    /// Tight on the given axes and unconstrained on the others.
    #[must_use]
    pub fn tight_for(width: Option<f64>, height: Option<f64>) -> Self {
        let (min_width, max_width) = width.map_or((0.0, f64::INFINITY), |w| (w, w));
        let (min_height, max_height) = height.map_or((0.0, f64::INFINITY), |h| (h, h));
        Self::new(min_width, max_width, min_height, max_height)
    }

    /// Constraints accepting anything from zero up to `size`.
    #[inline]
    #[must_use]
    pub const fn loose(size: Size) -> Self {
        Self::new(0.0, size.width, 0.0, size.height)
    }

    /// Tight on the given axes and tight-to-infinity on the others.
    #[must_use]
    pub fn expand(width: Option<f64>, height: Option<f64>) -> Self {
        let w = width.unwrap_or(f64::INFINITY);
        let h = height.unwrap_or(f64::INFINITY);
        Self::new(w, w, h, h)
    }

    // -- Transforms --

    /// Returns these constraints clamped into `other`'s ranges.
    ///
    /// The result respects `other` and stays as close to `self` as it can.
    /// It is valid only when the ranges overlap.
    #[must_use]
    pub fn enforce(self, other: Self) -> Self {
        Self::new(
            clamp(self.min_width, other.min_width, other.max_width),
            clamp(self.max_width, other.min_width, other.max_width),
            clamp(self.min_height, other.min_height, other.max_height),
            clamp(self.max_height, other.min_height, other.max_height),
        )
    }

    /// Returns constraints tight on each given axis, as far as these
    /// constraints allow.
    #[must_use]
    pub fn tighten(self, width: Option<f64>, height: Option<f64>) -> Self {
        let (min_width, max_width) = match width {
            Some(w) => {
                let w = clamp(w, self.min_width, self.max_width);
                (w, w)
            }
            None => (self.min_width, self.max_width),
        };
        let (min_height, max_height) = match height {
            Some(h) => {
                let h = clamp(h, self.min_height, self.max_height);
                (h, h)
            }
            None => (self.min_height, self.max_height),
        };
        Self::new(min_width, max_width, min_height, max_height)
    }

    /// Drops the minimums to zero.
    #[inline]
    #[must_use]
    pub const fn loosen(self) -> Self {
        Self::new(0.0, self.max_width, 0.0, self.max_height)
    }

    /// Returns a width within the constraints, as close to `width` as possible.
    #[inline]
    #[must_use]
    pub fn constrain_width(&self, width: f64) -> f64 {
        clamp(width, self.min_width, self.max_width)
    }

    /// Returns a height within the constraints, as close to `height` as
    /// possible.
    #[inline]
    #[must_use]
    pub fn constrain_height(&self, height: f64) -> f64 {
        clamp(height, self.min_height, self.max_height)
    }

    /// Returns the size within the constraints closest to `size`.
    #[must_use]
    pub fn constrain(&self, size: Size) -> Size {
        Size::new(
            self.constrain_width(size.width),
            self.constrain_height(size.height),
        )
    }

    /// The largest size that satisfies the constraints.
    ///
    /// Infinite on any unbounded axis.
    #[must_use]
    pub fn biggest(&self) -> Size {
        self.constrain(Size::new(f64::INFINITY, f64::INFINITY))
    }

    /// The smallest size that satisfies the constraints.
    #[must_use]
    pub fn smallest(&self) -> Size {
        self.constrain(Size::ZERO)
    }

    // -- Predicates --

    /// Whether the maximum width is finite.
    #[inline]
    #[must_use]
    pub fn has_bounded_width(&self) -> bool {
        self.max_width < f64::INFINITY
    }

    /// Whether the maximum height is finite.
    #[inline]
    #[must_use]
    pub fn has_bounded_height(&self) -> bool {
        self.max_height < f64::INFINITY
    }

    /// Whether exactly one width satisfies the constraints.
    #[inline]
    #[must_use]
    pub fn has_tight_width(&self) -> bool {
        self.min_width >= self.max_width
    }

    /// Whether exactly one height satisfies the constraints.
    #[inline]
    #[must_use]
    pub fn has_tight_height(&self) -> bool {
        self.min_height >= self.max_height
    }

    /// Whether exactly one size satisfies the constraints.
    #[inline]
    #[must_use]
    pub fn is_tight(&self) -> bool {
        self.has_tight_width() && self.has_tight_height()
    }

    /// Whether the width is forced to be infinite.
    #[inline]
    #[must_use]
    pub fn has_infinite_width(&self) -> bool {
        self.min_width >= f64::INFINITY
    }

    /// Whether the height is forced to be infinite.
    #[inline]
    #[must_use]
    pub fn has_infinite_height(&self) -> bool {
        self.min_height >= f64::INFINITY
    }

    /// Whether `size` lies within the constraints.
    #[must_use]
    pub fn is_satisfied_by(&self, size: Size) -> bool {
        (self.min_width..=self.max_width).contains(&size.width)
            && (self.min_height..=self.max_height).contains(&size.height)
    }

    /// Whether minimums are non-negative and no greater than maximums.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        self.min_width >= 0.0
            && self.min_width <= self.max_width
            && self.min_height >= 0.0
            && self.min_height <= self.max_height
    }

    /// Returns the nearest normalized constraints.
    #[must_use]
    pub fn normalize(self) -> Self {
        if self.is_normalized() {
            return self;
        }
        let min_width = self.min_width.max(0.0);
        let min_height = self.min_height.max(0.0);
        Self::new(
            min_width,
            min_width.max(self.max_width),
            min_height,
            min_height.max(self.max_height),
        )
    }

    /// Asserts in debug builds that the constraints are usable for layout.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if any bound is NaN, a minimum is negative or
    /// infinite, or a minimum exceeds its maximum.
    #[track_caller]
    pub fn debug_assert_is_valid(&self) {
        debug_assert!(
            !(self.min_width.is_nan()
                || self.max_width.is_nan()
                || self.min_height.is_nan()
                || self.max_height.is_nan()),
            "BoxConstraints has a NaN value: {self}"
        );
        debug_assert!(
            self.min_width >= 0.0 && self.min_height >= 0.0,
            "BoxConstraints has a negative minimum: {self}"
        );
        debug_assert!(
            self.min_width <= self.max_width && self.min_height <= self.max_height,
            "BoxConstraints has a minimum greater than its maximum: {self}"
        );
        debug_assert!(
            self.min_width.is_finite() && self.min_height.is_finite(),
            "BoxConstraints forces an infinite size: {self}"
        );
    }
}

fn describe(f: &mut fmt::Formatter<'_>, min: f64, max: f64, dim: &str) -> fmt::Result {
    if min == max {
        write!(f, "{dim}={min:.1}")
    } else if max.is_infinite() {
        write!(f, "{min:.1}<={dim}<=Infinity")
    } else {
        write!(f, "{min:.1}<={dim}<={max:.1}")
    }
}

impl fmt::Display for BoxConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::UNCONSTRAINED {
            return f.write_str("BoxConstraints(unconstrained)");
        }
        if self.max_width.is_infinite()
            && self.max_height.is_infinite()
            && self.min_width.is_infinite()
            && self.min_height.is_infinite()
        {
            return f.write_str("BoxConstraints(biggest)");
        }
        f.write_str("BoxConstraints(")?;
        describe(f, self.min_width, self.max_width, "w")?;
        f.write_str(", ")?;
        describe(f, self.min_height, self.max_height, "h")?;
        if !self.is_normalized() {
            f.write_str("; NOT NORMALIZED")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    const INF: f64 = f64::INFINITY;

    fn samples() -> [BoxConstraints; 5] {
        [
            BoxConstraints::new(0.0, 100.0, 0.0, 50.0),
            BoxConstraints::tight(Size::new(30.0, 40.0)),
            BoxConstraints::new(10.0, INF, 20.0, INF),
            BoxConstraints::UNCONSTRAINED,
            BoxConstraints::new(5.0, 5.0, 0.0, INF),
        ]
    }

    #[test]
    fn constrain_lands_inside_and_is_idempotent() {
        let sizes = [
            Size::ZERO,
            Size::new(1e6, 1e6),
            Size::new(35.0, 45.0),
            Size::new(7.0, 300.0),
        ];
        for c in samples() {
            for s in sizes {
                let once = c.constrain(s);
                assert!(c.is_satisfied_by(once), "{c} did not contain {once:?}");
                assert_eq!(c.constrain(once), once);
            }
        }
    }

    #[test]
    fn enforce_clamps_into_other() {
        let additional = BoxConstraints::new(300.0, INF, 200.0, INF);
        let incoming = BoxConstraints::new(0.0, INF, 0.0, 150.0);
        let out = additional.enforce(incoming);
        assert_eq!(out, BoxConstraints::new(300.0, INF, 150.0, 150.0));
    }

    #[test]
    fn enforce_inside_range_is_unchanged() {
        let inner = BoxConstraints::tight(Size::new(100.0, 100.0));
        let outer = BoxConstraints::loose(Size::new(800.0, 600.0));
        assert_eq!(inner.enforce(outer), inner);
    }

    #[test]
    fn predicates() {
        let c = BoxConstraints::new(10.0, 10.0, 0.0, INF);
        assert!(c.has_tight_width());
        assert!(!c.has_tight_height());
        assert!(c.has_bounded_width());
        assert!(!c.has_bounded_height());
        assert!(!c.is_tight());
        assert!(!c.has_infinite_height());
        assert!(BoxConstraints::expand(None, None).has_infinite_width());
    }

    #[test]
    fn biggest_and_smallest() {
        let c = BoxConstraints::new(10.0, 100.0, 20.0, INF);
        assert_eq!(c.smallest(), Size::new(10.0, 20.0));
        assert_eq!(c.biggest(), Size::new(100.0, INF));
    }

    #[test]
    fn tighten_respects_bounds() {
        let c = BoxConstraints::new(0.0, 50.0, 0.0, 50.0);
        assert_eq!(
            c.tighten(Some(80.0), None),
            BoxConstraints::new(50.0, 50.0, 0.0, 50.0)
        );
        assert_eq!(c.loosen(), c);
    }

    #[test]
    fn tight_for_mixes_axes() {
        let c = BoxConstraints::tight_for(Some(12.0), None);
        assert!(c.has_tight_width());
        assert_eq!(c.max_height, INF);
    }

    #[test]
    fn normalize_fixes_inverted_ranges() {
        let c = BoxConstraints::new(-5.0, -10.0, 30.0, 10.0);
        assert!(!c.is_normalized());
        let n = c.normalize();
        assert!(n.is_normalized());
        assert_eq!(n, BoxConstraints::new(0.0, 0.0, 30.0, 30.0));
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(
            BoxConstraints::tight(Size::new(100.0, 50.0)).to_string(),
            "BoxConstraints(w=100.0, h=50.0)"
        );
        assert_eq!(
            BoxConstraints::new(0.0, INF, 10.0, 20.0).to_string(),
            "BoxConstraints(0.0<=w<=Infinity, 10.0<=h<=20.0)"
        );
        assert_eq!(
            BoxConstraints::UNCONSTRAINED.to_string(),
            "BoxConstraints(unconstrained)"
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "minimum greater than its maximum")]
    fn inverted_constraints_fail_validation() {
        BoxConstraints::new(20.0, 10.0, 0.0, 0.0).debug_assert_is_valid();
    }
}
