// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nodes that adjust the constraints seen by their child.

use kurbo::Size;

use crate::constraints::BoxConstraints;
use crate::tree::{NodeId, RenderTree};

/// Imposes additional constraints on its child.
///
/// The child is laid out with `additional.enforce(incoming)`, so the
/// additional bounds win wherever they fit inside the incoming ones.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstrainedBox {
    pub(crate) additional: BoxConstraints,
}

impl ConstrainedBox {
    /// Creates a constrained box.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `additional` is not normalized.
    #[must_use]
    pub fn new(additional: BoxConstraints) -> Self {
        debug_assert!(
            additional.is_normalized(),
            "RenderConstrainedBox given non-normalized constraints: {additional}"
        );
        Self { additional }
    }

    /// The constraints enforced on top of the incoming ones.
    #[inline]
    #[must_use]
    pub fn additional_constraints(&self) -> BoxConstraints {
        self.additional
    }
}

/// Caps the unbounded axes of its incoming constraints.
///
/// Useful for children that would otherwise grow to infinity when placed in
/// an unbounded context such as a flow container's main axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LimitedBox {
    pub(crate) max_width: f64,
    pub(crate) max_height: f64,
}

impl LimitedBox {
    /// Creates a limited box with the given caps.
    ///
    /// # Panics
    ///
    /// Panics if either cap is negative or NaN.
    #[must_use]
    pub fn new(max_width: f64, max_height: f64) -> Self {
        assert!(
            max_width >= 0.0 && max_height >= 0.0,
            "RenderLimitedBox limits must be non-negative, got {max_width} x {max_height}"
        );
        Self {
            max_width,
            max_height,
        }
    }

    /// Cap applied when the incoming width is unbounded.
    #[inline]
    #[must_use]
    pub fn max_width(&self) -> f64 {
        self.max_width
    }

    /// Cap applied when the incoming height is unbounded.
    #[inline]
    #[must_use]
    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    /// Replaces only the unbounded maxima of `c` with the caps.
    pub(crate) fn limit(&self, c: BoxConstraints) -> BoxConstraints {
        BoxConstraints::new(
            c.min_width,
            if c.has_bounded_width() {
                c.max_width
            } else {
                c.constrain_width(self.max_width)
            },
            c.min_height,
            if c.has_bounded_height() {
                c.max_height
            } else {
                c.constrain_height(self.max_height)
            },
        )
    }
}

/// Sizes itself to a fixed width-to-height ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AspectRatio {
    pub(crate) aspect_ratio: f64,
}

impl AspectRatio {
    /// Creates an aspect-ratio node for `width / height == aspect_ratio`.
    ///
    /// # Panics
    ///
    /// Panics unless `aspect_ratio` is finite and positive.
    #[must_use]
    pub fn new(aspect_ratio: f64) -> Self {
        assert_valid_ratio(aspect_ratio);
        Self { aspect_ratio }
    }

    /// The width-to-height ratio.
    #[inline]
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Picks the largest ratio-preserving size the constraints allow.
    ///
    /// Starts from the maximum width and fixes violations in order: too wide,
    /// too tall, too narrow, too short. Each fix recomputes the other axis
    /// from the ratio. The result is clamped into `c`, so when no exact
    /// solution exists the ratio is abandoned in favor of the bounds.
    pub(crate) fn apply(&self, c: BoxConstraints) -> Size {
        c.debug_assert_is_valid();
        debug_assert!(
            c.has_bounded_width() || c.has_bounded_height(),
            "RenderAspectRatio has unbounded constraints: {c}"
        );
        if c.is_tight() {
            return c.smallest();
        }

        let r = self.aspect_ratio;
        let mut width = c.max_width;
        let mut height = width / r;

        if width > c.max_width {
            width = c.max_width;
            height = width / r;
        }
        if height > c.max_height {
            height = c.max_height;
            width = height * r;
        }
        if width < c.min_width {
            width = c.min_width;
            height = width / r;
        }
        if height < c.min_height {
            height = c.min_height;
            width = height * r;
        }

        c.constrain(Size::new(width, height))
    }
}

fn assert_valid_ratio(aspect_ratio: f64) {
    assert!(
        aspect_ratio.is_finite() && aspect_ratio > 0.0,
        "aspect ratio must be finite and positive, got {aspect_ratio}"
    );
}

impl RenderTree {
    /// Replaces a [`ConstrainedBox`]'s additional constraints.
    ///
    /// Marks the node for layout if the value changed.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a `ConstrainedBox`.
    pub fn set_additional_constraints(&mut self, id: NodeId, additional: BoxConstraints) {
        debug_assert!(
            additional.is_normalized(),
            "RenderConstrainedBox given non-normalized constraints: {additional}"
        );
        let state = self.state_mut::<ConstrainedBox>(id);
        if state.additional == additional {
            return;
        }
        state.additional = additional;
        self.mark_needs_layout(id);
    }

    /// Replaces a [`LimitedBox`]'s width cap.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, the node is not a `LimitedBox`, or the
    /// cap is negative.
    pub fn set_limited_max_width(&mut self, id: NodeId, max_width: f64) {
        assert!(max_width >= 0.0, "RenderLimitedBox max width must be non-negative");
        let state = self.state_mut::<LimitedBox>(id);
        if state.max_width == max_width {
            return;
        }
        state.max_width = max_width;
        self.mark_needs_layout(id);
    }

    /// Replaces a [`LimitedBox`]'s height cap.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, the node is not a `LimitedBox`, or the
    /// cap is negative.
    pub fn set_limited_max_height(&mut self, id: NodeId, max_height: f64) {
        assert!(max_height >= 0.0, "RenderLimitedBox max height must be non-negative");
        let state = self.state_mut::<LimitedBox>(id);
        if state.max_height == max_height {
            return;
        }
        state.max_height = max_height;
        self.mark_needs_layout(id);
    }

    /// Replaces an [`AspectRatio`]'s ratio.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, the node is not an `AspectRatio`, or
    /// the ratio is not finite and positive.
    pub fn set_aspect_ratio(&mut self, id: NodeId, aspect_ratio: f64) {
        assert_valid_ratio(aspect_ratio);
        let state = self.state_mut::<AspectRatio>(id);
        if state.aspect_ratio == aspect_ratio {
            return;
        }
        state.aspect_ratio = aspect_ratio;
        self.mark_needs_layout(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ProxyBox;

    const EPS: f64 = 1e-9;

    fn loose(w: f64, h: f64) -> BoxConstraints {
        BoxConstraints::loose(Size::new(w, h))
    }

    #[test]
    fn constrained_box_without_child_takes_enforced_minimum() {
        let mut tree = RenderTree::new();
        let node = tree.create_node(ConstrainedBox::new(BoxConstraints::tight(Size::new(
            100.0, 100.0,
        ))));
        tree.layout(node, loose(300.0, 300.0), true);
        assert_eq!(tree.size(node), Some(Size::new(100.0, 100.0)));
    }

    #[test]
    fn constrained_box_passes_enforced_constraints_down() {
        let mut tree = RenderTree::new();
        let node = tree.create_node(ConstrainedBox::new(BoxConstraints::new(
            50.0,
            f64::INFINITY,
            20.0,
            40.0,
        )));
        let child = tree.create_node(ProxyBox);
        tree.set_child(node, Some(child));
        tree.layout(node, loose(300.0, 300.0), true);
        assert_eq!(
            tree.constraints(child),
            Some(BoxConstraints::new(50.0, 300.0, 20.0, 40.0))
        );
        // A childless proxy picks the smallest size it is offered.
        assert_eq!(tree.size(node), Some(Size::new(50.0, 20.0)));
    }

    #[test]
    fn limited_box_caps_only_unbounded_axes() {
        let limited = LimitedBox::new(120.0, 80.0);
        let c = BoxConstraints::new(0.0, f64::INFINITY, 0.0, 50.0);
        let limited_c = limited.limit(c);
        assert_eq!(limited_c.max_width, 120.0);
        assert_eq!(limited_c.max_height, 50.0);
    }

    #[test]
    fn limited_box_child_size_is_clamped_to_original_constraints() {
        let mut tree = RenderTree::new();
        let node = tree.create_node(LimitedBox::new(120.0, 80.0));
        let child = tree.create_node(ConstrainedBox::new(BoxConstraints::expand(None, None)));
        tree.set_child(node, Some(child));
        tree.layout(node, BoxConstraints::UNCONSTRAINED, true);
        assert_eq!(tree.size(child), Some(Size::new(120.0, 80.0)));
        assert_eq!(tree.size(node), Some(Size::new(120.0, 80.0)));
    }

    #[test]
    fn limited_box_without_child_is_zero_in_loose_constraints() {
        let mut tree = RenderTree::new();
        let node = tree.create_node(LimitedBox::new(120.0, 80.0));
        tree.layout(node, BoxConstraints::UNCONSTRAINED, true);
        assert_eq!(tree.size(node), Some(Size::ZERO));
    }

    #[test]
    fn aspect_ratio_prefers_max_width() {
        let ar = AspectRatio::new(2.0);
        assert_eq!(ar.apply(loose(200.0, 300.0)), Size::new(200.0, 100.0));
    }

    #[test]
    fn aspect_ratio_falls_back_to_max_height() {
        let ar = AspectRatio::new(2.0);
        assert_eq!(ar.apply(loose(200.0, 50.0)), Size::new(100.0, 50.0));
        let unbounded_width = BoxConstraints::new(0.0, f64::INFINITY, 0.0, 60.0);
        assert_eq!(ar.apply(unbounded_width), Size::new(120.0, 60.0));
    }

    #[test]
    fn aspect_ratio_honors_minimums() {
        let ar = AspectRatio::new(0.5);
        let c = BoxConstraints::new(100.0, 100.0, 0.0, 500.0);
        assert_eq!(ar.apply(c), Size::new(100.0, 200.0));
    }

    #[test]
    fn aspect_ratio_tight_returns_smallest() {
        let ar = AspectRatio::new(3.0);
        let c = BoxConstraints::tight(Size::new(10.0, 10.0));
        assert_eq!(ar.apply(c), Size::new(10.0, 10.0));
    }

    #[test]
    fn aspect_ratio_result_keeps_ratio_and_bounds() {
        let cases = [
            (1.5, loose(300.0, 300.0)),
            (0.25, loose(300.0, 300.0)),
            (4.0, BoxConstraints::new(10.0, 400.0, 10.0, 90.0)),
            (1.0, BoxConstraints::new(0.0, f64::INFINITY, 0.0, 75.0)),
        ];
        for (ratio, c) in cases {
            let size = AspectRatio::new(ratio).apply(c);
            assert!(c.is_satisfied_by(size), "{size:?} outside {c}");
            assert!(
                (size.width / size.height - ratio).abs() < EPS,
                "{size:?} breaks ratio {ratio}"
            );
        }
    }

    #[test]
    fn aspect_ratio_forces_child_tight() {
        let mut tree = RenderTree::new();
        let node = tree.create_node(AspectRatio::new(2.0));
        let child = tree.create_node(ProxyBox);
        tree.set_child(node, Some(child));
        tree.layout(node, loose(200.0, 300.0), true);
        assert_eq!(
            tree.constraints(child),
            Some(BoxConstraints::tight(Size::new(200.0, 100.0)))
        );
        assert_eq!(tree.size(child), Some(Size::new(200.0, 100.0)));
    }

    #[test]
    fn setters_mark_layout() {
        let mut tree = RenderTree::new();
        let node = tree.create_node(AspectRatio::new(2.0));
        tree.layout(node, loose(200.0, 300.0), true);
        assert!(!tree.needs_layout(node));
        tree.set_aspect_ratio(node, 2.0);
        assert!(!tree.needs_layout(node), "unchanged value is a no-op");
        tree.set_aspect_ratio(node, 1.0);
        assert!(tree.needs_layout(node));
    }

    #[test]
    #[should_panic(expected = "aspect ratio must be finite and positive")]
    fn zero_ratio_panics() {
        let _ = AspectRatio::new(0.0);
    }

    #[test]
    #[should_panic(expected = "is a RenderProxyBox, expected RenderLimitedBox")]
    fn wrong_kind_setter_panics() {
        let mut tree = RenderTree::new();
        let node = tree.create_node(ProxyBox);
        tree.set_limited_max_width(node, 10.0);
    }
}
