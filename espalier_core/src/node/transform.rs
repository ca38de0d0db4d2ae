// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint-time transforms.
//!
//! Neither kind affects its own size: the child is laid out as if the
//! transform were absent, and the transform applies only to painting and
//! (optionally) hit testing.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Affine, Size, Vec2};

use crate::tree::{NodeId, RenderTree};

/// Below this determinant a matrix is treated as non-invertible.
pub(crate) const SINGULAR_DETERMINANT: f64 = 1.0 / (4096.0 * 4096.0 * 4096.0);

/// A point within a box, in normalized coordinates.
///
/// `(-1, -1)` is the top-left corner, `(0, 0)` the center, and `(1, 1)` the
/// bottom-right corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Alignment {
    /// Horizontal position, `-1.0` at the left edge.
    pub x: f64,
    /// Vertical position, `-1.0` at the top edge.
    pub y: f64,
}

impl Alignment {
    /// Top-left corner.
    pub const TOP_LEFT: Self = Self::new(-1.0, -1.0);
    /// Center of the top edge.
    pub const TOP_CENTER: Self = Self::new(0.0, -1.0);
    /// Top-right corner.
    pub const TOP_RIGHT: Self = Self::new(1.0, -1.0);
    /// Center of the left edge.
    pub const CENTER_LEFT: Self = Self::new(-1.0, 0.0);
    /// Center.
    pub const CENTER: Self = Self::new(0.0, 0.0);
    /// Center of the right edge.
    pub const CENTER_RIGHT: Self = Self::new(1.0, 0.0);
    /// Bottom-left corner.
    pub const BOTTOM_LEFT: Self = Self::new(-1.0, 1.0);
    /// Center of the bottom edge.
    pub const BOTTOM_CENTER: Self = Self::new(0.0, 1.0);
    /// Bottom-right corner.
    pub const BOTTOM_RIGHT: Self = Self::new(1.0, 1.0);

    /// Creates an alignment.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The offset of this alignment within a box of `size`.
    #[must_use]
    pub fn along_size(self, size: Size) -> Vec2 {
        let cx = size.width / 2.0;
        let cy = size.height / 2.0;
        Vec2::new(cx + self.x * cx, cy + self.y * cy)
    }
}

/// Returns the translation if `m` has an identity linear part.
pub(crate) fn as_translation(m: Affine) -> Option<Vec2> {
    let [a, b, c, d, e, f] = m.as_coeffs();
    (a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0).then_some(Vec2::new(e, f))
}

/// Inverts `m`, or returns `None` if it is (nearly) singular.
pub(crate) fn try_invert(m: Affine) -> Option<Affine> {
    (m.determinant().abs() >= SINGULAR_DETERMINANT).then(|| m.inverse())
}

/// Applies a 2D affine transform to its child at paint time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub(crate) transform: Affine,
    pub(crate) origin: Option<Vec2>,
    pub(crate) alignment: Option<Alignment>,
    pub(crate) transform_hit_tests: bool,
}

impl Transform {
    /// Creates a transform node that also transforms hit tests.
    #[must_use]
    pub fn new(transform: Affine) -> Self {
        Self {
            transform,
            origin: None,
            alignment: None,
            transform_hit_tests: true,
        }
    }

    /// Returns this node with the transform applied about `origin`.
    #[must_use]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Returns this node with the transform applied about `alignment`.
    #[must_use]
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Returns this node with hit-test transformation switched.
    #[must_use]
    pub fn with_transform_hit_tests(mut self, enabled: bool) -> Self {
        self.transform_hit_tests = enabled;
        self
    }

    /// The transform as given, before origin and alignment.
    #[inline]
    #[must_use]
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// The transform origin, relative to the node's top-left corner.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Option<Vec2> {
        self.origin
    }

    /// The alignment of the transform origin within the node.
    #[inline]
    #[must_use]
    pub fn alignment(&self) -> Option<Alignment> {
        self.alignment
    }

    /// Whether hit tests are mapped through the inverse transform.
    #[inline]
    #[must_use]
    pub fn transform_hit_tests(&self) -> bool {
        self.transform_hit_tests
    }

    /// Whether the transform only translates.
    #[must_use]
    pub fn is_translation(&self) -> bool {
        as_translation(self.transform).is_some()
    }

    /// The matrix actually applied for a node of `size`:
    /// `T(origin) · T(alignment) · M · T(−alignment) · T(−origin)`.
    #[must_use]
    pub fn effective_transform(&self, size: Size) -> Affine {
        if self.origin.is_none() && self.alignment.is_none() {
            return self.transform;
        }
        let mut result = Affine::IDENTITY;
        if let Some(origin) = self.origin {
            result *= Affine::translate(origin);
        }
        let align = self.alignment.map(|a| a.along_size(size));
        if let Some(t) = align {
            result *= Affine::translate(t);
        }
        result *= self.transform;
        if let Some(t) = align {
            result *= Affine::translate(-t);
        }
        if let Some(origin) = self.origin {
            result *= Affine::translate(-origin);
        }
        result
    }
}

/// Offsets its child by a fraction of the node's own size at paint time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractionalTranslation {
    pub(crate) translation: Vec2,
    pub(crate) transform_hit_tests: bool,
}

impl FractionalTranslation {
    /// Creates a fractional translation that also moves hit tests.
    #[must_use]
    pub fn new(translation: Vec2) -> Self {
        Self {
            translation,
            transform_hit_tests: true,
        }
    }

    /// Returns this node with hit-test translation switched.
    #[must_use]
    pub fn with_transform_hit_tests(mut self, enabled: bool) -> Self {
        self.transform_hit_tests = enabled;
        self
    }

    /// The translation as a fraction of the node's size.
    #[inline]
    #[must_use]
    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    /// Whether hit tests are shifted back by the same offset.
    #[inline]
    #[must_use]
    pub fn transform_hit_tests(&self) -> bool {
        self.transform_hit_tests
    }

    /// The paint offset for a node of `size`.
    #[must_use]
    pub fn offset_for(&self, size: Size) -> Vec2 {
        Vec2::new(
            self.translation.x * size.width,
            self.translation.y * size.height,
        )
    }
}

impl RenderTree {
    /// Replaces a [`Transform`] node's matrix.
    ///
    /// Marks paint, and the compositing bits when the matrix switches between
    /// a pure translation and anything else.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a `Transform`.
    pub fn set_transform(&mut self, id: NodeId, transform: Affine) {
        self.update_transform(id, |_| transform);
    }

    /// Resets a [`Transform`] node's matrix to identity.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a `Transform`.
    pub fn set_transform_identity(&mut self, id: NodeId) {
        self.update_transform(id, |_| Affine::IDENTITY);
    }

    /// Post-multiplies a [`Transform`] node's matrix by a rotation.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a `Transform`.
    pub fn rotate_z(&mut self, id: NodeId, radians: f64) {
        self.update_transform(id, |m| m * Affine::rotate(radians));
    }

    /// Post-multiplies a [`Transform`] node's matrix by a translation.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a `Transform`.
    pub fn translate(&mut self, id: NodeId, x: f64, y: f64) {
        self.update_transform(id, |m| m * Affine::translate((x, y)));
    }

    /// Post-multiplies a [`Transform`] node's matrix by a scale.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a `Transform`.
    pub fn scale(&mut self, id: NodeId, x: f64, y: f64) {
        self.update_transform(id, |m| m * Affine::scale_non_uniform(x, y));
    }

    /// Moves a [`Transform`] node's origin. Marks paint on change.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a `Transform`.
    pub fn set_origin(&mut self, id: NodeId, origin: Option<Vec2>) {
        let state = self.state_mut::<Transform>(id);
        if state.origin == origin {
            return;
        }
        state.origin = origin;
        self.mark_needs_paint(id);
    }

    /// Moves a [`Transform`] node's alignment. Marks paint on change.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a `Transform`.
    pub fn set_alignment(&mut self, id: NodeId, alignment: Option<Alignment>) {
        let state = self.state_mut::<Transform>(id);
        if state.alignment == alignment {
            return;
        }
        state.alignment = alignment;
        self.mark_needs_paint(id);
    }

    /// Switches hit-test transformation on a [`Transform`] or
    /// [`FractionalTranslation`] node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is neither kind.
    pub fn set_transform_hit_tests(&mut self, id: NodeId, enabled: bool) {
        if let Some(state) = self.get_mut::<FractionalTranslation>(id) {
            state.transform_hit_tests = enabled;
        } else {
            self.state_mut::<Transform>(id).transform_hit_tests = enabled;
        }
    }

    /// Replaces a [`FractionalTranslation`] node's translation. Marks paint
    /// on change.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a
    /// `FractionalTranslation`.
    pub fn set_translation(&mut self, id: NodeId, translation: Vec2) {
        let state = self.state_mut::<FractionalTranslation>(id);
        if state.translation == translation {
            return;
        }
        state.translation = translation;
        self.mark_needs_paint(id);
    }

    fn update_transform(&mut self, id: NodeId, f: impl FnOnce(Affine) -> Affine) {
        let has_child = self.has_child(id);
        let state = self.state_mut::<Transform>(id);
        let new = f(state.transform);
        if state.transform == new {
            return;
        }
        let did_need_compositing = has_child && !state.is_translation();
        state.transform = new;
        let needs_compositing = has_child && !state.is_translation();
        if did_need_compositing != needs_compositing {
            self.mark_needs_compositing_bits_update(id);
        }
        self.mark_needs_paint(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::constraints::BoxConstraints;
    use crate::node::{ConstrainedBox, HitTestBehavior, PointerListener, ProxyBox};
    use alloc::vec::Vec;
    use core::f64::consts::FRAC_PI_2;
    use espalier_paint::DrawCmd;
    use kurbo::Point;

    const EPS: f64 = 1e-9;

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < EPS
    }

    #[test]
    fn alignment_along_size() {
        let size = Size::new(100.0, 50.0);
        assert_eq!(Alignment::TOP_LEFT.along_size(size), Vec2::ZERO);
        assert_eq!(Alignment::CENTER.along_size(size), Vec2::new(50.0, 25.0));
        assert_eq!(Alignment::BOTTOM_RIGHT.along_size(size), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn effective_transform_rotates_about_alignment() {
        let node = Transform::new(Affine::rotate(FRAC_PI_2)).with_alignment(Alignment::CENTER);
        let m = node.effective_transform(Size::new(100.0, 100.0));
        // The center is fixed; the top-left corner swings to the top-right.
        assert!(close(m * Point::new(50.0, 50.0), Point::new(50.0, 50.0)));
        assert!(close(m * Point::new(0.0, 0.0), Point::new(100.0, 0.0)));
    }

    #[test]
    fn effective_transform_composes_origin_and_alignment() {
        let node = Transform::new(Affine::scale(2.0))
            .with_origin(Vec2::new(10.0, 0.0))
            .with_alignment(Alignment::TOP_LEFT);
        let m = node.effective_transform(Size::new(40.0, 40.0));
        assert!(close(m * Point::new(10.0, 0.0), Point::new(10.0, 0.0)));
        assert!(close(m * Point::new(20.0, 5.0), Point::new(30.0, 10.0)));
    }

    #[test]
    fn translation_detection_ignores_offset() {
        assert!(as_translation(Affine::translate((3.0, 4.0))).is_some());
        assert!(as_translation(Affine::scale(2.0)).is_none());
        assert!(try_invert(Affine::scale_non_uniform(0.0, 1.0)).is_none());
    }

    fn transform_over_listener(tree: &mut RenderTree, transform: Transform) -> (NodeId, NodeId) {
        let root = tree.create_node(transform);
        let listener = tree.create_node(PointerListener::new(HitTestBehavior::Opaque));
        tree.set_child(root, Some(listener));
        tree.set_root(root);
        let _ = tree.draw_frame();
        (root, listener)
    }

    #[test]
    fn translation_paints_child_at_offset_without_layer() {
        let mut tree = RenderTree::new();
        let root = tree.create_node(ProxyBox);
        let node = tree.create_node(Transform::new(Affine::translate((5.0, 7.0))));
        let deco = tree.create_node(crate::node::DecoratedBox::new(alloc::rc::Rc::new(
            crate::decoration::ColorDecoration::new(espalier_paint::Color::BLACK),
        )));
        tree.set_child(root, Some(node));
        tree.set_child(node, Some(deco));
        tree.set_root(root);
        let _ = tree.draw_frame();

        assert!(!tree.needs_compositing(node));
        let list = tree.display_list();
        assert_eq!(list.len(), 1);
        match &list.commands()[0] {
            DrawCmd::DrawPath { path, .. } => {
                assert_eq!(path.bounding_box().origin(), Point::new(5.0, 7.0));
            }
            other => panic!("expected DrawPath, got {other:?}"),
        }
    }

    #[test]
    fn rotation_pushes_composited_transform() {
        let mut tree = RenderTree::new();
        let (root, _) = transform_over_listener(&mut tree, Transform::new(Affine::rotate(0.3)));
        assert!(tree.needs_compositing(root));
        let names: Vec<_> = tree.display_list().iter().map(DrawCmd::name).collect();
        assert_eq!(names, ["SaveLayer", "Concat", "Restore"]);
    }

    #[test]
    fn hit_test_maps_through_inverse() {
        let mut tree = RenderTree::new();
        let (_, listener) = transform_over_listener(&mut tree, Transform::new(Affine::scale(2.0)));
        let result = tree.hit_test(Point::new(1000.0, 500.0));
        let entry = result.entries().iter().find(|e| e.target == listener);
        assert!(entry.is_some_and(|e| close(e.local_position, Point::new(500.0, 250.0))));
    }

    #[test]
    fn hit_test_untransformed_when_disabled() {
        let mut tree = RenderTree::new();
        let (_, listener) = transform_over_listener(
            &mut tree,
            Transform::new(Affine::scale(2.0)).with_transform_hit_tests(false),
        );
        assert!(!tree.hit_test(Point::new(1000.0, 500.0)).contains(listener));
    }

    #[test]
    fn singular_transform_never_hits() {
        let mut tree = RenderTree::new();
        let (_, listener) = transform_over_listener(
            &mut tree,
            Transform::new(Affine::scale_non_uniform(0.0, 1.0)),
        );
        assert!(tree.hit_test(Point::new(0.0, 10.0)).is_empty());
        assert!(!tree.hit_test(Point::new(10.0, 10.0)).contains(listener));
    }

    #[test]
    fn conveniences_post_multiply_and_mark_paint() {
        let mut tree = RenderTree::new();
        let (root, _) = transform_over_listener(&mut tree, Transform::new(Affine::IDENTITY));
        tree.translate(root, 10.0, 0.0);
        tree.scale(root, 2.0, 2.0);
        assert!(tree.needs_paint(root));
        let m = tree.get::<Transform>(root).map(Transform::transform);
        assert_eq!(m, Some(Affine::translate((10.0, 0.0)) * Affine::scale(2.0)));

        tree.set_transform_identity(root);
        assert_eq!(tree.get::<Transform>(root).map(Transform::transform), Some(Affine::IDENTITY));
    }

    #[test]
    fn leaving_pure_translation_marks_compositing() {
        let mut tree = RenderTree::new();
        let (root, _) = transform_over_listener(&mut tree, Transform::new(Affine::IDENTITY));
        tree.translate(root, 1.0, 1.0);
        assert!(!tree.needs_compositing_bits_update(root));
        tree.rotate_z(root, 0.5);
        assert!(tree.needs_compositing_bits_update(root));
    }

    #[test]
    fn fractional_translation_offsets_paint_and_hits() {
        let mut tree = RenderTree::with_config(PipelineConfig::loose(Size::new(800.0, 600.0), 1.0));
        let root = tree.create_node(ConstrainedBox::new(BoxConstraints::tight(Size::new(
            100.0, 50.0,
        ))));
        let shift = tree.create_node(FractionalTranslation::new(Vec2::new(0.5, 0.5)));
        let listener = tree.create_node(PointerListener::new(HitTestBehavior::Opaque));
        tree.set_child(root, Some(shift));
        tree.set_child(shift, Some(listener));
        tree.set_root(root);
        let _ = tree.draw_frame();

        // Hit at (60, 35) in root space lands at (10, 10) in the child.
        let result = tree.hit_test(Point::new(60.0, 35.0));
        let entry = result.entries().iter().find(|e| e.target == listener);
        assert!(entry.is_some_and(|e| close(e.local_position, Point::new(10.0, 10.0))));

        let m = tree.transform_to(listener, None);
        assert_eq!(m, Some(Affine::translate((50.0, 25.0))));
    }
}
