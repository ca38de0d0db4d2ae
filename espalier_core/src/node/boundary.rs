// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Repaint boundaries and offstage subtrees.

use alloc::format;
use alloc::string::String;

use crate::tree::{NodeId, RenderTree};

/// Paints its subtree into a layer of its own.
///
/// In debug builds the node counts how its layer was produced:
/// *symmetric* paints re-recorded the layer because its parent painted too,
/// *asymmetric* paints either reused the layer while the parent painted or
/// re-recorded it without the parent. A boundary is useful when most paints
/// are asymmetric.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepaintBoundary {
    pub(crate) symmetric_paint_count: u32,
    pub(crate) asymmetric_paint_count: u32,
}

impl RepaintBoundary {
    /// Creates a repaint boundary with zeroed metrics.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            symmetric_paint_count: 0,
            asymmetric_paint_count: 0,
        }
    }

    /// Paints where the layer was re-recorded along with its parent.
    #[inline]
    #[must_use]
    pub fn symmetric_paint_count(&self) -> u32 {
        self.symmetric_paint_count
    }

    /// Paints where the layer and its parent were not both recorded.
    #[inline]
    #[must_use]
    pub fn asymmetric_paint_count(&self) -> u32 {
        self.asymmetric_paint_count
    }

    /// Fraction of paints that were asymmetric, or `None` if never painted.
    #[must_use]
    pub fn usefulness(&self) -> Option<f64> {
        let total = self.symmetric_paint_count + self.asymmetric_paint_count;
        (total > 0).then(|| f64::from(self.asymmetric_paint_count) / f64::from(total))
    }

    /// A one-line verdict on whether the boundary earns its keep.
    #[must_use]
    pub fn diagnosis(&self) -> &'static str {
        let Some(fraction) = self.usefulness() else {
            return "no metrics collected yet (never painted)";
        };
        if self.symmetric_paint_count + self.asymmetric_paint_count < 5 {
            "insufficient data to draw conclusion (less than five repaints)"
        } else if fraction > 0.9 {
            "this is an outstandingly useful repaint boundary and should definitely be kept"
        } else if fraction > 0.5 {
            "this is a useful repaint boundary and should be kept"
        } else if fraction > 0.30 {
            "this repaint boundary is probably useful, but maybe it would be more useful in tandem with adding more repaint boundaries elsewhere"
        } else if fraction > 0.1 {
            "this repaint boundary does sometimes show value, though currently it does not appear to be very useful"
        } else if self.asymmetric_paint_count == 0 {
            "this repaint boundary is astoundingly ineffectual and should be removed"
        } else {
            "this repaint boundary is not very effective and should probably be removed"
        }
    }

    /// The usefulness ratio as text, e.g. `"75.0% useful (1 bad vs 3 good)"`.
    #[must_use]
    pub fn metrics(&self) -> Option<String> {
        self.usefulness().map(|fraction| {
            format!(
                "{:.1}% useful ({} bad vs {} good)",
                fraction * 100.0,
                self.symmetric_paint_count,
                self.asymmetric_paint_count
            )
        })
    }

    pub(crate) fn register_paint(&mut self, included_parent: bool, included_child: bool) {
        #[cfg(debug_assertions)]
        if included_parent && included_child {
            self.symmetric_paint_count += 1;
        } else {
            self.asymmetric_paint_count += 1;
        }
        #[cfg(not(debug_assertions))]
        {
            _ = (included_parent, included_child);
        }
    }
}

/// Lays out its child but neither paints it nor lets it be hit while
/// `offstage`, taking up the smallest size it is allowed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Offstage {
    pub(crate) offstage: bool,
}

impl Offstage {
    /// Creates an offstage node.
    #[must_use]
    pub const fn new(offstage: bool) -> Self {
        Self { offstage }
    }

    /// Whether the child is hidden.
    #[inline]
    #[must_use]
    pub fn offstage(&self) -> bool {
        self.offstage
    }
}

impl RenderTree {
    /// Zeroes a [`RepaintBoundary`]'s paint counters.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a `RepaintBoundary`.
    pub fn debug_reset_metrics(&mut self, id: NodeId) {
        *self.state_mut::<RepaintBoundary>(id) = RepaintBoundary::new();
    }

    /// Hides or shows an [`Offstage`] node's child.
    ///
    /// Whether the node is sized by its parent flips with the value, so both
    /// the node and its parent are marked for layout.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not an `Offstage`.
    pub fn set_offstage(&mut self, id: NodeId, offstage: bool) {
        let state = self.state_mut::<Offstage>(id);
        if state.offstage == offstage {
            return;
        }
        state.offstage = offstage;
        self.mark_needs_layout_for_sized_by_parent_change(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::decoration::ColorDecoration;
    use crate::node::{DecoratedBox, HitTestBehavior, PointerListener, ProxyBox};
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use espalier_paint::{Color, DrawCmd};
    use kurbo::{Point, Size};

    fn with_counts(symmetric: u32, asymmetric: u32) -> RepaintBoundary {
        RepaintBoundary {
            symmetric_paint_count: symmetric,
            asymmetric_paint_count: asymmetric,
        }
    }

    #[test]
    fn diagnosis_thresholds() {
        assert_eq!(
            RepaintBoundary::new().diagnosis(),
            "no metrics collected yet (never painted)"
        );
        assert!(with_counts(1, 2).diagnosis().starts_with("insufficient data"));
        assert!(with_counts(0, 10).diagnosis().contains("outstandingly useful"));
        assert!(with_counts(4, 6).diagnosis().contains("is a useful"));
        assert!(with_counts(6, 4).diagnosis().contains("probably useful"));
        assert!(with_counts(8, 2).diagnosis().contains("sometimes show value"));
        assert!(with_counts(10, 0).diagnosis().contains("astoundingly ineffectual"));
        assert!(with_counts(19, 1).diagnosis().contains("not very effective"));
    }

    #[test]
    fn metrics_text() {
        assert_eq!(
            with_counts(1, 3).metrics().as_deref(),
            Some("75.0% useful (1 bad vs 3 good)")
        );
        assert!(RepaintBoundary::new().metrics().is_none());
    }

    fn boundary_tree() -> (RenderTree, NodeId, NodeId, NodeId) {
        let mut tree = RenderTree::new();
        let root = tree.create_node(ProxyBox);
        let boundary = tree.create_node(RepaintBoundary::new());
        let deco = tree.create_node(DecoratedBox::new(Rc::new(ColorDecoration::new(
            Color::BLACK,
        ))));
        tree.set_child(root, Some(boundary));
        tree.set_child(boundary, Some(deco));
        tree.set_root(root);
        (tree, root, boundary, deco)
    }

    fn counts(tree: &RenderTree, id: NodeId) -> (u32, u32) {
        tree.get::<RepaintBoundary>(id)
            .map(|b| (b.symmetric_paint_count(), b.asymmetric_paint_count()))
            .unwrap_or_default()
    }

    #[cfg(debug_assertions)]
    #[test]
    fn paint_counters_track_layer_reuse() {
        let (mut tree, root, boundary, deco) = boundary_tree();
        let _ = tree.draw_frame();
        assert_eq!(counts(&tree, boundary), (1, 0), "first paint is with the parent");

        tree.mark_needs_paint(deco);
        assert!(!tree.needs_paint(root), "boundary stops propagation");
        let _ = tree.draw_frame();
        assert_eq!(counts(&tree, boundary), (1, 1), "repainted alone");

        tree.mark_needs_paint(root);
        let _ = tree.draw_frame();
        assert_eq!(counts(&tree, boundary), (1, 2), "layer reused by the parent");

        tree.debug_reset_metrics(boundary);
        assert_eq!(counts(&tree, boundary), (0, 0));
    }

    #[test]
    fn boundary_layer_is_inlined_in_display_list() {
        let (mut tree, _, boundary, _) = boundary_tree();
        let _ = tree.draw_frame();
        assert!(tree.layer(boundary).is_some());
        let names: Vec<_> = tree.display_list().iter().map(DrawCmd::name).collect();
        assert_eq!(names, ["Save", "Translate", "DrawPath", "Restore"]);
    }

    #[test]
    fn offstage_lays_out_child_but_hides_it() {
        let mut tree = RenderTree::with_config(PipelineConfig::loose(Size::new(200.0, 100.0), 1.0));
        let root = tree.create_node(ProxyBox);
        let offstage = tree.create_node(Offstage::new(true));
        let child = tree.create_node(PointerListener::new(HitTestBehavior::Opaque));
        tree.set_child(root, Some(offstage));
        tree.set_child(offstage, Some(child));
        tree.set_root(root);
        let _ = tree.draw_frame();

        assert_eq!(tree.size(offstage), Some(Size::ZERO));
        assert_eq!(tree.size(child), Some(Size::new(200.0, 100.0)));
        assert!(tree.display_list().is_empty());
        assert!(tree.hit_test(Point::new(1.0, 1.0)).is_empty());

        tree.set_offstage(offstage, false);
        assert!(tree.needs_layout(offstage));
        assert!(tree.needs_layout(root));
        let _ = tree.draw_frame();
        assert_eq!(tree.size(offstage), Some(Size::new(200.0, 100.0)));
        assert!(tree.hit_test(Point::new(1.0, 1.0)).contains(child));
    }

    #[test]
    fn offstage_skips_debug_outlines() {
        let config = PipelineConfig::loose(Size::new(200.0, 100.0), 1.0).with_debug_paint_size(true);
        let mut tree = RenderTree::with_config(config);
        let offstage = tree.create_node(Offstage::new(true));
        let child = tree.create_node(PointerListener::new(HitTestBehavior::DeferToChild));
        tree.set_child(offstage, Some(child));
        tree.set_root(offstage);
        let _ = tree.draw_frame();
        assert!(tree.display_list().is_empty());

        tree.set_offstage(offstage, false);
        let _ = tree.draw_frame();
        // One outline for the child, one for the offstage node.
        assert_eq!(tree.display_list().len(), 2);
    }
}
