// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A row or column of children.
//!
//! Children are laid out one after another along the main axis with
//! unbounded main-axis constraints, so each picks its own extent. The
//! container takes the full main-axis space when it is bounded and aligns
//! children on the cross axis.

use kurbo::{Size, Vec2};

use crate::constraints::BoxConstraints;
use crate::tree::{NodeId, RenderTree};

/// The direction children are placed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Left to right.
    #[default]
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl Axis {
    /// The extent of `size` along this axis.
    #[inline]
    #[must_use]
    pub fn main(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    /// The extent of `size` across this axis.
    #[inline]
    #[must_use]
    pub fn cross(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.height,
            Self::Vertical => size.width,
        }
    }

    /// Builds a size from main and cross extents.
    #[inline]
    #[must_use]
    pub fn size(self, main: f64, cross: f64) -> Size {
        match self {
            Self::Horizontal => Size::new(main, cross),
            Self::Vertical => Size::new(cross, main),
        }
    }

    /// Builds an offset from main and cross positions.
    #[inline]
    #[must_use]
    pub fn offset(self, main: f64, cross: f64) -> Vec2 {
        match self {
            Self::Horizontal => Vec2::new(main, cross),
            Self::Vertical => Vec2::new(cross, main),
        }
    }
}

/// Placement of children across the main axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CrossAxisAlignment {
    /// At the start of the cross axis.
    #[default]
    Start,
    /// At the end of the cross axis.
    End,
    /// Centered on the cross axis.
    Center,
    /// Forced to fill the cross axis.
    Stretch,
}

/// Lays out any number of children in a row or column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flex {
    pub(crate) direction: Axis,
    pub(crate) cross_axis_alignment: CrossAxisAlignment,
}

impl Flex {
    /// Creates a flow container.
    #[must_use]
    pub const fn new(direction: Axis) -> Self {
        Self {
            direction,
            cross_axis_alignment: CrossAxisAlignment::Start,
        }
    }

    /// Returns this container with a different cross-axis alignment.
    #[must_use]
    pub const fn with_cross_axis_alignment(mut self, alignment: CrossAxisAlignment) -> Self {
        self.cross_axis_alignment = alignment;
        self
    }

    /// The main axis.
    #[inline]
    #[must_use]
    pub fn direction(&self) -> Axis {
        self.direction
    }

    /// The cross-axis alignment.
    #[inline]
    #[must_use]
    pub fn cross_axis_alignment(&self) -> CrossAxisAlignment {
        self.cross_axis_alignment
    }

    /// Constraints each child is laid out with.
    pub(crate) fn child_constraints(&self, c: BoxConstraints) -> BoxConstraints {
        let (max_cross, min_cross) = match self.direction {
            Axis::Horizontal => (c.max_height, c.min_height),
            Axis::Vertical => (c.max_width, c.min_width),
        };
        let (cross_lo, cross_hi) = match self.cross_axis_alignment {
            CrossAxisAlignment::Stretch if max_cross.is_finite() => (max_cross, max_cross),
            CrossAxisAlignment::Stretch => (min_cross, max_cross),
            _ => (0.0, max_cross),
        };
        match self.direction {
            Axis::Horizontal => BoxConstraints::new(0.0, f64::INFINITY, cross_lo, cross_hi),
            Axis::Vertical => BoxConstraints::new(cross_lo, cross_hi, 0.0, f64::INFINITY),
        }
    }

    /// Cross-axis position of a child of extent `child` in a container of
    /// extent `cross`.
    pub(crate) fn cross_position(&self, cross: f64, child: f64) -> f64 {
        match self.cross_axis_alignment {
            CrossAxisAlignment::Start | CrossAxisAlignment::Stretch => 0.0,
            CrossAxisAlignment::End => cross - child,
            CrossAxisAlignment::Center => (cross - child) / 2.0,
        }
    }
}

impl RenderTree {
    /// Changes a [`Flex`]'s main axis. Marks layout on change.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a `Flex`.
    pub fn set_direction(&mut self, id: NodeId, direction: Axis) {
        let state = self.state_mut::<Flex>(id);
        if state.direction == direction {
            return;
        }
        state.direction = direction;
        self.mark_needs_layout(id);
    }

    /// Changes a [`Flex`]'s cross-axis alignment. Marks layout on change.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a `Flex`.
    pub fn set_cross_axis_alignment(&mut self, id: NodeId, alignment: CrossAxisAlignment) {
        let state = self.state_mut::<Flex>(id);
        if state.cross_axis_alignment == alignment {
            return;
        }
        state.cross_axis_alignment = alignment;
        self.mark_needs_layout(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::node::{ConstrainedBox, HitTestBehavior, PointerListener};
    use kurbo::Point;

    fn fixed(tree: &mut RenderTree, w: f64, h: f64) -> NodeId {
        tree.create_node(ConstrainedBox::new(BoxConstraints::tight(Size::new(w, h))))
    }

    #[test]
    fn row_places_children_sequentially() {
        let mut tree = RenderTree::with_config(PipelineConfig::loose(Size::new(300.0, 100.0), 1.0));
        let row = tree.create_node(Flex::new(Axis::Horizontal));
        let a = fixed(&mut tree, 50.0, 20.0);
        let b = fixed(&mut tree, 30.0, 40.0);
        tree.add_child(row, a);
        tree.add_child(row, b);
        tree.set_root(row);
        let _ = tree.draw_frame();

        assert_eq!(tree.size(row), Some(Size::new(300.0, 40.0)));
        assert_eq!(tree.child_offset(a), Vec2::ZERO);
        assert_eq!(tree.child_offset(b), Vec2::new(50.0, 0.0));
    }

    #[test]
    fn alignment_positions_on_cross_axis() {
        let mut tree = RenderTree::with_config(PipelineConfig::loose(Size::new(300.0, 100.0), 1.0));
        let column = tree.create_node(
            Flex::new(Axis::Vertical).with_cross_axis_alignment(CrossAxisAlignment::Center),
        );
        let a = fixed(&mut tree, 50.0, 20.0);
        let b = fixed(&mut tree, 30.0, 40.0);
        tree.add_child(column, a);
        tree.add_child(column, b);
        tree.set_root(column);
        let _ = tree.draw_frame();

        assert_eq!(tree.size(column), Some(Size::new(50.0, 100.0)));
        assert_eq!(tree.child_offset(a), Vec2::new(0.0, 0.0));
        assert_eq!(tree.child_offset(b), Vec2::new(10.0, 20.0));

        tree.set_cross_axis_alignment(column, CrossAxisAlignment::End);
        let _ = tree.draw_frame();
        assert_eq!(tree.child_offset(b), Vec2::new(20.0, 20.0));
    }

    #[test]
    fn stretch_tightens_cross_axis() {
        let flex = Flex::new(Axis::Horizontal).with_cross_axis_alignment(CrossAxisAlignment::Stretch);
        let c = flex.child_constraints(BoxConstraints::loose(Size::new(300.0, 80.0)));
        assert_eq!(c, BoxConstraints::new(0.0, f64::INFINITY, 80.0, 80.0));
    }

    #[test]
    fn later_children_hit_first() {
        let mut tree = RenderTree::with_config(PipelineConfig::loose(Size::new(300.0, 100.0), 1.0));
        let row = tree.create_node(Flex::new(Axis::Horizontal));
        let a = tree.create_node(PointerListener::new(HitTestBehavior::Opaque));
        let sized_a = fixed(&mut tree, 50.0, 50.0);
        tree.set_child(sized_a, Some(a));
        let b = tree.create_node(PointerListener::new(HitTestBehavior::Opaque));
        let sized_b = fixed(&mut tree, 50.0, 50.0);
        tree.set_child(sized_b, Some(b));
        tree.add_child(row, sized_a);
        tree.add_child(row, sized_b);
        tree.set_root(row);
        let _ = tree.draw_frame();

        let result = tree.hit_test(Point::new(60.0, 10.0));
        assert!(result.contains(b));
        assert!(!result.contains(a));
        let entry = result.entries().iter().find(|e| e.target == b);
        assert_eq!(entry.map(|e| e.local_position), Some(Point::new(10.0, 10.0)));
    }

    #[test]
    fn remove_child_relinks_siblings() {
        let mut tree = RenderTree::new();
        let row = tree.create_node(Flex::new(Axis::Horizontal));
        let a = fixed(&mut tree, 1.0, 1.0);
        let b = fixed(&mut tree, 1.0, 1.0);
        let c = fixed(&mut tree, 1.0, 1.0);
        tree.add_child(row, a);
        tree.add_child(row, b);
        tree.add_child(row, c);
        tree.remove_child(row, b);
        let children: alloc::vec::Vec<_> = tree.children(row).collect();
        assert_eq!(children, [a, c]);
        assert_eq!(tree.parent(b), None);
    }

    #[test]
    #[should_panic(expected = "takes a single child")]
    fn add_child_to_decorator_panics() {
        let mut tree = RenderTree::new();
        let parent = fixed(&mut tree, 1.0, 1.0);
        let child = fixed(&mut tree, 1.0, 1.0);
        tree.add_child(parent, child);
    }
}
