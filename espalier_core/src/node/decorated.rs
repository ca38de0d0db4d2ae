// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decorated box.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::fmt;

use crate::decoration::{BoxPainter, Decoration, DecorationPosition, ImageConfiguration};
use crate::tree::{NodeId, RenderTree};

/// Paints a [`Decoration`] behind or in front of its child.
///
/// The painter is created lazily on first paint and disposed whenever the
/// decoration changes or the node is detached.
pub struct DecoratedBox {
    pub(crate) decoration: Rc<dyn Decoration>,
    pub(crate) position: DecorationPosition,
    pub(crate) configuration: ImageConfiguration,
    pub(crate) painter: Option<Box<dyn BoxPainter>>,
}

impl fmt::Debug for DecoratedBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratedBox")
            .field("decoration", &self.decoration)
            .field("position", &self.position)
            .field("configuration", &self.configuration)
            .field("has_painter", &self.painter.is_some())
            .finish()
    }
}

impl DecoratedBox {
    /// Creates a decorated box painting `decoration` in the background.
    #[must_use]
    pub fn new(decoration: Rc<dyn Decoration>) -> Self {
        Self {
            decoration,
            position: DecorationPosition::Background,
            configuration: ImageConfiguration::EMPTY,
            painter: None,
        }
    }

    /// Returns this box with `position` instead.
    #[must_use]
    pub fn with_position(mut self, position: DecorationPosition) -> Self {
        self.position = position;
        self
    }

    /// Returns this box with `configuration` instead.
    #[must_use]
    pub fn with_configuration(mut self, configuration: ImageConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    /// The decoration.
    #[must_use]
    pub fn decoration(&self) -> &Rc<dyn Decoration> {
        &self.decoration
    }

    /// Whether the decoration paints behind or in front of the child.
    #[inline]
    #[must_use]
    pub fn position(&self) -> DecorationPosition {
        self.position
    }

    /// The configuration passed to the painter (size filled in at paint).
    #[inline]
    #[must_use]
    pub fn configuration(&self) -> ImageConfiguration {
        self.configuration
    }

    /// Whether a painter is currently cached.
    #[inline]
    #[must_use]
    pub fn has_painter(&self) -> bool {
        self.painter.is_some()
    }

    pub(crate) fn dispose_painter(&mut self) {
        if let Some(mut painter) = self.painter.take() {
            painter.dispose();
        }
    }
}

impl RenderTree {
    /// Replaces a [`DecoratedBox`]'s decoration.
    ///
    /// Decorations are compared by identity. A new one disposes the cached
    /// painter and marks paint.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a `DecoratedBox`.
    pub fn set_decoration(&mut self, id: NodeId, decoration: Rc<dyn Decoration>) {
        let state = self.state_mut::<DecoratedBox>(id);
        if Rc::ptr_eq(&state.decoration, &decoration) {
            return;
        }
        state.dispose_painter();
        state.decoration = decoration;
        self.mark_needs_paint(id);
    }

    /// Moves a [`DecoratedBox`]'s decoration behind or in front of the
    /// child. Marks paint on change.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a `DecoratedBox`.
    pub fn set_decoration_position(&mut self, id: NodeId, position: DecorationPosition) {
        let state = self.state_mut::<DecoratedBox>(id);
        if state.position == position {
            return;
        }
        state.position = position;
        self.mark_needs_paint(id);
    }

    /// Replaces a [`DecoratedBox`]'s image configuration. Marks paint on
    /// change.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a `DecoratedBox`.
    pub fn set_image_configuration(&mut self, id: NodeId, configuration: ImageConfiguration) {
        let state = self.state_mut::<DecoratedBox>(id);
        if state.configuration == configuration {
            return;
        }
        state.configuration = configuration;
        self.mark_needs_paint(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::BoxConstraints;
    use crate::decoration::ColorDecoration;
    use crate::node::{ConstrainedBox, ProxyBox};
    use alloc::vec::Vec;
    use core::cell::Cell;
    use espalier_paint::{Canvas, Color, DrawCmd, Paint};
    use kurbo::{Point, Rect, Size, Vec2};

    #[derive(Debug, Default)]
    struct Counters {
        created: Cell<u32>,
        disposed: Cell<u32>,
    }

    #[derive(Debug)]
    struct CountingDecoration {
        counters: Rc<Counters>,
        unbalanced: bool,
    }

    struct CountingPainter {
        counters: Rc<Counters>,
        unbalanced: bool,
    }

    impl BoxPainter for CountingPainter {
        fn paint(
            &mut self,
            canvas: &mut dyn Canvas,
            offset: Vec2,
            configuration: &ImageConfiguration,
        ) {
            if self.unbalanced {
                canvas.save();
            }
            let size = configuration.size.unwrap_or(Size::ZERO);
            canvas.draw_rect(
                Rect::from_origin_size(offset.to_point(), size),
                &Paint::fill(Color::BLACK),
            );
        }

        fn dispose(&mut self) {
            self.counters.disposed.set(self.counters.disposed.get() + 1);
        }
    }

    impl Decoration for CountingDecoration {
        fn create_box_painter(&self) -> Box<dyn BoxPainter> {
            self.counters.created.set(self.counters.created.get() + 1);
            Box::new(CountingPainter {
                counters: self.counters.clone(),
                unbalanced: self.unbalanced,
            })
        }
    }

    fn counting(unbalanced: bool) -> (Rc<Counters>, Rc<dyn Decoration>) {
        let counters = Rc::new(Counters::default());
        let deco = Rc::new(CountingDecoration {
            counters: counters.clone(),
            unbalanced,
        });
        (counters, deco)
    }

    #[test]
    fn painter_is_created_lazily_and_reused() {
        let (counters, deco) = counting(false);
        let mut tree = RenderTree::new();
        let node = tree.create_node(DecoratedBox::new(deco));
        tree.set_root(node);
        assert_eq!(counters.created.get(), 0);

        let _ = tree.draw_frame();
        assert_eq!(counters.created.get(), 1);

        tree.mark_needs_paint(node);
        let _ = tree.draw_frame();
        assert_eq!(counters.created.get(), 1, "cached painter is reused");
    }

    #[test]
    fn new_decoration_disposes_painter() {
        let (counters, deco) = counting(false);
        let mut tree = RenderTree::new();
        let node = tree.create_node(DecoratedBox::new(deco.clone()));
        tree.set_root(node);
        let _ = tree.draw_frame();

        tree.set_decoration(node, deco);
        assert_eq!(counters.disposed.get(), 0, "same decoration is a no-op");

        let (_, other) = counting(false);
        tree.set_decoration(node, other);
        assert_eq!(counters.disposed.get(), 1);
        assert!(tree.needs_paint(node));
        assert!(tree.get::<DecoratedBox>(node).is_some_and(|d| !d.has_painter()));
    }

    #[test]
    fn detach_disposes_painter() {
        let (counters, deco) = counting(false);
        let mut tree = RenderTree::new();
        let root = tree.create_node(ProxyBox);
        let node = tree.create_node(DecoratedBox::new(deco));
        tree.set_child(root, Some(node));
        tree.set_root(root);
        let _ = tree.draw_frame();

        let _ = tree.set_child(root, None);
        assert_eq!(counters.disposed.get(), 1);
        assert!(tree.needs_paint(node));
    }

    #[test]
    fn position_orders_decoration_and_child() {
        let mut tree = RenderTree::new();
        let root = tree.create_node(DecoratedBox::new(Rc::new(ColorDecoration::new(
            Color::WHITE,
        ))));
        let child = tree.create_node(DecoratedBox::new(Rc::new(ColorDecoration::new(
            Color::BLACK,
        ))));
        tree.set_child(root, Some(child));
        tree.set_root(root);
        let _ = tree.draw_frame();

        let colors = |tree: &RenderTree| -> Vec<Color> {
            tree.display_list()
                .iter()
                .filter_map(DrawCmd::paint)
                .map(|p| p.color)
                .collect()
        };
        assert_eq!(colors(&tree), [Color::WHITE, Color::BLACK]);

        tree.set_decoration_position(root, DecorationPosition::Foreground);
        let _ = tree.draw_frame();
        assert_eq!(colors(&tree), [Color::BLACK, Color::WHITE]);
    }

    #[test]
    fn self_hit_follows_decoration_shape() {
        let mut tree = RenderTree::new();
        let root = tree.create_node(ConstrainedBox::new(BoxConstraints::tight(Size::new(
            100.0, 100.0,
        ))));
        let deco = tree.create_node(DecoratedBox::new(Rc::new(
            ColorDecoration::new(Color::BLACK).with_corner_radius(20.0),
        )));
        tree.set_child(root, Some(deco));
        tree.set_root(root);
        tree.set_config(crate::config::PipelineConfig::loose(Size::new(800.0, 600.0), 1.0));
        let _ = tree.draw_frame();

        assert!(tree.hit_test(Point::new(50.0, 50.0)).contains(deco));
        assert!(!tree.hit_test(Point::new(1.0, 1.0)).contains(deco));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "painter had mismatching save and restore calls")]
    fn unbalanced_painter_panics_in_debug() {
        let (_, deco) = counting(true);
        let mut tree = RenderTree::new();
        let node = tree.create_node(DecoratedBox::new(deco));
        tree.set_root(node);
        let _ = tree.draw_frame();
    }
}
