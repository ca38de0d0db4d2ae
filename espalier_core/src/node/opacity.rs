// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static and animated opacity.
//!
//! Both kinds share the same paint thresholds: alpha 0 paints nothing,
//! alpha 255 paints the child directly, anything in between wraps the child
//! in an opacity layer.

use alloc::rc::Rc;
use core::fmt;

use espalier_paint::paint::alpha_from_opacity;

use crate::animation::{Listener, ValueListenable};
use crate::tree::{NodeId, RenderTree};

/// Makes its child partially transparent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Opacity {
    pub(crate) opacity: f64,
    pub(crate) alpha: u8,
}

impl Opacity {
    /// Creates an opacity node.
    ///
    /// # Panics
    ///
    /// Panics if `opacity` is outside `0.0..=1.0`.
    #[must_use]
    pub fn new(opacity: f64) -> Self {
        assert_unit(opacity);
        Self {
            opacity,
            alpha: alpha_from_opacity(opacity),
        }
    }

    /// The opacity in `0.0..=1.0`.
    #[inline]
    #[must_use]
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// The opacity quantized to 8 bits.
    #[inline]
    #[must_use]
    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    /// Whether painting needs an opacity layer.
    #[inline]
    pub(crate) fn needs_layer(&self) -> bool {
        self.alpha != 0 && self.alpha != 255
    }
}

fn assert_unit(opacity: f64) {
    assert!(
        (0.0..=1.0).contains(&opacity),
        "opacity must be within 0.0..=1.0, got {opacity}"
    );
}

/// Opacity driven by a shared [`ValueListenable`].
///
/// Subscribes to the source while attached; each notification re-reads the
/// value (clamped to `0.0..=1.0`) on the next
/// [`process_value_updates`](RenderTree::process_value_updates).
pub struct AnimatedOpacity {
    pub(crate) source: Rc<dyn ValueListenable>,
    pub(crate) alpha: u8,
    pub(crate) currently_needs_compositing: bool,
    pub(crate) listener: Option<Listener>,
}

impl fmt::Debug for AnimatedOpacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimatedOpacity")
            .field("value", &self.source.value())
            .field("alpha", &self.alpha)
            .field("currently_needs_compositing", &self.currently_needs_compositing)
            .field("subscribed", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

impl AnimatedOpacity {
    /// Creates an animated opacity node reading from `source`.
    #[must_use]
    pub fn new(source: Rc<dyn ValueListenable>) -> Self {
        let alpha = alpha_from_opacity(source.value());
        Self {
            source,
            alpha,
            currently_needs_compositing: alpha > 0 && alpha < 255,
            listener: None,
        }
    }

    /// The value source.
    #[must_use]
    pub fn source(&self) -> &Rc<dyn ValueListenable> {
        &self.source
    }

    /// The alpha computed at the last update.
    #[inline]
    #[must_use]
    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    /// Whether the node is currently subscribed to its source.
    #[inline]
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.listener.is_some()
    }
}

impl RenderTree {
    /// Sets an [`Opacity`] node's opacity.
    ///
    /// Marks paint on any change, and the compositing bits when the need for
    /// an opacity layer flips.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, the node is not an `Opacity`, or the
    /// value is outside `0.0..=1.0`.
    pub fn set_opacity(&mut self, id: NodeId, opacity: f64) {
        assert_unit(opacity);
        let has_child = self.has_child(id);
        let state = self.state_mut::<Opacity>(id);
        if state.opacity == opacity {
            return;
        }
        let did_need_compositing = has_child && state.needs_layer();
        state.opacity = opacity;
        state.alpha = alpha_from_opacity(opacity);
        let needs_compositing = has_child && state.needs_layer();
        if did_need_compositing != needs_compositing {
            self.mark_needs_compositing_bits_update(id);
        }
        self.mark_needs_paint(id);
    }

    /// Replaces an [`AnimatedOpacity`] node's value source.
    ///
    /// While attached, the subscription moves from the old source to the new
    /// one. The new value is applied immediately.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not an `AnimatedOpacity`.
    pub fn set_opacity_source(&mut self, id: NodeId, source: Rc<dyn ValueListenable>) {
        let state = self.state_mut::<AnimatedOpacity>(id);
        if Rc::ptr_eq(&state.source, &source) {
            return;
        }
        if let Some(listener) = &state.listener {
            state.source.remove_listener(listener);
            source.add_listener(listener.clone());
        }
        state.source = source;
        self.update_animated_opacity(id.idx);
    }

    /// Re-reads an animated opacity's source.
    pub(crate) fn update_animated_opacity(&mut self, idx: u32) {
        let has_child = self.first_child[idx as usize] != crate::tree::INVALID;
        let Some(state) = self.state_at_mut::<AnimatedOpacity>(idx) else {
            return;
        };
        let old_alpha = state.alpha;
        state.alpha = alpha_from_opacity(state.source.value().clamp(0.0, 1.0));
        if old_alpha == state.alpha {
            return;
        }
        let did_need_compositing = state.currently_needs_compositing;
        state.currently_needs_compositing = state.alpha > 0 && state.alpha < 255;
        if has_child && did_need_compositing != state.currently_needs_compositing {
            self.mark_needs_compositing_bits_update_at(idx);
        }
        self.mark_needs_paint_at(idx);
    }

    /// Subscribes an animated opacity to its source and catches up on any
    /// change made while it was not listening.
    pub(crate) fn subscribe_animated_opacity(&mut self, idx: u32) {
        let id = self.id_at(idx);
        let listener = self.value_listener(id);
        let Some(state) = self.state_at_mut::<AnimatedOpacity>(idx) else {
            return;
        };
        if state.listener.is_some() {
            return;
        }
        state.source.add_listener(listener.clone());
        state.listener = Some(listener);
        self.update_animated_opacity(idx);
    }

    pub(crate) fn unsubscribe_animated_opacity(&mut self, idx: u32) {
        if let Some(state) = self.state_at_mut::<AnimatedOpacity>(idx)
            && let Some(listener) = state.listener.take()
        {
            state.source.remove_listener(&listener);
        }
    }
}
