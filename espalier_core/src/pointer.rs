// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer events and dispatch.
//!
//! Events are delivered along a [`HitTestResult`] path, deepest entry first.
//! Only [`PointerListener`](crate::node::PointerListener) nodes react, and
//! each fires at most one callback per event: the one registered for the
//! event's kind.

use alloc::boxed::Box;
use core::fmt;

use kurbo::{Point, Vec2};

use crate::hit_test::HitTestResult;
use crate::node::{NodeKind, PointerListener};
use crate::tree::{NodeId, RenderTree};

macro_rules! pointer_event {
    ($(#[$meta:meta])* $name:ident { $($(#[$fmeta:meta])* $field:ident: $ty:ty),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq)]
        pub struct $name {
            /// Identifier of the pointer that produced the event.
            pub pointer: u32,
            /// Position in root coordinates.
            pub position: Point,
            $($(#[$fmeta])* pub $field: $ty,)*
        }
    };
}

pointer_event!(
    /// A pointer made contact.
    PointerDownEvent {}
);
pointer_event!(
    /// A pointer in contact moved.
    PointerMoveEvent {
        /// Movement since the previous event.
        delta: Vec2,
    }
);
pointer_event!(
    /// A pointer stopped making contact.
    PointerUpEvent {}
);
pointer_event!(
    /// The event stream for a pointer was aborted.
    PointerCancelEvent {}
);
pointer_event!(
    /// A pointer not in contact moved.
    PointerHoverEvent {
        /// Movement since the previous event.
        delta: Vec2,
    }
);
pointer_event!(
    /// A pointer not in contact entered a region.
    PointerEnterEvent {}
);
pointer_event!(
    /// A pointer not in contact left a region.
    PointerLeaveEvent {}
);

/// The closed set of pointer events.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// See [`PointerDownEvent`].
    Down(PointerDownEvent),
    /// See [`PointerMoveEvent`].
    Move(PointerMoveEvent),
    /// See [`PointerUpEvent`].
    Up(PointerUpEvent),
    /// See [`PointerCancelEvent`].
    Cancel(PointerCancelEvent),
    /// See [`PointerHoverEvent`].
    Hover(PointerHoverEvent),
    /// See [`PointerLeaveEvent`].
    Leave(PointerLeaveEvent),
    /// See [`PointerEnterEvent`].
    Enter(PointerEnterEvent),
}

impl PointerEvent {
    /// Position in root coordinates.
    #[must_use]
    pub fn position(&self) -> Point {
        match self {
            Self::Down(e) => e.position,
            Self::Move(e) => e.position,
            Self::Up(e) => e.position,
            Self::Cancel(e) => e.position,
            Self::Hover(e) => e.position,
            Self::Leave(e) => e.position,
            Self::Enter(e) => e.position,
        }
    }

    /// Identifier of the pointer.
    #[must_use]
    pub fn pointer(&self) -> u32 {
        match self {
            Self::Down(e) => e.pointer,
            Self::Move(e) => e.pointer,
            Self::Up(e) => e.pointer,
            Self::Cancel(e) => e.pointer,
            Self::Hover(e) => e.pointer,
            Self::Leave(e) => e.pointer,
            Self::Enter(e) => e.pointer,
        }
    }
}

macro_rules! impl_from_event {
    ($($variant:ident($ty:ty)),*) => {
        $(impl From<$ty> for PointerEvent {
            fn from(e: $ty) -> Self {
                Self::$variant(e)
            }
        })*
    };
}

impl_from_event!(
    Down(PointerDownEvent),
    Move(PointerMoveEvent),
    Up(PointerUpEvent),
    Cancel(PointerCancelEvent),
    Hover(PointerHoverEvent),
    Leave(PointerLeaveEvent),
    Enter(PointerEnterEvent)
);

/// A pointer callback. It receives the tree so it can mutate nodes.
pub type PointerCallback<E> = Box<dyn FnMut(&mut RenderTree, &E)>;

/// The callbacks a [`PointerListener`] dispatches to, one slot per kind.
#[derive(Default)]
pub struct PointerCallbacks {
    pub(crate) on_down: Option<PointerCallback<PointerDownEvent>>,
    pub(crate) on_move: Option<PointerCallback<PointerMoveEvent>>,
    pub(crate) on_up: Option<PointerCallback<PointerUpEvent>>,
    pub(crate) on_cancel: Option<PointerCallback<PointerCancelEvent>>,
    pub(crate) on_hover: Option<PointerCallback<PointerHoverEvent>>,
    pub(crate) on_leave: Option<PointerCallback<PointerLeaveEvent>>,
    pub(crate) on_enter: Option<PointerCallback<PointerEnterEvent>>,
}

impl fmt::Debug for PointerCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerCallbacks")
            .field("on_down", &self.on_down.is_some())
            .field("on_move", &self.on_move.is_some())
            .field("on_up", &self.on_up.is_some())
            .field("on_cancel", &self.on_cancel.is_some())
            .field("on_hover", &self.on_hover.is_some())
            .field("on_leave", &self.on_leave.is_some())
            .field("on_enter", &self.on_enter.is_some())
            .finish()
    }
}

macro_rules! callback_builder {
    ($($(#[$meta:meta])* $name:ident: $ty:ty,)*) => {
        impl PointerCallbacks {
            $(
                $(#[$meta])*
                #[must_use]
                pub fn $name(mut self, f: impl FnMut(&mut RenderTree, &$ty) + 'static) -> Self {
                    self.$name = Some(Box::new(f));
                    self
                }
            )*

            /// Names of the registered callbacks, in dispatch priority order.
            pub fn registered(&self) -> impl Iterator<Item = &'static str> + '_ {
                [$((stringify!($name), self.$name.is_some()),)*]
                    .into_iter()
                    .filter_map(|(name, set)| set.then_some(name))
            }
        }
    };
}

callback_builder! {
    /// Sets the callback for [`PointerDownEvent`].
    on_down: PointerDownEvent,
    /// Sets the callback for [`PointerMoveEvent`].
    on_move: PointerMoveEvent,
    /// Sets the callback for [`PointerUpEvent`].
    on_up: PointerUpEvent,
    /// Sets the callback for [`PointerCancelEvent`].
    on_cancel: PointerCancelEvent,
    /// Sets the callback for [`PointerHoverEvent`].
    on_hover: PointerHoverEvent,
    /// Sets the callback for [`PointerLeaveEvent`].
    on_leave: PointerLeaveEvent,
    /// Sets the callback for [`PointerEnterEvent`].
    on_enter: PointerEnterEvent,
}

impl RenderTree {
    /// Delivers `event` to every entry of `result`, in order.
    ///
    /// Returns the number of callbacks that fired.
    pub fn dispatch_event(&mut self, event: &PointerEvent, result: &HitTestResult) -> usize {
        result
            .entries()
            .iter()
            .filter(|entry| self.handle_event(entry.target, event))
            .count()
    }

    /// Delivers `event` to one node. Returns whether a callback fired.
    ///
    /// Stale handles and nodes that are not pointer listeners are ignored,
    /// since a callback earlier on the path may have restructured the tree.
    pub fn handle_event(&mut self, id: NodeId, event: &PointerEvent) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        match event {
            PointerEvent::Down(e) => self.fire(id, |c| &mut c.on_down, e),
            PointerEvent::Move(e) => self.fire(id, |c| &mut c.on_move, e),
            PointerEvent::Up(e) => self.fire(id, |c| &mut c.on_up, e),
            PointerEvent::Cancel(e) => self.fire(id, |c| &mut c.on_cancel, e),
            PointerEvent::Hover(e) => self.fire(id, |c| &mut c.on_hover, e),
            PointerEvent::Leave(e) => self.fire(id, |c| &mut c.on_leave, e),
            PointerEvent::Enter(e) => self.fire(id, |c| &mut c.on_enter, e),
        }
    }

    /// Runs one callback slot with the tree borrowed mutably.
    ///
    /// The callback is taken out for the call and put back afterwards unless
    /// the node died or the callback installed a replacement.
    fn fire<E: 'static>(
        &mut self,
        id: NodeId,
        slot: fn(&mut PointerCallbacks) -> &mut Option<PointerCallback<E>>,
        event: &E,
    ) -> bool {
        let Some(mut callback) = self.listener_callbacks(id).and_then(|c| slot(c).take()) else {
            return false;
        };
        callback(self, event);
        if self.is_alive(id)
            && let Some(callbacks) = self.listener_callbacks(id)
        {
            let slot = slot(callbacks);
            if slot.is_none() {
                *slot = Some(callback);
            }
        }
        true
    }

    fn listener_callbacks(&mut self, id: NodeId) -> Option<&mut PointerCallbacks> {
        match &mut self.kind[id.idx as usize] {
            NodeKind::PointerListener(PointerListener { callbacks, .. }) => Some(callbacks),
            _ => None,
        }
    }
}
