// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observable value sources.
//!
//! An [`AnimatedOpacity`](crate::node::AnimatedOpacity) node reads its
//! opacity from a shared [`ValueListenable`]. The node subscribes while it is
//! attached and unsubscribes when it is detached. A notification does not
//! touch the tree directly: it queues the node on its tree, and
//! [`RenderTree::process_value_updates`] (the first step of
//! [`RenderTree::draw_frame`]) applies the queued changes.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::node::NodeKind;
use crate::tree::{NodeId, RenderTree};

/// A value-changed callback.
///
/// Listeners are compared by identity ([`Rc::ptr_eq`]) on removal.
pub type Listener = Rc<dyn Fn()>;

/// A source of `f64` values that notifies listeners when the value changes.
pub trait ValueListenable {
    /// The current value.
    fn value(&self) -> f64;

    /// Registers `listener` to be called after every value change.
    fn add_listener(&self, listener: Listener);

    /// Unregisters a listener previously passed to
    /// [`add_listener`](Self::add_listener). Unknown listeners are ignored.
    fn remove_listener(&self, listener: &Listener);
}

/// A settable shared value, typically driven by an animation controller.
///
/// Share it as an `Rc<AnimatedValue>`; any number of nodes (across any
/// number of trees) may subscribe.
pub struct AnimatedValue {
    value: Cell<f64>,
    listeners: RefCell<Vec<Listener>>,
}

impl fmt::Debug for AnimatedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimatedValue")
            .field("value", &self.value.get())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl AnimatedValue {
    /// Creates a value source with no listeners.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            value: Cell::new(value),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Sets the value and notifies every listener if it changed.
    pub fn set(&self, value: f64) {
        if self.value.get() == value {
            return;
        }
        self.value.set(value);
        // Listeners may subscribe or unsubscribe while being notified.
        let snapshot: Vec<Listener> = self.listeners.borrow().clone();
        for listener in snapshot {
            listener();
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl ValueListenable for AnimatedValue {
    fn value(&self) -> f64 {
        self.value.get()
    }

    fn add_listener(&self, listener: Listener) {
        self.listeners.borrow_mut().push(listener);
    }

    fn remove_listener(&self, listener: &Listener) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(pos) = listeners.iter().position(|l| Rc::ptr_eq(l, listener)) {
            listeners.remove(pos);
        }
    }
}

impl RenderTree {
    /// Creates a listener that queues `id` for a value update on this tree.
    ///
    /// The listener holds the queue weakly, so it is inert once the tree is
    /// dropped.
    pub(crate) fn value_listener(&self, id: NodeId) -> Listener {
        let queue: Weak<RefCell<Vec<NodeId>>> = Rc::downgrade(&self.value_updates);
        Rc::new(move || {
            if let Some(queue) = queue.upgrade() {
                queue.borrow_mut().push(id);
            }
        })
    }

    /// Applies every queued value-source notification.
    ///
    /// Returns the number of nodes re-read. Notifications for nodes destroyed
    /// or detached since they were queued are dropped.
    pub fn process_value_updates(&mut self) -> usize {
        let pending = core::mem::take(&mut *self.value_updates.borrow_mut());
        let mut processed = 0;
        for id in pending {
            if !self.is_alive(id) || !self.flags[id.idx as usize].attached {
                continue;
            }
            if matches!(self.kind[id.idx as usize], NodeKind::AnimatedOpacity(_)) {
                self.update_animated_opacity(id.idx);
                processed += 1;
            }
        }
        processed
    }

    /// Number of notifications waiting for [`process_value_updates`](Self::process_value_updates).
    #[must_use]
    pub fn pending_value_updates(&self) -> usize {
        self.value_updates.borrow().len()
    }
}
