// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nodes that shape pointer hit testing.

use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use super::HitTestBehavior;
use crate::pointer::PointerCallbacks;
use crate::tree::{NodeId, RenderTree};

/// Calls back on pointer events that hit it.
///
/// Without a child it fills the biggest size its constraints allow.
#[derive(Debug, Default)]
pub struct PointerListener {
    pub(crate) behavior: HitTestBehavior,
    pub(crate) callbacks: PointerCallbacks,
}

impl PointerListener {
    /// Creates a listener with no callbacks.
    #[must_use]
    pub fn new(behavior: HitTestBehavior) -> Self {
        Self {
            behavior,
            callbacks: PointerCallbacks::default(),
        }
    }

    /// Returns this listener with `callbacks` installed.
    #[must_use]
    pub fn with_callbacks(mut self, callbacks: PointerCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// How the listener participates in hit testing.
    #[inline]
    #[must_use]
    pub fn behavior(&self) -> HitTestBehavior {
        self.behavior
    }

    /// The installed callbacks.
    #[must_use]
    pub fn callbacks(&self) -> &PointerCallbacks {
        &self.callbacks
    }
}

/// Makes its subtree invisible to hit testing while `ignoring`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IgnorePointer {
    pub(crate) ignoring: bool,
}

impl IgnorePointer {
    /// Creates an ignore-pointer node.
    #[must_use]
    pub const fn new(ignoring: bool) -> Self {
        Self { ignoring }
    }

    /// Whether hits are currently ignored.
    #[inline]
    #[must_use]
    pub fn ignoring(&self) -> bool {
        self.ignoring
    }
}

/// Claims hits within its bounds without testing its subtree while
/// `absorbing`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AbsorbPointer {
    pub(crate) absorbing: bool,
}

impl AbsorbPointer {
    /// Creates an absorb-pointer node.
    #[must_use]
    pub const fn new(absorbing: bool) -> Self {
        Self { absorbing }
    }

    /// Whether hits are currently absorbed.
    #[inline]
    #[must_use]
    pub fn absorbing(&self) -> bool {
        self.absorbing
    }
}

/// Carries an opaque payload for code that inspects hit-test entries.
///
/// Without a child it fills the biggest size its constraints allow.
#[derive(Default)]
pub struct MetaData {
    pub(crate) behavior: HitTestBehavior,
    pub(crate) meta_data: Option<Box<dyn Any>>,
}

impl fmt::Debug for MetaData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaData")
            .field("behavior", &self.behavior)
            .field("has_meta_data", &self.meta_data.is_some())
            .finish()
    }
}

impl MetaData {
    /// Creates a metadata node without a payload.
    #[must_use]
    pub fn new(behavior: HitTestBehavior) -> Self {
        Self {
            behavior,
            meta_data: None,
        }
    }

    /// Returns this node carrying `meta_data`.
    #[must_use]
    pub fn with_meta_data(mut self, meta_data: Box<dyn Any>) -> Self {
        self.meta_data = Some(meta_data);
        self
    }

    /// How the node participates in hit testing.
    #[inline]
    #[must_use]
    pub fn behavior(&self) -> HitTestBehavior {
        self.behavior
    }
}

impl RenderTree {
    /// Changes the hit-test behavior of a [`PointerListener`] or
    /// [`MetaData`] node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is neither kind.
    pub fn set_hit_test_behavior(&mut self, id: NodeId, behavior: HitTestBehavior) {
        if let Some(state) = self.get_mut::<MetaData>(id) {
            state.behavior = behavior;
        } else {
            self.state_mut::<PointerListener>(id).behavior = behavior;
        }
    }

    /// Replaces a [`PointerListener`]'s callbacks, returning the old ones.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a `PointerListener`.
    pub fn set_pointer_callbacks(
        &mut self,
        id: NodeId,
        callbacks: PointerCallbacks,
    ) -> PointerCallbacks {
        core::mem::replace(&mut self.state_mut::<PointerListener>(id).callbacks, callbacks)
    }

    /// Switches an [`IgnorePointer`] node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not an `IgnorePointer`.
    pub fn set_ignoring(&mut self, id: NodeId, ignoring: bool) {
        self.state_mut::<IgnorePointer>(id).ignoring = ignoring;
    }

    /// Switches an [`AbsorbPointer`] node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not an `AbsorbPointer`.
    pub fn set_absorbing(&mut self, id: NodeId, absorbing: bool) {
        self.state_mut::<AbsorbPointer>(id).absorbing = absorbing;
    }

    /// Replaces a [`MetaData`] node's payload.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node is not a `MetaData`.
    pub fn set_meta_data(&mut self, id: NodeId, meta_data: Option<Box<dyn Any>>) {
        self.state_mut::<MetaData>(id).meta_data = meta_data;
    }

    /// The payload of a [`MetaData`] node, or `None` for other kinds.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn meta_data(&self, id: NodeId) -> Option<&dyn Any> {
        self.get::<MetaData>(id)?.meta_data.as_deref()
    }
}
