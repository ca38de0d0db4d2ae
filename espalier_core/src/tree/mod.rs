// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render tree data model.
//!
//! A *node* is one box in the render tree. Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that becomes stale when
//!   the node is destroyed.
//! - Topology: parent, first-child, and sibling links forming an ordered
//!   tree. Decorator kinds hold at most one child; [`Flex`](crate::node::Flex)
//!   holds any number.
//! - **Kind state** ([`NodeKind`](crate::node::NodeKind)) set by the caller
//!   through the setters on [`RenderTree`].
//! - **Computed state** written by the pipeline: size, the constraints it was
//!   laid out with, the offset its parent placed it at, and the aggregated
//!   compositing requirement.
//!
//! # Dirty tracking
//!
//! Every node carries three dirty bits (layout, paint, compositing bits).
//! Marking a node walks up to the nearest boundary for that phase and queues
//! the boundary on the matching [`dirty`](crate::dirty) channel.
//! [`RenderTree::draw_frame`] drains the channels in pipeline order.

mod frame;
mod id;
mod store;
mod traverse;

pub use frame::FrameStats;
pub use id::{INVALID, NodeId};
pub use store::{NodeFlags, RenderTree};
pub use traverse::{Ancestors, Children};
