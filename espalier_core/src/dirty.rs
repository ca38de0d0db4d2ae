// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The render tree keeps per-node dirty bits (`needs_layout`, `needs_paint`,
//! `needs_compositing_bits_update`) and, separately, one
//! [`understory_dirty`] channel per pipeline phase holding the nodes a flush
//! must start from. Propagation up the tree happens when a node is marked,
//! so every channel is local-only: draining it yields exactly the marked
//! roots of dirty work.
//!
//! - [`LAYOUT`]: relayout boundaries whose subtree needs layout. Flushed
//!   shallowest first.
//! - [`COMPOSITING`]: nodes whose aggregated "needs compositing" bit must be
//!   recomputed. Flushed shallowest first.
//! - [`PAINT`]: repaint boundaries whose layer must be re-recorded. Flushed
//!   deepest first, so a parent layer sees its children already recorded.
//!
//! Marking the same node twice in one frame is idempotent: the per-node bit
//! short-circuits the second mark before the channel is touched.

use understory_dirty::Channel;

/// Relayout boundary needs layout.
pub const LAYOUT: Channel = Channel::new(0);

/// Repaint boundary needs its layer re-recorded.
pub const PAINT: Channel = Channel::new(1);

/// Aggregated compositing requirement needs recomputation.
pub const COMPOSITING: Channel = Channel::new(2);
