// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render tree with constraint layout, decorator nodes, painting, and hit
//! testing.
//!
//! `espalier_core` keeps a retained tree of render nodes and turns it into
//! geometry and a replayable command list once per frame. It is `no_std`
//! compatible (with `alloc`) and stores nodes in struct-of-arrays form behind
//! generational [`NodeId`](tree::NodeId) handles.
//!
//! # Architecture
//!
//! Mutations mark dirty flags; a frame flushes them in a fixed order:
//!
//! ```text
//!   setters / value updates
//!       │ mark_needs_layout / _paint / _compositing_bits_update
//!       ▼
//!   draw_frame()
//!       ├─► flush_layout            constraints down, sizes up
//!       ├─► flush_compositing_bits  which subtrees push layers
//!       └─► flush_paint             re-record dirty boundary layers
//!                                        │
//!                                        ▼
//!                                   display_list() ──► Picture
//!
//!   hit_test(point) ──► HitTestResult ──► dispatch_event()
//! ```
//!
//! **[`tree`]**: The [`RenderTree`](tree::RenderTree) store: topology,
//! attachment, dirty marking, and frame driving.
//!
//! **[`node`]**: The decorator kinds and the flow container, each with the
//! setters that apply their dirty-flag side effects.
//!
//! **[`constraints`]**: [`BoxConstraints`](constraints::BoxConstraints) and
//! the constrain/enforce algebra.
//!
//! **[`intrinsics`]**: Memoized intrinsic-dimension queries.
//!
//! **[`paint`]**: Repaint-boundary layers and display-list flattening.
//!
//! **[`hit_test`]**: Hit testing and paint-space transforms.
//!
//! **[`pointer`]**: Pointer events and dispatch along a hit-test path.
//!
//! **[`decoration`]**: The decoration and box-painter capabilities.
//!
//! **[`animation`]**: Shared value sources for animated properties.
//!
//! **[`dirty`]**: Dirty channels via `understory_dirty`.
//!
//! **[`config`]**: Surface constraints, display context, debug switches.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! pipeline instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! **[`diagnostics`]**: Per-node property reports for tooling.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-node
//!   layout records.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod animation;
mod compositing;
pub mod config;
pub mod constraints;
pub mod decoration;
pub mod diagnostics;
pub mod dirty;
pub mod intrinsics;
mod layout;
pub mod node;
pub mod paint;
pub mod pointer;
pub mod trace;
pub mod tree;
