// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Constraint-based layout.
//!
//! Layout runs top-down with constraints and bottom-up with sizes. Each node
//! lays out at most once per flush unless it is marked again. A node whose
//! size cannot affect its parent (no parent, tight constraints, the parent
//! ignores the size, or the size depends only on the constraints) is a
//! *relayout boundary*: marking below it stops there, and the flush
//! restarts layout from it with the constraints it last received.

use kurbo::Size;

use crate::constraints::BoxConstraints;
use crate::dirty;
use crate::node::{AspectRatio, Flex, LimitedBox, NodeKind};
use crate::trace::{PhaseBeginEvent, PhaseEndEvent, PhaseKind, Tracer};
use crate::tree::{INVALID, NodeId, RenderTree};

/// The kind-specific layout policy, copied out of the node so the child can
/// be laid out while it runs.
#[derive(Clone, Copy, Debug)]
enum Policy {
    /// Child's size, or the smallest size without a child.
    Proxy,
    /// Child's size, or the biggest size without a child.
    Fill,
    Constrained(BoxConstraints),
    Limited(LimitedBox),
    Aspect(AspectRatio),
    Hidden,
    Flex(Flex),
}

impl Policy {
    fn of(kind: &NodeKind) -> Self {
        match kind {
            NodeKind::ConstrainedBox(state) => Self::Constrained(state.additional),
            NodeKind::LimitedBox(state) => Self::Limited(*state),
            NodeKind::AspectRatio(state) => Self::Aspect(*state),
            NodeKind::PointerListener(_) | NodeKind::MetaData(_) => Self::Fill,
            NodeKind::Offstage(state) if state.offstage => Self::Hidden,
            NodeKind::Flex(state) => Self::Flex(*state),
            _ => Self::Proxy,
        }
    }
}

impl RenderTree {
    /// Lays out a node with `constraints`.
    ///
    /// Skipped when the node is clean and the constraints are unchanged.
    /// `parent_uses_size` tells whether the caller reads the resulting size;
    /// if not, the node becomes a relayout boundary.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale. In debug builds, also panics on
    /// invalid constraints or a non-finite resulting size.
    pub fn layout(&mut self, id: NodeId, constraints: BoxConstraints, parent_uses_size: bool) {
        self.validate(id);
        self.layout_node(id.idx, constraints, parent_uses_size);
    }

    /// Lays out every queued relayout boundary, shallowest first.
    pub fn flush_layout(&mut self) {
        self.flush_layout_traced(&mut Tracer::none());
    }

    pub(crate) fn flush_layout_traced(&mut self, tracer: &mut Tracer<'_>) {
        let mut queued = self.drain_queue(dirty::LAYOUT, false);
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: self.frame_index,
            phase: PhaseKind::Layout,
            queued: queued.len(),
        });
        #[cfg(feature = "trace-rich")]
        let start = self.laid_out.len();
        while !queued.is_empty() {
            for idx in queued {
                let flags = self.flags[idx as usize];
                if !flags.needs_layout || !flags.attached {
                    continue;
                }
                if idx == self.root {
                    self.layout_node(idx, self.config.root_constraints, false);
                } else {
                    self.layout_without_resize(idx);
                }
            }
            queued = self.drain_queue(dirty::LAYOUT, false);
        }
        #[cfg(feature = "trace-rich")]
        if tracer.is_active() {
            let layouts: alloc::vec::Vec<_> = self.laid_out[start..]
                .iter()
                .map(|&idx| crate::trace::NodeLayout {
                    node_index: idx,
                    size: self.size[idx as usize].unwrap_or_default(),
                })
                .collect();
            tracer.node_layouts(self.frame_index, &layouts);
        }
        tracer.phase_end(&PhaseEndEvent {
            frame_index: self.frame_index,
            phase: PhaseKind::Layout,
        });
    }

    pub(crate) fn layout_node(&mut self, idx: u32, c: BoxConstraints, parent_uses_size: bool) {
        c.debug_assert_is_valid();
        let i = idx as usize;
        let sized_by_parent = self.kind[i].sized_by_parent();
        let boundary = !parent_uses_size
            || sized_by_parent
            || c.is_tight()
            || self.parent[i] == INVALID;
        if !self.flags[i].needs_layout && self.constraints[i] == Some(c) {
            self.flags[i].relayout_boundary = boundary;
            return;
        }
        self.constraints[i] = Some(c);
        self.flags[i].relayout_boundary = boundary;
        if sized_by_parent {
            self.perform_resize(idx, c);
        }
        self.perform_layout(idx, c);
        self.finish_layout(idx);
    }

    /// Re-runs layout of a relayout boundary with its stored constraints.
    fn layout_without_resize(&mut self, idx: u32) {
        let Some(c) = self.constraints[idx as usize] else {
            return;
        };
        self.perform_layout(idx, c);
        self.finish_layout(idx);
    }

    fn finish_layout(&mut self, idx: u32) {
        let i = idx as usize;
        debug_assert!(
            self.size[i].is_some_and(|s| s.is_finite()),
            "{} {:?} laid out to a non-finite size {:?}",
            self.kind[i].name(),
            self.id_at(idx),
            self.size[i]
        );
        self.flags[i].needs_layout = false;
        self.mark_needs_paint_at(idx);
        self.laid_out.push(idx);
    }

    /// Sizes a node from its constraints alone.
    fn perform_resize(&mut self, idx: u32, c: BoxConstraints) {
        self.size[idx as usize] = Some(c.smallest());
    }

    fn perform_layout(&mut self, idx: u32, c: BoxConstraints) {
        let i = idx as usize;
        let child = self.first_child[i];
        let size = match Policy::of(&self.kind[i]) {
            Policy::Proxy => self.proxy_layout(child, c, c.smallest()),
            Policy::Fill => self.proxy_layout(child, c, c.biggest()),
            Policy::Constrained(additional) => {
                let inner = additional.enforce(c);
                self.proxy_layout(child, inner, inner.constrain(Size::ZERO))
            }
            Policy::Limited(limits) => {
                let inner = limits.limit(c);
                if child == INVALID {
                    inner.constrain(Size::ZERO)
                } else {
                    c.constrain(self.layout_child(child, inner, true))
                }
            }
            Policy::Aspect(ratio) => {
                let size = ratio.apply(c);
                if child != INVALID {
                    self.layout_node(child, BoxConstraints::tight(size), false);
                }
                size
            }
            Policy::Hidden => {
                if child != INVALID {
                    self.layout_node(child, c, false);
                }
                return;
            }
            Policy::Flex(flex) => self.flex_layout(idx, flex, c),
        };
        self.size[i] = Some(size);
    }

    fn proxy_layout(&mut self, child: u32, c: BoxConstraints, childless: Size) -> Size {
        if child == INVALID {
            childless
        } else {
            self.layout_child(child, c, true)
        }
    }

    fn layout_child(&mut self, child: u32, c: BoxConstraints, parent_uses_size: bool) -> Size {
        self.layout_node(child, c, parent_uses_size);
        self.size[child as usize].unwrap_or_default()
    }

    fn flex_layout(&mut self, idx: u32, flex: Flex, c: BoxConstraints) -> Size {
        let axis = flex.direction;
        let child_constraints = flex.child_constraints(c);
        let mut main = 0.0;
        let mut cross: f64 = 0.0;
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            let size = self.layout_child(child, child_constraints, true);
            main += axis.main(size);
            cross = cross.max(axis.cross(size));
            child = self.next_sibling[child as usize];
        }

        let max_main = axis.main(c.biggest());
        let main_extent = if max_main.is_finite() { max_main } else { main };
        let size = c.constrain(axis.size(main_extent, cross));

        let cross_extent = axis.cross(size);
        let mut position = 0.0;
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            let child_size = self.size[child as usize].unwrap_or_default();
            self.offset[child as usize] = axis.offset(
                position,
                flex.cross_position(cross_extent, axis.cross(child_size)),
            );
            position += axis.main(child_size);
            child = self.next_sibling[child as usize];
        }
        size
    }
}
