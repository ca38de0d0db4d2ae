// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and dirty marking.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use kurbo::{Size, Vec2};
use understory_dirty::{CycleHandling, DirtyTracker};

use super::id::{INVALID, NodeId};
use super::traverse::{Ancestors, Children};
use crate::config::PipelineConfig;
use crate::constraints::BoxConstraints;
use crate::dirty;
use crate::intrinsics::IntrinsicDimension;
use crate::node::{NodeKind, NodeState};
use crate::paint::Layer;

/// Per-node pipeline flags.
///
/// The three `needs_*` dirty bits are set by the `mark_*` methods and
/// cleared by the pipeline. The rest is computed state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodeFlags {
    /// Layout must run before the size can be read.
    pub needs_layout: bool,
    /// The node's paint output is stale.
    pub needs_paint: bool,
    /// The aggregated compositing requirement must be recomputed.
    pub needs_compositing_bits_update: bool,
    /// This node or a descendant pushes a compositing layer.
    pub needs_compositing: bool,
    /// The node is reachable from the tree's root.
    pub attached: bool,
    /// The last layout made this node a relayout boundary.
    pub relayout_boundary: bool,
}

/// Struct-of-arrays storage for all render nodes.
///
/// Nodes are addressed by [`NodeId`] handles. Internally each node occupies a
/// slot in parallel arrays. Destroyed nodes are recycled via a free list, and
/// generation counters prevent stale handle access.
#[derive(Debug)]
pub struct RenderTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,
    pub(crate) depth: Vec<u32>,

    // -- Kind state (set by callers) --
    pub(crate) kind: Vec<NodeKind>,

    // -- Geometry (written by layout) --
    pub(crate) size: Vec<Option<Size>>,
    pub(crate) constraints: Vec<Option<BoxConstraints>>,
    pub(crate) offset: Vec<Vec2>,
    pub(crate) intrinsics: Vec<Vec<(IntrinsicDimension, u64, f64)>>,

    // -- Pipeline state --
    pub(crate) flags: Vec<NodeFlags>,
    pub(crate) layers: Vec<Option<Layer>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Frame --
    pub(crate) root: u32,
    pub(crate) config: PipelineConfig,
    pub(crate) frame_index: u64,
    pub(crate) value_updates: Rc<RefCell<Vec<NodeId>>>,
    pub(crate) laid_out: Vec<u32>,
    pub(crate) repaints: Vec<(u32, bool)>,
    pub(crate) compositing_updates: usize,
}

impl Default for RenderTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTree {
    /// Creates an empty tree with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Creates an empty tree with `config`.
    #[must_use]
    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            depth: Vec::new(),
            kind: Vec::new(),
            size: Vec::new(),
            constraints: Vec::new(),
            offset: Vec::new(),
            intrinsics: Vec::new(),
            flags: Vec::new(),
            layers: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            root: INVALID,
            config,
            frame_index: 0,
            value_updates: Rc::new(RefCell::new(Vec::new())),
            laid_out: Vec::new(),
            repaints: Vec::new(),
            compositing_updates: 0,
        }
    }

    /// Returns the pipeline configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Replaces the pipeline configuration.
    ///
    /// New root constraints mark the root for layout. A change to the display
    /// context or the debug outlines marks every attached node for paint.
    pub fn set_config(&mut self, config: PipelineConfig) {
        let old = core::mem::replace(&mut self.config, config);
        if self.root == INVALID {
            return;
        }
        if old.root_constraints != config.root_constraints {
            self.mark_needs_layout_at(self.root);
        }
        if old.display != config.display || old.debug_paint_size != config.debug_paint_size {
            for idx in 0..self.len {
                if self.flags[idx as usize].attached {
                    self.mark_needs_paint_at(idx);
                }
            }
        }
    }

    // -- Allocation API --

    /// Creates a detached node of the given kind and returns its handle.
    ///
    /// The node starts out needing layout and paint, with no parent and no
    /// children.
    pub fn create_node(&mut self, kind: impl Into<NodeKind>) -> NodeId {
        let kind = kind.into();
        let flags = NodeFlags {
            needs_layout: true,
            needs_paint: true,
            needs_compositing: kind.is_repaint_boundary(),
            ..NodeFlags::default()
        };
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.depth[i] = 0;
            self.kind[i] = kind;
            self.size[i] = None;
            self.constraints[i] = None;
            self.offset[i] = Vec2::ZERO;
            self.intrinsics[i].clear();
            self.flags[i] = flags;
            self.layers[i] = None;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.depth.push(0);
            self.kind.push(kind);
            self.size.push(None);
            self.constraints.push(None);
            self.offset.push(Vec2::ZERO);
            self.intrinsics.push(Vec::new());
            self.flags.push(flags);
            self.layers.push(None);
            self.generation.push(0);
            idx
        };

        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a node and its whole subtree, freeing the slots for reuse.
    ///
    /// The subtree is first dropped from its parent (or unset as the root)
    /// and detached, which releases value subscriptions and decoration
    /// painters.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_subtree(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        let p = self.parent[idx as usize];
        if p != INVALID {
            self.drop_child(p, idx);
        } else if self.root == idx {
            self.detach_at(idx);
            self.root = INVALID;
        }
        self.detach_at(idx);

        let mut stack = alloc::vec![idx];
        while let Some(idx) = stack.pop() {
            let i = idx as usize;
            let mut child = self.first_child[i];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
            if let NodeKind::DecoratedBox(state) = &mut self.kind[i] {
                state.dispose_painter();
            }
            self.kind[i] = NodeKind::default();
            self.layers[i] = None;
            self.intrinsics[i].clear();
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.dirty.remove_key(idx);
            // Bump generation so old handles immediately fail validation.
            self.generation[i] += 1;
            self.free_list.push(idx);
        }
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology API --

    /// Makes `id` the root of the tree, attaching its subtree.
    ///
    /// A previous root is detached. The new root is queued for layout,
    /// compositing bits, and paint.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has a parent.
    pub fn set_root(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.parent[idx as usize] == INVALID,
            "root node {id:?} must not have a parent"
        );
        let old = self.root;
        if old != INVALID && old != idx {
            self.detach_at(old);
            let o = old as usize;
            if !self.kind[o].is_repaint_boundary() {
                self.layers[o] = None;
            }
            self.flags[o].needs_compositing_bits_update = true;
        }
        self.root = idx;
        self.redepth(idx, 0);
        self.attach_at(idx);

        let flags = &mut self.flags[idx as usize];
        flags.needs_layout = true;
        flags.needs_paint = true;
        flags.needs_compositing_bits_update = true;
        self.dirty.mark(idx, dirty::LAYOUT);
        self.dirty.mark(idx, dirty::COMPOSITING);
        self.dirty.mark(idx, dirty::PAINT);
    }

    /// Returns the root node, if one is set.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        (self.root != INVALID).then(|| self.id_at(self.root))
    }

    /// Replaces a decorator's child, returning the previous one.
    ///
    /// The previous child is dropped (and detached) before the new one is
    /// adopted. Both changes mark the parent for layout and compositing
    /// bits.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale, the parent is a multi-child kind, the
    /// new child already has a parent or is the root, or adopting it would
    /// create a cycle.
    pub fn set_child(&mut self, parent: NodeId, child: Option<NodeId>) -> Option<NodeId> {
        self.validate(parent);
        let p = parent.idx;
        assert!(
            !self.kind[p as usize].is_multi_child(),
            "{} takes any number of children; use add_child",
            self.kind[p as usize].name()
        );
        let old = self.first_child[p as usize];
        if let Some(child) = child
            && child.idx == old
            && self.is_alive(child)
        {
            return Some(child);
        }
        if let Some(child) = child {
            self.check_adoptable(p, child);
        }
        let previous = (old != INVALID).then(|| self.id_at(old));
        if old != INVALID {
            self.drop_child(p, old);
        }
        if let Some(child) = child {
            self.link_last(p, child.idx);
            self.adopt(p, child.idx);
        }
        previous
    }

    /// Appends `child` to a multi-child node.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale, the parent is a single-child kind, the
    /// child already has a parent or is the root, or adopting it would
    /// create a cycle.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        let p = parent.idx;
        assert!(
            self.kind[p as usize].is_multi_child(),
            "{} takes a single child; use set_child",
            self.kind[p as usize].name()
        );
        self.check_adoptable(p, child);
        self.link_last(p, child.idx);
        self.adopt(p, child.idx);
    }

    /// Removes `child` from a multi-child node, detaching it.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale or `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] == parent.idx,
            "{child:?} is not a child of {parent:?}"
        );
        self.drop_child(parent.idx, child.idx);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns the first (for decorators, the only) child of a node.
    #[must_use]
    pub fn child(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let c = self.first_child[id.idx as usize];
        (c != INVALID).then(|| self.id_at(c))
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns an iterator over the ancestors of a node, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        self.validate(id);
        Ancestors::new(self, id.idx)
    }

    /// Whether a node has at least one child.
    #[must_use]
    pub fn has_child(&self, id: NodeId) -> bool {
        self.validate(id);
        self.first_child[id.idx as usize] != INVALID
    }

    /// Distance from the subtree root (the tree root has depth 0).
    #[must_use]
    pub fn depth(&self, id: NodeId) -> u32 {
        self.validate(id);
        self.depth[id.idx as usize]
    }

    // -- Kind state --

    /// Returns a node's kind.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        self.validate(id);
        &self.kind[id.idx as usize]
    }

    /// Returns a node's state if it is of kind `T`.
    #[must_use]
    pub fn get<T: NodeState>(&self, id: NodeId) -> Option<&T> {
        self.validate(id);
        T::extract(&self.kind[id.idx as usize])
    }

    /// Returns a node's state mutably if it is of kind `T`.
    ///
    /// Changes made through this reference mark nothing dirty. Prefer the
    /// dedicated setters.
    pub fn get_mut<T: NodeState>(&mut self, id: NodeId) -> Option<&mut T> {
        self.validate(id);
        T::extract_mut(&mut self.kind[id.idx as usize])
    }

    pub(crate) fn state_mut<T: NodeState>(&mut self, id: NodeId) -> &mut T {
        self.validate(id);
        let actual = self.kind[id.idx as usize].name();
        let Some(state) = T::extract_mut(&mut self.kind[id.idx as usize]) else {
            panic!("node {id:?} is a {actual}, expected {}", T::NAME);
        };
        state
    }

    pub(crate) fn state_at_mut<T: NodeState>(&mut self, idx: u32) -> Option<&mut T> {
        T::extract_mut(&mut self.kind[idx as usize])
    }

    // -- Computed state --

    /// The size chosen by the last layout, if the node has been laid out.
    #[must_use]
    pub fn size(&self, id: NodeId) -> Option<Size> {
        self.validate(id);
        self.size[id.idx as usize]
    }

    /// The constraints of the last layout.
    #[must_use]
    pub fn constraints(&self, id: NodeId) -> Option<BoxConstraints> {
        self.validate(id);
        self.constraints[id.idx as usize]
    }

    /// The offset a multi-child parent placed this node at.
    ///
    /// Decorators paint their child at their own offset, so this is zero
    /// under them.
    #[must_use]
    pub fn child_offset(&self, id: NodeId) -> Vec2 {
        self.validate(id);
        self.offset[id.idx as usize]
    }

    /// Returns a node's flags.
    #[must_use]
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Whether the node must be laid out before its size is valid.
    #[must_use]
    pub fn needs_layout(&self, id: NodeId) -> bool {
        self.flags(id).needs_layout
    }

    /// Whether the node's paint output is stale.
    #[must_use]
    pub fn needs_paint(&self, id: NodeId) -> bool {
        self.flags(id).needs_paint
    }

    /// Whether this node or a descendant pushes a compositing layer.
    ///
    /// Only meaningful after the compositing bits were flushed.
    #[must_use]
    pub fn needs_compositing(&self, id: NodeId) -> bool {
        self.flags(id).needs_compositing
    }

    /// Whether the aggregated compositing requirement is stale.
    #[must_use]
    pub fn needs_compositing_bits_update(&self, id: NodeId) -> bool {
        self.flags(id).needs_compositing_bits_update
    }

    /// Whether the node is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.flags(id).attached
    }

    // -- Attachment --

    /// Attaches a node's subtree. Attaching an attached node does nothing.
    ///
    /// Dirty bits set while detached are re-marked so they reach the queues,
    /// and animated opacities subscribe to their sources.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn attach(&mut self, id: NodeId) {
        self.validate(id);
        self.attach_at(id.idx);
    }

    /// Detaches a node's subtree. Detaching a detached node does nothing.
    ///
    /// Animated opacities unsubscribe from their sources and decorated
    /// boxes dispose their painters.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn detach(&mut self, id: NodeId) {
        self.validate(id);
        self.detach_at(id.idx);
    }

    pub(crate) fn attach_at(&mut self, idx: u32) {
        let i = idx as usize;
        if self.flags[i].attached {
            return;
        }
        self.flags[i].attached = true;

        if self.flags[i].needs_layout && self.constraints[i].is_some() {
            self.flags[i].needs_layout = false;
            self.mark_needs_layout_at(idx);
        }
        if self.flags[i].needs_compositing_bits_update {
            self.flags[i].needs_compositing_bits_update = false;
            self.mark_needs_compositing_bits_update_at(idx);
        }
        if self.flags[i].needs_paint && self.is_repaint_boundary_at(idx) && self.layers[i].is_some()
        {
            self.flags[i].needs_paint = false;
            self.mark_needs_paint_at(idx);
        }

        let mut child = self.first_child[i];
        while child != INVALID {
            let next = self.next_sibling[child as usize];
            self.attach_at(child);
            child = next;
        }

        self.subscribe_animated_opacity(idx);
    }

    pub(crate) fn detach_at(&mut self, idx: u32) {
        let i = idx as usize;
        if !self.flags[i].attached {
            return;
        }
        self.unsubscribe_animated_opacity(idx);
        let decorated = if let NodeKind::DecoratedBox(state) = &mut self.kind[i] {
            state.dispose_painter();
            true
        } else {
            false
        };

        let mut child = self.first_child[i];
        while child != INVALID {
            let next = self.next_sibling[child as usize];
            self.detach_at(child);
            child = next;
        }

        self.flags[i].attached = false;
        if decorated {
            self.mark_needs_paint_at(idx);
        }
    }

    // -- Dirty marking --

    /// Marks a node as needing layout.
    ///
    /// The request walks up to the nearest relayout boundary, which is
    /// queued. Cached intrinsic dimensions are cleared on the way.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn mark_needs_layout(&mut self, id: NodeId) {
        self.validate(id);
        self.mark_needs_layout_at(id.idx);
    }

    pub(crate) fn mark_needs_layout_at(&mut self, idx: u32) {
        let mut idx = idx;
        loop {
            let i = idx as usize;
            let parent = self.parent[i];
            if !self.intrinsics[i].is_empty() {
                self.intrinsics[i].clear();
                if parent != INVALID {
                    self.flags[i].needs_layout = true;
                    idx = parent;
                    continue;
                }
            }
            if self.flags[i].needs_layout {
                return;
            }
            self.flags[i].needs_layout = true;
            let is_boundary = self.constraints[i].is_some() && self.flags[i].relayout_boundary;
            if parent != INVALID && !is_boundary {
                idx = parent;
                continue;
            }
            if self.flags[i].attached {
                self.dirty.mark(idx, dirty::LAYOUT);
            }
            return;
        }
    }

    /// Marks a node whose sized-by-parent status changed, and its parent,
    /// as needing layout.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn mark_needs_layout_for_sized_by_parent_change(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        self.mark_needs_layout_at(idx);
        self.flags[idx as usize].needs_layout = true;
        let parent = self.parent[idx as usize];
        if parent != INVALID {
            self.mark_needs_layout_at(parent);
        }
    }

    /// Marks a node as needing paint.
    ///
    /// The request walks up to the nearest repaint boundary (a
    /// [`RepaintBoundary`](crate::node::RepaintBoundary) node or the root),
    /// which is queued.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn mark_needs_paint(&mut self, id: NodeId) {
        self.validate(id);
        self.mark_needs_paint_at(id.idx);
    }

    pub(crate) fn mark_needs_paint_at(&mut self, idx: u32) {
        let mut idx = idx;
        loop {
            let i = idx as usize;
            if self.flags[i].needs_paint {
                return;
            }
            self.flags[i].needs_paint = true;
            if self.is_repaint_boundary_at(idx) {
                if self.flags[i].attached {
                    self.dirty.mark(idx, dirty::PAINT);
                }
                return;
            }
            let parent = self.parent[i];
            if parent == INVALID {
                return;
            }
            idx = parent;
        }
    }

    /// Marks a node's aggregated compositing requirement as stale.
    ///
    /// The request walks up until it reaches a repaint boundary or a parent
    /// already marked; the last node reached is queued.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn mark_needs_compositing_bits_update(&mut self, id: NodeId) {
        self.validate(id);
        self.mark_needs_compositing_bits_update_at(id.idx);
    }

    pub(crate) fn mark_needs_compositing_bits_update_at(&mut self, idx: u32) {
        let mut idx = idx;
        loop {
            let i = idx as usize;
            if self.flags[i].needs_compositing_bits_update {
                return;
            }
            self.flags[i].needs_compositing_bits_update = true;
            let parent = self.parent[i];
            if parent != INVALID {
                if self.flags[parent as usize].needs_compositing_bits_update {
                    return;
                }
                if !self.is_repaint_boundary_at(idx) && !self.is_repaint_boundary_at(parent) {
                    idx = parent;
                    continue;
                }
            }
            if self.flags[i].attached {
                self.dirty.mark(idx, dirty::COMPOSITING);
            }
            return;
        }
    }

    // -- Internal helpers --

    /// Returns the handle for a live slot.
    #[inline]
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Whether the node paints into its own layer.
    #[inline]
    pub(crate) fn is_repaint_boundary_at(&self, idx: u32) -> bool {
        idx == self.root || self.kind[idx as usize].is_repaint_boundary()
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn check_adoptable(&self, p: u32, child: NodeId) {
        self.validate(child);
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "{child:?} already has a parent"
        );
        assert!(c != self.root, "cannot adopt the root node {child:?}");
        let mut cursor = p;
        while cursor != INVALID {
            assert!(cursor != c, "adopting {child:?} would create a cycle");
            cursor = self.parent[cursor as usize];
        }
    }

    /// Appends `c` to `p`'s child list.
    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
        self.offset[idx as usize] = Vec2::ZERO;
    }

    /// Finishes adopting an already linked child.
    fn adopt(&mut self, p: u32, c: u32) {
        self.redepth(c, self.depth[p as usize] + 1);
        if self.flags[p as usize].attached {
            self.attach_at(c);
        }
        self.mark_needs_layout_at(p);
        self.mark_needs_compositing_bits_update_at(p);
    }

    fn drop_child(&mut self, p: u32, c: u32) {
        self.clean_relayout_boundary(c);
        self.unlink_from_parent(c);
        self.detach_at(c);
        self.mark_needs_layout_at(p);
        self.mark_needs_compositing_bits_update_at(p);
    }

    /// Forces layout under the next parent for every node whose size
    /// depended on the old one.
    fn clean_relayout_boundary(&mut self, idx: u32) {
        let mut stack = alloc::vec![idx];
        while let Some(idx) = stack.pop() {
            let i = idx as usize;
            if self.flags[i].relayout_boundary {
                continue;
            }
            self.flags[i].needs_layout = true;
            let mut child = self.first_child[i];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
        }
    }

    /// Rewrites depths below `idx`, starting at `depth`.
    fn redepth(&mut self, idx: u32, depth: u32) {
        let mut stack = alloc::vec![(idx, depth)];
        while let Some((idx, depth)) = stack.pop() {
            self.depth[idx as usize] = depth;
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                stack.push((child, depth + 1));
                child = self.next_sibling[child as usize];
            }
        }
    }
}
