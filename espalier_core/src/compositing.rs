// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Aggregated compositing requirements.
//!
//! A node *needs compositing* when it or any descendant pushes a layer of its
//! own: a repaint boundary, the root, a fractional opacity, or a transform
//! that is not a pure translation. Parents read the bit to decide whether
//! wrapping operations (such as a transform) must be composited too.

use crate::dirty;
use crate::trace::{PhaseBeginEvent, PhaseEndEvent, PhaseKind, Tracer};
use crate::tree::{INVALID, RenderTree};

impl RenderTree {
    /// Recomputes every queued compositing requirement, shallowest first.
    pub fn flush_compositing_bits(&mut self) {
        self.flush_compositing_bits_traced(&mut Tracer::none());
    }

    pub(crate) fn flush_compositing_bits_traced(&mut self, tracer: &mut Tracer<'_>) {
        let queued = self.drain_queue(dirty::COMPOSITING, false);
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: self.frame_index,
            phase: PhaseKind::CompositingBits,
            queued: queued.len(),
        });
        for idx in queued {
            let flags = self.flags[idx as usize];
            if flags.needs_compositing_bits_update && flags.attached {
                self.update_compositing_bits(idx);
            }
        }
        tracer.phase_end(&PhaseEndEvent {
            frame_index: self.frame_index,
            phase: PhaseKind::CompositingBits,
        });
    }

    /// Recomputes the bit for `idx` and every marked descendant.
    fn update_compositing_bits(&mut self, idx: u32) {
        let i = idx as usize;
        if !self.flags[i].needs_compositing_bits_update {
            return;
        }
        let old = self.flags[i].needs_compositing;
        let mut needs = false;
        let mut child = self.first_child[i];
        while child != INVALID {
            self.update_compositing_bits(child);
            needs |= self.flags[child as usize].needs_compositing;
            child = self.next_sibling[child as usize];
        }
        let has_child = self.first_child[i] != INVALID;
        needs |= self.is_repaint_boundary_at(idx) || self.kind[i].always_needs_compositing(has_child);
        self.flags[i].needs_compositing = needs;
        if old != needs {
            self.mark_needs_paint_at(idx);
        }
        self.flags[i].needs_compositing_bits_update = false;
        self.compositing_updates += 1;
    }
}

#[cfg(test)]
mod tests {
    use crate::node::{Opacity, ProxyBox, RepaintBoundary, Transform};
    use crate::tree::RenderTree;
    use kurbo::Affine;

    #[test]
    fn boundary_needs_compositing_even_without_layers_below() {
        let mut tree = RenderTree::new();
        let root = tree.create_node(ProxyBox);
        let boundary = tree.create_node(RepaintBoundary::new());
        let leaf = tree.create_node(ProxyBox);
        tree.set_child(root, Some(boundary));
        tree.set_child(boundary, Some(leaf));
        tree.set_root(root);
        let _ = tree.draw_frame();
        assert!(tree.needs_compositing(boundary));
        assert!(!tree.needs_compositing(leaf));
    }

    #[test]
    fn dropping_the_layer_clears_ancestors() {
        let mut tree = RenderTree::new();
        let root = tree.create_node(ProxyBox);
        let mid = tree.create_node(ProxyBox);
        let opacity = tree.create_node(Opacity::new(0.5));
        let leaf = tree.create_node(ProxyBox);
        tree.set_child(root, Some(mid));
        tree.set_child(mid, Some(opacity));
        tree.set_child(opacity, Some(leaf));
        tree.set_root(root);
        let _ = tree.draw_frame();
        assert!(tree.needs_compositing(mid));

        tree.set_opacity(opacity, 1.0);
        let _ = tree.draw_frame();
        assert!(!tree.needs_compositing(opacity));
        assert!(!tree.needs_compositing(mid));
        assert!(tree.needs_compositing(root));
    }

    #[test]
    fn rotation_needs_compositing_only_with_child() {
        let mut tree = RenderTree::new();
        let root = tree.create_node(ProxyBox);
        let rotate = tree.create_node(Transform::new(Affine::rotate(0.5)));
        tree.set_child(root, Some(rotate));
        tree.set_root(root);
        let _ = tree.draw_frame();
        assert!(!tree.needs_compositing(rotate));

        let leaf = tree.create_node(ProxyBox);
        tree.set_child(rotate, Some(leaf));
        let _ = tree.draw_frame();
        assert!(tree.needs_compositing(rotate));
    }
}
