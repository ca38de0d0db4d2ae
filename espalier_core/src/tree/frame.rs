// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame driving: value updates followed by the three flushes.

use alloc::vec::Vec;

use understory_dirty::Channel;

use super::store::RenderTree;
use crate::trace::Tracer;

/// Work counts for one [`draw_frame`](RenderTree::draw_frame).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame counter, starting at 0.
    pub frame_index: u64,
    /// Number of layout passes run (including nodes laid out by a parent).
    pub nodes_laid_out: usize,
    /// Number of compositing requirements recomputed.
    pub compositing_updates: usize,
    /// Number of repaint-boundary layers re-recorded.
    pub layers_repainted: usize,
}

impl RenderTree {
    /// Produces a frame: applies queued value notifications, then flushes
    /// layout, compositing bits, and paint.
    ///
    /// The display list is available from
    /// [`display_list`](Self::display_list) afterwards.
    pub fn draw_frame(&mut self) -> FrameStats {
        self.draw_frame_traced(&mut Tracer::none())
    }

    /// Like [`draw_frame`](Self::draw_frame), reporting phases and repaints
    /// to `tracer`.
    pub fn draw_frame_traced(&mut self, tracer: &mut Tracer<'_>) -> FrameStats {
        self.laid_out.clear();
        self.repaints.clear();
        self.compositing_updates = 0;

        self.process_value_updates();
        self.flush_layout_traced(tracer);
        self.flush_compositing_bits_traced(tracer);
        self.flush_paint_traced(tracer);

        let stats = FrameStats {
            frame_index: self.frame_index,
            nodes_laid_out: self.laid_out.len(),
            compositing_updates: self.compositing_updates,
            layers_repainted: self.repaints.len(),
        };
        tracer.frame_summary(&stats);
        self.frame_index += 1;
        stats
    }

    /// Number of frames produced so far.
    #[inline]
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Slot indices laid out during the last frame, in order.
    #[must_use]
    pub fn laid_out(&self) -> &[u32] {
        &self.laid_out
    }

    /// Takes every node queued on `channel`, ordered by depth.
    pub(crate) fn drain_queue(&mut self, channel: Channel, deepest_first: bool) -> Vec<u32> {
        let mut queued: Vec<u32> = self.dirty.drain(channel).deterministic().run().collect();
        if deepest_first {
            queued.sort_by_key(|&idx| core::cmp::Reverse(self.depth[idx as usize]));
        } else {
            queued.sort_by_key(|&idx| self.depth[idx as usize]);
        }
        queued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ProxyBox, RepaintBoundary};

    #[test]
    fn first_frame_does_all_work() {
        let mut tree = RenderTree::new();
        let root = tree.create_node(ProxyBox);
        let boundary = tree.create_node(RepaintBoundary::new());
        tree.set_child(root, Some(boundary));
        tree.set_root(root);

        let stats = tree.draw_frame();
        assert_eq!(stats.frame_index, 0);
        assert_eq!(stats.nodes_laid_out, 2);
        assert_eq!(stats.layers_repainted, 2);
        assert_eq!(tree.frame_index(), 1);
    }

    #[test]
    fn clean_frame_does_nothing() {
        let mut tree = RenderTree::new();
        let root = tree.create_node(ProxyBox);
        tree.set_root(root);
        let _ = tree.draw_frame();

        let stats = tree.draw_frame();
        assert_eq!(
            stats,
            FrameStats {
                frame_index: 1,
                ..FrameStats::default()
            }
        );
        assert!(tree.laid_out().is_empty());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn traced_frame_reports_phases() {
        use crate::trace::{PhaseBeginEvent, PhaseKind, RepaintEvent, TraceSink};

        #[derive(Default)]
        struct Recording {
            phases: Vec<(PhaseKind, usize)>,
            repaints: Vec<bool>,
            summaries: usize,
        }
        impl TraceSink for Recording {
            fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
                self.phases.push((e.phase, e.queued));
            }
            fn on_repaint(&mut self, e: &RepaintEvent) {
                self.repaints.push(e.with_parent);
            }
            fn on_frame_summary(&mut self, _: &FrameStats) {
                self.summaries += 1;
            }
        }

        let mut tree = RenderTree::new();
        let root = tree.create_node(ProxyBox);
        tree.set_root(root);
        let mut sink = Recording::default();
        let _ = tree.draw_frame_traced(&mut Tracer::new(&mut sink));

        assert_eq!(
            sink.phases,
            [
                (PhaseKind::Layout, 1),
                (PhaseKind::CompositingBits, 1),
                (PhaseKind::Paint, 1)
            ]
        );
        assert_eq!(sink.repaints, [false]);
        assert_eq!(sink.summaries, 1);
    }
}
