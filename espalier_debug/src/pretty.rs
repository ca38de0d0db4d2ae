// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use espalier_core::trace::{
    HitTestEvent, NodeLayout, PhaseBeginEvent, PhaseEndEvent, PhaseKind, RepaintEvent, TraceSink,
};
use espalier_core::tree::FrameStats;

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    verbose: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            verbose: false,
        }
    }

    /// Also prints one line per laid-out node instead of only the count.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Layout => "layout",
        PhaseKind::CompositingBits => "compositing",
        PhaseKind::Paint => "paint",
        PhaseKind::HitTest => "hit-test",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} queued={}",
            e.frame_index,
            phase_name(e.phase),
            e.queued,
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {}",
            e.frame_index,
            phase_name(e.phase),
        );
    }

    fn on_repaint(&mut self, e: &RepaintEvent) {
        let _ = writeln!(
            self.writer,
            "[repaint] frame={} node={} with_parent={}",
            e.frame_index, e.node_index, e.with_parent,
        );
    }

    fn on_hit_test(&mut self, e: &HitTestEvent) {
        let _ = writeln!(
            self.writer,
            "[hit] frame={} at=({:.1}, {:.1}) entries={}",
            e.frame_index, e.position.x, e.position.y, e.entries,
        );
    }

    fn on_frame_summary(&mut self, s: &FrameStats) {
        let _ = writeln!(
            self.writer,
            "[summary] frame={} laid_out={} compositing={} repainted={}",
            s.frame_index, s.nodes_laid_out, s.compositing_updates, s.layers_repainted,
        );
    }

    fn on_node_layouts(&mut self, frame_index: u64, layouts: &[NodeLayout]) {
        let _ = writeln!(
            self.writer,
            "[layouts] frame={frame_index} nodes={}",
            layouts.len(),
        );
        if self.verbose {
            for l in layouts {
                let _ = writeln!(
                    self.writer,
                    "  node={} size={:.1}×{:.1}",
                    l.node_index, l.size.width, l.size.height,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use espalier_core::node::{ProxyBox, RepaintBoundary};
    use espalier_core::trace::Tracer;
    use espalier_core::tree::RenderTree;
    use kurbo::{Point, Size};

    #[test]
    fn pretty_print_phase() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_phase_begin(&PhaseBeginEvent {
            frame_index: 1,
            phase: PhaseKind::Layout,
            queued: 2,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("[phase:begin]"), "got: {output}");
        assert!(output.contains("frame=1 layout queued=2"), "got: {output}");
    }

    #[test]
    fn verbose_lists_each_layout() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).verbose(true);
        sink.on_node_layouts(
            0,
            &[NodeLayout {
                node_index: 3,
                size: Size::new(10.0, 20.0),
            }],
        );
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output, "[layouts] frame=0 nodes=1\n  node=3 size=10.0×20.0\n");
    }

    #[test]
    fn traced_frame_writes_every_phase() {
        let mut tree = RenderTree::new();
        let root = tree.create_node(ProxyBox);
        let boundary = tree.create_node(RepaintBoundary::new());
        tree.set_child(root, Some(boundary));
        tree.set_root(root);

        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        let _ = tree.draw_frame_traced(&mut Tracer::new(&mut sink));
        let _ = tree.hit_test_traced(Point::new(5.0, 5.0), &mut Tracer::new(&mut sink));
        let output = String::from_utf8(sink.into_inner()).unwrap();

        for needle in [
            "layout queued=1",
            "[phase:end] frame=0 compositing",
            "[phase:end] frame=0 paint",
            "[repaint] frame=0",
            "[summary] frame=0 laid_out=2",
            "[hit] frame=1 at=(5.0, 5.0)",
        ] {
            assert!(output.contains(needle), "missing {needle:?} in: {output}");
        }
    }
}
