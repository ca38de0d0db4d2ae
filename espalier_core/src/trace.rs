// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the render pipeline.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! pipeline calls at each phase. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates per-node [`NodeLayout`] records
//!   and the corresponding `TraceSink` method.

use kurbo::Point;
#[cfg(feature = "trace-rich")]
use kurbo::Size;

use crate::tree::FrameStats;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of the pipeline is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Constraint propagation and sizing.
    Layout,
    /// Recomputing aggregated compositing requirements.
    CompositingBits,
    /// Recording repaint-boundary layers.
    Paint,
    /// Mapping a point to hit entries.
    HitTest,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Marks the beginning of a pipeline phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Number of dirty roots queued for the phase.
    pub queued: usize,
}

/// Marks the end of a pipeline phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
}

/// Emitted for every repaint-boundary layer that was re-recorded.
#[derive(Clone, Copy, Debug)]
pub struct RepaintEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Slot index of the boundary node.
    pub node_index: u32,
    /// Whether the parent layer was recorded in the same pass.
    pub with_parent: bool,
}

/// Emitted after a hit test completes.
#[derive(Clone, Copy, Debug)]
pub struct HitTestEvent {
    /// Frame counter at the time of the query.
    pub frame_index: u64,
    /// Query position in root coordinates.
    pub position: Point,
    /// Number of entries collected.
    pub entries: usize,
}

/// A per-frame node layout record.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct NodeLayout {
    /// Slot index of the node that ran layout.
    pub node_index: u32,
    /// Size the node chose.
    pub size: Size,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the pipeline.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the beginning of a pipeline phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a pipeline phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called for each re-recorded layer.
    fn on_repaint(&mut self, e: &RepaintEvent) {
        _ = e;
    }

    /// Called after a hit test.
    fn on_hit_test(&mut self, e: &HitTestEvent) {
        _ = e;
    }

    /// Called with per-frame work counts.
    fn on_frame_summary(&mut self, s: &FrameStats) {
        _ = s;
    }

    /// Called with the nodes laid out this frame (requires `trace-rich`).
    #[cfg(feature = "trace-rich")]
    fn on_node_layouts(&mut self, frame_index: u64, layouts: &[NodeLayout]) {
        _ = (frame_index, layouts);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Whether events reach a sink. Always `false` without the `trace`
    /// feature.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RepaintEvent`].
    #[inline]
    pub fn repaint(&mut self, e: &RepaintEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_repaint(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`HitTestEvent`].
    #[inline]
    pub fn hit_test(&mut self, e: &HitTestEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_hit_test(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a per-frame summary.
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameStats) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits per-node layout records (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn node_layouts(&mut self, frame_index: u64, layouts: &[NodeLayout]) {
        if let Some(s) = &mut self.sink {
            s.on_node_layouts(frame_index, layouts);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            phase: PhaseKind::Layout,
            queued: 1,
        });
        sink.on_hit_test(&HitTestEvent {
            frame_index: 0,
            position: Point::ORIGIN,
            entries: 0,
        });
        sink.on_frame_summary(&FrameStats::default());
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_active());
        tracer.phase_end(&PhaseEndEvent {
            frame_index: 3,
            phase: PhaseKind::Paint,
        });
        tracer.repaint(&RepaintEvent {
            frame_index: 3,
            node_index: 0,
            with_parent: false,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            phases: Vec<PhaseKind>,
        }
        impl TraceSink for RecordingSink {
            fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
                self.phases.push(e.phase);
            }
        }

        let mut sink = RecordingSink { phases: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: 1,
            phase: PhaseKind::CompositingBits,
            queued: 2,
        });
        drop(tracer);
        assert_eq!(sink.phases, &[PhaseKind::CompositingBits]);
    }
}
