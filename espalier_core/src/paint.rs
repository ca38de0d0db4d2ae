// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Painting into repaint-boundary layers.
//!
//! Every repaint boundary (and the root) owns a [`Layer`]: a recorded
//! [`Picture`] plus the positions where child layers are composited into it.
//! A paint flush re-records only the layers whose subtree asked for paint;
//! a clean child layer is reused by reference. [`RenderTree::display_list`]
//! stitches the layers back into one flat command list.
//!
//! ```text
//!   root layer: [cmd, cmd, ▼child@2, cmd]
//!                           │
//!                           └─ child layer: [cmd, cmd]
//!
//!   display list: cmd cmd Save Translate cmd cmd Restore cmd
//! ```

use alloc::rc::Rc;
use alloc::vec::Vec;

use espalier_paint::{Canvas, Color, DrawCmd, Paint, Picture, PictureRecorder, RecorderCanvas};
use kurbo::{Affine, Rect, Size, Vec2};

use crate::decoration::{DecorationPosition, ImageConfiguration};
use crate::dirty;
use crate::node::{DecoratedBox, NodeKind, RepaintBoundary, as_translation};
use crate::trace::{PhaseBeginEvent, PhaseEndEvent, PhaseKind, RepaintEvent, Tracer};
use crate::tree::{INVALID, NodeId, RenderTree};

/// Color of the size outlines drawn when
/// [`debug_paint_size`](crate::config::PipelineConfig::debug_paint_size) is
/// on.
pub const DEBUG_PAINT_SIZE_COLOR: Color = Color::from_argb32(0xFF_00_FF_FF);

/// Where a child layer is composited into its parent layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerChild {
    /// Command index in the parent picture the child is inserted before.
    pub at: usize,
    /// The repaint boundary owning the child layer.
    pub node: NodeId,
    /// Offset of the child layer within the parent.
    pub offset: Vec2,
}

/// The recorded output of one repaint boundary.
#[derive(Clone, Debug)]
pub struct Layer {
    pub(crate) picture: Picture,
    pub(crate) children: Vec<LayerChild>,
    pub(crate) is_complex: bool,
    pub(crate) will_change: bool,
}

impl Layer {
    /// Commands recorded for this layer, excluding child layers.
    #[must_use]
    pub fn picture(&self) -> &Picture {
        &self.picture
    }

    /// Child layers in insertion order.
    #[must_use]
    pub fn children(&self) -> &[LayerChild] {
        &self.children
    }

    /// Whether something in the layer asked to be treated as expensive to
    /// rasterize.
    #[inline]
    #[must_use]
    pub fn is_complex(&self) -> bool {
        self.is_complex
    }

    /// Whether the layer's content is expected to change next frame.
    #[inline]
    #[must_use]
    pub fn will_change(&self) -> bool {
        self.will_change
    }
}

/// The recording state for one layer while it is painted.
pub(crate) struct PaintingContext<'a> {
    canvas: RecorderCanvas<'a>,
    children: Vec<LayerChild>,
    is_complex: bool,
    will_change: bool,
}

impl<'a> PaintingContext<'a> {
    fn new(canvas: RecorderCanvas<'a>) -> Self {
        Self {
            canvas,
            children: Vec::new(),
            is_complex: false,
            will_change: false,
        }
    }

    pub(crate) fn canvas(&mut self) -> &mut RecorderCanvas<'a> {
        &mut self.canvas
    }

    /// Hints that the layer being recorded is expensive to rasterize.
    pub(crate) fn set_is_complex_hint(&mut self) {
        self.is_complex = true;
    }

    /// Hints that the layer being recorded is likely to change next frame.
    pub(crate) fn set_will_change_hint(&mut self) {
        self.will_change = true;
    }

    /// Paints `painter` through an offscreen layer composited at `alpha`.
    pub(crate) fn push_opacity(
        &mut self,
        offset: Vec2,
        alpha: u8,
        painter: impl FnOnce(&mut Self, Vec2),
    ) {
        self.canvas.save_layer(None, &Paint::from_alpha(alpha));
        painter(self, offset);
        self.canvas.restore();
    }

    /// Paints `painter` with `transform` applied about `offset`.
    ///
    /// A compositing transform gets its own offscreen layer; otherwise the
    /// matrix is pushed with a plain save.
    pub(crate) fn push_transform(
        &mut self,
        needs_compositing: bool,
        offset: Vec2,
        transform: Affine,
        painter: impl FnOnce(&mut Self, Vec2),
    ) {
        let effective = Affine::translate(offset) * transform * Affine::translate(-offset);
        if needs_compositing {
            self.canvas.save_layer(None, &Paint::default());
        } else {
            self.canvas.save();
        }
        self.canvas.concat(effective);
        painter(self, offset);
        self.canvas.restore();
    }

    fn add_layer_child(&mut self, node: NodeId, offset: Vec2) {
        self.children.push(LayerChild {
            at: self.canvas.recorder().len(),
            node,
            offset,
        });
    }
}

/// Paint policy data copied out of the node before painting children.
#[derive(Clone, Copy)]
enum Policy {
    /// Paint the only child at the node's offset.
    Child,
    Alpha(u8),
    /// An animated alpha; the layer is hinted as changing.
    AnimatedAlpha(u8),
    Decorated,
    Transform(Affine),
    Shifted(Vec2),
    Hidden,
    Children,
}

impl RenderTree {
    /// Re-records every repaint-boundary layer whose subtree needs paint,
    /// deepest first.
    pub fn flush_paint(&mut self) {
        self.flush_paint_traced(&mut Tracer::none());
    }

    pub(crate) fn flush_paint_traced(&mut self, tracer: &mut Tracer<'_>) {
        let queued = self.drain_queue(dirty::PAINT, true);
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: self.frame_index,
            phase: PhaseKind::Paint,
            queued: queued.len(),
        });
        let start = self.repaints.len();
        for idx in queued {
            let i = idx as usize;
            if !self.flags[i].needs_paint || !self.flags[i].attached {
                continue;
            }
            // A boundary that never painted is recorded by its parent.
            if self.layers[i].is_some() || idx == self.root {
                self.repaint_composited_child(idx, false);
            }
        }
        for &(node_index, with_parent) in &self.repaints[start..] {
            tracer.repaint(&RepaintEvent {
                frame_index: self.frame_index,
                node_index,
                with_parent,
            });
        }
        tracer.phase_end(&PhaseEndEvent {
            frame_index: self.frame_index,
            phase: PhaseKind::Paint,
        });
    }

    /// The layer last recorded for a repaint boundary or the root.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn layer(&self, id: NodeId) -> Option<&Layer> {
        self.validate(id);
        self.layers[id.idx as usize].as_ref()
    }

    /// The whole frame as one command list, with each child layer inlined
    /// as `Save, Translate, <layer>, Restore` at its insertion point.
    ///
    /// Empty before the first paint or without a root.
    #[must_use]
    pub fn display_list(&self) -> Picture {
        let mut commands = Vec::new();
        if self.root != INVALID {
            self.flatten_layer(self.root, &mut commands);
        }
        Picture::from_commands(commands)
    }

    fn flatten_layer(&self, idx: u32, out: &mut Vec<DrawCmd>) {
        let Some(layer) = &self.layers[idx as usize] else {
            return;
        };
        let commands = layer.picture.commands();
        let mut cursor = 0;
        for child in &layer.children {
            out.extend_from_slice(&commands[cursor..child.at]);
            cursor = child.at;
            if !self.is_alive(child.node) {
                continue;
            }
            out.push(DrawCmd::Save);
            out.push(DrawCmd::Translate {
                dx: child.offset.x,
                dy: child.offset.y,
            });
            self.flatten_layer(child.node.idx, out);
            out.push(DrawCmd::Restore);
        }
        out.extend_from_slice(&commands[cursor..]);
    }

    /// Records a boundary's subtree into a fresh layer.
    fn repaint_composited_child(&mut self, idx: u32, with_parent: bool) {
        if let Some(boundary) = self.state_at_mut::<RepaintBoundary>(idx) {
            boundary.register_paint(with_parent, true);
        }
        let mut recorder = PictureRecorder::new();
        let (children, is_complex, will_change) = {
            let mut ctx =
                PaintingContext::new(RecorderCanvas::new(&mut recorder, self.config.display));
            self.paint_with_context(&mut ctx, idx, Vec2::ZERO);
            debug_assert_eq!(
                ctx.canvas.save_count(),
                1,
                "{} {:?} left unbalanced saves in its layer",
                self.kind[idx as usize].name(),
                self.id_at(idx)
            );
            (ctx.children, ctx.is_complex, ctx.will_change)
        };
        self.layers[idx as usize] = Some(Layer {
            picture: recorder.end_recording(),
            children,
            is_complex,
            will_change,
        });
        self.repaints.push((idx, with_parent));
    }

    /// Paints a child: boundaries are composited as layers, everything else
    /// records straight into the current one.
    pub(crate) fn paint_child(&mut self, ctx: &mut PaintingContext<'_>, child: u32, offset: Vec2) {
        if !self.is_repaint_boundary_at(child) {
            self.paint_with_context(ctx, child, offset);
            return;
        }
        let c = child as usize;
        if self.flags[c].needs_paint || self.layers[c].is_none() {
            self.repaint_composited_child(child, true);
        } else if let Some(boundary) = self.state_at_mut::<RepaintBoundary>(child) {
            boundary.register_paint(true, false);
        }
        ctx.add_layer_child(self.id_at(child), offset);
    }

    fn paint_with_context(&mut self, ctx: &mut PaintingContext<'_>, idx: u32, offset: Vec2) {
        let i = idx as usize;
        if self.flags[i].needs_layout {
            return;
        }
        self.flags[i].needs_paint = false;
        self.paint_node(ctx, idx, offset);
        if self.config.debug_paint_size && !self.elects_not_to_paint(idx) {
            let size = self.size[i].unwrap_or_default();
            ctx.canvas().draw_rect(
                Rect::from_origin_size(offset.to_point(), size).inset(-0.5),
                &Paint::stroke(DEBUG_PAINT_SIZE_COLOR, 1.0),
            );
        }
    }

    /// Whether the node skips painting itself and its subtree.
    fn elects_not_to_paint(&self, idx: u32) -> bool {
        let has_child = self.first_child[idx as usize] != INVALID;
        match &self.kind[idx as usize] {
            NodeKind::Offstage(state) => state.offstage,
            NodeKind::Opacity(state) => has_child && state.alpha == 0,
            NodeKind::AnimatedOpacity(state) => has_child && state.alpha == 0,
            _ => false,
        }
    }

    fn paint_node(&mut self, ctx: &mut PaintingContext<'_>, idx: u32, offset: Vec2) {
        let i = idx as usize;
        let child = self.first_child[i];
        let size = self.size[i].unwrap_or_default();
        let policy = match &self.kind[i] {
            NodeKind::Opacity(state) => Policy::Alpha(state.alpha),
            NodeKind::AnimatedOpacity(state) => Policy::AnimatedAlpha(state.alpha),
            NodeKind::DecoratedBox(_) => Policy::Decorated,
            NodeKind::Transform(state) => Policy::Transform(state.effective_transform(size)),
            NodeKind::FractionalTranslation(state) => Policy::Shifted(state.offset_for(size)),
            NodeKind::Offstage(state) if state.offstage => Policy::Hidden,
            NodeKind::Flex(_) => Policy::Children,
            _ => Policy::Child,
        };
        match policy {
            Policy::Decorated => self.paint_decorated(ctx, idx, offset, size),
            Policy::Children => {
                let mut cursor = child;
                while cursor != INVALID {
                    let position = offset + self.offset[cursor as usize];
                    self.paint_child(ctx, cursor, position);
                    cursor = self.next_sibling[cursor as usize];
                }
            }
            _ if child == INVALID => {}
            Policy::Child => self.paint_child(ctx, child, offset),
            Policy::Hidden | Policy::Alpha(0) | Policy::AnimatedAlpha(0) => {}
            Policy::Alpha(255) => self.paint_child(ctx, child, offset),
            Policy::AnimatedAlpha(alpha) => {
                ctx.set_will_change_hint();
                if alpha == 255 {
                    self.paint_child(ctx, child, offset);
                } else {
                    ctx.push_opacity(offset, alpha, |ctx, offset| {
                        self.paint_child(ctx, child, offset);
                    });
                }
            }
            Policy::Alpha(alpha) => {
                ctx.push_opacity(offset, alpha, |ctx, offset| {
                    self.paint_child(ctx, child, offset);
                });
            }
            Policy::Transform(effective) => match as_translation(effective) {
                Some(t) => self.paint_child(ctx, child, offset + t),
                None => {
                    let needs_compositing = self.flags[i].needs_compositing;
                    ctx.push_transform(needs_compositing, offset, effective, |ctx, offset| {
                        self.paint_child(ctx, child, offset);
                    });
                }
            },
            Policy::Shifted(shift) => self.paint_child(ctx, child, offset + shift),
        }
    }

    fn paint_decorated(
        &mut self,
        ctx: &mut PaintingContext<'_>,
        idx: u32,
        offset: Vec2,
        size: Size,
    ) {
        let child = self.first_child[idx as usize];
        let Some(state) = self.state_at_mut::<DecoratedBox>(idx) else {
            return;
        };
        let decoration = Rc::clone(&state.decoration);
        let position = state.position;
        let configuration = state.configuration.with_size(size);
        let mut painter = state
            .painter
            .take()
            .unwrap_or_else(|| decoration.create_box_painter());

        if position == DecorationPosition::Background {
            paint_decoration(ctx, painter.as_mut(), offset, &configuration);
            if decoration.is_complex() {
                ctx.set_is_complex_hint();
            }
        }
        if child != INVALID {
            self.paint_child(ctx, child, offset);
        }
        if position == DecorationPosition::Foreground {
            paint_decoration(ctx, painter.as_mut(), offset, &configuration);
            if decoration.is_complex() {
                ctx.set_is_complex_hint();
            }
        }

        if let Some(state) = self.state_at_mut::<DecoratedBox>(idx) {
            state.painter = Some(painter);
        }
    }
}

fn paint_decoration(
    ctx: &mut PaintingContext<'_>,
    painter: &mut dyn crate::decoration::BoxPainter,
    offset: Vec2,
    configuration: &ImageConfiguration,
) {
    let canvas = ctx.canvas();
    let before = canvas.save_count();
    painter.paint(canvas, offset, configuration);
    let after = canvas.save_count();
    debug_assert_eq!(
        before, after,
        "painter had mismatching save and restore calls. Before painting the decoration, \
         the canvas save count was {before}. After painting it, the canvas save count was \
         {after}. Every call to save() or save_layer() must be matched by a call to restore()"
    );
}
