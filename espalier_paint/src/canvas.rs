// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The canvas capability and its recording implementation.
//!
//! [`Canvas`] is the full drawing surface the paint pass sees. A live
//! rasterizing canvas and [`RecorderCanvas`] implement it identically; the
//! recorder turns each call into one [`DrawCmd`] appended to a borrowed
//! [`PictureRecorder`].
//!
//! The recorder's save count is a mirror for diagnostics. It is bumped by
//! `save` and `save_layer`, dropped by `restore`, and never consulted to
//! decide what gets recorded. Unbalanced nesting is detected by callers that
//! compare counts around a sub-paint.

use core::fmt;

use kurbo::{Affine, Point, Rect, RoundedRect};

use crate::command::{DrawCmd, Image, TextBlob};
use crate::paint::{Color, Paint};
use crate::path::{FillRule, Path};
use crate::recorder::{Picture, PictureRecorder};
use crate::shadow;

/// Errors from canvas operations that need a live surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanvasError {
    /// The named operation is only meaningful on a canvas bound to a surface.
    NotAvailableInRecorder(&'static str),
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAvailableInRecorder(op) => write!(f, "{op} is not available in recorder"),
        }
    }
}

impl core::error::Error for CanvasError {}

/// Read-only facts about the display a frame is produced for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayContext {
    /// Physical pixels per logical pixel.
    pub device_pixel_ratio: f64,
}

impl Default for DisplayContext {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl DisplayContext {
    /// Creates a display context.
    #[inline]
    #[must_use]
    pub const fn new(device_pixel_ratio: f64) -> Self {
        Self { device_pixel_ratio }
    }
}

/// Laid-out text that knows how to draw itself onto a canvas.
pub trait Paragraph {
    /// Draws the paragraph with its top-left corner at `offset`.
    fn paint(&self, canvas: &mut dyn Canvas, offset: Point);
}

/// A 2D drawing surface.
///
/// Angles are radians. Matrix operations pre-multiply the current matrix, so
/// the most recent call applies first to drawn geometry.
pub trait Canvas {
    // -- Stack --

    /// Saves the current matrix and clip.
    fn save(&mut self);

    /// Saves the current state and begins an offscreen layer.
    fn save_layer(&mut self, bounds: Option<Rect>, paint: &Paint);

    /// Restores the most recent save or layer.
    fn restore(&mut self);

    /// Returns the mirrored save depth (1 when nothing is saved).
    fn save_count(&self) -> u32;

    // -- Matrix --

    /// Pre-translates the matrix.
    fn translate(&mut self, dx: f64, dy: f64);

    /// Pre-scales the matrix; `sy` defaults to `sx`.
    fn scale(&mut self, sx: f64, sy: Option<f64>);

    /// Pre-rotates the matrix, about `offset` if given.
    fn rotate(&mut self, radians: f64, offset: Option<Point>);

    /// Pre-skews the matrix.
    fn skew(&mut self, sx: f64, sy: f64);

    /// Pre-concatenates `matrix`.
    fn concat(&mut self, matrix: Affine);

    /// Returns the cumulative matrix.
    fn total_matrix(&self) -> Affine;

    /// Resets the matrix to identity.
    fn reset_matrix(&mut self);

    /// Replaces the matrix.
    fn set_matrix(&mut self, matrix: Affine);

    /// Returns the physical pixels per logical pixel of the bound surface.
    fn device_pixel_ratio(&self) -> Result<f64, CanvasError>;

    // -- Clip --

    /// Intersects the clip with a rectangle.
    fn clip_rect(&mut self, rect: Rect);

    /// Intersects the clip with a rounded rectangle.
    fn clip_rrect(&mut self, rrect: RoundedRect);

    /// Intersects the clip with a path.
    fn clip_path(&mut self, path: &Path);

    // -- Draw --

    /// Draws a line segment.
    fn draw_line(&mut self, from: Point, to: Point, paint: &Paint);

    /// Draws a layered shadow for `path` at the given elevation.
    fn draw_shadow(&mut self, path: &Path, color: Color, elevation: f64);

    /// Draws a rectangle. Empty rectangles draw nothing.
    fn draw_rect(&mut self, rect: Rect, paint: &Paint);

    /// Draws a rounded rectangle.
    fn draw_rrect(&mut self, rrect: RoundedRect, paint: &Paint);

    /// Draws the area between two rounded rectangles.
    fn draw_drrect(&mut self, outer: RoundedRect, inner: RoundedRect, paint: &Paint);

    /// Draws the ellipse inscribed in `rect`.
    fn draw_oval(&mut self, rect: Rect, paint: &Paint);

    /// Draws a circle.
    fn draw_circle(&mut self, center: Point, radius: f64, paint: &Paint);

    /// Draws an arc of the ellipse inscribed in `rect`, closed through the
    /// center when `use_center` is set.
    fn draw_arc(
        &mut self,
        rect: Rect,
        start_angle: f64,
        sweep_angle: f64,
        use_center: bool,
        paint: &Paint,
    );

    /// Draws a path.
    fn draw_path(&mut self, path: &Path, paint: &Paint);

    /// Draws an image with its top-left corner at `offset`.
    fn draw_image(&mut self, image: &Image, offset: Point, paint: &Paint);

    /// Draws the `src` part of an image (all of it when `None`) into `dst`.
    fn draw_image_rect(&mut self, image: &Image, src: Option<Rect>, dst: Rect, paint: &Paint);

    /// Draws an image as a nine-patch.
    fn draw_image_nine(
        &mut self,
        image: &Image,
        src: Option<Rect>,
        center: Rect,
        dst: Rect,
        paint: &Paint,
    );

    /// Replays a picture.
    fn draw_picture(&mut self, picture: &Picture);

    /// Draws a pre-shaped text run.
    fn draw_text_blob(&mut self, blob: &TextBlob, offset: Point, paint: &Paint);

    /// Draws laid-out text by letting it paint itself.
    fn draw_paragraph(&mut self, paragraph: &dyn Paragraph, offset: Point);

    /// Submits pending work to the bound surface.
    fn flush(&mut self) -> Result<(), CanvasError>;
}

/// A [`Canvas`] that records into a [`PictureRecorder`].
///
/// The recorder is borrowed, not owned: the caller creates it, hands it to
/// the canvas for the duration of a paint, and ends the recording itself.
#[derive(Debug)]
pub struct RecorderCanvas<'a> {
    recorder: &'a mut PictureRecorder,
    save_count: u32,
    display: DisplayContext,
}

impl<'a> RecorderCanvas<'a> {
    /// Creates a recording canvas over `recorder`.
    ///
    /// `display` supplies the device-pixel-ratio used by
    /// [`draw_shadow`](Canvas::draw_shadow).
    #[must_use]
    pub fn new(recorder: &'a mut PictureRecorder, display: DisplayContext) -> Self {
        Self {
            recorder,
            save_count: 1,
            display,
        }
    }

    /// Clears the recorder and the save-count mirror for reuse.
    pub fn reset(&mut self) {
        self.recorder.reset();
        self.save_count = 1;
    }

    /// Returns the underlying recorder.
    #[must_use]
    pub fn recorder(&self) -> &PictureRecorder {
        self.recorder
    }

    /// Returns the injected display context.
    #[inline]
    #[must_use]
    pub fn display(&self) -> DisplayContext {
        self.display
    }

    fn record_path(&mut self, path: Path, paint: &Paint) {
        self.recorder.add_draw_cmd(DrawCmd::DrawPath {
            path,
            paint: paint.clone(),
        });
    }
}

impl Canvas for RecorderCanvas<'_> {
    fn save(&mut self) {
        self.save_count += 1;
        self.recorder.add_draw_cmd(DrawCmd::Save);
    }

    fn save_layer(&mut self, bounds: Option<Rect>, paint: &Paint) {
        self.save_count += 1;
        self.recorder.add_draw_cmd(DrawCmd::SaveLayer {
            bounds,
            paint: paint.clone(),
        });
    }

    fn restore(&mut self) {
        self.save_count = self.save_count.saturating_sub(1);
        self.recorder.add_draw_cmd(DrawCmd::Restore);
    }

    fn save_count(&self) -> u32 {
        self.save_count
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.recorder.add_draw_cmd(DrawCmd::Translate { dx, dy });
    }

    fn scale(&mut self, sx: f64, sy: Option<f64>) {
        self.recorder.add_draw_cmd(DrawCmd::Scale { sx, sy });
    }

    fn rotate(&mut self, radians: f64, offset: Option<Point>) {
        self.recorder
            .add_draw_cmd(DrawCmd::Rotate { radians, offset });
    }

    fn skew(&mut self, sx: f64, sy: f64) {
        self.recorder.add_draw_cmd(DrawCmd::Skew { sx, sy });
    }

    fn concat(&mut self, matrix: Affine) {
        self.recorder.add_draw_cmd(DrawCmd::Concat(matrix));
    }

    fn total_matrix(&self) -> Affine {
        self.recorder.total_matrix()
    }

    fn reset_matrix(&mut self) {
        self.recorder.add_draw_cmd(DrawCmd::ResetMatrix);
    }

    fn set_matrix(&mut self, matrix: Affine) {
        self.recorder.add_draw_cmd(DrawCmd::SetMatrix(matrix));
    }

    fn device_pixel_ratio(&self) -> Result<f64, CanvasError> {
        Err(CanvasError::NotAvailableInRecorder("device_pixel_ratio"))
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.recorder.add_draw_cmd(DrawCmd::ClipRect(rect));
    }

    fn clip_rrect(&mut self, rrect: RoundedRect) {
        self.recorder.add_draw_cmd(DrawCmd::ClipRRect(rrect));
    }

    fn clip_path(&mut self, path: &Path) {
        self.recorder.add_draw_cmd(DrawCmd::ClipPath(path.clone()));
    }

    fn draw_line(&mut self, from: Point, to: Point, paint: &Paint) {
        let mut path = Path::new();
        path.move_to(from);
        path.line_to(to);
        self.record_path(path, paint);
    }

    fn draw_shadow(&mut self, path: &Path, color: Color, elevation: f64) {
        let dpr = self.display.device_pixel_ratio;
        shadow::draw_shadow(self, path, color, elevation, dpr);
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        let size = rect.size();
        if size.width <= 0.0 || size.height <= 0.0 {
            return;
        }
        self.record_path(Path::from_rect(rect), paint);
    }

    fn draw_rrect(&mut self, rrect: RoundedRect, paint: &Paint) {
        let mut path = Path::new();
        path.add_rrect(rrect);
        self.record_path(path, paint);
    }

    fn draw_drrect(&mut self, outer: RoundedRect, inner: RoundedRect, paint: &Paint) {
        let mut path = Path::new();
        path.add_rrect(outer);
        path.add_rrect(inner);
        path.set_fill_rule(FillRule::EvenOdd);
        self.record_path(path, paint);
    }

    fn draw_oval(&mut self, rect: Rect, paint: &Paint) {
        let mut path = Path::new();
        path.add_oval(rect);
        self.record_path(path, paint);
    }

    fn draw_circle(&mut self, center: Point, radius: f64, paint: &Paint) {
        let mut path = Path::new();
        path.add_circle(center, radius);
        self.record_path(path, paint);
    }

    fn draw_arc(
        &mut self,
        rect: Rect,
        mut start_angle: f64,
        mut sweep_angle: f64,
        use_center: bool,
        paint: &Paint,
    ) {
        use core::f64::consts::{PI, TAU};

        let mut path = Path::new();
        if use_center {
            path.move_to(rect.center());
        }

        // Full turns are emitted as half-turn pairs. Only the first segment
        // may force a move.
        let mut force_move_to = !use_center;
        while sweep_angle <= -TAU {
            path.arc_to(rect, start_angle, -PI, force_move_to);
            start_angle -= PI;
            path.arc_to(rect, start_angle, -PI, false);
            start_angle -= PI;
            force_move_to = false;
            sweep_angle += TAU;
        }
        while sweep_angle >= TAU {
            path.arc_to(rect, start_angle, PI, force_move_to);
            start_angle += PI;
            path.arc_to(rect, start_angle, PI, false);
            start_angle += PI;
            force_move_to = false;
            sweep_angle -= TAU;
        }
        path.arc_to(rect, start_angle, sweep_angle, force_move_to);
        if use_center {
            path.close();
        }
        self.record_path(path, paint);
    }

    fn draw_path(&mut self, path: &Path, paint: &Paint) {
        self.record_path(path.clone(), paint);
    }

    fn draw_image(&mut self, image: &Image, offset: Point, paint: &Paint) {
        self.recorder.add_draw_cmd(DrawCmd::DrawImage {
            image: *image,
            offset,
            paint: paint.clone(),
        });
    }

    fn draw_image_rect(&mut self, image: &Image, src: Option<Rect>, dst: Rect, paint: &Paint) {
        self.recorder.add_draw_cmd(DrawCmd::DrawImageRect {
            image: *image,
            src,
            dst,
            paint: paint.clone(),
        });
    }

    fn draw_image_nine(
        &mut self,
        image: &Image,
        src: Option<Rect>,
        center: Rect,
        dst: Rect,
        paint: &Paint,
    ) {
        self.recorder.add_draw_cmd(DrawCmd::DrawImageNine {
            image: *image,
            src,
            center,
            dst,
            paint: paint.clone(),
        });
    }

    fn draw_picture(&mut self, picture: &Picture) {
        self.recorder
            .add_draw_cmd(DrawCmd::DrawPicture(picture.clone()));
    }

    fn draw_text_blob(&mut self, blob: &TextBlob, offset: Point, paint: &Paint) {
        self.recorder.add_draw_cmd(DrawCmd::DrawTextBlob {
            blob: blob.clone(),
            offset,
            paint: paint.clone(),
        });
    }

    fn draw_paragraph(&mut self, paragraph: &dyn Paragraph, offset: Point) {
        debug_assert!(
            offset.is_finite(),
            "paragraph offset must be finite, got {offset:?}"
        );
        paragraph.paint(self, offset);
    }

    fn flush(&mut self) -> Result<(), CanvasError> {
        Err(CanvasError::NotAvailableInRecorder("flush"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use kurbo::PathEl;

    fn names(rec: &PictureRecorder) -> Vec<&'static str> {
        rec.commands().iter().map(DrawCmd::name).collect()
    }

    fn path_of(cmd: &DrawCmd) -> &Path {
        match cmd {
            DrawCmd::DrawPath { path, .. } => path,
            other => panic!("expected DrawPath, got {other:?}"),
        }
    }

    #[test]
    fn save_count_starts_at_one_and_balances() {
        let mut rec = PictureRecorder::new();
        let mut canvas = RecorderCanvas::new(&mut rec, DisplayContext::default());
        assert_eq!(canvas.save_count(), 1);
        canvas.save();
        canvas.save_layer(None, &Paint::default());
        assert_eq!(canvas.save_count(), 3);
        canvas.restore();
        canvas.restore();
        assert_eq!(canvas.save_count(), 1);
        assert_eq!(names(&rec), ["Save", "SaveLayer", "Restore", "Restore"]);
    }

    #[test]
    fn recorded_paint_is_a_copy() {
        let mut rec = PictureRecorder::new();
        let mut paint = Paint::fill(Color::WHITE);
        {
            let mut canvas = RecorderCanvas::new(&mut rec, DisplayContext::default());
            canvas.draw_rect(Rect::new(0.0, 0.0, 10.0, 10.0), &paint);
        }
        paint.color = Color::BLACK;
        assert_eq!(rec.commands()[0].paint().map(|p| p.color), Some(Color::WHITE));
    }

    #[test]
    fn empty_rect_is_skipped() {
        let mut rec = PictureRecorder::new();
        let mut canvas = RecorderCanvas::new(&mut rec, DisplayContext::default());
        canvas.draw_rect(Rect::new(0.0, 0.0, 0.0, 10.0), &Paint::default());
        canvas.draw_rect(Rect::new(0.0, 0.0, 10.0, 0.0), &Paint::default());
        assert!(rec.is_empty());
    }

    #[test]
    fn line_becomes_two_point_path() {
        let mut rec = PictureRecorder::new();
        let mut canvas = RecorderCanvas::new(&mut rec, DisplayContext::default());
        canvas.draw_line(Point::new(1.0, 2.0), Point::new(3.0, 4.0), &Paint::default());
        let path = path_of(&rec.commands()[0]);
        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo(Point::new(1.0, 2.0)),
                PathEl::LineTo(Point::new(3.0, 4.0))
            ]
        );
    }

    #[test]
    fn drrect_uses_even_odd() {
        let mut rec = PictureRecorder::new();
        let mut canvas = RecorderCanvas::new(&mut rec, DisplayContext::default());
        let outer = RoundedRect::new(0.0, 0.0, 50.0, 50.0, 4.0);
        let inner = RoundedRect::new(10.0, 10.0, 40.0, 40.0, 2.0);
        canvas.draw_drrect(outer, inner, &Paint::default());
        let path = path_of(&rec.commands()[0]);
        assert_eq!(path.fill_rule(), FillRule::EvenOdd);
        assert!(path.contains(Point::new(5.0, 25.0)));
        assert!(!path.contains(Point::new(25.0, 25.0)));
    }

    fn move_count(path: &Path) -> usize {
        path.elements()
            .iter()
            .filter(|el| matches!(el, PathEl::MoveTo(_)))
            .count()
    }

    #[test]
    fn full_turn_arc_splits_into_half_turns() {
        let mut rec = PictureRecorder::new();
        let mut canvas = RecorderCanvas::new(&mut rec, DisplayContext::default());
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        canvas.draw_arc(rect, 0.0, core::f64::consts::TAU, false, &Paint::default());
        let path = path_of(&rec.commands()[0]);
        // One forced move at the start; later segments join with lines.
        assert_eq!(move_count(path), 1);
        let lines = path
            .elements()
            .iter()
            .filter(|el| matches!(el, PathEl::LineTo(_)))
            .count();
        assert_eq!(lines, 2);
        assert!(matches!(path.elements()[0], PathEl::MoveTo(_)));
    }

    #[test]
    fn negative_full_turn_arc_splits_too() {
        let mut rec = PictureRecorder::new();
        let mut canvas = RecorderCanvas::new(&mut rec, DisplayContext::default());
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        canvas.draw_arc(rect, 0.0, -2.5 * core::f64::consts::TAU, false, &Paint::default());
        let path = path_of(&rec.commands()[0]);
        assert_eq!(move_count(path), 1);
        // Two full turns become four half-turn segments plus the remainder.
        let lines = path
            .elements()
            .iter()
            .filter(|el| matches!(el, PathEl::LineTo(_)))
            .count();
        assert_eq!(lines, 4);
    }

    #[test]
    fn centered_arc_is_closed_wedge() {
        let mut rec = PictureRecorder::new();
        let mut canvas = RecorderCanvas::new(&mut rec, DisplayContext::default());
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        canvas.draw_arc(rect, 0.0, core::f64::consts::FRAC_PI_2, true, &Paint::default());
        let path = path_of(&rec.commands()[0]);
        assert_eq!(path.elements()[0], PathEl::MoveTo(Point::new(50.0, 50.0)));
        assert!(matches!(path.elements()[1], PathEl::LineTo(_)));
        assert_eq!(path.elements().last(), Some(&PathEl::ClosePath));
    }

    #[test]
    fn total_matrix_is_delegated() {
        let mut rec = PictureRecorder::new();
        let mut canvas = RecorderCanvas::new(&mut rec, DisplayContext::default());
        canvas.translate(5.0, 6.0);
        canvas.scale(2.0, Some(3.0));
        let p = canvas.total_matrix() * Point::new(1.0, 1.0);
        assert_eq!(p, Point::new(7.0, 9.0));
    }

    #[test]
    fn surface_queries_fail_fast() {
        let mut rec = PictureRecorder::new();
        let mut canvas = RecorderCanvas::new(&mut rec, DisplayContext::new(2.0));
        assert_eq!(
            canvas.flush(),
            Err(CanvasError::NotAvailableInRecorder("flush"))
        );
        let err = canvas.device_pixel_ratio().unwrap_err();
        assert_eq!(err.to_string(), "device_pixel_ratio is not available in recorder");
    }

    #[test]
    fn reset_clears_commands_and_save_count() {
        let mut rec = PictureRecorder::new();
        let mut canvas = RecorderCanvas::new(&mut rec, DisplayContext::default());
        canvas.save();
        canvas.draw_circle(Point::new(0.0, 0.0), 4.0, &Paint::default());
        canvas.reset();
        assert_eq!(canvas.save_count(), 1);
        assert!(canvas.recorder().is_empty());
    }

    #[test]
    fn image_variants_keep_optional_source() {
        let mut rec = PictureRecorder::new();
        let mut canvas = RecorderCanvas::new(&mut rec, DisplayContext::default());
        let image = Image {
            id: 7,
            width: 30,
            height: 30,
        };
        let dst = Rect::new(0.0, 0.0, 60.0, 60.0);
        canvas.draw_image_rect(&image, None, dst, &Paint::default());
        canvas.draw_image_nine(
            &image,
            Some(image.bounds()),
            Rect::new(10.0, 10.0, 20.0, 20.0),
            dst,
            &Paint::default(),
        );
        match &rec.commands()[0] {
            DrawCmd::DrawImageRect { src, .. } => assert!(src.is_none()),
            other => panic!("unexpected {other:?}"),
        }
        match &rec.commands()[1] {
            DrawCmd::DrawImageNine { src, .. } => assert_eq!(*src, Some(image.bounds())),
            other => panic!("unexpected {other:?}"),
        }
    }

    struct Label;

    impl Paragraph for Label {
        fn paint(&self, canvas: &mut dyn Canvas, offset: Point) {
            let blob = TextBlob {
                text: "label".to_string(),
                bounds: Rect::new(0.0, 0.0, 30.0, 12.0),
            };
            canvas.draw_text_blob(&blob, offset, &Paint::default());
        }
    }

    #[test]
    fn paragraph_paints_itself() {
        let mut rec = PictureRecorder::new();
        let mut canvas = RecorderCanvas::new(&mut rec, DisplayContext::default());
        canvas.draw_paragraph(&Label, Point::new(3.0, 4.0));
        assert_eq!(names(&rec), ["DrawTextBlob"]);
    }
}
