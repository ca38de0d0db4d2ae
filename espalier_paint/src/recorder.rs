// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command storage.
//!
//! [`PictureRecorder`] owns the command list and is the single authority on
//! the cumulative transform: it replays every stack and matrix command it
//! receives against its own matrix stack, so
//! [`total_matrix`](PictureRecorder::total_matrix) is always exact.

use alloc::vec::Vec;

use kurbo::{Affine, Vec2};

use crate::command::DrawCmd;

/// An immutable, replayable list of draw commands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Picture {
    commands: Vec<DrawCmd>,
}

impl Picture {
    /// Creates a picture from a command list.
    #[must_use]
    pub fn from_commands(commands: Vec<DrawCmd>) -> Self {
        Self { commands }
    }

    /// Returns the recorded commands in order.
    #[inline]
    #[must_use]
    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    /// Returns an iterator over the commands.
    pub fn iter(&self) -> core::slice::Iter<'_, DrawCmd> {
        self.commands.iter()
    }

    /// Number of commands.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing was recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Consumes the picture, returning its commands.
    #[must_use]
    pub fn into_commands(self) -> Vec<DrawCmd> {
        self.commands
    }
}

impl<'a> IntoIterator for &'a Picture {
    type Item = &'a DrawCmd;
    type IntoIter = core::slice::Iter<'a, DrawCmd>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

/// Accumulates draw commands and tracks the resulting matrix.
#[derive(Clone, Debug)]
pub struct PictureRecorder {
    commands: Vec<DrawCmd>,
    matrix: Affine,
    matrix_stack: Vec<Affine>,
}

impl Default for PictureRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl PictureRecorder {
    /// Creates an empty recorder with an identity matrix.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            matrix: Affine::IDENTITY,
            matrix_stack: Vec::new(),
        }
    }

    /// Appends a command, updating the tracked matrix.
    ///
    /// A restore with nothing saved is recorded but leaves the matrix alone;
    /// balancing saves and restores is the caller's responsibility.
    pub fn add_draw_cmd(&mut self, cmd: DrawCmd) {
        match &cmd {
            DrawCmd::Save | DrawCmd::SaveLayer { .. } => self.matrix_stack.push(self.matrix),
            DrawCmd::Restore => {
                if let Some(m) = self.matrix_stack.pop() {
                    self.matrix = m;
                }
            }
            DrawCmd::Translate { dx, dy } => {
                self.matrix *= Affine::translate(Vec2::new(*dx, *dy));
            }
            DrawCmd::Scale { sx, sy } => {
                self.matrix *= Affine::scale_non_uniform(*sx, sy.unwrap_or(*sx));
            }
            DrawCmd::Rotate { radians, offset } => {
                self.matrix *= match offset {
                    Some(pivot) => Affine::rotate_about(*radians, *pivot),
                    None => Affine::rotate(*radians),
                };
            }
            DrawCmd::Skew { sx, sy } => self.matrix *= Affine::skew(*sx, *sy),
            DrawCmd::Concat(m) => self.matrix *= *m,
            DrawCmd::ResetMatrix => self.matrix = Affine::IDENTITY,
            DrawCmd::SetMatrix(m) => self.matrix = *m,
            _ => {}
        }
        self.commands.push(cmd);
    }

    /// Returns the cumulative transform of everything recorded so far.
    #[inline]
    #[must_use]
    pub fn total_matrix(&self) -> Affine {
        self.matrix
    }

    /// Returns the commands recorded so far.
    #[inline]
    #[must_use]
    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    /// Number of commands recorded so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Discards all commands and resets the matrix state.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.matrix = Affine::IDENTITY;
        self.matrix_stack.clear();
    }

    /// Takes the recorded commands as a [`Picture`], leaving the recorder
    /// empty and ready for reuse.
    pub fn end_recording(&mut self) -> Picture {
        let commands = core::mem::take(&mut self.commands);
        self.reset();
        Picture { commands }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Rect};

    fn assert_affine_eq(a: Affine, b: Affine) {
        let (a, b) = (a.as_coeffs(), b.as_coeffs());
        for i in 0..6 {
            assert!((a[i] - b[i]).abs() < 1e-9, "coeff {i}: {} vs {}", a[i], b[i]);
        }
    }

    #[test]
    fn matrix_follows_save_and_restore() {
        let mut rec = PictureRecorder::new();
        rec.add_draw_cmd(DrawCmd::Translate { dx: 10.0, dy: 0.0 });
        rec.add_draw_cmd(DrawCmd::Save);
        rec.add_draw_cmd(DrawCmd::Scale { sx: 2.0, sy: None });
        assert_affine_eq(
            rec.total_matrix(),
            Affine::translate((10.0, 0.0)) * Affine::scale(2.0),
        );
        rec.add_draw_cmd(DrawCmd::Restore);
        assert_affine_eq(rec.total_matrix(), Affine::translate((10.0, 0.0)));
        assert_eq!(rec.len(), 4);
    }

    #[test]
    fn rotate_about_pivot_keeps_pivot_fixed() {
        let mut rec = PictureRecorder::new();
        rec.add_draw_cmd(DrawCmd::Rotate {
            radians: core::f64::consts::FRAC_PI_2,
            offset: Some(Point::new(5.0, 5.0)),
        });
        let p = rec.total_matrix() * Point::new(5.0, 5.0);
        assert!((p.x - 5.0).abs() < 1e-9 && (p.y - 5.0).abs() < 1e-9, "{p:?}");
    }

    #[test]
    fn set_and_reset_matrix() {
        let mut rec = PictureRecorder::new();
        rec.add_draw_cmd(DrawCmd::SetMatrix(Affine::scale(3.0)));
        assert_affine_eq(rec.total_matrix(), Affine::scale(3.0));
        rec.add_draw_cmd(DrawCmd::ResetMatrix);
        assert_affine_eq(rec.total_matrix(), Affine::IDENTITY);
    }

    #[test]
    fn unmatched_restore_is_recorded_but_harmless() {
        let mut rec = PictureRecorder::new();
        rec.add_draw_cmd(DrawCmd::Concat(Affine::scale(2.0)));
        rec.add_draw_cmd(DrawCmd::Restore);
        assert_affine_eq(rec.total_matrix(), Affine::scale(2.0));
        assert_eq!(rec.commands().last(), Some(&DrawCmd::Restore));
    }

    #[test]
    fn end_recording_empties_recorder() {
        let mut rec = PictureRecorder::new();
        rec.add_draw_cmd(DrawCmd::ClipRect(Rect::new(0.0, 0.0, 1.0, 1.0)));
        rec.add_draw_cmd(DrawCmd::Skew { sx: 0.5, sy: 0.0 });
        let picture = rec.end_recording();
        assert_eq!(picture.len(), 2);
        assert!(rec.is_empty());
        assert_affine_eq(rec.total_matrix(), Affine::IDENTITY);
    }
}
