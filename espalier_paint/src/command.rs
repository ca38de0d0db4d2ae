// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recorded draw commands.
//!
//! Every canvas call becomes exactly one [`DrawCmd`] (or none, for calls that
//! draw nothing). Commands are immutable values: each one that carries a
//! [`Paint`] owns its own copy.

use alloc::string::String;

use kurbo::{Affine, Point, Rect, RoundedRect};

use crate::paint::Paint;
use crate::path::Path;
use crate::recorder::Picture;

/// An opaque handle to decoded image pixels owned by a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Image {
    /// Backend-defined identifier.
    pub id: u64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Image {
    /// Returns the full image bounds as a rectangle.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// A pre-shaped run of text.
///
/// Shaping happens outside this crate; the blob only records what to draw
/// and how much room it occupies relative to its origin.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlob {
    /// The text the run was shaped from.
    pub text: String,
    /// Ink bounds relative to the draw origin.
    pub bounds: Rect,
}

/// One recorded canvas operation.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
    /// Push the current matrix and clip.
    Save,
    /// Push the current state and begin an offscreen layer composited with
    /// `paint` on restore.
    SaveLayer {
        /// Optional bounds hint for the layer.
        bounds: Option<Rect>,
        /// Paint applied when the layer is composited.
        paint: Paint,
    },
    /// Pop the most recent save or layer.
    Restore,
    /// Pre-translate the current matrix.
    Translate {
        /// Horizontal translation.
        dx: f64,
        /// Vertical translation.
        dy: f64,
    },
    /// Pre-scale the current matrix. A missing `sy` means uniform scale.
    Scale {
        /// Horizontal scale.
        sx: f64,
        /// Vertical scale, defaulting to `sx`.
        sy: Option<f64>,
    },
    /// Pre-rotate the current matrix, optionally about a pivot.
    Rotate {
        /// Rotation angle in radians.
        radians: f64,
        /// Pivot point; the origin when absent.
        offset: Option<Point>,
    },
    /// Pre-skew the current matrix.
    Skew {
        /// Horizontal skew factor.
        sx: f64,
        /// Vertical skew factor.
        sy: f64,
    },
    /// Pre-concatenate a matrix.
    Concat(Affine),
    /// Replace the current matrix with the identity.
    ResetMatrix,
    /// Replace the current matrix.
    SetMatrix(Affine),
    /// Intersect the clip with a rectangle.
    ClipRect(Rect),
    /// Intersect the clip with a rounded rectangle.
    ClipRRect(RoundedRect),
    /// Intersect the clip with a path.
    ClipPath(Path),
    /// Fill or stroke a path.
    DrawPath {
        /// Geometry to draw.
        path: Path,
        /// Paint to draw it with.
        paint: Paint,
    },
    /// Draw an image with its top-left corner at `offset`.
    DrawImage {
        /// Image to draw.
        image: Image,
        /// Top-left corner.
        offset: Point,
        /// Paint to draw it with.
        paint: Paint,
    },
    /// Draw the `src` part of an image (the whole image when absent) into `dst`.
    DrawImageRect {
        /// Image to draw.
        image: Image,
        /// Source sub-rectangle.
        src: Option<Rect>,
        /// Destination rectangle.
        dst: Rect,
        /// Paint to draw it with.
        paint: Paint,
    },
    /// Draw an image as a nine-patch: `center` stretches, corners do not.
    DrawImageNine {
        /// Image to draw.
        image: Image,
        /// Source sub-rectangle.
        src: Option<Rect>,
        /// Stretchable center region, in image coordinates.
        center: Rect,
        /// Destination rectangle.
        dst: Rect,
        /// Paint to draw it with.
        paint: Paint,
    },
    /// Replay another picture.
    DrawPicture(Picture),
    /// Draw a pre-shaped text run.
    DrawTextBlob {
        /// Text run to draw.
        blob: TextBlob,
        /// Origin of the run.
        offset: Point,
        /// Paint to draw it with.
        paint: Paint,
    },
}

impl DrawCmd {
    /// Returns the paint this command carries, if any.
    #[must_use]
    pub fn paint(&self) -> Option<&Paint> {
        match self {
            Self::SaveLayer { paint, .. }
            | Self::DrawPath { paint, .. }
            | Self::DrawImage { paint, .. }
            | Self::DrawImageRect { paint, .. }
            | Self::DrawImageNine { paint, .. }
            | Self::DrawTextBlob { paint, .. } => Some(paint),
            _ => None,
        }
    }

    /// Returns `true` for commands that draw pixels.
    #[must_use]
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Self::DrawPath { .. }
                | Self::DrawImage { .. }
                | Self::DrawImageRect { .. }
                | Self::DrawImageNine { .. }
                | Self::DrawPicture(_)
                | Self::DrawTextBlob { .. }
        )
    }

    /// Short name of the command kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Save => "Save",
            Self::SaveLayer { .. } => "SaveLayer",
            Self::Restore => "Restore",
            Self::Translate { .. } => "Translate",
            Self::Scale { .. } => "Scale",
            Self::Rotate { .. } => "Rotate",
            Self::Skew { .. } => "Skew",
            Self::Concat(_) => "Concat",
            Self::ResetMatrix => "ResetMatrix",
            Self::SetMatrix(_) => "SetMatrix",
            Self::ClipRect(_) => "ClipRect",
            Self::ClipRRect(_) => "ClipRRect",
            Self::ClipPath(_) => "ClipPath",
            Self::DrawPath { .. } => "DrawPath",
            Self::DrawImage { .. } => "DrawImage",
            Self::DrawImageRect { .. } => "DrawImageRect",
            Self::DrawImageNine { .. } => "DrawImageNine",
            Self::DrawPicture(_) => "DrawPicture",
            Self::DrawTextBlob { .. } => "DrawTextBlob",
        }
    }
}
