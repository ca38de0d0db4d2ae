// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint primitives and a command-recording canvas.
//!
//! `espalier_paint` is the bottom of the espalier stack. The render tree's
//! paint pass talks to an abstract [`Canvas`](canvas::Canvas); the
//! [`RecorderCanvas`](canvas::RecorderCanvas) implementation serializes every
//! call into an ordered list of immutable [`DrawCmd`](command::DrawCmd)
//! values held by a [`PictureRecorder`](recorder::PictureRecorder). Replaying
//! or rasterizing the resulting [`Picture`](recorder::Picture) is left to a
//! backend.
//!
//! ```text
//!   paint pass ──► RecorderCanvas ──► PictureRecorder ──► Picture
//!                   (save count)       (commands,          (replayable
//!                                       total matrix)       command list)
//! ```
//!
//! **[`paint`]**: [`Color`](paint::Color), [`Paint`](paint::Paint), and mask
//! filters.
//!
//! **[`path`]**: [`Path`](path::Path), a `kurbo` Bézier path plus a fill
//! rule, with builders for every shape the canvas can draw.
//!
//! **[`command`]**: The closed set of recorded commands plus the opaque
//! [`Image`](command::Image) and [`TextBlob`](command::TextBlob) handles.
//!
//! **[`recorder`]**: Command storage and authoritative matrix tracking.
//!
//! **[`canvas`]**: The [`Canvas`](canvas::Canvas) capability and its
//! recording implementation.
//!
//! **[`shadow`]**: Layered shadow synthesis used by `draw_shadow`.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod canvas;
pub mod command;
pub mod paint;
pub mod path;
pub mod recorder;
pub mod shadow;

pub use canvas::{Canvas, CanvasError, DisplayContext, Paragraph, RecorderCanvas};
pub use command::{DrawCmd, Image, TextBlob};
pub use paint::{BlurStyle, Color, MaskFilter, Paint, PaintStyle};
pub use path::{FillRule, Path};
pub use recorder::{Picture, PictureRecorder};
