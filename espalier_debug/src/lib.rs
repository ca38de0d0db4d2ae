// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, tree dumps, and display-list export for espalier
//! diagnostics.
//!
//! - [`pretty::PrettyPrintSink`]: a [`TraceSink`](espalier_core::trace::TraceSink)
//!   writing one human-readable line per pipeline event.
//! - [`tree::dump`]: an indented text rendering of a render tree with each
//!   node's diagnostic properties.
//! - [`display_list::export`]: writes a recorded
//!   [`Picture`](espalier_paint::Picture) as JSON for inspection or golden
//!   tests.

pub mod display_list;
pub mod pretty;
pub mod tree;
