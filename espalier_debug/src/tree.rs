// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indented text dumps of a render tree.

use std::fmt::Write as _;

use espalier_core::tree::{NodeId, RenderTree};

/// Renders the whole tree under the root, or `"<no root>"`.
#[must_use]
pub fn dump(tree: &RenderTree) -> String {
    match tree.root() {
        Some(root) => dump_subtree(tree, root),
        None => String::from("<no root>\n"),
    }
}

/// Renders `id` and its descendants, one node header per line followed by
/// its properties.
///
/// # Panics
///
/// Panics if the handle is stale.
#[must_use]
pub fn dump_subtree(tree: &RenderTree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, 0, &mut out);
    out
}

fn write_node(tree: &RenderTree, id: NodeId, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let _ = writeln!(out, "{indent}{} #{}", tree.node_name(id), id.index());
    for prop in tree.describe(id) {
        let _ = writeln!(out, "{indent}  · {prop}");
    }
    for child in tree.children(id) {
        write_node(tree, child, depth + 1, out);
    }
}
