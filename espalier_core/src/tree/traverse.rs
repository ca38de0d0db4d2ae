// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, NodeId};
use super::store::RenderTree;

/// An iterator over the direct children of a node, in paint order.
///
/// Created by [`RenderTree::children`].
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a RenderTree,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a RenderTree, first: u32) -> Self {
        Self {
            tree,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.next_sibling[idx as usize];
        Some(self.tree.id_at(idx))
    }
}

/// An iterator from a node up to the root, starting with the node's parent.
///
/// Created by [`RenderTree::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a RenderTree,
    current: u32,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(tree: &'a RenderTree, start: u32) -> Self {
        Self {
            tree,
            current: start,
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let p = self.tree.parent[self.current as usize];
        if p == INVALID {
            return None;
        }
        self.current = p;
        Some(self.tree.id_at(p))
    }
}
