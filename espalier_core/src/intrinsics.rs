// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Intrinsic dimensions.
//!
//! The four queries answer "how wide (or tall) would this node like to be
//! given a height (or width)?" without laying it out. Results are memoized
//! per node and per argument until the node is next marked for layout.

use crate::node::{Axis, NodeKind};
use crate::tree::{INVALID, NodeId, RenderTree};

/// Which intrinsic query is being answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicDimension {
    /// Smallest width that paints correctly, given a height.
    MinWidth,
    /// Width beyond which growing stops helping, given a height.
    MaxWidth,
    /// Smallest height that paints correctly, given a width.
    MinHeight,
    /// Height beyond which growing stops helping, given a width.
    MaxHeight,
}

impl IntrinsicDimension {
    /// Whether the query measures a width.
    #[inline]
    #[must_use]
    pub fn is_width(self) -> bool {
        matches!(self, Self::MinWidth | Self::MaxWidth)
    }

    /// The maximum query along the other axis.
    fn max_across(self) -> Self {
        if self.is_width() {
            Self::MaxHeight
        } else {
            Self::MaxWidth
        }
    }
}

/// Intrinsic policy data copied out of the node before recursing.
#[derive(Clone, Copy)]
enum Policy {
    Proxy,
    Constrained(crate::constraints::BoxConstraints),
    Ratio(f64),
    Hidden,
    Flex(Axis),
}

impl RenderTree {
    /// Smallest width the node can paint correctly at, given `height`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn min_intrinsic_width(&mut self, id: NodeId, height: f64) -> f64 {
        self.validate(id);
        self.intrinsic(id.idx, IntrinsicDimension::MinWidth, height)
    }

    /// Width beyond which growing the node does not reduce its height.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn max_intrinsic_width(&mut self, id: NodeId, height: f64) -> f64 {
        self.validate(id);
        self.intrinsic(id.idx, IntrinsicDimension::MaxWidth, height)
    }

    /// Smallest height the node can paint correctly at, given `width`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn min_intrinsic_height(&mut self, id: NodeId, width: f64) -> f64 {
        self.validate(id);
        self.intrinsic(id.idx, IntrinsicDimension::MinHeight, width)
    }

    /// Height beyond which growing the node does not reduce its width.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn max_intrinsic_height(&mut self, id: NodeId, width: f64) -> f64 {
        self.validate(id);
        self.intrinsic(id.idx, IntrinsicDimension::MaxHeight, width)
    }

    pub(crate) fn intrinsic(&mut self, idx: u32, dim: IntrinsicDimension, arg: f64) -> f64 {
        debug_assert!(arg >= 0.0, "intrinsic argument must be non-negative, got {arg}");
        let key = arg.to_bits();
        if let Some(&(_, _, cached)) = self.intrinsics[idx as usize]
            .iter()
            .find(|(d, bits, _)| *d == dim && *bits == key)
        {
            return cached;
        }
        let value = self.compute_intrinsic(idx, dim, arg);
        debug_assert!(
            !arg.is_finite() || value.is_finite(),
            "{} returned a non-finite intrinsic {value} for {dim:?}({arg})",
            self.kind[idx as usize].name()
        );
        self.intrinsics[idx as usize].push((dim, key, value));
        value
    }

    fn compute_intrinsic(&mut self, idx: u32, dim: IntrinsicDimension, arg: f64) -> f64 {
        let child = self.first_child[idx as usize];
        let policy = match &self.kind[idx as usize] {
            NodeKind::ConstrainedBox(state) => Policy::Constrained(state.additional),
            NodeKind::AspectRatio(state) => Policy::Ratio(state.aspect_ratio),
            NodeKind::Offstage(state) if state.offstage => Policy::Hidden,
            NodeKind::Flex(state) => Policy::Flex(state.direction),
            _ => Policy::Proxy,
        };
        match policy {
            Policy::Proxy => self.child_intrinsic(child, dim, arg),
            Policy::Hidden => 0.0,
            Policy::Constrained(additional) => {
                let (bounded, tight, infinite, min) = if dim.is_width() {
                    (
                        additional.has_bounded_width(),
                        additional.has_tight_width(),
                        additional.has_infinite_width(),
                        additional.min_width,
                    )
                } else {
                    (
                        additional.has_bounded_height(),
                        additional.has_tight_height(),
                        additional.has_infinite_height(),
                        additional.min_height,
                    )
                };
                if bounded && tight {
                    return min;
                }
                let value = self.child_intrinsic(child, dim, arg);
                if infinite {
                    value
                } else if dim.is_width() {
                    additional.constrain_width(value)
                } else {
                    additional.constrain_height(value)
                }
            }
            Policy::Ratio(ratio) => {
                if !arg.is_finite() {
                    self.child_intrinsic(child, dim, arg)
                } else if dim.is_width() {
                    arg * ratio
                } else {
                    arg / ratio
                }
            }
            Policy::Flex(axis) => {
                let main_is_width = axis == Axis::Horizontal;
                let mut total: f64 = 0.0;
                let mut cursor = child;
                while cursor != INVALID {
                    if dim.is_width() == main_is_width {
                        total += self.intrinsic(cursor, dim, arg);
                    } else {
                        let main = self.intrinsic(cursor, dim.max_across(), f64::INFINITY);
                        total = total.max(self.intrinsic(cursor, dim, main));
                    }
                    cursor = self.next_sibling[cursor as usize];
                }
                total
            }
        }
    }

    fn child_intrinsic(&mut self, child: u32, dim: IntrinsicDimension, arg: f64) -> f64 {
        if child == INVALID {
            0.0
        } else {
            self.intrinsic(child, dim, arg)
        }
    }
}
