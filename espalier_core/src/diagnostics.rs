// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Introspection of node state.
//!
//! Properties are for display only; nothing in the pipeline reads them.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::node::NodeKind;
use crate::tree::{NodeId, RenderTree};

/// One named, pre-formatted property of a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticProperty {
    /// Property name, e.g. `"opacity"`.
    pub name: &'static str,
    /// Formatted value.
    pub value: String,
}

impl DiagnosticProperty {
    fn new(name: &'static str, value: impl fmt::Display) -> Self {
        Self {
            name,
            value: value.to_string(),
        }
    }

    fn debug(name: &'static str, value: impl fmt::Debug) -> Self {
        Self {
            name,
            value: format!("{value:?}"),
        }
    }
}

impl fmt::Display for DiagnosticProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

impl RenderTree {
    /// Diagnostic name of the node's kind, e.g. `"RenderOpacity"`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn node_name(&self, id: NodeId) -> &'static str {
        self.kind(id).name()
    }

    /// The node's layout state followed by its kind-specific properties.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn describe(&self, id: NodeId) -> Vec<DiagnosticProperty> {
        type P = DiagnosticProperty;
        let mut props = Vec::new();
        match self.constraints(id) {
            Some(c) => props.push(P::new("constraints", c)),
            None => props.push(P::new("constraints", "MISSING")),
        }
        match self.size(id) {
            Some(s) => props.push(P::new("size", format!("{:.1}×{:.1}", s.width, s.height))),
            None => props.push(P::new("size", "MISSING")),
        }
        if self.needs_layout(id) {
            props.push(P::new("needs_layout", true));
        }
        if self.needs_compositing(id) {
            props.push(P::new("needs_compositing", true));
        }

        match self.kind(id) {
            NodeKind::ProxyBox(_) => {}
            NodeKind::ConstrainedBox(s) => props.push(P::new("additional_constraints", s.additional)),
            NodeKind::LimitedBox(s) => {
                props.push(P::new("max_width", s.max_width));
                props.push(P::new("max_height", s.max_height));
            }
            NodeKind::AspectRatio(s) => props.push(P::new("aspect_ratio", s.aspect_ratio)),
            NodeKind::Opacity(s) => props.push(P::new("opacity", s.opacity)),
            NodeKind::AnimatedOpacity(s) => {
                props.push(P::new("opacity", s.source.value()));
                props.push(P::new("alpha", s.alpha));
            }
            NodeKind::DecoratedBox(s) => {
                props.push(P::debug("decoration", &s.decoration));
                props.push(P::debug("position", s.position));
                props.push(P::debug("configuration", s.configuration));
            }
            NodeKind::Transform(s) => {
                props.push(P::debug("transform", s.transform.as_coeffs()));
                if let Some(origin) = s.origin {
                    props.push(P::debug("origin", origin));
                }
                if let Some(alignment) = s.alignment {
                    props.push(P::debug("alignment", alignment));
                }
                props.push(P::new("transform_hit_tests", s.transform_hit_tests));
            }
            NodeKind::FractionalTranslation(s) => {
                props.push(P::debug("translation", s.translation));
                props.push(P::new("transform_hit_tests", s.transform_hit_tests));
            }
            NodeKind::PointerListener(s) => {
                props.push(P::debug("behavior", s.behavior));
                let listeners: Vec<_> = s.callbacks.registered().collect();
                let listeners = if listeners.is_empty() {
                    String::from("<none>")
                } else {
                    listeners.join(", ")
                };
                props.push(P::new("listeners", listeners));
            }
            NodeKind::RepaintBoundary(s) => {
                props.push(P::new(
                    "metrics",
                    s.metrics().unwrap_or_else(|| String::from("<none>")),
                ));
                props.push(P::new("diagnosis", s.diagnosis()));
            }
            NodeKind::IgnorePointer(s) => props.push(P::new("ignoring", s.ignoring)),
            NodeKind::AbsorbPointer(s) => props.push(P::new("absorbing", s.absorbing)),
            NodeKind::Offstage(s) => props.push(P::new("offstage", s.offstage)),
            NodeKind::MetaData(s) => {
                props.push(P::debug("behavior", s.behavior));
                props.push(P::new("meta_data", s.meta_data.is_some()));
            }
            NodeKind::Flex(s) => {
                props.push(P::debug("direction", s.direction));
                props.push(P::debug("cross_axis_alignment", s.cross_axis_alignment));
            }
        }
        props
    }
}
