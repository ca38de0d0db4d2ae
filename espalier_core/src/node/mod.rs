// Copyright 2026 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Concrete render node kinds.
//!
//! Every node in a [`RenderTree`](crate::tree::RenderTree) shares the same
//! generic storage (topology, geometry, dirty flags, attachment) and carries
//! one [`NodeKind`] holding the kind-specific local state. The kind decides
//! four policies: the constraints handed down, the size read back up, how
//! paint is wrapped, and how hit testing is wrapped.
//!
//! | Kind | Layout | Paint | Hit test |
//! |---|---|---|---|
//! | [`ProxyBox`] | child's size | child | child |
//! | [`ConstrainedBox`] | enforce extra constraints | child | child |
//! | [`LimitedBox`] | cap unbounded axes | child | child |
//! | [`AspectRatio`] | ratio-preserving size, tight child | child | child |
//! | [`Opacity`] / [`AnimatedOpacity`] | child's size | skip, direct, or layer | child |
//! | [`DecoratedBox`] | child's size | decoration behind or in front | decoration shape |
//! | [`Transform`] | child's size | transform layer or offset | inverse transform |
//! | [`FractionalTranslation`] | child's size | offset by a size fraction | inverse offset |
//! | [`PointerListener`] | child's size, else biggest | child | behavior, dispatches events |
//! | [`RepaintBoundary`] | child's size | own layer | child |
//! | [`IgnorePointer`] | child's size | child | never when ignoring |
//! | [`AbsorbPointer`] | child's size | child | bounds when absorbing |
//! | [`Offstage`] | smallest when offstage | skip when offstage | never when offstage |
//! | [`MetaData`] | child's size, else biggest | child | behavior, carries a payload |
//! | [`Flex`] | children in a row or column | children | children, last first |
//!
//! Setters for each kind live on [`RenderTree`](crate::tree::RenderTree) so
//! they can apply the documented dirty-flag side effects.

mod boundary;
mod decorated;
mod flex;
mod opacity;
mod pointer;
mod sizing;
mod transform;

pub use boundary::{Offstage, RepaintBoundary};
pub use decorated::DecoratedBox;
pub use flex::{Axis, CrossAxisAlignment, Flex};
pub use opacity::{AnimatedOpacity, Opacity};
pub use pointer::{AbsorbPointer, IgnorePointer, MetaData, PointerListener};
pub use sizing::{AspectRatio, ConstrainedBox, LimitedBox};
pub use transform::{Alignment, FractionalTranslation, Transform};

pub(crate) use transform::{as_translation, try_invert};

/// How a behavior-carrying node participates in hit testing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HitTestBehavior {
    /// Hit only if a descendant was hit.
    #[default]
    DeferToChild,
    /// Hit whenever the point is within bounds, blocking nodes behind.
    Opaque,
    /// Always record an entry within bounds, but report a hit only if a
    /// descendant was hit, letting nodes behind receive the event too.
    Translucent,
}

/// A node that sizes itself to its child and forwards everything unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProxyBox;

/// Typed access to a node's kind-specific state.
///
/// Implemented for every state type wrapped by [`NodeKind`].
pub trait NodeState: Sized {
    /// Diagnostic name of the kind, e.g. `"RenderOpacity"`.
    const NAME: &'static str;

    /// Returns the state if `kind` is this kind.
    fn extract(kind: &NodeKind) -> Option<&Self>;

    /// Returns the state mutably if `kind` is this kind.
    fn extract_mut(kind: &mut NodeKind) -> Option<&mut Self>;
}

macro_rules! node_kinds {
    ($($variant:ident => $name:literal,)*) => {
        /// The kind-specific state of a render node.
        #[derive(Debug)]
        pub enum NodeKind {
            $(
                #[doc = concat!("See [`", stringify!($variant), "`].")]
                $variant($variant),
            )*
        }

        impl NodeKind {
            /// Diagnostic name of the kind.
            #[must_use]
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => $name,)*
                }
            }
        }

        $(
            impl From<$variant> for NodeKind {
                fn from(state: $variant) -> Self {
                    Self::$variant(state)
                }
            }

            impl NodeState for $variant {
                const NAME: &'static str = $name;

                #[inline]
                fn extract(kind: &NodeKind) -> Option<&Self> {
                    match kind {
                        NodeKind::$variant(state) => Some(state),
                        _ => None,
                    }
                }

                #[inline]
                fn extract_mut(kind: &mut NodeKind) -> Option<&mut Self> {
                    match kind {
                        NodeKind::$variant(state) => Some(state),
                        _ => None,
                    }
                }
            }
        )*
    };
}

node_kinds! {
    ProxyBox => "RenderProxyBox",
    ConstrainedBox => "RenderConstrainedBox",
    LimitedBox => "RenderLimitedBox",
    AspectRatio => "RenderAspectRatio",
    Opacity => "RenderOpacity",
    AnimatedOpacity => "RenderAnimatedOpacity",
    DecoratedBox => "RenderDecoratedBox",
    Transform => "RenderTransform",
    FractionalTranslation => "RenderFractionalTranslation",
    PointerListener => "RenderPointerListener",
    RepaintBoundary => "RenderRepaintBoundary",
    IgnorePointer => "RenderIgnorePointer",
    AbsorbPointer => "RenderAbsorbPointer",
    Offstage => "RenderOffstage",
    MetaData => "RenderMetaData",
    Flex => "RenderFlex",
}

impl Default for NodeKind {
    fn default() -> Self {
        Self::ProxyBox(ProxyBox)
    }
}

impl NodeKind {
    /// Whether this kind accepts any number of children.
    #[inline]
    #[must_use]
    pub fn is_multi_child(&self) -> bool {
        matches!(self, Self::Flex(_))
    }

    /// Whether this kind always paints into its own layer.
    #[inline]
    #[must_use]
    pub fn is_repaint_boundary(&self) -> bool {
        matches!(self, Self::RepaintBoundary(_))
    }

    /// Whether this kind's size depends only on its incoming constraints.
    #[inline]
    #[must_use]
    pub fn sized_by_parent(&self) -> bool {
        matches!(self, Self::Offstage(o) if o.offstage)
    }

    /// Whether this kind pushes a layer of its own when it has a child.
    #[must_use]
    pub fn always_needs_compositing(&self, has_child: bool) -> bool {
        has_child
            && match self {
                Self::Opacity(o) => o.needs_layer(),
                Self::AnimatedOpacity(o) => o.currently_needs_compositing,
                Self::Transform(t) => !t.is_translation(),
                _ => false,
            }
    }
}
