#![forbid(unsafe_code)]

//! Composite label styling for graph views.
//!
//! `remora` layers two independently configured styles into one label style:
//! an opaque node style renders the label's background shape, a label style
//! renders its foreground content. The composed style satisfies the full
//! style-renderer contract (hit-testing, bounds, marquee selection,
//! visibility culling, capability lookup, incremental visual update) by
//! forwarding each query to the wrapped styles applied to proxy entities,
//! with correct inset handling and auto-flip placement.
//!
//! The crate is headless and host-agnostic: it produces and diffs
//! [`visual::Visual`] trees; rasterization belongs to the embedding view
//! host.

pub mod adapter;
pub mod entities;
pub mod error;
pub mod geom;
pub mod renderer;
pub mod shape;
pub mod style;
pub mod text;
pub mod visual;

pub use adapter::CompositeLabelStyle;
pub use entities::{Label, Node, Tag};
pub use error::{Error, Result};
pub use geom::{Insets, OrientedRect, layout_transform};
pub use renderer::CompositeLabelStyleRenderer;
pub use shape::{ShapeConfig, ShapeKind, ShapeNodeStyle};
pub use style::{Capability, CapabilityKind, LabelStyle, LabelStyleRenderer, NodeStyle};
pub use text::{TextConfig, TextLabelStyle};
pub use visual::{
    CanvasContext, DetachedRenderContext, InputContext, RenderContext, Visual, VisualGroup,
};
