//! Style and renderer contracts.
//!
//! A style is a pluggable drawing policy; its renderer is the stateful
//! companion every geometry and drawing query goes through. Renderer entry
//! points follow a two-phase protocol: bind a (label, style) pair, then
//! return a capability handle computed from the bound state. Binding mutates
//! the renderer, so a renderer instance is not reentrant; the host's
//! single-threaded rendering model makes that safe.
//!
//! Capability discovery is a closed enum ([`CapabilityKind`] /
//! [`Capability`]) rather than a type-driven lookup: every capability this
//! crate knows about has its own trait, and renderers answer `lookup` by
//! pattern matching.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::entities::{Label, Node};
use crate::geom::{Insets, Point, Rect, Size};
use crate::visual::{CanvasContext, InputContext, RenderContext, Visual};

/// A drawing policy for nodes.
pub trait NodeStyle {
    /// The renderer all queries for this style go through.
    fn renderer(&self) -> Rc<RefCell<dyn NodeStyleRenderer>>;

    fn as_any(&self) -> &dyn Any;
}

/// A drawing policy for labels.
pub trait LabelStyle {
    /// The renderer all queries for this style go through.
    fn renderer(&self) -> Rc<RefCell<dyn LabelStyleRenderer>>;

    fn as_any(&self) -> &dyn Any;
}

/// Computes the axis-aligned bounds of a bound element.
pub trait BoundsProvider {
    fn bounds(&self, ctx: &CanvasContext) -> Rect;
}

/// Answers pointer hit tests for a bound element.
pub trait HitTestable {
    fn is_hit(&self, ctx: &InputContext, location: Point) -> bool;
}

/// Answers marquee (selection box) tests for a bound element.
pub trait MarqueeTestable {
    fn is_in_box(&self, ctx: &InputContext, marquee: &Rect) -> bool;
}

/// Answers viewport culling tests for a bound element.
pub trait VisibilityTestable {
    fn is_visible(&self, ctx: &CanvasContext, clip: &Rect) -> bool;
}

/// Creates and incrementally updates visuals for a bound element.
pub trait VisualCreator {
    /// Builds a fresh visual, or `None` when there is nothing to draw.
    fn create_visual(&self, ctx: &mut dyn RenderContext) -> Option<Visual>;

    /// Updates `old` in place where possible. Implementations may return a
    /// different visual; the caller decides by identity whether anything
    /// changed.
    fn update_visual(&self, ctx: &mut dyn RenderContext, old: Option<Visual>) -> Option<Visual>;
}

/// Insets a node style demands between its border and its content area.
pub trait NodeInsetsProvider {
    fn insets(&self, node: &Rc<Node>) -> Insets;
}

/// The closed set of capabilities a renderer can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    Bounds,
    HitTest,
    Marquee,
    Visibility,
    VisualCreator,
    NodeInsets,
}

/// A borrowed capability handle resolved through a renderer's generic lookup.
pub enum Capability<'a> {
    Bounds(&'a dyn BoundsProvider),
    HitTest(&'a dyn HitTestable),
    Marquee(&'a dyn MarqueeTestable),
    Visibility(&'a dyn VisibilityTestable),
    VisualCreator(&'a dyn VisualCreator),
    NodeInsets(&'a dyn NodeInsetsProvider),
}

/// The renderer contract for label styles: the full surface the view host
/// drives label styling through.
///
/// Every entry point binds the supplied (label, style) pair first. A renderer
/// handed a style it does not recognize must degrade to the matching no-op
/// capability instead of failing.
pub trait LabelStyleRenderer {
    /// The size the bound style would like the label to have.
    fn preferred_size(&mut self, label: &Rc<Label>, style: &Rc<dyn LabelStyle>) -> Size;

    fn visual_creator(
        &mut self,
        label: &Rc<Label>,
        style: &Rc<dyn LabelStyle>,
    ) -> &dyn VisualCreator;

    fn bounds_provider(
        &mut self,
        label: &Rc<Label>,
        style: &Rc<dyn LabelStyle>,
    ) -> &dyn BoundsProvider {
        let _ = (label, style);
        &EMPTY_BOUNDS
    }

    fn hit_testable(&mut self, label: &Rc<Label>, style: &Rc<dyn LabelStyle>) -> &dyn HitTestable {
        let _ = (label, style);
        &NEVER_HIT
    }

    fn marquee_testable(
        &mut self,
        label: &Rc<Label>,
        style: &Rc<dyn LabelStyle>,
    ) -> &dyn MarqueeTestable {
        let _ = (label, style);
        &NEVER_IN_BOX
    }

    fn visibility_testable(
        &mut self,
        label: &Rc<Label>,
        style: &Rc<dyn LabelStyle>,
    ) -> &dyn VisibilityTestable {
        let _ = (label, style);
        &NEVER_VISIBLE
    }

    /// Generic capability lookup for a bound (label, style) pair. Renderers
    /// configure themselves only when they actually resolve a capability.
    fn lookup(
        &mut self,
        label: &Rc<Label>,
        style: &Rc<dyn LabelStyle>,
        kind: CapabilityKind,
    ) -> Option<Capability<'_>> {
        let _ = (label, style, kind);
        None
    }
}

/// The renderer surface this crate consumes from node styles: visual creation
/// plus the generic lookup used to discover an insets provider.
pub trait NodeStyleRenderer {
    fn visual_creator(&mut self, node: &Rc<Node>, style: &Rc<dyn NodeStyle>)
    -> &dyn VisualCreator;

    fn lookup(
        &mut self,
        node: &Rc<Node>,
        style: &Rc<dyn NodeStyle>,
        kind: CapabilityKind,
    ) -> Option<Capability<'_>> {
        let _ = (node, style, kind);
        None
    }
}

/// Bounds provider that reports an empty rectangle.
#[derive(Debug)]
pub struct EmptyBounds;

impl BoundsProvider for EmptyBounds {
    fn bounds(&self, _ctx: &CanvasContext) -> Rect {
        Rect::zero()
    }
}

/// Hit testable that never reports a hit.
#[derive(Debug)]
pub struct NeverHit;

impl HitTestable for NeverHit {
    fn is_hit(&self, _ctx: &InputContext, _location: Point) -> bool {
        false
    }
}

/// Marquee testable that never intersects.
#[derive(Debug)]
pub struct NeverInBox;

impl MarqueeTestable for NeverInBox {
    fn is_in_box(&self, _ctx: &InputContext, _marquee: &Rect) -> bool {
        false
    }
}

/// Visibility testable that is never visible.
#[derive(Debug)]
pub struct NeverVisible;

impl VisibilityTestable for NeverVisible {
    fn is_visible(&self, _ctx: &CanvasContext, _clip: &Rect) -> bool {
        false
    }
}

/// Visual creator that draws nothing.
#[derive(Debug)]
pub struct VoidVisualCreator;

impl VisualCreator for VoidVisualCreator {
    fn create_visual(&self, _ctx: &mut dyn RenderContext) -> Option<Visual> {
        None
    }

    fn update_visual(&self, _ctx: &mut dyn RenderContext, _old: Option<Visual>) -> Option<Visual> {
        None
    }
}

pub static EMPTY_BOUNDS: EmptyBounds = EmptyBounds;
pub static NEVER_HIT: NeverHit = NeverHit;
pub static NEVER_IN_BOX: NeverInBox = NeverInBox;
pub static NEVER_VISIBLE: NeverVisible = NeverVisible;
pub static VOID_VISUAL_CREATOR: VoidVisualCreator = VoidVisualCreator;
