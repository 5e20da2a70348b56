//! The visual-tree contract between styles and the view host.
//!
//! Style renderers produce [`Visual`]s; the host retains them across frames
//! and hands them back for incremental updates. Recreate-vs-update decisions
//! are made by identity ([`Visual::same`]), never by structural equality.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::geom::{Point, Transform};

/// A leaf drawing payload. The host decides how to rasterize it; this crate
/// only moves it through the visual tree.
pub trait Drawable: fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

/// A node of the visual tree.
///
/// `Empty` is the designated placeholder for a delegate that declined to
/// produce output; checking for it is a variant match, not an identity
/// comparison against a global sentinel.
#[derive(Clone)]
pub enum Visual {
    Empty,
    Leaf(Rc<dyn Drawable>),
    Group(Rc<VisualGroup>),
}

impl Visual {
    pub fn is_empty(&self) -> bool {
        matches!(self, Visual::Empty)
    }

    /// Identity comparison. Two `Empty` visuals are identical; leaves and
    /// groups are identical only when they share the same allocation.
    pub fn same(&self, other: &Visual) -> bool {
        match (self, other) {
            (Visual::Empty, Visual::Empty) => true,
            (Visual::Leaf(a), Visual::Leaf(b)) => Rc::ptr_eq(a, b),
            (Visual::Group(a), Visual::Group(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Visual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visual::Empty => f.write_str("Visual::Empty"),
            Visual::Leaf(d) => write!(f, "Visual::Leaf({d:?})"),
            Visual::Group(g) => write!(f, "Visual::Group(len={})", g.len()),
        }
    }
}

/// An ordered container of visuals sharing one placement transform.
///
/// Groups are shared with the host via `Rc` while renderers keep mutating
/// them in place on updates, hence the interior mutability. The render-data
/// cache slot carries whatever record the producing renderer wants to find
/// again on the next update of the same visual.
pub struct VisualGroup {
    children: RefCell<Vec<Visual>>,
    transform: Cell<Transform>,
    cache: RefCell<Option<Rc<dyn Any>>>,
}

impl VisualGroup {
    pub fn new() -> Self {
        Self {
            children: RefCell::new(Vec::new()),
            transform: Cell::new(Transform::identity()),
            cache: RefCell::new(None),
        }
    }

    pub fn len(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&self, child: Visual) {
        self.children.borrow_mut().push(child);
    }

    pub fn child(&self, index: usize) -> Option<Visual> {
        self.children.borrow().get(index).cloned()
    }

    pub fn set_child(&self, index: usize, child: Visual) {
        self.children.borrow_mut()[index] = child;
    }

    pub fn transform(&self) -> Transform {
        self.transform.get()
    }

    pub fn set_transform(&self, transform: Transform) {
        self.transform.set(transform);
    }

    pub fn set_render_cache(&self, cache: Rc<dyn Any>) {
        *self.cache.borrow_mut() = Some(cache);
    }

    pub fn render_cache<T: Any>(&self) -> Option<Rc<T>> {
        let cache = self.cache.borrow().clone()?;
        cache.downcast::<T>().ok()
    }

    /// Forwards disposal of every child to the context. Registered by the
    /// producing renderer via [`RenderContext::register_children_for_disposal`]
    /// and invoked by the host when the group leaves the visual tree.
    pub fn dispose_children(&self, ctx: &mut dyn RenderContext) {
        for child in self.children.borrow().iter() {
            ctx.child_visual_removed(child);
        }
    }
}

impl Default for VisualGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VisualGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisualGroup")
            .field("children", &*self.children.borrow())
            .finish_non_exhaustive()
    }
}

/// Viewport state for bounds and visibility queries.
#[derive(Debug, Clone, Copy)]
pub struct CanvasContext {
    pub zoom: f64,
}

impl Default for CanvasContext {
    fn default() -> Self {
        Self { zoom: 1.0 }
    }
}

/// Input state for hit and marquee tests.
#[derive(Debug, Clone, Copy)]
pub struct InputContext {
    pub hit_test_radius: f64,
}

impl InputContext {
    pub fn with_radius(hit_test_radius: f64) -> Self {
        Self { hit_test_radius }
    }
}

impl Default for InputContext {
    fn default() -> Self {
        Self {
            hit_test_radius: 2.0,
        }
    }
}

/// Host hooks invoked while visuals are created, replaced and discarded.
pub trait RenderContext {
    /// Signals that `visual` is no longer part of the visual tree.
    fn child_visual_removed(&mut self, visual: &Visual);

    /// Asks the host to call [`VisualGroup::dispose_children`] when `group`
    /// itself is removed.
    fn register_children_for_disposal(&mut self, group: &Rc<VisualGroup>);
}

/// A context for hosts that do not track visual lifecycles.
#[derive(Debug, Default)]
pub struct DetachedRenderContext;

impl RenderContext for DetachedRenderContext {
    fn child_visual_removed(&mut self, _visual: &Visual) {}

    fn register_children_for_disposal(&mut self, _group: &Rc<VisualGroup>) {}
}

/// Convenience for hosts translating pointer positions through a group's
/// placement transform.
pub fn to_local(transform: &Transform, p: Point) -> Option<Point> {
    transform.inverse().map(|inv| inv.transform_point(p))
}
