//! The composite renderer: binds a (label, style) pair, derives the content
//! rectangle from the label's outer layout minus the effective insets, and
//! delegates every capability to the two wrapped styles applied to proxy
//! entities.
//!
//! One renderer instance is shared by all clones of a
//! [`CompositeLabelStyle`]; it is rebound on every entry point and must not
//! be invoked reentrantly.

use std::cell::RefCell;
use std::rc::Rc;

use crate::adapter::CompositeLabelStyle;
use crate::entities::{Label, Node};
use crate::geom::{Insets, OrientedRect, Point, Rect, Size, layout_transform, rect, size};
use crate::style::{
    BoundsProvider, Capability, CapabilityKind, EMPTY_BOUNDS, HitTestable, LabelStyle,
    LabelStyleRenderer, MarqueeTestable, NEVER_HIT, NEVER_IN_BOX, NEVER_VISIBLE, NodeStyle,
    VOID_VISUAL_CREATOR, VisibilityTestable, VisualCreator,
};
use crate::visual::{CanvasContext, InputContext, RenderContext, Visual, VisualGroup};

/// Tolerance for viewport culling, independent of hit-test radius.
const VISIBILITY_EPS: f64 = 2.0;

/// The adapter configuration captured at bind time.
#[derive(Clone)]
pub(crate) struct StyleSnapshot {
    pub(crate) background: Rc<dyn NodeStyle>,
    pub(crate) foreground: Rc<dyn LabelStyle>,
    pub(crate) insets: Insets,
    pub(crate) auto_flip: bool,
}

/// Cache record attached to a composite visual group. Owned by that visual
/// and mutated again on its next update; the style references decide
/// recreate-vs-update by identity.
struct CacheRecord {
    node: Rc<Node>,
    label: Rc<Label>,
    background: RefCell<Rc<dyn NodeStyle>>,
    foreground: RefCell<Rc<dyn LabelStyle>>,
}

/// Renderer companion of [`CompositeLabelStyle`].
pub struct CompositeLabelStyleRenderer {
    label: Option<Rc<Label>>,
    bound: Option<StyleSnapshot>,
    /// Outer oriented layout of the bound label.
    layout: OrientedRect,
    /// Content rectangle in the outer rectangle's local coordinates.
    content: OrientedRect,
    effective_insets: Insets,
    /// Long-lived proxy reshaped on every configuration.
    proxy_node: Rc<Node>,
    proxy_label: Rc<Label>,
}

impl CompositeLabelStyleRenderer {
    pub(crate) fn new() -> Self {
        Self {
            label: None,
            bound: None,
            layout: OrientedRect::new(0.0, 0.0, 0.0, 0.0),
            content: OrientedRect::new(0.0, 0.0, 0.0, 0.0),
            effective_insets: Insets::default(),
            proxy_node: Rc::new(Node::new(Rect::zero())),
            proxy_label: Rc::new(Label::new(OrientedRect::new(0.0, 0.0, 0.0, 0.0), "")),
        }
    }

    fn bind(&mut self, label: &Rc<Label>, style: &CompositeLabelStyle) {
        self.label = Some(label.clone());
        self.bound = Some(style.snapshot());
    }

    /// Derives the configured state from the bound (label, style) pair: the
    /// proxy node mirrors the outer layout at the origin, the effective
    /// insets combine configured and background-required insets, and the
    /// proxy label carries the content rectangle plus the label's text and
    /// tag.
    fn configure(&mut self) {
        let (Some(label), Some(bound)) = (self.label.clone(), self.bound.clone()) else {
            return;
        };
        let layout = label.layout();

        self.proxy_node.set_style(bound.background.clone());
        self.proxy_node
            .set_layout(rect(0.0, 0.0, layout.width, layout.height));

        let insets = effective_insets(&self.proxy_node, &bound);
        let content = OrientedRect::new(
            insets.left,
            layout.height - insets.bottom,
            layout.width - insets.horizontal(),
            layout.height - insets.vertical(),
        );

        self.proxy_label.set_style(bound.foreground.clone());
        self.proxy_label.set_text(label.text());
        self.proxy_label.set_tag(label.tag());
        self.proxy_label.set_layout(content);

        self.layout = layout;
        self.content = content;
        self.effective_insets = insets;
    }
}

fn as_composite(style: &Rc<dyn LabelStyle>) -> Option<&CompositeLabelStyle> {
    style.as_any().downcast_ref::<CompositeLabelStyle>()
}

/// The configured insets' per-side maximum with whatever the background style
/// demands for the proxy node, or the configured insets alone when the
/// background offers no insets provider.
fn effective_insets(proxy_node: &Rc<Node>, bound: &StyleSnapshot) -> Insets {
    let renderer = bound.background.renderer();
    let mut renderer = renderer.borrow_mut();
    match renderer.lookup(proxy_node, &bound.background, CapabilityKind::NodeInsets) {
        Some(Capability::NodeInsets(provider)) => {
            provider.insets(proxy_node).union(&bound.insets)
        }
        _ => bound.insets,
    }
}

impl LabelStyleRenderer for CompositeLabelStyleRenderer {
    fn preferred_size(&mut self, label: &Rc<Label>, style: &Rc<dyn LabelStyle>) -> Size {
        let Some(composite) = as_composite(style) else {
            return Size::zero();
        };
        self.bind(label, composite);
        self.configure();
        let Some(bound) = self.bound.clone() else {
            return Size::zero();
        };
        let foreground = bound.foreground.clone();
        let renderer = foreground.renderer();
        let base = renderer.borrow_mut().preferred_size(label, &foreground);
        let insets = self.effective_insets;
        size(
            base.width + insets.horizontal(),
            base.height + insets.vertical(),
        )
    }

    fn visual_creator(
        &mut self,
        label: &Rc<Label>,
        style: &Rc<dyn LabelStyle>,
    ) -> &dyn VisualCreator {
        match as_composite(style) {
            Some(composite) => {
                self.bind(label, composite);
                self.configure();
                &*self
            }
            None => &VOID_VISUAL_CREATOR,
        }
    }

    fn bounds_provider(
        &mut self,
        label: &Rc<Label>,
        style: &Rc<dyn LabelStyle>,
    ) -> &dyn BoundsProvider {
        match as_composite(style) {
            Some(composite) => {
                self.bind(label, composite);
                self.configure();
                &*self
            }
            None => &EMPTY_BOUNDS,
        }
    }

    fn hit_testable(&mut self, label: &Rc<Label>, style: &Rc<dyn LabelStyle>) -> &dyn HitTestable {
        match as_composite(style) {
            Some(composite) => {
                self.bind(label, composite);
                self.configure();
                &*self
            }
            None => &NEVER_HIT,
        }
    }

    fn marquee_testable(
        &mut self,
        label: &Rc<Label>,
        style: &Rc<dyn LabelStyle>,
    ) -> &dyn MarqueeTestable {
        match as_composite(style) {
            Some(composite) => {
                self.bind(label, composite);
                self.configure();
                &*self
            }
            None => &NEVER_IN_BOX,
        }
    }

    /// Binds without configuring: visibility answers from the label's raw
    /// layout and runs on every viewport-culling pass.
    fn visibility_testable(
        &mut self,
        label: &Rc<Label>,
        style: &Rc<dyn LabelStyle>,
    ) -> &dyn VisibilityTestable {
        match as_composite(style) {
            Some(composite) => {
                self.bind(label, composite);
                &*self
            }
            None => &NEVER_VISIBLE,
        }
    }

    /// Binds without configuring; configures only when a capability is
    /// actually resolved.
    fn lookup(
        &mut self,
        label: &Rc<Label>,
        style: &Rc<dyn LabelStyle>,
        kind: CapabilityKind,
    ) -> Option<Capability<'_>> {
        let composite = as_composite(style)?;
        self.bind(label, composite);
        match kind {
            CapabilityKind::NodeInsets => None,
            CapabilityKind::Bounds => {
                self.configure();
                Some(Capability::Bounds(&*self))
            }
            CapabilityKind::HitTest => {
                self.configure();
                Some(Capability::HitTest(&*self))
            }
            CapabilityKind::Marquee => {
                self.configure();
                Some(Capability::Marquee(&*self))
            }
            CapabilityKind::Visibility => {
                self.configure();
                Some(Capability::Visibility(&*self))
            }
            CapabilityKind::VisualCreator => {
                self.configure();
                Some(Capability::VisualCreator(&*self))
            }
        }
    }
}

impl BoundsProvider for CompositeLabelStyleRenderer {
    fn bounds(&self, _ctx: &CanvasContext) -> Rect {
        self.layout.bounds()
    }
}

impl HitTestable for CompositeLabelStyleRenderer {
    fn is_hit(&self, ctx: &InputContext, location: Point) -> bool {
        self.layout.contains(location, ctx.hit_test_radius)
    }
}

impl MarqueeTestable for CompositeLabelStyleRenderer {
    fn is_in_box(&self, ctx: &InputContext, marquee: &Rect) -> bool {
        self.layout.intersects(marquee, ctx.hit_test_radius)
    }
}

impl VisibilityTestable for CompositeLabelStyleRenderer {
    fn is_visible(&self, _ctx: &CanvasContext, clip: &Rect) -> bool {
        match &self.label {
            Some(label) => label.layout().intersects(clip, VISIBILITY_EPS),
            None => false,
        }
    }
}

impl VisualCreator for CompositeLabelStyleRenderer {
    fn create_visual(&self, ctx: &mut dyn RenderContext) -> Option<Visual> {
        let (Some(label), Some(bound)) = (self.label.as_ref(), self.bound.as_ref()) else {
            return None;
        };
        let w = self.layout.width;
        let h = self.layout.height;
        if w < 0.0 || h < 0.0 {
            return None;
        }

        let background_style = bound.background.clone();
        let foreground_style = bound.foreground.clone();
        let group = Rc::new(VisualGroup::new());

        // Fresh proxies: the cached ones belong to this visual from now on,
        // while the renderer's long-lived proxies keep serving other labels.
        let node = Rc::new(Node::new(rect(0.0, 0.0, w, h)));
        node.set_style(background_style.clone());
        let background = {
            let renderer = background_style.renderer();
            let mut renderer = renderer.borrow_mut();
            renderer
                .visual_creator(&node, &background_style)
                .create_visual(ctx)
        }
        .unwrap_or(Visual::Empty);
        group.push(background);

        let proxy = Rc::new(Label::new(self.content, label.text()));
        proxy.set_tag(label.tag());
        proxy.set_style(foreground_style.clone());
        let foreground = {
            let renderer = foreground_style.renderer();
            let mut renderer = renderer.borrow_mut();
            renderer
                .visual_creator(&proxy, &foreground_style)
                .create_visual(ctx)
        }
        .unwrap_or(Visual::Empty);
        group.push(foreground);

        group.set_transform(layout_transform(&self.layout, bound.auto_flip));
        group.set_render_cache(Rc::new(CacheRecord {
            node,
            label: proxy,
            background: RefCell::new(background_style),
            foreground: RefCell::new(foreground_style),
        }));
        ctx.register_children_for_disposal(&group);
        Some(Visual::Group(group))
    }

    fn update_visual(&self, ctx: &mut dyn RenderContext, old: Option<Visual>) -> Option<Visual> {
        let (Some(label), Some(bound)) = (self.label.as_ref(), self.bound.as_ref()) else {
            return None;
        };
        let w = self.layout.width;
        let h = self.layout.height;
        if w < 0.0 || h < 0.0 {
            if let Some(old) = &old {
                ctx.child_visual_removed(old);
            }
            return None;
        }

        let group = match &old {
            Some(Visual::Group(group)) => Some(group.clone()),
            _ => None,
        };
        let cache = group.as_ref().and_then(|g| g.render_cache::<CacheRecord>());
        let (Some(group), Some(cache)) = (group, cache) else {
            if let Some(old) = &old {
                ctx.child_visual_removed(old);
            }
            return self.create_visual(ctx);
        };
        if group.len() != 2 {
            if let Some(old) = &old {
                ctx.child_visual_removed(old);
            }
            return self.create_visual(ctx);
        }

        let background_style = bound.background.clone();
        let foreground_style = bound.foreground.clone();

        cache.node.set_style(background_style.clone());
        cache.node.set_layout(rect(0.0, 0.0, w, h));

        let old_background = group.child(0).unwrap_or(Visual::Empty);
        let cached_background = cache.background.borrow().clone();
        let recreate_background =
            old_background.is_empty() || !Rc::ptr_eq(&cached_background, &background_style);
        let new_background = {
            let renderer = background_style.renderer();
            let mut renderer = renderer.borrow_mut();
            let creator = renderer.visual_creator(&cache.node, &background_style);
            if recreate_background {
                creator.create_visual(ctx)
            } else {
                creator.update_visual(ctx, Some(old_background.clone()))
            }
        }
        .unwrap_or(Visual::Empty);
        if recreate_background {
            *cache.background.borrow_mut() = background_style;
        }
        if !new_background.same(&old_background) {
            group.set_child(0, new_background.clone());
            ctx.child_visual_removed(&old_background);
        }

        cache.label.set_layout(self.content);
        cache.label.set_text(label.text());
        cache.label.set_tag(label.tag());
        cache.label.set_style(foreground_style.clone());

        let old_foreground = group.child(1).unwrap_or(Visual::Empty);
        let cached_foreground = cache.foreground.borrow().clone();
        // A recreated or empty background forces the foreground to be
        // rebuilt as well, keeping the two children in lockstep.
        let recreate_foreground = recreate_background
            || new_background.is_empty()
            || !Rc::ptr_eq(&cached_foreground, &foreground_style);
        let new_foreground = {
            let renderer = foreground_style.renderer();
            let mut renderer = renderer.borrow_mut();
            let creator = renderer.visual_creator(&cache.label, &foreground_style);
            if recreate_foreground {
                creator.create_visual(ctx)
            } else {
                creator.update_visual(ctx, Some(old_foreground.clone()))
            }
        }
        .unwrap_or(Visual::Empty);
        if recreate_foreground {
            *cache.foreground.borrow_mut() = foreground_style;
        }
        if !new_foreground.same(&old_foreground) {
            group.set_child(1, new_foreground.clone());
            ctx.child_visual_removed(&old_foreground);
        }

        group.set_transform(layout_transform(&self.layout, bound.auto_flip));
        ctx.register_children_for_disposal(&group);
        Some(Visual::Group(group))
    }
}
