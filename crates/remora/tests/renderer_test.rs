use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use remora::CompositeLabelStyle;
use remora::entities::{Label, Node};
use remora::geom::{Insets, OrientedRect, Rect, Size, point, rect, size, vector};
use remora::style::{
    Capability, CapabilityKind, LabelStyle, LabelStyleRenderer, NodeInsetsProvider, NodeStyle,
    NodeStyleRenderer, VisualCreator,
};
use remora::text::TextLabelStyle;
use remora::visual::{
    CanvasContext, Drawable, InputContext, RenderContext, Visual, VisualGroup,
};

#[derive(Debug)]
struct StubVisual;

impl Drawable for StubVisual {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Default)]
struct Counters {
    created: Cell<usize>,
    updated: Cell<usize>,
    lookups: Cell<usize>,
}

struct StubNodeStyle {
    renderer: Rc<RefCell<StubNodeRenderer>>,
}

struct StubNodeRenderer {
    node: Option<Rc<Node>>,
    insets: Option<Insets>,
    decline: bool,
    counters: Rc<Counters>,
}

fn stub_node_style(insets: Option<Insets>, decline: bool) -> (Rc<dyn NodeStyle>, Rc<Counters>) {
    let counters = Rc::new(Counters::default());
    let renderer = Rc::new(RefCell::new(StubNodeRenderer {
        node: None,
        insets,
        decline,
        counters: counters.clone(),
    }));
    (Rc::new(StubNodeStyle { renderer }), counters)
}

impl NodeStyle for StubNodeStyle {
    fn renderer(&self) -> Rc<RefCell<dyn NodeStyleRenderer>> {
        self.renderer.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl NodeStyleRenderer for StubNodeRenderer {
    fn visual_creator(
        &mut self,
        node: &Rc<Node>,
        _style: &Rc<dyn NodeStyle>,
    ) -> &dyn VisualCreator {
        self.node = Some(node.clone());
        &*self
    }

    fn lookup(
        &mut self,
        node: &Rc<Node>,
        _style: &Rc<dyn NodeStyle>,
        kind: CapabilityKind,
    ) -> Option<Capability<'_>> {
        self.node = Some(node.clone());
        self.counters.lookups.set(self.counters.lookups.get() + 1);
        match kind {
            CapabilityKind::NodeInsets if self.insets.is_some() => {
                Some(Capability::NodeInsets(&*self))
            }
            _ => None,
        }
    }
}

impl NodeInsetsProvider for StubNodeRenderer {
    fn insets(&self, _node: &Rc<Node>) -> Insets {
        self.insets.unwrap_or_default()
    }
}

impl VisualCreator for StubNodeRenderer {
    fn create_visual(&self, _ctx: &mut dyn RenderContext) -> Option<Visual> {
        self.counters.created.set(self.counters.created.get() + 1);
        if self.decline {
            return None;
        }
        Some(Visual::Leaf(Rc::new(StubVisual)))
    }

    fn update_visual(&self, _ctx: &mut dyn RenderContext, old: Option<Visual>) -> Option<Visual> {
        self.counters.updated.set(self.counters.updated.get() + 1);
        old
    }
}

struct StubLabelStyle {
    renderer: Rc<RefCell<StubLabelRenderer>>,
}

struct StubLabelRenderer {
    label: Option<Rc<Label>>,
    preferred: Size,
    counters: Rc<Counters>,
    seen_layout: Rc<Cell<Option<OrientedRect>>>,
    seen_text: Rc<RefCell<Option<String>>>,
}

struct LabelStubHandles {
    counters: Rc<Counters>,
    seen_layout: Rc<Cell<Option<OrientedRect>>>,
    seen_text: Rc<RefCell<Option<String>>>,
}

fn stub_label_style(preferred: Size) -> (Rc<dyn LabelStyle>, LabelStubHandles) {
    let handles = LabelStubHandles {
        counters: Rc::new(Counters::default()),
        seen_layout: Rc::new(Cell::new(None)),
        seen_text: Rc::new(RefCell::new(None)),
    };
    let renderer = Rc::new(RefCell::new(StubLabelRenderer {
        label: None,
        preferred,
        counters: handles.counters.clone(),
        seen_layout: handles.seen_layout.clone(),
        seen_text: handles.seen_text.clone(),
    }));
    (Rc::new(StubLabelStyle { renderer }), handles)
}

impl LabelStyle for StubLabelStyle {
    fn renderer(&self) -> Rc<RefCell<dyn LabelStyleRenderer>> {
        self.renderer.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl LabelStyleRenderer for StubLabelRenderer {
    fn preferred_size(&mut self, _label: &Rc<Label>, _style: &Rc<dyn LabelStyle>) -> Size {
        self.preferred
    }

    fn visual_creator(
        &mut self,
        label: &Rc<Label>,
        _style: &Rc<dyn LabelStyle>,
    ) -> &dyn VisualCreator {
        self.label = Some(label.clone());
        &*self
    }
}

impl VisualCreator for StubLabelRenderer {
    fn create_visual(&self, _ctx: &mut dyn RenderContext) -> Option<Visual> {
        self.counters.created.set(self.counters.created.get() + 1);
        if let Some(label) = &self.label {
            self.seen_layout.set(Some(label.layout()));
            *self.seen_text.borrow_mut() = Some(label.text());
        }
        Some(Visual::Leaf(Rc::new(StubVisual)))
    }

    fn update_visual(&self, _ctx: &mut dyn RenderContext, old: Option<Visual>) -> Option<Visual> {
        self.counters.updated.set(self.counters.updated.get() + 1);
        if let Some(label) = &self.label {
            self.seen_layout.set(Some(label.layout()));
            *self.seen_text.borrow_mut() = Some(label.text());
        }
        old
    }
}

#[derive(Default)]
struct RecordingContext {
    removed: Vec<Visual>,
    registered: Vec<Rc<VisualGroup>>,
}

impl RenderContext for RecordingContext {
    fn child_visual_removed(&mut self, visual: &Visual) {
        self.removed.push(visual.clone());
    }

    fn register_children_for_disposal(&mut self, group: &Rc<VisualGroup>) {
        self.registered.push(group.clone());
    }
}

fn composite(
    background: Rc<dyn NodeStyle>,
    foreground: Rc<dyn LabelStyle>,
    insets: Insets,
) -> Rc<dyn LabelStyle> {
    let mut style = CompositeLabelStyle::new(background, foreground);
    style.set_insets(insets);
    Rc::new(style)
}

fn expect_group(visual: &Visual) -> Rc<VisualGroup> {
    match visual {
        Visual::Group(group) => group.clone(),
        other => panic!("expected a group visual, got {other:?}"),
    }
}

#[test]
fn unrecognized_style_degrades_to_noop_capabilities() {
    let composite = CompositeLabelStyle::default();
    let renderer = LabelStyle::renderer(&composite);
    let plain: Rc<dyn LabelStyle> = Rc::new(TextLabelStyle::default());
    let label = Rc::new(Label::new(OrientedRect::new(0.0, 10.0, 20.0, 10.0), "x"));
    let mut renderer = renderer.borrow_mut();
    let mut ctx = RecordingContext::default();

    assert!(
        !renderer
            .hit_testable(&label, &plain)
            .is_hit(&InputContext::default(), point(5.0, 5.0))
    );
    assert_eq!(
        renderer
            .bounds_provider(&label, &plain)
            .bounds(&CanvasContext::default()),
        Rect::zero()
    );
    assert!(
        !renderer
            .visibility_testable(&label, &plain)
            .is_visible(&CanvasContext::default(), &rect(0.0, 0.0, 100.0, 100.0))
    );
    assert!(
        renderer
            .visual_creator(&label, &plain)
            .create_visual(&mut ctx)
            .is_none()
    );
    assert_eq!(renderer.preferred_size(&label, &plain), Size::zero());
    assert!(
        renderer
            .lookup(&label, &plain, CapabilityKind::Bounds)
            .is_none()
    );
}

#[test]
fn preferred_size_adds_unioned_insets_to_foreground_size() {
    let (foreground, _) = stub_label_style(size(40.0, 10.0));

    // Background demands (top 1, right 2, bottom 1, left 2); configured
    // insets are zero, so the background's demand wins outright.
    let (background, _) = stub_node_style(Some(Insets::new(1.0, 2.0, 1.0, 2.0)), false);
    let style = composite(background, foreground.clone(), Insets::default());
    let label = Rc::new(Label::new(OrientedRect::new(0.0, 50.0, 100.0, 50.0), "x"));
    let got = style.renderer().borrow_mut().preferred_size(&label, &style);
    assert_eq!(got, size(44.0, 12.0));

    // Configured insets union per side with the background's demand.
    let (background, _) = stub_node_style(Some(Insets::new(1.0, 2.0, 1.0, 2.0)), false);
    let style = composite(background, foreground, Insets::uniform(3.0));
    let got = style.renderer().borrow_mut().preferred_size(&label, &style);
    assert_eq!(got, size(46.0, 16.0));
}

#[test]
fn preferred_size_of_degenerate_label_is_foreground_plus_insets() {
    let (foreground, _) = stub_label_style(size(40.0, 10.0));
    let (background, _) = stub_node_style(None, false);
    let style = composite(background, foreground, Insets::new(1.0, 2.0, 1.0, 2.0));
    let label = Rc::new(Label::new(OrientedRect::new(0.0, 0.0, 0.0, 0.0), ""));
    let got = style.renderer().borrow_mut().preferred_size(&label, &style);
    assert_eq!(got, size(44.0, 12.0));
}

#[test]
fn content_rectangle_is_outer_layout_minus_insets() {
    let (foreground, handles) = stub_label_style(size(10.0, 10.0));
    let (background, _) = stub_node_style(None, false);
    let style = composite(
        background,
        foreground,
        Insets::new(1.0, 2.0, 1.0, 2.0),
    );
    let label = Rc::new(Label::new(
        OrientedRect::new(10.0, 60.0, 100.0, 50.0),
        "body",
    ));
    let mut ctx = RecordingContext::default();

    let renderer = style.renderer();
    let visual = renderer
        .borrow_mut()
        .visual_creator(&label, &style)
        .create_visual(&mut ctx)
        .unwrap();
    expect_group(&visual);

    let seen = handles.seen_layout.get().unwrap();
    assert_eq!(seen.anchor, point(2.0, 49.0));
    assert_eq!(seen.width, 96.0);
    assert_eq!(seen.height, 48.0);
    assert_eq!(seen.up(), vector(0.0, -1.0));
    assert_eq!(handles.seen_text.borrow().as_deref(), Some("body"));
}

#[test]
fn create_visual_groups_background_then_foreground() {
    let (foreground, fg) = stub_label_style(size(10.0, 10.0));
    let (background, bg) = stub_node_style(None, false);
    let style = composite(background, foreground, Insets::default());
    let label = Rc::new(Label::new(OrientedRect::new(10.0, 60.0, 100.0, 50.0), "x"));
    let mut ctx = RecordingContext::default();

    let renderer = style.renderer();
    let visual = renderer
        .borrow_mut()
        .visual_creator(&label, &style)
        .create_visual(&mut ctx)
        .unwrap();
    let group = expect_group(&visual);

    assert_eq!(group.len(), 2);
    assert!(matches!(group.child(0), Some(Visual::Leaf(_))));
    assert!(matches!(group.child(1), Some(Visual::Leaf(_))));
    assert_eq!(bg.created.get(), 1);
    assert_eq!(fg.counters.created.get(), 1);

    // Placement transform: local (0,0) lands on the layout's top-left corner.
    let t = group.transform();
    assert_eq!(
        (t.m11, t.m12, t.m21, t.m22, t.m31, t.m32),
        (1.0, 0.0, 0.0, 1.0, 10.0, 10.0)
    );

    // The group registered itself for child disposal.
    assert_eq!(ctx.registered.len(), 1);
    assert!(Rc::ptr_eq(&ctx.registered[0], &group));
}

#[test]
fn degenerate_layout_produces_no_visual_and_discards_old_one() {
    let (foreground, _) = stub_label_style(size(10.0, 10.0));
    let (background, _) = stub_node_style(None, false);
    let style = composite(background, foreground, Insets::default());
    let mut ctx = RecordingContext::default();

    let good = Rc::new(Label::new(OrientedRect::new(0.0, 50.0, 100.0, 50.0), "x"));
    let renderer = style.renderer();
    let visual = renderer
        .borrow_mut()
        .visual_creator(&good, &style)
        .create_visual(&mut ctx)
        .unwrap();

    let bad = Rc::new(Label::new(OrientedRect::new(0.0, 50.0, -1.0, 50.0), "x"));
    assert!(
        renderer
            .borrow_mut()
            .visual_creator(&bad, &style)
            .create_visual(&mut ctx)
            .is_none()
    );

    let updated = renderer
        .borrow_mut()
        .visual_creator(&bad, &style)
        .update_visual(&mut ctx, Some(visual.clone()));
    assert!(updated.is_none());
    assert!(ctx.removed.iter().any(|v| v.same(&visual)));
}

#[test]
fn update_with_unchanged_styles_keeps_child_identity() {
    let (foreground, fg) = stub_label_style(size(10.0, 10.0));
    let (background, bg) = stub_node_style(None, false);
    let style = composite(background, foreground, Insets::default());
    let label = Rc::new(Label::new(OrientedRect::new(0.0, 50.0, 100.0, 50.0), "x"));
    let mut ctx = RecordingContext::default();

    let renderer = style.renderer();
    let visual = renderer
        .borrow_mut()
        .visual_creator(&label, &style)
        .create_visual(&mut ctx)
        .unwrap();
    let group = expect_group(&visual);
    let child0 = group.child(0).unwrap();
    let child1 = group.child(1).unwrap();

    let updated = renderer
        .borrow_mut()
        .visual_creator(&label, &style)
        .update_visual(&mut ctx, Some(visual.clone()))
        .unwrap();
    assert!(updated.same(&visual));
    assert!(group.child(0).unwrap().same(&child0));
    assert!(group.child(1).unwrap().same(&child1));
    assert_eq!(bg.created.get(), 1);
    assert_eq!(bg.updated.get(), 1);
    assert_eq!(fg.counters.created.get(), 1);
    assert_eq!(fg.counters.updated.get(), 1);
    assert!(ctx.removed.is_empty());
}

#[test]
fn swapping_background_style_recreates_both_children() {
    let (foreground, fg) = stub_label_style(size(10.0, 10.0));
    let (background1, bg1) = stub_node_style(None, false);
    let (background2, bg2) = stub_node_style(None, false);

    let mut adapter = CompositeLabelStyle::new(background1, foreground);
    let style1: Rc<dyn LabelStyle> = Rc::new(adapter.clone());
    let label = Rc::new(Label::new(OrientedRect::new(0.0, 50.0, 100.0, 50.0), "x"));
    let mut ctx = RecordingContext::default();

    let renderer = style1.renderer();
    let visual = renderer
        .borrow_mut()
        .visual_creator(&label, &style1)
        .create_visual(&mut ctx)
        .unwrap();
    let group = expect_group(&visual);
    let child0 = group.child(0).unwrap();
    let child1 = group.child(1).unwrap();

    adapter.set_background(background2);
    let style2: Rc<dyn LabelStyle> = Rc::new(adapter);
    let updated = renderer
        .borrow_mut()
        .visual_creator(&label, &style2)
        .update_visual(&mut ctx, Some(visual.clone()))
        .unwrap();
    assert!(updated.same(&visual));

    // Background recreated with the new style, not updated.
    assert!(!group.child(0).unwrap().same(&child0));
    assert_eq!(bg1.created.get(), 1);
    assert_eq!(bg1.updated.get(), 0);
    assert_eq!(bg2.created.get(), 1);
    assert_eq!(bg2.updated.get(), 0);

    // Foreground recreated too, although its style did not change.
    assert!(!group.child(1).unwrap().same(&child1));
    assert_eq!(fg.counters.created.get(), 2);
    assert_eq!(fg.counters.updated.get(), 0);

    // Both replaced children were reported as removed.
    assert!(ctx.removed.iter().any(|v| v.same(&child0)));
    assert!(ctx.removed.iter().any(|v| v.same(&child1)));

    // A further update with the now-cached styles degrades to in-place
    // updates again.
    let child0 = group.child(0).unwrap();
    let renderer2 = style2.renderer();
    renderer2
        .borrow_mut()
        .visual_creator(&label, &style2)
        .update_visual(&mut ctx, Some(updated))
        .unwrap();
    assert!(group.child(0).unwrap().same(&child0));
    assert_eq!(bg2.updated.get(), 1);
    assert_eq!(fg.counters.updated.get(), 1);
}

#[test]
fn declining_background_is_substituted_with_empty_visual() {
    let (foreground, fg) = stub_label_style(size(10.0, 10.0));
    let (background, bg) = stub_node_style(None, true);
    let style = composite(background, foreground, Insets::default());
    let label = Rc::new(Label::new(OrientedRect::new(0.0, 50.0, 100.0, 50.0), "x"));
    let mut ctx = RecordingContext::default();

    let renderer = style.renderer();
    let visual = renderer
        .borrow_mut()
        .visual_creator(&label, &style)
        .create_visual(&mut ctx)
        .unwrap();
    let group = expect_group(&visual);
    assert!(group.child(0).unwrap().is_empty());
    assert!(matches!(group.child(1), Some(Visual::Leaf(_))));

    // An empty background forces the foreground to be recreated on update.
    renderer
        .borrow_mut()
        .visual_creator(&label, &style)
        .update_visual(&mut ctx, Some(visual))
        .unwrap();
    assert!(group.child(0).unwrap().is_empty());
    assert_eq!(bg.created.get(), 2);
    assert_eq!(bg.updated.get(), 0);
    assert_eq!(fg.counters.created.get(), 2);
    assert_eq!(fg.counters.updated.get(), 0);
}

#[test]
fn update_of_foreign_visual_falls_back_to_creation() {
    let (foreground, _) = stub_label_style(size(10.0, 10.0));
    let (background, bg) = stub_node_style(None, false);
    let style = composite(background, foreground, Insets::default());
    let label = Rc::new(Label::new(OrientedRect::new(0.0, 50.0, 100.0, 50.0), "x"));
    let mut ctx = RecordingContext::default();

    let stray = Visual::Leaf(Rc::new(StubVisual));
    let renderer = style.renderer();
    let visual = renderer
        .borrow_mut()
        .visual_creator(&label, &style)
        .update_visual(&mut ctx, Some(stray.clone()))
        .unwrap();
    expect_group(&visual);
    assert_eq!(bg.created.get(), 1);
    assert!(ctx.removed.iter().any(|v| v.same(&stray)));
}

#[test]
fn hit_bounds_and_marquee_use_the_outer_layout() {
    let (foreground, _) = stub_label_style(size(10.0, 10.0));
    let (background, _) = stub_node_style(None, false);
    let style = composite(background, foreground, Insets::uniform(5.0));
    let label = Rc::new(Label::new(OrientedRect::new(10.0, 60.0, 100.0, 50.0), "x"));

    let renderer = style.renderer();
    let mut renderer = renderer.borrow_mut();

    // Insets do not shrink the interactive area.
    assert!(
        renderer
            .hit_testable(&label, &style)
            .is_hit(&InputContext::with_radius(0.0), point(12.0, 12.0))
    );
    assert!(
        !renderer
            .hit_testable(&label, &style)
            .is_hit(&InputContext::with_radius(0.0), point(8.0, 8.0))
    );
    assert!(
        renderer
            .hit_testable(&label, &style)
            .is_hit(&InputContext::with_radius(3.0), point(8.0, 8.0))
    );

    assert_eq!(
        renderer
            .bounds_provider(&label, &style)
            .bounds(&CanvasContext::default()),
        rect(10.0, 10.0, 100.0, 50.0)
    );

    assert!(
        renderer
            .marquee_testable(&label, &style)
            .is_in_box(&InputContext::with_radius(0.0), &rect(0.0, 0.0, 50.0, 50.0))
    );
    assert!(
        !renderer
            .marquee_testable(&label, &style)
            .is_in_box(&InputContext::with_radius(0.0), &rect(0.0, 0.0, 5.0, 5.0))
    );
}

#[test]
fn visibility_uses_raw_layout_and_skips_configuration() {
    let (foreground, _) = stub_label_style(size(10.0, 10.0));
    let (background, bg) = stub_node_style(Some(Insets::uniform(1.0)), false);
    let style = composite(background, foreground, Insets::default());
    let label = Rc::new(Label::new(OrientedRect::new(10.0, 60.0, 100.0, 50.0), "x"));

    let renderer = style.renderer();
    let mut renderer = renderer.borrow_mut();
    let visible = renderer.visibility_testable(&label, &style);
    assert!(visible.is_visible(&CanvasContext::default(), &rect(0.0, 0.0, 9.0, 9.0)));
    assert!(!visible.is_visible(&CanvasContext::default(), &rect(0.0, 0.0, 7.0, 7.0)));

    // The background was never consulted: visibility answers from the raw
    // label layout alone.
    assert_eq!(bg.lookups.get(), 0);
}

#[test]
fn generic_lookup_resolves_configured_capabilities() {
    let (foreground, _) = stub_label_style(size(10.0, 10.0));
    let (background, _) = stub_node_style(None, false);
    let style = composite(background, foreground, Insets::default());
    let label = Rc::new(Label::new(OrientedRect::new(10.0, 60.0, 100.0, 50.0), "x"));
    let mut ctx = RecordingContext::default();

    let renderer = style.renderer();
    let mut renderer = renderer.borrow_mut();

    match renderer.lookup(&label, &style, CapabilityKind::Bounds) {
        Some(Capability::Bounds(bounds)) => {
            assert_eq!(
                bounds.bounds(&CanvasContext::default()),
                rect(10.0, 10.0, 100.0, 50.0)
            );
        }
        _ => panic!("expected a bounds capability"),
    }

    match renderer.lookup(&label, &style, CapabilityKind::VisualCreator) {
        Some(Capability::VisualCreator(creator)) => {
            assert!(creator.create_visual(&mut ctx).is_some());
        }
        _ => panic!("expected a visual-creator capability"),
    }

    // The composite does not itself provide node insets.
    assert!(
        renderer
            .lookup(&label, &style, CapabilityKind::NodeInsets)
            .is_none()
    );
}

#[test]
fn dispose_children_forwards_both_children() {
    let (foreground, _) = stub_label_style(size(10.0, 10.0));
    let (background, _) = stub_node_style(None, false);
    let style = composite(background, foreground, Insets::default());
    let label = Rc::new(Label::new(OrientedRect::new(0.0, 50.0, 100.0, 50.0), "x"));
    let mut ctx = RecordingContext::default();

    let renderer = style.renderer();
    let visual = renderer
        .borrow_mut()
        .visual_creator(&label, &style)
        .create_visual(&mut ctx)
        .unwrap();
    let group = expect_group(&visual);

    group.dispose_children(&mut ctx);
    assert_eq!(ctx.removed.len(), 2);
    assert!(ctx.removed[0].same(&group.child(0).unwrap()));
    assert!(ctx.removed[1].same(&group.child(1).unwrap()));
}

#[test]
fn auto_flip_flag_controls_the_placement_transform() {
    let (foreground, _) = stub_label_style(size(10.0, 10.0));
    let (background, _) = stub_node_style(None, false);
    let layout = OrientedRect::with_up(0.0, 0.0, 10.0, 4.0, vector(0.0, 1.0)).unwrap();
    let label = Rc::new(Label::new(layout, "x"));
    let mut ctx = RecordingContext::default();

    let mut adapter = CompositeLabelStyle::new(background.clone(), foreground.clone());
    let style: Rc<dyn LabelStyle> = Rc::new(adapter.clone());
    let renderer = style.renderer();
    let visual = renderer
        .borrow_mut()
        .visual_creator(&label, &style)
        .create_visual(&mut ctx)
        .unwrap();
    let t = expect_group(&visual).transform();
    assert_eq!(
        (t.m11, t.m12, t.m21, t.m22, t.m31, t.m32),
        (1.0, 0.0, 0.0, 1.0, -10.0, 0.0)
    );

    adapter.set_auto_flip(false);
    let style: Rc<dyn LabelStyle> = Rc::new(adapter);
    let renderer = style.renderer();
    let visual = renderer
        .borrow_mut()
        .visual_creator(&label, &style)
        .create_visual(&mut ctx)
        .unwrap();
    let t = expect_group(&visual).transform();
    assert_eq!(
        (t.m11, t.m12, t.m21, t.m22, t.m31, t.m32),
        (-1.0, 0.0, 0.0, -1.0, 0.0, 4.0)
    );
}
