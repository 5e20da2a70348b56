//! Built-in plain-text label style, the default foreground of a
//! [`crate::CompositeLabelStyle`].
//!
//! Text is measured deterministically from unicode column counts so preferred
//! sizes are reproducible without a font stack.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

use crate::entities::Label;
use crate::geom::{OrientedRect, Point, Rect, Size, size};
use crate::style::{
    BoundsProvider, Capability, CapabilityKind, HitTestable, LabelStyle, LabelStyleRenderer,
    MarqueeTestable, NEVER_HIT, NEVER_IN_BOX, NEVER_VISIBLE, VOID_VISUAL_CREATOR,
    VisibilityTestable, VisualCreator,
};
use crate::visual::{CanvasContext, Drawable, InputContext, RenderContext, Visual};

const GLYPH_ASPECT: f64 = 0.6;
const LINE_SPACING: f64 = 1.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

fn default_font_size() -> f64 {
    12.0
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            font_family: None,
            color: None,
        }
    }
}

/// A label style that draws the label's text and nothing else.
#[derive(Clone)]
pub struct TextLabelStyle {
    config: TextConfig,
    renderer: Rc<RefCell<TextLabelStyleRenderer>>,
}

impl TextLabelStyle {
    pub fn new(config: TextConfig) -> Self {
        Self {
            config,
            renderer: Rc::new(RefCell::new(TextLabelStyleRenderer::new())),
        }
    }

    pub fn config(&self) -> &TextConfig {
        &self.config
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.config.font_size = font_size;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.config.color = Some(color.into());
        self
    }
}

impl Default for TextLabelStyle {
    fn default() -> Self {
        Self::new(TextConfig::default())
    }
}

impl LabelStyle for TextLabelStyle {
    fn renderer(&self) -> Rc<RefCell<dyn LabelStyleRenderer>> {
        self.renderer.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Deterministic text metrics: widest line in unicode columns, one line-box
/// per line.
fn measure(text: &str, config: &TextConfig) -> Size {
    let mut cols = 0usize;
    let mut lines = 0usize;
    for line in text.lines() {
        lines += 1;
        cols = cols.max(line.width());
    }
    size(
        cols as f64 * config.font_size * GLYPH_ASPECT,
        lines as f64 * config.font_size * LINE_SPACING,
    )
}

/// Leaf visual produced by [`TextLabelStyle`]; updated in place so its
/// identity is stable across incremental updates.
#[derive(Debug)]
pub struct TextVisual {
    pub text: RefCell<String>,
    pub layout: Cell<OrientedRect>,
    pub config: RefCell<TextConfig>,
}

impl Drawable for TextVisual {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct TextLabelStyleRenderer {
    label: Option<Rc<Label>>,
    config: TextConfig,
}

impl TextLabelStyleRenderer {
    fn new() -> Self {
        Self {
            label: None,
            config: TextConfig::default(),
        }
    }

    fn bind(&mut self, label: &Rc<Label>, style: &TextLabelStyle) {
        self.label = Some(label.clone());
        self.config = style.config().clone();
    }

    fn layout(&self) -> Option<OrientedRect> {
        self.label.as_ref().map(|label| label.layout())
    }
}

impl LabelStyleRenderer for TextLabelStyleRenderer {
    fn preferred_size(&mut self, label: &Rc<Label>, style: &Rc<dyn LabelStyle>) -> Size {
        let Some(style) = style.as_any().downcast_ref::<TextLabelStyle>() else {
            return Size::zero();
        };
        self.bind(label, style);
        measure(&label.text(), &self.config)
    }

    fn visual_creator(
        &mut self,
        label: &Rc<Label>,
        style: &Rc<dyn LabelStyle>,
    ) -> &dyn VisualCreator {
        match style.as_any().downcast_ref::<TextLabelStyle>() {
            Some(style) => {
                self.bind(label, style);
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
        match style.as_any().downcast_ref::<TextLabelStyle>() {
            Some(style) => {
                self.bind(label, style);
                &*self
            }
            None => &crate::style::EMPTY_BOUNDS,
        }
    }

    fn hit_testable(&mut self, label: &Rc<Label>, style: &Rc<dyn LabelStyle>) -> &dyn HitTestable {
        match style.as_any().downcast_ref::<TextLabelStyle>() {
            Some(style) => {
                self.bind(label, style);
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
        match style.as_any().downcast_ref::<TextLabelStyle>() {
            Some(style) => {
                self.bind(label, style);
                &*self
            }
            None => &NEVER_IN_BOX,
        }
    }

    fn visibility_testable(
        &mut self,
        label: &Rc<Label>,
        style: &Rc<dyn LabelStyle>,
    ) -> &dyn VisibilityTestable {
        match style.as_any().downcast_ref::<TextLabelStyle>() {
            Some(style) => {
                self.bind(label, style);
                &*self
            }
            None => &NEVER_VISIBLE,
        }
    }

    fn lookup(
        &mut self,
        label: &Rc<Label>,
        style: &Rc<dyn LabelStyle>,
        kind: CapabilityKind,
    ) -> Option<Capability<'_>> {
        let style = style.as_any().downcast_ref::<TextLabelStyle>()?;
        self.bind(label, style);
        match kind {
            CapabilityKind::Bounds => Some(Capability::Bounds(&*self)),
            CapabilityKind::HitTest => Some(Capability::HitTest(&*self)),
            CapabilityKind::Marquee => Some(Capability::Marquee(&*self)),
            CapabilityKind::Visibility => Some(Capability::Visibility(&*self)),
            CapabilityKind::VisualCreator => Some(Capability::VisualCreator(&*self)),
            CapabilityKind::NodeInsets => None,
        }
    }
}

impl BoundsProvider for TextLabelStyleRenderer {
    fn bounds(&self, _ctx: &CanvasContext) -> Rect {
        match self.layout() {
            Some(layout) => layout.bounds(),
            None => Rect::zero(),
        }
    }
}

impl HitTestable for TextLabelStyleRenderer {
    fn is_hit(&self, ctx: &InputContext, location: Point) -> bool {
        match self.layout() {
            Some(layout) => layout.contains(location, ctx.hit_test_radius),
            None => false,
        }
    }
}

impl MarqueeTestable for TextLabelStyleRenderer {
    fn is_in_box(&self, ctx: &InputContext, marquee: &Rect) -> bool {
        match self.layout() {
            Some(layout) => layout.intersects(marquee, ctx.hit_test_radius),
            None => false,
        }
    }
}

impl VisibilityTestable for TextLabelStyleRenderer {
    fn is_visible(&self, _ctx: &CanvasContext, clip: &Rect) -> bool {
        match self.layout() {
            Some(layout) => layout.intersects(clip, 0.0),
            None => false,
        }
    }
}

impl VisualCreator for TextLabelStyleRenderer {
    fn create_visual(&self, _ctx: &mut dyn RenderContext) -> Option<Visual> {
        let label = self.label.as_ref()?;
        let text = label.text();
        if text.is_empty() {
            return None;
        }
        Some(Visual::Leaf(Rc::new(TextVisual {
            text: RefCell::new(text),
            layout: Cell::new(label.layout()),
            config: RefCell::new(self.config.clone()),
        })))
    }

    fn update_visual(&self, ctx: &mut dyn RenderContext, old: Option<Visual>) -> Option<Visual> {
        let label = self.label.as_ref()?;
        let text = label.text();
        if text.is_empty() {
            return None;
        }
        if let Some(Visual::Leaf(leaf)) = &old {
            if let Some(visual) = leaf.as_any().downcast_ref::<TextVisual>() {
                *visual.text.borrow_mut() = text;
                visual.layout.set(label.layout());
                *visual.config.borrow_mut() = self.config.clone();
                return old;
            }
        }
        self.create_visual(ctx)
    }
}
