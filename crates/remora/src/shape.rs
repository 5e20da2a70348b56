//! Built-in filled-shape node style, the default background of a
//! [`crate::CompositeLabelStyle`].

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::entities::Node;
use crate::geom::{Insets, Rect};
use crate::style::{
    Capability, CapabilityKind, NodeInsetsProvider, NodeStyle, NodeStyleRenderer,
    VOID_VISUAL_CREATOR, VisualCreator,
};
use crate::visual::{Drawable, RenderContext, Visual};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    RoundedRectangle,
    Ellipse,
}

/// Drawing parameters of a [`ShapeNodeStyle`]. Colors are CSS color strings
/// interpreted by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeConfig {
    #[serde(default)]
    pub shape: ShapeKind,
    #[serde(default)]
    pub fill: Option<String>,
    #[serde(default)]
    pub stroke: Option<String>,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default)]
    pub corner_radius: f64,
    /// Insets the shape demands between its border and any content placed
    /// inside it, surfaced through the insets-provider capability.
    #[serde(default)]
    pub content_insets: Insets,
}

fn default_stroke_width() -> f64 {
    1.0
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            shape: ShapeKind::Rectangle,
            fill: Some("#ffffff".to_string()),
            stroke: Some("#333333".to_string()),
            stroke_width: 1.0,
            corner_radius: 0.0,
            content_insets: Insets::default(),
        }
    }
}

/// A node style that paints a single filled shape covering the node's layout.
#[derive(Clone)]
pub struct ShapeNodeStyle {
    config: ShapeConfig,
    renderer: Rc<RefCell<ShapeNodeStyleRenderer>>,
}

impl ShapeNodeStyle {
    pub fn new(config: ShapeConfig) -> Self {
        Self {
            config,
            renderer: Rc::new(RefCell::new(ShapeNodeStyleRenderer::new())),
        }
    }

    pub fn config(&self) -> &ShapeConfig {
        &self.config
    }

    pub fn with_shape(mut self, shape: ShapeKind) -> Self {
        self.config.shape = shape;
        self
    }

    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.config.fill = Some(fill.into());
        self
    }

    pub fn with_stroke(mut self, stroke: impl Into<String>) -> Self {
        self.config.stroke = Some(stroke.into());
        self
    }

    pub fn with_content_insets(mut self, insets: Insets) -> Self {
        self.config.content_insets = insets;
        self
    }
}

impl Default for ShapeNodeStyle {
    fn default() -> Self {
        Self::new(ShapeConfig::default())
    }
}

impl NodeStyle for ShapeNodeStyle {
    fn renderer(&self) -> Rc<RefCell<dyn NodeStyleRenderer>> {
        self.renderer.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Leaf visual produced by [`ShapeNodeStyle`]; updated in place so its
/// identity is stable across incremental updates.
#[derive(Debug)]
pub struct ShapeVisual {
    pub rect: Cell<Rect>,
    pub config: RefCell<ShapeConfig>,
}

impl Drawable for ShapeVisual {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct ShapeNodeStyleRenderer {
    node: Option<Rc<Node>>,
    config: ShapeConfig,
}

impl ShapeNodeStyleRenderer {
    fn new() -> Self {
        Self {
            node: None,
            config: ShapeConfig::default(),
        }
    }

    fn bind(&mut self, node: &Rc<Node>, style: &ShapeNodeStyle) {
        self.node = Some(node.clone());
        self.config = style.config().clone();
    }
}

impl NodeStyleRenderer for ShapeNodeStyleRenderer {
    fn visual_creator(
        &mut self,
        node: &Rc<Node>,
        style: &Rc<dyn NodeStyle>,
    ) -> &dyn VisualCreator {
        match style.as_any().downcast_ref::<ShapeNodeStyle>() {
            Some(style) => {
                self.bind(node, style);
                &*self
            }
            None => &VOID_VISUAL_CREATOR,
        }
    }

    fn lookup(
        &mut self,
        node: &Rc<Node>,
        style: &Rc<dyn NodeStyle>,
        kind: CapabilityKind,
    ) -> Option<Capability<'_>> {
        let style = style.as_any().downcast_ref::<ShapeNodeStyle>()?;
        self.bind(node, style);
        match kind {
            CapabilityKind::NodeInsets => Some(Capability::NodeInsets(&*self)),
            CapabilityKind::VisualCreator => Some(Capability::VisualCreator(&*self)),
            _ => None,
        }
    }
}

impl NodeInsetsProvider for ShapeNodeStyleRenderer {
    fn insets(&self, _node: &Rc<Node>) -> Insets {
        self.config.content_insets
    }
}

impl VisualCreator for ShapeNodeStyleRenderer {
    fn create_visual(&self, _ctx: &mut dyn RenderContext) -> Option<Visual> {
        let node = self.node.as_ref()?;
        Some(Visual::Leaf(Rc::new(ShapeVisual {
            rect: Cell::new(node.layout()),
            config: RefCell::new(self.config.clone()),
        })))
    }

    fn update_visual(&self, ctx: &mut dyn RenderContext, old: Option<Visual>) -> Option<Visual> {
        let node = self.node.as_ref()?;
        if let Some(Visual::Leaf(leaf)) = &old {
            if let Some(shape) = leaf.as_any().downcast_ref::<ShapeVisual>() {
                shape.rect.set(node.layout());
                *shape.config.borrow_mut() = self.config.clone();
                return old;
            }
        }
        self.create_visual(ctx)
    }
}
