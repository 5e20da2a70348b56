//! The composite label style: configuration holder for a background node
//! style layered under a foreground label style.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::geom::Insets;
use crate::renderer::{CompositeLabelStyleRenderer, StyleSnapshot};
use crate::shape::ShapeNodeStyle;
use crate::style::{LabelStyle, LabelStyleRenderer, NodeStyle};
use crate::text::TextLabelStyle;

/// A label style that uses a node style to render the background and a label
/// style to render the foreground of a label.
///
/// Both delegates are stored by reference: mutating a delegate style is
/// immediately visible through every composite that shares it. `Clone` is a
/// shallow copy — delegate references and the renderer handle are shared,
/// inset and flag values are independent.
#[derive(Clone)]
pub struct CompositeLabelStyle {
    background: Rc<dyn NodeStyle>,
    foreground: Rc<dyn LabelStyle>,
    insets: Insets,
    auto_flip: bool,
    renderer: Rc<RefCell<CompositeLabelStyleRenderer>>,
}

impl CompositeLabelStyle {
    /// Creates a composite from the two delegate styles.
    pub fn new(background: Rc<dyn NodeStyle>, foreground: Rc<dyn LabelStyle>) -> Self {
        Self {
            background,
            foreground,
            insets: Insets::default(),
            auto_flip: true,
            renderer: Rc::new(RefCell::new(CompositeLabelStyleRenderer::new())),
        }
    }

    /// The node style rendering the background of the label.
    pub fn background(&self) -> Rc<dyn NodeStyle> {
        self.background.clone()
    }

    pub fn set_background(&mut self, style: Rc<dyn NodeStyle>) {
        self.background = style;
    }

    /// The label style rendering the foreground of the label.
    pub fn foreground(&self) -> Rc<dyn LabelStyle> {
        self.foreground.clone()
    }

    pub fn set_foreground(&mut self, style: Rc<dyn LabelStyle>) {
        self.foreground = style;
    }

    /// Margins applied to the foreground style inside the label. The default
    /// is zero on all sides. The effective insets are the per-side maximum of
    /// this value and whatever the background style demands for its content
    /// area.
    pub fn insets(&self) -> Insets {
        self.insets
    }

    pub fn set_insets(&mut self, insets: Insets) {
        self.insets = insets;
    }

    /// Whether the rendered composite is rotated 180° when the label's
    /// orientation would present it upside down. Defaults to `true`.
    pub fn auto_flip(&self) -> bool {
        self.auto_flip
    }

    pub fn set_auto_flip(&mut self, auto_flip: bool) {
        self.auto_flip = auto_flip;
    }

    pub(crate) fn snapshot(&self) -> StyleSnapshot {
        StyleSnapshot {
            background: self.background.clone(),
            foreground: self.foreground.clone(),
            insets: self.insets,
            auto_flip: self.auto_flip,
        }
    }
}

impl Default for CompositeLabelStyle {
    /// A filled-rectangle background under a plain text foreground.
    fn default() -> Self {
        Self::new(
            Rc::new(ShapeNodeStyle::default()),
            Rc::new(TextLabelStyle::default()),
        )
    }
}

impl LabelStyle for CompositeLabelStyle {
    fn renderer(&self) -> Rc<RefCell<dyn LabelStyleRenderer>> {
        self.renderer.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
