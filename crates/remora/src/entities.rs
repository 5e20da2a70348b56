//! Diagram entities as styles see them: labels, nodes and user tags.
//!
//! These are deliberately small interior-mutability records. Hosts mutate
//! them between frames, and the composite renderer reuses long-lived proxy
//! instances by overwriting their fields on every configuration.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::geom::{OrientedRect, Rect};
use crate::style::{LabelStyle, NodeStyle};

/// Arbitrary user data attached to an entity, compared by identity.
pub type Tag = Rc<dyn Any>;

/// A diagram label: oriented layout, text content, an optional style and an
/// optional tag.
pub struct Label {
    layout: Cell<OrientedRect>,
    text: RefCell<String>,
    style: RefCell<Option<Rc<dyn LabelStyle>>>,
    tag: RefCell<Option<Tag>>,
}

impl Label {
    pub fn new(layout: OrientedRect, text: impl Into<String>) -> Self {
        Self {
            layout: Cell::new(layout),
            text: RefCell::new(text.into()),
            style: RefCell::new(None),
            tag: RefCell::new(None),
        }
    }

    pub fn layout(&self) -> OrientedRect {
        self.layout.get()
    }

    pub fn set_layout(&self, layout: OrientedRect) {
        self.layout.set(layout);
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.borrow_mut() = text.into();
    }

    pub fn style(&self) -> Option<Rc<dyn LabelStyle>> {
        self.style.borrow().clone()
    }

    pub fn set_style(&self, style: Rc<dyn LabelStyle>) {
        *self.style.borrow_mut() = Some(style);
    }

    pub fn tag(&self) -> Option<Tag> {
        self.tag.borrow().clone()
    }

    pub fn set_tag(&self, tag: Option<Tag>) {
        *self.tag.borrow_mut() = tag;
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Label")
            .field("layout", &self.layout.get())
            .field("text", &*self.text.borrow())
            .finish_non_exhaustive()
    }
}

/// A diagram node: axis-aligned layout, an optional style and an optional tag.
pub struct Node {
    layout: Cell<Rect>,
    style: RefCell<Option<Rc<dyn NodeStyle>>>,
    tag: RefCell<Option<Tag>>,
}

impl Node {
    pub fn new(layout: Rect) -> Self {
        Self {
            layout: Cell::new(layout),
            style: RefCell::new(None),
            tag: RefCell::new(None),
        }
    }

    pub fn layout(&self) -> Rect {
        self.layout.get()
    }

    pub fn set_layout(&self, layout: Rect) {
        self.layout.set(layout);
    }

    pub fn style(&self) -> Option<Rc<dyn NodeStyle>> {
        self.style.borrow().clone()
    }

    pub fn set_style(&self, style: Rc<dyn NodeStyle>) {
        *self.style.borrow_mut() = Some(style);
    }

    pub fn tag(&self) -> Option<Tag> {
        self.tag.borrow().clone()
    }

    pub fn set_tag(&self, tag: Option<Tag>) {
        *self.tag.borrow_mut() = tag;
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("layout", &self.layout.get())
            .finish_non_exhaustive()
    }
}
