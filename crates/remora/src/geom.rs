//! Geometry primitives for label layout.
//!
//! Plain `f64` euclid aliases plus the two label-specific types: four-sided
//! [`Insets`] and the [`OrientedRect`] used for rotated label layouts.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type Rect = euclid::Rect<f64, Unit>;
pub type Transform = euclid::Transform2D<f64, Unit, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

pub fn size(width: f64, height: f64) -> Size {
    euclid::size2(width, height)
}

pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Rect {
    euclid::rect(x, y, width, height)
}

/// Four-sided margins subtracted from an outer rectangle to produce an inner
/// content rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
}

impl Insets {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    /// Per-side maximum of two inset sets. Used to combine configured insets
    /// with the insets a background style demands, so the smaller of the two
    /// never silently wins.
    pub fn union(&self, other: &Insets) -> Insets {
        Insets {
            top: self.top.max(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
            left: self.left.max(other.left),
        }
    }
}

/// An oriented rectangle: anchor at the bottom-left corner plus a normalized
/// up vector.
///
/// The default orientation is up = (0, -1), matching a screen coordinate
/// system where y grows downward. Width extends along the "right" vector (up
/// rotated 90° clockwise), height along the up vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedRect {
    pub anchor: Point,
    pub width: f64,
    pub height: f64,
    up: Vector,
}

impl OrientedRect {
    /// An upright rectangle anchored at its bottom-left corner `(x, y)`.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            anchor: point(x, y),
            width,
            height,
            up: vector(0.0, -1.0),
        }
    }

    /// A rectangle with an explicit orientation. The up vector is normalized;
    /// a zero-length vector is rejected.
    pub fn with_up(x: f64, y: f64, width: f64, height: f64, up: Vector) -> Result<Self> {
        let len = up.length();
        if len == 0.0 || !len.is_finite() {
            return Err(Error::DegenerateUpVector);
        }
        Ok(Self {
            anchor: point(x, y),
            width,
            height,
            up: up / len,
        })
    }

    /// The upright oriented rectangle covering `rect`.
    pub fn from_rect(rect: &Rect) -> Self {
        Self::new(rect.min_x(), rect.max_y(), rect.width(), rect.height())
    }

    pub fn up(&self) -> Vector {
        self.up
    }

    /// Up rotated 90° clockwise; the direction the width extends in.
    pub fn right(&self) -> Vector {
        vector(-self.up.y, self.up.x)
    }

    /// Corner order: anchor, anchor+right·w, anchor+up·h, opposite corner.
    pub fn corners(&self) -> [Point; 4] {
        let r = self.right() * self.width;
        let u = self.up * self.height;
        [
            self.anchor,
            self.anchor + r,
            self.anchor + u,
            self.anchor + u + r,
        ]
    }

    /// Axis-aligned bounding box.
    pub fn bounds(&self) -> Rect {
        let corners = self.corners();
        let mut min_x = corners[0].x;
        let mut min_y = corners[0].y;
        let mut max_x = min_x;
        let mut max_y = min_y;
        for c in &corners[1..] {
            min_x = min_x.min(c.x);
            min_y = min_y.min(c.y);
            max_x = max_x.max(c.x);
            max_y = max_y.max(c.y);
        }
        rect(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Whether `p` lies inside the rectangle, with `eps` tolerance on every
    /// side (expressed in local coordinates).
    pub fn contains(&self, p: Point, eps: f64) -> bool {
        let d = p - self.anchor;
        let lx = d.dot(self.right());
        let ly = d.dot(self.up);
        lx >= -eps && lx <= self.width + eps && ly >= -eps && ly <= self.height + eps
    }

    /// Whether the rectangle intersects the axis-aligned `other`, inflated by
    /// `eps`. Separating-axis test over the four candidate axes.
    pub fn intersects(&self, other: &Rect, eps: f64) -> bool {
        let other = other.inflate(eps, eps);
        if !self.bounds().intersects(&other) {
            return false;
        }
        let corners = [
            point(other.min_x(), other.min_y()),
            point(other.max_x(), other.min_y()),
            point(other.min_x(), other.max_y()),
            point(other.max_x(), other.max_y()),
        ];
        for (axis, max) in [(self.right(), self.width), (self.up, self.height)] {
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for c in corners {
                let v = (c - self.anchor).dot(axis);
                lo = lo.min(v);
                hi = hi.max(v);
            }
            if hi < 0.0 || lo > max {
                return false;
            }
        }
        true
    }

    /// Whether content laid out along this rectangle would read upside down
    /// (the up vector points downward on screen).
    pub fn is_upside_down(&self) -> bool {
        self.up.y > 0.0
    }

    /// The same area rotated 180° about its center: the opposite corner
    /// becomes the anchor and the up vector is negated.
    pub fn flipped(&self) -> Self {
        Self {
            anchor: self.anchor + self.up * self.height + self.right() * self.width,
            width: self.width,
            height: self.height,
            up: -self.up,
        }
    }
}

/// The transform that places a visual built in the local box (0,0)..(w,h)
/// (y growing downward) onto `layout`.
///
/// With `auto_flip` set, an upside-down layout is replaced by its flipped
/// counterpart so text content stays upright.
pub fn layout_transform(layout: &OrientedRect, auto_flip: bool) -> Transform {
    let layout = if auto_flip && layout.is_upside_down() {
        layout.flipped()
    } else {
        *layout
    };
    let x_axis = layout.right();
    let y_axis = -layout.up();
    let origin = layout.anchor + layout.up() * layout.height;
    Transform::new(x_axis.x, x_axis.y, y_axis.x, y_axis.y, origin.x, origin.y)
}
