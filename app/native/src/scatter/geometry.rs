//! Geometry primitives shared by the layout calculator, animation and platform.
//!
//! Two rectangle flavours exist: [`ScreenRect`] mirrors what the window system
//! reports (integer edges), while [`Rect`] is the floating point
//! origin-plus-size rectangle used for placement and interpolation.

use serde::{Deserialize, Serialize};

// ============================================================================
// Point / Size
// ============================================================================

/// A point in 2D space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 { (self.x - other.x).hypot(self.y - other.y) }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Size {
    /// Creates a new size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self { Self { width, height } }

    /// Returns the area covered by this size.
    #[must_use]
    pub fn area(&self) -> f64 { self.width * self.height }
}

// ============================================================================
// Rect
// ============================================================================

/// A rectangle defined by origin point and size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of the origin (top-left corner).
    pub x: f64,
    /// Y coordinate of the origin (top-left corner).
    pub y: f64,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
}

impl Rect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Creates a rectangle of the given size whose center is `center`.
    #[must_use]
    pub fn centered_at(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    /// Returns the size of the rectangle.
    #[must_use]
    pub const fn size(&self) -> Size { Size::new(self.width, self.height) }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 { self.x + self.width }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 { self.y + self.height }

    /// Returns the center point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Returns whether a point is inside the rectangle.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Returns the area of the rectangle.
    #[must_use]
    pub fn area(&self) -> f64 { self.width * self.height }

    /// Grows the rectangle by `amount` on every side.
    #[must_use]
    pub fn inflate(&self, amount: f64) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            2.0f64.mul_add(amount, self.width),
            2.0f64.mul_add(amount, self.height),
        )
    }

    /// Returns the overlap extent on each axis, or `None` when the rectangles
    /// do not overlap on both axes.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Size> {
        let width = self.right().min(other.right()) - self.x.max(other.x);
        let height = self.bottom().min(other.bottom()) - self.y.max(other.y);
        (width > 0.0 && height > 0.0).then_some(Size::new(width, height))
    }

    /// Smallest distance between the edges of two rectangles.
    ///
    /// Returns 0 when they touch or overlap.
    #[must_use]
    pub fn gap_to(&self, other: &Self) -> f64 {
        let dx = (other.x - self.right()).max(self.x - other.right()).max(0.0);
        let dy = (other.y - self.bottom()).max(self.y - other.bottom()).max(0.0);
        dx.hypot(dy)
    }

    /// Rounds every component to the nearest integer pixel.
    #[must_use]
    pub fn round(&self) -> Self {
        Self::new(self.x.round(), self.y.round(), self.width.round(), self.height.round())
    }
}

impl From<ScreenRect> for Rect {
    fn from(rect: ScreenRect) -> Self {
        Self::new(
            f64::from(rect.left),
            f64::from(rect.top),
            f64::from(rect.width()),
            f64::from(rect.height()),
        )
    }
}

// ============================================================================
// ScreenRect
// ============================================================================

/// A window rectangle as reported by the window system, in integer pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScreenRect {
    /// Creates a rectangle from its four edges.
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Creates a rectangle from origin and size. Edges saturate at the
    /// `i32` range.
    #[must_use]
    pub const fn from_origin_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self::new(left, top, left.saturating_add(width), top.saturating_add(height))
    }

    /// Width in pixels; never negative.
    #[must_use]
    pub const fn width(&self) -> i32 {
        let width = self.right - self.left;
        if width < 0 { 0 } else { width }
    }

    /// Height in pixels; never negative.
    #[must_use]
    pub const fn height(&self) -> i32 {
        let height = self.bottom - self.top;
        if height < 0 { 0 } else { height }
    }

    /// Center of the rectangle.
    #[must_use]
    pub fn center(&self) -> Point { Rect::from(*self).center() }
}
