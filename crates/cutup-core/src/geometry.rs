#![forbid(unsafe_code)]

//! Viewport geometry for popup placement.
//!
//! Coordinates are CSS pixels relative to the viewport (origin at top-left),
//! as reported by `getBoundingClientRect`.

/// An axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Left edge. Alias for `self.x`.
    #[inline]
    pub const fn left(&self) -> f64 {
        self.x
    }

    /// Top edge. Alias for `self.y`.
    #[inline]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Rectangle with the given origin and size.
    #[inline]
    pub const fn from_origin(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }
}

/// Rendered size of an element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A point in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which side of the anchor a popup ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Above,
    Below,
}

/// Result of [`place_popup`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupPlacement {
    /// Top-left corner of the popup.
    pub origin: Point,
    /// Final vertical side relative to the anchor.
    pub side: Side,
    /// Whether the popup was pulled left to stay inside the viewport.
    pub shifted: bool,
}

impl PopupPlacement {
    /// Bounds of the placed popup.
    pub fn bounds(&self, size: Size) -> Rect {
        Rect::from_origin(self.origin, size)
    }
}

/// Place a popup of `popup` size above `anchor`, left-aligned with it.
///
/// Two corrections are applied, in order:
/// 1. if the popup's right edge passes `viewport_width`, it is shifted left
///    so its right edge sits at `viewport_width - margin`;
/// 2. if the popup's top would be negative, it is flipped below the anchor
///    (`anchor.bottom() + gap`).
///
/// `popup` must be the measured post-layout size, not an estimate.
pub fn place_popup(
    anchor: Rect,
    popup: Size,
    viewport_width: f64,
    gap: f64,
    margin: f64,
) -> PopupPlacement {
    let mut x = anchor.left();
    let mut shifted = false;
    if x + popup.width > viewport_width {
        x = viewport_width - popup.width - margin;
        shifted = true;
    }

    let above = anchor.top() - popup.height - gap;
    let (y, side) = if above < 0.0 {
        (anchor.bottom() + gap, Side::Below)
    } else {
        (above, Side::Above)
    };

    PopupPlacement {
        origin: Point::new(x, y),
        side,
        shifted,
    }
}
