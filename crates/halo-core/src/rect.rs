/// A rectangle in device pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// A rectangle in device-independent units.
///
/// Window chrome reasons in these units; conversion to device pixels
/// happens through a single uniform scale factor (see [`crate::geometry`]).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DipRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DipRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Converts a device-pixel rectangle back to device-independent units.
    pub fn from_device(rect: &Rect, scale: f64) -> Self {
        let scale = crate::geometry::normalize_scale(scale);
        Self {
            left: f64::from(rect.x) / scale,
            top: f64::from(rect.y) / scale,
            width: f64::from(rect.width) / scale,
            height: f64::from(rect.height) / scale,
        }
    }
}
