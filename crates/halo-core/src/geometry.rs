//! Device-independent to device-pixel conversion for the glow halo.
//!
//! The halo extends a fixed margin beyond the owner on every side, so its
//! origin is the owner's origin minus the margin and its size is the
//! owner's size plus twice the margin. Both are scaled by the surface's
//! uniform scale factor and truncated to whole pixels.

use crate::rect::DipRect;

/// Outward margin of the glow halo, in device-independent units.
pub const GLOW_MARGIN: f64 = 10.0;

/// Returns `scale` if it is usable, otherwise the identity scale.
pub fn normalize_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

/// Converts a device-independent length or coordinate to device pixels.
///
/// Truncates toward zero.
pub fn to_device(value: f64, scale: f64) -> i32 {
    (value * normalize_scale(scale)) as i32
}

/// Device-pixel origin of the halo around `owner`.
pub fn glow_origin(owner: &DipRect, margin: f64, scale: f64) -> (i32, i32) {
    (
        to_device(owner.left - margin, scale),
        to_device(owner.top - margin, scale),
    )
}

/// Device-pixel size of the halo around `owner`.
pub fn glow_size(owner: &DipRect, margin: f64, scale: f64) -> (i32, i32) {
    (
        to_device(owner.width + margin * 2.0, scale),
        to_device(owner.height + margin * 2.0, scale),
    )
}
