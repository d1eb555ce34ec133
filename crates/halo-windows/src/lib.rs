#![cfg(windows)]
//! Win32 backend for Halo chrome windows.

/// Custom chrome layout and painting.
pub mod chrome;

/// Per-monitor DPI awareness and scale lookup.
pub mod dpi;

/// Layered window behind the glow overlay.
pub mod glow_surface;

/// Demo window and message pump.
pub mod host;

/// `Platform` implementation over Win32 windows.
pub mod platform;

pub use host::{RunOptions, run};
pub use platform::Win32Platform;
