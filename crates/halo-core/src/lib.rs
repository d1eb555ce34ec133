pub mod color;
pub mod config;
pub mod deferred;
pub mod dispatch;
pub mod event;
pub mod geometry;
pub mod glow;
pub mod log;
pub mod observer;
pub mod owner;
pub mod platform;
pub mod rect;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use color::Color;
pub use deferred::{DeferredQueue, TaskId};
pub use dispatch::{ChromeHandle, ChromeMsg, UiDispatcher};
pub use event::{OwnerEvent, OwnerEventKind, OwnerView, WindowState};
pub use glow::{GlowOverlay, GlowSettings, Phase};
pub use observer::{EventSource, ListenerKey};
pub use owner::{ChromeAttributes, ChromeHandlers, OwnerWindow, Part, PartId, PointerButton, Template};
pub use platform::{Placement, Platform, StyleField, SurfaceHandle, WindowResult};
pub use rect::{DipRect, Rect};
pub use session::ChromeSession;
