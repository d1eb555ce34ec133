use crate::color::Color;
use crate::platform::SurfaceHandle;
use crate::rect::DipRect;

/// Visibility state of the owner window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
}

/// A lifecycle notification raised by the owner window.
///
/// Geometry events carry no payload: listeners read the owner's current
/// bounds through the [`OwnerView`] handed to them alongside the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerEvent {
    /// The owner's top-left corner moved.
    Moved,
    /// The owner's width or height changed.
    Resized,
    /// The owner was minimized, maximized, or restored.
    StateChanged(WindowState),
    /// The owner is closing. `cancelled` is the final outcome after every
    /// closing guard has been consulted.
    Closing { cancelled: bool },
}

/// Subscription key for [`OwnerEvent`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerEventKind {
    Moved,
    Resized,
    StateChanged,
    Closing,
}

impl OwnerEventKind {
    /// Every event kind, in subscription order.
    pub const ALL: [Self; 4] = [Self::Moved, Self::Resized, Self::StateChanged, Self::Closing];
}

impl OwnerEvent {
    /// Returns the subscription kind of this event.
    pub fn kind(&self) -> OwnerEventKind {
        match self {
            Self::Moved => OwnerEventKind::Moved,
            Self::Resized => OwnerEventKind::Resized,
            Self::StateChanged(_) => OwnerEventKind::StateChanged,
            Self::Closing { .. } => OwnerEventKind::Closing,
        }
    }
}

/// Read-only access to the owner window's current state.
///
/// Listeners never get mutable access to the owner.
pub trait OwnerView {
    /// Current bounds in device-independent units.
    fn bounds(&self) -> DipRect;

    /// Current visibility state.
    fn state(&self) -> WindowState;

    /// Color the glow halo should be painted with.
    fn glow_color(&self) -> Color;

    /// Platform surface, once the owner has been materialized.
    fn surface(&self) -> Option<SurfaceHandle>;
}
