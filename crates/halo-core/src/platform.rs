use crate::color::Color;
use crate::event::WindowState;
use crate::rect::Rect;

/// A boxed error type for platform operations.
///
/// Any error type that implements the `Error` trait can be boxed into this.
pub type WindowResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Opaque platform window handle (pointer-sized integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub usize);

/// How a surface is stacked relative to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Do not activate the placed surface.
    pub no_activate: bool,
    /// Do not move the owner within its own z-band.
    pub no_owner_z_order: bool,
}

impl Placement {
    /// Immediately behind the owner, without touching the owner's
    /// activation or stacking.
    pub const BEHIND_OWNER: Self = Self {
        no_activate: true,
        no_owner_z_order: true,
    };
}

/// Which style word a call reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleField {
    Style,
    ExStyle,
}

/// Style bits, using the Win32 bit layout. Other platforms translate.
pub mod style {
    pub const POPUP: u32 = 0x8000_0000;
    pub const VISIBLE: u32 = 0x1000_0000;
    pub const CLIP_SIBLINGS: u32 = 0x0400_0000;
    pub const CLIP_CHILDREN: u32 = 0x0200_0000;
    pub const MAXIMIZE_BOX: u32 = 0x0001_0000;

    pub const EX_TRANSPARENT: u32 = 0x0000_0020;
    pub const EX_TOOL_WINDOW: u32 = 0x0000_0080;
    pub const EX_LAYERED: u32 = 0x0008_0000;
    pub const EX_NO_ACTIVATE: u32 = 0x0800_0000;

    /// Borderless, visible popup for the glow surface.
    pub const GLOW: u32 = POPUP | VISIBLE | CLIP_SIBLINGS | CLIP_CHILDREN;

    /// Layered, click-through, non-activatable, hidden from the taskbar.
    pub const GLOW_EX: u32 = EX_LAYERED | EX_TOOL_WINDOW | EX_TRANSPARENT | EX_NO_ACTIVATE;
}

/// Native windowing capabilities the chrome needs.
///
/// Each target platform provides one implementation. Methods take
/// `&self`; implementations use interior mutability for any state.
pub trait Platform {
    /// Moves `surface` to `rect` and stacks it immediately behind `owner`.
    fn place_behind(
        &self,
        surface: SurfaceHandle,
        owner: SurfaceHandle,
        rect: Rect,
        placement: Placement,
    ) -> WindowResult<()>;

    /// Reads a style word.
    fn style_bits(&self, surface: SurfaceHandle, field: StyleField) -> WindowResult<u32>;

    /// Overwrites a style word.
    fn set_style_bits(&self, surface: SurfaceHandle, field: StyleField, value: u32)
    -> WindowResult<()>;

    /// Uniform device scale factor of the monitor hosting `surface`.
    fn scale_factor_of(&self, surface: SurfaceHandle) -> f64;

    /// Sets whole-surface opacity in `[0, 1]`.
    fn set_opacity(&self, surface: SurfaceHandle, opacity: f64) -> WindowResult<()>;

    /// Sets the color a decorative surface is painted with.
    fn set_fill(&self, surface: SurfaceHandle, color: Color) -> WindowResult<()>;

    /// Starts an interactive, platform-driven move of `surface`.
    fn begin_drag_move(&self, surface: SurfaceHandle) -> WindowResult<()>;

    /// Minimizes, maximizes, or restores `surface`.
    fn apply_state(&self, surface: SurfaceHandle, state: WindowState) -> WindowResult<()>;

    /// Destroys `surface`.
    fn close_surface(&self, surface: SurfaceHandle) -> WindowResult<()>;
}
