use std::cell::RefCell;
use std::collections::HashMap;

use halo_core::{
    Color, Placement, Platform, Rect, StyleField, SurfaceHandle, WindowResult, WindowState,
};
use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::UI::Input::KeyboardAndMouse::ReleaseCapture;
use windows::Win32::UI::WindowsAndMessaging::{
    DestroyWindow, GWL_EXSTYLE, GWL_STYLE, GetWindowLongPtrW, HTCAPTION, PostMessageW,
    SW_MAXIMIZE, SW_MINIMIZE, SW_RESTORE, SWP_FRAMECHANGED, SWP_NOACTIVATE, SWP_NOMOVE,
    SWP_NOOWNERZORDER, SWP_NOSIZE, SWP_NOZORDER, SWP_SHOWWINDOW, SetWindowLongPtrW,
    SetWindowPos, ShowWindow, WM_NCLBUTTONDOWN,
};

use crate::{dpi, glow_surface};

/// Converts a platform-neutral handle back to the `HWND` it came from.
pub fn hwnd(surface: SurfaceHandle) -> HWND {
    HWND(surface.0 as *mut _)
}

/// Wraps an `HWND` for the platform-neutral core.
pub fn surface(hwnd: HWND) -> SurfaceHandle {
    SurfaceHandle(hwnd.0 as usize)
}

/// What a glow surface last showed, so any single change can re-render.
struct GlowPaint {
    rect: Rect,
    color: Color,
    opacity: f64,
    margin: f64,
    halo: Option<glow_surface::Halo>,
}

impl GlowPaint {
    fn render(&mut self, hwnd: HWND) {
        let margin = (self.margin * dpi::scale_factor(hwnd)) as i32;
        glow_surface::render(hwnd, self.rect, margin, self.color, self.opacity, &mut self.halo);
    }
}

/// [`Platform`] backed by Win32 window calls.
///
/// Surfaces registered with [`Win32Platform::register_glow`] are layered
/// windows and are re-rendered whenever their geometry, fill or opacity
/// changes. Every other surface is an ordinary window.
#[derive(Default)]
pub struct Win32Platform {
    glows: RefCell<HashMap<usize, GlowPaint>>,
}

impl Win32Platform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `surface` as a glow window painted with a `margin`-wide halo
    /// (device-independent units).
    pub fn register_glow(&self, surface: SurfaceHandle, margin: f64) {
        self.glows.borrow_mut().insert(
            surface.0,
            GlowPaint {
                rect: Rect::default(),
                color: Color::rgb(0, 0, 0),
                opacity: 0.0,
                margin,
                halo: None,
            },
        );
    }

    fn update_glow(&self, surface: SurfaceHandle, change: impl FnOnce(&mut GlowPaint)) {
        let mut glows = self.glows.borrow_mut();
        if let Some(paint) = glows.get_mut(&surface.0) {
            change(paint);
            paint.render(hwnd(surface));
        }
    }
}

impl Platform for Win32Platform {
    fn place_behind(
        &self,
        surface: SurfaceHandle,
        owner: SurfaceHandle,
        rect: Rect,
        placement: Placement,
    ) -> WindowResult<()> {
        let mut flags = SWP_SHOWWINDOW;
        if placement.no_activate {
            flags |= SWP_NOACTIVATE;
        }
        if placement.no_owner_z_order {
            flags |= SWP_NOOWNERZORDER;
        }

        // SAFETY: SetWindowPos with valid HWNDs is safe. Inserting after
        // the owner stacks the surface immediately below it.
        unsafe {
            SetWindowPos(
                hwnd(surface),
                Some(hwnd(owner)),
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                flags,
            )?;
        }
        self.update_glow(surface, |paint| paint.rect = rect);
        Ok(())
    }

    fn style_bits(&self, surface: SurfaceHandle, field: StyleField) -> WindowResult<u32> {
        let index = match field {
            StyleField::Style => GWL_STYLE,
            StyleField::ExStyle => GWL_EXSTYLE,
        };
        // SAFETY: GetWindowLongPtrW only reads window data.
        let bits = unsafe { GetWindowLongPtrW(hwnd(surface), index) };
        Ok(bits as u32)
    }

    fn set_style_bits(
        &self,
        surface: SurfaceHandle,
        field: StyleField,
        value: u32,
    ) -> WindowResult<()> {
        let index = match field {
            StyleField::Style => GWL_STYLE,
            StyleField::ExStyle => GWL_EXSTYLE,
        };
        let hwnd = hwnd(surface);

        // SAFETY: style changes on our own windows; SWP_FRAMECHANGED makes
        // Windows pick up the new bits without moving anything.
        unsafe {
            SetWindowLongPtrW(hwnd, index, value as i32 as isize);
            SetWindowPos(
                hwnd,
                None,
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE | SWP_FRAMECHANGED,
            )?;
        }
        Ok(())
    }

    fn scale_factor_of(&self, surface: SurfaceHandle) -> f64 {
        dpi::scale_factor(hwnd(surface))
    }

    fn set_opacity(&self, surface: SurfaceHandle, opacity: f64) -> WindowResult<()> {
        self.update_glow(surface, |paint| paint.opacity = opacity);
        Ok(())
    }

    fn set_fill(&self, surface: SurfaceHandle, color: Color) -> WindowResult<()> {
        self.update_glow(surface, |paint| paint.color = color);
        Ok(())
    }

    fn begin_drag_move(&self, surface: SurfaceHandle) -> WindowResult<()> {
        // Posted rather than sent: the modal move loop must not start
        // while the caller is still inside its own input handler.
        // SAFETY: ReleaseCapture has no preconditions; PostMessageW only
        // queues a message for a window this thread owns.
        unsafe {
            let _ = ReleaseCapture();
            PostMessageW(
                Some(hwnd(surface)),
                WM_NCLBUTTONDOWN,
                WPARAM(HTCAPTION as usize),
                LPARAM(0),
            )?;
        }
        Ok(())
    }

    fn apply_state(&self, surface: SurfaceHandle, state: WindowState) -> WindowResult<()> {
        let cmd = match state {
            WindowState::Normal => SW_RESTORE,
            WindowState::Minimized => SW_MINIMIZE,
            WindowState::Maximized => SW_MAXIMIZE,
        };
        // SAFETY: ShowWindow returns the previous visibility, not an error.
        unsafe {
            let _ = ShowWindow(hwnd(surface), cmd);
        }
        Ok(())
    }

    fn close_surface(&self, surface: SurfaceHandle) -> WindowResult<()> {
        self.glows.borrow_mut().remove(&surface.0);
        // SAFETY: DestroyWindow on a window this thread created.
        unsafe { DestroyWindow(hwnd(surface))? };
        halo_core::log_debug!("surface 0x{:X} destroyed", surface.0);
        Ok(())
    }
}
