//! Native surface behind the glow overlay.
//!
//! A layered popup painted with `UpdateLayeredWindow` and per-pixel
//! alpha: transparent over the owner's footprint, fading out across the
//! margin ring around it. Overall opacity goes through the blend's
//! constant alpha, and the rasterized halo is cached per surface, so
//! moving or hiding the glow never re-renders the falloff.

use std::mem;
use std::sync::Once;

use halo_core::{Color, Rect, WindowResult};
use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, POINT, SIZE, WPARAM};
use windows::Win32::Graphics::Gdi::{
    AC_SRC_ALPHA, AC_SRC_OVER, BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BLENDFUNCTION,
    CreateCompatibleDC, CreateDIBSection, DIB_RGB_COLORS, DeleteDC, DeleteObject, GetDC, HBITMAP,
    HDC, HGDIOBJ, ReleaseDC, SelectObject,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, HTTRANSPARENT, MA_NOACTIVATE, RegisterClassW, ULW_ALPHA,
    UpdateLayeredWindow, WM_MOUSEACTIVATE, WM_NCHITTEST, WNDCLASSW, WS_EX_LAYERED,
    WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_EX_TRANSPARENT, WS_POPUP,
};
use windows::core::{PCWSTR, w};

/// Strongest alpha of the halo, right at the owner's edge.
const PEAK_ALPHA: f64 = 96.0;

static REGISTER_CLASS: Once = Once::new();
const CLASS_NAME: PCWSTR = w!("HaloGlow");

fn ensure_class_registered() {
    REGISTER_CLASS.call_once(|| {
        let wc = WNDCLASSW {
            lpfnWndProc: Some(glow_wnd_proc),
            lpszClassName: CLASS_NAME,
            ..Default::default()
        };
        // SAFETY: `wc` points at a static class name and a valid wndproc.
        unsafe {
            RegisterClassW(&wc);
        }
    });
}

unsafe extern "system" fn glow_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_MOUSEACTIVATE => LRESULT(MA_NOACTIVATE as isize),
        WM_NCHITTEST => LRESULT(HTTRANSPARENT as isize),
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

/// Creates the hidden glow window. It has no owner: an owned window
/// always stacks above its owner, and the glow must sit below.
pub fn create() -> WindowResult<HWND> {
    ensure_class_registered();

    let ex = WS_EX_LAYERED | WS_EX_TOOLWINDOW | WS_EX_TRANSPARENT | WS_EX_NOACTIVATE;
    // SAFETY: the class is registered above; no parent or owner.
    let hwnd = unsafe {
        CreateWindowExW(
            ex,
            CLASS_NAME,
            PCWSTR::null(),
            WS_POPUP,
            0,
            0,
            0,
            0,
            None,
            None,
            None,
            None,
        )?
    };
    halo_core::log_debug!("glow surface created: 0x{:X}", hwnd.0 as usize);
    Ok(hwnd)
}

/// Alpha of a pixel `distance` pixels outside the owner's edge, for a
/// ring `margin` pixels wide. Quadratic falloff, zero inside the owner.
pub(crate) fn falloff(distance: f64, margin: f64) -> u8 {
    if margin <= 0.0 || distance <= 0.0 || distance > margin {
        return 0;
    }
    let t = 1.0 - (distance - 1.0).max(0.0) / margin;
    (PEAK_ALPHA * t * t).round() as u8
}

/// Distance from pixel (`px`, `py`) to the inner rectangle spanning
/// `margin..w - margin` by `margin..h - margin`.
fn distance_to_inner(px: i32, py: i32, w: i32, h: i32, margin: i32) -> f64 {
    let dx = (margin - px).max(px - (w - margin - 1)).max(0);
    let dy = (margin - py).max(py - (h - margin - 1)).max(0);
    f64::from(dx * dx + dy * dy).sqrt()
}

/// Builds a premultiplied BGRA halo bitmap of `w` by `h` pixels.
pub(crate) fn halo_pixels(w: i32, h: i32, margin: i32, color: Color) -> Vec<u32> {
    let mut buf = vec![0u32; (w.max(0) * h.max(0)) as usize];
    for py in 0..h {
        for px in 0..w {
            let a = falloff(distance_to_inner(px, py, w, h, margin), f64::from(margin));
            if a == 0 {
                continue;
            }
            let premul = |c: u8| u32::from(c) * u32::from(a) / 255;
            buf[(py * w + px) as usize] = (u32::from(a) << 24)
                | (premul(color.r) << 16)
                | (premul(color.g) << 8)
                | premul(color.b);
        }
    }
    buf
}

/// A screen-compatible memory DC holding a top-down 32-bit DIB.
/// Everything it acquired is released on drop.
struct Canvas {
    mem_dc: HDC,
    bitmap: HBITMAP,
    previous: HGDIOBJ,
    bits: *mut u32,
}

impl Canvas {
    fn new(w: i32, h: i32) -> Option<Self> {
        let info = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: w,
                biHeight: -h,
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };

        // SAFETY: each handle is released exactly once, either below on
        // failure or by Drop.
        unsafe {
            let screen_dc = GetDC(None);
            let mem_dc = CreateCompatibleDC(Some(screen_dc));
            let _ = ReleaseDC(None, screen_dc);
            let mut bits = std::ptr::null_mut();
            match CreateDIBSection(Some(mem_dc), &info, DIB_RGB_COLORS, &mut bits, None, 0) {
                Ok(bitmap) if !bits.is_null() => {
                    let previous = SelectObject(mem_dc, bitmap.into());
                    Some(Self {
                        mem_dc,
                        bitmap,
                        previous,
                        bits: bits.cast(),
                    })
                }
                other => {
                    if let Ok(bitmap) = other {
                        let _ = DeleteObject(bitmap.into());
                    }
                    let _ = DeleteDC(mem_dc);
                    None
                }
            }
        }
    }

    fn copy_from(&mut self, pixels: &[u32]) {
        // SAFETY: `bits` points at the DIB's w * h pixels and `pixels`
        // was sized from the same dimensions.
        unsafe { std::slice::from_raw_parts_mut(self.bits, pixels.len()) }.copy_from_slice(pixels);
    }
}

impl Drop for Canvas {
    fn drop(&mut self) {
        // SAFETY: the handles were created in `new` and are released once.
        unsafe {
            SelectObject(self.mem_dc, self.previous);
            let _ = DeleteObject(self.bitmap.into());
            let _ = DeleteDC(self.mem_dc);
        }
    }
}

/// What a rasterized halo depends on. Position is not part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HaloKey {
    width: i32,
    height: i32,
    margin: i32,
    color: Color,
}

impl HaloKey {
    pub(crate) fn new(rect: &Rect, margin: i32, color: Color) -> Self {
        Self {
            width: rect.width,
            height: rect.height,
            margin,
            color,
        }
    }
}

/// A rendered halo bitmap, reused until its [`HaloKey`] changes.
pub struct Halo {
    key: HaloKey,
    canvas: Canvas,
}

impl Halo {
    fn build(key: HaloKey) -> Option<Self> {
        let mut canvas = Canvas::new(key.width, key.height)?;
        canvas.copy_from(&halo_pixels(key.width, key.height, key.margin, key.color));
        Some(Self { key, canvas })
    }
}

/// Shows the halo over `rect` (device pixels) at `opacity`, rebuilding
/// the cached bitmap in `cache` only when size, margin or color changed.
pub fn render(
    hwnd: HWND,
    rect: Rect,
    margin: i32,
    color: Color,
    opacity: f64,
    cache: &mut Option<Halo>,
) {
    if rect.width <= 0 || rect.height <= 0 {
        return;
    }
    let key = HaloKey::new(&rect, margin, color);
    if cache.as_ref().is_none_or(|halo| halo.key != key) {
        *cache = Halo::build(key);
    }
    let Some(halo) = cache.as_ref() else {
        halo_core::log_warn!("glow 0x{:X}: no bitmap for {rect:?}", hwnd.0 as usize);
        return;
    };
    let canvas = &halo.canvas;

    let origin = POINT { x: rect.x, y: rect.y };
    let size = SIZE {
        cx: rect.width,
        cy: rect.height,
    };
    let blend = BLENDFUNCTION {
        BlendOp: AC_SRC_OVER as u8,
        SourceConstantAlpha: (opacity.clamp(0.0, 1.0) * 255.0).round() as u8,
        AlphaFormat: AC_SRC_ALPHA as u8,
        ..Default::default()
    };

    // SAFETY: the memory DC lives as long as the cached halo; the source
    // point is the bitmap's top-left corner.
    let result = unsafe {
        UpdateLayeredWindow(
            hwnd,
            None,
            Some(&origin),
            Some(&size),
            Some(canvas.mem_dc),
            Some(&POINT::default()),
            COLORREF(0),
            Some(&blend),
            ULW_ALPHA,
        )
    };
    if let Err(e) = result {
        halo_core::log_warn!("glow 0x{:X}: UpdateLayeredWindow failed: {e}", hwnd.0 as usize);
    }
}
