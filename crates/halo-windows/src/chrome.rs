//! Layout and painting of the owner window's custom chrome.
//!
//! The template is drawn by hand: a caption band across the top with the
//! close, maximize and minimize buttons at its right end, and a one-pixel
//! main border around the client area.

use halo_core::{ChromeAttributes, Color, OwnerView, OwnerWindow, Part, Rect, WindowState};
use windows::Win32::Foundation::{COLORREF, HWND, RECT};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, CreateSolidBrush, DT_CENTER, DT_SINGLELINE, DT_VCENTER, DeleteObject, DrawTextW,
    EndPaint, FillRect, FrameRect, HDC, PAINTSTRUCT, SetBkMode, SetTextColor, TRANSPARENT,
};

/// Caption band height, in device-independent units.
pub const CAPTION_HEIGHT: f64 = 32.0;
/// Width of one caption button, in device-independent units.
pub const BUTTON_WIDTH: f64 = 46.0;

const BACKGROUND: Color = Color::rgb(0x1e, 0x1e, 0x1e);
const CAPTION: Color = Color::rgb(0x25, 0x25, 0x26);
const GLYPH: Color = Color::rgb(0xcc, 0xcc, 0xcc);

/// Device-pixel rectangles of every visible template part.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub border: Rect,
    pub caption: Rect,
    pub close: Option<Rect>,
    pub maximize: Option<Rect>,
    pub minimize: Option<Rect>,
}

impl Layout {
    /// Lays out chrome in a client area of `width` by `height` pixels.
    ///
    /// `inset` (device-independent) pulls everything in from the edges,
    /// which keeps the chrome on screen while maximized.
    pub fn new(width: i32, height: i32, scale: f64, inset: f64, attrs: &ChromeAttributes) -> Self {
        let px = |dip: f64| (dip * scale) as i32;
        let inset = px(inset);
        let border = Rect::new(inset, inset, width - 2 * inset, height - 2 * inset);
        let caption = Rect::new(border.x, border.y, border.width, px(CAPTION_HEIGHT));

        let button_w = px(BUTTON_WIDTH);
        let mut right = caption.x + caption.width;
        let mut next_button = |visible: bool| {
            if !visible {
                return None;
            }
            right -= button_w;
            Some(Rect::new(right, caption.y, button_w, caption.height))
        };
        let close = next_button(attrs.show_close_button);
        let maximize = next_button(attrs.can_maximize);
        let minimize = next_button(attrs.show_minimize_button);

        Self {
            border,
            caption,
            close,
            maximize,
            minimize,
        }
    }

    /// The template part under client point (`x`, `y`), if any.
    ///
    /// Buttons win over the caption, the caption over the border.
    pub fn hit(&self, x: i32, y: i32) -> Option<Part> {
        let buttons = [
            (Part::Close, self.close),
            (Part::Maximize, self.maximize),
            (Part::Minimize, self.minimize),
        ];
        for (part, rect) in buttons {
            if rect.is_some_and(|r| contains(&r, x, y)) {
                return Some(part);
            }
        }
        if contains(&self.caption, x, y) {
            return Some(Part::Caption);
        }
        let b = &self.border;
        let on_edge = contains(b, x, y)
            && (x == b.x || y == b.y || x == b.x + b.width - 1 || y == b.y + b.height - 1);
        on_edge.then_some(Part::MainBorder)
    }
}

fn contains(r: &Rect, x: i32, y: i32) -> bool {
    x >= r.x && y >= r.y && x < r.x + r.width && y < r.y + r.height
}

fn colorref(c: Color) -> COLORREF {
    COLORREF(u32::from(c.r) | (u32::from(c.g) << 8) | (u32::from(c.b) << 16))
}

fn from_win_rect(r: &RECT) -> Rect {
    Rect::new(r.left, r.top, r.right - r.left, r.bottom - r.top)
}

fn win_rect(r: &Rect) -> RECT {
    RECT {
        left: r.x,
        top: r.y,
        right: r.x + r.width,
        bottom: r.y + r.height,
    }
}

/// # Safety
/// `hdc` must be a valid device context for the duration of the call.
unsafe fn fill(hdc: HDC, rect: &Rect, color: Color) {
    // SAFETY: the brush is created and deleted here; `hdc` per contract.
    unsafe {
        let brush = CreateSolidBrush(colorref(color));
        FillRect(hdc, &win_rect(rect), brush);
        let _ = DeleteObject(brush.into());
    }
}

/// # Safety
/// Same contract as [`fill`].
unsafe fn frame(hdc: HDC, rect: &Rect, color: Color) {
    // SAFETY: as in `fill`.
    unsafe {
        let brush = CreateSolidBrush(colorref(color));
        FrameRect(hdc, &win_rect(rect), brush);
        let _ = DeleteObject(brush.into());
    }
}

/// # Safety
/// Same contract as [`fill`].
unsafe fn glyph(hdc: HDC, rect: &Rect, text: &str) {
    let mut wide: Vec<u16> = text.encode_utf16().collect();
    let mut rc = win_rect(rect);
    // SAFETY: `wide` and `rc` are live locals; `hdc` per contract.
    unsafe {
        DrawTextW(hdc, &mut wide, &mut rc, DT_CENTER | DT_VCENTER | DT_SINGLELINE);
    }
}

/// Handles `WM_PAINT` for the owner window.
pub fn paint(hwnd: HWND, layout: &Layout, owner: &OwnerWindow) {
    let attrs = owner.attributes();
    let mut ps = PAINTSTRUCT::default();

    // SAFETY: BeginPaint/EndPaint bracket all drawing on this HDC.
    unsafe {
        let hdc = BeginPaint(hwnd, &mut ps);

        fill(hdc, &from_win_rect(&ps.rcPaint), BACKGROUND);
        fill(hdc, &layout.caption, CAPTION);
        if attrs.show_caption_border {
            let line = Rect::new(
                layout.caption.x,
                layout.caption.y + layout.caption.height - 1,
                layout.caption.width,
                1,
            );
            fill(hdc, &line, attrs.border_color);
        }

        SetBkMode(hdc, TRANSPARENT);
        SetTextColor(hdc, colorref(GLYPH));
        if let Some(r) = layout.close {
            glyph(hdc, &r, "\u{2715}");
        }
        if let Some(r) = layout.maximize {
            let icon = if owner.state() == WindowState::Maximized { "\u{2750}" } else { "\u{25A1}" };
            glyph(hdc, &r, icon);
        }
        if let Some(r) = layout.minimize {
            glyph(hdc, &r, "\u{2014}");
        }

        if let Some(brush) = owner.border_brush() {
            frame(hdc, &layout.border, brush);
        }

        let _ = EndPaint(hwnd, &ps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> ChromeAttributes {
        ChromeAttributes::default()
    }

    #[test]
    fn buttons_stack_from_the_right() {
        // Act
        let layout = Layout::new(800, 600, 1.0, 0.0, &attrs());

        // Assert
        assert_eq!(layout.close, Some(Rect::new(754, 0, 46, 32)));
        assert_eq!(layout.maximize, Some(Rect::new(708, 0, 46, 32)));
        assert_eq!(layout.minimize, Some(Rect::new(662, 0, 46, 32)));
    }

    #[test]
    fn hidden_buttons_leave_no_gap() {
        let mut attrs = attrs();
        attrs.can_maximize = false;

        let layout = Layout::new(800, 600, 1.0, 0.0, &attrs);

        assert_eq!(layout.maximize, None);
        assert_eq!(layout.minimize, Some(Rect::new(708, 0, 46, 32)));
    }

    #[test]
    fn hit_prefers_buttons_then_caption_then_border() {
        let layout = Layout::new(800, 600, 1.0, 0.0, &attrs());

        assert_eq!(layout.hit(780, 10), Some(Part::Close));
        assert_eq!(layout.hit(700, 10), Some(Part::Minimize));
        assert_eq!(layout.hit(100, 10), Some(Part::Caption));
        assert_eq!(layout.hit(0, 300), Some(Part::MainBorder));
        assert_eq!(layout.hit(400, 300), None);
    }

    #[test]
    fn layout_scales_and_honors_inset() {
        // Arrange: maximized on a 150% monitor.
        let layout = Layout::new(1000, 800, 1.5, 6.0, &attrs());

        // Assert
        assert_eq!(layout.border, Rect::new(9, 9, 982, 782));
        assert_eq!(layout.caption.height, 48);
        assert_eq!(layout.close, Some(Rect::new(922, 9, 69, 48)));
        assert_eq!(layout.hit(5, 5), None);
    }

    #[test]
    fn colorref_is_bgr() {
        assert_eq!(colorref(Color::rgb(0x11, 0x22, 0x33)), COLORREF(0x0033_2211));
    }
}
