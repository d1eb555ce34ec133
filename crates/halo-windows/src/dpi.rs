use windows::Win32::Foundation::HWND;
use windows::Win32::UI::HiDpi::{
    DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, GetDpiForWindow, SetProcessDpiAwarenessContext,
};

/// Baseline DPI at which one device-independent unit is one pixel.
const BASE_DPI: f64 = 96.0;

/// Declares this process as per-monitor DPI aware (V2).
///
/// Without this, Windows bitmap-stretches our windows on high-DPI
/// monitors and the glow margin no longer lines up with the owner.
///
/// Must be called once at process startup, before creating any windows.
pub fn enable_dpi_awareness() {
    // SAFETY: SetProcessDpiAwarenessContext is safe to call once at startup.
    // If it fails (e.g. already set via manifest), we ignore the error.
    unsafe {
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }
}

/// Device pixels per device-independent unit for the monitor `hwnd` is on.
///
/// Returns 0.0 for an invalid window; callers normalize that to 1.0.
pub fn scale_factor(hwnd: HWND) -> f64 {
    // SAFETY: GetDpiForWindow only reads; it returns 0 for a bad handle.
    let dpi = unsafe { GetDpiForWindow(hwnd) };
    f64::from(dpi) / BASE_DPI
}
