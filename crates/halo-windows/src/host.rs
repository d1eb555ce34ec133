//! A demo chrome window with its glow, driven by a Win32 message pump.
//!
//! All chrome state lives in a thread-local [`Host`]. The window
//! procedure only ever *tries* to borrow it: platform calls made while a
//! handler runs (`ShowWindow`, `SetWindowPos`, `DestroyWindow`) send
//! nested messages synchronously, and those fall through to
//! `DefWindowProcW`. Each handler resyncs geometry from the window
//! afterwards, so nothing is lost.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;
use std::thread;
use std::time::{Duration, Instant};

use halo_core::config::{Config, MenuCommand};
use halo_core::geometry::{normalize_scale, to_device};
use halo_core::owner::PartLookup;
use halo_core::{
    ChromeSession, Color, DipRect, Platform, PointerButton, Rect, Template, WindowResult,
    WindowState,
};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, POINT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{ClientToScreen, RDW_INVALIDATE, RedrawWindow};
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CS_DBLCLKS, CS_HREDRAW, CS_VREDRAW, CreatePopupMenu, CreateWindowExW,
    DefWindowProcW, DestroyMenu, DispatchMessageW, GetClientRect, GetMessageW, GetWindowRect,
    HTBOTTOM, HTBOTTOMLEFT, HTBOTTOMRIGHT, HTCLIENT, HTLEFT, HTRIGHT, HTTOP, HTTOPLEFT,
    HTTOPRIGHT, IDC_ARROW, IsIconic, IsZoomed, KillTimer, LoadCursorW, MF_STRING, MSG,
    PostMessageW, PostQuitMessage, RegisterClassW, SW_SHOW, SWP_NOACTIVATE, SWP_NOZORDER,
    SetTimer, SetWindowPos, ShowWindow, TPM_RETURNCMD, TPM_RIGHTBUTTON, TrackPopupMenuEx,
    TranslateMessage, WINDOW_EX_STYLE, WM_ACTIVATE, WM_APP, WM_CLOSE, WM_DESTROY, WM_DPICHANGED,
    WM_ERASEBKGND, WM_LBUTTONDBLCLK, WM_LBUTTONDOWN, WM_NCCALCSIZE, WM_NCHITTEST, WM_PAINT,
    WM_RBUTTONDOWN, WM_RBUTTONUP, WM_TIMER, WM_WINDOWPOSCHANGED, WNDCLASSW, WS_CLIPCHILDREN,
    WS_CLIPSIBLINGS, WS_MINIMIZEBOX, WS_POPUP, WS_SYSMENU, WS_THICKFRAME,
};
use windows::core::{PCWSTR, w};

use crate::chrome::{self, Layout};
use crate::platform::{self, Win32Platform};
use crate::{dpi, glow_surface};

const SETTLE_TIMER: usize = 1;
const WM_APP_WAKE: u32 = WM_APP + 1;

/// Initial placement of the demo window, in device-independent units.
const INITIAL_BOUNDS: DipRect = DipRect {
    left: 160.0,
    top: 120.0,
    width: 960.0,
    height: 600.0,
};
/// Width of the invisible resize band along each edge.
const RESIZE_GRIP: f64 = 6.0;

/// Colors cycled by [`RunOptions::cycle_border`]. The glow runs one
/// step ahead of the border.
const PALETTE: [Color; 4] = [
    Color::rgb(0x3c, 0x8c, 0xe7),
    Color::rgb(0xe7, 0x6f, 0x3c),
    Color::rgb(0x4f, 0xb2, 0x86),
    Color::rgb(0x2d, 0x2d, 0x30),
];

static REGISTER_CLASS: Once = Once::new();
const CLASS_NAME: PCWSTR = w!("HaloOwner");

/// Options for [`run`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Window title shown in the taskbar.
    pub title: String,
    /// When set, a background thread recolors the border and glow on
    /// this period.
    pub cycle_border: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            title: "Halo".into(),
            cycle_border: None,
        }
    }
}

struct Host {
    session: ChromeSession,
    template: Template,
    owner_hwnd: HWND,
}

thread_local! {
    static HOST: RefCell<Option<Host>> = const { RefCell::new(None) };
}

/// Runs `f` on the host unless a handler further up the stack holds it.
fn with_host<R>(f: impl FnOnce(&mut Host) -> R) -> Option<R> {
    HOST.with(|cell| {
        let mut slot = cell.try_borrow_mut().ok()?;
        slot.as_mut().map(f)
    })
}

fn ensure_class_registered() {
    REGISTER_CLASS.call_once(|| {
        let wc = WNDCLASSW {
            style: CS_DBLCLKS | CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(owner_wnd_proc),
            hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default(),
            lpszClassName: CLASS_NAME,
            ..Default::default()
        };
        // SAFETY: `wc` points at a static class name and a valid wndproc.
        unsafe {
            RegisterClassW(&wc);
        }
    });
}

/// Opens the demo window and pumps messages until it closes.
pub fn run(config: &Config, options: &RunOptions) -> WindowResult<()> {
    dpi::enable_dpi_awareness();
    ensure_class_registered();

    let owner_hwnd = create_owner_window(&options.title)?;
    let scale = normalize_scale(dpi::scale_factor(owner_hwnd));
    let px = |dip: f64| to_device(dip, scale);
    // SAFETY: positioning our own, still hidden window.
    unsafe {
        SetWindowPos(
            owner_hwnd,
            None,
            px(INITIAL_BOUNDS.left),
            px(INITIAL_BOUNDS.top),
            px(INITIAL_BOUNDS.width),
            px(INITIAL_BOUNDS.height),
            SWP_NOZORDER | SWP_NOACTIVATE,
        )?;
    }

    let platform = Rc::new(Win32Platform::new());
    let bounds = DipRect::from_device(&window_rect(owner_hwnd)?, scale);
    let mut session = ChromeSession::new(config, bounds, Rc::clone(&platform) as Rc<dyn Platform>);
    let template = Template::standard();

    let owner = session.owner_mut();
    owner.on_surface_ready(platform::surface(owner_hwnd), &template);
    let raw = owner_hwnd.0 as usize;
    owner.set_ui_waker(move || {
        // SAFETY: PostMessageW is thread-safe; a stale handle just fails.
        unsafe {
            let _ = PostMessageW(
                Some(HWND(raw as *mut _)),
                WM_APP_WAKE,
                WPARAM(0),
                LPARAM(0),
            );
        }
    });

    if let Some(glow) = session.glow() {
        let glow_hwnd = glow_surface::create()?;
        let surface = platform::surface(glow_hwnd);
        platform.register_glow(surface, config.glow.margin);
        glow.borrow_mut().on_surface_ready(surface, session.owner());
    }

    if let Some(period) = options.cycle_border {
        let handle = session.owner().chrome_handle();
        thread::spawn(move || {
            for step in (0..PALETTE.len()).cycle() {
                thread::sleep(period);
                let glow = PALETTE[(step + 1) % PALETTE.len()];
                if !handle.set_border_color(PALETTE[step]) || !handle.set_glow_color(glow) {
                    break;
                }
            }
        });
    }

    HOST.with(|cell| {
        *cell.borrow_mut() = Some(Host {
            session,
            template,
            owner_hwnd,
        });
    });
    halo_core::log_info!("host: owner 0x{:X} shown", raw);

    // SAFETY: showing our own window; nested messages see the host.
    unsafe {
        let _ = ShowWindow(owner_hwnd, SW_SHOW);
    }

    let mut msg = MSG::default();
    // SAFETY: standard message pump on the thread that owns the windows.
    while unsafe { GetMessageW(&mut msg, None, 0, 0).as_bool() } {
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    HOST.with(|cell| cell.replace(None));
    halo_core::log_info!("host: message loop ended");
    Ok(())
}

fn create_owner_window(title: &str) -> WindowResult<HWND> {
    let title: Vec<u16> = title.encode_utf16().chain(std::iter::once(0)).collect();
    let style = WS_POPUP
        | WS_THICKFRAME
        | WS_SYSMENU
        | WS_MINIMIZEBOX
        | WS_CLIPCHILDREN
        | WS_CLIPSIBLINGS;

    // SAFETY: the class is registered and `title` is NUL-terminated and
    // outlives the call.
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            CLASS_NAME,
            PCWSTR(title.as_ptr()),
            style,
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
    Ok(hwnd)
}

unsafe extern "system" fn owner_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        // The whole window is client area; the chrome is ours to draw.
        WM_NCCALCSIZE if wparam.0 != 0 => return LRESULT(0),
        WM_NCHITTEST => return resize_hit_test(hwnd, lparam),
        WM_DESTROY => {
            unsafe { PostQuitMessage(0) };
            return LRESULT(0);
        }
        WM_RBUTTONUP => {
            // Tracked outside the host: the menu runs its own modal loop.
            if let Some(Some(menu)) = with_host(|host| host.caption_menu_at(lparam)) {
                show_caption_menu(hwnd, lparam, &menu);
                return LRESULT(0);
            }
        }
        _ => {}
    }

    if let Some(Some(result)) = with_host(|host| host.handle(msg, wparam, lparam)) {
        return result;
    }
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

impl Host {
    fn handle(&mut self, msg: u32, wparam: WPARAM, lparam: LPARAM) -> Option<LRESULT> {
        let result = match msg {
            WM_WINDOWPOSCHANGED => {
                self.sync();
                // Let DefWindowProcW derive WM_MOVE / WM_SIZE.
                None
            }
            WM_ACTIVATE => {
                if let Some(glow) = self.session.glow() {
                    glow.borrow_mut().on_activated(self.session.owner());
                }
                None
            }
            WM_PAINT => {
                chrome::paint(self.owner_hwnd, &self.layout(), self.session.owner());
                Some(LRESULT(0))
            }
            WM_ERASEBKGND => Some(LRESULT(1)),
            WM_LBUTTONDOWN => {
                self.press(lparam, PointerButton::Primary, 1);
                Some(LRESULT(0))
            }
            WM_LBUTTONDBLCLK => {
                self.press(lparam, PointerButton::Primary, 2);
                Some(LRESULT(0))
            }
            WM_RBUTTONDOWN => {
                self.press(lparam, PointerButton::Secondary, 1);
                Some(LRESULT(0))
            }
            WM_CLOSE => {
                self.session.owner_mut().close();
                Some(LRESULT(0))
            }
            WM_TIMER if wparam.0 == SETTLE_TIMER => {
                // SAFETY: killing our own timer.
                unsafe {
                    let _ = KillTimer(Some(self.owner_hwnd), SETTLE_TIMER);
                }
                self.tick();
                Some(LRESULT(0))
            }
            WM_APP_WAKE => {
                self.tick();
                Some(LRESULT(0))
            }
            WM_DPICHANGED => {
                self.apply_dpi_change(lparam);
                Some(LRESULT(0))
            }
            _ => None,
        };
        // Unclaimed messages schedule work too (a native restore arrives
        // as WM_WINDOWPOSCHANGED).
        self.arm_timer();
        result
    }

    fn closed(&self) -> bool {
        self.session.owner().is_closed()
    }

    /// Current chrome layout in client pixels.
    fn layout(&self) -> Layout {
        let mut rc = RECT::default();
        // SAFETY: GetClientRect only reads.
        let _ = unsafe { GetClientRect(self.owner_hwnd, &mut rc) };
        let owner = self.session.owner();
        Layout::new(
            rc.right - rc.left,
            rc.bottom - rc.top,
            normalize_scale(dpi::scale_factor(self.owner_hwnd)),
            owner.inset(),
            owner.attributes(),
        )
    }

    fn press(&mut self, lparam: LPARAM, button: PointerButton, click_count: u32) {
        let (x, y) = point(lparam);
        let Some(part) = self.layout().hit(x, y) else {
            return;
        };
        let Some(id) = self.template.find(part.name()) else {
            return;
        };
        self.session
            .owner_mut()
            .on_pointer_pressed(id, button, click_count);
        self.sync();
        self.redraw();
    }

    fn caption_menu_at(&self, lparam: LPARAM) -> Option<Vec<MenuCommand>> {
        let (x, y) = point(lparam);
        let menu = self.session.owner().caption_menu();
        (self.layout().hit(x, y) == Some(halo_core::Part::Caption) && !menu.is_empty())
            .then(|| menu.to_vec())
    }

    /// Pulls state and bounds from the native window into the owner.
    fn sync(&mut self) {
        if self.closed() {
            return;
        }
        let hwnd = self.owner_hwnd;
        // SAFETY: IsIconic/IsZoomed only read.
        let state = unsafe {
            if IsIconic(hwnd).as_bool() {
                WindowState::Minimized
            } else if IsZoomed(hwnd).as_bool() {
                WindowState::Maximized
            } else {
                WindowState::Normal
            }
        };
        let owner = self.session.owner_mut();
        owner.notify_state_changed(state);
        if state == WindowState::Minimized {
            return;
        }
        let Ok(rect) = window_rect(hwnd) else {
            return;
        };
        let bounds = DipRect::from_device(&rect, dpi::scale_factor(hwnd));
        owner.notify_moved(bounds.left, bounds.top);
        owner.notify_resized(bounds.width, bounds.height);
    }

    fn tick(&mut self) {
        let (posted, ran) = self.session.tick(Instant::now());
        if ran > 0 {
            halo_core::log_debug!("host: ran {ran} deferred task(s)");
        }
        if posted > 0 {
            self.redraw();
        }
    }

    fn arm_timer(&self) {
        if self.closed() {
            return;
        }
        let Some(ms) = timer_period(self.session.next_wake(Instant::now())) else {
            return;
        };
        // SAFETY: re-arming replaces any pending timer with the same id.
        unsafe {
            SetTimer(Some(self.owner_hwnd), SETTLE_TIMER, ms, None);
        }
    }

    fn apply_dpi_change(&mut self, lparam: LPARAM) {
        // SAFETY: for WM_DPICHANGED, lparam points to the suggested RECT.
        let suggested = unsafe { *(lparam.0 as *const RECT) };
        unsafe {
            let _ = SetWindowPos(
                self.owner_hwnd,
                None,
                suggested.left,
                suggested.top,
                suggested.right - suggested.left,
                suggested.bottom - suggested.top,
                SWP_NOZORDER | SWP_NOACTIVATE,
            );
        }
        self.sync();
        self.redraw();
    }

    fn redraw(&self) {
        if self.closed() {
            return;
        }
        // SAFETY: invalidation only queues a WM_PAINT.
        unsafe {
            let _ = RedrawWindow(Some(self.owner_hwnd), None, None, RDW_INVALIDATE);
        }
    }
}

fn show_caption_menu(hwnd: HWND, lparam: LPARAM, commands: &[MenuCommand]) {
    let (x, y) = point(lparam);
    let mut pt = POINT { x, y };

    // SAFETY: the menu is created, tracked and destroyed on this thread.
    unsafe {
        let _ = ClientToScreen(hwnd, &mut pt);
        let Ok(menu) = CreatePopupMenu() else {
            return;
        };
        let labels: Vec<Vec<u16>> = commands
            .iter()
            .map(|c| c.label.encode_utf16().chain(std::iter::once(0)).collect())
            .collect();
        for (i, label) in labels.iter().enumerate() {
            let _ = AppendMenuW(menu, MF_STRING, i + 1, PCWSTR(label.as_ptr()));
        }
        let picked = TrackPopupMenuEx(
            menu,
            (TPM_RETURNCMD | TPM_RIGHTBUTTON).0,
            pt.x,
            pt.y,
            hwnd,
            None,
        );
        let _ = DestroyMenu(menu);

        let chosen = usize::try_from(picked.0)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| commands.get(i));
        if let Some(command) = chosen {
            halo_core::log_info!("caption menu: {}", command.id);
        }
    }
}

/// Resize bands along the window edges; everything else is client.
fn resize_hit_test(hwnd: HWND, lparam: LPARAM) -> LRESULT {
    let client = LRESULT(HTCLIENT as isize);
    // SAFETY: IsZoomed only reads.
    if unsafe { IsZoomed(hwnd).as_bool() } {
        return client;
    }
    let Ok(r) = window_rect(hwnd) else {
        return client;
    };
    let (x, y) = point(lparam);
    let grip = (RESIZE_GRIP * normalize_scale(dpi::scale_factor(hwnd))) as i32;

    let left = x < r.x + grip;
    let right = x >= r.x + r.width - grip;
    let top = y < r.y + grip;
    let bottom = y >= r.y + r.height - grip;

    let hit = match (top, bottom, left, right) {
        (true, _, true, _) => HTTOPLEFT,
        (true, _, _, true) => HTTOPRIGHT,
        (_, true, true, _) => HTBOTTOMLEFT,
        (_, true, _, true) => HTBOTTOMRIGHT,
        (true, ..) => HTTOP,
        (_, true, ..) => HTBOTTOM,
        (_, _, true, _) => HTLEFT,
        (_, _, _, true) => HTRIGHT,
        _ => return client,
    };
    LRESULT(hit as isize)
}

fn window_rect(hwnd: HWND) -> WindowResult<Rect> {
    let mut rc = RECT::default();
    // SAFETY: GetWindowRect only reads.
    unsafe { GetWindowRect(hwnd, &mut rc)? };
    Ok(Rect::new(
        rc.left,
        rc.top,
        rc.right - rc.left,
        rc.bottom - rc.top,
    ))
}

/// Signed coordinates packed into a mouse message's `LPARAM`.
fn point(lparam: LPARAM) -> (i32, i32) {
    let x = (lparam.0 & 0xFFFF) as u16 as i16;
    let y = ((lparam.0 >> 16) & 0xFFFF) as u16 as i16;
    (i32::from(x), i32::from(y))
}

/// `SetTimer` period for the next deferred task, at least one millisecond.
fn timer_period(wait: Option<Duration>) -> Option<u32> {
    wait.map(|w| w.as_millis().clamp(1, u128::from(u32::MAX)) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_period_rounds_up_to_one_millisecond() {
        assert_eq!(timer_period(None), None);
        assert_eq!(timer_period(Some(Duration::ZERO)), Some(1));
        assert_eq!(timer_period(Some(Duration::from_millis(150))), Some(150));
        assert_eq!(timer_period(Some(Duration::from_secs(u64::MAX))), Some(u32::MAX));
    }

    #[test]
    fn point_sign_extends_both_coordinates() {
        let packed = LPARAM(((-5i16 as u16 as isize) << 16) | (-3i16 as u16 as isize));

        assert_eq!(point(packed), (-3, -5));
    }
}
