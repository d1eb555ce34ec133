//! The owner window: application-drawn caption bar and its interactions.
//!
//! `OwnerWindow` is the platform-agnostic model of the main window. The
//! platform host feeds it native notifications (`notify_*`) and pointer
//! input; the model drives the platform through [`Platform`] and raises
//! [`OwnerEvent`]s for listeners such as the glow overlay.

use std::collections::HashMap;
use std::rc::Rc;

use crate::color::Color;
use crate::config::{Config, MenuCommand};
use crate::dispatch::{ChromeHandle, ChromeMsg, UiDispatcher};
use crate::event::{OwnerEvent, OwnerView, WindowState};
use crate::observer::EventSource;
use crate::platform::{Platform, StyleField, SurfaceHandle, style};
use crate::rect::DipRect;

/// Inset of the main border while maximized, in device-independent units.
///
/// A maximized borderless window overhangs the monitor slightly; the inset
/// keeps the chrome decorations on screen.
pub const MAXIMIZED_INSET: f64 = 6.0;

/// A named interactive region of the chrome template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    Close,
    Maximize,
    Minimize,
    Caption,
    MainBorder,
}

impl Part {
    pub const ALL: [Self; 5] = [
        Self::Close,
        Self::Maximize,
        Self::Minimize,
        Self::Caption,
        Self::MainBorder,
    ];

    /// Template name of the region.
    pub fn name(self) -> &'static str {
        match self {
            Self::Close => "PART_Close",
            Self::Maximize => "PART_Maximize",
            Self::Minimize => "PART_Minimize",
            Self::Caption => "PART_Caption",
            Self::MainBorder => "PART_MainBorder",
        }
    }
}

/// Identifier of a concrete region inside a rendered template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartId(pub u32);

/// Resolves template region names on a ready surface.
pub trait PartLookup {
    fn find(&self, name: &str) -> Option<PartId>;
}

impl PartLookup for HashMap<String, PartId> {
    fn find(&self, name: &str) -> Option<PartId> {
        self.get(name).copied()
    }
}

/// A resolved set of template regions.
#[derive(Debug, Clone, Default)]
pub struct Template {
    parts: HashMap<String, PartId>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `part` under its template name.
    pub fn with(mut self, part: Part, id: PartId) -> Self {
        self.parts.insert(part.name().to_string(), id);
        self
    }

    /// The standard template: every region present, numbered in
    /// [`Part::ALL`] order starting at 1.
    pub fn standard() -> Self {
        Part::ALL
            .iter()
            .zip(1..)
            .fold(Self::new(), |t, (part, id)| t.with(*part, PartId(id)))
    }
}

impl PartLookup for Template {
    fn find(&self, name: &str) -> Option<PartId> {
        self.parts.find(name)
    }
}

/// Pointer button reported with a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Configurable chrome attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ChromeAttributes {
    pub caption_menu: Vec<MenuCommand>,
    pub show_caption_border: bool,
    pub can_maximize: bool,
    pub show_close_button: bool,
    pub show_minimize_button: bool,
    pub border_color: Color,
    pub glow_color: Color,
}

impl Default for ChromeAttributes {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ChromeAttributes {
    pub fn from_config(config: &Config) -> Self {
        Self {
            caption_menu: config.caption.menu.clone(),
            show_caption_border: config.caption.show_caption_border,
            can_maximize: config.caption.can_maximize,
            show_close_button: config.caption.show_close_button,
            show_minimize_button: config.caption.show_minimize_button,
            border_color: config.border_color(),
            glow_color: config.glow_color(),
        }
    }
}

type ButtonHandler = Rc<dyn Fn(&mut OwnerWindow)>;
type ClosingGuard = Box<dyn Fn(&OwnerWindow) -> bool>;

/// Behavior of the three caption buttons.
///
/// Defaults: close closes, maximize toggles, minimize minimizes. Override
/// one entry to add confirmation or logging; the default functions are
/// public so an override can still delegate to them.
#[derive(Clone)]
pub struct ChromeHandlers {
    close: ButtonHandler,
    maximize: ButtonHandler,
    minimize: ButtonHandler,
}

impl Default for ChromeHandlers {
    fn default() -> Self {
        Self {
            close: Rc::new(default_close),
            maximize: Rc::new(default_maximize),
            minimize: Rc::new(default_minimize),
        }
    }
}

impl ChromeHandlers {
    pub fn on_close(mut self, f: impl Fn(&mut OwnerWindow) + 'static) -> Self {
        self.close = Rc::new(f);
        self
    }

    pub fn on_maximize(mut self, f: impl Fn(&mut OwnerWindow) + 'static) -> Self {
        self.maximize = Rc::new(f);
        self
    }

    pub fn on_minimize(mut self, f: impl Fn(&mut OwnerWindow) + 'static) -> Self {
        self.minimize = Rc::new(f);
        self
    }
}

/// Default close action: requests a (cancelable) close.
pub fn default_close(window: &mut OwnerWindow) {
    window.close();
}

/// Default maximize action: toggles between normal and maximized.
pub fn default_maximize(window: &mut OwnerWindow) {
    window.toggle_maximized();
}

/// Default minimize action.
pub fn default_minimize(window: &mut OwnerWindow) {
    window.set_state(WindowState::Minimized);
}

#[derive(Debug, Clone, Copy, Default)]
struct BoundParts {
    close: Option<PartId>,
    maximize: Option<PartId>,
    minimize: Option<PartId>,
    caption: Option<PartId>,
    main_border: Option<PartId>,
}

/// The main, user-visible borderless window.
pub struct OwnerWindow {
    bounds: DipRect,
    state: WindowState,
    attributes: ChromeAttributes,
    inset: f64,
    surface: Option<SurfaceHandle>,
    parts: BoundParts,
    border_brush: Option<Color>,
    handlers: ChromeHandlers,
    closing_guards: Vec<ClosingGuard>,
    events: EventSource,
    dispatcher: UiDispatcher,
    platform: Rc<dyn Platform>,
    closed: bool,
}

impl OwnerWindow {
    pub fn new(bounds: DipRect, attributes: ChromeAttributes, platform: Rc<dyn Platform>) -> Self {
        Self {
            bounds,
            state: WindowState::Normal,
            attributes,
            inset: 0.0,
            surface: None,
            parts: BoundParts::default(),
            border_brush: None,
            handlers: ChromeHandlers::default(),
            closing_guards: Vec::new(),
            events: EventSource::new(),
            dispatcher: UiDispatcher::new(),
            platform,
            closed: false,
        }
    }

    /// Lifecycle event subscribers.
    pub fn events(&self) -> &EventSource {
        &self.events
    }

    pub fn attributes(&self) -> &ChromeAttributes {
        &self.attributes
    }

    pub fn caption_menu(&self) -> &[MenuCommand] {
        &self.attributes.caption_menu
    }

    /// Current inset of the main border.
    pub fn inset(&self) -> f64 {
        self.inset
    }

    /// Brush currently applied to the main border, if one is bound.
    pub fn border_brush(&self) -> Option<Color> {
        self.border_brush
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns whether `part` is bound to an interaction.
    pub fn is_bound(&self, part: Part) -> bool {
        self.bound(part).is_some()
    }

    fn bound(&self, part: Part) -> Option<PartId> {
        match part {
            Part::Close => self.parts.close,
            Part::Maximize => self.parts.maximize,
            Part::Minimize => self.parts.minimize,
            Part::Caption => self.parts.caption,
            Part::MainBorder => self.parts.main_border,
        }
    }

    pub fn set_handlers(&mut self, handlers: ChromeHandlers) {
        self.handlers = handlers;
    }

    /// Adds a guard consulted on every close request. A guard returning
    /// `true` cancels the close.
    pub fn on_closing(&mut self, guard: impl Fn(&OwnerWindow) -> bool + 'static) {
        self.closing_guards.push(Box::new(guard));
    }

    /// Binds the template regions once the platform surface exists.
    ///
    /// Missing regions leave the matching interaction unavailable.
    pub fn on_surface_ready(&mut self, surface: SurfaceHandle, template: &dyn PartLookup) {
        self.surface = Some(surface);
        self.parts = BoundParts {
            close: template.find(Part::Close.name()),
            maximize: template.find(Part::Maximize.name()),
            minimize: template.find(Part::Minimize.name()),
            caption: template.find(Part::Caption.name()),
            main_border: template.find(Part::MainBorder.name()),
        };
        for part in Part::ALL {
            if self.bound(part).is_none() {
                crate::log_debug!("owner 0x{:X}: {} not in template", surface.0, part.name());
            }
        }
        if self.parts.main_border.is_some() {
            self.border_brush = Some(self.attributes.border_color);
        }
        self.apply_maximize_capability();
    }

    // -- border color --

    /// Repaints the main border. Call on the UI thread; other threads use
    /// [`OwnerWindow::chrome_handle`].
    pub fn set_border_color(&mut self, color: Color) {
        self.attributes.border_color = color;
        if self.parts.main_border.is_some() {
            self.border_brush = Some(color);
        }
        crate::log_debug!("owner: border color {}", color.to_hex());
    }

    /// Changes the glow brush. An attached overlay picks it up the next
    /// time it queries [`OwnerView::glow_color`].
    pub fn set_glow_color(&mut self, color: Color) {
        self.attributes.glow_color = color;
        crate::log_debug!("owner: glow color {}", color.to_hex());
    }

    /// A `Send` handle for changing chrome from other threads.
    pub fn chrome_handle(&self) -> ChromeHandle {
        self.dispatcher.handle()
    }

    /// Installs the callback used to wake the host loop after a post.
    pub fn set_ui_waker(&mut self, waker: impl Fn() + Send + Sync + 'static) {
        self.dispatcher.set_waker(waker);
    }

    /// Applies chrome mutations posted from other threads, in order.
    pub fn pump_ui_queue(&mut self) -> usize {
        let msgs = self.dispatcher.drain();
        let count = msgs.len();
        for msg in msgs {
            match msg {
                ChromeMsg::BorderColor(color) => self.set_border_color(color),
                ChromeMsg::GlowColor(color) => self.set_glow_color(color),
            }
        }
        count
    }

    // -- maximize capability --

    pub fn set_can_maximize(&mut self, enabled: bool) {
        if self.attributes.can_maximize == enabled {
            return;
        }
        self.attributes.can_maximize = enabled;
        self.apply_maximize_capability();
    }

    /// Mirrors `can_maximize` into the native maximize-box style bit.
    fn apply_maximize_capability(&self) {
        let Some(surface) = self.surface else {
            return;
        };
        let result = self
            .platform
            .style_bits(surface, StyleField::Style)
            .and_then(|bits| {
                let bits = if self.attributes.can_maximize {
                    bits | style::MAXIMIZE_BOX
                } else {
                    bits & !style::MAXIMIZE_BOX
                };
                self.platform
                    .set_style_bits(surface, StyleField::Style, bits)
            });
        if let Err(e) = result {
            crate::log_warn!("owner 0x{:X}: maximize box update failed: {e}", surface.0);
        }
    }

    // -- input --

    /// Routes a pointer press on a template region.
    pub fn on_pointer_pressed(&mut self, part: PartId, button: PointerButton, click_count: u32) {
        if button != PointerButton::Primary {
            return;
        }
        if Some(part) == self.parts.caption {
            if click_count >= 2 {
                self.on_caption_double_press();
            } else {
                self.on_caption_primary_press();
            }
        } else if Some(part) == self.parts.close {
            self.on_close_activated();
        } else if Some(part) == self.parts.maximize {
            self.on_maximize_activated();
        } else if Some(part) == self.parts.minimize {
            self.on_minimize_activated();
        }
    }

    /// Starts a platform drag-move of the window.
    pub fn on_caption_primary_press(&mut self) {
        if self.closed || self.parts.caption.is_none() {
            return;
        }
        let Some(surface) = self.surface else {
            return;
        };
        if let Err(e) = self.platform.begin_drag_move(surface) {
            crate::log_warn!("owner 0x{:X}: drag move failed: {e}", surface.0);
        }
    }

    /// Toggles maximize, if maximizing is allowed.
    pub fn on_caption_double_press(&mut self) {
        if self.closed || self.parts.caption.is_none() || !self.attributes.can_maximize {
            return;
        }
        self.toggle_maximized();
    }

    pub fn on_close_activated(&mut self) {
        if self.parts.close.is_none() || !self.attributes.show_close_button {
            return;
        }
        let handler = Rc::clone(&self.handlers.close);
        handler(self);
    }

    pub fn on_maximize_activated(&mut self) {
        if self.parts.maximize.is_none() || !self.attributes.can_maximize {
            return;
        }
        let handler = Rc::clone(&self.handlers.maximize);
        handler(self);
    }

    pub fn on_minimize_activated(&mut self) {
        if self.parts.minimize.is_none() || !self.attributes.show_minimize_button {
            return;
        }
        let handler = Rc::clone(&self.handlers.minimize);
        handler(self);
    }

    // -- state --

    pub fn toggle_maximized(&mut self) {
        if self.state == WindowState::Maximized {
            self.set_state(WindowState::Normal);
        } else {
            self.set_state(WindowState::Maximized);
        }
    }

    /// Asks the platform for a state change, then records it.
    pub fn set_state(&mut self, state: WindowState) {
        if self.closed || self.state == state {
            return;
        }
        if let Some(surface) = self.surface
            && let Err(e) = self.platform.apply_state(surface, state)
        {
            crate::log_warn!("owner 0x{:X}: apply {state:?} failed: {e}", surface.0);
            return;
        }
        self.notify_state_changed(state);
    }

    /// Records a native move and notifies listeners.
    pub fn notify_moved(&mut self, left: f64, top: f64) {
        if self.closed || (self.bounds.left == left && self.bounds.top == top) {
            return;
        }
        self.bounds.left = left;
        self.bounds.top = top;
        self.emit(OwnerEvent::Moved);
    }

    /// Records a native resize and notifies listeners.
    pub fn notify_resized(&mut self, width: f64, height: f64) {
        if self.closed || (self.bounds.width == width && self.bounds.height == height) {
            return;
        }
        self.bounds.width = width;
        self.bounds.height = height;
        self.emit(OwnerEvent::Resized);
    }

    /// Records a native state change and notifies listeners.
    ///
    /// The border inset follows the state: nonzero while maximized, zero
    /// when normal, unchanged while minimized.
    pub fn notify_state_changed(&mut self, state: WindowState) {
        if self.closed || self.state == state {
            return;
        }
        self.state = state;
        match state {
            WindowState::Maximized => self.inset = MAXIMIZED_INSET,
            WindowState::Normal => self.inset = 0.0,
            WindowState::Minimized => {}
        }
        crate::log_debug!("owner state -> {state:?}");
        self.emit(OwnerEvent::StateChanged(state));
    }

    /// Requests a close. Closing guards may cancel it; listeners are told
    /// the final outcome before teardown. Returns whether the window closed.
    pub fn close(&mut self) -> bool {
        if self.closed {
            return true;
        }
        let cancelled = self.closing_guards.iter().any(|guard| guard(self));
        self.emit(OwnerEvent::Closing { cancelled });
        if cancelled {
            crate::log_info!("owner close cancelled");
            return false;
        }

        self.closed = true;
        if let Some(surface) = self.surface
            && let Err(e) = self.platform.close_surface(surface)
        {
            crate::log_warn!("owner 0x{:X}: close failed: {e}", surface.0);
        }
        crate::log_info!("owner closed");
        true
    }

    fn emit(&self, event: OwnerEvent) {
        self.events.emit(&event, self);
    }
}

impl OwnerView for OwnerWindow {
    fn bounds(&self) -> DipRect {
        self.bounds
    }

    fn state(&self) -> WindowState {
        self.state
    }

    fn glow_color(&self) -> Color {
        self.attributes.glow_color
    }

    fn surface(&self) -> Option<SurfaceHandle> {
        self.surface
    }
}

#[cfg(test)]
#[path = "owner_tests.rs"]
mod tests;
