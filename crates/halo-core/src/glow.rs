//! The glow overlay: a decorative halo window that tracks its owner.
//!
//! The overlay is a borderless, click-through, non-activatable surface
//! kept a fixed margin outside the owner and immediately behind it in
//! z-order. It reacts only to owner events:
//!
//! | Owner event           | Reaction                                         |
//! |-----------------------|--------------------------------------------------|
//! | moved                 | recompute position, reassert z-order              |
//! | resized               | recompute size, reassert z-order (not collapsed)  |
//! | minimized / maximized | collapse to zero size, opacity 0                  |
//! | restored              | recompute, refill, reveal after the settle delay  |
//! | closing (cancelled)   | nothing                                           |
//! | closing               | detach from all four events once, close surface   |
//!
//! The overlay holds only a weak handle to the owner's event list, never
//! the owner itself, and reads owner state through the [`OwnerView`]
//! passed with each event.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::color::Color;
use crate::config::GlowConfig;
use crate::deferred::{DeferredQueue, TaskId};
use crate::event::{OwnerEvent, OwnerEventKind, OwnerView, WindowState};
use crate::geometry::{self, GLOW_MARGIN};
use crate::observer::{ListenerKey, WeakEventSource};
use crate::owner::OwnerWindow;
use crate::platform::{Placement, Platform, StyleField, SurfaceHandle, style};
use crate::rect::Rect;

/// Where the overlay is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Attached to the owner, no platform surface yet.
    Pending,
    /// Visible and following the owner.
    Tracking,
    /// Owner minimized or maximized: zero size, fully transparent.
    Collapsed,
    /// Owner restored; waiting out the settle delay before showing.
    Revealing,
    /// Detached and closed. Terminal.
    Closed,
}

/// Tunables for the overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowSettings {
    /// Outward margin, in device-independent units.
    pub margin: f64,
    /// Wait after a restore before the glow reappears.
    pub settle_delay: Duration,
}

impl Default for GlowSettings {
    fn default() -> Self {
        Self {
            margin: GLOW_MARGIN,
            settle_delay: Duration::from_millis(crate::config::DEFAULT_SETTLE_MS),
        }
    }
}

impl GlowSettings {
    pub fn from_config(config: &GlowConfig) -> Self {
        Self {
            margin: config.margin,
            settle_delay: Duration::from_millis(config.settle_ms),
        }
    }
}

/// The decorative halo window.
pub struct GlowOverlay {
    key: ListenerKey,
    owner: WeakEventSource,
    owner_surface: Option<SurfaceHandle>,
    surface: Option<SurfaceHandle>,
    target: Rect,
    opacity: f64,
    phase: Phase,
    detached: bool,
    fill: Option<Color>,
    settings: GlowSettings,
    platform: Rc<dyn Platform>,
    deferred: Rc<DeferredQueue>,
    pending_reveal: Option<TaskId>,
    this: Weak<RefCell<GlowOverlay>>,
}

impl GlowOverlay {
    /// Creates an overlay for `owner` and subscribes it to the owner's
    /// moved, resized, state-changed and closing events.
    pub fn attach(
        owner: &OwnerWindow,
        platform: Rc<dyn Platform>,
        deferred: Rc<DeferredQueue>,
        settings: GlowSettings,
    ) -> Rc<RefCell<Self>> {
        let overlay = Rc::new_cyclic(|this| {
            RefCell::new(Self {
                key: ListenerKey::next(),
                owner: owner.events().downgrade(),
                owner_surface: owner.surface(),
                surface: None,
                target: Rect::default(),
                opacity: 0.0,
                phase: Phase::Pending,
                detached: false,
                fill: None,
                settings,
                platform,
                deferred,
                pending_reveal: None,
                this: this.clone(),
            })
        });

        let key = {
            let mut o = overlay.borrow_mut();
            o.recompute_position(owner);
            o.recompute_size(owner);
            o.key
        };

        for kind in OwnerEventKind::ALL {
            let weak = Rc::downgrade(&overlay);
            owner.events().subscribe(
                key,
                kind,
                Rc::new(move |event: &OwnerEvent, view: &dyn OwnerView| {
                    let Some(overlay) = weak.upgrade() else {
                        return;
                    };
                    let Ok(mut overlay) = overlay.try_borrow_mut() else {
                        crate::log_warn!("glow: re-entrant {event:?} dropped");
                        return;
                    };
                    overlay.handle(event, view);
                }),
            );
        }
        overlay
    }

    pub fn key(&self) -> ListenerKey {
        self.key
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Cached target geometry in device pixels.
    pub fn target(&self) -> Rect {
        self.target
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn surface(&self) -> Option<SurfaceHandle> {
        self.surface
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Returns whether a restore reveal is waiting on the deferred queue.
    pub fn is_reveal_pending(&self) -> bool {
        self.pending_reveal
            .is_some_and(|id| self.deferred.is_pending(id))
    }

    /// Current glow color, read from the owner on every query. A change
    /// is pushed to the platform fill.
    pub fn glow_color(&mut self, owner: &dyn OwnerView) -> Color {
        let color = owner.glow_color();
        if !self.detached && self.fill != Some(color) {
            self.apply_fill(color);
        }
        color
    }

    fn handle(&mut self, event: &OwnerEvent, owner: &dyn OwnerView) {
        if self.detached {
            return;
        }
        if let Some(surface) = owner.surface() {
            self.owner_surface = Some(surface);
        }
        match *event {
            OwnerEvent::Moved => self.on_owner_moved(owner),
            OwnerEvent::Resized => self.on_owner_resized(owner),
            OwnerEvent::StateChanged(state) => self.on_owner_state_changed(state, owner),
            OwnerEvent::Closing { cancelled } => self.on_owner_closing(cancelled),
        }
    }

    // -- surface lifecycle --

    /// Configures the freshly created platform surface and shows it
    /// behind the owner. Only the first call has an effect.
    pub fn on_surface_ready(&mut self, surface: SurfaceHandle, owner: &dyn OwnerView) {
        if self.phase != Phase::Pending {
            crate::log_debug!("glow: surface ready ignored in {:?}", self.phase);
            return;
        }
        self.surface = Some(surface);
        if let Some(owner_surface) = owner.surface() {
            self.owner_surface = Some(owner_surface);
        }

        self.recompute_position(owner);
        self.recompute_size(owner);
        self.configure_surface(surface);
        self.glow_color(owner);

        match owner.state() {
            WindowState::Normal => {
                self.phase = Phase::Tracking;
                self.apply_opacity(1.0);
                self.reassert_z_order();
            }
            WindowState::Minimized | WindowState::Maximized => self.collapse(),
        }
        crate::log_info!(
            "glow 0x{:X}: ready at {:?}, {:?}",
            surface.0,
            self.target,
            self.phase
        );
    }

    /// Re-syncs geometry when the overlay surface gets activated.
    pub fn on_activated(&mut self, owner: &dyn OwnerView) {
        if self.phase != Phase::Tracking {
            return;
        }
        self.recompute_position(owner);
        self.recompute_size(owner);
        self.glow_color(owner);
        self.reassert_z_order();
    }

    fn configure_surface(&self, surface: SurfaceHandle) {
        let result = self
            .platform
            .set_style_bits(surface, StyleField::Style, style::GLOW)
            .and_then(|()| {
                self.platform
                    .set_style_bits(surface, StyleField::ExStyle, style::GLOW_EX)
            });
        if let Err(e) = result {
            crate::log_warn!("glow 0x{:X}: style setup failed: {e}", surface.0);
        }
    }

    // -- owner reactions --

    /// Follows the owner's position in every live phase. While collapsed
    /// the target keeps its zero size.
    pub fn on_owner_moved(&mut self, owner: &dyn OwnerView) {
        if self.phase == Phase::Closed {
            return;
        }
        self.recompute_position(owner);
        self.reassert_z_order();
    }

    pub fn on_owner_resized(&mut self, owner: &dyn OwnerView) {
        if matches!(self.phase, Phase::Collapsed | Phase::Closed) {
            return;
        }
        self.recompute_size(owner);
        self.reassert_z_order();
    }

    pub fn on_owner_state_changed(&mut self, state: WindowState, owner: &dyn OwnerView) {
        match self.phase {
            Phase::Closed => return,
            // Picked up from the owner when the surface becomes ready.
            Phase::Pending => {
                self.recompute_position(owner);
                self.recompute_size(owner);
                return;
            }
            _ => {}
        }
        self.cancel_pending_reveal();
        match state {
            WindowState::Minimized | WindowState::Maximized => self.collapse(),
            WindowState::Normal => self.restore(owner),
        }
    }

    pub fn on_owner_closing(&mut self, cancelled: bool) {
        if cancelled {
            crate::log_debug!("glow: owner close cancelled, still tracking");
            return;
        }
        self.close();
    }

    fn collapse(&mut self) {
        self.target.width = 0;
        self.target.height = 0;
        self.phase = Phase::Collapsed;
        self.apply_opacity(0.0);
        self.reassert_z_order();
    }

    fn restore(&mut self, owner: &dyn OwnerView) {
        self.recompute_position(owner);
        self.recompute_size(owner);
        self.glow_color(owner);

        if self.settings.settle_delay.is_zero() {
            self.reveal();
            return;
        }

        self.phase = Phase::Revealing;
        let this = self.this.clone();
        let id = self.deferred.schedule(self.settings.settle_delay, move || {
            let Some(overlay) = this.upgrade() else {
                return;
            };
            if let Ok(mut overlay) = overlay.try_borrow_mut() {
                overlay.pending_reveal = None;
                overlay.reveal();
            }
        });
        self.pending_reveal = Some(id);
    }

    fn reveal(&mut self) {
        if self.phase == Phase::Closed {
            return;
        }
        self.phase = Phase::Tracking;
        self.apply_opacity(1.0);
        self.reassert_z_order();
    }

    fn cancel_pending_reveal(&mut self) {
        if let Some(id) = self.pending_reveal.take() {
            self.deferred.cancel(id);
        }
    }

    /// Detaches from the owner and closes the surface. Runs at most once;
    /// returns whether this call did the work.
    pub fn close(&mut self) -> bool {
        if self.detached {
            return false;
        }
        self.detached = true;

        if let Some(source) = self.owner.upgrade() {
            for kind in OwnerEventKind::ALL {
                source.unsubscribe(self.key, kind);
            }
        }
        self.cancel_pending_reveal();
        self.phase = Phase::Closed;
        self.opacity = 0.0;

        if let Some(surface) = self.surface
            && let Err(e) = self.platform.close_surface(surface)
        {
            crate::log_warn!("glow 0x{:X}: close failed: {e}", surface.0);
        }
        crate::log_info!("glow: detached and closed");
        true
    }

    // -- geometry --

    fn scale_factor(&self) -> f64 {
        let scale = self
            .surface
            .or(self.owner_surface)
            .map_or(1.0, |s| self.platform.scale_factor_of(s));
        geometry::normalize_scale(scale)
    }

    /// Recomputes target left/top from the owner's position.
    pub fn recompute_position(&mut self, owner: &dyn OwnerView) {
        let (x, y) = geometry::glow_origin(&owner.bounds(), self.settings.margin, self.scale_factor());
        self.target.x = x;
        self.target.y = y;
    }

    /// Recomputes target width/height from the owner's size.
    pub fn recompute_size(&mut self, owner: &dyn OwnerView) {
        let (width, height) =
            geometry::glow_size(&owner.bounds(), self.settings.margin, self.scale_factor());
        self.target.width = width;
        self.target.height = height;
    }

    /// Applies the target geometry and stacks the surface directly behind
    /// the owner without activating either window.
    pub fn reassert_z_order(&self) {
        let (Some(surface), Some(owner)) = (self.surface, self.owner_surface) else {
            return;
        };
        if let Err(e) =
            self.platform
                .place_behind(surface, owner, self.target, Placement::BEHIND_OWNER)
        {
            crate::log_warn!("glow 0x{:X}: place behind failed: {e}", surface.0);
        }
    }

    fn apply_opacity(&mut self, opacity: f64) {
        self.opacity = opacity;
        let Some(surface) = self.surface else {
            return;
        };
        if let Err(e) = self.platform.set_opacity(surface, opacity) {
            crate::log_warn!("glow 0x{:X}: set opacity failed: {e}", surface.0);
        }
    }

    fn apply_fill(&mut self, color: Color) {
        let Some(surface) = self.surface else {
            return;
        };
        match self.platform.set_fill(surface, color) {
            Ok(()) => self.fill = Some(color),
            Err(e) => crate::log_warn!("glow 0x{:X}: set fill failed: {e}", surface.0),
        }
    }
}

#[cfg(test)]
#[path = "glow_tests.rs"]
mod tests;
