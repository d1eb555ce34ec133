//! One chrome window with its optional glow, as driven by a host loop.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::deferred::DeferredQueue;
use crate::glow::{GlowOverlay, GlowSettings};
use crate::owner::{ChromeAttributes, OwnerWindow};
use crate::platform::Platform;
use crate::rect::DipRect;

/// An owner window, its glow overlay, and the deferred queue they share.
pub struct ChromeSession {
    owner: OwnerWindow,
    glow: Option<Rc<RefCell<GlowOverlay>>>,
    deferred: Rc<DeferredQueue>,
}

impl ChromeSession {
    /// Builds the owner from `config` and attaches a glow when enabled.
    pub fn new(config: &Config, bounds: DipRect, platform: Rc<dyn Platform>) -> Self {
        let owner = OwnerWindow::new(
            bounds,
            ChromeAttributes::from_config(config),
            Rc::clone(&platform),
        );
        let deferred = Rc::new(DeferredQueue::new());
        let glow = config.glow.enabled.then(|| {
            GlowOverlay::attach(
                &owner,
                platform,
                Rc::clone(&deferred),
                GlowSettings::from_config(&config.glow),
            )
        });
        crate::log_info!(
            "session: {}x{} at ({}, {}), glow {}",
            bounds.width,
            bounds.height,
            bounds.left,
            bounds.top,
            if glow.is_some() { "on" } else { "off" }
        );
        Self {
            owner,
            glow,
            deferred,
        }
    }

    pub fn owner(&self) -> &OwnerWindow {
        &self.owner
    }

    pub fn owner_mut(&mut self) -> &mut OwnerWindow {
        &mut self.owner
    }

    pub fn glow(&self) -> Option<&Rc<RefCell<GlowOverlay>>> {
        self.glow.as_ref()
    }

    pub fn deferred(&self) -> &Rc<DeferredQueue> {
        &self.deferred
    }

    /// Applies cross-thread chrome updates and runs due deferred work.
    /// Returns how many of each were processed.
    pub fn tick(&mut self, now: Instant) -> (usize, usize) {
        let posted = self.owner.pump_ui_queue();
        if posted > 0 {
            self.refresh_glow_color();
        }
        let ran = self.deferred.run_due(now);
        (posted, ran)
    }

    fn refresh_glow_color(&self) {
        if let Some(glow) = &self.glow
            && let Ok(mut glow) = glow.try_borrow_mut()
        {
            glow.glow_color(&self.owner);
        }
    }

    /// Time until the next deferred task is due, if any.
    pub fn next_wake(&self, now: Instant) -> Option<Duration> {
        self.deferred
            .next_due()
            .map(|due| due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::event::WindowState;
    use crate::glow::Phase;
    use crate::owner::Template;
    use crate::platform::SurfaceHandle;
    use crate::testing::{Call, RecordingPlatform};

    fn session(config: &Config) -> (ChromeSession, Rc<RecordingPlatform>) {
        let platform = Rc::new(RecordingPlatform::new(1.0));
        let session = ChromeSession::new(
            config,
            DipRect::new(50.0, 50.0, 640.0, 480.0),
            Rc::clone(&platform) as Rc<dyn Platform>,
        );
        (session, platform)
    }

    #[test]
    fn glow_attached_when_enabled() {
        let (session, _) = session(&Config::default());

        let glow = session.glow().expect("glow enabled by default");
        let key = glow.borrow().key();
        assert_eq!(session.owner().events().count_for(key), 4);
    }

    #[test]
    fn glow_skipped_when_disabled() {
        let mut config = Config::default();
        config.glow.enabled = false;

        let (session, _) = session(&config);

        assert!(session.glow().is_none());
        assert!(session.owner().events().is_empty());
    }

    #[test]
    fn tick_runs_restore_reveal() {
        // Arrange
        let (mut session, _) = session(&Config::default());
        session
            .owner_mut()
            .on_surface_ready(SurfaceHandle(1), &Template::standard());
        session
            .glow()
            .unwrap()
            .borrow_mut()
            .on_surface_ready(SurfaceHandle(2), session.owner());
        session.owner_mut().set_state(WindowState::Minimized);
        session.owner_mut().set_state(WindowState::Normal);
        let now = Instant::now();
        assert!(session.next_wake(now).is_some());

        // Act
        let (_, ran) = session.tick(now + Duration::from_secs(1));

        // Assert
        assert_eq!(ran, 1);
        assert_eq!(session.glow().unwrap().borrow().phase(), Phase::Tracking);
        assert!(session.next_wake(now).is_none());
    }

    #[test]
    fn native_restore_leaves_a_wake_for_the_host_timer() {
        // Arrange
        let (mut session, _) = session(&Config::default());
        session
            .owner_mut()
            .on_surface_ready(SurfaceHandle(1), &Template::standard());
        session
            .glow()
            .unwrap()
            .borrow_mut()
            .on_surface_ready(SurfaceHandle(2), session.owner());
        session.owner_mut().notify_state_changed(WindowState::Minimized);

        // Act
        session.owner_mut().notify_state_changed(WindowState::Normal);

        // Assert
        let now = Instant::now();
        let wait = session.next_wake(now).expect("reveal scheduled");
        assert!(wait <= Duration::from_millis(150));
        assert!(session.glow().unwrap().borrow().is_reveal_pending());
    }

    #[test]
    fn tick_applies_posted_border_colors() {
        let (mut session, _) = session(&Config::default());
        session
            .owner_mut()
            .on_surface_ready(SurfaceHandle(1), &Template::standard());
        let handle = session.owner().chrome_handle();
        let red = Color::rgb(255, 0, 0);

        std::thread::spawn(move || handle.set_border_color(red))
            .join()
            .unwrap();
        let (posted, _) = session.tick(Instant::now());

        assert_eq!(posted, 1);
        assert_eq!(session.owner().border_brush(), Some(red));
    }

    #[test]
    fn tick_pushes_posted_glow_color_to_overlay() {
        // Arrange
        let (mut session, platform) = session(&Config::default());
        session
            .owner_mut()
            .on_surface_ready(SurfaceHandle(1), &Template::standard());
        session
            .glow()
            .unwrap()
            .borrow_mut()
            .on_surface_ready(SurfaceHandle(2), session.owner());
        platform.take_calls();
        let handle = session.owner().chrome_handle();
        let teal = Color::rgb(0, 0x80, 0x80);

        // Act
        std::thread::spawn(move || handle.set_glow_color(teal))
            .join()
            .unwrap();
        session.tick(Instant::now());

        // Assert
        assert_eq!(
            platform.take_calls(),
            vec![Call::Fill {
                surface: SurfaceHandle(2),
                color: teal,
            }]
        );
    }

    #[test]
    fn settle_delay_comes_from_config() {
        let mut config = Config::default();
        config.glow.settle_ms = 0;
        let (mut session, _) = session(&config);
        session
            .owner_mut()
            .on_surface_ready(SurfaceHandle(1), &Template::standard());
        session
            .glow()
            .unwrap()
            .borrow_mut()
            .on_surface_ready(SurfaceHandle(2), session.owner());

        session.owner_mut().set_state(WindowState::Maximized);
        session.owner_mut().set_state(WindowState::Normal);

        assert!(session.deferred().is_empty());
        assert_eq!(session.glow().unwrap().borrow().opacity(), 1.0);
    }
}
