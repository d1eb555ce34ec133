use std::cell::{Cell, RefCell};
use std::thread;

use super::*;
use crate::event::OwnerEventKind;
use crate::observer::ListenerKey;
use crate::testing::{Call, RecordingPlatform};

const OWNER: SurfaceHandle = SurfaceHandle(0x100);

fn make_owner(platform: &Rc<RecordingPlatform>) -> OwnerWindow {
    let platform: Rc<dyn Platform> = Rc::clone(platform) as Rc<dyn Platform>;
    OwnerWindow::new(
        DipRect::new(100.0, 100.0, 800.0, 600.0),
        ChromeAttributes::default(),
        platform,
    )
}

fn ready_owner(platform: &Rc<RecordingPlatform>) -> OwnerWindow {
    let mut owner = make_owner(platform);
    owner.on_surface_ready(OWNER, &Template::standard());
    platform.take_calls();
    owner
}

fn caption_id() -> PartId {
    // Template::standard numbers parts in Part::ALL order from 1.
    PartId(4)
}

fn record_events(owner: &OwnerWindow) -> Rc<RefCell<Vec<OwnerEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let key = ListenerKey::next();
    for kind in OwnerEventKind::ALL {
        let s = Rc::clone(&seen);
        owner.events().subscribe(
            key,
            kind,
            Rc::new(move |e: &OwnerEvent, _: &dyn OwnerView| s.borrow_mut().push(*e)),
        );
    }
    seen
}

// -- template binding --

#[test]
fn surface_ready_binds_every_standard_part() {
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let owner = ready_owner(&platform);

    for part in Part::ALL {
        assert!(owner.is_bound(part), "{} should be bound", part.name());
    }
    assert_eq!(owner.border_brush(), Some(owner.attributes().border_color));
}

#[test]
fn missing_parts_disable_their_interaction() {
    // Arrange
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let mut owner = make_owner(&platform);
    let template = Template::new().with(Part::Caption, PartId(7));

    // Act
    owner.on_surface_ready(OWNER, &template);
    platform.take_calls();
    owner.on_close_activated();
    owner.on_minimize_activated();
    owner.on_maximize_activated();
    owner.set_border_color(Color::rgb(1, 2, 3));

    // Assert
    assert!(!owner.is_closed());
    assert_eq!(owner.state(), WindowState::Normal);
    assert_eq!(owner.border_brush(), None);
    assert_eq!(owner.attributes().border_color, Color::rgb(1, 2, 3));
    assert!(platform.calls().is_empty());
}

#[test]
fn surface_ready_propagates_maximize_capability() {
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let mut owner = make_owner(&platform);
    owner.on_surface_ready(OWNER, &Template::standard());

    assert_ne!(platform.style(OWNER, StyleField::Style) & style::MAXIMIZE_BOX, 0);

    owner.set_can_maximize(false);
    assert_eq!(platform.style(OWNER, StyleField::Style) & style::MAXIMIZE_BOX, 0);

    owner.set_can_maximize(true);
    assert_ne!(platform.style(OWNER, StyleField::Style) & style::MAXIMIZE_BOX, 0);
}

// -- caption gestures --

#[test]
fn primary_press_on_caption_starts_drag() {
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let mut owner = ready_owner(&platform);

    owner.on_pointer_pressed(caption_id(), PointerButton::Primary, 1);

    assert_eq!(platform.calls(), vec![Call::DragMove(OWNER)]);
}

#[test]
fn secondary_press_on_caption_is_ignored() {
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let mut owner = ready_owner(&platform);

    owner.on_pointer_pressed(caption_id(), PointerButton::Secondary, 1);
    owner.on_pointer_pressed(caption_id(), PointerButton::Secondary, 2);

    assert!(platform.calls().is_empty());
    assert_eq!(owner.state(), WindowState::Normal);
}

#[test]
fn double_press_toggles_maximize_and_inset() {
    // Arrange
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let mut owner = ready_owner(&platform);

    // Act
    owner.on_pointer_pressed(caption_id(), PointerButton::Primary, 2);

    // Assert
    assert_eq!(owner.state(), WindowState::Maximized);
    assert_eq!(owner.inset(), MAXIMIZED_INSET);
    assert_eq!(
        platform.calls(),
        vec![Call::ApplyState(OWNER, WindowState::Maximized)]
    );

    // Act
    owner.on_caption_double_press();

    // Assert
    assert_eq!(owner.state(), WindowState::Normal);
    assert_eq!(owner.inset(), 0.0);
}

#[test]
fn double_press_without_can_maximize_changes_nothing() {
    // Arrange
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let mut owner = ready_owner(&platform);
    owner.set_can_maximize(false);
    platform.take_calls();
    let events = record_events(&owner);

    // Act
    owner.on_pointer_pressed(caption_id(), PointerButton::Primary, 2);
    owner.on_caption_double_press();

    // Assert
    assert_eq!(owner.state(), WindowState::Normal);
    assert_eq!(owner.inset(), 0.0);
    assert!(events.borrow().is_empty());
    assert!(platform.calls().is_empty());
}

#[test]
fn native_maximize_keeps_inset_in_step() {
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let mut owner = ready_owner(&platform);

    owner.notify_state_changed(WindowState::Maximized);
    assert_eq!(owner.inset(), MAXIMIZED_INSET);

    owner.notify_state_changed(WindowState::Minimized);
    assert_eq!(owner.inset(), MAXIMIZED_INSET);

    owner.notify_state_changed(WindowState::Normal);
    assert_eq!(owner.inset(), 0.0);
}

// -- buttons --

#[test]
fn default_buttons_close_toggle_and_minimize() {
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let mut owner = ready_owner(&platform);

    owner.on_maximize_activated();
    assert_eq!(owner.state(), WindowState::Maximized);

    owner.on_minimize_activated();
    assert_eq!(owner.state(), WindowState::Minimized);

    owner.on_close_activated();
    assert!(owner.is_closed());
    assert_eq!(platform.calls().last(), Some(&Call::Close(OWNER)));
}

#[test]
fn maximize_button_is_inert_without_can_maximize() {
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let mut owner = ready_owner(&platform);
    owner.set_can_maximize(false);

    owner.on_pointer_pressed(PartId(2), PointerButton::Primary, 1);

    assert_eq!(owner.state(), WindowState::Normal);
}

#[test]
fn hidden_buttons_are_inert() {
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let attributes = ChromeAttributes {
        show_close_button: false,
        show_minimize_button: false,
        ..Default::default()
    };
    let mut owner = OwnerWindow::new(
        DipRect::new(0.0, 0.0, 400.0, 300.0),
        attributes,
        Rc::clone(&platform) as Rc<dyn Platform>,
    );
    owner.on_surface_ready(OWNER, &Template::standard());

    owner.on_close_activated();
    owner.on_minimize_activated();

    assert!(!owner.is_closed());
    assert_eq!(owner.state(), WindowState::Normal);
}

#[test]
fn overridden_close_can_confirm_before_delegating() {
    // Arrange
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let mut owner = ready_owner(&platform);
    let asked = Rc::new(Cell::new(0));
    let a = Rc::clone(&asked);
    owner.set_handlers(ChromeHandlers::default().on_close(move |w| {
        a.set(a.get() + 1);
        if a.get() > 1 {
            default_close(w);
        }
    }));

    // Act & Assert
    owner.on_close_activated();
    assert!(!owner.is_closed());
    owner.on_close_activated();
    assert!(owner.is_closed());
    assert_eq!(asked.get(), 2);
}

#[test]
fn overriding_one_handler_keeps_other_defaults() {
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let mut owner = ready_owner(&platform);
    let minimized = Rc::new(Cell::new(false));
    let m = Rc::clone(&minimized);
    owner.set_handlers(ChromeHandlers::default().on_minimize(move |_| m.set(true)));

    owner.on_minimize_activated();
    owner.on_maximize_activated();

    assert!(minimized.get());
    assert_eq!(owner.state(), WindowState::Maximized);
}

// -- events and closing --

#[test]
fn geometry_notifications_emit_once_per_change() {
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let mut owner = ready_owner(&platform);
    let events = record_events(&owner);

    owner.notify_moved(120.0, 80.0);
    owner.notify_moved(120.0, 80.0);
    owner.notify_resized(1024.0, 768.0);

    assert_eq!(*events.borrow(), vec![OwnerEvent::Moved, OwnerEvent::Resized]);
    assert_eq!(owner.bounds(), DipRect::new(120.0, 80.0, 1024.0, 768.0));
}

#[test]
fn closing_guard_cancels_and_reports_outcome() {
    // Arrange
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let mut owner = ready_owner(&platform);
    let veto = Rc::new(Cell::new(true));
    let v = Rc::clone(&veto);
    owner.on_closing(move |_| v.get());
    let events = record_events(&owner);

    // Act & Assert
    assert!(!owner.close());
    assert!(!owner.is_closed());
    assert!(platform.calls().is_empty());

    veto.set(false);
    assert!(owner.close());
    assert!(owner.is_closed());
    assert_eq!(
        *events.borrow(),
        vec![
            OwnerEvent::Closing { cancelled: true },
            OwnerEvent::Closing { cancelled: false },
        ]
    );
    assert_eq!(platform.calls(), vec![Call::Close(OWNER)]);
}

#[test]
fn closed_owner_ignores_further_notifications() {
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let mut owner = ready_owner(&platform);
    owner.close();
    let events = record_events(&owner);

    owner.notify_moved(1.0, 1.0);
    owner.notify_resized(10.0, 10.0);
    owner.set_state(WindowState::Maximized);
    assert!(owner.close());

    assert!(events.borrow().is_empty());
}

#[test]
fn failed_state_change_is_not_recorded() {
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let mut owner = ready_owner(&platform);
    platform.set_failing(true);

    owner.set_state(WindowState::Minimized);

    assert_eq!(owner.state(), WindowState::Normal);
}

// -- border color marshaling --

#[test]
fn border_color_from_other_thread_is_last_writer_wins() {
    // Arrange
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let mut owner = ready_owner(&platform);
    let handle = owner.chrome_handle();

    // Act
    thread::spawn(move || {
        for shade in 0..=50u8 {
            handle.set_border_color(Color::rgb(shade, 0, 0));
        }
    })
    .join()
    .unwrap();

    // Assert: nothing applied until the UI thread drains.
    assert_eq!(owner.border_brush(), Some(owner.attributes().border_color));
    assert_ne!(owner.border_brush(), Some(Color::rgb(50, 0, 0)));

    assert_eq!(owner.pump_ui_queue(), 51);
    assert_eq!(owner.border_brush(), Some(Color::rgb(50, 0, 0)));
}

#[test]
fn border_color_on_ui_thread_applies_immediately() {
    let platform = Rc::new(RecordingPlatform::new(1.0));
    let mut owner = ready_owner(&platform);

    owner.set_border_color(Color::rgb(9, 9, 9));

    assert_eq!(owner.border_brush(), Some(Color::rgb(9, 9, 9)));
}

#[test]
fn attributes_come_from_config() {
    let mut config = Config::default();
    config.caption.can_maximize = false;
    config.caption.menu.push(MenuCommand {
        id: "about".into(),
        label: "About".into(),
    });
    config.glow.color = "#ff8800".into();

    let attributes = ChromeAttributes::from_config(&config);

    assert!(!attributes.can_maximize);
    assert_eq!(attributes.caption_menu.len(), 1);
    assert_eq!(attributes.glow_color, Color::rgb(0xFF, 0x88, 0x00));
}
