//! Observer list for owner lifecycle events.
//!
//! Entries are keyed by `(ListenerKey, OwnerEventKind)`, so adding the
//! same pair twice and removing an absent pair are both no-ops. Emission
//! works on a snapshot of the list: handlers may unsubscribe themselves
//! (or others) while an event is being delivered, and a handler removed
//! mid-delivery is not invoked afterwards.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::event::{OwnerEvent, OwnerEventKind, OwnerView};

/// Callback invoked for each delivered event.
pub type Handler = Rc<dyn Fn(&OwnerEvent, &dyn OwnerView)>;

/// Identifies one listener across all of its subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerKey(u64);

impl ListenerKey {
    /// Allocates a process-unique key.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

struct Entry {
    key: ListenerKey,
    kind: OwnerEventKind,
    handler: Handler,
}

type Entries = Rc<RefCell<Vec<Entry>>>;

/// The owner's list of event subscribers.
///
/// Cloning yields another handle to the same list.
#[derive(Clone, Default)]
pub struct EventSource {
    entries: Entries,
}

/// A non-owning handle to an [`EventSource`].
///
/// Upgrading fails once the owner (and every clone of its source) is gone.
#[derive(Clone, Default)]
pub struct WeakEventSource {
    entries: Weak<RefCell<Vec<Entry>>>,
}

impl EventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `kind` under `key`.
    ///
    /// Returns `false` (and keeps the existing handler) if the pair is
    /// already registered.
    pub fn subscribe(&self, key: ListenerKey, kind: OwnerEventKind, handler: Handler) -> bool {
        let mut entries = self.entries.borrow_mut();
        if entries.iter().any(|e| e.key == key && e.kind == kind) {
            return false;
        }
        entries.push(Entry { key, kind, handler });
        true
    }

    /// Removes the `(key, kind)` subscription. Returns whether it existed.
    pub fn unsubscribe(&self, key: ListenerKey, kind: OwnerEventKind) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|e| !(e.key == key && e.kind == kind));
        entries.len() != before
    }

    /// Returns whether `(key, kind)` is currently registered.
    pub fn is_subscribed(&self, key: ListenerKey, kind: OwnerEventKind) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|e| e.key == key && e.kind == kind)
    }

    /// Number of subscriptions held by `key`.
    pub fn count_for(&self, key: ListenerKey) -> usize {
        self.entries.borrow().iter().filter(|e| e.key == key).count()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Delivers `event` to every handler subscribed to its kind, in
    /// subscription order. Returns the number of handlers invoked.
    pub fn emit(&self, event: &OwnerEvent, view: &dyn OwnerView) -> usize {
        let kind = event.kind();
        let snapshot: Vec<(ListenerKey, Handler)> = self
            .entries
            .borrow()
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| (e.key, Rc::clone(&e.handler)))
            .collect();

        let mut delivered = 0;
        for (key, handler) in snapshot {
            if !self.is_subscribed(key, kind) {
                continue;
            }
            handler(event, view);
            delivered += 1;
        }
        delivered
    }

    pub fn downgrade(&self) -> WeakEventSource {
        WeakEventSource {
            entries: Rc::downgrade(&self.entries),
        }
    }
}

impl WeakEventSource {
    pub fn upgrade(&self) -> Option<EventSource> {
        self.entries.upgrade().map(|entries| EventSource { entries })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::color::Color;
    use crate::event::WindowState;
    use crate::platform::SurfaceHandle;
    use crate::rect::DipRect;

    struct StubView;

    impl OwnerView for StubView {
        fn bounds(&self) -> DipRect {
            DipRect::new(0.0, 0.0, 100.0, 100.0)
        }
        fn state(&self) -> WindowState {
            WindowState::Normal
        }
        fn glow_color(&self) -> Color {
            Color::rgb(0, 0, 0)
        }
        fn surface(&self) -> Option<SurfaceHandle> {
            None
        }
    }

    fn counter() -> (Rc<Cell<u32>>, Handler) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let handler: Handler =
            Rc::new(move |_: &OwnerEvent, _: &dyn OwnerView| c.set(c.get() + 1));
        (count, handler)
    }

    #[test]
    fn duplicate_subscription_is_rejected() {
        // Arrange
        let source = EventSource::new();
        let key = ListenerKey::next();
        let (count, handler) = counter();

        // Act
        assert!(source.subscribe(key, OwnerEventKind::Moved, Rc::clone(&handler)));
        assert!(!source.subscribe(key, OwnerEventKind::Moved, handler));
        source.emit(&OwnerEvent::Moved, &StubView);

        // Assert
        assert_eq!(source.len(), 1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn unsubscribe_absent_entry_is_noop() {
        let source = EventSource::new();
        let key = ListenerKey::next();

        assert!(!source.unsubscribe(key, OwnerEventKind::Closing));
        assert!(source.is_empty());
    }

    #[test]
    fn emit_only_reaches_matching_kind() {
        let source = EventSource::new();
        let (moved, on_moved) = counter();
        let (resized, on_resized) = counter();
        source.subscribe(ListenerKey::next(), OwnerEventKind::Moved, on_moved);
        source.subscribe(ListenerKey::next(), OwnerEventKind::Resized, on_resized);

        let delivered = source.emit(&OwnerEvent::Moved, &StubView);

        assert_eq!(delivered, 1);
        assert_eq!(moved.get(), 1);
        assert_eq!(resized.get(), 0);
    }

    #[test]
    fn handler_can_unsubscribe_during_emit() {
        // Arrange
        let source = EventSource::new();
        let key = ListenerKey::next();
        let weak = source.downgrade();
        let (count, _) = counter();
        let c = Rc::clone(&count);
        source.subscribe(
            key,
            OwnerEventKind::Closing,
            Rc::new(move |_: &OwnerEvent, _: &dyn OwnerView| {
                c.set(c.get() + 1);
                if let Some(source) = weak.upgrade() {
                    source.unsubscribe(key, OwnerEventKind::Closing);
                }
            }),
        );

        // Act
        source.emit(&OwnerEvent::Closing { cancelled: false }, &StubView);
        source.emit(&OwnerEvent::Closing { cancelled: false }, &StubView);

        // Assert
        assert_eq!(count.get(), 1);
        assert!(source.is_empty());
    }

    #[test]
    fn handler_removed_mid_emit_is_skipped() {
        let source = EventSource::new();
        let first = ListenerKey::next();
        let second = ListenerKey::next();
        let weak = source.downgrade();
        let (count, on_second) = counter();

        source.subscribe(
            first,
            OwnerEventKind::Moved,
            Rc::new(move |_: &OwnerEvent, _: &dyn OwnerView| {
                if let Some(source) = weak.upgrade() {
                    source.unsubscribe(second, OwnerEventKind::Moved);
                }
            }),
        );
        source.subscribe(second, OwnerEventKind::Moved, on_second);

        let delivered = source.emit(&OwnerEvent::Moved, &StubView);

        assert_eq!(delivered, 1);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn weak_source_does_not_keep_list_alive() {
        let source = EventSource::new();
        let weak = source.downgrade();
        assert!(weak.upgrade().is_some());

        drop(source);

        assert!(weak.upgrade().is_none());
    }
}
