//! Marshals chrome mutations from any thread onto the UI thread.
//!
//! The owner window is not `Send`; other threads hold a [`ChromeHandle`]
//! and post messages that the UI loop applies in arrival order.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::color::Color;

/// A chrome mutation queued for the UI thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromeMsg {
    /// Repaint the chrome border with this color.
    BorderColor(Color),
    /// Fill the glow halo with this color.
    GlowColor(Color),
}

type Waker = Arc<dyn Fn() + Send + Sync>;

/// The UI-thread end of the chrome message queue.
pub struct UiDispatcher {
    tx: Sender<ChromeMsg>,
    rx: Receiver<ChromeMsg>,
    waker: Option<Waker>,
}

/// A thread-safe handle for posting chrome mutations.
#[derive(Clone)]
pub struct ChromeHandle {
    tx: Sender<ChromeMsg>,
    waker: Option<Waker>,
}

impl UiDispatcher {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            waker: None,
        }
    }

    /// Installs a callback run after every post, so the host loop can
    /// wake up and drain. Affects handles created afterwards.
    pub fn set_waker(&mut self, waker: impl Fn() + Send + Sync + 'static) {
        self.waker = Some(Arc::new(waker));
    }

    pub fn handle(&self) -> ChromeHandle {
        ChromeHandle {
            tx: self.tx.clone(),
            waker: self.waker.clone(),
        }
    }

    /// Takes every queued message, oldest first.
    pub fn drain(&self) -> Vec<ChromeMsg> {
        self.rx.try_iter().collect()
    }
}

impl Default for UiDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ChromeHandle {
    /// Queues a border color change. Returns `false` if the UI side is gone.
    pub fn set_border_color(&self, color: Color) -> bool {
        self.post(ChromeMsg::BorderColor(color))
    }

    /// Queues a glow color change. Returns `false` if the UI side is gone.
    pub fn set_glow_color(&self, color: Color) -> bool {
        self.post(ChromeMsg::GlowColor(color))
    }

    fn post(&self, msg: ChromeMsg) -> bool {
        if self.tx.send(msg).is_err() {
            return false;
        }
        if let Some(waker) = &self.waker {
            waker();
        }
        true
    }
}
