//! Time-based deferred actions on the UI event loop.
//!
//! The queue never runs anything on its own: the host loop calls
//! [`DeferredQueue::run_due`] when its timer fires and uses
//! [`DeferredQueue::next_due`] to arm the next one. Everything stays on
//! the single UI thread, so input keeps flowing while a task waits.

use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

/// Identifies a scheduled task for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

struct Scheduled {
    id: TaskId,
    due: Instant,
    task: Box<dyn FnOnce()>,
}

/// A cancelable single-threaded timer queue.
#[derive(Default)]
pub struct DeferredQueue {
    tasks: RefCell<Vec<Scheduled>>,
    next_id: Cell<u64>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` to run `delay` from now.
    pub fn schedule(&self, delay: Duration, task: impl FnOnce() + 'static) -> TaskId {
        self.schedule_at(Instant::now() + delay, task)
    }

    /// Schedules `task` to run at or after `due`.
    pub fn schedule_at(&self, due: Instant, task: impl FnOnce() + 'static) -> TaskId {
        let id = TaskId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.tasks.borrow_mut().push(Scheduled {
            id,
            due,
            task: Box::new(task),
        });
        id
    }

    /// Cancels a pending task. Returns `false` if it already ran or was
    /// never scheduled.
    pub fn cancel(&self, id: TaskId) -> bool {
        let mut tasks = self.tasks.borrow_mut();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        tasks.len() != before
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.borrow().iter().any(|t| t.id == id)
    }

    /// Earliest due time among pending tasks.
    pub fn next_due(&self) -> Option<Instant> {
        self.tasks.borrow().iter().map(|t| t.due).min()
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Runs every task due at `now`, earliest first (ties in scheduling
    /// order). Returns how many ran.
    ///
    /// Tasks scheduled by a running task wait for the next call.
    pub fn run_due(&self, now: Instant) -> usize {
        let horizon = self.next_id.get();
        let mut ran = 0;
        loop {
            let next = {
                let mut tasks = self.tasks.borrow_mut();
                let idx = tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= now && t.id.0 < horizon)
                    .min_by_key(|(_, t)| (t.due, t.id))
                    .map(|(i, _)| i);
                idx.map(|i| tasks.remove(i))
            };
            let Some(scheduled) = next else {
                break;
            };
            (scheduled.task)();
            ran += 1;
        }
        ran
    }
}
