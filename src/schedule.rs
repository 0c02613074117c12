//! Timer and animation-frame scheduling behind one small trait.
//!
//! Anything that wants "call me later" goes through [`Scheduler`], so the
//! rate limiters, the preloader and the frame renderer behave the same in the
//! browser and under the deterministic [`ManualScheduler`] used on the host.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};

/// A deferred unit of work. Dropping an unrun task releases whatever it captured.
pub type Task = Box<dyn FnOnce()>;

/// Opaque handle returned by [`Scheduler`]; pass it back to cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub(crate) u64);

pub trait Scheduler {
    /// Run `task` once after `delay_ms` milliseconds. `None` means the host
    /// refused the timer and `task` will never run.
    fn schedule_after(&self, delay_ms: u32, task: Task) -> Option<TimerHandle>;

    /// Cancel a timer. Unknown or already-fired handles are ignored.
    fn cancel(&self, handle: TimerHandle);

    /// Run `task` before the next repaint; `None` if no frame could be requested.
    fn request_frame(&self, task: Task) -> Option<TimerHandle>;

    fn cancel_frame(&self, handle: TimerHandle);
}

/// Virtual-clock scheduler: time only moves when the host calls [`advance`].
///
/// Timers fire in due-time order, ties broken by scheduling order. No internal
/// borrow is held while a task runs, so tasks may freely schedule or cancel.
///
/// [`advance`]: ManualScheduler::advance
#[derive(Default)]
pub struct ManualScheduler {
    now_ms: Cell<u64>,
    next_id: Cell<u64>,
    timers: RefCell<BTreeMap<(u64, u64), Task>>,
    frames: RefCell<VecDeque<(u64, Task)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Move the clock forward by `ms`, firing every timer that falls due.
    /// Returns the number of timers fired.
    pub fn advance(&self, ms: u64) -> usize {
        let target = self.now_ms.get() + ms;
        let mut fired = 0;
        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                match timers.keys().next().copied() {
                    Some(key) if key.0 <= target => timers.remove(&key).map(|task| (key.0, task)),
                    _ => None,
                }
            };
            let Some((due, task)) = next else { break };
            self.now_ms.set(due.max(self.now_ms.get()));
            task();
            fired += 1;
        }
        self.now_ms.set(target);
        fired
    }

    /// Run the frame callbacks queued so far. Frames requested while these run
    /// wait for the next call, like a real repaint.
    pub fn run_frames(&self) -> usize {
        let batch: Vec<(u64, Task)> = self.frames.borrow_mut().drain(..).collect();
        let count = batch.len();
        for (_, task) in batch {
            task();
        }
        count
    }

    fn next_handle(&self) -> TimerHandle {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        TimerHandle(id)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_after(&self, delay_ms: u32, task: Task) -> Option<TimerHandle> {
        let handle = self.next_handle();
        let due = self.now_ms.get() + u64::from(delay_ms);
        self.timers.borrow_mut().insert((due, handle.0), task);
        Some(handle)
    }

    fn cancel(&self, handle: TimerHandle) {
        let removed = {
            let mut timers = self.timers.borrow_mut();
            let key = timers.keys().find(|key| key.1 == handle.0).copied();
            key.and_then(|key| timers.remove(&key))
        };
        // Captures may own other wrappers; drop them outside the borrow.
        drop(removed);
    }

    fn request_frame(&self, task: Task) -> Option<TimerHandle> {
        let handle = self.next_handle();
        self.frames.borrow_mut().push_back((handle.0, task));
        Some(handle)
    }

    fn cancel_frame(&self, handle: TimerHandle) {
        let removed = {
            let mut frames = self.frames.borrow_mut();
            frames
                .iter()
                .position(|(id, _)| *id == handle.0)
                .and_then(|index| frames.remove(index))
        };
        drop(removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Task) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let make = move |label: &'static str| -> Task {
            let sink = sink.clone();
            Box::new(move || sink.borrow_mut().push(label))
        };
        (log, make)
    }

    #[test]
    fn timers_fire_in_due_order_then_insertion_order() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        scheduler.schedule_after(30, task("late"));
        scheduler.schedule_after(10, task("first"));
        scheduler.schedule_after(10, task("second"));

        assert_eq!(scheduler.advance(9), 0);
        assert_eq!(scheduler.advance(21), 3);
        assert_eq!(*log.borrow(), vec!["first", "second", "late"]);
        assert_eq!(scheduler.now_ms(), 30);
    }

    #[test]
    fn cancelled_timer_never_runs() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        let handle = scheduler.schedule_after(5, task("cancelled")).unwrap();
        scheduler.schedule_after(5, task("kept"));
        scheduler.cancel(handle);
        scheduler.cancel(handle);

        scheduler.advance(100);
        assert_eq!(*log.borrow(), vec!["kept"]);
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[test]
    fn tasks_can_schedule_follow_ups_within_one_advance() {
        let scheduler = Rc::new(ManualScheduler::new());
        let hits = Rc::new(Cell::new(0u64));
        let inner = scheduler.clone();
        let seen = hits.clone();
        scheduler.schedule_after(
            10,
            Box::new(move || {
                let seen = seen.clone();
                let at = inner.now_ms();
                inner.schedule_after(
                    10,
                    Box::new(move || seen.set(at + 10)),
                );
            }),
        );

        scheduler.advance(25);
        assert_eq!(hits.get(), 20);
    }

    #[test]
    fn frames_requested_during_a_frame_wait_for_the_next_one() {
        let scheduler = Rc::new(ManualScheduler::new());
        let (log, task) = recorder();
        let inner = scheduler.clone();
        let follow_up = task("second");
        let first = task("first");
        scheduler.request_frame(Box::new(move || {
            first();
            inner.request_frame(follow_up);
        }));

        assert_eq!(scheduler.run_frames(), 1);
        assert_eq!(*log.borrow(), vec!["first"]);
        assert_eq!(scheduler.pending_frames(), 1);
        assert_eq!(scheduler.run_frames(), 1);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn cancelled_frame_is_dropped() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();
        let handle = scheduler.request_frame(task("gone")).unwrap();
        scheduler.cancel_frame(handle);
        assert_eq!(scheduler.run_frames(), 0);
        assert!(log.borrow().is_empty());
    }
}
