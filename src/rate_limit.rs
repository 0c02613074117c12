//! Throttled and debounced wrappers around a callback.
//!
//! Both wrappers own their timer: dropping one (or calling `cancel`) clears
//! whatever is still scheduled, so a callback can never fire after its owner
//! has gone away.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::RateLimitError;
use crate::schedule::{Scheduler, TimerHandle};

struct DebounceState<A> {
    scheduler: Rc<dyn Scheduler>,
    interval_ms: u32,
    callback: Box<dyn Fn(A)>,
    pending: Cell<Option<TimerHandle>>,
}

/// Trailing-edge wrapper: fires once, `interval_ms` after the last call of a
/// burst, with that call's argument.
pub struct Debounced<A: 'static> {
    state: Rc<DebounceState<A>>,
}

impl<A: 'static> Debounced<A> {
    pub fn try_new(
        scheduler: Rc<dyn Scheduler>,
        interval_ms: u32,
        callback: impl Fn(A) + 'static,
    ) -> Result<Self, RateLimitError> {
        if interval_ms == 0 {
            return Err(RateLimitError::ZeroInterval);
        }
        Ok(Self::build(scheduler, interval_ms, callback))
    }

    fn build(scheduler: Rc<dyn Scheduler>, interval_ms: u32, callback: impl Fn(A) + 'static) -> Self {
        Self {
            state: Rc::new(DebounceState {
                scheduler,
                interval_ms,
                callback: Box::new(callback),
                pending: Cell::new(None),
            }),
        }
    }

    pub fn call(&self, arg: A) {
        self.cancel();
        let weak = Rc::downgrade(&self.state);
        let handle = self.state.scheduler.schedule_after(
            self.state.interval_ms,
            Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    state.pending.set(None);
                    (state.callback)(arg);
                }
            }),
        );
        if handle.is_none() {
            tracing::warn!("debounce timer refused; call dropped");
        }
        self.state.pending.set(handle);
    }

    /// Drop the scheduled call, if any, along with its argument.
    pub fn cancel(&self) {
        if let Some(handle) = self.state.pending.take() {
            self.state.scheduler.cancel(handle);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state.pending.get().is_some()
    }

    pub fn interval_ms(&self) -> u32 {
        self.state.interval_ms
    }
}

impl<A: 'static> Drop for Debounced<A> {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct ThrottleState<A> {
    scheduler: Rc<dyn Scheduler>,
    interval_ms: u32,
    callback: Box<dyn Fn(A)>,
    cooldown: Cell<Option<TimerHandle>>,
    dropped: Cell<u64>,
}

/// Leading-edge wrapper: the first call in a window runs immediately, calls
/// during the cooldown are discarded.
pub struct Throttled<A: 'static> {
    state: Rc<ThrottleState<A>>,
}

impl<A: 'static> Throttled<A> {
    pub fn try_new(
        scheduler: Rc<dyn Scheduler>,
        interval_ms: u32,
        callback: impl Fn(A) + 'static,
    ) -> Result<Self, RateLimitError> {
        if interval_ms == 0 {
            return Err(RateLimitError::ZeroInterval);
        }
        Ok(Self::build(scheduler, interval_ms, callback))
    }

    fn build(scheduler: Rc<dyn Scheduler>, interval_ms: u32, callback: impl Fn(A) + 'static) -> Self {
        Self {
            state: Rc::new(ThrottleState {
                scheduler,
                interval_ms,
                callback: Box::new(callback),
                cooldown: Cell::new(None),
                dropped: Cell::new(0),
            }),
        }
    }

    /// Returns `true` when the callback ran for this call.
    pub fn call(&self, arg: A) -> bool {
        if self.in_cooldown() {
            self.state.dropped.set(self.state.dropped.get() + 1);
            return false;
        }
        // Cooldown opens before the callback so re-entrant calls are dropped
        // and a panicking callback still leaves the window consistent. Without
        // a reset timer there is no cooldown at all.
        let weak = Rc::downgrade(&self.state);
        let handle = self.state.scheduler.schedule_after(
            self.state.interval_ms,
            Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    state.cooldown.set(None);
                }
            }),
        );
        if handle.is_none() {
            tracing::warn!("throttle reset timer refused; running without cooldown");
        }
        self.state.cooldown.set(handle);
        (self.state.callback)(arg);
        true
    }

    /// End the cooldown early and release its timer.
    pub fn cancel(&self) {
        if let Some(handle) = self.state.cooldown.take() {
            self.state.scheduler.cancel(handle);
        }
    }

    pub fn in_cooldown(&self) -> bool {
        self.state.cooldown.get().is_some()
    }

    /// Calls discarded because they landed inside a cooldown.
    pub fn dropped_calls(&self) -> u64 {
        self.state.dropped.get()
    }

    pub fn interval_ms(&self) -> u32 {
        self.state.interval_ms
    }
}

impl<A: 'static> Drop for Throttled<A> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Debounce `callback`; a zero interval is raised to 1ms.
pub fn wrap_debounce<A: 'static>(
    scheduler: Rc<dyn Scheduler>,
    interval_ms: u32,
    callback: impl Fn(A) + 'static,
) -> Debounced<A> {
    Debounced::build(scheduler, clamp_interval(interval_ms), callback)
}

/// Throttle `callback`; a zero interval is raised to 1ms.
pub fn wrap_throttle<A: 'static>(
    scheduler: Rc<dyn Scheduler>,
    interval_ms: u32,
    callback: impl Fn(A) + 'static,
) -> Throttled<A> {
    Throttled::build(scheduler, clamp_interval(interval_ms), callback)
}

fn clamp_interval(interval_ms: u32) -> u32 {
    if interval_ms == 0 {
        tracing::debug!("rate limit interval of 0ms raised to 1ms");
        1
    } else {
        interval_ms
    }
}
