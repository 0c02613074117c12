//! `setTimeout` / `requestAnimationFrame` behind [`Scheduler`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Window;

use crate::schedule::{Scheduler, Task, TimerHandle};

struct Slot {
    js_handle: i32,
    task: Option<Task>,
    _callback: Closure<dyn FnMut()>,
}

/// Live JS callbacks by id. A callback that has run is parked in `finished`
/// and freed on the next sweep, never from inside its own invocation.
#[derive(Default)]
struct Slots {
    entries: HashMap<u64, Slot>,
    finished: Vec<u64>,
}

impl Slots {
    fn sweep(slots: &RefCell<Slots>) {
        let dead: Vec<Slot> = {
            let mut slots = slots.borrow_mut();
            let finished = std::mem::take(&mut slots.finished);
            finished.iter().filter_map(|id| slots.entries.remove(id)).collect()
        };
        drop(dead);
    }

    /// Detach a slot that has not run yet. A slot whose task is already taken
    /// is running (or ran) and is left for the sweep.
    fn detach(slots: &RefCell<Slots>, id: u64) -> Option<i32> {
        let removed = {
            let mut slots = slots.borrow_mut();
            let running = slots.entries.get(&id).is_some_and(|slot| slot.task.is_none());
            if running {
                slots.finished.push(id);
                return None;
            }
            slots.entries.remove(&id)
        };
        removed.map(|slot| slot.js_handle)
    }
}

pub struct BrowserScheduler {
    window: Window,
    next_id: Cell<u64>,
    timers: Rc<RefCell<Slots>>,
    frames: Rc<RefCell<Slots>>,
}

impl BrowserScheduler {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            next_id: Cell::new(0),
            timers: Rc::default(),
            frames: Rc::default(),
        }
    }

    fn arm(
        &self,
        slots: &Rc<RefCell<Slots>>,
        task: Task,
        register: impl FnOnce(&js_sys::Function) -> Result<i32, JsValue>,
    ) -> Option<TimerHandle> {
        Slots::sweep(slots);
        let id = self.next_id.get() + 1;
        self.next_id.set(id);

        let weak: Weak<RefCell<Slots>> = Rc::downgrade(slots);
        let callback = Closure::wrap(Box::new(move || {
            let Some(slots) = weak.upgrade() else { return };
            let task = slots
                .borrow_mut()
                .entries
                .get_mut(&id)
                .and_then(|slot| slot.task.take());
            if let Some(task) = task {
                task();
            }
            slots.borrow_mut().finished.push(id);
        }) as Box<dyn FnMut()>);

        match register(callback.as_ref().unchecked_ref()) {
            Ok(js_handle) => {
                slots.borrow_mut().entries.insert(
                    id,
                    Slot {
                        js_handle,
                        task: Some(task),
                        _callback: callback,
                    },
                );
                Some(TimerHandle(id))
            }
            Err(err) => {
                tracing::warn!(?err, "failed to schedule callback");
                None
            }
        }
    }
}

impl Scheduler for BrowserScheduler {
    fn schedule_after(&self, delay_ms: u32, task: Task) -> Option<TimerHandle> {
        let window = self.window.clone();
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        self.arm(&self.timers, task, move |callback| {
            window.set_timeout_with_callback_and_timeout_and_arguments_0(callback, delay)
        })
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(js_handle) = Slots::detach(&self.timers, handle.0) {
            self.window.clear_timeout_with_handle(js_handle);
        }
    }

    fn request_frame(&self, task: Task) -> Option<TimerHandle> {
        let window = self.window.clone();
        self.arm(&self.frames, task, move |callback| window.request_animation_frame(callback))
    }

    fn cancel_frame(&self, handle: TimerHandle) {
        if let Some(js_handle) = Slots::detach(&self.frames, handle.0) {
            let _ = self.window.cancel_animation_frame(js_handle);
        }
    }
}

impl Drop for BrowserScheduler {
    fn drop(&mut self) {
        for slot in self.timers.borrow().entries.values() {
            self.window.clear_timeout_with_handle(slot.js_handle);
        }
        for slot in self.frames.borrow().entries.values() {
            let _ = self.window.cancel_animation_frame(slot.js_handle);
        }
    }
}
