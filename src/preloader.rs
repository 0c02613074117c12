//! Load-time intro: hold, fade, done.

use std::cell::Cell;
use std::rc::Rc;

use crate::config::PreloaderConfig;
use crate::schedule::{Scheduler, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloaderPhase {
    Loading,
    FadingOut,
    Done,
}

/// The visual side of the preloader.
pub trait PreloaderView {
    fn begin_fade(&self, fade_ms: u32);
    fn finish(&self);
}

struct PreloaderState {
    scheduler: Rc<dyn Scheduler>,
    view: Rc<dyn PreloaderView>,
    fade_ms: u32,
    phase: Cell<PreloaderPhase>,
    timer: Cell<Option<TimerHandle>>,
}

/// Owns the preloader timers; dropping it cancels whatever has not run.
pub struct Preloader {
    state: Rc<PreloaderState>,
}

impl Preloader {
    pub fn start(
        scheduler: Rc<dyn Scheduler>,
        view: Rc<dyn PreloaderView>,
        config: &PreloaderConfig,
    ) -> Self {
        let state = Rc::new(PreloaderState {
            scheduler,
            view,
            fade_ms: config.fade_ms,
            phase: Cell::new(PreloaderPhase::Loading),
            timer: Cell::new(None),
        });
        let weak = Rc::downgrade(&state);
        let handle = state.scheduler.schedule_after(
            config.hold_ms,
            Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    begin_fade(&state);
                }
            }),
        );
        match handle {
            Some(handle) => state.timer.set(Some(handle)),
            None => begin_fade(&state),
        }
        tracing::debug!(hold_ms = config.hold_ms, fade_ms = config.fade_ms, "preloader started");
        Self { state }
    }

    pub fn phase(&self) -> PreloaderPhase {
        self.state.phase.get()
    }

    pub fn is_loading(&self) -> bool {
        self.phase() != PreloaderPhase::Done
    }

    pub fn cancel(&self) {
        if let Some(handle) = self.state.timer.take() {
            self.state.scheduler.cancel(handle);
        }
    }
}

impl Drop for Preloader {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn begin_fade(state: &Rc<PreloaderState>) {
    state.phase.set(PreloaderPhase::FadingOut);
    state.view.begin_fade(state.fade_ms);
    let weak = Rc::downgrade(state);
    let handle = state.scheduler.schedule_after(
        state.fade_ms,
        Box::new(move || {
            if let Some(state) = weak.upgrade() {
                finish(&state);
            }
        }),
    );
    match handle {
        Some(handle) => state.timer.set(Some(handle)),
        // No timers: skip straight to the end rather than sit on the overlay.
        None => finish(state),
    }
}

fn finish(state: &PreloaderState) {
    state.timer.set(None);
    state.phase.set(PreloaderPhase::Done);
    state.view.finish();
    tracing::debug!("preloader finished");
}
