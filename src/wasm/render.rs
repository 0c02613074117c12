//! Per-frame scroll visuals: hero parallax and the progress bar.
//!
//! Scroll handlers only record the latest position; the actual style writes
//! happen once per animation frame, however many scroll events arrived.

use std::cell::Cell;
use std::rc::Rc;

use web_sys::{Element, HtmlElement};

use super::dom::set_style;
use crate::config::ScrollConfig;
use crate::schedule::{Scheduler, TimerHandle};
use crate::scroll::{parallax_frame, scroll_progress_percent};

pub struct FrameTargets {
    pub hero: Option<HtmlElement>,
    pub progress_bar: Option<HtmlElement>,
    pub root: Option<Element>,
}

struct RenderState {
    scheduler: Rc<dyn Scheduler>,
    targets: FrameTargets,
    parallax_factor: f64,
    fade_px: f64,
    scroll_y: Cell<f64>,
    pending: Cell<Option<TimerHandle>>,
}

pub struct FrameRenderer {
    state: Rc<RenderState>,
}

impl FrameRenderer {
    pub fn new(scheduler: Rc<dyn Scheduler>, targets: FrameTargets, config: &ScrollConfig) -> Self {
        Self {
            state: Rc::new(RenderState {
                scheduler,
                targets,
                parallax_factor: config.parallax_factor,
                fade_px: config.parallax_fade_px,
                scroll_y: Cell::new(0.0),
                pending: Cell::new(None),
            }),
        }
    }

    /// Record `scroll_y` and make sure a frame is queued to draw it.
    pub fn request(&self, scroll_y: f64) {
        self.state.scroll_y.set(scroll_y);
        if self.state.pending.get().is_some() {
            return;
        }
        let weak = Rc::downgrade(&self.state);
        let handle = self.state.scheduler.request_frame(Box::new(move || {
            if let Some(state) = weak.upgrade() {
                state.pending.set(None);
                draw(&state);
            }
        }));
        // A refused frame leaves nothing pending, so the next scroll retries.
        self.state.pending.set(handle);
    }
}

impl Drop for FrameRenderer {
    fn drop(&mut self) {
        if let Some(handle) = self.state.pending.take() {
            self.state.scheduler.cancel_frame(handle);
        }
    }
}

fn draw(state: &RenderState) {
    let scroll_y = state.scroll_y.get();
    if let Some(hero) = &state.targets.hero {
        let frame = parallax_frame(scroll_y, state.parallax_factor, state.fade_px);
        set_style(hero, "transform", &frame.transform_css());
        set_style(hero, "opacity", &frame.opacity.to_string());
    }
    if let (Some(bar), Some(root)) = (&state.targets.progress_bar, &state.targets.root) {
        let percent = scroll_progress_percent(
            scroll_y,
            f64::from(root.scroll_height()),
            f64::from(root.client_height()),
        );
        set_style(bar, "width", &format!("{percent}%"));
    }
}
