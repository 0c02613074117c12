//! Client-side behavior for a static portfolio site.
//!
//! The target-independent core (rate limiting, one-shot reveals, scroll math,
//! the preloader sequence) builds and tests on the host. The `wasm` module binds
//! it to the browser and only exists on `wasm32`.

pub mod config;
pub mod contact;
pub mod error;
pub mod logging;
pub mod nav;
pub mod pointer;
pub mod preloader;
pub mod projects;
pub mod rate_limit;
pub mod reveal;
pub mod schedule;
pub mod scroll;

pub use config::SiteConfig;
pub use error::{RateLimitError, SiteError};
pub use rate_limit::{wrap_debounce, wrap_throttle, Debounced, Throttled};
pub use reveal::{RevealController, RevealOptions, RevealState, RevealTarget, VisibilitySource};
pub use schedule::{ManualScheduler, Scheduler, TimerHandle};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;

    use tracing::Level;
    use wasm_bindgen::prelude::*;

    use crate::error::SiteError;

    mod dom;
    mod listener;
    mod page;
    mod render;
    mod timer;
    mod visibility;

    pub use dom::DomElement;
    pub use listener::EventListener;
    pub use timer::BrowserScheduler;
    pub use visibility::DomVisibility;

    thread_local! {
        static PAGE: RefCell<Option<page::PageContext>> = const { RefCell::new(None) };
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();
        crate::logging::init(Level::INFO);

        boot()
    }

    /// Wire up the page, replacing (and tearing down) any previous instance.
    #[wasm_bindgen]
    pub fn boot() -> Result<(), JsValue> {
        let window = web_sys::window().ok_or(SiteError::MissingWindow)?;
        let document = window.document().ok_or(SiteError::MissingDocument)?;
        let config = dom::load_config(&document);

        drop(PAGE.with(|slot| slot.borrow_mut().take()));
        let page = page::PageContext::init(window, document, config)?;
        PAGE.with(|slot| *slot.borrow_mut() = Some(page));
        Ok(())
    }

    /// Remove every listener, cancel pending timers and disconnect observers.
    #[wasm_bindgen]
    pub fn teardown() {
        drop(PAGE.with(|slot| slot.borrow_mut().take()));
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running() -> bool {
        PAGE.with(|slot| slot.borrow().is_some())
    }

    /// Elements still waiting for their reveal, or 0 when no page is running.
    #[wasm_bindgen(js_name = pendingReveals)]
    pub fn pending_reveals() -> usize {
        PAGE.with(|slot| slot.borrow().as_ref().map_or(0, page::PageContext::watched_len))
    }

    #[wasm_bindgen(js_name = isLoading)]
    pub fn is_loading() -> bool {
        PAGE.with(|slot| slot.borrow().as_ref().is_some_and(page::PageContext::is_loading))
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::{
    boot, is_loading, is_running, pending_reveals, teardown, BrowserScheduler, DomElement,
    DomVisibility, EventListener,
};
