//! `IntersectionObserver` as a [`VisibilitySource`].

use std::collections::HashMap;

use js_sys::Array;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use super::dom::{self, DomElement};
use crate::reveal::{RevealOptions, RevealTarget, VisibilityEntry, VisibilitySource};

type ObserverCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

/// One observer per distinct (threshold, margin) pair, all feeding one sink.
pub struct DomVisibility {
    observers: HashMap<String, IntersectionObserver>,
    membership: HashMap<u32, String>,
    callback: ObserverCallback,
}

impl DomVisibility {
    pub fn new(sink: impl Fn(Vec<VisibilityEntry<u32>>) + 'static) -> Self {
        let callback = Closure::wrap(Box::new(move |entries: Array, _: IntersectionObserver| {
            let batch: Vec<VisibilityEntry<u32>> = entries
                .iter()
                .filter_map(|value| value.dyn_into::<IntersectionObserverEntry>().ok())
                .filter_map(|entry| {
                    let key = dom::key_of(&entry.target())?;
                    let fraction = if entry.is_intersecting() {
                        entry.intersection_ratio()
                    } else {
                        0.0
                    };
                    Some(VisibilityEntry::new(key, fraction))
                })
                .collect();
            if !batch.is_empty() {
                sink(batch);
            }
        }) as Box<dyn FnMut(Array, IntersectionObserver)>);

        Self {
            observers: HashMap::new(),
            membership: HashMap::new(),
            callback,
        }
    }

    fn observer_for(&mut self, options: &RevealOptions) -> Option<(String, &IntersectionObserver)> {
        let threshold = options.effective_threshold();
        let root_margin = options.viewport_margin.root_margin();
        let id = format!("{threshold}|{root_margin}");
        if !self.observers.contains_key(&id) {
            let init = IntersectionObserverInit::new();
            init.set_threshold(&JsValue::from_f64(threshold));
            init.set_root_margin(&root_margin);
            match IntersectionObserver::new_with_options(
                self.callback.as_ref().unchecked_ref(),
                &init,
            ) {
                Ok(observer) => {
                    self.observers.insert(id.clone(), observer);
                }
                Err(err) => {
                    tracing::warn!(?err, %root_margin, threshold, "IntersectionObserver unavailable");
                    return None;
                }
            }
        }
        let observer = self.observers.get(&id)?;
        Some((id, observer))
    }
}

impl VisibilitySource<DomElement> for DomVisibility {
    fn observe(&mut self, element: &DomElement, options: &RevealOptions) {
        let Some((id, observer)) = self.observer_for(options) else {
            return;
        };
        observer.observe(element.element());
        self.membership.insert(element.key(), id);
    }

    fn unobserve(&mut self, element: &DomElement) {
        let Some(id) = self.membership.remove(&element.key()) else {
            return;
        };
        if let Some(observer) = self.observers.get(&id) {
            observer.unobserve(element.element());
        }
    }

    fn disconnect(&mut self) {
        for observer in self.observers.values() {
            observer.disconnect();
        }
        self.observers.clear();
        self.membership.clear();
    }
}

impl Drop for DomVisibility {
    fn drop(&mut self) {
        self.disconnect();
    }
}
