use std::cell::Cell;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::config::{SiteConfig, CONFIG_ELEMENT_ID};
use crate::reveal::{RevealEffect, RevealTarget};

/// Attribute carrying the reveal key, so observer entries map back to watch entries.
pub const KEY_ATTRIBUTE: &str = "data-reveal-key";

pub const VISIBLE_CLASS: &str = "visible";

thread_local! {
    static NEXT_KEY: Cell<u32> = const { Cell::new(1) };
}

/// An element handle that the reveal controller can track.
#[derive(Clone)]
pub struct DomElement {
    element: HtmlElement,
    key: u32,
}

impl DomElement {
    pub fn new(element: HtmlElement) -> Self {
        let key = match key_of(&element) {
            Some(key) => key,
            None => {
                let key = NEXT_KEY.with(|next| {
                    let key = next.get();
                    next.set(key.wrapping_add(1));
                    key
                });
                if element.set_attribute(KEY_ATTRIBUTE, &key.to_string()).is_err() {
                    tracing::debug!(key, "could not tag element with reveal key");
                }
                key
            }
        };
        Self { element, key }
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }
}

pub fn key_of(element: &Element) -> Option<u32> {
    element.get_attribute(KEY_ATTRIBUTE)?.parse().ok()
}

impl RevealTarget for DomElement {
    type Key = u32;

    fn key(&self) -> u32 {
        self.key
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }

    fn apply_reveal(&self, effect: &RevealEffect) {
        set_style(&self.element, "opacity", "1");
        set_style(&self.element, "transform", "translateY(0)");
        if let Some(width) = effect.fill_css() {
            set_style(&self.element, "width", &width);
        }
        toggle_class(&self.element, VISIBLE_CLASS, true);
    }
}

/// Style writes never abort the page; failures are logged and skipped.
pub fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(err) = element.style().set_property(property, value) {
        tracing::debug!(property, ?err, "style write failed");
    }
}

/// Class writes follow the same rule as style writes.
pub fn toggle_class(element: &Element, class: &str, on: bool) {
    if let Err(err) = element.class_list().toggle_with_force(class, on) {
        tracing::debug!(class, ?err, "class toggle failed");
    }
}

pub fn query(document: &Document, selector: &str) -> Option<HtmlElement> {
    match document.query_selector(selector) {
        Ok(found) => found.and_then(|element| element.dyn_into::<HtmlElement>().ok()),
        Err(err) => {
            tracing::debug!(selector, ?err, "invalid selector");
            None
        }
    }
}

pub fn query_all(document: &Document, selector: &str) -> Vec<HtmlElement> {
    let list = match document.query_selector_all(selector) {
        Ok(list) => list,
        Err(err) => {
            tracing::debug!(selector, ?err, "invalid selector");
            return Vec::new();
        }
    };
    (0..list.length())
        .filter_map(|index| list.get(index))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

/// Read the optional JSON config block.
pub fn load_config(document: &Document) -> SiteConfig {
    let raw = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|element| element.text_content());
    SiteConfig::from_optional_json(raw.as_deref())
}
