#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use portfolio_wasm::reveal::VisibilityEntry;
use portfolio_wasm::{
    boot, is_running, pending_reveals, teardown, wrap_debounce, wrap_throttle, BrowserScheduler,
    DomElement, DomVisibility, RevealController, RevealOptions, RevealTarget,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

const PAGE: &str = r##"
<nav class="nav">
    <button class="menu-toggle"></button>
    <ul class="nav-menu"><li><a href="#about" class="nav-link">About</a></li></ul>
</nav>
<div class="hero-content">hi</div>
<section id="about"><div class="skill-progress" data-progress="60"></div></section>
<section id="projects"><div class="projects-grid"></div></section>
"##;

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

fn html(selector: &str) -> HtmlElement {
    document()
        .query_selector(selector)
        .unwrap()
        .expect("element present")
        .dyn_into()
        .unwrap()
}

async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

#[wasm_bindgen_test]
fn boot_wires_page_and_teardown_unwires_it() {
    document().body().unwrap().set_inner_html(PAGE);
    boot().unwrap();
    assert!(is_running());

    let cards = document().query_selector_all(".projects-grid .project-card").unwrap();
    assert_eq!(cards.length(), 4);
    assert!(pending_reveals() > 0);
    assert_eq!(document().query_selector_all(".scroll-progress").unwrap().length(), 1);

    let toggle = html(".menu-toggle");
    let menu = html(".nav-menu");
    toggle.click();
    assert!(menu.class_list().contains("active"));
    assert!(toggle.class_list().contains("active"));
    html(".nav-link").click();
    assert!(!menu.class_list().contains("active"));
    assert!(!toggle.class_list().contains("active"));

    teardown();
    assert!(!is_running());
    assert_eq!(pending_reveals(), 0);
    assert_eq!(document().query_selector_all(".scroll-progress").unwrap().length(), 0);
    toggle.click();
    assert!(!menu.class_list().contains("active"));
}

#[wasm_bindgen_test]
fn booting_twice_keeps_one_set_of_project_cards() {
    document().body().unwrap().set_inner_html(PAGE);
    boot().unwrap();
    boot().unwrap();

    let cards = document().query_selector_all(".projects-grid .project-card").unwrap();
    assert_eq!(cards.length(), 4);
    assert_eq!(document().query_selector_all(".scroll-progress").unwrap().length(), 1);

    teardown();
    let cards = document().query_selector_all(".projects-grid .project-card").unwrap();
    assert_eq!(cards.length(), 0);
}

#[wasm_bindgen_test]
fn reveal_applies_fill_width_to_dom_element() {
    let bar: HtmlElement = document().create_element("div").unwrap().dyn_into().unwrap();
    bar.set_attribute("data-progress", "73").unwrap();
    document().body().unwrap().append_child(&bar).unwrap();

    let element = DomElement::new(bar.clone());
    assert_eq!(DomElement::new(bar.clone()).key(), element.key());

    let mut controller = RevealController::new(DomVisibility::new(|_| {}));
    let options = RevealOptions::default().with_progress_attribute("data-progress");
    assert!(controller.register(element.clone(), &options));
    assert_eq!(controller.handle_batch(vec![VisibilityEntry::new(element.key(), 1.0)]), 1);

    assert_eq!(bar.style().get_property_value("width").unwrap(), "73%");
    assert!(bar.class_list().contains("visible"));
}

#[wasm_bindgen_test]
async fn debounce_on_browser_timers_fires_once_with_last_value() {
    let window = web_sys::window().unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let debounced = wrap_debounce(Rc::new(BrowserScheduler::new(window)), 30, move |v: u32| {
        sink.borrow_mut().push(v)
    });

    debounced.call(1);
    debounced.call(2);
    debounced.call(3);
    sleep(10).await;
    assert!(seen.borrow().is_empty());

    sleep(80).await;
    assert_eq!(*seen.borrow(), vec![3]);
}

#[wasm_bindgen_test]
async fn dropped_debounce_never_fires() {
    let window = web_sys::window().unwrap();
    let seen = Rc::new(RefCell::new(0));
    let sink = seen.clone();
    let debounced = wrap_debounce(Rc::new(BrowserScheduler::new(window)), 20, move |()| {
        *sink.borrow_mut() += 1
    });
    debounced.call(());
    drop(debounced);

    sleep(60).await;
    assert_eq!(*seen.borrow(), 0);
}

#[wasm_bindgen_test]
async fn throttle_on_browser_timers_runs_leading_call_and_drops_the_burst() {
    let window = web_sys::window().unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let throttled = wrap_throttle(Rc::new(BrowserScheduler::new(window)), 30, move |v: u32| {
        sink.borrow_mut().push(v)
    });

    assert!(throttled.call(1));
    assert!(!throttled.call(2));
    assert!(!throttled.call(3));
    assert!(throttled.in_cooldown());
    assert_eq!(throttled.dropped_calls(), 2);

    sleep(80).await;
    assert!(!throttled.in_cooldown());
    assert!(throttled.call(4));
    assert_eq!(*seen.borrow(), vec![1, 4]);
}
