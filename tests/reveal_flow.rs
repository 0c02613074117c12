#![cfg(not(target_arch = "wasm32"))]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use portfolio_wasm::reveal::{RevealEffect, VisibilityEntry};
use portfolio_wasm::scroll::{active_section, SectionOffset};
use portfolio_wasm::{
    wrap_debounce, wrap_throttle, ManualScheduler, RevealController, RevealOptions, RevealState,
    RevealTarget, VisibilitySource,
};

#[derive(Clone)]
struct Card {
    name: &'static str,
    progress: Option<&'static str>,
    log: Rc<RefCell<Vec<(&'static str, Option<String>)>>>,
}

impl RevealTarget for Card {
    type Key = &'static str;

    fn key(&self) -> &'static str {
        self.name
    }

    fn attribute(&self, name: &str) -> Option<String> {
        (name == "data-progress").then_some(self.progress?.to_owned())
    }

    fn apply_reveal(&self, effect: &RevealEffect) {
        self.log.borrow_mut().push((self.name, effect.fill_css()));
    }
}

/// Tracks which cards the host is currently asked to observe.
#[derive(Default)]
struct Observed(HashMap<&'static str, f64>);

impl VisibilitySource<Card> for Observed {
    fn observe(&mut self, element: &Card, options: &RevealOptions) {
        self.0.insert(element.name, options.visibility_threshold);
    }

    fn unobserve(&mut self, element: &Card) {
        self.0.remove(element.name);
    }

    fn disconnect(&mut self) {
        self.0.clear();
    }
}

fn entries(batch: &[(&'static str, f64)]) -> Vec<VisibilityEntry<&'static str>> {
    batch.iter().map(|&(key, fraction)| VisibilityEntry::new(key, fraction)).collect()
}

#[test]
fn three_cards_reveal_across_two_batches() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let card = |name| Card { name, progress: None, log: log.clone() };
    let mut controller = RevealController::new(Observed::default());
    let options = RevealOptions::default().with_threshold(0.15);
    for name in ["a", "b", "c"] {
        assert!(controller.register(card(name), &options));
    }

    controller.handle_batch(entries(&[("a", 0.2), ("b", 0.1), ("c", 0.9)]));
    assert_eq!(controller.state(&"a"), RevealState::Revealed);
    assert_eq!(controller.state(&"b"), RevealState::Observing);
    assert_eq!(controller.state(&"c"), RevealState::Revealed);
    assert_eq!(controller.source().0.keys().copied().collect::<Vec<_>>(), vec!["b"]);

    controller.handle_batch(entries(&[("b", 0.5)]));
    controller.handle_batch(entries(&[("a", 1.0), ("b", 1.0), ("c", 1.0)]));

    let names: Vec<_> = log.borrow().iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["a", "c", "b"]);
    assert!(controller.source().0.is_empty());
}

#[test]
fn skill_bar_fill_applied_once_and_missing_value_tolerated() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut controller = RevealController::new(Observed::default());
    let options = RevealOptions::default()
        .with_threshold(0.5)
        .with_progress_attribute("data-progress");
    controller.register(Card { name: "rust", progress: Some("73"), log: log.clone() }, &options);
    controller.register(Card { name: "css", progress: None, log: log.clone() }, &options);

    controller.handle_batch(entries(&[("rust", 0.6), ("css", 0.6), ("rust", 0.9)]));
    assert_eq!(
        *log.borrow(),
        vec![("rust", Some("73%".to_owned())), ("css", None)]
    );
}

#[test]
fn teardown_before_threshold_prevents_reveal() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut controller = RevealController::new(Observed::default());
    controller.register(Card { name: "late", progress: None, log: log.clone() }, &RevealOptions::default());
    controller.teardown();
    controller.handle_batch(entries(&[("late", 1.0)]));
    assert!(log.borrow().is_empty());
}

#[test]
fn throttled_scroll_with_trailing_settle_tracks_final_section() {
    let scheduler = Rc::new(ManualScheduler::new());
    let sections = vec![
        SectionOffset::new("home", 0.0),
        SectionOffset::new("about", 900.0),
        SectionOffset::new("projects", 1800.0),
    ];
    let position = Rc::new(RefCell::new(0.0));
    let highlighted = Rc::new(RefCell::new(Vec::<String>::new()));

    let update = {
        let position = position.clone();
        let highlighted = highlighted.clone();
        Rc::new(move || {
            let current = active_section(*position.borrow(), &sections, 200.0);
            highlighted.borrow_mut().push(current.unwrap_or_default().to_owned());
        })
    };
    let throttled = {
        let update = update.clone();
        wrap_throttle(scheduler.clone(), 100, move |()| update())
    };
    let settle = {
        let update = update.clone();
        wrap_debounce(scheduler.clone(), 100, move |()| update())
    };

    // 60 scroll events, one every 10ms, ending at y = 1770.
    for step in 0..60u32 {
        *position.borrow_mut() = f64::from(step) * 30.0;
        throttled.call(());
        settle.call(());
        scheduler.advance(10);
    }
    let during = highlighted.borrow().len();
    assert!(during <= 7, "throttle fired {during} times in 600ms");

    scheduler.advance(200);
    assert_eq!(highlighted.borrow().last().map(String::as_str), Some("projects"));
    assert_eq!(highlighted.borrow().len(), during + 1);
}
