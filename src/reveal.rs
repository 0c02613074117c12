//! One-shot, threshold-gated reveal of watched elements.
//!
//! Each element moves `Unobserved -> Observing -> Revealed` exactly once.
//! Visibility arrives in batches from a [`VisibilitySource`]; an element whose
//! visible fraction meets its threshold is dropped from the watch set and
//! unobserved *before* its effect is applied, so nothing done by the effect
//! can make it look like it is still being watched.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

/// Fraction of an element that must be on screen before it reveals.
pub const DEFAULT_VISIBILITY_THRESHOLD: f64 = 0.15;

/// Slack allowed below a threshold; hosts round reported ratios, so a crossing
/// can arrive a hair under the threshold it crossed.
pub const RATIO_TOLERANCE: f64 = 1e-6;

/// Bottom inset of the visibility test region, in CSS pixels.
pub const DEFAULT_BOTTOM_MARGIN_PX: i32 = -50;

/// A node that can be revealed.
pub trait RevealTarget: Clone {
    type Key: Clone + Eq + Hash + fmt::Debug;

    /// Stable identity; two handles to the same node must share a key.
    fn key(&self) -> Self::Key;

    fn attribute(&self, name: &str) -> Option<String>;

    fn apply_reveal(&self, effect: &RevealEffect);
}

/// Host hook that reports visible-fraction changes for observed elements.
pub trait VisibilitySource<E: RevealTarget> {
    fn observe(&mut self, element: &E, options: &RevealOptions);
    fn unobserve(&mut self, element: &E);
    fn disconnect(&mut self);
}

/// Grows (positive) or shrinks (negative) the viewport used for the test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportMargin {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl ViewportMargin {
    pub const ZERO: Self = Self { top: 0, right: 0, bottom: 0, left: 0 };

    pub fn bottom(px: i32) -> Self {
        Self { bottom: px, ..Self::ZERO }
    }

    /// CSS `rootMargin` form, e.g. `"0px 0px -50px 0px"`.
    pub fn root_margin(&self) -> String {
        format!("{}px {}px {}px {}px", self.top, self.right, self.bottom, self.left)
    }
}

impl Default for ViewportMargin {
    fn default() -> Self {
        Self::bottom(DEFAULT_BOTTOM_MARGIN_PX)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevealOptions {
    pub visibility_threshold: f64,
    pub viewport_margin: ViewportMargin,
    /// Numeric attribute read at registration and applied as a fill width.
    pub progress_attribute: Option<String>,
}

impl RevealOptions {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.visibility_threshold = threshold;
        self
    }

    pub fn with_margin(mut self, margin: ViewportMargin) -> Self {
        self.viewport_margin = margin;
        self
    }

    pub fn with_progress_attribute(mut self, name: impl Into<String>) -> Self {
        self.progress_attribute = Some(name.into());
        self
    }

    /// Threshold clamped into `[0, 1]`; NaN falls back to the default.
    pub fn effective_threshold(&self) -> f64 {
        if self.visibility_threshold.is_nan() {
            DEFAULT_VISIBILITY_THRESHOLD
        } else {
            self.visibility_threshold.clamp(0.0, 1.0)
        }
    }
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
            viewport_margin: ViewportMargin::default(),
            progress_attribute: None,
        }
    }
}

/// One element's visible fraction as reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityEntry<K> {
    pub key: K,
    pub fraction: f64,
}

impl<K> VisibilityEntry<K> {
    pub fn new(key: K, fraction: f64) -> Self {
        Self { key, fraction }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Unobserved,
    Observing,
    Revealed,
}

/// What to do to an element at reveal time.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealEffect {
    /// Fill target in percent, when the element carried a usable progress value.
    pub fill_percent: Option<f64>,
}

impl RevealEffect {
    pub fn fill_css(&self) -> Option<String> {
        self.fill_percent.map(|value| format!("{value}%"))
    }
}

/// Lenient progress parsing: anything that is not a finite number is "no value".
pub fn parse_progress(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().trim_end_matches('%').trim_end().parse().ok()?;
    value.is_finite().then(|| value.clamp(0.0, 100.0))
}

struct Watched<E> {
    element: E,
    threshold: f64,
    target_value: Option<f64>,
}

/// An element that crossed its threshold and still needs its effect applied.
#[derive(Debug, Clone)]
pub struct PendingReveal<E> {
    pub element: E,
    pub effect: RevealEffect,
}

impl<E: RevealTarget> PendingReveal<E> {
    pub fn apply(&self) {
        self.element.apply_reveal(&self.effect);
    }
}

pub struct RevealController<E: RevealTarget, S: VisibilitySource<E>> {
    source: S,
    watched: HashMap<E::Key, Watched<E>>,
    revealed: HashSet<E::Key>,
    torn_down: bool,
}

impl<E: RevealTarget, S: VisibilitySource<E>> RevealController<E, S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            watched: HashMap::new(),
            revealed: HashSet::new(),
            torn_down: false,
        }
    }

    /// Start watching `element`. Returns `false` (and does nothing) when the
    /// element is already watched, already revealed, or the controller is torn down.
    pub fn register(&mut self, element: E, options: &RevealOptions) -> bool {
        let key = element.key();
        if self.torn_down {
            tracing::debug!(?key, "register after teardown ignored");
            return false;
        }
        if self.watched.contains_key(&key) || self.revealed.contains(&key) {
            return false;
        }

        let target_value = options.progress_attribute.as_deref().and_then(|name| {
            let parsed = element.attribute(name).as_deref().and_then(parse_progress);
            if parsed.is_none() {
                tracing::debug!(?key, attribute = name, "no usable progress value");
            }
            parsed
        });

        self.source.observe(&element, options);
        self.watched.insert(
            key,
            Watched {
                element,
                threshold: options.effective_threshold(),
                target_value,
            },
        );
        true
    }

    /// Stop watching an element that has not revealed yet.
    pub fn unregister(&mut self, key: &E::Key) -> bool {
        match self.watched.remove(key) {
            Some(watched) => {
                self.source.unobserve(&watched.element);
                true
            }
            None => false,
        }
    }

    /// Update state for one visibility batch and hand back the effects to apply.
    ///
    /// Entries for unknown, unregistered or already revealed keys are ignored.
    pub fn process_batch<I>(&mut self, entries: I) -> Vec<PendingReveal<E>>
    where
        I: IntoIterator<Item = VisibilityEntry<E::Key>>,
    {
        if self.torn_down {
            return Vec::new();
        }
        let mut pending = Vec::new();
        for entry in entries {
            let crossed = self
                .watched
                .get(&entry.key)
                .is_some_and(|watched| entry.fraction >= watched.threshold - RATIO_TOLERANCE);
            if !crossed {
                continue;
            }
            let Some(watched) = self.watched.remove(&entry.key) else {
                continue;
            };
            self.source.unobserve(&watched.element);
            self.revealed.insert(entry.key);
            pending.push(PendingReveal {
                element: watched.element,
                effect: RevealEffect {
                    fill_percent: watched.target_value,
                },
            });
        }
        if !pending.is_empty() {
            tracing::trace!(revealed = pending.len(), watching = self.watched.len(), "reveal batch");
        }
        pending
    }

    /// [`process_batch`](Self::process_batch) and apply the effects in report order.
    pub fn handle_batch<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = VisibilityEntry<E::Key>>,
    {
        let pending = self.process_batch(entries);
        for reveal in &pending {
            reveal.apply();
        }
        pending.len()
    }

    /// Disconnect from the source and forget every watched element.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.source.disconnect();
        self.watched.clear();
        self.torn_down = true;
    }

    pub fn state(&self, key: &E::Key) -> RevealState {
        if self.revealed.contains(key) {
            RevealState::Revealed
        } else if self.watched.contains_key(key) {
            RevealState::Observing
        } else {
            RevealState::Unobserved
        }
    }

    pub fn is_revealed(&self, key: &E::Key) -> bool {
        self.revealed.contains(key)
    }

    pub fn watched_len(&self) -> usize {
        self.watched.len()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<E: RevealTarget, S: VisibilitySource<E>> Drop for RevealController<E, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
