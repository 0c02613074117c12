//! Page bootstrap: everything the page wires up is owned by [`PageContext`]
//! and released when it is dropped.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement,
    MouseEvent, ScrollBehavior, ScrollToOptions, Window,
};

use super::dom::{query, query_all, set_style, toggle_class, DomElement};
use super::listener::EventListener;
use super::render::{FrameRenderer, FrameTargets};
use super::timer::BrowserScheduler;
use super::visibility::DomVisibility;
use crate::config::SiteConfig;
use crate::contact::{acknowledge, ContactSubmission};
use crate::error::SiteError;
use crate::nav::{MenuState, ACTIVE_CLASS};
use crate::pointer::pointer_fraction;
use crate::preloader::{Preloader, PreloaderView};
use crate::projects::{default_projects, render_card_html};
use crate::rate_limit::{wrap_debounce, wrap_throttle, Debounced, Throttled};
use crate::reveal::RevealController;
use crate::schedule::Scheduler;
use crate::scroll::{active_section, anchor_scroll_target, SectionOffset};

type SharedReveal = Rc<RefCell<RevealController<DomElement, DomVisibility>>>;

pub const PROGRESS_BAR_CLASS: &str = "scroll-progress";

const PROGRESS_BAR_CSS: &str = "position: fixed; top: 0; left: 0; width: 0%; height: 3px; \
     background: linear-gradient(90deg, #00ff88, #00d4ff); z-index: 9999; \
     transition: width 0.1s ease;";

pub struct PageContext {
    listeners: Vec<EventListener>,
    cards: Vec<Element>,
    reveals: SharedReveal,
    skills: SharedReveal,
    preloader: Option<Preloader>,
    scroll: Rc<Throttled<()>>,
    settle: Rc<Debounced<()>>,
    resize: Rc<Debounced<()>>,
    progress_bar: Option<HtmlElement>,
    _renderer: Rc<FrameRenderer>,
    _scheduler: Rc<dyn Scheduler>,
}

impl PageContext {
    pub fn init(window: Window, document: Document, config: SiteConfig) -> Result<Self, SiteError> {
        let scheduler: Rc<dyn Scheduler> = Rc::new(BrowserScheduler::new(window.clone()));
        let mut listeners = Vec::new();

        let cards = render_projects(&document);
        let reveals = reveal_controller();
        register_reveal_groups(&document, &config, &reveals);
        let skills = reveal_controller();
        register_skill_bars(&document, &config, &skills);

        listeners.extend(wire_menu(&document)?);
        listeners.extend(wire_anchor_scroll(&window, &document)?);

        let progress_bar = create_progress_bar(&document);
        let root = document.document_element();
        let renderer = Rc::new(FrameRenderer::new(
            scheduler.clone(),
            FrameTargets {
                hero: query(&document, ".hero-content"),
                progress_bar: progress_bar.clone(),
                root: root.clone(),
            },
            &config.scroll,
        ));

        let offsets = Rc::new(RefCell::new(measure_sections(&document)));
        let update: Rc<dyn Fn()> = {
            let window = window.clone();
            let nav_links = query_all(&document, ".nav-link");
            let offsets = offsets.clone();
            let renderer = renderer.clone();
            let nav_offset = config.scroll.nav_offset_px;
            Rc::new(move || {
                let scroll_y = window.page_y_offset().unwrap_or(0.0);
                let offsets = offsets.borrow();
                highlight_nav(&nav_links, active_section(scroll_y, &offsets, nav_offset));
                renderer.request(scroll_y);
            })
        };

        let scroll = {
            let update = update.clone();
            Rc::new(wrap_throttle(scheduler.clone(), config.scroll.throttle_ms, move |()| update()))
        };
        // Throttling drops the tail of a scroll; one trailing pass settles it.
        let settle = {
            let update = update.clone();
            Rc::new(wrap_debounce(scheduler.clone(), config.scroll.throttle_ms, move |()| update()))
        };
        let resize = {
            let update = update.clone();
            let document = document.clone();
            let offsets = offsets.clone();
            Rc::new(wrap_debounce(scheduler.clone(), config.scroll.resize_debounce_ms, move |()| {
                *offsets.borrow_mut() = measure_sections(&document);
                update();
            }))
        };

        {
            let scroll = scroll.clone();
            let settle = settle.clone();
            listeners.push(EventListener::new(&window, "scroll", move |_| {
                scroll.call(());
                settle.call(());
            })?);
        }
        {
            let resize = resize.clone();
            listeners.push(EventListener::new(&window, "resize", move |_| resize.call(()))?);
        }

        if let Some(root) = root.and_then(|root| root.dyn_into::<HtmlElement>().ok()) {
            listeners.push(wire_pointer_vars(&window, &document, root)?);
        }
        let alert_window = window.clone();
        listeners.extend(wire_contact_form(&document, move |message| {
            if let Err(err) = alert_window.alert_with_message(message) {
                tracing::debug!(?err, "alert blocked");
            }
        })?);
        listeners.extend(wire_logo_glitch(&document)?);

        let preloader = start_preloader(&document, scheduler.clone(), &config);
        update();

        tracing::info!(
            watching = reveals.borrow().watched_len(),
            skill_bars = skills.borrow().watched_len(),
            listeners = listeners.len(),
            "portfolio page ready"
        );

        Ok(Self {
            listeners,
            cards,
            reveals,
            skills,
            preloader,
            scroll,
            settle,
            resize,
            progress_bar,
            _renderer: renderer,
            _scheduler: scheduler,
        })
    }

    pub fn watched_len(&self) -> usize {
        self.reveals.borrow().watched_len() + self.skills.borrow().watched_len()
    }

    pub fn is_loading(&self) -> bool {
        self.preloader.as_ref().is_some_and(Preloader::is_loading)
    }
}

impl Drop for PageContext {
    fn drop(&mut self) {
        // Listeners go first so no handler can run against a half-torn page.
        self.listeners.clear();
        self.reveals.borrow_mut().teardown();
        self.skills.borrow_mut().teardown();
        drop(self.preloader.take());
        self.scroll.cancel();
        self.settle.cancel();
        self.resize.cancel();
        if let Some(bar) = self.progress_bar.take() {
            bar.remove();
        }
        for card in self.cards.drain(..) {
            card.remove();
        }
        tracing::info!("portfolio page torn down");
    }
}

fn reveal_controller() -> SharedReveal {
    Rc::new_cyclic(|weak: &Weak<RefCell<RevealController<DomElement, DomVisibility>>>| {
        let weak = weak.clone();
        let source = DomVisibility::new(move |batch| {
            let Some(controller) = weak.upgrade() else {
                return;
            };
            let pending = match controller.try_borrow_mut() {
                Ok(mut controller) => controller.process_batch(batch),
                Err(_) => {
                    tracing::warn!("visibility batch arrived during reveal update; dropped");
                    return;
                }
            };
            for reveal in &pending {
                reveal.apply();
            }
        });
        RefCell::new(RevealController::new(source))
    })
}

/// Appends one card per project and returns them so teardown can take them out.
fn render_projects(document: &Document) -> Vec<Element> {
    let Some(grid) = query(document, ".projects-grid") else {
        tracing::debug!("no .projects-grid; skipping project cards");
        return Vec::new();
    };
    let mut cards = Vec::new();
    for (index, project) in default_projects().iter().enumerate() {
        let card = match document.create_element("article") {
            Ok(card) => card,
            Err(err) => {
                tracing::warn!(?err, "could not create project card");
                break;
            }
        };
        toggle_class(&card, "project-card", true);
        card.set_inner_html(&render_card_html(index, project));
        match grid.append_child(&card) {
            Ok(_) => cards.push(card),
            Err(err) => tracing::warn!(?err, "could not append project card"),
        }
    }
    cards
}

fn register_reveal_groups(document: &Document, config: &SiteConfig, reveals: &SharedReveal) {
    let options = config.reveal.options();
    let hidden = format!("translateY({}px)", config.reveal.offset_px);
    let mut controller = reveals.borrow_mut();
    for group in &config.reveal.groups {
        let elements = query_all(document, &group.selector);
        if elements.is_empty() {
            tracing::debug!(selector = %group.selector, "no elements to reveal");
        }
        for (index, element) in elements.into_iter().enumerate() {
            let element = DomElement::new(element);
            if controller.register(element.clone(), &options) {
                let node = element.element();
                set_style(node, "opacity", "0");
                set_style(node, "transform", &hidden);
                set_style(node, "transition", &group.transition(index, config.reveal.duration_ms));
            }
        }
    }
}

fn register_skill_bars(document: &Document, config: &SiteConfig, skills: &SharedReveal) {
    let options = config.skills.options();
    let mut controller = skills.borrow_mut();
    for bar in query_all(document, &config.skills.selector) {
        set_style(&bar, "width", "0%");
        controller.register(DomElement::new(bar), &options);
    }
}

fn wire_menu(document: &Document) -> Result<Vec<EventListener>, SiteError> {
    let (Some(toggle), Some(menu)) = (query(document, ".menu-toggle"), query(document, ".nav-menu"))
    else {
        tracing::debug!("no mobile menu on this page");
        return Ok(Vec::new());
    };
    let state = Rc::new(Cell::new(MenuState::default()));
    let mut listeners = Vec::new();

    {
        let (state, button, menu) = (state.clone(), toggle.clone(), menu.clone());
        listeners.push(EventListener::new(&toggle, "click", move |_| {
            let mut current = state.get();
            let open = current.toggle();
            state.set(current);
            show_menu(&button, &menu, open);
        })?);
    }
    for link in query_all(document, ".nav-link") {
        let (state, button, menu) = (state.clone(), toggle.clone(), menu.clone());
        listeners.push(EventListener::new(&link, "click", move |_| {
            let mut current = state.get();
            if current.close() {
                state.set(current);
                show_menu(&button, &menu, false);
            }
        })?);
    }
    Ok(listeners)
}

fn show_menu(button: &HtmlElement, menu: &HtmlElement, open: bool) {
    toggle_class(button, ACTIVE_CLASS, open);
    toggle_class(menu, ACTIVE_CLASS, open);
}

fn wire_anchor_scroll(window: &Window, document: &Document) -> Result<Vec<EventListener>, SiteError> {
    let mut listeners = Vec::new();
    for anchor in query_all(document, r##"a[href^="#"]"##) {
        let (window, document, link) = (window.clone(), document.clone(), anchor.clone());
        listeners.push(EventListener::new(&anchor, "click", move |event: Event| {
            event.prevent_default();
            let Some(href) = link.get_attribute("href").filter(|href| href.len() > 1) else {
                return;
            };
            let Some(target) = query(&document, &href) else {
                return;
            };
            let nav_height = query(&document, ".nav").map_or(0, |nav| nav.offset_height());
            let options = ScrollToOptions::new();
            options.set_top(anchor_scroll_target(
                f64::from(target.offset_top()),
                f64::from(nav_height),
            ));
            options.set_behavior(ScrollBehavior::Smooth);
            window.scroll_to_with_scroll_to_options(&options);
        })?);
    }
    Ok(listeners)
}

fn create_progress_bar(document: &Document) -> Option<HtmlElement> {
    let body = document.body()?;
    let bar = document
        .create_element("div")
        .ok()?
        .dyn_into::<HtmlElement>()
        .ok()?;
    toggle_class(&bar, PROGRESS_BAR_CLASS, true);
    bar.style().set_css_text(PROGRESS_BAR_CSS);
    body.append_child(&bar).ok()?;
    Some(bar)
}

fn measure_sections(document: &Document) -> Vec<SectionOffset> {
    query_all(document, "section")
        .into_iter()
        .map(|section| SectionOffset::new(section.id(), f64::from(section.offset_top())))
        .collect()
}

fn highlight_nav(links: &[HtmlElement], current: Option<&str>) {
    for link in links {
        let is_current = match (current, link.get_attribute("href")) {
            (Some(id), Some(href)) => href.strip_prefix('#') == Some(id),
            _ => false,
        };
        toggle_class(link, ACTIVE_CLASS, is_current);
    }
}

fn wire_pointer_vars(
    window: &Window,
    document: &Document,
    root: HtmlElement,
) -> Result<EventListener, SiteError> {
    let window = window.clone();
    EventListener::new(document, "mousemove", move |event: Event| {
        let Some(event) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let width = window.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(0.0);
        let height = window.inner_height().ok().and_then(|h| h.as_f64()).unwrap_or(0.0);
        let fraction = pointer_fraction(
            f64::from(event.client_x()),
            f64::from(event.client_y()),
            width,
            height,
        );
        set_style(&root, "--mouse-x", &fraction.x.to_string());
        set_style(&root, "--mouse-y", &fraction.y.to_string());
    })
}

/// `notify` shows the acknowledgement; the page passes `window.alert`.
fn wire_contact_form(
    document: &Document,
    notify: impl Fn(&str) + 'static,
) -> Result<Vec<EventListener>, SiteError> {
    let Some(form) = document
        .query_selector(".contact-form")
        .ok()
        .flatten()
        .and_then(|form| form.dyn_into::<HtmlFormElement>().ok())
    else {
        tracing::debug!("no contact form on this page");
        return Ok(Vec::new());
    };
    let (document, target) = (document.clone(), form.clone());
    let listener = EventListener::new(&form, "submit", move |event: Event| {
        event.prevent_default();
        let submission = ContactSubmission::new(
            field_value(&document, "name"),
            field_value(&document, "email"),
            field_value(&document, "message"),
        );
        notify(acknowledge(&submission));
        target.reset();
    })?;
    Ok(vec![listener])
}

fn field_value(document: &Document, id: &str) -> String {
    let Some(element) = document.get_element_by_id(id) else {
        return String::new();
    };
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        input.value()
    } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        area.value()
    } else {
        String::new()
    }
}

fn wire_logo_glitch(document: &Document) -> Result<Vec<EventListener>, SiteError> {
    let Some(logo) = query(document, ".nav-logo") else {
        return Ok(Vec::new());
    };
    let start = {
        let target = logo.clone();
        EventListener::new(&logo, "mouseenter", move |_| {
            set_style(&target, "animation", "glitch 0.3s ease");
        })?
    };
    let end = {
        let target = logo.clone();
        EventListener::new(&logo, "animationend", move |_| set_style(&target, "animation", ""))?
    };
    Ok(vec![start, end])
}

enum LoaderView {
    /// A dedicated `#preloader` overlay that fades out and is hidden.
    Overlay(HtmlElement),
    /// No overlay: the body itself fades in.
    Body(HtmlElement),
}

impl PreloaderView for LoaderView {
    fn begin_fade(&self, fade_ms: u32) {
        let transition = format!("opacity {}s ease", f64::from(fade_ms) / 1000.0);
        match self {
            Self::Overlay(overlay) => {
                set_style(overlay, "transition", &transition);
                set_style(overlay, "opacity", "0");
            }
            Self::Body(body) => {
                set_style(body, "transition", &transition);
                set_style(body, "opacity", "1");
            }
        }
    }

    fn finish(&self) {
        if let Self::Overlay(overlay) = self {
            set_style(overlay, "display", "none");
        }
    }
}

fn start_preloader(
    document: &Document,
    scheduler: Rc<dyn Scheduler>,
    config: &SiteConfig,
) -> Option<Preloader> {
    let view = match (query(document, "#preloader"), document.body()) {
        (Some(overlay), _) => LoaderView::Overlay(overlay),
        (None, Some(body)) => {
            set_style(&body, "opacity", "0");
            LoaderView::Body(body)
        }
        (None, None) => return None,
    };
    Some(Preloader::start(scheduler, Rc::new(view), &config.preloader))
}
