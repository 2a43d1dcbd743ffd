//! Page controller: binds the scroll-spy, reveal-on-view, smooth-scroll,
//! parallax and falling-piece behaviours to the live document.
//!
//! The section and nav link queries are snapshotted once at start-up and kept
//! for the lifetime of the page. All handlers run on the browser's event loop
//! and reach the shared state through `PAGE_STATE`; none of them block.
//!
//! The behaviour logic itself lives in the child modules as plain functions
//! over small host traits, so it can be exercised without a browser.
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Element, HtmlElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, Window, window,
};

use crate::config::PageConfig;
use crate::error::{PageError, Result};
use crate::rng;

pub mod parallax;
pub mod pieces;
pub mod reveal;
pub mod scroll_spy;
pub mod smooth_scroll;

use pieces::{PieceHost, PieceStyle};
use reveal::{Intersection, RevealTarget, RevealTracker};
use scroll_spy::NavLinks;
use smooth_scroll::ScrollAnimation;

/// Runtime page state.
struct PageState {
    cfg: Rc<PageConfig>,
    window: Window,
    document: Document,
    body: HtmlElement,
    sections: Vec<HtmlElement>,
    nav_links: Vec<Element>,
    reveal: RevealTracker,
    /// Start-up attempt that installed this state.
    generation: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    /// Waiting for `DOMContentLoaded`.
    Pending,
    Running,
}

thread_local! {
    static PAGE_STATE: RefCell<Option<PageState>> = RefCell::new(None);
    static LIFECYCLE: Cell<Lifecycle> = Cell::new(Lifecycle::Idle);
    static GENERATION: Cell<u32> = Cell::new(0);
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Runs `f` against the page state installed by start-up attempt `generation`.
/// Returns `None` before start-up, for listeners left behind by a failed
/// attempt, or if the state is already borrowed further up the stack.
fn with_state<R>(generation: u32, f: impl FnOnce(&mut PageState) -> R) -> Option<R> {
    PAGE_STATE.with(|cell| {
        let mut guard = cell.try_borrow_mut().ok()?;
        guard
            .as_mut()
            .filter(|st| st.generation == generation)
            .map(f)
    })
}

// --- Start-up ----------------------------------------------------------------

/// Starts the controller, deferring to `DOMContentLoaded` while the document is
/// still loading.
pub fn start(cfg: PageConfig) -> Result<()> {
    cfg.validate()?;
    if LIFECYCLE.with(|l| l.get()) != Lifecycle::Idle {
        return Err(PageError::AlreadyStarted);
    }
    LIFECYCLE.with(|l| l.set(Lifecycle::Pending));
    let started = start_or_defer(cfg);
    if started.is_err() {
        LIFECYCLE.with(|l| l.set(Lifecycle::Idle));
    }
    started
}

fn start_or_defer(cfg: PageConfig) -> Result<()> {
    let win = window().ok_or(PageError::NoWindow)?;
    let doc = win.document().ok_or(PageError::NoDocument)?;

    if doc.ready_state() == "loading" {
        log::debug!("document still loading, waiting for DOMContentLoaded");
        let ready = Closure::once_into_js(move || {
            if let Err(err) = init(cfg) {
                LIFECYCLE.with(|l| l.set(Lifecycle::Idle));
                log::error!("page controller failed to start: {err}");
            }
        });
        let opts = AddEventListenerOptions::new();
        opts.set_once(true);
        doc.add_event_listener_with_callback_and_add_event_listener_options(
            "DOMContentLoaded",
            ready.unchecked_ref(),
            &opts,
        )?;
        return Ok(());
    }
    init(cfg)
}

/// Queries the document, binds every listener, then installs the state. A
/// failure part-way leaves no state behind, and any listeners already bound
/// belong to a generation that will never match live state.
fn init(cfg: PageConfig) -> Result<()> {
    let win = window().ok_or(PageError::NoWindow)?;
    let doc = win.document().ok_or(PageError::NoDocument)?;
    let body = doc.body().ok_or(PageError::NoBody)?;

    let sections: Vec<HtmlElement> = query_all(&doc, &cfg.section_selector)?;
    let nav_links: Vec<Element> = query_all(&doc, &cfg.nav_link_selector)?;
    if nav_links.len() != sections.len() {
        log::warn!(
            "{} nav links for {} sections; highlighting assumes one link per section",
            nav_links.len(),
            sections.len()
        );
    }

    let generation = GENERATION.with(|g| {
        let next = g.get().wrapping_add(1);
        g.set(next);
        next
    });

    observe_sections(generation, &sections, cfg.reveal_threshold)?;
    bind_nav_links(generation, &nav_links)?;
    bind_scroll(generation, &win)?;
    bind_resize(generation, &win)?;
    bind_piece_recycler(generation, &body)?;

    let cfg = Rc::new(cfg);
    let batch = pieces::initial_batch(&cfg, viewport_width(&win));
    let (section_count, link_count) = (sections.len(), nav_links.len());
    let mut state = PageState {
        cfg,
        window: win,
        document: doc,
        body,
        reveal: RevealTracker::new(sections.len()),
        sections,
        nav_links,
        generation,
    };
    pieces::schedule_batch(&mut state, batch);
    PAGE_STATE.with(|s| s.replace(Some(state)));
    LIFECYCLE.with(|l| l.set(Lifecycle::Running));

    log::info!(
        "page controller started: {} sections, {} nav links, {} pieces",
        section_count,
        link_count,
        batch.count
    );
    Ok(())
}

fn query_all<T: JsCast>(doc: &Document, selector: &str) -> Result<Vec<T>> {
    let list = doc.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect())
}

fn viewport_width(win: &Window) -> f64 {
    win.inner_width()
        .ok()
        .and_then(|w| w.as_f64())
        .unwrap_or(0.0)
}

// --- Scroll-spy & parallax ---------------------------------------------------

struct DomNavLinks<'a> {
    links: &'a [Element],
    class: &'a str,
}

impl NavLinks for DomNavLinks<'_> {
    fn len(&self) -> usize {
        self.links.len()
    }

    fn set_active(&mut self, index: usize, active: bool) {
        let classes = self.links[index].class_list();
        let written = if active {
            classes.add_1(self.class)
        } else {
            classes.remove_1(self.class)
        };
        if let Err(err) = written {
            log::debug!("nav link {index}: class update failed: {err:?}");
        }
    }
}

fn bind_scroll(generation: u32, win: &Window) -> Result<()> {
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
        with_state(generation, on_scroll);
    }) as Box<dyn FnMut(_)>);
    win.add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn on_scroll(st: &mut PageState) {
    let scroll_y = st.window.scroll_y().unwrap_or(0.0);

    let tops: Vec<f64> = st.sections.iter().map(|s| s.offset_top() as f64).collect();
    let index = scroll_spy::active_section_index(&tops, scroll_y, st.cfg.spy_offset_px);
    let mut links = DomNavLinks {
        links: &st.nav_links,
        class: &st.cfg.active_class,
    };
    if let Err(err) = scroll_spy::highlight(&mut links, index) {
        // Already warned about the count mismatch at start-up.
        log::debug!("scroll-spy: {err}");
    }

    for (i, section) in st.sections.iter().enumerate() {
        let transform = parallax::parallax_transform(&st.cfg, scroll_y, i);
        if let Err(err) = section.style().set_property("transform", &transform) {
            log::debug!("section {i}: transform update failed: {err:?}");
        }
    }
}

// --- Reveal-on-view ----------------------------------------------------------

struct DomReveal<'a> {
    sections: &'a [HtmlElement],
    observer: &'a IntersectionObserver,
    class: &'a str,
}

impl RevealTarget for DomReveal<'_> {
    fn mark_revealed(&mut self, section: usize) {
        if let Err(err) = self.sections[section].class_list().add_1(self.class) {
            log::debug!("section {section}: reveal class failed: {err:?}");
        }
    }

    fn unobserve(&mut self, section: usize) {
        self.observer.unobserve(&self.sections[section]);
    }
}

fn section_index(sections: &[HtmlElement], target: &Element) -> Option<usize> {
    let node: &web_sys::Node = target.as_ref();
    sections.iter().position(|s| s.is_same_node(Some(node)))
}

fn observe_sections(generation: u32, sections: &[HtmlElement], threshold: f64) -> Result<()> {
    let callback = Closure::wrap(Box::new(
        move |entries: js_sys::Array, observer: IntersectionObserver| {
            with_state(generation, |st| {
                let batch: Vec<Intersection> = entries
                    .iter()
                    .filter_map(|v| v.dyn_into::<IntersectionObserverEntry>().ok())
                    .filter_map(|entry| {
                        section_index(&st.sections, &entry.target()).map(|section| Intersection {
                            section,
                            intersecting: entry.is_intersecting(),
                        })
                    })
                    .collect();
                let mut target = DomReveal {
                    sections: &st.sections,
                    observer: &observer,
                    class: &st.cfg.active_class,
                };
                let newly = st.reveal.apply(batch, &mut target);
                if newly > 0 {
                    log::debug!(
                        "revealed {newly} sections ({} of {})",
                        st.reveal.revealed_count(),
                        st.sections.len()
                    );
                }
            });
        },
    )
        as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

    // Root left unset: intersections are measured against the viewport.
    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(threshold));
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    callback.forget();

    for section in sections {
        observer.observe(section);
    }
    Ok(())
}

// --- Smooth-scroll -----------------------------------------------------------

fn bind_nav_links(generation: u32, links: &[Element]) -> Result<()> {
    for link in links {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            evt.prevent_default();
            let Some(link) = evt
                .current_target()
                .and_then(|t| t.dyn_into::<Element>().ok())
            else {
                return;
            };
            let Some(duration_ms) = with_state(generation, |st| st.cfg.scroll_duration_ms) else {
                return;
            };
            if let Err(err) = scroll_to_link_target(&link, duration_ms) {
                log::warn!("smooth-scroll: {err}");
            }
        }) as Box<dyn FnMut(_)>);
        link.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn scroll_to_link_target(link: &Element, duration_ms: f64) -> Result<()> {
    let href = link.get_attribute("href").unwrap_or_default();
    let win = window().ok_or(PageError::NoWindow)?;
    let doc = win.document().ok_or(PageError::NoDocument)?;
    // Invalid selectors (external URLs, empty href) are treated as missing targets.
    let target = doc
        .query_selector(&href)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| PageError::MissingTarget { href: href.clone() })?;

    let from = win.page_y_offset()?;
    let anim = ScrollAnimation::new(from, target.offset_top() as f64, duration_ms);
    log::debug!("smooth-scroll to {href}: {from} -> {}", anim.target());
    run_scroll_animation(win, anim)
}

/// Drives `anim` from `requestAnimationFrame` until it reports completion.
/// Each invocation owns its own loop; overlapping loops are not cancelled.
fn run_scroll_animation(win: Window, mut anim: ScrollAnimation) -> Result<()> {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    let frame_win = win.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        let frame = anim.frame(ts);
        frame_win.scroll_to_with_x_and_y(0.0, frame.position);
        if frame.more {
            if let Some(cb) = f.borrow().as_ref() {
                let _ = frame_win.request_animation_frame(cb.as_ref().unchecked_ref());
            }
        } else {
            // Break the Rc cycle once this callback has returned.
            let f = f.clone();
            let release = Closure::once_into_js(move || {
                f.borrow_mut().take();
            });
            let _ = frame_win.set_timeout_with_callback(release.unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(cb) = g.borrow().as_ref() {
        win.request_animation_frame(cb.as_ref().unchecked_ref())?;
    }
    Ok(())
}

// --- Falling pieces ----------------------------------------------------------

impl PageState {
    fn spawn_piece(&self) -> Result<()> {
        let style = PieceStyle::from_samples(
            &self.cfg,
            viewport_width(&self.window),
            rng::unit_sample(),
            rng::unit_sample(),
        );
        let piece: HtmlElement = self.document.create_element("div")?.unchecked_into();
        piece.class_list().add_1(&self.cfg.piece_class)?;
        let css = piece.style();
        css.set_property("left", &style.left_css())?;
        css.set_property("animation", &style.animation_css(&self.cfg.fall_animation))?;
        self.body.append_child(&piece)?;
        Ok(())
    }
}

impl PieceHost for PageState {
    fn remove_all_pieces(&mut self) -> usize {
        let selector = format!(".{}", self.cfg.piece_class);
        let pieces: Vec<Element> = query_all(&self.document, &selector).unwrap_or_default();
        for piece in &pieces {
            piece.remove();
        }
        pieces.len()
    }

    fn schedule_spawn(&mut self, delay_ms: i32) {
        let generation = self.generation;
        let spawn = Closure::once_into_js(move || {
            with_state(generation, |st| {
                if let Err(err) = st.spawn_piece() {
                    log::warn!("piece spawn failed: {err}");
                }
            });
        });
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(spawn.unchecked_ref(), delay_ms)
        {
            log::warn!("could not schedule piece spawn: {:?}", err);
        }
    }
}

/// One listener on `body` recycles every piece: when a piece's fall animation
/// ends it is removed and a single replacement is spawned.
fn bind_piece_recycler(generation: u32, body: &HtmlElement) -> Result<()> {
    let closure = Closure::wrap(Box::new(move |evt: web_sys::Event| {
        let Some(el) = evt.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        with_state(generation, |st| {
            if !el.class_list().contains(&st.cfg.piece_class) {
                return;
            }
            el.remove();
            if let Err(err) = st.spawn_piece() {
                log::warn!("piece respawn failed: {err}");
            }
        });
    }) as Box<dyn FnMut(_)>);
    body.add_event_listener_with_callback("animationend", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn bind_resize(generation: u32, win: &Window) -> Result<()> {
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
        with_state(generation, |st| {
            let cfg = st.cfg.clone();
            let width = viewport_width(&st.window);
            pieces::handle_resize(&cfg, width, st);
        });
    }) as Box<dyn FnMut(_)>);
    win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod web_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    // State built by hand; generation 0 is never handed out by `init`, so the
    // timers it schedules stay inert.
    fn detached_state(cfg: PageConfig) -> PageState {
        let win = window().unwrap();
        let doc = win.document().unwrap();
        let body = doc.body().unwrap();
        PageState {
            cfg: Rc::new(cfg),
            window: win,
            document: doc,
            body,
            sections: Vec::new(),
            nav_links: Vec::new(),
            reveal: RevealTracker::new(0),
            generation: 0,
        }
    }

    fn piece_count(doc: &Document) -> u32 {
        doc.query_selector_all(".tetris-piece").unwrap().length()
    }

    #[wasm_bindgen_test]
    fn failed_start_can_be_retried() {
        let cfg = PageConfig {
            wide_piece_count: 0,
            narrow_piece_count: 0,
            ..PageConfig::default()
        };
        let doc = window().unwrap().document().unwrap();
        let html = doc.document_element().unwrap();
        let body = doc.body().unwrap();

        html.remove_child(&body).unwrap();
        let first = start(cfg.clone());
        html.append_child(&body).unwrap();
        assert!(matches!(first, Err(PageError::NoBody)));
        assert_eq!(LIFECYCLE.with(|l| l.get()), Lifecycle::Idle);
        assert!(PAGE_STATE.with(|s| s.borrow().is_none()));

        start(cfg.clone()).unwrap();
        assert_eq!(LIFECYCLE.with(|l| l.get()), Lifecycle::Running);
        assert!(matches!(start(cfg), Err(PageError::AlreadyStarted)));
    }

    #[wasm_bindgen_test]
    fn resize_removes_dom_pieces_and_schedules_batch() {
        let cfg = PageConfig {
            breakpoint_px: 1.0e9,
            resize_piece_count: 2,
            ..PageConfig::default()
        };
        let mut st = detached_state(cfg.clone());
        let before = piece_count(&st.document);
        for _ in 0..3 {
            st.spawn_piece().unwrap();
        }
        assert_eq!(piece_count(&st.document), before + 3);

        let width = viewport_width(&st.window);
        let batch = pieces::handle_resize(&cfg, width, &mut st);
        assert_eq!(batch.map(|b| b.count), Some(2));
        assert_eq!(piece_count(&st.document), 0);
    }

    #[wasm_bindgen_test]
    fn spawned_piece_carries_fall_animation() {
        let st = detached_state(PageConfig::default());
        st.spawn_piece().unwrap();
        let piece: HtmlElement = st
            .document
            .query_selector(".tetris-piece")
            .unwrap()
            .unwrap()
            .unchecked_into();
        let animation = piece.style().get_property_value("animation").unwrap();
        assert!(animation.contains("fall"), "animation = {animation}");
        assert!(piece.style().get_property_value("left").unwrap().ends_with("px"));
        piece.remove();
    }

    #[wasm_bindgen_test]
    fn section_lookup_matches_by_identity() {
        let doc = window().unwrap().document().unwrap();
        let sections: Vec<HtmlElement> = (0..3)
            .map(|_| doc.create_element("section").unwrap().unchecked_into())
            .collect();
        let target: &Element = sections[2].as_ref();
        assert_eq!(section_index(&sections, target), Some(2));
        let stranger = doc.create_element("section").unwrap();
        assert_eq!(section_index(&sections, &stranger), None);
    }
}
