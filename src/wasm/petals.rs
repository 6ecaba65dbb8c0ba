//! Wires the petal [`Animator`] to the page.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Document, Event, HtmlCanvasElement, MediaQueryListEvent, PageTransitionEvent, Window};

use super::env::BrowserEnv;
use super::render::{load_sprite, CanvasSurface};
use crate::animator::Animator;
use crate::config::PetalConfig;
use crate::env::FrameTask;
use crate::error::{describe, PetalError, Result};

pub const CANVAS_ID: &str = "sakura-canvas";
const CONFIG_ATTR: &str = "data-petal-config";
const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

pub type PageAnimator = Animator<BrowserEnv, CanvasSurface>;

thread_local! {
    // Every page callback holds a `Weak`; this is the owning handle until teardown.
    static ACTIVE: RefCell<Option<Rc<RefCell<PageAnimator>>>> = const { RefCell::new(None) };
}

/// The animator currently driving the page, if any.
pub fn active() -> Option<Rc<RefCell<PageAnimator>>> {
    ACTIVE.with(|slot| slot.borrow().clone())
}

/// Look up the canvas, subscribe to page signals and start loading the
/// sprite. The loop itself starts once the sprite has decoded.
///
/// The animator stays alive until a final `pagehide` or a failed sprite
/// load; a previously started one is disposed.
pub fn start(window: &Window, document: &Document) -> Result<Rc<RefCell<PageAnimator>>> {
    let canvas = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| PetalError::MissingElement(format!("#{CANVAS_ID}")))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| PetalError::WrongElementType(format!("#{CANVAS_ID}")))?;

    let config = read_config(&canvas);
    let surface = CanvasSurface::new(canvas.clone())?;
    let env = BrowserEnv::new(window.clone(), document.clone(), canvas);
    let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
    let animator = Rc::new(RefCell::new(Animator::new(env, surface, config, seed)));

    install_frame_callbacks(&animator);
    if let Err(err) = subscribe(window, document, &animator) {
        animator.borrow_mut().dispose();
        return Err(err);
    }

    animator.borrow_mut().start();
    if let Some(previous) = ACTIVE.with(|slot| slot.replace(Some(animator.clone()))) {
        previous.borrow_mut().dispose();
    }

    let src = animator.borrow().config().sprite_src.clone();
    let window = window.clone();
    let weak = Rc::downgrade(&animator);
    wasm_bindgen_futures::spawn_local(async move {
        let loaded = load_sprite(&window, &src).await;
        let Some(animator) = weak.upgrade() else {
            return;
        };
        let mut animator = animator.borrow_mut();
        match loaded {
            Ok(sprite) => {
                animator.surface_mut().set_sprite(sprite);
                animator.sprite_ready();
                log::info!("petal animation running ({} petals)", animator.petals().len());
            }
            Err(err) => {
                animator.sprite_failed(&err);
                drop(animator);
                release(&weak);
            }
        }
    });

    Ok(animator)
}

fn read_config(canvas: &HtmlCanvasElement) -> PetalConfig {
    match canvas.get_attribute(CONFIG_ATTR) {
        Some(json) => PetalConfig::from_json(&json).unwrap_or_else(|err| {
            log::warn!("ignoring {CONFIG_ATTR}: {err}");
            PetalConfig::default()
        }),
        None => PetalConfig::default(),
    }
}

fn with_animator(weak: &Weak<RefCell<PageAnimator>>, f: impl FnOnce(&mut PageAnimator)) {
    if let Some(animator) = weak.upgrade() {
        f(&mut animator.borrow_mut());
    }
}

/// Drop the owning handle if it still points at `weak`'s animator.
fn release(weak: &Weak<RefCell<PageAnimator>>) {
    let released = ACTIVE.with(|slot| {
        let mut slot = slot.borrow_mut();
        match slot.as_ref() {
            Some(held) if std::ptr::eq(Rc::as_ptr(held), weak.as_ptr()) => slot.take(),
            _ => None,
        }
    });
    drop(released);
}

fn persisted(event: &Event) -> bool {
    event
        .dyn_ref::<PageTransitionEvent>()
        .is_some_and(|e| e.persisted())
}

fn install_frame_callbacks(animator: &Rc<RefCell<PageAnimator>>) {
    let tick = {
        let weak = Rc::downgrade(animator);
        Closure::wrap(Box::new(move || {
            with_animator(&weak, |a| a.frame(FrameTask::Tick));
        }) as Box<dyn FnMut()>)
    };
    let resize = {
        let weak = Rc::downgrade(animator);
        Closure::wrap(Box::new(move || {
            with_animator(&weak, |a| a.frame(FrameTask::Resize));
        }) as Box<dyn FnMut()>)
    };
    animator
        .borrow_mut()
        .environment_mut()
        .set_frame_callbacks(tick, resize);
}

fn subscribe(window: &Window, document: &Document, animator: &Rc<RefCell<PageAnimator>>) -> Result<()> {
    let mut a = animator.borrow_mut();

    let weak = Rc::downgrade(animator);
    a.environment_mut().listen(
        window,
        "resize",
        Closure::wrap(Box::new(move |_: Event| {
            with_animator(&weak, |a| a.request_resize());
        }) as Box<dyn FnMut(Event)>),
    )?;

    // Content reflow changes the page height without any window resize.
    let body = document.body().ok_or(PetalError::MissingGlobal("body"))?;
    let weak = Rc::downgrade(animator);
    a.environment_mut().observe_size(
        &body,
        Closure::wrap(Box::new(move |_: js_sys::Array| {
            with_animator(&weak, |a| a.handle_resize());
        }) as Box<dyn FnMut(js_sys::Array)>),
    )?;

    a.set_hidden(document.hidden());
    let weak = Rc::downgrade(animator);
    let doc = document.clone();
    a.environment_mut().listen(
        document,
        "visibilitychange",
        Closure::wrap(Box::new(move |_: Event| {
            let hidden = doc.hidden();
            with_animator(&weak, |a| a.set_hidden(hidden));
        }) as Box<dyn FnMut(Event)>),
    )?;

    match window.match_media(REDUCED_MOTION_QUERY) {
        Ok(Some(query)) => {
            a.set_reduced_motion(query.matches());
            let weak = Rc::downgrade(animator);
            a.environment_mut().listen(
                &query,
                "change",
                Closure::wrap(Box::new(move |event: Event| {
                    if let Some(event) = event.dyn_ref::<MediaQueryListEvent>() {
                        let reduced = event.matches();
                        with_animator(&weak, |a| a.set_reduced_motion(reduced));
                    }
                }) as Box<dyn FnMut(Event)>),
            )?;
        }
        Ok(None) => log::debug!("matchMedia unsupported; assuming full motion"),
        Err(e) => log::warn!("reduced motion query failed: {}", describe(&e)),
    }

    // A page entering the back/forward cache may come back; only a final
    // `pagehide` tears down.
    let weak = Rc::downgrade(animator);
    a.environment_mut().listen(
        window,
        "pagehide",
        Closure::wrap(Box::new(move |event: Event| {
            if persisted(&event) {
                with_animator(&weak, |a| a.set_hidden(true));
            } else {
                with_animator(&weak, |a| a.dispose());
                release(&weak);
            }
        }) as Box<dyn FnMut(Event)>),
    )?;

    let weak = Rc::downgrade(animator);
    let doc = document.clone();
    a.environment_mut().listen(
        window,
        "pageshow",
        Closure::wrap(Box::new(move |event: Event| {
            if persisted(&event) {
                let hidden = doc.hidden();
                with_animator(&weak, |a| a.set_hidden(hidden));
            }
        }) as Box<dyn FnMut(Event)>),
    )?;

    Ok(())
}
