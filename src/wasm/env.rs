use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Document, Event, EventTarget, HtmlCanvasElement, HtmlElement, ResizeObserver, Window};

use crate::env::{Environment, FrameHandle, FrameTask, PageMetrics};
use crate::error::{describe, PetalError, Result};

struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// Browser-backed [`Environment`]: measures the page, owns the frame
/// callbacks and every page signal subscription made for the animator.
pub struct BrowserEnv {
    window: Window,
    document: Document,
    canvas: HtmlCanvasElement,
    tick: Option<Closure<dyn FnMut()>>,
    resize: Option<Closure<dyn FnMut()>>,
    listeners: Vec<Listener>,
    observer: Option<(ResizeObserver, Closure<dyn FnMut(js_sys::Array)>)>,
}

impl BrowserEnv {
    pub fn new(window: Window, document: Document, canvas: HtmlCanvasElement) -> Self {
        Self {
            window,
            document,
            canvas,
            tick: None,
            resize: None,
            listeners: Vec::new(),
            observer: None,
        }
    }

    pub fn set_frame_callbacks(&mut self, tick: Closure<dyn FnMut()>, resize: Closure<dyn FnMut()>) {
        self.tick = Some(tick);
        self.resize = Some(resize);
    }

    /// Subscribe `callback` to `kind` on `target` until [`Environment::detach`].
    pub fn listen(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        callback: Closure<dyn FnMut(Event)>,
    ) -> Result<()> {
        target
            .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
            .map_err(|e| PetalError::Dom(describe(&e)))?;
        self.listeners.push(Listener {
            target: target.clone(),
            kind,
            callback,
        });
        Ok(())
    }

    /// Watch `element` for size changes until [`Environment::detach`].
    pub fn observe_size(
        &mut self,
        element: &HtmlElement,
        callback: Closure<dyn FnMut(js_sys::Array)>,
    ) -> Result<()> {
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|e| PetalError::Dom(describe(&e)))?;
        observer.observe(element);
        self.observer = Some((observer, callback));
        Ok(())
    }

    /// Listeners and observers still attached to the page.
    pub fn subscriptions(&self) -> usize {
        self.listeners.len() + usize::from(self.observer.is_some())
    }
}

fn px(value: i32) -> f64 {
    f64::from(value.max(0))
}

impl Environment for BrowserEnv {
    fn page_metrics(&self) -> PageMetrics {
        let body = self.document.body();
        let root = self.document.document_element();
        let root_offset = root
            .as_ref()
            .and_then(|r| r.dyn_ref::<HtmlElement>())
            .map_or(0, |r| r.offset_height());

        PageMetrics {
            surface_width: px(self.canvas.client_width()),
            document_width: root.as_ref().map_or(0.0, |r| px(r.client_width())),
            heights: [
                body.as_ref().map_or(0.0, |b| px(b.scroll_height())),
                root.as_ref().map_or(0.0, |r| px(r.scroll_height())),
                body.as_ref().map_or(0.0, |b| px(b.offset_height())),
                px(root_offset),
                body.as_ref().map_or(0.0, |b| px(b.client_height())),
                root.as_ref().map_or(0.0, |r| px(r.client_height())),
            ],
            viewport_height: self
                .window
                .inner_height()
                .ok()
                .and_then(|h| h.as_f64())
                .unwrap_or(0.0),
        }
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }

    fn request_frame(&mut self, task: FrameTask) -> Result<FrameHandle> {
        let callback = match task {
            FrameTask::Tick => self.tick.as_ref(),
            FrameTask::Resize => self.resize.as_ref(),
        }
        .ok_or_else(|| PetalError::Schedule(format!("no {task:?} callback installed")))?;
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|e| PetalError::Schedule(describe(&e)))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(e) = self.window.cancel_animation_frame(handle) {
            log::warn!("cancelAnimationFrame failed: {}", describe(&e));
        }
    }

    fn detach(&mut self) {
        for listener in self.listeners.drain(..) {
            if let Err(e) = listener.target.remove_event_listener_with_callback(
                listener.kind,
                listener.callback.as_ref().unchecked_ref(),
            ) {
                log::warn!("{} listener not removed: {}", listener.kind, describe(&e));
            }
        }
        if let Some((observer, _callback)) = self.observer.take() {
            observer.disconnect();
        }
        log::debug!("petal signals detached");
    }
}
