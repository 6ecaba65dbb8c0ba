use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlDocument, HtmlElement, HtmlTextAreaElement, Window};

use crate::config::CopyConfig;
use crate::copy::{copy_to_clipboard, ButtonView, ClipboardBackend, CopyFeedback, Timer, TimerHandle};
use crate::error::{describe, PetalError, Result};

pub const BUTTON_SELECTOR: &str = "[data-copy-button]";

pub type ButtonFeedback = CopyFeedback<DomButtonView, WindowTimer>;

/// Icons and label inside one copy button.
pub struct DomButtonView {
    copy_icon: Option<HtmlElement>,
    check_icon: Option<HtmlElement>,
    label: Option<Element>,
}

impl DomButtonView {
    pub fn find(button: &Element) -> Self {
        let pick = |selector: &str| button.query_selector(selector).ok().flatten();
        Self {
            copy_icon: pick(".copy-icon").and_then(|e| e.dyn_into().ok()),
            check_icon: pick(".check-icon").and_then(|e| e.dyn_into().ok()),
            label: pick(".copy-label"),
        }
    }
}

fn set_display(element: &Option<HtmlElement>, value: &str) {
    if let Some(element) = element {
        if let Err(e) = element.style().set_property("display", value) {
            log::warn!("copy button icon not toggled: {}", describe(&e));
        }
    }
}

impl ButtonView for DomButtonView {
    fn label(&self) -> Option<String> {
        self.label.as_ref().and_then(|l| l.text_content())
    }

    fn set_label(&mut self, text: &str) {
        if let Some(label) = &self.label {
            label.set_text_content(Some(text));
        }
    }

    fn set_copied(&mut self, copied: bool) {
        if copied {
            set_display(&self.copy_icon, "none");
            set_display(&self.check_icon, "inline-block");
        } else {
            set_display(&self.copy_icon, "");
            set_display(&self.check_icon, "none");
        }
    }
}

/// `setTimeout` bound to one button's revert callback.
pub struct WindowTimer {
    window: Window,
    callback: Option<Closure<dyn FnMut()>>,
}

impl WindowTimer {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            callback: None,
        }
    }

    pub fn set_callback(&mut self, callback: Closure<dyn FnMut()>) {
        self.callback = Some(callback);
    }
}

impl Timer for WindowTimer {
    fn schedule(&mut self, delay_ms: u32) -> Result<TimerHandle> {
        let callback = self
            .callback
            .as_ref()
            .ok_or_else(|| PetalError::Schedule("revert callback not installed".into()))?;
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                delay_ms.min(i32::MAX as u32) as i32,
            )
            .map_err(|e| PetalError::Schedule(describe(&e)))
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.window.clear_timeout_with_handle(handle);
    }
}

pub struct WebClipboard {
    window: Window,
    document: Document,
}

impl WebClipboard {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }
}

impl ClipboardBackend for WebClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        // Insecure contexts and older browsers have no navigator.clipboard.
        let navigator = self.window.navigator();
        let clipboard = js_sys::Reflect::get(&navigator, &JsValue::from_str("clipboard"))
            .map_err(|e| PetalError::ClipboardRejected(describe(&e)))?;
        if clipboard.is_undefined() || clipboard.is_null() {
            return Err(PetalError::ClipboardUnavailable);
        }
        let clipboard: web_sys::Clipboard = clipboard.unchecked_into();
        JsFuture::from(clipboard.write_text(text))
            .await
            .map(|_| ())
            .map_err(|e| PetalError::ClipboardRejected(describe(&e)))
    }

    fn legacy_copy(&self, text: &str) -> Result<()> {
        let dom = |e: JsValue| PetalError::Dom(describe(&e));
        let body = self.document.body().ok_or(PetalError::MissingGlobal("body"))?;
        let area = self
            .document
            .create_element("textarea")
            .map_err(dom)?
            .dyn_into::<HtmlTextAreaElement>()
            .map_err(|_| PetalError::WrongElementType("textarea".into()))?;
        area.set_value(text);
        let style = area.style();
        style.set_property("position", "fixed").map_err(dom)?;
        style.set_property("top", "-9999px").map_err(dom)?;

        body.append_child(&area).map_err(dom)?;
        area.select();
        let copied = self
            .document
            .dyn_ref::<HtmlDocument>()
            .ok_or_else(|| PetalError::WrongElementType("document".into()))
            .and_then(|doc| doc.exec_command("copy").map_err(dom));
        body.remove_child(&area).map_err(dom)?;
        copied.map(|_| ())
    }
}

/// Attach copy behavior to every `[data-copy-button]`. Returns the number
/// of buttons wired.
pub fn init(window: &Window, document: &Document, config: &CopyConfig) -> Result<u32> {
    let buttons = document
        .query_selector_all(BUTTON_SELECTOR)
        .map_err(|e| PetalError::Dom(describe(&e)))?;
    let clipboard = Rc::new(WebClipboard::new(window.clone(), document.clone()));

    let mut wired = 0;
    for i in 0..buttons.length() {
        let Some(button) = buttons.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
            continue;
        };
        if let Err(err) = wire(window, &button, config, &clipboard) {
            log::warn!("copy button {i} skipped: {err}");
            continue;
        }
        wired += 1;
    }
    Ok(wired)
}

fn wire(
    window: &Window,
    button: &HtmlElement,
    config: &CopyConfig,
    clipboard: &Rc<WebClipboard>,
) -> Result<()> {
    let view = DomButtonView::find(button);
    set_display(&view.check_icon, "none");

    let feedback: Rc<RefCell<ButtonFeedback>> = Rc::new(RefCell::new(CopyFeedback::new(
        view,
        WindowTimer::new(window.clone()),
        config.success_text.clone(),
        config.feedback_ms,
    )));

    let weak = Rc::downgrade(&feedback);
    let revert = Closure::wrap(Box::new(move || {
        if let Some(feedback) = weak.upgrade() {
            feedback.borrow_mut().revert();
        }
    }) as Box<dyn FnMut()>);
    feedback.borrow_mut().timer_mut().set_callback(revert);

    let phone = button
        .dataset()
        .get("phone")
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| config.phone.clone());
    let clipboard = Rc::clone(clipboard);
    let onclick = Closure::wrap(Box::new(move || {
        let feedback = Rc::clone(&feedback);
        let clipboard = Rc::clone(&clipboard);
        let phone = phone.clone();
        wasm_bindgen_futures::spawn_local(async move {
            copy_to_clipboard(&*clipboard, &phone, |path| {
                log::debug!("copied {phone} via {path:?}");
                feedback.borrow_mut().show_success();
            })
            .await;
        });
    }) as Box<dyn FnMut()>);
    button
        .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())
        .map_err(|e| PetalError::Dom(describe(&e)))?;
    // Buttons live as long as the page.
    onclick.forget();
    Ok(())
}
