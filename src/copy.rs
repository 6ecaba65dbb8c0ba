//! Copy-phone-number button.
//!
//! Each button owns a [`CopyFeedback`] with its own revert timer and cached
//! label, so rapid clicks on one button never disturb another.

use crate::error::Result;

/// Which copy mechanism ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyPath {
    Modern,
    Legacy,
}

#[allow(async_fn_in_trait)]
pub trait ClipboardBackend {
    /// Asynchronous clipboard API write.
    async fn write_text(&self, text: &str) -> Result<()>;

    /// Selection based copy for browsers without the async API.
    fn legacy_copy(&self, text: &str) -> Result<()>;
}

/// Copy `text`, falling back to the legacy path when the modern write is
/// unavailable or rejected, then call `on_done` exactly once.
///
/// The legacy copy's outcome is not checked; `on_done` runs either way.
pub async fn copy_to_clipboard<C, F>(clipboard: &C, text: &str, on_done: F)
where
    C: ClipboardBackend,
    F: FnOnce(CopyPath),
{
    let path = match clipboard.write_text(text).await {
        Ok(()) => CopyPath::Modern,
        Err(err) => {
            log::debug!("falling back to legacy copy: {err}");
            if let Err(err) = clipboard.legacy_copy(text) {
                log::debug!("legacy copy failed: {err}");
            }
            CopyPath::Legacy
        }
    };
    on_done(path);
}

pub type TimerHandle = i32;

pub trait Timer {
    fn schedule(&mut self, delay_ms: u32) -> Result<TimerHandle>;
    fn cancel(&mut self, handle: TimerHandle);
}

/// The visible parts of a copy button.
pub trait ButtonView {
    fn label(&self) -> Option<String>;
    fn set_label(&mut self, text: &str);
    /// Swap the copy icon for the check icon, or back.
    fn set_copied(&mut self, copied: bool);
}

pub struct CopyFeedback<V, T> {
    view: V,
    timer: T,
    success_text: String,
    duration_ms: u32,
    original_label: Option<String>,
    pending: Option<TimerHandle>,
}

impl<V: ButtonView, T: Timer> CopyFeedback<V, T> {
    pub fn new(view: V, timer: T, success_text: impl Into<String>, duration_ms: u32) -> Self {
        Self {
            view,
            timer,
            success_text: success_text.into(),
            duration_ms,
            original_label: None,
            pending: None,
        }
    }

    /// Show the copied state and (re)arm the revert timer.
    pub fn show_success(&mut self) {
        // Cached once, so a click during the copied state can't capture the
        // success text as the label to restore.
        if self.original_label.is_none() {
            self.original_label = self.view.label();
        }
        self.view.set_copied(true);
        self.view.set_label(&self.success_text);

        if let Some(handle) = self.pending.take() {
            self.timer.cancel(handle);
        }
        match self.timer.schedule(self.duration_ms) {
            Ok(handle) => self.pending = Some(handle),
            Err(err) => {
                log::warn!("copy feedback timer unavailable: {err}");
                self.revert();
            }
        }
    }

    /// Restore icon and label. Called by the timer.
    pub fn revert(&mut self) {
        self.pending = None;
        self.view.set_copied(false);
        if let Some(label) = &self.original_label {
            self.view.set_label(label);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PetalError;
    use std::cell::{Cell, RefCell};

    struct FakeClipboard {
        modern: Option<bool>,
        modern_calls: Cell<usize>,
        legacy_calls: RefCell<Vec<String>>,
        legacy_ok: bool,
    }

    impl FakeClipboard {
        fn new(modern: Option<bool>) -> Self {
            Self {
                modern,
                modern_calls: Cell::new(0),
                legacy_calls: RefCell::new(Vec::new()),
                legacy_ok: true,
            }
        }
    }

    impl ClipboardBackend for FakeClipboard {
        async fn write_text(&self, _text: &str) -> Result<()> {
            self.modern_calls.set(self.modern_calls.get() + 1);
            match self.modern {
                None => Err(PetalError::ClipboardUnavailable),
                Some(true) => Ok(()),
                Some(false) => Err(PetalError::ClipboardRejected("NotAllowedError".into())),
            }
        }

        fn legacy_copy(&self, text: &str) -> Result<()> {
            self.legacy_calls.borrow_mut().push(text.to_string());
            if self.legacy_ok {
                Ok(())
            } else {
                Err(PetalError::Dom("execCommand".into()))
            }
        }
    }

    fn copy(clipboard: &FakeClipboard) -> Vec<CopyPath> {
        let mut done = Vec::new();
        pollster::block_on(copy_to_clipboard(clipboard, "947620202", |path| done.push(path)));
        done
    }

    #[test]
    fn modern_write_skips_fallback() {
        let clipboard = FakeClipboard::new(Some(true));
        assert_eq!(copy(&clipboard), vec![CopyPath::Modern]);
        assert!(clipboard.legacy_calls.borrow().is_empty());
    }

    #[test]
    fn rejected_write_falls_back_and_still_completes() {
        let clipboard = FakeClipboard::new(Some(false));
        assert_eq!(copy(&clipboard), vec![CopyPath::Legacy]);
        assert_eq!(*clipboard.legacy_calls.borrow(), vec!["947620202".to_string()]);
    }

    #[test]
    fn missing_api_falls_back_and_still_completes() {
        let mut clipboard = FakeClipboard::new(None);
        clipboard.legacy_ok = false;
        assert_eq!(copy(&clipboard), vec![CopyPath::Legacy]);
        assert_eq!(clipboard.modern_calls.get(), 1);
        assert_eq!(clipboard.legacy_calls.borrow().len(), 1);
    }

    #[derive(Default)]
    struct FakeView {
        label: String,
        copied: bool,
    }

    impl ButtonView for FakeView {
        fn label(&self) -> Option<String> {
            Some(self.label.clone())
        }
        fn set_label(&mut self, text: &str) {
            self.label = text.to_string();
        }
        fn set_copied(&mut self, copied: bool) {
            self.copied = copied;
        }
    }

    #[derive(Default)]
    struct FakeTimer {
        next: TimerHandle,
        armed: Vec<(TimerHandle, u32)>,
        cancelled: Vec<TimerHandle>,
        broken: bool,
    }

    impl Timer for FakeTimer {
        fn schedule(&mut self, delay_ms: u32) -> Result<TimerHandle> {
            if self.broken {
                return Err(PetalError::Schedule("no timers".into()));
            }
            self.next += 1;
            self.armed.push((self.next, delay_ms));
            Ok(self.next)
        }
        fn cancel(&mut self, handle: TimerHandle) {
            self.armed.retain(|(h, _)| *h != handle);
            self.cancelled.push(handle);
        }
    }

    fn feedback() -> CopyFeedback<FakeView, FakeTimer> {
        let view = FakeView {
            label: "Copiar número".into(),
            copied: false,
        };
        CopyFeedback::new(view, FakeTimer::default(), "¡Copiado!", 6000)
    }

    /// Fire the armed timer the way the browser would.
    fn elapse(fb: &mut CopyFeedback<FakeView, FakeTimer>) -> usize {
        let fired = std::mem::take(&mut fb.timer_mut().armed);
        for _ in &fired {
            fb.revert();
        }
        fired.len()
    }

    #[test]
    fn success_then_revert_restores_label() {
        let mut fb = feedback();
        fb.show_success();
        assert!(fb.view().copied);
        assert_eq!(fb.view().label, "¡Copiado!");
        assert_eq!(fb.timer_mut().armed, vec![(1, 6000)]);

        assert_eq!(elapse(&mut fb), 1);
        assert!(!fb.view().copied);
        assert_eq!(fb.view().label, "Copiar número");
        assert!(!fb.is_pending());
    }

    #[test]
    fn rapid_clicks_keep_one_revert_and_the_real_label() {
        let mut fb = feedback();
        fb.show_success();
        fb.show_success();
        fb.show_success();
        assert_eq!(fb.timer_mut().cancelled, vec![1, 2]);

        assert_eq!(elapse(&mut fb), 1);
        assert_eq!(fb.view().label, "Copiar número");
    }

    #[test]
    fn completed_copy_reverts_once_per_click() {
        let clipboard = FakeClipboard::new(None);
        let fb = RefCell::new(feedback());
        let mut reverts = 0;
        for _ in 0..3 {
            pollster::block_on(copy_to_clipboard(&clipboard, "947620202", |_| {
                fb.borrow_mut().show_success()
            }));
            reverts += elapse(&mut fb.borrow_mut());
        }
        assert_eq!(reverts, 3);
        assert_eq!(fb.borrow().view().label, "Copiar número");
    }

    #[test]
    fn broken_timer_reverts_immediately() {
        let mut fb = feedback();
        fb.timer_mut().broken = true;
        fb.show_success();
        assert!(!fb.view().copied);
        assert_eq!(fb.view().label, "Copiar número");
        assert!(!fb.is_pending());
    }
}
