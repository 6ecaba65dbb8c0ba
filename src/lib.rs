#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Page embellishments for the Modas Bety site: a falling sakura petal
//! canvas, copy-phone-number buttons and the service gallery marquee.
//!
//! Everything outside `wasm` is plain Rust and runs under `cargo test` on
//! the host; `wasm` binds it to the browser.

pub mod animator;
pub mod config;
pub mod copy;
pub mod env;
pub mod error;
pub mod field;
pub mod petal;
pub mod surface;

pub use animator::{Animator, Lifecycle};
pub use config::{CopyConfig, PetalConfig};
pub use error::PetalError;

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use wasm_bindgen::prelude::*;

    use crate::config::CopyConfig;
    use crate::error::PetalError;

    pub mod copy_button;
    pub mod env;
    pub mod gallery;
    pub mod petals;
    pub mod render;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        let level = if cfg!(debug_assertions) {
            log::Level::Debug
        } else {
            log::Level::Info
        };
        console_log::init_with_level(level).ok();

        let window = web_sys::window().ok_or(PetalError::MissingGlobal("window"))?;
        let document = window
            .document()
            .ok_or(PetalError::MissingGlobal("document"))?;

        // Each feature is cosmetic; one failing must not take the others down.
        // The animator keeps itself alive until the page is torn down.
        match petals::start(&window, &document) {
            Ok(_) => log::debug!("petal animation waiting for its sprite"),
            Err(err) => log::error!("petal animation disabled: {err}"),
        }
        match copy_button::init(&window, &document, &CopyConfig::default()) {
            Ok(count) => log::debug!("{count} copy buttons ready"),
            Err(err) => log::error!("copy buttons disabled: {err}"),
        }
        if let Err(err) = gallery::init(&document) {
            log::debug!("gallery marquee skipped: {err}");
        }
        Ok(())
    }
}
