//! Page FX core crate.
//!
//! Client-side behaviours for a single sectioned page: scroll-spy nav
//! highlighting, smooth scrolling to anchors, one-shot reveal of sections as
//! they enter the viewport, scroll-driven parallax and a decorative shower of
//! falling pieces. Call `start_page()` from JS once the module is loaded.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod page;
mod rng;

pub use config::PageConfig;
pub use error::PageError;
pub use page::parallax::parallax_offset;
pub use page::pieces::{SpawnBatch, initial_batch, resize_batch};
pub use page::scroll_spy::active_section_index;
pub use page::smooth_scroll::ease_in_out_quad;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
}

// -----------------------------------------------------------------------------
// Entrypoints
// -----------------------------------------------------------------------------

/// Starts the page controller with the stock settings.
#[wasm_bindgen]
pub fn start_page() -> Result<(), JsValue> {
    page::start(PageConfig::default())?;
    Ok(())
}

/// Starts the page controller with settings from a JSON object. Omitted fields
/// keep their defaults.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_page_with_config(json: &str) -> Result<(), JsValue> {
    let cfg = PageConfig::from_json(json)?;
    page::start(cfg)?;
    Ok(())
}
