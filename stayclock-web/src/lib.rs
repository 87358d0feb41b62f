#![forbid(unsafe_code)]
//! Browser shell for the Stayclock engine: `localStorage` persistence,
//! share-link handling and `wasm-bindgen` exports for page scripts.
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
pub mod bindings;
pub mod dom;
pub mod input;
pub mod share_link;
pub mod storage;

pub use stayclock_engine as engine;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
