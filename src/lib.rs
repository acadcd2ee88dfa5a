//! SoleLink - sneaker marketplace front end
//!
//! Navigation bar and authentication modal built with Leptos. Accounts,
//! sessions and profile documents live in an external collaborator
//! (Firebase, or an in-memory stand-in when none is configured).

#![recursion_limit = "4096"]

pub mod app;
pub mod core;
pub mod ui;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
