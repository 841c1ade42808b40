//! # client
//!
//! Leptos + WASM frontend for Asili SSMS. Renders the landing page with the
//! login form and the SDG 4 indicator widget, and the signed-in dashboard.
//!
//! This crate contains pages, components, session and metrics state, and the
//! REST helpers used to talk to the `asili` server. Server-side rendering is
//! enabled with the `ssr` feature; browser hydration with `hydrate`.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point called by the generated hydration script.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::hydrate_body(app::App);
}
