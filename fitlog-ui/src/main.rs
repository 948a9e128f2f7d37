//! Fitlog
//!
//! Mobile-first fitness tracker built with Leptos (WASM).
//!
//! # Features
//!
//! - Resistance training sessions with a floating rest timer
//! - Live GPS run tracking with a canvas route
//! - Meal logging against a daily energy target
//! - Daily analytics charts
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. It talks to the fitlog API over HTTP with a session cookie.
//! Domain logic comes from `fitlog-core`; this crate binds it to the
//! browser (timers, sensors, canvas).

use leptos::*;

mod api;
mod app;
mod components;
mod pages;
mod state;
mod tracker;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    mount_to_body(|| view! { <app::App /> });
}
