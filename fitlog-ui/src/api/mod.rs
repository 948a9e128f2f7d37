//! API Module
//!
//! HTTP client for the fitlog REST API.

pub mod client;

pub use client::*;
