//! API Routes
//!
//! Route handlers organized by resource.

pub mod analytics;
pub mod auth;
pub mod body;
pub mod health;
pub mod identity;
pub mod nutrition;
pub mod resistance;
pub mod running;
