//! State Management
//!
//! Global session state, the injected rest timer and the page load guard.

pub mod global;
pub mod guard;
pub mod handler;
pub mod timer;

pub use global::{provide_global_state, GlobalState, SessionStatus, ToastKind};
pub use guard::Generation;
pub use handler::Handler;
pub use timer::{provide_rest_timer, use_rest_timer, RestTimer};
