//! # Fitlog Core
//!
//! Domain logic shared by the fitlog server, CLI and browser client.
//! Nothing in this crate performs I/O, so it compiles unchanged for
//! native targets and `wasm32-unknown-unknown`.
//!
//! ## Modules
//!
//! - [`models`]: REST entities and request payloads
//! - [`timer`]: Countdown/stopwatch rest-timer state machine
//! - [`tracking`]: Live-run tracker (distance, steps, route buffer, subscriptions)
//! - [`geo`]: Great-circle distance and elevation helpers
//! - [`splits`]: Per-kilometre splits from a recorded route
//! - [`nutrition`]: Energy target, portion scaling and meal totals
//! - [`workout`]: Set grouping and training volume
//! - [`format`]: Display helpers for clocks, paces and distances
//!
//! ## Example
//!
//! ```rust
//! use fitlog_core::timer::TimerEngine;
//!
//! let mut timer = TimerEngine::new();
//! timer.start(Some(30));
//! timer.tick();
//! timer.tick();
//! timer.tick();
//! assert_eq!(timer.time(), 27);
//! assert_eq!(TimerEngine::format_time(timer.time()), "0:27");
//! ```

pub mod format;
pub mod geo;
pub mod models;
pub mod nutrition;
pub mod splits;
pub mod timer;
pub mod tracking;
pub mod workout;

pub use models::{
    BodyMetric, DailySummary, Exercise, FoodEntry, FoodLibraryItem, Meal, Routine,
    RoutineExercise, Run, Shoe, User, WorkoutSession, WorkoutSet,
};

pub use timer::{TimerEngine, TimerMode};

pub use tracking::{
    Disposer, DistanceAccumulator, MotionSample, PositionSample, RoutePoint, StepDetector,
    TrackError, TrackerSession, TrackerState,
};

pub use nutrition::{ActivityLevel, EnergyTarget, MacroTotals, WeightGoal};

pub use splits::{compute_splits, Split};
