//! Page Components
//!
//! One module per routed view.

pub mod analytics;
pub mod dashboard;
pub mod login;
pub mod meals;
pub mod profile;
pub mod run_detail;
pub mod runs;
pub mod workout_session;
pub mod workouts;

pub use analytics::Analytics;
pub use dashboard::Dashboard;
pub use login::Login;
pub use meals::MealLogger;
pub use profile::Profile;
pub use run_detail::RunDetail;
pub use runs::RunLogger;
pub use workout_session::WorkoutSession;
pub use workouts::WorkoutLogger;
