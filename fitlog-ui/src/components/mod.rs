//! UI Components
//!
//! Reusable Leptos components shared by the pages.

pub mod card;
pub mod chart;
pub mod floating_timer;
pub mod loading;
pub mod nav;
pub mod progress_ring;
pub mod route_map;
pub mod stepper;
pub mod swipeable_row;
pub mod toast;

pub use card::{BottomSheet, Card, Modal};
pub use chart::BarChart;
pub use floating_timer::FloatingTimer;
pub use loading::{ListSkeleton, Loading, Skeleton};
pub use nav::{Layout, Nav};
pub use progress_ring::ProgressRing;
pub use route_map::RouteMap;
pub use stepper::Stepper;
pub use swipeable_row::SwipeableRow;
pub use toast::Toast;
