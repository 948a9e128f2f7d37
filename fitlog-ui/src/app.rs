//! App Root Component
//!
//! Provides global state and the rest timer, probes the session and routes.

use leptos::*;
use leptos_router::*;

use crate::components::{Layout, Loading, Toast};
use crate::pages::{
    Analytics, Dashboard, Login, MealLogger, Profile, RunDetail, RunLogger, WorkoutLogger,
    WorkoutSession,
};
use crate::state::{provide_global_state, provide_rest_timer, SessionStatus};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    let state = provide_global_state();
    provide_rest_timer();

    // Session probe decides between the app and the login page
    state.probe_session();

    view! {
        <Router>
            <Routes>
                <Route path="/login" view=Login />
                <Route path="/" view=RequireSession>
                    <Route path="" view=Dashboard />
                    <Route path="log/workout" view=WorkoutLogger />
                    <Route path="log/workout/:id" view=WorkoutSession />
                    <Route path="log/run" view=RunLogger />
                    <Route path="log/run/:id" view=RunDetail />
                    <Route path="log/food" view=MealLogger />
                    <Route path="analytics" view=Analytics />
                    <Route path="profile" view=Profile />
                    <Route path="*any" view=NotFound />
                </Route>
            </Routes>
            <Toast />
        </Router>
    }
}

/// Renders the signed-in layout, or sends the visitor to `/login`
#[component]
fn RequireSession() -> impl IntoView {
    let state = expect_context::<crate::state::GlobalState>();

    // Profile edits replace the user; only a change of status remounts
    let signed_in = create_memo(move |_| match state.session.get() {
        SessionStatus::Checking => None,
        SessionStatus::SignedOut => Some(false),
        SessionStatus::SignedIn(_) => Some(true),
    });

    move || match signed_in.get() {
        None => view! {
            <div class="min-h-screen bg-gray-900 text-white">
                <Loading />
            </div>
        }
        .into_view(),
        Some(false) => view! { <Redirect path="/login" /> }.into_view(),
        Some(true) => view! { <Layout /> }.into_view(),
    }
}

/// 404 Not Found page
#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="flex flex-col items-center justify-center min-h-[60vh] text-center">
            <div class="text-6xl mb-4">"🔍"</div>
            <h1 class="text-3xl font-bold mb-2">"Page Not Found"</h1>
            <p class="text-gray-400 mb-6">"The page you're looking for doesn't exist."</p>
            <A
                href="/"
                class="px-6 py-3 bg-primary-600 hover:bg-primary-700 rounded-lg font-medium transition-colors"
            >
                "Go to Dashboard"
            </A>
        </div>
    }
}
