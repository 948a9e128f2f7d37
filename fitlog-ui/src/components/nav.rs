//! Navigation Component
//!
//! Bottom tab bar and the page layout around it.

use leptos::*;
use leptos_router::*;

use crate::components::FloatingTimer;

/// Bottom tab bar
#[component]
pub fn Nav() -> impl IntoView {
    view! {
        <nav class="fixed bottom-0 left-0 right-0 z-30 bg-gray-800 border-t border-gray-700 pb-[env(safe-area-inset-bottom)]">
            <div class="grid grid-cols-5 h-16">
                <NavLink href="/" icon="🏠" label="Home" />
                <NavLink href="/log/workout" icon="🏋️" label="Lift" />
                <NavLink href="/log/run" icon="🏃" label="Run" />
                <NavLink href="/log/food" icon="🍽️" label="Food" />
                <NavLink href="/analytics" icon="📈" label="Stats" />
            </div>
        </nav>
    }
}

/// Individual navigation link
#[component]
fn NavLink(
    href: &'static str,
    icon: &'static str,
    label: &'static str,
) -> impl IntoView {
    view! {
        <A
            href=href
            exact=href == "/"
            class="flex flex-col items-center justify-center text-gray-400 hover:text-white transition-colors"
            active_class="text-primary-400"
        >
            <span class="text-xl">{icon}</span>
            <span class="text-xs mt-0.5">{label}</span>
        </A>
    }
}

/// Signed-in shell: header, routed content, floating timer and tab bar
#[component]
pub fn Layout() -> impl IntoView {
    view! {
        <div class="min-h-screen bg-gray-900 text-white flex flex-col">
            <header class="sticky top-0 z-20 bg-gray-900/90 backdrop-blur border-b border-gray-800">
                <div class="container mx-auto px-4 h-14 flex items-center justify-between">
                    <A href="/" class="text-lg font-bold">"Fitlog"</A>
                    <A href="/profile" class="text-gray-400 hover:text-white">"👤"</A>
                </div>
            </header>

            <main class="flex-1 container mx-auto px-4 py-6 pb-28">
                <Outlet />
            </main>

            <FloatingTimer />
            <Nav />
        </div>
    }
}
