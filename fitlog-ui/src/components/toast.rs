//! Toast Notification Component
//!
//! Renders the toasts queued on [`GlobalState`].

use leptos::*;

use crate::state::global::{GlobalState, ToastMessage};

/// Toast notification container
#[component]
pub fn Toast() -> impl IntoView {
    let state = expect_context::<GlobalState>();

    view! {
        <div class="fixed top-4 left-1/2 -translate-x-1/2 z-50 space-y-2 w-[90vw] max-w-sm">
            <For
                each=move || state.toasts.get()
                key=|t| t.id
                children=move |toast| view! { <ToastItem toast=toast /> }
            />
        </div>
    }
}

#[component]
fn ToastItem(toast: ToastMessage) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let id = toast.id;

    view! {
        <div
            class=format!(
                "flex items-center space-x-3 {} text-white px-4 py-3 rounded-lg shadow-lg animate-slide-in",
                toast.kind.class()
            )
            on:click=move |_| state.dismiss(id)
        >
            <span class="text-lg">{toast.kind.icon()}</span>
            <span class="text-sm font-medium">{toast.text}</span>
        </div>
    }
}
