//! Login Page
//!
//! Google sign-in redirect, or a phone number plus the ID token issued by
//! the phone verification provider.

use leptos::*;
use leptos_router::*;

use crate::api;
use crate::state::{GlobalState, SessionStatus};

#[component]
pub fn Login() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let navigate = use_navigate();

    let (phone, set_phone) = create_signal(String::new());
    let (token, set_token) = create_signal(String::new());
    let (pending, set_pending) = create_signal(false);

    // Signed in, either already or by the form below
    create_effect(move |_| {
        if matches!(state.session.get(), SessionStatus::SignedIn(_)) {
            navigate("/", Default::default());
        }
    });

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let number = phone.get_untracked().trim().to_string();
        let id_token = token.get_untracked().trim().to_string();
        if number.is_empty() || id_token.is_empty() {
            state.show_error("Phone number and verification token are required");
            return;
        }
        set_pending.set(true);
        spawn_local(async move {
            match api::phone_login(&id_token, &number).await {
                Ok(auth) if auth.success => state.set_user(auth.user),
                Ok(_) => state.show_error("Sign-in was rejected"),
                Err(e) => state.show_error(&e),
            }
            let _ = set_pending.try_set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-gray-900 text-white flex items-center justify-center p-4">
            <div class="w-full max-w-sm space-y-6">
                <div class="text-center">
                    <h1 class="text-4xl font-bold">"Fitlog"</h1>
                    <p class="text-gray-400 mt-2">"Lifting, running and food in one log"</p>
                </div>

                <a
                    href=api::google_login_url()
                    class="block w-full py-3 bg-white text-gray-900 rounded-lg font-semibold text-center"
                >
                    "Continue with Google"
                </a>

                <div class="flex items-center gap-3 text-gray-500 text-sm">
                    <div class="flex-1 h-px bg-gray-700" />
                    "or"
                    <div class="flex-1 h-px bg-gray-700" />
                </div>

                <form class="space-y-3" on:submit=submit>
                    <input
                        type="tel"
                        placeholder="+1 555 123 4567"
                        autocomplete="tel"
                        class="w-full bg-gray-800 border border-gray-700 rounded-lg px-3 py-3"
                        prop:value=move || phone.get()
                        on:input=move |ev| set_phone.set(event_target_value(&ev))
                    />
                    <input
                        type="text"
                        placeholder="Verification token"
                        class="w-full bg-gray-800 border border-gray-700 rounded-lg px-3 py-3"
                        prop:value=move || token.get()
                        on:input=move |ev| set_token.set(event_target_value(&ev))
                    />
                    <button
                        type="submit"
                        class="w-full py-3 bg-primary-600 hover:bg-primary-700 rounded-lg font-semibold disabled:opacity-50"
                        disabled=move || pending.get()
                    >
                        {move || if pending.get() { "Signing in..." } else { "Sign in with phone" }}
                    </button>
                </form>
            </div>
        </div>
    }
}
