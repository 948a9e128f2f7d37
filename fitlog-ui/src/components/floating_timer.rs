//! Floating rest timer
//!
//! Pill pinned above the tab bar while the rest timer runs. Offers ±15 s,
//! pause/resume and skip.

use leptos::*;

use crate::state::use_rest_timer;

const NUDGE_SECONDS: i64 = 15;

#[component]
pub fn FloatingTimer() -> impl IntoView {
    let timer = use_rest_timer();

    view! {
        <Show when=move || timer.is_running()>
            <div class="fixed bottom-20 left-1/2 -translate-x-1/2 z-30 flex items-center space-x-2 bg-gray-800 border border-gray-700 rounded-full shadow-lg px-3 py-2">
                <button
                    class="w-9 h-9 rounded-full bg-gray-700 text-sm"
                    on:click=move |_| timer.add_time(-NUDGE_SECONDS)
                >
                    "-15"
                </button>
                <span class=move || {
                    if timer.is_overtime() {
                        "font-mono text-xl w-20 text-center text-red-400"
                    } else {
                        "font-mono text-xl w-20 text-center"
                    }
                }>
                    {move || timer.display()}
                </span>
                <button
                    class="w-9 h-9 rounded-full bg-gray-700 text-sm"
                    on:click=move |_| timer.add_time(NUDGE_SECONDS)
                >
                    "+15"
                </button>
                <button
                    class="w-9 h-9 rounded-full bg-gray-700"
                    on:click=move |_| {
                        if timer.is_paused() { timer.resume() } else { timer.pause() }
                    }
                >
                    {move || if timer.is_paused() { "▶" } else { "⏸" }}
                </button>
                <button
                    class="px-3 h-9 rounded-full bg-primary-600 text-sm font-medium"
                    on:click=move |_| timer.stop()
                >
                    "Skip"
                </button>
            </div>
        </Show>
    }
}
