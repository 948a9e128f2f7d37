//! Containers
//!
//! Card, centred modal and bottom sheet.

use leptos::*;

/// Rounded panel with an optional title
#[component]
pub fn Card(
    #[prop(optional, into)]
    title: Option<String>,
    #[prop(optional, into)]
    class: String,
    children: Children,
) -> impl IntoView {
    view! {
        <section class=format!("bg-gray-800 rounded-xl p-4 border border-gray-700 {}", class)>
            {title.map(|t| view! { <h2 class="text-lg font-semibold mb-3">{t}</h2> })}
            {children()}
        </section>
    }
}

/// Centred dialog over a dimmed backdrop. Clicking the backdrop closes it.
#[component]
pub fn Modal(
    #[prop(into)]
    open: Signal<bool>,
    #[prop(into)]
    on_close: Callback<()>,
    #[prop(optional, into)]
    title: Option<String>,
    children: ChildrenFn,
) -> impl IntoView {
    let title = store_value(title);
    let children = store_value(children);

    view! {
        <Show when=move || open.get()>
            <div
                class="fixed inset-0 z-40 bg-black/60 flex items-center justify-center p-4"
                on:click=move |_| on_close.call(())
            >
                <div
                    class="bg-gray-800 rounded-xl w-full max-w-md p-6 shadow-xl"
                    on:click=|ev| ev.stop_propagation()
                >
                    <div class="flex items-center justify-between mb-4">
                        <h3 class="text-xl font-semibold">{title.get_value()}</h3>
                        <button
                            class="text-gray-400 hover:text-white text-2xl leading-none"
                            on:click=move |_| on_close.call(())
                        >
                            "×"
                        </button>
                    </div>
                    {children.with_value(|c| c())}
                </div>
            </div>
        </Show>
    }
}

/// Panel sliding up from the bottom edge
#[component]
pub fn BottomSheet(
    #[prop(into)]
    open: Signal<bool>,
    #[prop(into)]
    on_close: Callback<()>,
    #[prop(optional, into)]
    title: Option<String>,
    children: ChildrenFn,
) -> impl IntoView {
    let title = store_value(title);
    let children = store_value(children);

    view! {
        <Show when=move || open.get()>
            <div class="fixed inset-0 z-40 bg-black/50" on:click=move |_| on_close.call(()) />
            <div class="fixed bottom-0 left-0 right-0 z-50 bg-gray-800 rounded-t-2xl p-4 pb-8 max-h-[80vh] overflow-y-auto animate-slide-up">
                <div class="w-10 h-1 bg-gray-600 rounded-full mx-auto mb-4" />
                {title.get_value().map(|t| view! { <h3 class="text-lg font-semibold mb-3">{t}</h3> })}
                {children.with_value(|c| c())}
            </div>
        </Show>
    }
}
