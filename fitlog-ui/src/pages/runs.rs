//! Run Logger Page
//!
//! Live GPS tracking, manual entry, shoes and the run history.

use chrono::Utc;
use leptos::*;
use leptos_router::*;

use fitlog_core::format::{format_pace, hms, km};
use fitlog_core::models::{NewRun, Run, Shoe, DEFAULT_RUN_TYPE, RUN_TYPES};
use fitlog_core::workout::{weekly_mileage, weekly_progress_percent, WEEKLY_MILEAGE_GOAL_KM};

use crate::api;
use crate::components::{Card, ListSkeleton, Modal, RouteMap, SwipeableRow};
use crate::state::{Generation, GlobalState, Handler};
use crate::tracker::{LiveRun, LiveStats};

#[component]
pub fn RunLogger() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let guard = Generation::for_page();

    let (runs, set_runs) = create_signal(None::<Vec<Run>>);
    let (shoes, set_shoes) = create_signal(Vec::<Shoe>::new());

    let reload = Handler::new(move |_: ()| {
        let ticket = guard.ticket();
        let g = guard.clone();
        spawn_local(async move {
            let result = api::list_runs().await;
            if !g.is_current(ticket) {
                return;
            }
            match result {
                Ok(mut list) => {
                    list.sort_by(|a, b| b.start_time.cmp(&a.start_time));
                    set_runs.set(Some(list));
                }
                Err(e) => {
                    set_runs.set(Some(Vec::new()));
                    state.show_error(&e);
                }
            }
        });
        let g = guard.clone();
        spawn_local(async move {
            let result = api::list_shoes().await;
            if g.is_current(ticket) {
                set_shoes.set(result.unwrap_or_default());
            }
        });
    });
    reload.call(());

    let submit = Handler::new(move |run: NewRun| {
        spawn_local(async move {
            match api::create_run(&run).await {
                Ok(_) => {
                    state.show_success("Run saved");
                    reload.call(());
                }
                Err(e) => state.show_error(&e),
            }
        });
    });

    let delete = Handler::new(move |id: i64| {
        spawn_local(async move {
            match api::delete_run(id).await {
                Ok(()) => reload.call(()),
                Err(e) => state.show_error(&e),
            }
        });
    });

    let weekly = move || runs.with(|r| weekly_mileage(r.as_deref().unwrap_or_default(), Utc::now()));

    view! {
        <div class="space-y-6">
            <h1 class="text-3xl font-bold">"Runs"</h1>

            <LiveTracker on_finished=submit />

            <Card title="This week">
                <div class="flex justify-between text-sm mb-2">
                    <span>{move || format!("{:.1} km", weekly())}</span>
                    <span class="text-gray-400">{format!("Goal {:.0} km", WEEKLY_MILEAGE_GOAL_KM)}</span>
                </div>
                <div class="h-3 bg-gray-700 rounded-full overflow-hidden">
                    <div
                        class="h-full bg-orange-500 transition-all"
                        style:width=move || format!("{}%", weekly_progress_percent(weekly()))
                    />
                </div>
            </Card>

            <ManualRunForm shoes=shoes on_submit=submit />

            <ShoeRegistry shoes=shoes on_changed=reload />

            <Card title="History">
                {move || match runs.get() {
                    None => view! { <ListSkeleton count=4 /> }.into_view(),
                    Some(list) if list.is_empty() => view! {
                        <p class="text-gray-400 text-sm">"No runs yet"</p>
                    }
                    .into_view(),
                    Some(list) => list
                        .into_iter()
                        .map(|run| {
                            let id = run.id;
                            view! {
                                <SwipeableRow on_delete=move |_| delete.call(id)>
                                    <RunRow run=run.clone() />
                                </SwipeableRow>
                            }
                        })
                        .collect_view(),
                }}
            </Card>
        </div>
    }
}

#[component]
fn RunRow(run: Run) -> impl IntoView {
    let href = format!("/log/run/{}", run.id);
    let kind = run.run_type.clone().unwrap_or_else(|| DEFAULT_RUN_TYPE.to_string());
    view! {
        <A href=href class="flex items-center justify-between py-3 px-1">
            <div>
                <div class="font-medium">{format!("{} km", km(run.distance_meters))}</div>
                <div class="text-xs text-gray-400">
                    {run.start_time.format("%a %b %-d").to_string()}
                    " · "
                    {kind}
                </div>
            </div>
            <div class="text-right text-sm">
                <div>{hms(run.duration_seconds)}</div>
                <div class="text-gray-400">
                    {format!("{} /km", format_pace(run.duration_seconds, run.distance_meters))}
                </div>
            </div>
        </A>
    }
}

/// Start button plus the modal shown while a run is recorded
#[component]
fn LiveTracker(on_finished: Handler<NewRun>) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    // Leaving the page mid-run releases every sensor
    let live = LiveRun::slot();
    let (stats, set_stats) = create_signal(None::<RwSignal<LiveStats>>);
    let (notes, set_notes) = create_signal(String::new());

    let start = move |_| match LiveRun::start() {
        Ok(run) => {
            set_stats.set(Some(run.stats()));
            live.set_value(Some(run));
        }
        Err(e) => state.show_error(&e),
    };

    let stop = move |_| {
        let Some(run) = live.try_update_value(Option::take).flatten() else {
            return;
        };
        set_stats.set(None);
        let text = notes.get_untracked().trim().to_string();
        set_notes.set(String::new());
        match run.finish((!text.is_empty()).then_some(text)) {
            Ok(new_run) => on_finished.call(new_run),
            Err(e) => state.show_error(&e),
        }
    };

    let abandon = Callback::new(move |_: ()| {
        let confirmed = window()
            .confirm_with_message("Discard this run?")
            .unwrap_or(false);
        if !confirmed {
            return;
        }
        if let Some(run) = live.try_update_value(Option::take).flatten() {
            run.abandon();
        }
        set_stats.set(None);
    });

    let open = Signal::derive(move || stats.get().is_some());
    let current = move || stats.get().map(|s| s.get()).unwrap_or_default();
    let route = Signal::derive(move || current().route);

    view! {
        <button
            class="w-full py-4 bg-orange-600 hover:bg-orange-700 rounded-xl text-lg font-semibold"
            on:click=start
        >
            "Start run"
        </button>

        <Modal open=open on_close=abandon title="Recording">
            <RouteMap route=route width=400 height=220 />
            <div class="grid grid-cols-3 gap-3 my-4 text-center">
                <div>
                    <div class="text-2xl font-bold">{move || km(current().distance_meters)}</div>
                    <div class="text-xs text-gray-400">"km"</div>
                </div>
                <div>
                    <div class="text-2xl font-bold">{move || hms(current().duration_seconds)}</div>
                    <div class="text-xs text-gray-400">"time"</div>
                </div>
                <div>
                    <div class="text-2xl font-bold">
                        {move || {
                            let s = current();
                            format_pace(s.duration_seconds, s.distance_meters)
                        }}
                    </div>
                    <div class="text-xs text-gray-400">"/km"</div>
                </div>
            </div>
            <div class="flex justify-between text-sm text-gray-400 mb-3">
                <span>
                    {move || {
                        let s = current();
                        if s.steps_enabled { format!("{} steps", s.steps) } else { "Steps off".to_string() }
                    }}
                </span>
                <span class=move || if current().good_signal { "text-green-400" } else { "text-yellow-400" }>
                    {move || match current().accuracy {
                        Some(a) => format!("GPS ±{} m", a),
                        None => "Searching GPS".to_string(),
                    }}
                </span>
            </div>
            <input
                type="text"
                placeholder="Notes"
                class="w-full bg-gray-700 rounded-lg px-3 py-2 mb-3"
                prop:value=move || notes.get()
                on:input=move |ev| set_notes.set(event_target_value(&ev))
            />
            <div class="grid grid-cols-2 gap-3">
                <button class="py-3 bg-gray-700 rounded-lg" on:click=move |_| abandon.call(())>
                    "Discard"
                </button>
                <button class="py-3 bg-red-600 rounded-lg font-semibold" on:click=stop>
                    "Stop & save"
                </button>
            </div>
        </Modal>
    }
}

#[component]
fn ManualRunForm(
    #[prop(into)] shoes: Signal<Vec<Shoe>>,
    on_submit: Handler<NewRun>,
) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (distance, set_distance) = create_signal(String::new());
    let (minutes, set_minutes) = create_signal(String::new());
    let (shoe, set_shoe) = create_signal(String::new());
    let (run_type, set_run_type) = create_signal(DEFAULT_RUN_TYPE.to_string());

    let save = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let Ok(km) = distance.get_untracked().trim().parse::<f64>() else {
            state.show_error("Distance must be a number");
            return;
        };
        let Ok(mins) = minutes.get_untracked().trim().parse::<f64>() else {
            state.show_error("Duration must be a number of minutes");
            return;
        };
        if km <= 0.0 || mins <= 0.0 {
            state.show_error("Distance and duration must be positive");
            return;
        }
        on_submit.call(NewRun {
            start_time: Some(Utc::now()),
            duration_seconds: (mins * 60.0).round() as i64,
            distance_meters: km * 1000.0,
            shoe_id: shoe.get_untracked().parse().ok(),
            run_type: Some(run_type.get_untracked()),
            ..Default::default()
        });
        set_distance.set(String::new());
        set_minutes.set(String::new());
    };

    view! {
        <Card title="Log a run">
            <form class="space-y-3" on:submit=save>
                <div class="grid grid-cols-2 gap-3">
                    <input
                        type="number"
                        step="0.01"
                        placeholder="Distance (km)"
                        class="bg-gray-700 rounded-lg px-3 py-2"
                        prop:value=move || distance.get()
                        on:input=move |ev| set_distance.set(event_target_value(&ev))
                    />
                    <input
                        type="number"
                        placeholder="Duration (min)"
                        class="bg-gray-700 rounded-lg px-3 py-2"
                        prop:value=move || minutes.get()
                        on:input=move |ev| set_minutes.set(event_target_value(&ev))
                    />
                </div>
                <div class="grid grid-cols-2 gap-3">
                    <select
                        class="bg-gray-700 rounded-lg px-3 py-2"
                        on:change=move |ev| set_run_type.set(event_target_value(&ev))
                    >
                        {RUN_TYPES
                            .iter()
                            .map(|t| view! { <option value=*t selected=*t == DEFAULT_RUN_TYPE>{*t}</option> })
                            .collect_view()}
                    </select>
                    <select
                        class="bg-gray-700 rounded-lg px-3 py-2"
                        on:change=move |ev| set_shoe.set(event_target_value(&ev))
                    >
                        <option value="">"No shoe"</option>
                        {move || shoes
                            .get()
                            .into_iter()
                            .filter(|s| s.is_active)
                            .map(|s| view! { <option value=s.id.to_string()>{s.label()}</option> })
                            .collect_view()}
                    </select>
                </div>
                <button type="submit" class="w-full py-2 bg-primary-600 rounded-lg font-medium">
                    "Save run"
                </button>
            </form>
        </Card>
    }
}

#[component]
fn ShoeRegistry(
    #[prop(into)] shoes: Signal<Vec<Shoe>>,
    on_changed: Handler<()>,
) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (brand, set_brand) = create_signal(String::new());
    let (model, set_model) = create_signal(String::new());

    let add = move |_| {
        let b = brand.get_untracked().trim().to_string();
        let m = model.get_untracked().trim().to_string();
        if b.is_empty() || m.is_empty() {
            state.show_error("Brand and model are required");
            return;
        }
        spawn_local(async move {
            match api::create_shoe(&b, &m).await {
                Ok(_) => {
                    set_brand.set(String::new());
                    set_model.set(String::new());
                    on_changed.call(());
                }
                Err(e) => state.show_error(&e),
            }
        });
    };

    view! {
        <Card title="Shoes">
            {move || {
                let list = shoes.get();
                if list.is_empty() {
                    view! { <p class="text-gray-400 text-sm mb-3">"No shoes registered"</p> }.into_view()
                } else {
                    list.into_iter()
                        .map(|s| view! {
                            <div class="flex justify-between py-2 border-b border-gray-700 last:border-0">
                                <span>{s.label()}</span>
                                <span class="text-xs text-gray-400">
                                    {if s.is_active { "Active" } else { "Retired" }}
                                </span>
                            </div>
                        })
                        .collect_view()
                }
            }}
            <div class="grid grid-cols-[1fr_1fr_auto] gap-2 mt-3">
                <input
                    type="text"
                    placeholder="Brand"
                    class="bg-gray-700 rounded-lg px-3 py-2 min-w-0"
                    prop:value=move || brand.get()
                    on:input=move |ev| set_brand.set(event_target_value(&ev))
                />
                <input
                    type="text"
                    placeholder="Model"
                    class="bg-gray-700 rounded-lg px-3 py-2 min-w-0"
                    prop:value=move || model.get()
                    on:input=move |ev| set_model.set(event_target_value(&ev))
                />
                <button class="px-3 bg-primary-600 rounded-lg" on:click=add>"Add"</button>
            </div>
        </Card>
    }
}
