//! Workout Logger Page
//!
//! Start a session (freestyle or from a routine), manage routines and
//! browse past sessions.

use leptos::*;
use leptos_router::*;

use fitlog_core::models::{Exercise, NewSession, Routine, WorkoutSession};
use fitlog_core::workout::{routine_sets, volume};

use crate::api;
use crate::components::{BottomSheet, Card, ListSkeleton, SwipeableRow};
use crate::state::{Generation, GlobalState, Handler};

const FREESTYLE: &str = "Freestyle";

#[component]
pub fn WorkoutLogger() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let navigate = use_navigate();
    let guard = Generation::for_page();

    let (sessions, set_sessions) = create_signal(None::<Vec<WorkoutSession>>);
    let (routines, set_routines) = create_signal(None::<Vec<Routine>>);
    let (exercises, set_exercises) = create_signal(Vec::<Exercise>::new());
    let (starting, set_starting) = create_signal(false);
    let (editor_open, set_editor_open) = create_signal(false);

    let reload = Handler::new(move |_: ()| {
        let ticket = guard.ticket();
        let g = guard.clone();
        spawn_local(async move {
            let result = api::list_sessions().await;
            if !g.is_current(ticket) {
                return;
            }
            match result {
                Ok(mut list) => {
                    list.sort_by(|a, b| b.start_time.cmp(&a.start_time));
                    set_sessions.set(Some(list));
                }
                Err(e) => {
                    set_sessions.set(Some(Vec::new()));
                    state.show_error(&e);
                }
            }
        });
        let g = guard.clone();
        spawn_local(async move {
            let result = api::list_routines().await;
            if !g.is_current(ticket) {
                return;
            }
            match result {
                Ok(list) => set_routines.set(Some(list)),
                Err(e) => {
                    set_routines.set(Some(Vec::new()));
                    state.show_error(&e);
                }
            }
        });
        let g = guard.clone();
        spawn_local(async move {
            let result = api::list_exercises().await;
            if g.is_current(ticket) {
                set_exercises.set(result.unwrap_or_default());
            }
        });
    });
    reload.call(());

    let start = Callback::new(move |routine: Option<Routine>| {
        if starting.get_untracked() {
            return;
        }
        set_starting.set(true);
        let navigate = navigate.clone();
        spawn_local(async move {
            let notes = routine
                .as_ref()
                .map(|r| r.name.clone())
                .unwrap_or_else(|| FREESTYLE.to_string());
            let body = NewSession {
                start_time: None,
                notes: Some(notes),
            };
            match api::create_session(&body).await {
                Ok(session) => {
                    // Seed one empty set per routine exercise, in order
                    if let Some(routine) = routine {
                        for set in routine_sets(&routine) {
                            if let Err(e) = api::add_set(session.id, &set).await {
                                state.show_error(&e);
                                break;
                            }
                        }
                    }
                    set_starting.set(false);
                    navigate(&format!("/log/workout/{}", session.id), Default::default());
                }
                Err(e) => {
                    set_starting.set(false);
                    state.show_error(&e);
                }
            }
        });
    });

    let delete_session = Handler::new(move |id: i64| {
        spawn_local(async move {
            match api::delete_session(id).await {
                Ok(()) => {
                    state.show_success("Session deleted");
                    reload.call(());
                }
                Err(e) => state.show_error(&e),
            }
        });
    });

    let delete_routine = Handler::new(move |id: i64| {
        spawn_local(async move {
            match api::delete_routine(id).await {
                Ok(()) => reload.call(()),
                Err(e) => state.show_error(&e),
            }
        });
    });

    view! {
        <div class="space-y-6">
            <h1 class="text-3xl font-bold">"Workouts"</h1>

            <button
                class="w-full py-4 bg-primary-600 hover:bg-primary-700 rounded-xl text-lg font-semibold disabled:opacity-50"
                disabled=move || starting.get()
                on:click=move |_| start.call(None)
            >
                {move || if starting.get() { "Starting..." } else { "Quick start" }}
            </button>

            <Card title="Routines">
                {move || match routines.get() {
                    None => view! { <ListSkeleton count=2 /> }.into_view(),
                    Some(list) if list.is_empty() => view! {
                        <p class="text-gray-400 text-sm">"No routines yet"</p>
                    }
                    .into_view(),
                    Some(list) => list
                        .into_iter()
                        .map(|routine| {
                            let id = routine.id;
                            let summary = routine
                                .exercises
                                .iter()
                                .map(|e| e.exercise_name.as_str())
                                .collect::<Vec<_>>()
                                .join(", ");
                            let name = routine.name.clone();
                            let chosen = routine.clone();
                            view! {
                                <div class="flex items-center justify-between py-3 border-b border-gray-700 last:border-0">
                                    <div class="min-w-0">
                                        <div class="font-medium">{name}</div>
                                        <div class="text-xs text-gray-400 truncate">{summary}</div>
                                    </div>
                                    <div class="flex gap-2 shrink-0">
                                        <button
                                            class="px-3 py-1 bg-primary-600 rounded-lg text-sm"
                                            on:click=move |_| start.call(Some(chosen.clone()))
                                        >
                                            "Start"
                                        </button>
                                        <button
                                            class="px-3 py-1 text-red-400 text-sm"
                                            on:click=move |_| delete_routine.call(id)
                                        >
                                            "Delete"
                                        </button>
                                    </div>
                                </div>
                            }
                        })
                        .collect_view(),
                }}
                <button
                    class="mt-3 text-primary-400 text-sm"
                    on:click=move |_| set_editor_open.set(true)
                >
                    "+ New routine"
                </button>
            </Card>

            <Card title="History">
                {move || match sessions.get() {
                    None => view! { <ListSkeleton count=4 /> }.into_view(),
                    Some(list) if list.is_empty() => view! {
                        <p class="text-gray-400 text-sm">"No sessions logged"</p>
                    }
                    .into_view(),
                    Some(list) => list
                        .into_iter()
                        .map(|session| {
                            let id = session.id;
                            view! {
                                <SwipeableRow on_delete=move |_| delete_session.call(id)>
                                    <HistoryRow session=session.clone() />
                                </SwipeableRow>
                            }
                        })
                        .collect_view(),
                }}
            </Card>

            <RoutineEditor
                open=editor_open
                exercises=exercises
                on_close=move |_| set_editor_open.set(false)
                on_saved=move |_| {
                    set_editor_open.set(false);
                    reload.call(());
                }
            />
        </div>
    }
}

#[component]
fn HistoryRow(session: WorkoutSession) -> impl IntoView {
    let href = format!("/log/workout/{}", session.id);
    let title = session.notes.clone().unwrap_or_else(|| "Workout".to_string());
    let lifted = volume(&session.sets);
    let status = match session.duration_minutes() {
        Some(m) => format!("{} min", m),
        None => "Active".to_string(),
    };

    view! {
        <A href=href class="flex items-center justify-between py-3 px-1">
            <div>
                <div class="font-medium">{title}</div>
                <div class="text-xs text-gray-400">
                    {session.start_time.format("%a %b %-d").to_string()}
                    " · "
                    {format!("{} sets · {:.0} kg", session.sets.len(), lifted)}
                </div>
            </div>
            <span class="text-sm text-gray-400">{status}</span>
        </A>
    }
}

/// Sheet for naming a routine and picking its exercises in order
#[component]
fn RoutineEditor(
    #[prop(into)] open: Signal<bool>,
    #[prop(into)] exercises: Signal<Vec<Exercise>>,
    #[prop(into)] on_close: Callback<()>,
    #[prop(into)] on_saved: Handler<()>,
) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (name, set_name) = create_signal(String::new());
    let (picked, set_picked) = create_signal(Vec::<i64>::new());

    let toggle = move |id: i64| {
        set_picked.update(|ids| {
            if let Some(pos) = ids.iter().position(|x| *x == id) {
                ids.remove(pos);
            } else {
                ids.push(id);
            }
        });
    };

    let save = move |_| {
        let title = name.get_untracked().trim().to_string();
        if title.is_empty() {
            state.show_error("Routine name is required");
            return;
        }
        let ids = picked.get_untracked();
        spawn_local(async move {
            match api::create_routine(&title, ids).await {
                Ok(_) => {
                    set_name.set(String::new());
                    set_picked.set(Vec::new());
                    state.show_success("Routine saved");
                    on_saved.call(());
                }
                Err(e) => state.show_error(&e),
            }
        });
    };

    view! {
        <BottomSheet open=open on_close=on_close title="New routine">
            <input
                type="text"
                placeholder="Routine name"
                class="w-full bg-gray-700 rounded-lg px-3 py-2 mb-3"
                prop:value=move || name.get()
                on:input=move |ev| set_name.set(event_target_value(&ev))
            />
            <div class="max-h-64 overflow-y-auto space-y-1">
                <For
                    each=move || exercises.get()
                    key=|e| e.id
                    children=move |exercise| {
                        let id = exercise.id;
                        let order = move || {
                            picked.with(|ids| ids.iter().position(|x| *x == id).map(|p| p + 1))
                        };
                        view! {
                            <button
                                class="w-full flex items-center justify-between px-3 py-2 rounded-lg hover:bg-gray-700"
                                on:click=move |_| toggle(id)
                            >
                                <span>{exercise.name.clone()}</span>
                                <span class="text-primary-400 text-sm">
                                    {move || order().map(|n| format!("#{}", n)).unwrap_or_default()}
                                </span>
                            </button>
                        }
                    }
                />
            </div>
            <button
                class="w-full mt-4 py-3 bg-primary-600 rounded-lg font-semibold"
                on:click=save
            >
                "Save routine"
            </button>
        </BottomSheet>
    }
}
