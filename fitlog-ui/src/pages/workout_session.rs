//! Workout Session Page
//!
//! Sets grouped by exercise. Saving a set restarts the rest timer.

use chrono::Utc;
use leptos::*;
use leptos_router::*;

use fitlog_core::models::{Exercise, NewExercise, NewSet, WorkoutSession as Session, WorkoutSet};
use fitlog_core::workout::{
    empty_set, follow_up_set, group_sets, search_exercises, volume, SetGroup, DEFAULT_REST_SECONDS,
};

use crate::api;
use crate::components::{BottomSheet, Card, Loading, Stepper, SwipeableRow};
use crate::state::{use_rest_timer, Generation, GlobalState, Handler};

#[component]
pub fn WorkoutSession() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let params = use_params_map();
    let navigate = use_navigate();
    let guard = Generation::for_page();

    let session_id = move || {
        params.with(|p| p.get("id").and_then(|id| id.parse::<i64>().ok()))
    };

    let (session, set_session) = create_signal(None::<Session>);
    let (error, set_error) = create_signal(None::<String>);
    let (exercises, set_exercises) = create_signal(Vec::<Exercise>::new());
    let (picker_open, set_picker_open) = create_signal(false);

    let reload = Handler::new(move |_: ()| {
        let Some(id) = session_id() else {
            set_error.set(Some("Invalid session id".to_string()));
            return;
        };
        let ticket = guard.ticket();
        let g = guard.clone();
        spawn_local(async move {
            let result = api::get_session(id).await;
            if !g.is_current(ticket) {
                return;
            }
            match result {
                Ok(s) => {
                    set_error.set(None);
                    set_session.set(Some(s));
                }
                Err(e) => set_error.set(Some(e)),
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

    let add_set = Handler::new(move |set: NewSet| {
        let Some(id) = session_id() else { return };
        spawn_local(async move {
            match api::add_set(id, &set).await {
                Ok(_) => reload.call(()),
                Err(e) => state.show_error(&e),
            }
        });
    });

    let finish = move |_| {
        let Some(id) = session_id() else { return };
        let navigate = navigate.clone();
        spawn_local(async move {
            match api::finish_session(id, Utc::now()).await {
                Ok(()) => {
                    state.show_success("Workout finished");
                    navigate("/log/workout", Default::default());
                }
                Err(e) => state.show_error(&e),
            }
        });
    };

    let groups = create_memo(move |_| {
        session.with(|s| s.as_ref().map(|s| group_sets(&s.sets)).unwrap_or_default())
    });

    view! {
        <div class="space-y-4 pb-24">
            {move || error.get().map(|e| view! {
                <div class="bg-red-900/40 border border-red-700 rounded-lg p-3 text-sm">{e}</div>
            })}

            {move || match session.get() {
                None if error.get().is_none() => view! { <Loading /> }.into_view(),
                None => ().into_view(),
                Some(s) => view! { <SessionHeader session=s /> }.into_view(),
            }}

            <For
                each=move || groups.get().into_iter().enumerate()
                key=|(i, g)| (*i, g.exercise_id, g.sets.iter().map(|s| s.id).collect::<Vec<_>>())
                children=move |(_, group)| view! {
                    <GroupCard group=group on_add=add_set on_changed=reload />
                }
            />

            <Show when=move || session.with(|s| s.as_ref().is_some_and(|s| !s.is_finished()))>
                <div class="grid grid-cols-2 gap-3">
                    <button
                        class="py-3 bg-gray-700 hover:bg-gray-600 rounded-lg font-medium"
                        on:click=move |_| set_picker_open.set(true)
                    >
                        "+ Exercise"
                    </button>
                    <button
                        class="py-3 bg-green-600 hover:bg-green-700 rounded-lg font-semibold"
                        on:click=finish.clone()
                    >
                        "Finish"
                    </button>
                </div>
            </Show>

            <ExercisePicker
                open=picker_open
                exercises=exercises
                on_close=move |_| set_picker_open.set(false)
                on_pick=move |exercise_id: i64| {
                    set_picker_open.set(false);
                    add_set.call(empty_set(exercise_id));
                }
            />
        </div>
    }
}

#[component]
fn SessionHeader(session: Session) -> impl IntoView {
    let title = session.notes.clone().unwrap_or_else(|| "Workout".to_string());
    let status = match session.duration_minutes() {
        Some(m) => format!("Finished · {} min", m),
        None => format!("Started {}", session.start_time.format("%H:%M")),
    };
    view! {
        <div>
            <h1 class="text-2xl font-bold">{title}</h1>
            <p class="text-gray-400 text-sm">
                {status}
                " · "
                {format!("{:.0} kg lifted", volume(&session.sets))}
            </p>
        </div>
    }
}

#[component]
fn GroupCard(
    group: SetGroup,
    on_add: Handler<NewSet>,
    on_changed: Handler<()>,
) -> impl IntoView {
    let next = follow_up_set(&group);
    let rows = group
        .sets
        .iter()
        .enumerate()
        .map(|(i, set)| view! { <SetRow number=i + 1 set=set.clone() on_changed=on_changed /> })
        .collect_view();

    view! {
        <Card title=group.exercise_name.clone()>
            <div class="space-y-2">{rows}</div>
            <button
                class="mt-3 w-full py-2 text-primary-400 text-sm border border-dashed border-gray-600 rounded-lg"
                on:click=move |_| on_add.call(next.clone())
            >
                "+ Add set"
            </button>
        </Card>
    }
}

/// One editable set: steppers hold local edits until saved
#[component]
fn SetRow(number: usize, set: WorkoutSet, on_changed: Handler<()>) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let timer = use_rest_timer();

    let (weight, set_weight) = create_signal(set.weight_kg);
    let (reps, set_reps) = create_signal(set.reps as f64);
    let (saving, set_saving) = create_signal(false);
    let set_id = set.id;
    let exercise_id = set.exercise_id;
    let rpe = set.rpe;

    let save = move |_| {
        set_saving.set(true);
        let body = NewSet {
            exercise_id,
            weight_kg: weight.get_untracked(),
            reps: reps.get_untracked().round() as i64,
            rpe,
            performed_at: None,
        };
        spawn_local(async move {
            match api::update_set(set_id, &body).await {
                Ok(()) => {
                    timer.stop();
                    timer.start(Some(DEFAULT_REST_SECONDS));
                    on_changed.call(());
                }
                Err(e) => state.show_error(&e),
            }
            let _ = set_saving.try_set(false);
        });
    };

    let delete = move |_| {
        spawn_local(async move {
            match api::delete_set(set_id).await {
                Ok(()) => on_changed.call(()),
                Err(e) => state.show_error(&e),
            }
        });
    };

    view! {
        <SwipeableRow on_delete=delete>
            <div class="flex items-end gap-3 py-2">
                <span class="w-6 text-gray-400 font-semibold pb-2">{number}</span>
                <Stepper
                    value=weight
                    on_change=move |v| set_weight.set(v)
                    step=2.5
                    label="kg"
                />
                <Stepper
                    value=reps
                    on_change=move |v: f64| set_reps.set(v.round())
                    max=100.0
                    label="reps"
                />
                <button
                    class="ml-auto h-10 px-3 bg-primary-600 rounded-lg text-sm font-medium disabled:opacity-50"
                    disabled=move || saving.get()
                    on:click=save
                >
                    "✓"
                </button>
            </div>
        </SwipeableRow>
    }
}

#[component]
fn ExercisePicker(
    #[prop(into)] open: Signal<bool>,
    #[prop(into)] exercises: Signal<Vec<Exercise>>,
    #[prop(into)] on_close: Callback<()>,
    #[prop(into)] on_pick: Handler<i64>,
) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (query, set_query) = create_signal(String::new());

    // No catalog match: add the typed name as a custom exercise
    let create = move |_| {
        let name = query.get_untracked().trim().to_string();
        if name.is_empty() {
            return;
        }
        let body = NewExercise {
            name,
            category: "Custom".to_string(),
            equipment: None,
        };
        spawn_local(async move {
            match api::create_exercise(&body).await {
                Ok(exercise) => {
                    set_query.set(String::new());
                    on_pick.call(exercise.id);
                }
                Err(e) => state.show_error(&e),
            }
        });
    };
    let matches = move || {
        let q = query.get();
        exercises.with(|all| {
            search_exercises(all, &q)
                .into_iter()
                .map(|e| (e.id, e.name.clone(), e.category.clone()))
                .collect::<Vec<_>>()
        })
    };

    view! {
        <BottomSheet open=open on_close=on_close title="Add exercise">
            <input
                type="search"
                placeholder="Search exercises"
                class="w-full bg-gray-700 rounded-lg px-3 py-2 mb-3"
                prop:value=move || query.get()
                on:input=move |ev| set_query.set(event_target_value(&ev))
            />
            <div class="space-y-1">
                {move || {
                    let list = matches();
                    if list.is_empty() {
                        view! {
                            <div class="text-center py-4">
                                <p class="text-gray-400 text-sm">"No matches"</p>
                                <Show when=move || !query.get().trim().is_empty()>
                                    <button class="mt-2 text-primary-400 text-sm" on:click=create>
                                        {move || format!("+ Create \"{}\"", query.get().trim())}
                                    </button>
                                </Show>
                            </div>
                        }
                        .into_view()
                    } else {
                        list.into_iter()
                            .map(|(id, name, category)| view! {
                                <button
                                    class="w-full flex justify-between px-3 py-2 rounded-lg hover:bg-gray-700"
                                    on:click=move |_| on_pick.call(id)
                                >
                                    <span>{name}</span>
                                    <span class="text-xs text-gray-400">{category}</span>
                                </button>
                            })
                            .collect_view()
                    }
                }}
            </div>
        </BottomSheet>
    }
}
