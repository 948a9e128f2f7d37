//! Dashboard Page
//!
//! Greeting, today's totals and the most recent lifting sessions.

use chrono::Utc;
use leptos::*;
use leptos_router::*;

use fitlog_core::models::{DailySummary, WorkoutSession};
use fitlog_core::nutrition::WATER_GOAL_ML;

use crate::api;
use crate::components::{Card, ListSkeleton, Skeleton};
use crate::state::{Generation, GlobalState};

const RECENT_SESSIONS: usize = 3;

#[component]
pub fn Dashboard() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let guard = Generation::for_page();

    let (today, set_today) = create_signal(None::<DailySummary>);
    let (sessions, set_sessions) = create_signal(None::<Vec<WorkoutSession>>);
    let (error, set_error) = create_signal(None::<String>);

    // Both requests go out at once; each lands independently
    let ticket = guard.ticket();
    {
        let guard = guard.clone();
        spawn_local(async move {
            let date = Utc::now().date_naive();
            let result = api::daily(Some(date), Some(date)).await;
            if !guard.is_current(ticket) {
                return;
            }
            match result {
                Ok(days) => set_today.set(Some(
                    days.into_iter()
                        .next()
                        .unwrap_or_else(|| DailySummary::empty(date)),
                )),
                Err(e) => set_error.set(Some(e)),
            }
        });
    }
    spawn_local(async move {
        let result = api::list_sessions().await;
        if !guard.is_current(ticket) {
            return;
        }
        match result {
            Ok(mut list) => {
                list.sort_by(|a, b| b.start_time.cmp(&a.start_time));
                list.truncate(RECENT_SESSIONS);
                set_sessions.set(Some(list));
            }
            Err(e) => set_error.set(Some(e)),
        }
    });

    let greeting = move || {
        let name = state.user().map(|u| u.name).unwrap_or_default();
        if name.is_empty() {
            "Hello".to_string()
        } else {
            format!("Hello, {}", name)
        }
    };

    view! {
        <div class="space-y-6">
            <div>
                <h1 class="text-3xl font-bold">{greeting}</h1>
                <p class="text-gray-400 mt-1">{Utc::now().format("%A, %B %-d").to_string()}</p>
            </div>

            {move || error.get().map(|e| view! {
                <div class="bg-red-900/40 border border-red-700 rounded-lg p-3 text-sm">{e}</div>
            })}

            <Card title="Today">
                {move || match today.get() {
                    None => view! {
                        <div class="grid grid-cols-2 gap-4">
                            <Skeleton class="h-12 w-full" />
                            <Skeleton class="h-12 w-full" />
                            <Skeleton class="h-12 w-full" />
                            <Skeleton class="h-12 w-full" />
                        </div>
                    }
                    .into_view(),
                    Some(day) => view! {
                        <div class="grid grid-cols-2 gap-4">
                            <Stat label="Calories" value=day.total_calories.to_string() unit="kcal" />
                            <Stat label="Protein" value=format!("{:.0}", day.total_protein) unit="g" />
                            <Stat
                                label="Water"
                                value=format!("{} / {}", day.water_ml, WATER_GOAL_ML)
                                unit="ml"
                            />
                            <Stat
                                label="Weight"
                                value=if day.weight_kg > 0.0 {
                                    format!("{:.1}", day.weight_kg)
                                } else {
                                    "-".to_string()
                                }
                                unit="kg"
                            />
                        </div>
                    }
                    .into_view(),
                }}
            </Card>

            <Card title="Recent workouts">
                {move || match sessions.get() {
                    None => view! { <ListSkeleton count=3 /> }.into_view(),
                    Some(list) if list.is_empty() => view! {
                        <div class="text-center py-6 text-gray-400">
                            <p>"No workouts yet"</p>
                            <A href="/log/workout" class="text-primary-400 text-sm">"Start one"</A>
                        </div>
                    }
                    .into_view(),
                    Some(list) => list
                        .into_iter()
                        .map(|s| view! { <SessionRow session=s /> })
                        .collect_view(),
                }}
            </Card>
        </div>
    }
}

#[component]
fn Stat(label: &'static str, value: String, unit: &'static str) -> impl IntoView {
    view! {
        <div class="bg-gray-700/50 rounded-lg p-3">
            <div class="text-xs text-gray-400 uppercase">{label}</div>
            <div class="text-xl font-semibold">
                {value}
                <span class="text-sm text-gray-400 ml-1">{unit}</span>
            </div>
        </div>
    }
}

#[component]
fn SessionRow(session: WorkoutSession) -> impl IntoView {
    let href = format!("/log/workout/{}", session.id);
    let title = session.notes.clone().unwrap_or_else(|| "Workout".to_string());
    let detail = match session.duration_minutes() {
        Some(m) => format!("{} sets · {} min", session.sets.len(), m),
        None => format!("{} sets · in progress", session.sets.len()),
    };

    view! {
        <A href=href class="flex items-center justify-between py-3 border-b border-gray-700 last:border-0">
            <div>
                <div class="font-medium">{title}</div>
                <div class="text-xs text-gray-400">{session.start_time.format("%b %-d, %H:%M").to_string()}</div>
            </div>
            <div class="text-sm text-gray-400">{detail}</div>
        </A>
    }
}
