//! Run Detail Page

use leptos::*;
use leptos_router::*;

use fitlog_core::format::{format_pace, hms, km};
use fitlog_core::models::Run;
use fitlog_core::splits::{compute_splits, elevation_profile};
use fitlog_core::tracking::{parse_route, RoutePoint};

use crate::api;
use crate::components::chart::Bar;
use crate::components::{BarChart, Card, Loading, RouteMap};
use crate::state::Generation;

#[component]
pub fn RunDetail() -> impl IntoView {
    let params = use_params_map();
    let guard = Generation::for_page();

    let (run, set_run) = create_signal(None::<Run>);
    let (error, set_error) = create_signal(None::<String>);

    create_effect(move |_| {
        let id = params.with(|p| p.get("id").and_then(|id| id.parse::<i64>().ok()));
        let Some(id) = id else {
            set_error.set(Some("Invalid run id".to_string()));
            return;
        };
        let ticket = guard.ticket();
        let g = guard.clone();
        spawn_local(async move {
            let result = api::get_run(id).await;
            if !g.is_current(ticket) {
                return;
            }
            match result {
                Ok(r) => set_run.set(Some(r)),
                Err(e) => set_error.set(Some(e)),
            }
        });
    });

    // A stored route that fails to parse renders as no route
    let route = Signal::derive(move || {
        run.with(|r| {
            r.as_ref()
                .and_then(|r| r.route_data.as_deref())
                .and_then(|data| parse_route(data).ok())
                .unwrap_or_default()
        })
    });

    view! {
        <div class="space-y-4">
            <A href="/log/run" class="text-sm text-gray-400">"← Runs"</A>
            {move || match (run.get(), error.get()) {
                (_, Some(e)) => view! {
                    <div class="bg-red-900/40 border border-red-700 rounded-lg p-3 text-sm">{e}</div>
                }
                .into_view(),
                (None, None) => view! { <Loading /> }.into_view(),
                (Some(r), None) => view! { <RunSummary run=r route=route /> }.into_view(),
            }}
        </div>
    }
}

const ELEVATION_SAMPLE_EVERY: usize = 10;

#[component]
fn RunSummary(run: Run, route: Signal<Vec<RoutePoint>>) -> impl IntoView {
    let title = run.run_type.clone().unwrap_or_else(|| "Run".to_string());
    let splits = route.with_untracked(|points| compute_splits(points));
    let elevation: Vec<Bar> = route
        .with_untracked(|points| elevation_profile(points, ELEVATION_SAMPLE_EVERY))
        .into_iter()
        .map(|value| Bar {
            label: String::new(),
            value,
        })
        .collect();

    let mut stats = vec![
        ("Distance", format!("{} km", km(run.distance_meters))),
        ("Time", hms(run.duration_seconds)),
        ("Pace", format!("{} /km", format_pace(run.duration_seconds, run.distance_meters))),
        ("Elevation", format!("{:.0} m", run.elevation_gain_meters)),
    ];
    if let Some(steps) = run.steps {
        stats.push(("Steps", steps.to_string()));
    }
    if let Some(hr) = run.avg_heart_rate {
        stats.push(("Avg HR", format!("{} bpm", hr)));
    }
    if let Some(shoe) = run.shoe_name.clone() {
        stats.push(("Shoe", shoe));
    }

    view! {
        <div>
            <h1 class="text-2xl font-bold">{title}</h1>
            <p class="text-gray-400 text-sm">{run.start_time.format("%A %B %-d, %H:%M").to_string()}</p>
        </div>

        <Card>
            <RouteMap route=route />
        </Card>

        <div class="grid grid-cols-2 gap-3">
            {stats
                .into_iter()
                .map(|(label, value)| view! {
                    <div class="bg-gray-800 rounded-lg p-3 border border-gray-700">
                        <div class="text-xs text-gray-400 uppercase">{label}</div>
                        <div class="text-lg font-semibold">{value}</div>
                    </div>
                })
                .collect_view()}
        </div>

        {run.notes.clone().map(|n| view! { <Card title="Notes"><p class="text-gray-300">{n}</p></Card> })}

        {(!elevation.is_empty()).then(|| view! {
            <Card title="Elevation">
                <BarChart bars=Signal::derive(move || elevation.clone()) color="#22c55e" />
            </Card>
        })}

        <Card title="Splits">
            {if splits.is_empty() {
                view! { <p class="text-gray-400 text-sm">"No GPS splits for this run"</p> }.into_view()
            } else {
                view! {
                    <table class="w-full text-sm">
                        <thead class="text-gray-400">
                            <tr>
                                <th class="text-left py-1">"Km"</th>
                                <th class="text-right py-1">"Distance"</th>
                                <th class="text-right py-1">"Time"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {splits
                                .into_iter()
                                .map(|s| view! {
                                    <tr class="border-t border-gray-700">
                                        <td class="py-1">{s.index}</td>
                                        <td class="text-right py-1">{format!("{:.0} m", s.distance)}</td>
                                        <td class="text-right py-1 font-mono">{hms(s.whole_seconds())}</td>
                                    </tr>
                                })
                                .collect_view()}
                        </tbody>
                    </table>
                }
                .into_view()
            }}
        </Card>
    }
}
