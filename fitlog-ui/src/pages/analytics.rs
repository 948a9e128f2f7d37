//! Analytics Page
//!
//! Daily trends over a selectable window.

use chrono::{Duration, Utc};
use leptos::*;

use fitlog_core::models::DailySummary;
use fitlog_core::nutrition::WATER_GOAL_ML;

use crate::api;
use crate::components::chart::Bar;
use crate::components::{BarChart, Card, Skeleton};
use crate::state::Generation;

const RANGES: [i64; 3] = [7, 30, 90];

/// Bars for one field, oldest day first
fn series(days: &[DailySummary], value: impl Fn(&DailySummary) -> f64) -> Vec<Bar> {
    days.iter()
        .map(|d| Bar {
            label: d.date.format("%-d/%-m").to_string(),
            value: value(d),
        })
        .collect()
}

#[component]
pub fn Analytics() -> impl IntoView {
    let guard = Generation::for_page();

    let (range, set_range) = create_signal(7_i64);
    let (days, set_days) = create_signal(None::<Vec<DailySummary>>);
    let (error, set_error) = create_signal(None::<String>);

    create_effect(move |_| {
        let span = range.get();
        let ticket = guard.ticket();
        let g = guard.clone();
        set_days.set(None);
        spawn_local(async move {
            let end = Utc::now().date_naive();
            let start = end - Duration::days(span - 1);
            let result = api::daily(Some(start), Some(end)).await;
            if !g.is_current(ticket) {
                return;
            }
            match result {
                Ok(mut list) => {
                    // Server sends newest first
                    list.reverse();
                    set_error.set(None);
                    set_days.set(Some(list));
                }
                Err(e) => set_error.set(Some(e)),
            }
        });
    });

    let chart = move |value: fn(&DailySummary) -> f64| {
        Signal::derive(move || days.with(|d| d.as_deref().map(|d| series(d, value)).unwrap_or_default()))
    };

    let totals = move || {
        days.with(|d| {
            let d = d.as_deref().unwrap_or_default();
            let logged = d.iter().filter(|s| s.total_calories > 0).count().max(1) as i64;
            (
                d.iter().map(|s| s.total_calories).sum::<i64>() / logged,
                d.iter().map(|s| s.run_distance).sum::<f64>(),
                d.iter().map(|s| s.workout_volume_kg).sum::<f64>(),
            )
        })
    };

    view! {
        <div class="space-y-6">
            <div class="flex items-center justify-between">
                <h1 class="text-3xl font-bold">"Stats"</h1>
                <div class="flex bg-gray-800 rounded-lg p-1">
                    {RANGES
                        .iter()
                        .map(|&n| view! {
                            <button
                                class=move || if range.get() == n {
                                    "px-3 py-1 rounded-md bg-primary-600 text-sm"
                                } else {
                                    "px-3 py-1 rounded-md text-gray-400 text-sm"
                                }
                                on:click=move |_| set_range.set(n)
                            >
                                {format!("{}d", n)}
                            </button>
                        })
                        .collect_view()}
                </div>
            </div>

            {move || error.get().map(|e| view! {
                <div class="bg-red-900/40 border border-red-700 rounded-lg p-3 text-sm">{e}</div>
            })}

            <Show
                when=move || days.with(Option::is_some)
                fallback=|| view! {
                    <div class="space-y-4">
                        <Skeleton class="h-48 w-full" />
                        <Skeleton class="h-48 w-full" />
                    </div>
                }
            >
                <div class="grid grid-cols-3 gap-3 text-center">
                    <div class="bg-gray-800 rounded-lg p-3">
                        <div class="text-xl font-bold">{move || totals().0}</div>
                        <div class="text-xs text-gray-400">"avg kcal"</div>
                    </div>
                    <div class="bg-gray-800 rounded-lg p-3">
                        <div class="text-xl font-bold">{move || format!("{:.1}", totals().1)}</div>
                        <div class="text-xs text-gray-400">"km run"</div>
                    </div>
                    <div class="bg-gray-800 rounded-lg p-3">
                        <div class="text-xl font-bold">{move || format!("{:.0}", totals().2)}</div>
                        <div class="text-xs text-gray-400">"kg lifted"</div>
                    </div>
                </div>

                <Card title="Calories">
                    <BarChart bars=chart(|d| d.total_calories as f64) />
                </Card>
                <Card title="Running (km)">
                    <BarChart bars=chart(|d| d.run_distance) color="#3b82f6" />
                </Card>
                <Card title="Training volume (kg)">
                    <BarChart bars=chart(|d| d.workout_volume_kg) color="#a855f7" />
                </Card>
                <Card title="Water (ml)">
                    <BarChart bars=chart(|d| d.water_ml as f64) color="#06b6d4" goal=WATER_GOAL_ML as f64 />
                </Card>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_series_keeps_order_and_labels() {
        let mut first = DailySummary::empty(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        first.water_ml = 500;
        let mut second = DailySummary::empty(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        second.water_ml = 1500;

        let bars = series(&[first, second], |d| d.water_ml as f64);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].label, "1/3");
        assert_eq!(bars[1].value, 1500.0);
    }
}
