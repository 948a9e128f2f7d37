//! Profile Page
//!
//! Personal details driving the calorie target, plus client settings.

use chrono::Utc;
use leptos::*;
use leptos_router::*;

use fitlog_core::models::{NewBodyMetric, User, UserPayload};
use fitlog_core::nutrition::{ActivityLevel, EnergyTarget, WeightGoal};

use crate::api;
use crate::components::Card;
use crate::state::{Generation, GlobalState};

/// `None` for blank or unparsable input
fn parse_positive(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| *v > 0.0)
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[component]
pub fn Profile() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let navigate = use_navigate();
    let guard = Generation::for_page();
    let user = state.user().unwrap_or_default();

    let (name, set_name) = create_signal(user.name.clone());
    let (height, set_height) = create_signal(user.height_cm.map(|h| h.to_string()).unwrap_or_default());
    let (dob, set_dob) = create_signal(user.dob.clone().unwrap_or_default());
    let (sex, set_sex) = create_signal(user.sex.clone().unwrap_or_default());
    let (activity, set_activity) = create_signal(
        user.activity_level
            .clone()
            .unwrap_or_else(|| ActivityLevel::default().label().to_string()),
    );
    let (goal, set_goal) = create_signal(
        user.weight_goal
            .clone()
            .unwrap_or_else(|| WeightGoal::default().label().to_string()),
    );
    let (weight, set_weight) = create_signal(String::new());
    let saved_weight = store_value(None::<f64>);
    let (saving, set_saving) = create_signal(false);
    let (api_url, set_api_url) = create_signal(api::get_api_base());

    // Latest recorded weight seeds the weight field
    let ticket = guard.ticket();
    spawn_local(async move {
        let result = api::list_body_metrics().await;
        if !guard.is_current(ticket) {
            return;
        }
        if let Ok(metrics) = result {
            let latest = metrics
                .iter()
                .filter(|m| m.weight_kg.is_some())
                .max_by_key(|m| m.recorded_at)
                .and_then(|m| m.weight_kg);
            saved_weight.set_value(latest);
            if let Some(w) = latest {
                set_weight.set(w.to_string());
            }
        }
    });

    let draft = move || User {
        id: 0,
        name: name.get(),
        height_cm: parse_positive(&height.get()),
        dob: non_empty(dob.get()),
        sex: non_empty(sex.get()),
        activity_level: Some(activity.get()),
        weight_goal: Some(goal.get()),
    };
    let energy = move || {
        EnergyTarget::for_user(&draft(), parse_positive(&weight.get()), Utc::now().date_naive())
            .unwrap_or(EnergyTarget {
                bmr: 0.0,
                maintenance: 0,
                target: 0,
            })
    };

    let save = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let profile = draft();
        let payload = UserPayload {
            name: Some(profile.name),
            height_cm: profile.height_cm,
            dob: profile.dob,
            sex: profile.sex,
            activity_level: profile.activity_level,
            weight_goal: profile.weight_goal,
        };
        let new_weight = parse_positive(&weight.get_untracked());
        set_saving.set(true);
        spawn_local(async move {
            match api::update_user(&payload).await {
                Ok(user) => {
                    state.set_user(user);
                    // Only a changed weight becomes a new body metric
                    if let Some(w) = new_weight.filter(|w| Some(*w) != saved_weight.try_get_value().flatten()) {
                        let metric = NewBodyMetric {
                            weight_kg: Some(w),
                            ..Default::default()
                        };
                        match api::create_body_metric(&metric).await {
                            Ok(_) => {
                                let _ = saved_weight.try_set_value(Some(w));
                            }
                            Err(e) => state.show_error(&e),
                        }
                    }
                    state.show_success("Profile saved");
                }
                Err(e) => state.show_error(&e),
            }
            let _ = set_saving.try_set(false);
        });
    };

    let save_api_url = move |_| {
        let url = api_url.get_untracked().trim().to_string();
        let url = if url.is_empty() { api::DEFAULT_API_BASE.to_string() } else { url };
        api::set_api_base(&url);
        set_api_url.set(url);
        state.show_info("API URL updated");
    };

    let sign_out = move |_| {
        let navigate = navigate.clone();
        spawn_local(async move {
            if let Err(e) = api::logout().await {
                web_sys::console::warn_1(&format!("Logout failed: {}", e).into());
            }
            state.sign_out();
            navigate("/login", Default::default());
        });
    };

    view! {
        <div class="space-y-6">
            <h1 class="text-3xl font-bold">"Profile"</h1>

            <Card title="Energy">
                <div class="grid grid-cols-3 gap-3 text-center">
                    <div>
                        <div class="text-xl font-bold">{move || format!("{:.0}", energy().bmr)}</div>
                        <div class="text-xs text-gray-400">"BMR"</div>
                    </div>
                    <div>
                        <div class="text-xl font-bold">{move || energy().maintenance}</div>
                        <div class="text-xs text-gray-400">"Maintenance"</div>
                    </div>
                    <div>
                        <div class="text-xl font-bold text-primary-400">{move || energy().target}</div>
                        <div class="text-xs text-gray-400">"Target"</div>
                    </div>
                </div>
            </Card>

            <Card title="Details">
                <form class="space-y-3" on:submit=save>
                    <label class="block">
                        <span class="text-sm text-gray-400">"Name"</span>
                        <input
                            type="text"
                            class="w-full bg-gray-700 rounded-lg px-3 py-2 mt-1"
                            prop:value=move || name.get()
                            on:input=move |ev| set_name.set(event_target_value(&ev))
                        />
                    </label>
                    <div class="grid grid-cols-2 gap-3">
                        <label class="block">
                            <span class="text-sm text-gray-400">"Height (cm)"</span>
                            <input
                                type="number"
                                class="w-full bg-gray-700 rounded-lg px-3 py-2 mt-1"
                                prop:value=move || height.get()
                                on:input=move |ev| set_height.set(event_target_value(&ev))
                            />
                        </label>
                        <label class="block">
                            <span class="text-sm text-gray-400">"Weight (kg)"</span>
                            <input
                                type="number"
                                step="0.1"
                                class="w-full bg-gray-700 rounded-lg px-3 py-2 mt-1"
                                prop:value=move || weight.get()
                                on:input=move |ev| set_weight.set(event_target_value(&ev))
                            />
                        </label>
                        <label class="block">
                            <span class="text-sm text-gray-400">"Date of birth"</span>
                            <input
                                type="date"
                                class="w-full bg-gray-700 rounded-lg px-3 py-2 mt-1"
                                prop:value=move || dob.get()
                                on:input=move |ev| set_dob.set(event_target_value(&ev))
                            />
                        </label>
                        <label class="block">
                            <span class="text-sm text-gray-400">"Sex"</span>
                            <select
                                class="w-full bg-gray-700 rounded-lg px-3 py-2 mt-1"
                                on:change=move |ev| set_sex.set(event_target_value(&ev))
                            >
                                <option value="" selected=move || sex.get().is_empty()>"-"</option>
                                <option value="M" selected=move || sex.get() == "M">"Male"</option>
                                <option value="F" selected=move || sex.get() == "F">"Female"</option>
                            </select>
                        </label>
                    </div>
                    <label class="block">
                        <span class="text-sm text-gray-400">"Activity"</span>
                        <select
                            class="w-full bg-gray-700 rounded-lg px-3 py-2 mt-1"
                            on:change=move |ev| set_activity.set(event_target_value(&ev))
                        >
                            {ActivityLevel::all()
                                .iter()
                                .map(|level| {
                                    let label = level.label();
                                    view! {
                                        <option value=label selected=move || activity.get() == label>
                                            {format!("{} ({})", label, level.description())}
                                        </option>
                                    }
                                })
                                .collect_view()}
                        </select>
                    </label>
                    <label class="block">
                        <span class="text-sm text-gray-400">"Goal"</span>
                        <select
                            class="w-full bg-gray-700 rounded-lg px-3 py-2 mt-1"
                            on:change=move |ev| set_goal.set(event_target_value(&ev))
                        >
                            {WeightGoal::all()
                                .iter()
                                .map(|g| {
                                    let label = g.label();
                                    view! {
                                        <option value=label selected=move || goal.get() == label>{label}</option>
                                    }
                                })
                                .collect_view()}
                        </select>
                    </label>
                    <button
                        type="submit"
                        class="w-full py-3 bg-primary-600 rounded-lg font-semibold disabled:opacity-50"
                        disabled=move || saving.get()
                    >
                        {move || if saving.get() { "Saving..." } else { "Save" }}
                    </button>
                </form>
            </Card>

            <Card title="Settings">
                <label class="block">
                    <span class="text-sm text-gray-400">"API URL"</span>
                    <div class="flex gap-2 mt-1">
                        <input
                            type="text"
                            class="flex-1 bg-gray-700 rounded-lg px-3 py-2"
                            prop:value=move || api_url.get()
                            on:input=move |ev| set_api_url.set(event_target_value(&ev))
                        />
                        <button class="px-4 bg-gray-600 rounded-lg" on:click=save_api_url>"Save"</button>
                    </div>
                </label>
                <button class="w-full mt-4 py-3 bg-red-600/80 hover:bg-red-600 rounded-lg font-medium" on:click=sign_out>
                    "Sign out"
                </button>
            </Card>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive(" 72.5 "), Some(72.5));
        assert_eq!(parse_positive(""), None);
        assert_eq!(parse_positive("0"), None);
        assert_eq!(parse_positive("abc"), None);
    }

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty("  ".to_string()), None);
        assert_eq!(non_empty(" 1990-01-01 ".to_string()), Some("1990-01-01".to_string()));
    }
}
