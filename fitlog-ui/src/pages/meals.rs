//! Meal Logger Page
//!
//! Calorie budget for today, meals with their entries, water and the food
//! library.

use chrono::Utc;
use leptos::*;

use fitlog_core::models::{
    DailySummary, FoodLibraryItem, Meal, NewFoodEntry, NewLibraryItem, NewMeal,
};
use fitlog_core::nutrition::{
    meals_on_day, portion_entry, progress_percent, remaining_calories, EnergyTarget, MacroTotals,
    FALLBACK_TARGET_KCAL, WATER_GOAL_ML,
};

use crate::api;
use crate::components::{BottomSheet, Card, ListSkeleton, ProgressRing};
use crate::state::{Generation, GlobalState, Handler};

const WATER_STEPS_ML: [i64; 3] = [250, 500, 750];

#[component]
pub fn MealLogger() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let guard = Generation::for_page();

    let (meals, set_meals) = create_signal(None::<Vec<Meal>>);
    let (library, set_library) = create_signal(Vec::<FoodLibraryItem>::new());
    let (summary, set_summary) = create_signal(None::<DailySummary>);
    let (adding_to, set_adding_to) = create_signal(None::<i64>);
    let (new_meal, set_new_meal) = create_signal(String::new());

    let reload = Handler::new(move |_: ()| {
        let ticket = guard.ticket();
        let g = guard.clone();
        spawn_local(async move {
            let result = api::list_meals().await;
            if !g.is_current(ticket) {
                return;
            }
            match result {
                Ok(list) => set_meals.set(Some(list)),
                Err(e) => {
                    set_meals.set(Some(Vec::new()));
                    state.show_error(&e);
                }
            }
        });
        let g = guard.clone();
        spawn_local(async move {
            let result = api::list_library().await;
            if g.is_current(ticket) {
                set_library.set(result.unwrap_or_default());
            }
        });
        let g = guard.clone();
        spawn_local(async move {
            let today = Utc::now().date_naive();
            let result = api::daily(Some(today), Some(today)).await;
            if g.is_current(ticket) {
                let day = result
                    .ok()
                    .and_then(|days| days.into_iter().next())
                    .unwrap_or_else(|| DailySummary::empty(today));
                set_summary.set(Some(day));
            }
        });
    });
    reload.call(());

    // Only meals eaten today count toward the ring
    let eaten = move || {
        meals.with(|m| MacroTotals::of_day(m.as_deref().unwrap_or_default(), Utc::now().date_naive()))
    };
    let target = move || {
        let weight = summary.with(|s| s.as_ref().map(|s| s.weight_kg));
        state
            .user()
            .and_then(|u| EnergyTarget::for_user(&u, weight, Utc::now().date_naive()))
            .map(|t| t.target)
            .unwrap_or(FALLBACK_TARGET_KCAL)
    };
    let burned = move || summary.with(|s| s.as_ref().map(|s| s.exercise_calories).unwrap_or(0));
    let water = move || summary.with(|s| s.as_ref().map(|s| s.water_ml).unwrap_or(0));

    let add_meal = move |_| {
        let name = new_meal.get_untracked().trim().to_string();
        let body = NewMeal {
            name: (!name.is_empty()).then_some(name),
            eaten_at: None,
        };
        spawn_local(async move {
            match api::create_meal(&body).await {
                Ok(_) => {
                    set_new_meal.set(String::new());
                    reload.call(());
                }
                Err(e) => state.show_error(&e),
            }
        });
    };

    let drink = move |amount: i64| {
        spawn_local(async move {
            match api::log_water(amount).await {
                Ok(()) => {
                    state.show_success(&format!("+{} ml water", amount));
                    reload.call(());
                }
                Err(e) => state.show_error(&e),
            }
        });
    };

    view! {
        <div class="space-y-6">
            <h1 class="text-3xl font-bold">"Food"</h1>

            <Card>
                <div class="flex items-center gap-6">
                    <ProgressRing percent=Signal::derive(move || {
                        progress_percent(eaten().calories as f64, target() as f64)
                    })>
                        <div class="text-center">
                            <div class="text-2xl font-bold">
                                {move || remaining_calories(target(), eaten().calories, burned())}
                            </div>
                            <div class="text-xs text-gray-400">"remaining"</div>
                        </div>
                    </ProgressRing>
                    <div class="space-y-1 text-sm">
                        <div>{move || format!("Target {} kcal", target())}</div>
                        <div>{move || format!("Eaten {} kcal", eaten().calories)}</div>
                        <div>{move || format!("Exercise +{} kcal", burned())}</div>
                        <div class="text-gray-400">
                            {move || {
                                let t = eaten();
                                format!("P {:.0}g · C {:.0}g · F {:.0}g", t.protein_g, t.carbs_g, t.fat_g)
                            }}
                        </div>
                    </div>
                </div>
            </Card>

            <Card title="Water">
                <div class="flex justify-between text-sm mb-2">
                    <span>{move || format!("{} ml", water())}</span>
                    <span class="text-gray-400">{format!("Goal {} ml", WATER_GOAL_ML)}</span>
                </div>
                <div class="h-3 bg-gray-700 rounded-full overflow-hidden mb-3">
                    <div
                        class="h-full bg-blue-500 transition-all"
                        style:width=move || {
                            format!("{}%", progress_percent(water() as f64, WATER_GOAL_ML as f64).min(100.0))
                        }
                    />
                </div>
                <div class="grid grid-cols-3 gap-2">
                    {WATER_STEPS_ML
                        .iter()
                        .map(|ml| {
                            let ml = *ml;
                            view! {
                                <button class="py-2 bg-gray-700 rounded-lg text-sm" on:click=move |_| drink(ml)>
                                    {format!("+{} ml", ml)}
                                </button>
                            }
                        })
                        .collect_view()}
                </div>
            </Card>

            <div class="flex gap-2">
                <input
                    type="text"
                    placeholder="Meal name (e.g. Lunch)"
                    class="flex-1 bg-gray-800 border border-gray-700 rounded-lg px-3 py-2"
                    prop:value=move || new_meal.get()
                    on:input=move |ev| set_new_meal.set(event_target_value(&ev))
                />
                <button class="px-4 bg-primary-600 rounded-lg font-medium" on:click=add_meal>
                    "Add meal"
                </button>
            </div>

            {move || match meals.get() {
                None => view! { <ListSkeleton count=3 /> }.into_view(),
                Some(all) => {
                    let today: Vec<Meal> = meals_on_day(&all, Utc::now()).into_iter().cloned().collect();
                    if today.is_empty() {
                        view! { <p class="text-gray-400 text-center py-6">"Nothing logged today"</p> }
                            .into_view()
                    } else {
                        today
                            .into_iter()
                            .map(|meal| view! {
                                <MealCard
                                    meal=meal
                                    on_add=move |id| set_adding_to.set(Some(id))
                                    on_changed=reload
                                />
                            })
                            .collect_view()
                    }
                }
            }}

            <EntrySheet
                meal_id=adding_to
                library=library
                on_close=move |_| set_adding_to.set(None)
                on_saved=move |_| {
                    set_adding_to.set(None);
                    reload.call(());
                }
                on_library_changed=reload
            />
        </div>
    }
}

#[component]
fn MealCard(
    meal: Meal,
    #[prop(into)] on_add: Callback<i64>,
    on_changed: Handler<()>,
) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let meal_id = meal.id;
    let totals = MacroTotals::of_meal(&meal);
    let (name, set_name) = create_signal(meal.name.clone().unwrap_or_else(|| "Meal".to_string()));
    let (editing, set_editing) = create_signal(false);

    let rename = move || {
        set_editing.set(false);
        let new_name = name.get_untracked().trim().to_string();
        if new_name.is_empty() {
            return;
        }
        spawn_local(async move {
            if let Err(e) = api::update_meal(meal_id, &new_name).await {
                state.show_error(&e);
            }
            on_changed.call(());
        });
    };

    let delete_meal = move |_| {
        spawn_local(async move {
            match api::delete_meal(meal_id).await {
                Ok(()) => on_changed.call(()),
                Err(e) => state.show_error(&e),
            }
        });
    };

    let entries = meal
        .entries
        .into_iter()
        .map(|entry| {
            let entry_id = entry.id;
            let remove = move |_| {
                spawn_local(async move {
                    match api::delete_entry(entry_id).await {
                        Ok(()) => on_changed.call(()),
                        Err(e) => state.show_error(&e),
                    }
                });
            };
            view! {
                <div class="flex items-center justify-between py-2 border-b border-gray-700 last:border-0">
                    <div>
                        <div>{entry.name}</div>
                        <div class="text-xs text-gray-400">
                            {format!(
                                "{} kcal · P {:.1} · C {:.1} · F {:.1}",
                                entry.calories, entry.protein_g, entry.carbs_g, entry.fat_g,
                            )}
                            {entry.quantity.map(|q| format!(" · {}", q))}
                        </div>
                    </div>
                    <button class="text-red-400 text-sm px-2" on:click=remove>"✕"</button>
                </div>
            }
        })
        .collect_view();

    view! {
        <Card>
            <div class="flex items-center justify-between mb-2">
                {move || if editing.get() {
                    view! {
                        <input
                            type="text"
                            class="bg-gray-700 rounded px-2 py-1"
                            prop:value=move || name.get()
                            on:input=move |ev| set_name.set(event_target_value(&ev))
                            on:blur=move |_| rename()
                            on:keydown=move |ev| if ev.key() == "Enter" { rename() }
                        />
                    }
                    .into_view()
                } else {
                    view! {
                        <h2 class="text-lg font-semibold cursor-pointer" on:click=move |_| set_editing.set(true)>
                            {move || name.get()}
                        </h2>
                    }
                    .into_view()
                }}
                <div class="flex items-center gap-3">
                    <span class="text-sm text-gray-400">{format!("{} kcal", totals.calories)}</span>
                    <button class="text-red-400 text-sm" on:click=delete_meal>"Delete"</button>
                </div>
            </div>
            {entries}
            <button class="mt-2 text-primary-400 text-sm" on:click=move |_| on_add.call(meal_id)>
                "+ Add food"
            </button>
        </Card>
    }
}

/// Add an entry to a meal: typed in, or a portion of a library item
#[component]
fn EntrySheet(
    #[prop(into)] meal_id: Signal<Option<i64>>,
    #[prop(into)] library: Signal<Vec<FoodLibraryItem>>,
    #[prop(into)] on_close: Callback<()>,
    #[prop(into)] on_saved: Handler<()>,
    on_library_changed: Handler<()>,
) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (from_library, set_from_library) = create_signal(false);

    let save = Callback::new(move |entry: NewFoodEntry| {
        let Some(id) = meal_id.get_untracked() else { return };
        spawn_local(async move {
            match api::add_entry(id, &entry).await {
                Ok(_) => on_saved.call(()),
                Err(e) => state.show_error(&e),
            }
        });
    });

    let open = Signal::derive(move || meal_id.get().is_some());
    let tab = move |active: bool| {
        if active {
            "flex-1 py-2 rounded-lg bg-primary-600 text-sm"
        } else {
            "flex-1 py-2 rounded-lg bg-gray-700 text-sm"
        }
    };

    view! {
        <BottomSheet open=open on_close=on_close title="Add food">
            <div class="flex gap-2 mb-4">
                <button class=move || tab(!from_library.get()) on:click=move |_| set_from_library.set(false)>
                    "Manual"
                </button>
                <button class=move || tab(from_library.get()) on:click=move |_| set_from_library.set(true)>
                    "Library"
                </button>
            </div>
            <Show
                when=move || from_library.get()
                fallback=move || view! { <ManualEntry on_save=save /> }
            >
                <LibraryPortion library=library on_save=save on_library_changed=on_library_changed />
            </Show>
        </BottomSheet>
    }
}

fn parse_or_zero(text: &str) -> f64 {
    text.trim().parse().unwrap_or(0.0)
}

#[component]
fn ManualEntry(on_save: Callback<NewFoodEntry>) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (name, set_name) = create_signal(String::new());
    let (calories, set_calories) = create_signal(String::new());
    let (protein, set_protein) = create_signal(String::new());
    let (carbs, set_carbs) = create_signal(String::new());
    let (fat, set_fat) = create_signal(String::new());
    let (quantity, set_quantity) = create_signal(String::new());

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let food = name.get_untracked().trim().to_string();
        if food.is_empty() {
            state.show_error("Food name is required");
            return;
        }
        let qty = quantity.get_untracked().trim().to_string();
        on_save.call(NewFoodEntry {
            name: food,
            calories: parse_or_zero(&calories.get_untracked()).round() as i64,
            protein_g: parse_or_zero(&protein.get_untracked()),
            carbs_g: parse_or_zero(&carbs.get_untracked()),
            fat_g: parse_or_zero(&fat.get_untracked()),
            quantity: (!qty.is_empty()).then_some(qty),
        });
    };

    let field = move |placeholder: &'static str, value: ReadSignal<String>, set: WriteSignal<String>| {
        view! {
            <input
                type="text"
                inputmode="decimal"
                placeholder=placeholder
                class="bg-gray-700 rounded-lg px-3 py-2 min-w-0"
                prop:value=move || value.get()
                on:input=move |ev| set.set(event_target_value(&ev))
            />
        }
    };

    view! {
        <form class="space-y-3" on:submit=submit>
            <input
                type="text"
                placeholder="Food"
                class="w-full bg-gray-700 rounded-lg px-3 py-2"
                prop:value=move || name.get()
                on:input=move |ev| set_name.set(event_target_value(&ev))
            />
            <div class="grid grid-cols-2 gap-2">
                {field("Calories", calories, set_calories)}
                {field("Quantity", quantity, set_quantity)}
                {field("Protein g", protein, set_protein)}
                {field("Carbs g", carbs, set_carbs)}
                {field("Fat g", fat, set_fat)}
            </div>
            <button type="submit" class="w-full py-3 bg-primary-600 rounded-lg font-semibold">"Add"</button>
        </form>
    }
}

#[component]
fn LibraryPortion(
    #[prop(into)] library: Signal<Vec<FoodLibraryItem>>,
    on_save: Callback<NewFoodEntry>,
    on_library_changed: Handler<()>,
) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (selected, set_selected) = create_signal(None::<i64>);
    let (grams, set_grams) = create_signal("100".to_string());
    let (creating, set_creating) = create_signal(false);

    let preview = move || {
        let id = selected.get()?;
        let g = grams.get().trim().parse::<f64>().ok().filter(|g| *g > 0.0)?;
        library.with(|items| items.iter().find(|i| i.id == id).map(|item| portion_entry(item, g)))
    };

    view! {
        <div class="space-y-3">
            <select
                class="w-full bg-gray-700 rounded-lg px-3 py-2"
                on:change=move |ev| set_selected.set(event_target_value(&ev).parse().ok())
            >
                <option value="">"Choose a food"</option>
                {move || library
                    .get()
                    .into_iter()
                    .map(|item| view! { <option value=item.id.to_string()>{item.name}</option> })
                    .collect_view()}
            </select>
            <input
                type="number"
                placeholder="Grams"
                class="w-full bg-gray-700 rounded-lg px-3 py-2"
                prop:value=move || grams.get()
                on:input=move |ev| set_grams.set(event_target_value(&ev))
            />
            {move || preview().map(|entry| view! {
                <p class="text-sm text-gray-400">
                    {format!(
                        "{} · {} kcal · P {:.1} · C {:.1} · F {:.1}",
                        entry.name, entry.calories, entry.protein_g, entry.carbs_g, entry.fat_g,
                    )}
                </p>
            })}
            <button
                class="w-full py-3 bg-primary-600 rounded-lg font-semibold disabled:opacity-50"
                disabled=move || preview().is_none()
                on:click=move |_| match preview() {
                    Some(entry) => on_save.call(entry),
                    None => state.show_error("Pick a food and a portion"),
                }
            >
                "Add portion"
            </button>
            <button class="text-primary-400 text-sm" on:click=move |_| set_creating.update(|c| *c = !*c)>
                {move || if creating.get() { "Cancel" } else { "+ New library item" }}
            </button>
            <Show when=move || creating.get()>
                <NewLibraryForm on_saved=move |_| {
                    set_creating.set(false);
                    on_library_changed.call(());
                } />
            </Show>
        </div>
    }
}

#[component]
fn NewLibraryForm(#[prop(into)] on_saved: Handler<()>) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (name, set_name) = create_signal(String::new());
    let (calories, set_calories) = create_signal(String::new());
    let (protein, set_protein) = create_signal(String::new());
    let (carbs, set_carbs) = create_signal(String::new());
    let (fat, set_fat) = create_signal(String::new());

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let item = NewLibraryItem {
            name: name.get_untracked().trim().to_string(),
            calories_per_100g: parse_or_zero(&calories.get_untracked()),
            protein_per_100g: parse_or_zero(&protein.get_untracked()),
            carbs_per_100g: parse_or_zero(&carbs.get_untracked()),
            fat_per_100g: parse_or_zero(&fat.get_untracked()),
        };
        if item.name.is_empty() {
            state.show_error("Name is required");
            return;
        }
        spawn_local(async move {
            match api::create_library_item(&item).await {
                Ok(_) => {
                    state.show_success("Saved to library");
                    on_saved.call(());
                }
                Err(e) => state.show_error(&e),
            }
        });
    };

    let inputs = [
        ("Name", name, set_name),
        ("kcal / 100g", calories, set_calories),
        ("Protein / 100g", protein, set_protein),
        ("Carbs / 100g", carbs, set_carbs),
        ("Fat / 100g", fat, set_fat),
    ];

    view! {
        <form class="grid grid-cols-2 gap-2 bg-gray-900/50 rounded-lg p-3" on:submit=submit>
            {inputs
                .into_iter()
                .map(|(placeholder, value, set)| view! {
                    <input
                        type="text"
                        placeholder=placeholder
                        class="bg-gray-700 rounded-lg px-3 py-2 min-w-0"
                        prop:value=move || value.get()
                        on:input=move |ev| set.set(event_target_value(&ev))
                    />
                })
                .collect_view()}
            <button type="submit" class="py-2 bg-primary-600 rounded-lg font-medium">"Save"</button>
        </form>
    }
}
