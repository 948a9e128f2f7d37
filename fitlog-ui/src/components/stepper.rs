//! Numeric stepper
//!
//! Minus/plus buttons around an editable value. Every change is clamped to
//! `[min, max]` and rounded to two decimals.

use leptos::*;

/// Clamp into `[min, max]` and round to two decimals
pub fn clamp_step(value: f64, min: f64, max: f64) -> f64 {
    let clamped = if value.is_nan() { min } else { value.clamp(min, max) };
    (clamped * 100.0).round() / 100.0
}

#[component]
pub fn Stepper(
    #[prop(into)]
    value: Signal<f64>,
    #[prop(into)]
    on_change: Callback<f64>,
    #[prop(default = 0.0)]
    min: f64,
    #[prop(default = 999.0)]
    max: f64,
    #[prop(default = 1.0)]
    step: f64,
    #[prop(optional, into)]
    label: Option<String>,
) -> impl IntoView {
    let set = move |v: f64| on_change.call(clamp_step(v, min, max));

    view! {
        <div class="flex flex-col items-center">
            {label.map(|l| view! { <span class="text-xs text-gray-400 mb-1 uppercase">{l}</span> })}
            <div class="flex items-center bg-gray-700 rounded-lg">
                <button
                    type="button"
                    class="w-10 h-10 text-xl text-gray-300 hover:text-white disabled:opacity-40"
                    disabled=move || value.get() <= min
                    on:click=move |_| set(value.get_untracked() - step)
                >
                    "−"
                </button>
                <input
                    type="number"
                    inputmode="decimal"
                    class="w-16 bg-transparent text-center font-semibold focus:outline-none"
                    prop:value=move || value.get().to_string()
                    on:change=move |ev| {
                        if let Ok(v) = event_target_value(&ev).parse::<f64>() {
                            set(v);
                        }
                    }
                />
                <button
                    type="button"
                    class="w-10 h-10 text-xl text-gray-300 hover:text-white disabled:opacity-40"
                    disabled=move || value.get() >= max
                    on:click=move |_| set(value.get_untracked() + step)
                >
                    "+"
                </button>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_step_bounds() {
        assert_eq!(clamp_step(-1.0, 0.0, 999.0), 0.0);
        assert_eq!(clamp_step(1200.0, 0.0, 999.0), 999.0);
        assert_eq!(clamp_step(f64::NAN, 5.0, 10.0), 5.0);
    }

    #[test]
    fn test_clamp_step_rounds_to_cents() {
        assert_eq!(clamp_step(0.1 + 0.2, 0.0, 10.0), 0.3);
        assert_eq!(clamp_step(62.499, 0.0, 999.0), 62.5);
    }
}
