//! Chart Component
//!
//! Daily bar chart using HTML5 Canvas.

use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::CanvasRenderingContext2d;

/// One bar: label under the axis and its value
#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

/// Bar chart with a dashed goal line when `goal` is set
#[component]
pub fn BarChart(
    #[prop(into)]
    bars: Signal<Vec<Bar>>,
    #[prop(default = "#f97316")]
    color: &'static str,
    #[prop(optional)]
    goal: Option<f64>,
) -> impl IntoView {
    let canvas_ref = create_node_ref::<html::Canvas>();

    create_effect(move |_| {
        let data = bars.get();
        if let Some(canvas) = canvas_ref.get() {
            draw_bars(&canvas, &data, color, goal);
        }
    });

    view! {
        <canvas node_ref=canvas_ref width="800" height="260" class="w-full h-48 rounded-lg" />
    }
}

/// Upper bound of the y axis: the larger of the data and the goal, never zero
pub fn axis_max(values: &[f64], goal: Option<f64>) -> f64 {
    let max = values
        .iter()
        .copied()
        .chain(goal)
        .fold(0.0_f64, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn draw_bars(canvas: &web_sys::HtmlCanvasElement, bars: &[Bar], color: &str, goal: Option<f64>) {
    let ctx = match canvas.get_context("2d") {
        Ok(Some(ctx)) => match ctx.dyn_into::<CanvasRenderingContext2d>() {
            Ok(ctx) => ctx,
            Err(_) => return,
        },
        _ => return,
    };

    let width = canvas.width() as f64;
    let height = canvas.height() as f64;

    let margin_left = 50.0;
    let margin_bottom = 30.0;
    let margin_top = 10.0;
    let chart_width = width - margin_left - 10.0;
    let chart_height = height - margin_top - margin_bottom;

    ctx.set_fill_style(&"#1f2937".into()); // gray-800
    ctx.fill_rect(0.0, 0.0, width, height);

    if bars.is_empty() {
        ctx.set_fill_style(&"#6b7280".into());
        ctx.set_font("16px sans-serif");
        let _ = ctx.fill_text("No data for selected range", width / 2.0 - 90.0, height / 2.0);
        return;
    }

    let values: Vec<f64> = bars.iter().map(|b| b.value).collect();
    let max = axis_max(&values, goal);
    let y_of = |v: f64| margin_top + chart_height * (1.0 - v / max);

    // Grid and y labels
    ctx.set_stroke_style(&"#374151".into());
    ctx.set_line_width(1.0);
    ctx.set_fill_style(&"#9ca3af".into());
    ctx.set_font("12px sans-serif");
    for i in 0..=4 {
        let v = max * i as f64 / 4.0;
        let y = y_of(v);
        ctx.begin_path();
        ctx.move_to(margin_left, y);
        ctx.line_to(width - 10.0, y);
        ctx.stroke();
        let _ = ctx.fill_text(&format!("{:.0}", v), 5.0, y + 4.0);
    }

    // Bars
    let slot = chart_width / bars.len() as f64;
    let bar_width = (slot * 0.7).max(1.0);
    let label_every = (bars.len() / 7).max(1);
    for (i, bar) in bars.iter().enumerate() {
        let x = margin_left + slot * i as f64 + (slot - bar_width) / 2.0;
        let y = y_of(bar.value.max(0.0));
        ctx.set_fill_style(&color.into());
        ctx.fill_rect(x, y, bar_width, margin_top + chart_height - y);

        if i % label_every == 0 {
            ctx.set_fill_style(&"#9ca3af".into());
            let _ = ctx.fill_text(&bar.label, x, height - 10.0);
        }
    }

    // Goal line
    if let Some(goal) = goal {
        let y = y_of(goal);
        ctx.set_stroke_style(&"#22c55e".into());
        let dash = js_sys::Array::of2(&6.0.into(), &4.0.into());
        let _ = ctx.set_line_dash(&dash);
        ctx.begin_path();
        ctx.move_to(margin_left, y);
        ctx.line_to(width - 10.0, y);
        ctx.stroke();
        let _ = ctx.set_line_dash(&js_sys::Array::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_max() {
        assert_eq!(axis_max(&[], None), 1.0);
        assert_eq!(axis_max(&[0.0, 0.0], None), 1.0);
        assert!((axis_max(&[100.0, 50.0], None) - 110.0).abs() < 1e-9);
        assert!((axis_max(&[100.0], Some(3000.0)) - 3300.0).abs() < 1e-9);
    }
}
