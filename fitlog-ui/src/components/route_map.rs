//! Route Map Component
//!
//! Draws a recorded path on an HTML5 canvas. The path is projected
//! equirectangularly into its own bounding box; no map tiles are fetched.

use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use fitlog_core::geo::Bounds;
use fitlog_core::tracking::RoutePoint;

const PADDING: f64 = 16.0;

#[component]
pub fn RouteMap(
    #[prop(into)]
    route: Signal<Vec<RoutePoint>>,
    #[prop(default = 600)]
    width: u32,
    #[prop(default = 300)]
    height: u32,
) -> impl IntoView {
    let canvas_ref = create_node_ref::<html::Canvas>();

    // Redraw whenever the route changes
    create_effect(move |_| {
        let points = route.get();
        if let Some(canvas) = canvas_ref.get() {
            draw_route(&canvas, &points);
        }
    });

    view! {
        <canvas
            node_ref=canvas_ref
            width=width
            height=height
            class="w-full rounded-lg bg-gray-900"
        />
    }
}

fn context(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()?
        .dyn_into::<CanvasRenderingContext2d>()
        .ok()
}

fn draw_route(canvas: &HtmlCanvasElement, points: &[RoutePoint]) {
    let Some(ctx) = context(canvas) else {
        return;
    };
    let width = canvas.width() as f64;
    let height = canvas.height() as f64;

    ctx.set_fill_style(&"#111827".into()); // gray-900
    ctx.fill_rect(0.0, 0.0, width, height);

    let Some(bounds) = Bounds::of(points.iter().map(|p| (p.lat(), p.lon()))) else {
        ctx.set_fill_style(&"#6b7280".into());
        ctx.set_font("14px sans-serif");
        let _ = ctx.fill_text("Waiting for GPS…", width / 2.0 - 55.0, height / 2.0);
        return;
    };
    let project = |p: &RoutePoint| bounds.project(p.lat(), p.lon(), width, height, PADDING);

    // Path
    ctx.set_stroke_style(&"#f97316".into()); // orange-500
    ctx.set_line_width(4.0);
    ctx.set_line_join("round");
    ctx.begin_path();
    for (i, point) in points.iter().enumerate() {
        let (x, y) = project(point);
        if i == 0 {
            ctx.move_to(x, y);
        } else {
            ctx.line_to(x, y);
        }
    }
    ctx.stroke();

    // Start and end markers
    let markers = [(points.first(), "#22c55e"), (points.last(), "#ef4444")];
    for (point, color) in markers {
        if let Some(point) = point {
            let (x, y) = project(point);
            ctx.set_fill_style(&color.into());
            ctx.begin_path();
            let _ = ctx.arc(x, y, 6.0, 0.0, std::f64::consts::PI * 2.0);
            ctx.fill();
        }
    }
}
