//! Circular progress indicator

use leptos::*;

/// Stroke offset for an SVG ring of `radius` at `percent` (clamped to 0..=100)
pub fn ring_offset(radius: f64, percent: f64) -> f64 {
    let circumference = 2.0 * std::f64::consts::PI * radius;
    circumference * (1.0 - percent.clamp(0.0, 100.0) / 100.0)
}

#[component]
pub fn ProgressRing(
    #[prop(into)]
    percent: Signal<f64>,
    #[prop(default = 56.0)]
    radius: f64,
    #[prop(default = 10.0)]
    stroke: f64,
    #[prop(default = "#22c55e")]
    color: &'static str,
    children: Children,
) -> impl IntoView {
    let size = (radius + stroke) * 2.0;
    let circumference = 2.0 * std::f64::consts::PI * radius;

    view! {
        <div class="relative inline-flex items-center justify-center">
            <svg width=size height=size class="-rotate-90">
                <circle
                    cx=size / 2.0
                    cy=size / 2.0
                    r=radius
                    fill="none"
                    stroke="#374151"
                    stroke-width=stroke
                />
                <circle
                    cx=size / 2.0
                    cy=size / 2.0
                    r=radius
                    fill="none"
                    stroke=color
                    stroke-width=stroke
                    stroke-linecap="round"
                    stroke-dasharray=circumference
                    stroke-dashoffset=move || ring_offset(radius, percent.get())
                    class="transition-all duration-500"
                />
            </svg>
            <div class="absolute inset-0 flex flex-col items-center justify-center">{children()}</div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_offset() {
        let full = 2.0 * std::f64::consts::PI * 10.0;
        assert_eq!(ring_offset(10.0, 0.0), full);
        assert_eq!(ring_offset(10.0, 100.0), 0.0);
        assert_eq!(ring_offset(10.0, 250.0), 0.0);
        assert!((ring_offset(10.0, 50.0) - full / 2.0).abs() < 1e-9);
    }
}
