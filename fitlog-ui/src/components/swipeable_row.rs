//! Swipe-to-delete row
//!
//! Dragging the row left past [`SWIPE_THRESHOLD_PX`] latches it open and
//! reveals a delete button; a shorter drag springs back.

use leptos::*;
use web_sys::TouchEvent;

/// Horizontal drag (px) that reveals the delete action
pub const SWIPE_THRESHOLD_PX: f64 = 60.0;

/// Width of the revealed action (px)
const ACTION_WIDTH_PX: f64 = 80.0;

/// Row offset for a drag from `start_x` to `x`: left only, at most one action wide
pub fn drag_offset(start_x: f64, x: f64) -> f64 {
    (x - start_x).clamp(-ACTION_WIDTH_PX, 0.0)
}

/// Where the row settles when the finger lifts
pub fn settle(offset: f64) -> f64 {
    if offset <= -SWIPE_THRESHOLD_PX {
        -ACTION_WIDTH_PX
    } else {
        0.0
    }
}

fn touch_x(ev: &TouchEvent) -> Option<f64> {
    ev.touches().get(0).map(|t| t.client_x() as f64)
}

#[component]
pub fn SwipeableRow(
    #[prop(into)]
    on_delete: Callback<()>,
    children: Children,
) -> impl IntoView {
    let (offset, set_offset) = create_signal(0.0);
    let (dragging, set_dragging) = create_signal(false);
    let start_x = store_value(0.0);
    let base = store_value(0.0);

    let on_start = move |ev: TouchEvent| {
        if let Some(x) = touch_x(&ev) {
            start_x.set_value(x);
            base.set_value(offset.get_untracked());
            set_dragging.set(true);
        }
    };
    let on_move = move |ev: TouchEvent| {
        if let Some(x) = touch_x(&ev) {
            set_offset.set(drag_offset(start_x.get_value() - base.get_value(), x));
        }
    };
    let on_end = move |_: TouchEvent| {
        set_dragging.set(false);
        set_offset.update(|o| *o = settle(*o));
    };

    view! {
        <div class="relative overflow-hidden rounded-lg">
            <button
                class="absolute inset-y-0 right-0 bg-red-600 text-white font-semibold"
                style=format!("width: {}px", ACTION_WIDTH_PX)
                on:click=move |_| {
                    set_offset.set(0.0);
                    on_delete.call(());
                }
            >
                "Delete"
            </button>
            <div
                class=move || {
                    let base = "relative bg-gray-800";
                    if dragging.get() { base.to_string() } else { format!("{} transition-transform", base) }
                }
                style=move || format!("transform: translateX({}px)", offset.get())
                on:touchstart=on_start
                on:touchmove=on_move
                on:touchend=on_end
            >
                {children()}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_only_left_and_bounded() {
        assert_eq!(drag_offset(100.0, 140.0), 0.0);
        assert_eq!(drag_offset(100.0, 70.0), -30.0);
        assert_eq!(drag_offset(300.0, 0.0), -ACTION_WIDTH_PX);
    }

    #[test]
    fn test_settle_past_threshold() {
        assert_eq!(settle(-30.0), 0.0);
        assert_eq!(settle(-SWIPE_THRESHOLD_PX), -ACTION_WIDTH_PX);
        assert_eq!(settle(-75.0), -ACTION_WIDTH_PX);
    }
}
