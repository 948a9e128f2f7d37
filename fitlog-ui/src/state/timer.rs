//! Rest Timer Service
//!
//! Browser host for [`TimerEngine`]. One `RestTimer` is provided at the app
//! root; pages reach it through [`use_rest_timer`] and only call its public
//! methods. The service owns at most one `Interval`: every running/paused
//! transition drops the old one and creates a new one only when the engine
//! should be ticking. Unmounting the root drops the interval.

use gloo_timers::callback::Interval;
use leptos::*;

use fitlog_core::timer::{TimerEngine, TimerMode};

const TICK_MS: u32 = 1000;

#[derive(Clone, Copy)]
pub struct RestTimer {
    engine: RwSignal<TimerEngine>,
    ticker: StoredValue<Option<Interval>>,
}

/// Create the service, provide it as context and tie its interval to the
/// current owner
pub fn provide_rest_timer() -> RestTimer {
    let timer = RestTimer {
        engine: create_rw_signal(TimerEngine::new()),
        ticker: store_value(None),
    };
    provide_context(timer);

    let ticker = timer.ticker;
    on_cleanup(move || {
        ticker.try_update_value(|t| t.take());
    });
    timer
}

pub fn use_rest_timer() -> RestTimer {
    expect_context::<RestTimer>()
}

impl RestTimer {
    pub fn time(&self) -> i64 {
        self.engine.with(TimerEngine::time)
    }

    pub fn mode(&self) -> TimerMode {
        self.engine.with(TimerEngine::mode)
    }

    pub fn is_running(&self) -> bool {
        self.engine.with(TimerEngine::is_running)
    }

    pub fn is_paused(&self) -> bool {
        self.engine.with(TimerEngine::is_paused)
    }

    pub fn is_overtime(&self) -> bool {
        self.engine.with(TimerEngine::is_overtime)
    }

    pub fn display(&self) -> String {
        self.engine.with(TimerEngine::display)
    }

    /// Whether an interval currently exists; never once the owner is gone
    pub fn has_ticker(&self) -> bool {
        self.ticker.try_with_value(Option::is_some).unwrap_or(false)
    }

    pub fn start(&self, initial: Option<i64>) {
        self.transition(|e| e.start(initial));
    }

    pub fn pause(&self) {
        self.transition(TimerEngine::pause);
    }

    pub fn resume(&self) {
        self.transition(TimerEngine::resume);
    }

    pub fn stop(&self) {
        self.transition(TimerEngine::stop);
    }

    /// Shift the time; the interval is left alone
    pub fn add_time(&self, delta: i64) {
        self.engine.update(|e| e.add_time(delta));
    }

    fn transition(&self, apply: impl FnOnce(&mut TimerEngine)) {
        self.engine.update(apply);
        let ticking = self.engine.with_untracked(TimerEngine::is_ticking);

        let engine = self.engine;
        self.ticker.update_value(|slot| {
            // Dropping an Interval cancels it
            slot.take();
            if ticking {
                *slot = Some(Interval::new(TICK_MS, move || {
                    engine.update(TimerEngine::tick);
                }));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_transitions_own_one_ticker() {
        let runtime = create_runtime();
        let timer = provide_rest_timer();

        timer.start(Some(30));
        assert!(timer.has_ticker());
        assert_eq!(timer.display(), "0:30");

        timer.pause();
        assert!(!timer.has_ticker());
        timer.add_time(-45);
        assert!(timer.is_overtime());
        assert_eq!(timer.display(), "+0:15");

        timer.resume();
        assert!(timer.has_ticker());

        timer.stop();
        assert!(!timer.has_ticker());
        assert_eq!(timer.time(), 0);

        runtime.dispose();
    }

    #[wasm_bindgen_test]
    fn test_unmount_cancels_running_ticker() {
        let runtime = create_runtime();
        let mount = as_child_of_current_owner(|_: ()| provide_rest_timer());
        let (timer, app) = mount(());

        timer.start(Some(90));
        assert!(timer.has_ticker());

        drop(app);
        assert!(!timer.has_ticker());

        runtime.dispose();
    }
}
