//! Rest Clock
//!
//! Tokio driver for [`TimerEngine`]. The clock owns at most one ticking
//! task; every running/paused transition aborts it and, when the timer
//! should be counting, spawns a fresh one. Dropping the clock aborts the
//! task.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

use fitlog_core::timer::{TimerEngine, TimerMode};

/// Snapshot of the clock for display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockState {
    pub time: i64,
    pub mode: TimerMode,
    pub running: bool,
    pub paused: bool,
}

impl ClockState {
    fn of(engine: &TimerEngine) -> Self {
        Self {
            time: engine.time(),
            mode: engine.mode(),
            running: engine.is_running(),
            paused: engine.is_paused(),
        }
    }

    pub fn display(&self) -> String {
        TimerEngine::format_time(self.time)
    }

    pub fn is_overtime(&self) -> bool {
        self.mode == TimerMode::Countdown && self.time < 0
    }
}

/// Countdown/stopwatch driven by a single tokio interval
pub struct RestClock {
    engine: Arc<RwLock<TimerEngine>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    period: Duration,
    updates: watch::Sender<ClockState>,
}

impl RestClock {
    /// Clock ticking once per second
    pub fn new() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    /// Clock with a custom tick period
    pub fn with_period(period: Duration) -> Self {
        let engine = TimerEngine::new();
        let (updates, _) = watch::channel(ClockState::of(&engine));
        Self {
            engine: Arc::new(RwLock::new(engine)),
            ticker: Mutex::new(None),
            period,
            updates,
        }
    }

    /// Receive a new state after every tick and transition
    pub fn subscribe(&self) -> watch::Receiver<ClockState> {
        self.updates.subscribe()
    }

    pub async fn state(&self) -> ClockState {
        ClockState::of(&*self.engine.read().await)
    }

    /// `Some(n)` counts down from n, `None` runs a stopwatch from 0
    pub async fn start(&self, initial: Option<i64>) {
        self.transition(|e| e.start(initial)).await;
    }

    pub async fn pause(&self) {
        self.transition(TimerEngine::pause).await;
    }

    pub async fn resume(&self) {
        self.transition(TimerEngine::resume).await;
    }

    pub async fn stop(&self) {
        self.transition(TimerEngine::stop).await;
    }

    /// Shift the time without touching the ticker
    pub async fn add_time(&self, delta: i64) {
        let state = {
            let mut engine = self.engine.write().await;
            engine.add_time(delta);
            ClockState::of(&engine)
        };
        self.updates.send_replace(state);
    }

    /// Whether a ticking task currently exists
    pub fn has_ticker(&self) -> bool {
        self.ticker
            .lock()
            .map(|t| t.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    async fn transition(&self, apply: impl FnOnce(&mut TimerEngine)) {
        // Held until the ticker matches the new state, so racing
        // transitions apply in one order for both
        let mut engine = self.engine.write().await;
        apply(&mut engine);
        let state = ClockState::of(&engine);
        self.restart_ticker(state.running && !state.paused);
        self.updates.send_replace(state);
    }

    fn restart_ticker(&self, ticking: bool) {
        let Ok(mut slot) = self.ticker.lock() else {
            tracing::error!("Rest clock ticker lock poisoned");
            return;
        };
        if let Some(handle) = slot.take() {
            handle.abort();
        }
        if !ticking {
            return;
        }

        let engine = Arc::clone(&self.engine);
        let updates = self.updates.clone();
        let period = self.period;
        *slot = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let state = {
                    let mut engine = engine.write().await;
                    engine.tick();
                    ClockState::of(&engine)
                };
                updates.send_replace(state);
            }
        }));
    }
}

impl Default for RestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RestClock {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.ticker.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn test_countdown_ticks_down() {
        let clock = RestClock::with_period(PERIOD);
        clock.start(Some(30)).await;
        tokio::time::sleep(PERIOD * 5).await;

        let state = clock.state().await;
        assert!(state.time < 30 && state.time >= 20, "time was {}", state.time);
        assert!(clock.has_ticker());
    }

    #[tokio::test]
    async fn test_pause_freezes_time() {
        let clock = RestClock::with_period(PERIOD);
        clock.start(None).await;
        tokio::time::sleep(PERIOD * 3).await;
        clock.pause().await;
        assert!(!clock.has_ticker());

        let frozen = clock.state().await.time;
        tokio::time::sleep(PERIOD * 4).await;
        assert_eq!(clock.state().await.time, frozen);

        clock.resume().await;
        assert!(clock.has_ticker());
    }

    #[tokio::test]
    async fn test_restart_keeps_single_ticker() {
        let clock = RestClock::with_period(PERIOD);
        clock.start(Some(30)).await;
        clock.stop().await;
        clock.start(Some(30)).await;
        tokio::time::sleep(PERIOD * 5 + PERIOD / 2).await;

        // Two live tickers would have consumed roughly twice as many seconds
        let elapsed = 30 - clock.state().await.time;
        assert!((3..=6).contains(&elapsed), "elapsed {elapsed}");
    }

    #[tokio::test]
    async fn test_stop_resets() {
        let clock = RestClock::with_period(PERIOD);
        clock.start(Some(10)).await;
        clock.stop().await;

        let state = clock.state().await;
        assert_eq!(state.time, 0);
        assert!(!state.running);
        assert!(!clock.has_ticker());
    }

    #[tokio::test]
    async fn test_add_time_into_overtime() {
        let clock = RestClock::with_period(Duration::from_secs(60));
        clock.start(Some(10)).await;
        clock.add_time(-15).await;

        let state = clock.state().await;
        assert_eq!(state.time, -5);
        assert!(state.is_overtime());
        assert_eq!(state.display(), "+0:05");
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let clock = RestClock::with_period(Duration::from_secs(60));
        let mut rx = clock.subscribe();
        clock.start(Some(45)).await;

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().time, 45);
        assert!(rx.borrow().running);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_transitions_keep_ticker_in_step() {
        let clock = Arc::new(RestClock::with_period(PERIOD));

        for _ in 0..200 {
            let (a, b) = (Arc::clone(&clock), Arc::clone(&clock));
            let start = tokio::spawn(async move { a.start(Some(60)).await });
            let stop = tokio::spawn(async move { b.stop().await });
            let _ = tokio::join!(start, stop);

            let state = clock.state().await;
            assert_eq!(clock.has_ticker(), state.running && !state.paused);
        }
    }
}
