//! Rest-timer state machine
//!
//! A single clock that runs either as a countdown (rest periods) or as a
//! stopwatch. The engine itself is passive: a host drives it by calling
//! [`TimerEngine::tick`] once per elapsed second and consults
//! [`TimerEngine::is_ticking`] to decide whether its interval should exist.
//!
//! Countdowns are never clamped at zero. Once a rest period runs out the
//! time goes negative and is rendered as overtime with a leading `+`.

use serde::{Deserialize, Serialize};

/// Direction the clock moves on every tick
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Countdown,
    #[default]
    Stopwatch,
}

/// Countdown/stopwatch clock
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimerEngine {
    time: i64,
    mode: TimerMode,
    running: bool,
    paused: bool,
}

impl TimerEngine {
    /// A stopped stopwatch at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the clock.
    ///
    /// `Some(seconds)` seeds a countdown, `None` starts a stopwatch at zero.
    /// Either way the clock is running and unpaused afterwards.
    pub fn start(&mut self, initial: Option<i64>) {
        match initial {
            Some(seconds) => {
                self.mode = TimerMode::Countdown;
                self.time = seconds;
            }
            None => {
                self.mode = TimerMode::Stopwatch;
                self.time = 0;
            }
        }
        self.running = true;
        self.paused = false;
    }

    /// Advance one second. No-op unless running and not paused.
    pub fn tick(&mut self) {
        if !self.is_ticking() {
            return;
        }
        match self.mode {
            TimerMode::Countdown => self.time -= 1,
            TimerMode::Stopwatch => self.time += 1,
        }
    }

    /// Shift the clock by a signed amount without touching mode or run state
    pub fn add_time(&mut self, delta: i64) {
        self.time += delta;
    }

    pub fn pause(&mut self) {
        if self.running {
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Reset to a stopped, unpaused clock at zero
    pub fn stop(&mut self) {
        self.running = false;
        self.paused = false;
        self.time = 0;
    }

    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether a host interval should currently be alive
    pub fn is_ticking(&self) -> bool {
        self.running && !self.paused
    }

    /// Countdown that has run past zero
    pub fn is_overtime(&self) -> bool {
        self.mode == TimerMode::Countdown && self.time < 0
    }

    /// Render seconds as `m:ss`, prefixed with `+` when negative (overtime)
    pub fn format_time(seconds: i64) -> String {
        let abs = seconds.unsigned_abs();
        let sign = if seconds < 0 { "+" } else { "" };
        format!("{}{}:{:02}", sign, abs / 60, abs % 60)
    }

    /// The current time rendered with [`TimerEngine::format_time`]
    pub fn display(&self) -> String {
        Self::format_time(self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_ticks_down() {
        let mut timer = TimerEngine::new();
        timer.start(Some(30));
        for _ in 0..3 {
            timer.tick();
        }
        assert_eq!(timer.time(), 27);
        assert_eq!(timer.mode(), TimerMode::Countdown);
        assert!(timer.is_running());
    }

    #[test]
    fn test_countdown_runs_into_overtime() {
        let mut timer = TimerEngine::new();
        timer.start(Some(2));
        for _ in 0..5 {
            timer.tick();
        }
        assert_eq!(timer.time(), -3);
        assert!(timer.is_overtime());
        assert_eq!(timer.display(), "+0:03");
    }

    #[test]
    fn test_stopwatch_counts_up_from_zero() {
        let mut timer = TimerEngine::new();
        timer.start(Some(90));
        timer.start(None);
        assert_eq!(timer.time(), 0);
        timer.tick();
        timer.tick();
        assert_eq!(timer.time(), 2);
        assert_eq!(timer.mode(), TimerMode::Stopwatch);
        assert!(!timer.is_overtime());
    }

    #[test]
    fn test_add_time_keeps_state() {
        let mut timer = TimerEngine::new();
        timer.start(Some(10));
        timer.add_time(-15);
        assert_eq!(timer.time(), -5);
        assert!(timer.is_running());
        assert_eq!(timer.mode(), TimerMode::Countdown);

        timer.pause();
        timer.add_time(15);
        assert_eq!(timer.time(), 10);
        assert!(timer.is_paused());
    }

    #[test]
    fn test_add_time_while_stopped() {
        let mut timer = TimerEngine::new();
        timer.add_time(15);
        assert_eq!(timer.time(), 15);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_pause_freezes_ticks() {
        let mut timer = TimerEngine::new();
        timer.start(Some(30));
        timer.pause();
        assert!(!timer.is_ticking());
        timer.tick();
        assert_eq!(timer.time(), 30);

        timer.resume();
        timer.tick();
        assert_eq!(timer.time(), 29);
    }

    #[test]
    fn test_pause_ignored_when_stopped() {
        let mut timer = TimerEngine::new();
        timer.pause();
        assert!(!timer.is_paused());
    }

    #[test]
    fn test_start_clears_pause() {
        let mut timer = TimerEngine::new();
        timer.start(Some(30));
        timer.pause();
        timer.start(Some(60));
        assert!(!timer.is_paused());
        assert!(timer.is_ticking());
        assert_eq!(timer.time(), 60);
    }

    #[test]
    fn test_stop_resets() {
        let mut timer = TimerEngine::new();
        timer.start(Some(30));
        timer.pause();
        timer.stop();
        assert_eq!(timer.time(), 0);
        assert!(!timer.is_running());
        assert!(!timer.is_paused());
        timer.tick();
        assert_eq!(timer.time(), 0);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(TimerEngine::format_time(0), "0:00");
        assert_eq!(TimerEngine::format_time(75), "1:15");
        assert_eq!(TimerEngine::format_time(600), "10:00");
        assert_eq!(TimerEngine::format_time(-15), "+0:15");
        assert_eq!(TimerEngine::format_time(-61), "+1:01");
    }
}
