//! Live Run Tracker
//!
//! Binds a [`TrackerSession`] to browser sensors. Each source (position
//! watch, `devicemotion` listener, one-second interval) is attached to the
//! session as a [`Disposer`], so finishing, abandoning or dropping the run
//! releases all of them. Sensor callbacks hold a weak reference to the
//! session and go quiet once it is gone.

use gloo_timers::callback::Interval;
use leptos::*;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{DeviceMotionEvent, GeolocationPosition, GeolocationPositionError, PositionOptions};

use fitlog_core::models::NewRun;
use fitlog_core::tracking::{Disposer, MotionSample, PositionSample, RoutePoint, TrackerSession};

/// What the tracking modal renders
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LiveStats {
    pub distance_meters: f64,
    pub duration_seconds: i64,
    pub steps: u64,
    pub steps_enabled: bool,
    pub accuracy: Option<i64>,
    pub good_signal: bool,
    pub route: Vec<RoutePoint>,
}

impl LiveStats {
    fn of(session: &TrackerSession) -> Self {
        Self {
            distance_meters: session.distance_meters(),
            duration_seconds: session.duration_seconds(),
            steps: session.steps(),
            steps_enabled: session.steps_enabled(),
            accuracy: session.accuracy(),
            good_signal: session.has_good_signal(),
            route: session.route().to_vec(),
        }
    }
}

/// A run being recorded in the browser
pub struct LiveRun {
    session: Rc<RefCell<TrackerSession>>,
    stats: RwSignal<LiveStats>,
}

impl LiveRun {
    /// Start all sensors.
    ///
    /// Fails when geolocation is unavailable. A missing or refused motion
    /// sensor only disables step counting.
    pub fn start() -> Result<Self, String> {
        let window = web_sys::window().ok_or("No browser window")?;
        let geolocation = window
            .navigator()
            .geolocation()
            .map_err(|_| "Geolocation is not supported by this browser".to_string())?;

        let session = Rc::new(RefCell::new(TrackerSession::new()));
        let stats = create_rw_signal(LiveStats::of(&session.borrow()));

        // Position watch
        let weak = Rc::downgrade(&session);
        let on_position = Closure::<dyn FnMut(GeolocationPosition)>::new(move |pos: GeolocationPosition| {
            let coords = pos.coords();
            let sample = PositionSample {
                latitude: coords.latitude(),
                longitude: coords.longitude(),
                altitude: coords.altitude(),
                accuracy: coords.accuracy(),
                timestamp: pos.timestamp() / 1000.0,
            };
            with_session(&weak, stats, |s| s.on_position(&sample));
        });
        let weak = Rc::downgrade(&session);
        let on_error = Closure::<dyn FnMut(GeolocationPositionError)>::new(
            move |err: GeolocationPositionError| {
                if let Some(session) = weak.upgrade() {
                    session.borrow().on_sensor_error("geolocation", &err.message());
                }
                web_sys::console::warn_1(&format!("GPS error: {}", err.message()).into());
            },
        );

        let options = PositionOptions::new();
        options.set_enable_high_accuracy(true);
        options.set_maximum_age(0);
        let watch_id = geolocation
            .watch_position_with_error_callback_and_options(
                on_position.as_ref().unchecked_ref(),
                Some(on_error.as_ref().unchecked_ref()),
                &options,
            )
            .map_err(|_| "Could not start GPS".to_string())?;

        session.borrow_mut().attach(Disposer::new("geolocation", move || {
            geolocation.clear_watch(watch_id);
            drop((on_position, on_error));
        }));

        // Motion listener
        let weak = Rc::downgrade(&session);
        let on_motion = Closure::<dyn FnMut(DeviceMotionEvent)>::new(move |event: DeviceMotionEvent| {
            let sample = match event.acceleration_including_gravity() {
                Some(a) => MotionSample {
                    x: a.x(),
                    y: a.y(),
                    z: a.z(),
                },
                None => MotionSample::default(),
            };
            with_session(&weak, stats, |s| s.on_motion(&sample));
        });
        let has_motion = js_sys::Reflect::has(&window, &JsValue::from_str("DeviceMotionEvent"))
            .unwrap_or(false);
        let listening = has_motion
            && window
                .add_event_listener_with_callback("devicemotion", on_motion.as_ref().unchecked_ref())
                .is_ok();
        if listening {
            let target = window.clone();
            session.borrow_mut().attach(Disposer::new("devicemotion", move || {
                let _ = target.remove_event_listener_with_callback(
                    "devicemotion",
                    on_motion.as_ref().unchecked_ref(),
                );
                drop(on_motion);
            }));
        } else {
            session.borrow_mut().disable_steps();
        }

        // Duration tick
        let weak = Rc::downgrade(&session);
        let interval = Interval::new(1000, move || {
            with_session(&weak, stats, TrackerSession::on_tick);
        });
        session
            .borrow_mut()
            .attach(Disposer::new("duration", move || drop(interval)));

        stats.set(LiveStats::of(&session.borrow()));
        Ok(Self { session, stats })
    }

    /// Slot for the page's current run. Disposing the owner abandons
    /// whatever run is still in it.
    pub fn slot() -> StoredValue<Option<LiveRun>> {
        let live = store_value(None::<LiveRun>);
        on_cleanup(move || {
            live.try_update_value(|slot| {
                if let Some(run) = slot.take() {
                    run.abandon();
                }
            });
        });
        live
    }

    pub fn stats(&self) -> RwSignal<LiveStats> {
        self.stats
    }

    pub fn active_subscriptions(&self) -> usize {
        self.session.borrow().active_subscriptions()
    }

    /// Release every sensor and build the run to submit
    pub fn finish(&self, notes: Option<String>) -> Result<NewRun, String> {
        let run = self
            .session
            .borrow_mut()
            .finish(chrono::Utc::now(), notes)
            .map_err(|e| e.to_string())?;
        Ok(run)
    }

    /// Release every sensor and discard the run
    pub fn abandon(&self) {
        self.session.borrow_mut().abandon();
    }
}

fn with_session(
    weak: &Weak<RefCell<TrackerSession>>,
    stats: RwSignal<LiveStats>,
    apply: impl FnOnce(&mut TrackerSession),
) {
    let Some(session) = weak.upgrade() else {
        return;
    };
    let Ok(mut session) = session.try_borrow_mut() else {
        return;
    };
    if !session.is_tracking() {
        return;
    }
    apply(&mut session);
    stats.set(LiveStats::of(&session));
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_abandon_releases_sensors() {
        let runtime = create_runtime();
        let run = LiveRun::start().expect("geolocation available in the test browser");
        assert!(run.active_subscriptions() >= 2);

        run.abandon();
        assert_eq!(run.active_subscriptions(), 0);
        assert!(!run.session.borrow().is_tracking());

        runtime.dispose();
    }

    #[wasm_bindgen_test]
    fn test_dropping_run_frees_session() {
        let runtime = create_runtime();
        let run = LiveRun::start().expect("geolocation available in the test browser");
        let session = Rc::downgrade(&run.session);

        drop(run);
        assert!(session.upgrade().is_none());

        runtime.dispose();
    }

    #[wasm_bindgen_test]
    fn test_unmount_abandons_slotted_run() {
        let runtime = create_runtime();
        let mount = as_child_of_current_owner(|_: ()| {
            let live = LiveRun::slot();
            let run = LiveRun::start().expect("geolocation available in the test browser");
            let session = Rc::downgrade(&run.session);
            live.set_value(Some(run));
            session
        });
        let (session, page) = mount(());
        assert!(session.upgrade().is_some());

        drop(page);
        assert!(session.upgrade().is_none());

        runtime.dispose();
    }
}
