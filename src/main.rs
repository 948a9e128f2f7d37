//! Fitlog demo
//!
//! Opens an in-memory store, records a few days of training and eating for
//! the default user, and prints the daily summaries the dashboard would show.
//! `cargo run --bin fitlog-api` starts the real server.

use chrono::{Duration, Utc};
use fitlog::config::Config;
use fitlog::storage::*;
use fitlog_core::format::{format_pace, km};
use fitlog_core::models::{NewBodyMetric, NewFoodEntry, NewMeal, NewRun, NewSession, NewSet};
use fitlog_core::nutrition::EnergyTarget;

const DEMO_USER: i64 = 1;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();
    fitlog::logging::init(&config.logging)?;

    tracing::info!("Fitlog v{}", env!("CARGO_PKG_VERSION"));

    let store = Store::open_in_memory()?;
    tracing::info!("Store stats: {:?}", store.stats()?);

    demo_write(&store)?;
    demo_query(&store)?;

    tracing::info!("Store stats: {:?}", store.stats()?);
    Ok(())
}

fn demo_write(store: &Store) -> StorageResult<()> {
    tracing::info!("Writing demo data...");

    let now = Utc::now();
    let exercises = store.list_exercises()?;
    let squat = exercises
        .iter()
        .find(|e| e.name.contains("Squat"))
        .or_else(|| exercises.first())
        .map(|e| e.id)
        .ok_or(StorageError::InvalidInput("exercise catalog is empty".into()))?;

    store.update_user(
        DEMO_USER,
        fitlog_core::models::UserPayload {
            height_cm: Some(180.0),
            dob: Some("1990-05-14".into()),
            sex: Some("M".into()),
            activity_level: Some("Moderately Active".into()),
            weight_goal: Some("Maintain".into()),
            ..Default::default()
        },
    )?;

    for day in 0..5i64 {
        let at = now - Duration::days(day);

        let meal = store.create_meal(
            DEMO_USER,
            NewMeal {
                name: Some("Lunch".into()),
                eaten_at: Some(at),
            },
        )?;
        store.add_entry(
            DEMO_USER,
            meal.id,
            NewFoodEntry {
                name: "Chicken rice bowl".into(),
                calories: 650 + day * 20,
                protein_g: 45.0,
                carbs_g: 70.0,
                fat_g: 18.0,
                quantity: Some("1 bowl".into()),
            },
        )?;

        if day % 2 == 0 {
            store.create_run(
                DEMO_USER,
                NewRun {
                    start_time: Some(at),
                    duration_seconds: 1500 + day * 30,
                    distance_meters: 5000.0,
                    ..Default::default()
                },
            )?;
        } else {
            let session = store.create_session(
                DEMO_USER,
                NewSession {
                    start_time: Some(at - Duration::minutes(50)),
                    notes: None,
                },
            )?;
            for reps in [8, 8, 6] {
                store.add_set(
                    DEMO_USER,
                    session.id,
                    NewSet {
                        exercise_id: squat,
                        weight_kg: 100.0,
                        reps,
                        ..Default::default()
                    },
                )?;
            }
            store.finish_session(DEMO_USER, session.id, at)?;
        }

        store.create_body_metric(
            DEMO_USER,
            NewBodyMetric {
                recorded_at: Some(at),
                weight_kg: Some(80.0 + day as f64 * 0.2),
                body_fat_percent: None,
            },
        )?;
    }

    store.log_water(DEMO_USER, 750)?;
    Ok(())
}

fn demo_query(store: &Store) -> StorageResult<()> {
    tracing::info!("Querying demo data...");

    let today = Utc::now().date_naive();
    for day in store.daily_summaries(DEMO_USER, today - Duration::days(6), today)? {
        tracing::info!(
            "{}: {} kcal eaten, {} km run, {:.0} kg lifted, {} kcal burned, {} ml water",
            day.date,
            day.total_calories,
            km(day.run_distance),
            day.workout_volume_kg,
            day.exercise_calories,
            day.water_ml
        );
    }

    for run in store.list_runs(DEMO_USER, 3)? {
        tracing::info!(
            "Run {}: {} km at {} /km",
            run.id,
            km(run.distance_meters),
            format_pace(run.duration_seconds, run.distance_meters)
        );
    }

    let user = store.get_user(DEMO_USER)?;
    let weight = store.latest_weight(DEMO_USER)?;
    match EnergyTarget::for_user(&user, weight, today) {
        Some(target) => tracing::info!(
            "Energy: BMR {:.0}, maintenance {}, target {} kcal",
            target.bmr,
            target.maintenance,
            target.target
        ),
        None => tracing::warn!("Profile incomplete, no energy target"),
    }

    Ok(())
}
