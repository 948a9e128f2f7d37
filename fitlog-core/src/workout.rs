//! Set grouping, training volume and weekly mileage

use crate::models::{Exercise, NewSet, Routine, Run, WorkoutSet};
use chrono::{DateTime, Duration, Utc};

/// Weekly running goal shown against the last seven days (km)
pub const WEEKLY_MILEAGE_GOAL_KM: f64 = 40.0;

/// Rest period started after a set is saved (seconds)
pub const DEFAULT_REST_SECONDS: i64 = 30;

/// Consecutive sets of one exercise inside a session
#[derive(Debug, Clone, PartialEq)]
pub struct SetGroup {
    pub exercise_id: i64,
    pub exercise_name: String,
    pub sets: Vec<WorkoutSet>,
}

/// Group sets by runs of the same exercise, in order.
///
/// Only adjacent sets merge: A, A, B, A yields three groups.
pub fn group_sets(sets: &[WorkoutSet]) -> Vec<SetGroup> {
    let mut groups: Vec<SetGroup> = Vec::new();
    for set in sets {
        match groups.last_mut() {
            Some(group) if group.exercise_id == set.exercise_id => group.sets.push(set.clone()),
            _ => groups.push(SetGroup {
                exercise_id: set.exercise_id,
                exercise_name: set
                    .exercise_name
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
                sets: vec![set.clone()],
            }),
        }
    }
    groups
}

/// Total lifted volume: sum of weight times reps
pub fn volume(sets: &[WorkoutSet]) -> f64 {
    sets.iter().map(|s| s.weight_kg * s.reps as f64).sum()
}

/// Next set for an exercise group, copying the previous set's load
pub fn follow_up_set(group: &SetGroup) -> NewSet {
    match group.sets.last() {
        Some(last) => NewSet {
            exercise_id: group.exercise_id,
            weight_kg: last.weight_kg,
            reps: last.reps,
            rpe: Some(last.rpe.unwrap_or(0.0)),
            performed_at: None,
        },
        None => empty_set(group.exercise_id),
    }
}

/// Zero-load placeholder set
pub fn empty_set(exercise_id: i64) -> NewSet {
    NewSet {
        exercise_id,
        weight_kg: 0.0,
        reps: 0,
        rpe: Some(0.0),
        performed_at: None,
    }
}

/// Placeholder sets seeded when a session starts from a routine
pub fn routine_sets(routine: &Routine) -> Vec<NewSet> {
    let mut exercises = routine.exercises.clone();
    exercises.sort_by_key(|e| e.exercise_order);
    exercises.iter().map(|e| empty_set(e.exercise_id)).collect()
}

/// Case-insensitive substring filter over the exercise catalog
pub fn search_exercises<'a>(exercises: &'a [Exercise], query: &str) -> Vec<&'a Exercise> {
    let needle = query.to_lowercase();
    exercises
        .iter()
        .filter(|e| e.name.to_lowercase().contains(&needle))
        .collect()
}

/// Kilometres run in the seven days before `now`
pub fn weekly_mileage(runs: &[Run], now: DateTime<Utc>) -> f64 {
    let window = Duration::days(7);
    runs.iter()
        .filter(|r| now - r.start_time < window)
        .map(Run::distance_km)
        .sum()
}

/// Share of the weekly goal reached, capped at 100
pub fn weekly_progress_percent(km: f64) -> f64 {
    (km / WEEKLY_MILEAGE_GOAL_KM * 100.0).min(100.0)
}
