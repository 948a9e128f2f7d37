//! Per-day summaries across nutrition, training, water and body metrics
//!
//! Each source is aggregated by calendar day (UTC) in SQL, then the rows
//! are folded onto one [`DailySummary`] per day of the requested range.

use super::{Store, StorageError, StorageResult};
use chrono::{DateTime, NaiveDate, Utc};
use fitlog_core::models::DailySummary;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;

/// Calories burned per km per kg while running
const RUN_KCAL_FACTOR: f64 = 1.036;

/// Reference body mass for run calories (kg)
const RUN_REFERENCE_KG: f64 = 70.0;

/// Calories burned per minute of lifting
const LIFT_KCAL_PER_MIN: f64 = 6.0;

/// Longest range a single request may span (days)
pub const MAX_RANGE_DAYS: i64 = 3660;

type Days = BTreeMap<NaiveDate, DailySummary>;

fn day_of(text: &str) -> Option<NaiveDate> {
    text.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

/// Run `sql` with (user, start, end) and hand each row's day plus row to `apply`
fn fold_rows<F>(conn: &Connection, sql: &str, user_id: i64, start: &str, end: &str, days: &mut Days, mut apply: F) -> StorageResult<()>
where
    F: FnMut(&mut DailySummary, &rusqlite::Row<'_>) -> rusqlite::Result<()>,
{
    let mut stmt = conn.prepare_cached(sql)?;
    let mut rows = stmt.query(params![user_id, start, end])?;
    while let Some(row) = rows.next()? {
        let day: String = row.get(0)?;
        if let Some(summary) = day_of(&day).and_then(|d| days.get_mut(&d)) {
            apply(summary, row)?;
        }
    }
    Ok(())
}

impl Store {
    /// One summary per day in `[start, end]`, newest first
    pub fn daily_summaries(&self, user_id: i64, start: NaiveDate, end: NaiveDate) -> StorageResult<Vec<DailySummary>> {
        if start > end {
            return Err(StorageError::InvalidInput("start must not be after end".into()));
        }
        if (end - start).num_days() > MAX_RANGE_DAYS {
            return Err(StorageError::InvalidInput(format!(
                "range may span at most {MAX_RANGE_DAYS} days"
            )));
        }

        let mut days: Days = start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|d| (d, DailySummary::empty(d)))
            .collect();

        let from = start.format("%Y-%m-%d").to_string();
        let to = end.format("%Y-%m-%d").to_string();
        let conn = self.conn()?;

        fold_rows(
            &conn,
            "SELECT substr(m.eaten_at, 1, 10) AS day, SUM(fe.calories), SUM(fe.protein_g),
                    SUM(fe.carbs_g), SUM(fe.fat_g)
             FROM meals m
             JOIN food_entries fe ON fe.meal_id = m.id
             WHERE m.user_id = ?1 AND substr(m.eaten_at, 1, 10) BETWEEN ?2 AND ?3
             GROUP BY day",
            user_id,
            &from,
            &to,
            &mut days,
            |s, row| {
                s.total_calories = row.get(1)?;
                s.total_protein = row.get(2)?;
                s.total_carbs = row.get(3)?;
                s.total_fat = row.get(4)?;
                Ok(())
            },
        )?;

        let mut exercise_kcal: BTreeMap<NaiveDate, f64> = BTreeMap::new();

        fold_rows(
            &conn,
            "SELECT substr(start_time, 1, 10) AS day, SUM(distance_meters)
             FROM runs
             WHERE user_id = ?1 AND substr(start_time, 1, 10) BETWEEN ?2 AND ?3
             GROUP BY day",
            user_id,
            &from,
            &to,
            &mut days,
            |s, row| {
                s.run_distance = row.get(1)?;
                *exercise_kcal.entry(s.date).or_default() +=
                    s.run_distance / 1000.0 * RUN_REFERENCE_KG * RUN_KCAL_FACTOR;
                Ok(())
            },
        )?;

        fold_rows(
            &conn,
            "SELECT substr(ws.start_time, 1, 10) AS day, SUM(s.weight_kg * s.reps)
             FROM workout_sessions ws
             JOIN workout_sets s ON s.session_id = ws.id
             WHERE ws.user_id = ?1 AND ws.end_time IS NOT NULL
               AND substr(ws.start_time, 1, 10) BETWEEN ?2 AND ?3
             GROUP BY day",
            user_id,
            &from,
            &to,
            &mut days,
            |s, row| {
                s.workout_volume_kg = row.get(1)?;
                Ok(())
            },
        )?;

        // Session minutes are counted once per session, whatever its set count
        fold_rows(
            &conn,
            "SELECT substr(start_time, 1, 10) AS day, start_time, end_time
             FROM workout_sessions
             WHERE user_id = ?1 AND end_time IS NOT NULL
               AND substr(start_time, 1, 10) BETWEEN ?2 AND ?3",
            user_id,
            &from,
            &to,
            &mut days,
            |s, row| {
                let started: DateTime<Utc> = row.get(1)?;
                let ended: DateTime<Utc> = row.get(2)?;
                let minutes = (ended - started).num_seconds().max(0) as f64 / 60.0;
                *exercise_kcal.entry(s.date).or_default() += LIFT_KCAL_PER_MIN * minutes;
                Ok(())
            },
        )?;

        fold_rows(
            &conn,
            "SELECT substr(recorded_at, 1, 10) AS day, SUM(amount_ml)
             FROM water_logs
             WHERE user_id = ?1 AND substr(recorded_at, 1, 10) BETWEEN ?2 AND ?3
             GROUP BY day",
            user_id,
            &from,
            &to,
            &mut days,
            |s, row| {
                s.water_ml = row.get(1)?;
                Ok(())
            },
        )?;

        // Ascending order, so the day's latest reading wins
        fold_rows(
            &conn,
            "SELECT substr(recorded_at, 1, 10) AS day, weight_kg
             FROM body_metrics
             WHERE user_id = ?1 AND weight_kg IS NOT NULL
               AND substr(recorded_at, 1, 10) BETWEEN ?2 AND ?3
             ORDER BY recorded_at ASC",
            user_id,
            &from,
            &to,
            &mut days,
            |s, row| {
                s.weight_kg = row.get(1)?;
                Ok(())
            },
        )?;

        for (day, kcal) in exercise_kcal {
            if let Some(summary) = days.get_mut(&day) {
                summary.exercise_calories = kcal.round() as i64;
            }
        }

        Ok(days.into_values().rev().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use fitlog_core::models::{NewBodyMetric, NewFoodEntry, NewMeal, NewRun, NewSession, NewSet};

    fn at(day: NaiveDate, hour: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&day.and_hms_opt(hour, 0, 0).unwrap())
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_one_row_per_day_newest_first() {
        let store = Store::open_in_memory().unwrap();
        let rows = store.daily_summaries(1, d("2024-03-01"), d("2024-03-07")).unwrap();
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].date, d("2024-03-07"));
        assert_eq!(rows[6].date, d("2024-03-01"));
        assert!(rows.iter().all(|r| r.total_calories == 0 && r.weight_kg == 0.0));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.daily_summaries(1, d("2024-03-07"), d("2024-03-01")).is_err());
    }

    #[test]
    fn test_day_totals() {
        let store = Store::open_in_memory().unwrap();
        let day = d("2024-03-05");

        let meal = store
            .create_meal(1, NewMeal { name: Some("Lunch".into()), eaten_at: Some(at(day, 12)) })
            .unwrap();
        for (cal, p) in [(400, 30.0), (250, 10.0)] {
            store
                .add_entry(1, meal.id, NewFoodEntry { name: "x".into(), calories: cal, protein_g: p, ..Default::default() })
                .unwrap();
        }

        store
            .create_run(1, NewRun { start_time: Some(at(day, 7)), distance_meters: 5000.0, duration_seconds: 1500, ..Default::default() })
            .unwrap();

        // 30-minute session with two sets: calories must not double
        let session = store
            .create_session(1, NewSession { start_time: Some(at(day, 18)), notes: None })
            .unwrap();
        let bench = store.list_exercises().unwrap()[0].id;
        for _ in 0..2 {
            store
                .add_set(1, session.id, NewSet { exercise_id: bench, weight_kg: 100.0, reps: 5, rpe: None, performed_at: None })
                .unwrap();
        }
        store
            .finish_session(1, session.id, at(day, 18) + Duration::minutes(30))
            .unwrap();

        store
            .create_body_metric(1, NewBodyMetric { recorded_at: Some(at(day, 6)), weight_kg: Some(80.0), body_fat_percent: None })
            .unwrap();
        store
            .create_body_metric(1, NewBodyMetric { recorded_at: Some(at(day, 20)), weight_kg: Some(79.5), body_fat_percent: None })
            .unwrap();

        let rows = store.daily_summaries(1, day, day).unwrap();
        assert_eq!(rows.len(), 1);
        let s = &rows[0];
        assert_eq!(s.total_calories, 650);
        assert_eq!(s.total_protein, 40.0);
        assert_eq!(s.run_distance, 5000.0);
        assert_eq!(s.workout_volume_kg, 1000.0);
        // 5 km * 70 * 1.036 = 362.6, plus 6 * 30 = 180
        assert_eq!(s.exercise_calories, 543);
        assert_eq!(s.weight_kg, 79.5);
    }

    #[test]
    fn test_unfinished_session_ignored() {
        let store = Store::open_in_memory().unwrap();
        let day = d("2024-03-05");
        let session = store
            .create_session(1, NewSession { start_time: Some(at(day, 9)), notes: None })
            .unwrap();
        let bench = store.list_exercises().unwrap()[0].id;
        store
            .add_set(1, session.id, NewSet { exercise_id: bench, weight_kg: 50.0, reps: 10, rpe: None, performed_at: None })
            .unwrap();

        let rows = store.daily_summaries(1, day, day).unwrap();
        assert_eq!(rows[0].workout_volume_kg, 0.0);
        assert_eq!(rows[0].exercise_calories, 0);
    }
}
