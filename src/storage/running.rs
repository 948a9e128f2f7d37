//! Runs and shoes

use super::{ensure_owned, expect_changed, Store, StorageError, StorageResult};
use chrono::Utc;
use fitlog_core::models::{NewRun, NewShoe, Run, Shoe, DEFAULT_RUN_TYPE};
use rusqlite::{params, Connection, OptionalExtension, Row};

const RUN_SELECT: &str = "
    SELECT r.id, r.start_time, r.duration_seconds, r.distance_meters, r.elevation_gain_meters,
           r.avg_heart_rate, r.cadence, r.steps, r.relative_effort, r.shoe_id,
           s.brand || ' ' || s.model, r.route_data, r.run_type, r.notes
    FROM runs r
    LEFT JOIN shoes s ON r.shoe_id = s.id";

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<Run> {
    Ok(Run {
        id: row.get(0)?,
        start_time: row.get(1)?,
        duration_seconds: row.get(2)?,
        distance_meters: row.get(3)?,
        elevation_gain_meters: row.get(4)?,
        avg_heart_rate: row.get(5)?,
        cadence: row.get(6)?,
        steps: row.get(7)?,
        relative_effort: row.get(8)?,
        shoe_id: row.get(9)?,
        shoe_name: row.get(10)?,
        route_data: row.get(11)?,
        run_type: row.get(12)?,
        notes: row.get(13)?,
    })
}

fn find_run(conn: &Connection, user_id: i64, id: i64) -> StorageResult<Run> {
    conn.query_row(
        &format!("{RUN_SELECT} WHERE r.id = ?1 AND r.user_id = ?2"),
        params![id, user_id],
        run_from_row,
    )
    .optional()?
    .ok_or(StorageError::not_found("Run", id))
}

impl Store {
    /// Most recent runs first, with the shoe label joined in
    pub fn list_runs(&self, user_id: i64, limit: usize) -> StorageResult<Vec<Run>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&format!(
            "{RUN_SELECT} WHERE r.user_id = ?1 ORDER BY r.start_time DESC LIMIT ?2"
        ))?;
        let runs = stmt
            .query_map(params![user_id, limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }

    pub fn get_run(&self, user_id: i64, id: i64) -> StorageResult<Run> {
        let conn = self.conn()?;
        find_run(&conn, user_id, id)
    }

    /// Insert a run. Start time defaults to now and run type to `"Run"`.
    pub fn create_run(&self, user_id: i64, new: NewRun) -> StorageResult<Run> {
        if new.duration_seconds < 0 || new.distance_meters < 0.0 {
            return Err(StorageError::InvalidInput(
                "duration and distance must not be negative".into(),
            ));
        }

        let conn = self.conn()?;
        if let Some(shoe_id) = new.shoe_id {
            ensure_owned(&conn, "shoes", "Shoe", shoe_id, user_id)?;
        }

        let start_time = new.start_time.unwrap_or_else(Utc::now);
        let run_type = new
            .run_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_RUN_TYPE.to_string());

        conn.execute(
            "INSERT INTO runs (user_id, start_time, duration_seconds, distance_meters, elevation_gain_meters,
                               avg_heart_rate, cadence, relative_effort, shoe_id, steps, route_data,
                               run_type, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                user_id,
                start_time,
                new.duration_seconds,
                new.distance_meters,
                new.elevation_gain_meters,
                new.avg_heart_rate,
                new.cadence,
                new.relative_effort,
                new.shoe_id,
                new.steps,
                new.route_data,
                run_type,
                new.notes,
                Utc::now()
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(user_id, run_id = id, distance_m = new.distance_meters, "Recorded run");
        find_run(&conn, user_id, id)
    }

    pub fn delete_run(&self, user_id: i64, id: i64) -> StorageResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM runs WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        expect_changed(changed, "Run", id)
    }

    pub fn list_shoes(&self, user_id: i64) -> StorageResult<Vec<Shoe>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, brand, model, is_active FROM shoes WHERE user_id = ?1 ORDER BY id ASC",
        )?;
        let shoes = stmt
            .query_map(params![user_id], |row| {
                Ok(Shoe {
                    id: row.get(0)?,
                    brand: row.get(1)?,
                    model: row.get(2)?,
                    is_active: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(shoes)
    }

    pub fn create_shoe(&self, user_id: i64, new: NewShoe) -> StorageResult<Shoe> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO shoes (user_id, brand, model, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, new.brand, new.model, Utc::now()],
        )?;
        Ok(Shoe {
            id: conn.last_insert_rowid(),
            brand: new.brand,
            model: new.model,
            is_active: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_run_defaults_and_shoe_name() {
        let store = Store::open_in_memory().unwrap();
        let shoe = store
            .create_shoe(1, NewShoe { brand: "Nike".into(), model: "Pegasus".into() })
            .unwrap();

        let run = store
            .create_run(
                1,
                NewRun {
                    duration_seconds: 1500,
                    distance_meters: 5000.0,
                    shoe_id: Some(shoe.id),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(run.run_type.as_deref(), Some("Run"));
        assert_eq!(run.shoe_name.as_deref(), Some("Nike Pegasus"));
        assert!(Utc::now() - run.start_time < Duration::minutes(1));
    }

    #[test]
    fn test_route_data_stored_verbatim() {
        let store = Store::open_in_memory().unwrap();
        let route = "[[51.5,-0.12,10,1700000000],[51.5001,-0.12,11,1700000005]]";
        let run = store
            .create_run(
                1,
                NewRun {
                    duration_seconds: 5,
                    distance_meters: 11.1,
                    route_data: Some(route.into()),
                    steps: Some(8),
                    ..Default::default()
                },
            )
            .unwrap();
        let loaded = store.get_run(1, run.id).unwrap();
        assert_eq!(loaded.route_data.as_deref(), Some(route));
        assert_eq!(loaded.steps, Some(8));
    }

    #[test]
    fn test_list_runs_order_and_delete() {
        let store = Store::open_in_memory().unwrap();
        let now = Utc::now();
        for (days, meters) in [(3, 3000.0), (1, 1000.0), (2, 2000.0)] {
            store
                .create_run(
                    1,
                    NewRun {
                        start_time: Some(now - Duration::days(days)),
                        distance_meters: meters,
                        ..Default::default()
                    },
                )
                .unwrap();
        }

        let runs = store.list_runs(1, 100).unwrap();
        let distances: Vec<f64> = runs.iter().map(|r| r.distance_meters).collect();
        assert_eq!(distances, vec![1000.0, 2000.0, 3000.0]);

        store.delete_run(1, runs[0].id).unwrap();
        assert_eq!(store.list_runs(1, 100).unwrap().len(), 2);
        assert!(store.delete_run(1, runs[0].id).is_err());
    }

    #[test]
    fn test_negative_distance_rejected() {
        let store = Store::open_in_memory().unwrap();
        let err = store
            .create_run(1, NewRun { distance_meters: -1.0, ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)));
    }
}
