//! Exercises, workout sessions, sets and routines

use super::{ensure_owned, expect_changed, Store, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use fitlog_core::models::{
    Exercise, NewExercise, NewRoutine, NewSession, NewSet, Routine, RoutineExercise,
    WorkoutSession, WorkoutSet,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<WorkoutSession> {
    Ok(WorkoutSession {
        id: row.get(0)?,
        start_time: row.get(1)?,
        end_time: row.get(2)?,
        notes: row.get(3)?,
        sets: Vec::new(),
    })
}

fn set_from_row(row: &Row<'_>) -> rusqlite::Result<WorkoutSet> {
    Ok(WorkoutSet {
        id: row.get(0)?,
        session_id: row.get(1)?,
        exercise_id: row.get(2)?,
        exercise_name: row.get(3)?,
        set_order: row.get(4)?,
        weight_kg: row.get(5)?,
        reps: row.get(6)?,
        rpe: row.get(7)?,
        performed_at: row.get(8)?,
    })
}

const SET_SELECT: &str = "
    SELECT s.id, s.session_id, s.exercise_id, e.name, s.set_order, s.weight_kg, s.reps, s.rpe, s.performed_at
    FROM workout_sets s
    JOIN exercises e ON s.exercise_id = e.id";

fn sets_for_session(conn: &Connection, session_id: i64) -> StorageResult<Vec<WorkoutSet>> {
    let mut stmt = conn.prepare_cached(&format!(
        "{SET_SELECT} WHERE s.session_id = ?1 ORDER BY s.set_order ASC"
    ))?;
    let sets = stmt
        .query_map(params![session_id], set_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sets)
}

fn routine_exercises(conn: &Connection, routine_id: i64) -> StorageResult<Vec<RoutineExercise>> {
    let mut stmt = conn.prepare_cached(
        "SELECT re.id, re.exercise_id, e.name, re.exercise_order
         FROM routine_exercises re
         JOIN exercises e ON re.exercise_id = e.id
         WHERE re.routine_id = ?1
         ORDER BY re.exercise_order ASC",
    )?;
    let exercises = stmt
        .query_map(params![routine_id], |row| {
            Ok(RoutineExercise {
                id: row.get(0)?,
                exercise_id: row.get(1)?,
                exercise_name: row.get(2)?,
                exercise_order: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(exercises)
}

/// Owner of the session a set belongs to, `None` when the set is unknown
fn set_owner(conn: &Connection, set_id: i64) -> StorageResult<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT ws.user_id FROM workout_sets s
             JOIN workout_sessions ws ON s.session_id = ws.id
             WHERE s.id = ?1",
            params![set_id],
            |row| row.get(0),
        )
        .optional()?)
}

impl Store {
    // ==================== Exercises ====================

    pub fn list_exercises(&self) -> StorageResult<Vec<Exercise>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare_cached("SELECT id, name, category, equipment FROM exercises ORDER BY name ASC")?;
        let exercises = stmt
            .query_map([], |row| {
                Ok(Exercise {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    category: row.get(2)?,
                    equipment: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(exercises)
    }

    pub fn create_exercise(&self, new: NewExercise) -> StorageResult<Exercise> {
        if new.name.trim().is_empty() {
            return Err(StorageError::InvalidInput("exercise name is required".into()));
        }
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO exercises (name, category, equipment, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![new.name, new.category, new.equipment, Utc::now()],
        )?;
        Ok(Exercise {
            id: conn.last_insert_rowid(),
            name: new.name,
            category: new.category,
            equipment: new.equipment,
        })
    }

    // ==================== Sessions ====================

    /// Most recent sessions first, each with its sets in order
    pub fn list_sessions(&self, user_id: i64, limit: usize) -> StorageResult<Vec<WorkoutSession>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, start_time, end_time, notes FROM workout_sessions
             WHERE user_id = ?1 ORDER BY start_time DESC LIMIT ?2",
        )?;
        let mut sessions = stmt
            .query_map(params![user_id, limit as i64], session_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        for session in &mut sessions {
            session.sets = sets_for_session(&conn, session.id)?;
        }
        Ok(sessions)
    }

    pub fn get_session(&self, user_id: i64, id: i64) -> StorageResult<WorkoutSession> {
        let conn = self.conn()?;
        let mut session = conn
            .query_row(
                "SELECT id, start_time, end_time, notes FROM workout_sessions
                 WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                session_from_row,
            )
            .optional()?
            .ok_or(StorageError::not_found("Session", id))?;
        session.sets = sets_for_session(&conn, id)?;
        Ok(session)
    }

    pub fn create_session(&self, user_id: i64, new: NewSession) -> StorageResult<WorkoutSession> {
        let start_time = new.start_time.unwrap_or_else(Utc::now);
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO workout_sessions (user_id, start_time, notes, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, start_time, new.notes, Utc::now()],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(user_id, session_id = id, "Started session");
        Ok(WorkoutSession {
            id,
            start_time,
            end_time: None,
            notes: new.notes,
            sets: Vec::new(),
        })
    }

    pub fn finish_session(&self, user_id: i64, id: i64, end_time: DateTime<Utc>) -> StorageResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE workout_sessions SET end_time = ?1 WHERE id = ?2 AND user_id = ?3",
            params![end_time, id, user_id],
        )?;
        expect_changed(changed, "Session", id)
    }

    /// Delete a session; its sets go with it
    pub fn delete_session(&self, user_id: i64, id: i64) -> StorageResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM workout_sessions WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        expect_changed(changed, "Session", id)
    }

    // ==================== Sets ====================

    /// Append a set; `set_order` is one past the session's current set count
    pub fn add_set(&self, user_id: i64, session_id: i64, new: NewSet) -> StorageResult<WorkoutSet> {
        let conn = self.conn()?;
        ensure_owned(&conn, "workout_sessions", "Session", session_id, user_id)?;

        let exercise_name: String = conn
            .query_row(
                "SELECT name FROM exercises WHERE id = ?1",
                params![new.exercise_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StorageError::not_found("Exercise", new.exercise_id))?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM workout_sets WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        let set_order = count + 1;
        let performed_at = new.performed_at.unwrap_or_else(Utc::now);

        conn.execute(
            "INSERT INTO workout_sets (session_id, exercise_id, set_order, weight_kg, reps, rpe, performed_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                session_id,
                new.exercise_id,
                set_order,
                new.weight_kg,
                new.reps,
                new.rpe,
                performed_at,
                Utc::now()
            ],
        )?;

        Ok(WorkoutSet {
            id: conn.last_insert_rowid(),
            session_id,
            exercise_id: new.exercise_id,
            exercise_name: Some(exercise_name),
            set_order,
            weight_kg: new.weight_kg,
            reps: new.reps,
            rpe: new.rpe,
            performed_at,
        })
    }

    /// Overwrite load, reps and RPE of a set
    pub fn update_set(&self, user_id: i64, set_id: i64, update: NewSet) -> StorageResult<()> {
        let conn = self.conn()?;
        if set_owner(&conn, set_id)? != Some(user_id) {
            return Err(StorageError::not_found("Set", set_id));
        }
        conn.execute(
            "UPDATE workout_sets SET weight_kg = ?1, reps = ?2, rpe = ?3 WHERE id = ?4",
            params![update.weight_kg, update.reps, update.rpe, set_id],
        )?;
        Ok(())
    }

    pub fn delete_set(&self, user_id: i64, set_id: i64) -> StorageResult<()> {
        let conn = self.conn()?;
        if set_owner(&conn, set_id)? != Some(user_id) {
            return Err(StorageError::not_found("Set", set_id));
        }
        conn.execute("DELETE FROM workout_sets WHERE id = ?1", params![set_id])?;
        Ok(())
    }

    // ==================== Routines ====================

    pub fn list_routines(&self, user_id: i64) -> StorageResult<Vec<Routine>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, notes FROM routines WHERE user_id = ?1 ORDER BY name ASC",
        )?;
        let mut routines = stmt
            .query_map(params![user_id], |row| {
                Ok(Routine {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    notes: row.get(2)?,
                    exercises: Vec::new(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for routine in &mut routines {
            routine.exercises = routine_exercises(&conn, routine.id)?;
        }
        Ok(routines)
    }

    /// Create a routine; exercises keep the given order starting at 1
    pub fn create_routine(&self, user_id: i64, new: NewRoutine) -> StorageResult<Routine> {
        if new.name.trim().is_empty() {
            return Err(StorageError::InvalidInput("routine name is required".into()));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO routines (user_id, name, notes, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, new.name, new.notes, Utc::now()],
        )?;
        let routine_id = tx.last_insert_rowid();
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO routine_exercises (routine_id, exercise_id, exercise_order) VALUES (?1, ?2, ?3)",
            )?;
            for (i, exercise_id) in new.exercise_ids.iter().enumerate() {
                stmt.execute(params![routine_id, exercise_id, i as i64 + 1])?;
            }
        }
        tx.commit()?;

        Ok(Routine {
            id: routine_id,
            name: new.name,
            notes: new.notes,
            exercises: routine_exercises(&conn, routine_id)?,
        })
    }

    pub fn delete_routine(&self, user_id: i64, id: i64) -> StorageResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM routines WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        expect_changed(changed, "Routine", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bench_id(store: &Store) -> i64 {
        store
            .list_exercises()
            .unwrap()
            .into_iter()
            .find(|e| e.name == "Bench Press")
            .unwrap()
            .id
    }

    fn set(exercise_id: i64, weight: f64, reps: i64) -> NewSet {
        NewSet {
            exercise_id,
            weight_kg: weight,
            reps,
            rpe: None,
            performed_at: None,
        }
    }

    #[test]
    fn test_set_order_increments() {
        let store = Store::open_in_memory().unwrap();
        let bench = bench_id(&store);
        let session = store.create_session(1, NewSession::default()).unwrap();

        let a = store.add_set(1, session.id, set(bench, 60.0, 5)).unwrap();
        let b = store.add_set(1, session.id, set(bench, 62.5, 5)).unwrap();
        assert_eq!(a.set_order, 1);
        assert_eq!(b.set_order, 2);
        assert_eq!(b.exercise_name.as_deref(), Some("Bench Press"));

        let loaded = store.get_session(1, session.id).unwrap();
        assert_eq!(loaded.sets.len(), 2);
        assert_eq!(loaded.sets[1].weight_kg, 62.5);
    }

    #[test]
    fn test_update_and_delete_set() {
        let store = Store::open_in_memory().unwrap();
        let bench = bench_id(&store);
        let session = store.create_session(1, NewSession::default()).unwrap();
        let s = store.add_set(1, session.id, set(bench, 0.0, 0)).unwrap();

        let mut update = set(bench, 80.0, 8);
        update.rpe = Some(8.0);
        store.update_set(1, s.id, update).unwrap();
        let loaded = store.get_session(1, session.id).unwrap();
        assert_eq!(loaded.sets[0].reps, 8);
        assert_eq!(loaded.sets[0].rpe, Some(8.0));

        store.delete_set(1, s.id).unwrap();
        assert!(store.get_session(1, session.id).unwrap().sets.is_empty());
        assert!(matches!(store.delete_set(1, s.id), Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn test_sessions_are_scoped_to_user() {
        let store = Store::open_in_memory().unwrap();
        let other = store.user_by_phone("+15550101", "uid").unwrap();
        let session = store.create_session(1, NewSession::default()).unwrap();

        assert!(store.list_sessions(other.id, 20).unwrap().is_empty());
        assert!(store.add_set(other.id, session.id, set(bench_id(&store), 1.0, 1)).is_err());
        assert!(store.delete_session(other.id, session.id).is_err());
    }

    #[test]
    fn test_finish_and_delete_session_cascades() {
        let store = Store::open_in_memory().unwrap();
        let bench = bench_id(&store);
        let session = store.create_session(1, NewSession::default()).unwrap();
        store.add_set(1, session.id, set(bench, 50.0, 10)).unwrap();

        store.finish_session(1, session.id, Utc::now()).unwrap();
        assert!(store.get_session(1, session.id).unwrap().is_finished());

        store.delete_session(1, session.id).unwrap();
        let orphans: i64 = store
            .conn()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM workout_sets", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn test_list_sessions_newest_first_with_limit() {
        let store = Store::open_in_memory().unwrap();
        let now = Utc::now();
        for days in 0..3 {
            store
                .create_session(
                    1,
                    NewSession {
                        start_time: Some(now - chrono::Duration::days(days)),
                        notes: Some(format!("day -{days}")),
                    },
                )
                .unwrap();
        }
        let sessions = store.list_sessions(1, 2).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].notes.as_deref(), Some("day -0"));
    }

    #[test]
    fn test_routine_roundtrip() {
        let store = Store::open_in_memory().unwrap();
        let exercises = store.list_exercises().unwrap();
        let ids = vec![exercises[2].id, exercises[0].id];

        let routine = store
            .create_routine(1, NewRoutine { name: "Push".into(), notes: None, exercise_ids: ids.clone() })
            .unwrap();
        assert_eq!(routine.exercises.len(), 2);
        assert_eq!(routine.exercises[0].exercise_id, ids[0]);
        assert_eq!(routine.exercises[0].exercise_order, 1);

        assert_eq!(store.list_routines(1).unwrap().len(), 1);
        store.delete_routine(1, routine.id).unwrap();
        assert!(store.list_routines(1).unwrap().is_empty());
    }
}
