//! Table definitions and first-run seed data

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

pub(crate) const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    height_cm REAL,
    dob TEXT,
    sex TEXT,
    activity_level TEXT,
    weight_goal TEXT,
    google_id TEXT UNIQUE,
    email TEXT,
    phone TEXT UNIQUE,
    firebase_uid TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS exercises (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    category TEXT NOT NULL,
    equipment TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS workout_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    start_time TEXT NOT NULL,
    end_time TEXT,
    notes TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sessions_user_start ON workout_sessions(user_id, start_time);

CREATE TABLE IF NOT EXISTS workout_sets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL REFERENCES workout_sessions(id) ON DELETE CASCADE,
    exercise_id INTEGER NOT NULL REFERENCES exercises(id),
    set_order INTEGER NOT NULL,
    weight_kg REAL NOT NULL DEFAULT 0,
    reps INTEGER NOT NULL DEFAULT 0,
    rpe REAL,
    performed_at TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sets_session ON workout_sets(session_id, set_order);

CREATE TABLE IF NOT EXISTS routines (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    notes TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS routine_exercises (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    routine_id INTEGER NOT NULL REFERENCES routines(id) ON DELETE CASCADE,
    exercise_id INTEGER NOT NULL REFERENCES exercises(id),
    exercise_order INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS shoes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    brand TEXT NOT NULL,
    model TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    start_time TEXT NOT NULL,
    duration_seconds INTEGER NOT NULL DEFAULT 0,
    distance_meters REAL NOT NULL DEFAULT 0,
    elevation_gain_meters REAL NOT NULL DEFAULT 0,
    avg_heart_rate INTEGER,
    cadence INTEGER,
    relative_effort INTEGER,
    shoe_id INTEGER REFERENCES shoes(id) ON DELETE SET NULL,
    steps INTEGER,
    route_data TEXT,
    run_type TEXT NOT NULL DEFAULT 'Run',
    notes TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_runs_user_start ON runs(user_id, start_time);

CREATE TABLE IF NOT EXISTS meals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT,
    eaten_at TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_meals_user_eaten ON meals(user_id, eaten_at);

CREATE TABLE IF NOT EXISTS food_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    meal_id INTEGER NOT NULL REFERENCES meals(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    calories INTEGER NOT NULL DEFAULT 0,
    protein_g REAL NOT NULL DEFAULT 0,
    carbs_g REAL NOT NULL DEFAULT 0,
    fat_g REAL NOT NULL DEFAULT 0,
    quantity TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS food_library (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    calories_per_100g REAL NOT NULL DEFAULT 0,
    protein_per_100g REAL NOT NULL DEFAULT 0,
    carbs_per_100g REAL NOT NULL DEFAULT 0,
    fat_per_100g REAL NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS water_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    amount_ml INTEGER NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS body_metrics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    recorded_at TEXT NOT NULL,
    weight_kg REAL,
    body_fat_percent REAL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_body_user_recorded ON body_metrics(user_id, recorded_at);
";

/// Starter exercise catalog: (name, category, equipment)
const STARTER_EXERCISES: &[(&str, &str, &str)] = &[
    ("Bench Press", "Chest", "Barbell"),
    ("Incline Dumbbell Press", "Chest", "Dumbbell"),
    ("Squat", "Legs", "Barbell"),
    ("Romanian Deadlift", "Legs", "Barbell"),
    ("Leg Press", "Legs", "Machine"),
    ("Deadlift", "Back", "Barbell"),
    ("Pull Up", "Back", "Bodyweight"),
    ("Barbell Row", "Back", "Barbell"),
    ("Lat Pulldown", "Back", "Cable"),
    ("Overhead Press", "Shoulders", "Barbell"),
    ("Lateral Raise", "Shoulders", "Dumbbell"),
    ("Barbell Curl", "Arms", "Barbell"),
    ("Tricep Pushdown", "Arms", "Cable"),
    ("Plank", "Core", "Bodyweight"),
];

/// Create tables, then seed the default user and exercise catalog when empty
pub(crate) fn migrate(conn: &Connection, now: DateTime<Utc>) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)?;

    let users: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    if users == 0 {
        tracing::info!("Seeding default user");
        conn.execute(
            "INSERT INTO users (name, height_cm, sex, created_at, updated_at)
             VALUES ('User', 175, 'M', ?1, ?1)",
            params![now],
        )?;
    }

    let exercises: i64 =
        conn.query_row("SELECT COUNT(*) FROM exercises", [], |row| row.get(0))?;
    if exercises == 0 {
        let mut stmt = conn.prepare(
            "INSERT OR IGNORE INTO exercises (name, category, equipment, created_at)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (name, category, equipment) in STARTER_EXERCISES {
            stmt.execute(params![name, category, equipment, now])?;
        }
        tracing::info!(count = STARTER_EXERCISES.len(), "Seeded exercise catalog");
    }

    Ok(())
}
