//! Users and sign-in lookups

use super::{expect_changed, Store, StorageError, StorageResult};
use chrono::Utc;
use fitlog_core::models::{User, UserPayload};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_COLUMNS: &str = "id, name, height_cm, dob, sex, activity_level, weight_goal";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        height_cm: row.get(2)?,
        dob: row.get(3)?,
        sex: row.get(4)?,
        activity_level: row.get(5)?,
        weight_goal: row.get(6)?,
    })
}

fn find_user(conn: &Connection, clause: &str, value: &dyn rusqlite::ToSql) -> StorageResult<Option<User>> {
    Ok(conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE {clause} = ?1"),
            params![value],
            user_from_row,
        )
        .optional()?)
}

impl Store {
    pub fn get_user(&self, id: i64) -> StorageResult<User> {
        let conn = self.conn()?;
        find_user(&conn, "id", &id)?.ok_or(StorageError::not_found("User", id))
    }

    pub fn create_user(&self, payload: UserPayload) -> StorageResult<User> {
        let name = payload.name.unwrap_or_default();
        if name.trim().is_empty() {
            return Err(StorageError::InvalidInput("name is required".into()));
        }

        let conn = self.conn()?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO users (name, height_cm, dob, sex, activity_level, weight_goal, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                name,
                payload.height_cm,
                payload.dob,
                payload.sex,
                payload.activity_level,
                payload.weight_goal,
                now
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(user_id = id, "Created user");
        find_user(&conn, "id", &id)?.ok_or(StorageError::not_found("User", id))
    }

    /// Partial update: `name` only when non-empty, other fields only when present
    pub fn update_user(&self, id: i64, payload: UserPayload) -> StorageResult<User> {
        let conn = self.conn()?;
        let current = find_user(&conn, "id", &id)?.ok_or(StorageError::not_found("User", id))?;

        let name = payload
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or(current.name);
        let height = payload.height_cm.or(current.height_cm);
        let dob = payload.dob.or(current.dob);
        let sex = payload.sex.or(current.sex);
        let activity = payload.activity_level.or(current.activity_level);
        let goal = payload.weight_goal.or(current.weight_goal);

        let changed = conn.execute(
            "UPDATE users SET name = ?1, height_cm = ?2, dob = ?3, sex = ?4,
                    activity_level = ?5, weight_goal = ?6, updated_at = ?7
             WHERE id = ?8",
            params![name, height, dob, sex, activity, goal, Utc::now(), id],
        )?;
        expect_changed(changed, "User", id)?;
        find_user(&conn, "id", &id)?.ok_or(StorageError::not_found("User", id))
    }

    /// Look up the account linked to a Google id, creating it on first sign-in
    pub fn user_by_google_id(&self, google_id: &str, email: &str, name: &str) -> StorageResult<User> {
        let conn = self.conn()?;
        if let Some(user) = find_user(&conn, "google_id", &google_id)? {
            return Ok(user);
        }

        let display = if name.is_empty() { "User" } else { name };
        conn.execute(
            "INSERT INTO users (name, google_id, email, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![display, google_id, email, Utc::now()],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(user_id = id, "Created user from Google sign-in");
        find_user(&conn, "id", &id)?.ok_or(StorageError::not_found("User", id))
    }

    /// Look up the account for a phone number, creating it on first sign-in.
    ///
    /// An account already bound to another provider subject is refused.
    pub fn user_by_phone(&self, phone: &str, firebase_uid: &str) -> StorageResult<User> {
        let conn = self.conn()?;
        if let Some(user) = find_user(&conn, "phone", &phone)? {
            let bound: Option<String> = conn.query_row(
                "SELECT firebase_uid FROM users WHERE id = ?1",
                params![user.id],
                |row| row.get(0),
            )?;
            if bound.as_deref().is_some_and(|uid| uid != firebase_uid) {
                tracing::warn!(user_id = user.id, "Phone sign-in with a foreign identity");
                return Err(StorageError::IdentityMismatch);
            }
            conn.execute(
                "UPDATE users SET firebase_uid = ?1 WHERE id = ?2 AND firebase_uid IS NULL",
                params![firebase_uid, user.id],
            )?;
            return Ok(user);
        }

        conn.execute(
            "INSERT INTO users (name, phone, firebase_uid, created_at, updated_at)
             VALUES ('User', ?1, ?2, ?3, ?3)",
            params![phone, firebase_uid, Utc::now()],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(user_id = id, "Created user from phone sign-in");
        find_user(&conn, "id", &id)?.ok_or(StorageError::not_found("User", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_keeps_unset_fields() {
        let store = Store::open_in_memory().unwrap();
        let updated = store
            .update_user(
                1,
                UserPayload {
                    name: Some(String::new()),
                    dob: Some("1990-05-01".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, "User");
        assert_eq!(updated.dob.as_deref(), Some("1990-05-01"));
        assert_eq!(updated.height_cm, Some(175.0));
    }

    #[test]
    fn test_create_requires_name() {
        let store = Store::open_in_memory().unwrap();
        let err = store.create_user(UserPayload::default()).unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)));

        let user = store
            .create_user(UserPayload { name: Some("Ana".into()), ..Default::default() })
            .unwrap();
        assert_eq!(user.id, 2);
    }

    #[test]
    fn test_phone_lookup_is_idempotent() {
        let store = Store::open_in_memory().unwrap();
        let first = store.user_by_phone("+15550100", "uid-1").unwrap();
        let again = store.user_by_phone("+15550100", "uid-1").unwrap();
        assert_eq!(first.id, again.id);
        assert_ne!(first.id, 1);
    }

    #[test]
    fn test_phone_bound_to_first_identity() {
        let store = Store::open_in_memory().unwrap();
        let alice = store.user_by_phone("+15550100", "alice").unwrap();

        let err = store.user_by_phone("+15550100", "mallory").unwrap_err();
        assert!(matches!(err, StorageError::IdentityMismatch));

        // The rightful owner still gets in
        assert_eq!(store.user_by_phone("+15550100", "alice").unwrap().id, alice.id);
    }

    #[test]
    fn test_google_lookup_creates_named_user() {
        let store = Store::open_in_memory().unwrap();
        let user = store.user_by_google_id("g-123", "a@example.com", "Ana").unwrap();
        assert_eq!(user.name, "Ana");
        let again = store.user_by_google_id("g-123", "a@example.com", "Other").unwrap();
        assert_eq!(again.id, user.id);
        assert_eq!(again.name, "Ana");
    }

    #[test]
    fn test_missing_user() {
        let store = Store::open_in_memory().unwrap();
        assert!(matches!(store.get_user(99), Err(StorageError::NotFound { .. })));
    }
}
