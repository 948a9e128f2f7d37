//! Body metrics

use super::{Store, StorageError, StorageResult};
use chrono::Utc;
use fitlog_core::models::{BodyMetric, NewBodyMetric};
use rusqlite::{params, OptionalExtension};

impl Store {
    /// Most recent readings first
    pub fn list_body_metrics(&self, user_id: i64, limit: usize) -> StorageResult<Vec<BodyMetric>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, recorded_at, weight_kg, body_fat_percent FROM body_metrics
             WHERE user_id = ?1 ORDER BY recorded_at DESC LIMIT ?2",
        )?;
        let metrics = stmt
            .query_map(params![user_id, limit as i64], |row| {
                Ok(BodyMetric {
                    id: row.get(0)?,
                    recorded_at: row.get(1)?,
                    weight_kg: row.get(2)?,
                    body_fat_percent: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(metrics)
    }

    pub fn create_body_metric(&self, user_id: i64, new: NewBodyMetric) -> StorageResult<BodyMetric> {
        if new.weight_kg.is_none() && new.body_fat_percent.is_none() {
            return Err(StorageError::InvalidInput(
                "weight_kg or body_fat_percent is required".into(),
            ));
        }

        let recorded_at = new.recorded_at.unwrap_or_else(Utc::now);
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO body_metrics (user_id, recorded_at, weight_kg, body_fat_percent, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, recorded_at, new.weight_kg, new.body_fat_percent, Utc::now()],
        )?;
        Ok(BodyMetric {
            id: conn.last_insert_rowid(),
            recorded_at,
            weight_kg: new.weight_kg,
            body_fat_percent: new.body_fat_percent,
        })
    }

    /// Latest recorded weight, if any reading carries one
    pub fn latest_weight(&self, user_id: i64) -> StorageResult<Option<f64>> {
        let conn = self.conn()?;
        let weight = conn
            .query_row(
                "SELECT weight_kg FROM body_metrics
                 WHERE user_id = ?1 AND weight_kg IS NOT NULL
                 ORDER BY recorded_at DESC LIMIT 1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_latest_weight_skips_fat_only_readings() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.latest_weight(1).unwrap(), None);

        let now = Utc::now();
        store
            .create_body_metric(1, NewBodyMetric { recorded_at: Some(now - Duration::days(2)), weight_kg: Some(80.0), body_fat_percent: None })
            .unwrap();
        store
            .create_body_metric(1, NewBodyMetric { recorded_at: Some(now - Duration::days(1)), weight_kg: Some(79.2), body_fat_percent: None })
            .unwrap();
        store
            .create_body_metric(1, NewBodyMetric { recorded_at: Some(now), weight_kg: None, body_fat_percent: Some(18.0) })
            .unwrap();

        assert_eq!(store.latest_weight(1).unwrap(), Some(79.2));
        let listed = store.list_body_metrics(1, 50).unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].body_fat_percent, Some(18.0));
    }

    #[test]
    fn test_empty_reading_rejected() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.create_body_metric(1, NewBodyMetric::default()).is_err());
    }
}
