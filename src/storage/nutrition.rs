//! Meals, food entries, the food library and water intake

use super::{ensure_owned, expect_changed, Store, StorageError, StorageResult};
use chrono::Utc;
use fitlog_core::models::{FoodEntry, FoodLibraryItem, Meal, NewFoodEntry, NewLibraryItem, NewMeal};
use rusqlite::{params, Connection, OptionalExtension};

fn entries_for_meal(conn: &Connection, meal_id: i64) -> StorageResult<Vec<FoodEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, meal_id, name, calories, protein_g, carbs_g, fat_g, quantity
         FROM food_entries WHERE meal_id = ?1 ORDER BY id ASC",
    )?;
    let entries = stmt
        .query_map(params![meal_id], |row| {
            Ok(FoodEntry {
                id: row.get(0)?,
                meal_id: row.get(1)?,
                name: row.get(2)?,
                calories: row.get(3)?,
                protein_g: row.get(4)?,
                carbs_g: row.get(5)?,
                fat_g: row.get(6)?,
                quantity: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

impl Store {
    // ==================== Meals ====================

    /// Most recent meals first, each with its entries
    pub fn list_meals(&self, user_id: i64, limit: usize) -> StorageResult<Vec<Meal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, eaten_at FROM meals WHERE user_id = ?1 ORDER BY eaten_at DESC LIMIT ?2",
        )?;
        let mut meals = stmt
            .query_map(params![user_id, limit as i64], |row| {
                Ok(Meal {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    eaten_at: row.get(2)?,
                    entries: Vec::new(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for meal in &mut meals {
            meal.entries = entries_for_meal(&conn, meal.id)?;
        }
        Ok(meals)
    }

    pub fn create_meal(&self, user_id: i64, new: NewMeal) -> StorageResult<Meal> {
        let eaten_at = new.eaten_at.unwrap_or_else(Utc::now);
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO meals (user_id, name, eaten_at, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, new.name, eaten_at, Utc::now()],
        )?;
        Ok(Meal {
            id: conn.last_insert_rowid(),
            name: new.name,
            eaten_at,
            entries: Vec::new(),
        })
    }

    pub fn rename_meal(&self, user_id: i64, id: i64, name: &str) -> StorageResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE meals SET name = ?1 WHERE id = ?2 AND user_id = ?3",
            params![name, id, user_id],
        )?;
        expect_changed(changed, "Meal", id)
    }

    /// Delete a meal; its entries cascade
    pub fn delete_meal(&self, user_id: i64, id: i64) -> StorageResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM meals WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        expect_changed(changed, "Meal", id)
    }

    // ==================== Entries ====================

    pub fn add_entry(&self, user_id: i64, meal_id: i64, new: NewFoodEntry) -> StorageResult<FoodEntry> {
        if new.name.trim().is_empty() {
            return Err(StorageError::InvalidInput("food name is required".into()));
        }

        let conn = self.conn()?;
        ensure_owned(&conn, "meals", "Meal", meal_id, user_id)?;
        conn.execute(
            "INSERT INTO food_entries (meal_id, name, calories, protein_g, carbs_g, fat_g, quantity, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                meal_id,
                new.name,
                new.calories,
                new.protein_g,
                new.carbs_g,
                new.fat_g,
                new.quantity,
                Utc::now()
            ],
        )?;
        Ok(FoodEntry {
            id: conn.last_insert_rowid(),
            meal_id,
            name: new.name,
            calories: new.calories,
            protein_g: new.protein_g,
            carbs_g: new.carbs_g,
            fat_g: new.fat_g,
            quantity: new.quantity,
        })
    }

    pub fn delete_entry(&self, user_id: i64, id: i64) -> StorageResult<()> {
        let conn = self.conn()?;
        let owner: Option<i64> = conn
            .query_row(
                "SELECT m.user_id FROM food_entries fe JOIN meals m ON fe.meal_id = m.id WHERE fe.id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        if owner != Some(user_id) {
            return Err(StorageError::not_found("Food entry", id));
        }
        conn.execute("DELETE FROM food_entries WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ==================== Library ====================

    pub fn list_library(&self) -> StorageResult<Vec<FoodLibraryItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, calories_per_100g, protein_per_100g, carbs_per_100g, fat_per_100g
             FROM food_library ORDER BY name ASC",
        )?;
        let items = stmt
            .query_map([], |row| {
                Ok(FoodLibraryItem {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    calories_per_100g: row.get(2)?,
                    protein_per_100g: row.get(3)?,
                    carbs_per_100g: row.get(4)?,
                    fat_per_100g: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn create_library_item(&self, new: NewLibraryItem) -> StorageResult<FoodLibraryItem> {
        if new.name.trim().is_empty() {
            return Err(StorageError::InvalidInput("food name is required".into()));
        }
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO food_library (name, calories_per_100g, protein_per_100g, carbs_per_100g, fat_per_100g, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new.name,
                new.calories_per_100g,
                new.protein_per_100g,
                new.carbs_per_100g,
                new.fat_per_100g,
                Utc::now()
            ],
        )?;
        Ok(FoodLibraryItem {
            id: conn.last_insert_rowid(),
            name: new.name,
            calories_per_100g: new.calories_per_100g,
            protein_per_100g: new.protein_per_100g,
            carbs_per_100g: new.carbs_per_100g,
            fat_per_100g: new.fat_per_100g,
        })
    }

    // ==================== Water ====================

    pub fn log_water(&self, user_id: i64, amount_ml: i64) -> StorageResult<()> {
        if amount_ml <= 0 {
            return Err(StorageError::InvalidInput("amount_ml must be positive".into()));
        }
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO water_logs (user_id, amount_ml, recorded_at) VALUES (?1, ?2, ?3)",
            params![user_id, amount_ml, Utc::now()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitlog_core::nutrition::MacroTotals;

    fn entry(name: &str, calories: i64, protein: f64) -> NewFoodEntry {
        NewFoodEntry {
            name: name.into(),
            calories,
            protein_g: protein,
            carbs_g: 0.0,
            fat_g: 0.0,
            quantity: None,
        }
    }

    #[test]
    fn test_meal_with_entries() {
        let store = Store::open_in_memory().unwrap();
        let meal = store
            .create_meal(1, NewMeal { name: Some("Lunch".into()), eaten_at: None })
            .unwrap();
        store.add_entry(1, meal.id, entry("Rice", 200, 4.0)).unwrap();
        store.add_entry(1, meal.id, entry("Chicken", 300, 40.0)).unwrap();

        let meals = store.list_meals(1, 20).unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].entries.len(), 2);
        let totals = MacroTotals::of_meal(&meals[0]);
        assert_eq!(totals.calories, 500);
        assert_eq!(totals.protein_g, 44.0);
    }

    #[test]
    fn test_delete_meal_cascades_entries() {
        let store = Store::open_in_memory().unwrap();
        let meal = store.create_meal(1, NewMeal::default()).unwrap();
        let e = store.add_entry(1, meal.id, entry("Egg", 70, 6.0)).unwrap();

        store.delete_meal(1, meal.id).unwrap();
        assert!(store.list_meals(1, 20).unwrap().is_empty());
        assert!(store.delete_entry(1, e.id).is_err());
    }

    #[test]
    fn test_rename_and_delete_entry() {
        let store = Store::open_in_memory().unwrap();
        let meal = store.create_meal(1, NewMeal::default()).unwrap();
        let e = store.add_entry(1, meal.id, entry("Egg", 70, 6.0)).unwrap();

        store.rename_meal(1, meal.id, "Breakfast").unwrap();
        store.delete_entry(1, e.id).unwrap();

        let meals = store.list_meals(1, 20).unwrap();
        assert_eq!(meals[0].name.as_deref(), Some("Breakfast"));
        assert!(meals[0].entries.is_empty());
    }

    #[test]
    fn test_entry_requires_owned_meal() {
        let store = Store::open_in_memory().unwrap();
        let other = store.user_by_phone("+15550102", "uid").unwrap();
        let meal = store.create_meal(1, NewMeal::default()).unwrap();
        let err = store.add_entry(other.id, meal.id, entry("Egg", 70, 6.0)).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_library_sorted_by_name() {
        let store = Store::open_in_memory().unwrap();
        for name in ["Oats", "Banana"] {
            store
                .create_library_item(NewLibraryItem { name: name.into(), calories_per_100g: 100.0, ..Default::default() })
                .unwrap();
        }
        let names: Vec<String> = store.list_library().unwrap().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["Banana", "Oats"]);
    }

    #[test]
    fn test_water_must_be_positive() {
        let store = Store::open_in_memory().unwrap();
        store.log_water(1, 250).unwrap();
        assert!(store.log_water(1, 0).is_err());
    }
}
