//! REST entities and request payloads
//!
//! Every record here is owned and persisted by the server. Clients keep
//! transient copies that mirror the last successful response.
//!
//! Optional fields accept both `null` and absence on the wire.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Default run type for live and manual runs
pub const DEFAULT_RUN_TYPE: &str = "Run";

/// Run types offered by the manual run form
pub const RUN_TYPES: &[&str] = &["Run", "Race", "Long Run", "Recovery"];

// ===== Entities =====

/// User profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub height_cm: Option<f64>,
    /// Date of birth as `YYYY-MM-DD`
    #[serde(default)]
    pub dob: Option<String>,
    /// `"M"` or `"F"`
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub activity_level: Option<String>,
    #[serde(default)]
    pub weight_goal: Option<String>,
}

/// Exercise catalog entry
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub equipment: Option<String>,
}

/// A resistance-training session with its ordered sets
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSession {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub sets: Vec<WorkoutSet>,
}

impl WorkoutSession {
    /// Whether the session has been finished
    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }

    /// Session length in whole minutes, if finished
    pub fn duration_minutes(&self) -> Option<i64> {
        self.end_time
            .map(|end| (end - self.start_time).num_minutes().max(0))
    }
}

/// One set performed within a session
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSet {
    pub id: i64,
    #[serde(default)]
    pub session_id: i64,
    pub exercise_id: i64,
    #[serde(default)]
    pub exercise_name: Option<String>,
    #[serde(default)]
    pub set_order: i64,
    pub weight_kg: f64,
    pub reps: i64,
    #[serde(default)]
    pub rpe: Option<f64>,
    pub performed_at: DateTime<Utc>,
}

/// Named session template
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Routine {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub exercises: Vec<RoutineExercise>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoutineExercise {
    pub id: i64,
    pub exercise_id: i64,
    pub exercise_name: String,
    pub exercise_order: i64,
}

/// A recorded run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Run {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    pub duration_seconds: i64,
    pub distance_meters: f64,
    #[serde(default)]
    pub elevation_gain_meters: f64,
    #[serde(default)]
    pub avg_heart_rate: Option<i64>,
    #[serde(default)]
    pub cadence: Option<i64>,
    #[serde(default)]
    pub steps: Option<i64>,
    #[serde(default)]
    pub relative_effort: Option<i64>,
    #[serde(default)]
    pub shoe_id: Option<i64>,
    #[serde(default)]
    pub shoe_name: Option<String>,
    /// JSON array of `[lat, lon, alt, unix_secs]` samples
    #[serde(default)]
    pub route_data: Option<String>,
    #[serde(default)]
    pub run_type: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Run {
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }
}

/// Running shoe
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Shoe {
    pub id: i64,
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub is_active: bool,
}

impl Shoe {
    pub fn label(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}

/// A meal and its food entries
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Meal {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    pub eaten_at: DateTime<Utc>,
    #[serde(default)]
    pub entries: Vec<FoodEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FoodEntry {
    pub id: i64,
    pub meal_id: i64,
    pub name: String,
    pub calories: i64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    #[serde(default)]
    pub quantity: Option<String>,
}

/// Reusable per-100g nutrition template
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FoodLibraryItem {
    pub id: i64,
    pub name: String,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fat_per_100g: f64,
}

/// Timestamped body measurement
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BodyMetric {
    pub id: i64,
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub body_fat_percent: Option<f64>,
}

/// Server-computed aggregate for one calendar day
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_calories: i64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub run_distance: f64,
    pub workout_volume_kg: f64,
    pub exercise_calories: i64,
    pub water_ml: i64,
    pub weight_kg: f64,
}

impl DailySummary {
    /// An all-zero summary for a day with no activity
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_calories: 0,
            total_protein: 0.0,
            total_carbs: 0.0,
            total_fat: 0.0,
            run_distance: 0.0,
            workout_volume_kg: 0.0,
            exercise_calories: 0,
            water_ml: 0,
            weight_kg: 0.0,
        }
    }
}

// ===== Request payloads =====

/// Create or partially update the user profile.
///
/// On update, `name` only overwrites when non-empty and every other
/// field only when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_goal: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewExercise {
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FinishSession {
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

/// Body of both `POST /sessions/{id}/sets` and `PUT /sets/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewSet {
    #[serde(default)]
    pub exercise_id: i64,
    #[serde(default)]
    pub weight_kg: f64,
    #[serde(default)]
    pub reps: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewRoutine {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub exercise_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewRun {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_seconds: i64,
    #[serde(default)]
    pub distance_meters: f64,
    #[serde(default)]
    pub elevation_gain_meters: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_heart_rate: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_effort: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoe_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewShoe {
    pub brand: String,
    pub model: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewMeal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eaten_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RenameMeal {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewFoodEntry {
    pub name: String,
    #[serde(default)]
    pub calories: i64,
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub carbs_g: f64,
    #[serde(default)]
    pub fat_g: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewLibraryItem {
    pub name: String,
    #[serde(default)]
    pub calories_per_100g: f64,
    #[serde(default)]
    pub protein_per_100g: f64,
    #[serde(default)]
    pub carbs_per_100g: f64,
    #[serde(default)]
    pub fat_per_100g: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WaterLog {
    pub amount_ml: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewBodyMetric {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat_percent: Option<f64>,
}

/// Phone sign-in: a provider ID token exchanged for a session cookie
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PhoneLogin {
    #[serde(rename = "idToken", default)]
    pub id_token: String,
    #[serde(rename = "phoneNumber", default)]
    pub phone_number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    pub success: bool,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_accepts_nulls_and_missing_fields() {
        let json = r#"{"id":1,"name":"User","height_cm":175,"dob":null}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.height_cm, Some(175.0));
        assert!(user.dob.is_none());
        assert!(user.sex.is_none());
    }

    #[test]
    fn test_meal_without_entries() {
        let json = r#"{"id":3,"name":null,"eaten_at":"2024-05-01T12:30:00Z"}"#;
        let meal: Meal = serde_json::from_str(json).unwrap();
        assert!(meal.entries.is_empty());
        assert!(meal.name.is_none());
    }

    #[test]
    fn test_new_run_skips_unset_fields() {
        let run = NewRun {
            distance_meters: 5000.0,
            duration_seconds: 1500,
            ..Default::default()
        };
        let json = serde_json::to_value(&run).unwrap();
        assert!(json.get("shoe_id").is_none());
        assert_eq!(json["distance_meters"], 5000.0);
    }

    #[test]
    fn test_phone_login_uses_camel_case_keys() {
        let login = PhoneLogin {
            id_token: "tok".into(),
            phone_number: "+15550100".into(),
        };
        let json = serde_json::to_string(&login).unwrap();
        assert!(json.contains("\"idToken\":\"tok\""));
        assert!(json.contains("\"phoneNumber\""));
    }

    #[test]
    fn test_daily_summary_date_format() {
        let summary = DailySummary::empty(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["date"], "2024-03-09");
    }

    #[test]
    fn test_session_duration() {
        let start: DateTime<Utc> = "2024-01-01T10:00:00Z".parse().unwrap();
        let session = WorkoutSession {
            id: 1,
            start_time: start,
            end_time: Some(start + chrono::Duration::minutes(45)),
            notes: None,
            sets: vec![],
        };
        assert!(session.is_finished());
        assert_eq!(session.duration_minutes(), Some(45));
    }
}
