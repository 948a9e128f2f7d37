//! Nutrition math
//!
//! - Daily energy target from the Mifflin-St Jeor BMR, an activity
//!   multiplier and a weight-goal offset
//! - Portion scaling of per-100g library items into food entries
//! - Meal and day totals
//!
//! All functions are pure; callers supply "now" where a date matters.

use crate::models::{FoodEntry, FoodLibraryItem, Meal, NewFoodEntry, User};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Weight assumed when no body metric exists (kg)
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;

/// Calorie target shown when the profile is too incomplete to compute one
pub const FALLBACK_TARGET_KCAL: i64 = 2000;

/// Daily water goal (ml)
pub const WATER_GOAL_ML: i64 = 3000;

/// Activity level multiplier table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ActivityLevel {
    /// Office job, little exercise
    #[default]
    Sedentary,
    /// Light exercise 1-3 days/week
    LightlyActive,
    /// Moderate exercise 3-5 days/week
    ModeratelyActive,
    /// Hard exercise 6-7 days/week
    VeryActive,
    /// Very hard exercise or a physical job
    ExtraActive,
}

impl ActivityLevel {
    pub fn all() -> &'static [ActivityLevel] {
        &[
            ActivityLevel::Sedentary,
            ActivityLevel::LightlyActive,
            ActivityLevel::ModeratelyActive,
            ActivityLevel::VeryActive,
            ActivityLevel::ExtraActive,
        ]
    }

    /// Parse the stored label; unknown labels map to `None`
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Sedentary" => Some(ActivityLevel::Sedentary),
            "Lightly Active" => Some(ActivityLevel::LightlyActive),
            "Moderately Active" => Some(ActivityLevel::ModeratelyActive),
            "Very Active" => Some(ActivityLevel::VeryActive),
            "Extra Active" => Some(ActivityLevel::ExtraActive),
            _ => None,
        }
    }

    /// Label stored on the user record
    pub fn label(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::LightlyActive => "Lightly Active",
            ActivityLevel::ModeratelyActive => "Moderately Active",
            ActivityLevel::VeryActive => "Very Active",
            ActivityLevel::ExtraActive => "Extra Active",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Office job, little exercise",
            ActivityLevel::LightlyActive => "Light exercise 1-3 days/week",
            ActivityLevel::ModeratelyActive => "Moderate exercise 3-5 days/week",
            ActivityLevel::VeryActive => "Hard exercise 6-7 days/week",
            ActivityLevel::ExtraActive => "Very hard exercise, physical job",
        }
    }

    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }
}

/// Weight goal offset table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum WeightGoal {
    LoseWeight,
    #[default]
    Maintain,
    GainWeight,
}

impl WeightGoal {
    pub fn all() -> &'static [WeightGoal] {
        &[WeightGoal::LoseWeight, WeightGoal::Maintain, WeightGoal::GainWeight]
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Lose Weight" => Some(WeightGoal::LoseWeight),
            "Maintain" => Some(WeightGoal::Maintain),
            "Gain Weight" => Some(WeightGoal::GainWeight),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeightGoal::LoseWeight => "Lose Weight",
            WeightGoal::Maintain => "Maintain",
            WeightGoal::GainWeight => "Gain Weight",
        }
    }

    /// kcal added to maintenance
    pub fn offset(&self) -> f64 {
        match self {
            WeightGoal::LoseWeight => -500.0,
            WeightGoal::Maintain => 0.0,
            WeightGoal::GainWeight => 500.0,
        }
    }
}

/// Basal Metabolic Rate (Mifflin-St Jeor).
///
/// `10w + 6.25h - 5a`, then `+5` for `"M"` and `-161` for anything else.
pub fn mifflin_st_jeor(weight_kg: f64, height_cm: f64, age: i32, sex: Option<&str>) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age as f64;
    if sex == Some("M") {
        base + 5.0
    } else {
        base - 161.0
    }
}

/// Result of an energy target calculation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EnergyTarget {
    /// Unrounded BMR in kcal/day
    pub bmr: f64,
    /// `round(bmr * factor)`
    pub maintenance: i64,
    /// `round(bmr * factor + offset)`
    pub target: i64,
}

impl EnergyTarget {
    pub fn compute(
        weight_kg: f64,
        height_cm: f64,
        age: i32,
        sex: Option<&str>,
        activity: ActivityLevel,
        goal: WeightGoal,
    ) -> Self {
        let bmr = mifflin_st_jeor(weight_kg, height_cm, age, sex);
        let maintenance = bmr * activity.factor();
        Self {
            bmr,
            maintenance: maintenance.round() as i64,
            target: (maintenance + goal.offset()).round() as i64,
        }
    }

    /// Target for a user profile.
    ///
    /// Returns `None` when height or date of birth is missing. Unknown
    /// activity or goal labels fall back to Sedentary and Maintain.
    pub fn for_user(user: &User, weight_kg: Option<f64>, today: NaiveDate) -> Option<Self> {
        let height = user.height_cm?;
        let year = user.dob.as_deref().and_then(birth_year)?;
        let age = today.year() - year;

        let activity = user
            .activity_level
            .as_deref()
            .and_then(ActivityLevel::from_label)
            .unwrap_or_default();
        let goal = user
            .weight_goal
            .as_deref()
            .and_then(WeightGoal::from_label)
            .unwrap_or_default();

        // A zero weight on a daily summary means "no reading"
        let weight = weight_kg.filter(|w| *w > 0.0).unwrap_or(DEFAULT_WEIGHT_KG);

        Some(Self::compute(
            weight,
            height,
            age,
            user.sex.as_deref(),
            activity,
            goal,
        ))
    }
}

/// Year of a `YYYY-MM-DD` or RFC 3339 date string
pub fn birth_year(dob: &str) -> Option<i32> {
    dob.get(..4)?.parse().ok()
}

/// Scale a per-100g library item to a portion in grams
pub fn portion_entry(item: &FoodLibraryItem, grams: f64) -> NewFoodEntry {
    let factor = grams / 100.0;
    let one_decimal = |v: f64| (v * factor * 10.0).round() / 10.0;
    let amount = format_grams(grams);

    NewFoodEntry {
        name: format!("{} ({}g)", item.name, amount),
        calories: (item.calories_per_100g * factor).round() as i64,
        protein_g: one_decimal(item.protein_per_100g),
        carbs_g: one_decimal(item.carbs_per_100g),
        fat_g: one_decimal(item.fat_per_100g),
        quantity: Some(format!("{}g", amount)),
    }
}

/// `150` stays `150`, `42.5` stays `42.5`
fn format_grams(grams: f64) -> String {
    if grams.fract() == 0.0 {
        format!("{}", grams as i64)
    } else {
        format!("{}", grams)
    }
}

/// Summed calories and macros
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MacroTotals {
    pub calories: i64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl MacroTotals {
    pub fn of_entries<'a>(entries: impl IntoIterator<Item = &'a FoodEntry>) -> Self {
        entries.into_iter().fold(Self::default(), |mut acc, e| {
            acc.calories += e.calories;
            acc.protein_g += e.protein_g;
            acc.carbs_g += e.carbs_g;
            acc.fat_g += e.fat_g;
            acc
        })
    }

    pub fn of_meal(meal: &Meal) -> Self {
        Self::of_entries(&meal.entries)
    }

    /// Totals over meals eaten on `day` (UTC)
    pub fn of_day(meals: &[Meal], day: NaiveDate) -> Self {
        Self::of_entries(
            meals
                .iter()
                .filter(|m| m.eaten_at.date_naive() == day)
                .flat_map(|m| m.entries.iter()),
        )
    }
}

/// Calories left for the day: target minus eaten plus burned
pub fn remaining_calories(target: i64, eaten: i64, exercise_calories: i64) -> i64 {
    target - eaten + exercise_calories
}

/// Percentage of `value` against `goal`, unclamped
pub fn progress_percent(value: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        0.0
    } else {
        value / goal * 100.0
    }
}

/// Meals eaten on the same UTC day as `now`
pub fn meals_on_day(meals: &[Meal], now: DateTime<Utc>) -> Vec<&Meal> {
    let day = now.date_naive();
    meals.iter().filter(|m| m.eaten_at.date_naive() == day).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(height: Option<f64>, dob: Option<&str>) -> User {
        User {
            id: 1,
            name: "Test".into(),
            height_cm: height,
            dob: dob.map(String::from),
            sex: Some("M".into()),
            activity_level: Some("Sedentary".into()),
            weight_goal: Some("Maintain".into()),
        }
    }

    fn entry(calories: i64, protein: f64) -> FoodEntry {
        FoodEntry {
            id: 0,
            meal_id: 1,
            name: "x".into(),
            calories,
            protein_g: protein,
            carbs_g: 1.0,
            fat_g: 0.5,
            quantity: None,
        }
    }

    #[test]
    fn test_bmr_male_reference() {
        let bmr = mifflin_st_jeor(70.0, 175.0, 30, Some("M"));
        assert!((bmr - 1648.75).abs() < 1e-9);
    }

    #[test]
    fn test_bmr_terms() {
        let base = mifflin_st_jeor(0.0, 0.0, 0, Some("M"));
        assert_eq!(base, 5.0);
        assert_eq!(mifflin_st_jeor(1.0, 0.0, 0, Some("M")) - base, 10.0);
        assert_eq!(mifflin_st_jeor(0.0, 1.0, 0, Some("M")) - base, 6.25);
        assert_eq!(mifflin_st_jeor(0.0, 0.0, 1, Some("M")) - base, -5.0);
        assert_eq!(mifflin_st_jeor(0.0, 0.0, 0, Some("F")), -161.0);
    }

    #[test]
    fn test_bmr_female_offset() {
        let bmr = mifflin_st_jeor(60.0, 165.0, 25, Some("F"));
        assert!((bmr - (600.0 + 1031.25 - 125.0 - 161.0)).abs() < 1e-9);
        // Anything other than "M" uses the female constant
        assert_eq!(mifflin_st_jeor(60.0, 165.0, 25, None), bmr);
    }

    #[test]
    fn test_sedentary_maintain_target() {
        let t = EnergyTarget::compute(
            70.0,
            175.0,
            30,
            Some("M"),
            ActivityLevel::Sedentary,
            WeightGoal::Maintain,
        );
        assert_eq!(t.maintenance, 1979);
        assert_eq!(t.target, 1979);
    }

    #[test]
    fn test_goal_offsets() {
        let lose = EnergyTarget::compute(
            80.0,
            180.0,
            40,
            Some("M"),
            ActivityLevel::ModeratelyActive,
            WeightGoal::LoseWeight,
        );
        let gain = EnergyTarget::compute(
            80.0,
            180.0,
            40,
            Some("M"),
            ActivityLevel::ModeratelyActive,
            WeightGoal::GainWeight,
        );
        assert_eq!(gain.target - lose.target, 1000);
        assert_eq!(lose.maintenance, gain.maintenance);
    }

    #[test]
    fn test_for_user_uses_year_difference() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let u = user(Some(175.0), Some("1994-12-31"));
        let t = EnergyTarget::for_user(&u, Some(70.0), today).unwrap();
        assert_eq!(t.target, 1979);

        // RFC 3339 dates are accepted too
        let u = user(Some(175.0), Some("1994-06-01T00:00:00.000Z"));
        assert_eq!(EnergyTarget::for_user(&u, Some(70.0), today).unwrap().target, 1979);
    }

    #[test]
    fn test_for_user_defaults_weight() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let u = user(Some(175.0), Some("1994-01-01"));
        let missing = EnergyTarget::for_user(&u, None, today).unwrap();
        let zero = EnergyTarget::for_user(&u, Some(0.0), today).unwrap();
        assert_eq!(missing, zero);
        assert_eq!(missing.target, 1979);
    }

    #[test]
    fn test_for_user_incomplete_profile() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(EnergyTarget::for_user(&user(None, Some("1990-01-01")), None, today).is_none());
        assert!(EnergyTarget::for_user(&user(Some(170.0), None), None, today).is_none());
    }

    #[test]
    fn test_unknown_labels_fall_back() {
        assert_eq!(ActivityLevel::from_label("Couch"), None);
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut u = user(Some(175.0), Some("1994-01-01"));
        u.activity_level = Some("Couch".into());
        u.weight_goal = None;
        assert_eq!(EnergyTarget::for_user(&u, Some(70.0), today).unwrap().target, 1979);
    }

    #[test]
    fn test_label_round_trip() {
        for level in ActivityLevel::all() {
            assert_eq!(ActivityLevel::from_label(level.label()), Some(*level));
        }
        for goal in WeightGoal::all() {
            assert_eq!(WeightGoal::from_label(goal.label()), Some(*goal));
        }
    }

    #[test]
    fn test_portion_scaling() {
        let item = FoodLibraryItem {
            id: 1,
            name: "Oats".into(),
            calories_per_100g: 389.0,
            protein_per_100g: 16.9,
            carbs_per_100g: 66.3,
            fat_per_100g: 6.9,
        };
        let e = portion_entry(&item, 200.0);
        assert_eq!(e.name, "Oats (200g)");
        assert_eq!(e.quantity.as_deref(), Some("200g"));
        assert_eq!(e.calories, 778);
        assert!((e.protein_g - 33.8).abs() < 1e-9);
        assert!((e.carbs_g - 132.6).abs() < 1e-9);
        assert!((e.fat_g - 13.8).abs() < 1e-9);

        let half = portion_entry(&item, 42.5);
        assert_eq!(half.name, "Oats (42.5g)");
    }

    #[test]
    fn test_meal_totals_count_each_entry_once() {
        let meal = Meal {
            id: 1,
            name: Some("Lunch".into()),
            eaten_at: Utc::now(),
            entries: vec![entry(300, 20.0), entry(150, 5.5)],
        };
        let totals = MacroTotals::of_meal(&meal);
        assert_eq!(totals.calories, 450);
        assert!((totals.protein_g - 25.5).abs() < 1e-9);
        assert!((totals.fat_g - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_day_totals_filter_by_date() {
        let today: DateTime<Utc> = "2024-05-10T12:00:00Z".parse().unwrap();
        let yesterday: DateTime<Utc> = "2024-05-09T20:00:00Z".parse().unwrap();
        let meals = vec![
            Meal {
                id: 1,
                name: None,
                eaten_at: today,
                entries: vec![entry(500, 30.0)],
            },
            Meal {
                id: 2,
                name: None,
                eaten_at: yesterday,
                entries: vec![entry(900, 10.0)],
            },
        ];
        assert_eq!(MacroTotals::of_day(&meals, today.date_naive()).calories, 500);
        assert_eq!(meals_on_day(&meals, today).len(), 1);
    }

    #[test]
    fn test_remaining_and_progress() {
        assert_eq!(remaining_calories(2000, 1500, 300), 800);
        assert_eq!(remaining_calories(2000, 2600, 0), -600);
        assert_eq!(progress_percent(1500.0, 3000.0), 50.0);
        assert_eq!(progress_percent(10.0, 0.0), 0.0);
    }
}
