use serde::{Deserialize, Serialize};

use super::model::{DailyAggregate, MealType};

/// Body for committing a confirmed analysis result to the diary. The id and
/// timestamp are assigned server-side on creation.
#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub meal_type: MealType,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    /// YYYY-MM-DD; defaults to today in the diary's local offset.
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeeklyQuery {
    /// Last day of the 7-day window; defaults to today.
    #[serde(default)]
    pub end: Option<String>,
}

/// Today's aggregate plus progress against the configured calorie goal.
#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub today: DailyAggregate,
    pub calorie_goal: f64,
    /// Percentage of the goal consumed, capped at 100.
    pub goal_progress: f64,
}
