use serde::{Deserialize, Serialize};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

pub const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Meal slot a record is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// One confirmed consumption event. Created only after the user has
/// confirmed an analysis result; nutrition fields are never edited after
/// creation, the record is only ever deleted by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodRecord {
    pub id: Uuid,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Epoch milliseconds, assigned once at creation.
    pub timestamp_ms: i64,
    pub meal_type: MealType,
}

/// Derived per-day totals. Never stored; always recomputed from the log.
#[derive(Debug, Clone, Serialize)]
pub struct DailyAggregate {
    pub date: String,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    /// Records of the day, most recent first.
    pub meals: Vec<FoodRecord>,
}

/// Trailing 7-day window ending at the reference date, oldest day first.
#[derive(Debug, Serialize)]
pub struct WeeklySummary {
    pub days: Vec<DailyAggregate>,
    pub average_calories: i64,
    pub total_meals: usize,
}

pub fn parse_date(s: &str) -> Result<Date, time::error::Parse> {
    Date::parse(s, DATE_FORMAT)
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

pub fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
