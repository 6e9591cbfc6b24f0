use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use time::Date;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::state::AppState;

use super::dto::{CreateRecordRequest, DailyQuery, TodayResponse, WeeklyQuery};
use super::model::{now_ms, parse_date, DailyAggregate, FoodRecord, WeeklySummary};

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/diary", get(list_records))
        .route("/diary/daily", get(daily))
        .route("/diary/weekly", get(weekly))
        .route("/diary/today", get(today))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/diary", post(create_record).delete(clear_diary))
        .route("/diary/:id", delete(delete_record))
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn list_records(State(state): State<AppState>) -> Json<Vec<FoodRecord>> {
    Json(state.diary.list())
}

/// POST /diary — commit a user-confirmed estimate as a record.
#[instrument(skip(state, body))]
pub async fn create_record(
    State(state): State<AppState>,
    Json(body): Json<CreateRecordRequest>,
) -> Result<(StatusCode, Json<FoodRecord>), (StatusCode, String)> {
    if body.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name is required".into()));
    }
    for (field, value) in [
        ("calories", body.calories),
        ("protein", body.protein),
        ("carbs", body.carbs),
        ("fat", body.fat),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("{field} must be a non-negative number"),
            ));
        }
    }

    let record = FoodRecord {
        id: Uuid::new_v4(),
        name: body.name.trim().to_string(),
        calories: body.calories,
        protein: body.protein,
        carbs: body.carbs,
        fat: body.fat,
        image_url: body.image_url,
        timestamp_ms: now_ms(),
        meal_type: body.meal_type,
    };
    state.diary.append(record.clone()).map_err(internal)?;
    info!(id = %record.id, name = %record.name, calories = record.calories, "record added to diary");

    Ok((StatusCode::CREATED, Json(record)))
}

#[instrument(skip(state))]
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.diary.remove(id).map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn clear_diary(
    State(state): State<AppState>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.diary.clear().map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn daily(
    State(state): State<AppState>,
    Query(q): Query<DailyQuery>,
) -> Result<Json<DailyAggregate>, (StatusCode, String)> {
    let date = resolve_date(&state, q.date.as_deref())?;
    Ok(Json(state.diary.daily_aggregate(date)))
}

#[instrument(skip(state))]
pub async fn weekly(
    State(state): State<AppState>,
    Query(q): Query<WeeklyQuery>,
) -> Result<Json<WeeklySummary>, (StatusCode, String)> {
    let end = resolve_date(&state, q.end.as_deref())?;
    Ok(Json(state.diary.weekly_summary(end)))
}

#[instrument(skip(state))]
pub async fn today(State(state): State<AppState>) -> Json<TodayResponse> {
    let aggregate = state.diary.daily_aggregate(state.diary.today());
    let goal = state.config.daily_calorie_goal;
    let progress = if goal > 0.0 {
        (aggregate.total_calories / goal * 100.0).min(100.0)
    } else {
        0.0
    };
    Json(TodayResponse {
        today: aggregate,
        calorie_goal: goal,
        goal_progress: progress,
    })
}

fn resolve_date(state: &AppState, raw: Option<&str>) -> Result<Date, (StatusCode, String)> {
    match raw {
        Some(s) => parse_date(s)
            .map_err(|_| (StatusCode::BAD_REQUEST, "date must be YYYY-MM-DD".into())),
        None => Ok(state.diary.today()),
    }
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    tracing::error!(error = %e, "diary operation failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary::model::MealType;

    fn create_body(name: &str, calories: f64) -> CreateRecordRequest {
        CreateRecordRequest {
            name: name.into(),
            calories,
            protein: 15.0,
            carbs: 70.0,
            fat: 8.0,
            meal_type: MealType::Lunch,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn create_then_list_shows_the_record() {
        let state = AppState::fake();

        let (status, Json(created)) =
            create_record(State(state.clone()), Json(create_body("Rice and beans", 450.0)))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.name, "Rice and beans");

        let Json(listed) = list_records(State(state)).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
    }

    #[tokio::test]
    async fn create_rejects_negative_nutrition() {
        let state = AppState::fake();
        let mut body = create_body("Mystery", 100.0);
        body.fat = -1.0;
        let (status, message) = create_record(State(state.clone()), Json(body)).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("fat"));
        assert!(state.diary.list().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let state = AppState::fake();
        let (status, _) = create_record(State(state), Json(create_body("   ", 100.0)))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn daily_rejects_malformed_dates() {
        let state = AppState::fake();
        let q = DailyQuery {
            date: Some("03/10/2024".into()),
        };
        let (status, _) = daily(State(state), Query(q)).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn weekly_returns_seven_days_for_an_explicit_end() {
        let state = AppState::fake();
        let q = WeeklyQuery {
            end: Some("2024-03-10".into()),
        };
        let Json(summary) = weekly(State(state), Query(q)).await.unwrap();
        assert_eq!(summary.days.len(), 7);
        assert_eq!(summary.days[0].date, "2024-03-04");
        assert_eq!(summary.days[6].date, "2024-03-10");
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_a_no_op() {
        let state = AppState::fake();
        let status = delete_record(State(state), Path(Uuid::new_v4())).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn today_reports_goal_progress() {
        let state = AppState::fake();
        create_record(State(state.clone()), Json(create_body("Feijoada", 1000.0)))
            .await
            .unwrap();

        let Json(resp) = today(State(state)).await;
        assert_eq!(resp.calorie_goal, 2000.0);
        assert_eq!(resp.goal_progress, 50.0);
        assert_eq!(resp.today.total_calories, 1000.0);
    }
}
