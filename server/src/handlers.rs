// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::{AppState, database};
use axum::{
    extract::{
        Json, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use common::{
    BatchStatusPayload, BatchStatusResponse, ClearCompletedResponse, CreateTaskPayload, DayWindow,
    QuickTaskPayload, Task, TaskStats, UpdateTaskPayload, ValidationError, ViewParams,
    completed_ids, compute_stats, filter_tasks,
};
use tracing::{debug, error, info};

/// Handler for listing tasks, sorted by due date.
/// Optional `status`, `search` and `date` query parameters narrow the list.
pub async fn list_tasks(
    State(state): State<AppState>,
    params: Result<Query<ViewParams>, QueryRejection>,
) -> Result<Json<Vec<Task>>, AppError> {
    let Query(params) = params?;
    let tasks = database::list_tasks_from_db(&state.pool).await?;

    let tasks = if params == ViewParams::default() {
        tasks
    } else {
        let window = DayWindow::new(Utc::now(), state.utc_offset);
        filter_tasks(&tasks, &params, &window)
    };

    info!("Successfully retrieved {} tasks.", tasks.len());
    Ok(Json(tasks))
}

/// Handler for fetching a single task by ID.
pub async fn get_task(
    State(state): State<AppState>,
    task_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Task>, AppError> {
    let Path(task_id) = task_id?;
    match database::get_task_from_db(&state.pool, task_id).await? {
        Some(task) => Ok(Json(task)),
        None => Err(AppError::not_found(task_id)),
    }
}

/// Handler for creating a new task.
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let Json(payload) = payload?;
    debug!("Received request to create task: {:?}", payload.description);

    let new_task = payload.validate()?;
    let task = database::create_task_in_db(&state.pool, new_task).await?;

    info!("Task created successfully with ID: {}", task.id);

    // Return a 201 Created status with the new task as JSON.
    Ok((StatusCode::CREATED, Json(task)))
}

/// Handler for creating a task from free text; the due date is parsed out of it.
/// Falls back to the current time when the text contains no date.
pub async fn quick_create_task(
    State(state): State<AppState>,
    payload: Result<Json<QuickTaskPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let Json(payload) = payload?;
    let text = payload.text()?;

    let now = Utc::now();
    let date = match state.date_parser.parse(text, now) {
        Some(found) => {
            debug!("Parsed '{}' as {}", found.matched, found.date);
            found.date
        }
        None => {
            debug!("No date found in '{}', using now.", text);
            now
        }
    };

    let new_task = CreateTaskPayload {
        description: Some(text.to_string()),
        date: Some(date),
        category: payload.category,
        priority: payload.priority,
        completed: None,
    }
    .validate()?;
    let task = database::create_task_in_db(&state.pool, new_task).await?;

    info!("Quick task created successfully with ID: {}", task.id);
    Ok((StatusCode::CREATED, Json(task)))
}

/// Handler for partially updating a task.
pub async fn update_task(
    State(state): State<AppState>,
    task_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateTaskPayload>, JsonRejection>,
) -> Result<Json<Task>, AppError> {
    let Path(task_id) = task_id?;
    let Json(payload) = payload?;
    let changes = payload.validate()?;

    let updated = if changes.is_empty() {
        database::get_task_from_db(&state.pool, task_id).await?
    } else {
        database::update_task_in_db(&state.pool, task_id, &changes).await?
    };

    match updated {
        Some(task) => {
            info!("Task with ID {} updated successfully.", task_id);
            Ok(Json(task))
        }
        None => Err(AppError::not_found(task_id)),
    }
}

/// Handler for deleting a task by ID.
pub async fn delete_task(
    State(state): State<AppState>,
    task_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Path(task_id) = task_id?;
    debug!("Attempting to delete task with ID: {}", task_id);

    if !database::delete_task_in_db(&state.pool, task_id).await? {
        return Err(AppError::not_found(task_id));
    }

    info!("Task with ID {} deleted successfully.", task_id);
    Ok(Json(serde_json::json!({
        "message": "Task deleted successfully",
        "id": task_id
    })))
}

/// Handler for marking every task completed or uncompleted.
pub async fn set_batch_status(
    State(state): State<AppState>,
    payload: Result<Json<BatchStatusPayload>, JsonRejection>,
) -> Result<Json<BatchStatusResponse>, AppError> {
    let Json(payload) = payload?;
    let completed = payload.completed.ok_or(ValidationError::MissingCompleted)?;

    let modified_count = database::set_all_completed_in_db(&state.pool, completed).await?;

    Ok(Json(BatchStatusResponse { modified_count }))
}

/// Handler for deleting every completed task.
/// Reports how many of the targeted tasks were actually removed.
pub async fn clear_completed(
    State(state): State<AppState>,
) -> Result<Json<ClearCompletedResponse>, AppError> {
    let tasks = database::list_tasks_from_db(&state.pool).await?;
    let targets = completed_ids(&tasks);
    debug!("Clearing {} completed tasks.", targets.len());

    let deleted = database::delete_tasks_in_db(&state.pool, &targets).await;
    if deleted < targets.len() {
        error!(
            "Only {} of {} completed tasks were cleared.",
            deleted,
            targets.len()
        );
    }

    Ok(Json(ClearCompletedResponse {
        requested: targets.len(),
        deleted,
    }))
}

/// Handler for the dashboard statistics over all tasks.
pub async fn task_stats(State(state): State<AppState>) -> Result<Json<TaskStats>, AppError> {
    let tasks = database::list_tasks_from_db(&state.pool).await?;
    let window = DayWindow::new(Utc::now(), state.utc_offset);

    Ok(Json(compute_stats(&tasks, &window)))
}

// --- Custom Error Handling ---

/// Our custom error type for the application.
#[derive(Debug)]
pub struct AppError {
    code: StatusCode,
    message: String,
}

impl AppError {
    fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }

    fn not_found(task_id: i64) -> Self {
        error!("Task with ID {} not found.", task_id);
        Self::new(
            StatusCode::NOT_FOUND,
            &format!("Task with ID {} not found.", task_id),
        )
    }
}

/// Allows converting an `anyhow::Error` (coming from `database.rs`)
/// into our `AppError`. The details stay in the logs.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Log the internal error for debugging.
        tracing::error!("Internal server error: {:?}", err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred.")
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        error!("Validation failed: {}", err);
        Self::new(StatusCode::BAD_REQUEST, &err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, &rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, &rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, &rejection.body_text())
    }
}

/// Allows Axum to convert our `AppError` into an HTTP `Response`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(
            "Responding with error: status_code={}, message={}",
            self.code.as_u16(),
            self.message
        );
        (
            self.code,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_parser::{DateMatch, DateParser};
    use chrono::{DateTime, TimeZone};
    use common::{Category, Priority};
    use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
    use std::sync::Arc;

    async fn setup_state() -> AppState {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        database::ensure_schema(&pool).await.unwrap();
        AppState::new(pool)
    }

    fn due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap()
    }

    // Helper to create a payload for tests
    fn create_test_payload(
        description: Option<&str>,
        date: Option<DateTime<Utc>>,
    ) -> Result<Json<CreateTaskPayload>, JsonRejection> {
        Ok(Json(CreateTaskPayload {
            description: description.map(str::to_string),
            date,
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn test_create_task_validation_empty_description() {
        let state = setup_state().await;
        let before = database::list_tasks_from_db(&state.pool).await.unwrap().len();

        let result =
            create_task(State(state.clone()), create_test_payload(Some(""), Some(due()))).await;

        let err = result.unwrap_err();
        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Description cannot be empty.");
        let after = database::list_tasks_from_db(&state.pool).await.unwrap().len();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_create_task_validation_missing_date() {
        // We can use an empty pool because the validation fails before any DB access.
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        let state = AppState::new(pool);

        let result = create_task(State(state), create_test_payload(Some("No date"), None)).await;

        let err = result.unwrap_err();
        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Description and date are required.");
    }

    #[tokio::test]
    async fn test_create_task_applies_defaults() {
        let state = setup_state().await;

        let (status, Json(task)) =
            create_task(State(state), create_test_payload(Some("Plan trip"), Some(due())))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(task.category, Category::Other);
        assert_eq!(task.priority, Priority::Medium);
        assert!(!task.completed);
    }

    #[tokio::test]
    async fn test_get_missing_task_is_not_found() {
        let state = setup_state().await;

        let err = get_task(State(state), Ok(Path(404))).await.unwrap_err();

        assert_eq!(err.code, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_batch_status_requires_completed() {
        let state = setup_state().await;

        let err = set_batch_status(State(state), Ok(Json(BatchStatusPayload::default())))
            .await
            .unwrap_err();

        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "The 'completed' field is required.");
    }

    #[tokio::test]
    async fn test_quick_create_uses_parsed_date() {
        let state = setup_state().await;
        let payload = QuickTaskPayload {
            text: Some("Renew passport on 2030-01-15".to_string()),
            category: Some(Category::Personal),
            priority: None,
        };

        let (_, Json(task)) = quick_create_task(State(state), Ok(Json(payload)))
            .await
            .unwrap();

        assert_eq!(task.description, "Renew passport on 2030-01-15");
        assert_eq!(task.date, Utc.with_ymd_and_hms(2030, 1, 15, 12, 0, 0).unwrap());
        assert_eq!(task.category, Category::Personal);
    }

    #[tokio::test]
    async fn test_quick_create_rejects_blank_text() {
        let state = setup_state().await;
        let payload = QuickTaskPayload {
            text: Some("   ".to_string()),
            ..Default::default()
        };

        let err = quick_create_task(State(state), Ok(Json(payload)))
            .await
            .unwrap_err();

        assert_eq!(err.code, StatusCode::BAD_REQUEST);
    }

    /// Always resolves to the same instant, whatever the text.
    struct FixedDateParser(DateTime<Utc>);

    impl DateParser for FixedDateParser {
        fn parse(&self, text: &str, _reference_now: DateTime<Utc>) -> Option<DateMatch> {
            Some(DateMatch {
                matched: text.to_string(),
                date: self.0,
            })
        }
    }

    #[tokio::test]
    async fn test_quick_create_uses_pluggable_parser() {
        let state = setup_state()
            .await
            .with_date_parser(Arc::new(FixedDateParser(due())));
        let payload = QuickTaskPayload {
            text: Some("Whenever".to_string()),
            ..Default::default()
        };

        let (_, Json(task)) = quick_create_task(State(state), Ok(Json(payload)))
            .await
            .unwrap();

        assert_eq!(task.date, due());
    }

    #[tokio::test]
    async fn test_quick_create_rejects_parsed_date_past_year_9999() {
        let far = "+10000-01-01T00:00:00Z".parse().unwrap();
        let state = setup_state()
            .await
            .with_date_parser(Arc::new(FixedDateParser(far)));
        let payload = QuickTaskPayload {
            text: Some("Someday".to_string()),
            ..Default::default()
        };

        let err = quick_create_task(State(state.clone()), Ok(Json(payload)))
            .await
            .unwrap_err();

        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert!(database::list_tasks_from_db(&state.pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_errors_are_not_leaked() {
        let state = setup_state().await;
        state.pool.close().await;

        let err = task_stats(State(state)).await.unwrap_err();

        assert_eq!(err.code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "An internal error occurred.");
    }
}
