// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

/// Creates and configures the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        // Static segments take precedence over `{id}`.
        .route("/api/tasks/stats", get(handlers::task_stats))
        .route("/api/tasks/quick", post(handlers::quick_create_task))
        .route("/api/tasks/completed", delete(handlers::clear_completed))
        .route("/api/tasks/batch/status", put(handlers::set_batch_status))
        .route(
            "/api/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .layer(TraceLayer::new_for_http())
        // Adds the shared state (database pool, day offset, date parser)
        .with_state(state)
}
