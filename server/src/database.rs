// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, SecondsFormat, Utc};
use common::{Category, NewTask, Priority, Task, UpdateTaskPayload};
use sqlx::{Sqlite, SqlitePool, migrate::MigrateDatabase};
use tracing::{debug, error, info, warn};

/// Establishes the database connection pool.
/// If the database does not exist, it creates it (and its parent directory).
/// It also ensures the `tasks` table exists.
pub async fn establish_connection_pool(database_url: &str) -> Result<SqlitePool> {
    if let Some(parent) = database_file_path(database_url).and_then(|p| p.parent()) {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        info!("Creating database {}", database_url);
        Sqlite::create_database(database_url)
            .await
            .context("Failed to create database")?;
    } else {
        info!("Database already exists.");
    }

    let pool = SqlitePool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    ensure_schema(&pool).await?;

    Ok(pool)
}

/// Creates the `tasks` table if it is missing.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NOT NULL,
            date TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'other',
            priority TEXT NOT NULL DEFAULT 'medium',
            completed BOOLEAN NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create 'tasks' table")?;

    info!("'tasks' table is ready.");
    Ok(())
}

/// File path behind a `sqlite:` URL, or `None` for in-memory databases.
fn database_file_path(database_url: &str) -> Option<&Path> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    Some(Path::new(path))
}

/// Dates are stored with a fixed-width fraction so that text order is time order.
fn encode_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Raw row as stored in SQLite. Converted into a [`Task`] through `TryFrom`.
#[derive(sqlx::FromRow, Debug)]
struct TaskRow {
    id: i64,
    description: String,
    date: String,
    category: String,
    priority: String,
    completed: bool,
    created_at: String,
}

impl TryFrom<TaskRow> for Task {
    type Error = anyhow::Error;

    fn try_from(row: TaskRow) -> Result<Self> {
        let parse = |field: &str, value: &str| {
            DateTime::parse_from_rfc3339(value)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| {
                    anyhow!(
                        "Malformed task record {}: unparsable {} '{}': {}",
                        row.id,
                        field,
                        value,
                        e
                    )
                })
        };
        let date = parse("date", &row.date)?;
        let created_at = parse("created_at", &row.created_at)?;

        // Out-of-set values are tolerated and read back as the defaults.
        let category = row.category.parse::<Category>().unwrap_or_else(|_| {
            warn!("Task {} has unknown category '{}'", row.id, row.category);
            Category::default()
        });
        let priority = row.priority.parse::<Priority>().unwrap_or_else(|_| {
            warn!("Task {} has unknown priority '{}'", row.id, row.priority);
            Priority::default()
        });

        Ok(Task {
            id: row.id,
            description: row.description,
            date,
            category,
            priority,
            completed: row.completed,
            created_at,
        })
    }
}

/// Retrieves every task, ordered by due date (then by id).
pub async fn list_tasks_from_db(pool: &SqlitePool) -> Result<Vec<Task>> {
    let rows = sqlx::query_as::<_, TaskRow>("SELECT * FROM tasks ORDER BY date ASC, id ASC;")
        .fetch_all(pool)
        .await
        .context("Failed to retrieve tasks from DB")?;

    rows.into_iter().map(Task::try_from).collect()
}

/// Retrieves a single task. Returns `None` if no task has this ID.
pub async fn get_task_from_db(pool: &SqlitePool, task_id: i64) -> Result<Option<Task>> {
    let row = sqlx::query_as::<_, TaskRow>("SELECT * FROM tasks WHERE id = ?")
        .bind(task_id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to retrieve task with ID: {}", task_id))?;

    row.map(Task::try_from).transpose()
}

/// Inserts a new task into the database and returns the stored record.
pub async fn create_task_in_db(pool: &SqlitePool, new_task: NewTask) -> Result<Task> {
    let created_at = Utc::now();

    debug!(
        "Insert values: description={}, date={}, category={}, priority={}, completed={}, created_at={}",
        new_task.description,
        new_task.date,
        new_task.category,
        new_task.priority,
        new_task.completed,
        created_at
    );

    let id = sqlx::query(
        "INSERT INTO tasks (description, date, category, priority, completed, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&new_task.description)
    .bind(encode_date(new_task.date))
    .bind(new_task.category.as_str())
    .bind(new_task.priority.as_str())
    .bind(new_task.completed)
    .bind(encode_date(created_at))
    .execute(pool)
    .await
    .context("Failed to insert task into DB")?
    .last_insert_rowid();

    Ok(Task {
        id,
        description: new_task.description,
        date: new_task.date,
        category: new_task.category,
        priority: new_task.priority,
        completed: new_task.completed,
        created_at,
    })
}

/// Merges the given fields into an existing task; absent fields are left untouched.
/// Returns the updated task, or `None` if no task has this ID.
pub async fn update_task_in_db(
    pool: &SqlitePool,
    task_id: i64,
    changes: &UpdateTaskPayload,
) -> Result<Option<Task>> {
    debug!("Updating task {} with {:?}", task_id, changes);

    let result = sqlx::query(
        r#"
        UPDATE tasks SET
            description = COALESCE(?, description),
            date = COALESCE(?, date),
            category = COALESCE(?, category),
            priority = COALESCE(?, priority),
            completed = COALESCE(?, completed)
        WHERE id = ?
        "#,
    )
    .bind(changes.description.as_deref())
    .bind(changes.date.map(encode_date))
    .bind(changes.category.map(|c| c.as_str()))
    .bind(changes.priority.map(|p| p.as_str()))
    .bind(changes.completed)
    .bind(task_id)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to update task with ID: {}", task_id))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_task_from_db(pool, task_id).await
}

/// Deletes a task from the database.
/// Returns true if a task was deleted, false if no task with the given ID was found.
pub async fn delete_task_in_db(pool: &SqlitePool, task_id: i64) -> Result<bool> {
    debug!("Attempting to delete task with ID: {}", task_id);
    let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(task_id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to delete task with ID: {}", task_id))?;

    let rows_affected = result.rows_affected();
    info!("Deleted {} rows for task ID: {}", rows_affected, task_id);

    Ok(rows_affected > 0)
}

/// Sets `completed` on every task. Only rows whose value actually changes are
/// counted, so repeating the call reports zero.
pub async fn set_all_completed_in_db(pool: &SqlitePool, completed: bool) -> Result<u64> {
    let result = sqlx::query("UPDATE tasks SET completed = ? WHERE completed <> ?")
        .bind(completed)
        .bind(completed)
        .execute(pool)
        .await
        .context("Failed to update task status in DB")?;

    let modified = result.rows_affected();
    info!("Set completed={} on {} tasks.", completed, modified);

    Ok(modified)
}

/// Deletes each of the given tasks independently. This is best effort and not
/// atomic: a failure is logged and the remaining ids are still attempted.
/// Returns how many tasks were actually deleted.
pub async fn delete_tasks_in_db(pool: &SqlitePool, task_ids: &[i64]) -> usize {
    let mut deleted = 0;
    for &task_id in task_ids {
        match delete_task_in_db(pool, task_id).await {
            Ok(true) => deleted += 1,
            Ok(false) => debug!("Task {} was already gone.", task_id),
            Err(e) => error!("Failed to delete task {}: {:?}", task_id, e),
        }
    }

    info!("Deleted {} of {} requested tasks.", deleted, task_ids.len());
    deleted
}
