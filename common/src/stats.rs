// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::task::{Category, Priority, Task};
use crate::view::DayWindow;

/// Dashboard statistics over the whole task snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    /// Percentage in `[0, 100]`; zero when there are no tasks.
    pub completion_rate: f64,
    pub category_histogram: BTreeMap<Category, usize>,
    pub priority_histogram: BTreeMap<Priority, usize>,
    pub due_today_count: usize,
    /// Includes the tasks counted in `due_today_count`.
    pub due_this_week_count: usize,
    pub overdue_count: usize,
}

/// Computes the statistics from scratch. The order of `tasks` is irrelevant.
pub fn compute_stats(tasks: &[Task], window: &DayWindow) -> TaskStats {
    let mut stats = TaskStats {
        total_tasks: tasks.len(),
        ..Default::default()
    };

    for task in tasks {
        *stats.category_histogram.entry(task.category).or_insert(0) += 1;
        *stats.priority_histogram.entry(task.priority).or_insert(0) += 1;

        if task.completed {
            stats.completed_tasks += 1;
            continue;
        }

        if window.is_today(task.date) {
            stats.due_today_count += 1;
        }
        if window.is_this_week(task.date) {
            stats.due_this_week_count += 1;
        }
        if window.is_overdue(task.date) {
            stats.overdue_count += 1;
        }
    }

    stats.pending_tasks = stats.total_tasks - stats.completed_tasks;
    if stats.total_tasks > 0 {
        stats.completion_rate = stats.completed_tasks as f64 / stats.total_tasks as f64 * 100.0;
    }

    stats
}

/// Ids of every completed task, the target set of a "clear completed" action.
pub fn completed_ids(tasks: &[Task]) -> Vec<i64> {
    tasks.iter().filter(|t| t.completed).map(|t| t.id).collect()
}
