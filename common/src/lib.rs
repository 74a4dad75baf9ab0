// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.

//! Types shared between the server and its clients, and the pure query and
//! statistics engine that derives list views and dashboard numbers from a
//! snapshot of tasks.

mod stats;
mod task;
mod view;

pub use stats::{TaskStats, completed_ids, compute_stats};
pub use task::{
    BatchStatusPayload, BatchStatusResponse, Category, ClearCompletedResponse, CreateTaskPayload,
    NewTask, Priority, QuickTaskPayload, Task, UnknownVariant, UpdateTaskPayload, ValidationError,
};
pub use view::{DateFilter, DayWindow, StatusFilter, ViewParams, filter_tasks};
