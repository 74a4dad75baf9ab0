// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Offset, TimeZone, Utc};
use serde::Deserialize;

use crate::task::Task;

/// Day-aligned boundaries computed from a reference instant.
///
/// All intervals are half-open: the lower bound is inclusive, the upper bound exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub today: DateTime<Utc>,
    pub tomorrow: DateTime<Utc>,
    pub next_week: DateTime<Utc>,
}

impl DayWindow {
    /// Builds the window for the calendar day containing `reference_now`,
    /// where midnight is taken in the given `offset`.
    pub fn new(reference_now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local_midnight = reference_now
            .with_timezone(&offset)
            .date_naive()
            .and_time(NaiveTime::MIN);
        let utc_midnight =
            local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()));
        let today = Utc.from_utc_datetime(&utc_midnight);

        Self {
            today,
            tomorrow: today + Duration::days(1),
            next_week: today + Duration::days(7),
        }
    }

    /// Same as [`DayWindow::new`] with days starting at 00:00 UTC.
    pub fn utc(reference_now: DateTime<Utc>) -> Self {
        Self::new(reference_now, Utc.fix())
    }

    pub fn is_today(&self, date: DateTime<Utc>) -> bool {
        self.today <= date && date < self.tomorrow
    }

    pub fn is_this_week(&self, date: DateTime<Utc>) -> bool {
        self.today <= date && date < self.next_week
    }

    pub fn is_overdue(&self, date: DateTime<Utc>) -> bool {
        date < self.today
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateFilter {
    #[default]
    All,
    Today,
    #[serde(alias = "this_week")]
    Week,
}

/// The view parameters for a task listing, e.g. `?status=active&search=gym&date=week`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ViewParams {
    pub status: StatusFilter,
    pub search: String,
    pub date: DateFilter,
}

impl ViewParams {
    fn keeps_status(&self, task: &Task) -> bool {
        match self.status {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }

    fn keeps_search(&self, task: &Task, term: &str) -> bool {
        term.is_empty()
            || task.description.to_lowercase().contains(term)
            || task.category.as_str().contains(term)
    }

    fn keeps_date(&self, task: &Task, window: &DayWindow) -> bool {
        match self.date {
            DateFilter::All => true,
            DateFilter::Today => window.is_today(task.date),
            DateFilter::Week => window.is_this_week(task.date),
        }
    }
}

/// Returns the tasks matching every view parameter, in their original order.
pub fn filter_tasks(tasks: &[Task], params: &ViewParams, window: &DayWindow) -> Vec<Task> {
    let term = params.search.to_lowercase();
    tasks
        .iter()
        .filter(|task| params.keeps_status(task))
        .filter(|task| params.keeps_search(task, &term))
        .filter(|task| params.keeps_date(task, window))
        .cloned()
        .collect()
}
