// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents a task within the system.
///
/// Serialized as camelCase JSON so the browser client can consume it directly:
/// `{ id, description, date, category, priority, completed, createdAt }`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,

    pub description: String,

    // Due moment of the task, always handled as a UTC instant.
    pub date: DateTime<Utc>,

    pub category: Category,

    pub priority: Priority,

    pub completed: bool,

    pub created_at: DateTime<Utc>,
}

/// The fixed set of task categories.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Personal,
    Shopping,
    Health,
    Finance,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Work,
        Category::Personal,
        Category::Shopping,
        Category::Health,
        Category::Finance,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Shopping => "shopping",
            Category::Health => "health",
            Category::Finance => "finance",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Task priority. Ordered from most to least urgent.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// A string that does not name any variant of an enumerated task field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown value: {0}")]
pub struct UnknownVariant(pub String);

/// Reasons a request payload is rejected before it reaches the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Description and date are required.")]
    MissingFields,

    #[error("Description cannot be empty.")]
    EmptyDescription,

    #[error("Task text cannot be empty.")]
    EmptyText,

    #[error("The 'completed' field is required.")]
    MissingCompleted,

    #[error("Date must be between the years 0 and 9999.")]
    DateOutOfRange,
}

// Stored dates are RFC 3339 text, which only holds four-digit years.
fn check_date(date: &DateTime<Utc>) -> Result<(), ValidationError> {
    if (0..=9999).contains(&date.year()) {
        Ok(())
    } else {
        Err(ValidationError::DateOutOfRange)
    }
}

/// Structure used to receive task creation data from the API.
///
/// Every field is optional at the wire level so that missing required fields
/// produce a validation error instead of a deserialization failure.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct CreateTaskPayload {
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

/// A validated task, ready to be inserted. Defaults are already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub description: String,
    pub date: DateTime<Utc>,
    pub category: Category,
    pub priority: Priority,
    pub completed: bool,
}

impl CreateTaskPayload {
    /// Checks the required fields and applies defaults.
    ///
    /// Defaults only fill absent fields: an explicit `completed: false` stays false.
    /// The description is stored as given; whitespace only matters for the emptiness check.
    pub fn validate(self) -> Result<NewTask, ValidationError> {
        let (Some(description), Some(date)) = (self.description, self.date) else {
            return Err(ValidationError::MissingFields);
        };
        if description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        check_date(&date)?;

        Ok(NewTask {
            description,
            date,
            category: self.category.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            completed: self.completed.unwrap_or(false),
        })
    }
}

/// Partial update of a task. Absent fields are left unchanged.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct UpdateTaskPayload {
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

impl UpdateTaskPayload {
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self
            .description
            .as_deref()
            .is_some_and(|description| description.trim().is_empty())
        {
            return Err(ValidationError::EmptyDescription);
        }
        if let Some(date) = &self.date {
            check_date(date)?;
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.date.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.completed.is_none()
    }
}

/// Body of `PUT /api/tasks/batch/status`.
#[derive(Deserialize, Debug, Default)]
pub struct BatchStatusPayload {
    pub completed: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchStatusResponse {
    pub modified_count: u64,
}

/// Outcome of the best-effort "clear completed" action.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClearCompletedResponse {
    pub requested: usize,
    pub deleted: usize,
}

/// Body of `POST /api/tasks/quick`: free text whose due date is parsed out of it.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct QuickTaskPayload {
    pub text: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
}

impl QuickTaskPayload {
    /// Returns the trimmed text, rejecting empty input.
    pub fn text(&self) -> Result<&str, ValidationError> {
        match self.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(ValidationError::EmptyText),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_validate_applies_defaults() {
        let payload = CreateTaskPayload {
            description: Some("Buy milk".to_string()),
            date: Some(due()),
            ..Default::default()
        };

        let new_task = payload.validate().unwrap();

        assert_eq!(new_task.category, Category::Other);
        assert_eq!(new_task.priority, Priority::Medium);
        assert!(!new_task.completed);
    }

    #[test]
    fn test_validate_keeps_explicit_completed() {
        let payload = CreateTaskPayload {
            description: Some("Already done".to_string()),
            date: Some(due()),
            completed: Some(true),
            ..Default::default()
        };
        assert!(payload.validate().unwrap().completed);

        let payload = CreateTaskPayload {
            description: Some("Not done".to_string()),
            date: Some(due()),
            completed: Some(false),
            ..Default::default()
        };
        assert!(!payload.validate().unwrap().completed);
    }

    #[test]
    fn test_validate_rejects_missing_and_empty() {
        let missing_date = CreateTaskPayload {
            description: Some("No date".to_string()),
            ..Default::default()
        };
        assert_eq!(
            missing_date.validate().unwrap_err(),
            ValidationError::MissingFields
        );

        let blank = CreateTaskPayload {
            description: Some("   ".to_string()),
            date: Some(due()),
            ..Default::default()
        };
        assert_eq!(
            blank.validate().unwrap_err(),
            ValidationError::EmptyDescription
        );
    }

    #[test]
    fn test_update_payload_rejects_blank_description() {
        let payload = UpdateTaskPayload {
            description: Some("".to_string()),
            ..Default::default()
        };
        assert_eq!(
            payload.validate().unwrap_err(),
            ValidationError::EmptyDescription
        );
        assert!(UpdateTaskPayload::default().is_empty());
    }

    #[test]
    fn test_validate_keeps_description_as_given() {
        let payload = CreateTaskPayload {
            description: Some("  Pay rent  ".to_string()),
            date: Some(due()),
            ..Default::default()
        };
        assert_eq!(payload.validate().unwrap().description, "  Pay rent  ");

        let update = UpdateTaskPayload {
            description: Some(" Call mom".to_string()),
            ..Default::default()
        };
        assert_eq!(
            update.validate().unwrap().description.as_deref(),
            Some(" Call mom")
        );
    }

    #[test]
    fn test_validate_rejects_years_beyond_four_digits() {
        let far: DateTime<Utc> = "+10000-01-01T00:00:00Z".parse().unwrap();
        let before_zero = Utc.with_ymd_and_hms(-1, 12, 31, 0, 0, 0).unwrap();

        for date in [far, before_zero] {
            let create = CreateTaskPayload {
                description: Some("Far".to_string()),
                date: Some(date),
                ..Default::default()
            };
            assert_eq!(
                create.validate().unwrap_err(),
                ValidationError::DateOutOfRange
            );

            let update = UpdateTaskPayload {
                date: Some(date),
                ..Default::default()
            };
            assert_eq!(
                update.validate().unwrap_err(),
                ValidationError::DateOutOfRange
            );
        }

        let last_day = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
        let edge = CreateTaskPayload {
            description: Some("Edge".to_string()),
            date: Some(last_day),
            ..Default::default()
        };
        assert_eq!(edge.validate().unwrap().date, last_day);
    }

    #[test]
    fn test_task_json_shape() {
        let task = Task {
            id: 7,
            description: "Dentist".to_string(),
            date: due(),
            category: Category::Health,
            priority: Priority::High,
            completed: false,
            created_at: due(),
        };

        let value = serde_json::to_value(&task).unwrap();

        assert_eq!(value["category"], "health");
        assert_eq!(value["priority"], "high");
        assert_eq!(value["completed"], false);
        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_enum_from_str() {
        assert_eq!("finance".parse::<Category>(), Ok(Category::Finance));
        assert_eq!("low".parse::<Priority>(), Ok(Priority::Low));
        assert!("urgent".parse::<Priority>().is_err());
    }
}
