use crate::domain;
use crate::validators::{due_date_format, priority_value, status_value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// DTO for creating or fully replacing a task via the API
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize, Debug, Clone, Default))]
pub struct TaskFields {
    #[validate(
        required(message = "\"title\" is required"),
        length(min = 1, message = "\"title\" is not allowed to be empty")
    )]
    #[schema(example = "Water the plants")]
    pub title: Option<String>,
    #[schema(example = "Both the ferns and the cactus")]
    pub description: Option<String>,
    /// ISO-8601 date or date-time
    #[validate(
        required(message = "\"due_date\" is required"),
        custom = "due_date_format"
    )]
    #[schema(example = "2030-01-01")]
    pub due_date: Option<String>,
    #[validate(
        required(message = "\"priority\" is required"),
        custom = "priority_value"
    )]
    #[schema(example = "low")]
    pub priority: Option<String>,
    #[validate(required(message = "\"status\" is required"), custom = "status_value")]
    #[schema(example = "pending")]
    pub status: Option<String>,
    #[schema(example = 3)]
    pub category_id: Option<i32>,
}

/// DTO for changing only the status of a task
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize, Debug))]
pub struct StatusUpdate {
    #[validate(required(message = "\"status\" is required"), custom = "status_value")]
    #[schema(example = "in_progress")]
    pub status: Option<String>,
}

/// DTO for a task returned by the API
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq))]
pub struct TaskResponse {
    #[schema(example = 10)]
    pub id: i32,
    pub owner_id: Uuid,
    #[schema(example = "Water the plants")]
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    #[schema(example = "low")]
    pub priority: String,
    #[schema(example = "pending")]
    pub status: String,
    pub category_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<domain::task::Task> for TaskResponse {
    fn from(value: domain::task::Task) -> Self {
        TaskResponse {
            id: value.id,
            owner_id: value.owner_id,
            title: value.title,
            description: value.description,
            due_date: value.due_date,
            priority: value.priority.as_str().to_owned(),
            status: value.status.as_str().to_owned(),
            category_id: value.category_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
