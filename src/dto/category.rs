use crate::domain;
use crate::validators::color_code;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// DTO for creating or fully replacing a category via the API
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize, Debug, Clone, Default))]
pub struct CategoryFields {
    #[validate(
        required(message = "\"name\" is required"),
        length(min = 1, message = "\"name\" is not allowed to be empty")
    )]
    #[schema(example = "Garden")]
    pub name: Option<String>,
    #[schema(example = "Everything growing outside")]
    pub description: Option<String>,
    /// `#RRGGBB`, or empty for no color
    #[validate(custom = "color_code")]
    #[schema(example = "#2E8B57")]
    pub color: Option<String>,
}

/// DTO for a category returned by the API
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq))]
pub struct CategoryResponse {
    #[schema(example = 3)]
    pub id: i32,
    pub owner_id: Uuid,
    #[schema(example = "Garden")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "#2E8B57")]
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<domain::category::Category> for CategoryResponse {
    fn from(value: domain::category::Category) -> Self {
        CategoryResponse {
            id: value.id,
            owner_id: value.owner_id,
            name: value.name,
            description: value.description,
            color: value.color,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
