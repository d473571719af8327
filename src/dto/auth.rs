use crate::domain;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// DTO carrying credentials for signup and login
#[derive(Deserialize, Display, Validate, ToSchema)]
#[display("{}", email.as_deref().unwrap_or("<no email>"))]
#[cfg_attr(test, derive(Serialize, Debug))]
pub struct CredentialsBody {
    #[validate(
        required(message = "\"email\" is required"),
        email(message = "\"email\" must be a valid email")
    )]
    #[schema(example = "someone@example.com")]
    pub email: Option<String>,
    #[validate(
        required(message = "\"password\" is required"),
        length(
            min = 6,
            message = "\"password\" length must be at least 6 characters long"
        )
    )]
    #[schema(example = "hunter22")]
    pub password: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq))]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "someone@example.com")]
    pub email: String,
}

impl From<domain::user::User> for UserResponse {
    fn from(value: domain::user::User) -> Self {
        UserResponse {
            id: value.id,
            email: value.email,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq))]
pub struct SignUpResponse {
    #[schema(example = "User created successfully")]
    pub message: String,
    pub user: UserResponse,
}

#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq))]
pub struct LoginResponse {
    /// Bearer token for the protected routes
    pub token: String,
}
