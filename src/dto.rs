use crate::routing_utils::BasicErrorResponse;
use utoipa::OpenApi;

pub mod analytics;
pub mod auth;
pub mod category;
pub mod task;

pub use analytics::*;
pub use auth::*;
pub use category::*;
pub use task::*;

/// Schemas shared by every part of the API
#[derive(OpenApi)]
#[openapi(components(responses(BasicErrorResponse)))]
pub struct OpenApiSchemas;
