use crate::dto;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Task Digest API",
        description = "Owner-scoped tasks and categories with analytics and a daily digest"
    ),
    modifiers(&BearerAuth)
)]
struct TaskDigestApi;

/// Registers the bearer token scheme referenced by the protected routes
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Merges in OpenAPI definitions from other locations in the app, such as the [dto] package
/// and submodules of [api][crate::api]
pub fn build_openapi() -> utoipa::openapi::OpenApi {
    let mut api_docs = TaskDigestApi::openapi();
    api_docs.merge(dto::OpenApiSchemas::openapi());
    api_docs.merge(super::auth::AuthApi::openapi());
    api_docs.merge(super::task::TaskApi::openapi());
    api_docs.merge(super::category::CategoryApi::openapi());
    api_docs.merge(super::analytics::AnalyticsApi::openapi());

    api_docs
}

/// Constructs the route on the API that renders the swagger UI and returns the OpenAPI schema.
pub fn build_documentation() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", build_openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let api_docs = build_openapi();
        let documented: Vec<&str> = api_docs.paths.paths.keys().map(String::as_str).collect();

        for path in [
            "/api/auth/signup",
            "/api/auth/login",
            "/api/tasks",
            "/api/tasks/{task_id}",
            "/api/tasks/{task_id}/status",
            "/api/categories",
            "/api/categories/{category_id}",
            "/api/categories/{category_id}/tasks",
            "/api/analytics/stats",
            "/api/analytics/trends",
        ] {
            assert!(documented.contains(&path), "{path} is missing from the docs");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let api_docs = build_openapi();
        let components = api_docs.components.expect("docs should have components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
