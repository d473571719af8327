use crate::domain::user::driven_ports::AuthProvider;
use crate::domain::user::driving_ports::UserPort;
use crate::external_connections::ExternalConnectivity;
use crate::persistence::db_user_driven_ports::DbUserWriter;
use crate::routing_utils::{ApiErrorResponse, BasicErrorResponse, Json};
use crate::{AppState, SharedData, domain, dto, validators};
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(sign_up, log_in),
    components(schemas(
        dto::CredentialsBody,
        dto::UserResponse,
        dto::SignUpResponse,
        dto::LoginResponse
    ))
)]
pub struct AuthApi;
/// Constant used to group auth endpoints in OpenAPI documentation
pub const AUTH_API_GROUP: &str = "Auth";

/// Adds the public signup and login routes
pub fn auth_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/signup",
            post(
                |State(app_state): AppState, Json(credentials): Json<dto::CredentialsBody>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let user_service = domain::user::UserService {};

                    sign_up(
                        credentials,
                        &mut ext_cxn,
                        &app_state.auth_provider,
                        &user_service,
                    )
                    .await
                },
            ),
        )
        .route(
            "/login",
            post(
                |State(app_state): AppState, Json(credentials): Json<dto::CredentialsBody>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let user_service = domain::user::UserService {};

                    log_in(
                        credentials,
                        &mut ext_cxn,
                        &app_state.auth_provider,
                        &user_service,
                    )
                    .await
                },
            ),
        )
}

/// Registers a new account with the auth provider
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = AUTH_API_GROUP,
    request_body = dto::CredentialsBody,
    responses(
        (status = 201, description = "Account created", body = dto::SignUpResponse),
        (status = 400, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    )
)]
async fn sign_up(
    credentials: dto::CredentialsBody,
    ext_cxn: &mut impl ExternalConnectivity,
    auth_provider: &impl AuthProvider,
    user_service: &impl UserPort,
) -> Result<(StatusCode, Json<dto::SignUpResponse>), ApiErrorResponse> {
    info!("Signing up {credentials}");
    let credentials = validators::validate_credentials(&credentials)?;

    let user = user_service
        .sign_up(&credentials, &mut *ext_cxn, auth_provider, &DbUserWriter {})
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(dto::SignUpResponse {
            message: "User created successfully".to_owned(),
            user: user.into(),
        }),
    ))
}

/// Exchanges email and password for a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = AUTH_API_GROUP,
    request_body = dto::CredentialsBody,
    responses(
        (status = 200, description = "Signed in", body = dto::LoginResponse),
        (status = 400, response = BasicErrorResponse),
        (status = 401, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    )
)]
async fn log_in(
    credentials: dto::CredentialsBody,
    ext_cxn: &mut impl ExternalConnectivity,
    auth_provider: &impl AuthProvider,
    user_service: &impl UserPort,
) -> Result<Json<dto::LoginResponse>, ApiErrorResponse> {
    info!("Logging in {credentials}");
    let credentials = validators::validate_credentials(&credentials)?;

    let token = user_service
        .log_in(&credentials, &mut *ext_cxn, auth_provider, &DbUserWriter {})
        .await?;

    Ok(Json(dto::LoginResponse { token }))
}
