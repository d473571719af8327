use crate::auth_gate::CallerIdentity;
use crate::domain::task::driving_ports::TaskPort;
use crate::external_connections::ExternalConnectivity;
use crate::persistence::db_category_driven_ports::DbCategoryReader;
use crate::persistence::db_task_driven_ports::{DbTaskReader, DbTaskWriter};
use crate::routing_utils::{ApiErrorResponse, BasicErrorResponse, Json, Path};
use crate::{AppState, SharedData, domain, dto, validators};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Extension, Router};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;

#[derive(OpenApi)]
#[openapi(
    paths(create_task, get_tasks, get_task, update_task, update_task_status, delete_task),
    components(schemas(dto::TaskFields, dto::StatusUpdate, dto::TaskResponse))
)]
pub struct TaskApi;
/// Constant used to group tasks endpoints in OpenAPI documentation
pub const TASK_API_GROUP: &str = "Tasks";

/// Adds the owner-scoped task routes. Must sit behind the auth gate.
pub fn task_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(
                |State(app_state): AppState, Extension(caller): Extension<CallerIdentity>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    get_tasks(caller.id, &mut ext_cxn, &task_service).await
                },
            )
            .post(
                |State(app_state): AppState,
                 Extension(caller): Extension<CallerIdentity>,
                 Json(new_task): Json<dto::TaskFields>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    create_task(caller.id, new_task, &mut ext_cxn, &task_service).await
                },
            ),
        )
        .route(
            "/:task_id",
            get(
                |State(app_state): AppState,
                 Extension(caller): Extension<CallerIdentity>,
                 Path(task_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    get_task(caller.id, task_id, &mut ext_cxn, &task_service).await
                },
            )
            .put(
                |State(app_state): AppState,
                 Extension(caller): Extension<CallerIdentity>,
                 Path(task_id): Path<i32>,
                 Json(replacement): Json<dto::TaskFields>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    update_task(caller.id, task_id, replacement, &mut ext_cxn, &task_service)
                        .await
                },
            )
            .delete(
                |State(app_state): AppState,
                 Extension(caller): Extension<CallerIdentity>,
                 Path(task_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    delete_task(caller.id, task_id, &mut ext_cxn, &task_service).await
                },
            ),
        )
        .route(
            "/:task_id/status",
            patch(
                |State(app_state): AppState,
                 Extension(caller): Extension<CallerIdentity>,
                 Path(task_id): Path<i32>,
                 Json(status_update): Json<dto::StatusUpdate>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let task_service = domain::task::TaskService {};

                    update_task_status(
                        caller.id,
                        task_id,
                        status_update,
                        &mut ext_cxn,
                        &task_service,
                    )
                    .await
                },
            ),
        )
}

/// Creates a task owned by the caller
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = TASK_API_GROUP,
    request_body = dto::TaskFields,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Task created", body = dto::TaskResponse),
        (status = 400, response = BasicErrorResponse),
        (status = 401, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    )
)]
async fn create_task(
    owner_id: Uuid,
    new_task: dto::TaskFields,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<(StatusCode, Json<dto::TaskResponse>), ApiErrorResponse> {
    info!("Creating task");
    let content = validators::validate_task(&new_task)?;

    let created = task_service
        .create_task(
            owner_id,
            &content,
            &mut *ext_cxn,
            &DbCategoryReader {},
            &DbTaskWriter {},
        )
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Lists the caller's tasks, newest first
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = TASK_API_GROUP,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's tasks", body = Vec<dto::TaskResponse>),
        (status = 401, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    )
)]
async fn get_tasks(
    owner_id: Uuid,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<Vec<dto::TaskResponse>>, ApiErrorResponse> {
    info!("Listing tasks");
    let tasks = task_service
        .tasks_for_owner(owner_id, &mut *ext_cxn, &DbTaskReader {})
        .await?;

    Ok(Json(tasks.into_iter().map(dto::TaskResponse::from).collect()))
}

/// Retrieves one of the caller's tasks
#[utoipa::path(
    get,
    path = "/api/tasks/{task_id}",
    tag = TASK_API_GROUP,
    params(("task_id" = i32, Path, description = "ID of the task")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The task", body = dto::TaskResponse),
        (status = 401, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    )
)]
async fn get_task(
    owner_id: Uuid,
    task_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<dto::TaskResponse>, ApiErrorResponse> {
    info!(task_id, "Fetching task");
    let task = task_service
        .task_by_id(owner_id, task_id, &mut *ext_cxn, &DbTaskReader {})
        .await?;

    Ok(Json(task.into()))
}

/// Replaces every caller-controlled field of a task
#[utoipa::path(
    put,
    path = "/api/tasks/{task_id}",
    tag = TASK_API_GROUP,
    request_body = dto::TaskFields,
    params(("task_id" = i32, Path, description = "ID of the task")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The updated task", body = dto::TaskResponse),
        (status = 400, response = BasicErrorResponse),
        (status = 401, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    )
)]
async fn update_task(
    owner_id: Uuid,
    task_id: i32,
    replacement: dto::TaskFields,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<dto::TaskResponse>, ApiErrorResponse> {
    info!(task_id, "Updating task");
    let content = validators::validate_task(&replacement)?;

    let updated = task_service
        .update_task(
            owner_id,
            task_id,
            &content,
            &mut *ext_cxn,
            &DbCategoryReader {},
            &DbTaskWriter {},
        )
        .await?;

    Ok(Json(updated.into()))
}

/// Changes only the status of a task
#[utoipa::path(
    patch,
    path = "/api/tasks/{task_id}/status",
    tag = TASK_API_GROUP,
    request_body = dto::StatusUpdate,
    params(("task_id" = i32, Path, description = "ID of the task")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The updated task", body = dto::TaskResponse),
        (status = 400, response = BasicErrorResponse),
        (status = 401, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    )
)]
async fn update_task_status(
    owner_id: Uuid,
    task_id: i32,
    status_update: dto::StatusUpdate,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<dto::TaskResponse>, ApiErrorResponse> {
    info!(task_id, "Updating task status");
    let status = validators::validate_status(&status_update)?;

    let updated = task_service
        .update_task_status(owner_id, task_id, status, &mut *ext_cxn, &DbTaskWriter {})
        .await?;

    Ok(Json(updated.into()))
}

/// Deletes one of the caller's tasks
#[utoipa::path(
    delete,
    path = "/api/tasks/{task_id}",
    tag = TASK_API_GROUP,
    params(("task_id" = i32, Path, description = "ID of the task")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 401, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    )
)]
async fn delete_task(
    owner_id: Uuid,
    task_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<StatusCode, ApiErrorResponse> {
    info!(task_id, "Deleting task");
    task_service
        .delete_task(owner_id, task_id, &mut *ext_cxn, &DbTaskWriter {})
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
