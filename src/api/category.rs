use crate::auth_gate::CallerIdentity;
use crate::domain::category::driving_ports::CategoryPort;
use crate::external_connections::{ExternalConnectivity, Transactable};
use crate::persistence::db_category_driven_ports::{DbCategoryReader, DbCategoryWriter};
use crate::persistence::db_task_driven_ports::{DbTaskReader, DbTaskWriter};
use crate::routing_utils::{ApiErrorResponse, BasicErrorResponse, Json, Path};
use crate::{AppState, SharedData, domain, dto, validators};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Router};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_category,
        get_categories,
        get_category,
        update_category,
        delete_category,
        get_category_tasks
    ),
    components(schemas(dto::CategoryFields, dto::CategoryResponse))
)]
pub struct CategoryApi;
/// Constant used to group categories endpoints in OpenAPI documentation
pub const CATEGORY_API_GROUP: &str = "Categories";

/// Adds the owner-scoped category routes. Must sit behind the auth gate.
pub fn category_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(
                |State(app_state): AppState, Extension(caller): Extension<CallerIdentity>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let category_service = domain::category::CategoryService {};

                    get_categories(caller.id, &mut ext_cxn, &category_service).await
                },
            )
            .post(
                |State(app_state): AppState,
                 Extension(caller): Extension<CallerIdentity>,
                 Json(new_category): Json<dto::CategoryFields>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let category_service = domain::category::CategoryService {};

                    create_category(caller.id, new_category, &mut ext_cxn, &category_service)
                        .await
                },
            ),
        )
        .route(
            "/:category_id",
            get(
                |State(app_state): AppState,
                 Extension(caller): Extension<CallerIdentity>,
                 Path(category_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let category_service = domain::category::CategoryService {};

                    get_category(caller.id, category_id, &mut ext_cxn, &category_service).await
                },
            )
            .put(
                |State(app_state): AppState,
                 Extension(caller): Extension<CallerIdentity>,
                 Path(category_id): Path<i32>,
                 Json(replacement): Json<dto::CategoryFields>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let category_service = domain::category::CategoryService {};

                    update_category(
                        caller.id,
                        category_id,
                        replacement,
                        &mut ext_cxn,
                        &category_service,
                    )
                    .await
                },
            )
            .delete(
                |State(app_state): AppState,
                 Extension(caller): Extension<CallerIdentity>,
                 Path(category_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let category_service = domain::category::CategoryService {};

                    delete_category(caller.id, category_id, &mut ext_cxn, &category_service).await
                },
            ),
        )
        .route(
            "/:category_id/tasks",
            get(
                |State(app_state): AppState,
                 Extension(caller): Extension<CallerIdentity>,
                 Path(category_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let category_service = domain::category::CategoryService {};

                    get_category_tasks(caller.id, category_id, &mut ext_cxn, &category_service)
                        .await
                },
            ),
        )
}

/// Creates a category owned by the caller
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = CATEGORY_API_GROUP,
    request_body = dto::CategoryFields,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Category created", body = dto::CategoryResponse),
        (status = 400, response = BasicErrorResponse),
        (status = 401, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    )
)]
async fn create_category(
    owner_id: Uuid,
    new_category: dto::CategoryFields,
    ext_cxn: &mut impl ExternalConnectivity,
    category_service: &impl CategoryPort,
) -> Result<(StatusCode, Json<dto::CategoryResponse>), ApiErrorResponse> {
    info!("Creating category");
    let content = validators::validate_category(&new_category)?;

    let created = category_service
        .create_category(owner_id, &content, &mut *ext_cxn, &DbCategoryWriter {})
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Lists the caller's categories, newest first
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = CATEGORY_API_GROUP,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's categories", body = Vec<dto::CategoryResponse>),
        (status = 401, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    )
)]
async fn get_categories(
    owner_id: Uuid,
    ext_cxn: &mut impl ExternalConnectivity,
    category_service: &impl CategoryPort,
) -> Result<Json<Vec<dto::CategoryResponse>>, ApiErrorResponse> {
    info!("Listing categories");
    let categories = category_service
        .categories_for_owner(owner_id, &mut *ext_cxn, &DbCategoryReader {})
        .await?;

    Ok(Json(
        categories
            .into_iter()
            .map(dto::CategoryResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/categories/{category_id}",
    tag = CATEGORY_API_GROUP,
    params(("category_id" = i32, Path, description = "ID of the category")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The category", body = dto::CategoryResponse),
        (status = 401, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    )
)]
async fn get_category(
    owner_id: Uuid,
    category_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    category_service: &impl CategoryPort,
) -> Result<Json<dto::CategoryResponse>, ApiErrorResponse> {
    info!(category_id, "Fetching category");
    let category = category_service
        .category_by_id(owner_id, category_id, &mut *ext_cxn, &DbCategoryReader {})
        .await?;

    Ok(Json(category.into()))
}

#[utoipa::path(
    put,
    path = "/api/categories/{category_id}",
    tag = CATEGORY_API_GROUP,
    request_body = dto::CategoryFields,
    params(("category_id" = i32, Path, description = "ID of the category")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The updated category", body = dto::CategoryResponse),
        (status = 400, response = BasicErrorResponse),
        (status = 401, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    )
)]
async fn update_category(
    owner_id: Uuid,
    category_id: i32,
    replacement: dto::CategoryFields,
    ext_cxn: &mut impl ExternalConnectivity,
    category_service: &impl CategoryPort,
) -> Result<Json<dto::CategoryResponse>, ApiErrorResponse> {
    info!(category_id, "Updating category");
    let content = validators::validate_category(&replacement)?;

    let updated = category_service
        .update_category(
            owner_id,
            category_id,
            &content,
            &mut *ext_cxn,
            &DbCategoryWriter {},
        )
        .await?;

    Ok(Json(updated.into()))
}

/// Deletes a category. Tasks filed under it are kept and become uncategorized.
#[utoipa::path(
    delete,
    path = "/api/categories/{category_id}",
    tag = CATEGORY_API_GROUP,
    params(("category_id" = i32, Path, description = "ID of the category")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    )
)]
async fn delete_category(
    owner_id: Uuid,
    category_id: i32,
    ext_cxn: &mut impl Transactable,
    category_service: &impl CategoryPort,
) -> Result<StatusCode, ApiErrorResponse> {
    info!(category_id, "Deleting category");
    category_service
        .delete_category(
            owner_id,
            category_id,
            &mut *ext_cxn,
            &DbCategoryReader {},
            &DbCategoryWriter {},
            &DbTaskWriter {},
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Lists the caller's tasks filed under a category
#[utoipa::path(
    get,
    path = "/api/categories/{category_id}/tasks",
    tag = CATEGORY_API_GROUP,
    params(("category_id" = i32, Path, description = "ID of the category")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tasks in the category", body = Vec<dto::TaskResponse>),
        (status = 401, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    )
)]
async fn get_category_tasks(
    owner_id: Uuid,
    category_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    category_service: &impl CategoryPort,
) -> Result<Json<Vec<dto::TaskResponse>>, ApiErrorResponse> {
    info!(category_id, "Listing tasks in category");
    let tasks = category_service
        .tasks_for_category(
            owner_id,
            category_id,
            &mut *ext_cxn,
            &DbCategoryReader {},
            &DbTaskReader {},
        )
        .await?;

    Ok(Json(tasks.into_iter().map(dto::TaskResponse::from).collect()))
}
