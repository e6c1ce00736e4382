use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use tracing::Instrument;
use validator::Validate;

use learnnow_core::{
    deadpool_diesel, interact,
    model::{self, repository},
};

use crate::{
    app_state::SharedState,
    http_error::{ApiResult, HttpError},
    identity::CurrentUser,
    schema::{
        LearningModule, LearningModuleBookmarkRequest, LearningModuleId, Resource,
        ResourceBookmarkRequest, ResourceId,
    },
};

use super::{learning_module_views, resource_views};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/resources",
            get(get_resource_bookmarks).post(add_resource_bookmark),
        )
        .route("/resources/:id", delete(remove_resource_bookmark))
        .route(
            "/learningmodules",
            get(get_learning_module_bookmarks).post(add_learning_module_bookmark),
        )
        .route(
            "/learningmodules/:id",
            delete(remove_learning_module_bookmark),
        )
}

#[utoipa::path(
    get,
    path = "/api/bookmarks/resources",
    responses((status = 200, body = Vec<Resource>)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn get_resource_bookmarks(
    State(app_state): State<SharedState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Resource>>> {
    let user_id = user.id();
    let conn = app_state.pool.get().in_current_span().await?;
    let details = interact!(conn, move |conn| {
        let resources = repository::bookmark::get_user_resources(conn, user_id)?;
        repository::resource::get_resource_details(conn, resources, user_id)
    })
    .in_current_span()
    .await??;
    Ok(Json(resource_views(&app_state, &details).await))
}

#[utoipa::path(
    post,
    path = "/api/bookmarks/resources",
    request_body = ResourceBookmarkRequest,
    responses((status = 200), (status = 404)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn add_resource_bookmark(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Json(request): Json<ResourceBookmarkRequest>,
) -> ApiResult<()> {
    request.validate()?;
    let id: model::ResourceId = request.resource_id.try_into()?;
    let user_id = user.id();
    let conn = app_state.pool.get().in_current_span().await?;
    let found = interact!(conn, move |conn| {
        if repository::resource::get_resource(conn, id)?.is_none() {
            return Ok(false);
        }
        repository::bookmark::add_user_resource(conn, user_id, id)?;
        Ok(true)
    })
    .in_current_span()
    .await??;
    if !found {
        return Err(HttpError::not_found(id));
    }
    Ok(())
}

#[utoipa::path(
    delete,
    path = "/api/bookmarks/resources/{id}",
    params(("id" = String, Path,)),
    responses((status = 200)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn remove_resource_bookmark(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id: model::ResourceId = ResourceId(id).try_into()?;
    let user_id = user.id();
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::bookmark::remove_user_resource(conn, user_id, id)
    })
    .in_current_span()
    .await??;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/bookmarks/learningmodules",
    responses((status = 200, body = Vec<LearningModule>)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn get_learning_module_bookmarks(
    State(app_state): State<SharedState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<LearningModule>>> {
    let user_id = user.id();
    let conn = app_state.pool.get().in_current_span().await?;
    let details = interact!(conn, move |conn| {
        let modules = repository::bookmark::get_user_learning_modules(conn, user_id)?;
        repository::learning_module::get_learning_module_details(conn, modules, user_id)
    })
    .in_current_span()
    .await??;
    Ok(Json(learning_module_views(&app_state, &details).await))
}

#[utoipa::path(
    post,
    path = "/api/bookmarks/learningmodules",
    request_body = LearningModuleBookmarkRequest,
    responses((status = 200), (status = 404)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn add_learning_module_bookmark(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Json(request): Json<LearningModuleBookmarkRequest>,
) -> ApiResult<()> {
    request.validate()?;
    let id: model::LearningModuleId = request.learning_module_id.try_into()?;
    let user_id = user.id();
    let conn = app_state.pool.get().in_current_span().await?;
    let found = interact!(conn, move |conn| {
        if repository::learning_module::get_learning_module(conn, id)?.is_none() {
            return Ok(false);
        }
        repository::bookmark::add_user_learning_module(conn, user_id, id)?;
        Ok(true)
    })
    .in_current_span()
    .await??;
    if !found {
        return Err(HttpError::not_found(id));
    }
    Ok(())
}

#[utoipa::path(
    delete,
    path = "/api/bookmarks/learningmodules/{id}",
    params(("id" = String, Path,)),
    responses((status = 200)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn remove_learning_module_bookmark(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id: model::LearningModuleId = LearningModuleId(id).try_into()?;
    let user_id = user.id();
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::bookmark::remove_user_learning_module(conn, user_id, id)
    })
    .in_current_span()
    .await??;
    Ok(())
}
