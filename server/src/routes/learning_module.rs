use axum::{
    extract::{Path, State},
    routing::{delete, post},
    Json, Router,
};
use itertools::Itertools;
use tracing::Instrument;
use validator::Validate;

use learnnow_core::{
    auth::Policy,
    deadpool_diesel, interact,
    model::{self, repository, Audit},
};

use crate::{
    app_state::SharedState,
    http_error::{ApiResult, HttpError},
    identity::CurrentUser,
    schema::{
        parse_ids, AppendResourcesRequest, AppendResourcesResponse, Author, FilterRequest,
        LearningModule, LearningModuleId, LearningModuleRequest, LearningModuleWithResources,
        ResourceId,
    },
};

use super::{display_names, learning_module_views, resource_views};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(create_learning_module))
        .route("/search", post(search_learning_modules))
        .route("/authors", axum::routing::get(get_learning_module_authors))
        .route(
            "/:id",
            axum::routing::get(get_learning_module)
                .patch(update_learning_module)
                .delete(delete_learning_module),
        )
        .route("/:id/resources", post(append_resources))
        .route("/:id/resources/:resource_id", delete(remove_resource))
        .route("/:id/vote", post(add_vote).delete(remove_vote))
}

async fn load_learning_module(
    app_state: &SharedState,
    id: model::LearningModuleId,
) -> ApiResult<model::LearningModule> {
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::learning_module::get_learning_module(conn, id)
    })
    .in_current_span()
    .await??
    .ok_or_else(|| HttpError::not_found(id))
}

/// Checks the caller may change the module and returns it
async fn load_for_modification(
    app_state: &SharedState,
    user: &CurrentUser,
    id: model::LearningModuleId,
) -> ApiResult<model::LearningModule> {
    user.require(app_state, Policy::TeacherOrAdmin).await?;
    let existing = load_learning_module(app_state, id).await?;
    user.require_owner_or_admin(app_state, &existing.audit)
        .await?;
    Ok(existing)
}

async fn learning_module_view(
    app_state: &SharedState,
    id: model::LearningModuleId,
    user: model::UserId,
) -> ApiResult<LearningModule> {
    let conn = app_state.pool.get().in_current_span().await?;
    let detail = interact!(conn, move |conn| {
        repository::learning_module::get_learning_module_detail(conn, id, user)
    })
    .in_current_span()
    .await??
    .ok_or_else(|| HttpError::not_found(id))?;
    let mut views = learning_module_views(app_state, &[detail]).await;
    views.pop().ok_or_else(|| HttpError::not_found(id))
}

#[utoipa::path(
    post,
    path = "/api/learningmodules/search",
    request_body = FilterRequest,
    responses((status = 200, body = Vec<LearningModule>)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn search_learning_modules(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Json(request): Json<FilterRequest>,
) -> ApiResult<Json<Vec<LearningModule>>> {
    request.validate()?;
    let filter = request.to_model()?;
    let user_id = user.id();
    let conn = app_state.pool.get().in_current_span().await?;
    let details = interact!(conn, move |conn| {
        let modules = repository::learning_module::search_learning_modules(conn, &filter)?;
        repository::learning_module::get_learning_module_details(conn, modules, user_id)
    })
    .in_current_span()
    .await??;
    Ok(Json(learning_module_views(&app_state, &details).await))
}

#[utoipa::path(
    post,
    path = "/api/learningmodules",
    request_body = LearningModuleRequest,
    responses((status = 200, body = LearningModule)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn create_learning_module(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Json(request): Json<LearningModuleRequest>,
) -> ApiResult<Json<LearningModule>> {
    user.require(&app_state, Policy::TeacherOrAdmin).await?;
    request.validate()?;
    let (learning_module, tag_ids) = request.to_new_model(Audit::new(user.id()))?;
    let id = learning_module.id;
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::learning_module::insert_learning_module(conn, &learning_module, &tag_ids)
    })
    .in_current_span()
    .await??;
    Ok(Json(learning_module_view(&app_state, id, user.id()).await?))
}

#[utoipa::path(
    get,
    path = "/api/learningmodules/{id}",
    params(("id" = String, Path,)),
    responses((status = 200, body = LearningModuleWithResources), (status = 404)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn get_learning_module(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<LearningModuleWithResources>> {
    let id: model::LearningModuleId = LearningModuleId(id).try_into()?;
    let learning_module = learning_module_view(&app_state, id, user.id()).await?;
    let user_id = user.id();
    let conn = app_state.pool.get().in_current_span().await?;
    let resource_details = interact!(conn, move |conn| {
        let resources = repository::resource_module::get_resources_in_module(conn, id)?;
        repository::resource::get_resource_details(conn, resources, user_id)
    })
    .in_current_span()
    .await??;
    Ok(Json(LearningModuleWithResources {
        learning_module,
        resources: resource_views(&app_state, &resource_details).await,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/learningmodules/{id}",
    params(("id" = String, Path,)),
    request_body = LearningModuleRequest,
    responses((status = 200, body = LearningModule), (status = 403), (status = 404)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn update_learning_module(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<LearningModuleRequest>,
) -> ApiResult<Json<LearningModule>> {
    request.validate()?;
    let id: model::LearningModuleId = LearningModuleId(id).try_into()?;
    let existing = load_for_modification(&app_state, &user, id).await?;
    let (learning_module, tag_ids) = request.to_updated_model(&existing, user.id())?;
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::learning_module::update_learning_module(conn, &learning_module, &tag_ids)
    })
    .in_current_span()
    .await??;
    Ok(Json(learning_module_view(&app_state, id, user.id()).await?))
}

#[utoipa::path(
    delete,
    path = "/api/learningmodules/{id}",
    params(("id" = String, Path,)),
    responses((status = 200), (status = 403), (status = 404)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn delete_learning_module(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id: model::LearningModuleId = LearningModuleId(id).try_into()?;
    load_for_modification(&app_state, &user, id).await?;
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::learning_module::delete_learning_module(conn, id)
    })
    .in_current_span()
    .await??;
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/learningmodules/{id}/resources",
    params(("id" = String, Path,)),
    request_body = AppendResourcesRequest,
    responses((status = 200, body = AppendResourcesResponse), (status = 403), (status = 404)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn append_resources(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<AppendResourcesRequest>,
) -> ApiResult<Json<AppendResourcesResponse>> {
    request.validate()?;
    let id: model::LearningModuleId = LearningModuleId(id).try_into()?;
    let resource_ids: Vec<model::ResourceId> = parse_ids(&request.resource_ids)?;
    let resource_ids: Vec<model::ResourceId> = resource_ids.into_iter().unique().collect();
    load_for_modification(&app_state, &user, id).await?;
    let user_id = user.id();
    let conn = app_state.pool.get().in_current_span().await?;
    let (found, appended) = interact!(conn, move |conn| {
        let found = repository::resource::get_resources(conn, &resource_ids)?;
        if found.len() < resource_ids.len() {
            return Ok((false, 0));
        }
        let appended = repository::resource_module::append_resources_to_module(
            conn,
            id,
            &resource_ids,
            user_id,
        )?;
        Ok((true, appended))
    })
    .in_current_span()
    .await??;
    if !found {
        return Err(HttpError::not_found("Resource"));
    }
    Ok(Json(AppendResourcesResponse { appended }))
}

#[utoipa::path(
    delete,
    path = "/api/learningmodules/{id}/resources/{resource_id}",
    params(("id" = String, Path,), ("resource_id" = String, Path,)),
    responses((status = 200), (status = 403), (status = 404)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn remove_resource(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path((id, resource_id)): Path<(String, String)>,
) -> ApiResult<()> {
    let id: model::LearningModuleId = LearningModuleId(id).try_into()?;
    let resource_id: model::ResourceId = ResourceId(resource_id).try_into()?;
    load_for_modification(&app_state, &user, id).await?;
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::resource_module::remove_resource_from_module(conn, id, resource_id)
    })
    .in_current_span()
    .await??;
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/learningmodules/{id}/vote",
    params(("id" = String, Path,)),
    responses((status = 200), (status = 404)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn add_vote(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id: model::LearningModuleId = LearningModuleId(id).try_into()?;
    load_learning_module(&app_state, id).await?;
    let user_id = user.id();
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::vote::add_learning_module_vote(conn, id, user_id)
    })
    .in_current_span()
    .await??;
    Ok(())
}

#[utoipa::path(
    delete,
    path = "/api/learningmodules/{id}/vote",
    params(("id" = String, Path,)),
    responses((status = 200)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn remove_vote(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id: model::LearningModuleId = LearningModuleId(id).try_into()?;
    let user_id = user.id();
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::vote::remove_learning_module_vote(conn, id, user_id)
    })
    .in_current_span()
    .await??;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/learningmodules/authors",
    responses((status = 200, body = Vec<Author>)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn get_learning_module_authors(
    State(app_state): State<SharedState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<Author>>> {
    let conn = app_state.pool.get().in_current_span().await?;
    let authors = interact!(conn, move |conn| {
        repository::learning_module::get_learning_module_authors(conn)
    })
    .in_current_span()
    .await??;
    let names = display_names(&app_state, authors.iter().copied()).await;
    let mut authors: Vec<Author> = authors
        .into_iter()
        .map(|id| Author::from_model(id, &names))
        .collect();
    authors.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    Ok(Json(authors))
}
