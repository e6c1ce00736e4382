use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
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
    schema::{Author, FilterRequest, Resource, ResourceId, ResourceRequest},
};

use super::{display_names, resource_views};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(create_resource))
        .route("/search", post(search_resources))
        .route("/authors", get(get_resource_authors))
        .route(
            "/:id",
            get(get_resource)
                .patch(update_resource)
                .delete(delete_resource),
        )
        .route("/:id/vote", post(add_vote).delete(remove_vote))
}

async fn load_resource(
    app_state: &SharedState,
    id: model::ResourceId,
) -> ApiResult<model::Resource> {
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::resource::get_resource(conn, id)
    })
    .in_current_span()
    .await??
    .ok_or_else(|| HttpError::not_found(id))
}

async fn resource_view(
    app_state: &SharedState,
    id: model::ResourceId,
    user: model::UserId,
) -> ApiResult<Resource> {
    let conn = app_state.pool.get().in_current_span().await?;
    let detail = interact!(conn, move |conn| {
        repository::resource::get_resource_detail(conn, id, user)
    })
    .in_current_span()
    .await??
    .ok_or_else(|| HttpError::not_found(id))?;
    let mut views = resource_views(app_state, &[detail]).await;
    views.pop().ok_or_else(|| HttpError::not_found(id))
}

#[utoipa::path(
    post,
    path = "/api/resources/search",
    request_body = FilterRequest,
    responses((status = 200, body = Vec<Resource>)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn search_resources(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Json(request): Json<FilterRequest>,
) -> ApiResult<Json<Vec<Resource>>> {
    request.validate()?;
    let filter = request.to_model()?;
    let user_id = user.id();
    let conn = app_state.pool.get().in_current_span().await?;
    let details = interact!(conn, move |conn| {
        let resources = repository::resource::search_resources(conn, &filter)?;
        repository::resource::get_resource_details(conn, resources, user_id)
    })
    .in_current_span()
    .await??;
    Ok(Json(resource_views(&app_state, &details).await))
}

#[utoipa::path(
    post,
    path = "/api/resources",
    request_body = ResourceRequest,
    responses((status = 200, body = Resource)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn create_resource(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Json(request): Json<ResourceRequest>,
) -> ApiResult<Json<Resource>> {
    user.require(&app_state, Policy::TeacherOrAdmin).await?;
    request.validate()?;
    let (resource, tag_ids) = request.to_new_model(Audit::new(user.id()))?;
    let id = resource.id;
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::resource::insert_resource(conn, &resource, &tag_ids)
    })
    .in_current_span()
    .await??;
    Ok(Json(resource_view(&app_state, id, user.id()).await?))
}

#[utoipa::path(
    get,
    path = "/api/resources/{id}",
    params(("id" = String, Path,)),
    responses((status = 200, body = Resource), (status = 404)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn get_resource(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Resource>> {
    let id: model::ResourceId = ResourceId(id).try_into()?;
    Ok(Json(resource_view(&app_state, id, user.id()).await?))
}

#[utoipa::path(
    patch,
    path = "/api/resources/{id}",
    params(("id" = String, Path,)),
    request_body = ResourceRequest,
    responses((status = 200, body = Resource), (status = 403), (status = 404)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn update_resource(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<ResourceRequest>,
) -> ApiResult<Json<Resource>> {
    user.require(&app_state, Policy::TeacherOrAdmin).await?;
    request.validate()?;
    let id: model::ResourceId = ResourceId(id).try_into()?;
    let existing = load_resource(&app_state, id).await?;
    user.require_owner_or_admin(&app_state, &existing.audit)
        .await?;
    let (resource, tag_ids) = request.to_updated_model(&existing, user.id())?;
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::resource::update_resource(conn, &resource, &tag_ids)
    })
    .in_current_span()
    .await??;
    Ok(Json(resource_view(&app_state, id, user.id()).await?))
}

#[utoipa::path(
    delete,
    path = "/api/resources/{id}",
    params(("id" = String, Path,)),
    responses((status = 200), (status = 403), (status = 404)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn delete_resource(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    user.require(&app_state, Policy::TeacherOrAdmin).await?;
    let id: model::ResourceId = ResourceId(id).try_into()?;
    let existing = load_resource(&app_state, id).await?;
    user.require_owner_or_admin(&app_state, &existing.audit)
        .await?;
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::resource::delete_resource(conn, id)
    })
    .in_current_span()
    .await??;
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/resources/{id}/vote",
    params(("id" = String, Path,)),
    responses((status = 200), (status = 404)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn add_vote(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id: model::ResourceId = ResourceId(id).try_into()?;
    load_resource(&app_state, id).await?;
    let user_id = user.id();
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::vote::add_resource_vote(conn, id, user_id)
    })
    .in_current_span()
    .await??;
    Ok(())
}

#[utoipa::path(
    delete,
    path = "/api/resources/{id}/vote",
    params(("id" = String, Path,)),
    responses((status = 200)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn remove_vote(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id: model::ResourceId = ResourceId(id).try_into()?;
    let user_id = user.id();
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::vote::remove_resource_vote(conn, id, user_id)
    })
    .in_current_span()
    .await??;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/resources/authors",
    responses((status = 200, body = Vec<Author>)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn get_resource_authors(
    State(app_state): State<SharedState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<Author>>> {
    let conn = app_state.pool.get().in_current_span().await?;
    let authors = interact!(conn, move |conn| {
        repository::resource::get_resource_authors(conn)
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
