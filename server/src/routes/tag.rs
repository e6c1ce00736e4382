use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
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
    schema::{DeleteRequest, Tag, TagId, TagRequest},
};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(get_tags).post(create_tag))
        .route("/delete", post(delete_tags))
        .route("/:id", patch(update_tag))
}

#[utoipa::path(
    get,
    path = "/api/tags",
    responses((status = 200, body = Vec<Tag>)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn get_tags(
    State(app_state): State<SharedState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<Tag>>> {
    let conn = app_state.pool.get().in_current_span().await?;
    let tags: Vec<Tag> = interact!(conn, move |conn| {
        repository::taxonomy::tag::get_all(conn)
    })
    .in_current_span()
    .await??
    .iter()
    .map(Tag::from_model)
    .collect();
    Ok(Json(tags))
}

#[utoipa::path(
    post,
    path = "/api/tags",
    request_body = TagRequest,
    responses((status = 200, body = Tag)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn create_tag(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Json(request): Json<TagRequest>,
) -> ApiResult<Json<Tag>> {
    user.require(&app_state, Policy::Admin).await?;
    request.validate()?;
    let tag = request.to_new_model(Audit::new(user.id()));
    let conn = app_state.pool.get().in_current_span().await?;
    let inserted = tag.clone();
    interact!(conn, move |conn| {
        repository::taxonomy::tag::insert(conn, &inserted)
    })
    .in_current_span()
    .await??;
    Ok(Json(Tag::from_model(&tag)))
}

#[utoipa::path(
    patch,
    path = "/api/tags/{id}",
    request_body = TagRequest,
    params(("id" = String, Path,)),
    responses((status = 200, body = Tag)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn update_tag(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<TagRequest>,
) -> ApiResult<Json<Tag>> {
    user.require(&app_state, Policy::Admin).await?;
    request.validate()?;
    let id: model::TagId = TagId(id).try_into()?;
    let conn = app_state.pool.get().in_current_span().await?;
    let existing = interact!(conn, move |conn| {
        repository::taxonomy::tag::get(conn, id)
    })
    .in_current_span()
    .await??
    .ok_or_else(|| HttpError::not_found(id))?;
    let tag = request.to_updated_model(&existing, user.id());
    let updated = tag.clone();
    interact!(conn, move |conn| {
        repository::taxonomy::tag::update_name(conn, &updated)
    })
    .in_current_span()
    .await??;
    Ok(Json(Tag::from_model(&tag)))
}

#[utoipa::path(
    post,
    path = "/api/tags/delete",
    request_body = DeleteRequest,
    responses((status = 200), (status = 409, description = "tag still in use")),
)]
#[tracing::instrument(skip(app_state))]
pub async fn delete_tags(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Json(request): Json<DeleteRequest>,
) -> ApiResult<()> {
    user.require(&app_state, Policy::Admin).await?;
    request.validate()?;
    let ids: Vec<model::TagId> = request.parse_ids::<TagId, _>()?;
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::taxonomy::tag::delete_many(conn, &ids)
    })
    .in_current_span()
    .await??;
    Ok(())
}
