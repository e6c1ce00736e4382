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
    schema::{DeleteRequest, Subject, SubjectId, SubjectRequest},
};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(get_subjects).post(create_subject))
        .route("/delete", post(delete_subjects))
        .route("/:id", patch(update_subject))
}

#[utoipa::path(
    get,
    path = "/api/subjects",
    responses((status = 200, body = Vec<Subject>)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn get_subjects(
    State(app_state): State<SharedState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<Subject>>> {
    let conn = app_state.pool.get().in_current_span().await?;
    let subjects: Vec<Subject> = interact!(conn, move |conn| {
        repository::taxonomy::subject::get_all(conn)
    })
    .in_current_span()
    .await??
    .iter()
    .map(Subject::from_model)
    .collect();
    Ok(Json(subjects))
}

#[utoipa::path(
    post,
    path = "/api/subjects",
    request_body = SubjectRequest,
    responses((status = 200, body = Subject)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn create_subject(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Json(request): Json<SubjectRequest>,
) -> ApiResult<Json<Subject>> {
    user.require(&app_state, Policy::Admin).await?;
    request.validate()?;
    let subject = request.to_new_model(Audit::new(user.id()));
    let conn = app_state.pool.get().in_current_span().await?;
    let inserted = subject.clone();
    interact!(conn, move |conn| {
        repository::taxonomy::subject::insert(conn, &inserted)
    })
    .in_current_span()
    .await??;
    Ok(Json(Subject::from_model(&subject)))
}

#[utoipa::path(
    patch,
    path = "/api/subjects/{id}",
    request_body = SubjectRequest,
    params(("id" = String, Path,)),
    responses((status = 200, body = Subject)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn update_subject(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<SubjectRequest>,
) -> ApiResult<Json<Subject>> {
    user.require(&app_state, Policy::Admin).await?;
    request.validate()?;
    let id: model::SubjectId = SubjectId(id).try_into()?;
    let conn = app_state.pool.get().in_current_span().await?;
    let existing = interact!(conn, move |conn| {
        repository::taxonomy::subject::get(conn, id)
    })
    .in_current_span()
    .await??
    .ok_or_else(|| HttpError::not_found(id))?;
    let subject = request.to_updated_model(&existing, user.id());
    let updated = subject.clone();
    interact!(conn, move |conn| {
        repository::taxonomy::subject::update_name(conn, &updated)
    })
    .in_current_span()
    .await??;
    Ok(Json(Subject::from_model(&subject)))
}

#[utoipa::path(
    post,
    path = "/api/subjects/delete",
    request_body = DeleteRequest,
    responses((status = 200), (status = 409, description = "subject still in use")),
)]
#[tracing::instrument(skip(app_state))]
pub async fn delete_subjects(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Json(request): Json<DeleteRequest>,
) -> ApiResult<()> {
    user.require(&app_state, Policy::Admin).await?;
    request.validate()?;
    let ids: Vec<model::SubjectId> = request.parse_ids::<SubjectId, _>()?;
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::taxonomy::subject::delete_many(conn, &ids)
    })
    .in_current_span()
    .await??;
    Ok(())
}
