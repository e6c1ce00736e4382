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
    schema::{DeleteRequest, Grade, GradeId, GradeRequest},
};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(get_grades).post(create_grade))
        .route("/delete", post(delete_grades))
        .route("/:id", patch(update_grade))
}

#[utoipa::path(
    get,
    path = "/api/grades",
    responses((status = 200, body = Vec<Grade>)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn get_grades(
    State(app_state): State<SharedState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<Grade>>> {
    let conn = app_state.pool.get().in_current_span().await?;
    let grades: Vec<Grade> = interact!(conn, move |conn| {
        repository::taxonomy::grade::get_all(conn)
    })
    .in_current_span()
    .await??
    .iter()
    .map(Grade::from_model)
    .collect();
    Ok(Json(grades))
}

#[utoipa::path(
    post,
    path = "/api/grades",
    request_body = GradeRequest,
    responses((status = 200, body = Grade)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn create_grade(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Json(request): Json<GradeRequest>,
) -> ApiResult<Json<Grade>> {
    user.require(&app_state, Policy::Admin).await?;
    request.validate()?;
    let grade = request.to_new_model(Audit::new(user.id()));
    let conn = app_state.pool.get().in_current_span().await?;
    let inserted = grade.clone();
    interact!(conn, move |conn| {
        repository::taxonomy::grade::insert(conn, &inserted)
    })
    .in_current_span()
    .await??;
    Ok(Json(Grade::from_model(&grade)))
}

#[utoipa::path(
    patch,
    path = "/api/grades/{id}",
    request_body = GradeRequest,
    params(("id" = String, Path,)),
    responses((status = 200, body = Grade)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn update_grade(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<GradeRequest>,
) -> ApiResult<Json<Grade>> {
    user.require(&app_state, Policy::Admin).await?;
    request.validate()?;
    let id: model::GradeId = GradeId(id).try_into()?;
    let conn = app_state.pool.get().in_current_span().await?;
    let existing = interact!(conn, move |conn| {
        repository::taxonomy::grade::get(conn, id)
    })
    .in_current_span()
    .await??
    .ok_or_else(|| HttpError::not_found(id))?;
    let grade = request.to_updated_model(&existing, user.id());
    let updated = grade.clone();
    interact!(conn, move |conn| {
        repository::taxonomy::grade::update_name(conn, &updated)
    })
    .in_current_span()
    .await??;
    Ok(Json(Grade::from_model(&grade)))
}

#[utoipa::path(
    post,
    path = "/api/grades/delete",
    request_body = DeleteRequest,
    responses((status = 200), (status = 409, description = "grade still in use")),
)]
#[tracing::instrument(skip(app_state))]
pub async fn delete_grades(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Json(request): Json<DeleteRequest>,
) -> ApiResult<()> {
    user.require(&app_state, Policy::Admin).await?;
    request.validate()?;
    let ids: Vec<model::GradeId> = request.parse_ids::<GradeId, _>()?;
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::taxonomy::grade::delete_many(conn, &ids)
    })
    .in_current_span()
    .await??;
    Ok(())
}
