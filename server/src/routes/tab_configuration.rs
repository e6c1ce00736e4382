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
    schema::{TabConfiguration, TabConfigurationId, TabConfigurationRequest},
};

pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(create_tab_configuration)).route(
        "/:id",
        get(get_tab_configuration)
            .patch(update_tab_configuration)
            .delete(delete_tab_configuration),
    )
}

async fn load_tab_configuration(
    app_state: &SharedState,
    id: model::TabConfigurationId,
) -> ApiResult<model::TabConfiguration> {
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::tab_configuration::get_tab_configuration(conn, id)
    })
    .in_current_span()
    .await??
    .ok_or_else(|| HttpError::not_found(id))
}

/// Writes the tab configuration, 404 if its learning module does not exist
async fn save_tab_configuration(
    app_state: &SharedState,
    tab_configuration: model::TabConfiguration,
    is_new: bool,
) -> ApiResult<()> {
    let learning_module_id = tab_configuration.learning_module_id;
    let conn = app_state.pool.get().in_current_span().await?;
    let found = interact!(conn, move |conn| {
        if repository::learning_module::get_learning_module(conn, learning_module_id)?.is_none() {
            return Ok(false);
        }
        if is_new {
            repository::tab_configuration::insert_tab_configuration(conn, &tab_configuration)?;
        } else {
            repository::tab_configuration::update_tab_configuration(conn, &tab_configuration)?;
        }
        Ok(true)
    })
    .in_current_span()
    .await??;
    if !found {
        return Err(HttpError::not_found(learning_module_id));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/tabconfiguration",
    request_body = TabConfigurationRequest,
    responses((status = 200, body = TabConfiguration), (status = 403), (status = 404)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn create_tab_configuration(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Json(request): Json<TabConfigurationRequest>,
) -> ApiResult<Json<TabConfiguration>> {
    user.require(&app_state, Policy::TeacherOrAdmin).await?;
    request.validate()?;
    let tab_configuration = request.to_new_model(Audit::new(user.id()))?;
    let view = TabConfiguration::from_model(&tab_configuration);
    save_tab_configuration(&app_state, tab_configuration, true).await?;
    Ok(Json(view))
}

#[utoipa::path(
    get,
    path = "/api/tabconfiguration/{id}",
    params(("id" = String, Path,)),
    responses((status = 200, body = TabConfiguration), (status = 404)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn get_tab_configuration(
    State(app_state): State<SharedState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<TabConfiguration>> {
    let id: model::TabConfigurationId = TabConfigurationId(id).try_into()?;
    let tab_configuration = load_tab_configuration(&app_state, id).await?;
    Ok(Json(TabConfiguration::from_model(&tab_configuration)))
}

#[utoipa::path(
    patch,
    path = "/api/tabconfiguration/{id}",
    params(("id" = String, Path,)),
    request_body = TabConfigurationRequest,
    responses((status = 200, body = TabConfiguration), (status = 403), (status = 404)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn update_tab_configuration(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<TabConfigurationRequest>,
) -> ApiResult<Json<TabConfiguration>> {
    user.require(&app_state, Policy::TeacherOrAdmin).await?;
    request.validate()?;
    let id: model::TabConfigurationId = TabConfigurationId(id).try_into()?;
    let existing = load_tab_configuration(&app_state, id).await?;
    let tab_configuration = request.to_updated_model(&existing, user.id())?;
    let view = TabConfiguration::from_model(&tab_configuration);
    save_tab_configuration(&app_state, tab_configuration, false).await?;
    Ok(Json(view))
}

#[utoipa::path(
    delete,
    path = "/api/tabconfiguration/{id}",
    params(("id" = String, Path,)),
    responses((status = 200), (status = 403), (status = 404)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn delete_tab_configuration(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    user.require(&app_state, Policy::TeacherOrAdmin).await?;
    let id: model::TabConfigurationId = TabConfigurationId(id).try_into()?;
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::tab_configuration::delete_tab_configuration(conn, id)
    })
    .in_current_span()
    .await??;
    Ok(())
}

