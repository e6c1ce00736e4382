use std::collections::HashMap;

use axum::{routing::get, Json, Router};
use itertools::Itertools;
use tracing::{warn, Instrument};

use learnnow_core::model;

use crate::{
    app_state::{AppState, SharedState},
    http_error::ApiResult,
    identity::CurrentUser,
    schema::{LearningModule, Resource, UserRole},
};

pub mod bookmark;
pub mod file;
pub mod grade;
pub mod image;
pub mod learning_module;
pub mod message;
pub mod resource;
pub mod subject;
pub mod tab_configuration;
pub mod tag;
pub mod user_setting;

/// Display names of `user_ids`. A failed lookup is logged and leaves the
/// names empty instead of failing the request.
pub(crate) async fn display_names(
    app_state: &AppState,
    user_ids: impl IntoIterator<Item = model::UserId>,
) -> HashMap<model::UserId, String> {
    let user_ids: Vec<model::UserId> = user_ids.into_iter().unique().collect();
    if user_ids.is_empty() {
        return HashMap::new();
    }
    match app_state
        .users
        .display_names(&user_ids)
        .in_current_span()
        .await
    {
        Ok(names) => names,
        Err(err) => {
            warn!(?err, "could not look up user display names");
            HashMap::new()
        }
    }
}

pub(crate) async fn resource_views(
    app_state: &AppState,
    details: &[model::ResourceDetail],
) -> Vec<Resource> {
    let names = display_names(
        app_state,
        details.iter().map(|d| d.resource.audit.created_by),
    )
    .await;
    details
        .iter()
        .map(|detail| Resource::from_model(detail, &names))
        .collect()
}

pub(crate) async fn learning_module_views(
    app_state: &AppState,
    details: &[model::LearningModuleDetail],
) -> Vec<LearningModule> {
    let names = display_names(
        app_state,
        details.iter().map(|d| d.learning_module.audit.created_by),
    )
    .await;
    details
        .iter()
        .map(|detail| LearningModule::from_model(detail, &names))
        .collect()
}

#[utoipa::path(
    get,
    path = "/api/user/role",
    responses((status = 200, body = UserRole)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn get_user_role(
    axum::extract::State(app_state): axum::extract::State<SharedState>,
    user: CurrentUser,
) -> ApiResult<Json<UserRole>> {
    let roles = app_state
        .authorizer
        .roles(user.id())
        .in_current_span()
        .await?;
    Ok(Json(UserRole {
        is_teacher: roles.is_teacher,
        is_admin: roles.is_admin,
    }))
}

pub fn user_router() -> Router<SharedState> {
    Router::new().route("/role", get(get_user_role))
}

/// All API routes, to be nested under `/api`
pub fn api_router() -> Router<SharedState> {
    Router::new()
        .nest("/grades", grade::router())
        .nest("/subjects", subject::router())
        .nest("/tags", tag::router())
        .nest("/resources", resource::router())
        .nest("/learningmodules", learning_module::router())
        .nest("/bookmarks", bookmark::router())
        .nest("/tabconfiguration", tab_configuration::router())
        .nest("/usersettings", user_setting::router())
        .nest("/files", file::router())
        .nest("/images", image::router())
        .nest("/user", user_router())
        .nest("/messages", message::router())
}
