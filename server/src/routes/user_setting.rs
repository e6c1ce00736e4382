use std::str::FromStr;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::Instrument;
use validator::Validate;

use learnnow_core::{
    deadpool_diesel, interact,
    model::{self, repository, UserSettingType},
};

use crate::{
    app_state::SharedState,
    http_error::{ApiResult, HttpError},
    identity::CurrentUser,
    schema::UserSetting,
};

pub fn router() -> Router<SharedState> {
    Router::new().route("/:setting_type", get(get_user_setting).put(put_user_setting))
}

fn parse_setting_type(value: &str) -> ApiResult<UserSettingType> {
    UserSettingType::from_str(value)
        .map_err(|_| HttpError::bad_request(format!("unknown setting type '{}'", value)))
}

/// A user who never saved the setting gets an empty filter
#[utoipa::path(
    get,
    path = "/api/usersettings/{setting_type}",
    params(("setting_type" = String, Path, description = "resourceFilter or learningModuleFilter")),
    responses((status = 200, body = UserSetting), (status = 400)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn get_user_setting(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(setting_type): Path<String>,
) -> ApiResult<Json<UserSetting>> {
    let setting_type = parse_setting_type(&setting_type)?;
    let user_id = user.id();
    let conn = app_state.pool.get().in_current_span().await?;
    let setting = interact!(conn, move |conn| {
        repository::user_setting::get_user_setting(conn, user_id, setting_type)
    })
    .in_current_span()
    .await??;
    Ok(Json(match setting {
        Some(setting) => UserSetting::from_model(&setting.filter),
        None => UserSetting::default(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/usersettings/{setting_type}",
    params(("setting_type" = String, Path, description = "resourceFilter or learningModuleFilter")),
    request_body = UserSetting,
    responses((status = 200, body = UserSetting), (status = 400)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn put_user_setting(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    Path(setting_type): Path<String>,
    Json(request): Json<UserSetting>,
) -> ApiResult<Json<UserSetting>> {
    let setting_type = parse_setting_type(&setting_type)?;
    request.validate()?;
    let setting = model::UserSetting {
        user_id: user.id(),
        setting_type,
        filter: request.to_model()?,
        updated_on: chrono::Utc::now(),
    };
    let conn = app_state.pool.get().in_current_span().await?;
    interact!(conn, move |conn| {
        repository::user_setting::upsert_user_setting(conn, &setting)
    })
    .in_current_span()
    .await??;
    Ok(Json(request))
}
