use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use eyre::eyre;
use serde_json::Value;
use tracing::{debug, error, Instrument};

use learnnow_core::{
    deadpool_diesel, interact,
    model::{self, repository, ContentFilter},
};

use crate::{
    app_state::SharedState,
    bot::{
        message_response, preview_url, query_response, task_module_response, Activity,
        CardContent, MessagingExtensionQuery, MessagingExtensionResponse, SearchCommand,
        TaskModuleRequest, APOLOGY, COMPOSE_EXTENSION_QUERY, TASK_FETCH,
    },
};

pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(post_activity))
}

/// Bot Framework endpoint. Failed invokes are answered with an apology
/// instead of an error status so Teams shows something to the user.
#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = Value,
    responses((status = 200)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn post_activity(
    State(app_state): State<SharedState>,
    Json(activity): Json<Activity>,
) -> Response {
    if activity.activity_type != "invoke" {
        debug!("ignoring activity");
        return StatusCode::OK.into_response();
    }
    let result = match activity.name.as_deref() {
        Some(COMPOSE_EXTENSION_QUERY) => handle_query(&app_state, activity.value)
            .in_current_span()
            .await
            .and_then(|response| serde_json::to_value(response).map_err(eyre::Report::from)),
        Some(TASK_FETCH) => handle_task_fetch(&app_state, activity.value)
            .in_current_span()
            .await,
        _ => {
            debug!("ignoring invoke");
            return StatusCode::OK.into_response();
        }
    };
    match result {
        Ok(body) => Json(body).into_response(),
        Err(err) => {
            error!(?err, "error handling bot invoke");
            Json(message_response(APOLOGY)).into_response()
        }
    }
}

async fn handle_query(
    app_state: &SharedState,
    value: Value,
) -> eyre::Result<MessagingExtensionResponse> {
    let query: MessagingExtensionQuery = serde_json::from_value(value)?;
    let command = query.command()?;
    let (skip, count) = query.window();
    let filter = ContentFilter {
        search_text: query.search_text(),
        ..Default::default()
    };
    let conn = app_state.pool.get().in_current_span().await?;
    let cards = interact!(conn, move |conn| {
        let cards: Vec<CardContent> = match command {
            SearchCommand::Resources => {
                repository::resource::search_resources_window(conn, &filter, skip, count)?
                    .iter()
                    .map(CardContent::from_resource)
                    .collect()
            }
            SearchCommand::LearningModules => {
                repository::learning_module::search_learning_modules_window(
                    conn, &filter, skip, count,
                )?
                .iter()
                .map(CardContent::from_learning_module)
                .collect()
            }
        };
        Ok(cards)
    })
    .in_current_span()
    .await??;
    Ok(query_response(&cards))
}

async fn handle_task_fetch(app_state: &SharedState, value: Value) -> eyre::Result<Value> {
    let request: TaskModuleRequest = serde_json::from_value(value)?;
    let url = preview_url(&app_state.app_base_url, &request.data)?;
    let target = request.data;
    let conn = app_state.pool.get().in_current_span().await?;
    let title = interact!(conn, move |conn| {
        if let Some(id) = target.resource_id.as_deref() {
            let id = model::ResourceId(uuid::Uuid::parse_str(id)?);
            return Ok(repository::resource::get_resource(conn, id)?.map(|r| r.title));
        }
        if let Some(id) = target.learning_module_id.as_deref() {
            let id = model::LearningModuleId(uuid::Uuid::parse_str(id)?);
            return Ok(repository::learning_module::get_learning_module(conn, id)?
                .map(|m| m.title));
        }
        Ok(None)
    })
    .in_current_span()
    .await??
    .ok_or_else(|| eyre!("preview target does not exist"))?;
    Ok(task_module_response(&title, &url))
}
