use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::Instrument;

use crate::{
    app_state::SharedState,
    http_error::{ApiResult, HttpError},
    identity::CurrentUser,
    schema::{Image, ImageSearchQuery},
};

const DEFAULT_IMAGE_COUNT: u32 = 20;

pub fn router() -> Router<SharedState> {
    Router::new().route("/search", get(search_images))
}

#[utoipa::path(
    get,
    path = "/api/images/search",
    params(ImageSearchQuery),
    responses((status = 200, body = Vec<Image>), (status = 400)),
)]
#[tracing::instrument(skip(app_state))]
pub async fn search_images(
    State(app_state): State<SharedState>,
    _user: CurrentUser,
    Query(query): Query<ImageSearchQuery>,
) -> ApiResult<Json<Vec<Image>>> {
    let client = app_state
        .image_search
        .as_ref()
        .ok_or_else(|| HttpError::bad_request("image search is not configured"))?;
    if query.q.trim().is_empty() {
        return Err(HttpError::bad_request("search text is required"));
    }
    let images = client
        .search_images(&query.q, query.count.unwrap_or(DEFAULT_IMAGE_COUNT))
        .in_current_span()
        .await?;
    Ok(Json(images.iter().map(Image::from_model).collect()))
}
