use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::body::AsyncReadBody;
use tracing::{debug, Instrument};

use learnnow_core::{
    auth::Policy,
    model,
    storage::{self, StorageProvider, MAX_UPLOAD_BYTES},
};

use crate::{
    app_state::SharedState,
    http_error::{ApiResult, HttpError},
    identity::CurrentUser,
    mime_type::{guess_mime_type, guess_mime_type_key, OCTET_STREAM},
    schema::UploadResponse,
};

pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx", "jpg", "jpeg", "png", "gif", "bmp", "webp",
];

pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/",
            // room for the multipart framing around a maximum size file
            post(upload_file).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024)),
        )
        .route("/:key", get(get_file))
}

/// Extension of an uploaded file if it may be stored
pub fn allowed_extension(file_name: &str) -> Option<String> {
    storage::file_extension(file_name).filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

pub fn attachment_url(app_base_url: &str, key: &str) -> String {
    format!("{}/api/files/{}", app_base_url, key)
}

#[utoipa::path(
    post,
    path = "/api/files",
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses((status = 200, body = UploadResponse), (status = 400), (status = 403)),
)]
#[tracing::instrument(skip(app_state, multipart))]
pub async fn upload_file(
    State(app_state): State<SharedState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    user.require(&app_state, Policy::TeacherOrAdmin).await?;
    let field = multipart
        .next_field()
        .await
        .map_err(|err| HttpError::bad_request(format!("invalid multipart body: {}", err)))?
        .ok_or_else(|| HttpError::bad_request("no file in request"))?;
    let file_name = field
        .file_name()
        .map(|name| name.to_owned())
        .ok_or_else(|| HttpError::bad_request("multipart field has no file name"))?;
    let ext = allowed_extension(&file_name)
        .ok_or_else(|| HttpError::bad_request(format!("file type of '{}' is not allowed", file_name)))?;
    let data = field
        .bytes()
        .await
        .map_err(|err| HttpError::bad_request(format!("could not read upload: {}", err)))?;
    if data.is_empty() {
        return Err(HttpError::bad_request("uploaded file is empty"));
    }
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(HttpError::bad_request("uploaded file is too large"));
    }
    let key = storage::new_file_key(&file_name);
    let content_type = guess_mime_type(&ext).unwrap_or(std::borrow::Cow::Borrowed(OCTET_STREAM));
    debug!(%key, len = data.len(), "storing upload");
    app_state
        .storage
        .write(&key, data.to_vec(), &content_type)
        .in_current_span()
        .await?;
    Ok(Json(UploadResponse {
        file_name,
        attachment_url: attachment_url(&app_state.app_base_url, &key),
        resource_type: model::ResourceType::from_file_extension(&ext).into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/files/{key}",
    params(("key" = String, Path,)),
    responses(
        (status = 200, body = String, content_type = "application/octet-stream"),
        (status = 404),
    ),
)]
#[tracing::instrument(skip(app_state))]
pub async fn get_file(
    State(app_state): State<SharedState>,
    _user: CurrentUser,
    Path(key): Path<String>,
) -> ApiResult<Response> {
    let read = app_state
        .storage
        .open_read_stream(&key)
        .in_current_span()
        .await?;
    let headers = [(CONTENT_TYPE, guess_mime_type_key(&key).into_owned())];
    Ok((headers, AsyncReadBody::new(read)).into_response())
}
