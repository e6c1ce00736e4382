use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use learnnow_core::bing::ImageResult;

use super::ResourceType;

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_name: String,
    pub attachment_url: String,
    pub resource_type: ResourceType,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImageSearchQuery {
    pub q: String,
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub name: Option<String>,
    pub content_url: String,
    pub thumbnail_url: String,
}

impl Image {
    pub fn from_model(value: &ImageResult) -> Image {
        Image {
            name: value.name.clone(),
            content_url: value.content_url.clone(),
            thumbnail_url: value.thumbnail_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub is_teacher: bool,
    pub is_admin: bool,
}
