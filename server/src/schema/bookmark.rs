use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::{validate_guid, LearningModuleId, ResourceId};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBookmarkRequest {
    #[validate(custom = "validate_guid")]
    pub resource_id: ResourceId,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LearningModuleBookmarkRequest {
    #[validate(custom = "validate_guid")]
    pub learning_module_id: LearningModuleId,
}
