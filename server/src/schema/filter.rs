use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use learnnow_core::model;

use super::{parse_ids, validate_guids, GradeId, SubjectId, TagId, UserId};

/// Search over resources or learning modules. Empty lists do not constrain.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterRequest {
    #[validate(custom = "validate_guids")]
    pub grade_ids: Vec<GradeId>,
    #[validate(custom = "validate_guids")]
    pub subject_ids: Vec<SubjectId>,
    #[validate(custom = "validate_guids")]
    pub tag_ids: Vec<TagId>,
    #[validate(custom = "validate_guids")]
    pub created_by: Vec<UserId>,
    #[validate(length(max = 100))]
    pub search_text: Option<String>,
    #[validate(range(min = 0))]
    pub page: i64,
}

impl FilterRequest {
    pub fn to_model(&self) -> eyre::Result<model::ContentFilter> {
        Ok(model::ContentFilter {
            grade_ids: parse_ids(&self.grade_ids)?,
            subject_ids: parse_ids(&self.subject_ids)?,
            tag_ids: parse_ids(&self.tag_ids)?,
            created_by: parse_ids(&self.created_by)?,
            search_text: self
                .search_text
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(|text| text.to_owned()),
            page: self.page,
        })
    }
}

/// Filter bar selections stored per user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSetting {
    #[validate(custom = "validate_guids")]
    pub grade_ids: Vec<GradeId>,
    #[validate(custom = "validate_guids")]
    pub subject_ids: Vec<SubjectId>,
    #[validate(custom = "validate_guids")]
    pub tag_ids: Vec<TagId>,
    #[validate(custom = "validate_guids")]
    pub created_by: Vec<UserId>,
}

impl UserSetting {
    pub fn from_model(value: &model::SavedFilter) -> UserSetting {
        UserSetting {
            grade_ids: value.grade_ids.iter().map(GradeId::from).collect(),
            subject_ids: value.subject_ids.iter().map(SubjectId::from).collect(),
            tag_ids: value.tag_ids.iter().map(TagId::from).collect(),
            created_by: value.created_by.iter().map(UserId::from).collect(),
        }
    }

    pub fn to_model(&self) -> eyre::Result<model::SavedFilter> {
        Ok(model::SavedFilter {
            grade_ids: parse_ids(&self.grade_ids)?,
            subject_ids: parse_ids(&self.subject_ids)?,
            tag_ids: parse_ids(&self.tag_ids)?,
            created_by: parse_ids(&self.created_by)?,
        })
    }
}
