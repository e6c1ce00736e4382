use chrono::{DateTime, Utc};
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{GradeId, SubjectId, TagId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum UserSettingType {
    ResourceFilter,
    LearningModuleFilter,
}

impl UserSettingType {
    pub fn to_db_repr(self) -> i32 {
        match self {
            UserSettingType::ResourceFilter => 0,
            UserSettingType::LearningModuleFilter => 1,
        }
    }

    pub fn from_db_repr(value: i32) -> Result<UserSettingType> {
        match value {
            0 => Ok(UserSettingType::ResourceFilter),
            1 => Ok(UserSettingType::LearningModuleFilter),
            other => Err(eyre!("invalid UserSettingType {}", other)),
        }
    }
}

/// Filter selections a user saved in the filter bar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFilter {
    pub grade_ids: Vec<GradeId>,
    pub subject_ids: Vec<SubjectId>,
    pub tag_ids: Vec<TagId>,
    pub created_by: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSetting {
    pub user_id: UserId,
    pub setting_type: UserSettingType,
    pub filter: SavedFilter,
    pub updated_on: DateTime<Utc>,
}
