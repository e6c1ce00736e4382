use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use learnnow_core::model::{self, Audit};

use super::{validate_guid, LearningModuleId, TabConfigurationId, UserId};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TabConfigurationRequest {
    #[validate(length(min = 1, max = 200))]
    pub team_id: String,
    #[validate(length(min = 1, max = 200))]
    pub channel_id: Option<String>,
    #[validate(custom = "validate_guid")]
    pub learning_module_id: LearningModuleId,
}

impl TabConfigurationRequest {
    pub fn to_new_model(&self, audit: Audit) -> eyre::Result<model::TabConfiguration> {
        Ok(model::TabConfiguration {
            id: model::TabConfigurationId::new_random(),
            team_id: self.team_id.clone(),
            channel_id: self.channel_id.clone(),
            learning_module_id: (&self.learning_module_id).try_into()?,
            audit,
        })
    }

    pub fn to_updated_model(
        &self,
        existing: &model::TabConfiguration,
        user: model::UserId,
    ) -> eyre::Result<model::TabConfiguration> {
        Ok(model::TabConfiguration {
            id: existing.id,
            team_id: self.team_id.clone(),
            channel_id: self.channel_id.clone(),
            learning_module_id: (&self.learning_module_id).try_into()?,
            audit: existing.audit.touched_by(user),
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TabConfiguration {
    pub id: TabConfigurationId,
    pub team_id: String,
    pub channel_id: Option<String>,
    pub learning_module_id: LearningModuleId,
    pub created_by: UserId,
    pub updated_by: UserId,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl TabConfiguration {
    pub fn from_model(value: &model::TabConfiguration) -> TabConfiguration {
        TabConfiguration {
            id: value.id.into(),
            team_id: value.team_id.clone(),
            channel_id: value.channel_id.clone(),
            learning_module_id: value.learning_module_id.into(),
            created_by: value.audit.created_by.into(),
            updated_by: value.audit.updated_by.into(),
            created_on: value.audit.created_on,
            updated_on: value.audit.updated_on,
        }
    }
}
