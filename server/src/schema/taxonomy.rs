use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use learnnow_core::model::{self, Audit};

use super::{validate_guids, validate_not_blank, GradeId, SubjectId, TagId, UserId};

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: GradeId,
    pub grade_name: String,
    pub created_by: UserId,
    pub updated_by: UserId,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub subject_name: String,
    pub created_by: UserId,
    pub updated_by: UserId,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: TagId,
    pub tag_name: String,
    pub created_by: UserId,
    pub updated_by: UserId,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl Grade {
    pub fn from_model(value: &model::Grade) -> Grade {
        Grade {
            id: value.id.into(),
            grade_name: value.grade_name.clone(),
            created_by: value.audit.created_by.into(),
            updated_by: value.audit.updated_by.into(),
            created_on: value.audit.created_on,
            updated_on: value.audit.updated_on,
        }
    }
}

impl Subject {
    pub fn from_model(value: &model::Subject) -> Subject {
        Subject {
            id: value.id.into(),
            subject_name: value.subject_name.clone(),
            created_by: value.audit.created_by.into(),
            updated_by: value.audit.updated_by.into(),
            created_on: value.audit.created_on,
            updated_on: value.audit.updated_on,
        }
    }
}

impl Tag {
    pub fn from_model(value: &model::Tag) -> Tag {
        Tag {
            id: value.id.into(),
            tag_name: value.tag_name.clone(),
            created_by: value.audit.created_by.into(),
            updated_by: value.audit.updated_by.into(),
            created_on: value.audit.created_on,
            updated_on: value.audit.updated_on,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GradeRequest {
    #[validate(length(min = 1, max = 25), custom = "validate_not_blank")]
    pub grade_name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRequest {
    #[validate(length(min = 1, max = 25), custom = "validate_not_blank")]
    pub subject_name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TagRequest {
    #[validate(length(min = 1, max = 25), custom = "validate_not_blank")]
    pub tag_name: String,
}

impl GradeRequest {
    pub fn to_new_model(&self, audit: Audit) -> model::Grade {
        model::Grade {
            id: model::GradeId::new_random(),
            grade_name: self.grade_name.trim().to_owned(),
            audit,
        }
    }

    /// Keeps id and creation audit fields of `existing`
    pub fn to_updated_model(&self, existing: &model::Grade, user: model::UserId) -> model::Grade {
        model::Grade {
            id: existing.id,
            grade_name: self.grade_name.trim().to_owned(),
            audit: existing.audit.touched_by(user),
        }
    }
}

impl SubjectRequest {
    pub fn to_new_model(&self, audit: Audit) -> model::Subject {
        model::Subject {
            id: model::SubjectId::new_random(),
            subject_name: self.subject_name.trim().to_owned(),
            audit,
        }
    }

    pub fn to_updated_model(
        &self,
        existing: &model::Subject,
        user: model::UserId,
    ) -> model::Subject {
        model::Subject {
            id: existing.id,
            subject_name: self.subject_name.trim().to_owned(),
            audit: existing.audit.touched_by(user),
        }
    }
}

impl TagRequest {
    pub fn to_new_model(&self, audit: Audit) -> model::Tag {
        model::Tag {
            id: model::TagId::new_random(),
            tag_name: self.tag_name.trim().to_owned(),
            audit,
        }
    }

    pub fn to_updated_model(&self, existing: &model::Tag, user: model::UserId) -> model::Tag {
        model::Tag {
            id: existing.id,
            tag_name: self.tag_name.trim().to_owned(),
            audit: existing.audit.touched_by(user),
        }
    }
}

/// Grade, subject or tag ids to delete in one go
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    #[validate(length(min = 1), custom = "validate_guids")]
    pub ids: Vec<String>,
}

impl DeleteRequest {
    pub fn parse_ids<A, M>(&self) -> eyre::Result<Vec<M>>
    where
        A: From<String>,
        M: TryFrom<A, Error = eyre::Report>,
    {
        self.ids
            .iter()
            .map(|id| M::try_from(A::from(id.clone())))
            .collect()
    }
}
