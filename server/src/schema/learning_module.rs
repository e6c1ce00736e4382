use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use learnnow_core::model::{self, Audit};

use super::{
    parse_ids, resource::URL_REGEX, validate_guid, validate_guids, validate_not_blank, Grade,
    GradeId, LearningModuleId, Resource, ResourceId, Subject, SubjectId, Tag, TagId, UserId,
};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LearningModuleRequest {
    #[validate(length(min = 1, max = 75), custom = "validate_not_blank")]
    pub title: String,
    #[validate(length(min = 1, max = 300), custom = "validate_not_blank")]
    pub description: String,
    #[validate(custom = "validate_guid")]
    pub subject_id: SubjectId,
    #[validate(custom = "validate_guid")]
    pub grade_id: GradeId,
    #[validate(regex = "URL_REGEX")]
    pub image_url: String,
    #[serde(default)]
    #[validate(length(max = 5), custom = "validate_guids")]
    pub tag_ids: Vec<TagId>,
}

impl LearningModuleRequest {
    fn tag_ids(&self) -> eyre::Result<Vec<model::TagId>> {
        let mut tag_ids: Vec<model::TagId> = parse_ids(&self.tag_ids)?;
        tag_ids.sort();
        tag_ids.dedup();
        Ok(tag_ids)
    }

    fn to_model(
        &self,
        id: model::LearningModuleId,
        audit: Audit,
    ) -> eyre::Result<model::LearningModule> {
        Ok(model::LearningModule {
            id,
            title: self.title.trim().to_owned(),
            description: self.description.trim().to_owned(),
            subject_id: (&self.subject_id).try_into()?,
            grade_id: (&self.grade_id).try_into()?,
            image_url: self.image_url.clone(),
            audit,
        })
    }

    pub fn to_new_model(
        &self,
        audit: Audit,
    ) -> eyre::Result<(model::LearningModule, Vec<model::TagId>)> {
        Ok((
            self.to_model(model::LearningModuleId::new_random(), audit)?,
            self.tag_ids()?,
        ))
    }

    pub fn to_updated_model(
        &self,
        existing: &model::LearningModule,
        user: model::UserId,
    ) -> eyre::Result<(model::LearningModule, Vec<model::TagId>)> {
        Ok((
            self.to_model(existing.id, existing.audit.touched_by(user))?,
            self.tag_ids()?,
        ))
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AppendResourcesRequest {
    #[validate(length(min = 1), custom = "validate_guids")]
    pub resource_ids: Vec<ResourceId>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppendResourcesResponse {
    pub appended: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LearningModule {
    pub id: LearningModuleId,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub grade: Grade,
    pub subject: Subject,
    pub tags: Vec<Tag>,
    pub resource_count: i64,
    pub vote_count: i64,
    pub is_voted_by_user: bool,
    pub is_bookmarked_by_user: bool,
    pub created_by: UserId,
    pub user_display_name: String,
    pub updated_by: UserId,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl LearningModule {
    pub fn from_model(
        detail: &model::LearningModuleDetail,
        display_names: &HashMap<model::UserId, String>,
    ) -> LearningModule {
        let module = &detail.learning_module;
        LearningModule {
            id: module.id.into(),
            title: module.title.clone(),
            description: module.description.clone(),
            image_url: module.image_url.clone(),
            grade: Grade::from_model(&detail.grade),
            subject: Subject::from_model(&detail.subject),
            tags: detail.tags.iter().map(Tag::from_model).collect(),
            resource_count: detail.resource_count,
            vote_count: detail.vote_count,
            is_voted_by_user: detail.voted_by_user,
            is_bookmarked_by_user: detail.bookmarked_by_user,
            created_by: module.audit.created_by.into(),
            user_display_name: display_names
                .get(&module.audit.created_by)
                .cloned()
                .unwrap_or_default(),
            updated_by: module.audit.updated_by.into(),
            created_on: module.audit.created_on,
            updated_on: module.audit.updated_on,
        }
    }
}

/// A learning module with its resources in module order
#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LearningModuleWithResources {
    pub learning_module: LearningModule,
    pub resources: Vec<Resource>,
}

#[cfg(test)]
mod test {
    use claims::{assert_err, assert_ok};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    use super::*;

    fn valid_request() -> LearningModuleRequest {
        LearningModuleRequest {
            title: "Ecosystems".to_owned(),
            description: "Food webs and habitats".to_owned(),
            subject_id: SubjectId("6f2d8a4e-1b3c-4d5e-8f90-a1b2c3d4e5f6".to_owned()),
            grade_id: GradeId("0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d".to_owned()),
            image_url: "http://images.example.com/forest.jpg".to_owned(),
            tag_ids: vec![],
        }
    }

    #[test]
    fn validation() {
        assert_ok!(valid_request().validate());
        let mut request = valid_request();
        request.subject_id = SubjectId(String::new());
        assert_err!(request.validate());
        let mut request = valid_request();
        request.image_url = "forest.jpg".to_owned();
        assert_err!(request.validate());
        let mut request = valid_request();
        request.title = "   ".to_owned();
        assert_err!(request.validate());
        let mut request = valid_request();
        request.description = " ".to_owned();
        assert_err!(request.validate());
        assert_err!(AppendResourcesRequest {
            resource_ids: vec![]
        }
        .validate());
    }

    #[test]
    fn maps_detail_with_counts() {
        let creator = model::UserId(Uuid::from_u128(11));
        let (module, tag_ids) = assert_ok!(valid_request().to_new_model(Audit::new(creator)));
        assert!(tag_ids.is_empty());
        let audit = Audit::new(creator);
        let detail = model::LearningModuleDetail {
            grade: model::Grade {
                id: module.grade_id,
                grade_name: "Grade 4".to_owned(),
                audit: audit.clone(),
            },
            subject: model::Subject {
                id: module.subject_id,
                subject_name: "Science".to_owned(),
                audit,
            },
            tags: vec![],
            vote_count: 0,
            voted_by_user: false,
            bookmarked_by_user: true,
            resource_count: 4,
            learning_module: module.clone(),
        };
        let view = LearningModule::from_model(&detail, &HashMap::new());
        assert_eq!(view.id, LearningModuleId::from(module.id));
        assert_eq!(view.title, "Ecosystems");
        assert_eq!(view.resource_count, 4);
        assert!(view.is_bookmarked_by_user);
        assert_eq!(view.user_display_name, "");
    }
}
