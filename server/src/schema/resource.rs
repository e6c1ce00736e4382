use std::collections::HashMap;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use learnnow_core::model::{self, Audit};

use super::{
    parse_ids, validate_guid, validate_guids, validate_not_blank, Grade, GradeId, ResourceId,
    Subject, SubjectId, Tag, TagId, UserId,
};

lazy_static! {
    pub static ref URL_REGEX: Regex =
        Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("URL regex is valid");
}

pub const MAX_TAGS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ResourceType {
    None,
    Pdf,
    Word,
    PowerPoint,
    Excel,
    Weblink,
}

impl From<model::ResourceType> for ResourceType {
    fn from(value: model::ResourceType) -> Self {
        match value {
            model::ResourceType::None => ResourceType::None,
            model::ResourceType::Pdf => ResourceType::Pdf,
            model::ResourceType::Word => ResourceType::Word,
            model::ResourceType::PowerPoint => ResourceType::PowerPoint,
            model::ResourceType::Excel => ResourceType::Excel,
            model::ResourceType::Weblink => ResourceType::Weblink,
        }
    }
}

impl From<ResourceType> for model::ResourceType {
    fn from(value: ResourceType) -> Self {
        match value {
            ResourceType::None => model::ResourceType::None,
            ResourceType::Pdf => model::ResourceType::Pdf,
            ResourceType::Word => model::ResourceType::Word,
            ResourceType::PowerPoint => model::ResourceType::PowerPoint,
            ResourceType::Excel => model::ResourceType::Excel,
            ResourceType::Weblink => model::ResourceType::Weblink,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_resource_links"))]
pub struct ResourceRequest {
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
    #[validate(regex = "URL_REGEX")]
    pub link_url: Option<String>,
    #[validate(regex = "URL_REGEX")]
    pub attachment_url: Option<String>,
    pub resource_type: ResourceType,
    #[serde(default)]
    #[validate(length(max = 5), custom = "validate_guids")]
    pub tag_ids: Vec<TagId>,
}

/// Weblinks need a link, files need an attachment.
fn validate_resource_links(request: &ResourceRequest) -> Result<(), ValidationError> {
    let resource_type: model::ResourceType = request.resource_type.into();
    if resource_type == model::ResourceType::Weblink && request.link_url.is_none() {
        return Err(ValidationError::new("link_url_required"));
    }
    if resource_type.is_file() && request.attachment_url.is_none() {
        return Err(ValidationError::new("attachment_url_required"));
    }
    Ok(())
}

impl ResourceRequest {
    fn tag_ids(&self) -> eyre::Result<Vec<model::TagId>> {
        let mut tag_ids: Vec<model::TagId> = parse_ids(&self.tag_ids)?;
        tag_ids.sort();
        tag_ids.dedup();
        Ok(tag_ids)
    }

    fn to_model(&self, id: model::ResourceId, audit: Audit) -> eyre::Result<model::Resource> {
        let resource_type: model::ResourceType = self.resource_type.into();
        // only keep the url that matches the type
        let (link_url, attachment_url) = match resource_type {
            model::ResourceType::Weblink => (self.link_url.clone(), None),
            t if t.is_file() => (None, self.attachment_url.clone()),
            _ => (self.link_url.clone(), self.attachment_url.clone()),
        };
        Ok(model::Resource {
            id,
            title: self.title.trim().to_owned(),
            description: self.description.trim().to_owned(),
            subject_id: (&self.subject_id).try_into()?,
            grade_id: (&self.grade_id).try_into()?,
            image_url: self.image_url.clone(),
            link_url,
            attachment_url,
            resource_type,
            audit,
        })
    }

    pub fn to_new_model(&self, audit: Audit) -> eyre::Result<(model::Resource, Vec<model::TagId>)> {
        Ok((
            self.to_model(model::ResourceId::new_random(), audit)?,
            self.tag_ids()?,
        ))
    }

    /// Keeps id and creation audit fields of `existing`
    pub fn to_updated_model(
        &self,
        existing: &model::Resource,
        user: model::UserId,
    ) -> eyre::Result<(model::Resource, Vec<model::TagId>)> {
        Ok((
            self.to_model(existing.id, existing.audit.touched_by(user))?,
            self.tag_ids()?,
        ))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: ResourceId,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub link_url: Option<String>,
    pub attachment_url: Option<String>,
    pub resource_type: ResourceType,
    pub grade: Grade,
    pub subject: Subject,
    pub tags: Vec<Tag>,
    pub vote_count: i64,
    pub is_voted_by_user: bool,
    pub is_bookmarked_by_user: bool,
    pub created_by: UserId,
    /// Empty when the creator is not in the directory anymore
    pub user_display_name: String,
    pub updated_by: UserId,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl Resource {
    pub fn from_model(
        detail: &model::ResourceDetail,
        display_names: &HashMap<model::UserId, String>,
    ) -> Resource {
        let resource = &detail.resource;
        Resource {
            id: resource.id.into(),
            title: resource.title.clone(),
            description: resource.description.clone(),
            image_url: resource.image_url.clone(),
            link_url: resource.link_url.clone(),
            attachment_url: resource.attachment_url.clone(),
            resource_type: resource.resource_type.into(),
            grade: Grade::from_model(&detail.grade),
            subject: Subject::from_model(&detail.subject),
            tags: detail.tags.iter().map(Tag::from_model).collect(),
            vote_count: detail.vote_count,
            is_voted_by_user: detail.voted_by_user,
            is_bookmarked_by_user: detail.bookmarked_by_user,
            created_by: resource.audit.created_by.into(),
            user_display_name: display_names
                .get(&resource.audit.created_by)
                .cloned()
                .unwrap_or_default(),
            updated_by: resource.audit.updated_by.into(),
            created_on: resource.audit.created_on,
            updated_on: resource.audit.updated_on,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub user_id: UserId,
    pub display_name: String,
}

impl Author {
    pub fn from_model(user_id: model::UserId, display_names: &HashMap<model::UserId, String>) -> Author {
        Author {
            user_id: user_id.into(),
            display_name: display_names.get(&user_id).cloned().unwrap_or_default(),
        }
    }
}
