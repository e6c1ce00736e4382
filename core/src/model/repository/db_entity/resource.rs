use diesel::{Insertable, Queryable, Selectable};

use crate::model::{
    util::{datetime_to_db_repr, uuid_from_db_repr, uuid_to_db_repr},
    GradeId, Resource, ResourceId, ResourceType, SubjectId,
};

use super::audit_from_db;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = super::super::schema::Resource)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbResource {
    pub resource_id: String,
    pub title: String,
    pub description: String,
    pub subject_id: String,
    pub grade_id: String,
    pub image_url: String,
    pub link_url: Option<String>,
    pub attachment_url: Option<String>,
    pub resource_type: i32,
    pub created_by: String,
    pub updated_by: String,
    pub created_on: i64,
    pub updated_on: i64,
}

impl TryFrom<DbResource> for Resource {
    type Error = eyre::Report;

    fn try_from(value: DbResource) -> Result<Self, Self::Error> {
        Ok(Resource {
            id: ResourceId(uuid_from_db_repr(&value.resource_id)?),
            subject_id: SubjectId(uuid_from_db_repr(&value.subject_id)?),
            grade_id: GradeId(uuid_from_db_repr(&value.grade_id)?),
            resource_type: ResourceType::from_db_repr(value.resource_type)?,
            audit: audit_from_db(
                &value.created_by,
                &value.updated_by,
                value.created_on,
                value.updated_on,
            )?,
            title: value.title,
            description: value.description,
            image_url: value.image_url,
            link_url: value.link_url,
            attachment_url: value.attachment_url,
        })
    }
}

impl From<&Resource> for DbResource {
    fn from(value: &Resource) -> Self {
        DbResource {
            resource_id: uuid_to_db_repr(&value.id.0),
            title: value.title.clone(),
            description: value.description.clone(),
            subject_id: uuid_to_db_repr(&value.subject_id.0),
            grade_id: uuid_to_db_repr(&value.grade_id.0),
            image_url: value.image_url.clone(),
            link_url: value.link_url.clone(),
            attachment_url: value.attachment_url.clone(),
            resource_type: value.resource_type.to_db_repr(),
            created_by: uuid_to_db_repr(&value.audit.created_by.0),
            updated_by: uuid_to_db_repr(&value.audit.updated_by.0),
            created_on: datetime_to_db_repr(&value.audit.created_on),
            updated_on: datetime_to_db_repr(&value.audit.updated_on),
        }
    }
}
