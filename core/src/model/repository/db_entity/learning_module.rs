use diesel::{Insertable, Queryable, Selectable};

use crate::model::{
    util::{datetime_to_db_repr, uuid_from_db_repr, uuid_to_db_repr},
    GradeId, LearningModule, LearningModuleId, SubjectId,
};

use super::audit_from_db;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = super::super::schema::LearningModule)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbLearningModule {
    pub learning_module_id: String,
    pub title: String,
    pub description: String,
    pub subject_id: String,
    pub grade_id: String,
    pub image_url: String,
    pub created_by: String,
    pub updated_by: String,
    pub created_on: i64,
    pub updated_on: i64,
}

impl TryFrom<DbLearningModule> for LearningModule {
    type Error = eyre::Report;

    fn try_from(value: DbLearningModule) -> Result<Self, Self::Error> {
        Ok(LearningModule {
            id: LearningModuleId(uuid_from_db_repr(&value.learning_module_id)?),
            subject_id: SubjectId(uuid_from_db_repr(&value.subject_id)?),
            grade_id: GradeId(uuid_from_db_repr(&value.grade_id)?),
            audit: audit_from_db(
                &value.created_by,
                &value.updated_by,
                value.created_on,
                value.updated_on,
            )?,
            title: value.title,
            description: value.description,
            image_url: value.image_url,
        })
    }
}

impl From<&LearningModule> for DbLearningModule {
    fn from(value: &LearningModule) -> Self {
        DbLearningModule {
            learning_module_id: uuid_to_db_repr(&value.id.0),
            title: value.title.clone(),
            description: value.description.clone(),
            subject_id: uuid_to_db_repr(&value.subject_id.0),
            grade_id: uuid_to_db_repr(&value.grade_id.0),
            image_url: value.image_url.clone(),
            created_by: uuid_to_db_repr(&value.audit.created_by.0),
            updated_by: uuid_to_db_repr(&value.audit.updated_by.0),
            created_on: datetime_to_db_repr(&value.audit.created_on),
            updated_on: datetime_to_db_repr(&value.audit.updated_on),
        }
    }
}
