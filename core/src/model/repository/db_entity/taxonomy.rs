use diesel::{Queryable, Selectable};

use crate::model::{util::uuid_from_db_repr, Grade, GradeId, Subject, SubjectId, Tag, TagId};

use super::audit_from_db;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = super::super::schema::Grade)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbGrade {
    pub grade_id: String,
    pub grade_name: String,
    pub created_by: String,
    pub updated_by: String,
    pub created_on: i64,
    pub updated_on: i64,
}

impl TryFrom<DbGrade> for Grade {
    type Error = eyre::Report;

    fn try_from(value: DbGrade) -> Result<Self, Self::Error> {
        Ok(Grade {
            id: GradeId(uuid_from_db_repr(&value.grade_id)?),
            audit: audit_from_db(
                &value.created_by,
                &value.updated_by,
                value.created_on,
                value.updated_on,
            )?,
            grade_name: value.grade_name,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = super::super::schema::Subject)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbSubject {
    pub subject_id: String,
    pub subject_name: String,
    pub created_by: String,
    pub updated_by: String,
    pub created_on: i64,
    pub updated_on: i64,
}

impl TryFrom<DbSubject> for Subject {
    type Error = eyre::Report;

    fn try_from(value: DbSubject) -> Result<Self, Self::Error> {
        Ok(Subject {
            id: SubjectId(uuid_from_db_repr(&value.subject_id)?),
            audit: audit_from_db(
                &value.created_by,
                &value.updated_by,
                value.created_on,
                value.updated_on,
            )?,
            subject_name: value.subject_name,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = super::super::schema::Tag)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbTag {
    pub tag_id: String,
    pub tag_name: String,
    pub created_by: String,
    pub updated_by: String,
    pub created_on: i64,
    pub updated_on: i64,
}

impl TryFrom<DbTag> for Tag {
    type Error = eyre::Report;

    fn try_from(value: DbTag) -> Result<Self, Self::Error> {
        Ok(Tag {
            id: TagId(uuid_from_db_repr(&value.tag_id)?),
            audit: audit_from_db(
                &value.created_by,
                &value.updated_by,
                value.created_on,
                value.updated_on,
            )?,
            tag_name: value.tag_name,
        })
    }
}
