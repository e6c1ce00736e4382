use diesel::{Insertable, Queryable, Selectable};

use crate::model::{
    util::{datetime_to_db_repr, uuid_from_db_repr, uuid_to_db_repr},
    LearningModuleId, TabConfiguration, TabConfigurationId,
};

use super::audit_from_db;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = super::super::schema::TabConfiguration)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbTabConfiguration {
    pub tab_configuration_id: String,
    pub team_id: String,
    pub channel_id: Option<String>,
    pub learning_module_id: String,
    pub created_by: String,
    pub updated_by: String,
    pub created_on: i64,
    pub updated_on: i64,
}

impl TryFrom<DbTabConfiguration> for TabConfiguration {
    type Error = eyre::Report;

    fn try_from(value: DbTabConfiguration) -> Result<Self, Self::Error> {
        Ok(TabConfiguration {
            id: TabConfigurationId(uuid_from_db_repr(&value.tab_configuration_id)?),
            learning_module_id: LearningModuleId(uuid_from_db_repr(&value.learning_module_id)?),
            audit: audit_from_db(
                &value.created_by,
                &value.updated_by,
                value.created_on,
                value.updated_on,
            )?,
            team_id: value.team_id,
            channel_id: value.channel_id,
        })
    }
}

impl From<&TabConfiguration> for DbTabConfiguration {
    fn from(value: &TabConfiguration) -> Self {
        DbTabConfiguration {
            tab_configuration_id: uuid_to_db_repr(&value.id.0),
            team_id: value.team_id.clone(),
            channel_id: value.channel_id.clone(),
            learning_module_id: uuid_to_db_repr(&value.learning_module_id.0),
            created_by: uuid_to_db_repr(&value.audit.created_by.0),
            updated_by: uuid_to_db_repr(&value.audit.updated_by.0),
            created_on: datetime_to_db_repr(&value.audit.created_on),
            updated_on: datetime_to_db_repr(&value.audit.updated_on),
        }
    }
}
