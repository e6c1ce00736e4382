use diesel::{Queryable, Selectable};
use eyre::Context;

use crate::model::{
    util::{datetime_from_db_repr, uuid_from_db_repr},
    UserId, UserSetting, UserSettingType,
};

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = super::super::schema::UserSetting)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbUserSetting {
    pub user_id: String,
    pub setting_type: i32,
    /// `SavedFilter` as JSON
    pub value: String,
    pub updated_on: i64,
}

impl TryFrom<DbUserSetting> for UserSetting {
    type Error = eyre::Report;

    fn try_from(value: DbUserSetting) -> Result<Self, Self::Error> {
        Ok(UserSetting {
            user_id: UserId(uuid_from_db_repr(&value.user_id)?),
            setting_type: UserSettingType::from_db_repr(value.setting_type)?,
            filter: serde_json::from_str(&value.value)
                .wrap_err("could not parse UserSetting.value")?,
            updated_on: datetime_from_db_repr(value.updated_on)?,
        })
    }
}
