use diesel::prelude::*;
use eyre::{Context, Result};
use tracing::instrument;

use crate::model::{
    self,
    repository::db_entity::DbUserSetting,
    util::{datetime_to_db_repr, uuid_to_db_repr},
    UserId, UserSettingType,
};

use super::{db::DbConn, schema};

/// Inserts the setting or replaces the stored one of the same type.
#[instrument(skip(conn), level = "debug")]
pub fn upsert_user_setting(conn: &mut DbConn, setting: &model::UserSetting) -> Result<()> {
    use schema::UserSetting;
    let value = serde_json::to_string(&setting.filter).wrap_err("could not serialize filter")?;
    let updated_on = datetime_to_db_repr(&setting.updated_on);
    diesel::insert_into(UserSetting::table)
        .values((
            UserSetting::user_id.eq(uuid_to_db_repr(&setting.user_id.0)),
            UserSetting::setting_type.eq(setting.setting_type.to_db_repr()),
            UserSetting::value.eq(&value),
            UserSetting::updated_on.eq(updated_on),
        ))
        .on_conflict((UserSetting::user_id, UserSetting::setting_type))
        .do_update()
        .set((
            UserSetting::value.eq(&value),
            UserSetting::updated_on.eq(updated_on),
        ))
        .execute(conn)
        .wrap_err("could not upsert into table UserSetting")?;
    Ok(())
}

#[instrument(skip(conn), level = "trace")]
pub fn get_user_setting(
    conn: &mut DbConn,
    user: UserId,
    setting_type: UserSettingType,
) -> Result<Option<model::UserSetting>> {
    use schema::UserSetting;
    let row: Option<DbUserSetting> = UserSetting::table
        .find((uuid_to_db_repr(&user.0), setting_type.to_db_repr()))
        .select(DbUserSetting::as_select())
        .first(conn)
        .optional()
        .wrap_err("could not query table UserSetting")?;
    row.map(|row| row.try_into()).transpose()
}
