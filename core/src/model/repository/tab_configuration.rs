use diesel::prelude::*;
use eyre::{Context, Result};
use tracing::instrument;

use crate::model::{
    self, repository::db_entity::DbTabConfiguration, util::uuid_to_db_repr, TabConfigurationId,
};

use super::{conflict_on_violation, db::DbConn, schema, RepositoryError};

#[instrument(skip(conn), level = "debug")]
pub fn insert_tab_configuration(
    conn: &mut DbConn,
    tab_configuration: &model::TabConfiguration,
) -> Result<()> {
    use schema::TabConfiguration;
    diesel::insert_into(TabConfiguration::table)
        .values(DbTabConfiguration::from(tab_configuration))
        .execute(conn)
        .map_err(|err| conflict_on_violation(err, "insert into TabConfiguration"))?;
    Ok(())
}

#[instrument(skip(conn), level = "trace")]
pub fn get_tab_configuration(
    conn: &mut DbConn,
    id: TabConfigurationId,
) -> Result<Option<model::TabConfiguration>> {
    use schema::TabConfiguration;
    let row: Option<DbTabConfiguration> = TabConfiguration::table
        .find(uuid_to_db_repr(&id.0))
        .select(DbTabConfiguration::as_select())
        .first(conn)
        .optional()
        .wrap_err("could not query table TabConfiguration")?;
    row.map(|row| row.try_into()).transpose()
}

/// Rebinds the tab to another learning module.
#[instrument(skip(conn), level = "debug")]
pub fn update_tab_configuration(
    conn: &mut DbConn,
    tab_configuration: &model::TabConfiguration,
) -> Result<()> {
    use schema::TabConfiguration;
    let db_tab = DbTabConfiguration::from(tab_configuration);
    let updated = diesel::update(TabConfiguration::table.find(&db_tab.tab_configuration_id))
        .set((
            TabConfiguration::team_id.eq(&db_tab.team_id),
            TabConfiguration::channel_id.eq(&db_tab.channel_id),
            TabConfiguration::learning_module_id.eq(&db_tab.learning_module_id),
            TabConfiguration::updated_by.eq(&db_tab.updated_by),
            TabConfiguration::updated_on.eq(db_tab.updated_on),
        ))
        .execute(conn)
        .map_err(|err| conflict_on_violation(err, "update TabConfiguration"))?;
    if updated == 0 {
        return Err(RepositoryError::NotFound(tab_configuration.id.to_string()).into());
    }
    Ok(())
}

#[instrument(skip(conn), level = "debug")]
pub fn delete_tab_configuration(conn: &mut DbConn, id: TabConfigurationId) -> Result<()> {
    use schema::TabConfiguration;
    let deleted =
        diesel::delete(TabConfiguration::table.find(uuid_to_db_repr(&id.0))).execute(conn)?;
    if deleted == 0 {
        return Err(RepositoryError::NotFound(id.to_string()).into());
    }
    Ok(())
}
