use diesel::prelude::*;
use eyre::{Context, Result};
use tracing::instrument;

use crate::model::{
    self,
    repository::db_entity::{DbLearningModule, DbResource},
    util::{datetime_to_db_repr, uuid_to_db_repr},
    LearningModuleId, ResourceId, UserId,
};

use super::{conflict_on_violation, db::DbConn, schema};

/// Bookmarks a resource for a user. Bookmarking twice is a no-op.
#[instrument(skip(conn), level = "debug")]
pub fn add_user_resource(conn: &mut DbConn, user: UserId, resource_id: ResourceId) -> Result<bool> {
    use schema::UserResource;
    let inserted = diesel::insert_or_ignore_into(UserResource::table)
        .values((
            UserResource::user_id.eq(uuid_to_db_repr(&user.0)),
            UserResource::resource_id.eq(uuid_to_db_repr(&resource_id.0)),
            UserResource::created_on.eq(datetime_to_db_repr(&chrono::Utc::now())),
        ))
        .execute(conn)
        .map_err(|err| conflict_on_violation(err, "insert into UserResource"))?;
    Ok(inserted > 0)
}

#[instrument(skip(conn), level = "debug")]
pub fn remove_user_resource(
    conn: &mut DbConn,
    user: UserId,
    resource_id: ResourceId,
) -> Result<bool> {
    use schema::UserResource;
    let deleted = diesel::delete(
        UserResource::table.find((uuid_to_db_repr(&user.0), uuid_to_db_repr(&resource_id.0))),
    )
    .execute(conn)?;
    Ok(deleted > 0)
}

/// Bookmarked resources, most recently bookmarked first
#[instrument(skip(conn), level = "trace")]
pub fn get_user_resources(conn: &mut DbConn, user: UserId) -> Result<Vec<model::Resource>> {
    use schema::{Resource, UserResource};
    Resource::table
        .inner_join(UserResource::table)
        .filter(UserResource::user_id.eq(uuid_to_db_repr(&user.0)))
        .order_by(UserResource::created_on.desc())
        .select(DbResource::as_select())
        .load(conn)
        .wrap_err("could not query tables Resource, UserResource")?
        .into_iter()
        .map(|row| row.try_into())
        .collect::<Result<Vec<_>>>()
}

#[instrument(skip(conn), level = "debug")]
pub fn add_user_learning_module(
    conn: &mut DbConn,
    user: UserId,
    learning_module_id: LearningModuleId,
) -> Result<bool> {
    use schema::UserLearningModule;
    let inserted = diesel::insert_or_ignore_into(UserLearningModule::table)
        .values((
            UserLearningModule::user_id.eq(uuid_to_db_repr(&user.0)),
            UserLearningModule::learning_module_id.eq(uuid_to_db_repr(&learning_module_id.0)),
            UserLearningModule::created_on.eq(datetime_to_db_repr(&chrono::Utc::now())),
        ))
        .execute(conn)
        .map_err(|err| conflict_on_violation(err, "insert into UserLearningModule"))?;
    Ok(inserted > 0)
}

#[instrument(skip(conn), level = "debug")]
pub fn remove_user_learning_module(
    conn: &mut DbConn,
    user: UserId,
    learning_module_id: LearningModuleId,
) -> Result<bool> {
    use schema::UserLearningModule;
    let deleted = diesel::delete(UserLearningModule::table.find((
        uuid_to_db_repr(&user.0),
        uuid_to_db_repr(&learning_module_id.0),
    )))
    .execute(conn)?;
    Ok(deleted > 0)
}

/// Bookmarked learning modules, most recently bookmarked first
#[instrument(skip(conn), level = "trace")]
pub fn get_user_learning_modules(
    conn: &mut DbConn,
    user: UserId,
) -> Result<Vec<model::LearningModule>> {
    use schema::{LearningModule, UserLearningModule};
    LearningModule::table
        .inner_join(UserLearningModule::table)
        .filter(UserLearningModule::user_id.eq(uuid_to_db_repr(&user.0)))
        .order_by(UserLearningModule::created_on.desc())
        .select(DbLearningModule::as_select())
        .load(conn)
        .wrap_err("could not query tables LearningModule, UserLearningModule")?
        .into_iter()
        .map(|row| row.try_into())
        .collect::<Result<Vec<_>>>()
}
