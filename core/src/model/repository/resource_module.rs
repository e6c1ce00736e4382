use std::collections::{HashMap, HashSet};

use diesel::prelude::*;
use eyre::{Context, Result};
use tracing::instrument;

use crate::model::{
    self,
    repository::db_entity::DbResource,
    util::{datetime_to_db_repr, uuid_from_db_repr, uuid_to_db_repr},
    LearningModuleId, ResourceId, UserId,
};

use super::{conflict_on_violation, db::DbConn, schema, RepositoryError};

/// Resources of a learning module ordered by their index in the module
#[instrument(skip(conn), level = "trace")]
pub fn get_resources_in_module(
    conn: &mut DbConn,
    learning_module_id: LearningModuleId,
) -> Result<Vec<model::Resource>> {
    use schema::{Resource, ResourceModuleMapping};
    Resource::table
        .inner_join(ResourceModuleMapping::table)
        .filter(ResourceModuleMapping::learning_module_id.eq(uuid_to_db_repr(&learning_module_id.0)))
        .order_by(ResourceModuleMapping::idx)
        .select(DbResource::as_select())
        .load(conn)
        .wrap_err("could not query tables Resource, ResourceModuleMapping")?
        .into_iter()
        .map(|row| row.try_into())
        .collect::<Result<Vec<_>>>()
}

/// Appends resources to the end of a module, in the order given.
/// Resources already in the module (or repeated in `resource_ids`) are skipped.
/// Returns how many were appended.
#[instrument(skip(conn), level = "debug")]
pub fn append_resources_to_module(
    conn: &mut DbConn,
    learning_module_id: LearningModuleId,
    resource_ids: &[ResourceId],
    user: UserId,
) -> Result<usize> {
    use schema::ResourceModuleMapping;
    let db_module_id = uuid_to_db_repr(&learning_module_id.0);
    conn.transaction(|conn| {
        let existing: HashSet<String> = ResourceModuleMapping::table
            .filter(ResourceModuleMapping::learning_module_id.eq(&db_module_id))
            .select(ResourceModuleMapping::resource_id)
            .load::<String>(conn)?
            .into_iter()
            .collect();
        let last_index: Option<i32> = ResourceModuleMapping::table
            .filter(ResourceModuleMapping::learning_module_id.eq(&db_module_id))
            .select(diesel::dsl::max(ResourceModuleMapping::idx))
            .first(conn)?;
        let first_insert_index = last_index.map_or(0, |last| last + 1);
        let mut seen = existing;
        let to_insert: Vec<String> = resource_ids
            .iter()
            .map(|id| uuid_to_db_repr(&id.0))
            .filter(|id| seen.insert(id.clone()))
            .collect();
        let now = datetime_to_db_repr(&chrono::Utc::now());
        let db_user = uuid_to_db_repr(&user.0);
        let rows: Vec<_> = to_insert
            .iter()
            .zip(first_insert_index..)
            .map(|(resource_id, idx)| {
                (
                    ResourceModuleMapping::learning_module_id.eq(&db_module_id),
                    ResourceModuleMapping::resource_id.eq(resource_id),
                    ResourceModuleMapping::idx.eq(idx),
                    ResourceModuleMapping::created_by.eq(&db_user),
                    ResourceModuleMapping::created_on.eq(now),
                )
            })
            .collect();
        if !rows.is_empty() {
            diesel::insert_into(ResourceModuleMapping::table)
                .values(rows)
                .execute(conn)
                .map_err(|err| conflict_on_violation(err, "insert into ResourceModuleMapping"))?;
        }
        Ok::<_, eyre::Report>(to_insert.len())
    })
}

/// Removes a resource from a module and closes the gap it leaves in the order.
#[instrument(skip(conn), level = "debug")]
pub fn remove_resource_from_module(
    conn: &mut DbConn,
    learning_module_id: LearningModuleId,
    resource_id: ResourceId,
) -> Result<()> {
    use schema::ResourceModuleMapping;
    conn.transaction(|conn| {
        let deleted = diesel::delete(ResourceModuleMapping::table.find((
            uuid_to_db_repr(&learning_module_id.0),
            uuid_to_db_repr(&resource_id.0),
        )))
        .execute(conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound(format!(
                "{} in {}",
                resource_id, learning_module_id
            ))
            .into());
        }
        repack_module_indices(conn, learning_module_id)?;
        Ok::<_, eyre::Report>(())
    })
}

/// Renumbers the indices of a module's resources to 0..n keeping their order.
pub(super) fn repack_module_indices(
    conn: &mut DbConn,
    learning_module_id: LearningModuleId,
) -> Result<()> {
    use schema::ResourceModuleMapping;
    let db_module_id = uuid_to_db_repr(&learning_module_id.0);
    let rows: Vec<(String, i32)> = ResourceModuleMapping::table
        .filter(ResourceModuleMapping::learning_module_id.eq(&db_module_id))
        .order_by(ResourceModuleMapping::idx)
        .select((ResourceModuleMapping::resource_id, ResourceModuleMapping::idx))
        .load(conn)
        .wrap_err("could not query table ResourceModuleMapping")?;
    for (new_idx, (resource_id, old_idx)) in (0..).zip(rows) {
        if new_idx == old_idx {
            continue;
        }
        diesel::update(ResourceModuleMapping::table.find((&db_module_id, &resource_id)))
            .set(ResourceModuleMapping::idx.eq(new_idx))
            .execute(conn)
            .wrap_err("could not update ResourceModuleMapping.idx")?;
    }
    Ok(())
}

#[instrument(skip(conn), level = "trace")]
pub fn get_modules_for_resource(
    conn: &mut DbConn,
    resource_id: ResourceId,
) -> Result<Vec<LearningModuleId>> {
    use schema::ResourceModuleMapping;
    ResourceModuleMapping::table
        .filter(ResourceModuleMapping::resource_id.eq(uuid_to_db_repr(&resource_id.0)))
        .select(ResourceModuleMapping::learning_module_id)
        .load::<String>(conn)
        .wrap_err("could not query table ResourceModuleMapping")?
        .into_iter()
        .map(|id| Ok(LearningModuleId(uuid_from_db_repr(&id)?)))
        .collect()
}

#[instrument(skip(conn), level = "trace")]
pub fn count_resources_in_modules(
    conn: &mut DbConn,
    ids: &[LearningModuleId],
) -> Result<HashMap<LearningModuleId, i64>> {
    use schema::ResourceModuleMapping;
    let db_ids: Vec<String> = ids.iter().map(|id| uuid_to_db_repr(&id.0)).collect();
    ResourceModuleMapping::table
        .filter(ResourceModuleMapping::learning_module_id.eq_any(db_ids))
        .group_by(ResourceModuleMapping::learning_module_id)
        .select((
            ResourceModuleMapping::learning_module_id,
            diesel::dsl::count_star(),
        ))
        .load::<(String, i64)>(conn)
        .wrap_err("could not count rows in ResourceModuleMapping")?
        .into_iter()
        .map(|(id, count)| Ok((LearningModuleId(uuid_from_db_repr(&id)?), count)))
        .collect()
}
