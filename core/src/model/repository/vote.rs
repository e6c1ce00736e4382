use diesel::prelude::*;
use eyre::Result;
use tracing::instrument;

use crate::model::{
    util::{datetime_to_db_repr, uuid_to_db_repr},
    LearningModuleId, ResourceId, UserId,
};

use super::{conflict_on_violation, db::DbConn, schema};

/// Records an upvote. Voting twice is a no-op; returns whether a vote was added.
#[instrument(skip(conn), level = "debug")]
pub fn add_resource_vote(conn: &mut DbConn, resource_id: ResourceId, user: UserId) -> Result<bool> {
    use schema::ResourceVote;
    let inserted = diesel::insert_or_ignore_into(ResourceVote::table)
        .values((
            ResourceVote::resource_id.eq(uuid_to_db_repr(&resource_id.0)),
            ResourceVote::user_id.eq(uuid_to_db_repr(&user.0)),
            ResourceVote::created_on.eq(datetime_to_db_repr(&chrono::Utc::now())),
        ))
        .execute(conn)
        .map_err(|err| conflict_on_violation(err, "insert into ResourceVote"))?;
    Ok(inserted > 0)
}

/// Returns whether there was a vote to remove.
#[instrument(skip(conn), level = "debug")]
pub fn remove_resource_vote(
    conn: &mut DbConn,
    resource_id: ResourceId,
    user: UserId,
) -> Result<bool> {
    use schema::ResourceVote;
    let deleted = diesel::delete(
        ResourceVote::table.find((uuid_to_db_repr(&resource_id.0), uuid_to_db_repr(&user.0))),
    )
    .execute(conn)?;
    Ok(deleted > 0)
}

#[instrument(skip(conn), level = "trace")]
pub fn count_resource_votes(conn: &mut DbConn, resource_id: ResourceId) -> Result<i64> {
    use schema::ResourceVote;
    let count = ResourceVote::table
        .filter(ResourceVote::resource_id.eq(uuid_to_db_repr(&resource_id.0)))
        .count()
        .get_result(conn)?;
    Ok(count)
}

#[instrument(skip(conn), level = "trace")]
pub fn has_voted_resource(conn: &mut DbConn, resource_id: ResourceId, user: UserId) -> Result<bool> {
    use schema::ResourceVote;
    let vote: Option<String> = ResourceVote::table
        .find((uuid_to_db_repr(&resource_id.0), uuid_to_db_repr(&user.0)))
        .select(ResourceVote::user_id)
        .first(conn)
        .optional()?;
    Ok(vote.is_some())
}

#[instrument(skip(conn), level = "debug")]
pub fn add_learning_module_vote(
    conn: &mut DbConn,
    learning_module_id: LearningModuleId,
    user: UserId,
) -> Result<bool> {
    use schema::LearningModuleVote;
    let inserted = diesel::insert_or_ignore_into(LearningModuleVote::table)
        .values((
            LearningModuleVote::learning_module_id.eq(uuid_to_db_repr(&learning_module_id.0)),
            LearningModuleVote::user_id.eq(uuid_to_db_repr(&user.0)),
            LearningModuleVote::created_on.eq(datetime_to_db_repr(&chrono::Utc::now())),
        ))
        .execute(conn)
        .map_err(|err| conflict_on_violation(err, "insert into LearningModuleVote"))?;
    Ok(inserted > 0)
}

#[instrument(skip(conn), level = "debug")]
pub fn remove_learning_module_vote(
    conn: &mut DbConn,
    learning_module_id: LearningModuleId,
    user: UserId,
) -> Result<bool> {
    use schema::LearningModuleVote;
    let deleted = diesel::delete(LearningModuleVote::table.find((
        uuid_to_db_repr(&learning_module_id.0),
        uuid_to_db_repr(&user.0),
    )))
    .execute(conn)?;
    Ok(deleted > 0)
}

#[instrument(skip(conn), level = "trace")]
pub fn count_learning_module_votes(
    conn: &mut DbConn,
    learning_module_id: LearningModuleId,
) -> Result<i64> {
    use schema::LearningModuleVote;
    let count = LearningModuleVote::table
        .filter(LearningModuleVote::learning_module_id.eq(uuid_to_db_repr(&learning_module_id.0)))
        .count()
        .get_result(conn)?;
    Ok(count)
}

#[instrument(skip(conn), level = "trace")]
pub fn has_voted_learning_module(
    conn: &mut DbConn,
    learning_module_id: LearningModuleId,
    user: UserId,
) -> Result<bool> {
    use schema::LearningModuleVote;
    let vote: Option<String> = LearningModuleVote::table
        .find((uuid_to_db_repr(&learning_module_id.0), uuid_to_db_repr(&user.0)))
        .select(LearningModuleVote::user_id)
        .first(conn)
        .optional()?;
    Ok(vote.is_some())
}
