use std::collections::{HashMap, HashSet};

use diesel::prelude::*;
use eyre::{eyre, Context, Result};
use itertools::Itertools;
use tracing::instrument;

use crate::model::{
    self,
    repository::{
        db_entity::{DbLearningModule, DbTag},
        resource::like_pattern,
        resource_module, taxonomy,
    },
    util::{uuid_from_db_repr, uuid_to_db_repr},
    ContentFilter, LearningModuleDetail, LearningModuleId, TagId, UserId, PAGE_SIZE,
};

use super::{conflict_on_violation, db::DbConn, schema, RepositoryError};

#[instrument(skip(conn, learning_module), fields(learning_module_id = %learning_module.id), level = "debug")]
pub fn insert_learning_module(
    conn: &mut DbConn,
    learning_module: &model::LearningModule,
    tag_ids: &[TagId],
) -> Result<()> {
    use schema::LearningModule;
    conn.transaction(|conn| {
        taxonomy::ensure_classification_exists(
            conn,
            learning_module.grade_id,
            learning_module.subject_id,
            tag_ids,
        )?;
        diesel::insert_into(LearningModule::table)
            .values(DbLearningModule::from(learning_module))
            .execute(conn)
            .map_err(|err| conflict_on_violation(err, "insert into LearningModule"))?;
        insert_learning_module_tags(conn, learning_module.id, tag_ids)?;
        Ok::<_, eyre::Report>(())
    })
}

fn insert_learning_module_tags(
    conn: &mut DbConn,
    learning_module_id: LearningModuleId,
    tag_ids: &[TagId],
) -> Result<()> {
    use schema::LearningModuleTag;
    if tag_ids.is_empty() {
        return Ok(());
    }
    let db_module_id = uuid_to_db_repr(&learning_module_id.0);
    let rows: Vec<_> = tag_ids
        .iter()
        .unique()
        .map(|tag_id| {
            (
                LearningModuleTag::learning_module_id.eq(db_module_id.clone()),
                LearningModuleTag::tag_id.eq(uuid_to_db_repr(&tag_id.0)),
            )
        })
        .collect();
    diesel::insert_into(LearningModuleTag::table)
        .values(rows)
        .execute(conn)
        .map_err(|err| conflict_on_violation(err, "insert into LearningModuleTag"))?;
    Ok(())
}

#[instrument(skip(conn), level = "trace")]
pub fn get_learning_module(
    conn: &mut DbConn,
    id: LearningModuleId,
) -> Result<Option<model::LearningModule>> {
    use schema::LearningModule;
    let row: Option<DbLearningModule> = LearningModule::table
        .find(uuid_to_db_repr(&id.0))
        .select(DbLearningModule::as_select())
        .first(conn)
        .optional()
        .wrap_err("could not query table LearningModule")?;
    row.map(|row| row.try_into()).transpose()
}

#[instrument(skip(conn), level = "trace")]
pub fn get_learning_modules(
    conn: &mut DbConn,
    ids: &[LearningModuleId],
) -> Result<Vec<model::LearningModule>> {
    use schema::LearningModule;
    let db_ids: Vec<String> = ids.iter().map(|id| uuid_to_db_repr(&id.0)).collect();
    LearningModule::table
        .filter(LearningModule::learning_module_id.eq_any(db_ids))
        .select(DbLearningModule::as_select())
        .load(conn)
        .wrap_err("could not query table LearningModule")?
        .into_iter()
        .map(|row| row.try_into())
        .collect::<Result<Vec<_>>>()
}

#[instrument(skip(conn), level = "trace")]
pub fn get_learning_module_detail(
    conn: &mut DbConn,
    id: LearningModuleId,
    user: UserId,
) -> Result<Option<LearningModuleDetail>> {
    let learning_module = match get_learning_module(conn, id)? {
        Some(learning_module) => learning_module,
        None => return Ok(None),
    };
    let mut details = get_learning_module_details(conn, vec![learning_module], user)?;
    Ok(details.pop())
}

/// Attaches grade, subject, tags, votes, bookmark state and resource count,
/// keeping the order of `learning_modules`.
#[instrument(skip(conn, learning_modules), level = "trace")]
pub fn get_learning_module_details(
    conn: &mut DbConn,
    learning_modules: Vec<model::LearningModule>,
    user: UserId,
) -> Result<Vec<LearningModuleDetail>> {
    use schema::{LearningModuleVote, UserLearningModule};
    if learning_modules.is_empty() {
        return Ok(Vec::new());
    }
    let grade_ids: Vec<_> = learning_modules.iter().map(|m| m.grade_id).unique().collect();
    let subject_ids: Vec<_> = learning_modules.iter().map(|m| m.subject_id).unique().collect();
    let grades: HashMap<_, _> = taxonomy::grade::get_many(conn, &grade_ids)?
        .into_iter()
        .map(|grade| (grade.id, grade))
        .collect();
    let subjects: HashMap<_, _> = taxonomy::subject::get_many(conn, &subject_ids)?
        .into_iter()
        .map(|subject| (subject.id, subject))
        .collect();
    let module_ids: Vec<LearningModuleId> = learning_modules.iter().map(|m| m.id).collect();
    let mut tags = get_tags_for_learning_modules(conn, &module_ids)?;
    let resource_counts = resource_module::count_resources_in_modules(conn, &module_ids)?;
    let db_ids: Vec<String> = module_ids.iter().map(|id| uuid_to_db_repr(&id.0)).collect();
    let db_user = uuid_to_db_repr(&user.0);
    let vote_counts: HashMap<String, i64> = LearningModuleVote::table
        .filter(LearningModuleVote::learning_module_id.eq_any(&db_ids))
        .group_by(LearningModuleVote::learning_module_id)
        .select((LearningModuleVote::learning_module_id, diesel::dsl::count_star()))
        .load::<(String, i64)>(conn)
        .wrap_err("could not count rows in LearningModuleVote")?
        .into_iter()
        .collect();
    let voted: HashSet<String> = LearningModuleVote::table
        .filter(LearningModuleVote::learning_module_id.eq_any(&db_ids))
        .filter(LearningModuleVote::user_id.eq(&db_user))
        .select(LearningModuleVote::learning_module_id)
        .load(conn)
        .wrap_err("could not query table LearningModuleVote")?
        .into_iter()
        .collect();
    let bookmarked: HashSet<String> = UserLearningModule::table
        .filter(UserLearningModule::learning_module_id.eq_any(&db_ids))
        .filter(UserLearningModule::user_id.eq(&db_user))
        .select(UserLearningModule::learning_module_id)
        .load(conn)
        .wrap_err("could not query table UserLearningModule")?
        .into_iter()
        .collect();
    learning_modules
        .into_iter()
        .map(|learning_module| {
            let db_id = uuid_to_db_repr(&learning_module.id.0);
            let grade = grades.get(&learning_module.grade_id).cloned().ok_or_else(|| {
                eyre!(
                    "missing grade {} of {}",
                    learning_module.grade_id,
                    learning_module.id
                )
            })?;
            let subject = subjects
                .get(&learning_module.subject_id)
                .cloned()
                .ok_or_else(|| {
                    eyre!(
                        "missing subject {} of {}",
                        learning_module.subject_id,
                        learning_module.id
                    )
                })?;
            Ok(LearningModuleDetail {
                grade,
                subject,
                tags: tags.remove(&learning_module.id).unwrap_or_default(),
                vote_count: vote_counts.get(&db_id).copied().unwrap_or(0),
                voted_by_user: voted.contains(&db_id),
                bookmarked_by_user: bookmarked.contains(&db_id),
                resource_count: resource_counts
                    .get(&learning_module.id)
                    .copied()
                    .unwrap_or(0),
                learning_module,
            })
        })
        .collect()
}

#[instrument(skip(conn), level = "trace")]
pub fn get_tags_for_learning_modules(
    conn: &mut DbConn,
    ids: &[LearningModuleId],
) -> Result<HashMap<LearningModuleId, Vec<model::Tag>>> {
    use schema::{LearningModuleTag, Tag};
    let db_ids: Vec<String> = ids.iter().map(|id| uuid_to_db_repr(&id.0)).collect();
    let rows: Vec<(String, DbTag)> = LearningModuleTag::table
        .inner_join(Tag::table)
        .filter(LearningModuleTag::learning_module_id.eq_any(db_ids))
        .order_by(Tag::tag_name)
        .select((LearningModuleTag::learning_module_id, DbTag::as_select()))
        .load(conn)
        .wrap_err("could not query tables LearningModuleTag, Tag")?;
    let mut tags: HashMap<LearningModuleId, Vec<model::Tag>> = HashMap::new();
    for (module_id, db_tag) in rows {
        let module_id = LearningModuleId(uuid_from_db_repr(&module_id)?);
        tags.entry(module_id).or_default().push(db_tag.try_into()?);
    }
    Ok(tags)
}

/// One page of learning modules matching `filter`, most recently updated first.
pub fn search_learning_modules(
    conn: &mut DbConn,
    filter: &ContentFilter,
) -> Result<Vec<model::LearningModule>> {
    let skip = filter.page.max(0).saturating_mul(PAGE_SIZE);
    search_learning_modules_window(conn, filter, skip, PAGE_SIZE)
}

/// Like `search_learning_modules` with an explicit offset and limit, ignoring `filter.page`.
#[instrument(skip(conn), level = "debug")]
pub fn search_learning_modules_window(
    conn: &mut DbConn,
    filter: &ContentFilter,
    skip: i64,
    limit: i64,
) -> Result<Vec<model::LearningModule>> {
    use schema::{LearningModule, LearningModuleTag};
    let mut query = LearningModule::table.into_boxed();
    if !filter.grade_ids.is_empty() {
        let ids: Vec<String> = filter.grade_ids.iter().map(|id| uuid_to_db_repr(&id.0)).collect();
        query = query.filter(LearningModule::grade_id.eq_any(ids));
    }
    if !filter.subject_ids.is_empty() {
        let ids: Vec<String> = filter.subject_ids.iter().map(|id| uuid_to_db_repr(&id.0)).collect();
        query = query.filter(LearningModule::subject_id.eq_any(ids));
    }
    if !filter.created_by.is_empty() {
        let ids: Vec<String> = filter.created_by.iter().map(|id| uuid_to_db_repr(&id.0)).collect();
        query = query.filter(LearningModule::created_by.eq_any(ids));
    }
    if !filter.tag_ids.is_empty() {
        let ids: Vec<String> = filter.tag_ids.iter().map(|id| uuid_to_db_repr(&id.0)).collect();
        query = query.filter(
            LearningModule::learning_module_id.eq_any(
                LearningModuleTag::table
                    .filter(LearningModuleTag::tag_id.eq_any(ids))
                    .select(LearningModuleTag::learning_module_id),
            ),
        );
    }
    if let Some(pattern) = filter.search_text.as_deref().and_then(like_pattern) {
        query = query.filter(
            LearningModule::title
                .like(pattern.clone())
                .escape('\\')
                .or(LearningModule::description.like(pattern).escape('\\')),
        );
    }
    query
        .order_by(LearningModule::updated_on.desc())
        .then_order_by(LearningModule::learning_module_id)
        .offset(skip.max(0))
        .limit(limit.max(0))
        .select(DbLearningModule::as_select())
        .load(conn)
        .wrap_err("could not query table LearningModule")?
        .into_iter()
        .map(|row| row.try_into())
        .collect::<Result<Vec<_>>>()
}

/// Overwrites all columns except the creation audit fields and replaces the tags.
#[instrument(skip(conn, learning_module), fields(learning_module_id = %learning_module.id), level = "debug")]
pub fn update_learning_module(
    conn: &mut DbConn,
    learning_module: &model::LearningModule,
    tag_ids: &[TagId],
) -> Result<()> {
    use schema::{LearningModule, LearningModuleTag};
    let db_module = DbLearningModule::from(learning_module);
    conn.transaction(|conn| {
        taxonomy::ensure_classification_exists(
            conn,
            learning_module.grade_id,
            learning_module.subject_id,
            tag_ids,
        )?;
        let updated = diesel::update(LearningModule::table.find(&db_module.learning_module_id))
            .set((
                LearningModule::title.eq(&db_module.title),
                LearningModule::description.eq(&db_module.description),
                LearningModule::subject_id.eq(&db_module.subject_id),
                LearningModule::grade_id.eq(&db_module.grade_id),
                LearningModule::image_url.eq(&db_module.image_url),
                LearningModule::updated_by.eq(&db_module.updated_by),
                LearningModule::updated_on.eq(db_module.updated_on),
            ))
            .execute(conn)
            .map_err(|err| conflict_on_violation(err, "update LearningModule"))?;
        if updated == 0 {
            return Err(RepositoryError::NotFound(learning_module.id.to_string()).into());
        }
        diesel::delete(
            LearningModuleTag::table
                .filter(LearningModuleTag::learning_module_id.eq(&db_module.learning_module_id)),
        )
        .execute(conn)?;
        insert_learning_module_tags(conn, learning_module.id, tag_ids)?;
        Ok::<_, eyre::Report>(())
    })
}

/// Tags, votes, resource mappings, bookmarks and tab configurations go with
/// the module. The resources themselves stay.
#[instrument(skip(conn), level = "debug")]
pub fn delete_learning_module(conn: &mut DbConn, id: LearningModuleId) -> Result<()> {
    use schema::LearningModule;
    let deleted =
        diesel::delete(LearningModule::table.find(uuid_to_db_repr(&id.0))).execute(conn)?;
    if deleted == 0 {
        return Err(RepositoryError::NotFound(id.to_string()).into());
    }
    Ok(())
}

/// Distinct creators of learning modules
#[instrument(skip(conn), level = "trace")]
pub fn get_learning_module_authors(conn: &mut DbConn) -> Result<Vec<UserId>> {
    use schema::LearningModule;
    LearningModule::table
        .select(LearningModule::created_by)
        .distinct()
        .load::<String>(conn)
        .wrap_err("could not query table LearningModule")?
        .into_iter()
        .map(|id| Ok(UserId(uuid_from_db_repr(&id)?)))
        .collect()
}
