use std::collections::{HashMap, HashSet};

use diesel::prelude::*;
use eyre::{eyre, Context, Result};
use itertools::Itertools;
use tracing::instrument;

use crate::model::{
    self,
    repository::{
        db_entity::{DbResource, DbTag},
        taxonomy,
    },
    util::{uuid_from_db_repr, uuid_to_db_repr},
    ContentFilter, ResourceDetail, ResourceId, TagId, UserId, PAGE_SIZE,
};

use super::{conflict_on_violation, db::DbConn, schema, RepositoryError};

#[instrument(skip(conn, resource), fields(resource_id = %resource.id), level = "debug")]
pub fn insert_resource(
    conn: &mut DbConn,
    resource: &model::Resource,
    tag_ids: &[TagId],
) -> Result<()> {
    use schema::Resource;
    conn.transaction(|conn| {
        taxonomy::ensure_classification_exists(
            conn,
            resource.grade_id,
            resource.subject_id,
            tag_ids,
        )?;
        diesel::insert_into(Resource::table)
            .values(DbResource::from(resource))
            .execute(conn)
            .map_err(|err| conflict_on_violation(err, "insert into Resource"))?;
        insert_resource_tags(conn, resource.id, tag_ids)?;
        Ok::<_, eyre::Report>(())
    })
}

fn insert_resource_tags(conn: &mut DbConn, resource_id: ResourceId, tag_ids: &[TagId]) -> Result<()> {
    use schema::ResourceTag;
    if tag_ids.is_empty() {
        return Ok(());
    }
    let db_resource_id = uuid_to_db_repr(&resource_id.0);
    let rows: Vec<_> = tag_ids
        .iter()
        .unique()
        .map(|tag_id| {
            (
                ResourceTag::resource_id.eq(db_resource_id.clone()),
                ResourceTag::tag_id.eq(uuid_to_db_repr(&tag_id.0)),
            )
        })
        .collect();
    diesel::insert_into(ResourceTag::table)
        .values(rows)
        .execute(conn)
        .map_err(|err| conflict_on_violation(err, "insert into ResourceTag"))?;
    Ok(())
}

#[instrument(skip(conn), level = "trace")]
pub fn get_resource(conn: &mut DbConn, id: ResourceId) -> Result<Option<model::Resource>> {
    use schema::Resource;
    let row: Option<DbResource> = Resource::table
        .find(uuid_to_db_repr(&id.0))
        .select(DbResource::as_select())
        .first(conn)
        .optional()
        .wrap_err("could not query table Resource")?;
    row.map(|row| row.try_into()).transpose()
}

/// Resources with the given ids, in no particular order. Unknown ids are skipped.
#[instrument(skip(conn), level = "trace")]
pub fn get_resources(conn: &mut DbConn, ids: &[ResourceId]) -> Result<Vec<model::Resource>> {
    use schema::Resource;
    let db_ids: Vec<String> = ids.iter().map(|id| uuid_to_db_repr(&id.0)).collect();
    Resource::table
        .filter(Resource::resource_id.eq_any(db_ids))
        .select(DbResource::as_select())
        .load(conn)
        .wrap_err("could not query table Resource")?
        .into_iter()
        .map(|row| row.try_into())
        .collect::<Result<Vec<_>>>()
}

#[instrument(skip(conn), level = "trace")]
pub fn get_resource_detail(
    conn: &mut DbConn,
    id: ResourceId,
    user: UserId,
) -> Result<Option<ResourceDetail>> {
    let resource = match get_resource(conn, id)? {
        Some(resource) => resource,
        None => return Ok(None),
    };
    let mut details = get_resource_details(conn, vec![resource], user)?;
    Ok(details.pop())
}

/// Attaches grade, subject, tags, votes and bookmark state to `resources`,
/// keeping their order.
#[instrument(skip(conn, resources), level = "trace")]
pub fn get_resource_details(
    conn: &mut DbConn,
    resources: Vec<model::Resource>,
    user: UserId,
) -> Result<Vec<ResourceDetail>> {
    use schema::{ResourceVote, UserResource};
    if resources.is_empty() {
        return Ok(Vec::new());
    }
    let grade_ids: Vec<_> = resources.iter().map(|r| r.grade_id).unique().collect();
    let subject_ids: Vec<_> = resources.iter().map(|r| r.subject_id).unique().collect();
    let grades: HashMap<_, _> = taxonomy::grade::get_many(conn, &grade_ids)?
        .into_iter()
        .map(|grade| (grade.id, grade))
        .collect();
    let subjects: HashMap<_, _> = taxonomy::subject::get_many(conn, &subject_ids)?
        .into_iter()
        .map(|subject| (subject.id, subject))
        .collect();
    let resource_ids: Vec<ResourceId> = resources.iter().map(|r| r.id).collect();
    let mut tags = get_tags_for_resources(conn, &resource_ids)?;
    let db_ids: Vec<String> = resource_ids.iter().map(|id| uuid_to_db_repr(&id.0)).collect();
    let db_user = uuid_to_db_repr(&user.0);
    let vote_counts: HashMap<String, i64> = ResourceVote::table
        .filter(ResourceVote::resource_id.eq_any(&db_ids))
        .group_by(ResourceVote::resource_id)
        .select((ResourceVote::resource_id, diesel::dsl::count_star()))
        .load::<(String, i64)>(conn)
        .wrap_err("could not count rows in ResourceVote")?
        .into_iter()
        .collect();
    let voted: HashSet<String> = ResourceVote::table
        .filter(ResourceVote::resource_id.eq_any(&db_ids))
        .filter(ResourceVote::user_id.eq(&db_user))
        .select(ResourceVote::resource_id)
        .load(conn)
        .wrap_err("could not query table ResourceVote")?
        .into_iter()
        .collect();
    let bookmarked: HashSet<String> = UserResource::table
        .filter(UserResource::resource_id.eq_any(&db_ids))
        .filter(UserResource::user_id.eq(&db_user))
        .select(UserResource::resource_id)
        .load(conn)
        .wrap_err("could not query table UserResource")?
        .into_iter()
        .collect();
    resources
        .into_iter()
        .map(|resource| {
            let db_id = uuid_to_db_repr(&resource.id.0);
            let grade = grades
                .get(&resource.grade_id)
                .cloned()
                .ok_or_else(|| eyre!("missing grade {} of {}", resource.grade_id, resource.id))?;
            let subject = subjects.get(&resource.subject_id).cloned().ok_or_else(|| {
                eyre!("missing subject {} of {}", resource.subject_id, resource.id)
            })?;
            Ok(ResourceDetail {
                grade,
                subject,
                tags: tags.remove(&resource.id).unwrap_or_default(),
                vote_count: vote_counts.get(&db_id).copied().unwrap_or(0),
                voted_by_user: voted.contains(&db_id),
                bookmarked_by_user: bookmarked.contains(&db_id),
                resource,
            })
        })
        .collect()
}

/// Tags of each resource, ordered by name
#[instrument(skip(conn), level = "trace")]
pub fn get_tags_for_resources(
    conn: &mut DbConn,
    ids: &[ResourceId],
) -> Result<HashMap<ResourceId, Vec<model::Tag>>> {
    use schema::{ResourceTag, Tag};
    let db_ids: Vec<String> = ids.iter().map(|id| uuid_to_db_repr(&id.0)).collect();
    let rows: Vec<(String, DbTag)> = ResourceTag::table
        .inner_join(Tag::table)
        .filter(ResourceTag::resource_id.eq_any(db_ids))
        .order_by(Tag::tag_name)
        .select((ResourceTag::resource_id, DbTag::as_select()))
        .load(conn)
        .wrap_err("could not query tables ResourceTag, Tag")?;
    let mut tags: HashMap<ResourceId, Vec<model::Tag>> = HashMap::new();
    for (resource_id, db_tag) in rows {
        let resource_id = ResourceId(uuid_from_db_repr(&resource_id)?);
        tags.entry(resource_id).or_default().push(db_tag.try_into()?);
    }
    Ok(tags)
}

/// One page of resources matching `filter`, most recently updated first.
pub fn search_resources(conn: &mut DbConn, filter: &ContentFilter) -> Result<Vec<model::Resource>> {
    let skip = filter.page.max(0).saturating_mul(PAGE_SIZE);
    search_resources_window(conn, filter, skip, PAGE_SIZE)
}

/// Like `search_resources` with an explicit offset and limit, ignoring `filter.page`.
#[instrument(skip(conn), level = "debug")]
pub fn search_resources_window(
    conn: &mut DbConn,
    filter: &ContentFilter,
    skip: i64,
    limit: i64,
) -> Result<Vec<model::Resource>> {
    use schema::{Resource, ResourceTag};
    let mut query = Resource::table.into_boxed();
    if !filter.grade_ids.is_empty() {
        let ids: Vec<String> = filter.grade_ids.iter().map(|id| uuid_to_db_repr(&id.0)).collect();
        query = query.filter(Resource::grade_id.eq_any(ids));
    }
    if !filter.subject_ids.is_empty() {
        let ids: Vec<String> = filter.subject_ids.iter().map(|id| uuid_to_db_repr(&id.0)).collect();
        query = query.filter(Resource::subject_id.eq_any(ids));
    }
    if !filter.created_by.is_empty() {
        let ids: Vec<String> = filter.created_by.iter().map(|id| uuid_to_db_repr(&id.0)).collect();
        query = query.filter(Resource::created_by.eq_any(ids));
    }
    if !filter.tag_ids.is_empty() {
        let ids: Vec<String> = filter.tag_ids.iter().map(|id| uuid_to_db_repr(&id.0)).collect();
        query = query.filter(
            Resource::resource_id.eq_any(
                ResourceTag::table
                    .filter(ResourceTag::tag_id.eq_any(ids))
                    .select(ResourceTag::resource_id),
            ),
        );
    }
    if let Some(pattern) = filter.search_text.as_deref().and_then(like_pattern) {
        query = query.filter(
            Resource::title
                .like(pattern.clone())
                .escape('\\')
                .or(Resource::description.like(pattern).escape('\\')),
        );
    }
    query
        .order_by(Resource::updated_on.desc())
        .then_order_by(Resource::resource_id)
        .offset(skip.max(0))
        .limit(limit.max(0))
        .select(DbResource::as_select())
        .load(conn)
        .wrap_err("could not query table Resource")?
        .into_iter()
        .map(|row| row.try_into())
        .collect::<Result<Vec<_>>>()
}

/// `%text%` with LIKE wildcards in `text` escaped, or None for blank text.
pub(crate) fn like_pattern(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

/// Overwrites all columns except the creation audit fields and replaces the tags.
#[instrument(skip(conn, resource), fields(resource_id = %resource.id), level = "debug")]
pub fn update_resource(
    conn: &mut DbConn,
    resource: &model::Resource,
    tag_ids: &[TagId],
) -> Result<()> {
    use schema::{Resource, ResourceTag};
    let db_resource = DbResource::from(resource);
    conn.transaction(|conn| {
        taxonomy::ensure_classification_exists(
            conn,
            resource.grade_id,
            resource.subject_id,
            tag_ids,
        )?;
        let updated = diesel::update(Resource::table.find(&db_resource.resource_id))
            .set((
                Resource::title.eq(&db_resource.title),
                Resource::description.eq(&db_resource.description),
                Resource::subject_id.eq(&db_resource.subject_id),
                Resource::grade_id.eq(&db_resource.grade_id),
                Resource::image_url.eq(&db_resource.image_url),
                Resource::link_url.eq(&db_resource.link_url),
                Resource::attachment_url.eq(&db_resource.attachment_url),
                Resource::resource_type.eq(db_resource.resource_type),
                Resource::updated_by.eq(&db_resource.updated_by),
                Resource::updated_on.eq(db_resource.updated_on),
            ))
            .execute(conn)
            .map_err(|err| conflict_on_violation(err, "update Resource"))?;
        if updated == 0 {
            return Err(RepositoryError::NotFound(resource.id.to_string()).into());
        }
        diesel::delete(ResourceTag::table.filter(ResourceTag::resource_id.eq(&db_resource.resource_id)))
            .execute(conn)?;
        insert_resource_tags(conn, resource.id, tag_ids)?;
        Ok::<_, eyre::Report>(())
    })
}

/// Tags, votes, module mappings and bookmarks go with the resource.
#[instrument(skip(conn), level = "debug")]
pub fn delete_resource(conn: &mut DbConn, id: ResourceId) -> Result<()> {
    use schema::Resource;
    conn.transaction(|conn| {
        let learning_module_ids = super::resource_module::get_modules_for_resource(conn, id)?;
        let deleted = diesel::delete(Resource::table.find(uuid_to_db_repr(&id.0))).execute(conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound(id.to_string()).into());
        }
        for learning_module_id in learning_module_ids {
            super::resource_module::repack_module_indices(conn, learning_module_id)?;
        }
        Ok::<_, eyre::Report>(())
    })
}

/// Distinct creators of resources
#[instrument(skip(conn), level = "trace")]
pub fn get_resource_authors(conn: &mut DbConn) -> Result<Vec<UserId>> {
    use schema::Resource;
    Resource::table
        .select(Resource::created_by)
        .distinct()
        .load::<String>(conn)
        .wrap_err("could not query table Resource")?
        .into_iter()
        .map(|id| Ok(UserId(uuid_from_db_repr(&id)?)))
        .collect()
}
