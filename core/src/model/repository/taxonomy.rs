//! Grades, subjects and tags: named lookup rows referenced by resources and
//! learning modules. The three tables have the same shape, so their
//! repositories are generated.

macro_rules! taxonomy_repository {
    (
        $module:ident,
        table = $table:ident,
        id_column = $id_column:ident,
        name_column = $name_column:ident,
        model = $model:ident,
        db_entity = $db_entity:ident,
        id = $id:ident,
        referenced_by = [$(($ref_table:ident, $ref_column:ident)),+ $(,)?]
    ) => {
        pub mod $module {
            use diesel::prelude::*;
            use eyre::{Context, Result};
            use tracing::instrument;

            use crate::model::{
                self,
                repository::{
                    conflict_on_violation, db::DbConn, db_entity::$db_entity, schema,
                    RepositoryError,
                },
                util::{datetime_to_db_repr, uuid_to_db_repr},
            };

            #[instrument(skip(conn), level = "debug")]
            pub fn insert(conn: &mut DbConn, value: &model::$model) -> Result<()> {
                use schema::$table;
                diesel::insert_into($table::table)
                    .values((
                        $table::$id_column.eq(uuid_to_db_repr(&value.id.0)),
                        $table::$name_column.eq(&value.$name_column),
                        $table::created_by.eq(uuid_to_db_repr(&value.audit.created_by.0)),
                        $table::updated_by.eq(uuid_to_db_repr(&value.audit.updated_by.0)),
                        $table::created_on.eq(datetime_to_db_repr(&value.audit.created_on)),
                        $table::updated_on.eq(datetime_to_db_repr(&value.audit.updated_on)),
                    ))
                    .execute(conn)
                    .map_err(|err| {
                        conflict_on_violation(err, concat!("insert into ", stringify!($table)))
                    })?;
                Ok(())
            }

            #[instrument(skip(conn), level = "trace")]
            pub fn get(conn: &mut DbConn, id: model::$id) -> Result<Option<model::$model>> {
                use schema::$table;
                let row: Option<$db_entity> = $table::table
                    .find(uuid_to_db_repr(&id.0))
                    .select($db_entity::as_select())
                    .first(conn)
                    .optional()
                    .wrap_err(concat!("could not query table ", stringify!($table)))?;
                row.map(|row| row.try_into()).transpose()
            }

            #[instrument(skip(conn), level = "trace")]
            pub fn get_many(conn: &mut DbConn, ids: &[model::$id]) -> Result<Vec<model::$model>> {
                use schema::$table;
                let db_ids: Vec<String> = ids.iter().map(|id| uuid_to_db_repr(&id.0)).collect();
                $table::table
                    .filter($table::$id_column.eq_any(db_ids))
                    .order_by($table::$name_column)
                    .select($db_entity::as_select())
                    .load(conn)
                    .wrap_err(concat!("could not query table ", stringify!($table)))?
                    .into_iter()
                    .map(|row| row.try_into())
                    .collect::<Result<Vec<_>>>()
            }

            /// All rows ordered by name
            #[instrument(skip(conn), level = "trace")]
            pub fn get_all(conn: &mut DbConn) -> Result<Vec<model::$model>> {
                use schema::$table;
                $table::table
                    .order_by($table::$name_column)
                    .select($db_entity::as_select())
                    .load(conn)
                    .wrap_err(concat!("could not query table ", stringify!($table)))?
                    .into_iter()
                    .map(|row| row.try_into())
                    .collect::<Result<Vec<_>>>()
            }

            /// Names are compared case-insensitively.
            #[instrument(skip(conn), level = "trace")]
            pub fn get_by_name(conn: &mut DbConn, name: &str) -> Result<Option<model::$model>> {
                use schema::$table;
                let row: Option<$db_entity> = $table::table
                    .filter($table::$name_column.eq(name))
                    .select($db_entity::as_select())
                    .first(conn)
                    .optional()
                    .wrap_err(concat!("could not query table ", stringify!($table)))?;
                row.map(|row| row.try_into()).transpose()
            }

            /// Updates the name and the `updated_*` audit fields.
            #[instrument(skip(conn), level = "debug")]
            pub fn update_name(conn: &mut DbConn, value: &model::$model) -> Result<()> {
                use schema::$table;
                let updated = diesel::update($table::table.find(uuid_to_db_repr(&value.id.0)))
                    .set((
                        $table::$name_column.eq(&value.$name_column),
                        $table::updated_by.eq(uuid_to_db_repr(&value.audit.updated_by.0)),
                        $table::updated_on.eq(datetime_to_db_repr(&value.audit.updated_on)),
                    ))
                    .execute(conn)
                    .map_err(|err| {
                        conflict_on_violation(err, concat!("update ", stringify!($table)))
                    })?;
                if updated == 0 {
                    return Err(RepositoryError::NotFound(value.id.to_string()).into());
                }
                Ok(())
            }

            /// Deletes all rows with the given ids, or none if any of them is still
            /// referenced by a resource or learning module.
            #[instrument(skip(conn), level = "debug")]
            pub fn delete_many(conn: &mut DbConn, ids: &[model::$id]) -> Result<usize> {
                use schema::$table;
                let db_ids: Vec<String> = ids.iter().map(|id| uuid_to_db_repr(&id.0)).collect();
                conn.transaction(|conn| {
                    $(
                        let references: i64 = schema::$ref_table::table
                            .filter(schema::$ref_table::$ref_column.eq_any(&db_ids))
                            .count()
                            .get_result(conn)?;
                        if references > 0 {
                            return Err(RepositoryError::Conflict(format!(
                                concat!(
                                    stringify!($table),
                                    " still referenced by {} rows in ",
                                    stringify!($ref_table)
                                ),
                                references
                            ))
                            .into());
                        }
                    )+
                    let deleted = diesel::delete($table::table.filter($table::$id_column.eq_any(&db_ids)))
                        .execute(conn)?;
                    Ok::<_, eyre::Report>(deleted)
                })
            }
        }
    };
}

taxonomy_repository!(
    grade,
    table = Grade,
    id_column = grade_id,
    name_column = grade_name,
    model = Grade,
    db_entity = DbGrade,
    id = GradeId,
    referenced_by = [(Resource, grade_id), (LearningModule, grade_id)]
);

taxonomy_repository!(
    subject,
    table = Subject,
    id_column = subject_id,
    name_column = subject_name,
    model = Subject,
    db_entity = DbSubject,
    id = SubjectId,
    referenced_by = [(Resource, subject_id), (LearningModule, subject_id)]
);

taxonomy_repository!(
    tag,
    table = Tag,
    id_column = tag_id,
    name_column = tag_name,
    model = Tag,
    db_entity = DbTag,
    id = TagId,
    referenced_by = [(ResourceTag, tag_id), (LearningModuleTag, tag_id)]
);

/// Fails with `RepositoryError::NotFound` naming the first grade, subject or
/// tag that does not exist.
pub(crate) fn ensure_classification_exists(
    conn: &mut super::db::DbConn,
    grade_id: crate::model::GradeId,
    subject_id: crate::model::SubjectId,
    tag_ids: &[crate::model::TagId],
) -> eyre::Result<()> {
    use super::RepositoryError;
    if grade::get(conn, grade_id)?.is_none() {
        return Err(RepositoryError::NotFound(format!("Grade {}", grade_id)).into());
    }
    if subject::get(conn, subject_id)?.is_none() {
        return Err(RepositoryError::NotFound(format!("Subject {}", subject_id)).into());
    }
    let found = tag::get_many(conn, tag_ids)?;
    if let Some(missing) = tag_ids
        .iter()
        .find(|id| !found.iter().any(|tag| tag.id == **id))
    {
        return Err(RepositoryError::NotFound(format!("Tag {}", missing)).into());
    }
    Ok(())
}
