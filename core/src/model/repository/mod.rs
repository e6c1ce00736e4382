pub mod bookmark;
pub mod db;
pub mod db_entity;
pub mod learning_module;
pub mod resource;
pub mod resource_module;
#[allow(non_snake_case)]
mod schema;
pub mod tab_configuration;
pub mod taxonomy;
#[cfg(test)]
mod test;
pub mod user_setting;
pub mod vote;

/// Errors callers branch on. Everything else is an opaque `eyre::Report`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Turns unique and foreign key violations into `RepositoryError::Conflict`.
pub(crate) fn conflict_on_violation(err: diesel::result::Error, what: &str) -> eyre::Report {
    use diesel::result::{DatabaseErrorKind, Error};
    match err {
        Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            RepositoryError::Conflict(format!("{}: {}", what, info.message())).into()
        }
        Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            RepositoryError::Conflict(format!("{}: {}", what, info.message())).into()
        }
        other => eyre::Report::new(other).wrap_err(what.to_owned()),
    }
}

#[macro_export]
macro_rules! interact {
    ($conn:ident, $block:expr) => {
        tracing::Instrument::in_current_span(<_ as futures::TryFutureExt>::map_err(
            $conn.interact::<_, eyre::Result<_>>($block),
            |err| match err {
                deadpool_diesel::InteractError::Panic(_) => {
                    eyre::eyre!("database interaction panicked")
                }
                deadpool_diesel::InteractError::Aborted => {
                    eyre::eyre!("database interaction was aborted")
                }
            },
        ))
    };
}
