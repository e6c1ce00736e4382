mod learning_module;
mod resource;
mod tab_configuration;
mod taxonomy;
mod user_setting;

pub use learning_module::*;
pub use resource::*;
pub use tab_configuration::*;
pub use taxonomy::*;
pub use user_setting::*;

use eyre::Result;

use crate::model::{
    util::{datetime_from_db_repr, uuid_from_db_repr},
    Audit, UserId,
};

pub(crate) fn audit_from_db(
    created_by: &str,
    updated_by: &str,
    created_on: i64,
    updated_on: i64,
) -> Result<Audit> {
    Ok(Audit {
        created_by: UserId(uuid_from_db_repr(created_by)?),
        updated_by: UserId(uuid_from_db_repr(updated_by)?),
        created_on: datetime_from_db_repr(created_on)?,
        updated_on: datetime_from_db_repr(updated_on)?,
    })
}
