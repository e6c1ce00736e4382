use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::ValidationError;

use learnnow_core::model;

use crate::http_error::ApiError;

macro_rules! impl_api_id {
    ($ident:ident) => {
        impl From<&model::$ident> for $ident {
            fn from(value: &model::$ident) -> Self {
                $ident(value.0.as_hyphenated().to_string())
            }
        }

        impl From<model::$ident> for $ident {
            fn from(value: model::$ident) -> Self {
                (&value).into()
            }
        }

        impl TryFrom<&$ident> for model::$ident {
            type Error = eyre::Report;
            fn try_from(value: &$ident) -> Result<Self, Self::Error> {
                match Uuid::parse_str(&value.0) {
                    Ok(id) if !id.is_nil() => Ok(model::$ident(id)),
                    _ => Err(ApiError::BadRequest(format!(
                        concat!("Invalid ", stringify!($ident), " {}"),
                        value.0
                    ))
                    .into()),
                }
            }
        }

        impl TryFrom<$ident> for model::$ident {
            type Error = eyre::Report;
            fn try_from(value: $ident) -> Result<Self, Self::Error> {
                (&value).try_into()
            }
        }

        impl From<String> for $ident {
            fn from(value: String) -> Self {
                $ident(value)
            }
        }

        impl AsRef<str> for $ident {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// The actual struct type declaration is not part of the macro so that utoipa_discover
// picks up the declaration and notices the derive(ToSchema) on it.
// That doesn't work if the declaration is in a macro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash, ToSchema)]
pub struct GradeId(pub String);
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash, ToSchema)]
pub struct SubjectId(pub String);
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash, ToSchema)]
pub struct TagId(pub String);
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash, ToSchema)]
pub struct ResourceId(pub String);
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash, ToSchema)]
pub struct LearningModuleId(pub String);
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash, ToSchema)]
pub struct TabConfigurationId(pub String);
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash, ToSchema)]
pub struct UserId(pub String);

impl_api_id!(GradeId);
impl_api_id!(SubjectId);
impl_api_id!(TagId);
impl_api_id!(ResourceId);
impl_api_id!(LearningModuleId);
impl_api_id!(TabConfigurationId);
impl_api_id!(UserId);

/// Validator for id fields: a GUID other than the empty GUID
pub fn validate_guid<T: AsRef<str>>(id: &T) -> Result<(), ValidationError> {
    match Uuid::parse_str(id.as_ref()) {
        Ok(id) if !id.is_nil() => Ok(()),
        _ => Err(ValidationError::new("guid")),
    }
}

/// Validator for required text that is trimmed before it is stored
pub fn validate_not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[allow(clippy::ptr_arg)]
pub fn validate_guids<T: AsRef<str>>(ids: &Vec<T>) -> Result<(), ValidationError> {
    ids.iter().try_for_each(validate_guid)
}

/// Converts a list of API ids, failing with 400 on the first invalid one
pub fn parse_ids<A, M>(ids: &[A]) -> eyre::Result<Vec<M>>
where
    for<'a> M: TryFrom<&'a A, Error = eyre::Report>,
{
    ids.iter().map(|id| M::try_from(id)).collect()
}

#[cfg(test)]
mod test {
    use claims::{assert_err, assert_ok};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::http_error::HttpError;

    #[test]
    fn ids_round_trip_and_reject_empty_guid() {
        let id = model::ResourceId::new_random();
        let api_id: ResourceId = id.into();
        assert_eq!(assert_ok!(model::ResourceId::try_from(&api_id)), id);

        let err = assert_err!(model::ResourceId::try_from(ResourceId(
            "00000000-0000-0000-0000-000000000000".to_owned()
        )));
        let http_err: HttpError = err.into();
        assert_eq!(http_err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert_err!(model::GradeId::try_from(GradeId("grade 5".to_owned())));
    }

    #[test]
    fn guid_validators() {
        assert_ok!(validate_guid(&TagId(
            "6f2d8a4e-1b3c-4d5e-8f90-a1b2c3d4e5f6".to_owned()
        )));
        assert_err!(validate_guid(&TagId(
            "00000000-0000-0000-0000-000000000000".to_owned()
        )));
        assert_err!(validate_guids(&vec![
            TagId("6f2d8a4e-1b3c-4d5e-8f90-a1b2c3d4e5f6".to_owned()),
            TagId(String::new())
        ]));
    }

    #[test]
    fn blank_text_is_rejected() {
        assert_ok!(validate_not_blank(" Algebra "));
        assert_err!(validate_not_blank("   "));
        assert_err!(validate_not_blank("\t\n"));
    }
}
