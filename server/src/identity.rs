use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

use learnnow_core::{
    auth::{AuthUser, Policy},
    model::{Audit, UserId},
};

use crate::{
    app_state::AppState,
    http_error::{ApiError, ApiResult, HttpError},
};

/// Set by App Service authentication in front of the app
pub const PRINCIPAL_ID_HEADER: &str = "x-ms-client-principal-id";
pub const PRINCIPAL_NAME_HEADER: &str = "x-ms-client-principal-name";

/// The authenticated caller. Extracting it fails with 401 when the
/// principal id header is missing or not a GUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub AuthUser);

impl CurrentUser {
    pub fn id(&self) -> UserId {
        self.0.user_id
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<CurrentUser> {
        let id = headers.get(PRINCIPAL_ID_HEADER)?.to_str().ok()?;
        let id = Uuid::parse_str(id.trim()).ok()?;
        if id.is_nil() {
            return None;
        }
        let name = headers
            .get(PRINCIPAL_NAME_HEADER)
            .and_then(|name| name.to_str().ok())
            .map(|name| name.to_owned());
        Some(CurrentUser(AuthUser {
            user_id: UserId(id),
            name,
        }))
    }

    /// 403 unless the caller satisfies `policy`
    pub async fn require(&self, app_state: &AppState, policy: Policy) -> ApiResult<()> {
        if app_state.authorizer.authorize(self.id(), policy).await? {
            Ok(())
        } else {
            Err(HttpError::forbidden(format!(
                "policy {:?} not satisfied",
                policy
            )))
        }
    }

    /// 403 unless the caller created the entity or is an admin
    pub async fn require_owner_or_admin(&self, app_state: &AppState, audit: &Audit) -> ApiResult<()> {
        if app_state.authorizer.can_modify(self.id(), audit).await? {
            Ok(())
        } else {
            Err(HttpError::forbidden("only the creator or an admin may do this"))
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        CurrentUser::from_headers(&parts.headers).ok_or_else(|| ApiError::Unauthorized.into())
    }
}
