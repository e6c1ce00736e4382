use std::sync::Arc;

use eyre::Result;
use tracing::instrument;

use crate::{
    config::SecurityGroups,
    model::{Audit, UserId},
};

mod membership;

pub use membership::{CachingMembershipProvider, GroupMembershipProvider};

/// The caller as identified by the authenticating front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    TeacherOrAdmin,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserRoles {
    pub is_teacher: bool,
    pub is_admin: bool,
}

/// Evaluates policies against security group membership.
#[derive(Clone)]
pub struct Authorizer {
    groups: SecurityGroups,
    membership: Arc<dyn GroupMembershipProvider>,
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer")
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

impl Authorizer {
    pub fn new(groups: SecurityGroups, membership: Arc<dyn GroupMembershipProvider>) -> Authorizer {
        Authorizer { groups, membership }
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn is_admin(&self, user: UserId) -> Result<bool> {
        self.membership
            .is_member(self.groups.admin_group_id, user)
            .await
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn is_teacher(&self, user: UserId) -> Result<bool> {
        self.membership
            .is_member(self.groups.teacher_group_id, user)
            .await
    }

    pub async fn roles(&self, user: UserId) -> Result<UserRoles> {
        Ok(UserRoles {
            is_teacher: self.is_teacher(user).await?,
            is_admin: self.is_admin(user).await?,
        })
    }

    /// Whether `user` satisfies `policy`. Teacher membership is only looked
    /// up when the admin check fails.
    #[instrument(skip(self), level = "debug")]
    pub async fn authorize(&self, user: UserId, policy: Policy) -> Result<bool> {
        match policy {
            Policy::Admin => self.is_admin(user).await,
            Policy::TeacherOrAdmin => {
                if self.is_admin(user).await? {
                    return Ok(true);
                }
                self.is_teacher(user).await
            }
        }
    }

    /// Owners may change their own content, admins may change anyone's.
    pub async fn can_modify(&self, user: UserId, audit: &Audit) -> Result<bool> {
        if audit.created_by == user {
            return Ok(true);
        }
        self.is_admin(user).await
    }
}
