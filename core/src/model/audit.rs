use chrono::{DateTime, SubsecRound, Utc};

use super::UserId;

/// Who created and last changed a row, and when.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Audit {
    pub created_by: UserId,
    pub updated_by: UserId,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl Audit {
    /// Timestamps are truncated to milliseconds, the precision they are stored with.
    pub fn new(user: UserId) -> Audit {
        let now = Utc::now().trunc_subsecs(3);
        Audit {
            created_by: user,
            updated_by: user,
            created_on: now,
            updated_on: now,
        }
    }

    pub fn touched_by(&self, user: UserId) -> Audit {
        Audit {
            updated_by: user,
            updated_on: Utc::now().trunc_subsecs(3),
            ..self.clone()
        }
    }
}
