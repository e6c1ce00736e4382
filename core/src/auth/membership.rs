use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use eyre::Result;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::model::{GroupId, UserId};

#[async_trait]
pub trait GroupMembershipProvider: Send + Sync {
    /// Whether `user_id` is a transitive member of `group_id`
    async fn is_member(&self, group_id: GroupId, user_id: UserId) -> Result<bool>;
}

#[async_trait]
impl<T: GroupMembershipProvider + ?Sized> GroupMembershipProvider for std::sync::Arc<T> {
    async fn is_member(&self, group_id: GroupId, user_id: UserId) -> Result<bool> {
        (**self).is_member(group_id, user_id).await
    }
}

struct CachedMembership {
    is_member: bool,
    created_at: Instant,
}

/// Remembers answers of the wrapped provider for `ttl`.
/// When `max_entries` is reached the oldest answer is dropped.
pub struct CachingMembershipProvider<P> {
    inner: P,
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<(GroupId, UserId), CachedMembership>>,
}

impl<P: GroupMembershipProvider> CachingMembershipProvider<P> {
    pub fn new(inner: P, ttl: Duration, max_entries: usize) -> Self {
        CachingMembershipProvider {
            inner,
            ttl,
            max_entries: max_entries.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn is_fresh(&self, entry: &CachedMembership) -> bool {
        entry.created_at.elapsed() < self.ttl
    }
}

#[async_trait]
impl<P: GroupMembershipProvider> GroupMembershipProvider for CachingMembershipProvider<P> {
    #[instrument(skip(self), level = "trace")]
    async fn is_member(&self, group_id: GroupId, user_id: UserId) -> Result<bool> {
        let key = (group_id, user_id);
        {
            let entries = self.entries.lock().await;
            if let Some(entry) = entries.get(&key) {
                if self.is_fresh(entry) {
                    return Ok(entry.is_member);
                }
            }
        }
        // not holding the lock while asking the provider, concurrent misses
        // for the same key may both ask
        let is_member = self.inner.is_member(group_id, user_id).await?;
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| entry.created_at.elapsed() < self.ttl);
        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(key, _)| *key)
            {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            key,
            CachedMembership {
                is_member,
                created_at: Instant::now(),
            },
        );
        Ok(is_member)
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::Ordering;

    use claims::assert_ok;
    use uuid::Uuid;

    use super::*;
    use crate::auth::test::{fake_membership, groups, ADMIN, STUDENT, TEACHER};

    #[tokio::test]
    async fn calls_provider_once_per_key_within_ttl() {
        let cache =
            CachingMembershipProvider::new(fake_membership(), Duration::from_secs(3600), 100);
        let groups = groups();
        for _ in 0..3 {
            assert!(assert_ok!(cache.is_member(groups.teacher_group_id, TEACHER).await));
            assert!(!assert_ok!(cache.is_member(groups.admin_group_id, TEACHER).await));
        }
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
        assert!(assert_ok!(cache.is_member(groups.admin_group_id, ADMIN).await));
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn expired_entries_are_looked_up_again() {
        let cache = CachingMembershipProvider::new(fake_membership(), Duration::ZERO, 100);
        let group = groups().teacher_group_id;
        assert!(assert_ok!(cache.is_member(group, TEACHER).await));
        assert!(assert_ok!(cache.is_member(group, TEACHER).await));
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn evicts_oldest_when_full() {
        let cache =
            CachingMembershipProvider::new(fake_membership(), Duration::from_secs(3600), 2);
        let group = groups().teacher_group_id;
        assert_ok!(cache.is_member(group, TEACHER).await);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_ok!(cache.is_member(group, STUDENT).await);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_ok!(cache.is_member(group, UserId(Uuid::from_u128(42))).await);
        assert_eq!(cache.entries.lock().await.len(), 2);
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 3);
        // TEACHER was evicted, STUDENT is still cached
        assert_ok!(cache.is_member(group, STUDENT).await);
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 3);
        assert_ok!(cache.is_member(group, TEACHER).await);
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 4);
    }
}
