use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::profiles::{Direction, Profile, SwipeDecision};

#[cfg(test)]
pub mod memory;

/// Queryable store of profiles and recorded swipe decisions.
///
/// Implementations must give read-after-write consistency between
/// `record_decision` and `find_reciprocal_decision`.
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Up to `limit` profiles other than `viewer` whose ids are not in `excluding`.
    async fn list_profiles(
        &self,
        excluding: &HashSet<Uuid>,
        viewer: Uuid,
        limit: i64,
    ) -> Result<Vec<Profile>, StoreError>;

    /// Targets `actor` has already decided on.
    async fn list_decisions(&self, actor: Uuid) -> Result<HashSet<Uuid>, StoreError>;

    async fn record_decision(
        &self,
        actor: Uuid,
        target: Uuid,
        direction: Direction,
    ) -> Result<(), StoreError>;

    /// A decision made by `actor` on `target` in one of `directions`, if any.
    async fn find_reciprocal_decision(
        &self,
        actor: Uuid,
        target: Uuid,
        directions: &[Direction],
    ) -> Result<Option<SwipeDecision>, StoreError>;

    /// Profiles that share a positive decision with `user` in both directions.
    async fn list_matches(&self, user: Uuid) -> Result<Vec<Profile>, StoreError>;
}

/// Runs a store call under `limit`; expiry becomes [`StoreError::Timeout`].
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(StoreError::Timeout(limit)))
}
