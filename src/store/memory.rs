use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::InteractionStore;
use crate::error::StoreError;
use crate::profiles::{Direction, Profile, SwipeDecision};

/// In-process store for tests, with switches for failures and latency.
#[derive(Default)]
pub struct MemoryStore {
    profiles: Mutex<Vec<Profile>>,
    decisions: Mutex<Vec<SwipeDecision>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    latency: Mutex<Option<Duration>>,
    profile_fetches: AtomicUsize,
}

impl MemoryStore {
    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        let store = Self::default();
        *store.profiles.lock().unwrap() = profiles;
        store
    }

    pub fn add_profile(&self, profile: Profile) {
        self.profiles.lock().unwrap().push(profile);
    }

    pub fn seed_decision(&self, actor: Uuid, target: Uuid, direction: Direction) {
        self.decisions.lock().unwrap().push(SwipeDecision {
            actor,
            target,
            direction,
            created_at: OffsetDateTime::now_utc(),
        });
    }

    pub fn decisions_by(&self, actor: Uuid) -> Vec<SwipeDecision> {
        self.decisions
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.actor == actor)
            .cloned()
            .collect()
    }

    pub fn set_fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn profile_fetches(&self) -> usize {
        self.profile_fetches.load(Ordering::SeqCst)
    }

    async fn before_call(&self, write: bool) -> Result<(), StoreError> {
        let latency = *self.latency.lock().unwrap();
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
        let failing = if write {
            self.fail_writes.load(Ordering::SeqCst)
        } else {
            self.fail_reads.load(Ordering::SeqCst)
        };
        if failing {
            return Err(StoreError::Unavailable("injected failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl InteractionStore for MemoryStore {
    async fn list_profiles(
        &self,
        excluding: &HashSet<Uuid>,
        viewer: Uuid,
        limit: i64,
    ) -> Result<Vec<Profile>, StoreError> {
        self.before_call(false).await?;
        self.profile_fetches.fetch_add(1, Ordering::SeqCst);
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.id != viewer && !excluding.contains(&p.id))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list_decisions(&self, actor: Uuid) -> Result<HashSet<Uuid>, StoreError> {
        self.before_call(false).await?;
        Ok(self.decisions_by(actor).into_iter().map(|d| d.target).collect())
    }

    async fn record_decision(
        &self,
        actor: Uuid,
        target: Uuid,
        direction: Direction,
    ) -> Result<(), StoreError> {
        self.before_call(true).await?;
        self.seed_decision(actor, target, direction);
        Ok(())
    }

    async fn find_reciprocal_decision(
        &self,
        actor: Uuid,
        target: Uuid,
        directions: &[Direction],
    ) -> Result<Option<SwipeDecision>, StoreError> {
        self.before_call(false).await?;
        Ok(self
            .decisions_by(actor)
            .into_iter()
            .rev()
            .find(|d| d.target == target && directions.contains(&d.direction)))
    }

    async fn list_matches(&self, user: Uuid) -> Result<Vec<Profile>, StoreError> {
        self.before_call(false).await?;
        let decisions = self.decisions.lock().unwrap().clone();
        let liked_back = |other: Uuid| {
            decisions
                .iter()
                .any(|d| d.actor == other && d.target == user && d.direction.is_positive())
        };
        let matched: HashSet<Uuid> = decisions
            .iter()
            .filter(|d| d.actor == user && d.direction.is_positive() && liked_back(d.target))
            .map(|d| d.target)
            .collect();
        let mut profiles: Vec<Profile> = self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .filter(|p| matched.contains(&p.id))
            .cloned()
            .collect();
        profiles.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(profiles)
    }
}
