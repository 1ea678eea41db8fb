//! Swipe feed for one viewing user.
//!
//! The feed holds a bounded batch of candidates fetched from the store,
//! walks through it one decision at a time and refetches the whole batch
//! when fewer than `refill_threshold` candidates are left. Store failures
//! never abort an operation; they are logged and reported through
//! [`Health`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::Session;
use crate::config::DiscoverConfig;
use crate::error::{FeedError, StoreError};
use crate::profiles::{Direction, Profile};
use crate::store::{bounded, InteractionStore};

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub batch_limit: i64,
    pub refill_threshold: usize,
    pub match_display: Duration,
    pub store_timeout: Duration,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self::from(&DiscoverConfig::default())
    }
}

impl From<&DiscoverConfig> for FeedSettings {
    fn from(cfg: &DiscoverConfig) -> Self {
        Self {
            batch_limit: cfg.batch_limit,
            refill_threshold: cfg.refill_threshold,
            match_display: cfg.match_display(),
            store_timeout: cfg.store_timeout(),
        }
    }
}

/// Whether an operation ran against a healthy store.
#[derive(Debug, Default)]
pub enum Health {
    #[default]
    Ok,
    Degraded(Vec<FeedError>),
}

impl Health {
    fn from_failures(failures: Vec<FeedError>) -> Self {
        if failures.is_empty() {
            Health::Ok
        } else {
            Health::Degraded(failures)
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Health::Degraded(_))
    }

    pub fn warnings(&self) -> Vec<String> {
        match self {
            Health::Ok => Vec::new(),
            Health::Degraded(errs) => errs.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct DecideOutcome {
    /// Candidate the decision applied to; `None` when there was nothing to decide on.
    pub target: Option<Uuid>,
    pub matched: Option<String>,
    pub refilled: bool,
    pub health: Health,
}

#[derive(Debug, Clone)]
struct MatchNotice {
    display_name: String,
    raised_at: Instant,
}

pub struct CandidateFeed {
    session: Session,
    store: Arc<dyn InteractionStore>,
    settings: FeedSettings,
    pool: Vec<Profile>,
    cursor: usize,
    match_notice: Option<MatchNotice>,
    warnings: Vec<String>,
}

impl CandidateFeed {
    pub fn new(session: Session, store: Arc<dyn InteractionStore>, settings: FeedSettings) -> Self {
        Self {
            session,
            store,
            settings,
            pool: Vec::new(),
            cursor: 0,
            match_notice: None,
            warnings: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn pool(&self) -> &[Profile] {
        &self.pool
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Failures from the most recent `initialize` or `decide`.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Candidates not yet decided on, the current one included.
    pub fn remaining(&self) -> usize {
        self.pool.len().saturating_sub(self.cursor)
    }

    pub fn current_candidate(&self) -> Option<&Profile> {
        self.pool.get(self.cursor)
    }

    /// Display name of the latest match while its display window is open.
    pub fn match_notification(&self) -> Option<&str> {
        self.match_notice
            .as_ref()
            .filter(|n| n.raised_at.elapsed() < self.settings.match_display)
            .map(|n| n.display_name.as_str())
    }

    /// Loads a fresh batch of candidates and rewinds the cursor.
    ///
    /// An empty pool is a valid result. On failure the pool is emptied as
    /// well and the failure comes back as [`Health::Degraded`].
    pub async fn initialize(&mut self) -> Health {
        let health = match self.refill().await {
            Ok(()) => Health::Ok,
            Err(e) => Health::Degraded(vec![e]),
        };
        self.warnings = health.warnings();
        health
    }

    /// Records `direction` on the current candidate, checks for a match and
    /// moves on. A no-op when there is no current candidate.
    pub async fn decide(&mut self, direction: Direction) -> DecideOutcome {
        let user_id = self.session.user_id;
        let Some(candidate) = self.current_candidate().cloned() else {
            debug!(%user_id, "decide with no current candidate");
            return DecideOutcome::default();
        };
        self.expire_match_notice();

        let timeout = self.settings.store_timeout;
        let mut failures = Vec::new();

        let recorded = bounded(
            timeout,
            self.store.record_decision(user_id, candidate.id, direction),
        )
        .await;
        if let Err(e) = recorded {
            warn!(%user_id, candidate_id = %candidate.id, error = %e, "swipe decision not recorded");
            failures.push(FeedError::Write(e));
        }

        let mut matched = None;
        if direction.is_positive() {
            let reciprocal = bounded(
                timeout,
                self.store
                    .find_reciprocal_decision(candidate.id, user_id, &Direction::POSITIVE),
            )
            .await;
            match reciprocal {
                Ok(Some(theirs)) => {
                    info!(
                        user_id = %theirs.target,
                        candidate_id = %theirs.actor,
                        their_direction = theirs.direction.as_str(),
                        liked_at = %theirs.created_at,
                        "mutual match"
                    );
                    self.match_notice = Some(MatchNotice {
                        display_name: candidate.display_name.clone(),
                        raised_at: Instant::now(),
                    });
                    matched = Some(candidate.display_name.clone());
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(%user_id, candidate_id = %candidate.id, error = %e, "reciprocal check failed");
                    failures.push(FeedError::Fetch(e));
                }
            }
        }

        self.cursor += 1;

        let mut refilled = false;
        if self.remaining() < self.settings.refill_threshold {
            debug!(%user_id, remaining = self.remaining(), "candidate pool low, refilling");
            refilled = true;
            if let Err(e) = self.refill().await {
                failures.push(e);
            }
        }

        let health = Health::from_failures(failures);
        self.warnings = health.warnings();
        DecideOutcome {
            target: Some(candidate.id),
            matched,
            refilled,
            health,
        }
    }

    /// Replaces the pool with a new exclusion-filtered batch, cursor at 0.
    async fn refill(&mut self) -> Result<(), FeedError> {
        let user_id = self.session.user_id;
        let fetched = self.fetch_candidates().await;
        self.cursor = 0;
        match fetched {
            Ok(profiles) => {
                debug!(%user_id, count = profiles.len(), "candidate pool loaded");
                self.pool = profiles;
                Ok(())
            }
            Err(e) => {
                warn!(%user_id, error = %e, "loading candidates failed");
                self.pool.clear();
                Err(FeedError::Fetch(e))
            }
        }
    }

    async fn fetch_candidates(&self) -> Result<Vec<Profile>, StoreError> {
        let user_id = self.session.user_id;
        let timeout = self.settings.store_timeout;
        let decided: HashSet<Uuid> = bounded(timeout, self.store.list_decisions(user_id)).await?;
        bounded(
            timeout,
            self.store
                .list_profiles(&decided, user_id, self.settings.batch_limit),
        )
        .await
    }

    fn expire_match_notice(&mut self) {
        if self.match_notification().is_none() {
            self.match_notice = None;
        }
    }
}
