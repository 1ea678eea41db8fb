use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::controller::{CandidateFeed, DecideOutcome};
use crate::profiles::{dto::ProfileCard, Direction};

#[derive(Debug, Serialize)]
pub struct FeedSnapshot {
    pub candidate: Option<ProfileCard>,
    pub remaining: usize,
    pub match_notification: Option<String>,
    pub degraded: bool,
    pub warnings: Vec<String>,
}

impl FeedSnapshot {
    /// Current view of the feed, carrying the health of its last store round.
    pub fn capture(feed: &CandidateFeed, today: Date) -> Self {
        let warnings = feed.warnings().to_vec();
        Self {
            candidate: feed
                .current_candidate()
                .map(|p| ProfileCard::from_profile(p, today)),
            remaining: feed.remaining(),
            match_notification: feed.match_notification().map(str::to_string),
            degraded: !warnings.is_empty(),
            warnings,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    pub direction: Direction,
}

#[derive(Debug, Serialize)]
pub struct DecideResponse {
    pub decided: Option<Uuid>,
    pub matched: Option<String>,
    pub refilled: bool,
    #[serde(flatten)]
    pub feed: FeedSnapshot,
}

impl DecideResponse {
    pub fn new(outcome: DecideOutcome, feed: &CandidateFeed, today: Date) -> Self {
        Self {
            decided: outcome.target,
            matched: outcome.matched,
            refilled: outcome.refilled,
            feed: FeedSnapshot::capture(feed, today),
        }
    }
}
