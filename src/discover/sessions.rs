use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use super::controller::{CandidateFeed, FeedSettings, Health};
use crate::auth::Session;
use crate::store::InteractionStore;

pub type SharedFeed = Arc<Mutex<CandidateFeed>>;

struct FeedEntry {
    feed: SharedFeed,
    last_touched: Instant,
}

/// Live feeds keyed by viewing user.
///
/// A user has at most one feed and every operation on it, reloads
/// included, runs under that feed's mutex. Feeds untouched for
/// `idle_ttl` are dropped.
pub struct FeedSessions {
    feeds: RwLock<HashMap<Uuid, FeedEntry>>,
    idle_ttl: Duration,
}

impl FeedSessions {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            feeds: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Reloads the user's feed from the store, creating it on first use.
    ///
    /// An existing feed is reinitialized in place once any in-flight
    /// decision on it has finished.
    pub async fn open(
        &self,
        session: Session,
        store: Arc<dyn InteractionStore>,
        settings: FeedSettings,
    ) -> (SharedFeed, Health) {
        let (shared, reused) = {
            let mut feeds = self.feeds.write().await;
            self.evict_idle_locked(&mut feeds);
            let now = Instant::now();
            match feeds.get_mut(&session.user_id) {
                Some(entry) => {
                    entry.last_touched = now;
                    (entry.feed.clone(), true)
                }
                None => {
                    let feed = Arc::new(Mutex::new(CandidateFeed::new(session, store, settings)));
                    feeds.insert(
                        session.user_id,
                        FeedEntry {
                            feed: feed.clone(),
                            last_touched: now,
                        },
                    );
                    (feed, false)
                }
            }
        };

        let health = shared.lock().await.initialize().await;
        info!(user_id = %session.user_id, reused, "discover session opened");
        (shared, health)
    }

    pub async fn get(&self, user_id: Uuid) -> Option<SharedFeed> {
        let mut feeds = self.feeds.write().await;
        self.evict_idle_locked(&mut feeds);
        let entry = feeds.get_mut(&user_id)?;
        entry.last_touched = Instant::now();
        Some(entry.feed.clone())
    }

    /// Drops the user's feed. Returns whether one existed.
    pub async fn close(&self, user_id: Uuid) -> bool {
        let removed = self.feeds.write().await.remove(&user_id).is_some();
        if removed {
            info!(%user_id, "discover session closed");
        }
        removed
    }

    /// Drops every feed idle for longer than the TTL. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let mut feeds = self.feeds.write().await;
        self.evict_idle_locked(&mut feeds)
    }

    fn evict_idle_locked(&self, feeds: &mut HashMap<Uuid, FeedEntry>) -> usize {
        let before = feeds.len();
        feeds.retain(|_, entry| entry.last_touched.elapsed() < self.idle_ttl);
        let evicted = before - feeds.len();
        if evicted > 0 {
            debug!(evicted, "idle discover sessions dropped");
        }
        evicted
    }
}

#[cfg(test)]
impl Default for FeedSessions {
    fn default() -> Self {
        Self::new(crate::config::DiscoverConfig::default().session_idle())
    }
}

/// Periodically sweeps idle feeds so abandoned sessions don't pile up
/// between requests.
pub fn spawn_idle_sweeper(
    sessions: Arc<FeedSessions>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        loop {
            tick.tick().await;
            sessions.evict_idle().await;
        }
    })
}
