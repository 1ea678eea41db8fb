use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// Tuning for the swipe feed.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverConfig {
    pub batch_limit: i64,
    pub refill_threshold: usize,
    pub match_display_secs: u64,
    pub store_timeout_ms: u64,
    pub session_idle_secs: u64,
}

impl Default for DiscoverConfig {
    fn default() -> Self {
        Self {
            batch_limit: 20,
            refill_threshold: 3,
            match_display_secs: 3,
            store_timeout_ms: 5_000,
            session_idle_secs: 30 * 60,
        }
    }
}

impl DiscoverConfig {
    pub fn match_display(&self) -> Duration {
        Duration::from_secs(self.match_display_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.batch_limit > 0,
            "DISCOVER_BATCH_LIMIT must be positive, got {}",
            self.batch_limit
        );
        anyhow::ensure!(self.store_timeout_ms > 0, "STORE_TIMEOUT_MS must be positive");
        anyhow::ensure!(
            self.session_idle_secs > 0,
            "DISCOVER_SESSION_IDLE_SECS must be positive"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub discover: DiscoverConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "swipedeck".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "swipedeck-users".into()),
        };

        let defaults = DiscoverConfig::default();
        let discover = DiscoverConfig {
            batch_limit: env_or("DISCOVER_BATCH_LIMIT", defaults.batch_limit),
            refill_threshold: env_or("DISCOVER_REFILL_THRESHOLD", defaults.refill_threshold),
            match_display_secs: env_or("DISCOVER_MATCH_DISPLAY_SECS", defaults.match_display_secs),
            store_timeout_ms: env_or("STORE_TIMEOUT_MS", defaults.store_timeout_ms),
            session_idle_secs: env_or("DISCOVER_SESSION_IDLE_SECS", defaults.session_idle_secs),
        };
        discover.validate()?;

        Ok(Self {
            database_url,
            jwt,
            discover,
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discover_defaults_match_feed_behaviour() {
        let cfg = DiscoverConfig::default();
        assert_eq!(cfg.batch_limit, 20);
        assert_eq!(cfg.refill_threshold, 3);
        assert_eq!(cfg.match_display(), Duration::from_secs(3));
        assert_eq!(cfg.store_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.session_idle(), Duration::from_secs(1_800));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn non_positive_batch_limit_is_rejected() {
        for bad in [0, -5] {
            let cfg = DiscoverConfig {
                batch_limit: bad,
                ..DiscoverConfig::default()
            };
            let err = cfg.validate().unwrap_err();
            assert!(err.to_string().contains("DISCOVER_BATCH_LIMIT"));
        }
    }

    #[test]
    fn env_or_falls_back_on_missing_or_garbage() {
        assert_eq!(env_or("SWIPEDECK_TEST_UNSET_VAR", 7_u64), 7);
        std::env::set_var("SWIPEDECK_TEST_GARBAGE_VAR", "not-a-number");
        assert_eq!(env_or("SWIPEDECK_TEST_GARBAGE_VAR", 11_i64), 11);
        std::env::set_var("SWIPEDECK_TEST_NUMERIC_VAR", "42");
        assert_eq!(env_or("SWIPEDECK_TEST_NUMERIC_VAR", 0_usize), 42);
    }
}
