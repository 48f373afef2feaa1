use std::env;
use std::str::FromStr;
use std::time::Duration;

use ghusers_common::error::{GhUsersError, GhUsersResult};
use serde::Deserialize;

/// Process-level settings shared by the API and the sync job.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub redis_url: String,
    pub cache_ttl_secs: u64,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present, then reads required vars.
    pub fn from_env() -> GhUsersResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        let cache_ttl_secs = parse_var_or("CACHE_TTL_SECS", 300)?;
        if cache_ttl_secs == 0 {
            return Err(GhUsersError::Config(
                "CACHE_TTL_SECS must be at least 1".to_owned(),
            ));
        }

        Ok(Self {
            database_url: get_var("DATABASE_URL")?,
            redis_url: get_var_or("REDIS_URL", "redis://127.0.0.1:6379"),
            cache_ttl_secs,
            host: get_var_or("HOST", "0.0.0.0"),
            port: parse_var_or("PORT", 8080)?,
            log_level: get_var_or("LOG_LEVEL", "info"),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Upstream GitHub API settings.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    /// Sustained request rate of the shared token bucket.
    pub rate_per_sec: f64,
    pub rate_burst: u32,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".to_owned(),
            token: None,
            timeout_secs: 15,
            rate_per_sec: 1.0,
            rate_burst: 2,
        }
    }
}

impl GitHubConfig {
    pub fn from_env() -> GhUsersResult<Self> {
        let defaults = Self::default();
        let token = env::var("GITHUB_TOKEN").ok().filter(|t| !t.trim().is_empty());

        let rate_per_sec: f64 = parse_var_or("GITHUB_RATE_PER_SEC", defaults.rate_per_sec)?;
        if rate_per_sec <= 0.0 {
            return Err(GhUsersError::Config(
                "GITHUB_RATE_PER_SEC must be positive".to_owned(),
            ));
        }

        Ok(Self {
            base_url: get_var_or("GITHUB_API_URL", &defaults.base_url)
                .trim_end_matches('/')
                .to_owned(),
            token,
            timeout_secs: parse_var_or("GITHUB_TIMEOUT_SECS", defaults.timeout_secs)?,
            rate_per_sec,
            rate_burst: parse_var_or("GITHUB_RATE_BURST", defaults.rate_burst)?.max(1),
        })
    }
}

/// Tuning knobs for one synchronization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub page_size: u32,
    pub worker_count: usize,
    pub max_fetch_attempts: u32,
    pub upsert_delay: Duration,
    pub max_consecutive_empty: u32,
    pub start_since: i64,
    /// Backoff before retry `n` is `n * backoff_unit`.
    pub backoff_unit: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: 30,
            worker_count: 5,
            max_fetch_attempts: 3,
            upsert_delay: Duration::from_millis(200),
            max_consecutive_empty: 1,
            start_since: 0,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> GhUsersResult<Self> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        let config = Self {
            page_size: parse_var_or("SYNC_PAGE_SIZE", defaults.page_size)?,
            worker_count: parse_var_or("SYNC_WORKERS", defaults.worker_count)?,
            max_fetch_attempts: parse_var_or("SYNC_MAX_FETCH_ATTEMPTS", defaults.max_fetch_attempts)?,
            upsert_delay: Duration::from_millis(parse_var_or("SYNC_UPSERT_DELAY_MS", 200u64)?),
            max_consecutive_empty: parse_var_or(
                "SYNC_MAX_CONSECUTIVE_EMPTY",
                defaults.max_consecutive_empty,
            )?,
            start_since: parse_var_or("SYNC_START_SINCE", defaults.start_since)?,
            backoff_unit: Duration::from_millis(parse_var_or("SYNC_BACKOFF_UNIT_MS", 1000u64)?),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GhUsersResult<()> {
        if self.page_size == 0 {
            return Err(GhUsersError::Config("SYNC_PAGE_SIZE must be at least 1".to_owned()));
        }
        if self.worker_count == 0 {
            return Err(GhUsersError::Config("SYNC_WORKERS must be at least 1".to_owned()));
        }
        if self.max_fetch_attempts == 0 {
            return Err(GhUsersError::Config(
                "SYNC_MAX_FETCH_ATTEMPTS must be at least 1".to_owned(),
            ));
        }
        if self.max_consecutive_empty == 0 {
            return Err(GhUsersError::Config(
                "SYNC_MAX_CONSECUTIVE_EMPTY must be at least 1".to_owned(),
            ));
        }
        if self.start_since < 0 {
            return Err(GhUsersError::Config(
                "SYNC_START_SINCE must not be negative".to_owned(),
            ));
        }
        Ok(())
    }

    /// Dispatch channel capacity: one full page per worker.
    pub fn channel_capacity(&self) -> usize {
        self.page_size as usize * self.worker_count
    }
}

fn get_var(key: &str) -> GhUsersResult<String> {
    env::var(key).map_err(|_| GhUsersError::Config(format!("{key} is required but not set")))
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_var_or<T>(key: &str, default: T) -> GhUsersResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| GhUsersError::Config(format!("invalid {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const SYNC_VARS: [&str; 7] = [
        "SYNC_PAGE_SIZE",
        "SYNC_WORKERS",
        "SYNC_MAX_FETCH_ATTEMPTS",
        "SYNC_UPSERT_DELAY_MS",
        "SYNC_MAX_CONSECUTIVE_EMPTY",
        "SYNC_START_SINCE",
        "SYNC_BACKOFF_UNIT_MS",
    ];

    fn clear_sync_vars() {
        for key in SYNC_VARS {
            env::remove_var(key);
        }
    }

    #[test]
    fn config_from_env_succeeds_with_required_vars() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");

        env::set_var("DATABASE_URL", "postgres://localhost/ghusers_test");
        env::remove_var("PORT");
        env::remove_var("CACHE_TTL_SECS");

        let cfg = AppConfig::from_env().expect("should parse config");
        assert_eq!(cfg.database_url, "postgres://localhost/ghusers_test");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.cache_ttl_secs, 300);

        env::remove_var("DATABASE_URL");
    }

    #[test]
    fn config_from_env_fails_without_database_url() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");

        env::remove_var("DATABASE_URL");
        let result = AppConfig::from_env();
        assert!(matches!(result, Err(GhUsersError::Config(_))));
    }

    #[test]
    fn config_rejects_malformed_port() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");

        env::set_var("DATABASE_URL", "postgres://localhost/ghusers_test");
        env::set_var("PORT", "eighty");
        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("PORT"), "got: {err}");

        env::remove_var("PORT");
        env::remove_var("DATABASE_URL");
    }

    #[test]
    fn bind_addr_formats_correctly() {
        let cfg = AppConfig {
            database_url: String::new(),
            redis_url: String::new(),
            cache_ttl_secs: 300,
            host: "127.0.0.1".to_owned(),
            port: 3000,
            log_level: "debug".to_owned(),
        };
        assert_eq!(cfg.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn sync_config_defaults_when_unset() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_sync_vars();

        let cfg = SyncConfig::from_env().expect("defaults should be valid");
        assert_eq!(cfg, SyncConfig::default());
        assert_eq!(cfg.channel_capacity(), 150);
    }

    #[test]
    fn sync_config_reads_overrides() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_sync_vars();
        env::set_var("SYNC_PAGE_SIZE", "100");
        env::set_var("SYNC_WORKERS", "8");
        env::set_var("SYNC_UPSERT_DELAY_MS", "0");
        env::set_var("SYNC_START_SINCE", "4200");

        let cfg = SyncConfig::from_env().expect("should parse");
        assert_eq!(cfg.page_size, 100);
        assert_eq!(cfg.worker_count, 8);
        assert_eq!(cfg.upsert_delay, Duration::ZERO);
        assert_eq!(cfg.start_since, 4200);
        assert_eq!(cfg.max_fetch_attempts, 3);

        clear_sync_vars();
    }

    #[test]
    fn sync_config_rejects_zero_workers() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_sync_vars();
        env::set_var("SYNC_WORKERS", "0");

        let err = SyncConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("SYNC_WORKERS"), "got: {err}");

        clear_sync_vars();
    }

    #[test]
    fn config_rejects_zero_cache_ttl() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");

        env::set_var("DATABASE_URL", "postgres://localhost/ghusers_test");
        env::remove_var("PORT");
        env::set_var("CACHE_TTL_SECS", "0");
        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("CACHE_TTL_SECS"), "got: {err}");

        env::remove_var("CACHE_TTL_SECS");
        env::remove_var("DATABASE_URL");
    }

    #[test]
    fn sync_config_rejects_zero_empty_threshold() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_sync_vars();
        env::set_var("SYNC_MAX_CONSECUTIVE_EMPTY", "0");

        let err = SyncConfig::from_env().unwrap_err();
        assert!(
            err.to_string().contains("SYNC_MAX_CONSECUTIVE_EMPTY"),
            "got: {err}"
        );

        clear_sync_vars();
    }

    #[test]
    fn sync_config_rejects_garbage_numbers() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_sync_vars();
        env::set_var("SYNC_PAGE_SIZE", "lots");

        assert!(matches!(SyncConfig::from_env(), Err(GhUsersError::Config(_))));

        clear_sync_vars();
    }

    #[test]
    fn github_config_strips_trailing_slash_and_blank_token() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        env::set_var("GITHUB_API_URL", "http://localhost:9999/");
        env::set_var("GITHUB_TOKEN", "   ");

        let cfg = GitHubConfig::from_env().expect("should parse");
        assert_eq!(cfg.base_url, "http://localhost:9999");
        assert!(cfg.token.is_none());
        assert_eq!(cfg.rate_burst, 2);

        env::remove_var("GITHUB_API_URL");
        env::remove_var("GITHUB_TOKEN");
    }
}
