use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Path of the application root, used to pick which instance to focus.
    pub app_root: String,
    pub channel_capacity: usize,
    pub api: ApiConfig,
    pub scheduler: SchedulerConfig,
    pub presenter: PresenterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenterConfig {
    pub title: String,
    pub default_body: String,
    pub icon: String,
    pub badge: String,
    pub open_action_title: String,
    pub dismiss_action_title: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_defaults = ApiConfig::default();
        let scheduler_defaults = SchedulerConfig::default();
        let presenter_defaults = PresenterConfig::default();

        Ok(Config {
            port: parse_var("PORT", 8080)?,
            app_root: env::var("NOTIFY_APP_ROOT").unwrap_or_else(|_| "/".to_string()),
            channel_capacity: parse_var("NOTIFY_CHANNEL_CAPACITY", 64)?,

            api: ApiConfig {
                base_url: env::var("NOTIFY_API_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or(api_defaults.base_url),
                request_timeout_secs: parse_var(
                    "NOTIFY_REQUEST_TIMEOUT_SECS",
                    api_defaults.request_timeout_secs,
                )?,
            },

            scheduler: SchedulerConfig {
                poll_interval_secs: parse_var(
                    "NOTIFY_POLL_INTERVAL_SECS",
                    scheduler_defaults.poll_interval_secs,
                )?
                .max(1),
            },

            presenter: PresenterConfig {
                title: env::var("NOTIFY_TITLE").unwrap_or(presenter_defaults.title),
                default_body: env::var("NOTIFY_DEFAULT_BODY")
                    .unwrap_or(presenter_defaults.default_body),
                icon: env::var("NOTIFY_ICON").unwrap_or(presenter_defaults.icon),
                badge: env::var("NOTIFY_BADGE").unwrap_or(presenter_defaults.badge),
                ..presenter_defaults
            },
        })
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl SchedulerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            request_timeout_secs: 20,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
        }
    }
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            title: "SpaceBSA: file shared".to_string(),
            default_body: "Someone shared a file with you".to_string(),
            icon: "/icons/icon-192x192.png".to_string(),
            badge: "/icons/badge-72x72.png".to_string(),
            open_action_title: "Open SpaceBSA".to_string(),
            dismiss_action_title: "Dismiss".to_string(),
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", name, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(SchedulerConfig::default().poll_interval(), Duration::from_secs(30));
        assert_eq!(ApiConfig::default().request_timeout(), Duration::from_secs(20));
        assert_eq!(PresenterConfig::default().title, "SpaceBSA: file shared");
    }

    #[test]
    fn test_parse_var_falls_back_and_rejects_garbage() {
        assert_eq!(parse_var::<u64>("SPACEBSA_TEST_UNSET_VAR", 7).unwrap(), 7);

        env::set_var("SPACEBSA_TEST_BAD_VAR", "soon");
        assert!(parse_var::<u64>("SPACEBSA_TEST_BAD_VAR", 7).is_err());
        env::remove_var("SPACEBSA_TEST_BAD_VAR");
    }
}
