use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::wizard::WizardSettings;

/// Which identity form the wizard presents on step 1
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMode {
    /// Name + email, with an email shape check
    #[default]
    NameEmail,
    /// A bare user identifier
    UserId,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the recommendation server
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout for the HTTP client
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Delay before the collaborative path falls back to the preferences step
    #[serde(default = "default_fallback_delay_ms")]
    pub fallback_delay_ms: u64,

    /// Optional JSON file backing the session store
    #[serde(default)]
    pub session_file: Option<PathBuf>,

    #[serde(default)]
    pub identity_mode: IdentityMode,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_fallback_delay_ms() -> u64 {
    2000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            fallback_delay_ms: default_fallback_delay_ms(),
            session_file: None,
            identity_mode: IdentityMode::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn wizard_settings(&self) -> WizardSettings {
        WizardSettings {
            base_url: self.api_base_url.trim_end_matches('/').to_string(),
            fallback_delay: Duration::from_millis(self.fallback_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_environment() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:5000");
        assert_eq!(config.fallback_delay_ms, 2000);
        assert_eq!(config.identity_mode, IdentityMode::NameEmail);
        assert!(config.session_file.is_none());
    }

    #[test]
    fn test_overrides() {
        let vars = vec![
            ("API_BASE_URL".to_string(), "http://rentals.local/".to_string()),
            ("FALLBACK_DELAY_MS".to_string(), "500".to_string()),
            ("IDENTITY_MODE".to_string(), "user_id".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.identity_mode, IdentityMode::UserId);

        let settings = config.wizard_settings();
        assert_eq!(settings.base_url, "http://rentals.local");
        assert_eq!(settings.fallback_delay, Duration::from_millis(500));
    }
}
