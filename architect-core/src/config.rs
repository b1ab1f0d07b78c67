use std::time::Duration;

/// Environment variable holding the service base URL
pub const API_URL_ENV: &str = "ARCHITECTGBT_API_URL";
/// Environment variable holding the Pro API key
pub const API_KEY_ENV: &str = "ARCHITECTGBT_API_KEY";

pub const DEFAULT_API_URL: &str = "https://architectgbt.com";

/// Used when an API key is configured
pub const RECOMMEND_PATH_AUTHENTICATED: &str = "/api/mcp/recommend";
/// Used by free-tier callers without a key
pub const RECOMMEND_PATH_PUBLIC: &str = "/api/recommend/public";
pub const MODELS_PATH: &str = "/api/models";

pub const DEFAULT_LIST_LIMIT: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

pub const USER_AGENT: &str = concat!("architectgbt-mcp/", env!("CARGO_PKG_VERSION"));

pub const SITE_URL: &str = "https://architectgbt.com";
pub const PRICING_URL: &str = "https://architectgbt.com/pricing";
pub const SETTINGS_URL: &str = "https://architectgbt.com/dashboard/settings";

/// Immutable configuration snapshot shared by every tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub api_key: Option<String>,
    pub default_list_limit: usize,
    pub request_timeout: Duration,
    /// Gate `get_code_template` behind a configured API key
    pub templates_require_key: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            default_list_limit: DEFAULT_LIST_LIMIT,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            templates_require_key: false,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Blank values are treated as unset so that an MCP host passing
    /// `"ARCHITECTGBT_API_KEY": ""` falls back to the free tier.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();
        if let Some(url) = non_blank(API_URL_ENV) {
            config.api_url = url;
        }
        config.api_key = non_blank(API_KEY_ENV);
        config
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn recommend_path(&self) -> &'static str {
        if self.has_api_key() {
            RECOMMEND_PATH_AUTHENTICATED
        } else {
            RECOMMEND_PATH_PUBLIC
        }
    }

    pub fn recommend_url(&self) -> String {
        format!("{}{}", self.base_url(), self.recommend_path())
    }

    pub fn models_url(&self) -> String {
        format!("{}{}", self.base_url(), MODELS_PATH)
    }
}
