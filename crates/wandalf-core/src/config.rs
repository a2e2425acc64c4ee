use serde::{Deserialize, Serialize};
use version_migrate::DeriveQueryable as Queryable;

pub const DEFAULT_API_BASE: &str = "https://api.wandalf.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Environment variable overriding [`ServiceConfig::api_base`].
pub const API_BASE_ENV: &str = "WANDALF_API_BASE";
/// Environment variable overriding [`ServiceConfig::public_root`].
pub const PUBLIC_ROOT_ENV: &str = "WANDALF_PUBLIC_ROOT";

/// Where the collaborator services live and how previews resolve assets.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Queryable)]
#[queryable(entity = "service_config")]
pub struct ServiceConfig {
    pub api_base: String,
    /// Root that relative references inside previews resolve against.
    /// Defaults to `api_base` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_root: Option<String>,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

fn default_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            public_root: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ServiceConfig {
    /// API base without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }

    pub fn public_root(&self) -> &str {
        self.public_root
            .as_deref()
            .unwrap_or(&self.api_base)
            .trim_end_matches('/')
    }

    /// Applies `WANDALF_API_BASE` and `WANDALF_PUBLIC_ROOT` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`. Blank values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base) = non_blank(API_BASE_ENV) {
            self.api_base = base;
        }
        if let Some(root) = non_blank(PUBLIC_ROOT_ENV) {
            self.public_root = Some(root);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_root_falls_back_to_api_base() {
        let config = ServiceConfig {
            api_base: "https://api.example.com/".into(),
            ..Default::default()
        };
        assert_eq!(config.api_base(), "https://api.example.com");
        assert_eq!(config.public_root(), "https://api.example.com");
    }

    #[test]
    fn test_overrides_skip_blank_values() {
        let config = ServiceConfig::default().with_overrides(|key| match key {
            API_BASE_ENV => Some("http://localhost:8787".into()),
            PUBLIC_ROOT_ENV => Some("   ".into()),
            _ => None,
        });

        assert_eq!(config.api_base(), "http://localhost:8787");
        assert_eq!(config.public_root, None);
    }

    #[test]
    fn test_deserialize_fills_timeout() {
        let config: ServiceConfig = toml::from_str("api_base = \"http://x\"").unwrap();
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }
}
