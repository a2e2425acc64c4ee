//! ServiceConfig DTOs and migrations

use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, Versioned};

use wandalf_core::config::{DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT_SECS, ServiceConfig};

#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct ServiceConfigV1_0_0 {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_root: Option<String>,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl IntoDomain<ServiceConfig> for ServiceConfigV1_0_0 {
    fn into_domain(self) -> ServiceConfig {
        ServiceConfig {
            api_base: self.api_base,
            public_root: self.public_root,
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}

impl FromDomain<ServiceConfig> for ServiceConfigV1_0_0 {
    fn from_domain(config: ServiceConfig) -> Self {
        ServiceConfigV1_0_0 {
            api_base: config.api_base,
            public_root: config.public_root,
            request_timeout_secs: config.request_timeout_secs,
        }
    }
}

/// Creates and configures a Migrator instance for the service configuration.
pub fn create_service_config_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let config_path = version_migrate::Migrator::define("service_config")
        .from::<ServiceConfigV1_0_0>()
        .into_with_save::<ServiceConfig>();

    migrator
        .register(config_path)
        .expect("Failed to register service_config migration path");

    migrator
}
