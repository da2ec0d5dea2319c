use std::path::PathBuf;

use crate::services::service_client::ServiceName;

pub const DEFAULT_IDENTITY_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_POSTINGS_URL: &str = "http://localhost:8082/api/v1";
pub const DEFAULT_MATCHING_URL: &str = "http://localhost:8083/api/v1";
pub const DEFAULT_ANALYTICS_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8085";
pub const DEFAULT_SESSION_FILE: &str = ".vrms/session.json";

/// Base address of every backend service. Fixed once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRegistry {
    identity: String,
    postings: String,
    matching: String,
    analytics: String,
}

impl ServiceRegistry {
    pub fn new(
        identity: impl Into<String>,
        postings: impl Into<String>,
        matching: impl Into<String>,
        analytics: impl Into<String>,
    ) -> Self {
        ServiceRegistry {
            identity: identity.into(),
            postings: postings.into(),
            matching: matching.into(),
            analytics: analytics.into(),
        }
    }

    /// Every service reached through the API gateway's `/api` prefix.
    pub fn gateway(gateway_url: &str) -> Self {
        let base = format!("{}/api", gateway_url.trim_end_matches('/'));
        Self::new(base.clone(), base.clone(), base.clone(), base)
    }

    /// All four services on one host, e.g. a single mock server in tests.
    pub fn single(base_url: impl Into<String>) -> Self {
        let base = base_url.into();
        Self::new(base.clone(), base.clone(), base.clone(), base)
    }

    pub fn base_url(&self, service: ServiceName) -> &str {
        match service {
            ServiceName::Identity => &self.identity,
            ServiceName::Postings => &self.postings,
            ServiceName::Matching => &self.matching,
            ServiceName::Analytics => &self.analytics,
        }
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new(
            DEFAULT_IDENTITY_URL,
            DEFAULT_POSTINGS_URL,
            DEFAULT_MATCHING_URL,
            DEFAULT_ANALYTICS_URL,
        )
    }
}

/// What a failed read degrades to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Failed reads surface as unavailable.
    #[default]
    Disabled,
    /// Failed reads that have placeholder data return it, labelled as demo.
    DemoData,
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub registry: ServiceRegistry,
    pub session_file: PathBuf,
    pub fallback: FallbackPolicy,
    pub use_gateway: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            registry: ServiceRegistry::default(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            fallback: FallbackPolicy::Disabled,
            use_gateway: false,
        }
    }
}

impl ClientConfig {
    /// Local development: demo fallback on so screens stay usable offline.
    pub fn development() -> Self {
        Self {
            fallback: FallbackPolicy::DemoData,
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests need not touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let flag = |key: &str| {
            lookup(key)
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
                .unwrap_or(false)
        };

        let use_gateway = flag("VRMS_USE_API_GATEWAY");
        let registry = if use_gateway {
            ServiceRegistry::gateway(&get("VRMS_API_GATEWAY_URL", DEFAULT_GATEWAY_URL))
        } else {
            ServiceRegistry::new(
                get("VRMS_IDENTITY_URL", DEFAULT_IDENTITY_URL),
                get("VRMS_POSTINGS_URL", DEFAULT_POSTINGS_URL),
                get("VRMS_MATCHING_URL", DEFAULT_MATCHING_URL),
                get("VRMS_ANALYTICS_URL", DEFAULT_ANALYTICS_URL),
            )
        };

        let fallback = if flag("VRMS_DEMO_FALLBACK") {
            FallbackPolicy::DemoData
        } else {
            FallbackPolicy::Disabled
        };

        ClientConfig {
            registry,
            session_file: PathBuf::from(get("VRMS_SESSION_FILE", DEFAULT_SESSION_FILE)),
            fallback,
            use_gateway,
        }
    }
}
